//! Database operations for the append-only `raw_activities` table.

use chrono::{DateTime, Utc};
use parsona_core::{NewRawActivity, RawActivity};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RawActivityRow {
    pub id: i64,
    pub public_id: Uuid,
    pub user_id: Uuid,
    pub source_type: String,
    pub raw_payload: Value,
    pub content_hash: String,
    pub ingested_at: DateTime<Utc>,
}

impl From<RawActivityRow> for RawActivity {
    fn from(row: RawActivityRow) -> Self {
        Self {
            id: row.id,
            public_id: row.public_id,
            user_id: row.user_id,
            source_type: row.source_type,
            raw_payload: row.raw_payload,
            content_hash: row.content_hash,
            ingested_at: row.ingested_at,
        }
    }
}

/// Insert an activity unless its `content_hash` already exists.
///
/// Returns `Some(id)` for a new row and `None` when the unique constraint
/// turned the insert into a no-op. Concurrent inserts of the same content
/// resolve to exactly one row.
///
/// # Errors
///
/// Returns `DbError` on database query failure.
pub async fn insert_raw_activity(
    pool: &PgPool,
    activity: &NewRawActivity,
) -> Result<Option<i64>, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO raw_activities \
           (user_id, source_type, raw_payload, content_hash, ingested_at) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (content_hash) DO NOTHING \
         RETURNING id",
    )
    .bind(activity.user_id)
    .bind(&activity.source_type)
    .bind(&activity.raw_payload)
    .bind(&activity.content_hash)
    .bind(activity.ingested_at)
    .fetch_optional(pool)
    .await?;
    Ok(id)
}

/// Every activity a user owns, oldest insert first.
///
/// # Errors
///
/// Returns `DbError` on database query failure.
pub async fn list_raw_activities_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<RawActivityRow>, DbError> {
    let rows = sqlx::query_as::<_, RawActivityRow>(
        "SELECT id, public_id, user_id, source_type, raw_payload, content_hash, ingested_at \
         FROM raw_activities \
         WHERE user_id = $1 \
         ORDER BY id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns `DbError` on database query failure.
pub async fn count_raw_activities_for_user(pool: &PgPool, user_id: Uuid) -> Result<i64, DbError> {
    Ok(sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM raw_activities WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?)
}
