//! Database operations for the `signals` table.

use chrono::{DateTime, Utc};
use parsona_core::{SignalData, SignalRecord};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SignalRow {
    pub id: i64,
    pub user_id: Uuid,
    pub signal_version: String,
    pub computed_data: Value,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<SignalRow> for SignalRecord {
    type Error = serde_json::Error;

    fn try_from(row: SignalRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            signal_version: row.signal_version,
            computed_data: serde_json::from_value::<SignalData>(row.computed_data)?,
            created_at: row.created_at,
        })
    }
}

/// Insert or overwrite the user's signal for `signal_version`.
///
/// The row id is stable across overwrites; `created_at` moves to the time of
/// the latest write.
///
/// # Errors
///
/// Returns `DbError` on database query failure.
pub async fn upsert_signal(
    pool: &PgPool,
    user_id: Uuid,
    signal_version: &str,
    computed_data: &Value,
) -> Result<SignalRow, DbError> {
    let row = sqlx::query_as::<_, SignalRow>(
        "INSERT INTO signals (user_id, signal_version, computed_data, created_at) \
         VALUES ($1, $2, $3, clock_timestamp()) \
         ON CONFLICT (user_id, signal_version) DO UPDATE SET \
           computed_data = EXCLUDED.computed_data, \
           created_at = EXCLUDED.created_at \
         RETURNING id, user_id, signal_version, computed_data, created_at",
    )
    .bind(user_id)
    .bind(signal_version)
    .bind(computed_data)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Return the most recently written signal for a user, or `None` if none exists.
///
/// # Errors
///
/// Returns `DbError` on database query failure.
pub async fn get_latest_signal(pool: &PgPool, user_id: Uuid) -> Result<Option<SignalRow>, DbError> {
    let row = sqlx::query_as::<_, SignalRow>(
        "SELECT id, user_id, signal_version, computed_data, created_at \
         FROM signals \
         WHERE user_id = $1 \
         ORDER BY created_at DESC, id DESC \
         LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
