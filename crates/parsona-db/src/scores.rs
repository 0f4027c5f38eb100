//! Database operations for the `scores` table.

use chrono::{DateTime, Utc};
use parsona_core::{NewScore, ScoreRecord, SubScores};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScoreRow {
    pub id: i64,
    pub user_id: Uuid,
    pub signal_id: i64,
    pub model_version: String,
    pub brand_score: i16,
    pub consistency: i16,
    pub authority: i16,
    pub engagement: i16,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ScoreRow> for ScoreRecord {
    type Error = DbError;

    fn try_from(row: ScoreRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            signal_id: row.signal_id,
            model_version: row.model_version,
            brand_score: percent("brand_score", row.brand_score)?,
            sub_scores: SubScores {
                consistency: percent("consistency", row.consistency)?,
                authority: percent("authority", row.authority)?,
                engagement: percent("engagement", row.engagement)?,
            },
            created_at: row.created_at,
        })
    }
}

fn percent(column: &str, value: i16) -> Result<u8, DbError> {
    u8::try_from(value)
        .ok()
        .filter(|v| *v <= 100)
        .ok_or_else(|| DbError::InvalidData(format!("{column} {value} is outside [0, 100]")))
}

/// Insert or overwrite the score for `(user_id, signal_id, model_version)`.
///
/// # Errors
///
/// Returns `DbError` on database query failure, including a foreign-key
/// violation when `signal_id` does not exist.
pub async fn upsert_score(pool: &PgPool, score: &NewScore) -> Result<ScoreRow, DbError> {
    let row = sqlx::query_as::<_, ScoreRow>(
        "INSERT INTO scores \
           (user_id, signal_id, model_version, brand_score, consistency, authority, engagement, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, clock_timestamp()) \
         ON CONFLICT (user_id, signal_id, model_version) DO UPDATE SET \
           brand_score = EXCLUDED.brand_score, \
           consistency = EXCLUDED.consistency, \
           authority = EXCLUDED.authority, \
           engagement = EXCLUDED.engagement, \
           created_at = EXCLUDED.created_at \
         RETURNING id, user_id, signal_id, model_version, brand_score, \
                   consistency, authority, engagement, created_at",
    )
    .bind(score.user_id)
    .bind(score.signal_id)
    .bind(&score.model_version)
    .bind(i16::from(score.brand_score))
    .bind(i16::from(score.sub_scores.consistency))
    .bind(i16::from(score.sub_scores.authority))
    .bind(i16::from(score.sub_scores.engagement))
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Return the most recently written score for a user, or `None` if none exists.
///
/// # Errors
///
/// Returns `DbError` on database query failure.
pub async fn get_latest_score(pool: &PgPool, user_id: Uuid) -> Result<Option<ScoreRow>, DbError> {
    let row = sqlx::query_as::<_, ScoreRow>(
        "SELECT id, user_id, signal_id, model_version, brand_score, \
                consistency, authority, engagement, created_at \
         FROM scores \
         WHERE user_id = $1 \
         ORDER BY created_at DESC, id DESC \
         LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
