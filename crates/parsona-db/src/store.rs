//! [`AnalyticsStore`] backed by Postgres.

use async_trait::async_trait;
use parsona_core::{
    AnalyticsStore, NewRawActivity, NewScore, RawActivity, ScoreRecord, SignalData, SignalRecord,
    StoreError,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Json(e) => StoreError::Decode(e),
            other => StoreError::Backend(Box::new(other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl AnalyticsStore for PgStore {
    async fn insert_activity(&self, activity: &NewRawActivity) -> Result<bool, StoreError> {
        Ok(crate::insert_raw_activity(&self.pool, activity)
            .await?
            .is_some())
    }

    async fn list_activities(&self, user_id: Uuid) -> Result<Vec<RawActivity>, StoreError> {
        let rows = crate::list_raw_activities_for_user(&self.pool, user_id).await?;
        Ok(rows.into_iter().map(RawActivity::from).collect())
    }

    async fn upsert_signal(
        &self,
        user_id: Uuid,
        signal_version: &str,
        data: &SignalData,
    ) -> Result<SignalRecord, StoreError> {
        let computed = serde_json::to_value(data)?;
        let row = crate::upsert_signal(&self.pool, user_id, signal_version, &computed).await?;
        Ok(SignalRecord::try_from(row)?)
    }

    async fn upsert_score(&self, score: &NewScore) -> Result<ScoreRecord, StoreError> {
        match crate::upsert_score(&self.pool, score).await {
            Ok(row) => Ok(ScoreRecord::try_from(row)?),
            Err(e) if e.is_foreign_key_violation() => {
                Err(StoreError::UnknownSignal(score.signal_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn latest_signal(&self, user_id: Uuid) -> Result<Option<SignalRecord>, StoreError> {
        match crate::get_latest_signal(&self.pool, user_id).await? {
            Some(row) => Ok(Some(SignalRecord::try_from(row)?)),
            None => Ok(None),
        }
    }

    async fn latest_score(&self, user_id: Uuid) -> Result<Option<ScoreRecord>, StoreError> {
        match crate::get_latest_score(&self.pool, user_id).await? {
            Some(row) => Ok(Some(ScoreRecord::try_from(row)?)),
            None => Ok(None),
        }
    }
}
