//! Persistence seam between the engine and its storage backend.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::activity::{NewRawActivity, RawActivity};
use crate::score::{NewScore, ScoreRecord};
use crate::signal::{SignalData, SignalRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("stored data could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("signal {0} does not exist")]
    UnknownSignal(i64),
}

/// Keyed storage for activities, signals and scores.
///
/// Implementations must enforce three uniqueness rules:
/// - activities are unique on `content_hash`; a duplicate insert is a no-op,
/// - signals are unique on `(user_id, signal_version)` and upserted in place,
/// - scores are unique on `(user_id, signal_id, model_version)` and upserted
///   in place.
///
/// Concurrent upserts for the same key resolve as last write wins.
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    /// Insert an activity. Returns `false` when the fingerprint already exists.
    async fn insert_activity(&self, activity: &NewRawActivity) -> Result<bool, StoreError>;

    /// All activities owned by `user_id`, in insertion order.
    async fn list_activities(&self, user_id: Uuid) -> Result<Vec<RawActivity>, StoreError>;

    async fn upsert_signal(
        &self,
        user_id: Uuid,
        signal_version: &str,
        data: &SignalData,
    ) -> Result<SignalRecord, StoreError>;

    async fn upsert_score(&self, score: &NewScore) -> Result<ScoreRecord, StoreError>;

    /// Most recently written signal for the user, across versions.
    async fn latest_signal(&self, user_id: Uuid) -> Result<Option<SignalRecord>, StoreError>;

    /// Most recently written score for the user, across signals and versions.
    async fn latest_score(&self, user_id: Uuid) -> Result<Option<ScoreRecord>, StoreError>;
}
