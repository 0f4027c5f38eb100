//! Brand score records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Version key for score upserts. Bump when weights or thresholds change.
pub const MODEL_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubScores {
    pub consistency: u8,
    pub authority: u8,
    pub engagement: u8,
}

/// A score ready to be upserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScore {
    pub user_id: Uuid,
    pub signal_id: i64,
    pub model_version: String,
    pub brand_score: u8,
    pub sub_scores: SubScores,
}

/// A persisted score row. One per `(user_id, signal_id, model_version)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: i64,
    pub user_id: Uuid,
    pub signal_id: i64,
    pub model_version: String,
    /// Weighted overall score in `[0, 100]`.
    pub brand_score: u8,
    pub sub_scores: SubScores,
    pub created_at: DateTime<Utc>,
}
