//! Derived per-user signal snapshot.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Version key for signal upserts. Bump when extraction semantics change.
pub const SIGNAL_VERSION: &str = "1.0.0";

/// Deterministic summary of a user's full activity set.
///
/// Every field defaults so partially-populated JSON (e.g. an ad-hoc gap
/// analysis request) still deserializes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalData {
    pub dataset_size: usize,
    /// Top five tokens by count, most frequent first.
    pub topics: Vec<Topic>,
    pub cadence: Cadence,
    pub engagement: Engagement,
    /// Per-day totals, oldest first, at most 30 buckets.
    pub trends: Vec<TrendBucket>,
    pub top_posts: Vec<TopPost>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    pub count: usize,
    /// Share of all qualifying tokens, in `[0, 1]`.
    pub frequency: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cadence {
    pub average_gap_days: f64,
    /// Population variance of the gaps, in days squared.
    pub variance: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Engagement {
    pub likes_per_post: f64,
    pub comments_per_post: f64,
    /// `comments * 5 / likes`, or `0` when there are no likes.
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendBucket {
    pub date: NaiveDate,
    pub likes: u64,
    pub comments: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopPost {
    pub text: String,
    pub likes: u64,
    pub comments: u64,
    pub date: DateTime<Utc>,
}

/// A persisted signal row. One per `(user_id, signal_version)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub id: i64,
    pub user_id: Uuid,
    pub signal_version: String,
    pub computed_data: SignalData,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let data: SignalData = serde_json::from_value(serde_json::json!({
            "cadence": { "average_gap_days": 10.0 },
            "topics": [],
            "engagement": { "ratio": 0.0 }
        }))
        .expect("partial signal should deserialize");

        assert_eq!(data.dataset_size, 0);
        assert!((data.cadence.average_gap_days - 10.0).abs() < f64::EPSILON);
        assert!(data.cadence.variance.abs() < f64::EPSILON);
        assert!(data.trends.is_empty());
    }

    #[test]
    fn trend_dates_serialize_as_iso_dates() {
        let bucket = TrendBucket {
            date: NaiveDate::from_ymd_opt(2025, 3, 7).unwrap(),
            likes: 1,
            comments: 2,
        };
        let json = serde_json::to_value(&bucket).unwrap();
        assert_eq!(json["date"], "2025-03-07");
    }
}
