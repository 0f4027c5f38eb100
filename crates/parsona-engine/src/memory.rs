//! In-process [`AnalyticsStore`] with the same uniqueness rules as Postgres.
//!
//! Used by tests and by callers that want the pipeline without a database.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use parsona_core::{
    AnalyticsStore, NewRawActivity, NewScore, RawActivity, ScoreRecord, SignalData, SignalRecord,
    StoreError,
};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    activities: Vec<RawActivity>,
    fingerprints: HashSet<String>,
    signals: Vec<SignalRecord>,
    signal_keys: HashMap<(Uuid, String), usize>,
    scores: Vec<ScoreRecord>,
    score_keys: HashMap<(Uuid, i64, String), usize>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn activity_count(&self, user_id: Uuid) -> usize {
        let tables = self.tables.lock().await;
        tables
            .activities
            .iter()
            .filter(|a| a.user_id == user_id)
            .count()
    }

    pub async fn signal_count(&self, user_id: Uuid) -> usize {
        let tables = self.tables.lock().await;
        tables.signals.iter().filter(|s| s.user_id == user_id).count()
    }

    pub async fn score_count(&self, user_id: Uuid) -> usize {
        let tables = self.tables.lock().await;
        tables.scores.iter().filter(|s| s.user_id == user_id).count()
    }
}

#[async_trait]
impl AnalyticsStore for MemoryStore {
    async fn insert_activity(&self, activity: &NewRawActivity) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().await;
        if !tables.fingerprints.insert(activity.content_hash.clone()) {
            return Ok(false);
        }
        let id = tables.next_id();
        tables.activities.push(RawActivity {
            id,
            public_id: Uuid::new_v4(),
            user_id: activity.user_id,
            source_type: activity.source_type.clone(),
            raw_payload: activity.raw_payload.clone(),
            content_hash: activity.content_hash.clone(),
            ingested_at: activity.ingested_at,
        });
        Ok(true)
    }

    async fn list_activities(&self, user_id: Uuid) -> Result<Vec<RawActivity>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .activities
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn upsert_signal(
        &self,
        user_id: Uuid,
        signal_version: &str,
        data: &SignalData,
    ) -> Result<SignalRecord, StoreError> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let key = (user_id, signal_version.to_string());

        if let Some(&idx) = tables.signal_keys.get(&key) {
            let record = &mut tables.signals[idx];
            record.computed_data = data.clone();
            record.created_at = now;
            return Ok(record.clone());
        }

        let record = SignalRecord {
            id: tables.next_id(),
            user_id,
            signal_version: signal_version.to_string(),
            computed_data: data.clone(),
            created_at: now,
        };
        let idx = tables.signals.len();
        tables.signals.push(record.clone());
        tables.signal_keys.insert(key, idx);
        Ok(record)
    }

    async fn upsert_score(&self, score: &NewScore) -> Result<ScoreRecord, StoreError> {
        let mut tables = self.tables.lock().await;
        if !tables.signals.iter().any(|s| s.id == score.signal_id) {
            return Err(StoreError::UnknownSignal(score.signal_id));
        }
        let now = Utc::now();
        let key = (score.user_id, score.signal_id, score.model_version.clone());

        if let Some(&idx) = tables.score_keys.get(&key) {
            let record = &mut tables.scores[idx];
            record.brand_score = score.brand_score;
            record.sub_scores = score.sub_scores;
            record.created_at = now;
            return Ok(record.clone());
        }

        let record = ScoreRecord {
            id: tables.next_id(),
            user_id: score.user_id,
            signal_id: score.signal_id,
            model_version: score.model_version.clone(),
            brand_score: score.brand_score,
            sub_scores: score.sub_scores,
            created_at: now,
        };
        let idx = tables.scores.len();
        tables.scores.push(record.clone());
        tables.score_keys.insert(key, idx);
        Ok(record)
    }

    async fn latest_signal(&self, user_id: Uuid) -> Result<Option<SignalRecord>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .signals
            .iter()
            .filter(|s| s.user_id == user_id)
            .max_by_key(|s| (s.created_at, s.id))
            .cloned())
    }

    async fn latest_score(&self, user_id: Uuid) -> Result<Option<ScoreRecord>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .scores
            .iter()
            .filter(|s| s.user_id == user_id)
            .max_by_key(|s| (s.created_at, s.id))
            .cloned())
    }
}
