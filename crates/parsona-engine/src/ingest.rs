//! Ingestion orchestrator: store new payloads, then recompute signal and score.

use chrono::Utc;
use parsona_core::{AnalyticsStore, NewRawActivity, ScoreRecord, SignalRecord};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::EngineError;
use crate::extractor;
use crate::scorer;
use crate::simulate::simulated_activities;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Generate a synthetic batch when a sync arrives with no activities.
    pub simulate_on_empty: bool,
}

/// Signal and score written by one pipeline pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineResult {
    pub signal: SignalRecord,
    pub score: ScoreRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncOutcome {
    /// Activities actually inserted; duplicates are not counted.
    pub new_items: usize,
    /// `None` when the user has no stored activities.
    #[serde(flatten)]
    pub pipeline: Option<PipelineResult>,
}

/// Store `activities` for `user_id` and recompute the user's signal and score.
///
/// Every payload is fingerprinted before anything is written; a payload whose
/// fingerprint already exists is skipped. The signal is then rebuilt from the
/// user's full activity set, so repeating a sync converges on the same result.
///
/// An empty `activities` list either triggers a simulated batch or returns
/// immediately with `new_items == 0`, depending on
/// [`SyncOptions::simulate_on_empty`].
///
/// # Errors
///
/// Returns [`EngineError::InvalidPayload`] if any payload is not a JSON object
/// (nothing is stored in that case), or [`EngineError::Store`] on storage
/// failure.
pub async fn sync_activities<S: AnalyticsStore + ?Sized>(
    store: &S,
    options: &SyncOptions,
    user_id: Uuid,
    activities: Vec<Value>,
) -> Result<SyncOutcome, EngineError> {
    let now = Utc::now();

    let activities = if activities.is_empty() {
        if !options.simulate_on_empty {
            tracing::info!(user_id = %user_id, "no activities provided; nothing to sync");
            return Ok(SyncOutcome {
                new_items: 0,
                pipeline: None,
            });
        }
        tracing::info!(user_id = %user_id, "no activities provided; generating simulated batch");
        simulated_activities(&mut rand::rng(), now)
    } else {
        activities
    };

    let prepared = activities
        .into_iter()
        .enumerate()
        .map(|(index, payload)| {
            NewRawActivity::from_payload(user_id, payload, now)
                .map_err(|source| EngineError::InvalidPayload { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut new_items = 0;
    for activity in &prepared {
        if store.insert_activity(activity).await? {
            new_items += 1;
        } else {
            tracing::debug!(
                user_id = %user_id,
                content_hash = %activity.content_hash,
                "duplicate activity skipped"
            );
        }
    }

    tracing::info!(
        user_id = %user_id,
        offered = prepared.len(),
        new_items,
        "activities stored"
    );

    let pipeline = run_pipeline(store, user_id).await?;
    Ok(SyncOutcome {
        new_items,
        pipeline,
    })
}

/// Recompute signal then score from every activity `user_id` owns.
///
/// Returns `Ok(None)` without writing anything when the user has no activities.
///
/// # Errors
///
/// Returns [`EngineError::Store`] on storage failure.
pub async fn run_pipeline<S: AnalyticsStore + ?Sized>(
    store: &S,
    user_id: Uuid,
) -> Result<Option<PipelineResult>, EngineError> {
    let activities = store.list_activities(user_id).await?;
    if activities.is_empty() {
        tracing::info!(user_id = %user_id, "no data; skipping signal and score");
        return Ok(None);
    }

    let signal = extractor::process(store, user_id, &activities).await?;
    let score = scorer::calculate(store, user_id, &signal).await?;
    Ok(Some(PipelineResult { signal, score }))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::memory::MemoryStore;

    #[tokio::test]
    async fn non_object_payload_stores_nothing() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let err = sync_activities(
            &store,
            &SyncOptions::default(),
            user,
            vec![json!({"text": "valid"}), json!("not an object")],
        )
        .await
        .unwrap_err();

        assert!(matches!(err, EngineError::InvalidPayload { index: 1, .. }));
        assert_eq!(store.activity_count(user).await, 0);
    }

    #[tokio::test]
    async fn pipeline_on_unknown_user_is_none() {
        let store = MemoryStore::new();
        assert!(run_pipeline(&store, Uuid::new_v4()).await.unwrap().is_none());
    }

    #[test]
    fn outcome_serializes_flat() {
        let outcome = SyncOutcome {
            new_items: 0,
            pipeline: None,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json, json!({"new_items": 0}));
    }
}
