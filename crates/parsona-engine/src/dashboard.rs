//! Read-side view combining the latest score, signal and gap report.

use parsona_core::{AnalyticsStore, BenchmarkTable, SignalData, SubScores};
use serde::Serialize;
use uuid::Uuid;

use crate::error::EngineError;
use crate::gap::{self, GapReport};

pub const EMPTY_DASHBOARD_MESSAGE: &str = "No data yet. Connect LinkedIn.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub brand_score: u8,
    pub sub_scores: SubScores,
    pub computed_data: SignalData,
    pub target_persona: String,
    pub identity_alignment_score: Option<i32>,
    pub gap_analysis: Option<GapReport>,
    /// `Target: <persona>` followed by one line per gap.
    pub insights: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DashboardView {
    fn empty(target_persona: &str) -> Self {
        Self {
            brand_score: 0,
            sub_scores: SubScores::default(),
            computed_data: SignalData::default(),
            target_persona: target_persona.to_string(),
            identity_alignment_score: None,
            gap_analysis: None,
            insights: Vec::new(),
            message: Some(EMPTY_DASHBOARD_MESSAGE.to_string()),
        }
    }
}

/// Build the dashboard for `user_id` against `target_persona`.
///
/// Returns the empty view until both a signal and a score exist.
///
/// # Errors
///
/// Returns [`EngineError::Store`] on storage failure.
pub async fn dashboard<S: AnalyticsStore + ?Sized>(
    store: &S,
    table: &BenchmarkTable,
    user_id: Uuid,
    target_persona: &str,
) -> Result<DashboardView, EngineError> {
    let score = store.latest_score(user_id).await?;
    let signal = store.latest_signal(user_id).await?;
    let (Some(score), Some(signal)) = (score, signal) else {
        return Ok(DashboardView::empty(target_persona));
    };

    let report = gap::analyze(&signal.computed_data, target_persona, table);
    let insights = std::iter::once(format!("Target: {target_persona}"))
        .chain(report.gaps.iter().map(|g| g.message.clone()))
        .collect();

    Ok(DashboardView {
        brand_score: score.brand_score,
        sub_scores: score.sub_scores,
        computed_data: signal.computed_data,
        target_persona: target_persona.to_string(),
        identity_alignment_score: Some(report.score),
        gap_analysis: Some(report),
        insights,
        message: None,
    })
}

#[cfg(test)]
mod tests {
    use parsona_core::{DEFAULT_PERSONA, SIGNAL_VERSION};

    use super::*;
    use crate::memory::MemoryStore;
    use crate::scorer;

    #[tokio::test]
    async fn empty_state_without_data() {
        let store = MemoryStore::new();
        let view = dashboard(&store, &BenchmarkTable::builtin(), Uuid::new_v4(), DEFAULT_PERSONA)
            .await
            .unwrap();
        assert_eq!(view.brand_score, 0);
        assert_eq!(view.message.as_deref(), Some(EMPTY_DASHBOARD_MESSAGE));
        assert!(view.gap_analysis.is_none());
        assert!(view.insights.is_empty());
    }

    #[tokio::test]
    async fn signal_without_score_is_still_empty() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        store
            .upsert_signal(user, SIGNAL_VERSION, &SignalData::default())
            .await
            .unwrap();
        let view = dashboard(&store, &BenchmarkTable::builtin(), user, DEFAULT_PERSONA)
            .await
            .unwrap();
        assert!(view.message.is_some());
    }

    #[tokio::test]
    async fn insights_lead_with_target() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let signal = store
            .upsert_signal(user, SIGNAL_VERSION, &SignalData::default())
            .await
            .unwrap();
        scorer::calculate(&store, user, &signal).await.unwrap();

        let view = dashboard(&store, &BenchmarkTable::builtin(), user, "FREELANCER")
            .await
            .unwrap();
        assert_eq!(view.brand_score, 30);
        assert_eq!(view.insights[0], "Target: FREELANCER");
        // empty signal misses topics and quality for every persona
        assert_eq!(view.insights.len(), 3);
        assert_eq!(view.identity_alignment_score, Some(70));
        assert!(view.message.is_none());
    }
}
