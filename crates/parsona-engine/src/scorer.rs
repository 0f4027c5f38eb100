//! Weighted brand score over a signal snapshot.

use parsona_core::{
    AnalyticsStore, Cadence, Engagement, NewScore, ScoreRecord, SignalData, SignalRecord,
    SubScores, Topic, MODEL_VERSION,
};
use uuid::Uuid;

use crate::error::EngineError;

pub const AUTHORITY_WEIGHT: f64 = 0.5;
pub const CONSISTENCY_WEIGHT: f64 = 0.3;
pub const ENGAGEMENT_WEIGHT: f64 = 0.2;

/// Average gap (days) above which consistency loses its first penalty.
const SLOW_CADENCE_DAYS: f64 = 7.0;
/// Average gap (days) above which consistency loses a second penalty.
const DORMANT_CADENCE_DAYS: f64 = 14.0;
const ERRATIC_VARIANCE: f64 = 5.0;
const CADENCE_PENALTY: f64 = 20.0;

const MAX_SCORE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub brand_score: u8,
    pub sub_scores: SubScores,
}

/// Score a signal. Pure: no clock, no randomness.
///
/// Each sub-score is clamped to `[0, 100]`; the overall score is the floor of
/// their weighted sum (authority 0.5, consistency 0.3, engagement 0.2).
#[must_use]
pub fn compute_score(data: &SignalData) -> ScoreBreakdown {
    let consistency = consistency_score(&data.cadence);
    let authority = authority_score(&data.topics, &data.engagement);
    let engagement = engagement_score(&data.engagement);

    let weighted = authority * AUTHORITY_WEIGHT
        + consistency * CONSISTENCY_WEIGHT
        + engagement * ENGAGEMENT_WEIGHT;

    ScoreBreakdown {
        brand_score: to_percent(weighted),
        sub_scores: SubScores {
            consistency: to_percent(consistency),
            authority: to_percent(authority),
            engagement: to_percent(engagement),
        },
    }
}

/// Score `signal` and upsert the result keyed by `(user, signal, model version)`.
///
/// # Errors
///
/// Returns [`EngineError::Store`] if the upsert fails.
pub async fn calculate<S: AnalyticsStore + ?Sized>(
    store: &S,
    user_id: Uuid,
    signal: &SignalRecord,
) -> Result<ScoreRecord, EngineError> {
    let breakdown = compute_score(&signal.computed_data);
    let record = store
        .upsert_score(&NewScore {
            user_id,
            signal_id: signal.id,
            model_version: MODEL_VERSION.to_string(),
            brand_score: breakdown.brand_score,
            sub_scores: breakdown.sub_scores,
        })
        .await?;

    tracing::info!(
        user_id = %user_id,
        signal_id = signal.id,
        brand_score = record.brand_score,
        "score recomputed"
    );
    Ok(record)
}

fn consistency_score(cadence: &Cadence) -> f64 {
    let mut score = MAX_SCORE;
    if cadence.average_gap_days > SLOW_CADENCE_DAYS {
        score -= CADENCE_PENALTY;
    }
    if cadence.average_gap_days > DORMANT_CADENCE_DAYS {
        score -= CADENCE_PENALTY;
    }
    if cadence.variance > ERRATIC_VARIANCE {
        score -= CADENCE_PENALTY;
    }
    score.max(0.0)
}

/// Topic focus plus discussion depth.
fn authority_score(topics: &[Topic], engagement: &Engagement) -> f64 {
    let focus = topics.first().map_or(0.0, |t| t.frequency * 200.0);
    (focus + engagement.comments_per_post * 10.0).clamp(0.0, MAX_SCORE)
}

fn engagement_score(engagement: &Engagement) -> f64 {
    (engagement.likes_per_post + engagement.comments_per_post * 2.0).clamp(0.0, MAX_SCORE)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_percent(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.floor().clamp(0.0, MAX_SCORE) as u8
}
