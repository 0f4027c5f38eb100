//! Human-readable explanations of a gap report.
//!
//! A generator (usually [`crate::GeminiClient`]) turns a prompt into prose.
//! Without one, or when it fails, a canned explanation built from the top gap
//! is returned instead, so callers always get text back.

use async_trait::async_trait;
use parsona_core::SignalData;
use serde::{Deserialize, Serialize};

use crate::error::ExplainError;
use crate::gap::GapReport;

const DEFAULT_INDUSTRY: &str = "Tech";

/// Who the explanation is for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplainContext {
    pub display_name: Option<String>,
    /// Free-form career goal; the target persona is used when absent.
    pub goal: Option<String>,
    pub industry: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplanationSource {
    Generated,
    Canned,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    pub text: String,
    pub source: ExplanationSource,
}

#[async_trait]
pub trait ExplanationGenerator: Send + Sync {
    /// Generate prose for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, ExplainError>;
}

/// Explain `report`, preferring `generator` and falling back to
/// [`canned_explanation`] when there is no generator or it fails.
pub async fn explain_gap(
    generator: Option<&dyn ExplanationGenerator>,
    report: &GapReport,
    signal: &SignalData,
    context: &ExplainContext,
) -> Explanation {
    let Some(generator) = generator else {
        return canned(report);
    };

    let prompt = build_prompt(report, signal, context);
    match generator.generate(&prompt).await {
        Ok(text) => Explanation {
            text,
            source: ExplanationSource::Generated,
        },
        Err(e) => {
            tracing::warn!(error = %e, "explanation generator failed; using canned text");
            canned(report)
        }
    }
}

/// Deterministic explanation derived from the highest-severity gap.
#[must_use]
pub fn canned_explanation(report: &GapReport) -> String {
    match report.gaps.first() {
        None => "You are perfectly aligned with your target persona. Your consistency and topic authority are hitting all benchmarks.".to_string(),
        Some(top) => format!(
            "To align with the {} persona, you need to address your {} gap. {} Increasing this will directly impact your Authority score.",
            report.target_persona,
            top.kind.label(),
            top.message
        ),
    }
}

/// Prompt describing the user's signals and gaps for a text generator.
#[must_use]
pub fn build_prompt(report: &GapReport, signal: &SignalData, context: &ExplainContext) -> String {
    let name = context.display_name.as_deref().unwrap_or("Unknown");
    let goal = context.goal.as_deref().unwrap_or(&report.target_persona);
    let industry = context.industry.as_deref().unwrap_or(DEFAULT_INDUSTRY);

    let topics = signal
        .topics
        .iter()
        .map(|topic| format!("{} ({:.1}%)", topic.name, topic.frequency * 100.0))
        .collect::<Vec<_>>()
        .join(", ");
    let gaps = serde_json::to_string(&report.gaps).unwrap_or_else(|_| "[]".to_string());

    format!(
        "You are Parsona Strategic AI, a deterministic career analyst. \
Give blunt, data-backed guidance that helps people reach a specific career target.

USER CONTEXT:
- Current role/identity: {name}
- Target career goal: {goal}
- Target industry: {industry}

SIGNALS:
- Posting cadence: every {gap} days (variance {variance}).
- Topic focus: {topics}.
- Engagement quality: {ratio} (likes per post {likes}, comments per post {comments}).

IDENTIFIED GAPS:
{gaps}

INSTRUCTION:
Compare the signals against the target career goal in 2-3 structured sentences.
Quantify the delta and give one direct action to close the gap.",
        gap = signal.cadence.average_gap_days,
        variance = signal.cadence.variance,
        ratio = signal.engagement.ratio,
        likes = signal.engagement.likes_per_post,
        comments = signal.engagement.comments_per_post,
    )
}

fn canned(report: &GapReport) -> Explanation {
    Explanation {
        text: canned_explanation(report),
        source: ExplanationSource::Canned,
    }
}
