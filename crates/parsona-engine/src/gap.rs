//! Persona gap analysis. Stateless; reports are never persisted.

use parsona_core::{Benchmark, BenchmarkTable, PersonaMatch, SignalData};
use serde::{Deserialize, Serialize};

/// Alignment points lost per detected gap.
pub const GAP_PENALTY: i32 = 15;
const MAX_LISTED_TOPICS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GapKind {
    /// Posting less often than the persona's maximum gap allows.
    Cadence { delta: f64 },
    /// Required topics absent from the user's top topics.
    Topic { missing: Vec<String> },
    /// Engagement ratio below the persona minimum.
    Quality { current: f64, target: f64 },
}

impl GapKind {
    /// Wire tag of the variant.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cadence { .. } => "CADENCE",
            Self::Topic { .. } => "TOPIC",
            Self::Quality { .. } => "QUALITY",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    #[serde(flatten)]
    pub kind: GapKind,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapReport {
    /// Persona as requested by the caller.
    pub target_persona: String,
    /// Persona whose benchmark was applied; differs on fallback.
    pub benchmark_persona: String,
    pub persona_match: PersonaMatch,
    /// Ordered by severity: cadence, topic, quality.
    pub gaps: Vec<Gap>,
    pub benchmarks: Benchmark,
    /// `100 - 15 * gaps.len()`. Not clamped.
    pub score: i32,
}

/// Compare a signal against the benchmark for `target_persona`.
///
/// Unknown personas use the table's default benchmark; the report records
/// which benchmark was applied in `benchmark_persona` and `persona_match`.
#[must_use]
pub fn analyze(data: &SignalData, target_persona: &str, table: &BenchmarkTable) -> GapReport {
    let resolved = table.resolve(target_persona);
    if resolved.matched == PersonaMatch::DefaultFallback {
        tracing::warn!(
            persona = target_persona,
            fallback = resolved.persona,
            "unknown persona; using default benchmark"
        );
    }
    let benchmark = resolved.benchmark;

    let gaps: Vec<Gap> = [
        cadence_gap(data, benchmark),
        topic_gap(data, benchmark),
        quality_gap(data, benchmark),
    ]
    .into_iter()
    .flatten()
    .collect();

    let gap_count = i32::try_from(gaps.len()).unwrap_or(i32::MAX);
    GapReport {
        target_persona: target_persona.to_string(),
        benchmark_persona: resolved.persona.to_string(),
        persona_match: resolved.matched,
        score: 100 - GAP_PENALTY.saturating_mul(gap_count),
        gaps,
        benchmarks: benchmark.clone(),
    }
}

fn cadence_gap(data: &SignalData, benchmark: &Benchmark) -> Option<Gap> {
    let user_gap = data.cadence.average_gap_days;
    if user_gap <= benchmark.max_cadence_gap {
        return None;
    }
    Some(Gap {
        kind: GapKind::Cadence {
            delta: round2(user_gap - benchmark.max_cadence_gap),
        },
        severity: Severity::High,
        message: format!(
            "You are posting every {user_gap} days. Target is every {} days.",
            benchmark.max_cadence_gap
        ),
    })
}

fn topic_gap(data: &SignalData, benchmark: &Benchmark) -> Option<Gap> {
    let missing: Vec<String> = benchmark
        .required_topics
        .iter()
        .filter(|required| !data.topics.iter().any(|t| &t.name == *required))
        .cloned()
        .collect();
    if missing.is_empty() {
        return None;
    }
    let listed = missing
        .iter()
        .take(MAX_LISTED_TOPICS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    Some(Gap {
        message: format!("You are missing key topics: {listed}."),
        kind: GapKind::Topic { missing },
        severity: Severity::Medium,
    })
}

fn quality_gap(data: &SignalData, benchmark: &Benchmark) -> Option<Gap> {
    let current = data.engagement.ratio;
    if current >= benchmark.min_engagement_ratio {
        return None;
    }
    Some(Gap {
        kind: GapKind::Quality {
            current,
            target: benchmark.min_engagement_ratio,
        },
        severity: Severity::Low,
        message: "Your engagement is passive. Aim for more comments and discussions relative to likes."
            .to_string(),
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use parsona_core::{Cadence, Engagement, Topic, DEFAULT_PERSONA};

    use super::*;

    fn topics(names: &[&str]) -> Vec<Topic> {
        names
            .iter()
            .map(|n| Topic {
                name: (*n).to_string(),
                count: 1,
                frequency: 0.1,
            })
            .collect()
    }

    fn aligned_founder() -> SignalData {
        SignalData {
            topics: topics(&["vision", "hiring", "strategy", "growth", "product"]),
            cadence: Cadence {
                average_gap_days: 2.0,
                variance: 0.5,
            },
            engagement: Engagement {
                likes_per_post: 40.0,
                comments_per_post: 8.0,
                ratio: 1.0,
            },
            ..SignalData::default()
        }
    }

    #[test]
    fn all_three_gaps_against_founder() {
        let data = SignalData {
            cadence: Cadence {
                average_gap_days: 10.0,
                variance: 0.0,
            },
            ..SignalData::default()
        };
        let report = analyze(&data, "FOUNDER", &BenchmarkTable::builtin());

        assert_eq!(report.gaps.len(), 3);
        assert_eq!(report.score, 55);
        assert_eq!(
            report.gaps[0].kind,
            GapKind::Cadence { delta: 5.0 }
        );
        assert_eq!(report.gaps[0].severity, Severity::High);
        assert_eq!(
            report.gaps[0].message,
            "You are posting every 10 days. Target is every 5 days."
        );
        assert!(matches!(report.gaps[1].kind, GapKind::Topic { ref missing } if missing.len() == 5));
        assert_eq!(report.gaps[1].severity, Severity::Medium);
        assert_eq!(
            report.gaps[1].message,
            "You are missing key topics: vision, hiring, strategy."
        );
        assert_eq!(
            report.gaps[2].kind,
            GapKind::Quality {
                current: 0.0,
                target: 0.05
            }
        );
        assert_eq!(report.gaps[2].severity, Severity::Low);
    }

    #[test]
    fn aligned_signal_has_no_gaps() {
        let report = analyze(&aligned_founder(), "FOUNDER", &BenchmarkTable::builtin());
        assert!(report.gaps.is_empty());
        assert_eq!(report.score, 100);
        assert_eq!(report.persona_match, PersonaMatch::Exact);
    }

    #[test]
    fn cadence_at_the_limit_is_not_a_gap() {
        let mut data = aligned_founder();
        data.cadence.average_gap_days = 5.0;
        assert!(analyze(&data, "FOUNDER", &BenchmarkTable::builtin()).gaps.is_empty());
    }

    #[test]
    fn ratio_at_the_minimum_is_not_a_gap() {
        let mut data = aligned_founder();
        data.engagement.ratio = 0.05;
        assert!(analyze(&data, "FOUNDER", &BenchmarkTable::builtin()).gaps.is_empty());
    }

    #[test]
    fn topic_gap_keeps_full_missing_list() {
        let mut data = aligned_founder();
        data.topics = topics(&["hiring"]);
        let report = analyze(&data, "FOUNDER", &BenchmarkTable::builtin());
        assert_eq!(report.gaps.len(), 1);
        assert_eq!(
            report.gaps[0].kind,
            GapKind::Topic {
                missing: vec![
                    "vision".to_string(),
                    "strategy".to_string(),
                    "growth".to_string(),
                    "product".to_string()
                ]
            }
        );
        assert_eq!(report.score, 85);
    }

    #[test]
    fn unknown_persona_uses_founder_benchmark() {
        let table = BenchmarkTable::builtin();
        let report = analyze(&aligned_founder(), "ASTRONAUT", &table);
        assert_eq!(report.target_persona, "ASTRONAUT");
        assert_eq!(report.benchmark_persona, DEFAULT_PERSONA);
        assert_eq!(report.persona_match, PersonaMatch::DefaultFallback);
        assert_eq!(&report.benchmarks, table.get(DEFAULT_PERSONA).unwrap());
        assert!(report.gaps.is_empty());
    }

    #[test]
    fn persona_thresholds_differ() {
        let mut data = aligned_founder();
        data.cadence.average_gap_days = 8.0;
        let table = BenchmarkTable::builtin();
        let founder = analyze(&data, "FOUNDER", &table);
        let leader = analyze(&data, "ENGINEER_LEADER", &table);
        assert!(founder
            .gaps
            .iter()
            .any(|g| matches!(g.kind, GapKind::Cadence { .. })));
        assert!(!leader
            .gaps
            .iter()
            .any(|g| matches!(g.kind, GapKind::Cadence { .. })));
    }

    #[test]
    fn gaps_serialize_with_type_tags() {
        let data = SignalData {
            cadence: Cadence {
                average_gap_days: 7.25,
                variance: 0.0,
            },
            ..aligned_founder()
        };
        let report = analyze(&data, "FOUNDER", &BenchmarkTable::builtin());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["gaps"][0]["type"], "CADENCE");
        assert_eq!(json["gaps"][0]["severity"], "HIGH");
        assert_eq!(json["gaps"][0]["delta"], 2.25);
        assert_eq!(json["persona_match"], "exact");
        assert_eq!(json["score"], 85);

        let back: GapReport = serde_json::from_value(json).unwrap();
        assert_eq!(back, report);
    }
}
