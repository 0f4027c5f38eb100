//! Per-persona benchmark thresholds.
//!
//! The table is a plain value handed to the gap analyzer at call time. The
//! built-in table covers `FOUNDER`, `ENGINEER_LEADER` and `FREELANCER`; a YAML
//! file may replace it per deployment.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Persona used when the requested one is unknown or absent.
pub const DEFAULT_PERSONA: &str = "FOUNDER";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Benchmark {
    /// Shortest expected gap between posts, in days.
    pub min_cadence_gap: f64,
    /// Longest acceptable gap between posts, in days.
    pub max_cadence_gap: f64,
    pub required_topics: Vec<String>,
    pub min_authority_score: f64,
    pub min_engagement_ratio: f64,
}

/// On-disk shape of a benchmarks override file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarksFile {
    pub personas: BTreeMap<String, Benchmark>,
}

/// How a requested persona was matched against the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaMatch {
    /// The persona exists in the table.
    Exact,
    /// The persona is unknown; the [`DEFAULT_PERSONA`] benchmark was used.
    DefaultFallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedBenchmark<'a> {
    /// Table key of the benchmark actually used.
    pub persona: &'a str,
    pub benchmark: &'a Benchmark,
    pub matched: PersonaMatch,
}

/// Validated persona -> benchmark lookup. Always contains [`DEFAULT_PERSONA`].
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkTable {
    personas: BTreeMap<String, Benchmark>,
    fallback: Benchmark,
}

impl BenchmarkTable {
    /// Build a table from persona entries, validating every benchmark.
    ///
    /// Persona keys are normalized to upper case.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the default persona is missing,
    /// keys collide after normalization, or any threshold is out of range.
    pub fn new(personas: BTreeMap<String, Benchmark>) -> Result<Self, ConfigError> {
        let mut normalized = BTreeMap::new();
        for (name, benchmark) in personas {
            let key = normalize_persona(&name);
            if key.is_empty() {
                return Err(ConfigError::Validation(
                    "persona name must be non-empty".to_string(),
                ));
            }
            validate_benchmark(&key, &benchmark)?;
            if normalized.insert(key.clone(), benchmark).is_some() {
                return Err(ConfigError::Validation(format!(
                    "duplicate persona: '{key}'"
                )));
            }
        }

        let fallback = normalized.get(DEFAULT_PERSONA).cloned().ok_or_else(|| {
            ConfigError::Validation(format!(
                "benchmark table must define the default persona '{DEFAULT_PERSONA}'"
            ))
        })?;

        Ok(Self {
            personas: normalized,
            fallback,
        })
    }

    /// The built-in benchmark table.
    #[must_use]
    pub fn builtin() -> Self {
        let fallback = founder();
        let mut personas = BTreeMap::new();
        personas.insert(DEFAULT_PERSONA.to_string(), fallback.clone());
        personas.insert(
            "ENGINEER_LEADER".to_string(),
            Benchmark {
                min_cadence_gap: 5.0,
                max_cadence_gap: 10.0,
                required_topics: topics(&["architecture", "engineering", "teams", "scale", "systems"]),
                min_authority_score: 80.0,
                min_engagement_ratio: 0.02,
            },
        );
        personas.insert(
            "FREELANCER".to_string(),
            Benchmark {
                min_cadence_gap: 1.0,
                max_cadence_gap: 3.0,
                required_topics: topics(&["work", "client", "design", "case study", "available"]),
                min_authority_score: 60.0,
                min_engagement_ratio: 0.1,
            },
        );
        Self { personas, fallback }
    }

    #[must_use]
    pub fn get(&self, persona: &str) -> Option<&Benchmark> {
        self.personas.get(&normalize_persona(persona))
    }

    /// Look up `persona`, falling back to [`DEFAULT_PERSONA`] when unknown.
    #[must_use]
    pub fn resolve(&self, persona: &str) -> ResolvedBenchmark<'_> {
        match self.personas.get_key_value(&normalize_persona(persona)) {
            Some((key, benchmark)) => ResolvedBenchmark {
                persona: key,
                benchmark,
                matched: PersonaMatch::Exact,
            },
            None => ResolvedBenchmark {
                persona: DEFAULT_PERSONA,
                benchmark: &self.fallback,
                matched: PersonaMatch::DefaultFallback,
            },
        }
    }

    pub fn personas(&self) -> impl Iterator<Item = (&str, &Benchmark)> {
        self.personas.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn to_file(&self) -> BenchmarksFile {
        BenchmarksFile {
            personas: self.personas.clone(),
        }
    }
}

impl Default for BenchmarkTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TryFrom<BenchmarksFile> for BenchmarkTable {
    type Error = ConfigError;

    fn try_from(file: BenchmarksFile) -> Result<Self, Self::Error> {
        Self::new(file.personas)
    }
}

/// Load and validate a benchmark table from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_benchmarks(path: &Path) -> Result<BenchmarkTable, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::BenchmarksFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: BenchmarksFile = serde_yaml::from_str(&content)?;
    BenchmarkTable::try_from(file)
}

fn normalize_persona(name: &str) -> String {
    name.trim().to_ascii_uppercase()
}

fn validate_benchmark(persona: &str, benchmark: &Benchmark) -> Result<(), ConfigError> {
    let non_negative = [
        ("min_cadence_gap", benchmark.min_cadence_gap),
        ("max_cadence_gap", benchmark.max_cadence_gap),
        ("min_authority_score", benchmark.min_authority_score),
        ("min_engagement_ratio", benchmark.min_engagement_ratio),
    ];
    for (field, value) in non_negative {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::Validation(format!(
                "persona '{persona}' has invalid {field} {value}; must be a non-negative number"
            )));
        }
    }

    if benchmark.min_cadence_gap > benchmark.max_cadence_gap {
        return Err(ConfigError::Validation(format!(
            "persona '{persona}' has min_cadence_gap {} above max_cadence_gap {}",
            benchmark.min_cadence_gap, benchmark.max_cadence_gap
        )));
    }

    if benchmark.min_authority_score > 100.0 {
        return Err(ConfigError::Validation(format!(
            "persona '{persona}' has min_authority_score {} above 100",
            benchmark.min_authority_score
        )));
    }

    let mut seen = HashSet::new();
    for topic in &benchmark.required_topics {
        if topic.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "persona '{persona}' has an empty required topic"
            )));
        }
        if !seen.insert(topic.as_str()) {
            return Err(ConfigError::Validation(format!(
                "persona '{persona}' lists required topic '{topic}' twice"
            )));
        }
    }

    Ok(())
}

fn founder() -> Benchmark {
    Benchmark {
        min_cadence_gap: 2.0,
        max_cadence_gap: 5.0,
        required_topics: topics(&["vision", "hiring", "strategy", "growth", "product"]),
        min_authority_score: 70.0,
        min_engagement_ratio: 0.05,
    }
}

fn topics(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| (*s).to_string()).collect()
}

#[cfg(test)]
#[path = "benchmarks_test.rs"]
mod tests;
