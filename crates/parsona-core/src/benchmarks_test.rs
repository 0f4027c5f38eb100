use std::path::Path;

use super::*;

#[test]
fn builtin_table_has_known_personas() {
    let table = BenchmarkTable::builtin();
    let names: Vec<&str> = table.personas().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["ENGINEER_LEADER", "FOUNDER", "FREELANCER"]);
}

#[test]
fn builtin_founder_thresholds() {
    let table = BenchmarkTable::builtin();
    let founder = table.get("FOUNDER").expect("founder exists");
    assert!((founder.max_cadence_gap - 5.0).abs() < f64::EPSILON);
    assert!((founder.min_engagement_ratio - 0.05).abs() < f64::EPSILON);
    assert_eq!(
        founder.required_topics,
        vec!["vision", "hiring", "strategy", "growth", "product"]
    );
}

#[test]
fn resolve_exact_persona() {
    let table = BenchmarkTable::builtin();
    let resolved = table.resolve("ENGINEER_LEADER");
    assert_eq!(resolved.persona, "ENGINEER_LEADER");
    assert_eq!(resolved.matched, PersonaMatch::Exact);
    assert!((resolved.benchmark.max_cadence_gap - 10.0).abs() < f64::EPSILON);
}

#[test]
fn resolve_is_case_insensitive() {
    let table = BenchmarkTable::builtin();
    let resolved = table.resolve("  freelancer ");
    assert_eq!(resolved.persona, "FREELANCER");
    assert_eq!(resolved.matched, PersonaMatch::Exact);
}

#[test]
fn resolve_unknown_persona_falls_back_to_founder() {
    let table = BenchmarkTable::builtin();
    let resolved = table.resolve("CONSULTANT");
    assert_eq!(resolved.persona, DEFAULT_PERSONA);
    assert_eq!(resolved.matched, PersonaMatch::DefaultFallback);
    assert_eq!(resolved.benchmark, table.get(DEFAULT_PERSONA).unwrap());
}

#[test]
fn resolve_empty_persona_falls_back_to_founder() {
    let table = BenchmarkTable::builtin();
    assert_eq!(table.resolve("").matched, PersonaMatch::DefaultFallback);
}

#[test]
fn new_requires_default_persona() {
    let mut personas = BTreeMap::new();
    personas.insert("FREELANCER".to_string(), founder());
    let err = BenchmarkTable::new(personas).unwrap_err();
    assert!(err.to_string().contains("FOUNDER"), "got: {err}");
}

#[test]
fn new_rejects_inverted_cadence_bounds() {
    let mut bad = founder();
    bad.min_cadence_gap = 9.0;
    let mut personas = BTreeMap::new();
    personas.insert("founder".to_string(), bad);
    let err = BenchmarkTable::new(personas).unwrap_err();
    assert!(err.to_string().contains("above max_cadence_gap"), "got: {err}");
}

#[test]
fn new_rejects_negative_ratio() {
    let mut bad = founder();
    bad.min_engagement_ratio = -0.1;
    let mut personas = BTreeMap::new();
    personas.insert("FOUNDER".to_string(), bad);
    let err = BenchmarkTable::new(personas).unwrap_err();
    assert!(err.to_string().contains("min_engagement_ratio"), "got: {err}");
}

#[test]
fn new_rejects_keys_colliding_after_normalization() {
    let mut personas = BTreeMap::new();
    personas.insert("FOUNDER".to_string(), founder());
    personas.insert("founder".to_string(), founder());
    let err = BenchmarkTable::new(personas).unwrap_err();
    assert!(err.to_string().contains("duplicate persona"), "got: {err}");
}

#[test]
fn new_rejects_duplicate_required_topics() {
    let mut bad = founder();
    bad.required_topics.push("vision".to_string());
    let mut personas = BTreeMap::new();
    personas.insert("FOUNDER".to_string(), bad);
    let err = BenchmarkTable::new(personas).unwrap_err();
    assert!(err.to_string().contains("twice"), "got: {err}");
}

#[test]
fn yaml_override_parses() {
    let yaml = r"
personas:
  founder:
    min_cadence_gap: 1
    max_cadence_gap: 4
    required_topics: [vision, fundraising]
    min_authority_score: 75
    min_engagement_ratio: 0.08
  CONSULTANT:
    min_cadence_gap: 3
    max_cadence_gap: 7
    required_topics: []
    min_authority_score: 65
    min_engagement_ratio: 0.04
";
    let file: BenchmarksFile = serde_yaml::from_str(yaml).expect("parse");
    let table = BenchmarkTable::try_from(file).expect("valid table");
    assert_eq!(table.resolve("consultant").matched, PersonaMatch::Exact);
    let founder = table.get("FOUNDER").unwrap();
    assert_eq!(founder.required_topics, vec!["vision", "fundraising"]);
    assert!((founder.max_cadence_gap - 4.0).abs() < f64::EPSILON);
}

#[test]
fn to_file_round_trips_through_validation() {
    let table = BenchmarkTable::builtin();
    let rebuilt = BenchmarkTable::try_from(table.to_file()).unwrap();
    assert_eq!(rebuilt, table);
}

#[test]
fn load_benchmarks_missing_file_is_io_error() {
    let err = load_benchmarks(Path::new("/nonexistent/benchmarks.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::BenchmarksFileIo { .. }));
}

#[test]
fn load_benchmarks_from_real_file() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("config")
        .join("benchmarks.yaml");
    assert!(
        path.exists(),
        "benchmarks.yaml missing at {path:?}, required for this test"
    );
    let table = load_benchmarks(&path).expect("failed to load benchmarks.yaml");
    assert_eq!(table, BenchmarkTable::builtin());
}
