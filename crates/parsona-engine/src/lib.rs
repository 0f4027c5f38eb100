//! Parsona analytics engine.
//!
//! Turns a user's raw activity stream into a deterministic signal snapshot,
//! scores it, and compares it against persona benchmarks:
//!
//! 1. [`ingest::sync_activities`] fingerprints and stores new payloads.
//! 2. [`extractor::process`] recomputes the signal from the full activity set.
//! 3. [`scorer::calculate`] derives the brand score from that signal.
//! 4. [`gap::analyze`] compares a signal against a persona, on demand.

pub mod dashboard;
pub mod error;
pub mod explain;
pub mod extractor;
pub mod gap;
pub mod gemini;
pub mod ingest;
pub mod memory;
pub mod scorer;
pub mod simulate;

pub use dashboard::{dashboard, DashboardView};
pub use error::{EngineError, ExplainError};
pub use explain::{
    build_prompt, canned_explanation, explain_gap, ExplainContext, Explanation, ExplanationGenerator,
    ExplanationSource,
};
pub use extractor::{extract_signal, process};
pub use gap::{analyze, Gap, GapKind, GapReport, Severity};
pub use gemini::GeminiClient;
pub use ingest::{run_pipeline, sync_activities, PipelineResult, SyncOptions, SyncOutcome};
pub use memory::MemoryStore;
pub use scorer::{calculate, compute_score, ScoreBreakdown};
pub use simulate::simulated_activities;
