//! Shared data model and configuration for the Parsona analytics core.
//!
//! Holds the persisted record types (raw activities, signals, scores), the
//! content fingerprinting used for deduplication, the persona benchmark table,
//! the application config loader, and the [`AnalyticsStore`] seam that the
//! engine runs against.

pub mod activity;
pub mod app_config;
pub mod benchmarks;
pub mod config;
pub mod error;
pub mod score;
pub mod signal;
pub mod store;

pub use activity::{canonical_json, content_fingerprint, ActivityFields, NewRawActivity, RawActivity};
pub use app_config::{AppConfig, Environment};
pub use benchmarks::{
    load_benchmarks, Benchmark, BenchmarkTable, BenchmarksFile, PersonaMatch, ResolvedBenchmark,
    DEFAULT_PERSONA,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, CoreError};
pub use score::{NewScore, ScoreRecord, SubScores, MODEL_VERSION};
pub use signal::{Cadence, Engagement, SignalData, SignalRecord, TopPost, Topic, TrendBucket, SIGNAL_VERSION};
pub use store::{AnalyticsStore, StoreError};
