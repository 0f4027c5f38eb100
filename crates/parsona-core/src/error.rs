use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read benchmarks file {path}: {source}")]
    BenchmarksFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse benchmarks file: {0}")]
    BenchmarksFileParse(#[from] serde_yaml::Error),

    #[error("benchmark validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("activity payload must be a JSON object")]
    PayloadNotObject,
}
