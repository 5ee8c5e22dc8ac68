use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to spawn load-test engine '{binary}': {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("load-test engine did not finish within {0:?}")]
    EngineTimeout(Duration),

    #[error("failed to read summary {path}: {source}")]
    SummaryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("summary {path} is not a valid engine summary: {source}")]
    SummaryParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("insight request failed: {0}")]
    Insight(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
