pub mod cli;
pub mod config;
pub mod error;
pub mod insight;
pub mod pipeline;
pub mod report;
pub mod runner;
pub mod script;
pub mod summary;
pub mod types;

pub use error::{PipelineError, Result};
pub use pipeline::{run_pipeline, run_pipeline_in, RunOutcome};
