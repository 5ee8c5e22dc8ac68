use log::info;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

use crate::error::{PipelineError, Result};
use crate::types::MetricsModel;

/// The engine's end-of-run export: the untouched document plus the parsed
/// metrics map.
#[derive(Debug, Clone)]
pub struct Summary {
    pub raw: Value,
    pub metrics: MetricsModel,
}

#[derive(Deserialize)]
struct SummaryDocument {
    metrics: MetricsModel,
}

/// Reads the summary export. A missing file or a document without a
/// `metrics` map is an error; nothing is defaulted.
pub async fn load_summary(path: &Path) -> Result<Summary> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| PipelineError::SummaryRead {
            path: path.to_path_buf(),
            source,
        })?;
    let summary = parse_summary(&text).map_err(|source| PipelineError::SummaryParse {
        path: path.to_path_buf(),
        source,
    })?;
    info!("📊 Loaded {} metrics from summary", summary.metrics.len());
    Ok(summary)
}

pub fn parse_summary(text: &str) -> serde_json::Result<Summary> {
    let raw: Value = serde_json::from_str(text)?;
    let document = SummaryDocument::deserialize(&raw)?;
    Ok(Summary {
        raw,
        metrics: document.metrics,
    })
}

/// Writes a pretty-printed copy of the raw summary to a caller-chosen path.
pub async fn persist_summary(summary: &Summary, path: &Path) -> Result<()> {
    let pretty = serde_json::to_string_pretty(&summary.raw).map_err(|source| {
        PipelineError::SummaryParse {
            path: path.to_path_buf(),
            source,
        }
    })?;
    tokio::fs::write(path, pretty)
        .await
        .map_err(|e| PipelineError::io(path, e))?;
    info!("💾 Detailed summary saved to {}", path.display());
    Ok(())
}
