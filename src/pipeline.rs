use chrono::Utc;
use log::{info, warn};
use std::path::PathBuf;
use uuid::Uuid;

use crate::config::Settings;
use crate::error::Result;
use crate::insight::{insight_or_placeholder, InsightClient};
use crate::report::{render_report, write_report, ReportContext};
use crate::runner::{EngineRunner, RunArtifacts};
use crate::script::synthesize;
use crate::summary::{load_summary, persist_summary};
use crate::types::TestConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub run_id: Uuid,
    pub report_path: PathBuf,
    pub summary_json_path: Option<PathBuf>,
    pub engine_exit_code: Option<i32>,
    pub insight_received: bool,
}

/// Runs the whole sequence with temp files under the system temp dir.
pub async fn run_pipeline(settings: &Settings, test: &TestConfig) -> Result<RunOutcome> {
    run_pipeline_in(settings, test, RunArtifacts::new()).await
}

/// script → engine → summary → insight → report. The artifacts are owned
/// here and dropped on return, which removes the temp script and summary
/// whether or not the run succeeded.
pub async fn run_pipeline_in(
    settings: &Settings,
    test: &TestConfig,
    artifacts: RunArtifacts,
) -> Result<RunOutcome> {
    test.validate()?;
    info!(
        "🧪 Starting run {} against {} ({})",
        artifacts.run_id(),
        test.target_url,
        test.describe_load()
    );

    let script = synthesize(test);
    let engine = EngineRunner::new(settings.k6_bin.clone(), settings.engine_timeout);
    let engine_outcome = engine.run(&artifacts, &script).await?;

    let summary = load_summary(artifacts.summary_path()).await?;
    // The copy is an extra; losing it must not cost the report.
    let summary_json_path = match &settings.summary_json_path {
        Some(path) => match persist_summary(&summary, path).await {
            Ok(()) => Some(path.clone()),
            Err(e) => {
                warn!("⚠️ {}; continuing without the detailed JSON copy", e);
                None
            }
        },
        None => None,
    };

    let client = match &settings.insight {
        Some(cfg) => match InsightClient::new(
            cfg.endpoint.clone(),
            cfg.api_key.clone(),
            cfg.temperature,
            cfg.timeout,
        ) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!("⚠️ {}", e);
                None
            }
        },
        None => None,
    };
    let insight = insight_or_placeholder(client.as_ref(), &summary.metrics).await;

    let context = ReportContext {
        run_id: artifacts.run_id().to_string(),
        target_url: test.target_url.clone(),
        load_description: test.describe_load(),
        generated_at: Utc::now(),
    };
    let html = render_report(&summary.metrics, &insight, &context);
    write_report(&settings.report_path, &html).await?;

    Ok(RunOutcome {
        run_id: artifacts.run_id(),
        report_path: settings.report_path.clone(),
        summary_json_path,
        engine_exit_code: engine_outcome.exit_code,
        insight_received: insight.is_received(),
    })
}
