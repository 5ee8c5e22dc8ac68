use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

use k6_reporter::cli::{prompt_test_config, Cli, DEFAULT_REPORT_PATH};
use k6_reporter::config::{RunRequest, Settings, SettingsLayer};
use k6_reporter::run_pipeline;

#[tokio::main]
async fn main() -> ExitCode {
    // .env has to be loaded before clap reads its env fallbacks
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    info!("🚀 k6-reporter starting...");

    let (test, layer) = match &cli.config {
        Some(path) => {
            let request = RunRequest::from_file(path)
                .with_context(|| format!("failed to load run request {}", path.display()))?;
            (request.test, cli.settings_layer().or(request.settings))
        }
        None => {
            let stdin = std::io::stdin();
            let test = prompt_test_config(&mut stdin.lock(), &mut std::io::stdout())?;
            let defaults = SettingsLayer {
                report_path: Some(PathBuf::from(DEFAULT_REPORT_PATH)),
                ..Default::default()
            };
            (test, cli.settings_layer().or(defaults))
        }
    };

    let settings = Settings::resolve(layer, cli.no_insight)?;
    let outcome = run_pipeline(&settings, &test).await?;

    info!("✅ Report ready: {}", outcome.report_path.display());
    if let Some(path) = &outcome.summary_json_path {
        info!("💾 Detailed JSON: {}", path.display());
    }
    if !outcome.insight_received {
        info!("ℹ️ Report was rendered without AI analysis");
    }
    Ok(())
}
