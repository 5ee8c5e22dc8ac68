use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::SettingsLayer;
use crate::types::{is_valid_duration, Stage, TestConfig};

pub const DEFAULT_REPORT_PATH: &str = "k6-report.html";

#[derive(Parser, Debug)]
#[command(author, version, about = "Run a k6 load test and render an HTML report with AI commentary")]
pub struct Cli {
    /// JSON run request (test config, report path, endpoint, key). Skips
    /// the interactive prompts.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to the k6 binary.
    #[arg(long, env = "K6_BIN")]
    pub k6_bin: Option<String>,

    /// Where to write the HTML report.
    #[arg(long = "report", env = "REPORT_PATH")]
    pub report_path: Option<PathBuf>,

    /// Optional path for a pretty-printed copy of the k6 summary.
    #[arg(long = "summary-json", env = "SUMMARY_JSON_PATH")]
    pub summary_json_path: Option<PathBuf>,

    /// Chat-completion endpoint used for the analysis.
    #[arg(long, env = "AI_ENDPOINT")]
    pub endpoint: Option<String>,

    #[arg(long, env = "AI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "AI_TEMPERATURE")]
    pub temperature: Option<f64>,

    #[arg(long, env = "AI_TIMEOUT_SECS")]
    pub ai_timeout_secs: Option<u64>,

    /// Kill k6 if it runs longer than this.
    #[arg(long, env = "ENGINE_TIMEOUT_SECS")]
    pub engine_timeout_secs: Option<u64>,

    /// Render the report without asking the endpoint for analysis.
    #[arg(long)]
    pub no_insight: bool,
}

impl Cli {
    pub fn settings_layer(&self) -> SettingsLayer {
        SettingsLayer {
            k6_bin: self.k6_bin.clone(),
            report_path: self.report_path.clone(),
            summary_json_path: self.summary_json_path.clone(),
            endpoint: self.endpoint.clone(),
            api_key: self.api_key.clone(),
            temperature: self.temperature,
            ai_timeout_secs: self.ai_timeout_secs,
            engine_timeout_secs: self.engine_timeout_secs,
        }
    }
}

fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<String> {
    write!(output, "{}: ", question)?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line).context("failed to read answer")?;
    Ok(line.trim().to_string())
}

fn ask_number<R: BufRead, W: Write, T: std::str::FromStr>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> Result<Option<T>> {
    let answer = ask(input, output, question)?;
    if answer.is_empty() {
        return Ok(None);
    }
    answer
        .parse::<T>()
        .map(Some)
        .map_err(|_| anyhow!("'{}' is not a valid number", answer))
}

/// Parses `duration:target` pairs separated by commas, e.g. `30s:10,1m:50`.
pub fn parse_stages(input: &str) -> Result<Vec<Stage>> {
    input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (duration, target) = part
                .split_once(':')
                .ok_or_else(|| anyhow!("stage '{}' must look like 30s:10", part))?;
            let duration = duration.trim();
            if !is_valid_duration(duration) {
                bail!("stage '{}' has an invalid duration", part);
            }
            let target = target
                .trim()
                .parse::<u32>()
                .map_err(|_| anyhow!("stage '{}' has an invalid target", part))?;
            Ok(Stage {
                duration: duration.to_string(),
                target,
            })
        })
        .collect()
}

/// Collects a test configuration from the terminal. Blank answers keep the
/// default shown in brackets.
pub fn prompt_test_config<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<TestConfig> {
    let target_url = ask(input, output, "Target URL")?;
    if target_url.is_empty() {
        bail!("a target URL is required");
    }
    let vus = ask_number::<_, _, u32>(input, output, "Virtual users [10]")?.unwrap_or(10);
    let duration = match ask(input, output, "Duration [30s]")? {
        d if d.is_empty() => "30s".to_string(),
        d => d,
    };
    let iterations = ask_number::<_, _, u32>(input, output, "Requests per iteration (blank for 1)")?;
    let delay_secs = ask_number::<_, _, f64>(input, output, "Delay between requests in seconds (blank for none)")?;
    let stages = parse_stages(&ask(
        input,
        output,
        "Ramp stages as duration:target,... (blank for none)",
    )?)?;

    Ok(TestConfig {
        target_url,
        vus,
        duration,
        stages,
        iterations,
        delay_secs,
    })
}
