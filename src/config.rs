use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{PipelineError, Result};
use crate::types::TestConfig;

pub const DEFAULT_K6_BIN: &str = "k6";
pub const DEFAULT_TEMPERATURE: f64 = 0.2;
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 60;

/// One source of settings (config file, environment, flags). Layers are
/// stacked with [`SettingsLayer::or`] and resolved once.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SettingsLayer {
    pub k6_bin: Option<String>,
    pub report_path: Option<PathBuf>,
    pub summary_json_path: Option<PathBuf>,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub temperature: Option<f64>,
    pub ai_timeout_secs: Option<u64>,
    pub engine_timeout_secs: Option<u64>,
}

impl SettingsLayer {
    /// Fields set on `self` win; the rest come from `fallback`.
    pub fn or(self, fallback: SettingsLayer) -> SettingsLayer {
        SettingsLayer {
            k6_bin: self.k6_bin.or(fallback.k6_bin),
            report_path: self.report_path.or(fallback.report_path),
            summary_json_path: self.summary_json_path.or(fallback.summary_json_path),
            endpoint: self.endpoint.or(fallback.endpoint),
            api_key: self.api_key.or(fallback.api_key),
            temperature: self.temperature.or(fallback.temperature),
            ai_timeout_secs: self.ai_timeout_secs.or(fallback.ai_timeout_secs),
            engine_timeout_secs: self.engine_timeout_secs.or(fallback.engine_timeout_secs),
        }
    }
}

/// Non-interactive entry point: a test configuration plus the report and
/// endpoint settings, read from a JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct RunRequest {
    pub test: TestConfig,
    #[serde(flatten)]
    pub settings: SettingsLayer,
}

impl RunRequest {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| PipelineError::Config(format!("invalid run request: {}", e)))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        Self::from_json(&text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsightSettings {
    pub endpoint: String,
    pub api_key: String,
    pub temperature: f64,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub k6_bin: String,
    pub report_path: PathBuf,
    pub summary_json_path: Option<PathBuf>,
    pub engine_timeout: Option<Duration>,
    /// `None` when the analysis step is switched off for the run.
    pub insight: Option<InsightSettings>,
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, name: &str) -> Result<String> {
    present(value).ok_or_else(|| PipelineError::Config(format!("missing required {}", name)))
}

impl Settings {
    /// Checks that the report path, endpoint and API key are all present
    /// (the latter two only when analysis is wanted) and fills defaults.
    pub fn resolve(layer: SettingsLayer, skip_insight: bool) -> Result<Settings> {
        let report_path = layer
            .report_path
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| PipelineError::Config("missing required report path".into()))?;

        let insight = if skip_insight {
            None
        } else {
            let endpoint = required(layer.endpoint, "endpoint (AI_ENDPOINT)")?;
            match reqwest::Url::parse(&endpoint) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {}
                _ => {
                    return Err(PipelineError::Config(format!(
                        "endpoint '{}' is not an http(s) URL",
                        endpoint
                    )))
                }
            }
            let api_key = required(layer.api_key, "API key (AI_API_KEY)")?;
            let temperature = layer.temperature.unwrap_or(DEFAULT_TEMPERATURE);
            if !(0.0..=2.0).contains(&temperature) {
                return Err(PipelineError::Config(format!(
                    "temperature {} is outside 0.0..=2.0",
                    temperature
                )));
            }
            Some(InsightSettings {
                endpoint,
                api_key,
                temperature,
                timeout: Duration::from_secs(
                    layer.ai_timeout_secs.unwrap_or(DEFAULT_AI_TIMEOUT_SECS),
                ),
            })
        };

        Ok(Settings {
            k6_bin: present(layer.k6_bin).unwrap_or_else(|| DEFAULT_K6_BIN.to_string()),
            report_path,
            summary_json_path: layer
                .summary_json_path
                .filter(|p| !p.as_os_str().is_empty()),
            engine_timeout: layer.engine_timeout_secs.map(Duration::from_secs),
            insight,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> SettingsLayer {
        SettingsLayer {
            report_path: Some("out.html".into()),
            endpoint: Some("https://ai.example.com/chat".into()),
            api_key: Some("k".into()),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_are_filled_in() {
        let settings = Settings::resolve(complete(), false).unwrap();
        assert_eq!(settings.k6_bin, "k6");
        assert_eq!(settings.engine_timeout, None);
        let insight = settings.insight.unwrap();
        assert_eq!(insight.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(insight.timeout, Duration::from_secs(60));
    }

    #[test]
    fn missing_required_fields_fail_fast() {
        for layer in [
            SettingsLayer { report_path: None, ..complete() },
            SettingsLayer { endpoint: None, ..complete() },
            SettingsLayer { api_key: Some("   ".into()), ..complete() },
            SettingsLayer { endpoint: Some("not a url".into()), ..complete() },
        ] {
            assert!(matches!(
                Settings::resolve(layer, false),
                Err(PipelineError::Config(_))
            ));
        }
    }

    #[test]
    fn skipping_insight_drops_the_credential_requirement() {
        let layer = SettingsLayer {
            report_path: Some("out.html".into()),
            ..Default::default()
        };
        let settings = Settings::resolve(layer, true).unwrap();
        assert!(settings.insight.is_none());
    }

    #[test]
    fn earlier_layer_wins() {
        let flags = SettingsLayer {
            k6_bin: Some("/opt/k6".into()),
            ..Default::default()
        };
        let file = SettingsLayer {
            k6_bin: Some("k6".into()),
            api_key: Some("from-file".into()),
            ..Default::default()
        };
        let merged = flags.or(file);
        assert_eq!(merged.k6_bin.as_deref(), Some("/opt/k6"));
        assert_eq!(merged.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn run_request_parses_from_json() {
        let request = RunRequest::from_json(
            r#"{
                "test": {"url": "https://test.k6.io", "stages": [{"duration": "10s", "target": 5}]},
                "report_path": "report.html",
                "endpoint": "https://ai.example.com/chat",
                "api_key": "secret"
            }"#,
        )
        .unwrap();
        assert_eq!(request.test.stages.len(), 1);
        assert_eq!(request.settings.report_path, Some(PathBuf::from("report.html")));
        assert!(RunRequest::from_json(r#"{"report_path": "x"}"#).is_err());
    }
}
