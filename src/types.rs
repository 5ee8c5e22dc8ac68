use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::PipelineError;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Stage {
    pub duration: String,
    pub target: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TestConfig {
    #[serde(rename = "url")]
    pub target_url: String,
    #[serde(default = "default_vus")]
    pub vus: u32,
    #[serde(default = "default_duration")]
    pub duration: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stages: Vec<Stage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u32>,
    #[serde(rename = "delay", default, skip_serializing_if = "Option::is_none")]
    pub delay_secs: Option<f64>,
}

fn default_vus() -> u32 {
    1
}

fn default_duration() -> String {
    "30s".to_string()
}

/// The load shape the engine is asked to produce. Ramp stages, when
/// present, win over the flat vus/duration pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoadShape<'a> {
    Fixed { vus: u32, duration: &'a str },
    Ramp(&'a [Stage]),
}

impl TestConfig {
    pub fn load_shape(&self) -> LoadShape<'_> {
        if self.stages.is_empty() {
            LoadShape::Fixed {
                vus: self.vus,
                duration: &self.duration,
            }
        } else {
            LoadShape::Ramp(&self.stages)
        }
    }

    pub fn describe_load(&self) -> String {
        match self.load_shape() {
            LoadShape::Fixed { vus, duration } => format!("{} VUs for {}", vus, duration),
            LoadShape::Ramp(stages) => stages
                .iter()
                .map(|s| format!("{} → {}", s.duration, s.target))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        match reqwest::Url::parse(&self.target_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(PipelineError::Config(format!(
                    "target url '{}' is not an http(s) URL",
                    self.target_url
                )))
            }
        }

        match self.load_shape() {
            LoadShape::Fixed { vus, duration } => {
                if vus == 0 {
                    return Err(PipelineError::Config("vus must be at least 1".into()));
                }
                check_duration(duration)?;
            }
            LoadShape::Ramp(stages) => {
                for stage in stages {
                    check_duration(&stage.duration)?;
                }
            }
        }

        if self.iterations == Some(0) {
            return Err(PipelineError::Config("iterations must be at least 1".into()));
        }
        if let Some(delay) = self.delay_secs {
            if !delay.is_finite() || delay < 0.0 {
                return Err(PipelineError::Config(format!("invalid delay {}", delay)));
            }
        }
        Ok(())
    }
}

/// Accepts engine duration strings such as `30s`, `1m30s` or `500ms`.
pub fn is_valid_duration(input: &str) -> bool {
    let mut rest = input;
    if rest.is_empty() {
        return false;
    }
    while !rest.is_empty() {
        let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
        if digits == 0 {
            return false;
        }
        rest = &rest[digits..];
        let unit = ["ms", "s", "m", "h"]
            .into_iter()
            .find(|unit| rest.starts_with(unit));
        match unit {
            Some(unit) => rest = &rest[unit.len()..],
            None => return false,
        }
    }
    true
}

fn check_duration(duration: &str) -> Result<(), PipelineError> {
    if is_valid_duration(duration) {
        Ok(())
    } else {
        Err(PipelineError::Config(format!(
            "invalid duration '{}'",
            duration
        )))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrendStats {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
    pub med: Option<f64>,
    /// Keyed exactly as the engine emits them, e.g. `p(90)`.
    pub percentiles: BTreeMap<String, f64>,
}

impl TrendStats {
    pub fn percentile(&self, key: &str) -> Option<f64> {
        self.percentiles.get(key).copied()
    }
}

/// One entry of the engine's `metrics` map. The variant is picked from the
/// fields present in the entry.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(from = "BTreeMap<String, Value>", into = "BTreeMap<String, Value>")]
pub enum MetricStats {
    Trend(TrendStats),
    Counter { count: f64, rate: Option<f64> },
    Rate { passes: f64, fails: f64, value: Option<f64> },
    Gauge { value: Option<f64>, min: Option<f64>, max: Option<f64> },
}

impl From<BTreeMap<String, Value>> for MetricStats {
    fn from(raw: BTreeMap<String, Value>) -> Self {
        let num = |key: &str| raw.get(key).and_then(Value::as_f64);

        if raw.contains_key("passes") || raw.contains_key("fails") {
            return MetricStats::Rate {
                passes: num("passes").unwrap_or(0.0),
                fails: num("fails").unwrap_or(0.0),
                value: num("value"),
            };
        }
        if let Some(count) = num("count") {
            return MetricStats::Counter {
                count,
                rate: num("rate"),
            };
        }

        let percentiles: BTreeMap<String, f64> = raw
            .iter()
            .filter(|(key, _)| key.starts_with("p("))
            .filter_map(|(key, value)| value.as_f64().map(|v| (key.clone(), v)))
            .collect();

        if raw.contains_key("avg") || raw.contains_key("med") || !percentiles.is_empty() {
            return MetricStats::Trend(TrendStats {
                min: num("min"),
                max: num("max"),
                avg: num("avg"),
                med: num("med"),
                percentiles,
            });
        }

        MetricStats::Gauge {
            value: num("value"),
            min: num("min"),
            max: num("max"),
        }
    }
}

impl From<MetricStats> for BTreeMap<String, Value> {
    fn from(stats: MetricStats) -> Self {
        let mut out = BTreeMap::new();
        let mut put = |key: &str, value: Option<f64>| {
            if let Some(v) = value {
                out.insert(key.to_string(), Value::from(v));
            }
        };
        match stats {
            MetricStats::Trend(trend) => {
                put("min", trend.min);
                put("max", trend.max);
                put("avg", trend.avg);
                put("med", trend.med);
                for (key, value) in trend.percentiles {
                    put(&key, Some(value));
                }
            }
            MetricStats::Counter { count, rate } => {
                put("count", Some(count));
                put("rate", rate);
            }
            MetricStats::Rate {
                passes,
                fails,
                value,
            } => {
                put("passes", Some(passes));
                put("fails", Some(fails));
                put("value", value);
            }
            MetricStats::Gauge { value, min, max } => {
                put("value", value);
                put("min", min);
                put("max", max);
            }
        }
        out
    }
}

/// Metric name to statistics record, as found under the summary's `metrics`
/// key. Lookups return `None` for metrics the engine did not emit.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct MetricsModel {
    metrics: BTreeMap<String, MetricStats>,
}

impl MetricsModel {
    pub fn get(&self, name: &str) -> Option<&MetricStats> {
        self.metrics.get(name)
    }

    pub fn trend(&self, name: &str) -> Option<&TrendStats> {
        match self.metrics.get(name)? {
            MetricStats::Trend(trend) => Some(trend),
            _ => None,
        }
    }

    /// `count` of a counter metric.
    pub fn count(&self, name: &str) -> Option<f64> {
        match self.metrics.get(name)? {
            MetricStats::Counter { count, .. } => Some(*count),
            _ => None,
        }
    }

    /// `(passes, fails)` of a rate metric.
    pub fn pass_fail(&self, name: &str) -> Option<(f64, f64)> {
        match self.metrics.get(name)? {
            MetricStats::Rate { passes, fails, .. } => Some((*passes, *fails)),
            _ => None,
        }
    }

    pub fn gauge_max(&self, name: &str) -> Option<f64> {
        match self.metrics.get(name)? {
            MetricStats::Gauge { max, value, .. } => max.or(*value),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }
}

/// Commentary returned by the analysis endpoint, or the placeholder used
/// when the endpoint could not be reached.
#[derive(Debug, Clone, PartialEq)]
pub enum InsightText {
    Received(String),
    Placeholder(String),
}

impl InsightText {
    pub fn as_str(&self) -> &str {
        match self {
            InsightText::Received(text) | InsightText::Placeholder(text) => text,
        }
    }

    pub fn is_received(&self) -> bool {
        matches!(self, InsightText::Received(_))
    }
}
