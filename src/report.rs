use chrono::{DateTime, Utc};
use log::{info, warn};
use regex::Regex;
use serde::Serialize;
use std::path::Path;
use std::sync::OnceLock;

use crate::error::{PipelineError, Result};
use crate::types::{InsightText, MetricsModel, TrendStats};

/// Shown wherever a figure cannot be computed.
pub const NOT_APPLICABLE: &str = "N/A";

pub const CHART_LABELS: [&str; 6] = ["Min", "Median", "Average", "Max", "P90", "P95"];

/// Candidate metric names per row, first match wins.
const TIMING_METRICS: [(&[&str], &str); 5] = [
    (&["http_req_connecting"], "Connecting"),
    (&["http_req_tls_handshaking", "tls_handshaking"], "TLS handshake"),
    (&["http_req_sending"], "Sending"),
    (&["http_req_waiting"], "Waiting (TTFB)"),
    (&["http_req_receiving"], "Receiving"),
];

/// The only markup accepted from the analysis endpoint, and only without
/// attributes.
const ALLOWED_TABLE_TAGS: [&str; 12] = [
    "table", "thead", "tbody", "tr", "th", "td", "caption", "b", "i", "strong", "em", "br",
];

fn fmt_decimal(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.2}", v),
        _ => NOT_APPLICABLE.to_string(),
    }
}

fn fmt_count(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.0}", v),
        _ => NOT_APPLICABLE.to_string(),
    }
}

/// `numerator / denominator`, or `None` when either side is missing or the
/// result would not be a finite number.
fn safe_div(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (n, d) = (numerator?, denominator?);
    if d == 0.0 {
        return None;
    }
    Some(n / d).filter(|v| v.is_finite())
}

/// Summary tile values, already formatted for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportFigures {
    pub total_requests: String,
    pub failed_requests: String,
    pub checks_passed: String,
    pub checks_failed: String,
    pub error_rate: String,
    pub throughput: String,
    pub avg_duration: String,
    pub p95_duration: String,
    pub iterations: String,
    pub max_vus: String,
    pub data_sent_kb: String,
    pub data_received_kb: String,
}

impl ReportFigures {
    pub fn from_metrics(metrics: &MetricsModel) -> Self {
        let total_requests = metrics.count("http_reqs");
        let checks = metrics.pass_fail("checks");
        let duration = metrics.trend("http_req_duration");

        // Throughput is measured against the longest single iteration.
        let iteration_max_secs = metrics
            .trend("iteration_duration")
            .and_then(|t| t.max)
            .map(|ms| ms / 1000.0);
        let throughput = safe_div(total_requests, iteration_max_secs);
        let error_rate = safe_div(checks.map(|(_, fails)| fails), total_requests).map(|r| r * 100.0);

        // For http_req_failed a "pass" is a failed request.
        let failed_requests = metrics.pass_fail("http_req_failed").map(|(failed, _)| failed);

        Self {
            total_requests: fmt_count(total_requests),
            failed_requests: fmt_count(failed_requests),
            checks_passed: fmt_count(checks.map(|(passes, _)| passes)),
            checks_failed: fmt_count(checks.map(|(_, fails)| fails)),
            error_rate: fmt_decimal(error_rate),
            throughput: fmt_decimal(throughput),
            avg_duration: fmt_decimal(duration.and_then(|t| t.avg)),
            p95_duration: fmt_decimal(duration.and_then(|t| t.percentile("p(95)"))),
            iterations: fmt_count(metrics.count("iterations")),
            max_vus: fmt_count(metrics.gauge_max("vus_max").or_else(|| metrics.gauge_max("vus"))),
            data_sent_kb: fmt_decimal(metrics.count("data_sent").map(|b| b / 1024.0)),
            data_received_kb: fmt_decimal(metrics.count("data_received").map(|b| b / 1024.0)),
        }
    }
}

/// Datasets for the two embedded charts, in `CHART_LABELS` order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: [&'static str; 6],
    pub duration: Vec<Option<f64>>,
    pub iteration: Vec<Option<f64>>,
}

pub fn trend_series(trend: Option<&TrendStats>) -> Vec<Option<f64>> {
    match trend {
        Some(t) => vec![
            t.min,
            t.med,
            t.avg,
            t.max,
            t.percentile("p(90)"),
            t.percentile("p(95)"),
        ],
        None => vec![None; CHART_LABELS.len()],
    }
}

impl ChartData {
    pub fn from_metrics(metrics: &MetricsModel) -> Self {
        Self {
            labels: CHART_LABELS,
            duration: trend_series(metrics.trend("http_req_duration")),
            iteration: trend_series(metrics.trend("iteration_duration")),
        }
    }
}

/// What could be pulled out of the endpoint's free-form answer.
#[derive(Debug, Clone, PartialEq)]
pub enum InsightExtract {
    Table(String),
    Raw(String),
}

fn table_pattern() -> &'static Regex {
    static TABLE_RE: OnceLock<Regex> = OnceLock::new();
    TABLE_RE.get_or_init(|| Regex::new(r"(?is)<table\b.*?</table\s*>").expect("table regex compiles"))
}

fn any_tag_pattern() -> &'static Regex {
    static ANY_TAG_RE: OnceLock<Regex> = OnceLock::new();
    ANY_TAG_RE.get_or_init(|| Regex::new(r"<[^>]*>?").expect("tag regex compiles"))
}

fn bare_tag_pattern() -> &'static Regex {
    static BARE_TAG_RE: OnceLock<Regex> = OnceLock::new();
    BARE_TAG_RE.get_or_init(|| {
        Regex::new(r"^<\s*/?\s*([A-Za-z][A-Za-z0-9]*)\s*/?\s*>$").expect("bare tag regex compiles")
    })
}

/// True when every tag in `fragment` is an allowed table tag with no
/// attributes.
fn only_plain_table_markup(fragment: &str) -> bool {
    any_tag_pattern().find_iter(fragment).all(|tag| {
        bare_tag_pattern()
            .captures(tag.as_str())
            .and_then(|caps| caps.get(1))
            .map(|name| {
                let name = name.as_str().to_ascii_lowercase();
                ALLOWED_TABLE_TAGS.contains(&name.as_str())
            })
            .unwrap_or(false)
    })
}

pub fn extract_table(text: &str) -> InsightExtract {
    match table_pattern().find(text) {
        Some(m) if only_plain_table_markup(m.as_str()) => InsightExtract::Table(m.as_str().to_string()),
        Some(_) => {
            warn!("⚠️ Insight table carries markup beyond plain table tags; showing raw text");
            InsightExtract::Raw(text.to_string())
        }
        None => InsightExtract::Raw(text.to_string()),
    }
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[derive(Debug, Clone)]
pub struct ReportContext {
    pub run_id: String,
    pub target_url: String,
    pub load_description: String,
    pub generated_at: DateTime<Utc>,
}

fn tile(label: &str, value: &str, unit: &str) -> String {
    let unit = if value == NOT_APPLICABLE || unit.is_empty() {
        String::new()
    } else {
        format!("<span class=\"unit\">{}</span>", unit)
    };
    format!(
        "  <div class=\"stat-card\"><div class=\"label\">{}</div><div class=\"value\">{}{}</div></div>",
        label, value, unit
    )
}

fn timing_rows(metrics: &MetricsModel) -> String {
    TIMING_METRICS
        .iter()
        .filter_map(|(names, label)| {
            let trend = names.iter().find_map(|name| metrics.trend(name))?;
            Some(format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                label,
                fmt_decimal(trend.avg),
                fmt_decimal(trend.percentile("p(95)")),
                fmt_decimal(trend.max),
            ))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn insight_body(insight: &InsightText) -> String {
    match extract_table(insight.as_str()) {
        InsightExtract::Table(table) => table,
        InsightExtract::Raw(raw) => {
            if insight.is_received() {
                warn!("⚠️ No table found in analysis; showing raw text");
            }
            format!("<pre class=\"insight-raw\">{}</pre>", html_escape(&raw))
        }
    }
}

/// Builds the complete, self-contained HTML document.
pub fn render_report(metrics: &MetricsModel, insight: &InsightText, ctx: &ReportContext) -> String {
    let figures = ReportFigures::from_metrics(metrics);
    let charts = serde_json::to_string(&ChartData::from_metrics(metrics))
        .unwrap_or_else(|_| "{}".to_string())
        .replace("</", "<\\/");

    let tiles = [
        tile("Total Requests", &figures.total_requests, ""),
        tile("Failed Requests", &figures.failed_requests, ""),
        tile("Checks Passed", &figures.checks_passed, ""),
        tile("Checks Failed", &figures.checks_failed, ""),
        tile("Error Rate", &figures.error_rate, "%"),
        tile("Throughput", &figures.throughput, "req/s"),
        tile("Avg Duration", &figures.avg_duration, "ms"),
        tile("P95 Duration", &figures.p95_duration, "ms"),
        tile("Iterations", &figures.iterations, ""),
        tile("Max VUs", &figures.max_vus, ""),
        tile("Data Sent", &figures.data_sent_kb, "KB"),
        tile("Data Received", &figures.data_received_kb, "KB"),
    ]
    .join("\n");

    let timings = timing_rows(metrics);
    let timings = if timings.is_empty() {
        format!("<tr><td colspan=\"4\">{}</td></tr>", NOT_APPLICABLE)
    } else {
        timings
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en" data-theme="light">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>k6 Report: {target}</title>
<style>
{style}
</style>
</head>
<body>
<header>
  <div>
    <h1>Load Test Report</h1>
    <div class="meta">
      <span>Target: {target}</span>
      <span>Load: {load}</span>
      <span>Generated: {generated}</span>
      <span class="run-id">Run ID: {run_id}</span>
    </div>
  </div>
  <button id="theme-toggle" type="button">Dark mode</button>
</header>

<section class="panel">
  <h2 class="panel-header">Summary</h2>
  <div class="panel-body stats-grid">
{tiles}
  </div>
</section>

<section class="panel">
  <h2 class="panel-header">Request Duration (ms)</h2>
  <div class="panel-body"><canvas id="duration-chart" width="640" height="300"></canvas></div>
</section>

<section class="panel">
  <h2 class="panel-header">Iteration Duration (ms)</h2>
  <div class="panel-body"><canvas id="iteration-chart" width="640" height="300"></canvas></div>
</section>

<section class="panel">
  <h2 class="panel-header">Timing Breakdown (ms)</h2>
  <div class="panel-body">
    <table>
      <thead><tr><th>Phase</th><th>Avg</th><th>P95</th><th>Max</th></tr></thead>
      <tbody>
{timings}
      </tbody>
    </table>
  </div>
</section>

<section class="panel" id="insight-panel">
  <h2 class="panel-header">AI Analysis</h2>
  <div class="panel-body insight">
{insight}
  </div>
</section>

<footer>Generated by k6-reporter &bull; {generated}</footer>
<script>
const REPORT_CHARTS = {charts};
{script}
</script>
</body>
</html>
"#,
        target = html_escape(&ctx.target_url),
        load = html_escape(&ctx.load_description),
        generated = ctx.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        run_id = html_escape(&ctx.run_id),
        tiles = tiles,
        timings = timings,
        insight = insight_body(insight),
        charts = charts,
        style = STYLE,
        script = SCRIPT,
    )
}

pub async fn write_report(path: &Path, html: &str) -> Result<()> {
    tokio::fs::write(path, html)
        .await
        .map_err(|e| PipelineError::io(path, e))?;
    info!("📄 Report written to {}", path.display());
    Ok(())
}

const STYLE: &str = r#"  :root {
    --bg: #f8fafc; --card: #ffffff; --border: #e2e8f0;
    --fg: #0f172a; --muted: #64748b; --grid: #cbd5e1; --accent: #2563eb;
  }
  [data-theme="dark"] {
    --bg: #0f172a; --card: #1e293b; --border: #334155;
    --fg: #e2e8f0; --muted: #94a3b8; --grid: #475569; --accent: #60a5fa;
  }
  *, *::before, *::after { box-sizing: border-box; }
  body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); line-height: 1.5;
  }
  header { display: flex; justify-content: space-between; align-items: flex-start; margin-bottom: 1.5rem; }
  h1 { font-size: 1.75rem; margin: 0 0 0.25rem; }
  .meta { color: var(--muted); font-size: 0.875rem; }
  .meta span { margin-right: 1.5rem; }
  .run-id { font-family: monospace; }
  #theme-toggle {
    background: var(--card); color: var(--fg); border: 1px solid var(--border);
    border-radius: 0.375rem; padding: 0.4rem 0.9rem; cursor: pointer;
  }
  .panel { background: var(--card); border: 1px solid var(--border); border-radius: 0.5rem; margin-bottom: 1.25rem; }
  .panel-header {
    font-size: 1rem; text-transform: uppercase; letter-spacing: 0.05em; color: var(--muted);
    margin: 0; padding: 0.75rem 1.25rem; cursor: pointer; user-select: none;
  }
  .panel-header::before { content: "\25BE  "; }
  .panel.collapsed .panel-header::before { content: "\25B8  "; }
  .panel.collapsed .panel-body { display: none; }
  .panel-body { padding: 0 1.25rem 1.25rem; overflow-x: auto; }
  .stats-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(170px, 1fr)); gap: 1rem; }
  .stat-card { border: 1px solid var(--border); border-radius: 0.5rem; padding: 0.75rem 1rem; }
  .stat-card .label { font-size: 0.75rem; text-transform: uppercase; color: var(--muted); }
  .stat-card .value { font-size: 1.4rem; font-weight: 700; }
  .stat-card .unit { font-size: 0.8rem; color: var(--muted); margin-left: 0.2rem; }
  canvas { max-width: 100%; }
  table { width: 100%; border-collapse: collapse; font-size: 0.875rem; }
  th, td { padding: 0.5rem 0.75rem; text-align: left; border-top: 1px solid var(--border); }
  th { color: var(--muted); text-transform: uppercase; font-size: 0.75rem; }
  .insight-raw { white-space: pre-wrap; font-family: inherit; margin: 0; }
  footer { margin-top: 2rem; color: var(--muted); font-size: 0.8125rem; }"#;

const SCRIPT: &str = r#"(function () {
  var root = document.documentElement;
  var toggle = document.getElementById('theme-toggle');
  var storageKey = 'k6-report-theme';

  function applyTheme(theme) {
    root.setAttribute('data-theme', theme);
    toggle.textContent = theme === 'dark' ? 'Light mode' : 'Dark mode';
  }

  function palette() {
    var s = getComputedStyle(root);
    return {
      fg: s.getPropertyValue('--fg').trim(),
      grid: s.getPropertyValue('--grid').trim(),
      accent: s.getPropertyValue('--accent').trim()
    };
  }

  function draw(id, values, kind) {
    var canvas = document.getElementById(id);
    if (!canvas || !canvas.getContext) { return; }
    var ctx = canvas.getContext('2d');
    var c = palette();
    var w = canvas.width, h = canvas.height, pad = 40;
    var present = values.filter(function (v) { return v !== null; });
    var max = present.length ? Math.max.apply(null, present) : 0;
    var scale = max > 0 ? (h - 2 * pad) / max : 0;
    var step = (w - 2 * pad) / REPORT_CHARTS.labels.length;
    var prev = null;

    ctx.clearRect(0, 0, w, h);
    ctx.strokeStyle = c.grid;
    ctx.lineWidth = 1;
    ctx.beginPath();
    ctx.moveTo(pad, h - pad);
    ctx.lineTo(w - pad, h - pad);
    ctx.stroke();
    ctx.font = '12px sans-serif';
    ctx.textAlign = 'center';

    values.forEach(function (v, i) {
      var x = pad + step * i + step / 2;
      ctx.fillStyle = c.fg;
      ctx.fillText(REPORT_CHARTS.labels[i], x, h - pad + 16);
      if (v === null) {
        ctx.fillText('N/A', x, h - pad - 6);
        prev = null;
        return;
      }
      var y = h - pad - v * scale;
      ctx.fillText(v.toFixed(2), x, y - 6);
      ctx.fillStyle = c.accent;
      ctx.strokeStyle = c.accent;
      if (kind === 'bar') {
        ctx.fillRect(x - step * 0.3, y, step * 0.6, v * scale);
      } else {
        ctx.lineWidth = 2;
        if (prev) {
          ctx.beginPath();
          ctx.moveTo(prev[0], prev[1]);
          ctx.lineTo(x, y);
          ctx.stroke();
        }
        ctx.beginPath();
        ctx.arc(x, y, 3, 0, Math.PI * 2);
        ctx.fill();
        prev = [x, y];
      }
    });
  }

  function drawAll() {
    draw('duration-chart', REPORT_CHARTS.duration, 'bar');
    draw('iteration-chart', REPORT_CHARTS.iteration, 'line');
  }

  var stored = null;
  try { stored = localStorage.getItem(storageKey); } catch (e) {}
  applyTheme(stored === 'dark' ? 'dark' : 'light');

  toggle.addEventListener('click', function () {
    var next = root.getAttribute('data-theme') === 'dark' ? 'light' : 'dark';
    try { localStorage.setItem(storageKey, next); } catch (e) {}
    applyTheme(next);
    drawAll();
  });

  document.querySelectorAll('.panel-header').forEach(function (header) {
    header.addEventListener('click', function () {
      header.parentElement.classList.toggle('collapsed');
    });
  });

  drawAll();
})();"#;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metrics(value: serde_json::Value) -> MetricsModel {
        serde_json::from_value(value).unwrap()
    }

    fn context() -> ReportContext {
        ReportContext {
            run_id: "run-1".into(),
            target_url: "https://test.k6.io/?a=<b>".into(),
            load_description: "10 VUs for 30s".into(),
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn missing_checks_render_as_not_applicable() {
        let figures = ReportFigures::from_metrics(&metrics(json!({
            "http_reqs": {"count": 100, "rate": 10}
        })));
        assert_eq!(figures.checks_passed, NOT_APPLICABLE);
        assert_eq!(figures.checks_failed, NOT_APPLICABLE);
        assert_eq!(figures.error_rate, NOT_APPLICABLE);
        assert_eq!(figures.total_requests, "100");
    }

    #[test]
    fn zero_requests_never_yield_nan_or_infinity() {
        let figures = ReportFigures::from_metrics(&metrics(json!({
            "http_reqs": {"count": 0, "rate": 0},
            "checks": {"passes": 0, "fails": 3, "value": 0},
            "iteration_duration": {"avg": 0, "min": 0, "med": 0, "max": 0}
        })));
        assert_eq!(figures.error_rate, NOT_APPLICABLE);
        assert_eq!(figures.throughput, NOT_APPLICABLE);
    }

    #[test]
    fn derived_figures_round_to_two_places() {
        let figures = ReportFigures::from_metrics(&metrics(json!({
            "http_reqs": {"count": 300, "rate": 10},
            "checks": {"passes": 299, "fails": 1, "value": 0.99},
            "iteration_duration": {"avg": 900, "min": 800, "med": 900, "max": 7000},
            "http_req_duration": {"avg": 12.3456, "min": 5, "med": 10, "max": 50, "p(95)": 40.004},
            "data_received": {"count": 2048, "rate": 1}
        })));
        assert_eq!(figures.error_rate, "0.33");
        assert_eq!(figures.throughput, "42.86");
        assert_eq!(figures.avg_duration, "12.35");
        assert_eq!(figures.p95_duration, "40.00");
        assert_eq!(figures.data_received_kb, "2.00");
    }

    #[test]
    fn duration_chart_follows_label_order() {
        let charts = ChartData::from_metrics(&metrics(json!({
            "http_req_duration": {"min": 5, "med": 10, "avg": 12, "max": 50, "p(90)": 30, "p(95)": 40}
        })));
        let values: Vec<f64> = charts.duration.iter().map(|v| v.unwrap()).collect();
        assert_eq!(values, vec![5.0, 10.0, 12.0, 50.0, 30.0, 40.0]);
        assert!(charts.iteration.iter().all(Option::is_none));
    }

    #[test]
    fn table_is_extracted_from_prose() {
        let text = "Here you go:\n<TABLE><tr><td><b>a</b><br/></td></tr></TABLE>\nThanks";
        assert_eq!(
            extract_table(text),
            InsightExtract::Table("<TABLE><tr><td><b>a</b><br/></td></tr></TABLE>".into())
        );
    }

    #[test]
    fn prose_without_table_falls_back_to_raw() {
        assert_eq!(
            extract_table("latency looks fine"),
            InsightExtract::Raw("latency looks fine".into())
        );
        let scripted = "<table><tr><td><script>alert(1)</script></td></tr></table>";
        assert!(matches!(extract_table(scripted), InsightExtract::Raw(_)));
    }

    #[test]
    fn tables_with_attributes_or_foreign_tags_are_shown_raw() {
        for hostile in [
            "<table><tr><td><img src=x onerror=\"alert(document.cookie)\"></td></tr></table>",
            "<table onmouseover=\"alert(1)\"><tr><td>a</td></tr></table>",
            "<table><tr><td><iframe src=\"https://evil.test\"></iframe></td></tr></table>",
            "<table><tr><td><a href=\"javascript:alert(1)\">x</a></td></tr></table>",
            "<table><tr><td><style>body{display:none}</style></td></tr></table>",
            "<table><tr><td><!-- note --></td></tr></table>",
        ] {
            assert!(
                matches!(extract_table(hostile), InsightExtract::Raw(_)),
                "{hostile}"
            );
        }
    }

    #[test]
    fn event_handler_never_reaches_the_report() {
        let html = render_report(
            &MetricsModel::default(),
            &InsightText::Received(
                "<table><tr><td><img src=x onerror=\"alert(document.cookie)\"></td></tr></table>".into(),
            ),
            &context(),
        );
        assert!(!html.contains("<img"));
        assert!(html.contains("&lt;img src=x onerror=&quot;alert(document.cookie)&quot;&gt;"));
    }

    #[test]
    fn tls_row_reads_the_k6_metric_name() {
        let rows = timing_rows(&metrics(json!({
            "http_req_tls_handshaking": {"avg": 4, "min": 0, "med": 3, "max": 12, "p(95)": 10}
        })));
        assert_eq!(
            rows,
            "<tr><td>TLS handshake</td><td>4.00</td><td>10.00</td><td>12.00</td></tr>"
        );

        let legacy = timing_rows(&metrics(json!({
            "tls_handshaking": {"avg": 1, "min": 0, "med": 1, "max": 2}
        })));
        assert!(legacy.contains("<td>TLS handshake</td><td>1.00</td>"));
    }

    #[test]
    fn raw_insight_is_escaped_inside_the_panel() {
        let html = render_report(
            &MetricsModel::default(),
            &InsightText::Received("use <b>caching</b>".into()),
            &context(),
        );
        assert!(html.contains("<pre class=\"insight-raw\">use &lt;b&gt;caching&lt;/b&gt;</pre>"));
        assert!(html.contains("https://test.k6.io/?a=&lt;b&gt;"));
    }

    #[test]
    fn document_is_self_contained() {
        let html = render_report(
            &metrics(json!({"http_req_waiting": {"avg": 3, "min": 1, "med": 3, "max": 9, "p(95)": 8}})),
            &InsightText::Received("<table><tr><td>ok</td></tr></table>".into()),
            &context(),
        );
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<table><tr><td>ok</td></tr></table>"));
        assert!(html.contains("localStorage"));
        assert!(html.contains("const REPORT_CHARTS = {\"labels\":[\"Min\""));
        assert!(html.contains("<td>Waiting (TTFB)</td><td>3.00</td><td>8.00</td><td>9.00</td>"));
        assert!(!html.contains("<script src="));
        assert!(!html.contains("NaN"));
    }
}
