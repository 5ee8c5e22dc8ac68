use serde_json::{json, Value};

use crate::types::{LoadShape, TestConfig};

/// The engine `options` object for a test configuration: a `stages` list in
/// the order supplied when ramping, otherwise a flat `vus`/`duration` pair.
pub fn script_options(config: &TestConfig) -> Value {
    match config.load_shape() {
        LoadShape::Ramp(stages) => json!({
            "stages": stages
                .iter()
                .map(|stage| json!({ "duration": stage.duration, "target": stage.target }))
                .collect::<Vec<_>>()
        }),
        LoadShape::Fixed { vus, duration } => json!({
            "vus": vus,
            "duration": duration,
        }),
    }
}

/// Renders the engine script: one GET per repetition against the target,
/// a 200 status check, and an optional pause between repetitions.
///
/// The URL is written as a JSON string literal, which is also a valid
/// JavaScript string literal, so quotes or newlines in it cannot escape into
/// the surrounding code. `TestConfig::validate` additionally restricts it to
/// http(s) URLs.
pub fn synthesize(config: &TestConfig) -> String {
    let options = serde_json::to_string_pretty(&script_options(config))
        .unwrap_or_else(|_| "{}".to_string());
    let url = Value::String(config.target_url.clone()).to_string();

    let mut request = String::new();
    request.push_str("  const res = http.get(TARGET_URL);\n");
    request.push_str("  check(res, { 'status is 200': (r) => r.status === 200 });\n");
    if let Some(delay) = config.delay_secs {
        request.push_str(&format!("  sleep({});\n", delay));
    }

    let body = match config.iterations {
        Some(count) => format!(
            "  for (let i = 0; i < {}; i++) {{\n{}  }}\n",
            count,
            indent(&request)
        ),
        None => request,
    };

    format!(
        "import http from 'k6/http';\n\
         import {{ check, sleep }} from 'k6';\n\
         \n\
         export const options = {options};\n\
         \n\
         const TARGET_URL = {url};\n\
         \n\
         export default function () {{\n\
         {body}\
         }}\n"
    )
}

fn indent(block: &str) -> String {
    block
        .lines()
        .map(|line| format!("  {}\n", line))
        .collect()
}
