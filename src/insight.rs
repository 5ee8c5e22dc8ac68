use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tokio::time::sleep;

use crate::error::{PipelineError, Result};
use crate::types::{InsightText, MetricsModel};

pub const PLACEHOLDER_PREFIX: &str = "AI analysis unavailable";

/// Metrics worth spending prompt tokens on.
pub const PROMPT_METRICS: [&str; 10] = [
    "http_reqs",
    "http_req_duration",
    "http_req_failed",
    "http_req_waiting",
    "iteration_duration",
    "iterations",
    "checks",
    "vus_max",
    "data_received",
    "data_sent",
];

const SYSTEM_PROMPT: &str = "You are a performance engineer reviewing the results of a k6 load test. \
Be concise and concrete.";

const FORMAT_INSTRUCTIONS: &str = "Answer with a single HTML <table> and nothing else. \
Use the columns Metric, Observation and Recommendation, one row per notable finding. \
Do not wrap the table in markdown fences.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    messages: &'a [ChatMessage],
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// The curated subset of metrics rendered as a JSON object for the prompt.
pub fn prompt_metrics(metrics: &MetricsModel) -> Value {
    let mut selected = Map::new();
    for name in PROMPT_METRICS {
        if let Some(stats) = metrics.get(name) {
            if let Ok(value) = serde_json::to_value(stats) {
                selected.insert(name.to_string(), value);
            }
        }
    }
    Value::Object(selected)
}

pub fn build_messages(metrics: &MetricsModel) -> Vec<ChatMessage> {
    let rendered = serde_json::to_string_pretty(&prompt_metrics(metrics))
        .unwrap_or_else(|_| "{}".to_string());
    vec![
        ChatMessage {
            role: "system".into(),
            content: SYSTEM_PROMPT.into(),
        },
        ChatMessage {
            role: "user".into(),
            content: format!(
                "Here are the summary metrics of the run (durations in ms, data in bytes):\n\n{}\n\n{}",
                rendered, FORMAT_INSTRUCTIONS
            ),
        },
    ]
}

pub struct InsightClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    temperature: f64,
    retry_pause: Duration,
}

impl InsightClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        temperature: f64,
        request_timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| PipelineError::Insight(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            temperature,
            retry_pause: Duration::from_secs(2),
        })
    }

    pub fn with_retry_pause(mut self, pause: Duration) -> Self {
        self.retry_pause = pause;
        self
    }

    /// Asks the endpoint for commentary on `metrics`, retrying once after a
    /// failed attempt. The text comes back trimmed and otherwise unchecked.
    pub async fn request_insight(&self, metrics: &MetricsModel) -> Result<String> {
        let messages = build_messages(metrics);
        match self.send_once(&messages).await {
            Ok(text) => Ok(text),
            Err(first) => {
                warn!("🔁 Insight request failed ({}); retrying once", first);
                sleep(self.retry_pause).await;
                self.send_once(&messages).await
            }
        }
    }

    async fn send_once(&self, messages: &[ChatMessage]) -> Result<String> {
        let payload = CompletionRequest {
            messages,
            temperature: self.temperature,
        };
        let response = self
            .http
            .post(&self.endpoint)
            .header("api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| PipelineError::Insight(e.to_string()))?
            .error_for_status()
            .map_err(|e| PipelineError::Insight(e.to_string()))?;

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Insight(format!("malformed response: {}", e)))?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| PipelineError::Insight("response contained no choices".into()))
    }
}

/// Best-effort commentary. Without a client, or when the request fails,
/// the placeholder is returned and the run carries on.
pub async fn insight_or_placeholder(
    client: Option<&InsightClient>,
    metrics: &MetricsModel,
) -> InsightText {
    let Some(client) = client else {
        info!("⏭️ Insight request skipped");
        return InsightText::Placeholder(format!("{} (skipped for this run).", PLACEHOLDER_PREFIX));
    };

    info!("🧠 Requesting analysis from {}", client.endpoint);
    match client.request_insight(metrics).await {
        Ok(text) => {
            info!("✅ Analysis received ({} chars)", text.len());
            InsightText::Received(text)
        }
        Err(e) => {
            warn!("⚠️ {}; rendering report without analysis", e);
            InsightText::Placeholder(format!("{}: {}", PLACEHOLDER_PREFIX, e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn metrics() -> MetricsModel {
        serde_json::from_value(json!({
            "http_reqs": {"count": 10, "rate": 1.0},
            "http_req_duration": {"avg": 12, "min": 5, "med": 10, "max": 50, "p(90)": 30, "p(95)": 40},
            "http_req_tls_handshaking": {"avg": 0, "min": 0, "med": 0, "max": 0}
        }))
        .unwrap()
    }

    /// Serves one canned HTTP response per connection, in order, and hands
    /// back the raw requests it saw.
    async fn stub_server(responses: Vec<(u16, String)>) -> (String, tokio::task::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let mut seen = Vec::new();
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                seen.push(read_request(&mut socket).await);
                let reply = format!(
                    "HTTP/1.1 {} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                socket.write_all(reply.as_bytes()).await.unwrap();
                socket.shutdown().await.ok();
            }
            seen
        });
        (format!("http://{}/chat", addr), handle)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(split) = text.find("\r\n\r\n") {
                let length = text[..split]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= split + 4 + length {
                    return text;
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    fn completion(content: &str) -> String {
        json!({"choices": [{"message": {"role": "assistant", "content": content}}]}).to_string()
    }

    #[test]
    fn prompt_uses_curated_metrics_only() {
        let messages = build_messages(&metrics());
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert!(messages[1].content.contains("http_req_duration"));
        assert!(messages[1].content.contains("p(95)"));
        assert!(!messages[1].content.contains("tls_handshaking"));
        assert!(messages[1].content.contains("<table>"));
    }

    #[tokio::test]
    async fn successful_response_is_trimmed_verbatim() {
        let (endpoint, server) = stub_server(vec![(200, completion("  <table><tr><td>ok</td></tr></table>\n"))]).await;
        let client = InsightClient::new(endpoint, "secret", 0.2, Duration::from_secs(5)).unwrap();

        let text = client.request_insight(&metrics()).await.unwrap();
        assert_eq!(text, "<table><tr><td>ok</td></tr></table>");

        let requests = server.await.unwrap();
        assert!(requests[0].to_lowercase().contains("api-key: secret"));
        assert!(requests[0].contains("\"temperature\":0.2"));
        assert!(requests[0].contains("\"messages\""));
    }

    #[tokio::test]
    async fn one_retry_after_a_server_error() {
        let (endpoint, server) = stub_server(vec![
            (500, "{}".to_string()),
            (200, completion("second time lucky")),
        ])
        .await;
        let client = InsightClient::new(endpoint, "k", 0.0, Duration::from_secs(5))
            .unwrap()
            .with_retry_pause(Duration::from_millis(10));

        let text = client.request_insight(&metrics()).await.unwrap();
        assert_eq!(text, "second time lucky");
        assert_eq!(server.await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn malformed_body_degrades_to_placeholder() {
        let (endpoint, _server) = stub_server(vec![
            (200, "{\"unexpected\": true}".to_string()),
            (200, "[]".to_string()),
        ])
        .await;
        let client = InsightClient::new(endpoint, "k", 0.0, Duration::from_secs(5))
            .unwrap()
            .with_retry_pause(Duration::from_millis(10));

        let insight = insight_or_placeholder(Some(&client), &metrics()).await;
        assert!(!insight.is_received());
        assert!(insight.as_str().starts_with(PLACEHOLDER_PREFIX));
    }

    #[tokio::test]
    async fn unreachable_endpoint_degrades_to_placeholder() {
        let client = InsightClient::new("http://127.0.0.1:1/chat", "k", 0.0, Duration::from_secs(2))
            .unwrap()
            .with_retry_pause(Duration::from_millis(10));
        let insight = insight_or_placeholder(Some(&client), &metrics()).await;
        assert!(matches!(insight, InsightText::Placeholder(_)));
    }

    #[tokio::test]
    async fn no_client_means_placeholder() {
        let insight = insight_or_placeholder(None, &metrics()).await;
        assert!(insight.as_str().contains("skipped"));
    }
}
