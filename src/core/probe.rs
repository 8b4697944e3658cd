//! Deployment liveness probe.
//!
//! A probe sends one minimal Anthropic-style message to a deployment's
//! inference URL and records what came back. Failures are data, not errors:
//! a sweep over many deployments keeps going and reports each outcome.

use std::time::{Duration, Instant};

use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::core::http::{snippet, timeout_secs};
use crate::error::{AidrError, Result};

/// Response header that may name the serving model.
pub const MODEL_ID_HEADER: &str = "x-model-id";

/// Anthropic-on-Bedrock API version sent with every probe.
pub const DEFAULT_ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Token budget for a probe reply.
pub const DEFAULT_MAX_TOKENS: u32 = 10;

/// Probe prompt.
pub const DEFAULT_PROMPT: &str = "Say 'test'";

/// Payload sent to a deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    pub anthropic_version: String,
    pub max_tokens: u32,
    pub prompt: String,
}

impl Default for ProbeRequest {
    fn default() -> Self {
        Self {
            anthropic_version: DEFAULT_ANTHROPIC_VERSION.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }
}

impl ProbeRequest {
    /// JSON body for the inference endpoint.
    #[must_use]
    pub fn to_body(&self) -> Value {
        json!({
            "anthropic_version": self.anthropic_version,
            "max_tokens": self.max_tokens,
            "messages": [{"role": "user", "content": self.prompt}],
        })
    }
}

/// Why a probe did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeFailure {
    /// No answer within the timeout.
    Timeout { seconds: u64 },
    /// The deployment answered with a non-2xx status.
    Http { status: u16, body: String },
    /// Connection-level failure other than a timeout.
    Transport { message: String },
    /// 2xx, but the body was not JSON.
    MalformedBody { message: String },
}

impl ProbeFailure {
    /// One-line description for reports.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Timeout { seconds } => format!("timed out after {seconds}s"),
            Self::Http { status, body } if body.is_empty() => format!("HTTP {status}"),
            Self::Http { status, body } => format!("HTTP {status}: {body}"),
            Self::Transport { message } => format!("transport error: {message}"),
            Self::MalformedBody { message } => format!("malformed body: {message}"),
        }
    }
}

/// Outcome of probing one deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    pub deployment_id: String,
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_hint: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_body: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ProbeFailure>,

    pub elapsed_ms: u64,
}

impl ProbeResult {
    fn failed(
        deployment_id: &str,
        status_code: Option<u16>,
        failure: ProbeFailure,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            deployment_id: deployment_id.to_string(),
            success: false,
            status_code,
            model_hint: None,
            text: None,
            raw_body: None,
            error: Some(failure),
            elapsed_ms,
        }
    }

    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self.error, Some(ProbeFailure::Timeout { .. }))
    }

    /// Convert a failed probe into the matching error.
    ///
    /// # Errors
    ///
    /// `ProbeTimeout` for timeouts, `Probe` for everything else.
    pub fn into_result(self) -> Result<Self> {
        match self.error {
            None => Ok(self),
            Some(ProbeFailure::Timeout { seconds }) => Err(AidrError::ProbeTimeout {
                deployment_id: self.deployment_id,
                seconds,
            }),
            Some(failure) => Err(AidrError::Probe {
                status: self.status_code,
                message: failure.describe(),
                deployment_id: self.deployment_id,
            }),
        }
    }
}

/// Concatenate `content[*].text` for blocks of `type == "text"`.
///
/// Returns `None` when the body has no `content` array.
#[must_use]
pub fn extract_text(body: &Value) -> Option<String> {
    let blocks = body.get("content")?.as_array()?;
    Some(
        blocks
            .iter()
            .filter(|block| block.get("type").and_then(Value::as_str) == Some("text"))
            .filter_map(|block| block.get("text").and_then(Value::as_str))
            .collect(),
    )
}

fn model_hint_from(headers: &reqwest::header::HeaderMap) -> Option<String> {
    headers
        .get(MODEL_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("unknown"))
        .map(ToString::to_string)
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn transport_failure(e: &reqwest::Error, timeout: Duration) -> ProbeFailure {
    if e.is_timeout() {
        ProbeFailure::Timeout {
            seconds: timeout_secs(timeout),
        }
    } else {
        ProbeFailure::Transport {
            message: e.to_string(),
        }
    }
}

/// Send a prepared probe request and classify the outcome.
///
/// The request must already carry auth headers and the JSON body.
pub(crate) async fn execute(
    request: RequestBuilder,
    deployment_id: &str,
    timeout: Duration,
) -> ProbeResult {
    let start = Instant::now();
    let response = match request.timeout(timeout).send().await {
        Ok(response) => response,
        Err(e) => {
            let failure = transport_failure(&e, timeout);
            tracing::warn!(deployment_id, error = %failure.describe(), "Probe failed");
            return ProbeResult::failed(deployment_id, None, failure, elapsed_ms(start));
        }
    };

    let status = response.status().as_u16();
    let model_hint = model_hint_from(response.headers());
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            let failure = transport_failure(&e, timeout);
            return ProbeResult::failed(deployment_id, Some(status), failure, elapsed_ms(start));
        }
    };
    let elapsed = elapsed_ms(start);

    if !(200..300).contains(&status) {
        tracing::warn!(deployment_id, status, duration_ms = elapsed, "Probe rejected");
        let failure = ProbeFailure::Http {
            status,
            body: snippet(&body),
        };
        return ProbeResult::failed(deployment_id, Some(status), failure, elapsed);
    }

    let raw: Value = match serde_json::from_str(&body) {
        Ok(raw) => raw,
        Err(e) => {
            let failure = ProbeFailure::MalformedBody {
                message: e.to_string(),
            };
            return ProbeResult::failed(deployment_id, Some(status), failure, elapsed);
        }
    };

    tracing::info!(deployment_id, status, duration_ms = elapsed, "Probe succeeded");
    ProbeResult {
        deployment_id: deployment_id.to_string(),
        success: true,
        status_code: Some(status),
        model_hint,
        text: extract_text(&raw),
        raw_body: Some(raw),
        error: None,
        elapsed_ms: elapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_body_matches_wire_contract() {
        let body = ProbeRequest::default().to_body();
        assert_eq!(
            body,
            json!({
                "anthropic_version": "bedrock-2023-05-31",
                "max_tokens": 10,
                "messages": [{"role": "user", "content": "Say 'test'"}]
            })
        );
    }

    #[test]
    fn extract_text_joins_text_blocks_only() {
        let body = json!({
            "content": [
                {"type": "text", "text": "te"},
                {"type": "tool_use", "name": "x"},
                {"type": "text", "text": "st"}
            ]
        });
        assert_eq!(extract_text(&body).as_deref(), Some("test"));
    }

    #[test]
    fn extract_text_without_content_is_none() {
        assert!(extract_text(&json!({"choices": []})).is_none());
    }

    #[test]
    fn into_result_keeps_timeout_distinct() {
        let timeout = ProbeResult::failed("d1", None, ProbeFailure::Timeout { seconds: 10 }, 10_000);
        assert!(timeout.is_timeout());
        assert!(matches!(
            timeout.into_result(),
            Err(AidrError::ProbeTimeout { seconds: 10, .. })
        ));

        let http = ProbeResult::failed(
            "d1",
            Some(500),
            ProbeFailure::Http {
                status: 500,
                body: "boom".to_string(),
            },
            12,
        );
        match http.into_result() {
            Err(AidrError::Probe {
                status, message, ..
            }) => {
                assert_eq!(status, Some(500));
                assert!(message.contains("boom"));
            }
            other => panic!("expected Probe error, got {other:?}"),
        }
    }

    #[test]
    fn failure_serializes_with_kind_tag() {
        let value = serde_json::to_value(ProbeFailure::Timeout { seconds: 3 }).unwrap();
        assert_eq!(value, json!({"kind": "timeout", "seconds": 3}));
    }

    #[test]
    fn model_hint_ignores_unknown_placeholder() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(MODEL_ID_HEADER, "unknown".parse().unwrap());
        assert!(model_hint_from(&headers).is_none());
        headers.insert(MODEL_ID_HEADER, "claude-4.5-opus".parse().unwrap());
        assert_eq!(model_hint_from(&headers).as_deref(), Some("claude-4.5-opus"));
    }
}
