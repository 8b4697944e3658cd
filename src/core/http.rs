//! HTTP client utilities.
//!
//! Provides the shared HTTP client and response helpers used by the
//! control-plane client and the proxy check.

use std::time::Duration;

use reqwest::{Client, ClientBuilder};

use crate::error::{AidrError, Result};

/// Default timeout for token and listing requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for deployment probes.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for full inference calls through the proxy.
pub const INFERENCE_TIMEOUT: Duration = Duration::from_secs(120);

/// Maximum number of body characters carried into errors and reports.
pub const BODY_SNIPPET_LEN: usize = 200;

/// Header carrying the AI Core resource group.
pub const RESOURCE_GROUP_HEADER: &str = "AI-Resource-Group";

/// Build a configured HTTP client.
///
/// # Errors
///
/// Returns error if client construction fails.
pub fn build_client(timeout: Duration) -> Result<Client> {
    ClientBuilder::new()
        .timeout(timeout)
        .user_agent(format!("aidr/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| AidrError::Network(e.to_string()))
}

/// Whole seconds for a timeout, rounded up so sub-second values never read as 0.
#[must_use]
pub const fn timeout_secs(timeout: Duration) -> u64 {
    if timeout.subsec_nanos() > 0 {
        timeout.as_secs() + 1
    } else {
        timeout.as_secs()
    }
}

/// Map a transport error, keeping timeouts distinguishable.
#[must_use]
pub fn map_send_error(e: &reqwest::Error, timeout: Duration) -> AidrError {
    if e.is_timeout() {
        AidrError::Timeout(timeout_secs(timeout))
    } else {
        AidrError::Network(e.to_string())
    }
}

/// Truncate a response body for error messages.
#[must_use]
pub fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= BODY_SNIPPET_LEN {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(BODY_SNIPPET_LEN).collect();
        format!("{cut}...")
    }
}

/// Join a base URL and a path without doubling the slash.
#[must_use]
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
