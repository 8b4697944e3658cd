//! OAuth2 client-credentials token acquisition.
//!
//! Tokens are never cached or persisted. Every top-level operation calls
//! [`acquire_token`] once and drops the token when it finishes.

use std::fmt;
use std::time::{Duration, Instant};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::core::credentials::ServiceCredential;
use crate::core::http::{join_url, snippet, timeout_secs};
use crate::error::{AidrError, Result};

/// Where a token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenOrigin {
    /// Exchanged with the auth server for this run.
    ClientCredentials,
    /// Supplied by the caller (`--token` / `AIDR_ACCESS_TOKEN`).
    Override,
}

/// Opaque bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
    issued_at: DateTime<Utc>,
    origin: TokenOrigin,
}

impl AccessToken {
    fn issued(value: String) -> Self {
        Self {
            value,
            issued_at: Utc::now(),
            origin: TokenOrigin::ClientCredentials,
        }
    }

    /// Wrap an externally supplied token.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the value is blank.
    pub fn from_override(value: impl Into<String>) -> Result<Self> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            return Err(AidrError::ConfigInvalid {
                key: "token".to_string(),
                message: "access token override is empty".to_string(),
            });
        }
        Ok(Self {
            value,
            issued_at: Utc::now(),
            origin: TokenOrigin::Override,
        })
    }

    /// Raw token value. Only for building request headers.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub const fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    #[must_use]
    pub const fn origin(&self) -> TokenOrigin {
        self.origin
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .field("origin", &self.origin)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// `Basic base64(client_id:client_secret)` header value.
#[must_use]
pub fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{client_id}:{client_secret}")))
}

/// Token endpoint for an auth base URL.
#[must_use]
pub fn token_url(auth_url: &str) -> String {
    join_url(auth_url, "oauth/token?grant_type=client_credentials")
}

/// Exchange client credentials for a bearer token.
///
/// The credential is validated before any request is sent.
///
/// # Errors
///
/// - `CredentialMissing` if a service-key field is empty (no request made)
/// - `Timeout` if the token endpoint does not answer in time
/// - `AuthFailed` on transport failure, non-2xx status, or a body without
///   a non-empty `access_token`
pub async fn acquire_token(
    http: &Client,
    credential: &ServiceCredential,
    timeout: Duration,
) -> Result<AccessToken> {
    credential.validate()?;

    let url = token_url(credential.auth_url());
    tracing::debug!(
        auth_url = %credential.auth_url(),
        client = %credential.fingerprint(),
        "Requesting access token"
    );

    let start = Instant::now();
    let response = http
        .post(&url)
        .header(
            reqwest::header::AUTHORIZATION,
            basic_auth_header(credential.client_id(), credential.client_secret()),
        )
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                AidrError::Timeout(timeout_secs(timeout))
            } else {
                AidrError::AuthFailed {
                    status: None,
                    message: e.to_string(),
                }
            }
        })?;

    let status = response.status();
    let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    let body = response.text().await.map_err(|e| AidrError::AuthFailed {
        status: Some(status.as_u16()),
        message: e.to_string(),
    })?;

    if !status.is_success() {
        tracing::warn!(status = status.as_u16(), duration_ms, "Token request rejected");
        return Err(AidrError::AuthFailed {
            status: Some(status.as_u16()),
            message: snippet(&body),
        });
    }

    let parsed: TokenResponse =
        serde_json::from_str(&body).map_err(|e| AidrError::AuthFailed {
            status: Some(status.as_u16()),
            message: format!("malformed token response: {e}"),
        })?;

    match parsed.access_token {
        Some(token) if !token.trim().is_empty() => {
            tracing::debug!(duration_ms, "Access token acquired");
            Ok(AccessToken::issued(token))
        }
        _ => Err(AidrError::AuthFailed {
            status: Some(status.as_u16()),
            message: "response has no access_token".to_string(),
        }),
    }
}
