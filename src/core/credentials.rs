//! Service-key credentials for the AI Core control plane.
//!
//! A service key is the JSON document downloaded from the BTP cockpit:
//!
//! ```json
//! {
//!   "clientid": "sb-...",
//!   "clientsecret": "...",
//!   "url": "https://<subdomain>.authentication.<region>.hana.ondemand.com",
//!   "serviceurls": { "AI_API_URL": "https://api.ai.<region>.ml.hana.ondemand.com" }
//! }
//! ```
//!
//! Missing fields are tolerated at load time and reported by
//! [`ServiceCredential::validate`], so a multi-subaccount sweep can skip a
//! broken key without aborting the run.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::core::models::deployment_url;
use crate::error::{AidrError, Result};

/// Wire name of the client id field.
pub const FIELD_CLIENT_ID: &str = "clientid";
/// Wire name of the client secret field.
pub const FIELD_CLIENT_SECRET: &str = "clientsecret";
/// Wire name of the auth base URL field.
pub const FIELD_AUTH_URL: &str = "url";
/// Wire path of the API base URL field.
pub const FIELD_API_URL: &str = "serviceurls.AI_API_URL";

#[derive(Debug, Default, Deserialize)]
struct ServiceKeyFile {
    #[serde(default)]
    clientid: Option<String>,
    #[serde(default)]
    clientsecret: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    serviceurls: Option<ServiceUrls>,
}

#[derive(Debug, Default, Deserialize)]
struct ServiceUrls {
    #[serde(rename = "AI_API_URL", default)]
    ai_api_url: Option<String>,
}

/// Client credentials and endpoints for one AI Core instance.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceCredential {
    client_id: String,
    client_secret: String,
    auth_url: String,
    api_url: String,
    origin: Option<String>,
}

impl ServiceCredential {
    /// Build a credential from explicit parts.
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        auth_url: impl Into<String>,
        api_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_url: auth_url.into(),
            api_url: api_url.into(),
            origin: None,
        }
    }

    /// Parse a service key document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON. Missing fields are
    /// not an error here; see [`Self::validate`].
    pub fn from_json_str(content: &str) -> Result<Self> {
        let key: ServiceKeyFile = serde_json::from_str(content)?;
        Ok(Self {
            client_id: key.clientid.unwrap_or_default(),
            client_secret: key.clientsecret.unwrap_or_default(),
            auth_url: key.url.unwrap_or_default(),
            api_url: key
                .serviceurls
                .and_then(|urls| urls.ai_api_url)
                .unwrap_or_default(),
            origin: None,
        })
    }

    /// Load a service key file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigNotFound` if the file does not exist and `ConfigParse`
    /// if it is not valid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AidrError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        let credential = Self::from_json_str(&content).map_err(|e| AidrError::ConfigParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), client = %credential.fingerprint(), "Loaded service key");
        Ok(credential.with_origin(path.display().to_string()))
    }

    /// Record where this credential came from (used in error messages).
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Check that all four fields are present.
    ///
    /// # Errors
    ///
    /// Returns `CredentialMissing` naming the first empty field.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            (FIELD_CLIENT_ID, &self.client_id),
            (FIELD_CLIENT_SECRET, &self.client_secret),
            (FIELD_AUTH_URL, &self.auth_url),
            (FIELD_API_URL, &self.api_url),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(AidrError::CredentialMissing {
                    field,
                    origin: self.origin.clone(),
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    #[must_use]
    pub fn auth_url(&self) -> &str {
        &self.auth_url
    }

    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    #[must_use]
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Inference URL for a deployment served by this instance.
    #[must_use]
    pub fn deployment_url(&self, deployment_id: &str) -> String {
        deployment_url(&self.api_url, deployment_id)
    }

    /// Short, stable identifier for logs. Never reveals the client id.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.client_id.as_bytes());
        hex::encode(&digest[..6])
    }
}

impl fmt::Debug for ServiceCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceCredential")
            .field("client", &self.fingerprint())
            .field("auth_url", &self.auth_url)
            .field("api_url", &self.api_url)
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_KEY: &str = r#"{
        "clientid": "sb-client",
        "clientsecret": "s3cret",
        "url": "https://auth.example.com",
        "serviceurls": { "AI_API_URL": "https://api.example.com" },
        "appname": "ignored"
    }"#;

    #[test]
    fn parses_full_service_key() {
        let credential = ServiceCredential::from_json_str(FULL_KEY).unwrap();
        assert_eq!(credential.client_id(), "sb-client");
        assert_eq!(credential.client_secret(), "s3cret");
        assert_eq!(credential.auth_url(), "https://auth.example.com");
        assert_eq!(credential.api_url(), "https://api.example.com");
        assert!(credential.validate().is_ok());
    }

    #[test]
    fn validate_reports_missing_api_url() {
        let credential = ServiceCredential::from_json_str(
            r#"{"clientid":"a","clientsecret":"b","url":"https://auth"}"#,
        )
        .unwrap();
        match credential.validate() {
            Err(AidrError::CredentialMissing { field, .. }) => assert_eq!(field, FIELD_API_URL),
            other => panic!("expected CredentialMissing, got {other:?}"),
        }
    }

    #[test]
    fn validate_treats_blank_as_missing() {
        let credential = ServiceCredential::new("id", "   ", "https://auth", "https://api");
        match credential.validate() {
            Err(AidrError::CredentialMissing { field, .. }) => {
                assert_eq!(field, FIELD_CLIENT_SECRET);
            }
            other => panic!("expected CredentialMissing, got {other:?}"),
        }
    }

    #[test]
    fn validate_carries_origin() {
        let credential = ServiceCredential::new("", "b", "c", "d").with_origin("keys/main.json");
        let err = credential.validate().unwrap_err();
        assert!(err.to_string().contains("keys/main.json"));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let credential = ServiceCredential::from_json_str(FULL_KEY).unwrap();
        let debug = format!("{credential:?}");
        assert!(!debug.contains("s3cret"));
        assert!(!debug.contains("sb-client"));
        assert!(debug.contains(&credential.fingerprint()));
    }

    #[test]
    fn fingerprint_is_stable_and_short() {
        let a = ServiceCredential::new("sb-client", "x", "y", "z");
        let b = ServiceCredential::new("sb-client", "other", "y", "z");
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 12);
    }

    #[test]
    fn load_missing_file_is_config_not_found() {
        let err = ServiceCredential::load(Path::new("/nonexistent/key.json")).unwrap_err();
        assert!(matches!(err, AidrError::ConfigNotFound { .. }));
    }

    #[test]
    fn load_invalid_json_is_config_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.json");
        fs::write(&path, "{not json").unwrap();
        let err = ServiceCredential::load(&path).unwrap_err();
        assert!(matches!(err, AidrError::ConfigParse { .. }));
    }

    #[test]
    fn deployment_url_uses_api_base() {
        let credential = ServiceCredential::from_json_str(FULL_KEY).unwrap();
        assert_eq!(
            credential.deployment_url("d0c56b8d3578bd1b"),
            "https://api.example.com/v2/inference/deployments/d0c56b8d3578bd1b"
        );
    }
}
