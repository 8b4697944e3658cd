//! Routing config (`config.json`) shared with the downstream proxy.
//!
//! ```json
//! {
//!   "subAccounts": {
//!     "main": {
//!       "resource_group": "default",
//!       "service_key_json": "key.json",
//!       "deployment_models": { "claude-4.5-opus": ["https://.../v2/inference/deployments/d1"] }
//!     }
//!   },
//!   "secret_authentication_tokens": ["sk-..."]
//! }
//! ```
//!
//! `resource_group` is required for every subaccount. Service key paths are
//! resolved relative to the directory holding the config file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::credentials::ServiceCredential;
use crate::error::{AidrError, Result};

/// Service key file name used when a subaccount does not name one.
pub const DEFAULT_SERVICE_KEY: &str = "key.json";

#[derive(Debug, Deserialize)]
struct RoutingConfigFile {
    #[serde(rename = "subAccounts", default)]
    sub_accounts: BTreeMap<String, SubAccountFile>,

    #[serde(default)]
    secret_authentication_tokens: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SubAccountFile {
    #[serde(default)]
    resource_group: Option<String>,

    #[serde(default)]
    service_key_json: Option<String>,

    #[serde(default)]
    deployment_models: BTreeMap<String, Vec<String>>,
}

/// One AI Core tenant scope: a service key plus a resource group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubAccount {
    pub name: String,
    pub resource_group: String,
    pub service_key_path: PathBuf,
    /// Routing table the proxy currently uses (`model -> [url]`).
    pub deployment_models: BTreeMap<String, Vec<String>>,
}

impl SubAccount {
    /// Load and validate this subaccount's service key.
    ///
    /// # Errors
    ///
    /// `ConfigNotFound`, `ConfigParse` or `CredentialMissing`.
    pub fn load_credential(&self) -> Result<ServiceCredential> {
        let credential = ServiceCredential::load(&self.service_key_path)?;
        credential.validate()?;
        Ok(credential)
    }

    /// Models whose routing entries point at `url`.
    pub fn models_routed_to<'a>(&'a self, url: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.deployment_models
            .iter()
            .filter(move |(_, urls)| urls.iter().any(|u| u.trim_end_matches('/') == url))
            .map(|(model, _)| model.as_str())
    }
}

/// Parsed routing config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingConfig {
    pub path: PathBuf,
    /// Subaccounts in name order.
    pub sub_accounts: Vec<SubAccount>,
    pub secret_authentication_tokens: Vec<String>,
}

impl RoutingConfig {
    /// Load a routing config file.
    ///
    /// # Errors
    ///
    /// - `ConfigNotFound` if the file does not exist
    /// - `ConfigParse` if it is not valid JSON
    /// - `ConfigInvalid` if a subaccount lacks `resource_group` or none are configured
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AidrError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let mut config = Self::parse(&content, base_dir).map_err(|e| match e {
            AidrError::Json(e) => AidrError::ConfigParse {
                path: path.display().to_string(),
                message: e.to_string(),
            },
            other => other,
        })?;
        config.path = path.to_path_buf();
        tracing::debug!(
            path = %path.display(),
            subaccounts = config.sub_accounts.len(),
            "Loaded routing config"
        );
        Ok(config)
    }

    /// Parse routing config JSON; key paths are resolved against `base_dir`.
    ///
    /// # Errors
    ///
    /// `Json` on malformed input, `ConfigInvalid` on missing required values.
    pub fn parse(content: &str, base_dir: &Path) -> Result<Self> {
        let file: RoutingConfigFile = serde_json::from_str(content)?;

        if file.sub_accounts.is_empty() {
            return Err(AidrError::ConfigInvalid {
                key: "subAccounts".to_string(),
                message: "no subaccounts configured".to_string(),
            });
        }

        let sub_accounts = file
            .sub_accounts
            .into_iter()
            .map(|(name, raw)| {
                let resource_group = raw
                    .resource_group
                    .map(|g| g.trim().to_string())
                    .filter(|g| !g.is_empty())
                    .ok_or_else(|| AidrError::ConfigInvalid {
                        key: format!("subAccounts.{name}.resource_group"),
                        message: "resource_group is required".to_string(),
                    })?;
                let key_file = raw
                    .service_key_json
                    .filter(|k| !k.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_SERVICE_KEY.to_string());
                Ok(SubAccount {
                    service_key_path: base_dir.join(key_file),
                    name,
                    resource_group,
                    deployment_models: raw.deployment_models,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            path: PathBuf::new(),
            sub_accounts,
            secret_authentication_tokens: file.secret_authentication_tokens,
        })
    }

    /// All subaccounts, or just the named one.
    ///
    /// # Errors
    ///
    /// `SubAccountNotFound` if `name` is not configured.
    pub fn select(&self, name: Option<&str>) -> Result<Vec<&SubAccount>> {
        match name {
            None => Ok(self.sub_accounts.iter().collect()),
            Some(name) => self
                .sub_accounts
                .iter()
                .find(|s| s.name == name)
                .map(|s| vec![s])
                .ok_or_else(|| AidrError::SubAccountNotFound(name.to_string())),
        }
    }

    /// First configured proxy key, if any.
    #[must_use]
    pub fn proxy_token(&self) -> Option<&str> {
        self.secret_authentication_tokens
            .iter()
            .map(|t| t.trim())
            .find(|t| !t.is_empty())
    }
}
