//! Core data models for the AI Core control plane.
//!
//! Wire types follow the `/v2/lm/*` JSON shapes (camelCase). Every field the
//! resolver does not strictly need defaults to empty so that a listing with
//! partial objects still deserializes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::core::http::join_url;

// =============================================================================
// Listing envelope
// =============================================================================

/// Envelope returned by `GET /v2/lm/configurations` and `/v2/lm/deployments`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    #[serde(default)]
    pub count: Option<u64>,

    #[serde(default = "Vec::new")]
    pub resources: Vec<T>,
}

/// Treat an explicit JSON `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// Configuration
// =============================================================================

/// A named configuration binding a scenario and executable to parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Configuration {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub scenario_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub executable_id: Option<String>,

    #[serde(deserialize_with = "null_as_default")]
    pub input_artifact_bindings: Vec<Value>,

    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub parameter_bindings: Vec<Value>,
}

// =============================================================================
// Deployment
// =============================================================================

/// Deployment lifecycle status as reported by the control plane.
///
/// Wire values are upper-case. Unrecognized values survive in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeploymentStatus {
    Running,
    Pending,
    Stopped,
    Dead,
    #[default]
    Unknown,
    Other(String),
}

impl DeploymentStatus {
    /// Parse a wire value. Matching is case-sensitive.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "RUNNING" => Self::Running,
            "PENDING" => Self::Pending,
            "STOPPED" => Self::Stopped,
            "DEAD" => Self::Dead,
            "UNKNOWN" | "" => Self::Unknown,
            other => Self::Other(other.to_string()),
        }
    }

    /// Wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Running => "RUNNING",
            Self::Pending => "PENDING",
            Self::Stopped => "STOPPED",
            Self::Dead => "DEAD",
            Self::Unknown => "UNKNOWN",
            Self::Other(value) => value,
        }
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl From<String> for DeploymentStatus {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<DeploymentStatus> for String {
    fn from(status: DeploymentStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A deployment as returned by the listing endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Deployment {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub configuration_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario_id: Option<String>,

    #[serde(deserialize_with = "null_as_default")]
    pub status: DeploymentStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_url: Option<String>,
}

/// Inference URL for a deployment: `{api_base}/v2/inference/deployments/{id}`.
#[must_use]
pub fn deployment_url(api_base: &str, deployment_id: &str) -> String {
    join_url(
        api_base,
        &format!("v2/inference/deployments/{deployment_id}"),
    )
}

/// Raw body of `GET /v2/lm/deployments/{id}`.
///
/// Kept as JSON; only the identity chain looks inside.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct DeploymentDetails(pub Value);

impl DeploymentDetails {
    /// `details.resources.backend_details.model.name`, if present and a string.
    #[must_use]
    pub fn backend_model_name(&self) -> Option<&str> {
        self.0
            .pointer("/details/resources/backend_details/model/name")
            .and_then(Value::as_str)
    }

    /// Top-level `configurationName`, if present and a string.
    #[must_use]
    pub fn configuration_name(&self) -> Option<&str> {
        self.0.get("configurationName").and_then(Value::as_str)
    }
}

// =============================================================================
// Correlation output
// =============================================================================

/// A deployment whose configuration satisfied the name predicate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModelMatch {
    pub config_id: String,
    pub config_name: String,
    pub deployment_id: String,
    pub deployment_url: String,
    pub status: DeploymentStatus,
}

impl ModelMatch {
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.status.is_running()
    }
}

// =============================================================================
// Robot output envelope
// =============================================================================

/// Serializable fix suggestion for robot output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixSuggestionReport {
    pub commands: Vec<String>,
    pub context: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prevention: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_url: Option<String>,
}

impl From<&crate::error::FixSuggestion> for FixSuggestionReport {
    fn from(s: &crate::error::FixSuggestion) -> Self {
        Self {
            commands: s.commands.clone(),
            context: s.context.clone(),
            prevention: s.prevention.clone(),
            doc_url: s.doc_url.clone(),
        }
    }
}

/// Structured report for an error attached to a scope (subaccount or deployment).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub scope: String,
    pub message: String,
    pub error_code: String,
    pub retryable: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<FixSuggestionReport>,
}

impl ErrorReport {
    #[must_use]
    pub fn from_error(scope: impl Into<String>, error: &crate::error::AidrError) -> Self {
        Self {
            scope: scope.into(),
            message: error.to_string(),
            error_code: error.error_code().to_string(),
            retryable: error.is_retryable(),
            suggestions: error
                .fix_suggestions()
                .iter()
                .map(FixSuggestionReport::from)
                .collect(),
        }
    }
}

/// Schema identifier stamped on every robot envelope.
pub const SCHEMA_VERSION: &str = "aidr.v1";

/// Top-level JSON envelope for robot mode output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotOutput<T> {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub command: String,
    pub data: T,

    #[serde(default)]
    pub errors: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<Vec<ErrorReport>>,
}

impl<T> RobotOutput<T> {
    /// Create a new robot output envelope.
    pub fn new(command: impl Into<String>, data: T) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            command: command.into(),
            data,
            errors: Vec::new(),
            error_details: None,
        }
    }

    /// Attach structured error details; plain messages are derived from them.
    #[must_use]
    pub fn with_error_details(mut self, details: Vec<ErrorReport>) -> Self {
        if details.is_empty() {
            return self;
        }
        self.errors = details
            .iter()
            .map(|d| format!("{}: {}", d.scope, d.message))
            .collect();
        self.error_details = Some(details);
        self
    }
}
