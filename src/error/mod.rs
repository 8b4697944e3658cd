//! Error types for aidr.
//!
//! Uses `thiserror` for structured error types that map to exit codes.
//!
//! ## Error Taxonomy
//!
//! Errors are categorized into six main categories:
//! - **Authentication**: Missing service-key fields, rejected client credentials
//! - **Network**: Connection failures and timeouts (including probe timeouts)
//! - **Configuration**: Settings or routing config parsing, validation, missing values
//! - **ControlPlane**: The AI Core API answered, but not with what we needed
//! - **Environment**: Missing tools (git, claude) or failed subprocesses
//! - **Internal**: Unexpected errors, bugs, or unclassified issues
//!
//! Each error has a stable error code (e.g., `AIDR-A001`) for programmatic handling.
//!
//! ## Fix Suggestions
//!
//! Each error type can provide actionable fix suggestions via the
//! [`AidrError::fix_suggestions()`] method.

pub mod suggestions;

use thiserror::Error;

pub use suggestions::FixSuggestion;

// =============================================================================
// Error Categories
// =============================================================================

/// High-level error categories for classification and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Credential and token issues.
    Authentication,
    /// Network issues (timeout, DNS, connection refused).
    Network,
    /// Configuration issues (parse errors, invalid values, missing files).
    Configuration,
    /// Control-plane API returned an error status or unexpected body.
    ControlPlane,
    /// Environment issues (missing CLIs, subprocess failures).
    Environment,
    /// Internal errors (bugs, unexpected state, unclassified).
    Internal,
}

impl ErrorCategory {
    /// Returns a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Authentication => "Authentication error",
            Self::Network => "Network error",
            Self::Configuration => "Configuration error",
            Self::ControlPlane => "Control plane error",
            Self::Environment => "Environment error",
            Self::Internal => "Internal error",
        }
    }

    /// Returns a short code prefix for this category.
    #[must_use]
    pub const fn code_prefix(&self) -> &'static str {
        match self {
            Self::Authentication => "A",
            Self::Network => "N",
            Self::Configuration => "C",
            Self::ControlPlane => "P",
            Self::Environment => "E",
            Self::Internal => "X",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

// =============================================================================
// Exit Codes
// =============================================================================

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// Unexpected failure
    GeneralError = 1,
    /// Required binary (git, claude) not found
    BinaryNotFound = 2,
    /// Config, credential or response parse errors
    ParseError = 3,
    /// Timeout
    Timeout = 4,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as Self
    }
}

/// Main error type for aidr operations.
#[derive(Error, Debug)]
pub enum AidrError {
    // ==========================================================================
    // Authentication errors
    // ==========================================================================
    /// A required field is missing (or empty) in the service key.
    #[error("service key is missing required field '{field}'{}", source_hint(.origin))]
    CredentialMissing {
        field: &'static str,
        origin: Option<String>,
    },

    /// The token endpoint rejected the exchange or returned a malformed body.
    #[error("token request failed{}: {message}", status_hint(.status))]
    AuthFailed {
        status: Option<u16>,
        message: String,
    },

    // ==========================================================================
    // Control plane errors
    // ==========================================================================
    /// Listing endpoint returned a non-2xx status.
    #[error("listing {resource} failed with HTTP {status}: {body}")]
    ResourceList {
        resource: String,
        status: u16,
        body: String,
    },

    /// Deployment probe failed (non-2xx or transport error).
    #[error("probe of deployment {deployment_id} failed{}: {message}", status_hint(.status))]
    Probe {
        deployment_id: String,
        status: Option<u16>,
        message: String,
    },

    /// Failed to parse a control-plane or proxy response.
    #[error("failed to parse response: {0}")]
    ParseResponse(String),

    // ==========================================================================
    // Network errors
    // ==========================================================================
    /// Deployment probe exceeded its timeout.
    #[error("probe of deployment {deployment_id} timed out after {seconds}s")]
    ProbeTimeout { deployment_id: String, seconds: u64 },

    /// Request timeout.
    #[error("request timeout after {0} seconds")]
    Timeout(u64),

    /// Generic network error.
    #[error("network error: {0}")]
    Network(String),

    // ==========================================================================
    // Configuration errors
    // ==========================================================================
    /// Configuration file not found at expected path.
    #[error("config file not found: {path}")]
    ConfigNotFound { path: String },

    /// Error parsing configuration file.
    #[error("config parse error at {path}: {message}")]
    ConfigParse { path: String, message: String },

    /// Invalid value in configuration.
    #[error("invalid config value for '{key}': {message}")]
    ConfigInvalid { key: String, message: String },

    /// Generic configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Requested subaccount is not in the routing config.
    #[error("subaccount not found in routing config: {0}")]
    SubAccountNotFound(String),

    // ==========================================================================
    // Environment errors
    // ==========================================================================
    /// Required CLI tool not found in PATH.
    #[error("CLI tool not found: {name}")]
    CliNotFound { name: String },

    /// Subprocess failed to run.
    #[error("command {program} failed: {reason}")]
    CommandFailed { program: String, reason: String },

    // ==========================================================================
    // Aggregate failures
    // ==========================================================================
    /// One or more proxy checks failed.
    #[error("proxy check failed: {failed} check(s) did not pass")]
    ProxyCheckFailed { failed: usize },

    /// Some subaccounts or deployments failed during a sweep.
    #[error("partial failure: {failed} item(s) failed")]
    PartialFailure { failed: usize },

    // ==========================================================================
    // Internal errors
    // ==========================================================================
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Catch-all for other errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[allow(clippy::ref_option)]
fn source_hint(origin: &Option<String>) -> String {
    origin.as_deref().map(|o| format!(" ({o})")).unwrap_or_default()
}

#[allow(clippy::ref_option)]
fn status_hint(status: &Option<u16>) -> String {
    status.map(|s| format!(" with HTTP {s}")).unwrap_or_default()
}

impl AidrError {
    /// Map error to process exit code.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self {
            Self::CliNotFound { .. } => ExitCode::BinaryNotFound,

            Self::CredentialMissing { .. }
            | Self::ConfigNotFound { .. }
            | Self::ConfigParse { .. }
            | Self::ConfigInvalid { .. }
            | Self::Config(_)
            | Self::SubAccountNotFound(_)
            | Self::ParseResponse(_) => ExitCode::ParseError,

            Self::Timeout(_) | Self::ProbeTimeout { .. } => ExitCode::Timeout,

            Self::AuthFailed { .. }
            | Self::ResourceList { .. }
            | Self::Probe { .. }
            | Self::Network(_)
            | Self::CommandFailed { .. }
            | Self::ProxyCheckFailed { .. }
            | Self::PartialFailure { .. }
            | Self::Io(_)
            | Self::Json(_)
            | Self::Other(_) => ExitCode::GeneralError,
        }
    }

    /// Returns the error category for classification and routing.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::CredentialMissing { .. } | Self::AuthFailed { .. } => {
                ErrorCategory::Authentication
            }

            Self::ProbeTimeout { .. } | Self::Timeout(_) | Self::Network(_) => {
                ErrorCategory::Network
            }

            Self::ConfigNotFound { .. }
            | Self::ConfigParse { .. }
            | Self::ConfigInvalid { .. }
            | Self::Config(_)
            | Self::SubAccountNotFound(_) => ErrorCategory::Configuration,

            Self::ResourceList { .. }
            | Self::Probe { .. }
            | Self::ParseResponse(_)
            | Self::ProxyCheckFailed { .. }
            | Self::PartialFailure { .. } => ErrorCategory::ControlPlane,

            Self::CliNotFound { .. } | Self::CommandFailed { .. } => ErrorCategory::Environment,

            Self::Io(_) | Self::Json(_) | Self::Other(_) => ErrorCategory::Internal,
        }
    }

    /// Returns a stable error code for programmatic handling.
    ///
    /// Format: `AIDR-{category}{number}`.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::CredentialMissing { .. } => "AIDR-A001",
            Self::AuthFailed { .. } => "AIDR-A002",

            Self::ProbeTimeout { .. } => "AIDR-N001",
            Self::Timeout(_) => "AIDR-N002",
            Self::Network(_) => "AIDR-N099",

            Self::ConfigNotFound { .. } => "AIDR-C001",
            Self::ConfigParse { .. } => "AIDR-C002",
            Self::ConfigInvalid { .. } => "AIDR-C003",
            Self::Config(_) => "AIDR-C004",
            Self::SubAccountNotFound(_) => "AIDR-C010",

            Self::ResourceList { .. } => "AIDR-P001",
            Self::Probe { .. } => "AIDR-P002",
            Self::ParseResponse(_) => "AIDR-P020",
            Self::ProxyCheckFailed { .. } => "AIDR-P030",
            Self::PartialFailure { .. } => "AIDR-P031",

            Self::CliNotFound { .. } => "AIDR-E001",
            Self::CommandFailed { .. } => "AIDR-E002",

            Self::Io(_) => "AIDR-X001",
            Self::Json(_) => "AIDR-X002",
            Self::Other(_) => "AIDR-X099",
        }
    }

    /// Returns whether a caller could reasonably retry.
    ///
    /// aidr never retries on its own; this only informs the caller.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::ProbeTimeout { .. } | Self::Network(_) => true,
            Self::AuthFailed {
                status: Some(status),
                ..
            }
            | Self::ResourceList { status, .. } => *status == 401 || *status >= 500,
            Self::Probe {
                status: Some(status),
                ..
            } => *status >= 500,
            _ => false,
        }
    }

    /// HTTP status carried by the error, if any.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::ResourceList { status, .. } => Some(*status),
            Self::AuthFailed { status, .. } | Self::Probe { status, .. } => *status,
            _ => None,
        }
    }

    /// Whether a multi-subaccount sweep should skip the current subaccount
    /// and carry on rather than abort.
    #[must_use]
    pub const fn skips_subaccount(&self) -> bool {
        matches!(
            self,
            Self::CredentialMissing { .. }
                | Self::ConfigNotFound { .. }
                | Self::ConfigParse { .. }
        )
    }

    /// Returns actionable fix suggestions for this error.
    #[must_use]
    pub fn fix_suggestions(&self) -> Vec<FixSuggestion> {
        match self {
            Self::CredentialMissing { field, origin } => {
                suggestions::credential_missing_suggestions(field, origin.as_deref())
            }
            Self::AuthFailed { status, message } => {
                suggestions::auth_failed_suggestions(*status, message)
            }
            Self::ResourceList {
                resource, status, ..
            } => suggestions::resource_list_suggestions(resource, *status),
            Self::Probe {
                deployment_id,
                status,
                ..
            } => suggestions::probe_failed_suggestions(deployment_id, *status),
            Self::ProbeTimeout {
                deployment_id,
                seconds,
            } => suggestions::probe_timeout_suggestions(deployment_id, *seconds),
            Self::Timeout(seconds) => suggestions::timeout_suggestions(*seconds),
            Self::Network(msg) => vec![FixSuggestion::new(
                vec!["aidr doctor".to_string()],
                format!("Network error: {msg}. Check connectivity to the AI Core endpoints."),
            )],
            Self::ConfigNotFound { path } => suggestions::config_not_found_suggestions(path),
            Self::ConfigParse { path, message } => {
                suggestions::config_parse_suggestions(path, message)
            }
            Self::ConfigInvalid { key, message } => {
                suggestions::config_invalid_suggestions(key, message)
            }
            Self::Config(msg) => vec![FixSuggestion::new(
                vec!["aidr doctor".to_string()],
                format!("Configuration error: {msg}"),
            )],
            Self::SubAccountNotFound(name) => suggestions::subaccount_not_found_suggestions(name),
            Self::ParseResponse(msg) => vec![FixSuggestion::new(
                vec!["aidr --log-level debug doctor".to_string()],
                format!("Unexpected response shape: {msg}. The API may have changed."),
            )],
            Self::CliNotFound { name } => suggestions::cli_not_found_suggestions(name),
            Self::CommandFailed { program, reason } => vec![FixSuggestion::new(
                vec![format!("{program} --version")],
                format!("Running {program} failed: {reason}"),
            )],
            Self::ProxyCheckFailed { .. } => suggestions::proxy_check_suggestions(),
            Self::PartialFailure { failed } => vec![FixSuggestion::new(
                vec!["aidr --verbose deployments".to_string()],
                format!("{failed} item(s) failed. Re-run with --verbose for per-item detail."),
            )],
            Self::Io(e) => vec![FixSuggestion::new(
                Vec::new(),
                format!("I/O error: {e}. Check file permissions and disk space."),
            )],
            Self::Json(e) => vec![FixSuggestion::new(
                Vec::new(),
                format!("JSON error: {e}. A file or response is not valid JSON."),
            )],
            Self::Other(_) => Vec::new(),
        }
    }
}

/// Result type alias for aidr operations.
pub type Result<T> = std::result::Result<T, AidrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_missing_message_names_field_and_origin() {
        let err = AidrError::CredentialMissing {
            field: "clientsecret",
            origin: Some("key.json".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "service key is missing required field 'clientsecret' (key.json)"
        );
        assert_eq!(err.category(), ErrorCategory::Authentication);
        assert_eq!(err.exit_code(), ExitCode::ParseError);
        assert!(err.skips_subaccount());
    }

    #[test]
    fn auth_failed_message_includes_status() {
        let err = AidrError::AuthFailed {
            status: Some(401),
            message: "invalid_client".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "token request failed with HTTP 401: invalid_client"
        );
        assert_eq!(err.status_code(), Some(401));
        assert!(err.is_retryable());
    }

    #[test]
    fn probe_timeout_and_probe_error_are_distinct() {
        let timeout = AidrError::ProbeTimeout {
            deployment_id: "d1".to_string(),
            seconds: 10,
        };
        let failed = AidrError::Probe {
            deployment_id: "d1".to_string(),
            status: Some(500),
            message: "boom".to_string(),
        };
        assert_ne!(timeout.error_code(), failed.error_code());
        assert_eq!(timeout.category(), ErrorCategory::Network);
        assert_eq!(failed.category(), ErrorCategory::ControlPlane);
        assert_eq!(timeout.exit_code(), ExitCode::Timeout);
        assert_eq!(failed.status_code(), Some(500));
    }

    #[test]
    fn resource_list_is_not_retryable_on_client_errors() {
        let err = AidrError::ResourceList {
            resource: "deployments".to_string(),
            status: 404,
            body: "not found".to_string(),
        };
        assert!(!err.is_retryable());
        assert!(!err.skips_subaccount());
    }

    #[test]
    fn error_codes_carry_category_prefix() {
        let errors = [
            AidrError::Config("x".to_string()),
            AidrError::Timeout(5),
            AidrError::CliNotFound {
                name: "git".to_string(),
            },
            AidrError::ParseResponse("x".to_string()),
        ];
        for err in errors {
            let prefix = format!("AIDR-{}", err.category().code_prefix());
            assert!(
                err.error_code().starts_with(&prefix),
                "{} should start with {prefix}",
                err.error_code()
            );
        }
    }

    #[test]
    fn every_configuration_error_has_suggestions() {
        let err = AidrError::SubAccountNotFound("main".to_string());
        assert!(!err.fix_suggestions().is_empty());
    }
}
