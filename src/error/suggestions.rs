//! Fix suggestion database for aidr errors.
//!
//! Provides actionable fix suggestions mapped to specific error types,
//! including commands, context explanations, and prevention tips.

// =============================================================================
// Fix Suggestion Types
// =============================================================================

/// A fix suggestion for an error.
#[derive(Debug, Clone)]
pub struct FixSuggestion {
    /// Primary fix commands in order of preference.
    /// These should be copy-paste ready for the terminal.
    pub commands: Vec<String>,

    /// Explanation of why this error occurred.
    pub context: String,

    /// Tips to prevent this error in the future.
    pub prevention: Option<String>,

    /// Link to documentation for more information.
    pub doc_url: Option<String>,
}

impl FixSuggestion {
    /// Creates a new fix suggestion with required fields.
    #[must_use]
    pub fn new(commands: Vec<String>, context: impl Into<String>) -> Self {
        Self {
            commands,
            context: context.into(),
            prevention: None,
            doc_url: None,
        }
    }

    /// Builder: adds prevention tips.
    #[must_use]
    pub fn with_prevention(mut self, prevention: impl Into<String>) -> Self {
        self.prevention = Some(prevention.into());
        self
    }

    /// Builder: adds documentation URL.
    #[must_use]
    pub fn with_doc_url(mut self, url: impl Into<String>) -> Self {
        self.doc_url = Some(url.into());
        self
    }
}

const AI_CORE_DOCS: &str = "https://help.sap.com/docs/sap-ai-core";

// =============================================================================
// Authentication
// =============================================================================

/// Suggestions for a service key with a missing field.
#[must_use]
pub fn credential_missing_suggestions(field: &str, origin: Option<&str>) -> Vec<FixSuggestion> {
    let location = origin.unwrap_or("the service key file");
    vec![
        FixSuggestion::new(
            vec!["aidr doctor".to_string()],
            format!("Field '{field}' is missing or empty in {location}."),
        )
        .with_prevention(
            "Download the complete service key JSON from the BTP cockpit instead of copying fields by hand.",
        )
        .with_doc_url(AI_CORE_DOCS),
    ]
}

/// Suggestions for a failed token exchange.
#[must_use]
pub fn auth_failed_suggestions(status: Option<u16>, message: &str) -> Vec<FixSuggestion> {
    let context = match status {
        Some(401 | 403) => format!(
            "The token endpoint rejected the client credentials ({message}). The service key may have been rotated."
        ),
        Some(code) => format!("The token endpoint answered HTTP {code}: {message}"),
        None => format!("The token endpoint could not be reached or answered oddly: {message}"),
    };
    vec![
        FixSuggestion::new(vec!["aidr doctor".to_string()], context)
            .with_prevention("Re-download the service key after rotating credentials."),
    ]
}

// =============================================================================
// Control plane
// =============================================================================

/// Suggestions for a failed listing call.
#[must_use]
pub fn resource_list_suggestions(resource: &str, status: u16) -> Vec<FixSuggestion> {
    let context = match status {
        401 => format!("Listing {resource} was unauthorized. The token expired; run the command again to acquire a fresh one."),
        403 => format!("Listing {resource} was forbidden. Check that the resource group is correct for this service key."),
        404 => format!("Listing {resource} returned 404. Check serviceurls.AI_API_URL in the service key."),
        _ => format!("Listing {resource} failed with HTTP {status}."),
    };
    vec![FixSuggestion::new(
        vec!["aidr --verbose doctor".to_string()],
        context,
    )]
}

/// Suggestions for a failed deployment probe.
#[must_use]
pub fn probe_failed_suggestions(deployment_id: &str, status: Option<u16>) -> Vec<FixSuggestion> {
    let context = match status {
        Some(404) => format!(
            "Deployment {deployment_id} was not found. It may have been deleted or belong to another resource group."
        ),
        Some(400) => format!(
            "Deployment {deployment_id} rejected the probe payload. It may serve a model with a different request schema."
        ),
        Some(code) => format!("Deployment {deployment_id} answered HTTP {code}."),
        None => format!("Deployment {deployment_id} could not be reached."),
    };
    vec![FixSuggestion::new(
        vec!["aidr deployments".to_string()],
        context,
    )]
}

/// Suggestions for a probe timeout.
#[must_use]
pub fn probe_timeout_suggestions(deployment_id: &str, seconds: u64) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec![format!(
            "aidr probe {deployment_id} --timeout {}",
            seconds.saturating_mul(3)
        )],
        format!(
            "Deployment {deployment_id} did not answer within {seconds}s. It may be scaling up or unhealthy."
        ),
    )]
}

/// Suggestions for a generic timeout.
#[must_use]
pub fn timeout_suggestions(seconds: u64) -> Vec<FixSuggestion> {
    vec![
        FixSuggestion::new(
            vec!["aidr doctor".to_string()],
            format!("The request did not complete within {seconds}s."),
        )
        .with_prevention("Raise AIDR_TIMEOUT or general.timeout_seconds for slow networks."),
    ]
}

// =============================================================================
// Configuration
// =============================================================================

/// Suggestions for a missing config file.
#[must_use]
pub fn config_not_found_suggestions(path: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec![
            format!("ls -l {path}"),
            "aidr --config path/to/config.json doctor".to_string(),
        ],
        format!("No file at {path}."),
    )]
}

/// Suggestions for an unparseable config file.
#[must_use]
pub fn config_parse_suggestions(path: &str, message: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec![format!("cat {path}")],
        format!("{path} could not be parsed: {message}"),
    )]
}

/// Suggestions for an invalid config value.
#[must_use]
pub fn config_invalid_suggestions(key: &str, message: &str) -> Vec<FixSuggestion> {
    let mut suggestion =
        FixSuggestion::new(vec!["aidr doctor".to_string()], format!("'{key}': {message}"));
    if key.ends_with("resource_group") {
        suggestion = suggestion.with_prevention(
            "Every subaccount must name its resource group explicitly; there is no default.",
        );
    }
    vec![suggestion]
}

/// Suggestions for an unknown subaccount.
#[must_use]
pub fn subaccount_not_found_suggestions(name: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec!["aidr doctor".to_string()],
        format!("No entry named '{name}' under subAccounts in the routing config."),
    )]
}

// =============================================================================
// Environment
// =============================================================================

/// Suggestions for a missing CLI tool.
#[must_use]
pub fn cli_not_found_suggestions(name: &str) -> Vec<FixSuggestion> {
    let commands = match name {
        "claude" => vec!["npm install -g @anthropic-ai/claude-code".to_string()],
        "git" => vec!["# Install git from https://git-scm.com/downloads".to_string()],
        other => vec![format!("# Install {other} and make sure it is on PATH")],
    };
    vec![FixSuggestion::new(commands, format!("{name} was not found in PATH."))]
}

/// Suggestions when the downstream proxy smoke test fails.
#[must_use]
pub fn proxy_check_suggestions() -> Vec<FixSuggestion> {
    vec![
        FixSuggestion::new(
            vec![
                "aidr proxy-check --http-only".to_string(),
                "aidr find --match opus".to_string(),
            ],
            "The proxy did not answer correctly. Make sure it is running and its deployment URLs are current.",
        )
        .with_prevention("Run `aidr proxy-check` after every proxy change before calling an issue resolved."),
    ]
}
