//! Health checks for the doctor command.
//!
//! Each subaccount is checked in order: service key, token, listing. A
//! failing step marks the remaining steps as skipped.

use super::{CheckStatus, DiagnosticCheck, SubaccountHealth};
use crate::core::cli_runner::{locate, run_command};
use crate::core::client::AiCoreClient;
use crate::core::credentials::ServiceCredential;
use crate::core::token::AccessToken;
use crate::error::{AidrError, Result};
use crate::storage::config::Settings;
use crate::storage::routing_config::{RoutingConfig, SubAccount};
use std::path::Path;
use std::time::{Duration, Instant};

/// Default timeout for CLI version checks.
const CLI_VERSION_TIMEOUT: Duration = Duration::from_secs(3);

/// Tools `proxy-check` shells out to.
pub const TOOLS: &[&str] = &["git", "claude"];

// =============================================================================
// Local checks
// =============================================================================

/// Check the settings file at `path` (missing means defaults).
#[must_use]
pub fn check_settings(path: &Path) -> DiagnosticCheck {
    let start = Instant::now();
    let status = match Settings::load_from(path).and_then(|s| s.validate().map(|()| s)) {
        Ok(_) if path.exists() => CheckStatus::pass(path.display().to_string()),
        Ok(_) => CheckStatus::pass("Using defaults"),
        Err(e) => CheckStatus::fail(
            format!("Failed to load: {e}"),
            Some("Fix or remove the settings file"),
        ),
    };
    DiagnosticCheck::new("Settings", status).with_duration(start.elapsed())
}

/// Load the routing config and report on it.
#[must_use]
pub fn check_routing_config(path: &Path) -> (DiagnosticCheck, Option<RoutingConfig>) {
    let start = Instant::now();
    let (status, config) = match RoutingConfig::load(path) {
        Ok(config) => {
            let names: Vec<&str> = config.sub_accounts.iter().map(|s| s.name.as_str()).collect();
            (
                CheckStatus::pass(format!("{} ({})", path.display(), names.join(", "))),
                Some(config),
            )
        }
        Err(e) => (
            CheckStatus::fail(e.to_string(), Some("Pass --config or set AIDR_ROUTING_CONFIG")),
            None,
        ),
    };
    (
        DiagnosticCheck::new("Routing config", status).with_duration(start.elapsed()),
        config,
    )
}

/// Check that an external tool is on `PATH` and report its version.
pub async fn check_tool(name: &str) -> DiagnosticCheck {
    let start = Instant::now();
    let status = match locate(name) {
        Ok(path) => match get_cli_version(name).await {
            Some(version) => CheckStatus::pass(format!("{}, version {version}", path.display())),
            None => CheckStatus::pass(path.display().to_string()),
        },
        Err(_) => CheckStatus::fail(
            "not found in PATH",
            Some(match name {
                "claude" => "npm install -g @anthropic-ai/claude-code (only needed for the CLI check)",
                _ => "Install it and make sure it is on PATH",
            }),
        ),
    };
    DiagnosticCheck::new(format!("{name} installed"), status).with_duration(start.elapsed())
}

async fn get_cli_version(cli_name: &str) -> Option<String> {
    let output = run_command(cli_name, &["--version"], CLI_VERSION_TIMEOUT)
        .await
        .ok()?;
    if !output.success() {
        return None;
    }
    extract_version(&format!("{}{}", output.stdout, output.stderr))
}

/// Extract a version string from CLI output.
fn extract_version(output: &str) -> Option<String> {
    for word in output.lines().flat_map(str::split_whitespace) {
        let word = word.trim_start_matches('v');
        if word.starts_with(|c: char| c.is_ascii_digit())
            && word.contains('.')
            && is_version_string(word)
        {
            return Some(word.to_string());
        }
    }

    output.lines().map(str::trim).find(|l| !l.is_empty()).map(|s| {
        if s.chars().count() <= 50 {
            s.to_string()
        } else {
            format!("{}...", s.chars().take(47).collect::<String>())
        }
    })
}

fn is_version_string(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '+')
}

// =============================================================================
// Subaccount checks
// =============================================================================

/// Load and validate the subaccount's service key.
#[must_use]
pub fn check_service_key(subaccount: &SubAccount) -> (DiagnosticCheck, Option<ServiceCredential>) {
    let start = Instant::now();
    let (status, credential) = match subaccount.load_credential() {
        Ok(credential) => (
            CheckStatus::pass(format!(
                "{} (client {})",
                subaccount.service_key_path.display(),
                credential.fingerprint()
            )),
            Some(credential),
        ),
        Err(e) => (fail_with_suggestion(&e), None),
    };
    (
        DiagnosticCheck::new("Service key", status).with_duration(start.elapsed()),
        credential,
    )
}

/// Run the client-credentials exchange.
pub async fn check_token(client: &AiCoreClient) -> (DiagnosticCheck, Option<AccessToken>) {
    let start = Instant::now();
    let (status, token) = match client.authenticate().await {
        Ok(token) => (CheckStatus::pass("acquired"), Some(token)),
        Err(e) => (status_for(&e), None),
    };
    (
        DiagnosticCheck::new("Token", status).with_duration(start.elapsed()),
        token,
    )
}

/// List deployments and count the RUNNING ones.
pub async fn check_listing(
    client: &AiCoreClient,
    token: &AccessToken,
    resource_group: &str,
) -> DiagnosticCheck {
    let start = Instant::now();
    let status = match client.list_deployments(token, resource_group).await {
        Ok(deployments) => {
            let running = deployments.iter().filter(|d| d.status.is_running()).count();
            if running == 0 {
                CheckStatus::Warning {
                    details: format!("{} deployments, none RUNNING", deployments.len()),
                    suggestion: Some(format!(
                        "Check deployments in resource group '{resource_group}' in AI Launchpad"
                    )),
                }
            } else {
                CheckStatus::pass(format!("{} deployments, {running} RUNNING", deployments.len()))
            }
        }
        Err(e) => status_for(&e),
    };
    DiagnosticCheck::new("Deployments", status).with_duration(start.elapsed())
}

/// Full check chain for one subaccount.
///
/// # Errors
///
/// Returns error only if the HTTP client cannot be built.
pub async fn check_subaccount(
    subaccount: &SubAccount,
    offline: bool,
    timeout: Duration,
) -> Result<SubaccountHealth> {
    let (service_key, credential) = check_service_key(subaccount);

    let mut health = SubaccountHealth {
        subaccount: subaccount.name.clone(),
        resource_group: subaccount.resource_group.clone(),
        service_key,
        token: DiagnosticCheck::new("Token", CheckStatus::skipped("offline")),
        listing: DiagnosticCheck::new("Deployments", CheckStatus::skipped("offline")),
    };

    let Some(credential) = credential else {
        health.token.status = CheckStatus::skipped("service key unusable");
        health.listing.status = CheckStatus::skipped("service key unusable");
        return Ok(health);
    };
    if offline {
        return Ok(health);
    }

    let client = AiCoreClient::with_timeout(credential, timeout)?;
    let (token_check, token) = check_token(&client).await;
    health.token = token_check;
    health.listing = match token {
        Some(token) => check_listing(&client, &token, &subaccount.resource_group).await,
        None => DiagnosticCheck::new("Deployments", CheckStatus::skipped("no token")),
    };

    tracing::debug!(
        subaccount = %subaccount.name,
        ready = health.is_ready(),
        "Checked subaccount"
    );
    Ok(health)
}

fn status_for(error: &AidrError) -> CheckStatus {
    match error {
        AidrError::Timeout(seconds) => CheckStatus::Timeout {
            after: Duration::from_secs(*seconds),
        },
        other => fail_with_suggestion(other),
    }
}

fn fail_with_suggestion(error: &AidrError) -> CheckStatus {
    let suggestion = error
        .fix_suggestions()
        .into_iter()
        .next()
        .and_then(|s| s.commands.into_iter().next());
    CheckStatus::Fail {
        reason: error.to_string(),
        suggestion,
    }
}
