//! Robot-mode output (JSON and Markdown).
//!
//! JSON wraps every payload in [`RobotOutput`]; per-subaccount errors go to
//! `errorDetails`. Markdown is a compact key/value rendering for agents.

use std::fmt::Write as _;

use serde::Serialize;

use crate::core::models::{ErrorReport, RobotOutput};
use crate::core::probe::ProbeResult;
use crate::core::proxy_check::ProxyCheckReport;
use crate::core::routing::{FindSummary, RoutingState};
use crate::core::sweep::{
    ConfigurationReport, DeploymentReport, ProbeReport, SubaccountOutcome, SubaccountReport,
    SweepReport,
};
use crate::error::Result;

// =============================================================================
// JSON
// =============================================================================

/// Render any serializable value as JSON.
///
/// # Errors
///
/// Serialization errors only.
pub fn render_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

/// Wrap `data` in the robot envelope and render it.
///
/// # Errors
///
/// Serialization errors only.
pub fn render_envelope<T: Serialize>(
    command: &str,
    data: &T,
    errors: Vec<ErrorReport>,
    pretty: bool,
) -> Result<String> {
    let output = RobotOutput::new(command, data).with_error_details(errors);
    render_json(&output, pretty)
}

// =============================================================================
// Markdown
// =============================================================================

fn subaccount_heading<T>(out: &mut String, report: &SubaccountReport<T>) {
    let _ = writeln!(
        out,
        "## {} (resource_group: {})\n",
        report.subaccount, report.resource_group
    );
}

fn outcome_note<'a, T>(out: &mut String, report: &'a SubaccountReport<T>) -> Option<&'a T> {
    match &report.outcome {
        SubaccountOutcome::Resolved(value) => Some(value),
        SubaccountOutcome::Skipped(error) => {
            let _ = writeln!(out, "- skipped: {} (`{}`)\n", error.message, error.error_code);
            None
        }
        SubaccountOutcome::Failed(error) => {
            let _ = writeln!(out, "- failed: {} (`{}`)\n", error.message, error.error_code);
            None
        }
    }
}

fn probe_md(probe: &ProbeResult) -> String {
    if probe.success {
        format!("ok ({}ms)", probe.elapsed_ms)
    } else {
        let reason = probe
            .error
            .as_ref()
            .map_or_else(|| "failed".to_string(), |e| e.describe());
        format!("{reason} ({}ms)", probe.elapsed_ms)
    }
}

/// Render configurations as Markdown. All configurations are listed.
///
/// # Errors
///
/// Never fails; `Result` matches the other renderers.
pub fn render_configs_md(report: &SweepReport<ConfigurationReport>) -> Result<String> {
    let mut out = String::from("# Configurations\n\n");
    for sub in &report.subaccounts {
        subaccount_heading(&mut out, sub);
        let Some(configs) = outcome_note(&mut out, sub) else {
            continue;
        };
        let _ = writeln!(out, "- total: {}", configs.total);
        let _ = writeln!(out, "- matching: {}\n", configs.matching.len());
        if !configs.matching.is_empty() || !configs.other.is_empty() {
            out.push_str("| name | id | scenario | matching |\n|---|---|---|---|\n");
            for (config, matching) in configs
                .matching
                .iter()
                .map(|c| (c, true))
                .chain(configs.other.iter().map(|c| (c, false)))
            {
                let _ = writeln!(
                    out,
                    "| {} | `{}` | {} | {} |",
                    config.name,
                    config.id,
                    config.scenario_id,
                    if matching { "yes" } else { "no" }
                );
            }
            out.push('\n');
        }
    }
    Ok(out)
}

/// Render deployments as Markdown.
///
/// # Errors
///
/// Never fails; `Result` matches the other renderers.
pub fn render_deployments_md(report: &SweepReport<DeploymentReport>) -> Result<String> {
    let mut out = String::from("# Deployments\n\n");
    for sub in &report.subaccounts {
        subaccount_heading(&mut out, sub);
        let Some(deployments) = outcome_note(&mut out, sub) else {
            continue;
        };
        let _ = writeln!(out, "- total: {}", deployments.total);
        let _ = writeln!(out, "- family: {}", deployments.family.len());
        let _ = writeln!(out, "- other: {}", deployments.other.len());
        let _ = writeln!(out, "- unidentified: {}\n", deployments.unidentified.len());

        let rows: Vec<_> = deployments
            .family
            .iter()
            .map(|d| (d, "family"))
            .chain(deployments.other.iter().map(|d| (d, "other")))
            .collect();
        if rows.is_empty() {
            continue;
        }
        out.push_str("| model | group | status | deployment | url | probe |\n|---|---|---|---|---|---|\n");
        for (d, group) in rows {
            let _ = writeln!(
                out,
                "| {} | {} | {} | `{}` | {} | {} |",
                d.model.as_deref().unwrap_or("?"),
                group,
                d.status,
                d.deployment_id,
                d.deployment_url,
                d.probe.as_ref().map_or_else(|| "-".to_string(), probe_md)
            );
        }
        out.push('\n');
    }
    Ok(out)
}

/// Render `find` as Markdown.
///
/// # Errors
///
/// Never fails; `Result` matches the other renderers.
pub fn render_find_md(summary: &FindSummary) -> Result<String> {
    let mut out = format!("# Find {}\n\n", summary.model);
    let _ = writeln!(out, "- tokens: {}\n", summary.tokens.join(", "));

    for sub in &summary.report.subaccounts {
        subaccount_heading(&mut out, sub);
        let Some(found) = outcome_note(&mut out, sub) else {
            continue;
        };
        for matched in found.matches.all() {
            let _ = writeln!(
                out,
                "- {} `{}` {}",
                matched.config_name, matched.deployment_id, matched.status
            );
        }
        if let Some(chosen) = &found.chosen {
            let _ = writeln!(out, "- chosen: `{}`", chosen.deployment_id);
        }
        if let Some(probe) = &found.probe {
            let _ = writeln!(out, "- probe: {}", probe_md(probe));
        }
        out.push('\n');
    }

    if let Some(suggestion) = &summary.suggestion {
        out.push_str("## Routing\n\n");
        let state = match &suggestion.routing {
            RoutingState::Missing => "missing".to_string(),
            RoutingState::UpToDate => "up_to_date".to_string(),
            RoutingState::Stale { current } => format!("stale ({})", current.join(", ")),
        };
        let _ = writeln!(out, "- subaccount: {}", suggestion.subaccount);
        let _ = writeln!(out, "- state: {state}\n");
        let _ = writeln!(out, "```json\n{}\n```\n", suggestion.snippet.to_fragment());
    }
    if let Some(action) = summary.action_needed {
        let _ = writeln!(out, "**ACTION NEEDED:** {}", action.as_str());
    }
    Ok(out)
}

/// Render probe results as Markdown.
///
/// # Errors
///
/// Never fails; `Result` matches the other renderers.
pub fn render_probe_md(report: &ProbeReport) -> Result<String> {
    let mut out = format!(
        "# Probe ({}, resource_group: {})\n\n",
        report.subaccount, report.resource_group
    );
    out.push_str("| deployment | result | status | model |\n|---|---|---|---|\n");
    for probed in &report.deployments {
        let model = probed
            .identity
            .as_ref()
            .map(|i| i.model.as_str())
            .or(probed.probe.model_hint.as_deref())
            .unwrap_or("-");
        let _ = writeln!(
            out,
            "| `{}` | {} | {} | {} |",
            probed.probe.deployment_id,
            probe_md(&probed.probe),
            probed
                .probe
                .status_code
                .map_or_else(|| "-".to_string(), |s| s.to_string()),
            model
        );
    }
    Ok(out)
}

/// Render the proxy check as Markdown.
///
/// # Errors
///
/// Never fails; `Result` matches the other renderers.
pub fn render_proxy_check_md(report: &ProxyCheckReport) -> Result<String> {
    let mut out = String::from("# Proxy check\n\n");
    let sync = &report.sync;
    let _ = writeln!(out, "- last_sync: {}", sync.last_sync.as_deref().unwrap_or("never"));
    let _ = writeln!(out, "- current: {}", sync.current.as_deref().unwrap_or("unknown"));
    let _ = writeln!(out, "- origin: {}\n", sync.origin.as_deref().unwrap_or("unknown"));

    for check in &report.checks {
        let _ = writeln!(
            out,
            "## {} ({})\n",
            check.kind.label(),
            if check.success { "pass" } else { "fail" }
        );
        if let Some(error) = &check.error {
            let _ = writeln!(out, "- error: {error}");
        }
        let _ = writeln!(out, "- elapsed_ms: {}\n", check.elapsed_ms);
        if let Some(response) = &check.response {
            let _ = writeln!(out, "{}\n", response.trim());
        }
    }
    if let Some(marker) = &report.marker_updated {
        let _ = writeln!(out, "- marker_updated: {marker}");
    }
    Ok(out)
}
