//! Human-readable output.
//!
//! Reports are grouped per subaccount. Styling goes through [`Theme`] so the
//! same code produces plain text for pipes.

use std::fmt::Write as _;

use super::theme::Theme;
use crate::core::probe::ProbeResult;
use crate::core::proxy_check::{CheckResult, ProxyCheckReport};
use crate::core::routing::{ActionNeeded, FindSummary, RoutingState, RoutingSuggestion};
use crate::core::sweep::{
    ConfigurationReport, DeploymentReport, FindReport, ProbeReport, ResolvedDeployment,
    SubaccountOutcome, SubaccountReport, SweepReport,
};
use crate::error::Result;
use crate::util::format::{format_elapsed_ms, plural, short_hash, truncate};

/// Other configurations are listed inline up to this many without `--all`.
pub const OTHER_CONFIGS_INLINE_LIMIT: usize = 20;

/// Longest response excerpt shown for a passing check.
const EXCERPT_CHARS: usize = 300;

// =============================================================================
// Shared pieces
// =============================================================================

fn subaccount_header<T>(report: &SubaccountReport<T>, theme: Theme) -> String {
    format!(
        "{} {}\n",
        theme.primary(&format!("Subaccount {}", report.subaccount)),
        theme.muted(&format!("(resource group {})", report.resource_group))
    )
}

/// Writes the skip/failure line and returns the resolved value, if any.
fn resolved_or_note<'a, T>(
    out: &mut String,
    report: &'a SubaccountReport<T>,
    theme: Theme,
) -> Option<&'a T> {
    match &report.outcome {
        SubaccountOutcome::Resolved(value) => Some(value),
        SubaccountOutcome::Skipped(error) => {
            let _ = writeln!(
                out,
                "  {} skipped: {} {}",
                theme.warning(theme.mark(false)),
                error.message,
                theme.muted(&format!("[{}]", error.error_code))
            );
            None
        }
        SubaccountOutcome::Failed(error) => {
            let _ = writeln!(
                out,
                "  {} failed: {} {}",
                theme.error(theme.mark(false)),
                error.message,
                theme.muted(&format!("[{}]", error.error_code))
            );
            None
        }
    }
}

fn sweep_footer<T>(out: &mut String, report: &SweepReport<T>, theme: Theme) {
    let skipped = report.skipped_count();
    let failed = report.failed_count();
    if skipped + failed == 0 {
        return;
    }
    let _ = writeln!(
        out,
        "{}",
        theme.warning(&format!(
            "{} of {} skipped, {} failed",
            skipped,
            plural(report.subaccounts.len(), "subaccount"),
            failed
        ))
    );
}

fn probe_line(probe: &ProbeResult, theme: Theme) -> String {
    if probe.success {
        let mut line = format!(
            "{} probe ok in {}",
            theme.success(theme.mark(true)),
            format_elapsed_ms(probe.elapsed_ms)
        );
        if let Some(hint) = &probe.model_hint {
            let _ = write!(line, ", model {hint}");
        }
        line
    } else {
        let reason = probe
            .error
            .as_ref()
            .map_or_else(|| "failed".to_string(), |e| e.describe());
        format!(
            "{} probe {} after {}",
            theme.error(theme.mark(false)),
            truncate(&reason, 120),
            format_elapsed_ms(probe.elapsed_ms)
        )
    }
}

// =============================================================================
// configs
// =============================================================================

/// Render configurations per subaccount.
///
/// Non-matching configurations are listed when `show_all` is set or there
/// are at most [`OTHER_CONFIGS_INLINE_LIMIT`] of them.
pub fn render_configs(
    report: &SweepReport<ConfigurationReport>,
    show_all: bool,
    no_color: bool,
) -> Result<String> {
    let theme = Theme::new(no_color);
    let mut out = String::new();

    for sub in &report.subaccounts {
        out.push_str(&subaccount_header(sub, theme));
        let Some(configs) = resolved_or_note(&mut out, sub, theme) else {
            out.push('\n');
            continue;
        };

        let _ = writeln!(
            out,
            "  {}, {} matching",
            plural(configs.total, "configuration"),
            configs.matching.len()
        );

        if configs.matching.is_empty() {
            let _ = writeln!(out, "  {}", theme.muted("No matching configurations"));
        } else {
            let _ = writeln!(out, "\n  {}", theme.secondary("Matching"));
            for config in &configs.matching {
                let _ = writeln!(
                    out,
                    "    {}  {}  {}",
                    theme.success(&config.name),
                    theme.code(&config.id),
                    theme.muted(&format!("scenario {}", config.scenario_id))
                );
            }
        }

        if !configs.other.is_empty() {
            let _ = writeln!(out, "\n  {}", theme.secondary("Other"));
            if show_all || configs.other.len() <= OTHER_CONFIGS_INLINE_LIMIT {
                for config in &configs.other {
                    let _ = writeln!(out, "    {}  {}", config.name, theme.muted(&config.id));
                }
            } else {
                let _ = writeln!(
                    out,
                    "    {}",
                    theme.muted(&format!(
                        "{} (use --all to list them)",
                        plural(configs.other.len(), "other configuration")
                    ))
                );
            }
        }
        out.push('\n');
    }

    sweep_footer(&mut out, report, theme);
    Ok(out)
}

// =============================================================================
// deployments
// =============================================================================

fn deployment_block(out: &mut String, deployment: &ResolvedDeployment, theme: Theme) {
    let model = deployment.model.as_deref().unwrap_or("?");
    let _ = writeln!(
        out,
        "    {}  {}  {}",
        theme.secondary(model),
        theme.status(&deployment.status),
        theme.muted(&deployment.deployment_id)
    );
    let _ = writeln!(out, "      {}", theme.code(&deployment.deployment_url));
    if let Some(name) = &deployment.configuration_name {
        let source = deployment
            .model_source
            .map(|s| format!(" (model from {})", s.label()))
            .unwrap_or_default();
        let _ = writeln!(out, "      {}", theme.muted(&format!("config {name}{source}")));
    }
    if !deployment.routed_as.is_empty() {
        let _ = writeln!(
            out,
            "      {} routed as {}",
            theme.arrow(),
            deployment.routed_as.join(", ")
        );
    }
    if let Some(probe) = &deployment.probe {
        let _ = writeln!(out, "      {}", probe_line(probe, theme));
    }
}

/// Render resolved deployments per subaccount.
///
/// Family deployments are listed in full; other models are capped at
/// `other_limit`; deployments without a model name are only counted.
pub fn render_deployments(
    report: &SweepReport<DeploymentReport>,
    other_limit: usize,
    no_color: bool,
) -> Result<String> {
    let theme = Theme::new(no_color);
    let mut out = String::new();

    for sub in &report.subaccounts {
        out.push_str(&subaccount_header(sub, theme));
        let Some(deployments) = resolved_or_note(&mut out, sub, theme) else {
            out.push('\n');
            continue;
        };

        if deployments.total == 0 {
            let _ = writeln!(out, "  {}", theme.muted("No deployments"));
            out.push('\n');
            continue;
        }

        let _ = writeln!(
            out,
            "\n  {} ({})",
            theme.secondary("Model family"),
            deployments.family.len()
        );
        if deployments.family.is_empty() {
            let _ = writeln!(out, "    {}", theme.muted("none"));
        }
        for deployment in &deployments.family {
            deployment_block(&mut out, deployment, theme);
        }

        if !deployments.other.is_empty() {
            let _ = writeln!(
                out,
                "\n  {} ({})",
                theme.secondary("Other models"),
                deployments.other.len()
            );
            for deployment in deployments.other.iter().take(other_limit) {
                let _ = writeln!(
                    out,
                    "    {}  {}  {}",
                    deployment.model.as_deref().unwrap_or("?"),
                    theme.status(&deployment.status),
                    theme.muted(&deployment.deployment_id)
                );
            }
            if deployments.other.len() > other_limit {
                let _ = writeln!(
                    out,
                    "    {}",
                    theme.muted(&format!(
                        "... and {} more",
                        deployments.other.len() - other_limit
                    ))
                );
            }
        }

        if !deployments.unidentified.is_empty() {
            let _ = writeln!(
                out,
                "\n  {}",
                theme.muted(&format!(
                    "{} without a model name",
                    plural(deployments.unidentified.len(), "deployment")
                ))
            );
        }

        let failed = deployments.failed_probes();
        if failed > 0 {
            let _ = writeln!(
                out,
                "\n  {}",
                theme.warning(&format!("{} failed", plural(failed, "probe")))
            );
        }
        out.push('\n');
    }

    sweep_footer(&mut out, report, theme);
    Ok(out)
}

// =============================================================================
// find
// =============================================================================

fn find_subaccount(out: &mut String, found: &FindReport, theme: Theme) {
    let _ = writeln!(
        out,
        "  {}, {}",
        plural(found.configurations.len(), "matching configuration"),
        plural(found.matches.len(), "deployment")
    );
    for matched in found.matches.all() {
        let chosen = found
            .chosen
            .as_ref()
            .is_some_and(|c| c.deployment_id == matched.deployment_id);
        let marker = if chosen { theme.arrow() } else { " " };
        let _ = writeln!(
            out,
            "  {marker} {}  {}  {}",
            matched.config_name,
            theme.status(&matched.status),
            theme.muted(&matched.deployment_id)
        );
    }
    if let Some(probe) = &found.probe {
        let _ = writeln!(out, "    {}", probe_line(probe, theme));
    }
}

fn suggestion_block(out: &mut String, suggestion: &RoutingSuggestion, theme: Theme) {
    let _ = writeln!(
        out,
        "{}",
        theme.primary(&format!(
            "Routing for {} (subaccount {})",
            suggestion.snippet.model, suggestion.subaccount
        ))
    );
    match &suggestion.routing {
        RoutingState::UpToDate => {
            let _ = writeln!(
                out,
                "  {} deployment_models already routes here",
                theme.success(theme.mark(true))
            );
        }
        RoutingState::Missing => {
            let _ = writeln!(out, "  Add to deployment_models:");
        }
        RoutingState::Stale { current } => {
            let _ = writeln!(
                out,
                "  {} currently routed to {}",
                theme.warning("Update deployment_models:"),
                current.join(", ")
            );
        }
    }
    if suggestion.routing != RoutingState::UpToDate {
        out.push('\n');
        for line in suggestion.snippet.to_fragment().lines() {
            let _ = writeln!(out, "    {}", theme.code(line));
        }
    }
}

fn action_needed_block(out: &mut String, summary: &FindSummary, action: ActionNeeded, theme: Theme) {
    let _ = writeln!(out, "{}", theme.error("ACTION NEEDED"));
    let detail = match action {
        ActionNeeded::NoMatches => format!(
            "No configuration matches {}. Create a configuration and deployment for {} in AI Launchpad.",
            summary.tokens.join(", "),
            summary.model
        ),
        ActionNeeded::OnlyInactive => format!(
            "Deployments for {} exist but none is RUNNING. Start one in AI Launchpad and run find again.",
            summary.model
        ),
        ActionNeeded::ProbeFailed => format!(
            "The chosen deployment for {} did not answer the probe. Check its logs before routing traffic to it.",
            summary.model
        ),
    };
    let _ = writeln!(out, "  {detail}");
}

/// Render `find`: matches per subaccount, then the routing suggestion.
pub fn render_find(summary: &FindSummary, no_color: bool) -> Result<String> {
    let theme = Theme::new(no_color);
    let mut out = String::new();

    for sub in &summary.report.subaccounts {
        out.push_str(&subaccount_header(sub, theme));
        if let Some(found) = resolved_or_note(&mut out, sub, theme) {
            find_subaccount(&mut out, found, theme);
        }
        out.push('\n');
    }

    if let Some(suggestion) = &summary.suggestion {
        suggestion_block(&mut out, suggestion, theme);
        out.push('\n');
    }
    if let Some(action) = summary.action_needed {
        action_needed_block(&mut out, summary, action, theme);
        out.push('\n');
    }

    sweep_footer(&mut out, &summary.report, theme);
    Ok(out)
}

// =============================================================================
// probe
// =============================================================================

/// Render probe results in request order.
pub fn render_probe(report: &ProbeReport, no_color: bool) -> Result<String> {
    let theme = Theme::new(no_color);
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} {}",
        theme.primary(&format!("Subaccount {}", report.subaccount)),
        theme.muted(&format!("(resource group {})", report.resource_group))
    );

    for probed in &report.deployments {
        let probe = &probed.probe;
        let _ = writeln!(out, "\n  {}", theme.secondary(&probe.deployment_id));
        let _ = writeln!(out, "    {}", theme.code(&probed.deployment_url));
        let _ = writeln!(out, "    {}", probe_line(probe, theme));
        if let Some(status) = probe.status_code {
            let _ = writeln!(out, "    {}", theme.muted(&format!("HTTP {status}")));
        }
        if let Some(identity) = &probed.identity {
            let _ = writeln!(
                out,
                "    model {} {}",
                identity.model,
                theme.muted(&format!("(from {})", identity.source.label()))
            );
        }
        if let Some(text) = probe.text.as_deref().filter(|t| !t.trim().is_empty()) {
            let _ = writeln!(out, "    {}", theme.muted(&truncate(text.trim(), 120)));
        }
    }

    let failed = report.failed_count();
    let timed_out = report.timed_out().count();
    out.push('\n');
    let summary = format!(
        "{} probed, {} failed ({} timed out)",
        report.deployments.len(),
        failed,
        timed_out
    );
    let _ = writeln!(
        out,
        "{}",
        if failed == 0 {
            theme.success(&summary)
        } else {
            theme.warning(&summary)
        }
    );
    Ok(out)
}

// =============================================================================
// proxy-check
// =============================================================================

fn check_block(out: &mut String, check: &CheckResult, theme: Theme) {
    let status = check
        .status_code
        .map(|s| format!(" HTTP {s}"))
        .unwrap_or_default();
    let _ = writeln!(
        out,
        "  {} {}{} {}",
        if check.success {
            theme.success(theme.mark(true))
        } else {
            theme.error(theme.mark(false))
        },
        theme.secondary(check.kind.label()),
        status,
        theme.muted(&format!("[{}]", format_elapsed_ms(check.elapsed_ms)))
    );
    if let Some(error) = &check.error {
        let _ = writeln!(out, "    {}", theme.error(error));
    }
    if let Some(response) = &check.response {
        for line in truncate(response.trim(), EXCERPT_CHARS).lines().take(6) {
            let _ = writeln!(out, "    {}", theme.muted(line));
        }
    }
    if let Some(path) = &check.saved_to {
        let _ = writeln!(out, "    {} saved to {}", theme.arrow(), path.display());
    }
}

/// Render the proxy smoke test.
pub fn render_proxy_check(report: &ProxyCheckReport, no_color: bool) -> Result<String> {
    let theme = Theme::new(no_color);
    let mut out = String::new();

    let _ = writeln!(out, "{}", theme.primary("Proxy check"));
    let sync = &report.sync;
    let _ = writeln!(
        out,
        "  last sync {}  current {}  origin/main {}",
        sync.last_sync.as_deref().map_or("never", short_hash),
        sync.current.as_deref().map_or("unknown", short_hash),
        sync.origin.as_deref().map_or("unknown", short_hash)
    );
    out.push('\n');

    if report.checks.is_empty() {
        let _ = writeln!(out, "  {}", theme.muted("No checks selected"));
    }
    for check in &report.checks {
        check_block(&mut out, check, theme);
    }
    out.push('\n');

    let passed = report.checks.len() - report.failed_count();
    let summary = format!("{passed}/{} checks passed", report.checks.len());
    if report.all_passed() {
        let _ = writeln!(out, "{}", theme.success(&summary));
    } else {
        let _ = writeln!(out, "{}", theme.error(&summary));
    }
    if let Some(marker) = &report.marker_updated {
        let _ = writeln!(
            out,
            "{}",
            theme.muted(&format!("Last-sync marker set to {}", short_hash(marker)))
        );
    }
    Ok(out)
}
