//! Doctor command output rendering.
//!
//! Renders diagnostic reports for human and machine consumption.

use std::fmt::Write as _;
use std::time::Instant;

use tracing::Level;

use super::theme::Theme;
use crate::core::doctor::{CheckStatus, DiagnosticCheck, DoctorReport, SubaccountHealth};
use crate::error::Result;
use crate::util::format::format_duration;

const RULE_WIDTH: usize = 60;

// =============================================================================
// Human-Readable Output
// =============================================================================

/// Render a doctor report for human consumption.
///
/// # Errors
///
/// Never fails; `Result` matches the other renderers.
pub fn render_human(report: &DoctorReport, no_color: bool) -> Result<String> {
    let start = tracing::enabled!(Level::DEBUG).then(Instant::now);
    let theme = Theme::new(no_color);
    let mut output = String::new();

    output.push_str(&render_header(theme));
    output.push('\n');

    output.push_str(&render_setup(report, theme));
    output.push('\n');

    if !report.tools.is_empty() {
        output.push_str(&render_section_header("Tools", theme));
        for tool in &report.tools {
            output.push_str(&render_check_line(tool, "  ", theme));
            output.push('\n');
        }
        output.push('\n');
    }

    if !report.subaccounts.is_empty() {
        output.push_str(&render_section_header("Subaccounts", theme));
        for health in &report.subaccounts {
            output.push_str(&render_subaccount_health(health, theme));
            output.push('\n');
        }
    }

    output.push_str(&render_summary(report, theme));

    if let Some(start) = start {
        tracing::debug!(
            component = "doctor_report",
            render_time_ms = start.elapsed().as_millis(),
            "Rendered doctor report"
        );
    }

    Ok(output)
}

fn render_header(theme: Theme) -> String {
    let title = "aidr doctor - System Diagnostic Report";
    if theme.is_plain() {
        let border = "-".repeat(title.len() + 4);
        format!("{border}\n| {title} |\n{border}")
    } else {
        theme.primary(title)
    }
}

fn render_setup(report: &DoctorReport, theme: Theme) -> String {
    let mut output = render_section_header("Setup", theme);

    let version_line = format!("  {} aidr v{}", theme.mark(true), report.aidr_version);
    output.push_str(&theme.success(&version_line));
    output.push('\n');

    output.push_str(&render_check_line(&report.settings, "  ", theme));
    output.push('\n');
    output.push_str(&render_check_line(&report.routing_config, "  ", theme));
    output.push('\n');

    output
}

fn render_section_header(title: &str, theme: Theme) -> String {
    format!("{}\n{}\n", theme.secondary(title), theme.rule(RULE_WIDTH))
}

fn render_subaccount_health(health: &SubaccountHealth, theme: Theme) -> String {
    let mut output = format!(
        "{} {}\n",
        theme.secondary(&health.subaccount),
        theme.muted(&format!("(resource group {})", health.resource_group))
    );

    for check in [&health.service_key, &health.token] {
        output.push_str(&render_check_line(check, "  ", theme));
        output.push('\n');
    }

    output.push_str(&render_check_line(&health.listing, "  ", theme));
    if let Some(duration) = health.listing.duration {
        let _ = write!(output, "      {}ms", duration.as_millis());
    }
    output.push('\n');

    output
}

/// One check: icon and name, then details or the fix suggestion.
fn render_check_line(check: &DiagnosticCheck, indent: &str, theme: Theme) -> String {
    let icon = theme.check_mark(&check.status);
    let mut output = theme.check(&check.status, &format!("{indent}{icon} {}", check.name));

    match &check.status {
        CheckStatus::Pass { details } => {
            if let Some(details) = details {
                let _ = write!(output, "  {details}");
            }
        }
        CheckStatus::Warning {
            details,
            suggestion,
        } => {
            output.push('\n');
            output.push_str(&theme.warning(&format!("{indent}    {details}")));
            if let Some(suggestion) = suggestion {
                let _ = write!(output, "\n{indent}    {} {suggestion}", theme.arrow());
            }
        }
        CheckStatus::Fail { reason, suggestion } => {
            let _ = write!(output, "\n{indent}    {reason}");
            if let Some(suggestion) = suggestion {
                let _ = write!(output, "\n{indent}    {} {suggestion}", theme.arrow());
            }
        }
        CheckStatus::Skipped { reason } => {
            let _ = write!(output, "  ({reason})");
        }
        CheckStatus::Timeout { after } => {
            let _ = write!(output, "  (timeout after {}s)", after.as_secs());
        }
    }

    output
}

fn render_summary(report: &DoctorReport, theme: Theme) -> String {
    let (ready, needs_attention) = report.summary();
    let summary_text = format!("Summary: {ready} ready, {needs_attention} need attention");
    let time_text = format!("[{}]", format_duration(report.total_duration));

    let styled = if needs_attention > 0 {
        theme.warning(&summary_text)
    } else {
        theme.success(&summary_text)
    };
    format!(
        "{}\n{styled}  {}\n",
        theme.rule(RULE_WIDTH),
        theme.muted(&time_text)
    )
}

// =============================================================================
// JSON Output
// =============================================================================

/// Render a doctor report as JSON.
///
/// # Errors
///
/// Serialization errors only.
pub fn render_json(report: &DoctorReport, pretty: bool) -> Result<String> {
    super::robot::render_json(report, pretty)
}

// =============================================================================
// Markdown Output
// =============================================================================

/// Render a doctor report as Markdown.
///
/// # Errors
///
/// Never fails; `Result` matches the other renderers.
pub fn render_md(report: &DoctorReport) -> Result<String> {
    let mut output = String::from("# aidr doctor - System Diagnostic Report\n\n");

    output.push_str("## Setup\n\n");
    let _ = writeln!(output, "- aidr: v{}", report.aidr_version);
    let _ = writeln!(output, "- settings: {}", format_check_status_md(&report.settings));
    let _ = writeln!(
        output,
        "- routing config: {}",
        format_check_status_md(&report.routing_config)
    );
    for tool in &report.tools {
        let _ = writeln!(output, "- {}: {}", tool.name, format_check_status_md(tool));
    }
    output.push('\n');

    if !report.subaccounts.is_empty() {
        output.push_str("## Subaccounts\n\n");
        for health in &report.subaccounts {
            let _ = writeln!(
                output,
                "### {} (resource group {})\n",
                health.subaccount, health.resource_group
            );
            output.push_str("| Check | Status |\n|-------|--------|\n");
            for check in [&health.service_key, &health.token, &health.listing] {
                let _ = writeln!(output, "| {} | {} |", check.name, format_check_status_md(check));
            }
            output.push('\n');
        }
    }

    let (ready, needs_attention) = report.summary();
    output.push_str("## Summary\n\n");
    let _ = writeln!(
        output,
        "- **Ready:** {ready}\n- **Needs attention:** {needs_attention}\n- **Duration:** {}",
        format_duration(report.total_duration)
    );

    Ok(output)
}

fn format_check_status_md(check: &DiagnosticCheck) -> String {
    match &check.status {
        CheckStatus::Pass { details } => match details {
            Some(d) => format!("\u{2705} {d}"),
            None => "\u{2705} OK".to_string(),
        },
        CheckStatus::Warning {
            details,
            suggestion,
        } => match suggestion {
            Some(s) => format!("\u{26A0}\u{FE0F} {details} *({s})*"),
            None => format!("\u{26A0}\u{FE0F} {details}"),
        },
        CheckStatus::Fail { reason, suggestion } => match suggestion {
            Some(s) => format!("\u{274C} {reason} *({s})*"),
            None => format!("\u{274C} {reason}"),
        },
        CheckStatus::Skipped { reason } => format!("\u{23ED} Skipped: {reason}"),
        CheckStatus::Timeout { after } => format!("\u{23F1} Timeout after {}s", after.as_secs()),
    }
}
