//! Output rendering for human and robot modes.

pub mod doctor;
pub mod error;
pub mod human;
pub mod robot;
pub mod theme;

use crate::cli::args::OutputFormat;
use crate::core::doctor::DoctorReport;
use crate::core::proxy_check::ProxyCheckReport;
use crate::core::routing::FindSummary;
use crate::core::sweep::{ConfigurationReport, DeploymentReport, ProbeReport, SweepReport};
use crate::error::Result;

pub use theme::Theme;

/// Human-mode knobs that robot formats ignore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    /// Show every non-matching configuration.
    pub show_all: bool,
    /// Cap on the "other models" list.
    pub other_limit: usize,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            show_all: false,
            other_limit: 10,
        }
    }
}

/// Render configuration listings.
///
/// # Errors
///
/// Serialization errors only.
pub fn render_configs(
    report: &SweepReport<ConfigurationReport>,
    format: OutputFormat,
    pretty: bool,
    no_color: bool,
    options: ListOptions,
) -> Result<String> {
    match format {
        OutputFormat::Human => human::render_configs(report, options.show_all, no_color),
        OutputFormat::Json => {
            robot::render_envelope("configs", report, report.error_reports(), pretty)
        }
        OutputFormat::Md => robot::render_configs_md(report),
    }
}

/// Render deployment listings.
///
/// # Errors
///
/// Serialization errors only.
pub fn render_deployments(
    report: &SweepReport<DeploymentReport>,
    format: OutputFormat,
    pretty: bool,
    no_color: bool,
    options: ListOptions,
) -> Result<String> {
    match format {
        OutputFormat::Human => human::render_deployments(report, options.other_limit, no_color),
        OutputFormat::Json => {
            robot::render_envelope("deployments", report, report.error_reports(), pretty)
        }
        OutputFormat::Md => robot::render_deployments_md(report),
    }
}

/// Render `find` results.
///
/// # Errors
///
/// Serialization errors only.
pub fn render_find(
    summary: &FindSummary,
    format: OutputFormat,
    pretty: bool,
    no_color: bool,
) -> Result<String> {
    match format {
        OutputFormat::Human => human::render_find(summary, no_color),
        OutputFormat::Json => {
            robot::render_envelope("find", summary, summary.report.error_reports(), pretty)
        }
        OutputFormat::Md => robot::render_find_md(summary),
    }
}

/// Render probe results.
///
/// # Errors
///
/// Serialization errors only.
pub fn render_probe(
    report: &ProbeReport,
    format: OutputFormat,
    pretty: bool,
    no_color: bool,
) -> Result<String> {
    match format {
        OutputFormat::Human => human::render_probe(report, no_color),
        OutputFormat::Json => robot::render_envelope("probe", report, Vec::new(), pretty),
        OutputFormat::Md => robot::render_probe_md(report),
    }
}

/// Render a proxy check report.
///
/// # Errors
///
/// Serialization errors only.
pub fn render_proxy_check(
    report: &ProxyCheckReport,
    format: OutputFormat,
    pretty: bool,
    no_color: bool,
) -> Result<String> {
    match format {
        OutputFormat::Human => human::render_proxy_check(report, no_color),
        OutputFormat::Json => robot::render_envelope("proxy-check", report, Vec::new(), pretty),
        OutputFormat::Md => robot::render_proxy_check_md(report),
    }
}

/// Render doctor report.
///
/// # Errors
///
/// Serialization errors only.
pub fn render_doctor(
    report: &DoctorReport,
    format: OutputFormat,
    pretty: bool,
    no_color: bool,
) -> Result<String> {
    match format {
        OutputFormat::Human => doctor::render_human(report, no_color),
        OutputFormat::Json => doctor::render_json(report, pretty),
        OutputFormat::Md => doctor::render_md(report),
    }
}
