//! `probe` command implementation.

use std::time::Duration;

use crate::cli::args::ProbeArgs;
use crate::cli::{CommandContext, partial_failure};
use crate::core::sweep::{probe_deployments, single_subaccount};
use crate::error::{AidrError, Result};
use crate::render;

/// Execute the probe command.
///
/// # Errors
///
/// Routing config and session errors. Results are printed first; then a
/// lone deployment fails with its own `ProbeTimeout` or `Probe` error, and
/// several deployments fail with `PartialFailure` when any probe failed.
pub async fn execute(args: &ProbeArgs, ctx: &CommandContext) -> Result<()> {
    let routing = ctx.routing_config()?;
    let subaccount = single_subaccount(&routing.sub_accounts, args.target.subaccount.as_deref())?;
    let mut options = ctx.sweep_options()?;
    if let Some(seconds) = args.timeout {
        if seconds == 0 {
            return Err(AidrError::ConfigInvalid {
                key: "--timeout".to_string(),
                message: "probe timeout must be at least 1 second".to_string(),
            });
        }
        options.probe_timeout = Duration::from_secs(seconds);
    }

    tracing::debug!(
        subaccount = %subaccount.name,
        deployments = args.deployment_ids.len(),
        timeout_secs = options.probe_timeout.as_secs(),
        "Probing deployments"
    );

    let report = probe_deployments(subaccount, &options, &args.deployment_ids, args.identify).await?;
    let output = render::render_probe(&report, ctx.format, ctx.pretty, ctx.no_color)?;
    ctx.emit(&output);

    if let [only] = report.deployments.as_slice() {
        only.probe.clone().into_result()?;
        return Ok(());
    }
    partial_failure(report.failed_count())
}
