//! `deployments` command implementation (the default command).

use crate::cli::args::DeploymentsArgs;
use crate::cli::{CommandContext, partial_failure};
use crate::core::sweep::{DeploymentSweep, IdentifyMode, sweep_deployments};
use crate::error::Result;
use crate::render::{self, ListOptions};

/// Execute the deployments command.
///
/// # Errors
///
/// Routing config errors, or `PartialFailure` when subaccounts were skipped
/// or failed, or probes failed. The report is printed first.
pub async fn execute(args: &DeploymentsArgs, ctx: &CommandContext) -> Result<()> {
    let routing = ctx.routing_config()?;
    let subaccounts = routing.select(args.target.subaccount.as_deref())?;
    let predicate = ctx.family_predicate(&args.match_tokens);
    let options = ctx.sweep_options()?;
    let sweep = DeploymentSweep {
        include_stopped: args.include_stopped,
        identify: if args.probe {
            IdentifyMode::Probe
        } else {
            IdentifyMode::Details
        },
    };

    tracing::debug!(
        subaccounts = subaccounts.len(),
        include_stopped = sweep.include_stopped,
        identify = ?sweep.identify,
        "Sweeping deployments"
    );

    let report = sweep_deployments(&subaccounts, &options, sweep, &predicate).await?;
    let output = render::render_deployments(
        &report,
        ctx.format,
        ctx.pretty,
        ctx.no_color,
        ListOptions {
            other_limit: args.other_limit,
            ..ListOptions::default()
        },
    )?;
    ctx.emit(&output);

    let failed_probes: usize = report
        .resolved()
        .map(|(_, deployments)| deployments.failed_probes())
        .sum();
    partial_failure(report.skipped_count() + report.failed_count() + failed_probes)
}
