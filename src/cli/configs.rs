//! `configs` command implementation.

use crate::cli::args::ConfigsArgs;
use crate::cli::{CommandContext, partial_failure};
use crate::core::sweep::sweep_configurations;
use crate::error::Result;
use crate::render::{self, ListOptions};

/// Execute the configs command.
///
/// # Errors
///
/// Routing config errors, the first token or listing error, or
/// `PartialFailure` when a subaccount was skipped.
pub async fn execute(args: &ConfigsArgs, ctx: &CommandContext) -> Result<()> {
    let routing = ctx.routing_config()?;
    let subaccounts = routing.select(args.target.subaccount.as_deref())?;
    let predicate = ctx.family_predicate(&args.match_tokens);
    let options = ctx.sweep_options()?;

    tracing::debug!(
        subaccounts = subaccounts.len(),
        tokens = ?predicate.tokens(),
        "Listing configurations"
    );

    let report = sweep_configurations(&subaccounts, &options, &predicate).await?;
    let output = render::render_configs(
        &report,
        ctx.format,
        ctx.pretty,
        ctx.no_color,
        ListOptions {
            show_all: args.all,
            ..ListOptions::default()
        },
    )?;
    ctx.emit(&output);

    partial_failure(report.skipped_count() + report.failed_count())
}
