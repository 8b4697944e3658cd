//! `find` command implementation.

use crate::cli::args::FindArgs;
use crate::cli::{CommandContext, partial_failure};
use crate::core::correlate::NamePredicate;
use crate::core::routing::FindSummary;
use crate::core::sweep::find_deployments;
use crate::error::Result;
use crate::render;

/// Execute the find command.
///
/// Prints the matching deployments and, when one is usable, the
/// `deployment_models` snippet for the routing config.
///
/// # Errors
///
/// Routing config errors, the first token or listing error, or
/// `PartialFailure` when a subaccount was skipped.
pub async fn execute(args: &FindArgs, ctx: &CommandContext) -> Result<()> {
    let routing = ctx.routing_config()?;
    let subaccounts = routing.select(args.target.subaccount.as_deref())?;
    let matching = &ctx.settings.file.matching;
    let predicate = if args.match_tokens.is_empty() {
        NamePredicate::new(&matching.tokens)
    } else {
        NamePredicate::new(&args.match_tokens)
    };
    let model = args.model.as_deref().unwrap_or(&matching.model);
    let options = ctx.sweep_options()?;

    tracing::debug!(
        model,
        tokens = ?predicate.tokens(),
        probe = args.probe,
        "Finding deployments"
    );

    let report = find_deployments(&subaccounts, &options, &predicate, args.probe).await?;
    let skipped = report.skipped_count() + report.failed_count();
    let summary = FindSummary::new(
        model,
        predicate.tokens().to_vec(),
        report,
        &routing.sub_accounts,
    );
    if let Some(action) = summary.action_needed {
        tracing::info!(action = action.as_str(), "No usable deployment");
    }

    let output = render::render_find(&summary, ctx.format, ctx.pretty, ctx.no_color)?;
    ctx.emit(&output);

    partial_failure(skipped)
}
