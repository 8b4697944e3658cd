//! Doctor command implementation.

use std::time::{Duration, Instant};

use crate::cli::args::DoctorArgs;
use crate::cli::{CommandContext, partial_failure};
use crate::core::doctor::checks::{
    TOOLS, check_routing_config, check_settings, check_subaccount, check_tool,
};
use crate::core::doctor::{DoctorReport, SubaccountHealth};
use crate::error::{AidrError, Result};
use crate::render;
use crate::storage::config::Settings;
use crate::storage::routing_config::RoutingConfig;

/// Execute the doctor command.
///
/// # Errors
///
/// `SubAccountNotFound` for an unknown `--subaccount`, or `PartialFailure`
/// when anything needs attention. The report is printed first.
pub async fn execute(args: &DoctorArgs, ctx: &CommandContext) -> Result<()> {
    let start = Instant::now();
    tracing::debug!(offline = args.offline, timeout = args.timeout, "Starting doctor checks");

    let settings = check_settings(&Settings::config_path());
    let (routing_config, routing) = check_routing_config(&ctx.settings.routing_config);

    let mut tools = Vec::with_capacity(TOOLS.len());
    for tool in TOOLS {
        tools.push(check_tool(tool).await);
    }

    let subaccounts = match &routing {
        Some(routing) => {
            check_subaccounts(
                routing,
                args.target.subaccount.as_deref(),
                args.offline,
                Duration::from_secs(args.timeout),
            )
            .await?
        }
        None => Vec::new(),
    };

    let report = DoctorReport {
        aidr_version: env!("CARGO_PKG_VERSION").to_string(),
        settings,
        routing_config,
        tools,
        subaccounts,
        total_duration: start.elapsed(),
    };

    let output = render::render_doctor(&report, ctx.format, ctx.pretty, ctx.no_color)?;
    ctx.emit(&output);

    let (_, needs_attention) = report.summary();
    partial_failure(needs_attention)
}

async fn check_subaccounts(
    routing: &RoutingConfig,
    name: Option<&str>,
    offline: bool,
    timeout: Duration,
) -> Result<Vec<SubaccountHealth>> {
    if timeout.is_zero() {
        return Err(AidrError::ConfigInvalid {
            key: "--timeout".to_string(),
            message: "doctor timeout must be at least 1 second".to_string(),
        });
    }
    let mut health = Vec::new();
    for subaccount in routing.select(name)? {
        health.push(check_subaccount(subaccount, offline, timeout).await?);
    }
    Ok(health)
}
