//! aidr - AI Core Deployment Resolver
//!
//! CLI entry point.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use std::process::ExitCode;

use clap::{CommandFactory, Parser};

use aidr::cli::args::DeploymentsArgs;
use aidr::cli::{Cli, CommandContext, Commands};
use aidr::core::logging::{self, LogConfig};
use aidr::storage::config::{ResolvedSettings, Settings};
use aidr::util::env::should_use_color;

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_config = LogConfig::resolve(
        cli.log_level.as_deref(),
        cli.json_output,
        cli.verbose,
        &process_env,
    );
    logging::init(&log_config);

    let format = cli.effective_format();
    let pretty = cli.pretty;
    let no_color = cli.no_color;

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.error_code(), "{}", e);
            let error_output = aidr::render::error::render_error_full(&e, format, no_color, pretty);
            eprintln!("{error_output}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run(cli: Cli) -> aidr::Result<()> {
    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut command = Cli::command();
        clap_complete::generate(*shell, &mut command, "aidr", &mut std::io::stdout());
        return Ok(());
    }

    let settings = match ResolvedSettings::resolve(&cli) {
        Ok(settings) => settings,
        // doctor reports a broken settings file instead of failing on it
        Err(e) if matches!(cli.command, Some(Commands::Doctor(_))) => {
            tracing::warn!(error = %e, "Settings file unusable, using defaults");
            ResolvedSettings::resolve_with(&cli, Settings::default(), &process_env)?
        }
        Err(e) => return Err(e),
    };

    let use_color = should_use_color(settings.format, settings.no_color);
    colored::control::set_override(use_color);
    tracing::debug!(
        format = ?settings.format,
        format_source = %settings.sources.format,
        routing_config = %settings.routing_config.display(),
        routing_config_source = %settings.sources.routing_config,
        use_color,
        "Resolved settings"
    );

    let ctx = CommandContext::new(&cli, settings, use_color);

    match cli.command {
        // Default to the deployments sweep
        None => aidr::cli::deployments::execute(&DeploymentsArgs::default(), &ctx).await,
        Some(Commands::Configs(args)) => aidr::cli::configs::execute(&args, &ctx).await,
        Some(Commands::Deployments(args)) => aidr::cli::deployments::execute(&args, &ctx).await,
        Some(Commands::Find(args)) => aidr::cli::find::execute(&args, &ctx).await,
        Some(Commands::Probe(args)) => aidr::cli::probe::execute(&args, &ctx).await,
        Some(Commands::ProxyCheck(args)) => aidr::cli::proxy::execute(&args, &ctx).await,
        Some(Commands::Doctor(args)) => aidr::cli::doctor::execute(&args, &ctx).await,
        Some(Commands::Completions { .. }) => Ok(()),
    }
}
