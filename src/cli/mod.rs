//! CLI argument parsing and command dispatch.

pub mod args;
pub mod configs;
pub mod deployments;
pub mod doctor;
pub mod find;
pub mod probe;
pub mod proxy;

pub use args::{Cli, Commands, OutputFormat};

use crate::core::correlate::NamePredicate;
use crate::core::sweep::SweepOptions;
use crate::core::token::AccessToken;
use crate::error::{AidrError, Result};
use crate::storage::config::ResolvedSettings;
use crate::storage::routing_config::RoutingConfig;

/// Everything a command handler needs besides its own arguments.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub settings: ResolvedSettings,
    pub format: OutputFormat,
    pub pretty: bool,
    pub no_color: bool,
    /// `--token` / `AIDR_ACCESS_TOKEN`.
    pub token: Option<String>,
}

impl CommandContext {
    /// Build the context from resolved settings.
    ///
    /// `use_color` is the final color decision (flags, env and terminal).
    #[must_use]
    pub fn new(cli: &Cli, settings: ResolvedSettings, use_color: bool) -> Self {
        Self {
            format: settings.format,
            pretty: settings.pretty,
            no_color: !use_color,
            token: cli.token.clone(),
            settings,
        }
    }

    /// Load the routing config named by `--config` / settings.
    ///
    /// # Errors
    ///
    /// `ConfigNotFound`, `ConfigParse` or `ConfigInvalid`.
    pub fn routing_config(&self) -> Result<RoutingConfig> {
        RoutingConfig::load(&self.settings.routing_config)
    }

    /// Sweep options: token override, timeouts and probe payload.
    ///
    /// # Errors
    ///
    /// `ConfigInvalid` if the token override is blank.
    pub fn sweep_options(&self) -> Result<SweepOptions> {
        let token = self
            .token
            .as_deref()
            .map(AccessToken::from_override)
            .transpose()?;
        Ok(SweepOptions {
            token,
            timeout: self.settings.timeout,
            probe_timeout: self.settings.probe_timeout,
            probe_request: self.settings.probe_request(),
        })
    }

    /// `--match` tokens, or the configured model-family tokens.
    #[must_use]
    pub fn family_predicate(&self, match_tokens: &[String]) -> NamePredicate {
        if match_tokens.is_empty() {
            NamePredicate::new(&self.settings.file.matching.family_tokens)
        } else {
            NamePredicate::new(match_tokens)
        }
    }

    /// Write rendered output to stdout.
    pub fn emit(&self, output: &str) {
        if output.ends_with('\n') {
            print!("{output}");
        } else {
            println!("{output}");
        }
    }
}

/// `PartialFailure` when `failed` is nonzero.
///
/// # Errors
///
/// See above.
pub fn partial_failure(failed: usize) -> Result<()> {
    if failed == 0 {
        Ok(())
    } else {
        Err(AidrError::PartialFailure { failed })
    }
}
