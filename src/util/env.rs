//! Environment detection utilities.
//!
//! Stdout is often read by scripts and agents, so color is opt-out on every
//! signal that suggests nobody is looking at a terminal.

use std::io::IsTerminal;

use crate::cli::args::OutputFormat;

/// Check if stdout is a TTY.
#[must_use]
pub fn stdout_is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Check if stderr is a TTY.
#[must_use]
pub fn stderr_is_tty() -> bool {
    std::io::stderr().is_terminal()
}

/// Why color output was turned off, if it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlainReason {
    RobotFormat,
    NoColorFlag,
    NoColorEnv,
    PlainEnv,
    DumbTerminal,
    Ci,
    NotTty,
}

/// Decide whether human output should be colored.
///
/// `is_tty` is passed in so callers can check the stream they write to.
#[must_use]
pub fn plain_reason(
    format: OutputFormat,
    no_color_flag: bool,
    is_tty: bool,
    env: &dyn Fn(&str) -> Option<String>,
) -> Option<PlainReason> {
    if format != OutputFormat::Human {
        return Some(PlainReason::RobotFormat);
    }
    if no_color_flag {
        return Some(PlainReason::NoColorFlag);
    }
    // Any value, including empty, counts (https://no-color.org/).
    if env("NO_COLOR").is_some() {
        return Some(PlainReason::NoColorEnv);
    }
    if env("AIDR_PLAIN").is_some() {
        return Some(PlainReason::PlainEnv);
    }
    if env("TERM").is_some_and(|t| t == "dumb") {
        return Some(PlainReason::DumbTerminal);
    }
    if env("CI").is_some() || env("GITHUB_ACTIONS").is_some() {
        return Some(PlainReason::Ci);
    }
    if !is_tty {
        return Some(PlainReason::NotTty);
    }
    None
}

/// Whether stdout output should be colored, checking the real process.
#[must_use]
pub fn should_use_color(format: OutputFormat, no_color_flag: bool) -> bool {
    let reason = plain_reason(format, no_color_flag, stdout_is_tty(), &|key| {
        std::env::var(key).ok()
    });
    match reason {
        Some(reason) => {
            tracing::debug!(?reason, "Color output disabled");
            false
        }
        None => true,
    }
}
