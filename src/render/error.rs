//! Error rendering for aidr.
//!
//! Terminal output lists the error, its code, and the fix suggestions.
//! JSON and Markdown modes emit a structured object for scripts.

use serde::Serialize;

use super::theme::Theme;
use crate::cli::args::OutputFormat;
use crate::error::{AidrError, FixSuggestion};
use crate::util::env::stderr_is_tty;

/// Width used when wrapping explanatory text.
const WRAP_WIDTH: usize = 68;

// =============================================================================
// Public API
// =============================================================================

/// Render an error for stderr.
///
/// JSON and Markdown formats get the structured JSON form. Human output is
/// styled only when color is allowed and stderr is a terminal.
#[must_use]
pub fn render_error(error: &AidrError, format: OutputFormat, no_color: bool) -> String {
    render_error_full(error, format, no_color, false)
}

/// Render an error with explicit control over JSON pretty-printing.
#[must_use]
pub fn render_error_full(
    error: &AidrError,
    format: OutputFormat,
    no_color: bool,
    pretty: bool,
) -> String {
    match format {
        OutputFormat::Json => render_error_json(error, pretty),
        OutputFormat::Md => render_error_json(error, true),
        OutputFormat::Human if no_color || !stderr_is_tty() => render_simple(error),
        OutputFormat::Human => render_detailed(error, Theme::new(false)),
    }
}

/// Render error as structured JSON.
#[must_use]
pub fn render_error_json(error: &AidrError, pretty: bool) -> String {
    let envelope = ErrorEnvelope {
        error: ErrorJson::from_error(error),
    };
    let rendered = if pretty {
        serde_json::to_string_pretty(&envelope)
    } else {
        serde_json::to_string(&envelope)
    };
    rendered.unwrap_or_else(|_| render_simple(error))
}

// =============================================================================
// Terminal rendering
// =============================================================================

/// Full report: header, fix commands, context, prevention, docs.
fn render_detailed(error: &AidrError, theme: Theme) -> String {
    let suggestions = error.fix_suggestions();
    let mut lines = vec![format!(
        "{} {}",
        theme.error(&format!("Error: {error}")),
        theme.muted(&format!("[{}]", error.error_code()))
    )];

    if suggestions.iter().any(|s| !s.commands.is_empty()) {
        lines.push(String::new());
        lines.push(render_suggestions_section(&suggestions, theme));
    }

    if let Some(first) = suggestions.first() {
        if !first.context.is_empty() {
            lines.push(String::new());
            lines.push(theme.secondary("Why this happened:"));
            lines.extend(wrap_text(&first.context, WRAP_WIDTH).into_iter().map(|l| format!("  {l}")));
        }
        if let Some(prevention) = &first.prevention {
            lines.push(String::new());
            lines.push(theme.success("Prevention:"));
            lines.extend(wrap_text(prevention, WRAP_WIDTH).into_iter().map(|l| format!("  {l}")));
        }
        if let Some(url) = &first.doc_url {
            lines.push(String::new());
            lines.push(format!("{} {url}", theme.muted("Docs:")));
        }
    }

    lines.push(String::new());
    lines.join("\n")
}

fn render_suggestions_section(suggestions: &[FixSuggestion], theme: Theme) -> String {
    let mut lines = vec![theme.primary("How to fix:")];
    let mut number = 0;
    for suggestion in suggestions.iter().filter(|s| !s.commands.is_empty()) {
        number += 1;
        for (i, command) in suggestion.commands.iter().enumerate() {
            let prefix = if i == 0 {
                format!("  {number}. ")
            } else {
                "     Or: ".to_string()
            };
            lines.push(format!("{prefix}{}", theme.code(command)));
        }
    }
    lines.join("\n")
}

/// One or two plain lines, safe for pipes and CI logs.
fn render_simple(error: &AidrError) -> String {
    let mut lines = vec![format!("Error [{}]: {error}", error.error_code())];

    let fix = error
        .fix_suggestions()
        .into_iter()
        .flat_map(|s| s.commands)
        .find(|cmd| !cmd.starts_with('#'));
    if let Some(cmd) = fix {
        lines.push(format!("Fix: {cmd}"));
    }

    lines.join("\n")
}

// =============================================================================
// JSON rendering
// =============================================================================

#[derive(Serialize)]
struct ErrorEnvelope {
    error: ErrorJson,
}

/// JSON representation of an error for machine consumption.
#[derive(Serialize)]
struct ErrorJson {
    code: &'static str,
    category: String,
    message: String,
    retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    suggestions: Vec<SuggestionJson>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SuggestionJson {
    commands: Vec<String>,
    context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    prevention: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    doc_url: Option<String>,
}

impl ErrorJson {
    fn from_error(error: &AidrError) -> Self {
        Self {
            code: error.error_code(),
            category: error.category().to_string(),
            message: error.to_string(),
            retryable: error.is_retryable(),
            status: error.status_code(),
            suggestions: error
                .fix_suggestions()
                .into_iter()
                .map(|s| SuggestionJson {
                    commands: s.commands,
                    context: s.context,
                    prevention: s.prevention,
                    doc_url: s.doc_url,
                })
                .collect(),
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Greedy word wrap.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.len() + 1 + word.len() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
