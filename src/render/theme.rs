//! Terminal styling for human output.
//!
//! A thin layer over `colored`: every role maps to one style, and a plain
//! theme returns text untouched so callers never branch on `no_color`.

use colored::Colorize;

use crate::core::doctor::CheckStatus;
use crate::core::models::DeploymentStatus;

/// Named styles used across the human renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    color: bool,
}

impl Theme {
    #[must_use]
    pub const fn new(no_color: bool) -> Self {
        Self { color: !no_color }
    }

    #[must_use]
    pub const fn is_plain(self) -> bool {
        !self.color
    }

    /// Section titles.
    #[must_use]
    pub fn primary(self, text: &str) -> String {
        if self.color {
            text.bold().cyan().to_string()
        } else {
            text.to_string()
        }
    }

    /// Sub-headings.
    #[must_use]
    pub fn secondary(self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    #[must_use]
    pub fn success(self, text: &str) -> String {
        if self.color {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }

    #[must_use]
    pub fn warning(self, text: &str) -> String {
        if self.color {
            text.yellow().to_string()
        } else {
            text.to_string()
        }
    }

    #[must_use]
    pub fn error(self, text: &str) -> String {
        if self.color {
            text.red().bold().to_string()
        } else {
            text.to_string()
        }
    }

    #[must_use]
    pub fn muted(self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    /// Commands, URLs and identifiers meant to be copied.
    #[must_use]
    pub fn code(self, text: &str) -> String {
        if self.color {
            text.cyan().to_string()
        } else {
            text.to_string()
        }
    }

    /// Deployment status, colored by lifecycle state.
    #[must_use]
    pub fn status(self, status: &DeploymentStatus) -> String {
        let text = status.as_str();
        match status {
            DeploymentStatus::Running => self.success(text),
            DeploymentStatus::Pending => self.warning(text),
            DeploymentStatus::Dead => self.error(text),
            _ => self.muted(text),
        }
    }

    /// Line colored by check outcome.
    #[must_use]
    pub fn check(self, status: &CheckStatus, text: &str) -> String {
        match status {
            CheckStatus::Pass { .. } => self.success(text),
            CheckStatus::Warning { .. } => self.warning(text),
            CheckStatus::Fail { .. } | CheckStatus::Timeout { .. } => self.error(text),
            CheckStatus::Skipped { .. } => self.muted(text),
        }
    }

    /// Pass/fail marker: unicode when colored, ASCII otherwise.
    #[must_use]
    pub const fn mark(self, ok: bool) -> &'static str {
        match (self.color, ok) {
            (true, true) => "\u{2713}",
            (true, false) => "\u{2717}",
            (false, true) => "[OK]",
            (false, false) => "[!!]",
        }
    }

    /// Marker for a check status.
    #[must_use]
    pub const fn check_mark(self, status: &CheckStatus) -> &'static str {
        match status {
            CheckStatus::Pass { .. } => self.mark(true),
            CheckStatus::Fail { .. } | CheckStatus::Timeout { .. } => self.mark(false),
            CheckStatus::Warning { .. } => {
                if self.color {
                    "\u{26A0}"
                } else {
                    "[!!]"
                }
            }
            CheckStatus::Skipped { .. } => {
                if self.color {
                    "\u{23ED}"
                } else {
                    "[--]"
                }
            }
        }
    }

    #[must_use]
    pub const fn arrow(self) -> &'static str {
        if self.color { "\u{2192}" } else { "->" }
    }

    /// Horizontal rule.
    #[must_use]
    pub fn rule(self, width: usize) -> String {
        let ch = if self.color { "\u{2500}" } else { "-" };
        self.muted(&ch.repeat(width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_theme_returns_text_untouched() {
        let theme = Theme::new(true);
        assert!(theme.is_plain());
        assert_eq!(theme.error("boom"), "boom");
        assert_eq!(theme.status(&DeploymentStatus::Running), "RUNNING");
        assert_eq!(theme.rule(3), "---");
    }

    #[test]
    fn plain_marks_are_ascii() {
        let theme = Theme::new(true);
        assert_eq!(theme.mark(true), "[OK]");
        assert_eq!(theme.mark(false), "[!!]");
        assert_eq!(theme.check_mark(&CheckStatus::skipped("offline")), "[--]");
        assert_eq!(theme.arrow(), "->");
    }

    #[test]
    fn colored_marks_are_unicode() {
        let theme = Theme::new(false);
        assert_eq!(theme.mark(true), "\u{2713}");
        assert_eq!(theme.mark(false), "\u{2717}");
    }
}
