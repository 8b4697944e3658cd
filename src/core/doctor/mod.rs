//! Doctor command diagnostic framework.
//!
//! Defines the core data structures for health checks and reporting.

pub mod checks;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Result of a single diagnostic check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckStatus {
    /// Check passed with optional details.
    Pass { details: Option<String> },
    /// Check passed but something looks off (e.g., no RUNNING deployments).
    Warning {
        details: String,
        suggestion: Option<String>,
    },
    /// Check failed with reason and optional fix suggestion.
    Fail {
        reason: String,
        suggestion: Option<String>,
    },
    /// Check was skipped (offline mode, or an earlier step failed).
    Skipped { reason: String },
    /// Check timed out.
    Timeout { after: Duration },
}

impl CheckStatus {
    /// Whether this status indicates the check is ready (functional).
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(
            self,
            Self::Pass { .. } | Self::Warning { .. } | Self::Skipped { .. }
        )
    }

    /// Whether this status requires attention (warning or worse).
    #[must_use]
    pub const fn needs_attention(&self) -> bool {
        matches!(
            self,
            Self::Warning { .. } | Self::Fail { .. } | Self::Timeout { .. }
        )
    }

    #[must_use]
    pub const fn is_warning(&self) -> bool {
        matches!(self, Self::Warning { .. })
    }

    pub(crate) fn fail(reason: impl Into<String>, suggestion: Option<&str>) -> Self {
        Self::Fail {
            reason: reason.into(),
            suggestion: suggestion.map(ToString::to_string),
        }
    }

    pub(crate) fn pass(details: impl Into<String>) -> Self {
        Self::Pass {
            details: Some(details.into()),
        }
    }

    pub(crate) fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (label, text, hint) = match self {
            Self::Pass { details } => ("pass", details.as_deref(), None),
            Self::Warning {
                details,
                suggestion,
            } => ("warning", Some(details.as_str()), suggestion.as_deref()),
            Self::Fail { reason, suggestion } => ("fail", Some(reason.as_str()), suggestion.as_deref()),
            Self::Skipped { reason } => ("skipped", Some(reason.as_str()), None),
            Self::Timeout { after } => return write!(f, "timeout after {}s", after.as_secs()),
        };
        f.write_str(label)?;
        match (self, text) {
            (Self::Pass { .. }, Some(text)) => write!(f, " ({text})")?,
            (_, Some(text)) => write!(f, ": {text}")?,
            (_, None) => {}
        }
        if let Some(hint) = hint {
            write!(f, " (try: {hint})")?;
        }
        Ok(())
    }
}

/// A single diagnostic check result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticCheck {
    pub name: String,
    pub status: CheckStatus,
    pub duration: Option<Duration>,
}

impl DiagnosticCheck {
    /// Create a new diagnostic check.
    #[must_use]
    pub fn new(name: impl Into<String>, status: CheckStatus) -> Self {
        Self {
            name: name.into(),
            status,
            duration: None,
        }
    }

    /// Set duration for the check.
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

/// Health of one routing-config subaccount.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubaccountHealth {
    pub subaccount: String,
    pub resource_group: String,
    pub service_key: DiagnosticCheck,
    pub token: DiagnosticCheck,
    pub listing: DiagnosticCheck,
}

impl SubaccountHealth {
    fn checks(&self) -> [&DiagnosticCheck; 3] {
        [&self.service_key, &self.token, &self.listing]
    }

    /// Whether all checks for this subaccount are ready.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.checks().iter().all(|c| c.status.is_ready())
    }

    /// Whether any checks need attention (warning or worse).
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.checks().iter().any(|c| c.status.needs_attention())
    }
}

/// Complete diagnostic report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DoctorReport {
    pub aidr_version: String,
    pub settings: DiagnosticCheck,
    pub routing_config: DiagnosticCheck,
    /// External tools used by `proxy-check`.
    pub tools: Vec<DiagnosticCheck>,
    pub subaccounts: Vec<SubaccountHealth>,
    pub total_duration: Duration,
}

impl DoctorReport {
    /// Returns (`ready_count`, `needs_attention_count`).
    ///
    /// Counts subaccounts as ready only when all their checks are ready.
    /// Settings and routing config add one needs-attention entry each when
    /// failing. Missing tools are informational and not counted.
    #[must_use]
    pub fn summary(&self) -> (usize, usize) {
        let mut ready = 0;
        let mut needs_attention = 0;

        for check in [&self.settings, &self.routing_config] {
            if !check.status.is_ready() {
                needs_attention += 1;
            }
        }

        for subaccount in &self.subaccounts {
            if subaccount.is_ready() {
                ready += 1;
            } else {
                needs_attention += 1;
            }
        }

        (ready, needs_attention)
    }
}
