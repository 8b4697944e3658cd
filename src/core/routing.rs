//! Routing suggestions for the proxy's `deployment_models` table.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::models::ModelMatch;
use crate::core::sweep::{FindReport, SweepReport, first_choice};
use crate::storage::routing_config::SubAccount;

/// Prefix the proxy uses for its vendor-qualified model aliases.
pub const VENDOR_PREFIX: &str = "anthropic--";

/// How the current routing table relates to a suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RoutingState {
    /// No entry for the model.
    Missing,
    /// Entry already points at the suggested URL.
    UpToDate,
    /// Entry exists but points elsewhere.
    Stale { current: Vec<String> },
}

/// Entries to add under `deployment_models` for one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingSnippet {
    pub model: String,
    pub keys: Vec<String>,
    pub url: String,
}

impl RoutingSnippet {
    /// Snippet routing `model` and its vendor alias to the match's URL.
    #[must_use]
    pub fn for_match(model: &str, chosen: &ModelMatch) -> Self {
        Self::new(model, &chosen.deployment_url)
    }

    #[must_use]
    pub fn new(model: &str, url: &str) -> Self {
        let model = model.trim();
        let bare = model.strip_prefix(VENDOR_PREFIX).unwrap_or(model);
        Self {
            model: bare.to_string(),
            keys: vec![bare.to_string(), format!("{VENDOR_PREFIX}{bare}")],
            url: url.trim_end_matches('/').to_string(),
        }
    }

    /// `{"<model>": ["<url>"], "anthropic--<model>": ["<url>"]}`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .keys
            .iter()
            .map(|key| (key.clone(), Value::Array(vec![Value::String(self.url.clone())])))
            .collect();
        Value::Object(map)
    }

    /// Lines ready to paste into an existing `deployment_models` object.
    #[must_use]
    pub fn to_fragment(&self) -> String {
        self.keys
            .iter()
            .map(|key| format!("\"{key}\": [\"{}\"]", self.url))
            .collect::<Vec<_>>()
            .join(",\n")
    }

    /// Compare with the routing table currently configured.
    #[must_use]
    pub fn state_in(&self, table: &BTreeMap<String, Vec<String>>) -> RoutingState {
        let current: Vec<String> = self
            .keys
            .iter()
            .filter_map(|key| table.get(key))
            .flatten()
            .map(|url| url.trim_end_matches('/').to_string())
            .collect();
        if current.is_empty() {
            RoutingState::Missing
        } else if current.iter().all(|url| *url == self.url) {
            RoutingState::UpToDate
        } else {
            RoutingState::Stale { current }
        }
    }
}

/// Snippet for the first chosen deployment, checked against the routing
/// table of the subaccount it was found in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingSuggestion {
    pub subaccount: String,
    pub snippet: RoutingSnippet,
    pub routing: RoutingState,
}

/// Why `find` could not produce a usable suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionNeeded {
    /// No configuration matched the tokens in any subaccount.
    NoMatches,
    /// Matching deployments exist but none is RUNNING.
    OnlyInactive,
    /// The chosen deployment did not answer the probe.
    ProbeFailed,
}

impl ActionNeeded {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoMatches => "no_matches",
            Self::OnlyInactive => "only_inactive",
            Self::ProbeFailed => "probe_failed",
        }
    }
}

/// Everything `find` reports.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FindSummary {
    pub model: String,
    pub tokens: Vec<String>,
    #[serde(flatten)]
    pub report: SweepReport<FindReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<RoutingSuggestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_needed: Option<ActionNeeded>,
}

impl FindSummary {
    /// Build the summary; `subaccounts` supplies the current routing tables.
    #[must_use]
    pub fn new(
        model: &str,
        tokens: Vec<String>,
        report: SweepReport<FindReport>,
        subaccounts: &[SubAccount],
    ) -> Self {
        let suggestion = first_choice(&report).map(|(name, chosen)| {
            let snippet = RoutingSnippet::for_match(model, chosen);
            let routing = subaccounts
                .iter()
                .find(|s| s.name == name)
                .map_or(RoutingState::Missing, |s| snippet.state_in(&s.deployment_models));
            RoutingSuggestion {
                subaccount: name.to_string(),
                snippet,
                routing,
            }
        });
        let action_needed = action_needed(&report, suggestion.as_ref());
        Self {
            model: model.to_string(),
            tokens,
            report,
            suggestion,
            action_needed,
        }
    }
}

fn action_needed(
    report: &SweepReport<FindReport>,
    suggestion: Option<&RoutingSuggestion>,
) -> Option<ActionNeeded> {
    match suggestion {
        Some(suggestion) => {
            let probe_failed = report
                .resolved()
                .filter(|(sub, _)| sub.subaccount == suggestion.subaccount)
                .any(|(_, found)| found.probe.as_ref().is_some_and(|p| !p.success));
            probe_failed.then_some(ActionNeeded::ProbeFailed)
        }
        None if report.resolved().any(|(_, found)| found.only_inactive()) => {
            Some(ActionNeeded::OnlyInactive)
        }
        None => Some(ActionNeeded::NoMatches),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::DeploymentStatus;
    use serde_json::json;

    const URL: &str = "https://api.example.com/v2/inference/deployments/d0c56b8d3578bd1b";

    #[test]
    fn snippet_includes_vendor_alias() {
        let snippet = RoutingSnippet::new("claude-4.5-opus", URL);
        assert_eq!(
            snippet.to_json(),
            json!({
                "claude-4.5-opus": [URL],
                "anthropic--claude-4.5-opus": [URL]
            })
        );
    }

    #[test]
    fn prefixed_model_is_not_double_prefixed() {
        let snippet = RoutingSnippet::new("anthropic--claude-4.5-opus", URL);
        assert_eq!(snippet.keys, ["claude-4.5-opus", "anthropic--claude-4.5-opus"]);
    }

    #[test]
    fn fragment_is_pasteable() {
        let snippet = RoutingSnippet::new("claude-4.5-opus", &format!("{URL}/"));
        assert_eq!(
            snippet.to_fragment(),
            format!("\"claude-4.5-opus\": [\"{URL}\"],\n\"anthropic--claude-4.5-opus\": [\"{URL}\"]")
        );
    }

    #[test]
    fn for_match_uses_deployment_url() {
        let chosen = ModelMatch {
            config_id: "c1".to_string(),
            config_name: "claude-4.5-opus-v1".to_string(),
            deployment_id: "d0c56b8d3578bd1b".to_string(),
            deployment_url: URL.to_string(),
            status: DeploymentStatus::Running,
        };
        assert_eq!(RoutingSnippet::for_match("claude-4.5-opus", &chosen).url, URL);
    }

    #[test]
    fn state_against_routing_table() {
        let snippet = RoutingSnippet::new("claude-4.5-opus", URL);
        let mut table = BTreeMap::new();
        assert_eq!(snippet.state_in(&table), RoutingState::Missing);

        table.insert("claude-4.5-opus".to_string(), vec![format!("{URL}/")]);
        assert_eq!(snippet.state_in(&table), RoutingState::UpToDate);

        table.insert(
            "anthropic--claude-4.5-opus".to_string(),
            vec!["https://old.example.com/d9".to_string()],
        );
        assert!(matches!(snippet.state_in(&table), RoutingState::Stale { current } if current.len() == 2));
    }

    fn found(status: DeploymentStatus) -> FindReport {
        let chosen = ModelMatch {
            config_id: "c1".to_string(),
            config_name: "claude-4.5-opus-v1".to_string(),
            deployment_id: "d0c56b8d3578bd1b".to_string(),
            deployment_url: URL.to_string(),
            status,
        };
        FindReport {
            chosen: chosen.is_running().then(|| chosen.clone()),
            matches: crate::core::correlate::MatchSet::new(vec![chosen]),
            ..FindReport::default()
        }
    }

    fn sweep(reports: Vec<(&str, FindReport)>) -> SweepReport<FindReport> {
        use crate::core::sweep::{SubaccountOutcome, SubaccountReport};
        SweepReport {
            subaccounts: reports
                .into_iter()
                .map(|(name, report)| SubaccountReport {
                    subaccount: name.to_string(),
                    resource_group: "default".to_string(),
                    outcome: SubaccountOutcome::Resolved(report),
                })
                .collect(),
        }
    }

    fn subaccount(name: &str, table: &[(&str, &str)]) -> SubAccount {
        SubAccount {
            name: name.to_string(),
            resource_group: "default".to_string(),
            service_key_path: std::path::PathBuf::from("key.json"),
            deployment_models: table
                .iter()
                .map(|(k, v)| ((*k).to_string(), vec![(*v).to_string()]))
                .collect(),
        }
    }

    #[test]
    fn summary_suggests_first_running_match() {
        let summary = FindSummary::new(
            "claude-4.5-opus",
            vec!["claude-4.5-opus".to_string()],
            sweep(vec![
                ("eu", found(DeploymentStatus::Stopped)),
                ("us", found(DeploymentStatus::Running)),
            ]),
            &[subaccount("eu", &[]), subaccount("us", &[("claude-4.5-opus", URL)])],
        );
        let suggestion = summary.suggestion.unwrap();
        assert_eq!(suggestion.subaccount, "us");
        assert_eq!(suggestion.routing, RoutingState::UpToDate);
        assert!(summary.action_needed.is_none());
    }

    #[test]
    fn summary_flags_inactive_and_missing_matches() {
        let inactive = FindSummary::new(
            "claude-4.5-opus",
            Vec::new(),
            sweep(vec![("eu", found(DeploymentStatus::Stopped))]),
            &[],
        );
        assert_eq!(inactive.action_needed, Some(ActionNeeded::OnlyInactive));

        let none = FindSummary::new(
            "claude-4.5-opus",
            Vec::new(),
            sweep(vec![("eu", FindReport::default())]),
            &[],
        );
        assert_eq!(none.action_needed, Some(ActionNeeded::NoMatches));
        assert!(none.suggestion.is_none());
    }

    #[test]
    fn summary_serializes_flat() {
        let summary = FindSummary::new(
            "claude-4.5-opus",
            Vec::new(),
            sweep(vec![("eu", FindReport::default())]),
            &[],
        );
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["model"], "claude-4.5-opus");
        assert_eq!(value["subaccounts"][0]["outcome"], "resolved");
        assert_eq!(value["actionNeeded"], "no_matches");
    }
}
