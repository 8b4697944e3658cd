//! Configuration-to-deployment correlation.
//!
//! Configurations are filtered by a caller-supplied name predicate, then
//! joined to deployments on `configurationId`. Listing order is preserved
//! throughout so "first running match" is reproducible.

use std::collections::HashMap;

use serde::Serialize;

use crate::core::models::{Configuration, Deployment, ModelMatch, deployment_url};

// =============================================================================
// Name predicates
// =============================================================================

/// Anything that can decide whether a configuration name is of interest.
pub trait NameMatcher {
    fn matches(&self, name: &str) -> bool;
}

impl<F> NameMatcher for F
where
    F: Fn(&str) -> bool,
{
    fn matches(&self, name: &str) -> bool {
        self(name)
    }
}

/// Case-insensitive substring match against any of a set of tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePredicate {
    tokens: Vec<String>,
}

/// Tokens that identify a Claude 4.5 Opus configuration.
pub const OPUS_TOKENS: &[&str] = &["claude-4.5-opus", "claude45_opus"];

/// Tokens that identify any Anthropic model family.
pub const ANTHROPIC_FAMILY_TOKENS: &[&str] = &["claude", "anthropic", "opus"];

impl NamePredicate {
    /// Build a predicate from tokens. Blank tokens are dropped.
    #[must_use]
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    #[must_use]
    pub fn opus() -> Self {
        Self::new(OPUS_TOKENS)
    }

    #[must_use]
    pub fn anthropic_family() -> Self {
        Self::new(ANTHROPIC_FAMILY_TOKENS)
    }

    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

impl NameMatcher for NamePredicate {
    fn matches(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.tokens.iter().any(|token| name.contains(token.as_str()))
    }
}

// =============================================================================
// Correlation
// =============================================================================

/// Join deployments to the configurations whose name satisfies `predicate`.
///
/// Output follows deployment listing order. Deployments that reference a
/// configuration absent from `configurations` are dropped silently, and an
/// empty id on either side never joins.
#[must_use]
pub fn correlate<P>(
    configurations: &[Configuration],
    deployments: &[Deployment],
    predicate: &P,
    api_base: &str,
) -> Vec<ModelMatch>
where
    P: NameMatcher + ?Sized,
{
    let wanted: HashMap<&str, &Configuration> = configurations
        .iter()
        .filter(|c| !c.id.is_empty() && predicate.matches(&c.name))
        .map(|c| (c.id.as_str(), c))
        .collect();

    if wanted.is_empty() {
        return Vec::new();
    }

    deployments
        .iter()
        .filter(|deployment| !deployment.configuration_id.is_empty())
        .filter_map(|deployment| {
            let config = wanted.get(deployment.configuration_id.as_str())?;
            Some(ModelMatch {
                config_id: config.id.clone(),
                config_name: config.name.clone(),
                deployment_id: deployment.id.clone(),
                deployment_url: deployment_url(api_base, &deployment.id),
                status: deployment.status.clone(),
            })
        })
        .collect()
}

/// Correlation result with status partitioning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MatchSet {
    matches: Vec<ModelMatch>,
}

impl MatchSet {
    #[must_use]
    pub const fn new(matches: Vec<ModelMatch>) -> Self {
        Self { matches }
    }

    /// Correlate and wrap in one step.
    #[must_use]
    pub fn correlate<P>(
        configurations: &[Configuration],
        deployments: &[Deployment],
        predicate: &P,
        api_base: &str,
    ) -> Self
    where
        P: NameMatcher + ?Sized,
    {
        Self::new(correlate(configurations, deployments, predicate, api_base))
    }

    #[must_use]
    pub fn all(&self) -> &[ModelMatch] {
        &self.matches
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<ModelMatch> {
        self.matches
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn running(&self) -> impl Iterator<Item = &ModelMatch> {
        self.matches.iter().filter(|m| m.is_running())
    }

    pub fn not_running(&self) -> impl Iterator<Item = &ModelMatch> {
        self.matches.iter().filter(|m| !m.is_running())
    }

    /// The actionable match: first RUNNING in listing order.
    #[must_use]
    pub fn first_running(&self) -> Option<&ModelMatch> {
        self.running().next()
    }
}

// =============================================================================
// Classification
// =============================================================================

/// Configurations split by predicate, listing order kept.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Classified<'a> {
    pub matching: Vec<&'a Configuration>,
    pub other: Vec<&'a Configuration>,
}

/// Partition configurations into matching and other.
#[must_use]
pub fn classify<'a, P>(configurations: &'a [Configuration], predicate: &P) -> Classified<'a>
where
    P: NameMatcher + ?Sized,
{
    let (matching, other): (Vec<_>, Vec<_>) = configurations
        .iter()
        .partition(|c| predicate.matches(&c.name));
    Classified { matching, other }
}
