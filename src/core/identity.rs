//! Model identity extraction.
//!
//! The control plane does not guarantee a model-identifying field in any
//! single response. Identity is resolved by an ordered list of extractors
//! over everything known about a deployment; the first non-empty value wins.

use serde::Serialize;

use crate::core::models::DeploymentDetails;

// =============================================================================
// Evidence
// =============================================================================

/// Everything known about a deployment that may reveal its model.
#[derive(Debug, Clone, Default)]
pub struct IdentityEvidence<'a> {
    /// `x-model-id` from a probe response.
    pub model_header: Option<&'a str>,
    /// Body of `GET /v2/lm/deployments/{id}`.
    pub details: Option<&'a DeploymentDetails>,
    /// Name of the configuration the deployment was correlated with.
    pub configuration_name: Option<&'a str>,
}

// =============================================================================
// Extractors
// =============================================================================

/// Which source an identity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentitySource {
    ModelHeader,
    BackendModel,
    ConfigurationName,
}

impl IdentitySource {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ModelHeader => "model-header",
            Self::BackendModel => "backend-model",
            Self::ConfigurationName => "configuration-name",
        }
    }
}

/// One step of the identity chain.
pub struct IdentityExtractor {
    pub source: IdentitySource,
    pub extract: for<'a> fn(&IdentityEvidence<'a>) -> Option<&'a str>,
}

impl std::fmt::Debug for IdentityExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityExtractor")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

fn from_header<'a>(evidence: &IdentityEvidence<'a>) -> Option<&'a str> {
    evidence.model_header
}

fn from_backend_model<'a>(evidence: &IdentityEvidence<'a>) -> Option<&'a str> {
    evidence.details.and_then(DeploymentDetails::backend_model_name)
}

fn from_configuration_name<'a>(evidence: &IdentityEvidence<'a>) -> Option<&'a str> {
    evidence
        .details
        .and_then(DeploymentDetails::configuration_name)
        .filter(|name| usable(name).is_some())
        .or(evidence.configuration_name)
}

/// The extractor chain, in priority order.
pub const DEFAULT_CHAIN: &[IdentityExtractor] = &[
    IdentityExtractor {
        source: IdentitySource::ModelHeader,
        extract: from_header,
    },
    IdentityExtractor {
        source: IdentitySource::BackendModel,
        extract: from_backend_model,
    },
    IdentityExtractor {
        source: IdentitySource::ConfigurationName,
        extract: from_configuration_name,
    },
];

// =============================================================================
// Resolution
// =============================================================================

/// A resolved model identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelIdentity {
    pub model: String,
    pub source: IdentitySource,
}

/// Trimmed value, or `None` for blanks and the `unknown` placeholder.
fn usable(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("unknown") {
        None
    } else {
        Some(trimmed)
    }
}

/// Run a chain of extractors; the first usable value wins.
#[must_use]
pub fn resolve_with(
    chain: &[IdentityExtractor],
    evidence: &IdentityEvidence<'_>,
) -> Option<ModelIdentity> {
    chain.iter().find_map(|extractor| {
        let value = (extractor.extract)(evidence).and_then(usable)?;
        tracing::debug!(source = extractor.source.label(), model = value, "Resolved model identity");
        Some(ModelIdentity {
            model: value.to_string(),
            source: extractor.source,
        })
    })
}

/// Resolve identity with [`DEFAULT_CHAIN`].
#[must_use]
pub fn resolve(evidence: &IdentityEvidence<'_>) -> Option<ModelIdentity> {
    resolve_with(DEFAULT_CHAIN, evidence)
}
