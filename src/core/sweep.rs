//! Per-subaccount orchestration.
//!
//! Each subaccount runs the same chain: load service key, build a client,
//! get a token, list, correlate, and optionally probe. Subaccounts are
//! visited in routing-config order, one at a time.
//!
//! Failure policy:
//! - a broken service key skips the subaccount and is recorded
//! - `configs` and `find` abort on any other error
//! - `deployments` records the error against the subaccount and continues

use std::time::Duration;

use serde::Serialize;

use crate::core::client::AiCoreClient;
use crate::core::correlate::{MatchSet, NameMatcher, classify};
use crate::core::http::{DEFAULT_TIMEOUT, PROBE_TIMEOUT};
use crate::core::identity::{self, IdentityEvidence, IdentitySource, ModelIdentity};
use crate::core::models::{Configuration, Deployment, DeploymentStatus, ErrorReport, ModelMatch};
use crate::core::probe::{ProbeRequest, ProbeResult};
use crate::core::token::AccessToken;
use crate::error::{AidrError, Result};
use crate::storage::routing_config::SubAccount;

// =============================================================================
// Options and sessions
// =============================================================================

/// Knobs shared by every sweep.
#[derive(Debug, Clone)]
pub struct SweepOptions {
    /// Use this token instead of running the client-credentials exchange.
    pub token: Option<AccessToken>,
    pub timeout: Duration,
    pub probe_timeout: Duration,
    pub probe_request: ProbeRequest,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            token: None,
            timeout: DEFAULT_TIMEOUT,
            probe_timeout: PROBE_TIMEOUT,
            probe_request: ProbeRequest::default(),
        }
    }
}

/// An authenticated client scoped to one subaccount's resource group.
#[derive(Debug, Clone)]
pub struct Session {
    pub subaccount: String,
    pub resource_group: String,
    client: AiCoreClient,
    token: AccessToken,
    probe_timeout: Duration,
}

impl Session {
    /// Load the service key and obtain a token.
    ///
    /// # Errors
    ///
    /// Service-key errors (`ConfigNotFound`, `ConfigParse`,
    /// `CredentialMissing`), then `AuthFailed`/`Timeout` from the exchange.
    pub async fn open(subaccount: &SubAccount, options: &SweepOptions) -> Result<Self> {
        let credential = subaccount.load_credential()?;
        tracing::debug!(
            subaccount = %subaccount.name,
            resource_group = %subaccount.resource_group,
            client = %credential.fingerprint(),
            "Opening session"
        );
        let client = AiCoreClient::with_timeout(credential, options.timeout)?
            .with_probe_request(options.probe_request.clone());
        let token = match &options.token {
            Some(token) => token.clone(),
            None => client.authenticate().await?,
        };
        Ok(Self {
            subaccount: subaccount.name.clone(),
            resource_group: subaccount.resource_group.clone(),
            client,
            token,
            probe_timeout: options.probe_timeout,
        })
    }

    #[must_use]
    pub const fn client(&self) -> &AiCoreClient {
        &self.client
    }

    /// # Errors
    ///
    /// See [`AiCoreClient::list_configurations`].
    pub async fn configurations(&self) -> Result<Vec<Configuration>> {
        self.client
            .list_configurations(&self.token, &self.resource_group)
            .await
    }

    /// # Errors
    ///
    /// See [`AiCoreClient::list_deployments`].
    pub async fn deployments(&self) -> Result<Vec<Deployment>> {
        self.client
            .list_deployments(&self.token, &self.resource_group)
            .await
    }

    pub async fn probe(&self, deployment_id: &str) -> ProbeResult {
        self.client
            .probe(
                &self.token,
                &self.resource_group,
                deployment_id,
                self.probe_timeout,
            )
            .await
    }

    pub async fn identify(
        &self,
        deployment_id: &str,
        configuration_name: Option<&str>,
    ) -> (ProbeResult, Option<ModelIdentity>) {
        self.client
            .identify(
                &self.token,
                &self.resource_group,
                deployment_id,
                configuration_name,
                self.probe_timeout,
            )
            .await
    }

    /// Identity from deployment details alone, without sending inference.
    pub async fn identify_from_details(
        &self,
        deployment_id: &str,
        configuration_name: Option<&str>,
    ) -> Option<ModelIdentity> {
        let details = self
            .client
            .details_or_none(&self.token, &self.resource_group, deployment_id)
            .await;
        identity::resolve(&IdentityEvidence {
            model_header: None,
            details: details.as_ref(),
            configuration_name,
        })
    }
}

// =============================================================================
// Reports
// =============================================================================

/// What happened to one subaccount.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum SubaccountOutcome<T> {
    Resolved(T),
    /// Service key unusable; nothing was sent.
    Skipped(ErrorReport),
    /// Token or listing failed.
    Failed(ErrorReport),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubaccountReport<T> {
    pub subaccount: String,
    pub resource_group: String,
    #[serde(flatten)]
    pub outcome: SubaccountOutcome<T>,
}

impl<T> SubaccountReport<T> {
    #[must_use]
    pub const fn resolved(&self) -> Option<&T> {
        match &self.outcome {
            SubaccountOutcome::Resolved(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn error(&self) -> Option<&ErrorReport> {
        match &self.outcome {
            SubaccountOutcome::Skipped(report) | SubaccountOutcome::Failed(report) => {
                Some(report)
            }
            SubaccountOutcome::Resolved(_) => None,
        }
    }
}

/// Results for every visited subaccount, in visit order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport<T> {
    pub subaccounts: Vec<SubaccountReport<T>>,
}

impl<T> SweepReport<T> {
    pub fn resolved(&self) -> impl Iterator<Item = (&SubaccountReport<T>, &T)> {
        self.subaccounts
            .iter()
            .filter_map(|r| r.resolved().map(|value| (r, value)))
    }

    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.subaccounts
            .iter()
            .filter(|r| matches!(r.outcome, SubaccountOutcome::Skipped(_)))
            .count()
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.subaccounts
            .iter()
            .filter(|r| matches!(r.outcome, SubaccountOutcome::Failed(_)))
            .count()
    }

    /// Errors for the robot envelope.
    #[must_use]
    pub fn error_reports(&self) -> Vec<ErrorReport> {
        self.subaccounts
            .iter()
            .filter_map(|r| r.error().cloned())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailurePolicy {
    Abort,
    Continue,
}

fn settle<T>(
    subaccount: &SubAccount,
    result: Result<T>,
    policy: FailurePolicy,
) -> Result<SubaccountReport<T>> {
    let outcome = match result {
        Ok(value) => SubaccountOutcome::Resolved(value),
        Err(e) if e.skips_subaccount() => {
            tracing::warn!(subaccount = %subaccount.name, error = %e, "Skipping subaccount");
            SubaccountOutcome::Skipped(ErrorReport::from_error(&subaccount.name, &e))
        }
        Err(e) if policy == FailurePolicy::Continue => {
            tracing::warn!(subaccount = %subaccount.name, error = %e, "Subaccount failed");
            SubaccountOutcome::Failed(ErrorReport::from_error(&subaccount.name, &e))
        }
        Err(e) => return Err(e),
    };
    Ok(SubaccountReport {
        subaccount: subaccount.name.clone(),
        resource_group: subaccount.resource_group.clone(),
        outcome,
    })
}

// =============================================================================
// Configurations
// =============================================================================

/// Configurations of one subaccount split by model family.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationReport {
    pub total: usize,
    pub matching: Vec<Configuration>,
    pub other: Vec<Configuration>,
}

impl ConfigurationReport {
    pub fn classify<P>(configurations: &[Configuration], predicate: &P) -> Self
    where
        P: NameMatcher + ?Sized,
    {
        let split = classify(configurations, predicate);
        Self {
            total: configurations.len(),
            matching: split.matching.into_iter().cloned().collect(),
            other: split.other.into_iter().cloned().collect(),
        }
    }
}

/// List configurations in every subaccount.
///
/// # Errors
///
/// Aborts on the first token or listing error; service-key errors only skip.
pub async fn sweep_configurations<P>(
    subaccounts: &[&SubAccount],
    options: &SweepOptions,
    predicate: &P,
) -> Result<SweepReport<ConfigurationReport>>
where
    P: NameMatcher + ?Sized,
{
    let mut reports = Vec::with_capacity(subaccounts.len());
    for subaccount in subaccounts {
        let result = configurations_for(subaccount, options, predicate).await;
        reports.push(settle(subaccount, result, FailurePolicy::Abort)?);
    }
    Ok(SweepReport {
        subaccounts: reports,
    })
}

async fn configurations_for<P>(
    subaccount: &SubAccount,
    options: &SweepOptions,
    predicate: &P,
) -> Result<ConfigurationReport>
where
    P: NameMatcher + ?Sized,
{
    let session = Session::open(subaccount, options).await?;
    let configurations = session.configurations().await?;
    Ok(ConfigurationReport::classify(&configurations, predicate))
}

// =============================================================================
// Deployments
// =============================================================================

/// How `sweep_deployments` resolves each deployment's model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdentifyMode {
    /// Read deployment details only.
    #[default]
    Details,
    /// Probe first, fall back to details.
    Probe,
}

/// A deployment with its resolved model.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedDeployment {
    pub deployment_id: String,
    pub configuration_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration_name: Option<String>,

    pub status: DeploymentStatus,
    pub deployment_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_source: Option<IdentitySource>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe: Option<ProbeResult>,

    /// Routing keys in the proxy config that already point here.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub routed_as: Vec<String>,
}

/// Deployments of one subaccount grouped by model family.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentReport {
    pub total: usize,
    /// Deployments whose model matches the family tokens.
    pub family: Vec<ResolvedDeployment>,
    pub other: Vec<ResolvedDeployment>,
    /// Deployments with no usable model name.
    pub unidentified: Vec<ResolvedDeployment>,
}

impl DeploymentReport {
    /// Group resolved deployments by model name.
    pub fn group<P>(deployments: Vec<ResolvedDeployment>, predicate: &P) -> Self
    where
        P: NameMatcher + ?Sized,
    {
        let mut report = Self {
            total: deployments.len(),
            ..Self::default()
        };
        for deployment in deployments {
            match deployment.model.as_deref() {
                Some(model) if predicate.matches(model) => report.family.push(deployment),
                Some(_) => report.other.push(deployment),
                None => report.unidentified.push(deployment),
            }
        }
        report
    }

    /// Probes that ran and failed.
    #[must_use]
    pub fn failed_probes(&self) -> usize {
        self.family
            .iter()
            .chain(&self.other)
            .chain(&self.unidentified)
            .filter(|d| d.probe.as_ref().is_some_and(|p| !p.success))
            .count()
    }
}

/// Options specific to the deployment sweep.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeploymentSweep {
    pub include_stopped: bool,
    pub identify: IdentifyMode,
}

/// List deployments in every subaccount and resolve which model each serves.
///
/// Only RUNNING deployments are resolved unless `include_stopped` is set.
/// Probes never abort the sweep.
///
/// # Errors
///
/// Never fails on per-subaccount errors; they are recorded in the report.
pub async fn sweep_deployments<P>(
    subaccounts: &[&SubAccount],
    options: &SweepOptions,
    sweep: DeploymentSweep,
    predicate: &P,
) -> Result<SweepReport<DeploymentReport>>
where
    P: NameMatcher + ?Sized,
{
    let mut reports = Vec::with_capacity(subaccounts.len());
    for subaccount in subaccounts {
        let result = deployments_for(subaccount, options, sweep, predicate).await;
        reports.push(settle(subaccount, result, FailurePolicy::Continue)?);
    }
    Ok(SweepReport {
        subaccounts: reports,
    })
}

async fn deployments_for<P>(
    subaccount: &SubAccount,
    options: &SweepOptions,
    sweep: DeploymentSweep,
    predicate: &P,
) -> Result<DeploymentReport>
where
    P: NameMatcher + ?Sized,
{
    let session = Session::open(subaccount, options).await?;
    let deployments = session.deployments().await?;

    let mut resolved = Vec::new();
    for deployment in deployments
        .iter()
        .filter(|d| sweep.include_stopped || d.status.is_running())
    {
        let configuration_name = deployment.configuration_name.as_deref();
        let (probe, identity) = match sweep.identify {
            IdentifyMode::Details => (
                None,
                session
                    .identify_from_details(&deployment.id, configuration_name)
                    .await,
            ),
            IdentifyMode::Probe => {
                let (probe, identity) = session.identify(&deployment.id, configuration_name).await;
                (Some(probe), identity)
            }
        };

        let deployment_url = session.client().deployment_url(&deployment.id);
        let routed_as = subaccount
            .models_routed_to(&deployment_url)
            .map(ToString::to_string)
            .collect();
        resolved.push(ResolvedDeployment {
            deployment_id: deployment.id.clone(),
            configuration_id: deployment.configuration_id.clone(),
            configuration_name: deployment.configuration_name.clone(),
            status: deployment.status.clone(),
            deployment_url,
            model: identity.as_ref().map(|i| i.model.clone()),
            model_source: identity.map(|i| i.source),
            probe,
            routed_as,
        });
    }

    tracing::info!(
        subaccount = %subaccount.name,
        listed = deployments.len(),
        resolved = resolved.len(),
        "Resolved deployments"
    );
    Ok(DeploymentReport::group(resolved, predicate))
}

// =============================================================================
// Find
// =============================================================================

/// Deployments of one subaccount serving the wanted model.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FindReport {
    /// Configurations whose name matched.
    pub configurations: Vec<Configuration>,
    pub matches: MatchSet,
    /// First RUNNING match in listing order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chosen: Option<ModelMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe: Option<ProbeResult>,
}

impl FindReport {
    /// Matches exist but none is RUNNING.
    #[must_use]
    pub fn only_inactive(&self) -> bool {
        !self.matches.is_empty() && self.chosen.is_none()
    }
}

/// Find deployments whose configuration name matches `predicate`.
///
/// # Errors
///
/// Aborts on the first token or listing error; service-key errors only skip.
pub async fn find_deployments<P>(
    subaccounts: &[&SubAccount],
    options: &SweepOptions,
    predicate: &P,
    probe: bool,
) -> Result<SweepReport<FindReport>>
where
    P: NameMatcher + ?Sized,
{
    let mut reports = Vec::with_capacity(subaccounts.len());
    for subaccount in subaccounts {
        let result = find_in(subaccount, options, predicate, probe).await;
        reports.push(settle(subaccount, result, FailurePolicy::Abort)?);
    }
    Ok(SweepReport {
        subaccounts: reports,
    })
}

async fn find_in<P>(
    subaccount: &SubAccount,
    options: &SweepOptions,
    predicate: &P,
    probe: bool,
) -> Result<FindReport>
where
    P: NameMatcher + ?Sized,
{
    let session = Session::open(subaccount, options).await?;
    let configurations = session.configurations().await?;
    let deployments = session.deployments().await?;

    let matches = MatchSet::correlate(
        &configurations,
        &deployments,
        predicate,
        session.client().credential().api_url(),
    );
    let chosen = matches.first_running().cloned();
    let probe = match (&chosen, probe) {
        (Some(chosen), true) => Some(session.probe(&chosen.deployment_id).await),
        _ => None,
    };

    tracing::info!(
        subaccount = %subaccount.name,
        matches = matches.len(),
        running = matches.running().count(),
        "Correlated deployments"
    );
    Ok(FindReport {
        configurations: classify(&configurations, predicate)
            .matching
            .into_iter()
            .cloned()
            .collect(),
        matches,
        chosen,
        probe,
    })
}

/// The first chosen match across subaccounts, in visit order.
#[must_use]
pub fn first_choice(report: &SweepReport<FindReport>) -> Option<(&str, &ModelMatch)> {
    report.resolved().find_map(|(sub, found)| {
        found
            .chosen
            .as_ref()
            .map(|chosen| (sub.subaccount.as_str(), chosen))
    })
}

// =============================================================================
// Probe
// =============================================================================

/// Pick the subaccount for commands that target exactly one.
///
/// # Errors
///
/// `SubAccountNotFound` for an unknown name; `Config` when several are
/// configured and none was named.
pub fn single_subaccount<'a>(
    subaccounts: &'a [SubAccount],
    name: Option<&str>,
) -> Result<&'a SubAccount> {
    match (name, subaccounts) {
        (Some(name), _) => subaccounts
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| AidrError::SubAccountNotFound(name.to_string())),
        (None, [only]) => Ok(only),
        (None, _) => Err(AidrError::Config(format!(
            "{} subaccounts configured; pick one with --subaccount",
            subaccounts.len()
        ))),
    }
}

/// Probe each deployment in one subaccount, in the given order.
///
/// # Errors
///
/// Only session errors; probe failures are recorded in each result.
pub async fn probe_deployments(
    subaccount: &SubAccount,
    options: &SweepOptions,
    deployment_ids: &[String],
    identify: bool,
) -> Result<ProbeReport> {
    let session = Session::open(subaccount, options).await?;
    let mut results = Vec::with_capacity(deployment_ids.len());
    for deployment_id in deployment_ids {
        let (probe, identity) = if identify {
            session.identify(deployment_id, None).await
        } else {
            (session.probe(deployment_id).await, None)
        };
        tracing::info!(
            subaccount = %subaccount.name,
            deployment_id = %deployment_id,
            success = probe.success,
            status = probe.status_code,
            duration_ms = probe.elapsed_ms,
            "Probed deployment"
        );
        results.push(ProbedDeployment {
            deployment_url: session.client().deployment_url(deployment_id),
            probe,
            identity,
        });
    }
    Ok(ProbeReport {
        subaccount: subaccount.name.clone(),
        resource_group: subaccount.resource_group.clone(),
        deployments: results,
    })
}

/// Probe results for one subaccount, in request order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeReport {
    pub subaccount: String,
    pub resource_group: String,
    pub deployments: Vec<ProbedDeployment>,
}

impl ProbeReport {
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.deployments.iter().filter(|d| !d.probe.success).count()
    }

    /// Timed-out deployments, kept apart from other failures.
    #[must_use]
    pub fn timed_out(&self) -> impl Iterator<Item = &ProbedDeployment> {
        self.deployments.iter().filter(|d| d.probe.is_timeout())
    }
}

/// A probe result plus, when asked for, the resolved identity.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbedDeployment {
    pub deployment_url: String,
    pub probe: ProbeResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<ModelIdentity>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::correlate::NamePredicate;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn subaccount(name: &str) -> SubAccount {
        SubAccount {
            name: name.to_string(),
            resource_group: "default".to_string(),
            service_key_path: PathBuf::from("/nonexistent/key.json"),
            deployment_models: BTreeMap::new(),
        }
    }

    fn resolved(id: &str, model: Option<&str>) -> ResolvedDeployment {
        ResolvedDeployment {
            deployment_id: id.to_string(),
            configuration_id: format!("c-{id}"),
            configuration_name: None,
            status: DeploymentStatus::Running,
            deployment_url: format!("https://api.example.com/v2/inference/deployments/{id}"),
            model: model.map(ToString::to_string),
            model_source: model.map(|_| IdentitySource::BackendModel),
            probe: None,
            routed_as: Vec::new(),
        }
    }

    #[test]
    fn settle_skips_credential_errors_under_either_policy() {
        let sub = subaccount("main");
        for policy in [FailurePolicy::Abort, FailurePolicy::Continue] {
            let err = AidrError::CredentialMissing {
                field: "clientsecret",
                origin: None,
            };
            let report = settle::<()>(&sub, Err(err), policy).unwrap();
            assert!(matches!(report.outcome, SubaccountOutcome::Skipped(_)));
        }
    }

    #[test]
    fn settle_aborts_on_listing_error_under_abort_policy() {
        let sub = subaccount("main");
        let err = AidrError::ResourceList {
            resource: "deployments".to_string(),
            status: 403,
            body: "forbidden".to_string(),
        };
        assert!(settle::<()>(&sub, Err(err), FailurePolicy::Abort).is_err());
    }

    #[test]
    fn settle_records_listing_error_under_continue_policy() {
        let sub = subaccount("main");
        let err = AidrError::ResourceList {
            resource: "deployments".to_string(),
            status: 500,
            body: "boom".to_string(),
        };
        let report = settle::<()>(&sub, Err(err), FailurePolicy::Continue).unwrap();
        let error = report.error().unwrap();
        assert_eq!(error.scope, "main");
        assert_eq!(error.error_code, "AIDR-P001");
    }

    #[test]
    fn sweep_report_counts_outcomes() {
        let sub = subaccount("a");
        let report = SweepReport {
            subaccounts: vec![
                settle(&sub, Ok(1), FailurePolicy::Continue).unwrap(),
                settle::<i32>(&sub, Err(AidrError::Timeout(5)), FailurePolicy::Continue).unwrap(),
                settle::<i32>(
                    &sub,
                    Err(AidrError::ConfigNotFound {
                        path: "key.json".to_string(),
                    }),
                    FailurePolicy::Continue,
                )
                .unwrap(),
            ],
        };
        assert_eq!(report.resolved().count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.error_reports().len(), 2);
    }

    #[test]
    fn deployment_report_groups_by_family() {
        let report = DeploymentReport::group(
            vec![
                resolved("d1", Some("anthropic--claude-4.5-opus")),
                resolved("d2", Some("gpt-4o")),
                resolved("d3", None),
            ],
            &NamePredicate::anthropic_family(),
        );
        assert_eq!(report.total, 3);
        assert_eq!(report.family[0].deployment_id, "d1");
        assert_eq!(report.other[0].deployment_id, "d2");
        assert_eq!(report.unidentified[0].deployment_id, "d3");
    }

    #[test]
    fn single_subaccount_rules() {
        let one = vec![subaccount("main")];
        assert_eq!(single_subaccount(&one, None).unwrap().name, "main");

        let two = vec![subaccount("a"), subaccount("b")];
        assert!(matches!(
            single_subaccount(&two, None),
            Err(AidrError::Config(_))
        ));
        assert_eq!(single_subaccount(&two, Some("b")).unwrap().name, "b");
        assert!(matches!(
            single_subaccount(&two, Some("c")),
            Err(AidrError::SubAccountNotFound(_))
        ));
    }

    #[tokio::test]
    async fn missing_service_key_skips_without_network() {
        let sub = subaccount("main");
        let subs = vec![&sub];
        let report = sweep_configurations(&subs, &SweepOptions::default(), &NamePredicate::opus())
            .await
            .unwrap();
        assert_eq!(report.skipped_count(), 1);
    }

    #[test]
    fn find_report_only_inactive() {
        let report = FindReport {
            matches: MatchSet::new(vec![ModelMatch {
                config_id: "c1".to_string(),
                config_name: "claude-4.5-opus".to_string(),
                deployment_id: "d1".to_string(),
                deployment_url: "u".to_string(),
                status: DeploymentStatus::Stopped,
            }]),
            ..FindReport::default()
        };
        assert!(report.only_inactive());
        assert!(!FindReport::default().only_inactive());
    }
}
