//! AI Core control-plane client.
//!
//! One client per service key. Every call takes the token and resource group
//! explicitly: the group is a request header, not part of the token.

use std::time::{Duration, Instant};

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::core::credentials::ServiceCredential;
use crate::core::http::{
    DEFAULT_TIMEOUT, RESOURCE_GROUP_HEADER, build_client, join_url, map_send_error,
    snippet,
};
use crate::core::identity::{self, IdentityEvidence, ModelIdentity};
use crate::core::models::{Configuration, Deployment, DeploymentDetails, ListResponse};
use crate::core::probe::{self, ProbeRequest, ProbeResult};
use crate::core::token::{AccessToken, acquire_token};
use crate::error::{AidrError, Result};

/// Client for the `/v2/lm` and `/v2/inference` APIs of one AI Core instance.
#[derive(Debug, Clone)]
pub struct AiCoreClient {
    credential: ServiceCredential,
    http: Client,
    timeout: Duration,
    probe_request: ProbeRequest,
}

impl AiCoreClient {
    /// Create a client with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(credential: ServiceCredential) -> Result<Self> {
        Self::with_timeout(credential, DEFAULT_TIMEOUT)
    }

    /// Create a client whose token and listing calls use `timeout`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn with_timeout(credential: ServiceCredential, timeout: Duration) -> Result<Self> {
        // Probes override this per request.
        let http = build_client(timeout)?;
        Ok(Self {
            credential,
            http,
            timeout,
            probe_request: ProbeRequest::default(),
        })
    }

    /// Replace the probe payload.
    #[must_use]
    pub fn with_probe_request(mut self, request: ProbeRequest) -> Self {
        self.probe_request = request;
        self
    }

    #[must_use]
    pub const fn credential(&self) -> &ServiceCredential {
        &self.credential
    }

    /// Inference URL for a deployment.
    #[must_use]
    pub fn deployment_url(&self, deployment_id: &str) -> String {
        self.credential.deployment_url(deployment_id)
    }

    /// Exchange the service key for a fresh token.
    ///
    /// # Errors
    ///
    /// See [`crate::core::token::acquire_token`].
    pub async fn authenticate(&self) -> Result<AccessToken> {
        acquire_token(&self.http, &self.credential, self.timeout).await
    }

    fn authorized(
        &self,
        request: RequestBuilder,
        token: &AccessToken,
        resource_group: &str,
    ) -> RequestBuilder {
        request
            .header(AUTHORIZATION, format!("Bearer {}", token.secret()))
            .header(RESOURCE_GROUP_HEADER, resource_group)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &AccessToken,
        resource_group: &str,
        path: &str,
        resource: &str,
    ) -> Result<T> {
        let url = join_url(self.credential.api_url(), path);
        let start = Instant::now();
        let response = self
            .authorized(self.http.get(&url), token, resource_group)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| map_send_error(&e, self.timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| map_send_error(&e, self.timeout))?;
        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        if !status.is_success() {
            tracing::warn!(
                resource,
                resource_group,
                status = status.as_u16(),
                duration_ms,
                "Listing failed"
            );
            return Err(AidrError::ResourceList {
                resource: resource.to_string(),
                status: status.as_u16(),
                body: snippet(&body),
            });
        }

        tracing::debug!(resource, resource_group, status = status.as_u16(), duration_ms, "Fetched");
        serde_json::from_str(&body)
            .map_err(|e| AidrError::ParseResponse(format!("{resource}: {e}")))
    }

    /// `GET /v2/lm/configurations`.
    ///
    /// # Errors
    ///
    /// `ResourceList` on non-2xx, `Timeout`/`Network` on transport failure,
    /// `ParseResponse` if the body is not a listing.
    pub async fn list_configurations(
        &self,
        token: &AccessToken,
        resource_group: &str,
    ) -> Result<Vec<Configuration>> {
        let list: ListResponse<Configuration> = self
            .get_json(token, resource_group, "v2/lm/configurations", "configurations")
            .await?;
        tracing::info!(resource_group, count = list.resources.len(), "Listed configurations");
        Ok(list.resources)
    }

    /// `GET /v2/lm/deployments`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::list_configurations`].
    pub async fn list_deployments(
        &self,
        token: &AccessToken,
        resource_group: &str,
    ) -> Result<Vec<Deployment>> {
        let list: ListResponse<Deployment> = self
            .get_json(token, resource_group, "v2/lm/deployments", "deployments")
            .await?;
        tracing::info!(resource_group, count = list.resources.len(), "Listed deployments");
        Ok(list.resources)
    }

    /// `GET /v2/lm/deployments/{id}`.
    ///
    /// # Errors
    ///
    /// `ResourceList` with resource `deployment {id}` on non-2xx.
    pub async fn deployment_details(
        &self,
        token: &AccessToken,
        resource_group: &str,
        deployment_id: &str,
    ) -> Result<DeploymentDetails> {
        self.get_json(
            token,
            resource_group,
            &format!("v2/lm/deployments/{deployment_id}"),
            &format!("deployment {deployment_id}"),
        )
        .await
    }

    /// Send a minimal inference request to a deployment.
    ///
    /// Never fails: transport and HTTP errors are recorded in the result.
    pub async fn probe(
        &self,
        token: &AccessToken,
        resource_group: &str,
        deployment_id: &str,
        timeout: Duration,
    ) -> ProbeResult {
        let url = self.deployment_url(deployment_id);
        tracing::debug!(deployment_id, resource_group, url = %url, "Probing deployment");
        let request = self
            .authorized(self.http.post(&url), token, resource_group)
            .header(CONTENT_TYPE, "application/json")
            .json(&self.probe_request.to_body());
        probe::execute(request, deployment_id, timeout).await
    }

    /// Probe a deployment and resolve which model it serves.
    ///
    /// Details are fetched only when the probe response does not name the
    /// model. A details failure is logged and treated as "no details".
    pub async fn identify(
        &self,
        token: &AccessToken,
        resource_group: &str,
        deployment_id: &str,
        configuration_name: Option<&str>,
        timeout: Duration,
    ) -> (ProbeResult, Option<ModelIdentity>) {
        let result = self.probe(token, resource_group, deployment_id, timeout).await;

        let from_header = identity::resolve(&IdentityEvidence {
            model_header: result.model_hint.as_deref(),
            ..IdentityEvidence::default()
        });
        if from_header.is_some() {
            return (result, from_header);
        }

        let details = self
            .details_or_none(token, resource_group, deployment_id)
            .await;
        let resolved = identity::resolve(&IdentityEvidence {
            model_header: result.model_hint.as_deref(),
            details: details.as_ref(),
            configuration_name,
        });
        (result, resolved)
    }

    /// Details, or `None` with a warning when the call fails.
    pub async fn details_or_none(
        &self,
        token: &AccessToken,
        resource_group: &str,
        deployment_id: &str,
    ) -> Option<DeploymentDetails> {
        match self
            .deployment_details(token, resource_group, deployment_id)
            .await
        {
            Ok(details) => Some(details),
            Err(e) => {
                tracing::warn!(deployment_id, error = %e, "Deployment details unavailable");
                None
            }
        }
    }
}
