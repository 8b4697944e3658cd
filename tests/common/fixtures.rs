//! A mock AI Core control plane and on-disk workspaces for integration tests.
#![allow(dead_code)]

use std::path::PathBuf;

use serde_json::Value;
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use aidr::core::models::{Configuration, Deployment};
use aidr::storage::routing_config::{RoutingConfig, SubAccount};
use aidr::test_utils::{
    TestDir, make_test_listing, make_test_messages_response, make_test_service_key_without_secret,
    make_test_token_response,
};

/// Bearer token the mock token endpoint hands out.
pub const MOCK_TOKEN: &str = "mock-access-token";

// =============================================================================
// Mock control plane
// =============================================================================

/// One wiremock server acting as both the auth and the API base URL.
pub struct MockAiCore {
    pub server: MockServer,
}

impl MockAiCore {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Inference URL the client derives for `deployment_id`.
    pub fn deployment_url(&self, deployment_id: &str) -> String {
        format!("{}/v2/inference/deployments/{deployment_id}", self.uri())
    }

    /// Client-credentials exchange returning [`MOCK_TOKEN`].
    pub async fn mount_token(&self) {
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(query_param("grant_type", "client_credentials"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(make_test_token_response(MOCK_TOKEN)))
            .mount(&self.server)
            .await;
    }

    /// Token endpoint answering with `status`.
    pub async fn mount_token_failure(&self, status: u16, body: &str) {
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_configurations(&self, resource_group: &str, configurations: &[Configuration]) {
        self.mount_listing("/v2/lm/configurations", resource_group, make_test_listing(configurations))
            .await;
    }

    pub async fn mount_deployments(&self, resource_group: &str, deployments: &[Deployment]) {
        self.mount_listing("/v2/lm/deployments", resource_group, make_test_listing(deployments))
            .await;
    }

    /// Listing endpoint failing with `status`.
    pub async fn mount_listing_failure(&self, resource: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/v2/lm/{resource}")))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    async fn mount_listing(&self, route: &str, resource_group: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .and(header("AI-Resource-Group", resource_group))
            .and(header("authorization", format!("Bearer {MOCK_TOKEN}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_details(&self, deployment_id: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/v2/lm/deployments/{deployment_id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Inference endpoint answering with `response`.
    pub async fn mount_probe(&self, deployment_id: &str, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path(format!("/v2/inference/deployments/{deployment_id}")))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    /// Inference endpoint answering 200 with text and an optional model header.
    pub async fn mount_probe_ok(&self, deployment_id: &str, model_header: Option<&str>) {
        let mut response =
            ResponseTemplate::new(200).set_body_json(make_test_messages_response("ok"));
        if let Some(model) = model_header {
            response = response.insert_header("x-model-id", model);
        }
        self.mount_probe(deployment_id, response).await;
    }
}

// =============================================================================
// Workspace
// =============================================================================

/// A temp dir holding `config.json` plus one service key per subaccount.
pub struct Workspace {
    pub dir: TestDir,
    pub config_path: PathBuf,
}

impl Workspace {
    /// Subaccounts with working keys pointing at `mock`.
    pub fn new(mock: &MockAiCore, subaccounts: &[(&str, &str)]) -> Self {
        let dir = TestDir::new();
        let config_path = dir.write_routing_config(subaccounts);
        for (name, _) in subaccounts {
            dir.write_service_key(name, &mock.uri(), &mock.uri());
        }
        Self { dir, config_path }
    }

    /// Replace a subaccount's key with one missing `clientsecret`.
    pub fn break_service_key(&self, subaccount: &str, mock: &MockAiCore) {
        self.dir.create_file(
            &format!("{subaccount}-key.json"),
            &make_test_service_key_without_secret(&mock.uri(), &mock.uri()),
        );
    }

    pub fn routing_config(&self) -> RoutingConfig {
        RoutingConfig::load(&self.config_path).expect("routing config loads")
    }
}

/// References to every subaccount, for the sweep functions.
pub fn all(config: &RoutingConfig) -> Vec<&SubAccount> {
    config.sub_accounts.iter().collect()
}
