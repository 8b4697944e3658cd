//! Multi-subaccount sweeps against a mock control plane.
//!
//! Each workspace writes a routing config whose service keys point at one
//! wiremock server; subaccounts differ only by resource group.

mod common;

use std::time::Duration;

use wiremock::ResponseTemplate;

use aidr::core::correlate::NamePredicate;
use aidr::core::identity::IdentitySource;
use aidr::core::routing::{ActionNeeded, FindSummary, RoutingState};
use aidr::core::sweep::{
    DeploymentSweep, IdentifyMode, SubaccountOutcome, SweepOptions, find_deployments,
    probe_deployments, single_subaccount, sweep_configurations, sweep_deployments,
};
use aidr::error::AidrError;
use aidr::test_utils::{
    make_test_configuration, make_test_deployment, make_test_deployment_details,
};

use common::fixtures::{MockAiCore, Workspace, all};
use common::logger::TestLogger;

fn options() -> SweepOptions {
    SweepOptions {
        timeout: Duration::from_secs(5),
        probe_timeout: Duration::from_secs(5),
        ..SweepOptions::default()
    }
}

// =============================================================================
// Configurations
// =============================================================================

#[tokio::test]
async fn broken_service_key_skips_only_that_subaccount() {
    let (log, capture) = TestLogger::with_capture("broken_service_key_skips_only_that_subaccount");
    log.phase("setup");
    let mock = MockAiCore::start().await;
    mock.mount_token().await;
    mock.mount_configurations(
        "default",
        &[
            make_test_configuration("c1", "claude-4.5-opus-v1"),
            make_test_configuration("c2", "gpt-4o"),
        ],
    )
    .await;
    let workspace = Workspace::new(&mock, &[("broken", "team-x"), ("main", "default")]);
    workspace.break_service_key("broken", &mock);
    let routing = workspace.routing_config();

    log.phase("execute");
    let report = sweep_configurations(&all(&routing), &options(), &NamePredicate::opus())
        .await
        .expect("sweep completes");

    log.phase("verify");
    assert_eq!(report.skipped_count(), 1);
    assert_eq!(report.failed_count(), 0);
    assert_eq!(report.subaccounts[0].subaccount, "broken");
    assert!(matches!(
        report.subaccounts[0].outcome,
        SubaccountOutcome::Skipped(_)
    ));

    let resolved: Vec<_> = report.resolved().collect();
    assert_eq!(resolved.len(), 1);
    let (sub, configs) = resolved[0];
    assert_eq!(sub.subaccount, "main");
    assert_eq!(configs.total, 2);
    assert_eq!(configs.matching[0].name, "claude-4.5-opus-v1");
    assert_eq!(configs.other[0].name, "gpt-4o");

    capture.assert_logged("Skipping subaccount");
    capture.assert_field_logged("subaccount", "broken");
    log.finish_ok();
}

#[tokio::test]
async fn configurations_sweep_aborts_on_auth_failure() {
    let mock = MockAiCore::start().await;
    mock.mount_token_failure(401, "bad client").await;
    let workspace = Workspace::new(&mock, &[("main", "default")]);
    let routing = workspace.routing_config();

    let err = sweep_configurations(&all(&routing), &options(), &NamePredicate::opus())
        .await
        .unwrap_err();
    assert!(matches!(err, AidrError::AuthFailed { status: Some(401), .. }), "got {err:?}");
}

#[tokio::test]
async fn sweep_never_logs_client_secret() {
    let (log, capture) = TestLogger::with_capture("sweep_never_logs_client_secret");
    let mock = MockAiCore::start().await;
    mock.mount_token().await;
    mock.mount_configurations("default", &[make_test_configuration("c1", "claude-4.5-opus")])
        .await;
    let workspace = Workspace::new(&mock, &[("main", "default")]);
    let routing = workspace.routing_config();

    sweep_configurations(&all(&routing), &options(), &NamePredicate::opus())
        .await
        .expect("sweep completes");

    capture.assert_never_logged("test-secret");
    capture.assert_never_logged("sb-test-client");
    log.finish_ok();
}

// =============================================================================
// Deployments
// =============================================================================

#[tokio::test]
async fn deployments_sweep_records_failure_and_continues() {
    let log = TestLogger::new("deployments_sweep_records_failure_and_continues");
    log.phase("setup");
    let mock = MockAiCore::start().await;
    mock.mount_token().await;
    mock.mount_deployments(
        "default",
        &[
            make_test_deployment("d1", "c1", "RUNNING"),
            make_test_deployment("d2", "c2", "STOPPED"),
        ],
    )
    .await;
    mock.mount_details(
        "d1",
        make_test_deployment_details("d1", "claude-4.5-opus-v1", "anthropic--claude-4.5-opus"),
    )
    .await;
    // Mounted last so the resource-group specific listing wins for "default".
    mock.mount_listing_failure("deployments", 503, "unavailable").await;
    let workspace = Workspace::new(&mock, &[("eu", "team-eu"), ("main", "default")]);
    let routing = workspace.routing_config();

    log.phase("execute");
    let report = sweep_deployments(
        &all(&routing),
        &options(),
        DeploymentSweep::default(),
        &NamePredicate::anthropic_family(),
    )
    .await
    .expect("sweep completes");

    log.phase("verify");
    assert_eq!(report.failed_count(), 1);
    let failure = report.subaccounts[0].error().expect("eu failed");
    assert_eq!(failure.scope, "eu");
    assert_eq!(failure.error_code, "AIDR-P001");

    let (_, main) = report.resolved().next().expect("main resolved");
    assert_eq!(main.total, 1, "stopped deployment is not resolved");
    let d1 = &main.family[0];
    assert_eq!(d1.deployment_id, "d1");
    assert_eq!(d1.model.as_deref(), Some("anthropic--claude-4.5-opus"));
    assert_eq!(d1.model_source, Some(IdentitySource::BackendModel));
    assert_eq!(d1.deployment_url, mock.deployment_url("d1"));
    assert!(d1.probe.is_none());
    log.finish_ok();
}

#[tokio::test]
async fn deployments_sweep_can_include_stopped_and_probe() {
    let mock = MockAiCore::start().await;
    mock.mount_token().await;
    mock.mount_deployments(
        "default",
        &[
            make_test_deployment("d1", "c1", "RUNNING"),
            make_test_deployment("d2", "c2", "STOPPED"),
        ],
    )
    .await;
    mock.mount_probe_ok("d1", Some("anthropic--claude-4-sonnet")).await;
    mock.mount_probe("d2", ResponseTemplate::new(404).set_body_string("not running"))
        .await;
    let workspace = Workspace::new(&mock, &[("main", "default")]);
    let routing = workspace.routing_config();

    let sweep = DeploymentSweep {
        include_stopped: true,
        identify: IdentifyMode::Probe,
    };
    let report = sweep_deployments(
        &all(&routing),
        &options(),
        sweep,
        &NamePredicate::anthropic_family(),
    )
    .await
    .expect("sweep completes");

    let (_, main) = report.resolved().next().expect("main resolved");
    assert_eq!(main.total, 2);
    assert_eq!(main.family[0].model_source, Some(IdentitySource::ModelHeader));
    assert_eq!(main.unidentified[0].deployment_id, "d2");
    assert_eq!(main.failed_probes(), 1);
}

// =============================================================================
// Find
// =============================================================================

#[tokio::test]
async fn find_builds_routing_suggestion_from_first_running_match() {
    let log = TestLogger::new("find_builds_routing_suggestion_from_first_running_match");
    log.phase("setup");
    let mock = MockAiCore::start().await;
    mock.mount_token().await;
    mock.mount_configurations(
        "default",
        &[
            make_test_configuration("c1", "claude-4.5-opus-v1"),
            make_test_configuration("c2", "gpt-4o"),
        ],
    )
    .await;
    mock.mount_deployments(
        "default",
        &[
            make_test_deployment("d0", "c1", "STOPPED"),
            make_test_deployment("d1", "c1", "RUNNING"),
            make_test_deployment("d2", "c2", "RUNNING"),
        ],
    )
    .await;
    let workspace = Workspace::new(&mock, &[("main", "default")]);
    let routing = workspace.routing_config();

    log.phase("execute");
    let report = find_deployments(&all(&routing), &options(), &NamePredicate::opus(), false)
        .await
        .expect("find completes");
    let summary = FindSummary::new(
        "claude-4.5-opus",
        vec!["claude-4.5-opus".to_string()],
        report,
        &routing.sub_accounts,
    );

    log.phase("verify");
    let (_, found) = summary.report.resolved().next().expect("main resolved");
    assert_eq!(found.matches.len(), 2);
    assert_eq!(found.chosen.as_ref().map(|c| c.deployment_id.as_str()), Some("d1"));

    let suggestion = summary.suggestion.as_ref().expect("suggestion");
    assert_eq!(suggestion.subaccount, "main");
    assert_eq!(suggestion.snippet.url, mock.deployment_url("d1"));
    assert_eq!(
        suggestion.snippet.keys,
        ["claude-4.5-opus", "anthropic--claude-4.5-opus"]
    );
    assert_eq!(suggestion.routing, RoutingState::Missing);
    assert!(summary.action_needed.is_none());
    log.finish_ok();
}

#[tokio::test]
async fn find_flags_only_inactive_matches() {
    let mock = MockAiCore::start().await;
    mock.mount_token().await;
    mock.mount_configurations("default", &[make_test_configuration("c1", "claude-4.5-opus")])
        .await;
    mock.mount_deployments("default", &[make_test_deployment("d1", "c1", "PENDING")])
        .await;
    let workspace = Workspace::new(&mock, &[("main", "default")]);
    let routing = workspace.routing_config();

    let report = find_deployments(&all(&routing), &options(), &NamePredicate::opus(), false)
        .await
        .expect("find completes");
    let summary = FindSummary::new("claude-4.5-opus", Vec::new(), report, &routing.sub_accounts);

    assert!(summary.suggestion.is_none());
    assert_eq!(summary.action_needed, Some(ActionNeeded::OnlyInactive));
}

#[tokio::test]
async fn find_flags_failed_probe_of_chosen_deployment() {
    let mock = MockAiCore::start().await;
    mock.mount_token().await;
    mock.mount_configurations("default", &[make_test_configuration("c1", "claude-4.5-opus")])
        .await;
    mock.mount_deployments("default", &[make_test_deployment("d1", "c1", "RUNNING")])
        .await;
    mock.mount_probe("d1", ResponseTemplate::new(502)).await;
    let workspace = Workspace::new(&mock, &[("main", "default")]);
    let routing = workspace.routing_config();

    let report = find_deployments(&all(&routing), &options(), &NamePredicate::opus(), true)
        .await
        .expect("find completes");
    let summary = FindSummary::new("claude-4.5-opus", Vec::new(), report, &routing.sub_accounts);

    assert!(summary.suggestion.is_some());
    assert_eq!(summary.action_needed, Some(ActionNeeded::ProbeFailed));
}

#[tokio::test]
async fn find_aborts_on_listing_error() {
    let mock = MockAiCore::start().await;
    mock.mount_token().await;
    mock.mount_listing_failure("configurations", 403, "forbidden").await;
    let workspace = Workspace::new(&mock, &[("main", "default")]);
    let routing = workspace.routing_config();

    let err = find_deployments(&all(&routing), &options(), &NamePredicate::opus(), false)
        .await
        .unwrap_err();
    assert!(matches!(err, AidrError::ResourceList { status: 403, .. }), "got {err:?}");
}

// =============================================================================
// Probe
// =============================================================================

#[tokio::test]
async fn probe_keeps_request_order_and_separates_timeouts() {
    let log = TestLogger::new("probe_keeps_request_order_and_separates_timeouts");
    log.phase("setup");
    let mock = MockAiCore::start().await;
    mock.mount_token().await;
    mock.mount_probe_ok("fast", None).await;
    mock.mount_probe(
        "slow",
        ResponseTemplate::new(200).set_delay(Duration::from_secs(3)),
    )
    .await;
    mock.mount_probe("broken", ResponseTemplate::new(500)).await;
    let workspace = Workspace::new(&mock, &[("main", "default")]);
    let routing = workspace.routing_config();
    let subaccount = single_subaccount(&routing.sub_accounts, None).expect("one subaccount");

    log.phase("execute");
    let options = SweepOptions {
        probe_timeout: Duration::from_millis(300),
        ..options()
    };
    let ids = ["slow", "fast", "broken"].map(String::from);
    let report = probe_deployments(subaccount, &options, &ids, false)
        .await
        .expect("session opens");

    log.phase("verify");
    let order: Vec<_> = report
        .deployments
        .iter()
        .map(|d| d.probe.deployment_id.as_str())
        .collect();
    assert_eq!(order, ["slow", "fast", "broken"]);
    assert_eq!(report.failed_count(), 2);
    let timed_out: Vec<_> = report
        .timed_out()
        .map(|d| d.probe.deployment_id.as_str())
        .collect();
    assert_eq!(timed_out, ["slow"]);
    log.finish_ok();
}

#[tokio::test]
async fn token_override_skips_exchange() {
    let mock = MockAiCore::start().await;
    // No token endpoint mounted: an exchange attempt would fail with 404.
    mock.mount_configurations("default", &[make_test_configuration("c1", "claude-4.5-opus")])
        .await;
    let workspace = Workspace::new(&mock, &[("main", "default")]);
    let routing = workspace.routing_config();

    let options = SweepOptions {
        token: Some(
            aidr::core::token::AccessToken::from_override(common::fixtures::MOCK_TOKEN)
                .expect("token"),
        ),
        ..options()
    };
    let report = sweep_configurations(&all(&routing), &options, &NamePredicate::opus())
        .await
        .expect("sweep completes");
    assert_eq!(report.resolved().count(), 1);
}
