//! End-to-end check of the downstream proxy.
//!
//! Builds a review prompt from recent git history, sends it through the
//! proxy (`/v1/messages`, optionally `/v1/chat/completions`, optionally the
//! `claude` CLI), and advances the last-sync marker only when every
//! requested check passed.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::{Value, json};

use crate::core::cli_runner::{CLI_TIMEOUT, CliCommand, locate};
use crate::core::http::{INFERENCE_TIMEOUT, build_client, join_url};
use crate::core::probe::extract_text;
use crate::error::{AidrError, Result};
use crate::storage::marker::SyncMarker;
use crate::storage::routing_config::RoutingConfig;

/// Env var holding the proxy key; also passed to the `claude` CLI.
pub const AUTH_TOKEN_ENV: &str = "ANTHROPIC_AUTH_TOKEN";

/// `anthropic-version` header sent to `/v1/messages`.
pub const MESSAGES_API_VERSION: &str = "2023-06-01";

/// Default timeout for the CLI check.
pub const CLI_CHECK_TIMEOUT: Duration = Duration::from_secs(180);

/// Commits included in the review prompt.
pub const COMMIT_LIMIT: usize = 10;

/// Longest error body kept from a failed proxy response.
const ERROR_BODY_CHARS: usize = 200;

// =============================================================================
// Token
// =============================================================================

/// Proxy key: `ANTHROPIC_AUTH_TOKEN`, then the routing config's first
/// `secret_authentication_tokens` entry.
///
/// # Errors
///
/// `Config` when neither is set.
pub fn resolve_proxy_token(
    env: &dyn Fn(&str) -> Option<String>,
    routing: Option<&RoutingConfig>,
) -> Result<String> {
    if let Some(token) = env(AUTH_TOKEN_ENV)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
    {
        return Ok(token);
    }
    routing
        .and_then(RoutingConfig::proxy_token)
        .map(ToString::to_string)
        .ok_or_else(|| {
            AidrError::Config(format!(
                "no proxy key: set {AUTH_TOKEN_ENV} or secret_authentication_tokens in the routing config"
            ))
        })
}

// =============================================================================
// Git
// =============================================================================

/// Read-only view of the repository under review.
#[derive(Debug, Clone, Default)]
pub struct GitRepo {
    dir: Option<PathBuf>,
}

impl GitRepo {
    #[must_use]
    pub const fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        self.dir.as_deref().unwrap_or_else(|| Path::new("."))
    }

    fn git<I, S>(&self, args: I) -> CliCommand
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CliCommand::new("git")
            .args(args)
            .current_dir(self.dir.as_deref())
            .timeout(CLI_TIMEOUT)
    }

    /// `git fetch origin`; failure is only a warning.
    pub async fn fetch(&self) -> bool {
        match self.git(["fetch", "origin"]).stdout().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "git fetch failed");
                false
            }
        }
    }

    /// Resolve a revision to a commit hash.
    pub async fn rev_parse(&self, rev: &str) -> Option<String> {
        self.quiet(self.git(["rev-parse", rev])).await
    }

    /// `git log --oneline`, limited to commits after `since` when given.
    pub async fn recent_commits(&self, since: Option<&str>) -> String {
        let mut args = vec!["log".to_string()];
        if let Some(since) = since {
            args.push(format!("{since}..HEAD"));
        }
        args.extend(["--oneline".to_string(), format!("-{COMMIT_LIMIT}")]);
        self.quiet(self.git(args)).await.unwrap_or_default()
    }

    /// Files changed since `since`, or over the last five commits.
    pub async fn changed_files(&self, since: Option<&str>) -> String {
        let base = since.unwrap_or("HEAD~5");
        self.quiet(self.git(["diff", "--name-only", base, "HEAD"]))
            .await
            .unwrap_or_default()
    }

    /// Prompt asking for a review of changes since `since`.
    pub async fn review_prompt(&self, since: Option<&str>) -> String {
        let commits = self.recent_commits(since).await;
        let files = self.changed_files(since).await;
        review_prompt(&commits, &files)
    }

    async fn quiet(&self, command: CliCommand) -> Option<String> {
        match command.stdout().await {
            Ok(out) if !out.is_empty() => Some(out),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(dir = %self.dir().display(), error = %e, "git command failed");
                None
            }
        }
    }
}

/// Review prompt for the given `git log` and `git diff --name-only` output.
#[must_use]
pub fn review_prompt(commits: &str, files: &str) -> String {
    let commits = if commits.trim().is_empty() {
        "No recent commits found"
    } else {
        commits.trim()
    };
    let files = if files.trim().is_empty() {
        "No file changes detected"
    } else {
        files.trim()
    };
    format!(
        "You are reviewing recent changes to the sap-ai-core-llm-proxy repository.\n\
         \n\
         ## Recent Commits\n\
         ```\n\
         {commits}\n\
         ```\n\
         \n\
         ## Changed Files\n\
         ```\n\
         {files}\n\
         ```\n\
         \n\
         Please provide:\n\
         1. A brief summary of the changes (2-3 sentences)\n\
         2. Key modifications by category (bug fixes, features, documentation)\n\
         3. Any potential concerns or areas that need attention\n\
         \n\
         Keep your response concise but informative."
    )
}

// =============================================================================
// Checks
// =============================================================================

/// Which proxy surface a check exercised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// Anthropic-style `/v1/messages`.
    Messages,
    /// OpenAI-style `/v1/chat/completions`.
    ChatCompletions,
    /// `claude --print` pointed at the proxy.
    Cli,
}

impl CheckKind {
    /// Short label used in summaries and saved file names.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Messages => "http",
            Self::ChatCompletions => "chat",
            Self::Cli => "cli",
        }
    }
}

/// Outcome of one check.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub kind: CheckKind,
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub elapsed_ms: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_to: Option<PathBuf>,
}

impl CheckResult {
    fn passed(kind: CheckKind, response: String, start: Instant) -> Self {
        Self {
            kind,
            success: true,
            status_code: None,
            response: Some(response),
            error: None,
            elapsed_ms: elapsed_ms(start),
            saved_to: None,
        }
    }

    fn failed(kind: CheckKind, error: impl Into<String>, start: Instant) -> Self {
        Self {
            kind,
            success: false,
            status_code: None,
            response: None,
            error: Some(error.into()),
            elapsed_ms: elapsed_ms(start),
            saved_to: None,
        }
    }

    fn with_status(mut self, status: u16) -> Self {
        self.status_code = Some(status);
        self
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Connection settings for the proxy.
#[derive(Debug, Clone)]
pub struct ProxyTarget {
    pub base_url: String,
    pub token: String,
    /// Model for `/v1/messages` and the CLI.
    pub model: String,
    /// Model for `/v1/chat/completions`.
    pub chat_model: String,
    pub max_tokens: u32,
    pub http_timeout: Duration,
    pub cli_timeout: Duration,
    /// CLI binary, normally `claude`.
    pub cli_program: String,
}

impl ProxyTarget {
    #[must_use]
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            model: "anthropic--claude-4-sonnet".to_string(),
            chat_model: "claude-4.5-opus".to_string(),
            max_tokens: 2000,
            http_timeout: INFERENCE_TIMEOUT,
            cli_timeout: CLI_CHECK_TIMEOUT,
            cli_program: "claude".to_string(),
        }
    }
}

/// Runs individual checks against one proxy.
#[derive(Debug, Clone)]
pub struct ProxyChecker {
    target: ProxyTarget,
    http: Client,
}

impl ProxyChecker {
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(target: ProxyTarget) -> Result<Self> {
        let http = build_client(target.http_timeout)?;
        Ok(Self { target, http })
    }

    #[must_use]
    pub const fn target(&self) -> &ProxyTarget {
        &self.target
    }

    fn describe_send_error(&self, e: &reqwest::Error) -> String {
        if e.is_timeout() {
            format!(
                "Request timed out after {}s",
                self.target.http_timeout.as_secs()
            )
        } else if e.is_connect() {
            "Connection refused - is the proxy running?".to_string()
        } else {
            e.to_string()
        }
    }

    async fn post(
        &self,
        kind: CheckKind,
        request: reqwest::RequestBuilder,
        start: Instant,
    ) -> std::result::Result<Value, CheckResult> {
        let response: Response = request
            .timeout(self.target.http_timeout)
            .send()
            .await
            .map_err(|e| CheckResult::failed(kind, self.describe_send_error(&e), start))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CheckResult::failed(kind, self.describe_send_error(&e), start))?;

        if !status.is_success() {
            let cut: String = body.chars().take(ERROR_BODY_CHARS).collect();
            return Err(
                CheckResult::failed(kind, format!("HTTP {}: {cut}", status.as_u16()), start)
                    .with_status(status.as_u16()),
            );
        }

        serde_json::from_str(&body).map_err(|e| {
            CheckResult::failed(kind, format!("invalid JSON response: {e}"), start)
                .with_status(status.as_u16())
        })
    }

    /// `POST /v1/messages`; passes when the reply has text content.
    pub async fn messages(&self, prompt: &str) -> CheckResult {
        let kind = CheckKind::Messages;
        let start = Instant::now();
        let url = join_url(&self.target.base_url, "v1/messages");
        tracing::info!(url = %url, model = %self.target.model, "Checking messages endpoint");

        let request = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header("x-api-key", &self.target.token)
            .header("anthropic-version", MESSAGES_API_VERSION)
            .json(&json!({
                "model": self.target.model,
                "max_tokens": self.target.max_tokens,
                "messages": [{"role": "user", "content": prompt}],
            }));

        match self.post(kind, request, start).await {
            Ok(body) => match extract_text(&body).filter(|t| !t.is_empty()) {
                Some(text) => CheckResult::passed(kind, text, start).with_status(200),
                None => CheckResult::failed(kind, "Empty response content", start).with_status(200),
            },
            Err(failed) => failed,
        }
    }

    /// `POST /v1/chat/completions`; passes when `choices[0].message.content` is non-empty.
    pub async fn chat_completions(&self, prompt: &str) -> CheckResult {
        let kind = CheckKind::ChatCompletions;
        let start = Instant::now();
        let url = join_url(&self.target.base_url, "v1/chat/completions");
        tracing::info!(url = %url, model = %self.target.chat_model, "Checking chat completions endpoint");

        let request = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", self.target.token))
            .json(&json!({
                "model": self.target.chat_model,
                "max_tokens": self.target.max_tokens,
                "messages": [{"role": "user", "content": prompt}],
            }));

        match self.post(kind, request, start).await {
            Ok(body) => match body
                .pointer("/choices/0/message/content")
                .and_then(Value::as_str)
                .filter(|t| !t.trim().is_empty())
            {
                Some(text) => CheckResult::passed(kind, text.to_string(), start).with_status(200),
                None => CheckResult::failed(kind, "Empty response content", start).with_status(200),
            },
            Err(failed) => failed,
        }
    }

    /// `claude --print <prompt>` with the proxy as its base URL.
    pub async fn cli(&self, prompt: &str) -> CheckResult {
        let kind = CheckKind::Cli;
        let start = Instant::now();
        let program = &self.target.cli_program;

        let resolved = match locate(program) {
            Ok(path) => path,
            Err(_) => {
                return CheckResult::failed(kind, format!("{program} CLI not found in PATH"), start);
            }
        };
        tracing::info!(program = %resolved.display(), "Checking CLI through proxy");

        let command = CliCommand::new(resolved.to_string_lossy())
            .args(["--print", prompt])
            .env("ANTHROPIC_BASE_URL", &self.target.base_url)
            .env(AUTH_TOKEN_ENV, &self.target.token)
            .env("ANTHROPIC_MODEL", &self.target.model)
            .timeout(self.target.cli_timeout);

        match command.run().await {
            Ok(output) if output.success() && !output.stdout.trim().is_empty() => {
                CheckResult::passed(kind, output.stdout.trim().to_string(), start)
            }
            Ok(output) => {
                let stderr = output.stderr.trim();
                let error = if stderr.is_empty() {
                    "No output received"
                } else {
                    stderr
                };
                CheckResult::failed(kind, error, start)
            }
            Err(AidrError::Timeout(seconds)) => {
                CheckResult::failed(kind, format!("{program} CLI timed out after {seconds}s"), start)
            }
            Err(e) => CheckResult::failed(kind, e.to_string(), start),
        }
    }
}

// =============================================================================
// Saved output
// =============================================================================

/// File name for a saved response.
#[must_use]
pub fn output_file_name(kind: CheckKind, at: DateTime<Local>) -> String {
    format!(
        "integration_test_{}_{}.md",
        kind.label(),
        at.format("%Y%m%d_%H%M%S")
    )
}

/// Write a response as Markdown under `dir`.
///
/// # Errors
///
/// Returns error if the directory or file cannot be written.
pub fn save_output(
    dir: &Path,
    kind: CheckKind,
    content: &str,
    at: DateTime<Local>,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(output_file_name(kind, at));
    let document = format!(
        "# Integration Test Output ({})\n\n**Timestamp:** {}\n\n## Response\n\n{content}",
        kind.label().to_uppercase(),
        at.format("%Y-%m-%dT%H:%M:%S%.6f"),
    );
    fs::write(&path, document)?;
    tracing::debug!(path = %path.display(), "Saved check output");
    Ok(path)
}

// =============================================================================
// Driver
// =============================================================================

/// What to run.
#[derive(Debug, Clone)]
pub struct ProxyCheckPlan {
    pub messages: bool,
    pub chat: bool,
    pub cli: bool,
    pub fetch: bool,
    pub update_marker: bool,
    /// Save passing responses here.
    pub save_dir: Option<PathBuf>,
    /// Use this instead of the git review prompt.
    pub prompt: Option<String>,
}

impl Default for ProxyCheckPlan {
    fn default() -> Self {
        Self {
            messages: true,
            chat: false,
            cli: true,
            fetch: true,
            update_marker: true,
            save_dir: None,
            prompt: None,
        }
    }
}

/// Git position at the start of the run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub last_sync: Option<String>,
    pub current: Option<String>,
    pub origin: Option<String>,
}

/// Everything a proxy check produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyCheckReport {
    pub sync: SyncStatus,
    pub checks: Vec<CheckResult>,
    /// New marker value, when it was advanced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker_updated: Option<String>,
}

impl ProxyCheckReport {
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.checks.iter().filter(|c| !c.success).count()
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }

    /// `Err(ProxyCheckFailed)` when any check failed.
    ///
    /// # Errors
    ///
    /// See above.
    pub fn into_result(self) -> Result<Self> {
        match self.failed_count() {
            0 => Ok(self),
            failed => Err(AidrError::ProxyCheckFailed { failed }),
        }
    }
}

/// Run the planned checks in order: messages, chat, CLI.
///
/// # Errors
///
/// Only I/O errors reading or writing the marker; check failures are
/// reported in the result.
pub async fn run(
    checker: &ProxyChecker,
    repo: &GitRepo,
    marker: &SyncMarker,
    plan: &ProxyCheckPlan,
) -> Result<ProxyCheckReport> {
    if plan.fetch {
        repo.fetch().await;
    }

    let sync = SyncStatus {
        last_sync: marker.read()?,
        current: repo.rev_parse("HEAD").await,
        origin: repo.rev_parse("origin/main").await,
    };
    tracing::info!(
        last_sync = sync.last_sync.as_deref().unwrap_or("never"),
        current = sync.current.as_deref().unwrap_or("unknown"),
        "Sync status"
    );

    let prompt = match &plan.prompt {
        Some(prompt) => prompt.clone(),
        None => repo.review_prompt(sync.last_sync.as_deref()).await,
    };

    let mut checks = Vec::new();
    if plan.messages {
        checks.push(checker.messages(&prompt).await);
    }
    if plan.chat {
        checks.push(checker.chat_completions(&prompt).await);
    }
    if plan.cli {
        checks.push(checker.cli(&prompt).await);
    }

    if let Some(dir) = &plan.save_dir {
        let now = Local::now();
        for check in &mut checks {
            if let Some(response) = check.response.as_deref() {
                check.saved_to = Some(save_output(dir, check.kind, response, now)?);
            }
        }
    }

    let mut report = ProxyCheckReport {
        sync,
        checks,
        marker_updated: None,
    };

    if plan.update_marker
        && !report.checks.is_empty()
        && report.all_passed()
        && let Some(current) = report.sync.current.clone()
    {
        marker.write(&current)?;
        report.marker_updated = Some(current);
    }

    Ok(report)
}
