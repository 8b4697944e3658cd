//! `proxy-check` command implementation.

use std::time::Duration;

use crate::cli::CommandContext;
use crate::cli::args::ProxyCheckArgs;
use crate::core::proxy_check::{
    self, GitRepo, ProxyCheckPlan, ProxyChecker, ProxyTarget, resolve_proxy_token,
};
use crate::error::Result;
use crate::render;
use crate::storage::marker::SyncMarker;

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Execute the proxy-check command.
///
/// # Errors
///
/// Missing proxy key, marker I/O errors, or `ProxyCheckFailed` when any
/// check failed. The report is printed first.
pub async fn execute(args: &ProxyCheckArgs, ctx: &CommandContext) -> Result<()> {
    let proxy = &ctx.settings.file.proxy;

    // The routing config only supplies a fallback proxy key here.
    let routing = match ctx.routing_config() {
        Ok(routing) => Some(routing),
        Err(e) => {
            tracing::debug!(error = %e, "Routing config unavailable for proxy key lookup");
            None
        }
    };
    let token = resolve_proxy_token(&process_env, routing.as_ref())?;

    let mut target = ProxyTarget::new(
        args.url.clone().unwrap_or_else(|| ctx.settings.proxy_url.clone()),
        token,
    );
    target.model = args.model.clone().unwrap_or_else(|| proxy.model.clone());
    target.chat_model.clone_from(&proxy.chat_model);
    target.max_tokens = proxy.max_tokens;
    target.http_timeout = Duration::from_secs(proxy.timeout_seconds);
    target.cli_timeout = Duration::from_secs(proxy.cli_timeout_seconds);

    let plan = ProxyCheckPlan {
        messages: !args.cli_only,
        chat: args.chat && !args.cli_only,
        cli: !args.http_only,
        fetch: !args.no_fetch,
        update_marker: !args.no_marker,
        save_dir: args.save_output.then(|| args.output_dir.clone()),
        prompt: args.prompt.clone(),
    };

    let repo = GitRepo::new(args.repo.clone());
    let marker = SyncMarker::in_repo(repo.dir(), &proxy.marker_file);

    tracing::debug!(
        url = %target.base_url,
        model = %target.model,
        messages = plan.messages,
        chat = plan.chat,
        cli = plan.cli,
        marker = %marker.path().display(),
        "Starting proxy check"
    );

    let checker = ProxyChecker::new(target)?;
    let report = proxy_check::run(&checker, &repo, &marker, &plan).await?;

    let output = render::render_proxy_check(&report, ctx.format, ctx.pretty, ctx.no_color)?;
    ctx.emit(&output);

    report.into_result().map(|_| ())
}
