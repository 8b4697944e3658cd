//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// AI Core Deployment Resolver - discover, correlate and probe model deployments.
#[derive(Parser, Debug)]
#[command(name = "aidr")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    // === Global flags ===
    /// Output format
    #[arg(long, value_enum, default_value = "human", global = true)]
    pub format: OutputFormat,

    /// Shorthand for --format json
    #[arg(long, global = true)]
    pub json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log level
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Emit JSONL logs to stderr
    #[arg(long, global = true)]
    pub json_output: bool,

    /// Verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Routing config (subAccounts, service keys, deployment_models)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Use this bearer token instead of acquiring one
    #[arg(
        long,
        value_name = "TOKEN",
        env = "AIDR_ACCESS_TOKEN",
        hide_env_values = true,
        global = true
    )]
    pub token: Option<String>,

    /// Timeout for token and listing requests in seconds
    #[arg(long, value_name = "SECONDS", global = true)]
    pub request_timeout: Option<u64>,
}

impl Cli {
    /// Resolve the effective output format.
    #[must_use]
    pub fn effective_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List configurations, split by model family
    Configs(ConfigsArgs),

    /// List deployments and the model each one serves (default command)
    Deployments(DeploymentsArgs),

    /// Find the deployment serving a model and print a routing snippet
    Find(FindArgs),

    /// Send a minimal inference request to deployments
    Probe(ProbeArgs),

    /// Smoke-test the downstream proxy
    ProxyCheck(ProxyCheckArgs),

    /// Diagnose aidr setup and AI Core reachability
    Doctor(DoctorArgs),

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Subaccount selection shared by the AI Core commands.
#[derive(Parser, Debug, Clone, Default)]
pub struct SubaccountArgs {
    /// Only this subaccount (default: all configured subaccounts)
    #[arg(long, short = 's', value_name = "NAME")]
    pub subaccount: Option<String>,
}

/// Arguments for the `configs` command.
#[derive(Parser, Debug, Clone, Default)]
pub struct ConfigsArgs {
    #[command(flatten)]
    pub target: SubaccountArgs,

    /// Name tokens to match (case-insensitive substring; repeatable)
    #[arg(long = "match", value_name = "TOKEN")]
    pub match_tokens: Vec<String>,

    /// Also list non-matching configurations
    #[arg(long)]
    pub all: bool,
}

/// Arguments for the `deployments` command.
#[derive(Parser, Debug, Clone)]
pub struct DeploymentsArgs {
    #[command(flatten)]
    pub target: SubaccountArgs,

    /// Name tokens that mark a model as interesting (repeatable)
    #[arg(long = "match", value_name = "TOKEN")]
    pub match_tokens: Vec<String>,

    /// Include deployments that are not RUNNING
    #[arg(long)]
    pub include_stopped: bool,

    /// Probe each running deployment
    #[arg(long)]
    pub probe: bool,

    /// Maximum number of other models shown in human output
    #[arg(long, default_value = "10", value_name = "N")]
    pub other_limit: usize,
}

impl Default for DeploymentsArgs {
    fn default() -> Self {
        Self {
            target: SubaccountArgs::default(),
            match_tokens: Vec::new(),
            include_stopped: false,
            probe: false,
            other_limit: 10,
        }
    }
}

/// Arguments for the `find` command.
#[derive(Parser, Debug, Clone, Default)]
pub struct FindArgs {
    #[command(flatten)]
    pub target: SubaccountArgs,

    /// Configuration name tokens (default: claude-4.5-opus, claude45_opus)
    #[arg(long = "match", value_name = "TOKEN")]
    pub match_tokens: Vec<String>,

    /// Routing key for the snippet (default: settings matching.model)
    #[arg(long, value_name = "NAME")]
    pub model: Option<String>,

    /// Probe the chosen deployment before suggesting it
    #[arg(long)]
    pub probe: bool,
}

/// Arguments for the `probe` command.
#[derive(Parser, Debug, Clone, Default)]
pub struct ProbeArgs {
    /// Deployment ids to probe
    #[arg(value_name = "DEPLOYMENT_ID", required = true)]
    pub deployment_ids: Vec<String>,

    #[command(flatten)]
    pub target: SubaccountArgs,

    /// Probe timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Resolve the served model (fetches details when the response does not say)
    #[arg(long)]
    pub identify: bool,
}

/// Arguments for the `proxy-check` command.
#[derive(Parser, Debug, Clone, Default)]
pub struct ProxyCheckArgs {
    /// Proxy base URL
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Model name sent to the proxy
    #[arg(long, value_name = "NAME")]
    pub model: Option<String>,

    /// Only test the HTTP endpoint (skip the CLI check)
    #[arg(long, conflicts_with = "cli_only")]
    pub http_only: bool,

    /// Only test the claude CLI (skip the HTTP check)
    #[arg(long)]
    pub cli_only: bool,

    /// Also test the OpenAI-compatible /v1/chat/completions endpoint
    #[arg(long)]
    pub chat: bool,

    /// Save responses as Markdown under the output directory
    #[arg(long)]
    pub save_output: bool,

    /// Directory for saved responses
    #[arg(long, value_name = "DIR", default_value = "logs/integration_tests")]
    pub output_dir: PathBuf,

    /// Use this prompt instead of the git review prompt
    #[arg(long, value_name = "TEXT")]
    pub prompt: Option<String>,

    /// Skip `git fetch origin`
    #[arg(long)]
    pub no_fetch: bool,

    /// Do not update the last-sync marker
    #[arg(long)]
    pub no_marker: bool,

    /// Git repository to review (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub repo: Option<PathBuf>,
}

/// Arguments for the `doctor` command.
#[derive(Parser, Debug, Clone)]
pub struct DoctorArgs {
    #[command(flatten)]
    pub target: SubaccountArgs,

    /// Skip network checks
    #[arg(long)]
    pub offline: bool,

    /// Timeout for each network check in seconds
    #[arg(long, default_value = "10")]
    pub timeout: u64,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    #[default]
    Human,
    /// JSON output
    Json,
    /// Markdown output
    Md,
}
