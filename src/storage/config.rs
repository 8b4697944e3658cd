//! Settings file loading and resolution.
//!
//! Loads settings from:
//! - Linux: `~/.config/aidr/config.toml`
//! - macOS: `~/Library/Application Support/dev.aidr.aidr/config.toml`
//! - Windows: `%APPDATA%/aidr/aidr/config/config.toml`
//!
//! ## Precedence
//!
//! Settings are resolved with the following precedence (highest first):
//! 1. CLI flags
//! 2. Environment variables
//! 3. Settings file
//! 4. Built-in defaults
//!
//! ## Environment Variables
//!
//! - `AIDR_FORMAT`: Output format (human, json, md)
//! - `AIDR_TIMEOUT`: Token/listing timeout in seconds
//! - `AIDR_PROBE_TIMEOUT`: Probe timeout in seconds
//! - `AIDR_ROUTING_CONFIG`: Path to the routing config JSON
//! - `AIDR_PROXY_URL`: Base URL of the downstream proxy
//! - `AIDR_NO_COLOR` or `NO_COLOR`: Disable colors (1, true, yes)
//! - `AIDR_PRETTY`: Pretty-print JSON output (1, true, yes)
//! - `AIDR_CONFIG`: Override settings file path

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::AppPaths;
use super::paths::DEFAULT_ROUTING_CONFIG;
use crate::cli::args::{Cli, OutputFormat};
use crate::core::correlate::{ANTHROPIC_FAMILY_TOKENS, OPUS_TOKENS};
use crate::core::probe::{DEFAULT_ANTHROPIC_VERSION, DEFAULT_MAX_TOKENS, DEFAULT_PROMPT, ProbeRequest};
use crate::error::{AidrError, Result};

// =============================================================================
// Environment Variable Names
// =============================================================================

/// Environment variable for output format.
pub const ENV_FORMAT: &str = "AIDR_FORMAT";
/// Environment variable for token/listing timeout in seconds.
pub const ENV_TIMEOUT: &str = "AIDR_TIMEOUT";
/// Environment variable for probe timeout in seconds.
pub const ENV_PROBE_TIMEOUT: &str = "AIDR_PROBE_TIMEOUT";
/// Environment variable for the routing config path.
pub const ENV_ROUTING_CONFIG: &str = "AIDR_ROUTING_CONFIG";
/// Environment variable for the proxy base URL.
pub const ENV_PROXY_URL: &str = "AIDR_PROXY_URL";
/// Environment variable to disable colors.
pub const ENV_NO_COLOR: &str = "AIDR_NO_COLOR";
/// Standard environment variable to disable colors.
pub const ENV_NO_COLOR_STD: &str = "NO_COLOR";
/// Environment variable for pretty JSON output.
pub const ENV_PRETTY: &str = "AIDR_PRETTY";
/// Environment variable to override settings file path.
pub const ENV_CONFIG: &str = "AIDR_CONFIG";

/// Upper bound for any configured timeout.
const MAX_TIMEOUT_SECS: u64 = 600;

// =============================================================================
// Resolved Settings
// =============================================================================

/// Settings after merging CLI, env vars, and the settings file.
#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    /// Output format.
    pub format: OutputFormat,
    /// Token and listing timeout.
    pub timeout: Duration,
    /// Default probe timeout.
    pub probe_timeout: Duration,
    /// Routing config path.
    pub routing_config: PathBuf,
    /// Proxy base URL.
    pub proxy_url: String,
    /// Whether to disable colored output.
    pub no_color: bool,
    /// Whether verbose logging is enabled.
    pub verbose: bool,
    /// Whether to pretty-print JSON output.
    pub pretty: bool,
    /// Everything else, straight from the file.
    pub file: Settings,
    /// Source of each setting for debugging.
    pub sources: ConfigSources,
}

/// Tracks the source of each configuration value.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    pub format: ConfigSource,
    pub timeout: ConfigSource,
    pub probe_timeout: ConfigSource,
    pub routing_config: ConfigSource,
    pub proxy_url: ConfigSource,
    pub no_color: ConfigSource,
    pub pretty: ConfigSource,
}

/// Where a configuration value came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Value from CLI flag.
    Cli,
    /// Value from environment variable.
    Env,
    /// Value from settings file.
    ConfigFile,
    /// Built-in default.
    #[default]
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI flag"),
            Self::Env => write!(f, "environment variable"),
            Self::ConfigFile => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

impl ResolvedSettings {
    /// Resolve settings from CLI args, the process environment, and the
    /// settings file.
    ///
    /// # Errors
    ///
    /// Returns error if the settings file is invalid or a value cannot be
    /// parsed.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let settings = Settings::load()?;
        Self::resolve_with(cli, settings, &process_env)
    }

    /// Resolve against an explicit settings value and environment.
    ///
    /// # Errors
    ///
    /// Returns error if a value cannot be parsed.
    pub fn resolve_with(cli: &Cli, file: Settings, env: EnvLookup<'_>) -> Result<Self> {
        file.validate()?;
        let mut sources = ConfigSources::default();

        let format = Self::resolve_format(cli, &file, env, &mut sources.format)?;
        let timeout = Self::resolve_secs(
            cli.request_timeout,
            ENV_TIMEOUT,
            file.general.timeout_seconds,
            env,
            &mut sources.timeout,
        )?;
        let probe_timeout = Self::resolve_secs(
            None,
            ENV_PROBE_TIMEOUT,
            file.probe.timeout_seconds,
            env,
            &mut sources.probe_timeout,
        )?;
        let routing_config = Self::resolve_routing_config(cli, &file, env, &mut sources.routing_config);
        let proxy_url = Self::resolve_proxy_url(&file, env, &mut sources.proxy_url);
        let no_color = Self::resolve_no_color(cli, &file, env, &mut sources.no_color);
        let pretty = Self::resolve_pretty(cli, &file, env, &mut sources.pretty);

        Ok(Self {
            format,
            timeout,
            probe_timeout,
            routing_config,
            proxy_url,
            no_color,
            verbose: cli.verbose,
            pretty,
            file,
            sources,
        })
    }

    /// Probe payload built from the `[probe]` section.
    #[must_use]
    pub fn probe_request(&self) -> ProbeRequest {
        ProbeRequest {
            anthropic_version: self.file.probe.anthropic_version.clone(),
            max_tokens: self.file.probe.max_tokens,
            prompt: self.file.probe.prompt.clone(),
        }
    }

    fn resolve_format(
        cli: &Cli,
        file: &Settings,
        env: EnvLookup<'_>,
        source: &mut ConfigSource,
    ) -> Result<OutputFormat> {
        // 1. CLI --json / explicit --format
        if cli.json || cli.format != OutputFormat::Human {
            *source = ConfigSource::Cli;
            return Ok(cli.effective_format());
        }

        // 2. Environment variable
        if let Some(value) = env(ENV_FORMAT) {
            *source = ConfigSource::Env;
            return parse_format(&value);
        }

        // 3. Settings file
        if let Some(ref value) = file.output.format {
            *source = ConfigSource::ConfigFile;
            return parse_format(value);
        }

        *source = ConfigSource::Default;
        Ok(OutputFormat::Human)
    }

    fn resolve_secs(
        cli_value: Option<u64>,
        env_key: &str,
        file_value: u64,
        env: EnvLookup<'_>,
        source: &mut ConfigSource,
    ) -> Result<Duration> {
        if let Some(secs) = cli_value {
            *source = ConfigSource::Cli;
            return checked_timeout(env_key, secs);
        }

        if let Some(value) = env(env_key) {
            let secs = value.trim().parse::<u64>().map_err(|_| AidrError::ConfigInvalid {
                key: env_key.to_string(),
                message: format!("'{value}' is not a number of seconds"),
            })?;
            *source = ConfigSource::Env;
            return checked_timeout(env_key, secs);
        }

        *source = ConfigSource::ConfigFile;
        Ok(Duration::from_secs(file_value))
    }

    fn resolve_routing_config(
        cli: &Cli,
        file: &Settings,
        env: EnvLookup<'_>,
        source: &mut ConfigSource,
    ) -> PathBuf {
        if let Some(ref path) = cli.config {
            *source = ConfigSource::Cli;
            return path.clone();
        }
        if let Some(value) = env(ENV_ROUTING_CONFIG).filter(|v| !v.trim().is_empty()) {
            *source = ConfigSource::Env;
            return PathBuf::from(value);
        }
        if let Some(ref path) = file.general.routing_config {
            *source = ConfigSource::ConfigFile;
            return path.clone();
        }
        *source = ConfigSource::Default;
        PathBuf::from(DEFAULT_ROUTING_CONFIG)
    }

    fn resolve_proxy_url(file: &Settings, env: EnvLookup<'_>, source: &mut ConfigSource) -> String {
        if let Some(value) = env(ENV_PROXY_URL).filter(|v| !v.trim().is_empty()) {
            *source = ConfigSource::Env;
            return value.trim().to_string();
        }
        *source = if file.proxy.url == ProxySettings::default().url {
            ConfigSource::Default
        } else {
            ConfigSource::ConfigFile
        };
        file.proxy.url.clone()
    }

    fn resolve_no_color(
        cli: &Cli,
        file: &Settings,
        env: EnvLookup<'_>,
        source: &mut ConfigSource,
    ) -> bool {
        if cli.no_color {
            *source = ConfigSource::Cli;
            return true;
        }

        // AIDR_NO_COLOR must be truthy; NO_COLOR counts when merely present
        if env(ENV_NO_COLOR).is_some_and(|v| is_truthy(&v)) || env(ENV_NO_COLOR_STD).is_some() {
            *source = ConfigSource::Env;
            return true;
        }

        if !file.output.color {
            *source = ConfigSource::ConfigFile;
            return true;
        }

        *source = ConfigSource::Default;
        false
    }

    fn resolve_pretty(
        cli: &Cli,
        file: &Settings,
        env: EnvLookup<'_>,
        source: &mut ConfigSource,
    ) -> bool {
        if cli.pretty {
            *source = ConfigSource::Cli;
            return true;
        }

        if env(ENV_PRETTY).is_some_and(|v| is_truthy(&v)) {
            *source = ConfigSource::Env;
            return true;
        }

        if file.output.pretty {
            *source = ConfigSource::ConfigFile;
            return true;
        }

        *source = ConfigSource::Default;
        false
    }
}

/// Parse a format string into `OutputFormat`.
fn parse_format(s: &str) -> Result<OutputFormat> {
    match s.trim().to_lowercase().as_str() {
        "human" => Ok(OutputFormat::Human),
        "json" => Ok(OutputFormat::Json),
        "md" | "markdown" => Ok(OutputFormat::Md),
        _ => Err(AidrError::Config(format!(
            "Invalid format '{s}'. Valid formats: human, json, md"
        ))),
    }
}

fn checked_timeout(key: &str, secs: u64) -> Result<Duration> {
    if secs == 0 || secs > MAX_TIMEOUT_SECS {
        return Err(AidrError::ConfigInvalid {
            key: key.to_string(),
            message: format!("timeout must be between 1 and {MAX_TIMEOUT_SECS} seconds"),
        });
    }
    Ok(Duration::from_secs(secs))
}

/// Check if a value is truthy (1, true, yes, on).
fn is_truthy(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

// =============================================================================
// Settings file
// =============================================================================

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub probe: ProbeSettings,
    pub matching: MatchingSettings,
    pub proxy: ProxySettings,
    pub output: OutputSettings,
}

/// `[general]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeneralSettings {
    /// Token and listing timeout in seconds.
    pub timeout_seconds: u64,
    /// Routing config path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_config: Option<PathBuf>,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            routing_config: None,
        }
    }
}

/// `[probe]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProbeSettings {
    pub timeout_seconds: u64,
    pub max_tokens: u32,
    pub anthropic_version: String,
    pub prompt: String,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            max_tokens: DEFAULT_MAX_TOKENS,
            anthropic_version: DEFAULT_ANTHROPIC_VERSION.to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }
}

/// `[matching]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MatchingSettings {
    /// Tokens used by `find`.
    pub tokens: Vec<String>,
    /// Tokens marking the model family of interest in `configs`/`deployments`.
    pub family_tokens: Vec<String>,
    /// Routing key printed by `find`.
    pub model: String,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            tokens: OPUS_TOKENS.iter().map(ToString::to_string).collect(),
            family_tokens: ANTHROPIC_FAMILY_TOKENS
                .iter()
                .map(ToString::to_string)
                .collect(),
            model: "claude-4.5-opus".to_string(),
        }
    }
}

/// `[proxy]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProxySettings {
    pub url: String,
    /// Model for `/v1/messages` and the CLI check.
    pub model: String,
    /// Model for `/v1/chat/completions`.
    pub chat_model: String,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
    pub cli_timeout_seconds: u64,
    /// Last-sync marker file, relative to the reviewed repository.
    pub marker_file: PathBuf,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:4337".to_string(),
            model: "anthropic--claude-4-sonnet".to_string(),
            chat_model: "claude-4.5-opus".to_string(),
            max_tokens: 2000,
            timeout_seconds: 120,
            cli_timeout_seconds: 180,
            marker_file: PathBuf::from(".last_sync_hash"),
        }
    }
}

/// `[output]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub color: bool,
    pub pretty: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
            pretty: false,
        }
    }
}

impl Settings {
    /// Load settings from `AIDR_CONFIG` or the default path.
    ///
    /// Returns defaults if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns error only if the file exists but is invalid.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from a specific path.
    ///
    /// # Errors
    ///
    /// Returns `ConfigParse` if the file exists but is not valid TOML.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(?path, "Settings file not found, using defaults");
            return Ok(Self::default());
        }

        tracing::debug!(?path, "Loading settings file");
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| AidrError::ConfigParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Settings file path (`AIDR_CONFIG` wins over the platform default).
    #[must_use]
    pub fn config_path() -> PathBuf {
        std::env::var_os(ENV_CONFIG)
            .map_or_else(|| AppPaths::new().settings_file(), PathBuf::from)
    }

    /// Validate settings values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` naming the first bad key.
    pub fn validate(&self) -> Result<()> {
        if let Some(format) = &self.output.format {
            parse_format(format)?;
        }

        checked_timeout("general.timeout_seconds", self.general.timeout_seconds)?;
        checked_timeout("probe.timeout_seconds", self.probe.timeout_seconds)?;
        checked_timeout("proxy.timeout_seconds", self.proxy.timeout_seconds)?;
        checked_timeout("proxy.cli_timeout_seconds", self.proxy.cli_timeout_seconds)?;

        if self.probe.max_tokens == 0 {
            return Err(AidrError::ConfigInvalid {
                key: "probe.max_tokens".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.matching.tokens.iter().all(|t| t.trim().is_empty()) {
            return Err(AidrError::ConfigInvalid {
                key: "matching.tokens".to_string(),
                message: "at least one non-empty token is required".to_string(),
            });
        }

        if !self.proxy.url.starts_with("http://") && !self.proxy.url.starts_with("https://") {
            return Err(AidrError::ConfigInvalid {
                key: "proxy.url".to_string(),
                message: format!("'{}' is not an http(s) URL", self.proxy.url),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["aidr"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_settings_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn load_missing_file_returns_default() {
        let settings = Settings::load_from(Path::new("/nonexistent/aidr/config.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn load_partial_toml_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[probe]
timeout_seconds = 25

[matching]
tokens = ["sonnet"]
"#
        )
        .unwrap();

        let settings = Settings::load_from(file.path()).unwrap();
        assert_eq!(settings.probe.timeout_seconds, 25);
        assert_eq!(settings.probe.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(settings.matching.tokens, ["sonnet"]);
        assert_eq!(settings.general.timeout_seconds, 30);
    }

    #[test]
    fn load_invalid_toml_is_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[probe\ntimeout = ").unwrap();
        assert!(matches!(
            Settings::load_from(file.path()),
            Err(AidrError::ConfigParse { .. })
        ));
    }

    #[test]
    fn serialized_settings_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut settings = Settings::default();
        settings.proxy.url = "http://localhost:9000".to_string();
        fs::write(&path, toml::to_string_pretty(&settings).unwrap()).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut settings = Settings::default();
        settings.probe.timeout_seconds = 0;
        match settings.validate() {
            Err(AidrError::ConfigInvalid { key, .. }) => assert_eq!(key, "probe.timeout_seconds"),
            other => panic!("expected ConfigInvalid, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_bad_format_and_url() {
        let mut settings = Settings::default();
        settings.output.format = Some("yaml".to_string());
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.proxy.url = "127.0.0.1:4337".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn config_source_display() {
        assert_eq!(ConfigSource::Cli.to_string(), "CLI flag");
        assert_eq!(ConfigSource::Env.to_string(), "environment variable");
        assert_eq!(ConfigSource::ConfigFile.to_string(), "config file");
        assert_eq!(ConfigSource::Default.to_string(), "default");
    }

    #[test]
    fn resolved_defaults() {
        let resolved =
            ResolvedSettings::resolve_with(&cli(&["configs"]), Settings::default(), &env_of(&[]))
                .unwrap();
        assert_eq!(resolved.format, OutputFormat::Human);
        assert_eq!(resolved.timeout, Duration::from_secs(30));
        assert_eq!(resolved.probe_timeout, Duration::from_secs(10));
        assert_eq!(resolved.routing_config, PathBuf::from("config.json"));
        assert_eq!(resolved.proxy_url, "http://127.0.0.1:4337");
        assert_eq!(resolved.sources.routing_config, ConfigSource::Default);
        assert_eq!(resolved.sources.proxy_url, ConfigSource::Default);
        assert!(!resolved.no_color);
        assert!(!resolved.pretty);
    }

    #[test]
    fn cli_beats_env_beats_file() {
        let mut file = Settings::default();
        file.general.timeout_seconds = 45;
        file.general.routing_config = Some(PathBuf::from("file.json"));
        let env = env_of(&[(ENV_TIMEOUT, "60"), (ENV_ROUTING_CONFIG, "env.json")]);

        let resolved = ResolvedSettings::resolve_with(&cli(&["configs"]), file.clone(), &env).unwrap();
        assert_eq!(resolved.timeout, Duration::from_secs(60));
        assert_eq!(resolved.sources.timeout, ConfigSource::Env);
        assert_eq!(resolved.routing_config, PathBuf::from("env.json"));

        let resolved = ResolvedSettings::resolve_with(
            &cli(&["--request-timeout", "5", "--config", "cli.json", "configs"]),
            file.clone(),
            &env,
        )
        .unwrap();
        assert_eq!(resolved.timeout, Duration::from_secs(5));
        assert_eq!(resolved.sources.timeout, ConfigSource::Cli);
        assert_eq!(resolved.routing_config, PathBuf::from("cli.json"));

        let resolved = ResolvedSettings::resolve_with(&cli(&["configs"]), file, &env_of(&[])).unwrap();
        assert_eq!(resolved.timeout, Duration::from_secs(45));
        assert_eq!(resolved.routing_config, PathBuf::from("file.json"));
        assert_eq!(resolved.sources.routing_config, ConfigSource::ConfigFile);
    }

    #[test]
    fn env_timeout_must_be_numeric() {
        let err = ResolvedSettings::resolve_with(
            &cli(&["configs"]),
            Settings::default(),
            &env_of(&[(ENV_PROBE_TIMEOUT, "soon")]),
        )
        .unwrap_err();
        assert!(matches!(err, AidrError::ConfigInvalid { .. }));
    }

    #[test]
    fn format_precedence() {
        let env = env_of(&[(ENV_FORMAT, "md")]);
        let resolved =
            ResolvedSettings::resolve_with(&cli(&["configs"]), Settings::default(), &env).unwrap();
        assert_eq!(resolved.format, OutputFormat::Md);
        assert_eq!(resolved.sources.format, ConfigSource::Env);

        let resolved =
            ResolvedSettings::resolve_with(&cli(&["--json", "configs"]), Settings::default(), &env)
                .unwrap();
        assert_eq!(resolved.format, OutputFormat::Json);
        assert_eq!(resolved.sources.format, ConfigSource::Cli);
    }

    #[test]
    fn no_color_from_std_env_presence() {
        let resolved = ResolvedSettings::resolve_with(
            &cli(&["configs"]),
            Settings::default(),
            &env_of(&[(ENV_NO_COLOR_STD, "")]),
        )
        .unwrap();
        assert!(resolved.no_color);
        assert_eq!(resolved.sources.no_color, ConfigSource::Env);

        let resolved = ResolvedSettings::resolve_with(
            &cli(&["configs"]),
            Settings::default(),
            &env_of(&[(ENV_NO_COLOR, "0")]),
        )
        .unwrap();
        assert!(!resolved.no_color);
    }

    #[test]
    fn pretty_from_file() {
        let mut file = Settings::default();
        file.output.pretty = true;
        let resolved = ResolvedSettings::resolve_with(&cli(&["configs"]), file, &env_of(&[])).unwrap();
        assert!(resolved.pretty);
        assert_eq!(resolved.sources.pretty, ConfigSource::ConfigFile);
    }

    #[test]
    fn proxy_url_env_override() {
        let resolved = ResolvedSettings::resolve_with(
            &cli(&["proxy-check"]),
            Settings::default(),
            &env_of(&[(ENV_PROXY_URL, " http://proxy:8080 ")]),
        )
        .unwrap();
        assert_eq!(resolved.proxy_url, "http://proxy:8080");
        assert_eq!(resolved.sources.proxy_url, ConfigSource::Env);
    }

    #[test]
    fn probe_request_follows_settings() {
        let mut file = Settings::default();
        file.probe.max_tokens = 3;
        file.probe.prompt = "ping".to_string();
        let resolved = ResolvedSettings::resolve_with(&cli(&["configs"]), file, &env_of(&[])).unwrap();
        let request = resolved.probe_request();
        assert_eq!(request.max_tokens, 3);
        assert_eq!(request.prompt, "ping");
        assert_eq!(request.anthropic_version, DEFAULT_ANTHROPIC_VERSION);
    }
}
