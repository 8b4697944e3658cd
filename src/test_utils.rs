//! Test utilities for aidr.
//!
//! Provides shared helpers, control-plane payload factories, and assertion
//! macros for use across all test modules.
//!
//! # Usage
//!
//! ```rust,ignore
//! use aidr::test_utils::*;
//!
//! let dir = TestDir::new();
//! dir.create_file("key.json", &make_test_service_key("https://auth", "https://api"));
//! let config = dir.write_routing_config(&[("main", "default")]);
//! ```

use std::fs;
use std::io::{self, Write as IoWrite};
use std::path::{Path, PathBuf};

use serde_json::{Value, json};

use crate::core::models::{Configuration, Deployment, DeploymentStatus};

// =============================================================================
// Control plane payload factories
// =============================================================================

/// Service key JSON pointing at the given auth and API base URLs.
#[must_use]
pub fn make_test_service_key(auth_url: &str, api_url: &str) -> String {
    json!({
        "clientid": "sb-test-client!b1234",
        "clientsecret": "test-secret",
        "url": auth_url,
        "serviceurls": { "AI_API_URL": api_url },
    })
    .to_string()
}

/// Service key JSON missing `clientsecret`.
#[must_use]
pub fn make_test_service_key_without_secret(auth_url: &str, api_url: &str) -> String {
    json!({
        "clientid": "sb-test-client!b1234",
        "url": auth_url,
        "serviceurls": { "AI_API_URL": api_url },
    })
    .to_string()
}

/// Body of a successful token response.
#[must_use]
pub fn make_test_token_response(token: &str) -> Value {
    json!({
        "access_token": token,
        "token_type": "bearer",
        "expires_in": 43199,
    })
}

/// A configuration with the given id and name.
#[must_use]
pub fn make_test_configuration(id: &str, name: &str) -> Configuration {
    Configuration {
        id: id.to_string(),
        name: name.to_string(),
        scenario_id: "foundation-models".to_string(),
        executable_id: Some("aws-bedrock".to_string()),
        ..Configuration::default()
    }
}

/// A deployment of `configuration_id` with the given status.
#[must_use]
pub fn make_test_deployment(id: &str, configuration_id: &str, status: &str) -> Deployment {
    Deployment {
        id: id.to_string(),
        configuration_id: configuration_id.to_string(),
        status: DeploymentStatus::parse(status),
        ..Deployment::default()
    }
}

/// Listing envelope (`{count, resources}`) around serializable items.
///
/// # Panics
///
/// Panics if an item cannot be serialized.
#[must_use]
pub fn make_test_listing<T: serde::Serialize>(items: &[T]) -> Value {
    json!({
        "count": items.len(),
        "resources": items
            .iter()
            .map(|item| serde_json::to_value(item).expect("serializable item"))
            .collect::<Vec<_>>(),
    })
}

/// Deployment details naming the backend model.
#[must_use]
pub fn make_test_deployment_details(id: &str, configuration_name: &str, model: &str) -> Value {
    json!({
        "id": id,
        "configurationName": configuration_name,
        "status": "RUNNING",
        "details": {
            "resources": {
                "backend_details": { "model": { "name": model, "version": "1" } }
            }
        }
    })
}

/// Anthropic-style messages response with one text block.
#[must_use]
pub fn make_test_messages_response(text: &str) -> Value {
    json!({
        "id": "msg_test",
        "type": "message",
        "role": "assistant",
        "content": [{ "type": "text", "text": text }],
        "stop_reason": "end_turn",
    })
}

/// Routing config JSON for `(name, resource_group)` pairs, each using
/// `<name>-key.json` as its service key.
#[must_use]
pub fn make_test_routing_config(subaccounts: &[(&str, &str)]) -> String {
    let entries: serde_json::Map<String, Value> = subaccounts
        .iter()
        .map(|(name, group)| {
            (
                (*name).to_string(),
                json!({
                    "resource_group": group,
                    "service_key_json": format!("{name}-key.json"),
                    "deployment_models": {},
                }),
            )
        })
        .collect();
    json!({
        "subAccounts": entries,
        "secret_authentication_tokens": ["proxy-test-key"],
    })
    .to_string()
}

/// A settings TOML exercising every section.
#[must_use]
pub fn make_test_settings_toml() -> String {
    r#"[general]
timeout_seconds = 20

[probe]
timeout_seconds = 5
max_tokens = 1

[matching]
tokens = ["claude-4.5-opus"]
model = "claude-4.5-opus"

[proxy]
url = "http://127.0.0.1:4337"
model = "anthropic--claude-4-sonnet"

[output]
color = false
pretty = true
"#
    .to_string()
}

// =============================================================================
// Temporary Directory
// =============================================================================

/// An isolated temporary directory, removed on drop.
///
/// ```rust,ignore
/// use aidr::test_utils::TestDir;
///
/// let dir = TestDir::new();
/// dir.create_file("config.json", "{}");
/// assert!(dir.file_exists("config.json"));
/// ```
pub struct TestDir {
    inner: tempfile::TempDir,
}

impl TestDir {
    /// Create a new isolated temporary directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: tempfile::tempdir().expect("Failed to create temp directory"),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    /// Create a file with the given content, creating parent directories.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be created or written.
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.inner.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        let mut file = fs::File::create(&path).expect("Failed to create test file");
        file.write_all(content.as_bytes())
            .expect("Failed to write test file");
    }

    /// Write `config.json` for the given subaccounts and return its path.
    ///
    /// Service keys are not written; use [`TestDir::write_service_key`].
    #[must_use]
    pub fn write_routing_config(&self, subaccounts: &[(&str, &str)]) -> PathBuf {
        self.create_file("config.json", &make_test_routing_config(subaccounts));
        self.file_path("config.json")
    }

    /// Write `<subaccount>-key.json` pointing at a mock server.
    pub fn write_service_key(&self, subaccount: &str, auth_url: &str, api_url: &str) {
        self.create_file(
            &format!("{subaccount}-key.json"),
            &make_test_service_key(auth_url, api_url),
        );
    }

    /// Read a file from the temporary directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn read_file(&self, name: &str) -> io::Result<String> {
        fs::read_to_string(self.inner.path().join(name))
    }

    #[must_use]
    pub fn file_exists(&self, name: &str) -> bool {
        self.inner.path().join(name).exists()
    }

    #[must_use]
    pub fn file_path(&self, name: &str) -> PathBuf {
        self.inner.path().join(name)
    }
}

impl Default for TestDir {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Assertion Macros
// =============================================================================

/// Assert that a string contains a substring, printing the haystack on failure.
#[macro_export]
macro_rules! assert_contains {
    ($haystack:expr, $needle:expr) => {{
        let haystack: &str = &$haystack;
        let needle: &str = &$needle;
        assert!(
            haystack.contains(needle),
            "expected to find {:?} in:\n{}",
            needle,
            haystack
        );
    }};
}

/// Assert that a string does not contain a substring.
#[macro_export]
macro_rules! assert_not_contains {
    ($haystack:expr, $needle:expr) => {{
        let haystack: &str = &$haystack;
        let needle: &str = &$needle;
        assert!(
            !haystack.contains(needle),
            "did not expect {:?} in:\n{}",
            needle,
            haystack
        );
    }};
}

/// Assert that a string parses as JSON and return the value.
#[macro_export]
macro_rules! assert_json_valid {
    ($text:expr) => {{
        let text: &str = &$text;
        match serde_json::from_str::<serde_json::Value>(text) {
            Ok(value) => value,
            Err(e) => panic!("invalid JSON ({e}):\n{text}"),
        }
    }};
}

/// Assert that output carries no ANSI escape codes.
#[macro_export]
macro_rules! assert_no_ansi_codes {
    ($text:expr) => {{
        let text: &str = &$text;
        assert!(
            !$crate::test_utils::has_ansi_codes(text),
            "unexpected ANSI codes in:\n{}",
            text
        );
    }};
}

// =============================================================================
// Test Helpers
// =============================================================================

/// Whether a string contains an escape character.
#[must_use]
pub fn has_ansi_codes(text: &str) -> bool {
    text.contains('\x1b')
}

/// Strip ANSI CSI sequences from a string.
#[must_use]
pub fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\x1b' {
            if chars.peek() == Some(&'[') {
                chars.next();
                for next in chars.by_ref() {
                    if next.is_ascii_alphabetic() {
                        break;
                    }
                }
            }
        } else {
            result.push(c);
        }
    }

    result
}
