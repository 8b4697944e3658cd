//! Phase-tracking logger for integration tests.
#![allow(dead_code)]
//!
//! Each test creates one `TestLogger`; phases, HTTP steps, and the final
//! outcome go to stderr (and optionally a file) so failing runs show where
//! they stopped.
//!
//! # Environment Variables
//!
//! - `AIDR_TEST_LOG` - minimum level: trace, debug, info, warn, error (default: info)
//! - `AIDR_TEST_LOG_JSON` - "1" or "true" for one JSON object per line
//! - `AIDR_TEST_LOG_FILE` - also append lines to this file

use std::env;
use std::fmt::Display;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::log_capture::TestLogCapture;

// =============================================================================
// Log Levels
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        })
    }
}

// =============================================================================
// Settings
// =============================================================================

struct LoggerSettings {
    min_level: LogLevel,
    json: bool,
    file: Option<Mutex<File>>,
}

fn settings() -> &'static LoggerSettings {
    static SETTINGS: OnceLock<LoggerSettings> = OnceLock::new();
    SETTINGS.get_or_init(|| LoggerSettings {
        min_level: env::var("AIDR_TEST_LOG")
            .ok()
            .and_then(|s| LogLevel::parse(&s))
            .unwrap_or(LogLevel::Info),
        json: env::var("AIDR_TEST_LOG_JSON").is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true")),
        file: env::var("AIDR_TEST_LOG_FILE").ok().and_then(|path| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
                .map(Mutex::new)
        }),
    })
}

#[derive(Debug, Serialize)]
struct LogEntry<'a> {
    timestamp: DateTime<Utc>,
    level: LogLevel,
    test: &'a str,
    phase: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_ms: Option<u64>,
}

// =============================================================================
// TestLogger
// =============================================================================

/// Per-test logger with phase and duration tracking.
pub struct TestLogger {
    test_name: String,
    start: Instant,
    phase: Mutex<String>,
}

impl TestLogger {
    #[must_use]
    pub fn new(test_name: &str) -> Self {
        let logger = Self {
            test_name: test_name.to_string(),
            start: Instant::now(),
            phase: Mutex::new("init".to_string()),
        };
        logger.log(LogLevel::Info, "Test starting", None);
        logger
    }

    /// Logger plus a tracing capture for assertions on the code under test.
    pub fn with_capture(test_name: &str) -> (Self, TestLogCapture) {
        let capture = TestLogCapture::start();
        (Self::new(test_name), capture)
    }

    /// Enter a phase: setup, execute, verify.
    pub fn phase(&self, phase: &str) {
        if let Ok(mut current) = self.phase.lock() {
            *current = phase.to_string();
        }
        self.log(LogLevel::Debug, &format!("Phase: {phase}"), None);
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message, None);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message, None);
    }

    pub fn http_request(&self, method: &str, url: &str) {
        self.debug(&format!("HTTP {method} {url}"));
    }

    /// Log the rendered command output, one line per entry.
    pub fn output(&self, label: &str, text: &str) {
        for line in text.lines() {
            self.log(LogLevel::Trace, &format!("{label}| {line}"), None);
        }
    }

    pub fn finish_ok(&self) {
        let duration_ms = self.elapsed_ms();
        self.log(
            LogLevel::Info,
            &format!("Test passed (duration: {duration_ms}ms)"),
            Some(duration_ms),
        );
    }

    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn log(&self, level: LogLevel, message: &str, duration_ms: Option<u64>) {
        let settings = settings();
        if level < settings.min_level {
            return;
        }
        let phase = self
            .phase
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default();
        let timestamp = Utc::now();

        let line = if settings.json {
            let entry = LogEntry {
                timestamp,
                level,
                test: &self.test_name,
                phase: &phase,
                message,
                duration_ms,
            };
            serde_json::to_string(&entry).unwrap_or_default()
        } else {
            format!(
                "[{}] [{level}] [{}:{phase}] {message}",
                timestamp.format("%H:%M:%S%.3f"),
                self.test_name
            )
        };

        eprintln!("{line}");
        if let Some(file) = &settings.file
            && let Ok(mut file) = file.lock()
        {
            let _ = writeln!(file, "{line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parsing() {
        assert_eq!(LogLevel::parse("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse(" warning "), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("verbose"), None);
        assert!(LogLevel::Trace < LogLevel::Error);
    }

    #[test]
    fn logger_phases() {
        let log = TestLogger::new("logger_phases");
        log.phase("setup");
        log.http_request("GET", "http://127.0.0.1/v2/lm/deployments");
        log.phase("verify");
        log.finish_ok();
    }
}
