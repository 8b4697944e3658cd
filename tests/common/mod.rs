//! Shared harness for the integration tests.
//!
//! - `fixtures`: a wiremock-backed AI Core control plane and workspace setup
//! - `logger`: phase-tracking test logger
//! - `log_capture`: tracing layer that records events for assertions

#![allow(dead_code)]

pub mod fixtures;
pub mod log_capture;
pub mod logger;
