//! aidr - AI Core Deployment Resolver
//!
//! Discovers configurations and deployments in SAP AI Core subaccounts,
//! correlates them by configuration name, probes deployments to learn which
//! model they serve, and prints the `deployment_models` routing entries a
//! downstream proxy needs.

#![deny(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod core;
pub mod error;
pub mod render;
pub mod storage;
pub mod util;

/// Test utilities module - included in test builds or when test-utils feature is enabled.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{AidrError, ExitCode, Result};
