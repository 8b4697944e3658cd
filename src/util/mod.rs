//! Utility functions.

pub mod env;
pub mod format;

pub use format::{format_duration, format_elapsed_ms, plural, short_hash, truncate};
