//! gitlab-fix-labels CLI library exports.
//!
//! The binary in `main.rs` is a thin wrapper around these modules.

pub mod commands;
pub mod config;
pub mod errors;
pub mod progress;
pub mod usage;
