//! # Prereg Library
//!
//! This library exposes the command implementations for testing and
//! integration.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod cli;
pub mod config;

// Re-export prereg_core for convenience
pub use prereg_core;
