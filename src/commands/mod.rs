//! Command implementations for the CLI
//!
//! - start: Start the classification server
//! - test: Validate configuration and print a summary
//! - config: Display the effective configuration

pub mod config;
pub mod start;
