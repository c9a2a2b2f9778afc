//! pregate — presubmit gating engine (library crate).
//!
//! Re-exports public modules for integration tests and external use.

pub mod aggregator;
pub mod checks;
pub mod config;
pub mod constants;
pub mod env;
pub mod host;
pub mod models;
pub mod output;
pub mod owners;
pub mod status;
