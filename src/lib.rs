//! Integrations E2E - end-to-end tests for the integrations settings pages
//!
//! The suite talks to the server's REST API for setup and drives a browser
//! through the W3C WebDriver protocol for the scenarios themselves.

pub mod api;
pub mod browser;
pub mod cli;
pub mod commands;
pub mod common;
pub mod suite;
pub mod testing;

// Re-export commonly used types for tests
pub use common::{Error, Result};
