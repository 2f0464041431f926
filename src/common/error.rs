//! Error types for the integrations E2E runner
//!
//! Error messages are meant to be read in a CI log, so most of them say
//! what to check or change next.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the E2E runner
#[derive(Error, Debug)]
pub enum Error {
    // === Server API Errors ===
    #[error("Request {method} {path} failed: {message}")]
    ApiRequest {
        method: String,
        path: String,
        message: String,
    },

    #[error("Request {method} {path} returned status {status}: {body}")]
    ApiStatus {
        method: String,
        path: String,
        status: u16,
        body: String,
    },

    #[error("Admin login failed: {0}. Check [server] admin_username/admin_password in the config file")]
    LoginFailed(String),

    // === WebDriver Errors ===
    #[error("WebDriver error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),

    #[error("WebDriver binary '{name}' not found. Searched: {searched}")]
    DriverNotFound { name: String, searched: String },

    #[error("WebDriver did not become ready within {0} seconds")]
    DriverSpawnTimeout(u64),

    #[error("Element '{locator}' not found within {timeout_secs} seconds")]
    ElementNotFound { locator: String, timeout_secs: u64 },

    // === Suite Errors ===
    #[error("Suite setup failed: {0}")]
    SetupFailed(String),

    #[error("{failed} of {total} scenarios failed")]
    SuiteFailed { failed: usize, total: usize },

    #[error("Test assertion failed: {0}")]
    TestAssertion(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a driver not found error with search paths
    pub fn driver_not_found<S: AsRef<str>>(name: &str, paths: &[S]) -> Self {
        Self::DriverNotFound {
            name: name.to_string(),
            searched: paths.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join(", "),
        }
    }

    /// Create an API transport error
    pub fn api_request(method: &str, path: &str, message: impl ToString) -> Self {
        Self::ApiRequest {
            method: method.to_string(),
            path: path.to_string(),
            message: message.to_string(),
        }
    }

    /// Create an element not found error
    pub fn element_not_found(locator: impl ToString, timeout_secs: u64) -> Self {
        Self::ElementNotFound {
            locator: locator.to_string(),
            timeout_secs,
        }
    }

    /// Whether a retrying assertion may try again after this error
    ///
    /// Only "not there yet" failures are retried; transport and
    /// configuration errors fail the step immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::TestAssertion(_) | Error::ElementNotFound { .. }
        )
    }
}
