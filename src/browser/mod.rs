//! Browser automation seam
//!
//! The runner only sees the [`Browser`] trait. Every element operation
//! waits for its target the way a user would: it keeps looking until the
//! element shows up or the configured command timeout runs out.

pub mod driver;
mod locator;
mod webdriver;

pub use driver::{ensure_webdriver_running, DriverProcess};
pub use locator::Locator;
pub use webdriver::WebDriverBrowser;

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

use crate::common::config::Timeouts;
use crate::common::Result;

/// Retry schedule for element lookups and assertions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub timeout: Duration,
    pub poll: Duration,
}

impl WaitPolicy {
    pub fn new(timeout: Duration, poll: Duration) -> Self {
        Self { timeout, poll }
    }
}

impl From<&Timeouts> for WaitPolicy {
    fn from(t: &Timeouts) -> Self {
        Self {
            timeout: Duration::from_secs(t.command_secs),
            poll: Duration::from_millis(t.poll_interval_ms),
        }
    }
}

/// One browser session
#[async_trait]
pub trait Browser: Send + Sync {
    /// Navigate to an absolute URL
    async fn visit(&self, url: &str) -> Result<()>;

    /// URL of the current page
    async fn current_url(&self) -> Result<String>;

    /// Set a cookie on the current origin
    async fn set_cookie(&self, name: &str, value: &str) -> Result<()>;

    /// Click an element
    async fn click(&self, target: &Locator) -> Result<()>;

    /// Type into an element, optionally pressing Enter afterwards
    async fn type_text(&self, target: &Locator, text: &str, submit: bool) -> Result<()>;

    /// Choose an `<option>` of a `<select>` by its visible text
    async fn select_option(&self, target: &Locator, option: &str) -> Result<()>;

    /// Rendered text of an element
    async fn text(&self, target: &Locator) -> Result<String>;

    /// Whether the element is displayed (it must exist)
    async fn is_visible(&self, target: &Locator) -> Result<bool>;

    /// Computed value of a CSS property
    async fn css_value(&self, target: &Locator, property: &str) -> Result<String>;

    /// Save a PNG of the viewport
    async fn screenshot(&self, path: &Path) -> Result<()>;

    /// End the session
    async fn close(&self) -> Result<()>;
}
