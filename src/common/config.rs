//! Configuration file handling

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::paths::config_path;
use super::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Server under test
    #[serde(default)]
    pub server: ServerConfig,

    /// WebDriver endpoint and browser settings
    #[serde(default)]
    pub webdriver: WebDriverConfig,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,

    /// Failure artifacts
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
}

/// Server connection and admin credentials
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Base URL of the web application
    #[serde(default = "default_server_url")]
    pub url: String,

    /// System admin login used for config updates and provisioning
    #[serde(default = "default_admin_username")]
    pub admin_username: String,

    #[serde(default = "default_admin_password")]
    pub admin_password: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            admin_username: default_admin_username(),
            admin_password: default_admin_password(),
        }
    }
}

fn default_server_url() -> String {
    "http://localhost:8065".to_string()
}
fn default_admin_username() -> String {
    "sysadmin".to_string()
}
fn default_admin_password() -> String {
    "Sys@dmin-sample1".to_string()
}

/// Browser family driven over WebDriver
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BrowserKind {
    /// Chrome / Chromium via chromedriver
    #[default]
    Chrome,
    /// Firefox via geckodriver
    Firefox,
}

impl BrowserKind {
    /// Name of the driver binary for this browser
    pub fn driver_binary(&self) -> &'static str {
        match self {
            BrowserKind::Chrome => "chromedriver",
            BrowserKind::Firefox => "geckodriver",
        }
    }
}

impl std::str::FromStr for BrowserKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chrome" | "chromium" => Ok(BrowserKind::Chrome),
            "firefox" => Ok(BrowserKind::Firefox),
            other => Err(format!("unknown browser '{}' (expected chrome or firefox)", other)),
        }
    }
}

/// WebDriver settings
#[derive(Debug, Deserialize, Clone)]
pub struct WebDriverConfig {
    /// WebDriver server URL
    #[serde(default = "default_webdriver_url")]
    pub url: String,

    /// Browser to drive
    #[serde(default)]
    pub browser: BrowserKind,

    /// Run without a visible window
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Spawn a local driver when nothing is listening at `url`
    #[serde(default = "default_true")]
    pub auto_spawn: bool,

    /// Explicit driver binary; otherwise searched on PATH
    pub driver_path: Option<PathBuf>,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            url: default_webdriver_url(),
            browser: BrowserKind::default(),
            headless: true,
            auto_spawn: true,
            driver_path: None,
        }
    }
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}
fn default_true() -> bool {
    true
}

/// Timeout settings
#[derive(Debug, Deserialize, Clone)]
pub struct Timeouts {
    /// How long element lookups and assertions keep retrying
    #[serde(default = "default_command")]
    pub command_secs: u64,

    /// Delay between retries
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// How long to wait for a spawned driver to answer /status
    #[serde(default = "default_driver_start")]
    pub driver_start_secs: u64,

    /// Timeout for server API requests
    #[serde(default = "default_http")]
    pub http_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            command_secs: default_command(),
            poll_interval_ms: default_poll_interval(),
            driver_start_secs: default_driver_start(),
            http_secs: default_http(),
        }
    }
}

fn default_command() -> u64 {
    10
}
fn default_poll_interval() -> u64 {
    100
}
fn default_driver_start() -> u64 {
    10
}
fn default_http() -> u64 {
    30
}

/// Failure artifact settings
#[derive(Debug, Deserialize, Clone)]
pub struct ArtifactsConfig {
    /// Capture a screenshot when a scenario fails
    #[serde(default = "default_true")]
    pub screenshots_on_failure: bool,

    /// Where screenshots go (defaults to the data dir)
    pub dir: Option<PathBuf>,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            screenshots_on_failure: true,
            dir: None,
        }
    }
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| super::Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| super::Error::ConfigParse(e.to_string()))
    }

    /// Directory for failure screenshots, if screenshots are enabled
    pub fn screenshot_dir(&self) -> Option<PathBuf> {
        if !self.artifacts.screenshots_on_failure {
            return None;
        }
        self.artifacts
            .dir
            .clone()
            .or_else(super::paths::screenshot_dir)
    }
}
