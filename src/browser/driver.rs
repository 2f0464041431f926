//! WebDriver server spawning
//!
//! Uses an already-running WebDriver server when one answers at the
//! configured URL; otherwise starts `chromedriver`/`geckodriver` on that
//! port and waits for it to report ready.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};

use crate::common::config::{BrowserKind, WebDriverConfig};
use crate::common::{join_url, Error, Result};

/// A driver process started by us; killed when dropped
#[derive(Debug)]
pub struct DriverProcess {
    child: Child,
}

impl DriverProcess {
    /// OS process id, if still running
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }
}

/// Ensure a WebDriver server is listening, spawning one if allowed
///
/// Returns the spawned process so the caller controls its lifetime, or
/// `None` when an external server was already running.
pub async fn ensure_webdriver_running(
    config: &WebDriverConfig,
    start_timeout: Duration,
) -> Result<Option<DriverProcess>> {
    if is_ready(&config.url).await {
        tracing::debug!(url = %config.url, "WebDriver already running");
        return Ok(None);
    }

    if !config.auto_spawn {
        return Err(Error::Config(format!(
            "No WebDriver server at {} and auto_spawn is disabled",
            config.url
        )));
    }

    let binary = locate_driver(config)?;
    let port = driver_port(&config.url)?;
    spawn_driver(&binary, config.browser, port, &config.url, start_timeout)
        .await
        .map(Some)
}

/// Whether the WebDriver server at `url` reports ready on `/status`
pub async fn is_ready(url: &str) -> bool {
    let client = reqwest::Client::new();
    let response = match client
        .get(join_url(url, "/status"))
        .timeout(Duration::from_secs(2))
        .send()
        .await
    {
        Ok(r) if r.status().is_success() => r,
        _ => return false,
    };

    match response.json::<serde_json::Value>().await {
        Ok(body) => body["value"]["ready"].as_bool().unwrap_or(true),
        Err(_) => false,
    }
}

/// Find the driver binary for the configured browser
fn locate_driver(config: &WebDriverConfig) -> Result<PathBuf> {
    let name = config.browser.driver_binary();

    if let Some(path) = &config.driver_path {
        if path.exists() {
            return Ok(path.clone());
        }
        return Err(Error::driver_not_found(name, &[path.display().to_string()]));
    }

    which::which(name).map_err(|_| Error::driver_not_found(name, &["PATH"]))
}

/// Port the driver must listen on, taken from the WebDriver URL
fn driver_port(url: &str) -> Result<u16> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|e| Error::Config(format!("Invalid WebDriver URL '{}': {}", url, e)))?;
    parsed
        .port_or_known_default()
        .ok_or_else(|| Error::Config(format!("WebDriver URL '{}' has no port", url)))
}

/// Command-line arguments selecting the listen port
fn port_args(browser: BrowserKind, port: u16) -> Vec<String> {
    match browser {
        BrowserKind::Chrome => vec![format!("--port={}", port)],
        BrowserKind::Firefox => vec!["--port".to_string(), port.to_string()],
    }
}

/// Spawn the driver and wait until it reports ready
async fn spawn_driver(
    binary: &Path,
    browser: BrowserKind,
    port: u16,
    url: &str,
    start_timeout: Duration,
) -> Result<DriverProcess> {
    tracing::info!(driver = %binary.display(), port, "Spawning WebDriver");

    let mut child = Command::new(binary)
        .args(port_args(browser, port))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            Error::Config(format!("Failed to spawn '{}': {}", binary.display(), e))
        })?;

    let deadline = tokio::time::Instant::now() + start_timeout;

    loop {
        if tokio::time::Instant::now() >= deadline {
            return Err(Error::DriverSpawnTimeout(start_timeout.as_secs()));
        }

        tokio::time::sleep(Duration::from_millis(100)).await;

        if let Some(status) = child.try_wait()? {
            return Err(Error::Config(format!(
                "'{}' exited during startup with {}",
                binary.display(),
                status
            )));
        }

        if is_ready(url).await {
            tracing::debug!("WebDriver started successfully");
            return Ok(DriverProcess { child });
        }
    }
}
