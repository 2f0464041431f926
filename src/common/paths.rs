//! Configuration and artifact paths
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/integrations-e2e/`, `~/.local/share/integrations-e2e/`
//! - macOS: `~/Library/Application Support/integrations-e2e/`
//! - Windows: `%APPDATA%\integrations-e2e\`

use std::io;
use std::path::PathBuf;

/// Name used for the config and data directories
const APP_NAME: &str = "integrations-e2e";

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the path to the log directory
pub fn log_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.data_dir().join("logs"))
}

/// Default directory for failure screenshots
pub fn screenshot_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.data_dir().join("screenshots"))
}

/// Ensure a directory exists, returning it
pub fn ensure_dir(dir: PathBuf) -> io::Result<PathBuf> {
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }
    Ok(dir)
}

/// Turn a scenario name into a file-name-safe slug
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}
