//! Common utilities shared by the CLI, API client and runner

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use error::{Error, Result};

/// Join a base URL and a path, tolerating slashes on either side.
/// Absolute URLs in `path` are returned unchanged.
pub fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let base = base.trim_end_matches('/');
    if path.is_empty() {
        return base.to_string();
    }
    format!("{}/{}", base, path.trim_start_matches('/'))
}

/// Six-character random id for names that must not collide between runs
///
/// Cut from the middle of a v4 UUID's simple form, so it is lowercase hex.
pub fn random_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id[21..27].to_string()
}

/// Current Unix time in milliseconds
pub fn timestamp_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
