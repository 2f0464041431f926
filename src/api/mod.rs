//! Server API access
//!
//! The runner talks to the server directly for everything that is not the
//! subject of a scenario: admin login, feature-flag configuration and
//! provisioning of the team the scenarios run in.

mod client;
pub mod types;

pub use client::ServerClient;
pub use types::{AuthSession, Channel, SessionCookie, SetupFixture, Team, User};

use serde_json::Value;

/// Deep-merge `patch` into `base`
///
/// Objects merge key by key; any other value in `patch` replaces the one in
/// `base`.
pub fn merge_settings(base: &mut Value, patch: &Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(key) {
                    Some(existing) => merge_settings(existing, value),
                    None => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, patch) => *base = patch.clone(),
    }
}
