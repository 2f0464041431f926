//! Server API payloads
//!
//! Only the fields the runner reads are modeled; everything else in the
//! server's responses is ignored on deserialization.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A team as returned by the teams API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
}

/// A channel as returned by the channels API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub team_id: String,
}

/// A user as returned by the users API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

/// A cookie to copy from an API login into the browser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
}

/// Result of an admin login
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Bearer token from the `Token` response header
    pub token: String,
    /// The logged-in user
    pub user: User,
    /// Cookies the server set on login
    pub cookies: Vec<SessionCookie>,
}

/// Everything the provisioning step created
///
/// Read-only once setup is done; scenarios reach it through template
/// variables.
#[derive(Debug, Clone, Serialize)]
pub struct SetupFixture {
    pub team: Team,
    pub channel: Channel,
    pub user: User,
    pub town_square_url: String,
    pub off_topic_url: String,
}

impl SetupFixture {
    /// Build the fixture from created records
    pub fn new(team: Team, channel: Channel, user: User) -> Self {
        let town_square_url = format!("/{}/channels/town-square", team.name);
        let off_topic_url = format!("/{}/channels/off-topic", team.name);
        Self {
            team,
            channel,
            user,
            town_square_url,
            off_topic_url,
        }
    }

    /// Template variables exposed to scenario steps
    pub fn vars(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("team".to_string(), self.team.name.clone()),
            ("channel".to_string(), self.channel.name.clone()),
            ("user".to_string(), self.user.username.clone()),
            ("town_square".to_string(), self.town_square_url.clone()),
            ("off_topic".to_string(), self.off_topic_url.clone()),
        ])
    }
}

// === Request bodies ===

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub login_id: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateTeamRequest<'a> {
    pub name: &'a str,
    pub display_name: &'a str,
    #[serde(rename = "type")]
    pub team_type: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateChannelRequest<'a> {
    pub team_id: &'a str,
    pub name: &'a str,
    pub display_name: &'a str,
    #[serde(rename = "type")]
    pub channel_type: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateUserRequest<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct TeamMemberRequest<'a> {
    pub team_id: &'a str,
    pub user_id: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChannelMemberRequest<'a> {
    pub user_id: &'a str,
}
