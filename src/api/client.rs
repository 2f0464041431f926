//! REST client for the server's administrative and provisioning endpoints

use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::common::{join_url, random_id, Error, Result};

use super::merge_settings;
use super::types::{
    AuthSession, Channel, ChannelMemberRequest, CreateChannelRequest, CreateTeamRequest,
    CreateUserRequest, LoginRequest, SessionCookie, SetupFixture, Team, TeamMemberRequest, User,
};

/// Password for users created by `init_setup`
const FIXTURE_PASSWORD: &str = "passwd";

/// Longest response body echoed back in an error
const MAX_ERROR_BODY: usize = 300;

/// Client for the server's REST API (v4)
pub struct ServerClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ServerClient {
    /// Create a client for the server at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("integrations-e2e")
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Log in and remember the bearer token for later calls
    pub async fn login(&mut self, username: &str, password: &str) -> Result<AuthSession> {
        let path = "/api/v4/users/login";
        tracing::debug!(username, "POST {}", path);

        let response = self
            .http
            .post(join_url(&self.base_url, path))
            .header("X-Requested-With", "XMLHttpRequest")
            .json(&LoginRequest {
                login_id: username,
                password,
            })
            .send()
            .await
            .map_err(|e| Error::api_request("POST", path, e))?;

        if !response.status().is_success() {
            return Err(Error::LoginFailed(format!(
                "server answered {}",
                response.status()
            )));
        }

        let token = response
            .headers()
            .get("Token")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| Error::LoginFailed("response has no Token header".to_string()))?;

        let mut cookies: Vec<SessionCookie> = response
            .cookies()
            .map(|c| SessionCookie {
                name: c.name().to_string(),
                value: c.value().to_string(),
            })
            .collect();

        let user: User = response
            .json()
            .await
            .map_err(|e| Error::api_request("POST", path, e))?;

        // Servers behind some proxies strip Set-Cookie. The token and user id
        // load pages, but there is no MMCSRF to rebuild, so the webapp's
        // writes rely on the server accepting X-Requested-With instead.
        if cookies.is_empty() {
            tracing::warn!("Login set no cookies; browser session has no CSRF token");
            cookies.push(SessionCookie {
                name: "MMAUTHTOKEN".to_string(),
                value: token.clone(),
            });
            cookies.push(SessionCookie {
                name: "MMUSERID".to_string(),
                value: user.id.clone(),
            });
        }

        self.token = Some(token.clone());
        tracing::info!(user = %user.username, "Logged in");

        Ok(AuthSession {
            token,
            user,
            cookies,
        })
    }

    /// Fetch the full server configuration
    pub async fn get_config(&self) -> Result<Value> {
        self.request(Method::GET, "/api/v4/config", None::<&()>).await
    }

    /// Deep-merge `patch` into the current config and write it back
    ///
    /// The server replaces the whole document on PUT, so unrelated settings
    /// must be sent back unchanged.
    pub async fn update_config(&self, patch: &Value) -> Result<Value> {
        let mut config = self.get_config().await?;
        merge_settings(&mut config, patch);
        let updated: Value = self
            .request(Method::PUT, "/api/v4/config", Some(&config))
            .await?;
        tracing::info!("Server configuration updated");
        Ok(updated)
    }

    /// Create an open team
    pub async fn create_team(&self, name: &str, display_name: &str) -> Result<Team> {
        self.request(
            Method::POST,
            "/api/v4/teams",
            Some(&CreateTeamRequest {
                name,
                display_name,
                team_type: "O",
            }),
        )
        .await
    }

    /// Create an open channel in a team
    pub async fn create_channel(
        &self,
        team_id: &str,
        name: &str,
        display_name: &str,
    ) -> Result<Channel> {
        self.request(
            Method::POST,
            "/api/v4/channels",
            Some(&CreateChannelRequest {
                team_id,
                name,
                display_name,
                channel_type: "O",
            }),
        )
        .await
    }

    /// Create a user
    pub async fn create_user(&self, username: &str, email: &str, password: &str) -> Result<User> {
        self.request(
            Method::POST,
            "/api/v4/users",
            Some(&CreateUserRequest {
                email,
                username,
                password,
            }),
        )
        .await
    }

    /// Add a user to a team
    pub async fn add_team_member(&self, team_id: &str, user_id: &str) -> Result<()> {
        let path = format!("/api/v4/teams/{}/members", team_id);
        let _: Value = self
            .request(
                Method::POST,
                &path,
                Some(&TeamMemberRequest { team_id, user_id }),
            )
            .await?;
        Ok(())
    }

    /// Add a user to a channel
    pub async fn add_channel_member(&self, channel_id: &str, user_id: &str) -> Result<()> {
        let path = format!("/api/v4/channels/{}/members", channel_id);
        let _: Value = self
            .request(Method::POST, &path, Some(&ChannelMemberRequest { user_id }))
            .await?;
        Ok(())
    }

    /// Provision a fresh team, channel and member user
    pub async fn init_setup(&self) -> Result<SetupFixture> {
        let id = random_id();

        let team = self
            .create_team(&format!("team-{}", id), &format!("Team {}", id))
            .await?;
        let channel = self
            .create_channel(&team.id, &format!("channel-{}", id), &format!("Channel {}", id))
            .await?;
        let user = self
            .create_user(
                &format!("user{}", id),
                &format!("user{}@sample.mattermost.com", id),
                FIXTURE_PASSWORD,
            )
            .await?;

        self.add_team_member(&team.id, &user.id).await?;
        self.add_channel_member(&channel.id, &user.id).await?;

        tracing::info!(team = %team.name, user = %user.username, "Provisioned test team");
        Ok(SetupFixture::new(team, channel, user))
    }

    async fn request<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!("{} {}", method, path);

        let mut builder = self
            .http
            .request(method.clone(), join_url(&self.base_url, path))
            .header("X-Requested-With", "XMLHttpRequest");
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::api_request(method.as_str(), path, e))?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let mut end = MAX_ERROR_BODY;
                while !body.is_char_boundary(end) {
                    end -= 1;
                }
                body.truncate(end);
                body.push_str("...");
            }
            return Err(Error::ApiStatus {
                method: method.to_string(),
                path: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| Error::api_request(method.as_str(), path, e))
    }
}
