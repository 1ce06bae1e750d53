//! Discord REST API client
//!
//! Only the two endpoints the login flow needs are implemented: the profile
//! lookup (`GET /users/@me`) and the guild listing (`GET /users/@me/guilds`).
//!
//! A token is tried with each [`CredentialFraming`] in [`FRAMING_ORDER`] and
//! the first framing the API accepts wins. The guild count is best effort.
//! Every failure reaching [`DiscordClient::authenticate`] is folded into an
//! [`AuthError`] so callers never see transport errors.

use crate::config::DiscordConfig;
use crate::error::{AuthError, Result, VelrathError};
use reqwest::{Client, StatusCode};
use std::time::Duration;

pub mod types;
pub use types::{PremiumTier, UserProfile};

use serde::de::IgnoredAny;
use types::ApiErrorBody;

/// How the token is presented in the `Authorization` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialFraming {
    /// The token verbatim, as user accounts send it
    User,
    /// `Bot <token>`, as bot accounts send it
    Bot,
}

impl CredentialFraming {
    /// Header value for `token` in this framing
    ///
    /// # Examples
    ///
    /// ```
    /// use velrath::discord::CredentialFraming;
    ///
    /// assert_eq!(CredentialFraming::User.authorization("abc"), "abc");
    /// assert_eq!(CredentialFraming::Bot.authorization("abc"), "Bot abc");
    /// ```
    pub fn authorization(&self, token: &str) -> String {
        match self {
            Self::User => token.to_string(),
            Self::Bot => format!("Bot {}", token),
        }
    }
}

/// Framings tried by [`DiscordClient::authenticate`], in order
pub const FRAMING_ORDER: [CredentialFraming; 2] = [CredentialFraming::User, CredentialFraming::Bot];

/// HTTP client for the Discord API
#[derive(Debug, Clone)]
pub struct DiscordClient {
    client: Client,
    api_base: String,
}

impl DiscordClient {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    ///
    /// # Examples
    ///
    /// ```
    /// use velrath::config::DiscordConfig;
    /// use velrath::discord::DiscordClient;
    ///
    /// let client = DiscordClient::new(&DiscordConfig::default()).unwrap();
    /// assert_eq!(client.endpoint("users/@me"), "https://discord.com/api/v10/users/@me");
    /// ```
    pub fn new(config: &DiscordConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| VelrathError::Discord(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Initialized Discord client: api_base={}", config.api_base);

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Full URL for an API path
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    /// Validate `token` and return the profile it belongs to
    ///
    /// Tries each framing in [`FRAMING_ORDER`] until one is accepted, then
    /// enriches the profile with the guild count. When every framing fails
    /// the last failure is returned. A blank token fails without a request.
    pub async fn authenticate(
        &self,
        token: &str,
    ) -> std::result::Result<UserProfile, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::invalid_credential());
        }

        let mut last_error = AuthError::invalid_credential();
        for framing in FRAMING_ORDER {
            match self.fetch_current_user(token, framing).await {
                Ok(mut profile) => {
                    tracing::info!(user_id = %profile.id, ?framing, "Discord token accepted");
                    let guilds = match self.fetch_guild_count(token, framing).await {
                        Ok(count) => count,
                        Err(e) => {
                            tracing::warn!("Failed to fetch guild count: {}", e);
                            0
                        }
                    };
                    profile.guild_count = Some(guilds);
                    return Ok(profile);
                }
                Err(e) => {
                    tracing::debug!(?framing, "Discord token rejected: {}", e);
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    /// `GET /users/@me` with one framing
    pub async fn fetch_current_user(
        &self,
        token: &str,
        framing: CredentialFraming,
    ) -> std::result::Result<UserProfile, AuthError> {
        let response = self
            .client
            .get(self.endpoint("users/@me"))
            .header("Authorization", framing.authorization(token))
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Profile request failed: {}", e);
                AuthError::invalid_credential()
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(auth_error_from_body(status, &body));
        }

        response.json::<UserProfile>().await.map_err(|e| {
            tracing::warn!("Failed to parse profile: {}", e);
            AuthError::invalid_credential()
        })
    }

    /// `GET /users/@me/guilds` with one framing, returning the number of guilds
    pub async fn fetch_guild_count(&self, token: &str, framing: CredentialFraming) -> Result<usize> {
        let response = self
            .client
            .get(self.endpoint("users/@me/guilds"))
            .header("Authorization", framing.authorization(token))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VelrathError::Discord(format!(
                "Guild listing returned {}: {}",
                status, body
            ))
            .into());
        }

        let guilds: Vec<IgnoredAny> = response.json().await?;
        Ok(guilds.len())
    }
}

/// The API's `message` field when present, else the generic failure
fn auth_error_from_body(status: StatusCode, body: &str) -> AuthError {
    tracing::debug!("Discord returned error {}: {}", status, body);
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .map(AuthError::new)
        .unwrap_or_else(AuthError::invalid_credential)
}
