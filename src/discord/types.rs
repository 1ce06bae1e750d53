//! Discord API payloads
//!
//! [`UserProfile`] keeps the fields the dashboard reads as typed members and
//! preserves everything else the API returns in [`UserProfile::extra`], so a
//! profile written to the session store is the API record verbatim.

use serde::{Deserialize, Serialize};
use std::fmt;

const CDN_BASE: &str = "https://cdn.discordapp.com";

/// The authenticated identity as returned by `GET /users/@me`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Snowflake identifier
    pub id: String,

    /// Account name
    #[serde(default)]
    pub username: String,

    /// Legacy four-digit tag; `"0"` for migrated accounts
    #[serde(default = "default_discriminator")]
    pub discriminator: String,

    /// Display name, when the user set one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_name: Option<String>,

    /// Avatar hash
    #[serde(default)]
    pub avatar: Option<String>,

    /// Premium tier code; 0-3 are known, anything else reads as no tier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premium_type: Option<i64>,

    /// Number of guilds the account can see, filled in after login
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_count: Option<usize>,

    /// Every other field of the API record
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_discriminator() -> String {
    "0".to_string()
}

impl UserProfile {
    /// `name#1234` for legacy tags, the bare name otherwise
    ///
    /// # Examples
    ///
    /// ```
    /// use velrath::discord::UserProfile;
    ///
    /// let mut profile: UserProfile =
    ///     serde_json::from_value(serde_json::json!({"id": "1", "username": "ava"})).unwrap();
    /// assert_eq!(profile.display_name(), "ava");
    ///
    /// profile.discriminator = "4242".to_string();
    /// assert_eq!(profile.display_name(), "ava#4242");
    /// ```
    pub fn display_name(&self) -> String {
        if self.discriminator != "0" && !self.discriminator.is_empty() {
            format!("{}#{}", self.username, self.discriminator)
        } else {
            self.username.clone()
        }
    }

    /// Uppercased first character of the username, used as a text avatar
    pub fn avatar_initial(&self) -> String {
        self.username
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }

    /// CDN URL of the avatar image, if the account has one
    pub fn avatar_url(&self) -> Option<String> {
        self.avatar
            .as_ref()
            .map(|hash| format!("{}/avatars/{}/{}.png", CDN_BASE, self.id, hash))
    }

    /// Premium tier, with unknown codes treated as no subscription
    pub fn premium_tier(&self) -> PremiumTier {
        PremiumTier::from_code(self.premium_type.unwrap_or(0))
    }
}

/// Nitro subscription tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PremiumTier {
    #[default]
    None,
    NitroClassic,
    Nitro,
    NitroBasic,
}

impl PremiumTier {
    /// Map an API tier code; anything outside 0-3 is [`PremiumTier::None`]
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::NitroClassic,
            2 => Self::Nitro,
            3 => Self::NitroBasic,
            _ => Self::None,
        }
    }

    /// Badge text shown on the dashboard
    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "Inactive",
            Self::NitroClassic => "Nitro Classic",
            Self::Nitro => "Nitro",
            Self::NitroBasic => "Nitro Basic",
        }
    }
}

impl fmt::Display for PremiumTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error body returned by the API on failure
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
