use crate::discord::UserProfile;
use serde::{Deserialize, Serialize};

/// Well-known session store keys
pub mod keys {
    /// The credential, kept only when the user asked to be remembered
    pub const DISCORD_TOKEN: &str = "discord_token";
    /// Whether the credential should be prefilled on the login page
    pub const REMEMBER_TOKEN: &str = "remember_token";
    /// The last profile returned by the identity API
    pub const USER_DATA: &str = "user_data";
    /// Dashboard preference: account discoverability
    pub const DISCOVERABLE: &str = "velrath_discoverable";
    /// Dashboard preference: private mode
    pub const PRIVATE_MODE: &str = "private_mode";
}

/// Read-only view of what the session store currently holds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    /// Whether a credential is stored (the value itself is never exposed)
    pub token_stored: bool,
    /// The "remember" flag
    pub remember_token: bool,
    /// The stored profile
    pub user: Option<UserProfile>,
    /// Discoverability preference
    pub discoverable: bool,
    /// Private mode preference
    pub private_mode: bool,
}
