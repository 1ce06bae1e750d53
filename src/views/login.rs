//! Login page
//!
//! `Idle -> Submitting -> Idle (error shown) | NavigatedAway`
//!
//! A blank credential is rejected locally. Otherwise the credential goes to
//! the bridge; on success the profile (and, when asked, the credential) is
//! stored and the dashboard is requested. Errors are shown until the
//! configured delay passes or the input changes.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::bridge::{Bridge, Page};
use crate::config::UiTimings;
use crate::discord::UserProfile;
use crate::error::{Result, VelrathError};
use crate::storage::{keys, SessionStore};
use crate::views::{PageTimers, View};

/// Shown when the form is submitted with nothing in it
pub const EMPTY_TOKEN_MESSAGE: &str = "Please enter a Discord token";

/// Shown by the OAuth button, which is not wired to anything yet
pub const OAUTH_PENDING_MESSAGE: &str =
    "OAuth2 login is coming soon! Please use a Discord user token for now.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    Idle,
    Submitting,
    NavigatedAway,
}

/// Result of one submission
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    /// Rejected before any call was made
    Rejected(String),
    /// The identity API refused the credential
    Failed(String),
    /// Signed in; the dashboard has been requested
    LoggedIn(UserProfile),
}

#[derive(Debug, Default)]
struct ErrorBanner {
    message: Option<String>,
    generation: u64,
}

/// Login page controller
pub struct LoginController {
    bridge: Arc<dyn Bridge>,
    store: Arc<SessionStore>,
    timings: UiTimings,
    state: LoginState,
    token: String,
    remember: bool,
    masked: bool,
    error: Arc<Mutex<ErrorBanner>>,
    timers: PageTimers,
}

impl LoginController {
    /// Build the page, prefilling a remembered credential
    pub fn new(bridge: Arc<dyn Bridge>, store: Arc<SessionStore>, timings: UiTimings) -> Self {
        let mut controller = Self {
            bridge,
            store,
            timings,
            state: LoginState::Idle,
            token: String::new(),
            remember: false,
            masked: true,
            error: Arc::new(Mutex::new(ErrorBanner::default())),
            timers: PageTimers::new(),
        };
        controller.load_saved_token();
        controller
    }

    fn load_saved_token(&mut self) {
        let saved: Option<String> = self.store.get(keys::DISCORD_TOKEN);
        let remember: bool = self.store.get(keys::REMEMBER_TOKEN).unwrap_or(false);
        if let (Some(token), true) = (saved, remember) {
            tracing::debug!("Prefilled remembered token");
            self.token = token;
            self.remember = true;
        }
    }

    pub fn state(&self) -> LoginState {
        self.state
    }

    /// The form accepts input unless a submission is in flight
    pub fn input_enabled(&self) -> bool {
        self.state == LoginState::Idle
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Replace the credential field; editing clears any shown error
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = token.into();
        self.clear_error();
    }

    pub fn remember(&self) -> bool {
        self.remember
    }

    pub fn set_remember(&mut self, remember: bool) {
        self.remember = remember;
    }

    /// Flip between masked and plain display; returns whether it is now masked
    pub fn toggle_visibility(&mut self) -> bool {
        self.masked = !self.masked;
        self.masked
    }

    pub fn is_masked(&self) -> bool {
        self.masked
    }

    /// The credential as the field shows it
    pub fn displayed_token(&self) -> String {
        if self.masked {
            "\u{2022}".repeat(self.token.chars().count())
        } else {
            self.token.clone()
        }
    }

    /// The error currently shown, if any
    pub fn error(&self) -> Option<String> {
        self.banner().message.clone()
    }

    /// Submit the form
    ///
    /// # Errors
    ///
    /// Fails only when the session store or the host cannot be reached, or
    /// when the page has already been left. Refused credentials are an
    /// `Ok(LoginOutcome::Failed)`.
    pub async fn submit(&mut self) -> Result<LoginOutcome> {
        if self.state == LoginState::NavigatedAway {
            return Err(VelrathError::Bridge("Login page has already been left".to_string()).into());
        }

        let token = self.token.trim().to_string();
        if token.is_empty() {
            self.show_error(EMPTY_TOKEN_MESSAGE);
            return Ok(LoginOutcome::Rejected(EMPTY_TOKEN_MESSAGE.to_string()));
        }

        self.state = LoginState::Submitting;
        self.clear_error();

        match self.bridge.authenticate(&token).await {
            Ok(profile) => match self.complete_login(&token, &profile).await {
                Ok(()) => {
                    self.state = LoginState::NavigatedAway;
                    Ok(LoginOutcome::LoggedIn(profile))
                }
                Err(e) => {
                    self.state = LoginState::Idle;
                    Err(e)
                }
            },
            Err(e) => {
                tracing::info!("Login refused: {}", e);
                self.state = LoginState::Idle;
                self.show_error(e.message());
                Ok(LoginOutcome::Failed(e.message().to_string()))
            }
        }
    }

    async fn complete_login(&self, token: &str, profile: &UserProfile) -> Result<()> {
        if self.remember {
            self.store.set(keys::DISCORD_TOKEN, token)?;
            self.store.set(keys::REMEMBER_TOKEN, &true)?;
        } else {
            self.store.remove(keys::DISCORD_TOKEN)?;
            self.store.remove(keys::REMEMBER_TOKEN)?;
        }
        self.store.set(keys::USER_DATA, profile)?;

        tracing::info!(user_id = %profile.id, remember = self.remember, "Logged in");
        self.bridge.navigate_to(Page::Dashboard).await
    }

    /// The OAuth button
    pub fn oauth_login(&mut self) {
        self.show_error(OAUTH_PENDING_MESSAGE);
    }

    fn show_error(&mut self, message: &str) {
        let generation = {
            let mut banner = self.banner();
            banner.generation += 1;
            banner.message = Some(message.to_string());
            banner.generation
        };

        let error = Arc::clone(&self.error);
        self.timers.after(self.timings.error_clear, move || {
            let mut banner = error.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if banner.generation == generation {
                banner.message = None;
            }
        });
    }

    fn clear_error(&self) {
        self.banner().message = None;
    }

    fn banner(&self) -> MutexGuard<'_, ErrorBanner> {
        self.error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl View for LoginController {
    fn bridge(&self) -> &Arc<dyn Bridge> {
        &self.bridge
    }

    fn dispose(&mut self) {
        self.timers.cancel();
        tracing::debug!("Login page disposed");
    }

    fn is_disposed(&self) -> bool {
        self.timers.is_cancelled()
    }
}
