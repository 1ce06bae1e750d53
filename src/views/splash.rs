//! Splash page
//!
//! Shows a short loading sequence and rotating tips, then decides where to
//! go: a stored credential with a stored profile is revalidated and leads to
//! the dashboard, anything else leads to the login page.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::bridge::{Bridge, Page};
use crate::config::UiTimings;
use crate::discord::UserProfile;
use crate::error::Result;
use crate::storage::{keys, SessionStore};
use crate::views::{PageTimers, View};

/// Status lines shown in order while loading
pub const LOADING_MESSAGES: [&str; 4] = [
    "Starting Velrath...",
    "Loading Discord API...",
    "Initializing features...",
    "Almost ready...",
];

/// Tips rotated under the loading bar; numbered from 1
pub const TIPS: [&str; 4] = [
    "Tick \"remember\" on the login page to skip it next time.",
    "Type /help on the dashboard to see every command.",
    "Notifications clear themselves after thirty seconds.",
    "Use /add-account to sign in with another token.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplashState {
    Loading,
    ValidatingSession,
    Routed(Page),
}

/// What the splash page currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplashStatus {
    pub state: SplashState,
    pub message: &'static str,
    /// 1-based index into [`TIPS`]
    pub tip: usize,
}

impl SplashStatus {
    pub fn tip_text(&self) -> &'static str {
        TIPS[self.tip.saturating_sub(1) % TIPS.len()]
    }
}

/// Splash page controller
pub struct SplashController {
    bridge: Arc<dyn Bridge>,
    store: Arc<SessionStore>,
    timings: UiTimings,
    status: watch::Sender<SplashStatus>,
    timers: PageTimers,
}

impl SplashController {
    /// Build the page and start the loading sequence and tip rotation
    pub fn start(bridge: Arc<dyn Bridge>, store: Arc<SessionStore>, timings: UiTimings) -> Self {
        let (status, _) = watch::channel(SplashStatus {
            state: SplashState::Loading,
            message: LOADING_MESSAGES[0],
            tip: 1,
        });
        let mut timers = PageTimers::new();

        let messages = status.clone();
        let step = timings.splash_step;
        timers.spawn(async move {
            for &message in LOADING_MESSAGES.iter().skip(1) {
                tokio::time::sleep(step).await;
                messages.send_modify(|s| s.message = message);
            }
        });

        let tips = status.clone();
        timers.every(timings.tip_rotation, move || {
            tips.send_modify(|s| s.tip = s.tip % TIPS.len() + 1);
        });

        tracing::debug!("Splash page started");

        Self {
            bridge,
            store,
            timings,
            status,
            timers,
        }
    }

    /// Watch the status as it changes
    pub fn subscribe(&self) -> watch::Receiver<SplashStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> SplashStatus {
        self.status.borrow().clone()
    }

    /// Wait out the loading delay, then route
    pub async fn run(&mut self) -> Result<Page> {
        tokio::time::sleep(self.timings.splash_total).await;
        self.resolve_session().await
    }

    /// Pick the next page from the stored session and ask the host to show it
    ///
    /// A rejected stored credential is forgotten together with its profile.
    /// Store write failures are logged and do not change the route; only a
    /// host that can no longer navigate is an error.
    pub async fn resolve_session(&mut self) -> Result<Page> {
        let token: Option<String> = self.store.get(keys::DISCORD_TOKEN);
        let profile: Option<UserProfile> = self.store.get(keys::USER_DATA);

        let page = match (token, profile) {
            (Some(token), Some(_)) if !token.trim().is_empty() => {
                self.set_state(SplashState::ValidatingSession);
                match self.bridge.authenticate(&token).await {
                    Ok(fresh) => {
                        tracing::info!(user_id = %fresh.id, "Stored session is still valid");
                        if let Err(e) = self.store.set(keys::USER_DATA, &fresh) {
                            tracing::warn!("Failed to refresh stored profile: {:#}", e);
                        }
                        Page::Dashboard
                    }
                    Err(e) => {
                        tracing::warn!("Stored session rejected: {}", e);
                        if let Err(e) = self.store.clear_session() {
                            tracing::warn!("Failed to clear rejected session: {:#}", e);
                        }
                        Page::Login
                    }
                }
            }
            _ => {
                tracing::debug!("No stored session");
                Page::Login
            }
        };

        self.set_state(SplashState::Routed(page));
        self.bridge.navigate_to(page).await?;
        Ok(page)
    }

    fn set_state(&self, state: SplashState) {
        self.status.send_modify(|s| s.state = state);
    }
}

#[async_trait]
impl View for SplashController {
    fn bridge(&self) -> &Arc<dyn Bridge> {
        &self.bridge
    }

    fn dispose(&mut self) {
        self.timers.cancel();
        tracing::debug!("Splash page disposed");
    }

    fn is_disposed(&self) -> bool {
        self.timers.is_cancelled()
    }
}
