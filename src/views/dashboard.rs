//! Dashboard page
//!
//! Renders the stored profile, runs the uptime counter, and handles the
//! preference toggles and sidebar. Entering without a stored profile sends
//! the user back to the login page and populates nothing.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::bridge::{Bridge, Page};
use crate::config::UiTimings;
use crate::discord::{PremiumTier, UserProfile};
use crate::error::Result;
use crate::storage::{keys, SessionStore};
use crate::views::notifications::{NotificationCenter, Severity};
use crate::views::{PageTimers, View};

/// Profile fields as the dashboard shows them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
    pub greeting: String,
    pub display_name: String,
    pub avatar_initial: String,
    pub avatar_url: Option<String>,
    pub id_label: String,
    pub tier: PremiumTier,
    pub server_count: usize,
}

impl ProfileView {
    /// Badge text for the premium tier
    pub fn tier_label(&self) -> &'static str {
        self.tier.label()
    }
}

impl From<&UserProfile> for ProfileView {
    fn from(profile: &UserProfile) -> Self {
        Self {
            greeting: profile.username.clone(),
            display_name: profile.display_name(),
            avatar_initial: profile.avatar_initial(),
            avatar_url: profile.avatar_url(),
            id_label: format!("ID: {}", profile.id),
            tier: profile.premium_tier(),
            server_count: profile.guild_count.unwrap_or(0),
        }
    }
}

/// Time since the dashboard was built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Uptime {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl Uptime {
    /// Split whole seconds into days, hours, minutes and seconds
    ///
    /// # Examples
    ///
    /// ```
    /// use velrath::views::Uptime;
    ///
    /// assert_eq!(Uptime::from_secs(90_061).to_string(), "01:01:01:01");
    /// ```
    pub fn from_secs(total: u64) -> Self {
        Self {
            days: total / 86_400,
            hours: (total % 86_400) / 3_600,
            minutes: (total % 3_600) / 60,
            seconds: total % 60,
        }
    }

    pub fn from_duration(elapsed: Duration) -> Self {
        Self::from_secs(elapsed.as_secs())
    }
}

impl fmt::Display for Uptime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:02}",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// Sidebar entries; exactly one is active at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Section {
    #[default]
    Overview,
    Accounts,
    Servers,
    Commands,
    Settings,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Overview,
        Section::Accounts,
        Section::Servers,
        Section::Commands,
        Section::Settings,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Section::Overview => "overview",
            Section::Accounts => "accounts",
            Section::Servers => "servers",
            Section::Commands => "commands",
            Section::Settings => "settings",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Section::Overview => "Overview",
            Section::Accounts => "Accounts",
            Section::Servers => "Servers",
            Section::Commands => "Commands",
            Section::Settings => "Settings",
        }
    }

    /// Look a section up by slug, ignoring case
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.slug().eq_ignore_ascii_case(slug.trim()))
    }
}

fn enabled_label(enabled: bool) -> &'static str {
    if enabled {
        "Enabled"
    } else {
        "Disabled"
    }
}

/// Dashboard page controller
pub struct DashboardController {
    bridge: Arc<dyn Bridge>,
    store: Arc<SessionStore>,
    profile: Option<ProfileView>,
    started: Instant,
    uptime: watch::Sender<Uptime>,
    notifications: NotificationCenter,
    discoverable: bool,
    private_mode: bool,
    active_section: Section,
    timers: PageTimers,
}

impl DashboardController {
    /// Build the page from the stored profile
    ///
    /// Without a stored profile the login page is requested and the
    /// controller stays empty (see [`DashboardController::is_redirected`]).
    pub async fn load(
        bridge: Arc<dyn Bridge>,
        store: Arc<SessionStore>,
        timings: UiTimings,
    ) -> Result<Self> {
        let mut timers = PageTimers::new();
        let notifications = NotificationCenter::new(timings.notification_ttl, timers.token());
        let started = Instant::now();
        let (uptime, _) = watch::channel(Uptime::default());

        let profile = store.get::<UserProfile>(keys::USER_DATA).map(|p| ProfileView::from(&p));

        match &profile {
            Some(view) => {
                tracing::info!(user = %view.display_name, "Dashboard loaded");
                let ticker = uptime.clone();
                timers.every(timings.uptime_tick, move || {
                    ticker.send_replace(Uptime::from_duration(started.elapsed()));
                });
            }
            None => {
                tracing::info!("No stored profile, returning to login");
                bridge.navigate_to(Page::Login).await?;
            }
        }

        let discoverable = store.get(keys::DISCOVERABLE).unwrap_or(false);
        let private_mode = store.get(keys::PRIVATE_MODE).unwrap_or(false);

        Ok(Self {
            bridge,
            store,
            profile,
            started,
            uptime,
            notifications,
            discoverable,
            private_mode,
            active_section: Section::default(),
            timers,
        })
    }

    /// Whether the page sent the user back to login instead of rendering
    pub fn is_redirected(&self) -> bool {
        self.profile.is_none()
    }

    pub fn profile(&self) -> Option<&ProfileView> {
        self.profile.as_ref()
    }

    /// Time since the page was built
    pub fn uptime(&self) -> Uptime {
        Uptime::from_duration(self.started.elapsed())
    }

    /// The counter as published by the ticking timer
    pub fn subscribe_uptime(&self) -> watch::Receiver<Uptime> {
        self.uptime.subscribe()
    }

    pub fn discoverable(&self) -> bool {
        self.discoverable
    }

    pub fn private_mode(&self) -> bool {
        self.private_mode
    }

    /// Flip discoverability, store it, and announce it; returns the new value
    pub fn toggle_discoverable(&mut self) -> Result<bool> {
        let discoverable = !self.discoverable;
        self.store.set(keys::DISCOVERABLE, &discoverable)?;
        self.discoverable = discoverable;
        self.notifications.push(
            Severity::Success,
            format!("Velrath Discoverable: {}", enabled_label(self.discoverable)),
            "Settings",
        );
        Ok(self.discoverable)
    }

    /// Flip private mode, store it, and announce it; returns the new value
    pub fn toggle_private_mode(&mut self) -> Result<bool> {
        let private_mode = !self.private_mode;
        self.store.set(keys::PRIVATE_MODE, &private_mode)?;
        self.private_mode = private_mode;
        self.notifications.push(
            Severity::Info,
            format!("Private Mode: {}", enabled_label(self.private_mode)),
            "Settings",
        );
        Ok(self.private_mode)
    }

    pub fn active_section(&self) -> Section {
        self.active_section
    }

    /// Make `section` the active sidebar entry; returns the notification id
    pub fn select_section(&mut self, section: Section) -> u64 {
        self.active_section = section;
        tracing::debug!(section = section.slug(), "Sidebar selection");
        self.notifications.push(
            Severity::Info,
            format!("Navigated to {} section", section.label()),
            "Navigation",
        )
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    /// Go to the login page to sign in with another token
    pub async fn add_account(&self) -> Result<()> {
        self.bridge.navigate_to(Page::Login).await
    }

    /// Forget the stored credential and profile, then go to the login page
    pub async fn logout(&self) -> Result<()> {
        self.store.clear_session()?;
        tracing::info!("Logged out");
        self.bridge.navigate_to(Page::Login).await
    }
}

#[async_trait]
impl View for DashboardController {
    fn bridge(&self) -> &Arc<dyn Bridge> {
        &self.bridge
    }

    fn dispose(&mut self) {
        self.timers.cancel();
        tracing::debug!("Dashboard page disposed");
    }

    fn is_disposed(&self) -> bool {
        self.timers.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{BridgeCall, RecordingBridge};
    use crate::test_utils::{block_store_writes, sample_profile, temp_store};

    fn store_with_profile(premium: i64) -> Arc<SessionStore> {
        let store = Arc::new(SessionStore::in_memory());
        store.set(keys::USER_DATA, &sample_profile(premium)).unwrap();
        store
    }

    async fn dashboard(store: Arc<SessionStore>) -> (DashboardController, Arc<RecordingBridge>) {
        let bridge = Arc::new(RecordingBridge::new());
        let controller = DashboardController::load(bridge.clone(), store, UiTimings::default())
            .await
            .unwrap();
        (controller, bridge)
    }

    #[test]
    fn test_uptime_format() {
        assert_eq!(Uptime::from_secs(0).to_string(), "00:00:00:00");
        assert_eq!(Uptime::from_secs(90_061).to_string(), "01:01:01:01");
        assert_eq!(Uptime::from_secs(59).to_string(), "00:00:00:59");
        assert_eq!(
            Uptime::from_secs(100 * 86_400 + 3_599).to_string(),
            "100:00:59:59"
        );
    }

    #[test]
    fn test_section_lookup() {
        assert_eq!(Section::from_slug("Servers"), Some(Section::Servers));
        assert_eq!(Section::from_slug(" settings "), Some(Section::Settings));
        assert_eq!(Section::from_slug("nowhere"), None);
    }

    #[tokio::test]
    async fn test_missing_profile_redirects_to_login() {
        let (controller, bridge) = dashboard(Arc::new(SessionStore::in_memory())).await;
        assert!(controller.is_redirected());
        assert!(controller.profile().is_none());
        assert_eq!(bridge.calls(), vec![BridgeCall::Navigate(Page::Login)]);
    }

    #[tokio::test]
    async fn test_profile_is_rendered() {
        let (controller, bridge) = dashboard(store_with_profile(2)).await;
        let view = controller.profile().unwrap();

        assert_eq!(view.greeting, "ava");
        assert_eq!(view.display_name, "ava#0420");
        assert_eq!(view.avatar_initial, "A");
        assert_eq!(view.id_label, "ID: 1234");
        assert_eq!(view.tier_label(), "Nitro");
        assert_eq!(view.server_count, 12);
        assert!(bridge.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_tier_renders_inactive() {
        let (controller, _) = dashboard(store_with_profile(9)).await;
        assert_eq!(controller.profile().unwrap().tier_label(), "Inactive");
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_value_and_emits_two_notifications() {
        let store = store_with_profile(0);
        store.set(keys::DISCOVERABLE, &false).unwrap();
        let (mut controller, _) = dashboard(store.clone()).await;

        assert!(controller.toggle_discoverable().unwrap());
        assert_eq!(store.get::<bool>(keys::DISCOVERABLE), Some(true));
        assert!(!controller.toggle_discoverable().unwrap());
        assert_eq!(store.get::<bool>(keys::DISCOVERABLE), Some(false));

        let list = controller.notifications().list();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].message, "Velrath Discoverable: Disabled");
        assert_eq!(list[1].message, "Velrath Discoverable: Enabled");
        assert_eq!(list[0].severity, Severity::Success);
        assert_eq!(list[0].source, "Settings");
    }

    #[tokio::test]
    async fn test_failed_toggle_changes_nothing() {
        let (store, _dir) = temp_store();
        store.set(keys::USER_DATA, &sample_profile(0)).unwrap();
        let store = Arc::new(store);
        let (mut controller, _) = dashboard(store.clone()).await;
        block_store_writes(&store);

        assert!(controller.toggle_discoverable().is_err());
        assert!(controller.toggle_private_mode().is_err());

        assert!(!controller.discoverable());
        assert!(!controller.private_mode());
        assert!(store.get::<bool>(keys::DISCOVERABLE).is_none());
        assert!(store.get::<bool>(keys::PRIVATE_MODE).is_none());
        assert!(controller.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_private_mode_restored_from_store() {
        let store = store_with_profile(0);
        store.set(keys::PRIVATE_MODE, &true).unwrap();
        let (mut controller, _) = dashboard(store.clone()).await;

        assert!(controller.private_mode());
        assert!(!controller.toggle_private_mode().unwrap());
        let list = controller.notifications().list();
        assert_eq!(list[0].message, "Private Mode: Disabled");
        assert_eq!(list[0].severity, Severity::Info);
    }

    #[tokio::test]
    async fn test_sidebar_single_selection() {
        let (mut controller, _) = dashboard(store_with_profile(0)).await;
        assert_eq!(controller.active_section(), Section::Overview);

        controller.select_section(Section::Servers);
        controller.select_section(Section::Settings);
        assert_eq!(controller.active_section(), Section::Settings);

        let messages: Vec<String> = controller
            .notifications()
            .list()
            .into_iter()
            .map(|n| n.message)
            .collect();
        assert_eq!(
            messages,
            vec![
                "Navigated to Settings section".to_string(),
                "Navigated to Servers section".to_string(),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_uptime_ticks_until_disposed() {
        let (mut controller, _) = dashboard(store_with_profile(0)).await;
        let rx = controller.subscribe_uptime();

        tokio::time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(rx.borrow().to_string(), "00:00:00:03");

        controller.dispose();
        assert!(controller.is_disposed());
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(rx.borrow().to_string(), "00:00:00:03");
    }

    #[tokio::test(start_paused = true)]
    async fn test_notifications_expire() {
        let (mut controller, _) = dashboard(store_with_profile(0)).await;
        controller.select_section(Section::Accounts);
        assert_eq!(controller.notifications().len(), 1);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(controller.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let store = store_with_profile(0);
        store.set(keys::DISCORD_TOKEN, "abc").unwrap();
        let (controller, bridge) = dashboard(store.clone()).await;

        controller.logout().await.unwrap();
        assert!(!store.contains(keys::USER_DATA));
        assert!(!store.contains(keys::DISCORD_TOKEN));
        assert_eq!(bridge.navigations(), vec![Page::Login]);
    }

    #[tokio::test]
    async fn test_failed_logout_stays_on_dashboard() {
        let (store, _dir) = temp_store();
        store.set(keys::DISCORD_TOKEN, "abc").unwrap();
        store.set(keys::USER_DATA, &sample_profile(0)).unwrap();
        let store = Arc::new(store);
        let (controller, bridge) = dashboard(store.clone()).await;
        block_store_writes(&store);

        assert!(controller.logout().await.is_err());
        assert!(store.contains(keys::DISCORD_TOKEN));
        assert!(controller.profile().is_some());
        assert!(bridge.navigations().is_empty());
    }

    #[tokio::test]
    async fn test_add_account_keeps_session() {
        let store = store_with_profile(0);
        let (controller, bridge) = dashboard(store.clone()).await;

        controller.add_account().await.unwrap();
        assert!(store.contains(keys::USER_DATA));
        assert_eq!(bridge.navigations(), vec![Page::Login]);
    }

    #[tokio::test]
    async fn test_title_bar_goes_through_bridge() {
        let (controller, bridge) = dashboard(store_with_profile(0)).await;
        controller.minimize().await.unwrap();
        controller.maximize().await.unwrap();
        controller.close().await.unwrap();
        assert_eq!(
            bridge.calls(),
            vec![BridgeCall::Minimize, BridgeCall::Maximize, BridgeCall::Close]
        );
    }
}
