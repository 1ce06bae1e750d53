//! Host side of the bridge
//!
//! [`HostBridge`] keeps the window state, performs identity calls through
//! the [`DiscordClient`], and turns navigation and close requests into
//! [`HostEvent`]s for the shell loop that owns the pages.

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::bridge::{Bridge, Page};
use crate::discord::{DiscordClient, UserProfile};
use crate::error::{AuthError, Result, VelrathError};

/// Requests the shell loop acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// Tear down the current page and build `Page`
    Navigate(Page),
    /// The window was closed; the shell should exit
    Close,
}

/// Window flags tracked by the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowState {
    pub minimized: bool,
    pub maximized: bool,
    pub closed: bool,
}

/// Production bridge
#[derive(Debug)]
pub struct HostBridge {
    client: DiscordClient,
    window: Mutex<WindowState>,
    events: mpsc::UnboundedSender<HostEvent>,
}

impl HostBridge {
    /// Create a bridge and the receiver the shell loop drains
    pub fn new(client: DiscordClient) -> (Self, mpsc::UnboundedReceiver<HostEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let bridge = Self {
            client,
            window: Mutex::new(WindowState::default()),
            events,
        };
        (bridge, rx)
    }

    /// Current window flags
    pub fn window_state(&self) -> WindowState {
        *self.window()
    }

    fn window(&self) -> std::sync::MutexGuard<'_, WindowState> {
        self.window
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn send(&self, event: HostEvent) -> Result<()> {
        self.events
            .send(event)
            .map_err(|_| VelrathError::Bridge("Shell is no longer listening".to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl Bridge for HostBridge {
    async fn minimize(&self) -> Result<()> {
        let mut window = self.window();
        window.minimized = true;
        tracing::debug!("Window minimized");
        Ok(())
    }

    async fn maximize(&self) -> Result<()> {
        let mut window = self.window();
        window.minimized = false;
        window.maximized = !window.maximized;
        tracing::debug!(maximized = window.maximized, "Window maximize toggled");
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        {
            let mut window = self.window();
            if window.closed {
                return Ok(());
            }
            window.closed = true;
        }
        tracing::info!("Window closed");
        self.send(HostEvent::Close)
    }

    async fn navigate_to(&self, page: Page) -> Result<()> {
        if self.window().closed {
            return Err(VelrathError::Bridge(format!(
                "Cannot navigate to {} after the window closed",
                page
            ))
            .into());
        }
        tracing::info!(%page, "Navigating");
        self.send(HostEvent::Navigate(page))
    }

    async fn authenticate(&self, credential: &str) -> std::result::Result<UserProfile, AuthError> {
        tracing::debug!(credential_len = credential.len(), "Authenticating");
        self.client.authenticate(credential).await
    }
}
