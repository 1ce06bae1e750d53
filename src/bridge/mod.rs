//! Bridge between the pages and the host
//!
//! The pages never touch the window, the navigation machinery or the
//! network directly. They are handed an `Arc<dyn Bridge>` and may only do
//! what the trait offers:
//!
//! - window commands: [`Bridge::minimize`], [`Bridge::maximize`], [`Bridge::close`]
//! - page changes: [`Bridge::navigate_to`]
//! - identity: [`Bridge::authenticate`]
//!
//! [`HostBridge`] is the production implementation. [`RecordingBridge`]
//! records calls and returns a scripted identity result, for tests and for
//! driving the pages without a network.

use crate::discord::UserProfile;
use crate::error::{AuthError, Result};
use async_trait::async_trait;
use std::fmt;

pub mod host;
pub mod recording;

pub use host::{HostBridge, HostEvent, WindowState};
pub use recording::{BridgeCall, RecordingBridge};

/// Navigation destinations
///
/// The splash page is the entry point and can never be navigated back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Login,
    Dashboard,
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Page::Login => f.write_str("login"),
            Page::Dashboard => f.write_str("dashboard"),
        }
    }
}

/// Capabilities the host grants to a page
#[async_trait]
pub trait Bridge: Send + Sync {
    /// Minimize the window
    async fn minimize(&self) -> Result<()>;

    /// Maximize the window, or restore it when already maximized
    async fn maximize(&self) -> Result<()>;

    /// Close the window
    async fn close(&self) -> Result<()>;

    /// Replace the current page with `page`
    ///
    /// Nothing is carried across; whatever the next page needs must already
    /// be in the session store.
    async fn navigate_to(&self, page: Page) -> Result<()>;

    /// Validate `credential` against the identity API
    ///
    /// Never fails with a transport error: every failure arrives as an
    /// [`AuthError`] with a message fit for display.
    async fn authenticate(&self, credential: &str) -> std::result::Result<UserProfile, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_display() {
        assert_eq!(Page::Login.to_string(), "login");
        assert_eq!(Page::Dashboard.to_string(), "dashboard");
    }

    #[test]
    fn test_bridge_is_object_safe() {
        fn assert_object_safe(_: Option<&dyn Bridge>) {}
        assert_object_safe(None);
    }
}
