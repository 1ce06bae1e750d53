//! In-process bridge that records calls
//!
//! [`RecordingBridge`] answers `authenticate` from a scripted result and
//! keeps every call in order, so tests can assert on what a page asked the
//! host to do without a window or a network.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use velrath::bridge::{Bridge, BridgeCall, Page, RecordingBridge};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bridge = Arc::new(RecordingBridge::new());
//! bridge.navigate_to(Page::Login).await.unwrap();
//! assert_eq!(bridge.calls(), vec![BridgeCall::Navigate(Page::Login)]);
//! # }
//! ```

use std::sync::Mutex;

use async_trait::async_trait;

use crate::bridge::{Bridge, Page};
use crate::discord::UserProfile;
use crate::error::{AuthError, Result};

/// One recorded bridge call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeCall {
    Minimize,
    Maximize,
    Close,
    Navigate(Page),
    /// The credential exactly as the page passed it
    Authenticate(String),
}

/// Bridge that records calls and replays a scripted identity result
#[derive(Debug)]
pub struct RecordingBridge {
    calls: Mutex<Vec<BridgeCall>>,
    auth_result: Mutex<std::result::Result<UserProfile, AuthError>>,
}

impl RecordingBridge {
    /// A bridge whose `authenticate` fails with the generic message
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            auth_result: Mutex::new(Err(AuthError::invalid_credential())),
        }
    }

    /// A bridge whose `authenticate` returns `profile`
    pub fn accepting(profile: UserProfile) -> Self {
        let bridge = Self::new();
        bridge.set_auth_result(Ok(profile));
        bridge
    }

    /// A bridge whose `authenticate` fails with `message`
    pub fn rejecting(message: &str) -> Self {
        let bridge = Self::new();
        bridge.set_auth_result(Err(AuthError::new(message)));
        bridge
    }

    /// Replace the scripted identity result
    pub fn set_auth_result(&self, result: std::result::Result<UserProfile, AuthError>) {
        *self
            .auth_result
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = result;
    }

    /// All calls so far, oldest first
    pub fn calls(&self) -> Vec<BridgeCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Navigation targets requested so far
    pub fn navigations(&self) -> Vec<Page> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BridgeCall::Navigate(page) => Some(page),
                _ => None,
            })
            .collect()
    }

    /// Number of `authenticate` calls so far
    pub fn auth_attempts(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, BridgeCall::Authenticate(_)))
            .count()
    }

    fn record(&self, call: BridgeCall) {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(call);
    }
}

impl Default for RecordingBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Bridge for RecordingBridge {
    async fn minimize(&self) -> Result<()> {
        self.record(BridgeCall::Minimize);
        Ok(())
    }

    async fn maximize(&self) -> Result<()> {
        self.record(BridgeCall::Maximize);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.record(BridgeCall::Close);
        Ok(())
    }

    async fn navigate_to(&self, page: Page) -> Result<()> {
        self.record(BridgeCall::Navigate(page));
        Ok(())
    }

    async fn authenticate(&self, credential: &str) -> std::result::Result<UserProfile, AuthError> {
        self.record(BridgeCall::Authenticate(credential.to_string()));
        self.auth_result
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}
