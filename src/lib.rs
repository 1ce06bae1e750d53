//! Velrath - Discord account shell library
//!
//! This library provides the core of Velrath: a small shell that signs in to
//! Discord with a token, keeps a local session, and shows the account
//! dashboard. Pages never talk to the network or the window directly; they
//! go through the [`bridge::Bridge`] capability they are constructed with.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `bridge`: The capability surface pages use, the host implementation, and a recording fake
//! - `discord`: Identity API client and profile types
//! - `storage`: JSON-file session store
//! - `views`: Splash, login and dashboard page controllers
//! - `commands`: Interactive shell and headless session commands
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use velrath::bridge::{Bridge, HostBridge};
//! use velrath::discord::DiscordClient;
//! use velrath::storage::SessionStore;
//! use velrath::views::SplashController;
//! use velrath::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let (host, _events) = HostBridge::new(DiscordClient::new(&config.discord)?);
//!     let bridge: Arc<dyn Bridge> = Arc::new(host);
//!     let store = Arc::new(SessionStore::new()?);
//!
//!     let mut splash = SplashController::start(bridge, store, config.timings());
//!     let page = splash.run().await?;
//!     println!("next page: {}", page);
//!     Ok(())
//! }
//! ```

pub mod bridge;
pub mod cli;
pub mod commands;
pub mod config;
pub mod discord;
pub mod error;
pub mod storage;
pub mod views;

// Re-export commonly used types
pub use bridge::{Bridge, HostBridge, Page};
pub use config::Config;
pub use discord::{DiscordClient, UserProfile};
pub use error::{AuthError, Result, VelrathError};
pub use storage::SessionStore;

#[cfg(test)]
pub mod test_utils;
