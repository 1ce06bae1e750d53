//! Configuration management for Velrath
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, VelrathError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for Velrath
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Discord API client settings
    #[serde(default)]
    pub discord: DiscordConfig,
    /// Session store settings
    #[serde(default)]
    pub session: SessionConfig,
    /// Page timer settings
    #[serde(default)]
    pub ui: UiConfig,
}

/// Discord API client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Base URL of the versioned REST API (useful for tests and local mocks)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Optional request timeout in seconds
    ///
    /// Unset means requests wait indefinitely, so a hung call keeps the
    /// login page in its submitting state.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

fn default_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_user_agent() -> String {
    format!("velrath/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            user_agent: default_user_agent(),
            timeout_seconds: None,
        }
    }
}

/// Session store configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    /// Path of the session file; the platform data directory is used when unset
    #[serde(default)]
    pub store_path: Option<String>,
}

/// Timer settings for the splash, login and dashboard pages (milliseconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Interval between splash loading messages
    #[serde(default = "default_splash_step_ms")]
    pub splash_step_ms: u64,

    /// Delay before the splash page resolves the stored session
    #[serde(default = "default_splash_total_ms")]
    pub splash_total_ms: u64,

    /// Interval between splash tips
    #[serde(default = "default_tip_rotation_ms")]
    pub tip_rotation_ms: u64,

    /// How long a login error stays visible
    #[serde(default = "default_error_clear_ms")]
    pub error_clear_ms: u64,

    /// Lifetime of a dashboard notification
    #[serde(default = "default_notification_ttl_ms")]
    pub notification_ttl_ms: u64,

    /// Uptime counter tick
    #[serde(default = "default_uptime_tick_ms")]
    pub uptime_tick_ms: u64,
}

fn default_splash_step_ms() -> u64 {
    750
}

fn default_splash_total_ms() -> u64 {
    3_500
}

fn default_tip_rotation_ms() -> u64 {
    2_500
}

fn default_error_clear_ms() -> u64 {
    5_000
}

fn default_notification_ttl_ms() -> u64 {
    30_000
}

fn default_uptime_tick_ms() -> u64 {
    1_000
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            splash_step_ms: default_splash_step_ms(),
            splash_total_ms: default_splash_total_ms(),
            tip_rotation_ms: default_tip_rotation_ms(),
            error_clear_ms: default_error_clear_ms(),
            notification_ttl_ms: default_notification_ttl_ms(),
            uptime_tick_ms: default_uptime_tick_ms(),
        }
    }
}

/// Resolved page timings handed to the view controllers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiTimings {
    pub splash_step: Duration,
    pub splash_total: Duration,
    pub tip_rotation: Duration,
    pub error_clear: Duration,
    pub notification_ttl: Duration,
    pub uptime_tick: Duration,
}

impl From<&UiConfig> for UiTimings {
    fn from(ui: &UiConfig) -> Self {
        Self {
            splash_step: Duration::from_millis(ui.splash_step_ms),
            splash_total: Duration::from_millis(ui.splash_total_ms),
            tip_rotation: Duration::from_millis(ui.tip_rotation_ms),
            error_clear: Duration::from_millis(ui.error_clear_ms),
            notification_ttl: Duration::from_millis(ui.notification_ttl_ms),
            uptime_tick: Duration::from_millis(ui.uptime_tick_ms),
        }
    }
}

impl Default for UiTimings {
    fn default() -> Self {
        Self::from(&UiConfig::default())
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| VelrathError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| VelrathError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(api_base) = std::env::var("VELRATH_API_BASE") {
            tracing::debug!(api_base = %api_base, "Env override: VELRATH_API_BASE");
            self.discord.api_base = api_base;
        }

        if let Ok(timeout) = std::env::var("VELRATH_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.discord.timeout_seconds = Some(value);
            } else {
                tracing::warn!("Invalid VELRATH_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(store_path) = std::env::var("VELRATH_SESSION_STORE") {
            tracing::debug!(store_path = %store_path, "Env override: VELRATH_SESSION_STORE");
            self.session.store_path = Some(store_path);
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(store_path) = &cli.store_path {
            self.session.store_path = Some(store_path.clone());
        }
    }

    /// Page timings resolved from the `ui` section
    pub fn timings(&self) -> UiTimings {
        UiTimings::from(&self.ui)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.discord.api_base.trim().is_empty() {
            return Err(
                VelrathError::Config("discord.api_base cannot be empty".to_string()).into(),
            );
        }

        let parsed = url::Url::parse(&self.discord.api_base).map_err(|e| {
            VelrathError::Config(format!(
                "Invalid discord.api_base {}: {}",
                self.discord.api_base, e
            ))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(VelrathError::Config(format!(
                "discord.api_base must use http or https, got {}",
                parsed.scheme()
            ))
            .into());
        }

        if self.discord.timeout_seconds == Some(0) {
            return Err(VelrathError::Config(
                "discord.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        let timers = [
            ("ui.splash_step_ms", self.ui.splash_step_ms),
            ("ui.splash_total_ms", self.ui.splash_total_ms),
            ("ui.tip_rotation_ms", self.ui.tip_rotation_ms),
            ("ui.error_clear_ms", self.ui.error_clear_ms),
            ("ui.notification_ttl_ms", self.ui.notification_ttl_ms),
            ("ui.uptime_tick_ms", self.ui.uptime_tick_ms),
        ];
        for (name, value) in timers {
            if value == 0 {
                return Err(
                    VelrathError::Config(format!("{} must be greater than 0", name)).into(),
                );
            }
        }

        Ok(())
    }
}
