//! Command-line interface definition for Velrath
//!
//! This module defines the CLI structure using clap's derive API,
//! providing the interactive shell plus headless session commands.

use clap::{Parser, Subcommand};

/// Velrath - Discord account shell
///
/// Sign in with a Discord token, keep a local session, and browse the
/// account dashboard from the terminal.
#[derive(Parser, Debug, Clone)]
#[command(name = "velrath")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the session store file
    #[arg(long)]
    pub store_path: Option<String>,

    /// Command to execute (defaults to the interactive shell)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for Velrath
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the interactive shell (splash, login, dashboard)
    Run,

    /// Sign in without the interactive shell
    Login {
        /// Discord token to authenticate with
        #[arg(short, long, env = "VELRATH_TOKEN", hide_env_values = true)]
        token: String,

        /// Keep the token in the session store for the next start
        #[arg(short, long)]
        remember: bool,
    },

    /// Forget the stored token and profile
    Logout,

    /// Show the stored session
    Status {
        /// Print the stored session as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The command to run, falling back to the interactive shell
    pub fn command_or_default(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Run)
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            store_path: None,
            command: None,
        }
    }
}
