//! Velrath - Discord account shell
//!
#![doc = "Velrath - Discord account shell"]
#![doc = "Main entry point for the Velrath application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use velrath::cli::{Cli, Commands};
use velrath::commands;
use velrath::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse first so --verbose can pick the log level
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command_or_default() {
        Commands::Run => {
            tracing::info!("Starting Velrath");
            commands::shell::run_shell(config).await?;
            Ok(())
        }
        Commands::Login { token, remember } => {
            tracing::info!("Starting headless login");
            if remember {
                tracing::debug!("Token will be remembered");
            }
            commands::session::login(config, token, remember).await?;
            Ok(())
        }
        Commands::Logout => {
            commands::session::logout(&config)?;
            Ok(())
        }
        Commands::Status { json } => {
            commands::session::status(&config, json)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "velrath=debug"
    } else {
        "velrath=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
