/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes two top-level command modules:

- `shell`   - Interactive shell (splash, login, dashboard)
- `session` - Headless login, logout and status

Both build the same host bridge and page controllers the interactive shell
uses; the headless commands simply never show a prompt.
*/

use crate::bridge::{Bridge, HostBridge, HostEvent, Page};
use crate::commands::shell_commands::{
    parse_dashboard_command, parse_login_command, print_dashboard_help, print_login_help,
    DashboardCommand, LoginCommand, WindowCommand,
};
use crate::config::{Config, UiTimings};
use crate::discord::DiscordClient;
use crate::error::{AuthError, Result, VelrathError};
use crate::storage::{SessionStore, StoredSession};
use crate::views::{
    DashboardController, LoginController, LoginOutcome, Notification, Severity,
    SplashController, SplashState, SplashStatus, View,
};
use std::sync::Arc;

// Prompt command parser for the login and dashboard pages
pub mod shell_commands;

/// Open the session store named by the configuration, or the default one
pub fn open_store(config: &Config) -> Result<SessionStore> {
    match &config.session.store_path {
        Some(path) => SessionStore::new_with_path(path),
        None => SessionStore::new(),
    }
}

// Interactive shell
pub mod shell {
    //! Interactive shell.
    //!
    //! Shows the splash page, then follows host events: every navigation
    //! disposes the current page controller and builds the next one from
    //! scratch. Closing the window (`/quit`, Ctrl-C or Ctrl-D) ends the loop.

    use super::*;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;
    use tokio::sync::mpsc::UnboundedReceiver;

    /// Start the interactive shell
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    pub async fn run_shell(config: Config) -> Result<()> {
        tracing::info!("Starting interactive shell");

        let store = Arc::new(open_store(&config)?);
        let client = DiscordClient::new(&config.discord)?;
        let (host, events) = HostBridge::new(client);
        let host = Arc::new(host);
        let bridge: Arc<dyn Bridge> = host.clone();

        let mut shell = Shell {
            host,
            bridge,
            store,
            timings: config.timings(),
            events,
            editor: DefaultEditor::new()?,
        };
        shell.run().await
    }

    struct Shell {
        host: Arc<HostBridge>,
        bridge: Arc<dyn Bridge>,
        store: Arc<SessionStore>,
        timings: UiTimings,
        events: UnboundedReceiver<HostEvent>,
        editor: DefaultEditor,
    }

    impl Shell {
        async fn run(&mut self) -> Result<()> {
            let mut event = self.splash_page().await?;
            loop {
                tracing::debug!(?event, "Host event");
                event = match event {
                    HostEvent::Close => break,
                    HostEvent::Navigate(Page::Login) => self.login_page().await?,
                    HostEvent::Navigate(Page::Dashboard) => self.dashboard_page().await?,
                };
            }
            println!("{}", "Goodbye!".cyan());
            Ok(())
        }

        async fn next_event(&mut self) -> Result<HostEvent> {
            self.events
                .recv()
                .await
                .ok_or_else(|| VelrathError::Bridge("Host event channel closed".to_string()).into())
        }

        fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
            let editor = &mut self.editor;
            match tokio::task::block_in_place(|| editor.readline(prompt)) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = editor.add_history_entry(line.as_str());
                    }
                    Ok(Some(line))
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
                Err(e) => Err(VelrathError::from(e).into()),
            }
        }

        async fn splash_page(&mut self) -> Result<HostEvent> {
            print_banner("Velrath");

            let mut splash =
                SplashController::start(self.bridge.clone(), self.store.clone(), self.timings);
            let mut status = splash.subscribe();
            let mut shown = status.borrow_and_update().clone();
            print_splash_status(None, &shown);

            let routed = {
                let run = splash.run();
                tokio::pin!(run);
                loop {
                    tokio::select! {
                        result = &mut run => break result,
                        changed = status.changed() => {
                            if changed.is_err() {
                                continue;
                            }
                            let current = status.borrow_and_update().clone();
                            print_splash_status(Some(&shown), &current);
                            shown = current;
                        }
                    }
                }
            };
            splash.dispose();

            let page = routed?;
            tracing::debug!(%page, "Splash finished");
            self.next_event().await
        }

        async fn login_page(&mut self) -> Result<HostEvent> {
            let mut login =
                LoginController::new(self.bridge.clone(), self.store.clone(), self.timings);
            print_login_banner(&login);

            loop {
                let prompt = format!("{} ", "token>".cyan());
                match self.read_line(&prompt)? {
                    None => login.close().await?,
                    Some(line) => match parse_login_command(&line) {
                        Ok(LoginCommand::Submit(token)) => {
                            login.set_token(token);
                            submit(&mut login).await;
                        }
                        Ok(LoginCommand::SubmitCurrent) => submit(&mut login).await,
                        Ok(LoginCommand::Remember(value)) => {
                            let remember = value.unwrap_or(!login.remember());
                            login.set_remember(remember);
                            println!("Remember token: {}", on_off(remember));
                        }
                        Ok(LoginCommand::ToggleVisibility) => {
                            login.toggle_visibility();
                            println!("Token: {}", login.displayed_token());
                        }
                        Ok(LoginCommand::OAuth) => {
                            login.oauth_login();
                            if let Some(message) = login.error() {
                                println!("{}", message.yellow());
                            }
                        }
                        Ok(LoginCommand::Window(command)) => {
                            window_command(&login, &self.host, command, print_login_help).await?
                        }
                        Err(e) => eprintln!("{}", e.to_string().red()),
                    },
                }

                if let Ok(event) = self.events.try_recv() {
                    login.dispose();
                    return Ok(event);
                }
            }
        }

        async fn dashboard_page(&mut self) -> Result<HostEvent> {
            let mut dashboard =
                DashboardController::load(self.bridge.clone(), self.store.clone(), self.timings)
                    .await?;
            if dashboard.is_redirected() {
                println!("{}", "No stored profile, returning to login".yellow());
                dashboard.dispose();
                return self.next_event().await;
            }

            print_profile(&dashboard);
            print_sidebar(&dashboard);
            println!("Type '/help' for available commands, '/quit' to exit\n");

            let uptime = dashboard.subscribe_uptime();
            loop {
                let prompt = format!(
                    "{} {} ",
                    format!("[{}]", *uptime.borrow()).dimmed(),
                    "velrath>".cyan()
                );
                match self.read_line(&prompt)? {
                    None => dashboard.close().await?,
                    Some(line) => match parse_dashboard_command(&line) {
                        Ok(DashboardCommand::ToggleDiscoverable) => {
                            match dashboard.toggle_discoverable() {
                                Ok(_) => print_latest_notification(&dashboard),
                                Err(e) => print_failure("Failed to save setting", &e),
                            }
                        }
                        Ok(DashboardCommand::TogglePrivateMode) => {
                            match dashboard.toggle_private_mode() {
                                Ok(_) => print_latest_notification(&dashboard),
                                Err(e) => print_failure("Failed to save setting", &e),
                            }
                        }
                        Ok(DashboardCommand::SelectSection(section)) => {
                            dashboard.select_section(section);
                            print_latest_notification(&dashboard);
                            print_sidebar(&dashboard);
                        }
                        Ok(DashboardCommand::ShowProfile) => print_profile(&dashboard),
                        Ok(DashboardCommand::ListNotifications) => {
                            print_notifications(&dashboard.notifications().list())
                        }
                        Ok(DashboardCommand::Dismiss(id)) => {
                            if dashboard.notifications().dismiss(id) {
                                println!("Dismissed notification {}", id);
                            } else {
                                println!("{}", format!("No notification with id {}", id).yellow());
                            }
                        }
                        Ok(DashboardCommand::ClearNotifications) => {
                            let cleared = dashboard.notifications().clear();
                            println!("Cleared {} notification(s)", cleared);
                        }
                        Ok(DashboardCommand::ShowUptime) => {
                            println!("Uptime: {}", dashboard.uptime())
                        }
                        Ok(DashboardCommand::AddAccount) => dashboard.add_account().await?,
                        Ok(DashboardCommand::Logout) => match dashboard.logout().await {
                            Ok(()) => println!("{}", "Logged out".green()),
                            Err(e) => print_failure("Logout failed", &e),
                        },
                        Ok(DashboardCommand::Window(command)) => {
                            window_command(&dashboard, &self.host, command, print_dashboard_help)
                                .await?
                        }
                        Ok(DashboardCommand::None) => {
                            println!("Type '/help' for available commands")
                        }
                        Err(e) => eprintln!("{}", e.to_string().red()),
                    },
                }

                if let Ok(event) = self.events.try_recv() {
                    dashboard.dispose();
                    return Ok(event);
                }
            }
        }
    }

    async fn submit(login: &mut LoginController) {
        println!("{}", "Signing in...".cyan());
        match login.submit().await {
            Ok(LoginOutcome::LoggedIn(profile)) => println!(
                "{}",
                format!("Signed in as {}", profile.display_name()).green()
            ),
            Ok(LoginOutcome::Rejected(message)) | Ok(LoginOutcome::Failed(message)) => {
                eprintln!("{}", message.red())
            }
            Err(e) => print_failure("Login failed", &e),
        }
    }

    fn print_failure(context: &str, error: &anyhow::Error) {
        eprintln!("{}", format!("{}: {:#}", context, error).red());
    }

    async fn window_command<V: View>(
        view: &V,
        host: &HostBridge,
        command: WindowCommand,
        help: fn(),
    ) -> Result<()> {
        match command {
            WindowCommand::Minimize => {
                view.minimize().await?;
                println!("{}", "Window minimized".dimmed());
            }
            WindowCommand::Maximize => {
                view.maximize().await?;
                if host.window_state().maximized {
                    println!("{}", "Window maximized".dimmed());
                } else {
                    println!("{}", "Window restored".dimmed());
                }
            }
            WindowCommand::Quit => view.close().await?,
            WindowCommand::Help => help(),
        }
        Ok(())
    }

    fn print_banner(title: &str) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║{:^62}║", title);
        println!("╚══════════════════════════════════════════════════════════════╝\n");
    }

    fn print_splash_status(previous: Option<&SplashStatus>, current: &SplashStatus) {
        if previous.map(|p| p.message) != Some(current.message) {
            println!("  {}", current.message.cyan());
        }
        if previous.map(|p| p.tip) != Some(current.tip) {
            println!(
                "  {}",
                format!("Tip {}/4: {}", current.tip, current.tip_text()).dimmed()
            );
        }
        if current.state == SplashState::ValidatingSession
            && previous.map(|p| p.state) != Some(SplashState::ValidatingSession)
        {
            println!("  {}", "Checking stored session...".cyan());
        }
    }

    fn print_login_banner(login: &LoginController) {
        print_banner("Sign in to Velrath");
        if login.token().is_empty() {
            println!("Paste a Discord token and press Enter.");
        } else {
            println!(
                "Remembered token: {} (press Enter to sign in)",
                login.displayed_token()
            );
        }
        println!("Remember token: {}", on_off(login.remember()));
        println!("Type '/help' for available commands, '/quit' to exit\n");
    }

    fn print_profile(dashboard: &DashboardController) {
        let Some(profile) = dashboard.profile() else {
            return;
        };
        println!(
            "\nWelcome back, {}!",
            profile.greeting.as_str().bold()
        );
        println!(
            "  [{}] {}",
            profile.avatar_initial.as_str().magenta().bold(),
            profile.display_name
        );
        println!("  {}", profile.id_label.as_str().dimmed());
        if let Some(url) = &profile.avatar_url {
            println!("  Avatar:       {}", url.as_str().dimmed());
        }
        println!("  Nitro:        {}", profile.tier_label().magenta());
        println!("  Servers:      {}", profile.server_count);
        println!("  Discoverable: {}", on_off(dashboard.discoverable()));
        println!("  Private mode: {}\n", on_off(dashboard.private_mode()));
    }

    fn print_sidebar(dashboard: &DashboardController) {
        let entries: Vec<String> = crate::views::Section::ALL
            .iter()
            .map(|section| {
                if *section == dashboard.active_section() {
                    format!("[{}]", section.label()).green().bold().to_string()
                } else {
                    section.label().to_string()
                }
            })
            .collect();
        println!("{}", entries.join("  "));
    }

    fn print_latest_notification(dashboard: &DashboardController) {
        if let Some(latest) = dashboard.notifications().list().first() {
            println!("{}", severity_colored(latest));
        }
    }

    fn print_notifications(notifications: &[Notification]) {
        if notifications.is_empty() {
            println!("No notifications");
            return;
        }
        let now = chrono::Utc::now();
        for notification in notifications {
            println!(
                "{:>4}  {}  {}",
                notification.id,
                severity_colored(notification),
                format!("{} · {}", notification.source, notification.age_label(now)).dimmed()
            );
        }
    }

    fn severity_colored(notification: &Notification) -> colored::ColoredString {
        let message = notification.message.as_str();
        match notification.severity {
            Severity::Info => message.blue(),
            Severity::Success => message.green(),
            Severity::Error => message.red(),
        }
    }

    fn on_off(value: bool) -> &'static str {
        if value {
            "on"
        } else {
            "off"
        }
    }
}

// Headless session commands
pub mod session {
    //! Headless session commands.
    //!
    //! `login` runs the same login page controller as the shell with the
    //! credential filled in; `logout` and `status` only touch the store.

    use super::*;
    use colored::Colorize;

    /// Sign in without the interactive shell
    ///
    /// # Errors
    ///
    /// Returns error if the credential is blank or refused, or if the
    /// session store cannot be written.
    pub async fn login(config: Config, token: String, remember: bool) -> Result<()> {
        let store = Arc::new(open_store(&config)?);
        let client = DiscordClient::new(&config.discord)?;
        // The receiver must outlive the login so the navigation request lands
        let (host, _events) = HostBridge::new(client);
        let bridge: Arc<dyn Bridge> = Arc::new(host);

        let mut login = LoginController::new(bridge, store.clone(), config.timings());
        login.set_remember(remember);
        login.set_token(token);
        let outcome = login.submit().await;
        login.dispose();

        match outcome? {
            LoginOutcome::LoggedIn(profile) => {
                println!(
                    "{}",
                    format!("Signed in as {}", profile.display_name()).green()
                );
                print!("{}", render_status(&store.snapshot()));
                Ok(())
            }
            LoginOutcome::Rejected(message) | LoginOutcome::Failed(message) => {
                Err(VelrathError::Auth(AuthError::new(message)).into())
            }
        }
    }

    /// Forget the stored credential and profile
    pub fn logout(config: &Config) -> Result<()> {
        let store = open_store(config)?;
        store.clear_session()?;
        tracing::info!("Session cleared");
        println!("Logged out");
        Ok(())
    }

    /// Print the stored session
    pub fn status(config: &Config, json: bool) -> Result<()> {
        let store = open_store(config)?;
        let snapshot = store.snapshot();
        if json {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        } else {
            print!("{}", render_status(&snapshot));
        }
        Ok(())
    }

    /// Human-readable summary of a stored session
    pub fn render_status(session: &StoredSession) -> String {
        let mut lines = Vec::new();
        match &session.user {
            Some(user) => {
                lines.push(format!("Signed in as {}", user.display_name()));
                lines.push(format!("  ID:           {}", user.id));
                lines.push(format!("  Nitro:        {}", user.premium_tier()));
                lines.push(format!("  Servers:      {}", user.guild_count.unwrap_or(0)));
            }
            None => lines.push("No active session".to_string()),
        }
        lines.push(format!(
            "  Token:        {}",
            if session.token_stored {
                "stored"
            } else {
                "not stored"
            }
        ));
        lines.push(format!("  Remember:     {}", yes_no(session.remember_token)));
        lines.push(format!("  Discoverable: {}", yes_no(session.discoverable)));
        lines.push(format!("  Private mode: {}", yes_no(session.private_mode)));

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }

    fn yes_no(value: bool) -> &'static str {
        if value {
            "yes"
        } else {
            "no"
        }
    }

}
