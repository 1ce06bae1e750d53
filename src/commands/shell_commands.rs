//! Prompt commands for the interactive shell
//!
//! The login and dashboard pages each read lines from the prompt. Lines
//! starting with `/` are page commands; anything else is page input (the
//! credential on the login page). Commands are case-insensitive.

use crate::views::Section;
use thiserror::Error;

/// Errors that can occur when parsing prompt commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Commands shared by every page: the title bar and help
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowCommand {
    Minimize,
    Maximize,
    Quit,
    Help,
}

/// What a line typed on the login page means
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginCommand {
    /// Submit this credential
    Submit(String),
    /// Submit whatever is in the field (a prefilled credential)
    SubmitCurrent,
    /// Set or flip the remember flag
    Remember(Option<bool>),
    /// Toggle masked display of the credential
    ToggleVisibility,
    /// The OAuth button
    OAuth,
    Window(WindowCommand),
}

/// What a line typed on the dashboard means
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardCommand {
    ToggleDiscoverable,
    TogglePrivateMode,
    SelectSection(Section),
    ShowProfile,
    ListNotifications,
    Dismiss(u64),
    ClearNotifications,
    ShowUptime,
    AddAccount,
    Logout,
    Window(WindowCommand),
    /// Not a command; the dashboard has no free-text input
    None,
}

fn split_command(trimmed: &str) -> (String, Option<&str>) {
    match trimmed.split_once(char::is_whitespace) {
        Some((cmd, rest)) => {
            let rest = rest.trim();
            (
                cmd.to_lowercase(),
                if rest.is_empty() { None } else { Some(rest) },
            )
        }
        None => (trimmed.to_lowercase(), None),
    }
}

fn parse_window_command(cmd: &str) -> Option<WindowCommand> {
    match cmd {
        "/minimize" | "/min" => Some(WindowCommand::Minimize),
        "/maximize" | "/max" => Some(WindowCommand::Maximize),
        "/quit" | "/exit" | "/close" | "exit" | "quit" => Some(WindowCommand::Quit),
        "/help" | "/?" => Some(WindowCommand::Help),
        _ => None,
    }
}

fn no_argument(cmd: &str, arg: Option<&str>) -> Result<(), CommandError> {
    match arg {
        Some(arg) => Err(CommandError::UnsupportedArgument {
            command: cmd.to_string(),
            arg: arg.to_string(),
        }),
        None => Ok(()),
    }
}

/// Parse a line typed on the login page
///
/// # Examples
///
/// ```
/// use velrath::commands::shell_commands::{parse_login_command, LoginCommand};
///
/// assert_eq!(
///     parse_login_command("abc.def").unwrap(),
///     LoginCommand::Submit("abc.def".to_string())
/// );
/// assert_eq!(parse_login_command("").unwrap(), LoginCommand::SubmitCurrent);
/// assert_eq!(parse_login_command("/remember on").unwrap(), LoginCommand::Remember(Some(true)));
/// assert!(parse_login_command("/nope").is_err());
/// ```
pub fn parse_login_command(input: &str) -> Result<LoginCommand, CommandError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(LoginCommand::SubmitCurrent);
    }

    let (cmd, arg) = split_command(trimmed);
    if let Some(window) = parse_window_command(&cmd) {
        no_argument(&cmd, arg)?;
        return Ok(LoginCommand::Window(window));
    }

    if !trimmed.starts_with('/') {
        return Ok(LoginCommand::Submit(trimmed.to_string()));
    }

    match cmd.as_str() {
        "/remember" => match arg.map(str::to_lowercase).as_deref() {
            None => Ok(LoginCommand::Remember(None)),
            Some("on") | Some("yes") | Some("true") => Ok(LoginCommand::Remember(Some(true))),
            Some("off") | Some("no") | Some("false") => Ok(LoginCommand::Remember(Some(false))),
            Some(other) => Err(CommandError::UnsupportedArgument {
                command: cmd.clone(),
                arg: other.to_string(),
            }),
        },
        "/show" | "/hide" => {
            no_argument(&cmd, arg)?;
            Ok(LoginCommand::ToggleVisibility)
        }
        "/oauth" => {
            no_argument(&cmd, arg)?;
            Ok(LoginCommand::OAuth)
        }
        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Parse a line typed on the dashboard
///
/// # Examples
///
/// ```
/// use velrath::commands::shell_commands::{parse_dashboard_command, DashboardCommand};
/// use velrath::views::Section;
///
/// assert_eq!(
///     parse_dashboard_command("/section servers").unwrap(),
///     DashboardCommand::SelectSection(Section::Servers)
/// );
/// assert_eq!(parse_dashboard_command("/dismiss 3").unwrap(), DashboardCommand::Dismiss(3));
/// assert!(parse_dashboard_command("/section").is_err());
/// ```
pub fn parse_dashboard_command(input: &str) -> Result<DashboardCommand, CommandError> {
    let trimmed = input.trim();
    let (cmd, arg) = split_command(trimmed);

    if let Some(window) = parse_window_command(&cmd) {
        no_argument(&cmd, arg)?;
        return Ok(DashboardCommand::Window(window));
    }

    if !trimmed.starts_with('/') {
        return Ok(DashboardCommand::None);
    }

    match cmd.as_str() {
        "/section" | "/go" => {
            let name = arg.ok_or_else(|| CommandError::MissingArgument {
                command: cmd.clone(),
                usage: "/section <overview|accounts|servers|commands|settings>".to_string(),
            })?;
            Section::from_slug(name)
                .map(DashboardCommand::SelectSection)
                .ok_or_else(|| CommandError::UnsupportedArgument {
                    command: cmd.clone(),
                    arg: name.to_string(),
                })
        }
        "/dismiss" => {
            let id = arg.ok_or_else(|| CommandError::MissingArgument {
                command: cmd.clone(),
                usage: "/dismiss <id>".to_string(),
            })?;
            id.parse()
                .map(DashboardCommand::Dismiss)
                .map_err(|_| CommandError::UnsupportedArgument {
                    command: cmd.clone(),
                    arg: id.to_string(),
                })
        }
        other => {
            no_argument(other, arg)?;
            match other {
                "/discoverable" => Ok(DashboardCommand::ToggleDiscoverable),
                "/private" => Ok(DashboardCommand::TogglePrivateMode),
                "/profile" | "/me" => Ok(DashboardCommand::ShowProfile),
                "/notifications" | "/notes" => Ok(DashboardCommand::ListNotifications),
                "/clear" => Ok(DashboardCommand::ClearNotifications),
                "/uptime" => Ok(DashboardCommand::ShowUptime),
                "/add-account" => Ok(DashboardCommand::AddAccount),
                "/logout" => Ok(DashboardCommand::Logout),
                _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
            }
        }
    }
}

/// Print the login page commands
pub fn print_login_help() {
    println!(
        r#"
Login Commands
==============

  <token>              Sign in with a Discord token
  <enter>              Sign in with the remembered token
  /remember [on|off]   Keep the token for the next start (toggles without argument)
  /show, /hide         Toggle masked display of the token
  /oauth               Sign in with OAuth2
  /minimize, /maximize Window controls
  /quit                Close Velrath
  /help                Show this help
"#
    );
}

/// Print the dashboard commands
pub fn print_dashboard_help() {
    println!(
        r#"
Dashboard Commands
==================

  /profile             Show the account card
  /discoverable        Toggle Velrath Discoverable
  /private             Toggle Private Mode
  /section <name>      Open overview, accounts, servers, commands or settings
  /notifications       List notifications
  /dismiss <id>        Dismiss one notification
  /clear               Dismiss all notifications
  /uptime              Show session uptime
  /add-account         Sign in with another token
  /logout              Forget the stored session
  /minimize, /maximize Window controls
  /quit                Close Velrath
  /help                Show this help
"#
    );
}
