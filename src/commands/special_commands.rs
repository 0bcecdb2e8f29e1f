//! Special commands parser for the interactive shell
//!
//! Lines starting with `/` control the shell instead of being sent to the
//! backend. Users can:
//! - Switch between document, image and video modes
//! - Attach and upload a file, or submit a YouTube URL
//! - Navigate to a route
//! - Inspect the session and toggle dark mode
//! - Sign out or exit
//!
//! Command names are case-insensitive; arguments (paths, URLs) keep their
//! case.

use crate::chat::ChatMode;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when parsing special commands
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

/// Special commands that can be executed in the shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Switch to a different chat mode, starting it empty
    SwitchMode(ChatMode),

    /// Select a file for the current mode
    Attach(PathBuf),

    /// Upload the selected file
    Upload,

    /// Summarise a YouTube video (switches to video mode)
    Youtube(String),

    /// Navigate to a route path
    Open(String),

    /// Display mode, artifact and session status
    ShowStatus,

    /// Toggle dark mode
    ToggleTheme,

    /// Show the signed-in user
    WhoAmI,

    /// Sign out
    SignOut,

    /// Display help information
    Help,

    /// Exit the shell
    Exit,

    /// Not a special command
    ///
    /// The input is a question (or a YouTube URL in video mode).
    None,
}

fn required_argument(command: &str, rest: &str, usage: &str) -> Result<String, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument {
            command: command.to_string(),
            usage: usage.to_string(),
        })
    } else {
        Ok(rest.to_string())
    }
}

/// Parse a line of shell input into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` for an unrecognised `/` command,
/// `CommandError::MissingArgument` when a command needs an argument, and
/// `CommandError::UnsupportedArgument` for an argument it cannot take.
///
/// # Examples
///
/// ```
/// use studyqa::chat::ChatMode;
/// use studyqa::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(
///     parse_special_command("/mode image").unwrap(),
///     SpecialCommand::SwitchMode(ChatMode::Image)
/// );
/// assert_eq!(
///     parse_special_command("What is entropy?").unwrap(),
///     SpecialCommand::None
/// );
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let (command, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((command, rest)) => (command.to_lowercase(), rest.trim()),
        None => (lower.clone(), ""),
    };

    match command.as_str() {
        "/document" | "/doc" => Ok(SpecialCommand::SwitchMode(ChatMode::Document)),
        "/image" => Ok(SpecialCommand::SwitchMode(ChatMode::Image)),
        "/video" => Ok(SpecialCommand::SwitchMode(ChatMode::Video)),
        "/mode" => {
            let arg = required_argument("/mode", rest, "/mode <document|image|video>")?;
            ChatMode::parse_str(&arg)
                .map(SpecialCommand::SwitchMode)
                .map_err(|_| CommandError::UnsupportedArgument {
                    command: "/mode".to_string(),
                    arg,
                })
        }

        "/attach" | "/file" => required_argument("/attach", rest, "/attach <path>")
            .map(|path| SpecialCommand::Attach(PathBuf::from(path))),
        "/upload" => Ok(SpecialCommand::Upload),
        "/youtube" | "/yt" => {
            required_argument("/youtube", rest, "/youtube <url>").map(SpecialCommand::Youtube)
        }
        "/open" | "/go" => {
            required_argument("/open", rest, "/open <path>").map(SpecialCommand::Open)
        }

        "/status" => Ok(SpecialCommand::ShowStatus),
        "/theme" | "/dark" => Ok(SpecialCommand::ToggleTheme),
        "/whoami" | "/profile" => Ok(SpecialCommand::WhoAmI),
        "/signout" | "/logout" => Ok(SpecialCommand::SignOut),
        "/help" | "/?" => Ok(SpecialCommand::Help),

        "exit" | "quit" | "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands for the StudyQA Shell
======================================

CHAT MODES:
  /document       - Switch to document Q&A (PDF)
  /image          - Switch to image Q&A
  /video          - Switch to video summaries
  /mode <m>       - Switch to mode m (document, image, video)

FILES:
  /attach <path>  - Select a file for the current mode
  /upload         - Upload the selected file
  /youtube <url>  - Summarise a YouTube video

NAVIGATION:
  /open <path>    - Go to a page, e.g. /open /video-chat or /open /signin

SESSION:
  /status         - Show mode, loaded file and session
  /whoami         - Show the signed-in user
  /signout        - Sign out
  /theme          - Toggle dark mode

OTHER:
  /help           - Show this help
  exit, quit      - Leave the shell

Any other line is a question about the loaded document or image. In video
mode a plain line is treated as a YouTube URL.
"#
    );
}
