//! Command-line interface definition for StudyQA
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat, one-shot questions,
//! authentication, route navigation and the theme preference.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// StudyQA - ask questions about your documents, images and videos
///
/// Upload a PDF, image or video to the study assistant backend and
/// chat about it from the terminal.
#[derive(Parser, Debug, Clone)]
#[command(name = "studyqa")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,

    /// Override the Q&A backend base URL
    #[arg(long, env = "STUDYQA_API_URL")]
    pub api_url: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for StudyQA
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the interactive chat shell
    Chat {
        /// Chat mode: document, image or video
        #[arg(short, long)]
        mode: Option<String>,

        /// File to attach as soon as the shell starts
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Open a route (e.g. /video-qa) and start the shell there
    Open {
        /// Route path
        path: String,
    },

    /// Upload a file (or YouTube URL) and ask a single question
    Ask {
        /// Chat mode: document, image or video
        #[arg(short, long, default_value = "document")]
        mode: String,

        /// File to upload
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// YouTube URL to process (video mode)
        #[arg(short, long)]
        url: Option<String>,

        /// Question to ask after the upload
        #[arg(short, long)]
        question: Option<String>,
    },

    /// Manage the signed-in session
    Auth {
        /// Authentication subcommand
        #[command(subcommand)]
        command: AuthCommand,
    },

    /// Show or change the dark-mode preference
    Theme {
        /// show, toggle, dark or light
        #[arg(default_value = "show")]
        action: String,
    },
}

/// Authentication subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum AuthCommand {
    /// Sign in with email and password
    Signin {
        /// Account email (prompted when omitted)
        #[arg(short, long)]
        email: Option<String>,

        /// Account password (prompted when omitted)
        #[arg(short, long, env = "STUDYQA_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create an account with email and password
    Signup {
        /// Account email (prompted when omitted)
        #[arg(short, long)]
        email: Option<String>,

        /// Account password (prompted when omitted)
        #[arg(short, long, env = "STUDYQA_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign in with Google through the browser
    Google,

    /// Sign out and forget the stored session
    Signout,

    /// Show the current session
    Status,
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            log_json: false,
            api_url: None,
            command: Commands::Auth {
                command: AuthCommand::Status,
            },
        }
    }
}
