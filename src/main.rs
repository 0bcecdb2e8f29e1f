//! StudyQA - terminal client for a document, image and video Q&A assistant
//!
#![doc = "StudyQA - study assistant CLI"]
#![doc = "Main entry point for the StudyQA application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use studyqa::cli::{Cli, Commands};
use studyqa::commands;
use studyqa::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose, cli.log_json);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { mode, file } => {
            if let Some(m) = &mode {
                tracing::debug!("Using mode override: {}", m);
            }
            commands::chat::run_chat(config, mode, file).await?;
            Ok(())
        }
        Commands::Open { path } => {
            tracing::info!("Opening route {}", path);
            commands::chat::run_open(config, path).await?;
            Ok(())
        }
        Commands::Ask {
            mode,
            file,
            url,
            question,
        } => {
            // Reject unusable flag combinations before connecting anywhere
            let request = commands::ask::AskRequest::new(&mode, file, url, question)?;
            tracing::info!("Starting one-shot {} request", request.mode);
            commands::ask::run_ask(config, request).await?;
            Ok(())
        }
        Commands::Auth { command } => {
            commands::auth::run_auth(config, command).await?;
            Ok(())
        }
        Commands::Theme { action } => {
            commands::theme::run_theme(&config, &action)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so they never interleave with transcript output.
fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "studyqa=debug" } else { "studyqa=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry.with(fmt_layer.json()).init();
    } else {
        registry.with(fmt_layer).init();
    }
}
