//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod ask;
pub mod chat;
pub mod settings;
pub mod upload;

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::ask::run_ask;
use crate::cli::chat::run_chat;
use crate::cli::settings::SettingRegistry;
use crate::cli::upload::run_upload;
use crate::core::config::{Config, ConfigError, ResolvedSettings};

#[derive(Parser)]
#[command(name = "ragchat", version)]
#[command(about = "A terminal chat client for a retrieval-augmented agent backend")]
#[command(
    long_about = "ragchat talks to an agent backend that answers from its document \
knowledge base and, when that is not enough, from web search. Every answer comes \
with the agent's workflow trace so you can see which step produced it.\n\n\
Environment Variables:\n\
  RAGCHAT_BASE_URL  Backend base URL (defaults to http://localhost:8000)\n\
  FASTAPI_BASE_URL  Fallback backend base URL\n\
  RUST_LOG          Diagnostic log filter (defaults to warn)\n\n\
Commands inside the chat:\n\
  /help                Show chat commands\n\
  /websearch [on|off]  Show or toggle web search\n\
  /upload <path>       Upload a PDF to the knowledge base\n\
  /log [file]          Start transcript logging, or pause/resume it\n\
  /session             Show the session id\n\
  /quit                Leave the chat"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Backend base URL (overrides environment and config file)
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Start with web search disabled
    #[arg(long, global = true)]
    pub no_web_search: bool,

    /// Enable transcript logging to specified file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the interactive chat (default)
    Chat,
    /// Ask a single question and print the answer with its trace
    Ask {
        /// The question to ask
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// Upload a PDF document to the knowledge base
    Upload {
        /// Path to the PDF file
        path: PathBuf,
    },
    /// Set configuration values
    Set {
        /// Configuration key to set (base-url, web-search, timeout)
        key: String,
        /// Value to set for the key
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
    /// Print the current configuration
    Config,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

/// Diagnostics go to stderr so they never interleave with the transcript.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let settings = resolve_settings(args.base_url.as_deref(), args.no_web_search)?;
            run_chat(settings, args.log).await
        }
        Commands::Ask { prompt } => {
            let settings = resolve_settings(args.base_url.as_deref(), args.no_web_search)?;
            run_ask(settings, prompt.join(" "), args.log).await
        }
        Commands::Upload { path } => {
            let settings = resolve_settings(args.base_url.as_deref(), args.no_web_search)?;
            run_upload(settings, &path).await
        }
        Commands::Set { key, value } => {
            let registry = SettingRegistry::new();
            if value.is_empty() {
                load_config()?.print_all();
                return Ok(());
            }
            let result = registry.set_at(&Config::get_config_path()?, &key, &value);
            finish_setting(result);
            Ok(())
        }
        Commands::Unset { key } => {
            let registry = SettingRegistry::new();
            let result = registry.unset_at(&Config::get_config_path()?, &key);
            finish_setting(result);
            Ok(())
        }
        Commands::Config => {
            let config = load_config()?;
            if let Ok(path) = Config::get_config_path() {
                println!("Config file: {}", crate::core::config::data::path_display(path));
            }
            config.print_all();
            Ok(())
        }
    }
}

fn finish_setting(result: Result<String, settings::SettingError>) {
    match result {
        Ok(message) => println!("{message}"),
        Err(err) => {
            err.print();
            std::process::exit(1);
        }
    }
}

fn load_config() -> Result<Config, ConfigError> {
    match Config::load() {
        Err(ConfigError::NoConfigDir) => {
            warn!("No config directory available; using defaults");
            Ok(Config::default())
        }
        other => other,
    }
}

/// Resolve the backend settings once, before any request is made.
pub fn resolve_settings(
    cli_base_url: Option<&str>,
    no_web_search: bool,
) -> Result<ResolvedSettings, ConfigError> {
    let mut settings = load_config()?.resolve_from_env(cli_base_url);
    if no_web_search {
        settings.web_search = false;
    }
    debug!(
        base_url = %settings.base_url,
        web_search = settings.web_search,
        timeout_secs = settings.request_timeout.as_secs(),
        "Resolved settings"
    );
    Ok(settings)
}
