//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod personality_list;

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::personality_list::list_personalities;
use crate::core::config::{validate_endpoint, Config};
use crate::core::personality::resolve_personality;
use crate::logging::init_file_logging;
use crate::ui::chat_loop::{run_chat, ChatOptions};

#[derive(Parser)]
#[command(name = "paquera")]
#[command(about = "A terminal companion chat with switchable personalities")]
#[command(
    long_about = "Paquera is a full-screen terminal chat client. It asks for your name, age and \
interests, then connects to a chat backend over a websocket where one of four \
personalities answers you.\n\n\
Environment Variables:\n\
  PAQUERA_ENDPOINT  Websocket endpoint (overrides the config file)\n\
  PAQUERA_CONFIG    Path to an alternative config.toml\n\
  PAQUERA_LOG       Filter for --debug-log output (default: info)\n\n\
Controls:\n\
  Enter             Advance onboarding / send the message\n\
  Esc               Go back one onboarding step\n\
  Tab / Shift+Tab   Cycle personalities\n\
  Ctrl+R            Start a new conversation\n\
  PgUp/PgDn         Scroll through the conversation\n\
  Ctrl+C            Quit the application\n\n\
Commands:\n\
  /help             List chat commands\n\
  /persona [id]     List or switch personalities\n\
  /reset            Start a new conversation\n\
  /reconnect        Reconnect to the backend\n\
  /log [filename]   Enable or toggle the transcript log"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Websocket endpoint to chat with
    #[arg(short = 'e', long, global = true, env = "PAQUERA_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Personality to start with
    #[arg(short = 'p', long, global = true)]
    pub personality: Option<String>,

    /// Append the conversation transcript to this file
    #[arg(short = 'l', long, global = true)]
    pub log: Option<String>,

    /// Write diagnostic logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub debug_log: Option<PathBuf>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Set configuration values, or print them when no key is given
    Set {
        /// Configuration key to set
        key: Option<String>,
        /// Value to set for the key
        #[arg(allow_hyphen_values = true)]
        value: Option<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
    /// List the available personalities
    Personalities,
}

/// Combines flags with the saved config. Flags win over the file.
pub fn resolve_chat_options(args: &Args, config: &Config) -> Result<ChatOptions, String> {
    let endpoint = match args.endpoint.as_deref() {
        Some(endpoint) => validate_endpoint(endpoint)?,
        None => config.endpoint_or_default().to_string(),
    };
    let personality = match args.personality.as_deref() {
        Some(id) => resolve_personality(id)?,
        None => config.personality(),
    };
    Ok(ChatOptions {
        endpoint,
        retry: config.retry_policy(),
        personality,
        inbound_format: config.inbound_format_or_default(),
        log_file: args.log.clone(),
    })
}

/// Prints a config edit's confirmation, or the error with a failing exit code.
fn report(outcome: Result<String, Box<dyn Error>>) -> Result<(), Box<dyn Error>> {
    match outcome {
        Ok(message) => {
            println!("{message}");
            Ok(())
        }
        Err(err) => {
            eprintln!("❌ {err}");
            std::process::exit(1);
        }
    }
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if let Some(path) = args.debug_log.as_deref() {
        init_file_logging(path)?;
    }

    match args.command.as_ref().unwrap_or(&Commands::Chat) {
        Commands::Chat => {
            let config = Config::load()?;
            let options = match resolve_chat_options(&args, &config) {
                Ok(options) => options,
                Err(message) => {
                    eprintln!("❌ {message}");
                    std::process::exit(1);
                }
            };
            run_chat(options).await
        }
        Commands::Set { key, value } => {
            let (Some(key), Some(value)) = (key, value) else {
                Config::load()?.print_all();
                return Ok(());
            };
            report(Config::mutate(|config| Ok(config.set_value(key, value)?)))
        }
        Commands::Unset { key } => {
            report(Config::mutate(|config| Ok(config.unset_value(key)?)))
        }
        Commands::Personalities => list_personalities(),
    }
}

#[cfg(test)]
mod tests;
