//! Diagnostic tracing output.
//!
//! The chat screen owns the terminal, so diagnostics only go to a file named
//! with `--debug-log`. Without it no subscriber is installed and `tracing`
//! macros are no-ops.

use std::error::Error;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Filter directives are read from this variable, defaulting to `info`.
pub const LOG_FILTER_ENV: &str = "PAQUERA_LOG";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

pub fn init_file_logging(path: &Path) -> Result<(), Box<dyn Error>> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|err| -> Box<dyn Error> { err.to_string().into() })?;
    tracing::info!(path = %path.display(), "diagnostic logging started");
    Ok(())
}
