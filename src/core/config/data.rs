use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::protocol::InboundFormat;

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Websocket URL of the chat backend (e.g., "ws://localhost:8000/ws")
    pub endpoint: Option<String>,
    /// Personality id active when a session starts (e.g., "cynthia")
    pub default_personality: Option<String>,
    /// Extra connect attempts after the first one fails
    pub connect_retries: Option<u32>,
    /// Delay before the first retry; doubles for each later attempt
    pub retry_backoff_ms: Option<u64>,
    /// How inbound frames are read: "raw" or "tagged"
    pub inbound_format: Option<InboundFormat>,
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
