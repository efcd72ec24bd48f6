use std::time::Duration;

use crate::core::config::data::Config;
use crate::core::connection::RetryPolicy;
use crate::core::personality::{default_personality, resolve_personality, Personality};
use crate::core::protocol::InboundFormat;

pub const DEFAULT_ENDPOINT: &str = "ws://localhost:8000/ws";

/// Keys accepted by `paquera set` and `paquera unset`.
pub const CONFIG_KEYS: [&str; 5] = [
    "endpoint",
    "default-personality",
    "connect-retries",
    "retry-backoff-ms",
    "inbound-format",
];

fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_lowercase().replace('_', "-")
}

fn unknown_key(key: &str) -> String {
    format!(
        "Unknown config key '{}'. Available keys: {}",
        key,
        CONFIG_KEYS.join(", ")
    )
}

pub fn validate_endpoint(value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.starts_with("ws://") || trimmed.starts_with("wss://") {
        Ok(trimmed.to_string())
    } else {
        Err(format!(
            "Endpoint '{}' must start with ws:// or wss://",
            trimmed
        ))
    }
}

impl Config {
    pub fn endpoint_or_default(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    /// Falls back to the first catalog entry when unset or unknown.
    pub fn personality(&self) -> &'static Personality {
        self.default_personality
            .as_deref()
            .and_then(|id| resolve_personality(id).ok())
            .unwrap_or_else(default_personality)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let mut policy = RetryPolicy::default();
        if let Some(retries) = self.connect_retries {
            policy.max_retries = retries;
        }
        if let Some(backoff) = self.retry_backoff_ms {
            policy.base_delay = Duration::from_millis(backoff);
        }
        policy
    }

    pub fn inbound_format_or_default(&self) -> InboundFormat {
        self.inbound_format.unwrap_or_default()
    }

    /// Applies `paquera set <key> <value>`, returning the confirmation line.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<String, String> {
        match normalize_key(key).as_str() {
            "endpoint" => {
                let endpoint = validate_endpoint(value)?;
                self.endpoint = Some(endpoint.clone());
                Ok(format!("✅ Set endpoint to: {}", endpoint))
            }
            "default-personality" => {
                let personality = resolve_personality(value)?;
                self.default_personality = Some(personality.id.to_string());
                Ok(format!(
                    "✅ Set default-personality to: {}",
                    personality.display_name
                ))
            }
            "connect-retries" => {
                let retries: u32 = value
                    .trim()
                    .parse()
                    .map_err(|_| format!("connect-retries must be a whole number, got '{}'", value))?;
                self.connect_retries = Some(retries);
                Ok(format!("✅ Set connect-retries to: {}", retries))
            }
            "retry-backoff-ms" => {
                let backoff: u64 = value
                    .trim()
                    .parse()
                    .ok()
                    .filter(|ms| *ms > 0)
                    .ok_or_else(|| {
                        format!("retry-backoff-ms must be a positive number, got '{}'", value)
                    })?;
                self.retry_backoff_ms = Some(backoff);
                Ok(format!("✅ Set retry-backoff-ms to: {}", backoff))
            }
            "inbound-format" => {
                let format = InboundFormat::parse(value).ok_or_else(|| {
                    format!("inbound-format must be 'raw' or 'tagged', got '{}'", value)
                })?;
                self.inbound_format = Some(format);
                Ok(format!("✅ Set inbound-format to: {}", format.as_str()))
            }
            _ => Err(unknown_key(key)),
        }
    }

    pub fn unset_value(&mut self, key: &str) -> Result<String, String> {
        let normalized = normalize_key(key);
        match normalized.as_str() {
            "endpoint" => self.endpoint = None,
            "default-personality" => self.default_personality = None,
            "connect-retries" => self.connect_retries = None,
            "retry-backoff-ms" => self.retry_backoff_ms = None,
            "inbound-format" => self.inbound_format = None,
            _ => return Err(unknown_key(key)),
        }
        Ok(format!("✅ Unset {}", normalized))
    }

    pub fn print_all(&self) {
        println!("Current configuration:");
        match &self.endpoint {
            Some(endpoint) => println!("  endpoint: {endpoint}"),
            None => println!("  endpoint: (unset, using {DEFAULT_ENDPOINT})"),
        }
        match &self.default_personality {
            Some(id) => println!("  default-personality: {id}"),
            None => println!("  default-personality: (unset)"),
        }
        let policy = self.retry_policy();
        println!("  connect-retries: {}", policy.max_retries);
        println!("  retry-backoff-ms: {}", policy.base_delay.as_millis());
        println!(
            "  inbound-format: {}",
            self.inbound_format_or_default().as_str()
        );
    }
}
