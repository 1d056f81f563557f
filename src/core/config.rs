//! Environment-driven configuration
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Shared prefix validation
//! - 1.0.0: Auth token, command prefix, log level, console nick, logs URL

use anyhow::Result;
use std::env;

use super::error::BotError;

pub const DEFAULT_COMMAND_PREFIX: &str = "!";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_CONSOLE_NICK: &str = "console";

/// A prefix must be non-empty and free of whitespace, since the dispatcher
/// splits invocations on whitespace.
pub fn validate_prefix(prefix: &str) -> Result<(), BotError> {
    if prefix.is_empty() || prefix.chars().any(char::is_whitespace) {
        return Err(BotError::InvalidPrefix {
            prefix: prefix.to_string(),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Chat backend token. `None` runs the bot anonymously, which forbids
    /// registering commands.
    pub auth_token: Option<String>,
    pub command_prefix: String,
    pub log_level: String,
    /// Sender nick used for lines read by the console transport
    pub console_nick: String,
    /// Enables the `logs` command when set
    pub logs_base_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth_token: None,
            command_prefix: DEFAULT_COMMAND_PREFIX.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            console_nick: DEFAULT_CONSOLE_NICK.to_string(),
            logs_base_url: None,
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let command_prefix = match lookup("COMMAND_PREFIX") {
            Some(prefix) => prefix,
            None => DEFAULT_COMMAND_PREFIX.to_string(),
        };
        validate_prefix(&command_prefix)?;

        Ok(Self {
            auth_token: non_empty("BOT_AUTH_TOKEN"),
            command_prefix,
            log_level: non_empty("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            console_nick: non_empty("CONSOLE_NICK")
                .unwrap_or_else(|| DEFAULT_CONSOLE_NICK.to_string()),
            logs_base_url: non_empty("LOGS_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string()),
        })
    }
}
