//! Inbound whisper types
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: User and InboundMessage

use chrono::{DateTime, Utc};
use std::fmt;

/// A chat user, identified by display name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct User {
    pub nick: String,
}

impl User {
    pub fn new(nick: impl Into<String>) -> Self {
        Self { nick: nick.into() }
    }

    /// Lower-cased nick for case-insensitive bookkeeping
    pub fn key(&self) -> String {
        self.nick.to_lowercase()
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.nick)
    }
}

/// One received whisper
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub sender: User,
    pub text: String,
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    pub fn new(sender: User, text: impl Into<String>, received_at: DateTime<Utc>) -> Self {
        Self {
            sender,
            text: text.into(),
            received_at,
        }
    }

    /// A whisper from `nick` received now
    pub fn whisper(nick: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(User::new(nick), text, Utc::now())
    }
}
