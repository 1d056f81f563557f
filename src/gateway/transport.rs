//! Chat backend abstraction
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Initial transport trait (connect, whispers in and out)

use anyhow::Result;
use async_trait::async_trait;

use super::message::InboundMessage;
use crate::core::response::is_sendable;

/// The part of a chat backend the bot depends on
///
/// Implementations own the connection and any session handling. The bot only
/// pulls inbound whispers one at a time and pushes outgoing whispers.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn connect(&self) -> Result<()>;

    async fn disconnect(&self) -> Result<()>;

    /// Backend-specific check applied before every outgoing whisper
    fn is_valid(&self, text: &str) -> bool {
        is_sendable(text)
    }

    async fn send_whisper(&self, to: &str, text: &str) -> Result<()>;

    /// Wait for the next inbound whisper. `None` once the stream has ended.
    async fn next_whisper(&self) -> Option<InboundMessage>;
}
