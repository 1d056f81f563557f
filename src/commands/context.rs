//! Shared context for command handlers
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Reply gateway, registry access and command prefix
//! - 1.0.0: Initial implementation with core shared state

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard};

use super::registry::CommandRegistry;
use crate::gateway::reply::ReplyGateway;

/// Shared context for all command handlers and fallbacks
///
/// Contains:
/// - ReplyGateway for answering the sender of the message being handled
/// - The command registry, for introspective commands like `help`
/// - The command prefix, for composing usage hints
#[derive(Clone)]
pub struct CommandContext {
    gateway: ReplyGateway,
    registry: Arc<RwLock<CommandRegistry>>,
    prefix: String,
}

impl CommandContext {
    pub fn new(
        gateway: ReplyGateway,
        registry: Arc<RwLock<CommandRegistry>>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            registry,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn gateway(&self) -> &ReplyGateway {
        &self.gateway
    }

    /// Read access to the registry. Do not hold across a registration.
    pub async fn registry(&self) -> RwLockReadGuard<'_, CommandRegistry> {
        self.registry.read().await
    }

    /// Whisper the sender of the message being handled
    pub async fn reply(&self, text: &str) -> Result<()> {
        self.gateway.reply(text).await
    }

    /// One whisper per line; bypasses backend throttling, use sparingly
    pub async fn reply_multiline<I, S>(&self, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.gateway.reply_multiline(lines).await
    }
}
