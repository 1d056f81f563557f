//! Reply routing back to the sender of the message being handled
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Add direct whispers for deferred output
//! - 1.0.0: reply and reply_multiline against the current sender

use anyhow::Result;
use log::debug;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::message::{InboundMessage, User};
use super::transport::ChatTransport;
use crate::core::error::BotError;

/// Sends whispers on behalf of handlers
///
/// The dispatcher marks the sender of the message it is handling as the
/// current recipient for the duration of one dispatch. `reply` always targets
/// that user. Cloning is cheap and clones share the current recipient.
#[derive(Clone)]
pub struct ReplyGateway {
    transport: Arc<dyn ChatTransport>,
    current: Arc<RwLock<Option<User>>>,
}

impl ReplyGateway {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            transport,
            current: Arc::new(RwLock::new(None)),
        }
    }

    pub(crate) async fn begin(&self, message: &InboundMessage) {
        *self.current.write().await = Some(message.sender.clone());
    }

    pub(crate) async fn finish(&self) {
        *self.current.write().await = None;
    }

    /// The user replies currently go to, if a message is being handled
    pub async fn current_recipient(&self) -> Option<User> {
        self.current.read().await.clone()
    }

    /// Whisper `text` to the sender of the message being handled
    pub async fn reply(&self, text: &str) -> Result<()> {
        let recipient = self
            .current_recipient()
            .await
            .ok_or(BotError::NoRecipient)?;
        self.whisper(&recipient.nick, text).await
    }

    /// One whisper per line.
    ///
    /// Every line is a separate send, which gets around whatever throttling
    /// the backend applies. Use sparingly.
    pub async fn reply_multiline<I, S>(&self, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.reply(line.as_ref()).await?;
        }
        Ok(())
    }

    /// Whisper a specific user, independent of the current dispatch
    pub async fn whisper(&self, to: &str, text: &str) -> Result<()> {
        if !self.transport.is_valid(text) {
            return Err(BotError::InvalidMessage {
                text: text.to_string(),
            }
            .into());
        }
        debug!("Whispering {to}: {text}");
        self.transport.send_whisper(to, text).await
    }
}
