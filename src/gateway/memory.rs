//! In-process transport
//!
//! Inbound whispers are pushed through a channel and outgoing whispers are
//! recorded. Used by the test suites and handy for embedding the bot.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Channel-backed inbound queue and recorded outbound whispers

use anyhow::{bail, Result};
use async_trait::async_trait;
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{mpsc, Mutex, RwLock};

use super::message::InboundMessage;
use super::transport::ChatTransport;

/// A whisper the bot sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentWhisper {
    pub to: String,
    pub text: String,
}

pub struct MemoryTransport {
    inbound_tx: RwLock<Option<mpsc::UnboundedSender<InboundMessage>>>,
    inbound_rx: Mutex<mpsc::UnboundedReceiver<InboundMessage>>,
    sent: RwLock<Vec<SentWhisper>>,
    connected: AtomicBool,
}

impl MemoryTransport {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            inbound_tx: RwLock::new(Some(tx)),
            inbound_rx: Mutex::new(rx),
            sent: RwLock::new(Vec::new()),
            connected: AtomicBool::new(false),
        }
    }

    /// Queue an inbound whisper
    pub async fn push(&self, message: InboundMessage) -> Result<()> {
        match self.inbound_tx.read().await.as_ref() {
            Some(tx) => {
                tx.send(message)?;
                Ok(())
            }
            None => bail!("inbound stream already closed"),
        }
    }

    /// End the inbound stream once the queued whispers are drained
    pub async fn close(&self) {
        self.inbound_tx.write().await.take();
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Everything sent so far, oldest first
    pub async fn sent(&self) -> Vec<SentWhisper> {
        self.sent.read().await.clone()
    }

    /// Drain the record of sent whispers
    pub async fn take_sent(&self) -> Vec<SentWhisper> {
        std::mem::take(&mut *self.sent.write().await)
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatTransport for MemoryTransport {
    async fn connect(&self) -> Result<()> {
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn send_whisper(&self, to: &str, text: &str) -> Result<()> {
        debug!("memory transport -> {to}: {text}");
        self.sent.write().await.push(SentWhisper {
            to: to.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn next_whisper(&self) -> Option<InboundMessage> {
        self.inbound_rx.lock().await.recv().await
    }
}
