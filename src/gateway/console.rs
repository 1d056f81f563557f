//! Terminal transport
//!
//! Every stdin line is treated as a whisper from a fixed nick and outgoing
//! whispers are printed to stdout. Lets the bot run without a chat backend.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Initial stdin/stdout transport

use anyhow::Result;
use async_trait::async_trait;
use log::{info, warn};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

use super::message::InboundMessage;
use super::transport::ChatTransport;

pub struct ConsoleTransport {
    nick: String,
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl ConsoleTransport {
    pub fn new(nick: impl Into<String>) -> Self {
        Self {
            nick: nick.into(),
            lines: Mutex::new(BufReader::new(io::stdin()).lines()),
        }
    }
}

#[async_trait]
impl ChatTransport for ConsoleTransport {
    async fn connect(&self) -> Result<()> {
        info!("Console transport ready, whispering as {}", self.nick);
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        info!("Console transport closed");
        Ok(())
    }

    async fn send_whisper(&self, to: &str, text: &str) -> Result<()> {
        let mut stdout = io::stdout();
        stdout
            .write_all(format!("-> {to}: {text}\n").as_bytes())
            .await?;
        stdout.flush().await?;
        Ok(())
    }

    async fn next_whisper(&self) -> Option<InboundMessage> {
        let mut lines = self.lines.lock().await;
        loop {
            match lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => return Some(InboundMessage::whisper(&self.nick, line)),
                Ok(None) => return None,
                Err(e) => {
                    warn!("Failed to read from stdin: {e}");
                    return None;
                }
            }
        }
    }
}
