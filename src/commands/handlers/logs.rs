//! Chat log link command
//!
//! Handles: logs, log
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Link to a user's logs, defaulting to the sender

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::{CommandArgs, CommandHandler};
use crate::commands::signature::Signature;

/// Handler for `logs [user]`, registered with an optional trailing argument
pub struct LogsHandler {
    base_url: String,
}

impl LogsHandler {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn link_for(&self, nick: &str) -> String {
        format!("{}/{nick}", self.base_url)
    }
}

#[async_trait]
impl CommandHandler for LogsHandler {
    fn signature(&self) -> Signature {
        Signature::new().arg("user").context()
    }

    fn description(&self) -> &str {
        "Links to a user's chat logs, yours if no user is given. Example: \"!logs\", \"!logs <user>\"."
    }

    async fn handle(&self, ctx: Arc<CommandContext>, args: CommandArgs) -> Result<()> {
        let nick = match args.get(0) {
            Some(user) => user.to_string(),
            None => args
                .message()
                .map(|m| m.sender.nick.clone())
                .ok_or_else(|| anyhow!("logs needs the message context"))?,
        };
        ctx.reply(&self.link_for(&nick)).await
    }
}
