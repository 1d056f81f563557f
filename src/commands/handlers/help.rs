//! Built-in help command
//!
//! Handles: help, h, commands
//!
//! - **Version**: 1.0.1
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.1: Strip control characters from echoed command names
//! - 1.0.0: Command listing and per-command description

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::{CommandArgs, CommandHandler};
use crate::commands::signature::Signature;
use crate::core::response::{enclose, strip_control, truncate_for_message};

pub const HELP_KEYWORD: &str = "help";
pub const HELP_ALIASES: &[&str] = &["h", "commands"];

/// Handler for `help [command]`
pub struct HelpHandler;

#[async_trait]
impl CommandHandler for HelpHandler {
    fn signature(&self) -> Signature {
        Signature::new().arg("command")
    }

    fn description(&self) -> &str {
        r#"
        The command you're using!
        Use it to get info about available commands.
        Examples: "!help", "!help <command>".
        "#
    }

    async fn handle(&self, ctx: Arc<CommandContext>, args: CommandArgs) -> Result<()> {
        let text = match args.get(0) {
            Some(name) => describe_command(&ctx, name).await,
            None => list_commands(&ctx).await,
        };
        ctx.reply(&truncate_for_message(&text)).await
    }
}

async fn describe_command(ctx: &CommandContext, name: &str) -> String {
    let Some(command) = ctx.registry().await.get_root(name) else {
        return format!("The command `{}` was not found.", strip_control(name));
    };

    let aliases = enclose(command.aliases(), '"').join(", ");
    let aliases = if aliases.is_empty() {
        "none".to_string()
    } else {
        aliases
    };
    let description = if command.description().is_empty() {
        "no description"
    } else {
        command.description()
    };
    format!(
        "\"{}{}\" (aliases: {aliases}) -> {description}",
        ctx.prefix(),
        command.keyword()
    )
}

async fn list_commands(ctx: &CommandContext) -> String {
    let names = ctx.registry().await.all_aliases();
    if names.is_empty() {
        return "No commands are available :(".to_string();
    }
    format!(
        "Available commands: {}. For more info about a specific command, try \"{}help <command>\".",
        enclose(&names, '"').join(", "),
        ctx.prefix()
    )
}
