//! # Chat Bot
//!
//! Owns the transport, command registry and dispatcher. Installs the built-in
//! help command and the default fallbacks, and drives the receive loop.
//!
//! - **Version**: 1.1.1
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.1: Validate the prefix the same way as the config loader
//! - 1.1.0: Closure-based command registration
//! - 1.0.0: Registration, fallbacks and lifecycle

use anyhow::Result;
use log::{error, info, warn};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::commands::context::CommandContext;
use crate::commands::dispatcher::{Dispatch, Dispatcher};
use crate::commands::handler::{CommandArgs, CommandHandler, FnHandler};
use crate::commands::handlers::help::{HelpHandler, HELP_ALIASES, HELP_KEYWORD};
use crate::commands::registry::{Command, CommandOptions, CommandRegistry};
use crate::commands::signature::Signature;
use crate::core::config::{validate_prefix, Config};
use crate::core::error::BotError;
use crate::gateway::message::InboundMessage;
use crate::gateway::reply::ReplyGateway;
use crate::gateway::transport::ChatTransport;

pub struct ChatBot {
    auth_token: Option<String>,
    transport: Arc<dyn ChatTransport>,
    registry: Arc<RwLock<CommandRegistry>>,
    context: Arc<CommandContext>,
    dispatcher: Dispatcher,
}

impl ChatBot {
    /// Build a bot with `help` registered and the default fallbacks installed.
    ///
    /// Without an auth token the bot is anonymous: it can still receive and
    /// answer through fallbacks, but `on_command` refuses registrations.
    pub fn new(
        auth_token: Option<String>,
        prefix: impl Into<String>,
        transport: Arc<dyn ChatTransport>,
    ) -> Result<Self> {
        let prefix = prefix.into();
        validate_prefix(&prefix)?;

        let mut registry = CommandRegistry::new();
        registry.add(
            Arc::new(HelpHandler),
            HELP_KEYWORD,
            HELP_ALIASES,
            CommandOptions::default().optional_trailing(),
        )?;
        let registry = Arc::new(RwLock::new(registry));

        let context = Arc::new(CommandContext::new(
            ReplyGateway::new(Arc::clone(&transport)),
            Arc::clone(&registry),
            prefix.clone(),
        ));
        let mut dispatcher = Dispatcher::new(prefix, Arc::clone(&registry), Arc::clone(&context));
        install_default_fallbacks(&mut dispatcher);

        Ok(Self {
            auth_token,
            transport,
            registry,
            context,
            dispatcher,
        })
    }

    pub fn from_config(config: &Config, transport: Arc<dyn ChatTransport>) -> Result<Self> {
        Self::new(
            config.auth_token.clone(),
            config.command_prefix.clone(),
            transport,
        )
    }

    pub fn is_anonymous(&self) -> bool {
        self.auth_token.is_none()
    }

    pub fn prefix(&self) -> &str {
        self.dispatcher.prefix()
    }

    pub fn context(&self) -> Arc<CommandContext> {
        Arc::clone(&self.context)
    }

    pub fn registry(&self) -> Arc<RwLock<CommandRegistry>> {
        Arc::clone(&self.registry)
    }

    /// Register a command under `keyword` and `aliases`
    pub async fn on_command(
        &self,
        keyword: &str,
        aliases: &[&str],
        options: CommandOptions,
        handler: Arc<dyn CommandHandler>,
    ) -> Result<Arc<Command>> {
        if self.is_anonymous() {
            return Err(BotError::AnonymousConnection.into());
        }
        let command = self
            .registry
            .write()
            .await
            .add(handler, keyword, aliases, options)?;
        Ok(command)
    }

    /// Register a closure as a command
    pub async fn on_command_fn<F, Fut>(
        &self,
        keyword: &str,
        aliases: &[&str],
        options: CommandOptions,
        signature: Signature,
        description: &str,
        f: F,
    ) -> Result<Arc<Command>>
    where
        F: Fn(Arc<CommandContext>, CommandArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let handler = FnHandler::new(signature, description, f);
        self.on_command(keyword, aliases, options, Arc::new(handler))
            .await
    }

    /// Replace the hook for whispers without the command prefix
    pub fn on_regular_message<F, Fut>(&mut self, hook: F)
    where
        F: Fn(Arc<CommandContext>, InboundMessage) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.dispatcher.set_on_regular_message(hook);
    }

    /// Replace the hook for prefixed whispers naming no registered command
    pub fn on_unknown_command<F, Fut>(&mut self, hook: F)
    where
        F: Fn(Arc<CommandContext>, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.dispatcher.set_on_unknown_command(hook);
    }

    /// Replace the hook for commands called with arguments they reject
    pub fn on_invalid_arguments<F, Fut>(&mut self, hook: F)
    where
        F: Fn(Arc<CommandContext>, Arc<Command>, Vec<String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.dispatcher.set_on_invalid_arguments(hook);
    }

    /// Dispatch a single whisper
    pub async fn handle(&self, message: InboundMessage) -> Result<Dispatch> {
        self.dispatcher.handle(message).await
    }

    pub async fn connect(&self) -> Result<()> {
        self.transport.connect().await?;
        info!(
            "Connected{} with prefix {:?}",
            if self.is_anonymous() { " anonymously" } else { "" },
            self.prefix()
        );
        Ok(())
    }

    pub async fn disconnect(&self) -> Result<()> {
        self.transport.disconnect().await?;
        info!("Disconnected");
        Ok(())
    }

    /// Connect, then handle whispers one at a time until the transport closes.
    ///
    /// Dispatch errors are logged and the loop keeps going.
    pub async fn run_forever(&self) -> Result<()> {
        self.connect().await?;

        while let Some(message) = self.transport.next_whisper().await {
            let sender = message.sender.clone();
            if let Err(e) = self.handle(message).await {
                error!("Error handling whisper from {sender}: {e:#}");
            }
        }

        warn!("Inbound stream closed");
        self.disconnect().await
    }
}

fn install_default_fallbacks(dispatcher: &mut Dispatcher) {
    dispatcher.set_on_regular_message(|ctx: Arc<CommandContext>, message: InboundMessage| async move {
        let text = format!(
            "Hey, {}! I'm a bot. To check what I can do, try \"{}help\".",
            message.sender.nick,
            ctx.prefix()
        );
        ctx.reply(&text).await
    });

    dispatcher.set_on_unknown_command(|ctx: Arc<CommandContext>, _name: String| async move {
        let text = format!(
            "Sorry, I don't know that one :(. Try \"{}help\".",
            ctx.prefix()
        );
        ctx.reply(&text).await
    });

    dispatcher.set_on_invalid_arguments(
        |ctx: Arc<CommandContext>, command: Arc<Command>, _raw: Vec<String>| async move {
            let prefix = ctx.prefix();
            let text = format!(
                "Invalid arguments for \"{prefix}{kw}\". Try \"{prefix}help {kw}\".",
                kw = command.keyword()
            );
            ctx.reply(&text).await
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::handlers::roll::RollHandler;
    use crate::gateway::memory::{MemoryTransport, SentWhisper};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Mutex;

    fn bot_with(token: Option<&str>) -> (ChatBot, Arc<MemoryTransport>) {
        let transport = Arc::new(MemoryTransport::new());
        let bot = ChatBot::new(token.map(str::to_string), "!", transport.clone()).unwrap();
        (bot, transport)
    }

    fn bot() -> (ChatBot, Arc<MemoryTransport>) {
        bot_with(Some("oauth:secret"))
    }

    fn texts(sent: &[SentWhisper]) -> Vec<&str> {
        sent.iter().map(|s| s.text.as_str()).collect()
    }

    async fn register_logs(bot: &ChatBot) {
        bot.on_command_fn(
            "logs",
            &["log"],
            CommandOptions::default().optional_trailing(),
            Signature::new().arg("user").context(),
            "Links to chat logs.",
            |ctx: Arc<CommandContext>, _args: CommandArgs| async move { ctx.reply("ok").await },
        )
        .await
        .unwrap();
    }

    #[test]
    fn test_bad_prefix_rejected() {
        for prefix in ["", " ", "! ", "a b"] {
            let transport = Arc::new(MemoryTransport::new());
            let err = ChatBot::new(None, prefix, transport).err().unwrap();
            assert!(
                matches!(
                    err.downcast_ref::<BotError>(),
                    Some(BotError::InvalidPrefix { .. })
                ),
                "{prefix:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_help_for_name_with_control_characters_still_answers() {
        let (bot, transport) = bot();

        let route = bot
            .handle(InboundMessage::whisper("alice", "!help a\u{7}b"))
            .await
            .unwrap();

        assert_eq!(route, Dispatch::Handled { keyword: "help".to_string() });
        assert_eq!(
            texts(&transport.take_sent().await),
            vec!["The command `ab` was not found."]
        );
    }

    #[tokio::test]
    async fn test_help_is_registered_even_when_anonymous() {
        let (bot, _) = bot_with(None);
        let registry = bot.registry();
        let registry = registry.read().await;
        assert_eq!(registry.all_aliases(), vec!["help", "h", "commands"]);
    }

    #[tokio::test]
    async fn test_anonymous_registration_fails() {
        let (bot, _) = bot_with(None);
        let err = bot
            .on_command(
                "roll",
                &["r"],
                CommandOptions::default(),
                Arc::new(RollHandler::new()),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<BotError>(),
            Some(BotError::AnonymousConnection)
        ));
        assert!(!bot.registry().read().await.contains("roll"));
    }

    #[tokio::test]
    async fn test_help_lists_commands_in_registration_order() {
        let (bot, transport) = bot();
        register_logs(&bot).await;

        bot.handle(InboundMessage::whisper("alice", "!help"))
            .await
            .unwrap();

        let sent = transport.take_sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "alice");
        assert_eq!(
            sent[0].text,
            "Available commands: \"help\", \"h\", \"commands\", \"logs\", \"log\". \
             For more info about a specific command, try \"!help <command>\"."
        );
    }

    #[tokio::test]
    async fn test_help_describes_one_command() {
        let (bot, transport) = bot();
        register_logs(&bot).await;

        bot.handle(InboundMessage::whisper("alice", "!help logs"))
            .await
            .unwrap();
        bot.handle(InboundMessage::whisper("alice", "!h log"))
            .await
            .unwrap();
        bot.handle(InboundMessage::whisper("alice", "!help nope"))
            .await
            .unwrap();

        let sent = transport.take_sent().await;
        assert_eq!(
            texts(&sent),
            vec![
                "\"!logs\" (aliases: \"log\") -> Links to chat logs.",
                "\"!logs\" (aliases: \"log\") -> Links to chat logs.",
                "The command `nope` was not found."
            ]
        );
    }

    #[tokio::test]
    async fn test_default_fallbacks() {
        let (bot, transport) = bot();
        register_logs(&bot).await;

        bot.handle(InboundMessage::whisper("Bob", "hi there"))
            .await
            .unwrap();
        bot.handle(InboundMessage::whisper("Bob", "!dance"))
            .await
            .unwrap();
        bot.handle(InboundMessage::whisper("Bob", "!logs a b"))
            .await
            .unwrap();

        let sent = transport.take_sent().await;
        assert!(sent.iter().all(|s| s.to == "Bob"));
        assert_eq!(
            texts(&sent),
            vec![
                "Hey, Bob! I'm a bot. To check what I can do, try \"!help\".",
                "Sorry, I don't know that one :(. Try \"!help\".",
                "Invalid arguments for \"!logs\". Try \"!help logs\"."
            ]
        );
    }

    #[tokio::test]
    async fn test_roll_end_to_end() {
        let (bot, transport) = bot();
        bot.on_command(
            "roll",
            &["r"],
            CommandOptions::default(),
            Arc::new(RollHandler::with_rng(StdRng::seed_from_u64(1))),
        )
        .await
        .unwrap();

        let ok = bot
            .handle(InboundMessage::whisper("eve", "!r 3d6"))
            .await
            .unwrap();
        let bad = bot
            .handle(InboundMessage::whisper("eve", "!roll abc"))
            .await
            .unwrap();
        let too_many = bot
            .handle(InboundMessage::whisper("eve", "!roll 21d6"))
            .await
            .unwrap();

        assert_eq!(ok, Dispatch::Handled { keyword: "roll".to_string() });
        assert_eq!(bad, Dispatch::InvalidArguments { keyword: "roll".to_string() });
        assert_eq!(too_many, Dispatch::InvalidArguments { keyword: "roll".to_string() });

        let sent = transport.take_sent().await;
        assert_eq!(sent.len(), 3);
        assert!(sent[0].text.starts_with("🎲 3d6: ["));
        assert_eq!(sent[1].text, "Invalid arguments for \"!roll\". Try \"!help roll\".");
    }

    #[tokio::test]
    async fn test_override_replaces_owner() {
        let (bot, transport) = bot();
        bot.on_command_fn(
            "old",
            &["o"],
            CommandOptions::default(),
            Signature::new(),
            "",
            |ctx: Arc<CommandContext>, _args: CommandArgs| async move { ctx.reply("old").await },
        )
        .await
        .unwrap();

        let conflict = bot
            .on_command_fn(
                "new",
                &["o"],
                CommandOptions::default(),
                Signature::new(),
                "",
                |ctx: Arc<CommandContext>, _args: CommandArgs| async move { ctx.reply("new").await },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            conflict.downcast_ref::<BotError>(),
            Some(BotError::CommandConflict { name }) if name == "o"
        ));

        bot.on_command_fn(
            "new",
            &["o"],
            CommandOptions::default().overriding(),
            Signature::new(),
            "",
            |ctx: Arc<CommandContext>, _args: CommandArgs| async move { ctx.reply("new").await },
        )
        .await
        .unwrap();

        bot.handle(InboundMessage::whisper("z", "!o")).await.unwrap();
        let old = bot.handle(InboundMessage::whisper("z", "!old")).await.unwrap();

        assert_eq!(old, Dispatch::UnknownCommand { name: "old".to_string() });
        assert_eq!(texts(&transport.take_sent().await)[0], "new");
    }

    #[tokio::test]
    async fn test_custom_fallbacks_replace_defaults() {
        let (mut bot, transport) = bot();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let s = Arc::clone(&seen);
        bot.on_unknown_command(move |_ctx, name| {
            s.lock().unwrap().push(name);
            async { Ok::<(), anyhow::Error>(()) }
        });

        bot.handle(InboundMessage::whisper("z", "!"))
            .await
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![String::new()]);
        assert!(transport.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_run_forever_survives_handler_errors() {
        let (bot, transport) = bot();
        bot.on_command_fn(
            "boom",
            &[],
            CommandOptions::default(),
            Signature::new(),
            "",
            |_ctx: Arc<CommandContext>, _args: CommandArgs| async {
                Err::<(), anyhow::Error>(anyhow::anyhow!("kaboom"))
            },
        )
        .await
        .unwrap();

        transport
            .push(InboundMessage::whisper("a", "!boom"))
            .await
            .unwrap();
        transport
            .push(InboundMessage::whisper("a", "!help boom"))
            .await
            .unwrap();
        transport.close().await;

        bot.run_forever().await.unwrap();

        let sent = transport.sent().await;
        assert_eq!(texts(&sent), vec!["\"!boom\" (aliases: none) -> no description"]);
        assert!(!transport.is_connected());
        assert!(bot.context().gateway().current_recipient().await.is_none());
    }
}
