//! Whisper routing
//!
//! Decides, for every inbound whisper, which single piece of code runs: the
//! matching command handler or one of the three fallbacks.
//!
//! - **Version**: 1.3.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.3.0: Serialize overlapping dispatches so each keeps its own reply target
//! - 1.2.0: Redirect InvalidCommandArguments raised by handlers to the fallback
//! - 1.1.0: Free-text trailing slot
//! - 1.0.0: Prefix detection, alias resolution and arity validation

use anyhow::Result;
use log::{debug, info};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::context::CommandContext;
use super::handler::CommandArgs;
use super::registry::{Command, CommandRegistry};
use crate::core::error::is_invalid_arguments;
use crate::gateway::message::InboundMessage;

pub type HookFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;

type RegularMessageHook = Box<dyn Fn(Arc<CommandContext>, InboundMessage) -> HookFuture + Send + Sync>;
type UnknownCommandHook = Box<dyn Fn(Arc<CommandContext>, String) -> HookFuture + Send + Sync>;
type InvalidArgumentsHook =
    Box<dyn Fn(Arc<CommandContext>, Arc<Command>, Vec<String>) -> HookFuture + Send + Sync>;

/// Route taken for one whisper
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// No prefix; went to the regular-message fallback
    RegularMessage,
    /// Prefix but no such command
    UnknownCommand { name: String },
    /// Arity mismatch, or the handler rejected its arguments
    InvalidArguments { keyword: String },
    /// The command handler ran to completion
    Handled { keyword: String },
}

/// Split a prefixed whisper into invocation name and argument tokens.
///
/// Returns `None` when `text` does not start with `prefix`. A bare prefix
/// yields an empty invocation name.
pub fn parse_invocation(text: &str, prefix: &str) -> Option<(String, Vec<String>)> {
    let rest = text.strip_prefix(prefix)?;
    let mut tokens = rest.split_whitespace().map(str::to_string);
    let name = tokens.next().unwrap_or_default();
    Some((name, tokens.collect()))
}

/// Bind argument tokens to a command's user-argument slots.
///
/// The result has exactly `total_args` entries, with `None` for a missing
/// optional slot. `None` overall means the token count does not fit.
pub fn bind_arguments(command: &Command, tokens: &[String]) -> Option<Vec<Option<String>>> {
    let total = command.total_args();
    let mut values: Vec<Option<String>> = Vec::with_capacity(total);

    if command.captures_rest() && tokens.len() > total {
        values.extend(tokens[..total - 1].iter().cloned().map(Some));
        values.push(Some(tokens[total - 1..].join(" ")));
    } else {
        if tokens.len() > total {
            return None;
        }
        values.extend(tokens.iter().cloned().map(Some));
    }

    if values.len() < command.required_args() {
        return None;
    }
    values.resize(total, None);
    Some(values)
}

fn ignore_regular_message(_: Arc<CommandContext>, _: InboundMessage) -> HookFuture {
    Box::pin(async { Ok(()) })
}

fn ignore_unknown_command(_: Arc<CommandContext>, _: String) -> HookFuture {
    Box::pin(async { Ok(()) })
}

fn ignore_invalid_arguments(_: Arc<CommandContext>, _: Arc<Command>, _: Vec<String>) -> HookFuture {
    Box::pin(async { Ok(()) })
}

pub struct Dispatcher {
    prefix: String,
    registry: Arc<RwLock<CommandRegistry>>,
    context: Arc<CommandContext>,
    on_regular_message: RegularMessageHook,
    on_unknown_command: UnknownCommandHook,
    on_invalid_arguments: InvalidArgumentsHook,
    /// Held for a whole dispatch; the reply gateway tracks one sender at a time
    in_flight: Mutex<()>,
}

impl Dispatcher {
    /// Fallbacks start out as no-ops
    pub fn new(
        prefix: impl Into<String>,
        registry: Arc<RwLock<CommandRegistry>>,
        context: Arc<CommandContext>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            registry,
            context,
            on_regular_message: Box::new(ignore_regular_message),
            on_unknown_command: Box::new(ignore_unknown_command),
            on_invalid_arguments: Box::new(ignore_invalid_arguments),
            in_flight: Mutex::new(()),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn set_on_regular_message<F, Fut>(&mut self, hook: F)
    where
        F: Fn(Arc<CommandContext>, InboundMessage) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.on_regular_message = Box::new(
            move |ctx: Arc<CommandContext>, message: InboundMessage| -> HookFuture {
                Box::pin(hook(ctx, message))
            },
        );
    }

    pub fn set_on_unknown_command<F, Fut>(&mut self, hook: F)
    where
        F: Fn(Arc<CommandContext>, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.on_unknown_command =
            Box::new(move |ctx: Arc<CommandContext>, name: String| -> HookFuture {
                Box::pin(hook(ctx, name))
            });
    }

    pub fn set_on_invalid_arguments<F, Fut>(&mut self, hook: F)
    where
        F: Fn(Arc<CommandContext>, Arc<Command>, Vec<String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.on_invalid_arguments = Box::new(
            move |ctx: Arc<CommandContext>, command: Arc<Command>, raw: Vec<String>| -> HookFuture {
                Box::pin(hook(ctx, command, raw))
            },
        );
    }

    /// Route one whisper to its handler or fallback and wait for it to finish.
    ///
    /// The sender is the reply target for the whole dispatch. Concurrent
    /// calls are queued and run one after another. Errors from
    /// handlers or fallbacks propagate, except `InvalidCommandArguments`
    /// raised by a command handler, which is routed to the invalid-arguments
    /// fallback instead.
    pub async fn handle(&self, message: InboundMessage) -> Result<Dispatch> {
        let request_id = Uuid::new_v4();
        debug!(
            "[{request_id}] Whisper from {}: {:?}",
            message.sender, message.text
        );

        let _in_flight = self.in_flight.lock().await;
        let gateway = self.context.gateway();
        gateway.begin(&message).await;
        let result = self.route(request_id, message).await;
        gateway.finish().await;
        result
    }

    async fn route(&self, request_id: Uuid, message: InboundMessage) -> Result<Dispatch> {
        let ctx = Arc::clone(&self.context);

        let Some((name, tokens)) = parse_invocation(&message.text, &self.prefix) else {
            (self.on_regular_message)(ctx, message).await?;
            return Ok(Dispatch::RegularMessage);
        };

        // Read guard is dropped at the end of this statement
        let command = self.registry.read().await.get_root(&name);
        let Some(command) = command else {
            debug!("[{request_id}] Unknown command {name:?}");
            (self.on_unknown_command)(ctx, name.clone()).await?;
            return Ok(Dispatch::UnknownCommand { name });
        };

        let keyword = command.keyword().to_string();
        let Some(values) = bind_arguments(&command, &tokens) else {
            debug!(
                "[{request_id}] {keyword}: {} argument(s) given, expected {}..={}",
                tokens.len(),
                command.required_args(),
                command.total_args()
            );
            (self.on_invalid_arguments)(ctx, command, tokens).await?;
            return Ok(Dispatch::InvalidArguments { keyword });
        };

        let context_message = command.accepts_message_context().then(|| message.clone());
        let args = CommandArgs::new(values, context_message);

        info!(
            "[{request_id}] Running {keyword} for {}",
            message.sender
        );
        match command
            .handler()
            .handle(Arc::clone(&ctx), args)
            .await
        {
            Ok(()) => Ok(Dispatch::Handled { keyword }),
            Err(e) if is_invalid_arguments(&e) => {
                debug!("[{request_id}] {keyword} rejected its arguments: {e}");
                (self.on_invalid_arguments)(ctx, command, tokens).await?;
                Ok(Dispatch::InvalidArguments { keyword })
            }
            Err(e) => Err(e),
        }
    }
}
