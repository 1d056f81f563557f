//! Command handler trait and infrastructure
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Handlers declare a Signature and receive bound CommandArgs
//! - 1.0.0: Initial implementation for modular command handling

use anyhow::Result;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

use super::context::CommandContext;
use super::signature::Signature;
use crate::core::error::BotError;
use crate::gateway::message::InboundMessage;

/// Arguments bound to a handler's user-argument slots
///
/// `values` always has one entry per slot; an absent optional argument is
/// `None`. `message` is set only for handlers that declare a trailing
/// message-context parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandArgs {
    values: Vec<Option<String>>,
    message: Option<InboundMessage>,
}

impl CommandArgs {
    pub fn new(values: Vec<Option<String>>, message: Option<InboundMessage>) -> Self {
        Self { values, message }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Slot `index`, `None` when it was optional and not supplied
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|v| v.as_deref())
    }

    /// Slot `index`, treating absence as bad input
    pub fn require(&self, index: usize) -> Result<&str, BotError> {
        self.get(index)
            .ok_or_else(|| BotError::invalid_arguments(format!("missing argument #{}", index + 1)))
    }

    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }

    pub fn message(&self) -> Option<&InboundMessage> {
        self.message.as_ref()
    }
}

/// Trait for chat command handlers
///
/// A handler declares its parameters through `signature()`; the dispatcher
/// checks the user's input against it before `handle` runs. Output goes
/// through the context's reply methods.
///
/// # Example
///
/// ```ignore
/// pub struct EchoHandler;
///
/// #[async_trait]
/// impl CommandHandler for EchoHandler {
///     fn signature(&self) -> Signature {
///         Signature::new().text("words")
///     }
///
///     async fn handle(&self, ctx: Arc<CommandContext>, args: CommandArgs) -> Result<()> {
///         ctx.reply(args.require(0)?).await
///     }
/// }
/// ```
#[async_trait]
pub trait CommandHandler: Send + Sync {
    fn signature(&self) -> Signature;

    /// Shown by `help <command>`
    fn description(&self) -> &str {
        ""
    }

    /// Run the command.
    ///
    /// Return `BotError::InvalidCommandArguments` when the arguments are
    /// well-formed in count but not in meaning; the dispatcher routes that to
    /// the invalid-arguments fallback. Any other error propagates.
    async fn handle(&self, ctx: Arc<CommandContext>, args: CommandArgs) -> Result<()>;
}

/// Adapts an async closure into a `CommandHandler`
pub struct FnHandler<F> {
    signature: Signature,
    description: String,
    f: F,
}

impl<F> FnHandler<F> {
    pub fn new(signature: Signature, description: impl Into<String>, f: F) -> Self {
        Self {
            signature,
            description: description.into(),
            f,
        }
    }
}

#[async_trait]
impl<F, Fut> CommandHandler for FnHandler<F>
where
    F: Fn(Arc<CommandContext>, CommandArgs) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    fn signature(&self) -> Signature {
        self.signature.clone()
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn handle(&self, ctx: Arc<CommandContext>, args: CommandArgs) -> Result<()> {
        (self.f)(ctx, args).await
    }
}
