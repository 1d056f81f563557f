//! Error kinds raised by the command engine
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.2.0: Add InvalidPrefix
//! - 1.1.0: Add InvalidName and NoRecipient
//! - 1.0.0: Initial error kinds for registration, dispatch and replies

use thiserror::Error;

/// Errors that callers of the bot are expected to match on.
///
/// Handler bodies and transports return `anyhow::Result`; these variants travel
/// inside an `anyhow::Error` and are recovered with `downcast_ref` where the
/// dispatcher needs to tell them apart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BotError {
    /// The handler declares parameters the dispatcher cannot fill.
    #[error("unsupported handler signature: {reason}")]
    Signature { reason: String },

    /// A keyword or alias is already taken by another command.
    #[error("the name `{name}` is already registered by another command")]
    CommandConflict { name: String },

    /// Commands were registered on a bot without credentials.
    #[error("setting command handlers is not very useful without a connection")]
    AnonymousConnection,

    /// A keyword or alias that could never be typed as a single token.
    #[error("invalid command name `{name}`")]
    InvalidName { name: String },

    /// A command prefix that is empty or contains whitespace.
    #[error("invalid command prefix {prefix:?}: must be non-empty and contain no whitespace")]
    InvalidPrefix { prefix: String },

    /// The transport refused the outgoing text.
    #[error("message rejected by the chat backend: {text:?}")]
    InvalidMessage { text: String },

    /// `reply` was called while no inbound message was being dispatched.
    #[error("no message is being handled, nobody to reply to")]
    NoRecipient,

    /// Raised by a handler whose own parsing of its arguments failed.
    #[error("invalid command arguments: {reason}")]
    InvalidCommandArguments { reason: String },
}

impl BotError {
    /// Shorthand for handlers rejecting their input.
    pub fn invalid_arguments(reason: impl Into<String>) -> Self {
        BotError::InvalidCommandArguments {
            reason: reason.into(),
        }
    }

    pub(crate) fn signature(reason: impl Into<String>) -> Self {
        BotError::Signature {
            reason: reason.into(),
        }
    }
}

/// Whether an `anyhow` error carries `InvalidCommandArguments`
pub fn is_invalid_arguments(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<BotError>(),
        Some(BotError::InvalidCommandArguments { .. })
    )
}
