//! # Command System
//!
//! Prefixed whisper commands: handler signatures, the registry, and the
//! dispatcher that routes each whisper to a handler or a fallback.
//!
//! - **Version**: 3.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 3.0.0: Signature-driven arity, aliases with override, fallback hooks
//! - 2.1.0: Add modular handler infrastructure (handler trait, context, registry)
//! - 1.0.0: Initial reorganization with modular command structure

pub mod context;
pub mod dispatcher;
pub mod handler;
pub mod handlers;
pub mod registry;
pub mod signature;

// Re-export handler infrastructure
pub use context::CommandContext;
pub use dispatcher::{Dispatch, Dispatcher};
pub use handler::{CommandArgs, CommandHandler, FnHandler};
pub use registry::{Command, CommandOptions, CommandRegistry};
pub use signature::{Arity, Param, Signature};
