//! # Core Module
//!
//! Configuration, error kinds and outgoing text helpers shared by every layer.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: Add error module; response helpers target whisper limits
//! - 1.0.0: Initial creation with config module

pub mod config;
pub mod error;
pub mod response;

// Re-export commonly used items
pub use config::{validate_prefix, Config};
pub use error::{is_invalid_arguments, BotError};
pub use response::{
    enclose, is_sendable, single_line, strip_control, truncate_for_message, MESSAGE_LIMIT,
};
