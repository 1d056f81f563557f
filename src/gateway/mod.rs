//! # Gateway
//!
//! Everything between the command engine and the chat backend: message types,
//! the transport trait, reply routing and the bundled transports.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: Initial gateway layer with console and in-memory transports

pub mod console;
pub mod memory;
pub mod message;
pub mod reply;
pub mod transport;

pub use console::ConsoleTransport;
pub use memory::{MemoryTransport, SentWhisper};
pub use message::{InboundMessage, User};
pub use reply::ReplyGateway;
pub use transport::ChatTransport;
