// Core layer - shared types and configuration
pub mod core;

// Transport layer - inbound whispers and reply gateway
pub mod gateway;

// Application layer
pub mod bot;
pub mod commands;

pub use bot::ChatBot;
pub use core::{BotError, Config};

// Re-export command items
pub use commands::{
    Command, CommandArgs, CommandContext, CommandHandler, CommandOptions, CommandRegistry,
    Dispatch, Param, Signature,
};

// Re-export gateway items
pub use gateway::{ChatTransport, InboundMessage, ReplyGateway, User};
