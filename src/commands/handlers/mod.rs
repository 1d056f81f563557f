//! Per-command handler implementations
//!
//! - **Version**: 3.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 3.0.0: Whisper commands (help, roll, remindme, reminders, logs)
//! - 1.0.0: Initial extraction from monolithic command handler

pub mod help;
pub mod logs;
pub mod remind;
pub mod roll;

pub use help::HelpHandler;
pub use logs::LogsHandler;
pub use remind::{reminder_handlers, RemindMeHandler, ReminderBook, RemindersHandler};
pub use roll::RollHandler;
