//! Reminder command handlers
//!
//! Handles: remindme, reminders
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: In-memory reminder book delivered by whisper
//! - 1.0.0: Duration parsing and formatting

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use log::{info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::commands::context::CommandContext;
use crate::commands::handler::{CommandArgs, CommandHandler};
use crate::commands::signature::Signature;
use crate::core::error::BotError;
use crate::core::response::truncate_for_message;
use crate::gateway::message::InboundMessage;

/// Longest delay a reminder may be set for (30 days)
pub const MAX_DELAY_SECONDS: i64 = 30 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReminder {
    pub id: u64,
    /// Nick as typed by the requester, used for delivery
    pub nick: String,
    pub note: String,
    pub due_at: DateTime<Utc>,
}

/// Pending reminders keyed by lower-cased nick
///
/// Shared between `remindme` and `reminders`; cloning shares the book.
#[derive(Clone, Default)]
pub struct ReminderBook {
    pending: Arc<DashMap<String, Vec<PendingReminder>>>,
    next_id: Arc<AtomicU64>,
}

impl ReminderBook {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&self, nick: &str, note: &str, delay_seconds: i64) -> PendingReminder {
        let reminder = PendingReminder {
            id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            nick: nick.to_string(),
            note: note.to_string(),
            due_at: Utc::now() + chrono::Duration::seconds(delay_seconds),
        };
        self.pending
            .entry(nick.to_lowercase())
            .or_default()
            .push(reminder.clone());
        reminder
    }

    fn remove(&self, nick: &str, id: u64) {
        let key = nick.to_lowercase();
        let now_empty = match self.pending.get_mut(&key) {
            Some(mut list) => {
                list.retain(|r| r.id != id);
                list.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.pending.remove_if(&key, |_, list| list.is_empty());
        }
    }

    /// Pending reminders for `nick` (any case), soonest first
    pub fn pending_for(&self, nick: &str) -> Vec<PendingReminder> {
        let mut list = self
            .pending
            .get(&nick.to_lowercase())
            .map(|l| l.value().clone())
            .unwrap_or_default();
        list.sort_by_key(|r| r.due_at);
        list
    }

    /// Number of pending reminders across all users
    pub fn len(&self) -> usize {
        self.pending.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handler for `remindme <delay> <note>`
pub struct RemindMeHandler {
    book: ReminderBook,
}

impl RemindMeHandler {
    pub fn new(book: ReminderBook) -> Self {
        Self { book }
    }
}

#[async_trait]
impl CommandHandler for RemindMeHandler {
    fn signature(&self) -> Signature {
        Signature::new().arg("delay").text("note").context()
    }

    fn description(&self) -> &str {
        "
        Whispers you a note after a delay.
        Example: \"!remindme 1h30m check the oven\".
        "
    }

    async fn handle(&self, ctx: Arc<CommandContext>, args: CommandArgs) -> Result<()> {
        let delay = args.require(0)?;
        let note = args.require(1)?;
        let message = sender_of(&args)?;

        let seconds = parse_duration(delay).ok_or_else(|| {
            BotError::invalid_arguments(format!(
                "`{delay}` is not a delay, use formats like 30m, 2h, 1d or 1h30m"
            ))
        })?;
        if seconds > MAX_DELAY_SECONDS {
            return Err(BotError::invalid_arguments("reminders are limited to 30 days").into());
        }

        let reminder = self.book.insert(&message.sender.nick, note, seconds);
        info!(
            "Created reminder {} for {} in {}",
            reminder.id,
            reminder.nick,
            format_duration(seconds)
        );

        let book = self.book.clone();
        let gateway = ctx.gateway().clone();
        let pending = reminder.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(seconds as u64)).await;
            book.remove(&pending.nick, pending.id);
            let text = format!("⏰ Reminder: {}", pending.note);
            if let Err(e) = gateway.whisper(&pending.nick, &text).await {
                warn!("Failed to deliver reminder {} to {}: {e}", pending.id, pending.nick);
            }
        });

        ctx.reply(&format!(
            "⏰ Got it! I'll remind you in {} (reminder #{}).",
            format_duration(seconds),
            reminder.id
        ))
        .await
    }
}

/// Handler for `reminders`
pub struct RemindersHandler {
    book: ReminderBook,
}

impl RemindersHandler {
    pub fn new(book: ReminderBook) -> Self {
        Self { book }
    }
}

#[async_trait]
impl CommandHandler for RemindersHandler {
    fn signature(&self) -> Signature {
        Signature::new().context()
    }

    fn description(&self) -> &str {
        "Lists your pending reminders."
    }

    async fn handle(&self, ctx: Arc<CommandContext>, args: CommandArgs) -> Result<()> {
        let message = sender_of(&args)?;
        let pending = self.book.pending_for(&message.sender.nick);
        if pending.is_empty() {
            return ctx.reply("📋 You don't have any pending reminders.").await;
        }

        let now = Utc::now();
        let summary = pending
            .iter()
            .map(|r| {
                let left = (r.due_at - now).num_seconds().max(0);
                format!("#{} in {}: {}", r.id, format_duration(left), r.note)
            })
            .collect::<Vec<_>>()
            .join(" | ");
        ctx.reply(&truncate_for_message(&format!("📋 {summary}")))
            .await
    }
}

fn sender_of(args: &CommandArgs) -> Result<&InboundMessage> {
    args.message()
        .ok_or_else(|| anyhow::anyhow!("reminder handlers need the message context"))
}

/// Create both reminder handlers over one shared book
pub fn reminder_handlers() -> (RemindMeHandler, RemindersHandler) {
    let book = ReminderBook::new();
    (RemindMeHandler::new(book.clone()), RemindersHandler::new(book))
}

/// Parse a time duration string like "30m", "2h", "1d", "1h30m" into seconds
pub fn parse_duration(time_str: &str) -> Option<i64> {
    let time_str = time_str.trim().to_lowercase();
    let mut total_seconds: i64 = 0;
    let mut current_number = String::new();

    for c in time_str.chars() {
        if c.is_ascii_digit() {
            current_number.push(c);
        } else if !current_number.is_empty() {
            let value: i64 = current_number.parse().ok()?;
            current_number.clear();

            let seconds = match c {
                's' => value,
                'm' => value.checked_mul(60)?,
                'h' => value.checked_mul(60 * 60)?,
                'd' => value.checked_mul(60 * 60 * 24)?,
                'w' => value.checked_mul(60 * 60 * 24 * 7)?,
                _ => return None,
            };
            total_seconds = total_seconds.checked_add(seconds)?;
        } else {
            return None;
        }
    }

    // Trailing digits without a unit
    if !current_number.is_empty() {
        return None;
    }

    if total_seconds > 0 {
        Some(total_seconds)
    } else {
        None
    }
}

/// Format a duration in seconds into a human-readable string
pub fn format_duration(seconds: i64) -> String {
    let plural = |n: i64| if n == 1 { "" } else { "s" };
    if seconds < 60 {
        format!("{seconds} second{}", plural(seconds))
    } else if seconds < 3600 {
        let mins = seconds / 60;
        format!("{mins} minute{}", plural(mins))
    } else if seconds < 86400 {
        let hours = seconds / 3600;
        let mins = (seconds % 3600) / 60;
        if mins > 0 {
            format!("{hours} hour{} {mins} minute{}", plural(hours), plural(mins))
        } else {
            format!("{hours} hour{}", plural(hours))
        }
    } else {
        let days = seconds / 86400;
        let hours = (seconds % 86400) / 3600;
        if hours > 0 {
            format!("{days} day{} {hours} hour{}", plural(days), plural(hours))
        } else {
            format!("{days} day{}", plural(days))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::registry::CommandRegistry;
    use crate::gateway::memory::MemoryTransport;
    use crate::gateway::reply::ReplyGateway;
    use tokio::sync::RwLock;

    fn context(transport: &Arc<MemoryTransport>) -> Arc<CommandContext> {
        Arc::new(CommandContext::new(
            ReplyGateway::new(transport.clone()),
            Arc::new(RwLock::new(CommandRegistry::new())),
            "!",
        ))
    }

    fn args(values: &[&str], from: &InboundMessage) -> CommandArgs {
        CommandArgs::new(
            values.iter().map(|v| Some(v.to_string())).collect(),
            Some(from.clone()),
        )
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("30s"), Some(30));
        assert_eq!(parse_duration("30m"), Some(1800));
        assert_eq!(parse_duration("2h"), Some(7200));
        assert_eq!(parse_duration("1d"), Some(86400));
        assert_eq!(parse_duration("1w"), Some(604800));
        assert_eq!(parse_duration("1h30m"), Some(5400));
        assert_eq!(parse_duration("1H30M"), Some(5400));
        assert_eq!(parse_duration("invalid"), None);
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("0m"), None);
        assert_eq!(parse_duration("10"), None);
        assert_eq!(parse_duration("10x"), None);
        assert_eq!(parse_duration("99999999999999999999w"), None);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(30), "30 seconds");
        assert_eq!(format_duration(1), "1 second");
        assert_eq!(format_duration(60), "1 minute");
        assert_eq!(format_duration(120), "2 minutes");
        assert_eq!(format_duration(3600), "1 hour");
        assert_eq!(format_duration(3660), "1 hour 1 minute");
        assert_eq!(format_duration(86400), "1 day");
        assert_eq!(format_duration(90000), "1 day 1 hour");
    }

    #[test]
    fn test_book_is_case_insensitive() {
        let book = ReminderBook::new();
        book.insert("Alice", "one", 60);
        book.insert("alice", "two", 30);

        let pending = book.pending_for("ALICE");
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].note, "two");
        assert_eq!(book.len(), 2);

        book.remove("aLiCe", pending[0].id);
        book.remove("alice", pending[1].id);
        assert!(book.is_empty());
        assert!(book.pending_for("alice").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reminder_is_whispered_after_delay() {
        let transport = Arc::new(MemoryTransport::new());
        let ctx = context(&transport);
        let (remindme, _) = reminder_handlers();
        let from = InboundMessage::whisper("Alice", "!remindme 10m stretch your legs");

        ctx.gateway().begin(&from).await;
        remindme
            .handle(ctx.clone(), args(&["10m", "stretch your legs"], &from))
            .await
            .unwrap();
        ctx.gateway().finish().await;

        assert_eq!(remindme.book.len(), 1);
        let sent = transport.take_sent().await;
        assert_eq!(
            sent[0].text,
            "⏰ Got it! I'll remind you in 10 minutes (reminder #1)."
        );

        tokio::time::sleep(Duration::from_secs(601)).await;

        let sent = transport.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "Alice");
        assert_eq!(sent[0].text, "⏰ Reminder: stretch your legs");
        assert!(remindme.book.is_empty());
    }

    #[tokio::test]
    async fn test_bad_delay_is_invalid_arguments() {
        let transport = Arc::new(MemoryTransport::new());
        let ctx = context(&transport);
        let (remindme, _) = reminder_handlers();
        let from = InboundMessage::whisper("Alice", "!remindme soon stuff");

        let err = remindme
            .handle(ctx.clone(), args(&["soon", "stuff"], &from))
            .await
            .unwrap_err();
        assert!(crate::core::error::is_invalid_arguments(&err));

        let err = remindme
            .handle(ctx, args(&["5w", "stuff"], &from))
            .await
            .unwrap_err();
        assert!(crate::core::error::is_invalid_arguments(&err));
        assert!(remindme.book.is_empty());
    }

    #[tokio::test]
    async fn test_reminders_lists_only_own() {
        let transport = Arc::new(MemoryTransport::new());
        let ctx = context(&transport);
        let (remindme, reminders) = reminder_handlers();
        remindme.book.insert("Bob", "not yours", 60);

        let from = InboundMessage::whisper("Alice", "!reminders");
        ctx.gateway().begin(&from).await;
        reminders.handle(ctx.clone(), args(&[], &from)).await.unwrap();

        remindme.book.insert("alice", "water plants", 7200);
        reminders.handle(ctx.clone(), args(&[], &from)).await.unwrap();

        let sent = transport.sent().await;
        assert_eq!(sent[0].text, "📋 You don't have any pending reminders.");
        assert!(sent[1].text.contains("water plants"));
        assert!(!sent[1].text.contains("not yours"));
    }
}
