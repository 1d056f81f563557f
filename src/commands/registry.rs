//! Command registry
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Keywords with aliases, arity from signatures, override replacement
//! - 1.0.0: Initial implementation for handler dispatch

use log::{debug, info};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::handler::CommandHandler;
use crate::core::error::BotError;
use crate::core::response::single_line;

/// A registered command
pub struct Command {
    keyword: String,
    aliases: Vec<String>,
    handler: Arc<dyn CommandHandler>,
    required_args: usize,
    total_args: usize,
    accepts_message_context: bool,
    captures_rest: bool,
    description: String,
}

impl Command {
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Keyword first, then aliases
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.keyword.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    pub fn handler(&self) -> &Arc<dyn CommandHandler> {
        &self.handler
    }

    pub fn required_args(&self) -> usize {
        self.required_args
    }

    pub fn total_args(&self) -> usize {
        self.total_args
    }

    pub fn optional_args(&self) -> usize {
        self.total_args - self.required_args
    }

    pub fn accepts_message_context(&self) -> bool {
        self.accepts_message_context
    }

    pub fn captures_rest(&self) -> bool {
        self.captures_rest
    }

    /// Handler documentation on a single line
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("keyword", &self.keyword)
            .field("aliases", &self.aliases)
            .field("required_args", &self.required_args)
            .field("total_args", &self.total_args)
            .field("accepts_message_context", &self.accepts_message_context)
            .field("captures_rest", &self.captures_rest)
            .finish()
    }
}

/// Registration switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandOptions {
    /// Replace whatever commands own the requested names instead of failing
    pub override_existing: bool,
    /// Make the last user argument optional
    pub optional_trailing_args: bool,
}

impl CommandOptions {
    pub fn overriding(mut self) -> Self {
        self.override_existing = true;
        self
    }

    pub fn optional_trailing(mut self) -> Self {
        self.optional_trailing_args = true;
        self
    }
}

/// Registry mapping invocation names (keywords and aliases) to commands
///
/// # Example
///
/// ```ignore
/// let mut registry = CommandRegistry::new();
/// registry.add(Arc::new(RollHandler::new()), "roll", &["r"], CommandOptions::default())?;
///
/// let roll = registry.get_root("r").unwrap();
/// assert_eq!(roll.keyword(), "roll");
/// ```
#[derive(Clone, Default)]
pub struct CommandRegistry {
    names: HashMap<String, Arc<Command>>,
    order: Vec<Arc<Command>>,
}

impl CommandRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `keyword` and `aliases`
    ///
    /// Aliases repeating the keyword or each other are ignored. A name already
    /// owned by another command is a `CommandConflict` unless
    /// `options.override_existing` is set, in which case every command owning
    /// one of the names is removed (with all of its names) first.
    pub fn add(
        &mut self,
        handler: Arc<dyn CommandHandler>,
        keyword: &str,
        aliases: &[&str],
        options: CommandOptions,
    ) -> Result<Arc<Command>, BotError> {
        let arity = handler.signature().inspect()?;

        let mut own_aliases: Vec<String> = Vec::with_capacity(aliases.len());
        for name in std::iter::once(&keyword).chain(aliases.iter()) {
            if name.is_empty() || name.chars().any(char::is_whitespace) {
                return Err(BotError::InvalidName {
                    name: name.to_string(),
                });
            }
        }
        for alias in aliases {
            if *alias != keyword && !own_aliases.iter().any(|a| a.as_str() == *alias) {
                own_aliases.push(alias.to_string());
            }
        }

        let required_args = if options.optional_trailing_args {
            arity.total_args.saturating_sub(1)
        } else {
            arity.total_args
        };

        let command = Arc::new(Command {
            keyword: keyword.to_string(),
            aliases: own_aliases,
            description: single_line(handler.description()),
            handler,
            required_args,
            total_args: arity.total_args,
            accepts_message_context: arity.accepts_message_context,
            captures_rest: arity.captures_rest,
        });

        let mut owners: Vec<Arc<Command>> = Vec::new();
        for name in command.names() {
            if let Some(existing) = self.names.get(name) {
                if !options.override_existing {
                    return Err(BotError::CommandConflict {
                        name: name.to_string(),
                    });
                }
                if !owners.iter().any(|o| Arc::ptr_eq(o, existing)) {
                    owners.push(Arc::clone(existing));
                }
            }
        }

        for owner in owners {
            info!("Command \"{}\" overridden by \"{}\"", owner.keyword, command.keyword);
            self.remove(&owner);
        }

        for name in command.names() {
            self.names.insert(name.to_string(), Arc::clone(&command));
        }
        self.order.push(Arc::clone(&command));

        debug!(
            "Registered command {:?} ({} required / {} total args)",
            command.keyword, command.required_args, command.total_args
        );
        Ok(command)
    }

    fn remove(&mut self, command: &Arc<Command>) {
        for name in command.names() {
            self.names.remove(name);
        }
        self.order.retain(|c| !Arc::ptr_eq(c, command));
    }

    /// Resolve a keyword or alias to the command that owns it
    pub fn get_root(&self, name: &str) -> Option<Arc<Command>> {
        self.names.get(name).cloned()
    }

    /// Check if an invocation name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Every keyword and alias, command by command in registration order
    pub fn all_aliases(&self) -> Vec<String> {
        self.order
            .iter()
            .flat_map(|c| c.names().map(str::to_string))
            .collect()
    }

    /// Registered commands in registration order
    pub fn commands(&self) -> &[Arc<Command>] {
        &self.order
    }

    /// Number of registered commands (not names)
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
