//! Handler signatures and arity inspection
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Free-text trailing slot
//! - 1.0.0: Positional arguments and the message-context marker

use crate::core::error::BotError;

/// One declared handler parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    /// A single whitespace-delimited argument
    Arg(String),
    /// Everything left on the line, joined with single spaces.
    /// Only allowed as the last user argument.
    Text(String),
    /// Receives the inbound message instead of parsed text.
    /// Only allowed as the very last parameter.
    Context,
    /// Never accepted by the dispatcher
    Variadic(String),
    /// Never accepted by the dispatcher
    KeywordOnly(String),
}

/// Ordered parameter list a handler declares
///
/// ```ignore
/// // remindme <delay> <note...>, also wants the sender
/// let sig = Signature::new().arg("delay").text("note").context();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    params: Vec<Param>,
}

/// What the dispatcher needs to know about a signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    /// Number of user-argument slots
    pub total_args: usize,
    pub accepts_message_context: bool,
    /// Last user-argument slot absorbs the rest of the line
    pub captures_rest: bool,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param::Arg(name.into()));
        self
    }

    pub fn text(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param::Text(name.into()));
        self
    }

    pub fn context(mut self) -> Self {
        self.params.push(Param::Context);
        self
    }

    pub fn variadic(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param::Variadic(name.into()));
        self
    }

    pub fn keyword_only(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param::KeywordOnly(name.into()));
        self
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Names of the user-argument slots, in order
    pub fn arg_names(&self) -> Vec<&str> {
        self.params
            .iter()
            .filter_map(|p| match p {
                Param::Arg(name) | Param::Text(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Work out how many user arguments the handler takes.
    pub fn inspect(&self) -> Result<Arity, BotError> {
        for param in &self.params {
            match param {
                Param::Variadic(name) => {
                    return Err(BotError::signature(format!(
                        "variadic parameter `{name}` has no fixed arity"
                    )))
                }
                Param::KeywordOnly(name) => {
                    return Err(BotError::signature(format!(
                        "keyword-only parameter `{name}` cannot be filled from chat"
                    )))
                }
                _ => {}
            }
        }

        let accepts_message_context = matches!(self.params.last(), Some(Param::Context));
        let args = if accepts_message_context {
            &self.params[..self.params.len() - 1]
        } else {
            &self.params[..]
        };

        if args.iter().any(|p| matches!(p, Param::Context)) {
            return Err(BotError::signature(
                "the message context must be the last parameter",
            ));
        }

        let text_slots = args.iter().filter(|p| matches!(p, Param::Text(_))).count();
        let captures_rest = matches!(args.last(), Some(Param::Text(_)));
        if text_slots > 1 || (text_slots == 1 && !captures_rest) {
            return Err(BotError::signature(
                "only the last argument can capture free text",
            ));
        }

        Ok(Arity {
            total_args: args.len(),
            accepts_message_context,
            captures_rest,
        })
    }
}
