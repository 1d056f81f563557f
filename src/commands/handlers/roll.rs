//! Dice rolling command
//!
//! Handles: roll, r
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Fix dice count range check (1..=20)
//! - 1.0.0: NdP[+-B] notation

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, OnceLock};

use crate::commands::context::CommandContext;
use crate::commands::handler::{CommandArgs, CommandHandler};
use crate::commands::signature::Signature;
use crate::core::error::BotError;

pub const MAX_DICE: u32 = 20;
pub const MAX_SIDES: u32 = 1000;
pub const MAX_MODIFIER: i64 = 1000;

static DICE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn dice_pattern() -> &'static Regex {
    DICE_PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^\s*(\d+)\s*d\s*(\d+)\s*(?:([+-])\s*(\d+))?\s*$")
            .expect("dice pattern is valid")
    })
}

/// A parsed `NdP[+-B]` expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceRoll {
    pub count: u32,
    pub sides: u32,
    pub modifier: i64,
}

/// Individual dice and the final sum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollOutcome {
    pub rolls: Vec<u32>,
    pub total: i64,
}

impl FromStr for DiceRoll {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = dice_pattern()
            .captures(s)
            .ok_or_else(|| BotError::invalid_arguments(format!("`{s}` is not dice notation")))?;

        let number = |i: usize| -> Result<u64, BotError> {
            caps[i]
                .parse::<u64>()
                .map_err(|_| BotError::invalid_arguments(format!("`{}` is too large", &caps[i])))
        };

        let count = number(1)?;
        if count < 1 || count > u64::from(MAX_DICE) {
            return Err(BotError::invalid_arguments(format!(
                "between 1 and {MAX_DICE} dice, please"
            )));
        }
        let sides = number(2)?;
        if sides < 1 || sides > u64::from(MAX_SIDES) {
            return Err(BotError::invalid_arguments(format!(
                "dice need between 1 and {MAX_SIDES} sides"
            )));
        }

        let modifier = match caps.get(3) {
            Some(sign) => {
                let value = number(4)?;
                if value > MAX_MODIFIER as u64 {
                    return Err(BotError::invalid_arguments(format!(
                        "modifier must be at most {MAX_MODIFIER}"
                    )));
                }
                let value = value as i64;
                if sign.as_str() == "-" {
                    -value
                } else {
                    value
                }
            }
            None => 0,
        };

        Ok(DiceRoll {
            count: count as u32,
            sides: sides as u32,
            modifier,
        })
    }
}

impl fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        match self.modifier {
            0 => Ok(()),
            m if m > 0 => write!(f, "+{m}"),
            m => write!(f, "{m}"),
        }
    }
}

impl DiceRoll {
    pub fn roll<R: Rng>(&self, rng: &mut R) -> RollOutcome {
        let rolls: Vec<u32> = (0..self.count)
            .map(|_| rng.random_range(1..=self.sides))
            .collect();
        let total = rolls.iter().map(|&r| i64::from(r)).sum::<i64>() + self.modifier;
        RollOutcome { rolls, total }
    }

    /// Reply line for an outcome, e.g. `🎲 3d6+2: [4, 1, 6] + 2 = 13`
    pub fn describe(&self, outcome: &RollOutcome) -> String {
        let rolls = outcome
            .rolls
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let modifier = match self.modifier {
            0 => String::new(),
            m if m > 0 => format!(" + {m}"),
            m => format!(" - {}", -m),
        };
        format!("🎲 {self}: [{rolls}]{modifier} = {}", outcome.total)
    }
}

/// Handler for `roll <NdP[+-B]>`
pub struct RollHandler<R = StdRng> {
    rng: Mutex<R>,
}

impl RollHandler<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }
}

impl Default for RollHandler<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng + Send> RollHandler<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    fn roll(&self, dice: &DiceRoll) -> RollOutcome {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        dice.roll(&mut *rng)
    }
}

#[async_trait]
impl<R: Rng + Send + 'static> CommandHandler for RollHandler<R> {
    fn signature(&self) -> Signature {
        Signature::new().text("dice")
    }

    fn description(&self) -> &str {
        "Rolls dice. Use the format NdP[+-B], e.g. \"!roll 3d6\" or \"!roll 1d20 + 4\". \
         At most 20 dice at a time."
    }

    async fn handle(&self, ctx: Arc<CommandContext>, args: CommandArgs) -> Result<()> {
        let dice: DiceRoll = args.require(0)?.parse()?;
        let outcome = self.roll(&dice);
        debug!("Rolled {dice}: {:?}", outcome.rolls);
        ctx.reply(&dice.describe(&outcome)).await
    }
}
