//! Triggers and conditions.
//!
//! A [`Trigger`] is one named, parameterized function of the current state,
//! the player's input and the state bag. Conditions answer a yes/no
//! question; side-effecting triggers mutate the bag and answer `true`, so
//! both kinds compose freely under [`Trigger::All`] and [`Trigger::Any`].

mod compare;
mod signal;

pub use compare::{Operand, Relation, compare_keys, compare_with_value};
pub use signal::{HandlerOutcome, Signal, TriggerError};

use regex::{Regex, RegexBuilder};
use tw_core::{StateBag, Value, statify};

/// Bag key read by presenters as the main panel's banner.
pub const STATE_BANNER_KEY: &str = "state.banner";

/// What a trigger can see about the turn it runs in.
#[derive(Debug, Clone, Copy)]
pub struct TriggerContext<'a> {
    /// Tag of the state the machine is currently in.
    pub tag: &'a str,
    /// The player's input for this turn (`""` on start).
    pub input: &'a str,
}

impl<'a> TriggerContext<'a> {
    /// Create a context.
    pub fn new(tag: &'a str, input: &'a str) -> Self {
        Self { tag, input }
    }
}

/// A compiled trigger or condition.
#[derive(Debug, Clone)]
pub enum Trigger {
    /// Store a value; text is template-substituted first.
    SetKey {
        /// Key to write.
        key: String,
        /// Value to write.
        value: Value,
    },
    /// Add one to an integer key.
    Inc {
        /// Key to update.
        key: String,
    },
    /// Subtract one from an integer key.
    Dec {
        /// Key to update.
        key: String,
    },
    /// Full, case-insensitive regex match against the input.
    OnMatch {
        /// Anchored pattern.
        pattern: Regex,
        /// Bag keys receiving the capture groups, in order.
        captures: Vec<String>,
    },
    /// Equality of a key with a literal or another key.
    OnKey {
        /// Key to test.
        key: String,
        /// What it must equal.
        operand: Operand,
    },
    /// Ordering of a key against a literal or another key.
    Compare {
        /// Key on the left-hand side.
        key: String,
        /// Required relation.
        relation: Relation,
        /// Right-hand side.
        operand: Operand,
    },
    /// The current state has this tag.
    OnTag {
        /// Expected tag.
        tag: String,
    },
    /// Always true.
    Always,
    /// True if every clause is; all clauses are evaluated.
    All(Vec<Trigger>),
    /// True if any clause is; all clauses are evaluated.
    Any(Vec<Trigger>),
    /// Signal a transient visit to the destination.
    EnterRevert,
    /// Refuse the transition with a (templated) message.
    Reject {
        /// Message template.
        message: String,
    },
    /// Set the main panel banner (templated).
    Banner {
        /// Banner template.
        value: String,
    },
}

impl Trigger {
    /// Build an `on_match` condition from a user pattern.
    ///
    /// The pattern must match the whole input, ignoring case. It is parsed
    /// on its own before anchoring so an unbalanced group cannot escape the
    /// anchors.
    pub fn on_match(pattern: &str, captures: Vec<String>) -> Result<Self, regex::Error> {
        Regex::new(pattern)?;
        let pattern = RegexBuilder::new(&format!(r"\A(?:{pattern})\z"))
            .case_insensitive(true)
            .build()?;
        Ok(Self::OnMatch { pattern, captures })
    }

    /// `set_key` shorthand.
    pub fn set_key(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::SetKey {
            key: key.into(),
            value: value.into(),
        }
    }

    /// `on_key` against a literal value.
    pub fn on_key(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::OnKey {
            key: key.into(),
            operand: Operand::Value(value.into()),
        }
    }

    /// `on_tag` shorthand.
    pub fn on_tag(tag: impl Into<String>) -> Self {
        Self::OnTag { tag: tag.into() }
    }

    /// Evaluate against the bag.
    ///
    /// Conditions return their verdict; mutating triggers return `true`.
    /// A [`Signal`] aborts evaluation immediately.
    pub fn evaluate(&self, ctx: &TriggerContext<'_>, bag: &mut StateBag) -> Result<bool, Signal> {
        match self {
            Trigger::SetKey { key, value } => {
                let value = match value {
                    Value::Text(s) => Value::Text(statify(s, bag)),
                    other => other.clone(),
                };
                bag.set(key.clone(), value);
                Ok(true)
            }
            Trigger::Inc { key } => step_key(key, 1, bag),
            Trigger::Dec { key } => step_key(key, -1, bag),
            Trigger::OnMatch { pattern, captures } => {
                let Some(caps) = pattern.captures(ctx.input) else {
                    return Ok(false);
                };
                for (key, group) in captures.iter().zip(caps.iter().skip(1)) {
                    if let Some(group) = group {
                        bag.set(key.clone(), group.as_str());
                    }
                }
                Ok(true)
            }
            Trigger::OnKey { key, operand } => Ok(match operand {
                Operand::Value(value) => bag.get(key) == Some(value),
                Operand::Key(other) => compare_keys(key, other, bag).is_eq(),
            }),
            Trigger::Compare {
                key,
                relation,
                operand,
            } => {
                let ordering = match operand {
                    Operand::Value(value) => compare_with_value(key, value, bag),
                    Operand::Key(other) => compare_keys(key, other, bag),
                };
                Ok(relation.holds(ordering))
            }
            Trigger::OnTag { tag } => Ok(ctx.tag == tag),
            Trigger::Always => Ok(true),
            Trigger::All(clauses) => {
                let results = evaluate_each(clauses, ctx, bag)?;
                Ok(results.iter().all(|&r| r))
            }
            Trigger::Any(clauses) => {
                let results = evaluate_each(clauses, ctx, bag)?;
                Ok(results.iter().any(|&r| r))
            }
            Trigger::EnterRevert => Err(Signal::Revert),
            Trigger::Reject { message } => Err(Signal::Reject(statify(message, bag))),
            Trigger::Banner { value } => {
                let banner = statify(value, bag);
                bag.set(STATE_BANNER_KEY, banner);
                Ok(true)
            }
        }
    }
}

// Every clause runs, even after the verdict is already known.
fn evaluate_each(
    clauses: &[Trigger],
    ctx: &TriggerContext<'_>,
    bag: &mut StateBag,
) -> Result<Vec<bool>, Signal> {
    let mut results = Vec::with_capacity(clauses.len());
    for clause in clauses {
        results.push(clause.evaluate(ctx, bag)?);
    }
    Ok(results)
}

fn step_key(key: &str, delta: i64, bag: &mut StateBag) -> Result<bool, Signal> {
    let next = bag
        .int_or_zero(key)
        .checked_add(delta)
        .ok_or_else(|| TriggerError::Overflow {
            key: key.to_string(),
        })?;
    bag.set(key, next);
    Ok(true)
}
