//! Control signals raised out of handlers.

use thiserror::Error;

/// A runtime failure inside a trigger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriggerError {
    /// Incrementing or decrementing a key left the integer range.
    #[error("integer overflow updating key \"{key}\"")]
    Overflow {
        /// The key being updated.
        key: String,
    },
}

/// A non-local exit from trigger evaluation.
///
/// Raising a signal stops the evaluation of the current handler or
/// condition at once, including the remaining clauses of an enclosing
/// `All`/`Any`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Signal {
    /// Show the destination once but do not commit the transition.
    #[error("enter-and-revert signaled")]
    Revert,
    /// Refuse the transition with a message for the player.
    #[error("{0}")]
    Reject(String),
    /// Something went wrong inside a trigger.
    #[error(transparent)]
    Failed(#[from] TriggerError),
}

/// The result of running a state's enter or exit handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// The handler ran to completion.
    Ok,
    /// The handler rejected the transition.
    RejectedWith(String),
    /// The handler asked for a transient, uncommitted visit.
    Revert,
    /// The handler failed unexpectedly.
    Failed(String),
}

impl HandlerOutcome {
    /// Returns true for [`HandlerOutcome::Ok`].
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// The rejection or failure message, if the handler produced one.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::RejectedWith(msg) | Self::Failed(msg) => Some(msg),
            Self::Ok | Self::Revert => None,
        }
    }
}

impl From<Result<bool, Signal>> for HandlerOutcome {
    fn from(result: Result<bool, Signal>) -> Self {
        match result {
            Ok(_) => Self::Ok,
            Err(Signal::Revert) => Self::Revert,
            Err(Signal::Reject(msg)) => Self::RejectedWith(msg),
            Err(Signal::Failed(e)) => Self::Failed(e.to_string()),
        }
    }
}
