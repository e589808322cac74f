//! What one call to [`Machine::step`](crate::Machine::step) reports.

use std::fmt;

use crate::state::StateId;

/// The kind of result a turn produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    /// No transition fired.
    NoChange,
    /// The machine (or an active sub-machine) moved to a new state.
    Transitioned,
    /// The machine reached its end state.
    End,
    /// The destination was shown once without being committed.
    Transient,
    /// A handler failed unexpectedly; nothing was committed.
    Error,
    /// A handler refused the transition; nothing was committed.
    Rejected,
}

impl fmt::Display for StepAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoChange => "no change",
            Self::Transitioned => "transitioned",
            Self::End => "end",
            Self::Transient => "transient",
            Self::Error => "error",
            Self::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

/// The result of one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    /// What happened.
    pub action: StepAction,
    /// The state the machine is in after the turn.
    pub state: StateId,
    /// The destination shown for this turn only (`Transient` and `Error`).
    pub transient: Option<StateId>,
    /// Player-facing or diagnostic message (`Rejected` and `Error`).
    pub message: Option<String>,
}

impl StepOutcome {
    /// An outcome with no transient state or message.
    pub fn new(action: StepAction, state: StateId) -> Self {
        Self {
            action,
            state,
            transient: None,
            message: None,
        }
    }

    /// Attach a transient destination.
    pub fn with_transient(mut self, transient: StateId) -> Self {
        self.transient = Some(transient);
        self
    }

    /// Attach a message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
