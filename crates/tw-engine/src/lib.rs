//! Execution engine for Taleweaver scripts.
//!
//! A script compiles into a [`StateGraph`] of [`State`]s joined by guarded
//! transitions. A [`Machine`] wraps a graph with a cursor and advances it
//! one player input at a time. States may own nested machines; every
//! active machine in the tree sees the same input and [`StateBag`] on each
//! turn.
//!
//! [`StateBag`]: tw_core::StateBag

/// Error types for graph construction and trigger evaluation.
pub mod error;
/// The static state graph and its transitions.
pub mod graph;
/// The runtime machine and the transition search.
pub mod machine;
/// Per-turn step results.
pub mod outcome;
/// Graph nodes.
pub mod state;
/// Triggers, conditions, and their combinators.
pub mod trigger;

pub use error::{EngineError, EngineResult};
pub use graph::{StateGraph, Transition};
pub use machine::Machine;
pub use outcome::{StepAction, StepOutcome};
pub use state::{State, StateId, SubMachineId};
pub use trigger::{
    HandlerOutcome, Operand, Relation, STATE_BANNER_KEY, Signal, Trigger, TriggerContext,
    TriggerError,
};
