//! The runtime machine: a graph plus a cursor.

use tracing::{debug, trace, warn};
use tw_core::StateBag;

use crate::error::EngineResult;
use crate::graph::StateGraph;
use crate::outcome::{StepAction, StepOutcome};
use crate::state::{State, StateId};
use crate::trigger::{HandlerOutcome, TriggerContext};

/// A state graph being played.
///
/// The cursor (`current`) is the only thing that changes after
/// construction, and only through [`Machine::start`] and
/// [`Machine::step`].
#[derive(Debug, Clone)]
pub struct Machine {
    graph: StateGraph,
    start: StateId,
    end: StateId,
    current: StateId,
}

impl Machine {
    /// Wrap a graph. Both tags must name states in the graph; pass `""`
    /// as `end_tag` for a machine that never ends.
    pub fn new(graph: StateGraph, start_tag: &str, end_tag: &str) -> EngineResult<Self> {
        let start = graph.lookup(start_tag)?;
        let end = graph.lookup(end_tag)?;
        Ok(Self {
            graph,
            start,
            end,
            current: start,
        })
    }

    /// The underlying graph.
    pub fn graph(&self) -> &StateGraph {
        &self.graph
    }

    /// Handle of the start state.
    pub fn start_id(&self) -> StateId {
        self.start
    }

    /// Handle of the end state.
    pub fn end_id(&self) -> StateId {
        self.end
    }

    /// Handle of the current state.
    pub fn current_id(&self) -> StateId {
        self.current
    }

    /// The current state.
    pub fn current(&self) -> &State {
        self.graph.state(self.current)
    }

    /// Tag of the current state.
    pub fn current_tag(&self) -> &str {
        self.graph.tag_of(self.current)
    }

    /// Look up any state of this machine by handle.
    pub fn state(&self, id: StateId) -> &State {
        self.graph.state(id)
    }

    /// Descriptions of the current states of every sub-machine below `id`,
    /// outermost first.
    pub fn substates(&self, id: StateId) -> Vec<&str> {
        let mut out = Vec::new();
        let mut sub = self.graph.sub_machine_of(id);
        while let Some(machine) = sub {
            out.push(machine.current().description());
            sub = machine.graph.sub_machine_of(machine.current);
        }
        out
    }

    /// Move to the start state and run its enter handler with empty input.
    ///
    /// A sub-machine owned by the start state is started first. The first
    /// handler that does not complete normally stops the start sequence and
    /// its outcome is returned.
    pub fn start(&mut self, bag: &mut StateBag) -> HandlerOutcome {
        self.current = self.start;
        if let Some(sub_id) = self.graph.state(self.current).sub_machine {
            let outcome = self.graph.sub_machines[sub_id.0].start(bag);
            if !outcome.is_ok() {
                warn!(tag = self.current_tag(), ?outcome, "sub-machine failed to start");
                return outcome;
            }
        }

        let ctx = TriggerContext::new(self.graph.tag_of(self.current), "");
        let outcome = self.graph.enter(self.current, &ctx, bag);
        if !outcome.is_ok() {
            warn!(tag = ctx.tag, ?outcome, "start state enter handler did not complete");
        }
        outcome
    }

    /// Advance one turn on `input`.
    ///
    /// An active sub-machine is stepped first and, if it transitions, the
    /// turn ends there. Otherwise the current state's local transitions and
    /// then the global transitions are tried in declaration order; the
    /// first passing condition is taken.
    pub fn step(&mut self, input: &str, bag: &mut StateBag) -> StepOutcome {
        let curr = self.current;

        let mut sub_action = StepAction::NoChange;
        if let Some(sub_id) = self.graph.state(curr).sub_machine {
            let sub = self.graph.sub_machines[sub_id.0].step(input, bag);
            if sub.action == StepAction::Transitioned {
                return StepOutcome::new(StepAction::Transitioned, curr);
            }
            sub_action = sub.action;
        }

        let ctx = TriggerContext::new(self.graph.tag_of(curr), input);
        let mut destination = None;
        for transition in self.graph.transitions_from(curr) {
            match transition.condition.evaluate(&ctx, bag) {
                Ok(true) => {
                    destination = Some(transition.destination);
                    break;
                }
                Ok(false) => {
                    trace!(from = ctx.tag, to = self.graph.tag_of(transition.destination), "condition failed");
                }
                Err(signal) => {
                    warn!(from = ctx.tag, %signal, "condition raised a signal");
                    return StepOutcome::new(StepAction::Error, curr)
                        .with_transient(transition.destination)
                        .with_message(signal.to_string());
                }
            }
        }

        let Some(dest) = destination else {
            return StepOutcome::new(sub_action, curr);
        };
        let dest_tag = self.graph.tag_of(dest);

        match self.graph.exit(curr, &ctx, bag) {
            HandlerOutcome::Ok => {}
            HandlerOutcome::RejectedWith(msg) | HandlerOutcome::Failed(msg) => {
                debug!(from = ctx.tag, to = dest_tag, %msg, "exit handler rejected transition");
                return StepOutcome::new(StepAction::Rejected, curr).with_message(msg);
            }
            HandlerOutcome::Revert => {
                debug!(from = ctx.tag, to = dest_tag, "revert raised from exit handler");
                return StepOutcome::new(StepAction::Rejected, curr)
                    .with_message("revert is only valid in an enter handler");
            }
        }

        match self.graph.enter(dest, &ctx, bag) {
            HandlerOutcome::Ok => {}
            HandlerOutcome::RejectedWith(msg) => {
                debug!(from = ctx.tag, to = dest_tag, %msg, "enter handler rejected transition");
                return StepOutcome::new(StepAction::Rejected, curr).with_message(msg);
            }
            HandlerOutcome::Revert => {
                debug!(from = ctx.tag, to = dest_tag, "transient visit");
                return StepOutcome::new(StepAction::Transient, curr).with_transient(dest);
            }
            HandlerOutcome::Failed(msg) => {
                warn!(from = ctx.tag, to = dest_tag, %msg, "enter handler failed");
                return StepOutcome::new(StepAction::Error, curr)
                    .with_transient(dest)
                    .with_message(msg);
            }
        }

        debug!(from = ctx.tag, to = dest_tag, "transitioned");
        self.current = dest;
        if dest == self.end {
            StepOutcome::new(StepAction::End, dest)
        } else {
            StepOutcome::new(StepAction::Transitioned, dest)
        }
    }
}
