//! A running game: one machine and the bag it plays against.

use tracing::{debug, warn};
use tw_core::StateBag;
use tw_engine::{HandlerOutcome, Machine, State, StepOutcome};

use crate::error::{SessionError, SessionResult};

/// An interactive session.
///
/// Owns its machine and bag outright, so sessions never observe each
/// other. Observers get snapshots of the bag, never the live one.
#[derive(Debug, Clone)]
pub struct GameSession {
    machine: Machine,
    bag: StateBag,
    started: bool,
}

impl GameSession {
    /// Wrap a compiled machine and its initial bag. Call
    /// [`start`](Self::start) before the first [`tick`](Self::tick).
    pub fn new(machine: Machine, bag: StateBag) -> Self {
        Self {
            machine,
            bag,
            started: false,
        }
    }

    /// Move the machine to its start state and run the start handlers.
    ///
    /// The session counts as started even if a handler misbehaves; the
    /// outcome is returned so callers can report it.
    pub fn start(&mut self) -> HandlerOutcome {
        let outcome = self.machine.start(&mut self.bag);
        if !outcome.is_ok() {
            warn!(?outcome, "start handlers did not complete");
        }
        debug!(state = self.machine.current_tag(), "session started");
        self.started = true;
        outcome
    }

    /// Advance one turn and return the outcome with a copy of the bag.
    pub fn tick(&mut self, input: &str) -> SessionResult<(StepOutcome, StateBag)> {
        if !self.started {
            return Err(SessionError::NotStarted);
        }
        let outcome = self.machine.step(input, &mut self.bag);
        Ok((outcome, self.bag.snapshot()))
    }

    /// A copy of the current bag.
    pub fn bag(&self) -> StateBag {
        self.bag.snapshot()
    }

    /// The current state of the root machine.
    pub fn current(&self) -> &State {
        self.machine.current()
    }

    /// The running machine.
    pub fn machine(&self) -> &Machine {
        &self.machine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tw_core::Value;
    use tw_engine::{StateGraph, StepAction, Trigger};

    fn machine() -> Machine {
        let mut graph = StateGraph::new();
        graph.add_state(State::new("entry", "Test State"));
        graph.add_state(
            State::new("next", "Testing Next").with_on_enter(Trigger::set_key("foo", Value::Int(5))),
        );
        graph
            .link("entry", "next", Trigger::on_match("transition", Vec::new()).unwrap())
            .unwrap();
        Machine::new(graph, "entry", "").unwrap()
    }

    #[test]
    fn tick_before_start_fails() {
        let mut session = GameSession::new(machine(), StateBag::new());
        assert_eq!(session.tick("test"), Err(SessionError::NotStarted));
    }

    #[test]
    fn tick_returns_snapshot() {
        let mut session = GameSession::new(machine(), StateBag::new());
        assert_eq!(session.start(), HandlerOutcome::Ok);

        let (outcome, mut snapshot) = session.tick("transition").unwrap();
        assert_eq!(outcome.action, StepAction::Transitioned);
        assert_eq!(session.current().tag(), "next");
        assert_eq!(snapshot.get("foo"), Some(&Value::Int(5)));

        // the snapshot is detached from the session
        snapshot.set("foo", Value::Int(0));
        assert_eq!(session.bag().get("foo"), Some(&Value::Int(5)));
    }

    #[test]
    fn sessions_are_isolated() {
        let template = machine();
        let bag: StateBag = [("test", "value")].into_iter().collect();

        let mut a = GameSession::new(template.clone(), bag.clone());
        let mut b = GameSession::new(template, bag.clone());
        a.start();
        b.start();
        a.tick("transition").unwrap();

        assert_eq!(a.current().tag(), "next");
        assert_eq!(b.current().tag(), "entry");
        assert!(!b.bag().contains("foo"));
        assert!(!bag.contains("foo"));
    }
}
