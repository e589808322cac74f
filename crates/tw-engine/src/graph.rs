use std::collections::HashMap;

use tw_core::StateBag;

use crate::error::{EngineError, EngineResult};
use crate::machine::Machine;
use crate::state::{State, StateId, SubMachineId};
use crate::trigger::{HandlerOutcome, Signal, Trigger, TriggerContext};

/// A guarded edge between two states.
#[derive(Debug, Clone)]
pub struct Transition {
    /// Source state; `None` for global transitions.
    pub origin: Option<StateId>,
    /// Target state.
    pub destination: StateId,
    /// Guard evaluated against the turn's input and the bag.
    pub condition: Trigger,
}

#[derive(Debug, Clone, Copy)]
enum Handler {
    Enter,
    Exit,
}

/// The compiled, immutable topology of one machine.
///
/// States live in an arena addressed by [`StateId`]; sub-machines owned by
/// states live in a second arena addressed by [`SubMachineId`]. Every graph
/// contains the sentinel state tagged `""`.
#[derive(Debug, Clone)]
pub struct StateGraph {
    states: Vec<State>,
    by_tag: HashMap<String, StateId>,
    local: HashMap<StateId, Vec<Transition>>,
    global: Vec<Transition>,
    pub(crate) sub_machines: Vec<Machine>,
}

impl Default for StateGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl StateGraph {
    /// Create a graph holding only the sentinel state.
    pub fn new() -> Self {
        let mut graph = Self {
            states: Vec::new(),
            by_tag: HashMap::new(),
            local: HashMap::new(),
            global: Vec::new(),
            sub_machines: Vec::new(),
        };
        graph.add_state(State::new("", ""));
        graph
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Add a state. A state already registered under the same tag is
    /// replaced for lookups; the new handle starts with no transitions.
    pub fn add_state(&mut self, state: State) -> StateId {
        let id = StateId(self.states.len());
        self.by_tag.insert(state.tag().to_string(), id);
        self.states.push(state);
        id
    }

    /// Add a state that owns `sub_machine` for its whole lifetime.
    pub fn add_state_with_sub_machine(&mut self, mut state: State, sub_machine: Machine) -> StateId {
        let sub_id = SubMachineId(self.sub_machines.len());
        self.sub_machines.push(sub_machine);
        state.sub_machine = Some(sub_id);
        self.add_state(state)
    }

    /// Append a local transition from `from` to `to`.
    pub fn link(&mut self, from: &str, to: &str, condition: Trigger) -> EngineResult<()> {
        let origin = self.lookup(from)?;
        let destination = self.lookup(to)?;
        self.local.entry(origin).or_default().push(Transition {
            origin: Some(origin),
            destination,
            condition,
        });
        Ok(())
    }

    /// Append a transition to `to` that applies from every state.
    pub fn global_link(&mut self, to: &str, condition: Trigger) -> EngineResult<()> {
        let destination = self.lookup(to)?;
        self.global.push(Transition {
            origin: None,
            destination,
            condition,
        });
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Resolve a tag to its current handle.
    pub fn lookup(&self, tag: &str) -> EngineResult<StateId> {
        self.get(tag)
            .ok_or_else(|| EngineError::UnknownTag(tag.to_string()))
    }

    /// Resolve a tag, if declared.
    pub fn get(&self, tag: &str) -> Option<StateId> {
        self.by_tag.get(tag).copied()
    }

    /// The state behind a handle.
    ///
    /// Handles are only minted by this graph, so every handle is valid.
    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.0]
    }

    /// Reverse lookup: the tag a handle was registered under.
    pub fn tag_of(&self, id: StateId) -> &str {
        self.state(id).tag()
    }

    /// The machine owned by a state, if any.
    pub fn sub_machine_of(&self, id: StateId) -> Option<&Machine> {
        self.state(id)
            .sub_machine
            .map(|sub| &self.sub_machines[sub.0])
    }

    /// States reachable by tag, in the order they were added. The sentinel
    /// is included.
    pub fn states(&self) -> impl Iterator<Item = (StateId, &State)> {
        self.states
            .iter()
            .enumerate()
            .map(|(idx, state)| (StateId(idx), state))
            .filter(|(id, state)| self.by_tag.get(state.tag()) == Some(id))
    }

    /// Local transitions leaving `id`, in declaration order.
    pub fn local_transitions(&self, id: StateId) -> &[Transition] {
        self.local.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Global transitions, in declaration order.
    pub fn global_transitions(&self) -> &[Transition] {
        &self.global
    }

    /// Candidate transitions for a turn in `id`: locals first, then globals.
    pub fn transitions_from(&self, id: StateId) -> impl Iterator<Item = &Transition> {
        self.local_transitions(id)
            .iter()
            .chain(self.global.iter())
    }

    // -----------------------------------------------------------------------
    // Handlers
    // -----------------------------------------------------------------------

    /// Run the enter handler of `id`, cascading into the active sub-state.
    pub fn enter(&self, id: StateId, ctx: &TriggerContext<'_>, bag: &mut StateBag) -> HandlerOutcome {
        self.run_handler(id, Handler::Enter, ctx, bag).into()
    }

    /// Run the exit handler of `id`, cascading into the active sub-state.
    pub fn exit(&self, id: StateId, ctx: &TriggerContext<'_>, bag: &mut StateBag) -> HandlerOutcome {
        self.run_handler(id, Handler::Exit, ctx, bag).into()
    }

    // The active sub-state's handler always runs before the state's own.
    fn run_handler(
        &self,
        id: StateId,
        handler: Handler,
        ctx: &TriggerContext<'_>,
        bag: &mut StateBag,
    ) -> Result<bool, Signal> {
        if let Some(sub) = self.sub_machine_of(id) {
            sub.graph()
                .run_handler(sub.current_id(), handler, ctx, bag)?;
        }
        let state = self.state(id);
        let trigger = match handler {
            Handler::Enter => state.on_enter(),
            Handler::Exit => state.on_exit(),
        };
        match trigger {
            Some(trigger) => trigger.evaluate(ctx, bag),
            None => Ok(true),
        }
    }
}
