use std::fmt;

use crate::trigger::Trigger;

/// Handle of a state inside one [`StateGraph`](crate::StateGraph).
///
/// Handles are assigned as states are added; two states with identical
/// content still get distinct handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub(crate) usize);

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle of a sub-machine inside the arena of the graph that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubMachineId(pub(crate) usize);

/// One narrative node.
#[derive(Debug, Clone)]
pub struct State {
    tag: String,
    description: String,
    on_enter: Option<Trigger>,
    on_exit: Option<Trigger>,
    pub(crate) sub_machine: Option<SubMachineId>,
}

impl State {
    /// Create a state with no handlers.
    pub fn new(tag: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            description: description.into(),
            on_enter: None,
            on_exit: None,
            sub_machine: None,
        }
    }

    /// Set the enter handler.
    pub fn with_on_enter(mut self, trigger: Trigger) -> Self {
        self.on_enter = Some(trigger);
        self
    }

    /// Set the exit handler.
    pub fn with_on_exit(mut self, trigger: Trigger) -> Self {
        self.on_exit = Some(trigger);
        self
    }

    /// The state's tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The raw, unsubstituted description template.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The enter handler, if any.
    pub fn on_enter(&self) -> Option<&Trigger> {
        self.on_enter.as_ref()
    }

    /// The exit handler, if any.
    pub fn on_exit(&self) -> Option<&Trigger> {
        self.on_exit.as_ref()
    }

    /// Returns true if this state owns a nested machine.
    pub fn has_sub_machine(&self) -> bool {
        self.sub_machine.is_some()
    }
}
