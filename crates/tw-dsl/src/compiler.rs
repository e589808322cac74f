//! Compile a loaded YAML document into a runnable [`Machine`].
//!
//! A document is a list of single-purpose entries:
//!
//! ```yaml
//! - title: The Cellar
//! - state_bag:
//!     lamp: unlit
//! - execute:
//!     startTag: top
//!     endTag: out
//!     states: [...]
//!     transitions: [...]
//!     global_transitions: [...]
//! - tests: [tests/cellar.yaml]
//! ```
//!
//! When a key appears in several entries the last one wins.

use serde_yaml::{Mapping, Value as Yaml};
use tracing::debug;
use tw_core::StateBag;
use tw_engine::{EngineError, Machine, State, StateGraph};

use crate::error::{CompileError, CompileResult};
use crate::registry::{Registry, scalar_text, scalar_value};

/// Title used when a document declares none.
pub const DEFAULT_TITLE: &str = "Untitled";

/// Everything a document compiles to.
#[derive(Debug, Clone)]
pub struct CompiledScript {
    /// The root machine, not yet started.
    pub machine: Machine,
    /// Initial bag contents.
    pub state_bag: StateBag,
    /// Display title.
    pub title: String,
    /// Test files, relative to the script root.
    pub tests: Vec<String>,
}

/// Compile a document with the built-in registry.
pub fn compile(document: &Yaml) -> CompileResult<CompiledScript> {
    let registry = Registry::builtin();
    let entries = collect_entries(document)?;

    let mut execute = None;
    let mut state_bag = StateBag::new();
    let mut title = DEFAULT_TITLE.to_string();
    let mut tests = Vec::new();

    for &(key, value) in &entries {
        match key {
            "execute" => execute = Some(value),
            "state_bag" => state_bag = compile_bag(value, key)?,
            "title" => {
                title = scalar_text(value).ok_or_else(|| CompileError::shape("a scalar", key))?;
            }
            "tests" => tests = compile_test_list(value, key)?,
            // unknown keys (manifest metadata, for instance) are ignored
            _ => {}
        }
    }

    let execute = execute.ok_or(CompileError::MissingExecute)?;
    let machine = compile_machine(execute, "execute", &registry)?;
    debug!(%title, bag_keys = state_bag.len(), tests = tests.len(), "compiled script");

    Ok(CompiledScript {
        machine,
        state_bag,
        title,
        tests,
    })
}

// Every top-level key, in document order.
fn collect_entries(document: &Yaml) -> CompileResult<Vec<(&str, &Yaml)>> {
    let mut out = Vec::new();
    match document {
        Yaml::Sequence(items) => {
            for (i, item) in items.iter().enumerate() {
                let Yaml::Mapping(map) = item else {
                    return Err(CompileError::shape("a mapping", &format!("[{i}]")));
                };
                push_entries(map, &format!("[{i}]"), &mut out)?;
            }
        }
        Yaml::Mapping(map) => push_entries(map, "document", &mut out)?,
        _ => return Err(CompileError::shape("a list of entries", "document")),
    }
    Ok(out)
}

fn push_entries<'a>(
    map: &'a Mapping,
    at: &str,
    out: &mut Vec<(&'a str, &'a Yaml)>,
) -> CompileResult<()> {
    for (key, value) in map {
        let Some(key) = key.as_str() else {
            return Err(CompileError::shape("string keys", at));
        };
        out.push((key, value));
    }
    Ok(())
}

fn compile_bag(value: &Yaml, at: &str) -> CompileResult<StateBag> {
    let mut bag = StateBag::new();
    match value {
        Yaml::Null => {}
        Yaml::Mapping(map) => {
            for (key, value) in map {
                let key = scalar_text(key).ok_or_else(|| CompileError::shape("scalar keys", at))?;
                let item_at = format!("{at}.{key}");
                let value =
                    scalar_value(value).ok_or_else(|| CompileError::shape("a scalar", &item_at))?;
                bag.set(key, value);
            }
        }
        _ => return Err(CompileError::shape("a mapping", at)),
    }
    Ok(bag)
}

fn compile_test_list(value: &Yaml, at: &str) -> CompileResult<Vec<String>> {
    match value {
        Yaml::Sequence(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                scalar_text(item).ok_or_else(|| CompileError::shape("a file path", &format!("{at}[{i}]")))
            })
            .collect(),
        single => Ok(vec![
            scalar_text(single).ok_or_else(|| CompileError::shape("a list of file paths", at))?,
        ]),
    }
}

fn field<'a>(entry: &'a Yaml, name: &str) -> Option<&'a Yaml> {
    entry.as_mapping().and_then(|map| map.get(name))
}

fn required<'a>(entry: &'a Yaml, name: &str, at: &str) -> CompileResult<&'a Yaml> {
    field(entry, name).ok_or_else(|| CompileError::missing(name, at))
}

fn required_text(entry: &Yaml, name: &str, at: &str) -> CompileResult<String> {
    let value = required(entry, name, at)?;
    scalar_text(value).ok_or_else(|| CompileError::shape("a scalar", &format!("{at}.{name}")))
}

// Entries may be written as `{state: {...}}` or bare.
fn unwrap_entry<'a>(entry: &'a Yaml, wrapper: &str) -> &'a Yaml {
    match field(entry, wrapper) {
        Some(inner @ Yaml::Mapping(_)) => inner,
        _ => entry,
    }
}

/// Flatten arbitrarily nested lists of entries, keeping order. Each item
/// carries its location.
fn flatten<'a>(list: &'a Yaml, at: &str, out: &mut Vec<(String, &'a Yaml)>) -> CompileResult<()> {
    match list {
        Yaml::Null => {}
        Yaml::Sequence(items) => {
            for (i, item) in items.iter().enumerate() {
                let item_at = format!("{at}[{i}]");
                match item {
                    Yaml::Sequence(_) => flatten(item, &item_at, out)?,
                    Yaml::Mapping(_) => out.push((item_at, item)),
                    _ => return Err(CompileError::shape("a mapping", &item_at)),
                }
            }
        }
        _ => return Err(CompileError::shape("a list", at)),
    }
    Ok(())
}

fn undefined_tag(err: EngineError, at: String) -> CompileError {
    match err {
        EngineError::UnknownTag(tag) => CompileError::UndefinedTag { tag, at },
    }
}

/// Compile one machine description; used recursively for sub-machines.
pub fn compile_machine(entry: &Yaml, at: &str, registry: &Registry) -> CompileResult<Machine> {
    if !entry.is_mapping() {
        return Err(CompileError::shape("a machine description", at));
    }
    let mut graph = StateGraph::new();

    let mut states = Vec::new();
    flatten(required(entry, "states", at)?, &format!("{at}.states"), &mut states)?;
    for (state_at, state) in states {
        let state = unwrap_entry(state, "state");
        compile_state(&mut graph, state, &state_at, registry)?;
    }

    let mut transitions = Vec::new();
    if let Some(list) = field(entry, "transitions") {
        flatten(list, &format!("{at}.transitions"), &mut transitions)?;
    }
    for (t_at, transition) in transitions {
        let transition = unwrap_entry(transition, "transition");
        let from = required_text(transition, "from", &t_at)?;
        let to = required_text(transition, "to", &t_at)?;
        let condition = registry.compile_section(
            required(transition, "condition", &t_at)?,
            &format!("{t_at}.condition"),
        )?;
        graph
            .link(&from, &to, condition)
            .map_err(|e| undefined_tag(e, t_at.clone()))?;
    }

    let mut globals = Vec::new();
    if let Some(list) = field(entry, "global_transitions") {
        flatten(list, &format!("{at}.global_transitions"), &mut globals)?;
    }
    for (g_at, transition) in globals {
        let transition = unwrap_entry(transition, "transition");
        let to = required_text(transition, "to", &g_at)?;
        let condition = registry.compile_section(
            required(transition, "condition", &g_at)?,
            &format!("{g_at}.condition"),
        )?;
        graph
            .global_link(&to, condition)
            .map_err(|e| undefined_tag(e, format!("{g_at}.to")))?;
    }

    let start_tag = required_text(entry, "startTag", at)?;
    let end_tag = match field(entry, "endTag") {
        Some(value) => {
            scalar_text(value).ok_or_else(|| CompileError::shape("a scalar", &format!("{at}.endTag")))?
        }
        None => String::new(),
    };
    graph
        .lookup(&start_tag)
        .map_err(|e| undefined_tag(e, format!("{at}.startTag")))?;
    graph
        .lookup(&end_tag)
        .map_err(|e| undefined_tag(e, format!("{at}.endTag")))?;

    debug!(
        at,
        states = graph.states().count(),
        start = %start_tag,
        end = %end_tag,
        "compiled machine"
    );
    Machine::new(graph, &start_tag, &end_tag).map_err(|e| undefined_tag(e, at.to_string()))
}

fn compile_state(
    graph: &mut StateGraph,
    entry: &Yaml,
    at: &str,
    registry: &Registry,
) -> CompileResult<()> {
    let tag = required_text(entry, "tag", at)?;
    let description = match field(entry, "description") {
        Some(value) => scalar_text(value)
            .ok_or_else(|| CompileError::shape("a scalar", &format!("{at}.description")))?,
        None => String::new(),
    };

    let mut state = State::new(tag, description);
    if let Some(section) = field(entry, "on_enter") {
        state = state.with_on_enter(registry.compile_section(section, &format!("{at}.on_enter"))?);
    }
    if let Some(section) = field(entry, "on_exit") {
        state = state.with_on_exit(registry.compile_section(section, &format!("{at}.on_exit"))?);
    }

    match field(entry, "sub_machine") {
        Some(sub) => {
            let sub = compile_machine(sub, &format!("{at}.sub_machine"), registry)?;
            graph.add_state_with_sub_machine(state, sub);
        }
        None => {
            graph.add_state(state);
        }
    }
    Ok(())
}
