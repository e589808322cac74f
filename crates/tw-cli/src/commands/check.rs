use std::path::Path;

use comfy_table::{ContentArrangement, Table};
use tw_engine::Machine;

/// Longest description shown in the table, in characters.
const DESCRIPTION_WIDTH: usize = 40;

pub fn run(path: &Path) -> Result<(), String> {
    let script = super::load(path)?;
    let machine = &script.machine;

    println!("{}", state_table(machine));
    println!();
    println!("  All checks passed for '{}'.", script.title);

    let graph = machine.graph();
    let states = graph.states().filter(|(_, s)| !s.tag().is_empty()).count();
    println!(
        "  {} states, {} global transitions, start: {}, end: {}",
        states,
        graph.global_transitions().len(),
        graph.tag_of(machine.start_id()),
        display_tag(graph.tag_of(machine.end_id())),
    );

    Ok(())
}

fn state_table(machine: &Machine) -> Table {
    let graph = machine.graph();
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Tag", "Description", "Transitions", "Sub-machine"]);

    for (id, state) in graph.states() {
        if state.tag().is_empty() {
            continue;
        }
        let targets: Vec<&str> = graph
            .local_transitions(id)
            .iter()
            .map(|t| graph.tag_of(t.destination))
            .collect();
        let sub = graph
            .sub_machine_of(id)
            .map(|sub| format!("starts at {}", sub.graph().tag_of(sub.start_id())))
            .unwrap_or_default();
        table.add_row(vec![
            state.tag().to_string(),
            truncate(state.description(), DESCRIPTION_WIDTH),
            targets.join(", "),
            sub,
        ]);
    }
    table
}

fn display_tag(tag: &str) -> &str {
    if tag.is_empty() { "(none)" } else { tag }
}

/// Cut `text` to `max` characters on a char boundary, marking the cut.
fn truncate(text: &str, max: usize) -> String {
    let first_line = text.lines().next().unwrap_or_default();
    if first_line.chars().count() <= max && first_line.len() == text.len() {
        return text.to_string();
    }
    let cut: String = first_line.chars().take(max.saturating_sub(3)).collect();
    format!("{cut}...")
}
