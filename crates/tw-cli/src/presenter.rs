//! Line-based rendering of a running game.

use std::io::{self, Write};

use colored::Colorize;
use tw_core::{StateBag, statify};
use tw_engine::{HandlerOutcome, Machine, STATE_BANNER_KEY, StepAction, StepOutcome};

use crate::config::PlayConfig;

/// Bag key holding the banner of the sub-state panel.
pub const SUB_BANNER_KEY: &str = "sub.banner";
/// Bag key holding the banner of the transient panel.
pub const TRANSIENT_BANNER_KEY: &str = "trans.banner";

/// Break one line into pieces of at most `width` characters, splitting at
/// the last space inside each window when there is one.
pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    if chars.len() <= width {
        return vec![line.to_string()];
    }

    let mut out = Vec::new();
    let mut n = 0;
    while n < chars.len() {
        if n + width > chars.len() {
            out.push(chars[n..].iter().collect());
            break;
        }
        let window = &chars[n..n + width];
        match window.iter().rposition(|&c| c == ' ') {
            Some(split) => {
                out.push(window[..split].iter().collect());
                n += split + 1;
            }
            None => {
                out.push(window.iter().collect());
                n += width;
            }
        }
    }
    out
}

/// Wrap multi-line text, line by line.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    text.split('\n')
        .flat_map(|line| wrap_line(line, width))
        .collect()
}

/// Writes game output to any sink.
pub struct Presenter<W: Write> {
    out: W,
    config: PlayConfig,
}

impl<W: Write> Presenter<W> {
    /// Create a presenter writing to `out`.
    pub fn new(out: W, config: PlayConfig) -> Self {
        Self { out, config }
    }

    /// Print wrapped text.
    pub fn print(&mut self, text: &str) -> io::Result<()> {
        for line in wrap_text(text, self.config.width) {
            writeln!(self.out, "{line}")?;
        }
        Ok(())
    }

    fn banner(&mut self, key: &str, bag: &StateBag) -> io::Result<()> {
        if !self.config.show_banners {
            return Ok(());
        }
        let Some(template) = bag.get(key) else {
            return Ok(());
        };
        let banner = statify(&template.to_string(), bag);
        if banner.is_empty() {
            return Ok(());
        }
        writeln!(self.out, "{}", format!("== {banner} ==").bold())
    }

    // Messages arrive already substituted and are printed as they are.
    fn message(&mut self, message: &str, is_error: bool) -> io::Result<()> {
        if is_error {
            writeln!(self.out, "{}", message.red())?;
        } else {
            self.print(message)?;
        }
        writeln!(self.out)
    }

    /// Report start handlers that refused or failed.
    pub fn start(&mut self, outcome: &HandlerOutcome) -> io::Result<()> {
        match outcome.message() {
            Some(message) => self.message(message, matches!(outcome, HandlerOutcome::Failed(_))),
            None => Ok(()),
        }
    }

    /// Print the game title.
    pub fn title(&mut self, title: &str) -> io::Result<()> {
        writeln!(self.out, "{}", title.bold().underline())?;
        writeln!(self.out)
    }

    /// Show the machine after a turn (or after start, with no outcome).
    pub fn show(
        &mut self,
        machine: &Machine,
        outcome: Option<&StepOutcome>,
        bag: &StateBag,
    ) -> io::Result<()> {
        if let Some(outcome) = outcome {
            if let Some(message) = &outcome.message {
                self.message(message, outcome.action == StepAction::Error)?;
            }
        }

        self.banner(STATE_BANNER_KEY, bag)?;
        self.print(&statify(machine.current().description(), bag))?;

        let substates = machine.substates(machine.current_id());
        if !substates.is_empty() {
            writeln!(self.out)?;
            self.banner(SUB_BANNER_KEY, bag)?;
            self.print(&statify(&substates.join("\n\n"), bag))?;
        }

        if let Some(outcome) = outcome {
            if let (StepAction::Transient, Some(transient)) = (outcome.action, outcome.transient) {
                writeln!(self.out)?;
                self.banner(TRANSIENT_BANNER_KEY, bag)?;
                self.print(&statify(machine.state(transient).description(), bag))?;
            }
            if outcome.action == StepAction::End {
                writeln!(self.out)?;
                writeln!(self.out, "{}", "Game Over!".bold())?;
            }
        }
        self.out.flush()
    }

    /// Print the input prompt without a newline.
    pub fn prompt(&mut self) -> io::Result<()> {
        write!(self.out, "{}", self.config.prompt)?;
        self.out.flush()
    }

    /// Give back the sink.
    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tw_core::Value;
    use tw_engine::{State, StateGraph, Trigger};

    fn render(f: impl FnOnce(&mut Presenter<Vec<u8>>) -> io::Result<()>) -> String {
        colored::control::set_override(false);
        let mut presenter = Presenter::new(Vec::new(), PlayConfig::default().with_width(20));
        f(&mut presenter).unwrap();
        String::from_utf8(presenter.into_inner()).unwrap()
    }

    #[test]
    fn short_lines_untouched() {
        assert_eq!(wrap_line("hello", 80), vec!["hello"]);
        assert_eq!(wrap_line("", 80), vec![""]);
    }

    #[test]
    fn wraps_at_last_space() {
        assert_eq!(
            wrap_line("the quick brown fox jumps", 10),
            vec!["the quick", "brown fox", "jumps"]
        );
    }

    #[test]
    fn hard_breaks_without_spaces() {
        assert_eq!(wrap_line("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn wraps_multibyte_text_by_character() {
        assert_eq!(wrap_line("ääää ööö", 5), vec!["ääää", "ööö"]);
    }

    #[test]
    fn wrap_text_keeps_blank_lines() {
        assert_eq!(wrap_text("a\n\nb", 80), vec!["a", "", "b"]);
    }

    fn machine() -> Machine {
        let mut inner = StateGraph::new();
        inner.add_state(State::new("lamp", "The lamp is {lamp}."));
        let mut graph = StateGraph::new();
        graph.add_state_with_sub_machine(
            State::new("room", "A room."),
            Machine::new(inner, "lamp", "").unwrap(),
        );
        graph.add_state(State::new("inv", "You carry {item}.").with_on_enter(Trigger::EnterRevert));
        graph.add_state(State::new("door", "").with_on_enter(Trigger::Reject {
            message: "It is locked.".into(),
        }));
        graph.global_link("inv", Trigger::on_match("i", Vec::new()).unwrap()).unwrap();
        graph.global_link("door", Trigger::on_match("open", Vec::new()).unwrap()).unwrap();
        Machine::new(graph, "room", "").unwrap()
    }

    fn bag() -> StateBag {
        [
            ("lamp", Value::text("lit")),
            ("item", Value::text("a key")),
            ("state.banner", Value::text("{where}")),
            ("where", Value::text("Hall")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn shows_description_substates_and_banner() {
        let machine = machine();
        let out = render(|p| p.show(&machine, None, &bag()));
        assert_eq!(out, "== Hall ==\nA room.\n\nThe lamp is lit.\n");
    }

    #[test]
    fn banners_can_be_hidden() {
        let machine = machine();
        colored::control::set_override(false);
        let mut presenter = Presenter::new(Vec::new(), PlayConfig::default().with_banners(false));
        presenter.show(&machine, None, &bag()).unwrap();
        let out = String::from_utf8(presenter.into_inner()).unwrap();
        assert!(!out.contains("Hall"));
    }

    #[test]
    fn transient_panel() {
        let mut machine = machine();
        let mut bag = bag();
        let outcome = machine.step("i", &mut bag);
        let out = render(|p| p.show(&machine, Some(&outcome), &bag));
        assert!(out.ends_with("\nYou carry a key.\n"));
    }

    #[test]
    fn rejection_message() {
        let mut machine = machine();
        let mut bag = bag();
        let outcome = machine.step("open", &mut bag);
        let out = render(|p| p.show(&machine, Some(&outcome), &bag));
        assert!(out.starts_with("It is locked.\n\n"));
    }

    #[test]
    fn rejection_message_is_not_substituted_twice() {
        let mut graph = StateGraph::new();
        graph.add_state(State::new("room", "A room."));
        graph.add_state(State::new("door", "").with_on_enter(Trigger::Reject {
            message: "Sign: {sign}".into(),
        }));
        graph.link("room", "door", Trigger::Always).unwrap();
        let mut machine = Machine::new(graph, "room", "").unwrap();
        let mut bag: StateBag = [("sign", "{secret}"), ("secret", "leaked")].into_iter().collect();

        let outcome = machine.step("", &mut bag);
        let out = render(|p| p.show(&machine, Some(&outcome), &bag));
        assert!(out.starts_with("Sign: {secret}\n\n"));
    }

    #[test]
    fn start_refusal_is_shown() {
        let out = render(|p| p.start(&HandlerOutcome::RejectedWith("You may not begin.".into())));
        assert_eq!(out, "You may not begin.\n\n");
        assert_eq!(render(|p| p.start(&HandlerOutcome::Ok)), "");
    }

    #[test]
    fn long_descriptions_wrap() {
        let out = render(|p| p.print("one two three four five six"));
        assert_eq!(out, "one two three four\nfive six\n");
    }
}
