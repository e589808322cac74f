//! Scripted playthrough tests.
//!
//! A test file maps test names to a list of steps:
//!
//! ```yaml
//! opens_the_door:
//!   steps:
//!     - assert: { tag: hall }
//!     - input: open door
//!     - assert: [{ tag: vault }, { eq: { key: door, value: open } }]
//! ```
//!
//! An `input` step feeds one line to the game and passes unless the turn
//! ends in an error. An `assert` step evaluates a condition against the
//! current state with empty input, on a copy of the bag so that assertions
//! never change the game.

use std::path::Path;

use serde_yaml::Value as Yaml;
use tracing::debug;
use tw_core::StateBag;
use tw_dsl::{DslError, Registry, loader};
use tw_engine::{Machine, StepAction, Trigger, TriggerContext};

use crate::error::{SessionError, SessionResult};
use crate::session::GameSession;

/// What a step does.
#[derive(Debug, Clone)]
pub enum StepKind {
    /// Feed a line of input.
    Input(String),
    /// Check a condition.
    Assert(Trigger),
}

/// One step of a test.
#[derive(Debug, Clone)]
pub struct TestStep {
    /// The action.
    pub kind: StepKind,
    /// The step as written, for reports.
    pub label: String,
}

impl TestStep {
    /// Parse a step entry, compiling assertions with `registry`.
    pub fn parse(entry: &Yaml, registry: &Registry, at: &str) -> SessionResult<Self> {
        let label = flow(entry);
        let map = entry
            .as_mapping()
            .ok_or_else(|| SessionError::BadStep(label.clone()))?;

        let kind = if let Some(condition) = map.get("assert") {
            let trigger = registry
                .compile_section(condition, &format!("{at}.assert"))
                .map_err(DslError::from)?;
            StepKind::Assert(trigger)
        } else if let Some(input) = map.get("input") {
            let text = match input {
                Yaml::String(s) => s.clone(),
                Yaml::Number(n) => n.to_string(),
                Yaml::Bool(b) => b.to_string(),
                Yaml::Null => String::new(),
                _ => return Err(SessionError::BadStep(label)),
            };
            StepKind::Input(text)
        } else {
            return Err(SessionError::BadStep(label));
        };
        Ok(Self { kind, label })
    }

    fn run(&self, session: &mut GameSession) -> bool {
        match &self.kind {
            StepKind::Input(text) => match session.tick(text) {
                Ok((outcome, _)) => outcome.action != StepAction::Error,
                Err(_) => false,
            },
            StepKind::Assert(condition) => {
                let mut bag = session.bag();
                let ctx = TriggerContext::new(session.current().tag(), "");
                matches!(condition.evaluate(&ctx, &mut bag), Ok(true))
            }
        }
    }
}

/// A named sequence of steps.
#[derive(Debug, Clone)]
pub struct ScriptTest {
    /// Test name.
    pub name: String,
    /// Steps in order.
    pub steps: Vec<TestStep>,
}

impl ScriptTest {
    /// Parse one `name: { steps: [...] }` entry.
    pub fn parse(name: &str, entry: &Yaml, registry: &Registry) -> SessionResult<Self> {
        let steps = match entry.as_mapping().and_then(|map| map.get("steps")) {
            None | Some(Yaml::Null) => Vec::new(),
            Some(Yaml::Sequence(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| TestStep::parse(item, registry, &format!("{name}.steps[{i}]")))
                .collect::<SessionResult<Vec<_>>>()?,
            Some(_) => {
                return Err(SessionError::BadTestFile(format!(
                    "`{name}.steps` must be a list"
                )));
            }
        };
        Ok(Self {
            name: name.to_string(),
            steps,
        })
    }

    /// Play the test on a fresh copy of `machine` and `bag`.
    ///
    /// Neither argument is touched; every run starts from the same state.
    /// If the start handlers do not complete, the result is a single failed
    /// `start` step and no other step runs.
    pub fn run(&self, machine: &Machine, bag: &StateBag) -> TestResult {
        let mut session = GameSession::new(machine.clone(), bag.snapshot());
        let start = session.start();
        if !start.is_ok() {
            let label = match start.message() {
                Some(msg) => format!("start: {msg}"),
                None => "start: revert".to_string(),
            };
            debug!(test = %self.name, %label, "start handlers did not complete");
            return TestResult {
                name: self.name.clone(),
                steps: vec![StepResult {
                    label,
                    passed: false,
                }],
            };
        }

        let steps = self
            .steps
            .iter()
            .map(|step| StepResult {
                label: step.label.clone(),
                passed: step.run(&mut session),
            })
            .collect();
        let result = TestResult {
            name: self.name.clone(),
            steps,
        };
        debug!(test = %self.name, passed = result.passed(), "ran script test");
        result
    }
}

/// Outcome of one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    /// The step as written.
    pub label: String,
    /// Whether it passed.
    pub passed: bool,
}

/// Outcome of one test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResult {
    /// Test name.
    pub name: String,
    /// Per-step results, in order.
    pub steps: Vec<StepResult>,
}

impl TestResult {
    /// Returns true if every step passed.
    pub fn passed(&self) -> bool {
        self.steps.iter().all(|s| s.passed)
    }

    /// Failed steps with their indices.
    pub fn failures(&self) -> impl Iterator<Item = (usize, &StepResult)> {
        self.steps.iter().enumerate().filter(|(_, s)| !s.passed)
    }
}

/// Parse a whole test file.
pub fn parse_tests(document: &Yaml, registry: &Registry) -> SessionResult<Vec<ScriptTest>> {
    let map = match document {
        Yaml::Null => return Ok(Vec::new()),
        Yaml::Mapping(map) => map,
        _ => {
            return Err(SessionError::BadTestFile(
                "expected a mapping of test names to steps".to_string(),
            ));
        }
    };
    map.iter()
        .map(|(name, entry)| {
            let name = name
                .as_str()
                .ok_or_else(|| SessionError::BadTestFile("test names must be strings".to_string()))?;
            ScriptTest::parse(name, entry, registry)
        })
        .collect()
}

/// Read and parse a test file.
pub fn load_tests(path: &Path, registry: &Registry) -> SessionResult<Vec<ScriptTest>> {
    let document = loader::read_yaml(path).map_err(DslError::from)?;
    parse_tests(&document, registry)
}

/// Run every test against the same starting point.
pub fn run_tests(tests: &[ScriptTest], machine: &Machine, bag: &StateBag) -> Vec<TestResult> {
    tests.iter().map(|test| test.run(machine, bag)).collect()
}

/// Render results as text, one block per test.
pub fn build_report(results: &[TestResult]) -> String {
    let mut lines = Vec::new();
    for result in results {
        lines.push(format!("Test: {}", result.name));
        if result.passed() {
            lines.push("---- All Tests Pass".to_string());
        } else {
            for (i, step) in result.failures() {
                lines.push(format!("---- Failed({i}): {}", step.label));
            }
        }
    }
    lines.join("\n")
}

// Single-line YAML flow rendering, used for step labels.
fn flow(value: &Yaml) -> String {
    let mut out = String::new();
    write_flow(value, &mut out);
    out
}

fn write_flow(value: &Yaml, out: &mut String) {
    match value {
        Yaml::Null => out.push('~'),
        Yaml::Bool(b) => out.push_str(&b.to_string()),
        Yaml::Number(n) => out.push_str(&n.to_string()),
        Yaml::String(s) => out.push_str(s),
        Yaml::Sequence(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_flow(item, out);
            }
            out.push(']');
        }
        Yaml::Mapping(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_flow(key, out);
                out.push_str(": ");
                write_flow(item, out);
            }
            out.push('}');
        }
        Yaml::Tagged(tagged) => {
            out.push_str(&tagged.tag.to_string());
            out.push(' ');
            write_flow(&tagged.value, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tw_core::Value;
    use tw_engine::{State, StateGraph};

    fn yaml(src: &str) -> Yaml {
        serde_yaml::from_str(src).unwrap()
    }

    fn fixture() -> (Machine, StateBag) {
        let mut graph = StateGraph::new();
        graph.add_state(State::new("entry", "Test State"));
        graph.add_state(
            State::new("next", "Testing Next").with_on_enter(Trigger::set_key("foo", Value::Int(5))),
        );
        graph
            .link("entry", "next", Trigger::on_match("transition", Vec::new()).unwrap())
            .unwrap();
        let machine = Machine::new(graph, "entry", "").unwrap();
        let bag = [("test", "value")].into_iter().collect();
        (machine, bag)
    }

    fn step(src: &str) -> TestStep {
        TestStep::parse(&yaml(src), &Registry::builtin(), "t").unwrap()
    }

    fn run_single(src: &str) -> bool {
        let (machine, bag) = fixture();
        let mut session = GameSession::new(machine, bag);
        session.start();
        step(src).run(&mut session)
    }

    #[test]
    fn simple_assertion() {
        assert!(matches!(step("assert: { tag: entry }").kind, StepKind::Assert(_)));
        assert!(run_single("assert: { tag: entry }"));
    }

    #[test]
    fn chained_assertion() {
        assert!(run_single(
            "assert: [{ tag: entry }, { eq: { key: test, value: value } }]"
        ));
    }

    #[test]
    fn failed_assertion() {
        assert!(!run_single("assert: { tag: nope }"));
    }

    #[test]
    fn assertions_do_not_mutate_the_game() {
        let (machine, bag) = fixture();
        let mut session = GameSession::new(machine, bag);
        session.start();
        assert!(step("assert: { set_key: [test, changed] }").run(&mut session));
        assert_eq!(session.bag().get("test"), Some(&Value::text("value")));
    }

    #[test]
    fn bad_steps() {
        let registry = Registry::builtin();
        let err = TestStep::parse(&yaml("{ wait: 3 }"), &registry, "t").unwrap_err();
        assert_eq!(err, SessionError::BadStep("{wait: 3}".into()));
        assert!(matches!(
            TestStep::parse(&yaml("input: [a, b]"), &registry, "t"),
            Err(SessionError::BadStep(_))
        ));
        assert!(matches!(
            TestStep::parse(&yaml("assert: { warp: 9 }"), &registry, "t"),
            Err(SessionError::Dsl(_))
        ));
    }

    #[test]
    fn steps_run_in_order() {
        let (machine, bag) = fixture();
        let test = ScriptTest::parse(
            "simple_test",
            &yaml(
                r#"
steps:
  - assert: { tag: entry }
  - input: wrong input
  - assert: { tag: entry }
  - input: transition
  - assert: { tag: next }
"#,
            ),
            &Registry::builtin(),
        )
        .unwrap();
        let result = test.run(&machine, &bag);
        assert!(result.passed());
        assert_eq!(result.steps.len(), 5);
    }

    #[test]
    fn runs_are_isolated() {
        let (machine, bag) = fixture();
        let test = ScriptTest::parse(
            "simple_test",
            &yaml("steps: [{ input: transition }, { assert: { tag: next } }]"),
            &Registry::builtin(),
        )
        .unwrap();

        assert!(test.run(&machine, &bag).passed());
        assert!(!bag.contains("foo"));
        assert_eq!(machine.current_tag(), "entry");
        // a second run starts over
        assert!(test.run(&machine, &bag).passed());
    }

    #[test]
    fn parse_file_keeps_order() {
        let tests = parse_tests(
            &yaml("b_test: { steps: [] }\na_test: { steps: [{ input: x }] }\nempty: ~\n"),
            &Registry::builtin(),
        )
        .unwrap();
        let names: Vec<&str> = tests.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["b_test", "a_test", "empty"]);
        assert!(tests[2].steps.is_empty());
    }

    #[test]
    fn report_format() {
        let results = vec![TestResult {
            name: "test".into(),
            steps: ["0", "1", "2", "3"]
                .iter()
                .map(|label| StepResult {
                    label: label.to_string(),
                    passed: *label != "2",
                })
                .collect(),
        }];
        assert_eq!(build_report(&results), "Test: test\n---- Failed(2): 2");

        let passing = vec![TestResult {
            name: "test".into(),
            steps: vec![StepResult {
                label: "0".into(),
                passed: true,
            }],
        }];
        assert_eq!(build_report(&passing), "Test: test\n---- All Tests Pass");
    }

    #[test]
    fn failing_step_is_reported_with_label() {
        let (machine, bag) = fixture();
        let tests = parse_tests(
            &yaml("lost: { steps: [{ input: transition }, { assert: { tag: entry } }] }"),
            &Registry::builtin(),
        )
        .unwrap();
        let report = build_report(&run_tests(&tests, &machine, &bag));
        assert_eq!(report, "Test: lost\n---- Failed(1): {assert: {tag: entry}}");
    }

    #[test]
    fn refused_start_fails_the_test() {
        let mut graph = StateGraph::new();
        graph.add_state(State::new("gate", "A gate.").with_on_enter(Trigger::Reject {
            message: "You may not begin.".into(),
        }));
        let machine = Machine::new(graph, "gate", "").unwrap();
        let test = ScriptTest::parse(
            "blocked",
            &yaml("steps: [{ assert: { tag: gate } }]"),
            &Registry::builtin(),
        )
        .unwrap();

        let result = test.run(&machine, &StateBag::new());
        assert!(!result.passed());
        assert_eq!(
            build_report(&[result]),
            "Test: blocked\n---- Failed(0): start: You may not begin."
        );
    }

    #[test]
    fn flow_labels_render_scalars() {
        assert_eq!(flow(&yaml("{ input: 3, ok: true, gone: ~ }")), "{input: 3, ok: true, gone: ~}");
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("walk.yaml");
        std::fs::write(&path, "walk:\n  steps:\n    - input: transition\n").unwrap();
        let tests = load_tests(&path, &Registry::builtin()).unwrap();
        assert_eq!(tests.len(), 1);
        assert!(matches!(&tests[0].steps[0].kind, StepKind::Input(text) if text == "transition"));

        let missing = load_tests(&dir.path().join("nope.yaml"), &Registry::builtin());
        assert!(matches!(missing, Err(SessionError::Dsl(DslError::Load(_)))));
    }
}
