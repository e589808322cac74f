//! Running Taleweaver games.
//!
//! A [`GameSession`] owns one machine and its bag and advances it a line of
//! input at a time. The [`script_test`] module drives sessions from scripted
//! playthroughs.

/// Error types.
pub mod error;
/// Scripted playthrough tests.
pub mod script_test;
/// Interactive sessions.
pub mod session;

pub use error::{SessionError, SessionResult};
pub use script_test::{ScriptTest, TestResult, build_report, load_tests, run_tests};
pub use session::GameSession;
