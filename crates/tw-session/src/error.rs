//! Error types for sessions and scripted tests.

use thiserror::Error;
use tw_dsl::DslError;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors raised by a session or the test runner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// `tick` was called before `start`.
    #[error("session has not been started")]
    NotStarted,

    /// A test step is neither `input` nor `assert`.
    #[error("bad test step: {0}")]
    BadStep(String),

    /// A test file is not shaped like `name: { steps: [...] }`.
    #[error("bad test file: {0}")]
    BadTestFile(String),

    /// Loading or compiling failed.
    #[error(transparent)]
    Dsl(#[from] DslError),
}
