//! Error types for loading and compiling scripts.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for compilation.
pub type CompileResult<T> = Result<T, CompileError>;

/// Result type for document loading.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for the combined load-and-compile entry points.
pub type DslResult<T> = Result<T, DslError>;

/// A fatal problem in a script's structure.
///
/// `at` is a path into the document such as `execute.states[2].on_enter`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// No trigger is registered under this name.
    #[error("{at}: unknown trigger `{name}`")]
    UnknownTrigger {
        /// The name as written.
        name: String,
        /// Where the call appears.
        at: String,
    },

    /// A transition or machine refers to a tag no state declares.
    #[error("{at}: undefined state tag `{tag}`")]
    UndefinedTag {
        /// The missing tag.
        tag: String,
        /// Where the reference appears.
        at: String,
    },

    /// A trigger call is neither a bare name nor a single-key mapping.
    #[error("{at}: malformed trigger call: {reason}")]
    MalformedCall {
        /// What is wrong with it.
        reason: String,
        /// Where the call appears.
        at: String,
    },

    /// A trigger was called with arguments it cannot take.
    #[error("{at}: `{trigger}` {reason}")]
    BadArgument {
        /// Primary name of the trigger.
        trigger: String,
        /// What is wrong with the arguments.
        reason: String,
        /// Where the call appears.
        at: String,
    },

    /// An `on_match` pattern is not a valid regular expression.
    #[error("{at}: invalid pattern `{pattern}`: {reason}")]
    InvalidRegex {
        /// The pattern as written.
        pattern: String,
        /// The regex engine's message.
        reason: String,
        /// Where the call appears.
        at: String,
    },

    /// A state, transition or machine lacks a required field.
    #[error("{at}: missing required field `{field}`")]
    MissingField {
        /// Name of the field.
        field: String,
        /// The entry missing it.
        at: String,
    },

    /// A node has the wrong YAML shape.
    #[error("{at}: expected {expected}")]
    UnexpectedShape {
        /// What was expected there.
        expected: String,
        /// Where the node appears.
        at: String,
    },

    /// The document never declares the machine to run.
    #[error("document has no `execute` entry")]
    MissingExecute,
}

impl CompileError {
    pub(crate) fn missing(field: &str, at: &str) -> Self {
        Self::MissingField {
            field: field.to_string(),
            at: at.to_string(),
        }
    }

    pub(crate) fn shape(expected: &str, at: &str) -> Self {
        Self::UnexpectedShape {
            expected: expected.to_string(),
            at: at.to_string(),
        }
    }
}

/// A problem reading a script from disk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The file or directory could not be read.
    #[error("cannot read {}: {message}", path.display())]
    Io {
        /// What was being read.
        path: PathBuf,
        /// The OS error.
        message: String,
    },

    /// The text is not valid YAML.
    #[error("{}: {message}", path.display())]
    Syntax {
        /// File (or script directory) the text came from.
        path: PathBuf,
        /// Parser message.
        message: String,
        /// The text that failed to parse.
        text: String,
        /// Byte offset of the error in `text`, when known.
        offset: Option<usize>,
    },

    /// A script directory's manifest is missing or unusable.
    #[error("{}: {message}", path.display())]
    Manifest {
        /// The script directory.
        path: PathBuf,
        /// What is wrong with it.
        message: String,
    },
}

/// Either kind of script error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DslError {
    /// Loading failed.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Compilation failed.
    #[error(transparent)]
    Compile(#[from] CompileError),
}
