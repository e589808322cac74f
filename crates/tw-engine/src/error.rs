//! Error types for the engine.

use thiserror::Error;

/// Result type for graph construction.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised while building or querying a state graph.
///
/// These are script-author mistakes and abort loading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A tag was referenced that no state declares.
    #[error("unknown state tag: \"{0}\"")]
    UnknownTag(String),
}
