//! The Taleweaver script language.
//!
//! Scripts are YAML documents describing a state graph. This crate loads
//! them from disk ([`loader`]), resolves trigger names ([`registry`]) and
//! compiles the result into a [`tw_engine::Machine`] ([`compiler`]).

/// Document compilation.
pub mod compiler;
/// Terminal rendering of load and compile errors.
pub mod diagnostics;
/// Error types.
pub mod error;
/// Reading scripts from files and directories.
pub mod loader;
/// Trigger names and argument binding.
pub mod registry;

use std::path::Path;

pub use compiler::{CompiledScript, compile};
pub use error::{CompileError, CompileResult, DslError, DslResult, LoadError, LoadResult};
pub use loader::{Manifest, find_games, load_document, load_manifest, script_root};
pub use registry::Registry;

/// Load a script file or directory and compile it.
pub fn load_script(path: &Path) -> DslResult<CompiledScript> {
    let document = load_document(path)?;
    Ok(compile(&document)?)
}
