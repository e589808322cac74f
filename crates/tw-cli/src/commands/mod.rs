pub mod check;
pub mod list;
pub mod play;

use std::path::Path;

use tw_dsl::CompiledScript;
use tw_dsl::diagnostics::render_error;

/// Load and compile a script, printing diagnostics to stderr on failure.
fn load(path: &Path) -> Result<CompiledScript, String> {
    tw_dsl::load_script(path).map_err(|e| {
        eprint!("{}", render_error(&e));
        format!("could not load {}", path.display())
    })
}
