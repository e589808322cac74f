use std::path::Path;

use comfy_table::{ContentArrangement, Table};
use tw_dsl::diagnostics::render_load_error;

pub fn run(dir: &Path) -> Result<(), String> {
    let games = tw_dsl::find_games(dir).map_err(|e| {
        eprint!("{}", render_load_error(&e));
        format!("could not list games in {}", dir.display())
    })?;

    if games.is_empty() {
        println!("  No games found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Title", "Slug", "Author", "Path"]);

    for (path, manifest) in &games {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        table.add_row(vec![&manifest.title, &manifest.slug, &manifest.author, &name]);
    }

    println!("{table}");
    println!();
    println!("  {} games", games.len());

    Ok(())
}
