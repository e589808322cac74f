//! Read scripts from disk.
//!
//! A script is either a single YAML file or a directory holding a
//! `manifest.yaml` that lists the files making up the script:
//!
//! ```yaml
//! title: The Cellar
//! slug: A short walk downstairs
//! author: Anonymous
//! files: [rooms.yaml, bag.yaml]
//! tests: [tests/walkthrough.yaml]
//! ```
//!
//! The listed files are concatenated in order and parsed as one document.
//! Every manifest key is then appended to it as a single-key entry, so
//! `title` and `tests` from the manifest override the script's own.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml::{Mapping, Value as Yaml};
use tracing::debug;

use crate::error::{LoadError, LoadResult};

/// File name of a script directory's manifest.
pub const MANIFEST_FILE: &str = "manifest.yaml";

/// Display metadata of a script directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    /// Game title.
    #[serde(default = "default_title")]
    pub title: String,
    /// One-line description.
    #[serde(default = "default_slug")]
    pub slug: String,
    /// Author credit.
    #[serde(default = "default_author")]
    pub author: String,
    /// Script files, relative to the directory, in load order.
    #[serde(default)]
    pub files: Vec<String>,
}

fn default_title() -> String {
    "A Game".to_string()
}

fn default_slug() -> String {
    "Slug for a game".to_string()
}

fn default_author() -> String {
    "Anonymous".to_string()
}

fn read(path: &Path) -> LoadResult<String> {
    fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Parse YAML text; `path` is only used for error reporting.
pub fn parse_yaml(text: &str, path: &Path) -> LoadResult<Yaml> {
    serde_yaml::from_str(text).map_err(|e| LoadError::Syntax {
        path: path.to_path_buf(),
        message: e.to_string(),
        text: text.to_string(),
        offset: e.location().map(|loc| loc.index()),
    })
}

/// Read and parse one YAML file.
pub fn read_yaml(path: &Path) -> LoadResult<Yaml> {
    parse_yaml(&read(path)?, path)
}

/// The directory test paths and manifest files are resolved against.
pub fn script_root(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.to_path_buf()
    } else {
        path.parent().map(Path::to_path_buf).unwrap_or_default()
    }
}

/// Read a script directory's manifest.
pub fn load_manifest(dir: &Path) -> LoadResult<Manifest> {
    let path = dir.join(MANIFEST_FILE);
    let text = read(&path)?;
    serde_yaml::from_str(&text).map_err(|e| LoadError::Syntax {
        path,
        message: e.to_string(),
        offset: e.location().map(|loc| loc.index()),
        text,
    })
}

/// Every game directory directly under `dir`, with its manifest, sorted by
/// path. Subdirectories without a manifest are skipped.
pub fn find_games(dir: &Path) -> LoadResult<Vec<(PathBuf, Manifest)>> {
    let io_error = |e: std::io::Error| LoadError::Io {
        path: dir.to_path_buf(),
        message: e.to_string(),
    };
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.join(MANIFEST_FILE).is_file() {
            dirs.push(path);
        }
    }
    dirs.sort();

    let mut games = Vec::with_capacity(dirs.len());
    for path in dirs {
        let manifest = load_manifest(&path)?;
        debug!(path = %path.display(), title = %manifest.title, "found game");
        games.push((path, manifest));
    }
    Ok(games)
}

/// Load a script, from a single file or a manifest-driven directory, as
/// one YAML document.
pub fn load_document(path: &Path) -> LoadResult<Yaml> {
    if !path.is_dir() {
        debug!(path = %path.display(), "loading script file");
        return read_yaml(path);
    }

    let manifest_path = path.join(MANIFEST_FILE);
    if !manifest_path.is_file() {
        return Err(LoadError::Manifest {
            path: path.to_path_buf(),
            message: format!("no {MANIFEST_FILE} found"),
        });
    }
    let manifest = load_manifest(path)?;
    let Yaml::Mapping(manifest_entries) = read_yaml(&manifest_path)? else {
        return Err(LoadError::Manifest {
            path: path.to_path_buf(),
            message: format!("{MANIFEST_FILE} must be a mapping"),
        });
    };
    if manifest.files.is_empty() {
        return Err(LoadError::Manifest {
            path: path.to_path_buf(),
            message: format!("{MANIFEST_FILE} lists no `files`"),
        });
    }

    let sources = manifest
        .files
        .iter()
        .map(|file| read(&path.join(file)))
        .collect::<LoadResult<Vec<_>>>()?;
    let merged = sources.join("\n");
    debug!(
        path = %path.display(),
        files = manifest.files.len(),
        "loading script directory"
    );

    let mut entries = match parse_yaml(&merged, path)? {
        Yaml::Sequence(entries) => entries,
        Yaml::Null => Vec::new(),
        _ => {
            return Err(LoadError::Manifest {
                path: path.to_path_buf(),
                message: "script files must hold a list of entries".to_string(),
            });
        }
    };
    for (key, value) in manifest_entries {
        let mut entry = Mapping::new();
        entry.insert(key, value);
        entries.push(Yaml::Mapping(entry));
    }
    Ok(Yaml::Sequence(entries))
}
