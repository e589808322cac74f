//! Presentation settings for `tw play`.
//!
//! Settings are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. YAML file given by `--config` or `TW_CONFIG`
//! 3. Environment variables (`TW_WIDTH`)
//! 4. Command-line flags

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Smallest wrap width accepted.
pub const MIN_WIDTH: usize = 10;

/// How the player presents a game.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PlayConfig {
    /// Column at which text wraps.
    pub width: usize,
    /// Print `state.banner`, `sub.banner` and `trans.banner` above panels.
    pub show_banners: bool,
    /// Input prompt.
    pub prompt: String,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            width: 80,
            show_banners: true,
            prompt: "> ".to_string(),
        }
    }
}

impl PlayConfig {
    /// Resolve defaults, then the config file, then the environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self, String> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => std::env::var_os("TW_CONFIG").map(PathBuf::from),
        };

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Read settings from a YAML file; missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read config {}: {e}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| format!("invalid config {}: {e}", path.display()))?;
        let width = config.width;
        Ok(config.with_width(width))
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(width) = var("TW_WIDTH") {
            match width.trim().parse() {
                Ok(width) => self.width = usize::max(width, MIN_WIDTH),
                Err(_) => tracing::warn!(%width, "ignoring invalid TW_WIDTH"),
            }
        }
    }

    /// Set the wrap width (at least [`MIN_WIDTH`]).
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width.max(MIN_WIDTH);
        self
    }

    /// Turn banners on or off.
    pub fn with_banners(mut self, show: bool) -> Self {
        self.show_banners = show;
        self
    }
}
