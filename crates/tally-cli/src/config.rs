use std::{
    fs,
    path::{Path, PathBuf},
};

use color_eyre::Result;
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use tally_todo::DEFAULT_SLOT_KEY;

use crate::theme::Theme;

/// User-level configuration loaded from `~/.config/tally/config.toml` (platform-specific).
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Override for the directory holding slot files.
    pub data_dir: Option<PathBuf>,
    /// Name of the slot the todo list is persisted under.
    pub slot_key: Option<String>,
    /// Initial TUI theme.
    pub theme: Option<Theme>,
}

impl Config {
    pub fn slot_key(&self) -> &str {
        self.slot_key.as_deref().unwrap_or(DEFAULT_SLOT_KEY)
    }

    pub fn theme(&self) -> Theme {
        self.theme.unwrap_or_default()
    }

    fn with_defaults() -> Self {
        Self {
            data_dir: None,
            slot_key: Some(DEFAULT_SLOT_KEY.to_string()),
            theme: Some(Theme::default()),
        }
    }
}

/// Load config from the default path; if missing, return defaults.
pub fn load() -> Result<Config> {
    let path = default_path()?;
    load_from_path(path)
}

/// Load config from a given path; if missing or empty, return defaults.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    let cfg: Config = toml::from_str(&contents)?;
    Ok(cfg)
}

/// Resolve the default config path (platform aware).
pub fn default_path() -> Result<PathBuf> {
    let base = config_dir().ok_or_else(|| color_eyre::eyre::eyre!("no config dir available"))?;
    Ok(base.join("tally").join("config.toml"))
}

/// Write a config file with every default spelled out, unless one already exists.
pub fn write_default_if_missing() -> Result<PathBuf> {
    write_to_path_if_missing(&Config::with_defaults(), &default_path()?)
}

fn write_to_path_if_missing(config: &Config, path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Ok(path.to_path_buf());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = toml::to_string_pretty(config)?;
    fs::write(path, body)?;
    Ok(path.to_path_buf())
}
