//! Settings configuration loaded from TOML files.
//!
//! Non-sensitive configuration stored in TOML format in the XDG config
//! directory (`~/.config/aimsage/config.toml`). Every field is optional;
//! missing values fall back to the defaults in [`super::knowledge`].

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Errors that can occur when loading settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("could not determine config directory")]
    MissingConfigDir,

    #[error("I/O error reading settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Top-level TOML settings file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub knowledge: KnowledgeToolsSettings,
}

impl Settings {
    /// Load settings from the default config path. A missing file yields
    /// all-default settings.
    pub fn load() -> Result<Self, SettingsError> {
        let path = config_path()?;
        Self::load_from(&path)
    }

    /// Load settings from an explicit path. A missing file yields
    /// all-default settings.
    pub fn load_from(path: &PathBuf) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

/// User-facing knowledge settings; all fields optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeToolsSettings {
    pub embedding_url: Option<String>,
    pub embedding_model: Option<String>,
    pub embedding_dim: Option<usize>,
    pub index_name: Option<String>,
    pub chunk_max_bytes: Option<usize>,
    pub chunk_overlap_bytes: Option<usize>,
    pub chunk_delay_ms: Option<u64>,
    pub db_path_override: Option<String>,
    #[serde(default)]
    pub search: SearchSettings,
}

/// User-facing search tuning; all fields optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchSettings {
    pub default_limit: Option<usize>,
    pub duplicate_threshold: Option<f32>,
    pub recommendation_min_score: Option<f32>,
    pub overfetch_factor: Option<usize>,
    pub weak_area_bonus: Option<f32>,
}

/// Path of the settings file: `$AIMSAGE_CONFIG` or
/// `<config dir>/aimsage/config.toml`.
pub fn config_path() -> Result<PathBuf, SettingsError> {
    if let Ok(path) = std::env::var("AIMSAGE_CONFIG") {
        return Ok(PathBuf::from(path));
    }
    let dir = dirs::config_dir().ok_or(SettingsError::MissingConfigDir)?;
    Ok(dir.join("aimsage").join("config.toml"))
}
