//! Render settings and their persistence wrapper.
//!
//! Settings are stored as one JSON object. Keys absent from a persisted
//! value are filled from defaults on load; keys this version does not
//! know about are carried through untouched so a newer writer's state
//! survives a round trip.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SettingsError>;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write settings to {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings file {path} is not valid JSON")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn default_dot_size() -> f64 {
    1.0
}

fn default_bomb_size() -> f64 {
    0.5
}

fn default_show_enemy_names() -> bool {
    true
}

/// User-tunable render settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_dot_size")]
    pub dot_size: f64,
    #[serde(default = "default_bomb_size")]
    pub bomb_size: f64,
    #[serde(default)]
    pub show_all_names: bool,
    #[serde(default = "default_show_enemy_names")]
    pub show_enemy_names: bool,
    #[serde(default)]
    pub show_view_cones: bool,
    /// Keys from newer versions, preserved but ignored here.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dot_size: default_dot_size(),
            bomb_size: default_bomb_size(),
            show_all_names: false,
            show_enemy_names: default_show_enemy_names(),
            show_view_cones: false,
            extra: serde_json::Map::new(),
        }
    }
}

/// Persistence wrapper around [`Settings`].
///
/// Every mutation re-persists the full object synchronously; there is no
/// debouncing and no partial write.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl SettingsStore {
    /// Loads settings from `path`, falling back to defaults when the file
    /// does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let settings = match fs::read_to_string(&path) {
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|source| SettingsError::Parse {
                    path: path.clone(),
                    source,
                })?
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no settings file, using defaults");
                Settings::default()
            }
            Err(source) => {
                return Err(SettingsError::Read {
                    path: path.clone(),
                    source,
                });
            }
        };

        Ok(Self { path, settings })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Applies a mutation and immediately persists the full object.
    pub fn update(&mut self, mutate: impl FnOnce(&mut Settings)) -> Result<()> {
        mutate(&mut self.settings);
        self.save()
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
                path: self.path.clone(),
                source,
            })?;
        }

        let contents = serde_json::to_string_pretty(&self.settings)
            .expect("settings serialization is infallible");
        fs::write(&self.path, contents).map_err(|source| SettingsError::Write {
            path: self.path.clone(),
            source,
        })
    }
}
