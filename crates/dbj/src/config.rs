use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::query::FindOptions;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// JSON file backing the store
    pub path: PathBuf,

    /// Save after every successful mutation
    #[serde(default)]
    pub autosave: bool,

    /// Pretty-print saves with this many spaces; compact when absent
    #[serde(default)]
    pub indent: Option<usize>,
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            autosave: false,
            indent: None,
        }
    }
}

/// Defaults applied to every query issued through [`Settings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub case_sensitive: bool,
    pub fold_diacritics: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            fold_diacritics: true,
        }
    }
}

impl QueryConfig {
    pub fn find_options(&self) -> FindOptions {
        FindOptions {
            case_sensitive: self.case_sensitive,
            fold_diacritics: self.fold_diacritics,
            ..FindOptions::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub store: StoreConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

impl Settings {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|err| Error::config(format!("invalid settings: {err}")))
    }

    /// Load settings from a TOML file.
    ///
    /// A relative `store.path` is resolved against the settings file's
    /// directory.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|err| {
            Error::config(format!("failed reading {}: {}", path.display(), err))
        })?;

        let mut settings: Settings = toml::from_str(&text).map_err(|err| {
            Error::config(format!("invalid settings at {}: {}", path.display(), err))
        })?;

        if settings.store.path.is_relative() {
            if let Some(dir) = path.parent() {
                settings.store.path = dir.join(&settings.store.path);
            }
        }

        Ok(settings)
    }
}
