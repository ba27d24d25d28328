/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Configuration system for the editor.

pub mod keybinds;

use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::persistence::DEFAULT_NAMESPACE;

/// Seconds between autosave ticks when unconfigured
pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 3;

/// Get the config directory for rnashell
pub fn config_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            PathBuf::from(appdata).join("rnashell")
        } else {
            PathBuf::from(".rnashell")
        }
    }

    #[cfg(not(target_os = "windows"))]
    {
        if let Some(config_home) = dirs::config_dir() {
            config_home.join("rnashell")
        } else {
            PathBuf::from(".rnashell")
        }
    }
}

/// Ensure the config directory exists
pub fn ensure_config_dir() -> std::io::Result<PathBuf> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Editor settings (`config.toml`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Prefix of every store key (default: rna_editor)
    pub namespace: String,

    /// Seconds between autosaves (default: 3)
    pub autosave_interval_secs: u64,

    /// Store directory; the platform default when unset
    pub data_dir: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            autosave_interval_secs: DEFAULT_AUTOSAVE_INTERVAL_SECS,
            data_dir: None,
        }
    }
}

impl EditorConfig {
    /// Load settings from the config directory
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        let Ok(contents) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match toml::from_str::<EditorConfig>(&contents) {
            Ok(config) => config.sanitized(),
            Err(e) => {
                warn!("Ignoring invalid {}: {e}", path.display());
                Self::default()
            },
        }
    }

    /// Save settings to the config directory
    pub fn save(&self) -> std::io::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(self).map_err(std::io::Error::other)?;

        std::fs::write(path, toml_string)?;
        Ok(())
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_secs.max(1))
    }

    /// Store directory after applying the default
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(crate::persistence::DocumentStore::default_data_dir)
    }

    fn sanitized(mut self) -> Self {
        if self.autosave_interval_secs == 0 {
            warn!("autosave_interval_secs must be greater than zero, using the default");
            self.autosave_interval_secs = DEFAULT_AUTOSAVE_INTERVAL_SECS;
        }
        if self.namespace.trim().is_empty() {
            self.namespace = DEFAULT_NAMESPACE.to_string();
        }
        self
    }

    fn config_path() -> PathBuf {
        config_dir().join("config.toml")
    }
}
