/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Keybind configuration system.
//!
//! Base letters (A/C/G/U) and the arrow keys are fixed; the rest can be
//! rebound in `keybinds.toml`.

use keyboard_types::{Key, NamedKey};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Keybind configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeybindConfig {
    /// Add a nucleotide chained off the current one (default: N)
    pub new_nucleotide: String,

    /// Delete the current nucleotide or label (default: Delete, Backspace)
    pub delete_current: Vec<String>,

    /// Clear selection and close editors (default: Escape)
    pub clear_selection: String,

    /// Pan while held (default: Space)
    pub temporary_pan: String,
}

impl Default for KeybindConfig {
    fn default() -> Self {
        Self {
            new_nucleotide: "N".to_string(),
            delete_current: vec!["Delete".to_string(), "Backspace".to_string()],
            clear_selection: "Escape".to_string(),
            temporary_pan: "Space".to_string(),
        }
    }
}

impl KeybindConfig {
    /// Load keybinds from config file
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        let Ok(contents) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match toml::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring invalid {}: {e}", path.display());
                Self::default()
            },
        }
    }

    /// Save keybinds to config file
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

    pub fn is_new_nucleotide(&self, key: &Key) -> bool {
        binding_matches(&self.new_nucleotide, key)
    }

    pub fn is_delete(&self, key: &Key) -> bool {
        self.delete_current.iter().any(|b| binding_matches(b, key))
    }

    pub fn is_clear_selection(&self, key: &Key) -> bool {
        binding_matches(&self.clear_selection, key)
    }

    pub fn is_temporary_pan(&self, key: &Key) -> bool {
        binding_matches(&self.temporary_pan, key)
    }

    /// Get the path to the keybinds config file
    fn config_path() -> PathBuf {
        super::config_dir().join("keybinds.toml")
    }
}

/// Whether a binding name such as `N`, `Space` or `Delete` names `key`.
/// Single characters match case-insensitively.
pub fn binding_matches(binding: &str, key: &Key) -> bool {
    match key {
        Key::Character(text) => match binding {
            "Space" => text == " ",
            _ => binding.chars().count() == 1 && text.to_lowercase() == binding.to_lowercase(),
        },
        Key::Named(named) => named_binding(binding) == Some(*named),
        _ => false,
    }
}

fn named_binding(binding: &str) -> Option<NamedKey> {
    Some(match binding {
        "Delete" => NamedKey::Delete,
        "Backspace" => NamedKey::Backspace,
        "Escape" | "Esc" => NamedKey::Escape,
        "Enter" => NamedKey::Enter,
        "Tab" => NamedKey::Tab,
        "Insert" => NamedKey::Insert,
        "Home" => NamedKey::Home,
        "End" => NamedKey::End,
        "F1" => NamedKey::F1,
        _ => return None,
    })
}
