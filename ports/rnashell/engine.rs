/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Editor engine: a session wired to the durable store.
//!
//! Every command goes through the session, then the mutations it recorded
//! are appended to the journal and the autosave worker receives the new
//! snapshot. The worker lives and dies with the engine.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use keyboard_types::{Key, KeyState, Modifiers};
use log::{info, warn};
use parking_lot::Mutex;

use crate::app::{EditorSession, NoticeLevel};
use crate::config::EditorConfig;
use crate::config::keybinds::KeybindConfig;
use crate::graph::Structure;
use crate::input::pointer::PointerEvent;
use crate::input::{apply_actions, collect_actions};
use crate::persistence::autosave::AutosaveWorker;
use crate::persistence::codec::{self, ValidationError};
use crate::persistence::document::Document;
use crate::persistence::{DocumentStore, SnapshotInfo, StoreError};

/// Where and how the engine persists
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub data_dir: PathBuf,
    pub namespace: String,
    pub autosave_interval: Duration,
    pub keybinds: KeybindConfig,
}

impl EngineOptions {
    pub fn from_config(config: &EditorConfig, keybinds: KeybindConfig) -> Self {
        Self {
            data_dir: config.resolved_data_dir(),
            namespace: config.namespace.clone(),
            autosave_interval: config.autosave_interval(),
            keybinds,
        }
    }
}

pub struct EditorEngine {
    session: EditorSession,
    store: Arc<Mutex<DocumentStore>>,
    autosave: AutosaveWorker,
}

impl EditorEngine {
    /// Open the store, restore the last autosave and start autosaving
    pub fn open(options: EngineOptions) -> Result<Self, StoreError> {
        let store = DocumentStore::open(options.data_dir, &options.namespace)?;
        let structure = match store.recover() {
            Some(doc) => {
                info!("Restored {} from the autosave slot", doc.name);
                Structure::from_document(&doc)
            },
            None => Structure::default(),
        };

        let store = Arc::new(Mutex::new(store));
        let autosave = AutosaveWorker::spawn(store.clone(), options.autosave_interval);

        Ok(Self {
            session: EditorSession::new(structure, options.keybinds),
            store,
            autosave,
        })
    }

    /// Open with a seed document instead of the autosave slot
    pub fn open_with(options: EngineOptions, seed: &Document) -> Result<Self, StoreError> {
        let mut engine = Self::open(options)?;
        engine.session.replace_document(seed);
        engine.sync();
        Ok(engine)
    }

    /// Read-only view of the session
    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    /// Run a command against the session and persist what it changed
    pub fn apply<R>(&mut self, command: impl FnOnce(&mut EditorSession) -> R) -> R {
        let result = command(&mut self.session);
        self.sync();
        result
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        self.apply(|session| session.handle_pointer(event));
    }

    pub fn key_down(&mut self, key: &Key, modifiers: Modifiers) {
        self.key_event(key, KeyState::Down, modifiers);
    }

    pub fn key_up(&mut self, key: &Key) {
        self.key_event(key, KeyState::Up, Modifiers::empty());
    }

    fn key_event(&mut self, key: &Key, state: KeyState, modifiers: Modifiers) {
        let actions = collect_actions(
            key,
            state,
            modifiers,
            &self.session.keybinds,
            self.session.shortcuts_suppressed(),
        );
        self.apply(|session| apply_actions(session, &actions));
    }

    /// Validate and swap in an imported document. A rejected import leaves
    /// the live document untouched.
    pub fn import_document(&mut self, text: &str) -> Result<(), ValidationError> {
        let doc = match codec::deserialize(text) {
            Ok(doc) => doc,
            Err(e) => {
                self.apply(|session| {
                    session.notify(NoticeLevel::Error, format!("Import failed: {e}"))
                });
                return Err(e);
            },
        };
        info!("Imported {} ({} nucleotides)", doc.name, doc.nucleotides.len());
        self.apply(|session| session.replace_document(&doc));
        Ok(())
    }

    pub fn export_document(&self) -> Result<String, serde_json::Error> {
        codec::serialize(&self.session.structure().to_document())
    }

    /// Suggested file name for an export made today
    pub fn export_file_name(&self) -> String {
        codec::export_file_name(
            &self.session.structure().info().name,
            Utc::now().date_naive(),
        )
    }

    pub fn save_named(&mut self) -> Result<String, StoreError> {
        let doc = self.session.structure().to_document();
        self.store.lock().save_named(&doc)
    }

    /// Replace the live document with a stored snapshot
    pub fn load_named(&mut self, key: &str) -> bool {
        let restored = self.store.lock().restore(key);
        match restored {
            Some(doc) => {
                info!("Loaded {} from {key}", doc.name);
                self.apply(|session| session.replace_document(&doc));
                true
            },
            None => {
                warn!("No readable snapshot under {key}");
                false
            },
        }
    }

    pub fn list_snapshots(&self) -> Result<Vec<SnapshotInfo>, StoreError> {
        self.store.lock().list_snapshots()
    }

    pub fn delete_snapshot(&mut self, key: &str) -> Result<bool, StoreError> {
        self.store.lock().delete_snapshot(key)
    }

    /// Write the pending autosave now
    pub fn flush(&self) -> bool {
        self.autosave.flush()
    }

    fn sync(&mut self) {
        let entries = self.session.take_journal();
        if entries.is_empty() {
            return;
        }
        let through = {
            let mut store = self.store.lock();
            let mut through = store.last_sequence();
            for entry in &entries {
                through = store.append_log(entry);
            }
            through
        };
        self.autosave
            .update(self.session.structure().to_document(), through);
    }
}
