/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Document persistence using fjall (mutation journal) + redb (keyed slots) + rkyv (journal encoding).
//!
//! Architecture:
//! - Every applied mutation is journaled to fjall as an rkyv-serialized `LogEntry`
//! - The autosave slot and named saves live in one redb table as document JSON
//! - The autosave slot records the journal sequence it covers, then the journal
//!   is compacted up to it
//! - On startup: load the autosave slot, replay only journal entries newer than it

pub mod autosave;
pub mod codec;
pub mod document;
pub mod types;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use redb::{ReadableDatabase, ReadableTable};
use std::path::PathBuf;
use types::LogEntry;

use crate::graph::Structure;
use document::{Document, SavedDocument};

const SLOT_TABLE: redb::TableDefinition<&str, &[u8]> = redb::TableDefinition::new("slots");

/// Key prefix used when no namespace is configured
pub const DEFAULT_NAMESPACE: &str = "rna_editor";

/// Listing entry for a named save
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotInfo {
    pub key: String,
    pub document_id: String,
    pub name: String,
    pub saved_at: Option<DateTime<Utc>>,
}

/// Durable document store backed by fjall (journal) + redb (slots)
pub struct DocumentStore {
    /// Kept alive so the Keyspace borrow remains valid (fjall requires it).
    _db: fjall::Database,
    journal: fjall::Keyspace,
    slots: redb::Database,
    namespace: String,
    next_sequence: u64,
}

impl DocumentStore {
    /// Open or create a store at the given directory
    pub fn open(base_dir: PathBuf, namespace: &str) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&base_dir)
            .map_err(|e| StoreError::Io(format!("Failed to create dir: {e}")))?;

        let journal_path = base_dir.join("journal");
        let slots_path = base_dir.join("slots.redb");

        let db = fjall::Database::builder(&journal_path)
            .open()
            .map_err(|e| StoreError::Journal(format!("{e}")))?;

        let journal = db
            .keyspace("mutations", || fjall::KeyspaceCreateOptions::default())
            .map_err(|e| StoreError::Journal(format!("{e}")))?;

        let slots =
            redb::Database::create(&slots_path).map_err(|e| StoreError::Slots(format!("{e}")))?;

        let mut store = Self {
            _db: db,
            journal,
            slots,
            namespace: namespace.to_string(),
            next_sequence: 1,
        };
        // Sequences never restart below what the autosave slot covers
        store.next_sequence =
            Self::find_max_sequence(&store.journal).max(store.covered_sequence()) + 1;
        Ok(store)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// `<namespace>_autosave`
    pub fn autosave_key(&self) -> String {
        format!("{}_autosave", self.namespace)
    }

    /// `<namespace>_<documentId>`
    pub fn named_key(&self, document_id: &str) -> String {
        format!("{}_{document_id}", self.namespace)
    }

    /// Sequence number of the newest journal entry, 0 when none was written
    pub fn last_sequence(&self) -> u64 {
        self.next_sequence - 1
    }

    /// Append a mutation to the journal. Best effort: failures are logged.
    pub fn append_log(&mut self, entry: &LogEntry) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let bytes = match rkyv::to_bytes::<rkyv::rancor::Error>(entry) {
            Ok(b) => b,
            Err(e) => {
                warn!("Failed to serialize journal entry: {e}");
                return sequence;
            },
        };

        if let Err(e) = self.journal.insert(sequence.to_be_bytes(), bytes.as_ref()) {
            warn!("Failed to write journal entry {sequence}: {e}");
        }
        sequence
    }

    /// Write the autosave slot and drop journal entries it covers
    pub fn save_autosave(&mut self, doc: &Document, through_sequence: u64) -> Result<(), StoreError> {
        let key = self.autosave_key();
        self.write_document(&key, doc, Some(through_sequence))?;
        self.compact_journal(through_sequence);
        debug!(
            "Autosaved {} ({} nucleotides) through journal entry {through_sequence}",
            doc.id,
            doc.nucleotides.len()
        );
        Ok(())
    }

    /// Autosave slot plus journal replay; `None` when nothing with content survives
    pub fn recover(&self) -> Option<Document> {
        let mut structure = match self.restore(&self.autosave_key()) {
            Some(doc) => Structure::from_document(&doc),
            None => Structure::default(),
        };

        let replayed = self.replay_journal(&mut structure, self.covered_sequence());
        structure.take_journal();

        if !structure.has_content() {
            return None;
        }
        info!(
            "Recovered {} with {} nucleotides ({replayed} journal entries replayed)",
            structure.info().id,
            structure.nucleotide_count()
        );
        Some(structure.to_document())
    }

    /// Read and validate a slot. Missing or corrupt slots yield `None`.
    pub fn restore(&self, key: &str) -> Option<Document> {
        let bytes = self.read_slot(key)?;
        let text = match std::str::from_utf8(&bytes) {
            Ok(text) => text,
            Err(e) => {
                warn!("Slot {key} is not UTF-8: {e}");
                return None;
            },
        };
        match codec::deserialize(text) {
            Ok(doc) => Some(doc),
            Err(e) => {
                warn!("Slot {key} holds an invalid document: {e}");
                None
            },
        }
    }

    /// Store a named copy under `<namespace>_<documentId>` and return the key
    pub fn save_named(&mut self, doc: &Document) -> Result<String, StoreError> {
        let key = self.named_key(&doc.id);
        if key == self.autosave_key() {
            return Err(StoreError::Io(format!(
                "Document id {} collides with the autosave slot",
                doc.id
            )));
        }
        self.write_document(&key, doc, None)?;
        info!("Saved {} as {key}", doc.name);
        Ok(key)
    }

    /// Named saves in this namespace, newest first
    pub fn list_snapshots(&self) -> Result<Vec<SnapshotInfo>, StoreError> {
        let prefix = format!("{}_", self.namespace);
        let autosave = self.autosave_key();

        let read_txn = self
            .slots
            .begin_read()
            .map_err(|e| StoreError::Slots(format!("{e}")))?;
        let table = match read_txn.open_table(SLOT_TABLE) {
            Ok(table) => table,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Slots(format!("{e}"))),
        };

        let mut snapshots = Vec::new();
        for item in table.iter().map_err(|e| StoreError::Slots(format!("{e}")))? {
            let (key, value) = item.map_err(|e| StoreError::Slots(format!("{e}")))?;
            let key = key.value();
            if !key.starts_with(&prefix) || key == autosave {
                continue;
            }
            match serde_json::from_slice::<SavedDocument>(value.value()) {
                Ok(saved) => snapshots.push(SnapshotInfo {
                    key: key.to_string(),
                    document_id: saved.document.id,
                    name: saved.document.name,
                    saved_at: DateTime::parse_from_rfc3339(&saved.saved_at)
                        .ok()
                        .map(|t| t.with_timezone(&Utc)),
                }),
                Err(e) => warn!("Skipping unreadable slot {key}: {e}"),
            }
        }

        snapshots.sort_by(|a, b| b.saved_at.cmp(&a.saved_at).then_with(|| a.key.cmp(&b.key)));
        Ok(snapshots)
    }

    /// Remove a slot; returns whether it existed
    pub fn delete_snapshot(&mut self, key: &str) -> Result<bool, StoreError> {
        let write_txn = self
            .slots
            .begin_write()
            .map_err(|e| StoreError::Slots(format!("{e}")))?;
        let removed = {
            let mut table = write_txn
                .open_table(SLOT_TABLE)
                .map_err(|e| StoreError::Slots(format!("{e}")))?;
            table
                .remove(key)
                .map_err(|e| StoreError::Slots(format!("{e}")))?
                .is_some()
        };
        write_txn
            .commit()
            .map_err(|e| StoreError::Slots(format!("{e}")))?;
        Ok(removed)
    }

    /// Clear every slot in this namespace and the whole journal
    pub fn clear_all(&mut self) -> Result<(), StoreError> {
        let prefix = format!("{}_", self.namespace);
        let write_txn = self
            .slots
            .begin_write()
            .map_err(|e| StoreError::Slots(format!("{e}")))?;
        {
            let mut table = write_txn
                .open_table(SLOT_TABLE)
                .map_err(|e| StoreError::Slots(format!("{e}")))?;
            let keys: Vec<String> = table
                .iter()
                .map_err(|e| StoreError::Slots(format!("{e}")))?
                .filter_map(|item| item.ok())
                .map(|(key, _)| key.value().to_string())
                .filter(|key| key.starts_with(&prefix))
                .collect();
            for key in keys {
                table
                    .remove(key.as_str())
                    .map_err(|e| StoreError::Slots(format!("{e}")))?;
            }
        }
        write_txn
            .commit()
            .map_err(|e| StoreError::Slots(format!("{e}")))?;

        self.compact_journal(u64::MAX);
        self.next_sequence = 1;
        Ok(())
    }

    fn write_document(
        &mut self,
        key: &str,
        doc: &Document,
        journal_sequence: Option<u64>,
    ) -> Result<(), StoreError> {
        let saved = SavedDocument {
            document: doc.clone(),
            saved_at: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            journal_sequence,
        };
        let bytes = serde_json::to_vec(&saved).map_err(|e| StoreError::Encode(format!("{e}")))?;

        let write_txn = self
            .slots
            .begin_write()
            .map_err(|e| StoreError::Slots(format!("{e}")))?;
        {
            let mut table = write_txn
                .open_table(SLOT_TABLE)
                .map_err(|e| StoreError::Slots(format!("{e}")))?;
            table
                .insert(key, bytes.as_slice())
                .map_err(|e| StoreError::Slots(format!("{e}")))?;
        }
        write_txn
            .commit()
            .map_err(|e| StoreError::Slots(format!("{e}")))?;
        Ok(())
    }

    fn read_slot(&self, key: &str) -> Option<Vec<u8>> {
        let read_txn = self.slots.begin_read().ok()?;
        let table = read_txn.open_table(SLOT_TABLE).ok()?;
        let entry = table.get(key).ok()??;
        Some(entry.value().to_vec())
    }

    /// Journal sequence the autosave slot covers, 0 without a slot
    fn covered_sequence(&self) -> u64 {
        #[derive(serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Covered {
            #[serde(default)]
            journal_sequence: u64,
        }

        self.read_slot(&self.autosave_key())
            .and_then(|bytes| serde_json::from_slice::<Covered>(&bytes).ok())
            .map_or(0, |covered| covered.journal_sequence)
    }

    /// Apply journal entries newer than `after`. Older entries survive only
    /// when compaction was interrupted and are already in the slot.
    fn replay_journal(&self, structure: &mut Structure, after: u64) -> usize {
        let mut replayed = 0;
        for guard in self.journal.iter() {
            let (key, value) = match guard.into_inner() {
                Ok(kv) => kv,
                Err(_) => continue,
            };
            if Self::sequence_of(key.as_ref()).is_some_and(|seq| seq <= after) {
                continue;
            }

            // Copy to aligned buffer, fjall bytes may not satisfy rkyv alignment
            let mut aligned = rkyv::util::AlignedVec::<16>::new();
            aligned.extend_from_slice(value.as_ref());

            match rkyv::from_bytes::<LogEntry, rkyv::rancor::Error>(&aligned) {
                Ok(entry) => {
                    structure.apply_log_entry(&entry);
                    replayed += 1;
                },
                Err(e) => warn!("Skipping corrupt journal entry: {e}"),
            }
        }
        replayed
    }

    fn compact_journal(&mut self, through_sequence: u64) {
        let keys: Vec<Vec<u8>> = self
            .journal
            .iter()
            .filter_map(|guard| guard.key().ok().map(|k| k.to_vec()))
            .filter(|key| Self::sequence_of(key).is_none_or(|seq| seq <= through_sequence))
            .collect();
        for key in keys {
            if let Err(e) = self.journal.remove(key) {
                warn!("Failed to compact journal entry: {e}");
            }
        }
    }

    fn sequence_of(key: &[u8]) -> Option<u64> {
        let bytes: [u8; 8] = key.try_into().ok()?;
        Some(u64::from_be_bytes(bytes))
    }

    fn find_max_sequence(keyspace: &fjall::Keyspace) -> u64 {
        keyspace
            .iter()
            .filter_map(|guard| guard.key().ok())
            .filter_map(|key| Self::sequence_of(key.as_ref()))
            .max()
            .unwrap_or(0)
    }

    /// Get the default storage directory for documents
    pub fn default_data_dir() -> PathBuf {
        crate::config::config_dir().join("documents")
    }
}

/// Errors from the document store
#[derive(Debug)]
pub enum StoreError {
    Io(String),
    Journal(String),
    Slots(String),
    Encode(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "IO error: {e}"),
            StoreError::Journal(e) => write!(f, "Journal error: {e}"),
            StoreError::Slots(e) => write!(f, "Slot store error: {e}"),
            StoreError::Encode(e) => write!(f, "Encoding error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}
