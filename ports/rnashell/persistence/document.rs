/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Portable document shape shared by exports, imports and store slots.
//!
//! Field names are camelCase so documents written by the web editor load
//! unchanged. Nucleotides, pairs and labels are keyed by their own ids, never
//! by in-memory graph indices.

use crate::graph::labels::{AnnotationLabel, StructuralFeature};
use crate::graph::{Base, NucleotideId};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Format version written into export metadata
pub const FORMAT_VERSION: &str = "1.0.0";

/// Producer name written into export metadata
pub const EXPORT_SOURCE: &str = "RNAShell Editor";

/// Gene id given to imports that do not carry one
pub const IMPORTED_GENE_ID: &str = "imported";

pub const DEFAULT_DOCUMENT_ID: &str = "custom-rna-1";
pub const DEFAULT_GENE_ID: &str = "custom-gene";
pub const DEFAULT_DOCUMENT_NAME: &str = "Custom RNA";
pub const DEFAULT_CANVAS_SIZE: f32 = 2000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedNucleotide {
    pub id: NucleotideId,
    #[serde(default, with = "base_field")]
    pub base: Option<Base>,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedBasePair {
    pub from: NucleotideId,
    pub to: NucleotideId,
}

/// Whole-structure snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    #[serde(default = "imported_gene_id")]
    pub gene_id: String,
    pub name: String,
    pub nucleotides: Vec<PersistedNucleotide>,
    pub base_pairs: Vec<PersistedBasePair>,
    #[serde(default)]
    pub annotations: Vec<AnnotationLabel>,
    #[serde(default)]
    pub structural_features: Vec<StructuralFeature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas_width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas_height: Option<f32>,
}

impl Document {
    /// Empty document with the given identity and the default canvas
    pub fn empty(id: impl Into<String>, gene_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            gene_id: gene_id.into(),
            name: name.into(),
            nucleotides: Vec::new(),
            base_pairs: Vec::new(),
            annotations: Vec::new(),
            structural_features: Vec::new(),
            canvas_width: Some(DEFAULT_CANVAS_SIZE),
            canvas_height: Some(DEFAULT_CANVAS_SIZE),
        }
    }

    /// Whether there is anything worth persisting
    pub fn has_content(&self) -> bool {
        !self.nucleotides.is_empty()
            || !self.base_pairs.is_empty()
            || !self.annotations.is_empty()
            || !self.structural_features.is_empty()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty(DEFAULT_DOCUMENT_ID, DEFAULT_GENE_ID, DEFAULT_DOCUMENT_NAME)
    }
}

fn imported_gene_id() -> String {
    IMPORTED_GENE_ID.to_string()
}

/// Provenance block added on export. Importers ignore it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub exported_at: String,
    pub version: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedDocument {
    #[serde(flatten)]
    pub document: Document,
    pub metadata: ExportMetadata,
}

/// Document as held in a store slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedDocument {
    #[serde(flatten)]
    pub document: Document,
    pub saved_at: String,
    /// Newest journal entry the autosave slot already reflects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal_sequence: Option<u64>,
}

/// Bases are written as a single letter; an unset base is an empty string.
mod base_field {
    use super::*;

    pub fn serialize<S: Serializer>(base: &Option<Base>, serializer: S) -> Result<S::Ok, S::Error> {
        match base {
            Some(base) => serializer.serialize_str(base.as_str()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Base>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(letter) => {
                let mut chars = letter.chars();
                match (chars.next().and_then(Base::from_char), chars.next()) {
                    (Some(base), None) => Ok(Some(base)),
                    _ => Err(serde::de::Error::custom(format!("unknown base {letter:?}"))),
                }
            },
        }
    }
}
