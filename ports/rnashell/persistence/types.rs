/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Journal entry types.
//!
//! Uses rkyv so entries can be appended and replayed without a text
//! round trip. Everything is keyed by document ids (nucleotide numbers,
//! label and feature strings); graph indices never reach the journal.

use rkyv::{Archive, Deserialize, Serialize};

/// One applied graph mutation
#[derive(Archive, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[rkyv(derive(Debug))]
pub enum LogEntry {
    AddNucleotide {
        id: u32,
        x: f32,
        y: f32,
    },
    RemoveNucleotide {
        id: u32,
    },
    MoveNucleotide {
        id: u32,
        x: f32,
        y: f32,
    },
    /// `base` is the ASCII letter, `None` when cleared
    SetBase {
        id: u32,
        base: Option<u8>,
    },
    RenameNucleotide {
        old_id: u32,
        new_id: u32,
    },
    TogglePair {
        from: u32,
        to: u32,
    },
    PutAnnotation {
        id: String,
        text: String,
        x: f32,
        y: f32,
        font_size: f32,
        color: Option<String>,
    },
    RemoveAnnotation {
        id: String,
    },
    PutFeature {
        id: String,
        feature_type: String,
        nucleotide_ids: Vec<u32>,
        label_text: String,
        label_x: f32,
        label_y: f32,
        label_font_size: f32,
        label_color: Option<String>,
        description: Option<String>,
        color: Option<String>,
    },
    RemoveFeature {
        id: String,
    },
    RenameDocument {
        name: String,
    },
    /// Whole document as export JSON
    ReplaceDocument {
        document_json: String,
    },
    FlipHorizontal,
}
