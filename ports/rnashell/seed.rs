/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Records supplied by the gene, variant and structure lookup services.
//!
//! These only seed a starting document or overlay read-only data on an
//! existing one; nothing here calls back into the services.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::graph::{NucleotideId, Structure};
use crate::persistence::document::Document;

/// How far a genomic position may sit from a nucleotide and still match it
pub const GENOMIC_MATCH_WINDOW: i64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneRecord {
    pub id: String,
    pub name: String,
    pub chromosome: String,
    pub start: i64,
    pub end: i64,
    pub sequence: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantRecord {
    pub id: String,
    pub gene_id: String,
    /// Genomic coordinate
    pub position: i64,
    /// 1-based position within the transcript, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nucleotide_position: Option<NucleotideId>,
    #[serde(rename = "ref")]
    pub reference: String,
    pub alt: String,
}

impl VariantRecord {
    /// Whether this variant lands on nucleotide `id` of `gene`.
    ///
    /// A transcript position must match exactly; otherwise the genomic
    /// position is compared against `gene.start + id`.
    pub fn hits(&self, gene: &GeneRecord, id: NucleotideId) -> bool {
        match self.nucleotide_position {
            Some(position) => position == id,
            None => (self.position - (gene.start + i64::from(id))).abs() < GENOMIC_MATCH_WINDOW,
        }
    }
}

/// Source of previously persisted structures
pub trait StructureLookup {
    fn structure_for_gene(&self, gene_id: &str) -> Option<Document>;
}

/// Starting document for `gene`: its stored structure, else an empty one
/// named after the gene
pub fn seed_document(gene: &GeneRecord, lookup: &dyn StructureLookup) -> Document {
    match lookup.structure_for_gene(&gene.id) {
        Some(mut doc) => {
            if doc.name.trim().is_empty() {
                doc.name = gene.name.clone();
            }
            doc
        },
        None => Document::empty(format!("{}-structure", gene.id), gene.id.clone(), gene.name.clone()),
    }
}

/// Variants of `gene` grouped by the nucleotide they land on. Nucleotides
/// with no variants are absent.
pub fn variants_by_nucleotide<'a>(
    gene: &GeneRecord,
    structure: &Structure,
    variants: &'a [VariantRecord],
) -> BTreeMap<NucleotideId, Vec<&'a VariantRecord>> {
    let mut grouped: BTreeMap<NucleotideId, Vec<&'a VariantRecord>> = BTreeMap::new();
    for id in structure.nucleotide_ids() {
        let hits: Vec<_> = variants
            .iter()
            .filter(|v| v.gene_id == gene.id && v.hits(gene, id))
            .collect();
        if !hits.is_empty() {
            grouped.insert(id, hits);
        }
    }
    grouped
}
