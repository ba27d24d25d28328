/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Structure model for the RNA editor.
//!
//! Core structures:
//! - `Structure`: the live document, nucleotides and base pairs backed by
//!   petgraph::StableGraph, plus annotation labels and structural features
//! - `Nucleotide`: positioned unit of the chain with an optional base
//! - `BasePairView`: read-only view of an undirected pair with its `PairKind`
//!
//! Every mutator validates first and then applies fully, recording a
//! `LogEntry` and bumping the revision. Rejected calls leave the structure
//! untouched.

use euclid::default::{Point2D, Vector2D};
use indexmap::IndexMap;
use log::warn;
use petgraph::Undirected;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::persistence::document::{Document, PersistedBasePair, PersistedNucleotide};
use crate::persistence::types::LogEntry;
use labels::{
    AnnotationLabel, AnnotationPatch, DEFAULT_ANNOTATION_FONT_SIZE, FEATURE_LABEL_OFFSET_Y,
    FeatureLabel, FeaturePatch, FeatureType, NewFeature, StructuralFeature,
};

pub mod labels;
pub mod snap;
pub mod spatial;

/// Nucleotide number, unique and positive within a structure
pub type NucleotideId = u32;

/// Stable node handle (petgraph NodeIndex, survives other deletions)
pub type NodeKey = NodeIndex;

/// RNA base letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Base {
    A,
    U,
    G,
    C,
}

impl Base {
    pub const ALL: [Base; 4] = [Base::A, Base::U, Base::G, Base::C];

    /// Parse a base letter, case-insensitive
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(Base::A),
            'U' => Some(Base::U),
            'G' => Some(Base::G),
            'C' => Some(Base::C),
            _ => None,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::from_char(byte as char)
    }

    pub fn as_char(self) -> char {
        match self {
            Base::A => 'A',
            Base::U => 'U',
            Base::G => 'G',
            Base::C => 'C',
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Base::A => "A",
            Base::U => "U",
            Base::G => "G",
            Base::C => "C",
        }
    }
}

/// A nucleotide in the structure
#[derive(Debug, Clone, PartialEq)]
pub struct Nucleotide {
    pub id: NucleotideId,

    /// Base letter, unset until assigned
    pub base: Option<Base>,

    /// Position in logical (unzoomed, unpanned) space
    pub position: Point2D<f32>,
}

/// Chemistry of a base pair, as far as the assigned bases tell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairKind {
    /// A-U or G-C
    WatsonCrick,
    /// G-U
    Wobble,
    NonCanonical,
    /// At least one side has no base yet
    Unassigned,
}

impl PairKind {
    pub fn classify(a: Option<Base>, b: Option<Base>) -> Self {
        let (Some(a), Some(b)) = (a, b) else {
            return PairKind::Unassigned;
        };
        match (a, b) {
            (Base::A, Base::U) | (Base::U, Base::A) | (Base::G, Base::C) | (Base::C, Base::G) => {
                PairKind::WatsonCrick
            },
            (Base::G, Base::U) | (Base::U, Base::G) => PairKind::Wobble,
            _ => PairKind::NonCanonical,
        }
    }

    /// Drawn as a solid bond; everything else is dashed
    pub fn is_canonical(self) -> bool {
        self == PairKind::WatsonCrick
    }
}

/// Read-only view of a base pair (built from petgraph edge references)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasePairView {
    pub from: NucleotideId,
    pub to: NucleotideId,
    pub kind: PairKind,
}

/// Outcome of `Structure::toggle_pair`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairToggle {
    Added,
    Removed,
}

/// Counts shown in the structure info panel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StructureStats {
    pub nucleotides: usize,
    pub unassigned_bases: usize,
    pub base_pairs: usize,
    pub canonical_pairs: usize,
    pub wobble_pairs: usize,
    pub annotations: usize,
    pub features: usize,
}

/// Identity and canvas of the live document
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentInfo {
    pub id: String,
    pub gene_id: String,
    pub name: String,
    pub canvas_width: Option<f32>,
    pub canvas_height: Option<f32>,
}

/// Rejected graph-model command
#[derive(Debug, Clone, PartialEq)]
pub enum StructureError {
    UnknownNucleotide(NucleotideId),
    InvalidId(NucleotideId),
    IdInUse(NucleotideId),
    SelfPair(NucleotideId),
    EmptyFeatureSelection,
    EmptyLabelText,
    UnknownAnnotation(String),
    UnknownFeature(String),
}

impl std::fmt::Display for StructureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StructureError::UnknownNucleotide(id) => write!(f, "No nucleotide with id {id}"),
            StructureError::InvalidId(id) => write!(f, "{id} is not a valid nucleotide id"),
            StructureError::IdInUse(id) => write!(f, "ID {id} is already in use"),
            StructureError::SelfPair(id) => write!(f, "Nucleotide {id} cannot pair with itself"),
            StructureError::EmptyFeatureSelection => {
                write!(f, "Select at least one nucleotide to create a feature")
            },
            StructureError::EmptyLabelText => write!(f, "Label text cannot be empty"),
            StructureError::UnknownAnnotation(id) => write!(f, "No annotation with id {id}"),
            StructureError::UnknownFeature(id) => write!(f, "No structural feature with id {id}"),
        }
    }
}

impl std::error::Error for StructureError {}

/// The live RNA structure
#[derive(Clone)]
pub struct Structure {
    info: DocumentInfo,

    /// Nucleotides as nodes, base pairs as undirected edges
    pub(crate) inner: StableGraph<Nucleotide, (), Undirected>,

    /// Nucleotide id to node, in insertion order
    index: IndexMap<NucleotideId, NodeKey>,

    annotations: IndexMap<String, AnnotationLabel>,
    features: IndexMap<String, StructuralFeature>,

    /// Mutations applied since the last `take_journal`
    journal: Vec<LogEntry>,
    revision: u64,
}

impl Structure {
    /// Create an empty structure
    pub fn new(info: DocumentInfo) -> Self {
        Self {
            info,
            inner: StableGraph::default(),
            index: IndexMap::new(),
            annotations: IndexMap::new(),
            features: IndexMap::new(),
            journal: Vec::new(),
            revision: 0,
        }
    }

    pub fn info(&self) -> &DocumentInfo {
        &self.info
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if name == self.info.name {
            return;
        }
        self.info.name = name.clone();
        self.record(LogEntry::RenameDocument { name });
    }

    /// Monotonic counter bumped by every applied mutation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Drain the mutations recorded since the last call
    pub fn take_journal(&mut self) -> Vec<LogEntry> {
        std::mem::take(&mut self.journal)
    }

    fn record(&mut self, entry: LogEntry) {
        self.journal.push(entry);
        self.revision += 1;
    }

    // --- nucleotides -----------------------------------------------------

    pub fn nucleotide(&self, id: NucleotideId) -> Option<&Nucleotide> {
        let key = self.index.get(&id)?;
        self.inner.node_weight(*key)
    }

    pub fn contains(&self, id: NucleotideId) -> bool {
        self.index.contains_key(&id)
    }

    /// Nucleotides in insertion order
    pub fn nucleotides(&self) -> impl Iterator<Item = &Nucleotide> + '_ {
        self.index.values().filter_map(|key| self.inner.node_weight(*key))
    }

    /// Nucleotide ids in insertion order
    pub fn nucleotide_ids(&self) -> impl Iterator<Item = NucleotideId> + '_ {
        self.index.keys().copied()
    }

    /// (id, position) pairs in insertion order
    pub fn positions(&self) -> impl Iterator<Item = (NucleotideId, Point2D<f32>)> + '_ {
        self.nucleotides().map(|n| (n.id, n.position))
    }

    pub fn nucleotide_count(&self) -> usize {
        self.index.len()
    }

    /// Most recently inserted nucleotide still present
    pub fn last_nucleotide(&self) -> Option<NucleotideId> {
        self.index.last().map(|(id, _)| *id)
    }

    /// Position of `id` in insertion order
    pub fn position_in_order(&self, id: NucleotideId) -> Option<usize> {
        self.index.get_index_of(&id)
    }

    pub fn nucleotide_at_order(&self, order: usize) -> Option<NucleotideId> {
        self.index.get_index(order).map(|(id, _)| *id)
    }

    /// `max(existing ids, 0) + 1`
    pub fn next_id(&self) -> NucleotideId {
        let max = self.index.keys().copied().max().unwrap_or(0);
        match max.checked_add(1) {
            Some(next) => next,
            // Only reachable after renaming to u32::MAX: take the lowest free id
            None => (1..=NucleotideId::MAX)
                .find(|id| !self.index.contains_key(id))
                .unwrap_or(NucleotideId::MAX),
        }
    }

    /// Add a nucleotide near `position`, snapped against its neighbors
    pub fn add_nucleotide(&mut self, position: Point2D<f32>) -> NucleotideId {
        let placed = snap::snap_position(position, self.positions(), None);
        let id = self.next_id();
        self.insert_nucleotide(id, placed, None);
        id
    }

    /// Add a nucleotide chained off `anchor`, else the last added one, else
    /// snapped at `fallback`
    pub fn add_nucleotide_chained(
        &mut self,
        anchor: Option<NucleotideId>,
        fallback: Point2D<f32>,
    ) -> NucleotideId {
        let anchor = anchor
            .filter(|id| self.contains(*id))
            .or_else(|| self.last_nucleotide())
            .and_then(|id| self.nucleotide(id))
            .map(|n| (n.id, n.position));
        let placed = snap::chained_position(anchor, fallback, self.positions());
        let id = self.next_id();
        self.insert_nucleotide(id, placed, None);
        id
    }

    fn insert_nucleotide(&mut self, id: NucleotideId, position: Point2D<f32>, base: Option<Base>) {
        let key = self.inner.add_node(Nucleotide { id, base, position });
        self.index.insert(id, key);
        self.record(LogEntry::AddNucleotide {
            id,
            x: position.x,
            y: position.y,
        });
        if base.is_some() {
            self.record(LogEntry::SetBase {
                id,
                base: base.map(|b| b.as_char() as u8),
            });
        }
    }

    /// Remove a nucleotide and every base pair touching it.
    /// Feature member lists are left as they are.
    pub fn remove_nucleotide(&mut self, id: NucleotideId) -> bool {
        let Some(key) = self.index.shift_remove(&id) else {
            return false;
        };
        self.inner.remove_node(key);
        self.record(LogEntry::RemoveNucleotide { id });
        true
    }

    pub fn move_nucleotide(&mut self, id: NucleotideId, position: Point2D<f32>) -> bool {
        let Some(&key) = self.index.get(&id) else {
            return false;
        };
        let Some(node) = self.inner.node_weight_mut(key) else {
            return false;
        };
        node.position = position;
        self.record(LogEntry::MoveNucleotide {
            id,
            x: position.x,
            y: position.y,
        });
        true
    }

    pub fn translate_nucleotide(&mut self, id: NucleotideId, delta: Vector2D<f32>) -> bool {
        match self.nucleotide(id) {
            Some(n) => {
                let position = n.position + delta;
                self.move_nucleotide(id, position)
            },
            None => false,
        }
    }

    pub fn set_base(&mut self, id: NucleotideId, base: Option<Base>) -> bool {
        let Some(&key) = self.index.get(&id) else {
            return false;
        };
        let Some(node) = self.inner.node_weight_mut(key) else {
            return false;
        };
        node.base = base;
        self.record(LogEntry::SetBase {
            id,
            base: base.map(|b| b.as_char() as u8),
        });
        true
    }

    /// Give a nucleotide a new id.
    ///
    /// Pairs follow automatically since edges hang off the node. Feature
    /// member lists are rewritten. The nucleotide keeps its place in the
    /// insertion order.
    pub fn rename_nucleotide(
        &mut self,
        old_id: NucleotideId,
        new_id: NucleotideId,
    ) -> Result<(), StructureError> {
        if new_id == 0 {
            return Err(StructureError::InvalidId(new_id));
        }
        if !self.contains(old_id) {
            return Err(StructureError::UnknownNucleotide(old_id));
        }
        if old_id == new_id {
            return Ok(());
        }
        if self.contains(new_id) {
            return Err(StructureError::IdInUse(new_id));
        }

        let Some((order, _, key)) = self.index.shift_remove_full(&old_id) else {
            return Err(StructureError::UnknownNucleotide(old_id));
        };
        self.index.shift_insert(order, new_id, key);
        if let Some(node) = self.inner.node_weight_mut(key) {
            node.id = new_id;
        }
        for feature in self.features.values_mut() {
            for member in feature.nucleotide_ids.iter_mut() {
                if *member == old_id {
                    *member = new_id;
                }
            }
        }
        self.record(LogEntry::RenameNucleotide { old_id, new_id });
        Ok(())
    }

    // --- base pairs ------------------------------------------------------

    /// Iterate over all base pairs
    pub fn base_pairs(&self) -> impl Iterator<Item = BasePairView> + '_ {
        self.inner.edge_references().map(|e| {
            let from = &self.inner[e.source()];
            let to = &self.inner[e.target()];
            BasePairView {
                from: from.id,
                to: to.id,
                kind: PairKind::classify(from.base, to.base),
            }
        })
    }

    pub fn pair_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn has_pair(&self, a: NucleotideId, b: NucleotideId) -> bool {
        match (self.index.get(&a), self.index.get(&b)) {
            (Some(&ka), Some(&kb)) => self.inner.find_edge(ka, kb).is_some(),
            _ => false,
        }
    }

    /// Nucleotides paired with `id`
    pub fn partners(&self, id: NucleotideId) -> Vec<NucleotideId> {
        let Some(&key) = self.index.get(&id) else {
            return Vec::new();
        };
        let mut partners: Vec<_> = self.inner.neighbors(key).map(|k| self.inner[k].id).collect();
        partners.sort_unstable();
        partners
    }

    /// Add the pair `{a, b}` if absent, remove it if present
    pub fn toggle_pair(
        &mut self,
        a: NucleotideId,
        b: NucleotideId,
    ) -> Result<PairToggle, StructureError> {
        if a == b {
            return Err(StructureError::SelfPair(a));
        }
        let ka = *self.index.get(&a).ok_or(StructureError::UnknownNucleotide(a))?;
        let kb = *self.index.get(&b).ok_or(StructureError::UnknownNucleotide(b))?;

        let outcome = match self.inner.find_edge(ka, kb) {
            Some(edge) => {
                self.inner.remove_edge(edge);
                PairToggle::Removed
            },
            None => {
                self.inner.add_edge(ka, kb, ());
                PairToggle::Added
            },
        };
        self.record(LogEntry::TogglePair { from: a, to: b });
        Ok(outcome)
    }

    // --- annotations -----------------------------------------------------

    pub fn annotation(&self, id: &str) -> Option<&AnnotationLabel> {
        self.annotations.get(id)
    }

    pub fn annotations(&self) -> impl Iterator<Item = &AnnotationLabel> + '_ {
        self.annotations.values()
    }

    pub fn add_annotation(
        &mut self,
        text: &str,
        position: Point2D<f32>,
        font_size: Option<f32>,
    ) -> Result<String, StructureError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StructureError::EmptyLabelText);
        }
        let label = AnnotationLabel {
            id: format!("label-{}", Uuid::new_v4()),
            text: text.to_string(),
            x: position.x,
            y: position.y,
            font_size: font_size.unwrap_or(DEFAULT_ANNOTATION_FONT_SIZE),
            color: None,
        };
        let id = label.id.clone();
        self.put_annotation(label);
        Ok(id)
    }

    pub fn update_annotation(
        &mut self,
        id: &str,
        patch: AnnotationPatch,
    ) -> Result<(), StructureError> {
        let mut label = self
            .annotations
            .get(id)
            .cloned()
            .ok_or_else(|| StructureError::UnknownAnnotation(id.to_string()))?;
        if let Some(text) = patch.text {
            let text = text.trim();
            if text.is_empty() {
                return Err(StructureError::EmptyLabelText);
            }
            label.text = text.to_string();
        }
        if let Some(position) = patch.position {
            label.x = position.x;
            label.y = position.y;
        }
        if let Some(font_size) = patch.font_size {
            label.font_size = font_size;
        }
        if let Some(color) = patch.color {
            label.color = Some(color);
        }
        self.put_annotation(label);
        Ok(())
    }

    pub fn translate_annotation(&mut self, id: &str, delta: Vector2D<f32>) -> bool {
        let Some(label) = self.annotations.get(id) else {
            return false;
        };
        let position = label.position() + delta;
        self.update_annotation(
            id,
            AnnotationPatch {
                position: Some(position),
                ..AnnotationPatch::default()
            },
        )
        .is_ok()
    }

    pub fn remove_annotation(&mut self, id: &str) -> bool {
        if self.annotations.shift_remove(id).is_none() {
            return false;
        }
        self.record(LogEntry::RemoveAnnotation { id: id.to_string() });
        true
    }

    fn put_annotation(&mut self, label: AnnotationLabel) {
        let entry = LogEntry::PutAnnotation {
            id: label.id.clone(),
            text: label.text.clone(),
            x: label.x,
            y: label.y,
            font_size: label.font_size,
            color: label.color.clone(),
        };
        self.annotations.insert(label.id.clone(), label);
        self.record(entry);
    }

    // --- structural features ---------------------------------------------

    pub fn feature(&self, id: &str) -> Option<&StructuralFeature> {
        self.features.get(id)
    }

    pub fn features(&self) -> impl Iterator<Item = &StructuralFeature> + '_ {
        self.features.values()
    }

    /// Member ids of a feature that still name existing nucleotides
    pub fn feature_members(&self, id: &str) -> Vec<NucleotideId> {
        self.features
            .get(id)
            .map(|feature| {
                feature
                    .nucleotide_ids
                    .iter()
                    .copied()
                    .filter(|member| self.contains(*member))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Features listing `id` among their members
    pub fn features_containing(&self, id: NucleotideId) -> impl Iterator<Item = &StructuralFeature> + '_ {
        self.features
            .values()
            .filter(move |feature| feature.nucleotide_ids.contains(&id))
    }

    pub fn add_feature(&mut self, new: NewFeature) -> Result<String, StructureError> {
        if new.nucleotide_ids.is_empty() {
            return Err(StructureError::EmptyFeatureSelection);
        }
        let text = new.label_text.trim();
        if text.is_empty() {
            return Err(StructureError::EmptyLabelText);
        }
        self.check_members(&new.nucleotide_ids)?;

        let position = match new.label_position {
            Some(position) => position,
            None => self.feature_label_anchor(&new.nucleotide_ids),
        };
        let feature = StructuralFeature {
            id: format!("feature-{}", Uuid::new_v4()),
            feature_type: new.feature_type,
            nucleotide_ids: new.nucleotide_ids,
            label: FeatureLabel {
                text: text.to_string(),
                x: position.x,
                y: position.y,
                font_size: new.label_font_size,
                color: new.label_color,
            },
            description: new.description.filter(|d| !d.trim().is_empty()),
            color: new.color,
        };
        let id = feature.id.clone();
        self.put_feature(feature);
        Ok(id)
    }

    pub fn update_feature(&mut self, id: &str, patch: FeaturePatch) -> Result<(), StructureError> {
        let mut feature = self
            .features
            .get(id)
            .cloned()
            .ok_or_else(|| StructureError::UnknownFeature(id.to_string()))?;
        if let Some(members) = patch.nucleotide_ids {
            if members.is_empty() {
                return Err(StructureError::EmptyFeatureSelection);
            }
            self.check_members(&members)?;
            feature.nucleotide_ids = members;
        }
        if let Some(text) = patch.label_text {
            let text = text.trim();
            if text.is_empty() {
                return Err(StructureError::EmptyLabelText);
            }
            feature.label.text = text.to_string();
        }
        if let Some(feature_type) = patch.feature_type {
            feature.feature_type = feature_type;
        }
        if let Some(position) = patch.label_position {
            feature.label.x = position.x;
            feature.label.y = position.y;
        }
        if let Some(font_size) = patch.label_font_size {
            feature.label.font_size = font_size;
        }
        if let Some(color) = patch.label_color {
            feature.label.color = Some(color);
        }
        if let Some(description) = patch.description {
            feature.description = Some(description).filter(|d| !d.trim().is_empty());
        }
        if let Some(color) = patch.color {
            feature.color = Some(color);
        }
        self.put_feature(feature);
        Ok(())
    }

    pub fn translate_feature_label(&mut self, id: &str, delta: Vector2D<f32>) -> bool {
        let Some(feature) = self.features.get(id) else {
            return false;
        };
        let position = feature.label.position() + delta;
        self.update_feature(
            id,
            FeaturePatch {
                label_position: Some(position),
                ..FeaturePatch::default()
            },
        )
        .is_ok()
    }

    pub fn remove_feature(&mut self, id: &str) -> bool {
        if self.features.shift_remove(id).is_none() {
            return false;
        }
        self.record(LogEntry::RemoveFeature { id: id.to_string() });
        true
    }

    fn check_members(&self, members: &[NucleotideId]) -> Result<(), StructureError> {
        match members.iter().find(|id| !self.contains(**id)) {
            Some(missing) => Err(StructureError::UnknownNucleotide(*missing)),
            None => Ok(()),
        }
    }

    /// Centroid of the members, lifted by `FEATURE_LABEL_OFFSET_Y`
    fn feature_label_anchor(&self, members: &[NucleotideId]) -> Point2D<f32> {
        let positions: Vec<_> = members
            .iter()
            .filter_map(|id| self.nucleotide(*id))
            .map(|n| n.position)
            .collect();
        if positions.is_empty() {
            return Point2D::new(0.0, FEATURE_LABEL_OFFSET_Y);
        }
        let count = positions.len() as f32;
        let sum = positions
            .iter()
            .fold(Vector2D::zero(), |acc, p| acc + p.to_vector());
        (sum / count).to_point() + Vector2D::new(0.0, FEATURE_LABEL_OFFSET_Y)
    }

    fn put_feature(&mut self, feature: StructuralFeature) {
        let entry = LogEntry::PutFeature {
            id: feature.id.clone(),
            feature_type: feature.feature_type.as_str().to_string(),
            nucleotide_ids: feature.nucleotide_ids.clone(),
            label_text: feature.label.text.clone(),
            label_x: feature.label.x,
            label_y: feature.label.y,
            label_font_size: feature.label.font_size,
            label_color: feature.label.color.clone(),
            description: feature.description.clone(),
            color: feature.color.clone(),
        };
        self.features.insert(feature.id.clone(), feature);
        self.record(entry);
    }

    // --- whole-structure queries and transforms ----------------------------

    /// Mirror everything about the centre of the nucleotides' x-range.
    /// Returns false on an empty structure.
    pub fn flip_horizontal(&mut self) -> bool {
        let Some(center) = self.mirror_axis() else {
            return false;
        };
        self.mirror_about(center);
        self.record(LogEntry::FlipHorizontal);
        true
    }

    fn mirror_axis(&self) -> Option<f32> {
        let mut xs = self.nucleotides().map(|n| n.position.x);
        let first = xs.next()?;
        let (min, max) = xs.fold((first, first), |(lo, hi), x| (lo.min(x), hi.max(x)));
        Some((min + max) / 2.0)
    }

    fn mirror_about(&mut self, center: f32) {
        for node in self.inner.node_weights_mut() {
            node.position.x = 2.0 * center - node.position.x;
        }
        for label in self.annotations.values_mut() {
            label.x = 2.0 * center - label.x;
        }
        for feature in self.features.values_mut() {
            feature.label.x = 2.0 * center - feature.label.x;
        }
    }

    /// Nearest nucleotide whose centre lies within `radius` of `point`
    pub fn hit_test(&self, point: Point2D<f32>, radius: f32) -> Option<NucleotideId> {
        let grid = spatial::SpatialGrid::from_positions(radius, self.positions());
        grid.query_nearby(point)
            .into_iter()
            .map(|(id, position)| (id, (position - point).length()))
            .filter(|(_, distance)| *distance <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .map(|(id, _)| id)
    }

    /// Bases in insertion order, `N` for unassigned
    pub fn sequence(&self) -> String {
        self.nucleotides()
            .map(|n| n.base.map(Base::as_char).unwrap_or('N'))
            .collect()
    }

    pub fn stats(&self) -> StructureStats {
        let mut stats = StructureStats {
            nucleotides: self.nucleotide_count(),
            unassigned_bases: self.nucleotides().filter(|n| n.base.is_none()).count(),
            base_pairs: self.pair_count(),
            annotations: self.annotations.len(),
            features: self.features.len(),
            ..StructureStats::default()
        };
        for pair in self.base_pairs() {
            match pair.kind {
                PairKind::WatsonCrick => stats.canonical_pairs += 1,
                PairKind::Wobble => stats.wobble_pairs += 1,
                PairKind::NonCanonical | PairKind::Unassigned => {},
            }
        }
        stats
    }

    /// Whether there is anything worth persisting
    pub fn has_content(&self) -> bool {
        !self.index.is_empty() || !self.annotations.is_empty() || !self.features.is_empty()
    }

    // --- documents ---------------------------------------------------------

    /// Serialize the structure to a document
    pub fn to_document(&self) -> Document {
        Document {
            id: self.info.id.clone(),
            gene_id: self.info.gene_id.clone(),
            name: self.info.name.clone(),
            nucleotides: self
                .nucleotides()
                .map(|n| PersistedNucleotide {
                    id: n.id,
                    base: n.base,
                    x: n.position.x,
                    y: n.position.y,
                })
                .collect(),
            base_pairs: self
                .base_pairs()
                .map(|pair| PersistedBasePair {
                    from: pair.from,
                    to: pair.to,
                })
                .collect(),
            annotations: self.annotations.values().cloned().collect(),
            structural_features: self.features.values().cloned().collect(),
            canvas_width: self.info.canvas_width,
            canvas_height: self.info.canvas_height,
        }
    }

    /// Rebuild a structure from a document.
    ///
    /// Tolerant of data that slipped past validation: duplicate nucleotide
    /// ids keep the first occurrence, pairs naming missing nucleotides or a
    /// single nucleotide are dropped, repeated pairs collapse into one.
    pub fn from_document(doc: &Document) -> Self {
        let mut structure = Structure::new(DocumentInfo {
            id: doc.id.clone(),
            gene_id: doc.gene_id.clone(),
            name: doc.name.clone(),
            canvas_width: doc.canvas_width,
            canvas_height: doc.canvas_height,
        });

        for pn in &doc.nucleotides {
            if structure.contains(pn.id) {
                warn!("Skipping duplicate nucleotide id {} in {}", pn.id, doc.id);
                continue;
            }
            let key = structure.inner.add_node(Nucleotide {
                id: pn.id,
                base: pn.base,
                position: Point2D::new(pn.x, pn.y),
            });
            structure.index.insert(pn.id, key);
        }

        for pair in &doc.base_pairs {
            let from = structure.index.get(&pair.from).copied();
            let to = structure.index.get(&pair.to).copied();
            match (from, to) {
                (Some(from), Some(to)) if from != to => {
                    if structure.inner.find_edge(from, to).is_none() {
                        structure.inner.add_edge(from, to, ());
                    }
                },
                _ => warn!(
                    "Skipping invalid base pair {}-{} in {}",
                    pair.from, pair.to, doc.id
                ),
            }
        }

        for label in &doc.annotations {
            structure.annotations.insert(label.id.clone(), label.clone());
        }
        for feature in &doc.structural_features {
            structure.features.insert(feature.id.clone(), feature.clone());
        }

        structure
    }

    /// Swap in a whole document (import and restore path)
    pub fn replace_document(&mut self, doc: &Document) {
        let revision = self.revision;
        let journal = std::mem::take(&mut self.journal);
        *self = Structure::from_document(doc);
        self.journal = journal;
        self.revision = revision;

        match serde_json::to_string(doc) {
            Ok(document_json) => self.record(LogEntry::ReplaceDocument { document_json }),
            Err(e) => {
                warn!("Failed to journal document replacement: {e}");
                self.revision += 1;
            },
        }
    }

    /// Replay a journaled mutation. Entries that no longer apply are ignored.
    pub fn apply_log_entry(&mut self, entry: &LogEntry) {
        match entry {
            LogEntry::AddNucleotide { id, x, y } => {
                if !self.contains(*id) && *id > 0 {
                    self.insert_nucleotide(*id, Point2D::new(*x, *y), None);
                }
            },
            LogEntry::RemoveNucleotide { id } => {
                self.remove_nucleotide(*id);
            },
            LogEntry::MoveNucleotide { id, x, y } => {
                self.move_nucleotide(*id, Point2D::new(*x, *y));
            },
            LogEntry::SetBase { id, base } => {
                self.set_base(*id, base.and_then(Base::from_byte));
            },
            LogEntry::RenameNucleotide { old_id, new_id } => {
                if let Err(e) = self.rename_nucleotide(*old_id, *new_id) {
                    warn!("Skipping journaled rename {old_id} -> {new_id}: {e}");
                }
            },
            LogEntry::TogglePair { from, to } => {
                if let Err(e) = self.toggle_pair(*from, *to) {
                    warn!("Skipping journaled pair toggle {from}-{to}: {e}");
                }
            },
            LogEntry::PutAnnotation {
                id,
                text,
                x,
                y,
                font_size,
                color,
            } => self.put_annotation(AnnotationLabel {
                id: id.clone(),
                text: text.clone(),
                x: *x,
                y: *y,
                font_size: *font_size,
                color: color.clone(),
            }),
            LogEntry::RemoveAnnotation { id } => {
                self.remove_annotation(id);
            },
            LogEntry::PutFeature {
                id,
                feature_type,
                nucleotide_ids,
                label_text,
                label_x,
                label_y,
                label_font_size,
                label_color,
                description,
                color,
            } => {
                let Some(feature_type) = FeatureType::from_name(feature_type) else {
                    warn!("Skipping journaled feature {id} with unknown type {feature_type}");
                    return;
                };
                self.put_feature(StructuralFeature {
                    id: id.clone(),
                    feature_type,
                    nucleotide_ids: nucleotide_ids.clone(),
                    label: FeatureLabel {
                        text: label_text.clone(),
                        x: *label_x,
                        y: *label_y,
                        font_size: *label_font_size,
                        color: label_color.clone(),
                    },
                    description: description.clone(),
                    color: color.clone(),
                });
            },
            LogEntry::RemoveFeature { id } => {
                self.remove_feature(id);
            },
            LogEntry::RenameDocument { name } => self.set_name(name.clone()),
            LogEntry::ReplaceDocument { document_json } => {
                match serde_json::from_str::<Document>(document_json) {
                    Ok(doc) => self.replace_document(&doc),
                    Err(e) => warn!("Skipping journaled document replacement: {e}"),
                }
            },
            LogEntry::FlipHorizontal => {
                self.flip_horizontal();
            },
        }
    }
}

impl Default for Structure {
    fn default() -> Self {
        Self::from_document(&Document::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn structure_with(points: &[(f32, f32)]) -> Structure {
        let mut structure = Structure::default();
        for &(x, y) in points {
            let id = structure.next_id();
            structure.insert_nucleotide(id, Point2D::new(x, y), None);
        }
        structure.take_journal();
        structure
    }

    fn pair_set(structure: &Structure) -> Vec<(NucleotideId, NucleotideId)> {
        let mut pairs: Vec<_> = structure
            .base_pairs()
            .map(|p| (p.from.min(p.to), p.from.max(p.to)))
            .collect();
        pairs.sort_unstable();
        pairs
    }

    #[test]
    fn test_structure_new() {
        let structure = Structure::default();
        assert_eq!(structure.nucleotide_count(), 0);
        assert_eq!(structure.pair_count(), 0);
        assert_eq!(structure.info().id, "custom-rna-1");
        assert!(!structure.has_content());
    }

    #[test]
    fn test_first_add_lands_on_pointer() {
        let mut structure = Structure::default();
        let id = structure.add_nucleotide(Point2D::new(100.0, 100.0));
        assert_eq!(id, 1);
        let n = structure.nucleotide(1).unwrap();
        assert_eq!(n.position, Point2D::new(100.0, 100.0));
        assert_eq!(n.base, None);
    }

    #[test]
    fn test_second_add_snaps_to_link_distance() {
        let mut structure = Structure::default();
        structure.add_nucleotide(Point2D::new(100.0, 100.0));
        let id = structure.add_nucleotide(Point2D::new(105.0, 100.0));
        assert_eq!(id, 2);
        let position = structure.nucleotide(2).unwrap().position;
        assert!((position.x - 132.0).abs() < 1e-3);
        assert!((position.y - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_ids_are_max_plus_one() {
        let mut structure = structure_with(&[(0.0, 0.0), (100.0, 0.0), (200.0, 0.0)]);
        structure.remove_nucleotide(2);
        assert_eq!(structure.add_nucleotide(Point2D::new(500.0, 500.0)), 4);

        structure.rename_nucleotide(4, 10).unwrap();
        assert_eq!(structure.next_id(), 11);

        structure.remove_nucleotide(10);
        structure.remove_nucleotide(3);
        structure.remove_nucleotide(1);
        assert_eq!(structure.next_id(), 1);
    }

    #[test]
    fn test_chained_add_prefers_anchor_then_last() {
        let mut structure = structure_with(&[(0.0, 0.0), (300.0, 0.0)]);

        let chained = structure.add_nucleotide_chained(Some(1), Point2D::new(900.0, 900.0));
        assert_eq!(structure.nucleotide(chained).unwrap().position, Point2D::new(40.0, 0.0));

        let from_last = structure.add_nucleotide_chained(None, Point2D::new(900.0, 900.0));
        assert_eq!(structure.nucleotide(from_last).unwrap().position, Point2D::new(80.0, 0.0));

        let mut empty = Structure::default();
        let raw = empty.add_nucleotide_chained(Some(5), Point2D::new(900.0, 900.0));
        assert_eq!(empty.nucleotide(raw).unwrap().position, Point2D::new(900.0, 900.0));
    }

    #[test]
    fn test_toggle_pair_twice_is_noop() {
        let mut structure = structure_with(&[(0.0, 0.0), (100.0, 0.0), (200.0, 0.0)]);
        structure.toggle_pair(2, 3).unwrap();
        let before = pair_set(&structure);

        assert_eq!(structure.toggle_pair(1, 2), Ok(PairToggle::Added));
        assert_eq!(structure.toggle_pair(1, 2), Ok(PairToggle::Removed));
        assert_eq!(pair_set(&structure), before);
    }

    #[test]
    fn test_toggle_pair_is_order_independent() {
        let mut structure = structure_with(&[(0.0, 0.0), (100.0, 0.0)]);
        structure.toggle_pair(1, 2).unwrap();
        assert!(structure.has_pair(2, 1));
        assert_eq!(structure.toggle_pair(2, 1), Ok(PairToggle::Removed));
        assert!(!structure.has_pair(1, 2));
        assert_eq!(structure.pair_count(), 0);
    }

    #[test]
    fn test_toggle_pair_rejects_self_and_unknown() {
        let mut structure = structure_with(&[(0.0, 0.0)]);
        assert_eq!(structure.toggle_pair(1, 1), Err(StructureError::SelfPair(1)));
        assert_eq!(
            structure.toggle_pair(1, 9),
            Err(StructureError::UnknownNucleotide(9))
        );
        assert_eq!(structure.pair_count(), 0);
        assert!(structure.take_journal().is_empty());
    }

    #[test]
    fn test_remove_nucleotide_cascades_to_its_pairs_only() {
        let mut structure =
            structure_with(&[(0.0, 0.0), (100.0, 0.0), (200.0, 0.0), (300.0, 0.0)]);
        structure.toggle_pair(1, 2).unwrap();
        structure.toggle_pair(3, 2).unwrap();
        structure.toggle_pair(3, 4).unwrap();

        assert!(structure.remove_nucleotide(2));
        assert_eq!(pair_set(&structure), vec![(3, 4)]);
        assert!(!structure.remove_nucleotide(2));
    }

    #[test]
    fn test_remove_keeps_feature_membership() {
        let mut structure = structure_with(&[(0.0, 0.0), (100.0, 0.0)]);
        let feature = structure
            .add_feature(NewFeature::new(FeatureType::Stem, vec![1, 2], "Stem"))
            .unwrap();
        structure.remove_nucleotide(1);

        assert_eq!(structure.feature(&feature).unwrap().nucleotide_ids, vec![1, 2]);
        assert_eq!(structure.feature_members(&feature), vec![2]);
    }

    #[test]
    fn test_rename_conflict_leaves_structure_unchanged() {
        let mut structure = structure_with(&[(0.0, 0.0), (100.0, 0.0)]);
        structure.toggle_pair(1, 2).unwrap();
        let before = structure.to_document();
        let revision = structure.revision();

        assert_eq!(
            structure.rename_nucleotide(1, 2),
            Err(StructureError::IdInUse(2))
        );
        assert_eq!(structure.to_document(), before);
        assert_eq!(structure.revision(), revision);
    }

    #[test]
    fn test_rename_rewrites_pairs_and_features() {
        let mut structure = structure_with(&[(0.0, 0.0), (100.0, 0.0), (200.0, 0.0)]);
        structure.toggle_pair(1, 2).unwrap();
        structure.toggle_pair(3, 1).unwrap();
        let feature = structure
            .add_feature(NewFeature::new(FeatureType::Loop, vec![1, 3], "L"))
            .unwrap();

        structure.rename_nucleotide(1, 42).unwrap();

        assert!(!structure.contains(1));
        assert_eq!(pair_set(&structure), vec![(2, 42), (3, 42)]);
        assert_eq!(structure.feature(&feature).unwrap().nucleotide_ids, vec![42, 3]);
        assert_eq!(structure.nucleotide_ids().collect::<Vec<_>>(), vec![42, 2, 3]);
    }

    #[test]
    fn test_rename_rejects_zero_and_unknown() {
        let mut structure = structure_with(&[(0.0, 0.0)]);
        assert_eq!(structure.rename_nucleotide(1, 0), Err(StructureError::InvalidId(0)));
        assert_eq!(
            structure.rename_nucleotide(5, 6),
            Err(StructureError::UnknownNucleotide(5))
        );
        assert_eq!(structure.rename_nucleotide(1, 1), Ok(()));
    }

    #[test]
    fn test_set_base_and_pair_kinds() {
        let mut structure = structure_with(&[(0.0, 0.0), (100.0, 0.0), (200.0, 0.0)]);
        structure.toggle_pair(1, 2).unwrap();
        structure.toggle_pair(2, 3).unwrap();
        assert!(structure.base_pairs().all(|p| p.kind == PairKind::Unassigned));

        structure.set_base(1, Some(Base::G));
        structure.set_base(2, Some(Base::C));
        structure.set_base(3, Some(Base::C));

        let stats = structure.stats();
        assert_eq!(stats.base_pairs, 2);
        assert_eq!(stats.canonical_pairs, 1);
        assert_eq!(stats.unassigned_bases, 0);
        assert_eq!(structure.sequence(), "GCC");
        assert!(!structure.set_base(9, Some(Base::A)));
    }

    #[test]
    fn test_pair_kind_classification() {
        assert_eq!(PairKind::classify(Some(Base::A), Some(Base::U)), PairKind::WatsonCrick);
        assert_eq!(PairKind::classify(Some(Base::C), Some(Base::G)), PairKind::WatsonCrick);
        assert_eq!(PairKind::classify(Some(Base::U), Some(Base::G)), PairKind::Wobble);
        assert_eq!(PairKind::classify(Some(Base::A), Some(Base::A)), PairKind::NonCanonical);
        assert_eq!(PairKind::classify(None, Some(Base::A)), PairKind::Unassigned);
        assert!(!PairKind::Wobble.is_canonical());
    }

    #[test]
    fn test_add_feature_rejects_empty_selection() {
        let mut structure = structure_with(&[(0.0, 0.0), (100.0, 0.0)]);
        let rejected = structure.add_feature(
            NewFeature::new(FeatureType::Hairpin, vec![], "X")
                .with_label_position(Point2D::new(0.0, 0.0)),
        );
        assert_eq!(rejected, Err(StructureError::EmptyFeatureSelection));
        assert_eq!(structure.features().count(), 0);
    }

    #[test]
    fn test_add_feature_keeps_member_order() {
        let mut structure = structure_with(&[(0.0, 0.0), (100.0, 0.0)]);
        let id = structure
            .add_feature(
                NewFeature::new(FeatureType::Hairpin, vec![1, 2], "Loop A")
                    .with_label_position(Point2D::new(0.0, 0.0))
                    .with_font_size(14.0),
            )
            .unwrap();

        let feature = structure.feature(&id).unwrap();
        assert!(id.starts_with("feature-"));
        assert_eq!(feature.nucleotide_ids, vec![1, 2]);
        assert_eq!(feature.label.text, "Loop A");
        assert_eq!(feature.label.font_size, 14.0);
    }

    #[test]
    fn test_feature_label_defaults_above_centroid() {
        let mut structure = structure_with(&[(0.0, 100.0), (100.0, 200.0)]);
        let id = structure
            .add_feature(NewFeature::new(FeatureType::Stem, vec![1, 2], "S"))
            .unwrap();
        let label = &structure.feature(&id).unwrap().label;
        assert_eq!((label.x, label.y), (50.0, 110.0));
    }

    #[test]
    fn test_add_feature_rejects_blank_text_and_unknown_members() {
        let mut structure = structure_with(&[(0.0, 0.0)]);
        assert_eq!(
            structure.add_feature(NewFeature::new(FeatureType::Bulge, vec![1], "   ")),
            Err(StructureError::EmptyLabelText)
        );
        assert_eq!(
            structure.add_feature(NewFeature::new(FeatureType::Bulge, vec![1, 7], "B")),
            Err(StructureError::UnknownNucleotide(7))
        );
    }

    #[test]
    fn test_update_and_remove_feature() {
        let mut structure = structure_with(&[(0.0, 0.0), (100.0, 0.0)]);
        let id = structure
            .add_feature(NewFeature::new(FeatureType::Custom, vec![1], "C"))
            .unwrap();

        structure
            .update_feature(
                &id,
                FeaturePatch {
                    feature_type: Some(FeatureType::KTurn),
                    nucleotide_ids: Some(vec![2, 1]),
                    label_text: Some("K-turn I".to_string()),
                    ..FeaturePatch::default()
                },
            )
            .unwrap();
        let feature = structure.feature(&id).unwrap();
        assert_eq!(feature.feature_type, FeatureType::KTurn);
        assert_eq!(feature.nucleotide_ids, vec![2, 1]);

        assert_eq!(
            structure.update_feature(
                &id,
                FeaturePatch {
                    nucleotide_ids: Some(vec![]),
                    ..FeaturePatch::default()
                }
            ),
            Err(StructureError::EmptyFeatureSelection)
        );

        assert!(structure.translate_feature_label(&id, Vector2D::new(5.0, 5.0)));
        assert!(structure.remove_feature(&id));
        assert!(!structure.remove_feature(&id));
    }

    #[test]
    fn test_annotations_lifecycle() {
        let mut structure = Structure::default();
        assert_eq!(
            structure.add_annotation("  ", Point2D::new(0.0, 0.0), None),
            Err(StructureError::EmptyLabelText)
        );

        let id = structure
            .add_annotation("5' end", Point2D::new(10.0, 20.0), None)
            .unwrap();
        assert_eq!(structure.annotation(&id).unwrap().font_size, 14.0);

        structure
            .update_annotation(
                &id,
                AnnotationPatch {
                    text: Some("3' end".to_string()),
                    font_size: Some(18.0),
                    ..AnnotationPatch::default()
                },
            )
            .unwrap();
        assert!(structure.translate_annotation(&id, Vector2D::new(1.0, -1.0)));

        let label = structure.annotation(&id).unwrap();
        assert_eq!(label.text, "3' end");
        assert_eq!(label.position(), Point2D::new(11.0, 19.0));

        assert!(structure.remove_annotation(&id));
        assert!(structure.annotation(&id).is_none());
        assert!(matches!(
            structure.update_annotation(&id, AnnotationPatch::default()),
            Err(StructureError::UnknownAnnotation(_))
        ));
    }

    #[test]
    fn test_flip_horizontal_mirrors_about_center() {
        let mut structure = structure_with(&[(0.0, 0.0), (100.0, 50.0)]);
        let label = structure
            .add_annotation("L", Point2D::new(10.0, 0.0), None)
            .unwrap();

        assert!(structure.flip_horizontal());
        assert_eq!(structure.nucleotide(1).unwrap().position, Point2D::new(100.0, 0.0));
        assert_eq!(structure.nucleotide(2).unwrap().position, Point2D::new(0.0, 50.0));
        assert_eq!(structure.annotation(&label).unwrap().x, 90.0);

        assert!(!Structure::default().flip_horizontal());
    }

    #[test]
    fn test_hit_test() {
        let structure = structure_with(&[(0.0, 0.0), (30.0, 0.0)]);
        assert_eq!(structure.hit_test(Point2D::new(0.0, 0.0), 12.0), Some(1));
        assert_eq!(structure.hit_test(Point2D::new(26.0, 0.0), 12.0), Some(2));
        assert_eq!(structure.hit_test(Point2D::new(15.0, 20.0), 12.0), None);
    }

    #[test]
    fn test_far_coordinates_snap_and_hit_test() {
        let mut structure = structure_with(&[(1e11, 0.0), (-1e11, -1e11)]);

        let chained = structure.add_nucleotide_chained(Some(1), Point2D::new(0.0, 0.0));
        let placed = structure.add_nucleotide(Point2D::new(1e11, 10.0));
        assert_eq!(structure.nucleotide_count(), 4);
        assert!(structure.contains(chained) && structure.contains(placed));

        assert!(structure.hit_test(Point2D::new(1e11, 0.0), 12.0).is_some());
        assert_eq!(structure.hit_test(Point2D::new(-1e11, -1e11), 12.0), Some(2));
        assert_eq!(structure.hit_test(Point2D::new(0.0, 0.0), 12.0), None);
    }

    #[test]
    fn test_document_roundtrip() {
        let mut structure = structure_with(&[(0.0, 0.0), (100.0, 0.0), (200.0, 0.0)]);
        structure.set_base(1, Some(Base::A));
        structure.toggle_pair(1, 3).unwrap();
        structure.add_annotation("A", Point2D::new(5.0, 5.0), None).unwrap();
        structure
            .add_feature(NewFeature::new(FeatureType::Hairpin, vec![1, 2, 3], "H"))
            .unwrap();

        let doc = structure.to_document();
        let restored = Structure::from_document(&doc);
        assert_eq!(restored.to_document(), doc);
        assert_eq!(restored.revision(), 0);
    }

    #[test]
    fn test_from_document_skips_bad_pairs() {
        let mut doc = Document::default();
        for id in [1, 2, 2] {
            doc.nucleotides.push(PersistedNucleotide {
                id,
                base: None,
                x: id as f32,
                y: 0.0,
            });
        }
        doc.base_pairs = vec![
            PersistedBasePair { from: 1, to: 2 },
            PersistedBasePair { from: 2, to: 1 },
            PersistedBasePair { from: 1, to: 1 },
            PersistedBasePair { from: 1, to: 9 },
        ];

        let structure = Structure::from_document(&doc);
        assert_eq!(structure.nucleotide_count(), 2);
        assert_eq!(pair_set(&structure), vec![(1, 2)]);
    }

    #[test]
    fn test_replace_document_bumps_revision_and_journals() {
        let mut structure = structure_with(&[(0.0, 0.0)]);
        let revision = structure.revision();

        let mut doc = Document::default();
        doc.name = "Imported".to_string();
        structure.replace_document(&doc);

        assert_eq!(structure.info().name, "Imported");
        assert_eq!(structure.nucleotide_count(), 0);
        assert!(structure.revision() > revision);
        assert!(matches!(
            structure.take_journal().as_slice(),
            [LogEntry::ReplaceDocument { .. }]
        ));
    }

    #[test]
    fn test_journal_replay_reproduces_structure() {
        let mut live = Structure::default();
        live.add_nucleotide(Point2D::new(0.0, 0.0));
        live.add_nucleotide(Point2D::new(100.0, 0.0));
        live.add_nucleotide(Point2D::new(200.0, 0.0));
        live.set_base(2, Some(Base::U));
        live.toggle_pair(1, 3).unwrap();
        live.rename_nucleotide(3, 30).unwrap();
        live.move_nucleotide(2, Point2D::new(100.0, 40.0));
        live.add_annotation("a", Point2D::new(0.0, 0.0), Some(12.0)).unwrap();
        live.add_feature(NewFeature::new(FeatureType::Stem, vec![1, 30], "S"))
            .unwrap();
        live.remove_nucleotide(1);
        live.flip_horizontal();
        live.set_name("Replayed");

        let mut replayed = Structure::default();
        for entry in live.take_journal() {
            replayed.apply_log_entry(&entry);
        }
        assert_eq!(replayed.to_document(), live.to_document());
    }

    #[test]
    fn test_order_navigation_helpers() {
        let structure = structure_with(&[(0.0, 0.0), (100.0, 0.0)]);
        assert_eq!(structure.position_in_order(2), Some(1));
        assert_eq!(structure.nucleotide_at_order(0), Some(1));
        assert_eq!(structure.last_nucleotide(), Some(2));
        assert_eq!(structure.partners(1), Vec::<NucleotideId>::new());
    }
}
