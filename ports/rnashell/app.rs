/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Editing session state: mode, selection, drags and open editors.

use euclid::default::{Point2D, Size2D, Vector2D};
use log::{debug, warn};

use crate::config::keybinds::KeybindConfig;
use crate::graph::labels::{AnnotationPatch, FeaturePatch, FeatureType, NewFeature};
use crate::graph::{Base, NucleotideId, Structure, StructureError};
use crate::input::camera::{Camera, WHEEL_ZOOM_STEP};
use crate::input::pointer::{
    ClickAction, DragKind, DragSession, InteractionMode, PointerEvent, click_action, drag_start,
};
use crate::persistence::document::Document;
use crate::persistence::types::LogEntry;

/// Zoom change of the toolbar zoom buttons
pub const BUTTON_ZOOM_STEP: f32 = 0.25;

/// Viewport size assumed until the host reports one
const DEFAULT_VIEWPORT_WIDTH: f32 = 1200.0;
const DEFAULT_VIEWPORT_HEIGHT: f32 = 800.0;

/// Everything currently selected
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    /// Target of keyboard edits
    pub current_nucleotide: Option<NucleotideId>,

    /// Highlighted nucleotides (can be multiple)
    pub selected: Vec<NucleotideId>,

    pub current_label: Option<String>,

    /// Pair mode picks; never more than one between clicks
    pub pairing: Vec<NucleotideId>,

    /// Members of the feature being built or edited
    pub feature_members: Vec<NucleotideId>,
}

impl Selection {
    fn forget(&mut self, id: NucleotideId) {
        if self.current_nucleotide == Some(id) {
            self.current_nucleotide = None;
        }
        self.selected.retain(|s| *s != id);
        self.pairing.retain(|s| *s != id);
        self.feature_members.retain(|s| *s != id);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LabelModal {
    /// New annotation at a logical position
    Create { position: Point2D<f32> },
    Edit { annotation: String },
}

/// Editor that currently owns keyboard focus
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Overlay {
    #[default]
    None,
    /// Inline id rename of a nucleotide
    IdEditor(NucleotideId),
    LabelModal(LabelModal),
    /// `editing` is `None` while building a new feature
    FeatureModal { editing: Option<String> },
}

/// Fields of the feature modal form
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureForm {
    pub feature_type: FeatureType,
    pub label_text: String,
    pub label_font_size: Option<f32>,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// User-visible message raised by a rejected command
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigateDirection {
    Previous,
    Next,
}

/// One interactive editing session over a live structure
pub struct EditorSession {
    structure: Structure,
    pub camera: Camera,
    mode: InteractionMode,
    pub selection: Selection,
    drag: Option<DragSession>,
    overlay: Overlay,
    viewport: Size2D<f32>,
    pub keybinds: KeybindConfig,
    notices: Vec<Notice>,
}

impl EditorSession {
    pub fn new(structure: Structure, keybinds: KeybindConfig) -> Self {
        Self {
            structure,
            camera: Camera::new(),
            mode: InteractionMode::Select,
            selection: Selection::default(),
            drag: None,
            overlay: Overlay::None,
            viewport: Size2D::new(DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT),
            keybinds,
            notices: Vec::new(),
        }
    }

    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    /// Drain the mutations recorded since the last call
    pub fn take_journal(&mut self) -> Vec<LogEntry> {
        self.structure.take_journal()
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn drag(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    pub fn viewport(&self) -> Size2D<f32> {
        self.viewport
    }

    pub fn set_viewport_size(&mut self, size: Size2D<f32>) {
        self.viewport = size;
    }

    /// Keyboard shortcuts other than Escape are off while an editor is open
    pub fn shortcuts_suppressed(&self) -> bool {
        self.overlay != Overlay::None
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        let message = message.into();
        debug!("Notice: {message}");
        self.notices.push(Notice { level, message });
    }

    fn reject(&mut self, error: StructureError) {
        self.notify(NoticeLevel::Error, error.to_string());
    }

    // --- modes and view ----------------------------------------------------

    /// Switch mode. Ends any drag and drops the pair-mode pick.
    pub fn set_mode(&mut self, mode: InteractionMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        self.drag = None;
        self.selection.pairing.clear();
    }

    pub fn zoom_by(&mut self, delta: f32) {
        self.camera.zoom_by(delta);
    }

    pub fn zoom_in(&mut self) {
        self.zoom_by(BUTTON_ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_by(-BUTTON_ZOOM_STEP);
    }

    pub fn reset_view(&mut self) {
        self.camera.reset();
    }

    /// Logical point under the middle of the viewport
    pub fn viewport_center(&self) -> Point2D<f32> {
        let center = Point2D::new(self.viewport.width / 2.0, self.viewport.height / 2.0);
        self.camera.screen_to_logical(center)
    }

    // --- selection -----------------------------------------------------------

    /// Clear every selection, end any drag and close the open editor
    pub fn clear_selection(&mut self) {
        self.selection = Selection::default();
        self.overlay = Overlay::None;
        self.drag = None;
    }

    /// Select a nucleotide. With `multi`, clicking a selected one deselects it.
    pub fn select_nucleotide(&mut self, id: NucleotideId, multi: bool) {
        if !self.structure.contains(id) {
            return;
        }
        self.selection.current_label = None;
        if !multi {
            self.selection.current_nucleotide = Some(id);
            self.selection.selected = vec![id];
            return;
        }
        if let Some(index) = self.selection.selected.iter().position(|s| *s == id) {
            self.selection.selected.remove(index);
            if self.selection.current_nucleotide == Some(id) {
                self.selection.current_nucleotide = self.selection.selected.last().copied();
            }
        } else {
            self.selection.selected.push(id);
            self.selection.current_nucleotide = Some(id);
        }
    }

    pub fn select_annotation(&mut self, id: &str) {
        if self.structure.annotation(id).is_none() {
            return;
        }
        self.selection.current_label = Some(id.to_string());
        self.selection.current_nucleotide = None;
        self.selection.selected.clear();
    }

    /// Step the current nucleotide through insertion order, wrapping at both ends
    pub fn navigate(&mut self, direction: NavigateDirection) {
        let count = self.structure.nucleotide_count();
        if count == 0 {
            return;
        }
        let current = self
            .selection
            .current_nucleotide
            .and_then(|id| self.structure.position_in_order(id));
        let order = match (current, direction) {
            (None, NavigateDirection::Previous) => count - 1,
            (None, NavigateDirection::Next) => 0,
            (Some(i), NavigateDirection::Previous) => (i + count - 1) % count,
            (Some(i), NavigateDirection::Next) => (i + 1) % count,
        };
        if let Some(id) = self.structure.nucleotide_at_order(order) {
            self.select_nucleotide(id, false);
        }
    }

    // --- nucleotides ---------------------------------------------------------

    /// Add a nucleotide near a logical point and make it current
    pub fn add_nucleotide_at(&mut self, position: Point2D<f32>) -> NucleotideId {
        let id = self.structure.add_nucleotide(position);
        self.select_nucleotide(id, false);
        id
    }

    pub fn add_nucleotide_at_screen(&mut self, screen: Point2D<f32>) -> NucleotideId {
        let position = self.camera.screen_to_logical(screen);
        self.add_nucleotide_at(position)
    }

    /// Keyboard add: chain off the current nucleotide, else the last added,
    /// else the viewport centre. Returns to select mode.
    pub fn add_nucleotide_chained(&mut self) -> NucleotideId {
        let fallback = self.viewport_center();
        let id = self
            .structure
            .add_nucleotide_chained(self.selection.current_nucleotide, fallback);
        self.select_nucleotide(id, false);
        self.set_mode(InteractionMode::Select);
        id
    }

    pub fn remove_nucleotide(&mut self, id: NucleotideId) -> bool {
        if !self.structure.remove_nucleotide(id) {
            return false;
        }
        self.selection.forget(id);
        if self.overlay == Overlay::IdEditor(id) {
            self.overlay = Overlay::None;
        }
        if matches!(&self.drag, Some(DragSession { kind: DragKind::Nucleotide(d), .. }) if *d == id) {
            self.drag = None;
        }
        true
    }

    pub fn set_current_base(&mut self, base: Base) -> bool {
        match self.selection.current_nucleotide {
            Some(id) => self.structure.set_base(id, Some(base)),
            None => false,
        }
    }

    /// Delete the current nucleotide, or the current label when no
    /// nucleotide is current
    pub fn delete_current(&mut self) -> bool {
        if let Some(id) = self.selection.current_nucleotide {
            return self.remove_nucleotide(id);
        }
        if let Some(label) = self.selection.current_label.take() {
            return self.structure.remove_annotation(&label);
        }
        false
    }

    /// Rename a nucleotide; a conflict is reported as a notice and leaves
    /// the structure untouched
    pub fn rename_nucleotide(
        &mut self,
        old_id: NucleotideId,
        new_id: NucleotideId,
    ) -> Result<(), StructureError> {
        if let Err(e) = self.structure.rename_nucleotide(old_id, new_id) {
            self.reject(e.clone());
            return Err(e);
        }
        for list in [
            &mut self.selection.selected,
            &mut self.selection.pairing,
            &mut self.selection.feature_members,
        ] {
            for member in list.iter_mut() {
                if *member == old_id {
                    *member = new_id;
                }
            }
        }
        self.select_nucleotide(new_id, false);
        Ok(())
    }

    pub fn begin_id_edit(&mut self) -> bool {
        match self.selection.current_nucleotide {
            Some(id) => {
                self.overlay = Overlay::IdEditor(id);
                true
            },
            None => false,
        }
    }

    /// Commit the inline id editor. It stays open when the rename fails.
    pub fn submit_id_edit(&mut self, new_id: NucleotideId) -> bool {
        let Overlay::IdEditor(old_id) = &self.overlay else {
            return false;
        };
        let old_id = *old_id;
        if self.rename_nucleotide(old_id, new_id).is_err() {
            return false;
        }
        self.overlay = Overlay::None;
        true
    }

    // --- pairing ---------------------------------------------------------------

    /// Add or drop a pair-mode pick; the second pick toggles the pair
    pub fn toggle_pair_member(&mut self, id: NucleotideId) {
        if !self.structure.contains(id) {
            return;
        }
        if let Some(index) = self.selection.pairing.iter().position(|p| *p == id) {
            self.selection.pairing.remove(index);
            return;
        }
        self.selection.pairing.push(id);
        if let [a, b] = self.selection.pairing[..] {
            self.selection.pairing.clear();
            if let Err(e) = self.structure.toggle_pair(a, b) {
                self.reject(e);
            }
        }
    }

    // --- annotations -----------------------------------------------------------

    pub fn open_label_create(&mut self, position: Point2D<f32>) {
        self.overlay = Overlay::LabelModal(LabelModal::Create { position });
    }

    pub fn open_label_editor(&mut self, id: &str) {
        if self.structure.annotation(id).is_some() {
            self.overlay = Overlay::LabelModal(LabelModal::Edit {
                annotation: id.to_string(),
            });
        }
    }

    /// Commit the label modal; it stays open on rejected input
    pub fn submit_label(&mut self, text: &str, font_size: Option<f32>) -> bool {
        let Overlay::LabelModal(modal) = self.overlay.clone() else {
            return false;
        };
        let result = match modal {
            LabelModal::Create { position } => self
                .structure
                .add_annotation(text, position, font_size)
                .map(|_| ()),
            LabelModal::Edit { annotation } => self.structure.update_annotation(
                &annotation,
                AnnotationPatch {
                    text: Some(text.to_string()),
                    font_size,
                    ..AnnotationPatch::default()
                },
            ),
        };
        match result {
            Ok(()) => {
                self.overlay = Overlay::None;
                true
            },
            Err(e) => {
                self.reject(e);
                false
            },
        }
    }

    /// Delete the label open in the edit modal
    pub fn delete_edited_label(&mut self) -> bool {
        let Overlay::LabelModal(LabelModal::Edit { annotation }) = &self.overlay else {
            return false;
        };
        let id = annotation.clone();
        self.overlay = Overlay::None;
        if self.selection.current_label.as_deref() == Some(id.as_str()) {
            self.selection.current_label = None;
        }
        self.structure.remove_annotation(&id)
    }

    // --- structural features ---------------------------------------------------

    pub fn toggle_feature_member(&mut self, id: NucleotideId) {
        if !self.structure.contains(id) {
            return;
        }
        let members = &mut self.selection.feature_members;
        match members.iter().position(|m| *m == id) {
            Some(index) => {
                members.remove(index);
            },
            None => members.push(id),
        }
    }

    /// Open the feature modal for the current member selection
    pub fn open_feature_builder(&mut self) -> bool {
        if self.selection.feature_members.is_empty() {
            self.notify(NoticeLevel::Error, "Please select nucleotides first");
            return false;
        }
        self.overlay = Overlay::FeatureModal { editing: None };
        true
    }

    /// Open an existing feature, seeding the members from it
    pub fn open_feature_editor(&mut self, id: &str) -> bool {
        if self.structure.feature(id).is_none() {
            return false;
        }
        self.selection.feature_members = self.structure.feature_members(id);
        self.overlay = Overlay::FeatureModal {
            editing: Some(id.to_string()),
        };
        true
    }

    /// Create or update the feature from the modal. On success the member
    /// selection is cleared and the session returns to select mode.
    pub fn submit_feature(&mut self, form: FeatureForm) -> Option<String> {
        let Overlay::FeatureModal { editing } = self.overlay.clone() else {
            return None;
        };
        let members = self.selection.feature_members.clone();
        let result = match editing {
            None => {
                let mut new = NewFeature::new(form.feature_type, members, form.label_text);
                if let Some(font_size) = form.label_font_size {
                    new = new.with_font_size(font_size);
                }
                new.description = form.description;
                new.color = form.color;
                self.structure.add_feature(new)
            },
            Some(id) => self
                .structure
                .update_feature(
                    &id,
                    FeaturePatch {
                        feature_type: Some(form.feature_type),
                        nucleotide_ids: Some(members),
                        label_text: Some(form.label_text),
                        label_font_size: form.label_font_size,
                        description: form.description,
                        color: form.color,
                        ..FeaturePatch::default()
                    },
                )
                .map(|()| id),
        };
        match result {
            Ok(id) => {
                self.selection.feature_members.clear();
                self.overlay = Overlay::None;
                self.set_mode(InteractionMode::Select);
                Some(id)
            },
            Err(e) => {
                self.reject(e);
                None
            },
        }
    }

    /// Delete the feature open in the modal
    pub fn delete_edited_feature(&mut self) -> bool {
        let Overlay::FeatureModal { editing: Some(id) } = &self.overlay else {
            return false;
        };
        let id = id.clone();
        self.overlay = Overlay::None;
        self.selection.feature_members.clear();
        self.structure.remove_feature(&id)
    }

    /// Dismiss the open editor without committing
    pub fn close_overlay(&mut self) {
        self.overlay = Overlay::None;
    }

    // --- whole document ----------------------------------------------------------

    pub fn rename_document(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            warn!("Ignoring empty document name");
            return;
        }
        self.structure.set_name(name);
    }

    pub fn flip_horizontal(&mut self) -> bool {
        self.structure.flip_horizontal()
    }

    /// Swap in a whole document and drop all transient state
    pub fn replace_document(&mut self, doc: &Document) {
        self.structure.replace_document(doc);
        self.selection = Selection::default();
        self.overlay = Overlay::None;
        self.drag = None;
    }

    // --- pointer -------------------------------------------------------------------

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Up { .. } | PointerEvent::Leave => self.drag = None,
            _ if self.modal_open() => {},
            PointerEvent::Down {
                target,
                position,
                button,
            } => {
                let Some(kind) = drag_start(self.mode, &target, button) else {
                    return;
                };
                if let DragKind::Annotation(id) = &kind {
                    self.select_annotation(id);
                }
                self.drag = Some(DragSession::new(kind, position));
            },
            PointerEvent::Move { position } => self.drag_to(position),
            PointerEvent::Click {
                target,
                position,
                multi,
            } => {
                let action = click_action(self.mode, &target, multi);
                self.apply_click(action, position);
            },
            PointerEvent::Wheel { delta_y } => {
                if delta_y > 0.0 {
                    self.camera.zoom_by(-WHEEL_ZOOM_STEP);
                } else if delta_y < 0.0 {
                    self.camera.zoom_by(WHEEL_ZOOM_STEP);
                }
            },
        }
    }

    fn modal_open(&self) -> bool {
        matches!(
            self.overlay,
            Overlay::LabelModal(_) | Overlay::FeatureModal { .. }
        )
    }

    fn drag_to(&mut self, position: Point2D<f32>) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        let delta = drag.advance(position);
        if delta == Vector2D::zero() {
            return;
        }
        let logical = self.camera.screen_delta_to_logical(delta);
        let still_there = match &drag.kind {
            DragKind::Viewport => {
                self.camera.pan_by(delta);
                true
            },
            DragKind::Nucleotide(id) => self.structure.translate_nucleotide(*id, logical),
            DragKind::Annotation(id) => self.structure.translate_annotation(id, logical),
            DragKind::FeatureLabel(id) => self.structure.translate_feature_label(id, logical),
        };
        if !still_there {
            self.drag = None;
        }
    }

    fn apply_click(&mut self, action: ClickAction, screen: Point2D<f32>) {
        match action {
            ClickAction::Ignore => {},
            ClickAction::ClearSelection => self.clear_selection(),
            ClickAction::SelectNucleotide { id, multi } => self.select_nucleotide(id, multi),
            ClickAction::SelectAnnotation(id) => self.select_annotation(&id),
            ClickAction::AddNucleotide => {
                self.add_nucleotide_at_screen(screen);
                self.set_mode(InteractionMode::Select);
            },
            ClickAction::ClearPairing => self.selection.pairing.clear(),
            ClickAction::TogglePairMember(id) => self.toggle_pair_member(id),
            ClickAction::RemoveNucleotide(id) => {
                self.remove_nucleotide(id);
            },
            ClickAction::OpenLabelCreate => {
                let position = self.camera.screen_to_logical(screen);
                self.open_label_create(position);
            },
            ClickAction::OpenLabelEditor(id) => self.open_label_editor(&id),
            ClickAction::ToggleFeatureMember(id) => self.toggle_feature_member(id),
            ClickAction::OpenFeatureEditor(id) => {
                self.open_feature_editor(&id);
            },
        }
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(Structure::default(), KeybindConfig::default())
    }
}
