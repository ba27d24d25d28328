/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Pointer interpretation: what a click or a press means in each mode.
//!
//! Dispatch is a pair of tables keyed on `(mode, target)`. The renderer
//! resolves what lies under the pointer and reports it as a `CanvasTarget`;
//! nothing here knows how anything is drawn.

use crate::graph::NucleotideId;
use euclid::default::{Point2D, Vector2D};

/// Editing mode of the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InteractionMode {
    #[default]
    Select,
    Add,
    Pair,
    Delete,
    Label,
    Pan,
    Feature,
}

impl InteractionMode {
    pub const ALL: [InteractionMode; 7] = [
        InteractionMode::Select,
        InteractionMode::Add,
        InteractionMode::Pair,
        InteractionMode::Delete,
        InteractionMode::Label,
        InteractionMode::Pan,
        InteractionMode::Feature,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InteractionMode::Select => "select",
            InteractionMode::Add => "add",
            InteractionMode::Pair => "pair",
            InteractionMode::Delete => "delete",
            InteractionMode::Label => "label",
            InteractionMode::Pan => "pan",
            InteractionMode::Feature => "feature",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.as_str() == name)
    }
}

/// What the pointer is over
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanvasTarget {
    Empty,
    Nucleotide(NucleotideId),
    Annotation(String),
    FeatureLabel(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

/// Pointer input in screen coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    Down {
        target: CanvasTarget,
        position: Point2D<f32>,
        button: PointerButton,
    },
    Move {
        position: Point2D<f32>,
    },
    Up {
        position: Point2D<f32>,
    },
    /// Pointer left the canvas
    Leave,
    /// Primary click; `multi` when a multi-select modifier is held
    Click {
        target: CanvasTarget,
        position: Point2D<f32>,
        multi: bool,
    },
    /// Wheel notch; positive `delta_y` scrolls away and zooms out
    Wheel {
        delta_y: f32,
    },
}

/// Interpretation of a primary click
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickAction {
    Ignore,
    ClearSelection,
    SelectNucleotide { id: NucleotideId, multi: bool },
    SelectAnnotation(String),
    AddNucleotide,
    ClearPairing,
    TogglePairMember(NucleotideId),
    RemoveNucleotide(NucleotideId),
    OpenLabelCreate,
    OpenLabelEditor(String),
    ToggleFeatureMember(NucleotideId),
    OpenFeatureEditor(String),
}

/// The `(mode, target)` click table
pub fn click_action(mode: InteractionMode, target: &CanvasTarget, multi: bool) -> ClickAction {
    use CanvasTarget as T;
    use InteractionMode as M;

    match (mode, target) {
        (M::Select, T::Empty) => ClickAction::ClearSelection,
        (M::Select, T::Nucleotide(id)) => ClickAction::SelectNucleotide { id: *id, multi },
        (M::Select, T::Annotation(id)) => ClickAction::SelectAnnotation(id.clone()),
        (M::Select, T::FeatureLabel(id)) => ClickAction::OpenFeatureEditor(id.clone()),

        (M::Add, T::Empty) => ClickAction::AddNucleotide,
        (M::Add, _) => ClickAction::Ignore,

        (M::Pair, T::Empty) => ClickAction::ClearPairing,
        (M::Pair, T::Nucleotide(id)) => ClickAction::TogglePairMember(*id),
        (M::Pair, _) => ClickAction::Ignore,

        (M::Delete, T::Nucleotide(id)) => ClickAction::RemoveNucleotide(*id),
        (M::Delete, _) => ClickAction::Ignore,

        (M::Label, T::Empty) => ClickAction::OpenLabelCreate,
        (M::Label, T::Annotation(id)) => ClickAction::OpenLabelEditor(id.clone()),
        (M::Label, _) => ClickAction::Ignore,

        (M::Feature, T::Nucleotide(id)) => ClickAction::ToggleFeatureMember(*id),
        (M::Feature, T::FeatureLabel(id)) => ClickAction::OpenFeatureEditor(id.clone()),
        (M::Feature, _) => ClickAction::Ignore,

        (M::Pan, _) => ClickAction::Ignore,
    }
}

/// What an active drag moves
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragKind {
    Nucleotide(NucleotideId),
    Annotation(String),
    FeatureLabel(String),
    Viewport,
}

/// The `(mode, target)` press table. Middle-button drags pan in any mode.
pub fn drag_start(
    mode: InteractionMode,
    target: &CanvasTarget,
    button: PointerButton,
) -> Option<DragKind> {
    use CanvasTarget as T;
    use InteractionMode as M;

    match button {
        PointerButton::Middle => return Some(DragKind::Viewport),
        PointerButton::Secondary => return None,
        PointerButton::Primary => {},
    }

    match (mode, target) {
        (M::Pan, _) => Some(DragKind::Viewport),
        (M::Select, T::Nucleotide(id)) => Some(DragKind::Nucleotide(*id)),
        (M::Select, T::Annotation(id)) => Some(DragKind::Annotation(id.clone())),
        (M::Select, T::FeatureLabel(id)) => Some(DragKind::FeatureLabel(id.clone())),
        _ => None,
    }
}

/// In-flight drag; dropped on release or when the pointer leaves
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub kind: DragKind,
    pub last_pointer: Point2D<f32>,
}

impl DragSession {
    pub fn new(kind: DragKind, pointer: Point2D<f32>) -> Self {
        Self {
            kind,
            last_pointer: pointer,
        }
    }

    /// Screen-space movement since the previous event
    pub fn advance(&mut self, pointer: Point2D<f32>) -> Vector2D<f32> {
        let delta = pointer - self.last_pointer;
        self.last_pointer = pointer;
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_names_roundtrip() {
        for mode in InteractionMode::ALL {
            assert_eq!(InteractionMode::from_name(mode.as_str()), Some(mode));
        }
        assert_eq!(InteractionMode::from_name("erase"), None);
    }

    #[test]
    fn test_click_table_empty_canvas() {
        let empty = CanvasTarget::Empty;
        assert_eq!(
            click_action(InteractionMode::Select, &empty, false),
            ClickAction::ClearSelection
        );
        assert_eq!(click_action(InteractionMode::Add, &empty, false), ClickAction::AddNucleotide);
        assert_eq!(click_action(InteractionMode::Pair, &empty, false), ClickAction::ClearPairing);
        assert_eq!(click_action(InteractionMode::Delete, &empty, false), ClickAction::Ignore);
        assert_eq!(
            click_action(InteractionMode::Label, &empty, false),
            ClickAction::OpenLabelCreate
        );
        assert_eq!(click_action(InteractionMode::Pan, &empty, false), ClickAction::Ignore);
        assert_eq!(click_action(InteractionMode::Feature, &empty, false), ClickAction::Ignore);
    }

    #[test]
    fn test_click_table_nucleotide() {
        let hit = CanvasTarget::Nucleotide(4);
        assert_eq!(
            click_action(InteractionMode::Select, &hit, true),
            ClickAction::SelectNucleotide { id: 4, multi: true }
        );
        assert_eq!(click_action(InteractionMode::Add, &hit, false), ClickAction::Ignore);
        assert_eq!(
            click_action(InteractionMode::Pair, &hit, false),
            ClickAction::TogglePairMember(4)
        );
        assert_eq!(
            click_action(InteractionMode::Delete, &hit, false),
            ClickAction::RemoveNucleotide(4)
        );
        assert_eq!(
            click_action(InteractionMode::Feature, &hit, false),
            ClickAction::ToggleFeatureMember(4)
        );
    }

    #[test]
    fn test_click_table_labels() {
        let label = CanvasTarget::Annotation("label-1".to_string());
        assert_eq!(
            click_action(InteractionMode::Select, &label, false),
            ClickAction::SelectAnnotation("label-1".to_string())
        );
        assert_eq!(
            click_action(InteractionMode::Label, &label, false),
            ClickAction::OpenLabelEditor("label-1".to_string())
        );

        let feature = CanvasTarget::FeatureLabel("feature-1".to_string());
        assert_eq!(
            click_action(InteractionMode::Feature, &feature, false),
            ClickAction::OpenFeatureEditor("feature-1".to_string())
        );
        assert_eq!(click_action(InteractionMode::Delete, &feature, false), ClickAction::Ignore);
    }

    #[test]
    fn test_drag_table() {
        let hit = CanvasTarget::Nucleotide(1);
        assert_eq!(
            drag_start(InteractionMode::Select, &hit, PointerButton::Primary),
            Some(DragKind::Nucleotide(1))
        );
        assert_eq!(drag_start(InteractionMode::Pair, &hit, PointerButton::Primary), None);
        assert_eq!(
            drag_start(InteractionMode::Pan, &hit, PointerButton::Primary),
            Some(DragKind::Viewport)
        );
        assert_eq!(
            drag_start(InteractionMode::Add, &CanvasTarget::Empty, PointerButton::Middle),
            Some(DragKind::Viewport)
        );
        assert_eq!(
            drag_start(InteractionMode::Select, &hit, PointerButton::Secondary),
            None
        );
    }

    #[test]
    fn test_drag_session_advance() {
        let mut session = DragSession::new(DragKind::Viewport, Point2D::new(10.0, 10.0));
        assert_eq!(session.advance(Point2D::new(15.0, 7.0)), Vector2D::new(5.0, -3.0));
        assert_eq!(session.advance(Point2D::new(15.0, 7.0)), Vector2D::zero());
    }
}
