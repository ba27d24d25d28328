/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Free-text annotation labels and structural features.
//!
//! These carry their own positions and live beside the nucleotide graph
//! rather than inside it. Their serde shape is the document shape, so the
//! same values are written to exports and autosave slots.

use crate::graph::NucleotideId;
use euclid::default::Point2D;
use serde::{Deserialize, Serialize};

/// Font size used for new annotation labels
pub const DEFAULT_ANNOTATION_FONT_SIZE: f32 = 14.0;

/// Font size used for new feature labels
pub const DEFAULT_FEATURE_FONT_SIZE: f32 = 16.0;

/// Colour of annotation text when none is set
pub const DEFAULT_ANNOTATION_COLOR: &str = "#374151";

/// Vertical offset applied to a feature label placed at its members' centroid
pub const FEATURE_LABEL_OFFSET_Y: f32 = -40.0;

/// Free-text label on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationLabel {
    pub id: String,
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl AnnotationLabel {
    pub fn position(&self) -> Point2D<f32> {
        Point2D::new(self.x, self.y)
    }

    /// Colour to draw the text with
    pub fn display_color(&self) -> &str {
        self.color.as_deref().unwrap_or(DEFAULT_ANNOTATION_COLOR)
    }
}

/// Partial update for an annotation; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationPatch {
    pub text: Option<String>,
    pub position: Option<Point2D<f32>>,
    pub font_size: Option<f32>,
    pub color: Option<String>,
}

/// Kind of RNA motif a feature marks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureType {
    KTurn,
    Hairpin,
    Loop,
    Stem,
    Bulge,
    InternalLoop,
    MultiBranchLoop,
    Custom,
}

impl FeatureType {
    pub const ALL: [FeatureType; 8] = [
        FeatureType::KTurn,
        FeatureType::Hairpin,
        FeatureType::Loop,
        FeatureType::Stem,
        FeatureType::Bulge,
        FeatureType::InternalLoop,
        FeatureType::MultiBranchLoop,
        FeatureType::Custom,
    ];

    /// Name used in documents and journal entries
    pub fn as_str(self) -> &'static str {
        match self {
            FeatureType::KTurn => "k-turn",
            FeatureType::Hairpin => "hairpin",
            FeatureType::Loop => "loop",
            FeatureType::Stem => "stem",
            FeatureType::Bulge => "bulge",
            FeatureType::InternalLoop => "internal-loop",
            FeatureType::MultiBranchLoop => "multi-branch-loop",
            FeatureType::Custom => "custom",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Highlight colour when the feature does not set its own
    pub fn default_color(self) -> &'static str {
        match self {
            FeatureType::KTurn => "#8b5cf6",
            FeatureType::Hairpin => "#3b82f6",
            FeatureType::Loop => "#10b981",
            FeatureType::Stem => "#f59e0b",
            FeatureType::Bulge => "#ef4444",
            FeatureType::InternalLoop => "#ec4899",
            FeatureType::MultiBranchLoop => "#06b6d4",
            FeatureType::Custom => "#6b7280",
        }
    }
}

/// Label attached to a structural feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureLabel {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl FeatureLabel {
    pub fn position(&self) -> Point2D<f32> {
        Point2D::new(self.x, self.y)
    }
}

/// Named grouping of nucleotides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralFeature {
    pub id: String,
    pub feature_type: FeatureType,
    /// Member ids in selection order. May name nucleotides deleted since.
    pub nucleotide_ids: Vec<NucleotideId>,
    pub label: FeatureLabel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl StructuralFeature {
    /// Highlight colour: the feature's own, else its type's default
    pub fn display_color(&self) -> &str {
        self.color
            .as_deref()
            .unwrap_or_else(|| self.feature_type.default_color())
    }
}

/// Input for creating a feature.
///
/// A missing `label_position` places the label above the centroid of the
/// member nucleotides.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFeature {
    pub feature_type: FeatureType,
    pub nucleotide_ids: Vec<NucleotideId>,
    pub label_text: String,
    pub label_position: Option<Point2D<f32>>,
    pub label_font_size: f32,
    pub label_color: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

impl NewFeature {
    pub fn new(
        feature_type: FeatureType,
        nucleotide_ids: Vec<NucleotideId>,
        label_text: impl Into<String>,
    ) -> Self {
        Self {
            feature_type,
            nucleotide_ids,
            label_text: label_text.into(),
            label_position: None,
            label_font_size: DEFAULT_FEATURE_FONT_SIZE,
            label_color: None,
            description: None,
            color: None,
        }
    }

    pub fn with_label_position(mut self, position: Point2D<f32>) -> Self {
        self.label_position = Some(position);
        self
    }

    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.label_font_size = font_size;
        self
    }
}

/// Partial update for a feature; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeaturePatch {
    pub feature_type: Option<FeatureType>,
    pub nucleotide_ids: Option<Vec<NucleotideId>>,
    pub label_text: Option<String>,
    pub label_position: Option<Point2D<f32>>,
    pub label_font_size: Option<f32>,
    pub label_color: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_type_names_roundtrip() {
        for kind in FeatureType::ALL {
            assert_eq!(FeatureType::from_name(kind.as_str()), Some(kind));
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
        assert_eq!(FeatureType::from_name("pseudoknot"), None);
    }

    #[test]
    fn test_feature_display_color_falls_back_to_type() {
        let mut feature = StructuralFeature {
            id: "feature-1".to_string(),
            feature_type: FeatureType::Stem,
            nucleotide_ids: vec![1, 2],
            label: FeatureLabel {
                text: "Stem I".to_string(),
                x: 0.0,
                y: 0.0,
                font_size: DEFAULT_FEATURE_FONT_SIZE,
                color: None,
            },
            description: None,
            color: None,
        };
        assert_eq!(feature.display_color(), "#f59e0b");

        feature.color = Some("#000000".to_string());
        assert_eq!(feature.display_color(), "#000000");
    }

    #[test]
    fn test_annotation_json_shape() {
        let label = AnnotationLabel {
            id: "label-1".to_string(),
            text: "5'".to_string(),
            x: 1.0,
            y: 2.0,
            font_size: 12.0,
            color: None,
        };
        let value = serde_json::to_value(&label).unwrap();
        assert_eq!(value["fontSize"], 12.0);
        assert!(value.get("color").is_none());
        assert_eq!(label.display_color(), DEFAULT_ANNOTATION_COLOR);
    }
}
