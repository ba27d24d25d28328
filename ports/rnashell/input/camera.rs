/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! View transform between screen pixels and logical structure space.

use euclid::default::{Point2D, Vector2D};

pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 5.0;

/// Zoom change per wheel notch
pub const WHEEL_ZOOM_STEP: f32 = 0.1;

/// Camera state for the canvas
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Zoom level (1.0 = normal, >1.0 = zoomed in), always in `MIN_ZOOM..=MAX_ZOOM`
    zoom: f32,

    /// Pan offset in screen pixels
    pub pan: Vector2D<f32>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Vector2D::zero(),
        }
    }
}

impl Camera {
    /// Create a new camera
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Zoom in/out by an additive step
    pub fn zoom_by(&mut self, delta: f32) {
        self.set_zoom(self.zoom + delta);
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom.is_nan() {
            return;
        }
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Pan the view by a screen-space delta
    pub fn pan_by(&mut self, delta: Vector2D<f32>) {
        self.pan += delta;
    }

    /// Back to zoom 1 and no pan
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// `(screen - pan) / zoom`
    pub fn screen_to_logical(&self, screen: Point2D<f32>) -> Point2D<f32> {
        ((screen - self.pan).to_vector() / self.zoom).to_point()
    }

    pub fn logical_to_screen(&self, logical: Point2D<f32>) -> Point2D<f32> {
        (logical.to_vector() * self.zoom).to_point() + self.pan
    }

    /// Convert a pointer delta for dragging things already on the canvas
    pub fn screen_delta_to_logical(&self, delta: Vector2D<f32>) -> Vector2D<f32> {
        delta / self.zoom
    }
}
