/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Spatial hash grid for radius-bounded neighbor queries.
//!
//! Used by the snap engine and by hit testing to find the nucleotides close
//! to a point without measuring against every nucleotide in the structure.

use crate::graph::NucleotideId;
use euclid::default::Point2D;
use std::collections::HashMap;

/// Spatial hash grid keyed by nucleotide id
pub struct SpatialGrid {
    /// Cell size; queries are exact for radii up to this size
    cell_size: f32,

    /// Grid cells: (x, y) -> nucleotides positioned in that cell
    cells: HashMap<(i64, i64), Vec<(NucleotideId, Point2D<f32>)>>,
}

impl SpatialGrid {
    /// Create a new spatial grid with the given cell size
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(f32::EPSILON),
            cells: HashMap::new(),
        }
    }

    /// Build a grid from (id, position) pairs
    pub fn from_positions<I>(cell_size: f32, positions: I) -> Self
    where
        I: IntoIterator<Item = (NucleotideId, Point2D<f32>)>,
    {
        let mut grid = Self::new(cell_size);
        for (id, position) in positions {
            grid.insert(id, position);
        }
        grid
    }

    /// Clear all cells
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Insert a nucleotide at a position
    pub fn insert(&mut self, id: NucleotideId, position: Point2D<f32>) {
        let cell = self.position_to_cell(position);
        self.cells.entry(cell).or_default().push((id, position));
    }

    /// Get all entries in the same cell and adjacent cells
    pub fn query_nearby(&self, position: Point2D<f32>) -> Vec<(NucleotideId, Point2D<f32>)> {
        let center_cell = self.position_to_cell(position);
        let mut nearby = Vec::new();

        // Check 3x3 grid of cells around the center
        for dx in -1..=1 {
            for dy in -1..=1 {
                let cell = (
                    center_cell.0.saturating_add(dx),
                    center_cell.1.saturating_add(dy),
                );
                if let Some(entries) = self.cells.get(&cell) {
                    nearby.extend_from_slice(entries);
                }
            }
        }

        nearby
    }

    /// Nearest entry strictly closer than `radius` and strictly farther than zero.
    ///
    /// Coincident entries (distance 0) are never returned. Ties resolve to the
    /// lower id so the result does not depend on cell iteration order.
    pub fn nearest_within(
        &self,
        position: Point2D<f32>,
        radius: f32,
    ) -> Option<(NucleotideId, Point2D<f32>, f32)> {
        let mut best: Option<(NucleotideId, Point2D<f32>, f32)> = None;
        for (id, candidate) in self.query_nearby(position) {
            let distance = (position - candidate).length();
            if distance <= 0.0 || distance >= radius {
                continue;
            }
            let closer = match best {
                Some((best_id, _, best_distance)) => {
                    distance < best_distance || (distance == best_distance && id < best_id)
                },
                None => true,
            };
            if closer {
                best = Some((id, candidate, distance));
            }
        }
        best
    }

    /// Convert a position to a grid cell coordinate. Out-of-range positions
    /// saturate to the outermost cell.
    fn position_to_cell(&self, position: Point2D<f32>) -> (i64, i64) {
        let x = (position.x / self.cell_size).floor() as i64;
        let y = (position.y / self.cell_size).floor() as i64;
        (x, y)
    }
}
