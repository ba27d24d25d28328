/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Placement snapping for new nucleotides.
//!
//! Pure functions over (id, position) pairs. A placement near an existing
//! nucleotide is pulled onto a circle of radius [`LINK_DISTANCE`] around
//! that neighbor, along the ray from the neighbor to the requested point,
//! so freshly added nucleotides chain visually off whatever they were
//! dropped next to.

use crate::graph::NucleotideId;
use crate::graph::spatial::SpatialGrid;
use euclid::default::{Point2D, Vector2D};

/// Capture radius: neighbors strictly closer than this attract a placement
pub const SNAP_THRESHOLD: f32 = 40.0;

/// Distance kept between a snapped placement and its neighbor
pub const LINK_DISTANCE: f32 = 32.0;

/// Offset along +x used when chaining off an anchor nucleotide
pub const CHAIN_OFFSET: f32 = 40.0;

/// Snap `target` towards the nearest nucleotide within [`SNAP_THRESHOLD`].
///
/// `exclude` removes one nucleotide from consideration (the anchor itself
/// when chaining). Returns `target` unchanged when there is no neighbor in
/// range or the only candidates are coincident with it.
pub fn snap_position<I>(
    target: Point2D<f32>,
    positions: I,
    exclude: Option<NucleotideId>,
) -> Point2D<f32>
where
    I: IntoIterator<Item = (NucleotideId, Point2D<f32>)>,
{
    let grid = SpatialGrid::from_positions(
        SNAP_THRESHOLD,
        positions
            .into_iter()
            .filter(|(id, _)| Some(*id) != exclude),
    );

    match grid.nearest_within(target, SNAP_THRESHOLD) {
        Some((_, neighbor, distance)) => {
            let direction: Vector2D<f32> = (target - neighbor) / distance;
            neighbor + direction * LINK_DISTANCE
        },
        None => target,
    }
}

/// Placement for a keyboard-driven add.
///
/// With an anchor the new nucleotide goes [`CHAIN_OFFSET`] to the right of
/// it (then snaps against everything except the anchor); without one the
/// pointer-derived `fallback` is snapped as is.
pub fn chained_position<I>(
    anchor: Option<(NucleotideId, Point2D<f32>)>,
    fallback: Point2D<f32>,
    positions: I,
) -> Point2D<f32>
where
    I: IntoIterator<Item = (NucleotideId, Point2D<f32>)>,
{
    match anchor {
        Some((anchor_id, anchor_position)) => snap_position(
            anchor_position + Vector2D::new(CHAIN_OFFSET, 0.0),
            positions,
            Some(anchor_id),
        ),
        None => snap_position(fallback, positions, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Point2D<f32>, b: Point2D<f32>) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn test_no_neighbors_returns_target() {
        let target = Point2D::new(100.0, 100.0);
        assert_eq!(snap_position(target, [], None), target);
    }

    #[test]
    fn test_snaps_to_link_distance_along_ray() {
        let placed = snap_position(
            Point2D::new(105.0, 100.0),
            [(1, Point2D::new(100.0, 100.0))],
            None,
        );
        assert!(approx(placed, Point2D::new(132.0, 100.0)));
    }

    #[test]
    fn test_snap_preserves_direction() {
        let placed = snap_position(
            Point2D::new(100.0, 90.0),
            [(1, Point2D::new(100.0, 100.0))],
            None,
        );
        assert!(approx(placed, Point2D::new(100.0, 68.0)));
    }

    #[test]
    fn test_neighbor_outside_threshold_is_ignored() {
        let target = Point2D::new(140.0, 100.0);
        let placed = snap_position(target, [(1, Point2D::new(100.0, 100.0))], None);
        assert_eq!(placed, target);
    }

    #[test]
    fn test_coincident_neighbor_is_not_an_anchor() {
        let target = Point2D::new(100.0, 100.0);
        let placed = snap_position(target, [(1, target)], None);
        assert_eq!(placed, target);
    }

    #[test]
    fn test_nearest_neighbor_wins() {
        let placed = snap_position(
            Point2D::new(110.0, 0.0),
            [(1, Point2D::new(80.0, 0.0)), (2, Point2D::new(120.0, 0.0))],
            None,
        );
        assert!(approx(placed, Point2D::new(88.0, 0.0)));
    }

    #[test]
    fn test_excluded_nucleotide_is_skipped() {
        let target = Point2D::new(105.0, 100.0);
        let placed = snap_position(target, [(1, Point2D::new(100.0, 100.0))], Some(1));
        assert_eq!(placed, target);
    }

    #[test]
    fn test_chain_off_anchor() {
        let anchor = (3, Point2D::new(10.0, 20.0));
        let placed = chained_position(Some(anchor), Point2D::new(500.0, 500.0), [anchor]);
        assert_eq!(placed, Point2D::new(50.0, 20.0));
    }

    #[test]
    fn test_chain_without_anchor_uses_fallback() {
        let placed = chained_position(None, Point2D::new(500.0, 500.0), []);
        assert_eq!(placed, Point2D::new(500.0, 500.0));
    }
}
