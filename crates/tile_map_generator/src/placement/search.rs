//! Candidate search for element positions.
use glam::UVec2;
use rand::RngCore;

use super::Placement;
use crate::grid::{Grid, Rect};
use crate::random::range_inclusive;

/// Uniform-random trials before random placement gives up.
pub const RANDOM_PLACEMENT_TRIALS: usize = 200;

/// What is being placed, and against which state.
#[derive(Debug, Clone, Copy)]
pub struct PlacementQuery<'a> {
    pub grid: &'a Grid,
    pub placed: &'a [Placement],
    pub size: UVec2,
    pub margin: u32,
    pub min_distance: u32,
}

impl PlacementQuery<'_> {
    /// Inclusive range of legal top-left corners, or `None` when the element cannot fit.
    pub fn bounds(&self) -> Option<(UVec2, UVec2)> {
        let grid = self.grid.size();
        let d = self.min_distance;
        let max_x = grid.x.checked_sub(self.size.x)?.checked_sub(d)?;
        let max_y = grid.y.checked_sub(self.size.y)?.checked_sub(d)?;
        if self.size.x == 0 || self.size.y == 0 || max_x < d || max_y < d {
            return None;
        }
        Some((UVec2::splat(d), UVec2::new(max_x, max_y)))
    }

    pub fn can_place(&self, position: UVec2) -> bool {
        can_place(
            self.grid,
            self.placed,
            Rect::from_position(position, self.size),
            self.margin,
            self.min_distance,
        )
    }
}

/// Checks a candidate footprint against the map border, occupancy and earlier placements.
///
/// The footprint grown by `margin` (clipped to the map) must be fully walkable, and
/// neither rectangle may overlap the footprint or reserved area of a placed element.
pub fn can_place(grid: &Grid, placed: &[Placement], footprint: Rect, margin: u32, min_distance: u32) -> bool {
    let size = grid.size();
    if footprint.is_empty()
        || footprint.x < min_distance
        || footprint.y < min_distance
        || footprint.right() as u64 + min_distance as u64 > size.x as u64
        || footprint.bottom() as u64 + min_distance as u64 > size.y as u64
    {
        return false;
    }
    let reserved = footprint.expanded(margin, size);
    if !grid.is_rect_walkable(&reserved) {
        return false;
    }
    placed.iter().all(|p| {
        let other_footprint = p.footprint();
        let other_reserved = p.reserved(size);
        !footprint.intersects(&other_reserved) && !reserved.intersects(&other_footprint)
    })
}

/// Up to [`RANDOM_PLACEMENT_TRIALS`] uniform-random candidates.
pub fn find_random(query: &PlacementQuery<'_>, rng: &mut dyn RngCore) -> Option<UVec2> {
    let (min, max) = query.bounds()?;
    (0..RANDOM_PLACEMENT_TRIALS)
        .map(|_| {
            UVec2::new(
                range_inclusive(rng, min.x, max.x),
                range_inclusive(rng, min.y, max.y),
            )
        })
        .find(|p| query.can_place(*p))
}

/// First legal position in row-major order.
pub fn find_in_order(query: &PlacementQuery<'_>) -> Option<UVec2> {
    let (min, max) = query.bounds()?;
    (min.y..=max.y)
        .flat_map(|y| (min.x..=max.x).map(move |x| UVec2::new(x, y)))
        .find(|p| query.can_place(*p))
}

/// Border-affinity search: corners, then the midpoints of each edge's thirds, then rings
/// from the outside inward, then random trials.
///
/// Rings are swept to a depth of one footprint; deeper positions are left to the random
/// fallback so elements that cannot hug the border still spread across the map.
pub fn find_near_borders(query: &PlacementQuery<'_>, rng: &mut dyn RngCore) -> Option<UVec2> {
    let (min, max) = query.bounds()?;

    let corners = [
        min,
        UVec2::new(max.x, min.y),
        UVec2::new(min.x, max.y),
        max,
    ];
    if let Some(p) = corners.into_iter().find(|p| query.can_place(*p)) {
        return Some(p);
    }

    if let Some(p) = edge_segment_midpoints(min, max)
        .into_iter()
        .find(|p| query.can_place(*p))
    {
        return Some(p);
    }

    let depth = query.size.x.max(query.size.y);
    for ring in 0..depth {
        if ring > max.x || ring > max.y {
            break;
        }
        let lo = min + UVec2::splat(ring);
        let hi = max - UVec2::splat(ring);
        if lo.x > hi.x || lo.y > hi.y {
            break;
        }
        if let Some(p) = ring_cells(lo, hi).find(|p| query.can_place(*p)) {
            return Some(p);
        }
    }

    find_random(query, rng)
}

/// Midpoints of the three equal segments of each edge, top, right, bottom, left.
fn edge_segment_midpoints(min: UVec2, max: UVec2) -> Vec<UVec2> {
    let thirds = |lo: u32, hi: u32| -> [u32; 3] {
        let span = hi - lo + 1;
        [0, 1, 2].map(|k| lo + (span * (2 * k + 1)) / 6)
    };
    let xs = thirds(min.x, max.x);
    let ys = thirds(min.y, max.y);
    let mut out = Vec::with_capacity(12);
    out.extend(xs.iter().map(|x| UVec2::new(*x, min.y)));
    out.extend(ys.iter().map(|y| UVec2::new(max.x, *y)));
    out.extend(xs.iter().rev().map(|x| UVec2::new(*x, max.y)));
    out.extend(ys.iter().rev().map(|y| UVec2::new(min.x, *y)));
    out
}

/// Cells on the perimeter of the inclusive rectangle `lo..=hi`, clockwise from `lo`.
fn ring_cells(lo: UVec2, hi: UVec2) -> impl Iterator<Item = UVec2> {
    let top = (lo.x..=hi.x).map(move |x| UVec2::new(x, lo.y));
    let right = (lo.y + 1..=hi.y).map(move |y| UVec2::new(hi.x, y));
    let bottom = (lo.x..hi.x)
        .rev()
        .filter(move |_| hi.y > lo.y)
        .map(move |x| UVec2::new(x, hi.y));
    let left = (lo.y + 1..hi.y)
        .rev()
        .filter(move |_| hi.x > lo.x)
        .map(move |y| UVec2::new(lo.x, y));
    top.chain(right).chain(bottom).chain(left)
}
