//! Walkable channels cut from a region's centre to its rectangle edge.
use glam::{IVec2, UVec2};
use tracing::debug;

use crate::grid::offset_within;
use crate::path::Edge;

/// Width of a carved channel in tiles.
pub const CHANNEL_WIDTH: u32 = 3;

/// Cuts a channel from the centre of the usable area to the rectangle edge.
///
/// The side is the one whose exit point (last region cell before leaving the region)
/// lies closest to a rectangle corner; ties go to top, right, bottom, left. Returns the
/// chosen side, or `None` when the rectangle is too small.
pub fn carve_path(data: &mut [u32], width: u32, height: u32, margin: u32) -> Option<Edge> {
    if width < CHANNEL_WIDTH || height < CHANNEL_WIDTH {
        return None;
    }
    let size = UVec2::new(width, height);
    let center = UVec2::new(
        margin + width.saturating_sub(2 * margin) / 2,
        margin + height.saturating_sub(2 * margin) / 2,
    )
    .min(size - UVec2::ONE);

    let mut best: Option<(Edge, u32)> = None;
    for edge in Edge::ALL {
        let exit = exit_point(data, width, center, edge.outward());
        let distance = corner_distance(exit, size);
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((edge, distance));
        }
    }
    let (edge, _) = best?;

    let step = edge.outward();
    let lateral = IVec2::new(step.y.abs(), step.x.abs());
    let mut cell = Some(center);
    while let Some(c) = cell {
        for k in -1..=1 {
            if let Some(p) = offset_within(c, lateral * k, size) {
                data[p.y as usize * width as usize + p.x as usize] = 0;
            }
        }
        cell = offset_within(c, step, size);
    }
    debug!("carved channel towards {:?} edge from ({}, {})", edge, center.x, center.y);
    Some(edge)
}

/// Walks from `start` in `step` direction and returns the last filled cell, or `start`.
fn exit_point(data: &[u32], width: u32, start: UVec2, step: IVec2) -> UVec2 {
    let size = UVec2::new(width, (data.len() / width as usize) as u32);
    let mut last = start;
    let mut cell = offset_within(start, step, size);
    while let Some(c) = cell {
        if data[c.y as usize * width as usize + c.x as usize] == 0 {
            break;
        }
        last = c;
        cell = offset_within(c, step, size);
    }
    last
}

/// Manhattan distance to the nearest rectangle corner.
fn corner_distance(p: UVec2, size: UVec2) -> u32 {
    let dx = p.x.min(size.x - 1 - p.x);
    let dy = p.y.min(size.y - 1 - p.y);
    dx + dy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_reaches_rectangle_edge() {
        let (w, h) = (9u32, 9u32);
        let mut data = vec![1u32; (w * h) as usize];
        let edge = carve_path(&mut data, w, h, 1).unwrap();
        assert_eq!(edge, Edge::Top);
        // Columns 3..=5 are open from the centre row up.
        for y in 0..=4usize {
            for x in 3..=5usize {
                assert_eq!(data[y * 9 + x], 0);
            }
        }
        assert_eq!(data[5 * 9 + 4], 1);
        assert_eq!(data[2], 1);
    }

    #[test]
    fn prefers_side_with_exit_nearest_a_corner() {
        let (w, h) = (9u32, 9u32);
        let mut data = vec![0u32; (w * h) as usize];
        // Region extends only to the right of the centre, along row 4.
        for x in 4..9usize {
            for y in 3..=5usize {
                data[y * 9 + x] = 1;
            }
        }
        // Exit to the right is (8, 4): distance 4. Top/bottom exits are (4, 3)/(4, 5)
        // at distance 7, left exit is the centre at distance 8.
        assert_eq!(carve_path(&mut data, w, h, 0), Some(Edge::Right));
    }

    #[test]
    fn tiny_rectangles_are_left_alone() {
        let mut data = vec![1u32; 4];
        assert_eq!(carve_path(&mut data, 2, 2, 0), None);
        assert_eq!(data, vec![1; 4]);
    }
}
