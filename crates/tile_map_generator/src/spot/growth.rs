//! Organic region growth inside a rectangle.
use glam::UVec2;
use rand::RngCore;
use tracing::warn;

use crate::grid::{offset_within, Rect, NEIGHBORS_4, NEIGHBORS_8};
use crate::random::{below, shuffle};

/// Minimum filled 8-neighbours for an empty cell to count as a hole.
pub const HOLE_NEIGHBOR_THRESHOLD: usize = 6;

/// Area available to a region once `margin` is kept free on every side.
pub fn usable_area(width: u32, height: u32, margin: u32) -> Rect {
    let w = width.saturating_sub(2 * margin);
    let h = height.saturating_sub(2 * margin);
    Rect::new(margin, margin, w, h)
}

/// Number of cells a region of `percentage` percent fills in `usable` cells.
pub fn target_cells(usable: u64, percentage: f32) -> u64 {
    if percentage >= 100.0 {
        usable
    } else if percentage <= 0.0 {
        0
    } else {
        ((usable as f64) * (percentage as f64) / 100.0).round() as u64
    }
}

/// Grows a connected region of `fill_tile` from the centre of the usable area.
///
/// Cells are taken from a frontier in random order until the target share of the usable
/// area is filled, then interior holes are closed in a single pass.
pub fn create_spot_layer_data(
    width: u32,
    height: u32,
    percentage: f32,
    margin: u32,
    fill_tile: u32,
    rng: &mut dyn RngCore,
) -> Vec<u32> {
    let mut data = vec![0u32; width as usize * height as usize];
    let usable = usable_area(width, height, margin);
    if usable.is_empty() {
        warn!(
            "Spot of {}x{} has no usable area with margin {}; leaving it empty.",
            width, height, margin
        );
        return data;
    }

    let target = target_cells(usable.area(), percentage);
    if target == usable.area() {
        for p in usable.cells() {
            data[index(p, width)] = fill_tile;
        }
        return data;
    }
    if target == 0 {
        return data;
    }

    let size = UVec2::new(width, height);
    let mut queued = vec![false; data.len()];
    let start = usable.center();
    queued[index(start, width)] = true;
    let mut frontier = vec![start];
    let mut filled = 0u64;
    let mut neighbors = Vec::with_capacity(4);

    while !frontier.is_empty() {
        let cell = frontier.swap_remove(below(rng, frontier.len()));
        let idx = index(cell, width);
        if data[idx] == 0 {
            data[idx] = fill_tile;
            filled += 1;
            if filled >= target {
                break;
            }
        }

        neighbors.clear();
        neighbors.extend(
            NEIGHBORS_4
                .iter()
                .filter_map(|d| offset_within(cell, *d, size))
                .filter(|n| usable.contains(*n) && !queued[index(*n, width)]),
        );
        shuffle(rng, &mut neighbors);
        for n in &neighbors {
            queued[index(*n, width)] = true;
            frontier.push(*n);
        }
    }

    close_holes(&mut data, width, &usable, fill_tile);
    data
}

/// Fills empty usable cells surrounded by at least [`HOLE_NEIGHBOR_THRESHOLD`] filled
/// neighbours. Reads a snapshot, so fills in this pass do not cascade.
fn close_holes(data: &mut [u32], width: u32, usable: &Rect, fill_tile: u32) -> usize {
    let height = (data.len() / width.max(1) as usize) as u32;
    let size = UVec2::new(width, height);
    let snapshot = data.to_vec();
    let mut closed = 0;
    for p in usable.cells() {
        let idx = index(p, width);
        if snapshot[idx] != 0 {
            continue;
        }
        let filled = NEIGHBORS_8
            .iter()
            .filter_map(|d| offset_within(p, *d, size))
            .filter(|n| snapshot[index(*n, width)] != 0)
            .count();
        if filled >= HOLE_NEIGHBOR_THRESHOLD {
            data[idx] = fill_tile;
            closed += 1;
        }
    }
    closed
}

#[inline]
fn index(p: UVec2, width: u32) -> usize {
    p.y as usize * width as usize + p.x as usize
}
