//! Wall layers derived from an autotiled region.
//!
//! Inner walls hang below the top border of a region, inside it. Outer walls wrap the
//! region from outside, one ring beyond its border tiles.
use glam::{IVec2, UVec2};

use super::rules::{apply_vertical_rules, RuleTable};
use crate::grid::offset_within;
use crate::tiles::{Corner, Surrounding, TilesShortcuts};

/// Maps each border position to the cells around it that receive outer walls.
pub struct WallsMapper;

impl WallsMapper {
    /// Offsets `(dx, dy)` from a border tile to its outer wall cells.
    pub fn offsets(pos: Surrounding) -> &'static [IVec2] {
        const TOP_LEFT: [IVec2; 3] = [IVec2::new(-1, -1), IVec2::new(0, -1), IVec2::new(-1, 0)];
        const TOP_CENTER: [IVec2; 1] = [IVec2::new(0, -1)];
        const TOP_RIGHT: [IVec2; 3] = [IVec2::new(1, -1), IVec2::new(0, -1), IVec2::new(1, 0)];
        const MIDDLE_LEFT: [IVec2; 1] = [IVec2::new(-1, 0)];
        const MIDDLE_RIGHT: [IVec2; 1] = [IVec2::new(1, 0)];
        const BOTTOM_LEFT: [IVec2; 3] = [IVec2::new(-1, 1), IVec2::new(0, 1), IVec2::new(-1, 0)];
        const BOTTOM_CENTER: [IVec2; 1] = [IVec2::new(0, 1)];
        const BOTTOM_RIGHT: [IVec2; 3] = [IVec2::new(1, 1), IVec2::new(0, 1), IVec2::new(1, 0)];
        match pos {
            Surrounding::TopLeft => &TOP_LEFT,
            Surrounding::TopCenter => &TOP_CENTER,
            Surrounding::TopRight => &TOP_RIGHT,
            Surrounding::MiddleLeft => &MIDDLE_LEFT,
            Surrounding::MiddleRight => &MIDDLE_RIGHT,
            Surrounding::BottomLeft => &BOTTOM_LEFT,
            Surrounding::BottomCenter => &BOTTOM_CENTER,
            Surrounding::BottomRight => &BOTTOM_RIGHT,
        }
    }

    /// Wall positions paired with [`WallsMapper::offsets`].
    pub fn walls(pos: Surrounding) -> &'static [Surrounding] {
        use Surrounding::*;
        match pos {
            TopLeft => &[TopLeft, TopCenter, MiddleLeft],
            TopCenter => &[TopCenter],
            TopRight => &[TopRight, TopCenter, MiddleRight],
            MiddleLeft => &[MiddleLeft],
            MiddleRight => &[MiddleRight],
            BottomLeft => &[BottomLeft, BottomCenter, MiddleLeft],
            BottomCenter => &[BottomCenter],
            BottomRight => &[BottomRight, BottomCenter, MiddleRight],
        }
    }
}

/// Builds the inner wall layer for an autotiled region.
///
/// Walls go into the main-tile cells directly below top borders and below the inner
/// corners whose main tiles continue downward.
pub fn inner_walls(
    data: &[u32],
    width: usize,
    height: usize,
    tiles: &TilesShortcuts,
    walls: &TilesShortcuts,
) -> Vec<u32> {
    use Surrounding::*;

    let p = tiles.main();
    let s = |pos: Surrounding| tiles.surrounding(pos);
    let w = |pos: Surrounding| walls.surrounding(pos);
    let rules = RuleTable::new()
        .with_rule([s(TopLeft), s(MiddleLeft)], [s(TopLeft), w(TopLeft)])
        .with_rule([s(TopCenter), p], [s(TopCenter), w(TopCenter)])
        .with_rule([s(TopRight), s(MiddleRight)], [s(TopRight), w(TopRight)])
        .with_rule(
            [tiles.corner(Corner::BottomRight), p],
            [tiles.corner(Corner::BottomRight), w(TopCenter)],
        )
        .with_rule(
            [tiles.corner(Corner::BottomLeft), p],
            [tiles.corner(Corner::BottomLeft), w(TopCenter)],
        );

    let mut walled = data.to_vec();
    apply_vertical_rules(&mut walled, width, height, &rules);
    walled
        .iter()
        .zip(data)
        .map(|(new, old)| if new != old { *new } else { 0 })
        .collect()
}

/// Builds the outer wall layer for an autotiled region.
///
/// Cells already holding region artwork, or already walled, are left alone.
pub fn outer_walls(
    data: &[u32],
    width: usize,
    height: usize,
    tiles: &TilesShortcuts,
    walls: &TilesShortcuts,
) -> Vec<u32> {
    let size = UVec2::new(width as u32, height as u32);
    let mut out = vec![0u32; data.len()];
    for (i, tile) in data.iter().enumerate() {
        let Some(pos) = tiles.surrounding_of(*tile) else {
            continue;
        };
        let cell = UVec2::new((i % width) as u32, (i / width) as u32);
        for (offset, wall) in WallsMapper::offsets(pos)
            .iter()
            .zip(WallsMapper::walls(pos))
        {
            let Some(target) = offset_within(cell, *offset, size) else {
                continue;
            };
            let idx = target.y as usize * width + target.x as usize;
            if data[idx] == 0 && out[idx] == 0 {
                out[idx] = walls.surrounding(*wall);
            }
        }
    }
    out
}
