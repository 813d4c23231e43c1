//! Rule-based autotiling of main-tile masks.
//!
//! Modules:
//! - rules: 1D rewrite rules and the rotate/unrotate helpers for vertical application
//! - cascade: the fixed stage order that borders a mask
//! - walls: inner and outer wall layers for regions
pub mod cascade;
pub mod rules;
pub mod walls;

pub use cascade::{AutotileCascade, GAP_CLOSING_MAX_ITERATIONS};
pub use rules::{apply_horizontal_rules, apply_vertical_rules, rotate90, unrotate90, Rule, RuleTable};
pub use walls::{inner_walls, outer_walls, WallsMapper};

use crate::tiles::{Surrounding, TilesShortcuts};

/// Removes border tiles on the map edge that would face off the map.
///
/// The top row loses top borders, the bottom row bottom borders, the left column left
/// borders and the right column right borders. Returns the number of cleared cells.
pub fn scrub_map_border(data: &mut [u32], width: usize, height: usize, tiles: &TilesShortcuts) -> usize {
    if width == 0 || height == 0 {
        return 0;
    }
    let mut cleared = 0;
    let mut clear_if = |data: &mut [u32], idx: usize, facing: fn(Surrounding) -> bool| {
        if let Some(pos) = tiles.surrounding_of(data[idx]) {
            if facing(pos) {
                data[idx] = 0;
                cleared += 1;
            }
        }
    };
    for x in 0..width {
        clear_if(data, x, Surrounding::is_top);
        clear_if(data, (height - 1) * width + x, Surrounding::is_bottom);
    }
    for y in 0..height {
        clear_if(data, y * width, Surrounding::is_left);
        clear_if(data, y * width + width - 1, Surrounding::is_right);
    }
    cleared
}

/// Autotiles a full map layer: runs the cascade, then scrubs the map edge.
pub fn autotile(data: &mut [u32], width: usize, height: usize, tiles: &TilesShortcuts) -> usize {
    let changed = AutotileCascade::new(tiles).apply(data, width, height);
    changed + scrub_map_border(data, width, height, tiles)
}
