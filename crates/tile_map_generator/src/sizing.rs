//! Map size estimation from element footprints.
//!
//! Each instance contributes its footprint grown by free-tile and free-space padding on
//! every side. The map is the smallest square holding the summed area and the largest
//! padded dimension, plus the border distance and the blocked border ring.
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::placement::Element;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizingParams {
    pub free_space_tiles: u32,
    pub free_tiles_multiplier: u32,
    /// Default free space around elements that do not set their own.
    pub free_space_around: u32,
    pub free_space_multiplier: u32,
    pub minimum_distance_from_borders: u32,
    pub block_map_border: bool,
}

impl SizingParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_free_space_tiles(mut self, tiles: u32, multiplier: u32) -> Self {
        self.free_space_tiles = tiles;
        self.free_tiles_multiplier = multiplier;
        self
    }

    pub fn with_free_space_around(mut self, tiles: u32, multiplier: u32) -> Self {
        self.free_space_around = tiles;
        self.free_space_multiplier = multiplier;
        self
    }

    pub fn with_minimum_distance_from_borders(mut self, tiles: u32) -> Self {
        self.minimum_distance_from_borders = tiles;
        self
    }

    pub fn with_block_map_border(mut self, block: bool) -> Self {
        self.block_map_border = block;
        self
    }

    /// Padding added to each footprint axis.
    fn padding(&self, free_space_around: u32) -> u64 {
        2 * self.free_space_tiles as u64 * self.free_tiles_multiplier as u64
            + 2 * free_space_around as u64 * self.free_space_multiplier as u64
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapSize {
    pub width: u32,
    pub height: u32,
}

/// Estimates a square map size large enough for every requested instance.
///
/// Fails with [`Error::MissingElements`] or [`Error::MissingQuantities`] when either
/// input is empty.
pub fn estimate_map_size(
    elements: &[Element],
    quantities: &HashMap<String, u32>,
    params: &SizingParams,
) -> Result<MapSize> {
    if elements.is_empty() {
        return Err(Error::MissingElements);
    }
    if quantities.is_empty() {
        return Err(Error::MissingQuantities);
    }

    let mut total_area: u64 = 0;
    let mut largest: u64 = 0;
    for element in elements {
        let quantity = quantities.get(&element.name).copied().unwrap_or(0) as u64;
        if quantity == 0 {
            continue;
        }
        let pad = params.padding(element.free_space_around.unwrap_or(params.free_space_around));
        let size = element.size();
        let w = size.x as u64 + pad;
        let h = size.y as u64 + pad;
        total_area += w * h * quantity;
        largest = largest.max(w).max(h);
    }

    let mut side = total_area.isqrt();
    if side * side < total_area {
        side += 1;
    }
    side = side.max(largest);
    side += 2 * params.minimum_distance_from_borders as u64;
    if params.block_map_border {
        side += 1;
    }
    let side = u32::try_from(side)
        .map_err(|_| Error::InvalidConfig(format!("estimated map side {side} exceeds u32")))?;
    debug!("estimated map size {}x{} from area {}", side, side, total_area);
    Ok(MapSize {
        width: side,
        height: side,
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::grid::TileLayer;

    fn element(name: &str, w: u32, h: u32) -> Element {
        Element::new(name, vec![TileLayer::filled(name, w, h, 1)]).unwrap()
    }

    fn quantities(entries: &[(&str, u32)]) -> HashMap<String, u32> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn two_houses_with_padding() {
        // Two 4x3 houses, one free tile (x1), free space 1 (x1): each pads to 8x7.
        let params = SizingParams::new()
            .with_free_space_tiles(1, 1)
            .with_free_space_around(1, 1);
        let size = estimate_map_size(&[element("house", 4, 3)], &quantities(&[("house", 2)]), &params).unwrap();
        // 2 * 56 = 112 -> ceil(sqrt) = 11.
        assert_eq!(size, MapSize { width: 11, height: 11 });
    }

    #[test]
    fn blocked_border_and_distance_pad_both_sides() {
        let params = SizingParams::new()
            .with_minimum_distance_from_borders(2)
            .with_block_map_border(true);
        let size = estimate_map_size(&[element("rock", 3, 3)], &quantities(&[("rock", 1)]), &params).unwrap();
        assert_eq!(size.width, 3 + 4 + 1);
    }

    #[test]
    fn blocked_border_adds_one_tile() {
        let open = estimate_map_size(&[element("rock", 3, 3)], &quantities(&[("rock", 1)]), &SizingParams::new()).unwrap();
        let blocked = estimate_map_size(
            &[element("rock", 3, 3)],
            &quantities(&[("rock", 1)]),
            &SizingParams::new().with_block_map_border(true),
        )
        .unwrap();
        assert_eq!(open.width, 3);
        assert_eq!(blocked, MapSize { width: 4, height: 4 });
    }

    #[test]
    fn largest_dimension_wins_over_area() {
        let size = estimate_map_size(
            &[element("wall", 10, 1)],
            &quantities(&[("wall", 1)]),
            &SizingParams::new(),
        )
        .unwrap();
        assert_eq!(size.width, 10);
    }

    #[test]
    fn element_free_space_overrides_default() {
        let params = SizingParams::new().with_free_space_around(5, 1);
        let tight = element("post", 1, 1).with_free_space_around(0);
        let size = estimate_map_size(&[tight], &quantities(&[("post", 1)]), &params).unwrap();
        assert_eq!(size.width, 1);
    }

    #[test]
    fn missing_inputs_are_errors() {
        let q = quantities(&[("a", 1)]);
        assert!(matches!(
            estimate_map_size(&[], &q, &SizingParams::new()),
            Err(Error::MissingElements)
        ));
        assert!(matches!(
            estimate_map_size(&[element("a", 1, 1)], &HashMap::new(), &SizingParams::new()),
            Err(Error::MissingQuantities)
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn estimate_covers_area_and_largest_side(
            dims in proptest::collection::vec((1u32..12, 1u32..12, 1u32..5), 1..6),
            free in 0u32..3,
            around in 0u32..3,
            block in any::<bool>(),
        ) {
            let elements: Vec<Element> = dims
                .iter()
                .enumerate()
                .map(|(i, (w, h, _))| element(&format!("e{i}"), *w, *h))
                .collect();
            let q: HashMap<String, u32> = dims
                .iter()
                .enumerate()
                .map(|(i, (_, _, n))| (format!("e{i}"), *n))
                .collect();
            let params = SizingParams::new()
                .with_free_space_tiles(free, 1)
                .with_free_space_around(around, 1)
                .with_block_map_border(block);
            let size = estimate_map_size(&elements, &q, &params).unwrap();
            let pad = 2 * free + 2 * around;
            let area: u64 = dims
                .iter()
                .map(|(w, h, n)| ((w + pad) as u64) * ((h + pad) as u64) * (*n as u64))
                .sum();
            let largest = dims.iter().map(|(w, h, _)| (*w).max(*h) + pad).max().unwrap_or(0);
            prop_assert!(size.width as u64 * size.height as u64 >= area);
            prop_assert!(size.width >= largest);
            prop_assert_eq!(size.width, size.height);
        }
    }
}
