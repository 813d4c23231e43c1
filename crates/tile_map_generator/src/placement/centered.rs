//! Centered placement: the exact map centre first, then rings of offsets around it.
use glam::{IVec2, UVec2};

use super::search::PlacementQuery;
use crate::grid::NEIGHBORS_8;

/// Rings of fallback positions tried around the centre.
pub const CENTERED_PLACEMENT_RINGS: i32 = 6;

/// Top-left corner that centres an element of `size` on a map of `map` tiles.
pub fn centered_position(map: UVec2, size: UVec2) -> Option<UVec2> {
    let offset = (map.as_ivec2() - size.as_ivec2()) / 2;
    (offset.x >= 0 && offset.y >= 0).then(|| offset.as_uvec2())
}

/// Tries the centre, then eight directions per ring, each ring one footprint (plus
/// margins) further out.
pub fn find_centered(query: &PlacementQuery<'_>) -> Option<UVec2> {
    let center = centered_position(query.grid.size(), query.size)?;
    if query.can_place(center) {
        return Some(center);
    }
    let step = (query.size + UVec2::splat(2 * query.margin)).as_ivec2();
    let origin = center.as_ivec2();
    for ring in 1..=CENTERED_PLACEMENT_RINGS {
        for dir in NEIGHBORS_8 {
            let candidate: IVec2 = origin + dir * step * ring;
            if candidate.x < 0 || candidate.y < 0 {
                continue;
            }
            let candidate = candidate.as_uvec2();
            if query.can_place(candidate) {
                return Some(candidate);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::placement::Placement;

    fn query<'a>(grid: &'a Grid, placed: &'a [Placement]) -> PlacementQuery<'a> {
        PlacementQuery {
            grid,
            placed,
            size: UVec2::splat(3),
            margin: 0,
            min_distance: 0,
        }
    }

    #[test]
    fn lands_on_exact_centre() {
        let grid = Grid::new(11, 11);
        assert_eq!(find_centered(&query(&grid, &[])), Some(UVec2::splat(4)));
    }

    #[test]
    fn falls_back_to_first_ring_north() {
        let grid = Grid::new(11, 11);
        let placed = vec![Placement::new("fountain", 1, UVec2::splat(4), UVec2::splat(3), 0)];
        assert_eq!(find_centered(&query(&grid, &placed)), Some(UVec2::new(4, 1)));
    }

    #[test]
    fn oversized_elements_cannot_be_centred() {
        assert!(centered_position(UVec2::splat(2), UVec2::splat(3)).is_none());
    }
}
