//! Change points (map exits) and return points (where a player arrives).
use std::collections::HashMap;

use glam::UVec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::path::{Direction, MainPath};
use crate::placement::{Element, Placement};

/// Element layers whose name contains this marker hold exit tiles.
pub const CHANGE_POINTS_LAYER_MARKER: &str = "change-points";

/// A tile that moves the player to the map named by `key`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangePoint {
    pub key: String,
    pub x: u32,
    pub y: u32,
    pub tile: u32,
}

/// Where a player arriving back from `key` is put.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnPoint {
    pub key: String,
    pub x: u32,
    pub y: u32,
    pub direction: Direction,
    pub is_default: bool,
}

/// Key of the map an element instance leads to.
///
/// Stairs on a floor map lead to the adjacent floor; everything else gets its own
/// `<prefix>-<element>-n<instance>` map.
pub fn instance_key(map_prefix: &str, element: &str, instance: u32, floor: Option<u32>) -> String {
    match floor {
        Some(floor) if element.contains("stairs") => {
            let target = if element.contains("down") {
                floor.saturating_sub(1)
            } else {
                floor + 1
            };
            format!("{map_prefix}-floor-{target}")
        }
        _ => format!("{map_prefix}-{element}-n{instance}"),
    }
}

/// Change and return points of every placed element with a change-points layer.
///
/// The return point sits one cell below the first exit tile, facing down, when that
/// cell is on the map.
pub fn collect_points(
    placements: &[Placement],
    elements: &HashMap<&str, &Element>,
    map_prefix: &str,
    floor: Option<u32>,
    map_size: UVec2,
) -> (Vec<ChangePoint>, Vec<ReturnPoint>) {
    let mut changes = Vec::new();
    let mut returns = Vec::new();
    for placement in placements {
        let Some(element) = elements.get(placement.element.as_str()) else {
            continue;
        };
        let key = instance_key(map_prefix, &element.name, placement.instance, floor);
        let mut first = None;
        for (local, tile) in element.cells_in_layers(CHANGE_POINTS_LAYER_MARKER) {
            let p = placement.position + local;
            first.get_or_insert(p);
            changes.push(ChangePoint {
                key: key.clone(),
                x: p.x,
                y: p.y,
                tile,
            });
        }
        if let Some(p) = first.filter(|p| p.y + 1 < map_size.y) {
            returns.push(ReturnPoint {
                key,
                x: p.x,
                y: p.y + 1,
                direction: Direction::Down,
                is_default: false,
            });
        }
    }
    (changes, returns)
}

/// Default arrival point: the main path anchor, facing into the map.
pub fn entry_point(main: &MainPath, map_prefix: &str) -> ReturnPoint {
    let anchor = main.anchor();
    ReturnPoint {
        key: map_prefix.to_string(),
        x: anchor.x,
        y: anchor.y,
        direction: main.edge.inward_direction(),
        is_default: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::TileLayer;
    use crate::path::Edge;

    fn house() -> Element {
        let body = TileLayer::filled("buildings", 3, 2, 9);
        let door = TileLayer::from_data("change-points", 3, 2, vec![0, 0, 0, 0, 42, 0]).unwrap();
        Element::new("house", vec![body, door]).unwrap()
    }

    #[test]
    fn instance_keys() {
        assert_eq!(instance_key("town", "house", 2, None), "town-house-n2");
        assert_eq!(instance_key("town", "house", 2, Some(3)), "town-house-n2");
        assert_eq!(instance_key("tower", "stairs-up", 1, Some(3)), "tower-floor-4");
        assert_eq!(instance_key("tower", "stairs-down", 1, Some(3)), "tower-floor-2");
        assert_eq!(instance_key("tower", "stairs-down", 1, Some(0)), "tower-floor-0");
    }

    #[test]
    fn door_yields_change_and_return_point() {
        let house = house();
        let elements: HashMap<&str, &Element> = [("house", &house)].into_iter().collect();
        let placements = vec![Placement::new("house", 1, UVec2::new(4, 5), UVec2::new(3, 2), 1)];
        let (changes, returns) = collect_points(&placements, &elements, "town", None, UVec2::splat(12));
        assert_eq!(
            changes,
            vec![ChangePoint {
                key: "town-house-n1".into(),
                x: 5,
                y: 6,
                tile: 42,
            }]
        );
        assert_eq!(returns.len(), 1);
        assert_eq!((returns[0].x, returns[0].y), (5, 7));
        assert_eq!(returns[0].direction, Direction::Down);
        assert!(!returns[0].is_default);
    }

    #[test]
    fn return_point_off_map_is_dropped() {
        let house = house();
        let elements: HashMap<&str, &Element> = [("house", &house)].into_iter().collect();
        let placements = vec![Placement::new("house", 1, UVec2::new(0, 6), UVec2::new(3, 2), 0)];
        let (changes, returns) = collect_points(&placements, &elements, "town", None, UVec2::splat(8));
        assert_eq!(changes.len(), 1);
        assert!(returns.is_empty());
    }

    #[test]
    fn entry_faces_into_the_map() {
        let main = MainPath::at(Edge::Left, 3, 3, 10, 10, true).unwrap();
        let entry = entry_point(&main, "town");
        assert_eq!((entry.x, entry.y), (1, 4));
        assert_eq!(entry.direction, Direction::Right);
        assert!(entry.is_default);
    }
}
