//! Ground fill and the blocked border ring.
use glam::UVec2;
use rand::RngCore;
use tracing::debug;

use super::config::{BorderTiles, GeneratorConfig};
use crate::grid::{Grid, TileLayer};
use crate::path::MainPath;
use crate::random::{chance, pick};

pub const GROUND_LAYER: &str = "ground";
pub const BORDER_LAYER: &str = "border";

/// Ground layer: the ground tile everywhere, some cells swapped for a random variation.
pub fn populate_ground(width: u32, height: u32, config: &GeneratorConfig, rng: &mut dyn RngCore) -> TileLayer {
    let mut layer = TileLayer::filled(GROUND_LAYER, width, height, config.ground_tile);
    if config.random_ground_tiles.is_empty() || config.variable_tiles_percentage <= 0.0 {
        return layer;
    }
    let mut varied = 0usize;
    for cell in layer.data.iter_mut() {
        if chance(rng, config.variable_tiles_percentage) {
            if let Some(tile) = pick(rng, &config.random_ground_tiles) {
                *cell = *tile;
                varied += 1;
            }
        }
    }
    debug!("decorated {} ground cells", varied);
    layer
}

/// Border tile for the ring cell at `p`.
fn ring_tile(tiles: &BorderTiles, p: UVec2, width: u32, height: u32) -> u32 {
    let (right, bottom) = (width - 1, height - 1);
    match (p.x, p.y) {
        (0, 0) => tiles.top_left,
        (x, 0) if x == right => tiles.top_right,
        (0, y) if y == bottom => tiles.bottom_left,
        (x, y) if x == right && y == bottom => tiles.bottom_right,
        (_, 0) => tiles.top,
        (_, y) if y == bottom => tiles.bottom,
        (0, _) => tiles.left,
        _ => tiles.right,
    }
}

/// Layer a ring cell goes to when borders are split; corners belong to the top and
/// bottom layers.
fn ring_layer(p: UVec2, width: u32, height: u32) -> usize {
    if p.y == 0 {
        0
    } else if p.y == height - 1 {
        2
    } else if p.x == width - 1 {
        1
    } else {
        3
    }
}

/// Fills and blocks the outer ring. Returns no layers when the border is open.
pub fn populate_borders(grid: &mut Grid, config: &GeneratorConfig) -> Vec<TileLayer> {
    if !config.block_map_border || grid.width() == 0 || grid.height() == 0 {
        return Vec::new();
    }
    let (width, height) = (grid.width(), grid.height());
    let tiles = config
        .borders_tiles
        .unwrap_or_else(|| BorderTiles::uniform(config.border_tile));

    let mut layers: Vec<TileLayer> = if config.split_borders_in_layers {
        ["top", "right", "bottom", "left"]
            .iter()
            .map(|side| TileLayer::new(format!("{BORDER_LAYER}-{side}"), width, height))
            .collect()
    } else {
        vec![TileLayer::new(BORDER_LAYER, width, height)]
    };

    let ring = (0..width)
        .flat_map(|x| [UVec2::new(x, 0), UVec2::new(x, height - 1)])
        .chain((1..height.saturating_sub(1)).flat_map(|y| [UVec2::new(0, y), UVec2::new(width - 1, y)]));
    for p in ring {
        let target = if layers.len() > 1 { ring_layer(p, width, height) } else { 0 };
        layers[target].set(p, ring_tile(&tiles, p, width, height));
        grid.block(p);
    }
    layers
}

/// Opens the border in front of the main path and continues the finished path
/// tiles into the cap cells.
pub fn open_main_path_cap(border_layers: &mut [TileLayer], path_layer: &mut TileLayer, main: &MainPath) {
    for (cap, route) in main.cap.iter().zip(&main.route) {
        for layer in border_layers.iter_mut() {
            layer.set(*cap, 0);
        }
        let tile = path_layer.get(*route);
        path_layer.set(*cap, tile);
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::path::Edge;

    #[test]
    fn ground_without_variations_is_uniform() {
        let config = GeneratorConfig::new("town", 7, 2);
        let mut rng = StdRng::seed_from_u64(1);
        let ground = populate_ground(4, 3, &config, &mut rng);
        assert!(ground.data.iter().all(|t| *t == 7));
    }

    #[test]
    fn ground_variations_use_configured_tiles() {
        let config = GeneratorConfig::new("town", 7, 2).with_random_ground_tiles(50.0, vec![8, 9]);
        let mut rng = StdRng::seed_from_u64(3);
        let ground = populate_ground(10, 10, &config, &mut rng);
        assert!(ground.data.iter().all(|t| [7, 8, 9].contains(t)));
        assert!(ground.data.iter().any(|t| *t != 7));
    }

    #[test]
    fn ring_is_blocked_and_filled() {
        let config = GeneratorConfig::new("town", 1, 5);
        let mut grid = Grid::new(5, 4);
        let layers = populate_borders(&mut grid, &config);
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].non_zero_count(), 14);
        assert!(!grid.is_walkable(UVec2::new(4, 2)));
        assert!(grid.is_walkable(UVec2::new(1, 1)));
        assert_eq!(grid.walkable_count(), 6);
    }

    #[test]
    fn split_borders_put_corners_on_top_and_bottom() {
        let tiles = BorderTiles {
            top: 1,
            right: 2,
            bottom: 3,
            left: 4,
            top_left: 5,
            top_right: 6,
            bottom_left: 7,
            bottom_right: 8,
        };
        let config = GeneratorConfig::new("town", 1, 0)
            .with_borders_tiles(tiles)
            .with_split_borders(true);
        let mut grid = Grid::new(4, 4);
        let layers = populate_borders(&mut grid, &config);
        let names: Vec<&str> = layers.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["border-top", "border-right", "border-bottom", "border-left"]);
        assert_eq!(layers[0].data[..4], [5, 1, 1, 6]);
        assert_eq!(layers[2].data[12..], [7, 3, 3, 8]);
        assert_eq!(layers[1].get(UVec2::new(3, 1)), 2);
        assert_eq!(layers[3].get(UVec2::new(0, 2)), 4);
        assert_eq!(layers[1].get(UVec2::new(3, 0)), 0);
    }

    #[test]
    fn open_border_has_no_layers() {
        let config = GeneratorConfig::new("town", 1, 0).with_block_map_border(false);
        let mut grid = Grid::new(4, 4);
        assert!(populate_borders(&mut grid, &config).is_empty());
        assert_eq!(grid.walkable_count(), 16);
    }

    #[test]
    fn cap_continues_route_tiles() {
        let config = GeneratorConfig::new("town", 1, 5);
        let mut grid = Grid::new(8, 8);
        let mut borders = populate_borders(&mut grid, &config);
        let main = MainPath::at(Edge::Top, 2, 3, 8, 8, true).unwrap();
        let mut path = TileLayer::new("path", 8, 8);
        path.set(UVec2::new(2, 1), 11);
        path.set(UVec2::new(3, 1), 12);
        path.set(UVec2::new(4, 1), 13);
        open_main_path_cap(&mut borders, &mut path, &main);
        assert_eq!(path.data[2..5], [11, 12, 13]);
        assert_eq!(borders[0].data[2..5], [0, 0, 0]);
        assert_eq!(borders[0].get(UVec2::new(1, 0)), 5);
    }
}
