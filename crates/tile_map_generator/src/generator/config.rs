//! Generator configuration.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::compositor::CompositorConfig;
use crate::error::{Error, Result};
use crate::path::{MainPathPlan, TargetOrder};
use crate::placement::{PlacementConfig, PlacementOrder, PlacementStrategy};
use crate::sizing::SizingParams;
use crate::spot::GroundSpotConfig;

/// Per-side border tiles, used instead of a single border tile.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderTiles {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
    pub top_left: u32,
    pub top_right: u32,
    pub bottom_left: u32,
    pub bottom_right: u32,
}

impl BorderTiles {
    /// The same tile on every side and corner.
    pub fn uniform(tile: u32) -> Self {
        Self {
            top: tile,
            right: tile,
            bottom: tile,
            left: tile,
            top_left: tile,
            top_right: tile,
            bottom_left: tile,
            bottom_right: tile,
        }
    }

    fn all(&self) -> [u32; 8] {
        [
            self.top,
            self.right,
            self.bottom,
            self.left,
            self.top_left,
            self.top_right,
            self.bottom_left,
            self.bottom_right,
        ]
    }
}

/// Everything that shapes a generated map apart from the element definitions.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Prefix for instance keys and the entry point.
    pub map_prefix: String,
    /// Floor number, used to name stairs destinations.
    pub floor: Option<u32>,

    pub ground_tile: u32,
    /// Tiles that randomly replace the ground tile.
    pub random_ground_tiles: Vec<u32>,
    /// Chance, in percent, of replacing a ground tile.
    pub variable_tiles_percentage: f32,

    pub block_map_border: bool,
    pub border_tile: u32,
    pub borders_tiles: Option<BorderTiles>,
    /// Emit `border-top`, `border-right`, `border-bottom` and `border-left` layers.
    pub split_borders_in_layers: bool,

    /// Tile category drawn for paths.
    pub path_tiles_key: String,
    pub main_path: MainPathPlan,
    pub main_path_size: u32,
    /// Final width of connecting paths.
    pub path_size: u32,
    /// Layer-name substrings paths may not cross.
    pub collision_layers_for_paths: Vec<String>,
    pub sort_targets_by_center_distance: bool,
    pub straighten_path_turns: bool,

    pub free_space_tiles_quantity: u32,
    pub free_tiles_multiplier: u32,
    pub free_space_multiplier: u32,
    /// Free space around elements that do not set their own.
    pub elements_free_space_around: u32,
    pub minimum_distance_from_borders: u32,
    pub placement_strategy: PlacementStrategy,
    pub placement_order: PlacementOrder,
    pub place_elements_closer_to_borders: bool,

    pub ground_spots: Vec<GroundSpotConfig>,
    pub compositor: CompositorConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            map_prefix: "map".into(),
            floor: None,
            ground_tile: 1,
            random_ground_tiles: Vec::new(),
            variable_tiles_percentage: 0.0,
            block_map_border: true,
            border_tile: 0,
            borders_tiles: None,
            split_borders_in_layers: false,
            path_tiles_key: "path".into(),
            main_path: MainPathPlan::Random,
            main_path_size: 3,
            path_size: 1,
            collision_layers_for_paths: vec!["collisions".into()],
            sort_targets_by_center_distance: false,
            straighten_path_turns: false,
            free_space_tiles_quantity: 0,
            free_tiles_multiplier: 1,
            free_space_multiplier: 1,
            elements_free_space_around: 1,
            minimum_distance_from_borders: 0,
            placement_strategy: PlacementStrategy::Random,
            placement_order: PlacementOrder::Declaration,
            place_elements_closer_to_borders: false,
            ground_spots: Vec::new(),
            compositor: CompositorConfig::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn new(map_prefix: impl Into<String>, ground_tile: u32, border_tile: u32) -> Self {
        Self {
            map_prefix: map_prefix.into(),
            ground_tile,
            border_tile,
            ..Default::default()
        }
    }

    pub fn with_floor(mut self, floor: u32) -> Self {
        self.floor = Some(floor);
        self
    }

    pub fn with_random_ground_tiles(mut self, percentage: f32, tiles: Vec<u32>) -> Self {
        self.variable_tiles_percentage = percentage;
        self.random_ground_tiles = tiles;
        self
    }

    pub fn with_block_map_border(mut self, block: bool) -> Self {
        self.block_map_border = block;
        self
    }

    pub fn with_borders_tiles(mut self, tiles: BorderTiles) -> Self {
        self.borders_tiles = Some(tiles);
        self
    }

    pub fn with_split_borders(mut self, split: bool) -> Self {
        self.split_borders_in_layers = split;
        self
    }

    pub fn with_path_tiles_key(mut self, key: impl Into<String>) -> Self {
        self.path_tiles_key = key.into();
        self
    }

    pub fn with_main_path(mut self, plan: MainPathPlan) -> Self {
        self.main_path = plan;
        self
    }

    pub fn with_main_path_size(mut self, size: u32) -> Self {
        self.main_path_size = size;
        self
    }

    pub fn with_path_size(mut self, size: u32) -> Self {
        self.path_size = size;
        self
    }

    pub fn with_collision_layers(mut self, markers: Vec<String>) -> Self {
        self.collision_layers_for_paths = markers;
        self
    }

    pub fn with_sort_targets_by_center_distance(mut self, sort: bool) -> Self {
        self.sort_targets_by_center_distance = sort;
        self
    }

    pub fn with_straighten_path_turns(mut self, straighten: bool) -> Self {
        self.straighten_path_turns = straighten;
        self
    }

    pub fn with_free_space_tiles(mut self, quantity: u32, multiplier: u32) -> Self {
        self.free_space_tiles_quantity = quantity;
        self.free_tiles_multiplier = multiplier;
        self
    }

    pub fn with_elements_free_space_around(mut self, tiles: u32, multiplier: u32) -> Self {
        self.elements_free_space_around = tiles;
        self.free_space_multiplier = multiplier;
        self
    }

    pub fn with_minimum_distance_from_borders(mut self, tiles: u32) -> Self {
        self.minimum_distance_from_borders = tiles;
        self
    }

    pub fn with_placement(mut self, strategy: PlacementStrategy, order: PlacementOrder) -> Self {
        self.placement_strategy = strategy;
        self.placement_order = order;
        self
    }

    pub fn with_place_elements_closer_to_borders(mut self, closer: bool) -> Self {
        self.place_elements_closer_to_borders = closer;
        self
    }

    pub fn with_ground_spot(mut self, spot: GroundSpotConfig) -> Self {
        self.ground_spots.push(spot);
        self
    }

    pub fn with_compositor(mut self, compositor: CompositorConfig) -> Self {
        self.compositor = compositor;
        self
    }

    pub fn sizing_params(&self) -> SizingParams {
        SizingParams::new()
            .with_free_space_tiles(self.free_space_tiles_quantity, self.free_tiles_multiplier)
            .with_free_space_around(self.elements_free_space_around, self.free_space_multiplier)
            .with_minimum_distance_from_borders(self.minimum_distance_from_borders)
            .with_block_map_border(self.block_map_border)
    }

    /// Placement keeps clear of the blocked border ring on top of the configured distance.
    pub fn placement_config(&self) -> PlacementConfig {
        PlacementConfig::new()
            .with_strategy(self.placement_strategy)
            .with_order(self.placement_order)
            .with_closer_to_borders(self.place_elements_closer_to_borders)
            .with_minimum_distance_from_borders(
                self.minimum_distance_from_borders + u32::from(self.block_map_border),
            )
            .with_free_space_around(self.elements_free_space_around)
    }

    pub fn target_order(&self) -> TargetOrder {
        if self.sort_targets_by_center_distance {
            TargetOrder::CenterDistance
        } else {
            TargetOrder::Placement
        }
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.map_prefix.is_empty() {
            return Err(Error::InvalidConfig("map_prefix must not be empty".into()));
        }
        if self.ground_tile == 0 {
            return Err(Error::InvalidConfig("ground_tile must be > 0".into()));
        }
        if self.main_path_size == 0 {
            return Err(Error::InvalidConfig("main_path_size must be > 0".into()));
        }
        if self.path_size == 0 {
            return Err(Error::InvalidConfig("path_size must be > 0".into()));
        }
        if !(0.0..=100.0).contains(&self.variable_tiles_percentage) {
            return Err(Error::InvalidConfig(
                "variable_tiles_percentage must be within [0, 100]".into(),
            ));
        }
        if self.block_map_border {
            match &self.borders_tiles {
                Some(tiles) if tiles.all().contains(&0) => {
                    return Err(Error::InvalidConfig(
                        "borders_tiles must not contain empty (0) ids".into(),
                    ));
                }
                None if self.border_tile == 0 => {
                    return Err(Error::InvalidConfig(
                        "a blocked map border needs border_tile or borders_tiles".into(),
                    ));
                }
                _ => {}
            }
        }
        for spot in &self.ground_spots {
            spot.validate()?;
        }
        Ok(())
    }
}
