#![forbid(unsafe_code)]
//! tile_map_generator: procedural, Tiled-compatible tile maps.
//!
//! Modules:
//! - grid: occupancy grid, tile layers and rectangles
//! - tiles: autotile shortcut tables and wangset derivation
//! - sizing: square map size estimation from element footprints
//! - placement: element placement (random, in order, near borders, centered)
//! - path: main path, A* pathfinding and the path network
//! - autotile: 1D rewrite rules with rotation, the border cascade and walls
//! - spot: organic ground regions packaged as elements
//! - compositor: merging, pruning and reordering of output layers
//! - generator: configuration, the generation pipeline and change/return points
//! - events: observable generation events and sinks
pub mod autotile;
pub mod compositor;
pub mod error;
pub mod events;
pub mod generator;
pub mod grid;
pub mod path;
pub mod placement;
pub mod sizing;
pub mod spot;
pub mod tiles;

mod random;

/// Convenient re-exports for common types. Import with `use tile_map_generator::prelude::*;`.
pub mod prelude {
    pub use crate::autotile::{autotile, AutotileCascade, Rule, RuleTable};
    pub use crate::compositor::{compose, CompositorConfig, DepthAnchor, LayerDepth};
    pub use crate::error::{Error, Result};
    pub use crate::events::{
        AsEventSink, EventSink, FnSink, GenerationEvent, GenerationEventKind, MultiSink, Stage,
        VecSink,
    };
    pub use crate::generator::{
        generate_map, BorderTiles, ChangePoint, GeneratedMap, GeneratorConfig, MapGenerator,
        ReturnPoint,
    };
    pub use crate::grid::{Grid, LayerSet, Rect, TileLayer};
    pub use crate::path::{AStarPathfinder, Direction, Edge, MainPath, MainPathPlan, Pathfinder};
    pub use crate::placement::{
        Element, Placement, PlacementConfig, PlacementOrder, PlacementStrategy,
    };
    pub use crate::sizing::{estimate_map_size, MapSize, SizingParams};
    pub use crate::spot::{GroundSpotConfig, SpotGenerator};
    pub use crate::tiles::{Corner, Surrounding, TilesCatalog, TilesShortcuts, Wangset};
}
