//! Element definitions and their placement on the occupancy grid.
//!
//! Modules:
//! - search: legality check and position searches (random, in order, near borders)
//! - centered: centre-first search for centered elements
//! - order: expansion of quantities into an ordered instance list
pub mod centered;
pub mod order;
pub mod search;

use std::collections::HashMap;

use glam::UVec2;
use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

pub use centered::{centered_position, find_centered, CENTERED_PLACEMENT_RINGS};
pub use order::{instance_order, PendingInstance, PlacementOrder};
pub use search::{
    can_place, find_in_order, find_near_borders, find_random, PlacementQuery, RANDOM_PLACEMENT_TRIALS,
};

use crate::error::{Error, Result};
use crate::events::{EventSink, GenerationEvent, GenerationEventKind};
use crate::grid::{Grid, LayerSet, Rect, TileLayer};

/// A multi-layer stamp placed as a unit (house, tree, lake).
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    /// Layers of equal size; non-zero cells are stamped into the map.
    pub layers: Vec<TileLayer>,
    /// Overrides the global free space kept around the element.
    pub free_space_around: Option<u32>,
    /// Whether paths may run through the free-space margin.
    pub allow_paths_in_free_space: bool,
    /// Leaves stamped cells walkable, for regions paths may cross.
    pub walkable: bool,
    /// Place at the map centre before any other element.
    pub centered: bool,
}

impl Element {
    /// Fails if there are no layers or the layers differ in size.
    pub fn new(name: impl Into<String>, layers: Vec<TileLayer>) -> Result<Self> {
        let name = name.into();
        let Some(first) = layers.first() else {
            return Err(Error::InvalidConfig(format!("element '{name}' has no layers")));
        };
        let size = first.size();
        if let Some(odd) = layers.iter().find(|l| l.size() != size) {
            return Err(Error::InvalidLayer {
                name: odd.name.clone(),
                reason: format!(
                    "element '{}' layers must all be {}x{}",
                    name, size.x, size.y
                ),
            });
        }
        Ok(Self {
            name,
            layers,
            free_space_around: None,
            allow_paths_in_free_space: false,
            walkable: false,
            centered: false,
        })
    }

    pub fn with_free_space_around(mut self, tiles: u32) -> Self {
        self.free_space_around = Some(tiles);
        self
    }

    pub fn with_paths_in_free_space(mut self, allow: bool) -> Self {
        self.allow_paths_in_free_space = allow;
        self
    }

    pub fn with_walkable(mut self, walkable: bool) -> Self {
        self.walkable = walkable;
        self
    }

    pub fn with_centered(mut self, centered: bool) -> Self {
        self.centered = centered;
        self
    }

    #[inline]
    pub fn size(&self) -> UVec2 {
        self.layers.first().map_or(UVec2::ZERO, TileLayer::size)
    }

    pub fn width(&self) -> u32 {
        self.size().x
    }

    pub fn height(&self) -> u32 {
        self.size().y
    }

    pub fn area(&self) -> u64 {
        let s = self.size();
        s.x as u64 * s.y as u64
    }

    /// Element-local cells of layers whose name contains `marker`.
    pub fn cells_in_layers<'a>(&'a self, marker: &'a str) -> impl Iterator<Item = (UVec2, u32)> + 'a {
        self.layers
            .iter()
            .filter(move |l| l.name.contains(marker))
            .flat_map(TileLayer::non_zero)
    }
}

/// Where an element instance ended up.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub element: String,
    /// One-based instance number.
    pub instance: u32,
    /// Top-left corner.
    pub position: UVec2,
    pub size: UVec2,
    /// Free space reserved around the footprint.
    pub margin: u32,
}

impl Placement {
    pub fn new(element: impl Into<String>, instance: u32, position: UVec2, size: UVec2, margin: u32) -> Self {
        Self {
            element: element.into(),
            instance,
            position,
            size,
            margin,
        }
    }

    pub fn footprint(&self) -> Rect {
        Rect::from_position(self.position, self.size)
    }

    /// Footprint grown by the margin, clipped to `bounds`.
    pub fn reserved(&self, bounds: UVec2) -> Rect {
        self.footprint().expanded(self.margin, bounds)
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlacementStrategy {
    /// Uniform-random trials.
    #[default]
    Random,
    /// First legal position in row-major order.
    InOrder,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementConfig {
    pub strategy: PlacementStrategy,
    pub order: PlacementOrder,
    /// Prefer positions along the map border (overrides `strategy`).
    pub closer_to_borders: bool,
    pub minimum_distance_from_borders: u32,
    /// Free space around elements that do not set their own.
    pub free_space_around: u32,
}

impl PlacementConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(mut self, strategy: PlacementStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_order(mut self, order: PlacementOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_closer_to_borders(mut self, closer: bool) -> Self {
        self.closer_to_borders = closer;
        self
    }

    pub fn with_minimum_distance_from_borders(mut self, tiles: u32) -> Self {
        self.minimum_distance_from_borders = tiles;
        self
    }

    pub fn with_free_space_around(mut self, tiles: u32) -> Self {
        self.free_space_around = tiles;
        self
    }
}

/// An instance for which no legal position was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPlacement {
    pub element: String,
    pub instance: u32,
    pub centered: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PlacementOutcome {
    pub placements: Vec<Placement>,
    pub skipped: Vec<SkippedPlacement>,
}

/// Searches a position for one instance and stamps it. Returns `None` when no legal
/// position exists; the map is left untouched in that case.
pub fn place_element(
    grid: &mut Grid,
    layers: &mut LayerSet,
    placed: &[Placement],
    element: &Element,
    instance: u32,
    config: &PlacementConfig,
    rng: &mut dyn RngCore,
) -> Option<Placement> {
    let margin = element.free_space_around.unwrap_or(config.free_space_around);
    let query = PlacementQuery {
        grid,
        placed,
        size: element.size(),
        margin,
        min_distance: config.minimum_distance_from_borders,
    };
    let position = if element.centered {
        find_centered(&query)
    } else if config.closer_to_borders {
        find_near_borders(&query, rng)
    } else {
        match config.strategy {
            PlacementStrategy::Random => find_random(&query, rng),
            PlacementStrategy::InOrder => find_in_order(&query),
        }
    }?;

    let placement = Placement::new(element.name.clone(), instance, position, element.size(), margin);
    stamp(grid, layers, element, &placement);
    Some(placement)
}

/// Copies the element's non-zero cells into the map layers and blocks them.
fn stamp(grid: &mut Grid, layers: &mut LayerSet, element: &Element, placement: &Placement) {
    for layer in &element.layers {
        let target = layers.get_or_create(&layer.name);
        for (local, tile) in layer.non_zero() {
            let pos = placement.position + local;
            target.set(pos, tile);
            if !element.walkable {
                grid.block(pos);
            }
        }
    }
    if !element.allow_paths_in_free_space && placement.margin > 0 {
        let footprint = placement.footprint();
        let reserved = placement.reserved(grid.size());
        for p in reserved.cells().filter(|p| !footprint.contains(*p)) {
            grid.block(p);
        }
    }
}

/// Places every instance in `quantities`, centered elements first.
pub fn place_elements(
    grid: &mut Grid,
    layers: &mut LayerSet,
    elements: &[Element],
    quantities: &HashMap<String, u32>,
    config: &PlacementConfig,
    rng: &mut dyn RngCore,
    sink: &mut dyn EventSink,
) -> PlacementOutcome {
    let mut outcome = PlacementOutcome::default();
    for pending in instance_order(elements, quantities, config.order, rng) {
        let element = &elements[pending.element];
        match place_element(
            grid,
            layers,
            &outcome.placements,
            element,
            pending.instance,
            config,
            rng,
        ) {
            Some(placement) => {
                debug!(
                    "placed '{}' #{} at ({}, {})",
                    placement.element, placement.instance, placement.position.x, placement.position.y
                );
                if sink.wants(GenerationEventKind::ElementPlaced) {
                    sink.send(GenerationEvent::ElementPlaced {
                        placement: placement.clone(),
                    });
                }
                outcome.placements.push(placement);
            }
            None if element.centered => {
                error!(
                    "Centered element '{}' #{} does not fit near the map centre; skipping.",
                    element.name, pending.instance
                );
                if sink.wants(GenerationEventKind::CenteredPlacementFailed) {
                    sink.send(GenerationEvent::CenteredPlacementFailed {
                        element: element.name.clone(),
                        instance: pending.instance,
                    });
                }
                outcome.skipped.push(SkippedPlacement {
                    element: element.name.clone(),
                    instance: pending.instance,
                    centered: true,
                });
            }
            None => {
                warn!(
                    "No legal position for element '{}' #{}; skipping.",
                    element.name, pending.instance
                );
                if sink.wants(GenerationEventKind::PlacementSkipped) {
                    sink.send(GenerationEvent::PlacementSkipped {
                        element: element.name.clone(),
                        instance: pending.instance,
                    });
                }
                outcome.skipped.push(SkippedPlacement {
                    element: element.name.clone(),
                    instance: pending.instance,
                    centered: false,
                });
            }
        }
    }
    outcome
}
