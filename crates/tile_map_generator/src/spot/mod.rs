//! Ground spots: organic regions (lakes, patches, clearings) packaged as placeable elements.
//!
//! Each spot instance is grown inside its own rectangle, optionally carved, bordered,
//! walled and decorated, and then handed to placement like any other element.
pub mod carve;
pub mod growth;

use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use carve::{carve_path, CHANNEL_WIDTH};
pub use growth::{create_spot_layer_data, target_cells, usable_area, HOLE_NEIGHBOR_THRESHOLD};

use crate::autotile::{inner_walls, outer_walls, AutotileCascade};
use crate::error::{Error, Result};
use crate::grid::TileLayer;
use crate::placement::Element;
use crate::random::{chance, pick};
use crate::tiles::TilesCatalog;

/// Configuration of one kind of ground spot.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct GroundSpotConfig {
    /// Tile category used to draw the region.
    pub tiles_key: String,
    /// Output layer name. Defaults to `tiles_key`.
    pub layer_name: Option<String>,
    pub width: u32,
    pub height: u32,
    /// Share of the usable area to fill, in percent.
    pub mark_percentage: f32,
    pub quantity: u32,
    /// Whether paths may cross the region.
    pub walkable: bool,
    /// Draw border and corner tiles around the region.
    pub apply_corners_tiles: bool,
    pub inner_walls: bool,
    pub outer_walls: bool,
    /// Wall tile category. Defaults to `"<tiles_key>-walls"`.
    pub walls_key: Option<String>,
    /// Cut a walkable channel from the centre to the rectangle edge.
    pub carve_path: bool,
    /// Chance, in percent, of replacing a main tile with a variation.
    pub variable_tiles_percentage: f32,
    pub spot_tile_variations: Vec<u32>,
    pub free_space_around: Option<u32>,
}

impl Default for GroundSpotConfig {
    fn default() -> Self {
        Self {
            tiles_key: String::new(),
            layer_name: None,
            width: 0,
            height: 0,
            mark_percentage: 60.0,
            quantity: 1,
            walkable: false,
            apply_corners_tiles: true,
            inner_walls: false,
            outer_walls: false,
            walls_key: None,
            carve_path: false,
            variable_tiles_percentage: 0.0,
            spot_tile_variations: Vec::new(),
            free_space_around: None,
        }
    }
}

impl GroundSpotConfig {
    pub fn new(tiles_key: impl Into<String>, width: u32, height: u32, mark_percentage: f32) -> Self {
        Self {
            tiles_key: tiles_key.into(),
            width,
            height,
            mark_percentage,
            ..Default::default()
        }
    }

    pub fn with_layer_name(mut self, name: impl Into<String>) -> Self {
        self.layer_name = Some(name.into());
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_walkable(mut self, walkable: bool) -> Self {
        self.walkable = walkable;
        self
    }

    pub fn with_corners(mut self, apply: bool) -> Self {
        self.apply_corners_tiles = apply;
        self
    }

    pub fn with_walls(mut self, inner: bool, outer: bool) -> Self {
        self.inner_walls = inner;
        self.outer_walls = outer;
        self
    }

    pub fn with_walls_key(mut self, key: impl Into<String>) -> Self {
        self.walls_key = Some(key.into());
        self
    }

    pub fn with_carve_path(mut self, carve: bool) -> Self {
        self.carve_path = carve;
        self
    }

    pub fn with_variations(mut self, percentage: f32, tiles: Vec<u32>) -> Self {
        self.variable_tiles_percentage = percentage;
        self.spot_tile_variations = tiles;
        self
    }

    pub fn with_free_space_around(mut self, tiles: u32) -> Self {
        self.free_space_around = Some(tiles);
        self
    }

    pub fn layer_name(&self) -> &str {
        self.layer_name.as_deref().unwrap_or(&self.tiles_key)
    }

    pub fn walls_key(&self) -> String {
        self.walls_key
            .clone()
            .unwrap_or_else(|| format!("{}-walls", self.tiles_key))
    }

    /// Cells kept free inside the rectangle so borders and walls fit.
    pub fn margin(&self) -> u32 {
        let border = u32::from(self.apply_corners_tiles);
        let walls = u32::from(self.apply_corners_tiles && self.outer_walls);
        border + walls
    }

    pub fn validate(&self) -> Result<()> {
        if self.tiles_key.is_empty() {
            return Err(Error::InvalidConfig("ground spot tiles_key is empty".into()));
        }
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidConfig(format!(
                "ground spot '{}' must have a non-zero size",
                self.tiles_key
            )));
        }
        if !(0.0..=100.0).contains(&self.mark_percentage) {
            return Err(Error::InvalidConfig(format!(
                "ground spot '{}' mark_percentage must be within [0, 100]",
                self.tiles_key
            )));
        }
        if !(0.0..=100.0).contains(&self.variable_tiles_percentage) {
            return Err(Error::InvalidConfig(format!(
                "ground spot '{}' variable_tiles_percentage must be within [0, 100]",
                self.tiles_key
            )));
        }
        if (self.inner_walls || self.outer_walls) && !self.apply_corners_tiles {
            return Err(Error::InvalidConfig(format!(
                "ground spot '{}' needs corner tiles to derive walls",
                self.tiles_key
            )));
        }
        Ok(())
    }
}

/// Turns [`GroundSpotConfig`]s into placeable [`Element`]s.
pub struct SpotGenerator<'a> {
    catalog: &'a TilesCatalog,
}

impl<'a> SpotGenerator<'a> {
    pub fn new(catalog: &'a TilesCatalog) -> Self {
        Self { catalog }
    }

    /// One element per configured quantity unit, named `"<layer>-<n>"`.
    pub fn build_elements(&self, config: &GroundSpotConfig, rng: &mut dyn RngCore) -> Result<Vec<Element>> {
        config.validate()?;
        (1..=config.quantity)
            .map(|instance| self.build_element(config, instance, rng))
            .collect()
    }

    pub fn build_element(
        &self,
        config: &GroundSpotConfig,
        instance: u32,
        rng: &mut dyn RngCore,
    ) -> Result<Element> {
        let tiles = self.catalog.require(&config.tiles_key)?;
        let (w, h) = (config.width, config.height);
        let (wu, hu) = (w as usize, h as usize);
        let layer_name = config.layer_name();

        let mut data = create_spot_layer_data(
            w,
            h,
            config.mark_percentage,
            config.margin(),
            tiles.main(),
            rng,
        );
        if config.carve_path {
            carve_path(&mut data, w, h, config.margin());
        }
        if config.apply_corners_tiles {
            AutotileCascade::new(tiles).apply(&mut data, wu, hu);
        }

        let mut layers = Vec::with_capacity(3);
        if config.inner_walls || config.outer_walls {
            let walls = self.catalog.require(&config.walls_key())?;
            if config.inner_walls {
                layers.push(TileLayer::from_data(
                    format!("{layer_name}-inner-walls"),
                    w,
                    h,
                    inner_walls(&data, wu, hu, tiles, walls),
                )?);
            }
            if config.outer_walls {
                layers.push(TileLayer::from_data(
                    format!("{layer_name}-outer-walls"),
                    w,
                    h,
                    outer_walls(&data, wu, hu, tiles, walls),
                )?);
            }
        }

        if !config.spot_tile_variations.is_empty() && config.variable_tiles_percentage > 0.0 {
            for cell in data.iter_mut().filter(|t| **t == tiles.main()) {
                if chance(rng, config.variable_tiles_percentage) {
                    if let Some(variation) = pick(rng, &config.spot_tile_variations) {
                        *cell = *variation;
                    }
                }
            }
        }

        layers.insert(0, TileLayer::from_data(layer_name, w, h, data)?);
        debug!("built spot '{}' instance {}", layer_name, instance);

        let mut element = Element::new(format!("{layer_name}-{instance}"), layers)?
            .with_walkable(config.walkable);
        if let Some(free) = config.free_space_around {
            element = element.with_free_space_around(free);
        }
        Ok(element)
    }
}
