//! Tiled-compatible tile layers and an ordered, name-addressed layer collection.
use glam::UVec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

/// Layer kind tag written to the `type` field of exported layers.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LayerType {
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "tilelayer"))]
    TileLayer,
}

/// A rectangular layer of tile ids. `0` means empty.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u32>,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub layer_type: LayerType,
    pub visible: bool,
    pub opacity: f32,
    pub x: i32,
    pub y: i32,
}

impl TileLayer {
    /// Creates an empty layer.
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self::filled(name, width, height, 0)
    }

    /// Creates a layer with every cell set to `tile`.
    pub fn filled(name: impl Into<String>, width: u32, height: u32, tile: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            data: vec![tile; width as usize * height as usize],
            layer_type: LayerType::TileLayer,
            visible: true,
            opacity: 1.0,
            x: 0,
            y: 0,
        }
    }

    /// Wraps existing row-major data. Fails if the length does not match the size.
    pub fn from_data(
        name: impl Into<String>,
        width: u32,
        height: u32,
        data: Vec<u32>,
    ) -> Result<Self> {
        let name = name.into();
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(Error::InvalidLayer {
                name,
                reason: format!("expected {} cells, got {}", expected, data.len()),
            });
        }
        let mut layer = Self::new(name, width, height);
        layer.data = data;
        Ok(layer)
    }

    /// Builds a layer from loosely-typed input such as decoded JSON.
    ///
    /// Missing cells become `0`; short data is padded and long data truncated.
    pub fn from_raw(name: impl Into<String>, width: u32, height: u32, raw: Vec<Option<u32>>) -> Self {
        let name = name.into();
        let expected = width as usize * height as usize;
        let missing = raw.iter().filter(|v| v.is_none()).count();
        if missing > 0 {
            warn!("Layer '{}' had {} missing cells; using 0.", name, missing);
        }
        if raw.len() != expected {
            warn!(
                "Layer '{}' has {} cells for a {}x{} layer; resizing.",
                name,
                raw.len(),
                width,
                height
            );
        }
        let mut data: Vec<u32> = raw.into_iter().map(|v| v.unwrap_or(0)).collect();
        data.resize(expected, 0);
        let mut layer = Self::new(name, width, height);
        layer.data = data;
        layer
    }

    #[inline]
    pub fn size(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }

    #[inline]
    pub fn index(&self, pos: UVec2) -> Option<usize> {
        (pos.x < self.width && pos.y < self.height)
            .then(|| pos.y as usize * self.width as usize + pos.x as usize)
    }

    /// Tile at `pos`, or `0` outside the layer.
    #[inline]
    pub fn get(&self, pos: UVec2) -> u32 {
        self.index(pos).map_or(0, |i| self.data[i])
    }

    pub fn set(&mut self, pos: UVec2, tile: u32) {
        match self.index(pos) {
            Some(i) => self.data[i] = tile,
            None => warn!(
                "Ignoring write outside layer '{}' at ({}, {}).",
                self.name, pos.x, pos.y
            ),
        }
    }

    /// True when every cell is `0`.
    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|t| *t == 0)
    }

    pub fn non_zero_count(&self) -> usize {
        self.data.iter().filter(|t| **t != 0).count()
    }

    /// Positions and tiles of all non-empty cells, row-major.
    pub fn non_zero(&self) -> impl Iterator<Item = (UVec2, u32)> + '_ {
        let w = self.width.max(1) as usize;
        self.data
            .iter()
            .enumerate()
            .filter(|(_, t)| **t != 0)
            .map(move |(i, t)| (UVec2::new((i % w) as u32, (i / w) as u32), *t))
    }
}

/// Ordered set of map-sized layers addressed by name.
///
/// Layers keep the order in which they were first requested.
#[derive(Debug, Clone)]
pub struct LayerSet {
    width: u32,
    height: u32,
    layers: Vec<TileLayer>,
}

impl LayerSet {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            layers: Vec::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&TileLayer> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut TileLayer> {
        self.layers.iter_mut().find(|l| l.name == name)
    }

    /// Returns the named layer, creating an empty one at the end if needed.
    pub fn get_or_create(&mut self, name: &str) -> &mut TileLayer {
        let idx = match self.layers.iter().position(|l| l.name == name) {
            Some(idx) => idx,
            None => {
                self.layers
                    .push(TileLayer::new(name, self.width, self.height));
                self.layers.len() - 1
            }
        };
        &mut self.layers[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = &TileLayer> {
        self.layers.iter()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn into_vec(self) -> Vec<TileLayer> {
        self.layers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_data_rejects_wrong_length() {
        let err = TileLayer::from_data("bad", 2, 2, vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, Error::InvalidLayer { ref name, .. } if name == "bad"));
    }

    #[test]
    fn from_raw_sanitizes_missing_cells() {
        let layer = TileLayer::from_raw("raw", 2, 2, vec![Some(5), None, Some(7)]);
        assert_eq!(layer.data, vec![5, 0, 7, 0]);
    }

    #[test]
    fn get_outside_is_empty() {
        let mut layer = TileLayer::new("a", 3, 3);
        layer.set(UVec2::new(2, 1), 9);
        assert_eq!(layer.get(UVec2::new(2, 1)), 9);
        assert_eq!(layer.get(UVec2::new(5, 1)), 0);
        assert_eq!(layer.data[5], 9);
    }

    #[test]
    fn non_zero_reports_positions() {
        let layer = TileLayer::from_data("a", 3, 2, vec![0, 4, 0, 0, 0, 6]).unwrap();
        let cells: Vec<(UVec2, u32)> = layer.non_zero().collect();
        assert_eq!(cells, vec![(UVec2::new(1, 0), 4), (UVec2::new(2, 1), 6)]);
        assert!(!layer.is_empty());
        assert_eq!(layer.non_zero_count(), 2);
    }

    #[test]
    fn layer_set_keeps_creation_order() {
        let mut set = LayerSet::new(2, 2);
        set.get_or_create("b").set(UVec2::ZERO, 1);
        set.get_or_create("a");
        set.get_or_create("b").set(UVec2::ONE, 2);
        let names: Vec<&str> = set.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(set.get("b").unwrap().data, vec![1, 0, 0, 2]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_as_tiled_tilelayer() {
        let layer = TileLayer::from_data("ground", 2, 1, vec![3, 0]).unwrap();
        let json = serde_json::to_value(&layer).unwrap();
        assert_eq!(json["type"], "tilelayer");
        assert_eq!(json["name"], "ground");
        assert_eq!(json["data"], serde_json::json!([3, 0]));
        assert_eq!(json["visible"], true);
        assert_eq!(json["opacity"], 1.0);
        assert_eq!(json["x"], 0);
        let back: TileLayer = serde_json::from_value(json).unwrap();
        assert_eq!(back, layer);
    }
}
