//! Final layer composition: merging, pruning and reordering.
//!
//! [`compose`] runs the steps in a fixed order: merge layers sharing a name, drop empty
//! layers, merge non-colliding layers sharing a configured substring, then apply
//! explicit depth overrides.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::grid::TileLayer;

/// Where a layer goes in the final order. Later layers draw on top.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepthAnchor {
    /// Directly above (after) the named layer.
    Above(String),
    /// Directly below (before) the named layer.
    Below(String),
    /// At an absolute index, clamped to the layer count.
    Index(usize),
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerDepth {
    pub layer: String,
    pub anchor: DepthAnchor,
}

impl LayerDepth {
    pub fn above(layer: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            layer: layer.into(),
            anchor: DepthAnchor::Above(reference.into()),
        }
    }

    pub fn below(layer: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            layer: layer.into(),
            anchor: DepthAnchor::Below(reference.into()),
        }
    }

    pub fn at(layer: impl Into<String>, index: usize) -> Self {
        Self {
            layer: layer.into(),
            anchor: DepthAnchor::Index(index),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositorConfig {
    /// Substrings whose matching layers are merged when they do not collide.
    pub merge_substrings: Vec<String>,
    pub remove_empty: bool,
    pub depths: Vec<LayerDepth>,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            merge_substrings: Vec::new(),
            remove_empty: true,
            depths: Vec::new(),
        }
    }
}

impl CompositorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_merge_substring(mut self, substring: impl Into<String>) -> Self {
        self.merge_substrings.push(substring.into());
        self
    }

    pub fn with_remove_empty(mut self, remove: bool) -> Self {
        self.remove_empty = remove;
        self
    }

    pub fn with_depth(mut self, depth: LayerDepth) -> Self {
        self.depths.push(depth);
        self
    }
}

/// True when both layers hold a tile in the same cell.
pub fn layers_collide(a: &TileLayer, b: &TileLayer) -> bool {
    a.data.iter().zip(&b.data).any(|(x, y)| *x != 0 && *y != 0)
}

/// Copies `src` cells into empty cells of `dst`; existing tiles win.
fn fill_empty(dst: &mut TileLayer, src: &TileLayer) {
    for (d, s) in dst.data.iter_mut().zip(&src.data) {
        if *d == 0 {
            *d = *s;
        }
    }
}

/// Merges layers with the same name into the first of them.
pub fn merge_layers_by_name(layers: Vec<TileLayer>) -> Vec<TileLayer> {
    let mut out: Vec<TileLayer> = Vec::with_capacity(layers.len());
    for layer in layers {
        match out.iter_mut().find(|l| l.name == layer.name) {
            Some(existing) if existing.size() == layer.size() => fill_empty(existing, &layer),
            Some(_) => {
                warn!("Layer '{}' repeats with a different size; keeping both.", layer.name);
                out.push(layer);
            }
            None => out.push(layer),
        }
    }
    out
}

/// Merges pairs of non-colliding layers whose names contain a substring.
///
/// The merged layer takes the first layer's position and is named
/// `merge-<first>-<second>`; merging repeats until no pair is left.
pub fn merge_layers_by_substring(mut layers: Vec<TileLayer>, substrings: &[String]) -> Vec<TileLayer> {
    for sub in substrings.iter().filter(|s| !s.is_empty()) {
        while let Some((i, j)) = find_mergeable_pair(&layers, sub) {
            let second = layers.remove(j);
            let first = &mut layers[i];
            fill_empty(first, &second);
            first.name = format!("merge-{}-{}", first.name, second.name);
            debug!("merged layer '{}'", first.name);
        }
    }
    layers
}

fn find_mergeable_pair(layers: &[TileLayer], sub: &str) -> Option<(usize, usize)> {
    for i in 0..layers.len() {
        if !layers[i].name.contains(sub) {
            continue;
        }
        for j in i + 1..layers.len() {
            if layers[j].name.contains(sub)
                && layers[i].size() == layers[j].size()
                && !layers_collide(&layers[i], &layers[j])
            {
                return Some((i, j));
            }
        }
    }
    None
}

pub fn remove_empty_layers(layers: Vec<TileLayer>) -> Vec<TileLayer> {
    layers.into_iter().filter(|l| !l.is_empty()).collect()
}

/// Moves layers according to `depths`, applied in order. Unknown names are skipped.
pub fn reorder_layers(mut layers: Vec<TileLayer>, depths: &[LayerDepth]) -> Vec<TileLayer> {
    for depth in depths {
        let Some(from) = layers.iter().position(|l| l.name == depth.layer) else {
            warn!("Depth override for unknown layer '{}'; skipping.", depth.layer);
            continue;
        };
        let layer = layers.remove(from);
        let to = match &depth.anchor {
            DepthAnchor::Index(index) => Some((*index).min(layers.len())),
            DepthAnchor::Above(reference) => layers.iter().position(|l| &l.name == reference).map(|i| i + 1),
            DepthAnchor::Below(reference) => layers.iter().position(|l| &l.name == reference),
        };
        match to {
            Some(to) => layers.insert(to, layer),
            None => {
                warn!(
                    "Depth anchor for layer '{}' not found; keeping its position.",
                    depth.layer
                );
                layers.insert(from, layer);
            }
        }
    }
    layers
}

/// Runs every composition step in order.
pub fn compose(layers: Vec<TileLayer>, config: &CompositorConfig) -> Vec<TileLayer> {
    let mut layers = merge_layers_by_name(layers);
    if config.remove_empty {
        layers = remove_empty_layers(layers);
    }
    layers = merge_layers_by_substring(layers, &config.merge_substrings);
    reorder_layers(layers, &config.depths)
}
