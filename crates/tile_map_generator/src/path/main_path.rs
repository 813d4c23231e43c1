//! The main path: the map entrance on one of its edges.
use glam::{IVec2, UVec2};
use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::random::{below, range_inclusive};

/// Map edge.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// Facing direction, as used by return points.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Right, Edge::Bottom, Edge::Left];

    pub fn opposite(self) -> Edge {
        match self {
            Edge::Top => Edge::Bottom,
            Edge::Right => Edge::Left,
            Edge::Bottom => Edge::Top,
            Edge::Left => Edge::Right,
        }
    }

    /// Unit step pointing off the map through this edge.
    pub fn outward(self) -> IVec2 {
        match self {
            Edge::Top => IVec2::new(0, -1),
            Edge::Right => IVec2::new(1, 0),
            Edge::Bottom => IVec2::new(0, 1),
            Edge::Left => IVec2::new(-1, 0),
        }
    }

    /// Direction a player entering through this edge faces.
    pub fn inward_direction(self) -> Direction {
        match self {
            Edge::Top => Direction::Down,
            Edge::Right => Direction::Left,
            Edge::Bottom => Direction::Up,
            Edge::Left => Direction::Right,
        }
    }

    fn is_horizontal(self) -> bool {
        matches!(self, Edge::Top | Edge::Bottom)
    }
}

/// How the main path is chosen.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MainPathPlan {
    /// Random edge and offset.
    #[default]
    Random,
    /// Explicit edge and offset along it.
    Fixed { edge: Edge, offset: u32 },
    /// Opposite the main path of a previous map, for chaining maps.
    OppositeOf(MainPath),
}

/// A run of `size` cells along one edge.
///
/// With a blocked border the route sits one row inward and `cap` holds the border
/// cells opened in front of it; otherwise the route lies on the edge row and `cap` is
/// empty.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainPath {
    pub edge: Edge,
    /// Offset of the first cell along the edge.
    pub offset: u32,
    pub route: Vec<UVec2>,
    pub cap: Vec<UVec2>,
}

impl MainPath {
    /// Legal offsets along `edge`; corners are avoided on a blocked border.
    fn offset_range(edge: Edge, width: u32, height: u32, size: u32, block_border: bool) -> Option<(u32, u32)> {
        let length = if edge.is_horizontal() { width } else { height };
        let depth = if edge.is_horizontal() { height } else { width };
        if size == 0 || depth < 2 + 2 * u32::from(block_border) {
            return None;
        }
        let (lo, hi) = if block_border {
            (1, length.checked_sub(size + 1)?)
        } else {
            (0, length.checked_sub(size)?)
        };
        (lo <= hi).then_some((lo, hi))
    }

    /// Builds the path at an explicit position, or `None` if it does not fit.
    pub fn at(edge: Edge, offset: u32, size: u32, width: u32, height: u32, block_border: bool) -> Option<Self> {
        let (lo, hi) = Self::offset_range(edge, width, height, size, block_border)?;
        if offset < lo || offset > hi {
            return None;
        }
        let row = |depth: u32| -> Vec<UVec2> {
            (offset..offset + size)
                .map(|i| match edge {
                    Edge::Top => UVec2::new(i, depth),
                    Edge::Bottom => UVec2::new(i, height - 1 - depth),
                    Edge::Left => UVec2::new(depth, i),
                    Edge::Right => UVec2::new(width - 1 - depth, i),
                })
                .collect()
        };
        let (route, cap) = if block_border {
            (row(1), row(0))
        } else {
            (row(0), Vec::new())
        };
        Some(Self {
            edge,
            offset,
            route,
            cap,
        })
    }

    /// Random edge, random legal offset. Edges too short for the path are skipped.
    pub fn random(width: u32, height: u32, size: u32, block_border: bool, rng: &mut dyn RngCore) -> Option<Self> {
        let candidates: Vec<(Edge, u32, u32)> = Edge::ALL
            .into_iter()
            .filter_map(|e| {
                Self::offset_range(e, width, height, size, block_border).map(|(lo, hi)| (e, lo, hi))
            })
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let (edge, lo, hi) = candidates[below(rng, candidates.len())];
        let offset = range_inclusive(rng, lo, hi);
        debug!("main path on {:?} edge at offset {}", edge, offset);
        Self::at(edge, offset, size, width, height, block_border)
    }

    /// Places the path on the edge opposite a previous map's main path.
    ///
    /// The new run is centred on the previous route's middle cell, clamped into the
    /// legal range of the opposite edge.
    pub fn opposite_of(
        previous: &MainPath,
        width: u32,
        height: u32,
        size: u32,
        block_border: bool,
    ) -> Option<Self> {
        let edge = previous.edge.opposite();
        let (lo, hi) = Self::offset_range(edge, width, height, size, block_border)?;
        let sample = previous.route.get(previous.route.len() / 2)?;
        let along = if edge.is_horizontal() { sample.x } else { sample.y };
        let offset = along.saturating_sub(size / 2).clamp(lo, hi);
        Self::at(edge, offset, size, width, height, block_border)
    }

    /// Middle cell of the route; paths are routed to it.
    pub fn anchor(&self) -> UVec2 {
        self.route[self.route.len() / 2]
    }
}
