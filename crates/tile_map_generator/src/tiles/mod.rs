//! Tile shortcuts: the main tile of a category plus its border and inner-corner tiles.
//!
//! Border positions are named by their offset from the main tile they border, written
//! `"dy,dx"` (e.g. `"-1,0"` sits directly above a main tile). Inner corners are named by
//! the diagonal direction in which the main tiles lie (e.g. `"1,1"` has main tiles to the
//! east and to the south).
pub mod wangset;

use std::collections::HashMap;

use glam::IVec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use wangset::{WangTile, Wangset, WangsetType};

/// Position of a border tile relative to the main tile it borders.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Surrounding {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Surrounding {
    pub const ALL: [Surrounding; 8] = [
        Surrounding::TopLeft,
        Surrounding::TopCenter,
        Surrounding::TopRight,
        Surrounding::MiddleLeft,
        Surrounding::MiddleRight,
        Surrounding::BottomLeft,
        Surrounding::BottomCenter,
        Surrounding::BottomRight,
    ];

    /// Offset from the main tile as `(dx, dy)`.
    pub const fn offset(self) -> IVec2 {
        match self {
            Surrounding::TopLeft => IVec2::new(-1, -1),
            Surrounding::TopCenter => IVec2::new(0, -1),
            Surrounding::TopRight => IVec2::new(1, -1),
            Surrounding::MiddleLeft => IVec2::new(-1, 0),
            Surrounding::MiddleRight => IVec2::new(1, 0),
            Surrounding::BottomLeft => IVec2::new(-1, 1),
            Surrounding::BottomCenter => IVec2::new(0, 1),
            Surrounding::BottomRight => IVec2::new(1, 1),
        }
    }

    /// Shortcut key in `"dy,dx"` form.
    pub const fn key(self) -> &'static str {
        match self {
            Surrounding::TopLeft => "-1,-1",
            Surrounding::TopCenter => "-1,0",
            Surrounding::TopRight => "-1,1",
            Surrounding::MiddleLeft => "0,-1",
            Surrounding::MiddleRight => "0,1",
            Surrounding::BottomLeft => "1,-1",
            Surrounding::BottomCenter => "1,0",
            Surrounding::BottomRight => "1,1",
        }
    }

    #[inline]
    const fn slot(self) -> usize {
        self as usize
    }

    pub fn is_top(self) -> bool {
        self.offset().y < 0
    }

    pub fn is_bottom(self) -> bool {
        self.offset().y > 0
    }

    pub fn is_left(self) -> bool {
        self.offset().x < 0
    }

    pub fn is_right(self) -> bool {
        self.offset().x > 0
    }
}

/// Inner corner, named by the diagonal in which the main tiles lie.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            Corner::TopLeft => "-1,-1",
            Corner::TopRight => "-1,1",
            Corner::BottomLeft => "1,-1",
            Corner::BottomRight => "1,1",
        }
    }

    #[inline]
    const fn slot(self) -> usize {
        self as usize
    }
}

/// Main, border and inner-corner tile ids of one tile category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilesShortcuts {
    main: u32,
    surrounding: [u32; 8],
    corners: [u32; 4],
}

impl TilesShortcuts {
    /// Builds shortcuts from explicit ids, indexed like [`Surrounding::ALL`] and
    /// [`Corner::ALL`].
    ///
    /// All ids must be non-zero and distinct so rules never confuse two roles.
    pub fn new(main: u32, surrounding: [u32; 8], corners: [u32; 4]) -> Result<Self> {
        let mut ids = Vec::with_capacity(13);
        ids.push(main);
        ids.extend_from_slice(&surrounding);
        ids.extend_from_slice(&corners);
        if ids.contains(&0) {
            return Err(Error::InvalidConfig(
                "tile shortcuts must not contain empty (0) ids".into(),
            ));
        }
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != ids.len() {
            return Err(Error::InvalidConfig(
                "tile shortcuts must use a distinct id per position".into(),
            ));
        }
        Ok(Self {
            main,
            surrounding,
            corners,
        })
    }

    /// Builds shortcuts from `"dy,dx"`-keyed maps as found in generator configuration files.
    pub fn from_positions(
        category: &str,
        main: u32,
        surrounding: &HashMap<String, u32>,
        corners: &HashMap<String, u32>,
    ) -> Result<Self> {
        let missing = |key: &str| Error::MissingTiles {
            key: format!("{category} {key}"),
        };
        let mut s = [0u32; 8];
        for pos in Surrounding::ALL {
            s[pos.slot()] = *surrounding.get(pos.key()).ok_or_else(|| missing(pos.key()))?;
        }
        let mut c = [0u32; 4];
        for corner in Corner::ALL {
            c[corner.slot()] = *corners
                .get(corner.key())
                .ok_or_else(|| missing(corner.key()))?;
        }
        Self::new(main, s, c)
    }

    #[inline]
    pub fn main(&self) -> u32 {
        self.main
    }

    #[inline]
    pub fn surrounding(&self, pos: Surrounding) -> u32 {
        self.surrounding[pos.slot()]
    }

    #[inline]
    pub fn corner(&self, corner: Corner) -> u32 {
        self.corners[corner.slot()]
    }

    /// Which border position `tile` represents, if any.
    pub fn surrounding_of(&self, tile: u32) -> Option<Surrounding> {
        Surrounding::ALL
            .into_iter()
            .find(|p| self.surrounding(*p) == tile)
    }

    /// True for border and inner-corner tiles.
    pub fn is_border_tile(&self, tile: u32) -> bool {
        tile != 0 && (self.surrounding.contains(&tile) || self.corners.contains(&tile))
    }
}

/// Tile shortcuts keyed by category name (`"path"`, spot keys, `"<key>-walls"`).
#[derive(Debug, Clone, Default)]
pub struct TilesCatalog {
    categories: HashMap<String, TilesShortcuts>,
}

impl TilesCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, shortcuts: TilesShortcuts) -> Self {
        self.insert(key, shortcuts);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, shortcuts: TilesShortcuts) {
        self.categories.insert(key.into(), shortcuts);
    }

    pub fn get(&self, key: &str) -> Option<&TilesShortcuts> {
        self.categories.get(key)
    }

    /// Like [`TilesCatalog::get`], failing with [`Error::MissingTiles`].
    pub fn require(&self, key: &str) -> Result<&TilesShortcuts> {
        self.categories.get(key).ok_or_else(|| Error::MissingTiles {
            key: key.to_owned(),
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.categories.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Shortcuts with ids `base..base + 13`: main, then [`Surrounding::ALL`], then [`Corner::ALL`].
#[cfg(test)]
pub(crate) fn sequential_shortcuts(base: u32) -> TilesShortcuts {
    let mut s = [0u32; 8];
    for (i, v) in s.iter_mut().enumerate() {
        *v = base + 1 + i as u32;
    }
    let mut c = [0u32; 4];
    for (i, v) in c.iter_mut().enumerate() {
        *v = base + 9 + i as u32;
    }
    TilesShortcuts::new(base, s, c).expect("valid sequential shortcuts")
}
