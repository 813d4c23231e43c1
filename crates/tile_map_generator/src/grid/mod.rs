//! Map grid primitives: walkability occupancy, tile layers and rectangles.
//!
//! Coordinates are `(x, y)` with `x` growing right and `y` growing down; layer data is
//! row-major with index `y * width + x`.
pub mod layer;
pub mod rect;

use glam::{IVec2, UVec2};
use tracing::warn;

pub use layer::{LayerSet, LayerType, TileLayer};
pub use rect::Rect;

/// 4-neighbourhood in up, right, down, left order.
pub const NEIGHBORS_4: [IVec2; 4] = [
    IVec2::new(0, -1),
    IVec2::new(1, 0),
    IVec2::new(0, 1),
    IVec2::new(-1, 0),
];

/// 8-neighbourhood, clockwise from north.
pub const NEIGHBORS_8: [IVec2; 8] = [
    IVec2::new(0, -1),
    IVec2::new(1, -1),
    IVec2::new(1, 0),
    IVec2::new(1, 1),
    IVec2::new(0, 1),
    IVec2::new(-1, 1),
    IVec2::new(-1, 0),
    IVec2::new(-1, -1),
];

/// Applies a signed `delta` to `pos`, returning `None` outside `0..size`.
#[inline]
pub fn offset_within(pos: UVec2, delta: IVec2, size: UVec2) -> Option<UVec2> {
    let p = pos.as_ivec2() + delta;
    if p.x < 0 || p.y < 0 || p.x >= size.x as i32 || p.y >= size.y as i32 {
        None
    } else {
        Some(p.as_uvec2())
    }
}

/// Occupancy grid: which cells are still free for elements and paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
    walkable: Vec<bool>,
}

impl Grid {
    /// Creates a fully walkable grid.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            walkable: vec![true; width as usize * height as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn size(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }

    #[inline]
    pub fn in_bounds(&self, pos: UVec2) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    #[inline]
    pub fn index(&self, pos: UVec2) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| pos.y as usize * self.width as usize + pos.x as usize)
    }

    #[inline]
    pub fn position(&self, index: usize) -> UVec2 {
        let w = self.width as usize;
        UVec2::new((index % w) as u32, (index / w) as u32)
    }

    /// Out-of-bounds cells are never walkable.
    #[inline]
    pub fn is_walkable(&self, pos: UVec2) -> bool {
        self.index(pos).is_some_and(|i| self.walkable[i])
    }

    pub fn set_walkable(&mut self, pos: UVec2, walkable: bool) {
        match self.index(pos) {
            Some(i) => self.walkable[i] = walkable,
            None => warn!(
                "Ignoring walkability write outside grid at ({}, {}).",
                pos.x, pos.y
            ),
        }
    }

    #[inline]
    pub fn block(&mut self, pos: UVec2) {
        self.set_walkable(pos, false);
    }

    /// True when the rectangle lies inside the grid and every cell is walkable.
    pub fn is_rect_walkable(&self, rect: &Rect) -> bool {
        rect.right() <= self.width
            && rect.bottom() <= self.height
            && rect.cells().all(|p| self.is_walkable(p))
    }

    pub fn block_rect(&mut self, rect: &Rect) {
        for p in rect.cells() {
            if self.in_bounds(p) {
                self.block(p);
            }
        }
    }

    pub fn walkable_count(&self) -> usize {
        self.walkable.iter().filter(|w| **w).count()
    }

    pub fn offset(&self, pos: UVec2, delta: IVec2) -> Option<UVec2> {
        offset_within(pos, delta, self.size())
    }

    /// In-bounds 4-neighbours of `pos`.
    pub fn neighbors4(&self, pos: UVec2) -> impl Iterator<Item = UVec2> + '_ {
        NEIGHBORS_4
            .iter()
            .filter_map(move |d| self.offset(pos, *d))
    }

    /// In-bounds 8-neighbours of `pos`.
    pub fn neighbors8(&self, pos: UVec2) -> impl Iterator<Item = UVec2> + '_ {
        NEIGHBORS_8
            .iter()
            .filter_map(move |d| self.offset(pos, *d))
    }
}
