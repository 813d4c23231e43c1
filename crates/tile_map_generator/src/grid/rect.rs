//! Axis-aligned tile rectangles used for footprints and free-space margins.
use glam::UVec2;

/// Half-open rectangle of tiles: covers `x..x + width` and `y..y + height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_position(position: UVec2, size: UVec2) -> Self {
        Self::new(position.x, position.y, size.x, size.y)
    }

    #[inline]
    pub fn position(&self) -> UVec2 {
        UVec2::new(self.x, self.y)
    }

    #[inline]
    pub fn size(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }

    /// Exclusive right edge.
    #[inline]
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    #[inline]
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Grows the rectangle by `margin` on every side, clipped to `0..bounds`.
    pub fn expanded(&self, margin: u32, bounds: UVec2) -> Rect {
        let x0 = self.x.saturating_sub(margin);
        let y0 = self.y.saturating_sub(margin);
        let x1 = self.right().saturating_add(margin).min(bounds.x);
        let y1 = self.bottom().saturating_add(margin).min(bounds.y);
        Rect::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn contains(&self, p: UVec2) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Tile centre, rounded towards the top-left.
    pub fn center(&self) -> UVec2 {
        UVec2::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Row-major iterator over covered cells.
    pub fn cells(&self) -> impl Iterator<Item = UVec2> + '_ {
        (self.y..self.bottom()).flat_map(move |y| (self.x..self.right()).map(move |x| UVec2::new(x, y)))
    }
}
