//! Derivation of [`TilesShortcuts`] from Tiled wangset metadata.
//!
//! A wang id lists eight colors clockwise from the top edge:
//! `[top, top-right, right, bottom-right, bottom, bottom-left, left, top-left]`.
//! Only the four corner entries are used; a tile's role follows from which of its
//! corners carry the path color.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Corner, Surrounding, TilesShortcuts};
use crate::error::{Error, Result};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WangsetType {
    Corner,
    Edge,
    Mixed,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WangTile {
    #[cfg_attr(feature = "serde", serde(rename = "tileid"))]
    pub tile_id: u32,
    #[cfg_attr(feature = "serde", serde(rename = "wangid"))]
    pub wang_id: [u8; 8],
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wangset {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: WangsetType,
    #[cfg_attr(feature = "serde", serde(rename = "wangtiles"))]
    pub tiles: Vec<WangTile>,
}

const TOP_LEFT: u8 = 0b0001;
const TOP_RIGHT: u8 = 0b0010;
const BOTTOM_RIGHT: u8 = 0b0100;
const BOTTOM_LEFT: u8 = 0b1000;
const ALL_CORNERS: u8 = 0b1111;

/// Role of a tile in a category, derived from its corner mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Main,
    Border(Surrounding),
    Inner(Corner),
}

fn corner_mask(wang_id: &[u8; 8], color: u8) -> u8 {
    let mut mask = 0;
    if wang_id[7] == color {
        mask |= TOP_LEFT;
    }
    if wang_id[1] == color {
        mask |= TOP_RIGHT;
    }
    if wang_id[3] == color {
        mask |= BOTTOM_RIGHT;
    }
    if wang_id[5] == color {
        mask |= BOTTOM_LEFT;
    }
    mask
}

fn role_of(mask: u8) -> Option<Role> {
    let role = match mask {
        ALL_CORNERS => Role::Main,
        // Border tiles: the path occupies the corners facing it.
        BOTTOM_RIGHT => Role::Border(Surrounding::TopLeft),
        m if m == BOTTOM_RIGHT | BOTTOM_LEFT => Role::Border(Surrounding::TopCenter),
        BOTTOM_LEFT => Role::Border(Surrounding::TopRight),
        m if m == TOP_RIGHT | BOTTOM_RIGHT => Role::Border(Surrounding::MiddleLeft),
        m if m == TOP_LEFT | BOTTOM_LEFT => Role::Border(Surrounding::MiddleRight),
        TOP_RIGHT => Role::Border(Surrounding::BottomLeft),
        m if m == TOP_LEFT | TOP_RIGHT => Role::Border(Surrounding::BottomCenter),
        TOP_LEFT => Role::Border(Surrounding::BottomRight),
        // Inner corners: only the corner opposite the path stays free.
        m if m == ALL_CORNERS & !TOP_LEFT => Role::Inner(Corner::BottomRight),
        m if m == ALL_CORNERS & !BOTTOM_LEFT => Role::Inner(Corner::TopRight),
        m if m == ALL_CORNERS & !TOP_RIGHT => Role::Inner(Corner::BottomLeft),
        m if m == ALL_CORNERS & !BOTTOM_RIGHT => Role::Inner(Corner::TopLeft),
        _ => return None,
    };
    Some(role)
}

impl TilesShortcuts {
    /// Derives shortcuts from a corner or mixed wangset.
    ///
    /// Tile ids are `first_gid + tileid`. The first tile found for each role wins.
    pub fn from_wangset(wangset: &Wangset, first_gid: u32, path_color: u8) -> Result<Self> {
        if wangset.kind == WangsetType::Edge {
            return Err(Error::UnsupportedWangset(format!(
                "'{}' is an edge wangset; corner or mixed required",
                wangset.name
            )));
        }

        let mut main = None;
        let mut surrounding = [None; 8];
        let mut corners = [None; 4];
        for tile in &wangset.tiles {
            let gid = first_gid + tile.tile_id;
            match role_of(corner_mask(&tile.wang_id, path_color)) {
                Some(Role::Main) => {
                    main.get_or_insert(gid);
                }
                Some(Role::Border(pos)) => {
                    surrounding[pos.slot()].get_or_insert(gid);
                }
                Some(Role::Inner(corner)) => {
                    corners[corner.slot()].get_or_insert(gid);
                }
                None => {}
            }
        }

        let missing = |what: &str| {
            Error::UnsupportedWangset(format!("'{}' has no tile for {}", wangset.name, what))
        };
        let main = main.ok_or_else(|| missing("the main tile"))?;
        let mut s = [0u32; 8];
        for pos in Surrounding::ALL {
            s[pos.slot()] = surrounding[pos.slot()]
                .ok_or_else(|| missing(&format!("border {}", pos.key())))?;
        }
        let mut c = [0u32; 4];
        for corner in Corner::ALL {
            c[corner.slot()] = corners[corner.slot()]
                .ok_or_else(|| missing(&format!("corner {}", corner.key())))?;
        }
        Self::new(main, s, c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a wang id from corner colors (top-left, top-right, bottom-right, bottom-left).
    fn wang(tl: u8, tr: u8, br: u8, bl: u8) -> [u8; 8] {
        [0, tr, 0, br, 0, bl, 0, tl]
    }

    fn full_wangset(kind: WangsetType) -> Wangset {
        let masks = [
            (0, wang(1, 1, 1, 1)),
            (1, wang(2, 2, 1, 2)),
            (2, wang(2, 2, 1, 1)),
            (3, wang(2, 2, 2, 1)),
            (4, wang(2, 1, 1, 2)),
            (5, wang(1, 2, 2, 1)),
            (6, wang(2, 1, 2, 2)),
            (7, wang(1, 1, 2, 2)),
            (8, wang(1, 2, 2, 2)),
            (9, wang(2, 1, 1, 1)),
            (10, wang(1, 1, 1, 2)),
            (11, wang(1, 2, 1, 1)),
            (12, wang(1, 1, 2, 1)),
        ];
        Wangset {
            name: "path".into(),
            kind,
            tiles: masks
                .into_iter()
                .map(|(tile_id, wang_id)| WangTile { tile_id, wang_id })
                .collect(),
        }
    }

    #[test]
    fn derives_every_role_from_corner_set() {
        let tiles = TilesShortcuts::from_wangset(&full_wangset(WangsetType::Corner), 1, 1).unwrap();
        assert_eq!(tiles.main(), 1);
        assert_eq!(tiles.surrounding(Surrounding::TopLeft), 2);
        assert_eq!(tiles.surrounding(Surrounding::TopCenter), 3);
        assert_eq!(tiles.surrounding(Surrounding::TopRight), 4);
        assert_eq!(tiles.surrounding(Surrounding::MiddleLeft), 5);
        assert_eq!(tiles.surrounding(Surrounding::MiddleRight), 6);
        assert_eq!(tiles.surrounding(Surrounding::BottomLeft), 7);
        assert_eq!(tiles.surrounding(Surrounding::BottomCenter), 8);
        assert_eq!(tiles.surrounding(Surrounding::BottomRight), 9);
        assert_eq!(tiles.corner(Corner::BottomRight), 10);
        assert_eq!(tiles.corner(Corner::TopRight), 11);
        assert_eq!(tiles.corner(Corner::BottomLeft), 12);
        assert_eq!(tiles.corner(Corner::TopLeft), 13);
    }

    #[test]
    fn mixed_sets_are_accepted() {
        assert!(TilesShortcuts::from_wangset(&full_wangset(WangsetType::Mixed), 1, 1).is_ok());
    }

    #[test]
    fn edge_sets_are_rejected() {
        let err = TilesShortcuts::from_wangset(&full_wangset(WangsetType::Edge), 1, 1).unwrap_err();
        assert!(matches!(err, Error::UnsupportedWangset(_)));
    }

    #[test]
    fn incomplete_sets_name_missing_role() {
        let mut set = full_wangset(WangsetType::Corner);
        set.tiles.retain(|t| t.tile_id != 12);
        let err = TilesShortcuts::from_wangset(&set, 1, 1).unwrap_err();
        assert!(matches!(err, Error::UnsupportedWangset(ref msg) if msg.contains("-1,-1")));
    }
}
