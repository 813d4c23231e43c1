//! The fixed rule cascade that turns a binary main-tile mask into bordered artwork.
//!
//! Stages, in order:
//! 1. gap closing: one- and two-cell gaps between main tiles are filled, repeated until
//!    stable (bounded by [`GAP_CLOSING_MAX_ITERATIONS`]);
//! 2. edges: empty cells orthogonally next to main tiles get side borders;
//! 3. outer corners: empty cells diagonal to main tiles get corner borders;
//! 4. inner corners: side borders with main tiles on two orthogonal sides become
//!    inner-corner tiles.
//!
//! A cell with main tiles on two opposite diagonals is resolved by rule order.
use tracing::debug;

use super::rules::{apply_horizontal_rules, apply_vertical_rules, RuleTable};
use crate::tiles::{Corner, Surrounding, TilesShortcuts};

pub const GAP_CLOSING_MAX_ITERATIONS: usize = 8;

/// Precompiled rule tables for one tile category.
#[derive(Debug, Clone)]
pub struct AutotileCascade {
    gaps: RuleTable,
    edges_horizontal: RuleTable,
    edges_vertical: RuleTable,
    outer_corners: RuleTable,
    inner_corners: RuleTable,
}

impl AutotileCascade {
    pub fn new(tiles: &TilesShortcuts) -> Self {
        use Surrounding::*;

        let p = tiles.main();
        let s = |pos: Surrounding| tiles.surrounding(pos);
        let c = |corner: Corner| tiles.corner(corner);

        let gaps = RuleTable::new()
            .with_rule([p, 0, p], [p, p, p])
            .with_rule([p, 0, 0, p], [p, p, p, p]);

        let edges_horizontal = RuleTable::new()
            .with_rule([0, p], [s(MiddleLeft), p])
            .with_rule([p, 0], [p, s(MiddleRight)]);

        // Vertical patterns are written top to bottom.
        let edges_vertical = RuleTable::new()
            .with_rule([0, p], [s(TopCenter), p])
            .with_rule([p, 0], [p, s(BottomCenter)]);

        let outer_corners = RuleTable::new()
            .with_rule([0, s(MiddleLeft)], [s(TopLeft), s(MiddleLeft)])
            .with_rule([0, s(MiddleRight)], [s(TopRight), s(MiddleRight)])
            .with_rule([s(MiddleLeft), 0], [s(MiddleLeft), s(BottomLeft)])
            .with_rule([s(MiddleRight), 0], [s(MiddleRight), s(BottomRight)]);

        let inner_corners = RuleTable::new()
            .with_rule([s(MiddleLeft), p], [c(Corner::BottomRight), p])
            .with_rule([s(MiddleRight), p], [c(Corner::BottomLeft), p])
            .with_rule([p, s(MiddleLeft)], [p, c(Corner::TopRight)])
            .with_rule([p, s(MiddleRight)], [p, c(Corner::TopLeft)]);

        Self {
            gaps,
            edges_horizontal,
            edges_vertical,
            outer_corners,
            inner_corners,
        }
    }

    /// Closes gaps until nothing changes. Returns the number of changed cells.
    pub fn close_gaps(&self, data: &mut [u32], width: usize, height: usize) -> usize {
        let mut total = 0;
        for _ in 0..GAP_CLOSING_MAX_ITERATIONS {
            let changed = apply_horizontal_rules(data, width, &self.gaps)
                + apply_vertical_rules(data, width, height, &self.gaps);
            total += changed;
            if changed == 0 {
                break;
            }
        }
        total
    }

    /// Runs the whole cascade in place. Returns the number of changed cells.
    pub fn apply(&self, data: &mut [u32], width: usize, height: usize) -> usize {
        debug_assert_eq!(data.len(), width * height);
        let gaps = self.close_gaps(data, width, height);
        let edges = apply_horizontal_rules(data, width, &self.edges_horizontal)
            + apply_vertical_rules(data, width, height, &self.edges_vertical);
        let outer = apply_vertical_rules(data, width, height, &self.outer_corners);
        let inner = apply_vertical_rules(data, width, height, &self.inner_corners);
        debug!(
            "autotile cascade: {} gap, {} edge, {} outer corner, {} inner corner cells",
            gaps, edges, outer, inner
        );
        gaps + edges + outer + inner
    }
}
