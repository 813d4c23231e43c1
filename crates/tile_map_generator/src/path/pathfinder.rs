//! Shortest-path search over the occupancy grid.
use std::collections::BTreeSet;

use glam::UVec2;

use crate::grid::Grid;

/// Finds 4-connected routes over walkable cells.
pub trait Pathfinder {
    /// Route from `start` to `goal`, both included. Empty when no route exists or
    /// either endpoint is not walkable.
    fn find_path(&self, grid: &Grid, start: UVec2, goal: UVec2) -> Vec<UVec2>;
}

/// A* with a Manhattan heuristic and deterministic tie-breaking (lower `f`, then lower
/// `h`, then row-major position).
#[derive(Debug, Clone, Copy, Default)]
pub struct AStarPathfinder;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    f: u32,
    h: u32,
    y: u32,
    x: u32,
}

impl Pathfinder for AStarPathfinder {
    fn find_path(&self, grid: &Grid, start: UVec2, goal: UVec2) -> Vec<UVec2> {
        if !grid.is_walkable(start) || !grid.is_walkable(goal) {
            return Vec::new();
        }
        if start == goal {
            return vec![start];
        }
        let Some(start_idx) = grid.index(start) else {
            return Vec::new();
        };

        let len = grid.width() as usize * grid.height() as usize;
        let mut g_score = vec![u32::MAX; len];
        let mut came_from = vec![usize::MAX; len];
        let mut closed = vec![false; len];
        let mut open_set = BTreeSet::new();

        let h = manhattan(start, goal);
        open_set.insert(OpenNode {
            f: h,
            h,
            y: start.y,
            x: start.x,
        });
        g_score[start_idx] = 0;

        while let Some(curr) = open_set.pop_first() {
            let p = UVec2::new(curr.x, curr.y);
            let Some(idx) = grid.index(p) else {
                continue;
            };
            if closed[idx] {
                continue;
            }
            closed[idx] = true;
            if p == goal {
                return reconstruct_path(grid, &came_from, start_idx, idx);
            }
            let cur_g = g_score[idx];
            for n in grid.neighbors4(p) {
                if !grid.is_walkable(n) {
                    continue;
                }
                let Some(n_idx) = grid.index(n) else {
                    continue;
                };
                let tg = cur_g + 1;
                if tg < g_score[n_idx] {
                    came_from[n_idx] = idx;
                    g_score[n_idx] = tg;
                    let h = manhattan(n, goal);
                    open_set.insert(OpenNode {
                        f: tg + h,
                        h,
                        y: n.y,
                        x: n.x,
                    });
                }
            }
        }
        Vec::new()
    }
}

fn reconstruct_path(grid: &Grid, came_from: &[usize], start: usize, goal: usize) -> Vec<UVec2> {
    let mut idx = goal;
    let mut result = vec![grid.position(idx)];
    while idx != start {
        idx = came_from[idx];
        if idx == usize::MAX {
            return Vec::new();
        }
        result.push(grid.position(idx));
    }
    result.reverse();
    result
}

pub fn manhattan(a: UVec2, b: UVec2) -> u32 {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y)
}
