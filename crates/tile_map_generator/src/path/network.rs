//! Connecting element path anchors to the main path, and widening the result.
use std::collections::HashMap;

use glam::{IVec2, UVec2};
use tracing::{debug, warn};

use super::pathfinder::{manhattan, Pathfinder};
use super::MainPath;
use crate::events::{EventSink, GenerationEvent, GenerationEventKind};
use crate::grid::{Grid, LayerSet, TileLayer, NEIGHBORS_8};
use crate::placement::{Element, Placement};

/// Layer-name marker for element cells that must be linked to the network.
pub const PATH_LAYER_MARKER: &str = "path";

/// Order in which targets are routed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TargetOrder {
    /// Placement order.
    #[default]
    Placement,
    /// Closest to the map centre first.
    CenterDistance,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectReport {
    /// Targets linked to the network.
    pub routed: usize,
    /// Targets no route could be found for.
    pub failed: Vec<UVec2>,
}

/// Cells covered by layers whose name contains any of `markers`.
pub fn collision_mask(layers: &LayerSet, markers: &[String], width: u32, height: u32) -> Vec<bool> {
    let mut mask = vec![false; width as usize * height as usize];
    for layer in layers
        .iter()
        .filter(|l| markers.iter().any(|m| !m.is_empty() && l.name.contains(m.as_str())))
    {
        for (i, tile) in layer.data.iter().enumerate() {
            if *tile != 0 && i < mask.len() {
                mask[i] = true;
            }
        }
    }
    mask
}

/// Margin cells around every placement, outside its footprint.
///
/// Placement blocks these cells unless the element allows paths in its free space;
/// routing still has to cross them to leave the element.
pub fn free_space_mask(placements: &[Placement], width: u32, height: u32) -> Vec<bool> {
    let mut mask = vec![false; width as usize * height as usize];
    let bounds = UVec2::new(width, height);
    for placement in placements.iter().filter(|p| p.margin > 0) {
        let footprint = placement.footprint();
        for cell in placement.reserved(bounds).cells().filter(|c| !footprint.contains(*c)) {
            if cell.x < width && cell.y < height {
                mask[(cell.y * width + cell.x) as usize] = true;
            }
        }
    }
    mask
}

/// Map cells of every placed element's path-layer tiles.
pub fn collect_targets(
    placements: &[Placement],
    elements: &HashMap<&str, &Element>,
    order: TargetOrder,
    map_size: UVec2,
) -> Vec<UVec2> {
    let mut targets: Vec<UVec2> = placements
        .iter()
        .filter_map(|p| elements.get(p.element.as_str()).map(|e| (p, *e)))
        .flat_map(|(p, e)| {
            e.cells_in_layers(PATH_LAYER_MARKER)
                .map(move |(local, _)| p.position + local)
        })
        .collect();
    if order == TargetOrder::CenterDistance {
        let center = map_size / 2;
        targets.sort_by_key(|t| manhattan(*t, center));
    }
    targets.dedup();
    targets
}

/// Writes the main path route and cap into the path layer and blocks those cells.
pub fn stamp_main_path(grid: &mut Grid, path_layer: &mut TileLayer, main: &MainPath, path_tile: u32) {
    for p in main.route.iter().chain(&main.cap) {
        path_layer.set(*p, path_tile);
        grid.block(*p);
    }
}

/// Everything [`connect_targets`] needs besides the grid and layer it edits.
pub struct Connector<'a, P: Pathfinder + ?Sized> {
    pub pathfinder: &'a P,
    pub collision: &'a [bool],
    /// Reserved margins around placed elements; routes may cross them.
    pub free_space: &'a [bool],
    pub path_tile: u32,
    /// Fill the outer elbow of L-turns so turns read as wide curves.
    pub straighten_turns: bool,
}

impl<P: Pathfinder + ?Sized> Connector<'_, P> {
    /// Search grid: free cells, free-space margins and existing path cells, minus
    /// collision cells, with both endpoints opened.
    fn search_grid(&self, grid: &Grid, path_layer: &TileLayer, from: UVec2, to: UVec2) -> Grid {
        let mut search = Grid::new(grid.width(), grid.height());
        for (i, tile) in path_layer.data.iter().enumerate() {
            let p = search.position(i);
            let passable = grid.is_walkable(p) || *tile != 0 || self.free_space.get(i).copied().unwrap_or(false);
            let open = passable && !self.collision.get(i).copied().unwrap_or(false);
            if !open {
                search.block(p);
            }
        }
        search.set_walkable(from, true);
        search.set_walkable(to, true);
        search
    }

    fn route(&self, grid: &Grid, path_layer: &TileLayer, from: UVec2, to: UVec2) -> Vec<UVec2> {
        let search = self.search_grid(grid, path_layer, from, to);
        self.pathfinder.find_path(&search, from, to)
    }

    fn is_free(&self, grid: &Grid, p: UVec2) -> bool {
        grid.is_walkable(p)
            && grid
                .index(p)
                .is_some_and(|i| !self.collision.get(i).copied().unwrap_or(false))
    }

    fn stamp(&self, grid: &mut Grid, path_layer: &mut TileLayer, route: &[UVec2]) {
        for (i, p) in route.iter().enumerate() {
            path_layer.set(*p, self.path_tile);
            grid.block(*p);
            if self.straighten_turns && i >= 2 {
                let (a, b, c) = (route[i - 2], route[i - 1], *p);
                if a.x != c.x && a.y != c.y {
                    let elbow: IVec2 = a.as_ivec2() + c.as_ivec2() - b.as_ivec2();
                    if elbow.x >= 0 && elbow.y >= 0 {
                        let elbow = elbow.as_uvec2();
                        if self.is_free(grid, elbow) {
                            path_layer.set(elbow, self.path_tile);
                            grid.block(elbow);
                        }
                    }
                }
            }
        }
    }
}

/// Routes each target to `anchor`, stamping successful routes as path.
///
/// When a target cannot reach the anchor it is routed to the next not-yet-processed
/// target instead, which joins it to the network once that target is routed.
pub fn connect_targets<P: Pathfinder + ?Sized>(
    connector: &Connector<'_, P>,
    grid: &mut Grid,
    path_layer: &mut TileLayer,
    anchor: UVec2,
    targets: &[UVec2],
    sink: &mut dyn EventSink,
) -> ConnectReport {
    let mut report = ConnectReport::default();
    for (i, target) in targets.iter().enumerate() {
        let mut route = connector.route(grid, path_layer, *target, anchor);
        if route.is_empty() {
            route = targets[i + 1..]
                .iter()
                .filter(|other| *other != target)
                .map(|other| connector.route(grid, path_layer, *target, *other))
                .find(|r| !r.is_empty())
                .unwrap_or_default();
        }
        if route.is_empty() {
            warn!("No route from ({}, {}) to the path network.", target.x, target.y);
            if sink.wants(GenerationEventKind::RouteFailed) {
                sink.send(GenerationEvent::RouteFailed { target: *target });
            }
            report.failed.push(*target);
            continue;
        }
        connector.stamp(grid, path_layer, &route);
        report.routed += 1;
    }
    debug!(
        "connected {} targets, {} failed",
        report.routed,
        report.failed.len()
    );
    report
}

/// Grows every path cell into free 8-neighbours, `path_size - 1` times.
///
/// Each round reads a snapshot, so growth is exactly one cell per round.
pub fn widen_paths(grid: &mut Grid, path_layer: &mut TileLayer, collision: &[bool], path_size: u32, path_tile: u32) -> usize {
    let mut widened = 0;
    for _ in 1..path_size.max(1) {
        let cells: Vec<UVec2> = path_layer.non_zero().map(|(p, _)| p).collect();
        for cell in cells {
            for d in NEIGHBORS_8 {
                let Some(n) = grid.offset(cell, d) else {
                    continue;
                };
                let Some(idx) = grid.index(n) else {
                    continue;
                };
                if grid.is_walkable(n) && !collision.get(idx).copied().unwrap_or(false) && path_layer.data[idx] == 0 {
                    path_layer.data[idx] = path_tile;
                    grid.block(n);
                    widened += 1;
                }
            }
        }
    }
    widened
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::VecSink;
    use crate::grid::Rect;
    use crate::path::AStarPathfinder;

    const P: u32 = 9;

    fn connector<'a>(collision: &'a [bool]) -> Connector<'a, AStarPathfinder> {
        Connector {
            pathfinder: &AStarPathfinder,
            collision,
            free_space: &[],
            path_tile: P,
            straighten_turns: false,
        }
    }

    #[test]
    fn routes_target_to_anchor_through_blocked_endpoints() {
        let mut grid = Grid::new(8, 8);
        let mut layer = TileLayer::new("path", 8, 8);
        grid.block(UVec2::new(1, 1));
        grid.block(UVec2::new(6, 6));
        let collision = vec![false; 64];
        let report = connect_targets(
            &connector(&collision),
            &mut grid,
            &mut layer,
            UVec2::new(6, 6),
            &[UVec2::new(1, 1)],
            &mut (),
        );
        assert_eq!(report.routed, 1);
        assert_eq!(layer.non_zero_count(), 11);
        assert_eq!(layer.get(UVec2::new(1, 1)), P);
        assert!(layer.non_zero().all(|(p, _)| !grid.is_walkable(p)));
    }

    #[test]
    fn routes_leave_elements_through_their_free_space() {
        let (w, h) = (10, 8);
        let mut grid = Grid::new(w, h);
        let mut layer = TileLayer::new("path", w, h);
        let placement = Placement::new("house", 1, UVec2::new(2, 2), UVec2::new(3, 3), 1);
        // Footprint and margin ring blocked, as placement leaves them.
        grid.block_rect(&placement.reserved(grid.size()));
        let collision = vec![false; (w * h) as usize];
        let target = UVec2::new(3, 4);

        let sealed = connect_targets(&connector(&collision), &mut grid, &mut layer, UVec2::new(8, 6), &[target], &mut ());
        assert_eq!(sealed.failed, vec![target]);

        let free_space = free_space_mask(&[placement], w, h);
        assert!(free_space[(5 * w + 3) as usize]);
        assert!(!free_space[(3 * w + 3) as usize]);
        let mut c = connector(&collision);
        c.free_space = &free_space;
        let report = connect_targets(&c, &mut grid, &mut layer, UVec2::new(8, 6), &[target], &mut ());
        assert_eq!(report.routed, 1);
        assert!(report.failed.is_empty());
        assert_eq!(layer.get(UVec2::new(3, 5)), P);
        assert_eq!(layer.get(UVec2::new(3, 3)), 0);
    }

    #[test]
    fn collision_cells_are_avoided() {
        let mut grid = Grid::new(6, 3);
        let mut layer = TileLayer::new("path", 6, 3);
        let mut collision = vec![false; 18];
        for y in 0..2 {
            collision[y * 6 + 3] = true;
        }
        let report = connect_targets(
            &connector(&collision),
            &mut grid,
            &mut layer,
            UVec2::new(5, 0),
            &[UVec2::new(0, 0)],
            &mut (),
        );
        assert_eq!(report.routed, 1);
        assert_eq!(layer.get(UVec2::new(3, 2)), P);
        assert_eq!(layer.get(UVec2::new(3, 0)), 0);
    }

    #[test]
    fn unreachable_target_is_reported() {
        let mut grid = Grid::new(7, 7);
        let mut layer = TileLayer::new("path", 7, 7);
        // Wall off the top-left corner cell completely.
        grid.block_rect(&Rect::new(0, 2, 3, 1));
        grid.block_rect(&Rect::new(2, 0, 1, 2));
        let collision = vec![false; 49];
        let mut sink = VecSink::new();
        let report = connect_targets(
            &connector(&collision),
            &mut grid,
            &mut layer,
            UVec2::new(6, 6),
            &[UVec2::new(0, 0)],
            &mut sink,
        );
        assert_eq!(report.failed, vec![UVec2::new(0, 0)]);
        assert_eq!(sink.count(GenerationEventKind::RouteFailed), 1);
        assert!(layer.is_empty());
    }

    #[test]
    fn failed_target_falls_back_to_another_target() {
        let mut grid = Grid::new(9, 5);
        let mut layer = TileLayer::new("path", 9, 5);
        // Column 4 splits the map; the anchor sits on the right.
        grid.block_rect(&Rect::new(4, 0, 1, 5));
        let collision = vec![false; 45];
        let report = connect_targets(
            &connector(&collision),
            &mut grid,
            &mut layer,
            UVec2::new(8, 2),
            &[UVec2::new(0, 0), UVec2::new(2, 4)],
            &mut (),
        );
        // The first target joins the second; the second still cannot reach the anchor.
        assert_eq!(report.routed, 1);
        assert_eq!(report.failed, vec![UVec2::new(2, 4)]);
        assert_eq!(layer.get(UVec2::new(2, 4)), P);
    }

    #[test]
    fn straightening_fills_turn_elbows() {
        let mut grid = Grid::new(5, 5);
        let mut layer = TileLayer::new("path", 5, 5);
        let collision = vec![false; 25];
        let mut c = connector(&collision);
        c.straighten_turns = true;
        c.stamp(
            &mut grid,
            &mut layer,
            &[UVec2::new(0, 0), UVec2::new(1, 0), UVec2::new(1, 1)],
        );
        assert_eq!(layer.get(UVec2::new(0, 1)), P);
    }

    #[test]
    fn widening_grows_one_cell_per_round() {
        let mut grid = Grid::new(7, 7);
        let mut layer = TileLayer::new("path", 7, 7);
        layer.set(UVec2::new(3, 3), P);
        let collision = vec![false; 49];
        let widened = widen_paths(&mut grid, &mut layer, &collision, 2, P);
        assert_eq!(widened, 8);
        assert_eq!(layer.get(UVec2::new(1, 3)), 0);
        widen_paths(&mut grid, &mut layer, &collision, 2, P);
        assert_eq!(layer.get(UVec2::new(1, 3)), P);
        assert!(!grid.is_walkable(UVec2::new(2, 2)));
    }

    #[test]
    fn targets_come_from_path_layers() {
        let layers = vec![
            TileLayer::filled("house-base", 3, 2, 1),
            TileLayer::from_data("house-path", 3, 2, vec![0, 0, 0, 0, 7, 0]).unwrap(),
        ];
        let house = Element::new("house", layers).unwrap();
        let elements: HashMap<&str, &Element> = [("house", &house)].into_iter().collect();
        let placements = vec![Placement::new("house", 1, UVec2::new(4, 5), UVec2::new(3, 2), 0)];
        let targets = collect_targets(&placements, &elements, TargetOrder::Placement, UVec2::splat(20));
        assert_eq!(targets, vec![UVec2::new(5, 6)]);
    }

    #[test]
    fn collision_mask_matches_substrings() {
        let mut set = LayerSet::new(2, 1);
        set.get_or_create("lake").set(UVec2::ZERO, 3);
        set.get_or_create("house-collisions").set(UVec2::new(1, 0), 4);
        let mask = collision_mask(&set, &["collisions".to_string()], 2, 1);
        assert_eq!(mask, vec![false, true]);
    }
}
