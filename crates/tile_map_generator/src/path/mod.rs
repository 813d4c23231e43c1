//! Path network: the main entrance path, A* routing and path widening.
//!
//! Modules:
//! - main_path: edge selection and the main path run
//! - pathfinder: the [`Pathfinder`] seam and its A* implementation
//! - network: target collection, routing, straightening and widening
pub mod main_path;
pub mod network;
pub mod pathfinder;

pub use main_path::{Direction, Edge, MainPath, MainPathPlan};
pub use network::{
    collect_targets, collision_mask, connect_targets, free_space_mask, stamp_main_path, widen_paths, ConnectReport, Connector,
    TargetOrder, PATH_LAYER_MARKER,
};
pub use pathfinder::{manhattan, AStarPathfinder, Pathfinder};
