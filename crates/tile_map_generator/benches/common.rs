//! Fixtures shared by the generator benches.
use std::time::Duration;

use criterion::{Criterion, Throughput};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tile_map_generator::tiles::TilesShortcuts;

/// Main path tile of every bench tileset.
pub const PATH: u32 = 1;

/// Short runs; a full generation takes milliseconds, so 15 samples settle quickly.
pub fn map_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(15)
        .warm_up_time(Duration::from_millis(500))
        .measurement_time(Duration::from_secs(3))
}

/// Shortcuts numbered upwards from `main`: sides `main + 1..=main + 8`, corners
/// `main + 9..=main + 12`.
pub fn shortcuts(main: u32) -> TilesShortcuts {
    let sides = std::array::from_fn(|i| main + 1 + i as u32);
    let corners = std::array::from_fn(|i| main + 9 + i as u32);
    TilesShortcuts::new(main, sides, corners).expect("distinct tiles")
}

pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Cells of a square map.
#[allow(dead_code)]
pub fn square_map(side: u32) -> Throughput {
    Throughput::Elements(u64::from(side) * u64::from(side))
}

/// Element instances requested per generation.
#[allow(dead_code)]
pub fn instances(count: u32) -> Throughput {
    Throughput::Elements(u64::from(count.max(1)))
}
