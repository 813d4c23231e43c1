//! The generation pipeline.
//!
//! Modules:
//! - config: [`GeneratorConfig`] and border tile sets
//! - borders: ground fill, the blocked border ring and the main-path opening
//! - points: change points, return points and the entry point
//!
//! A run builds spot elements, sizes the map, lays ground and borders, places the
//! main path and the elements, routes paths to every element, autotiles the path
//! layer, collects points and composes the final layer list.
pub mod borders;
pub mod config;
pub mod points;

use std::collections::{HashMap, HashSet};

use glam::UVec2;
use rand::RngCore;
use tracing::{debug, info, warn};

pub use borders::{open_main_path_cap, populate_borders, populate_ground, BORDER_LAYER, GROUND_LAYER};
pub use config::{BorderTiles, GeneratorConfig};
pub use points::{collect_points, entry_point, instance_key, ChangePoint, ReturnPoint, CHANGE_POINTS_LAYER_MARKER};

use crate::autotile::autotile;
use crate::compositor::compose;
use crate::error::{Error, Result};
use crate::events::{warn_to, EventSink, GenerationEvent, GenerationEventKind, Stage};
use crate::grid::{Grid, LayerSet, TileLayer};
use crate::path::{
    collect_targets, collision_mask, connect_targets, free_space_mask, stamp_main_path, widen_paths, AStarPathfinder, Connector,
    MainPath, MainPathPlan, Pathfinder, PATH_LAYER_MARKER,
};
use crate::placement::{place_elements, Element, Placement, SkippedPlacement};
use crate::sizing::estimate_map_size;
use crate::spot::SpotGenerator;
use crate::tiles::TilesCatalog;

/// A finished map.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct GeneratedMap {
    pub width: u32,
    pub height: u32,
    /// Composed layers, bottom first.
    pub layers: Vec<TileLayer>,
    pub change_points: Vec<ChangePoint>,
    /// Return points; the entry point comes first.
    pub return_points: Vec<ReturnPoint>,
    pub entry: ReturnPoint,
    pub main_path: MainPath,
    pub placements: Vec<Placement>,
    pub skipped: Vec<SkippedPlacement>,
    /// Path targets that could not be linked to the network.
    pub failed_routes: Vec<UVec2>,
}

impl GeneratedMap {
    pub fn layer(&self, name: &str) -> Option<&TileLayer> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn size(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }
}

/// Grid and layers owned by a single run.
struct GenerationContext {
    grid: Grid,
    ground: TileLayer,
    layers: LayerSet,
    borders: Vec<TileLayer>,
}

impl GenerationContext {
    fn new(width: u32, height: u32, config: &GeneratorConfig, rng: &mut dyn RngCore) -> Self {
        let mut grid = Grid::new(width, height);
        let ground = populate_ground(width, height, config, rng);
        let borders = populate_borders(&mut grid, config);
        Self {
            grid,
            ground,
            layers: LayerSet::new(width, height),
            borders,
        }
    }

    fn into_layers(self) -> Vec<TileLayer> {
        let mut layers = Vec::with_capacity(1 + self.layers.len() + self.borders.len());
        layers.push(self.ground);
        layers.extend(self.layers.into_vec());
        layers.extend(self.borders);
        layers
    }
}

pub struct MapGenerator<'a> {
    /// Configuration applied to every run.
    pub config: GeneratorConfig,
    /// Tile categories for paths, spots and walls.
    pub catalog: &'a TilesCatalog,
    pathfinder: &'a dyn Pathfinder,
}

impl<'a> MapGenerator<'a> {
    /// Validates `config` and checks that every tile category it names is in `catalog`.
    pub fn try_new(config: GeneratorConfig, catalog: &'a TilesCatalog) -> Result<Self> {
        config.validate()?;
        catalog.require(&config.path_tiles_key)?;
        for spot in &config.ground_spots {
            catalog.require(&spot.tiles_key)?;
            if spot.inner_walls || spot.outer_walls {
                catalog.require(&spot.walls_key())?;
            }
        }
        Ok(Self {
            config,
            catalog,
            pathfinder: &AStarPathfinder,
        })
    }

    /// Routes paths with `pathfinder` instead of the bundled A*.
    pub fn with_pathfinder(mut self, pathfinder: &'a dyn Pathfinder) -> Self {
        self.pathfinder = pathfinder;
        self
    }

    /// Generates a map holding `quantities[name]` instances of each element.
    pub fn generate(
        &self,
        elements: &[Element],
        quantities: &HashMap<String, u32>,
        rng: &mut impl RngCore,
    ) -> Result<GeneratedMap> {
        generate_map(
            &self.config,
            self.catalog,
            self.pathfinder,
            elements,
            quantities,
            rng,
            None,
        )
    }

    pub fn generate_with_events(
        &self,
        elements: &[Element],
        quantities: &HashMap<String, u32>,
        rng: &mut impl RngCore,
        sink: &mut dyn EventSink,
    ) -> Result<GeneratedMap> {
        generate_map(
            &self.config,
            self.catalog,
            self.pathfinder,
            elements,
            quantities,
            rng,
            Some(sink),
        )
    }
}

pub fn generate_map<R: RngCore>(
    config: &GeneratorConfig,
    catalog: &TilesCatalog,
    pathfinder: &dyn Pathfinder,
    elements: &[Element],
    quantities: &HashMap<String, u32>,
    rng: &mut R,
    sink: Option<&mut dyn EventSink>,
) -> Result<GeneratedMap> {
    if let Some(s) = sink {
        generate_internal(config, catalog, pathfinder, elements, quantities, rng, s)
    } else {
        generate_internal(config, catalog, pathfinder, elements, quantities, rng, &mut ())
    }
}

fn finish_stage(sink: &mut dyn EventSink, stage: Stage) {
    debug!("stage {:?} finished", stage);
    if sink.wants(GenerationEventKind::StageFinished) {
        sink.send(GenerationEvent::StageFinished { stage });
    }
}

fn resolve_main_path(config: &GeneratorConfig, width: u32, height: u32, rng: &mut dyn RngCore) -> Result<MainPath> {
    let size = config.main_path_size;
    let block = config.block_map_border;
    let main = match &config.main_path {
        MainPathPlan::Random => MainPath::random(width, height, size, block, rng),
        MainPathPlan::Fixed { edge, offset } => MainPath::at(*edge, *offset, size, width, height, block),
        MainPathPlan::OppositeOf(previous) => MainPath::opposite_of(previous, width, height, size, block),
    };
    main.ok_or_else(|| {
        Error::InvalidConfig(format!(
            "main path {:?} of size {} does not fit a {}x{} map",
            config.main_path, size, width, height
        ))
    })
}

fn ensure_unique_names(elements: &[Element]) -> Result<()> {
    let mut seen = HashSet::with_capacity(elements.len());
    for element in elements {
        if !seen.insert(element.name.as_str()) {
            return Err(Error::InvalidConfig(format!(
                "element name '{}' is used more than once",
                element.name
            )));
        }
    }
    Ok(())
}

fn generate_internal(
    config: &GeneratorConfig,
    catalog: &TilesCatalog,
    pathfinder: &dyn Pathfinder,
    elements: &[Element],
    quantities: &HashMap<String, u32>,
    rng: &mut dyn RngCore,
    sink: &mut dyn EventSink,
) -> Result<GeneratedMap> {
    config.validate()?;
    let path_tiles = catalog.require(&config.path_tiles_key)?;
    let path_tile = path_tiles.main();

    let mut all: Vec<Element> = elements.to_vec();
    let mut quantities = quantities.clone();
    let mut collision_markers = config.collision_layers_for_paths.clone();
    let spots = SpotGenerator::new(catalog);
    for spot in &config.ground_spots {
        for element in spots.build_elements(spot, rng)? {
            quantities.insert(element.name.clone(), 1);
            all.push(element);
        }
        if !spot.walkable && !collision_markers.iter().any(|m| m == spot.layer_name()) {
            collision_markers.push(spot.layer_name().to_string());
        }
    }
    ensure_unique_names(&all)?;
    for name in quantities.keys().filter(|n| !all.iter().any(|e| &e.name == *n)) {
        warn!("Quantity given for unknown element '{}'; skipping.", name);
        warn_to(sink, name, "quantity given for an unknown element");
    }
    info!("built {} spot elements", all.len() - elements.len());
    finish_stage(sink, Stage::Spots);

    let estimated = estimate_map_size(&all, &quantities, &config.sizing_params())?;
    let border = u32::from(config.block_map_border);
    let min_side = (config.main_path_size + 2 * border).max(2 + 2 * border);
    let width = estimated.width.max(min_side);
    let height = estimated.height.max(min_side);
    let size = UVec2::new(width, height);
    info!("map size {}x{} for {} element definitions", width, height, all.len());
    if sink.wants(GenerationEventKind::RunStarted) {
        sink.send(GenerationEvent::RunStarted {
            width,
            height,
            element_count: all.len(),
        });
    }
    finish_stage(sink, Stage::Sizing);

    let mut ctx = GenerationContext::new(width, height, config, rng);
    info!("ground and {} border layers ready", ctx.borders.len());
    finish_stage(sink, Stage::Borders);

    let main = resolve_main_path(config, width, height, rng)?;
    stamp_main_path(
        &mut ctx.grid,
        ctx.layers.get_or_create(PATH_LAYER_MARKER),
        &main,
        path_tile,
    );
    info!("main path on {:?} edge at offset {}", main.edge, main.offset);
    finish_stage(sink, Stage::MainPath);

    let outcome = place_elements(
        &mut ctx.grid,
        &mut ctx.layers,
        &all,
        &quantities,
        &config.placement_config(),
        rng,
        sink,
    );
    info!(
        "placed {} element instances, skipped {}",
        outcome.placements.len(),
        outcome.skipped.len()
    );
    finish_stage(sink, Stage::Placement);

    let by_name: HashMap<&str, &Element> = all.iter().map(|e| (e.name.as_str(), e)).collect();
    let targets = collect_targets(&outcome.placements, &by_name, config.target_order(), size);
    let collision = collision_mask(&ctx.layers, &collision_markers, width, height);
    let free_space = free_space_mask(&outcome.placements, width, height);
    let connector = Connector {
        pathfinder,
        collision: &collision,
        free_space: &free_space,
        path_tile,
        straighten_turns: config.straighten_path_turns,
    };
    let path_layer = ctx.layers.get_or_create(PATH_LAYER_MARKER);
    let report = connect_targets(&connector, &mut ctx.grid, path_layer, main.anchor(), &targets, sink);
    let widened = widen_paths(&mut ctx.grid, path_layer, &collision, config.path_size, path_tile);
    info!(
        "routed {} of {} path targets, widened {} cells",
        report.routed,
        targets.len(),
        widened
    );
    finish_stage(sink, Stage::Connection);

    let changed = autotile(&mut path_layer.data, width as usize, height as usize, path_tiles);
    open_main_path_cap(&mut ctx.borders, path_layer, &main);
    info!("autotiled {} path cells", changed);
    finish_stage(sink, Stage::Autotile);

    let (change_points, returns) =
        collect_points(&outcome.placements, &by_name, &config.map_prefix, config.floor, size);
    let entry = entry_point(&main, &config.map_prefix);
    let mut return_points = Vec::with_capacity(returns.len() + 1);
    return_points.push(entry.clone());
    return_points.extend(returns);
    info!(
        "{} change points, {} return points",
        change_points.len(),
        return_points.len()
    );
    finish_stage(sink, Stage::Points);

    let layers = compose(ctx.into_layers(), &config.compositor);
    info!("composed {} layers", layers.len());
    finish_stage(sink, Stage::Composition);

    if sink.wants(GenerationEventKind::RunFinished) {
        sink.send(GenerationEvent::RunFinished {
            layer_count: layers.len(),
            placed: outcome.placements.len(),
            skipped: outcome.skipped.len(),
            failed_routes: report.failed.len(),
        });
    }

    Ok(GeneratedMap {
        width,
        height,
        layers,
        change_points,
        return_points,
        entry,
        main_path: main,
        placements: outcome.placements,
        skipped: outcome.skipped,
        failed_routes: report.failed,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::events::VecSink;
    use crate::path::Edge;
    use crate::spot::GroundSpotConfig;
    use crate::tiles::sequential_shortcuts;

    const PATH: u32 = 100;

    fn catalog() -> TilesCatalog {
        TilesCatalog::new()
            .with("path", sequential_shortcuts(PATH))
            .with("water", sequential_shortcuts(200))
    }

    fn house(name: &str) -> Element {
        let body = TileLayer::from_data("buildings", 3, 3, vec![9, 9, 9, 9, 9, 9, 9, 0, 9]).unwrap();
        let path = TileLayer::from_data("path", 3, 3, vec![0, 0, 0, 0, 0, 0, 0, PATH, 0]).unwrap();
        let door = TileLayer::from_data("change-points", 3, 3, vec![0, 0, 0, 0, 42, 0, 0, 0, 0]).unwrap();
        Element::new(name, vec![body, path, door]).unwrap()
    }

    fn quantities(pairs: &[(&str, u32)]) -> HashMap<String, u32> {
        pairs.iter().map(|(n, q)| (n.to_string(), *q)).collect()
    }

    fn town() -> GeneratorConfig {
        GeneratorConfig::new("town", 1, 2).with_free_space_tiles(2, 1)
    }

    /// Cells of the path layer reachable from the main route over non-zero path cells.
    fn reachable(map: &GeneratedMap) -> HashSet<UVec2> {
        let path = map.layer("path").unwrap();
        let grid = Grid::new(map.width, map.height);
        let mut seen: HashSet<UVec2> = map.main_path.route.iter().copied().collect();
        let mut queue: VecDeque<UVec2> = seen.iter().copied().collect();
        while let Some(p) = queue.pop_front() {
            for n in grid.neighbors4(p) {
                if path.get(n) != 0 && seen.insert(n) {
                    queue.push_back(n);
                }
            }
        }
        seen
    }

    #[test]
    fn same_seed_same_map() {
        let catalog = catalog();
        let generator = MapGenerator::try_new(town(), &catalog).unwrap();
        let elements = vec![house("house"), house("shop")];
        let q = quantities(&[("house", 3), ("shop", 1)]);
        let a = generator.generate(&elements, &q, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = generator.generate(&elements, &q, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a.layers, b.layers);
        assert_eq!(a.placements, b.placements);
    }

    #[test]
    fn every_element_joins_the_main_path() {
        let catalog = catalog();
        let generator = MapGenerator::try_new(town(), &catalog).unwrap();
        let elements = vec![house("house")];
        for seed in 0..5 {
            let map = generator
                .generate(&elements, &quantities(&[("house", 4)]), &mut StdRng::seed_from_u64(seed))
                .unwrap();
            assert!(map.failed_routes.is_empty(), "seed {seed}: {:?}", map.failed_routes);
            let connected = reachable(&map);
            for placement in &map.placements {
                let door_step = placement.position + UVec2::new(1, 2);
                assert!(connected.contains(&door_step), "seed {seed}: {placement:?}");
            }
        }
    }

    #[test]
    fn default_config_connects_elements_with_blocked_margins() {
        let catalog = catalog();
        let generator = MapGenerator::try_new(GeneratorConfig::new("town", 1, 2), &catalog).unwrap();
        let elements = vec![house("house")];
        for seed in 0..10 {
            let map = generator
                .generate(&elements, &quantities(&[("house", 3)]), &mut StdRng::seed_from_u64(seed))
                .unwrap();
            assert!(!map.placements.is_empty());
            assert!(map.failed_routes.is_empty(), "seed {seed}: {:?}", map.failed_routes);
            let connected = reachable(&map);
            for placement in &map.placements {
                assert!(connected.contains(&(placement.position + UVec2::new(1, 2))));
            }
        }
    }

    #[test]
    fn layers_are_ground_then_elements_then_border() {
        let catalog = catalog();
        let generator = MapGenerator::try_new(town(), &catalog).unwrap();
        let map = generator
            .generate(&[house("house")], &quantities(&[("house", 1)]), &mut StdRng::seed_from_u64(3))
            .unwrap();
        let names: Vec<&str> = map.layers.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names.first(), Some(&GROUND_LAYER));
        assert_eq!(names.last(), Some(&BORDER_LAYER));
        assert!(names.contains(&"path"));
        assert!(names.contains(&"buildings"));
        for layer in &map.layers {
            assert_eq!(layer.data.len(), (map.width * map.height) as usize);
        }
    }

    #[test]
    fn main_path_opens_the_border() {
        let catalog = catalog();
        let config = town().with_main_path(MainPathPlan::Fixed {
            edge: Edge::Top,
            offset: 2,
        });
        let generator = MapGenerator::try_new(config, &catalog).unwrap();
        let map = generator
            .generate(&[house("house")], &quantities(&[("house", 1)]), &mut StdRng::seed_from_u64(5))
            .unwrap();
        let border = map.layer(BORDER_LAYER).unwrap();
        let path = map.layer("path").unwrap();
        for x in 2..5 {
            assert_eq!(border.get(UVec2::new(x, 0)), 0);
            assert_ne!(path.get(UVec2::new(x, 0)), 0);
        }
        assert_eq!(map.entry.direction, crate::path::Direction::Down);
        assert_eq!((map.entry.x, map.entry.y), (3, 1));
        assert_eq!(map.return_points[0], map.entry);
    }

    #[test]
    fn doors_become_change_points() {
        let catalog = catalog();
        let generator = MapGenerator::try_new(town(), &catalog).unwrap();
        let map = generator
            .generate(&[house("house")], &quantities(&[("house", 2)]), &mut StdRng::seed_from_u64(8))
            .unwrap();
        assert_eq!(map.change_points.len(), map.placements.len());
        let mut keys: Vec<&str> = map.change_points.iter().map(|c| c.key.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(keys[0], "town-house-n1");
    }

    #[test]
    fn stairs_lead_to_the_next_floor() {
        let catalog = catalog();
        let generator = MapGenerator::try_new(town().with_floor(1), &catalog).unwrap();
        let map = generator
            .generate(
                &[house("stairs-up")],
                &quantities(&[("stairs-up", 1)]),
                &mut StdRng::seed_from_u64(2),
            )
            .unwrap();
        assert_eq!(map.change_points[0].key, "town-floor-2");
    }

    #[test]
    fn spots_are_generated_and_placed() {
        let catalog = catalog();
        let config = town().with_ground_spot(GroundSpotConfig::new("water", 8, 8, 60.0).with_quantity(2));
        let generator = MapGenerator::try_new(config, &catalog).unwrap();
        let map = generator
            .generate(&[house("house")], &quantities(&[("house", 1)]), &mut StdRng::seed_from_u64(6))
            .unwrap();
        let spot_placements = map.placements.iter().filter(|p| p.element.starts_with("water-")).count();
        assert_eq!(spot_placements, 2);
        assert!(map.layer("water").is_some_and(|l| !l.is_empty()));
    }

    #[test]
    fn missing_path_tiles_fail_early() {
        let catalog = TilesCatalog::new();
        let err = MapGenerator::try_new(town(), &catalog).err().unwrap();
        assert!(matches!(err, Error::MissingTiles { .. }));
    }

    #[test]
    fn duplicate_element_names_are_rejected() {
        let catalog = catalog();
        let generator = MapGenerator::try_new(town(), &catalog).unwrap();
        let err = generator
            .generate(
                &[house("house"), house("house")],
                &quantities(&[("house", 1)]),
                &mut StdRng::seed_from_u64(1),
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn no_elements_is_an_error() {
        let catalog = catalog();
        let generator = MapGenerator::try_new(town(), &catalog).unwrap();
        let err = generator
            .generate(&[], &quantities(&[("house", 1)]), &mut StdRng::seed_from_u64(1))
            .unwrap_err();
        assert!(matches!(err, Error::MissingElements));
    }

    #[test]
    fn events_report_every_stage() {
        let catalog = catalog();
        let generator = MapGenerator::try_new(town(), &catalog).unwrap();
        let mut sink = VecSink::new();
        let map = generator
            .generate_with_events(
                &[house("house")],
                &quantities(&[("house", 2), ("ghost", 1)]),
                &mut StdRng::seed_from_u64(4),
                &mut sink,
            )
            .unwrap();
        assert_eq!(sink.count(GenerationEventKind::StageFinished), 9);
        assert_eq!(sink.count(GenerationEventKind::RunStarted), 1);
        assert_eq!(sink.count(GenerationEventKind::RunFinished), 1);
        assert_eq!(sink.count(GenerationEventKind::Warning), 1);
        assert_eq!(sink.count(GenerationEventKind::ElementPlaced), map.placements.len());
    }
}
