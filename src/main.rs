//! Headless herd demo
//!
//! Usage: `fauna [scene.ron|scene.json]`. Without a scene a small demo herd
//! roams a valley with a lake and a rock field. Every few hundred ticks one
//! creature in turn is sent toward the valley center, made to jump, fed and
//! scared.

use std::path::Path;

use fauna::prelude::*;

/// Cells per side of the demo terrain
const FIELD_CELLS: usize = 160;
/// World units per terrain cell
const CELL_SIZE: f32 = 256.0;
/// Lake surface height
const LAKE_LEVEL: f32 = 0.0;
/// Water depth at which the obstacle grid marks a cell as water
const DEEP_WATER: f32 = 180.0;
/// Ticks between scripted herd events
const EVENT_PERIOD: u64 = 500;
/// How long a scare lasts (ms)
const SCARE_MS: f32 = 2_000.0;

fn demo_terrain() -> HeightField {
    let center = Vec2::splat(FIELD_CELLS as f32 * CELL_SIZE * 0.5);
    let mut field = HeightField::from_fn(FIELD_CELLS, FIELD_CELLS, CELL_SIZE, |x, z| {
        let from_lake = Vec2::new(x, z).distance(center + Vec2::new(6000.0, 0.0));
        let hills = (x * 0.0007).sin() * 300.0 + (z * 0.0005).cos() * 250.0;
        hills + (from_lake - 3000.0).clamp(-800.0, 600.0)
    });
    field.flood_below(LAKE_LEVEL);
    field
}

fn demo_obstacles(terrain: &HeightField) -> ObstacleGrid {
    let rocks = Vec2::splat(FIELD_CELLS as f32 * CELL_SIZE * 0.5) - Vec2::new(5000.0, 4000.0);
    let mut grid = ObstacleGrid::new(FIELD_CELLS, FIELD_CELLS, CELL_SIZE);
    grid.block_where(|p| p.distance(rocks) < 1500.0 && ((p.x + p.y) / CELL_SIZE) as i32 % 3 == 0);
    grid.mark_water_where(|p| terrain.water_depth(p.x, p.y) > DEEP_WATER);
    grid
}

fn demo_herd() -> HerdScene {
    let mut scene = HerdScene::new("Valley");
    scene.add_species(SpeciesProfile::new("deer"));
    let mut boar = SpeciesProfile::new("boar").with_own_gaits();
    boar.blocked_by_water = true;
    scene.add_species(boar);

    let mid = FIELD_CELLS as f32 * CELL_SIZE * 0.5;
    for (i, species) in ["deer", "deer", "deer", "boar", "boar"].into_iter().enumerate() {
        let offset = i as f32 * 900.0;
        scene.add_spawn(
            CreatureSpawn::new(
                format!("{species}-{i}"),
                species,
                Vec3::new(mid - 8000.0 + offset, 0.0, mid - 2000.0 + offset * 0.5),
            )
            .with_heading(i as f32 * 1.3)
            .with_scale(if species == "boar" { 0.8 } else { 1.0 }),
        );
    }
    scene
}

fn load_scene(path: &str) -> Result<HerdScene, SceneError> {
    let is_json = Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        HerdScene::load_json(path)
    } else {
        HerdScene::load_ron(path)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let scene = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading scene from {path}");
            load_scene(&path)?
        }
        None => demo_herd(),
    };
    scene.validate()?;

    let config = SimulationConfig::default().with_ticks(3_000);
    let terrain = demo_terrain();
    let obstacles = demo_obstacles(&terrain);
    let mut sim = Simulation::from_scene(&config, &scene, terrain, obstacles)?;

    let herd = sim.entities();
    let mid = FIELD_CELLS as f32 * CELL_SIZE * 0.5;
    let (mut jumps, mut meals, mut scares) = (0, 0, 0);
    let mut slides = 0;
    let mut transitions = 0;
    for _ in 0..config.ticks {
        let turn = (sim.tick() / EVENT_PERIOD) as usize;
        if let Some(&creature) = herd.get(turn % herd.len().max(1)) {
            match sim.tick() % EVENT_PERIOD {
                0 => {
                    sim.pursue(creature, Vec2::new(mid, mid));
                }
                100 => {
                    if sim.start_jump(creature) == Some(Transition::To(Phase::Jump)) {
                        jumps += 1;
                    }
                }
                200 => {
                    sim.stop_pursuit(creature);
                    if sim.start_eating(creature) == Some(Transition::To(Phase::Eat)) {
                        meals += 1;
                    }
                }
                300 => {
                    sim.finish_eating(creature);
                }
                400 => {
                    if sim.set_fear(creature, SCARE_MS) {
                        scares += 1;
                    }
                }
                _ => {}
            }
        }

        sim.step(config.tick_ms);
        for event in sim.events().iter() {
            match event {
                CreatureEvent::SlideStarted { .. } => slides += 1,
                CreatureEvent::PhaseChanged { .. } => transitions += 1,
                _ => {}
            }
        }
    }

    log::info!(
        "{} ticks: {transitions} phase changes, {slides} slides",
        sim.tick()
    );
    log::info!("scripted: {jumps} jumps, {meals} meals, {scares} scares");
    for (name, position, phase) in sim.summaries() {
        log::info!(
            "{name}: {phase} at ({:.0}, {:.0}, {:.0})",
            position.x,
            position.y,
            position.z
        );
    }

    Ok(())
}
