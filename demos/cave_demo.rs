//! Demonstration of the full generation pipeline

use rust_voxel_caves::*;

fn main() -> Result<()> {
    env_logger::init();

    println!("Generating cave...");

    let tunnel = ParticleConfig {
        length: 120,
        hurst: 0.85,
        step_length: 1,
        radius: 2,
        edge_size: 3,
        carve_percent: 70,
    };

    let config = MapConfigBuilder::new()
        .seed_text("demo")
        .dimensions(48, 32, 48)?
        .edge_size(2)?
        .fill_percent(46)?
        .smooth_iterations(5)?
        .only_one_room(false)
        .connect_rooms(true)
        .passage_radius(2)?
        .particle(tunnel)?
        .build()?;

    let map = CaveMap::generate(config)?;

    println!("\nMap statistics:");
    println!("  Open cells:  {}", map.open_cell_count());
    println!("  Wall cells:  {}", map.wall_cell_count());
    println!("  Rooms found: {}", map.room_count());

    let passages = map
        .debug_lines()
        .iter()
        .filter(|l| l.kind == DebugLineKind::Passage)
        .count();
    let path_segments = map.debug_lines().len() - passages;
    println!("  Debug lines: {} passage(s), {} path segment(s)", passages, path_segments);

    // A handful of seeds to compare density
    println!("\n=== Seed comparison ===");
    for seed in [1u64, 2, 3, 4, 5] {
        let config = MapConfigBuilder::new()
            .seed(seed)
            .dimensions(32, 32, 32)?
            .edge_size(2)?
            .fill_percent(45)?
            .build()?;
        let map = CaveMap::generate(config)?;
        println!(
            "seed {}: {} open cells, {} room(s)",
            seed,
            map.open_cell_count(),
            map.room_count()
        );
    }

    Ok(())
}
