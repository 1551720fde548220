//! Demonstration of the dual-grid scaffold output

use rust_voxel_caves::*;

fn main() -> Result<()> {
    env_logger::init();

    let config = MapConfigBuilder::new()
        .seed(42)
        .dimensions(24, 24, 24)?
        .edge_size(2)?
        .fill_percent(45)?
        .build()?;

    let map = CaveMap::generate(config)?;
    let scaffold = map.scaffold(1.0);

    let active = scaffold.samples().iter().filter(|s| s.active).count();

    println!("Scaffold statistics:");
    println!("  Sample lattice: {}", scaffold.sample_dims());
    println!("  Cell lattice:   {}", scaffold.cell_dims());
    println!("  Samples:        {} ({} active)", scaffold.samples().len(), active);
    println!("  Cells:          {}", scaffold.cells().len());

    // Memory estimate: a sample is a position plus three edge nodes
    let sample_bytes = scaffold.samples().len() * (16 + 3 * 12);
    let cell_bytes = scaffold.cells().len() * 8 * std::mem::size_of::<usize>();
    println!(
        "  Approx. memory: {:.2} MB",
        (sample_bytes + cell_bytes) as f32 / 1024.0 / 1024.0
    );

    // Surface cells are the ones a surface extractor would emit
    // triangles for: some corners active, some not
    let mut mixed = 0;
    for cell in scaffold.cells() {
        let corners = scaffold.corner_samples(cell);
        let active_corners = corners.iter().filter(|c| c.active).count();
        if active_corners > 0 && active_corners < 8 {
            mixed += 1;
        }
    }
    println!("  Surface cells:  {}", mixed);

    Ok(())
}
