//! Cave map generation pipeline
//!
//! Ties the stages together: random fill, particle carving, smoothing,
//! region cleanup, and room connectivity. The whole pipeline runs to
//! completion inside [`CaveMap::generate`]; callers own threading
//! discipline and must serialize generation per map instance.

use glam::{IVec3, Vec3};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::MapConfig;
use crate::error::Result;
use crate::fbm;
use crate::grid::{CellState, VoxelGrid};
use crate::regions;
use crate::rooms::RoomGraph;
use crate::scaffold::{build_scaffold, Scaffold};

/// What a debug line was emitted for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugLineKind {
    /// A carved connection between two rooms
    Passage,
    /// One segment of a particle walk
    ParticlePath,
}

/// A world-space line segment for an external visualizer
///
/// Emitting these never affects grid state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugLine {
    pub from: Vec3,
    pub to: Vec3,
    pub kind: DebugLineKind,
}

/// Convert a grid coordinate to the world-space center of its cell
///
/// The grid is centered on the origin at unit cell size, matching the
/// scaffold's placement.
pub fn cell_to_world(dims: IVec3, tile: IVec3) -> Vec3 {
    Vec3::new(
        (-dims.x / 2) as f32 + 0.5 + tile.x as f32,
        (-dims.y / 2) as f32 + 0.5 + tile.y as f32,
        (-dims.z / 2) as f32 + 0.5 + tile.z as f32,
    )
}

/// A fully generated cave
///
/// Holds the finalized grid and the debug line side channel. Rooms are
/// processed during generation and not retained.
///
/// # Example
///
/// ```rust
/// use rust_voxel_caves::*;
///
/// let config = MapConfigBuilder::new()
///     .seed(42)
///     .dimensions(24, 24, 24).unwrap()
///     .edge_size(2).unwrap()
///     .build()
///     .unwrap();
///
/// let map = CaveMap::generate(config).unwrap();
/// assert_eq!(map.cell(0, 0, 0), Some(CellState::Wall));
///
/// let scaffold = map.scaffold(1.0);
/// assert_eq!(scaffold.sample_dims(), IVec3::new(24, 24, 24));
/// ```
#[derive(Debug, Clone)]
pub struct CaveMap {
    config: MapConfig,
    grid: VoxelGrid,
    debug_lines: Vec<DebugLine>,
    room_count: usize,
}

impl CaveMap {
    /// Run the full generation pipeline
    ///
    /// Deterministic: the same configuration (seed included) produces a
    /// bit-identical grid, room layout, and debug lines.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput`/`InvalidConfig` errors from invalid
    /// dimensions or particle parameters. A map without qualifying rooms
    /// is not an error; connectivity is simply skipped.
    pub fn generate(config: MapConfig) -> Result<Self> {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

        let mut grid = VoxelGrid::new(config.width, config.height, config.depth, config.edge_size)?;
        grid.random_fill(config.fill_percent, &mut rng);
        log::debug!(
            "filled {}x{}x{} grid at {}%",
            config.width,
            config.height,
            config.depth,
            config.fill_percent
        );

        let mut debug_lines = Vec::new();

        // Particles carve into the raw fill so smoothing can round their
        // tunnels off afterwards
        for particle_config in &config.particles {
            let particle =
                fbm::generate_particle(particle_config.length, particle_config.hurst, &mut rng)?;
            let path = particle.materialize(
                &grid,
                particle_config.step_length,
                particle_config.edge_size,
                &mut rng,
            )?;
            fbm::carve_path(
                &mut grid,
                &path,
                particle_config.radius,
                particle_config.carve_percent,
                &mut rng,
            );

            let dims = grid.dimensions();
            for pair in path.windows(2) {
                debug_lines.push(DebugLine {
                    from: cell_to_world(dims, pair[0]),
                    to: cell_to_world(dims, pair[1]),
                    kind: DebugLineKind::ParticlePath,
                });
            }
        }

        grid.smooth(config.smooth_iterations);

        let room_regions =
            regions::apply_thresholds(&mut grid, config.wall_threshold, config.room_threshold);
        let room_count = room_regions.len();

        if room_count == 0 {
            log::debug!("no rooms above threshold; connectivity skipped");
        } else {
            let mut graph = RoomGraph::from_regions(room_regions, &grid, &mut rng)?;
            if config.only_one_room {
                graph.collapse_to_main_room(&mut grid);
            } else if config.connect_rooms {
                graph.connect_closest_rooms(
                    &mut grid,
                    config.passage_radius,
                    &mut rng,
                    &mut debug_lines,
                );
            }
        }

        log::debug!(
            "map generated: {} open cell(s), {} room(s), {} debug line(s)",
            grid.count(CellState::Open),
            room_count,
            debug_lines.len()
        );

        Ok(Self {
            config,
            grid,
            debug_lines,
            room_count,
        })
    }

    /// The configuration this map was generated from
    #[inline]
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// The finalized grid
    #[inline]
    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    /// State of a single cell, or `None` outside the grid
    #[inline]
    pub fn cell(&self, x: i32, y: i32, z: i32) -> Option<CellState> {
        self.grid.cell(IVec3::new(x, y, z))
    }

    /// Number of open cells
    pub fn open_cell_count(&self) -> usize {
        self.grid.count(CellState::Open)
    }

    /// Number of solid cells
    pub fn wall_cell_count(&self) -> usize {
        self.grid.count(CellState::Wall)
    }

    /// Number of rooms found during segmentation
    ///
    /// Counted before any single-room collapse.
    #[inline]
    pub fn room_count(&self) -> usize {
        self.room_count
    }

    /// Debug lines emitted during generation
    ///
    /// Passage lines and particle path segments, for an external
    /// visualizer. Reading or ignoring them has no effect on the grid.
    #[inline]
    pub fn debug_lines(&self) -> &[DebugLine] {
        &self.debug_lines
    }

    /// Build the dual-grid scaffold for an external surface extractor
    pub fn scaffold(&self, cell_scale: f32) -> Scaffold {
        build_scaffold(&self.grid, cell_scale)
    }

    /// Drop the generated contents
    ///
    /// Opens every cell and clears the debug lines. The configuration is
    /// kept, so the map can be regenerated from it.
    pub fn clear(&mut self) {
        self.grid.clear();
        self.debug_lines.clear();
        self.room_count = 0;
        log::debug!("map cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MapConfigBuilder, ParticleConfig};

    fn test_config(seed: u64) -> MapConfig {
        MapConfigBuilder::new()
            .seed(seed)
            .dimensions(20, 20, 20)
            .unwrap()
            .edge_size(2)
            .unwrap()
            .fill_percent(45)
            .unwrap()
            .smooth_iterations(5)
            .unwrap()
            .only_one_room(true)
            .build()
            .unwrap()
    }

    #[test]
    fn test_generation_determinism() {
        let a = CaveMap::generate(test_config(42)).unwrap();
        let b = CaveMap::generate(test_config(42)).unwrap();

        assert_eq!(a.grid(), b.grid());
        assert_eq!(a.debug_lines(), b.debug_lines());
        assert_eq!(a.room_count(), b.room_count());
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = CaveMap::generate(test_config(1)).unwrap();
        let b = CaveMap::generate(test_config(2)).unwrap();
        assert_ne!(a.grid(), b.grid());
    }

    #[test]
    fn test_boundary_sealed() {
        let map = CaveMap::generate(test_config(42)).unwrap();
        let grid = map.grid();

        for x in 0..20 {
            for y in 0..20 {
                for z in 0..20 {
                    let c = IVec3::new(x, y, z);
                    if grid.is_edge(c) {
                        assert_eq!(grid.cell(c), Some(CellState::Wall));
                    }
                }
            }
        }
    }

    #[test]
    fn test_single_room_scenario() {
        // 20x20x20, edge 2, fill 45, 5 smoothing passes, seed "test",
        // only one room: at most one open region may remain, and exactly
        // one when any room qualified
        let config = MapConfigBuilder::new()
            .seed_text("test")
            .dimensions(20, 20, 20)
            .unwrap()
            .edge_size(2)
            .unwrap()
            .fill_percent(45)
            .unwrap()
            .smooth_iterations(5)
            .unwrap()
            .only_one_room(true)
            .build()
            .unwrap();

        let map = CaveMap::generate(config).unwrap();
        let open_regions = crate::regions::regions(map.grid(), CellState::Open);

        if map.room_count() > 0 {
            assert_eq!(open_regions.len(), 1);
        } else {
            assert!(open_regions.is_empty());
        }
    }

    #[test]
    fn test_no_rooms_is_not_an_error() {
        // Full fill leaves no open region at all
        let config = MapConfigBuilder::new()
            .seed(42)
            .dimensions(16, 16, 16)
            .unwrap()
            .fill_percent(100)
            .unwrap()
            .build()
            .unwrap();

        let map = CaveMap::generate(config).unwrap();
        assert_eq!(map.room_count(), 0);
        assert_eq!(map.open_cell_count(), 0);
    }

    #[test]
    fn test_connect_rooms_mode() {
        let config = MapConfigBuilder::new()
            .seed(7)
            .dimensions(28, 28, 28)
            .unwrap()
            .edge_size(2)
            .unwrap()
            .fill_percent(45)
            .unwrap()
            .room_threshold(20)
            .only_one_room(false)
            .connect_rooms(true)
            .passage_radius(2)
            .unwrap()
            .build()
            .unwrap();

        let map = CaveMap::generate(config).unwrap();
        // Passage debug lines appear whenever more than one room was found
        if map.room_count() > 1 {
            assert!(map
                .debug_lines()
                .iter()
                .any(|l| l.kind == DebugLineKind::Passage));
        }
    }

    #[test]
    fn test_particles_carve_before_smoothing() {
        let particle = ParticleConfig {
            length: 60,
            hurst: 0.8,
            step_length: 1,
            radius: 2,
            edge_size: 3,
            carve_percent: 100,
        };
        let config = MapConfigBuilder::new()
            .seed(11)
            .dimensions(24, 24, 24)
            .unwrap()
            .edge_size(2)
            .unwrap()
            .fill_percent(100)
            .unwrap()
            .smooth_iterations(0)
            .unwrap()
            .wall_threshold(0)
            .room_threshold(10)
            .particle(particle)
            .unwrap()
            .build()
            .unwrap();

        let map = CaveMap::generate(config).unwrap();
        // The particle is the only source of open cells in a full fill
        assert!(map.open_cell_count() > 0);
        assert!(map
            .debug_lines()
            .iter()
            .any(|l| l.kind == DebugLineKind::ParticlePath));
    }

    #[test]
    fn test_open_wall_counts_sum() {
        let map = CaveMap::generate(test_config(42)).unwrap();
        assert_eq!(map.open_cell_count() + map.wall_cell_count(), 20 * 20 * 20);
    }

    #[test]
    fn test_cell_to_world_centering() {
        let dims = IVec3::new(20, 20, 20);
        assert_eq!(cell_to_world(dims, IVec3::ZERO), Vec3::new(-9.5, -9.5, -9.5));
        assert_eq!(
            cell_to_world(dims, IVec3::new(19, 19, 19)),
            Vec3::new(9.5, 9.5, 9.5)
        );
    }

    #[test]
    fn test_clear() {
        let mut map = CaveMap::generate(test_config(42)).unwrap();
        map.clear();
        assert_eq!(map.wall_cell_count(), 0);
        assert_eq!(map.room_count(), 0);
        assert!(map.debug_lines().is_empty());
    }

    #[test]
    fn test_scaffold_from_map() {
        let map = CaveMap::generate(test_config(42)).unwrap();
        let scaffold = map.scaffold(1.0);

        assert_eq!(scaffold.sample_dims(), IVec3::new(20, 20, 20));
        // Sealed boundary samples are active
        assert!(scaffold.samples()[0].active);
    }
}
