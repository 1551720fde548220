//! Cave Map Configuration and Builder
//!
//! This module provides configuration types for deterministic cave map generation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{CaveError, Result};

/// Parameters for one fractal Brownian motion carving particle
///
/// Each particle performs a correlated random walk through the grid and
/// carves a tunnel of the given radius along its path. Particles are
/// processed in order, after random fill and before smoothing.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleConfig {
    /// Number of displacement steps in the walk
    pub length: usize,

    /// Hurst exponent controlling step correlation, in `(0, 1]`
    ///
    /// Values near 1 produce smooth, persistent paths; values near 0
    /// produce jittery, self-crossing paths. Exactly 0 is invalid.
    pub hurst: f32,

    /// Scale applied to each displacement step, in cells
    pub step_length: i32,

    /// Radius of the sphere carved at every path point, in cells
    pub radius: i32,

    /// Margin kept between the walk's start point and the grid faces
    pub edge_size: i32,

    /// Probability (0-100) that a stamped cell becomes open
    pub carve_percent: u32,
}

impl ParticleConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.length == 0 {
            return Err(CaveError::InvalidConfig(
                "particle length must be positive".to_string(),
            ));
        }
        if !(self.hurst > 0.0 && self.hurst <= 1.0) {
            return Err(CaveError::InvalidConfig(format!(
                "Hurst exponent must be in (0, 1] (got {})",
                self.hurst
            )));
        }
        if self.step_length <= 0 {
            return Err(CaveError::InvalidConfig(format!(
                "particle step length must be positive (got {})",
                self.step_length
            )));
        }
        if self.radius < 0 {
            return Err(CaveError::InvalidConfig(format!(
                "particle radius must be non-negative (got {})",
                self.radius
            )));
        }
        if self.edge_size < 0 {
            return Err(CaveError::InvalidConfig(format!(
                "particle edge size must be non-negative (got {})",
                self.edge_size
            )));
        }
        if self.carve_percent > 100 {
            return Err(CaveError::InvalidConfig(format!(
                "particle carve percent must be <= 100 (got {})",
                self.carve_percent
            )));
        }
        Ok(())
    }
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            length: 100,
            hurst: 0.8,
            step_length: 1,
            radius: 2,
            edge_size: 2,
            carve_percent: 60,
        }
    }
}

/// Configuration for deterministic cave map generation
///
/// The same configuration always produces the identical grid, room layout,
/// and debug lines. Only the configuration is serializable (with the
/// `serde` feature); the generated grid is rebuilt from it on demand.
///
/// # Example
///
/// ```rust
/// use rust_voxel_caves::*;
///
/// let config = MapConfigBuilder::new()
///     .seed(42)
///     .dimensions(32, 32, 32).unwrap()
///     .fill_percent(45).unwrap()
///     .build()
///     .unwrap();
/// assert_eq!(config.seed, 42);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    /// Random seed for deterministic generation
    ///
    /// The same seed (with the same other parameters) always produces
    /// the exact same cave.
    pub seed: u64,

    /// Grid width in cells (x axis)
    pub width: i32,
    /// Grid height in cells (y axis)
    pub height: i32,
    /// Grid depth in cells (z axis)
    pub depth: i32,

    /// Thickness of the sealed wall shell at every grid face
    pub edge_size: i32,

    /// Probability (0-100) that an interior cell starts as wall
    pub fill_percent: u32,

    /// Number of cellular-automata smoothing passes
    pub smooth_iterations: usize,

    /// Collapse the level to the single largest room
    ///
    /// Takes precedence over `connect_rooms` when both are set.
    pub only_one_room: bool,

    /// Carve passages until every room is reachable from the main room
    pub connect_rooms: bool,

    /// Radius of carved connecting passages, 1-10
    pub passage_radius: i32,

    /// Wall regions smaller than this are opened up
    pub wall_threshold: usize,

    /// Open regions smaller than this are filled in
    pub room_threshold: usize,

    /// Carving particles, applied in order before smoothing
    pub particles: Vec<ParticleConfig>,
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfigBuilder::new().build().unwrap()
    }
}

/// Builder for creating a MapConfig with validation
///
/// # Example
///
/// ```rust
/// use rust_voxel_caves::*;
///
/// // Use defaults
/// let config = MapConfigBuilder::new().build().unwrap();
///
/// // Customize
/// let config = MapConfigBuilder::new()
///     .seed_text("test")
///     .dimensions(20, 20, 20).unwrap()
///     .edge_size(2).unwrap()
///     .fill_percent(45).unwrap()
///     .smooth_iterations(5).unwrap()
///     .only_one_room(true)
///     .build()
///     .unwrap();
/// assert_eq!(config.width, 20);
/// ```
#[derive(Debug, Clone)]
pub struct MapConfigBuilder {
    seed: Option<u64>,
    width: i32,
    height: i32,
    depth: i32,
    edge_size: i32,
    fill_percent: u32,
    smooth_iterations: usize,
    only_one_room: bool,
    connect_rooms: bool,
    passage_radius: i32,
    wall_threshold: usize,
    room_threshold: usize,
    particles: Vec<ParticleConfig>,
}

impl MapConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - seed: random (generated at build time)
    /// - dimensions: 40 x 40 x 40
    /// - edge_size: 1
    /// - fill_percent: 45
    /// - smooth_iterations: 5
    /// - only_one_room: true, connect_rooms: false
    /// - passage_radius: 1
    /// - wall_threshold: 150, room_threshold: 50
    /// - no particles
    pub fn new() -> Self {
        Self {
            seed: None,
            width: 40,
            height: 40,
            depth: 40,
            edge_size: 1,
            fill_percent: 45,
            smooth_iterations: 5,
            only_one_room: true,
            connect_rooms: false,
            passage_radius: 1,
            wall_threshold: 150,
            room_threshold: 50,
            particles: Vec::new(),
        }
    }

    /// Set the random seed
    ///
    /// Using the same seed with the same other parameters produces an
    /// identical cave every time.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the seed from a text value
    ///
    /// The text is hashed with FNV-1a, which is stable across platforms
    /// and runs, so a text seed is as reproducible as a numeric one.
    pub fn seed_text(self, text: &str) -> Self {
        self.seed(hash_seed_text(text))
    }

    /// Set the grid dimensions in cells
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if any dimension is not positive.
    pub fn dimensions(mut self, width: i32, height: i32, depth: i32) -> Result<Self> {
        if width <= 0 || height <= 0 || depth <= 0 {
            return Err(CaveError::InvalidConfig(format!(
                "dimensions must be positive (got {}x{}x{})",
                width, height, depth
            )));
        }
        self.width = width;
        self.height = height;
        self.depth = depth;
        Ok(self)
    }

    /// Set the thickness of the sealed wall shell at the grid faces
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the size is negative.
    pub fn edge_size(mut self, edge_size: i32) -> Result<Self> {
        if edge_size < 0 {
            return Err(CaveError::InvalidConfig(format!(
                "edge size must be non-negative (got {})",
                edge_size
            )));
        }
        self.edge_size = edge_size;
        Ok(self)
    }

    /// Set the initial wall fill probability
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the percentage exceeds 100.
    pub fn fill_percent(mut self, fill_percent: u32) -> Result<Self> {
        if fill_percent > 100 {
            return Err(CaveError::InvalidConfig(format!(
                "fill percent must be <= 100 (got {})",
                fill_percent
            )));
        }
        self.fill_percent = fill_percent;
        Ok(self)
    }

    /// Set the number of smoothing passes
    ///
    /// Around 5 passes is enough for the automaton to settle; more passes
    /// change little.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if iterations > 64 (excessive and impractical).
    pub fn smooth_iterations(mut self, iterations: usize) -> Result<Self> {
        if iterations > 64 {
            return Err(CaveError::InvalidConfig(format!(
                "smooth iterations must be <= 64 (got {})",
                iterations
            )));
        }
        self.smooth_iterations = iterations;
        Ok(self)
    }

    /// Keep only the single largest room
    pub fn only_one_room(mut self, enabled: bool) -> Self {
        self.only_one_room = enabled;
        self
    }

    /// Carve passages until every room is reachable from the main room
    ///
    /// Ignored when `only_one_room` is set.
    pub fn connect_rooms(mut self, enabled: bool) -> Self {
        self.connect_rooms = enabled;
        self
    }

    /// Set the radius of carved connecting passages
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the radius is outside `1..=10`.
    pub fn passage_radius(mut self, radius: i32) -> Result<Self> {
        if !(1..=10).contains(&radius) {
            return Err(CaveError::InvalidConfig(format!(
                "passage radius must be in 1..=10 (got {})",
                radius
            )));
        }
        self.passage_radius = radius;
        Ok(self)
    }

    /// Set the minimum size below which wall regions are opened up
    pub fn wall_threshold(mut self, threshold: usize) -> Self {
        self.wall_threshold = threshold;
        self
    }

    /// Set the minimum size below which open regions are filled in
    pub fn room_threshold(mut self, threshold: usize) -> Self {
        self.room_threshold = threshold;
        self
    }

    /// Add a carving particle
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if any particle parameter is out of range
    /// (see [`ParticleConfig`] field docs).
    pub fn particle(mut self, particle: ParticleConfig) -> Result<Self> {
        particle.validate()?;
        self.particles.push(particle);
        Ok(self)
    }

    /// Build the configuration
    ///
    /// If no seed was provided, generates a random one.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if a particle's start margin leaves no
    /// interior cell to start its walk in.
    pub fn build(self) -> Result<MapConfig> {
        let seed = self.seed.unwrap_or_else(rand::random);

        for particle in &self.particles {
            let margin = particle.edge_size;
            if 2 * margin >= self.width || 2 * margin >= self.height || 2 * margin >= self.depth {
                return Err(CaveError::InvalidConfig(format!(
                    "particle edge size {} leaves no interior in a {}x{}x{} grid",
                    margin, self.width, self.height, self.depth
                )));
            }
        }

        Ok(MapConfig {
            seed,
            width: self.width,
            height: self.height,
            depth: self.depth,
            edge_size: self.edge_size,
            fill_percent: self.fill_percent,
            smooth_iterations: self.smooth_iterations,
            only_one_room: self.only_one_room,
            connect_rooms: self.connect_rooms,
            passage_radius: self.passage_radius,
            wall_threshold: self.wall_threshold,
            room_threshold: self.room_threshold,
            particles: self.particles,
        })
    }
}

impl Default for MapConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// FNV-1a hash of the seed text, stable across platforms and runs
fn hash_seed_text(text: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in text.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}
