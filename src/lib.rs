//! Procedural voxel cave generation
//!
//! A standalone library for generating connected 3D cave volumes as
//! level geometry, suitable for use with any game engine (Bevy, Godot,
//! etc.). A seeded random field is smoothed into rooms by a cellular
//! automaton, small regions are cleaned away, reachability from the main
//! room is guaranteed by carved passages, and optional fractal Brownian
//! motion particles bore extra tunnels. The finished grid can be turned
//! into a dual-grid scaffold for a marching-cubes style surface
//! extractor.
//!
//! # Quick Start
//!
//! ```rust
//! use rust_voxel_caves::*;
//!
//! // Generate a cave
//! let config = MapConfigBuilder::new()
//!     .seed(42)
//!     .dimensions(32, 32, 32).unwrap()
//!     .edge_size(2).unwrap()
//!     .fill_percent(45).unwrap()
//!     .only_one_room(true)
//!     .build().unwrap();
//!
//! let map = CaveMap::generate(config).unwrap();
//! println!("open cells: {}", map.open_cell_count());
//!
//! // Build the scaffold for a surface extractor
//! let scaffold = map.scaffold(1.0);
//! println!("scaffold cells: {}", scaffold.cells().len());
//! ```
//!
//! # Features
//!
//! - `serde`: Enables serialization support for configuration types

// Modules
pub mod cave;
pub mod config;
pub mod error;
pub mod fbm;
pub mod grid;
pub mod line;
pub mod regions;
pub mod rooms;
pub mod scaffold;
pub mod spatial;

// Re-export core types for convenience
pub use cave::{cell_to_world, CaveMap, DebugLine, DebugLineKind};
pub use config::{MapConfig, MapConfigBuilder, ParticleConfig};
pub use error::{CaveError, Result};
pub use fbm::{generate_particle, Particle};
pub use grid::{CellState, VoxelGrid};
pub use line::line;
pub use regions::{apply_thresholds, regions};
pub use rooms::{Room, RoomGraph};
pub use scaffold::{build_scaffold, EdgeNode, SampleNode, Scaffold, ScaffoldCell};
pub use spatial::IndexNode;

// Re-export the glam vector types used throughout the API
pub use glam::{IVec3, Vec3};
