//! Dual-grid surface scaffold
//!
//! Derives the sample/edge node structure a marching-cubes style surface
//! extractor consumes. Every voxel becomes a sample node tagged with its
//! solidity; between samples sit half-offset edge nodes where the
//! extractor will place surface vertices. The scaffold is pure data and
//! emits no triangles itself.

use glam::{IVec3, Vec3};

use crate::grid::VoxelGrid;

/// A surface vertex candidate halfway between two samples
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeNode {
    /// World position
    pub position: Vec3,
}

/// One sample per voxel, owning the edge nodes toward +x, +y and +z
///
/// Edge nodes toward the negative directions belong to the neighboring
/// samples, so every edge node exists exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleNode {
    /// World position of the voxel
    pub position: Vec3,
    /// True when the voxel is solid
    pub active: bool,
    /// Edge node toward +y
    pub up: EdgeNode,
    /// Edge node toward +x
    pub right: EdgeNode,
    /// Edge node toward +z
    pub forward: EdgeNode,
}

/// One 2x2x2 block of samples
///
/// Corners are indices into the scaffold's sample list, labeled:
///
/// ```text
///      E ------ F
///      |        |
///      | A ------- B
///      | |      |  |
///      G | ---- H  |
///        |         |
///        C ------- D
/// ```
///
/// A/B are the upper near corners, C/D the lower near corners, and
/// E/F/G/H their +z counterparts.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaffoldCell {
    /// Sample indices in A, B, C, D, E, F, G, H order
    pub corners: [usize; 8],
}

/// The dual grid derived from a voxel grid
///
/// Rebuilt from the finished grid on every request and handed to an
/// external surface extractor.
#[derive(Debug, Clone)]
pub struct Scaffold {
    sample_dims: IVec3,
    cell_scale: f32,
    samples: Vec<SampleNode>,
    cells: Vec<ScaffoldCell>,
}

/// Build the dual grid for a finished voxel grid
///
/// Sample positions are centered on the origin: axis extents run from
/// `-dim * scale / 2` upward in `cell_scale` steps. There is one cell
/// per 2x2x2 block of samples, so the cell lattice is one smaller than
/// the sample lattice on every axis.
pub fn build_scaffold(grid: &VoxelGrid, cell_scale: f32) -> Scaffold {
    let dims = grid.dimensions();
    let extent = Vec3::new(
        dims.x as f32 * cell_scale,
        dims.y as f32 * cell_scale,
        dims.z as f32 * cell_scale,
    );
    let half = cell_scale / 2.0;

    let mut samples = Vec::with_capacity((dims.x * dims.y * dims.z) as usize);
    for x in 0..dims.x {
        for y in 0..dims.y {
            for z in 0..dims.z {
                let c = IVec3::new(x, y, z);
                let position = Vec3::new(
                    -extent.x / 2.0 + x as f32 * cell_scale,
                    -extent.y / 2.0 + y as f32 * cell_scale,
                    -extent.z / 2.0 + z as f32 * cell_scale,
                );
                samples.push(SampleNode {
                    position,
                    active: grid.cell(c).is_some_and(|s| s.is_wall()),
                    up: EdgeNode {
                        position: position + Vec3::Y * half,
                    },
                    right: EdgeNode {
                        position: position + Vec3::X * half,
                    },
                    forward: EdgeNode {
                        position: position + Vec3::Z * half,
                    },
                });
            }
        }
    }

    let sample_index =
        |x: i32, y: i32, z: i32| -> usize { ((x * dims.y + y) * dims.z + z) as usize };

    let mut cells =
        Vec::with_capacity(((dims.x - 1).max(0) * (dims.y - 1).max(0) * (dims.z - 1).max(0)) as usize);
    for x in 0..dims.x - 1 {
        for y in 0..dims.y - 1 {
            for z in 0..dims.z - 1 {
                cells.push(ScaffoldCell {
                    corners: [
                        sample_index(x, y + 1, z),
                        sample_index(x + 1, y + 1, z),
                        sample_index(x, y, z),
                        sample_index(x + 1, y, z),
                        sample_index(x, y + 1, z + 1),
                        sample_index(x + 1, y + 1, z + 1),
                        sample_index(x, y, z + 1),
                        sample_index(x + 1, y, z + 1),
                    ],
                });
            }
        }
    }

    Scaffold {
        sample_dims: dims,
        cell_scale,
        samples,
        cells,
    }
}

impl Scaffold {
    /// Sample lattice dimensions (equal to the source grid's)
    #[inline]
    pub fn sample_dims(&self) -> IVec3 {
        self.sample_dims
    }

    /// Cell lattice dimensions, one less than the samples on every axis
    #[inline]
    pub fn cell_dims(&self) -> IVec3 {
        self.sample_dims - IVec3::ONE
    }

    /// World-space size of one cell
    #[inline]
    pub fn cell_scale(&self) -> f32 {
        self.cell_scale
    }

    /// All sample nodes in `(x * height + y) * depth + z` order
    pub fn samples(&self) -> &[SampleNode] {
        &self.samples
    }

    /// All cells in the same scan order as the samples
    pub fn cells(&self) -> &[ScaffoldCell] {
        &self.cells
    }

    /// Look up a cell by its lattice position
    pub fn cell_at(&self, x: i32, y: i32, z: i32) -> Option<&ScaffoldCell> {
        let d = self.cell_dims();
        if x < 0 || x >= d.x || y < 0 || y >= d.y || z < 0 || z >= d.z {
            return None;
        }
        self.cells.get(((x * d.y + y) * d.z + z) as usize)
    }

    /// The eight corner samples of a cell, A through H
    pub fn corner_samples(&self, cell: &ScaffoldCell) -> [&SampleNode; 8] {
        cell.corners.map(|i| &self.samples[i])
    }

    /// The twelve edge nodes of a cell
    ///
    /// Edges are named by their corner pair and returned in declaration
    /// order: ab, bd, cd, ac, ae, bf, cg, dh, ef, fh, gh, eg. Each node
    /// is resolved through a corner sample, so adjacent cells hand back
    /// the same node for a shared edge.
    pub fn edge_nodes(&self, cell: &ScaffoldCell) -> [&EdgeNode; 12] {
        let [a, b, c, d, e, _f, g, h] = self.corner_samples(cell);
        [
            &a.right,   // ab
            &d.up,      // bd
            &c.right,   // cd
            &c.up,      // ac
            &a.forward, // ae
            &b.forward, // bf
            &c.forward, // cg
            &d.forward, // dh
            &e.right,   // ef
            &h.up,      // fh
            &g.right,   // gh
            &g.up,      // eg
        ]
    }
}
