//! Voxel grid storage, random fill, and cellular-automata smoothing

use glam::IVec3;
use rand::Rng;

use crate::error::{CaveError, Result};

/// State of a single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellState {
    /// Walkable cave interior
    Open,
    /// Solid rock
    Wall,
}

impl CellState {
    /// Check if this cell is solid
    #[inline]
    pub fn is_wall(self) -> bool {
        matches!(self, CellState::Wall)
    }
}

/// A dense 3D grid of cell states
///
/// The grid owns its storage and exposes bounds-checked accessors; all
/// pipeline stages mutate it in place through those accessors. Cells
/// within `edge_size` of any face form a sealed wall shell that no
/// carving operation may open.
///
/// # Example
///
/// ```rust
/// use rust_voxel_caves::*;
/// use rand::SeedableRng;
///
/// let mut grid = VoxelGrid::new(16, 16, 16, 1).unwrap();
/// let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(42);
/// grid.random_fill(45, &mut rng);
/// grid.smooth(5);
/// assert_eq!(grid.cell(IVec3::new(0, 0, 0)), Some(CellState::Wall));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoxelGrid {
    width: i32,
    height: i32,
    depth: i32,
    edge_size: i32,
    cells: Vec<CellState>,
}

impl VoxelGrid {
    /// Allocate an all-open grid
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if any dimension is not positive or the
    /// edge size is negative. This is checked before any allocation.
    pub fn new(width: i32, height: i32, depth: i32, edge_size: i32) -> Result<Self> {
        if width <= 0 || height <= 0 || depth <= 0 {
            return Err(CaveError::InvalidInput(format!(
                "grid dimensions must be positive (got {}x{}x{})",
                width, height, depth
            )));
        }
        if edge_size < 0 {
            return Err(CaveError::InvalidInput(format!(
                "edge size must be non-negative (got {})",
                edge_size
            )));
        }

        Ok(Self {
            width,
            height,
            depth,
            edge_size,
            cells: vec![CellState::Open; (width * height * depth) as usize],
        })
    }

    /// Allocate and randomly fill a grid with its own seeded generator
    ///
    /// Convenience for standalone use; [`CaveMap::generate`] instead
    /// threads one generator through the whole pipeline.
    ///
    /// [`CaveMap::generate`]: crate::cave::CaveMap::generate
    pub fn fill(
        width: i32,
        height: i32,
        depth: i32,
        edge_size: i32,
        fill_percent: u32,
        seed: u64,
    ) -> Result<Self> {
        use rand::SeedableRng;

        let mut grid = Self::new(width, height, depth, edge_size)?;
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);
        grid.random_fill(fill_percent, &mut rng);
        Ok(grid)
    }

    /// Grid width in cells (x axis)
    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Grid height in cells (y axis)
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Grid depth in cells (z axis)
    #[inline]
    pub fn depth(&self) -> i32 {
        self.depth
    }

    /// Thickness of the sealed wall shell
    #[inline]
    pub fn edge_size(&self) -> i32 {
        self.edge_size
    }

    /// Grid dimensions as a vector
    #[inline]
    pub fn dimensions(&self) -> IVec3 {
        IVec3::new(self.width, self.height, self.depth)
    }

    /// All cells in `(x * height + y) * depth + z` order
    #[inline]
    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    #[inline]
    pub(crate) fn index_of(&self, c: IVec3) -> usize {
        ((c.x * self.height + c.y) * self.depth + c.z) as usize
    }

    /// Check whether a coordinate lies inside the grid
    #[inline]
    pub fn in_bounds(&self, c: IVec3) -> bool {
        c.x >= 0 && c.x < self.width && c.y >= 0 && c.y < self.height && c.z >= 0 && c.z < self.depth
    }

    /// Check whether a coordinate lies in the sealed wall shell
    #[inline]
    pub fn is_edge(&self, c: IVec3) -> bool {
        c.x < self.edge_size
            || c.x >= self.width - self.edge_size
            || c.y < self.edge_size
            || c.y >= self.height - self.edge_size
            || c.z < self.edge_size
            || c.z >= self.depth - self.edge_size
    }

    /// Get the state of a cell, or `None` outside the grid
    #[inline]
    pub fn cell(&self, c: IVec3) -> Option<CellState> {
        if self.in_bounds(c) {
            Some(self.cells[self.index_of(c)])
        } else {
            None
        }
    }

    /// Set the state of a cell; writes outside the grid are skipped
    #[inline]
    pub fn set(&mut self, c: IVec3, state: CellState) {
        if self.in_bounds(c) {
            let idx = self.index_of(c);
            self.cells[idx] = state;
        }
    }

    /// Count the cells in a given state
    pub fn count(&self, state: CellState) -> usize {
        self.cells.iter().filter(|&&c| c == state).count()
    }

    /// Reset every cell to open
    pub fn clear(&mut self) {
        self.cells.fill(CellState::Open);
    }

    /// Randomly fill the grid
    ///
    /// Cells in the sealed shell become walls. Every other cell becomes a
    /// wall with probability `fill_percent / 100`, drawn from `rng` in
    /// x, y, z scan order. The draw order is part of the reproducibility
    /// contract.
    pub fn random_fill<R: Rng>(&mut self, fill_percent: u32, rng: &mut R) {
        for x in 0..self.width {
            for y in 0..self.height {
                for z in 0..self.depth {
                    let c = IVec3::new(x, y, z);
                    let state = if self.is_edge(c) {
                        CellState::Wall
                    } else if rng.gen_range(0..100u32) < fill_percent {
                        CellState::Wall
                    } else {
                        CellState::Open
                    };
                    let idx = self.index_of(c);
                    self.cells[idx] = state;
                }
            }
        }
    }

    /// Run the cellular-automata smoothing rule
    ///
    /// Each iteration recomputes every cell from a snapshot of the grid
    /// taken at iteration start: cells with more than 14 of their 26
    /// neighbors solid become walls, cells with fewer than 14 become
    /// open, and cells with exactly 14 keep their state. Neighbors
    /// outside the grid count as walls.
    pub fn smooth(&mut self, iterations: usize) {
        for _ in 0..iterations {
            let snapshot = self.cells.clone();
            for x in 0..self.width {
                for y in 0..self.height {
                    for z in 0..self.depth {
                        let c = IVec3::new(x, y, z);
                        let walls = self.surrounding_wall_count(&snapshot, c);
                        let idx = self.index_of(c);
                        if walls > 14 {
                            self.cells[idx] = CellState::Wall;
                        } else if walls < 14 {
                            self.cells[idx] = CellState::Open;
                        }
                    }
                }
            }
        }
    }

    /// Count solid cells among the 26 neighbors, reading from `snapshot`
    pub(crate) fn surrounding_wall_count(&self, snapshot: &[CellState], c: IVec3) -> u32 {
        let mut count = 0;
        for nx in c.x - 1..=c.x + 1 {
            for ny in c.y - 1..=c.y + 1 {
                for nz in c.z - 1..=c.z + 1 {
                    if nx == c.x && ny == c.y && nz == c.z {
                        continue;
                    }
                    let n = IVec3::new(nx, ny, nz);
                    if self.in_bounds(n) {
                        if snapshot[self.index_of(n)].is_wall() {
                            count += 1;
                        }
                    } else {
                        count += 1;
                    }
                }
            }
        }
        count
    }

    /// Stamp a sphere of probabilistic carving
    ///
    /// Every cell within `radius` of `center` (squared offset test) that
    /// lies inside the grid and outside the sealed shell is set open
    /// with probability `carve_percent / 100`, else wall.
    pub fn stamp_sphere<R: Rng>(
        &mut self,
        center: IVec3,
        radius: i32,
        carve_percent: u32,
        rng: &mut R,
    ) {
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                for dz in -radius..=radius {
                    if dx * dx + dy * dy + dz * dz > radius * radius {
                        continue;
                    }
                    let c = center + IVec3::new(dx, dy, dz);
                    if self.in_bounds(c) && !self.is_edge(c) {
                        let state = if rng.gen_range(0..100u32) < carve_percent {
                            CellState::Open
                        } else {
                            CellState::Wall
                        };
                        let idx = self.index_of(c);
                        self.cells[idx] = state;
                    }
                }
            }
        }
    }
}
