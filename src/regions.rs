//! Connected-region segmentation and size-threshold cleanup
//!
//! Regions are maximal sets of same-state cells connected under the
//! 18-neighbor rule: two cells are adjacent when every coordinate differs
//! by at most one and at least one coordinate is exactly equal. Face and
//! edge neighbors qualify; the eight corner neighbors do not.

use std::collections::VecDeque;

use glam::IVec3;

use crate::grid::{CellState, VoxelGrid};

/// Find all connected regions of cells in the given state
///
/// Flood fills from every unvisited cell of `state` in x, y, z scan
/// order. Every cell of `state` belongs to exactly one returned region.
pub fn regions(grid: &VoxelGrid, state: CellState) -> Vec<Vec<IVec3>> {
    let mut visited = vec![false; grid.cells().len()];
    let mut found = Vec::new();

    for x in 0..grid.width() {
        for y in 0..grid.height() {
            for z in 0..grid.depth() {
                let c = IVec3::new(x, y, z);
                if !visited[grid.index_of(c)] && grid.cell(c) == Some(state) {
                    found.push(flood_fill(grid, &mut visited, c, state));
                }
            }
        }
    }

    found
}

/// Breadth-first fill of one region starting at `start`
fn flood_fill(
    grid: &VoxelGrid,
    visited: &mut [bool],
    start: IVec3,
    state: CellState,
) -> Vec<IVec3> {
    let mut tiles = Vec::new();
    let mut queue = VecDeque::new();

    visited[grid.index_of(start)] = true;
    queue.push_back(start);

    while let Some(tile) = queue.pop_front() {
        tiles.push(tile);

        for nx in tile.x - 1..=tile.x + 1 {
            for ny in tile.y - 1..=tile.y + 1 {
                for nz in tile.z - 1..=tile.z + 1 {
                    // 18-neighbor rule: at least one axis must match
                    if nx != tile.x && ny != tile.y && nz != tile.z {
                        continue;
                    }
                    let n = IVec3::new(nx, ny, nz);
                    if grid.cell(n) != Some(state) {
                        continue;
                    }
                    let idx = grid.index_of(n);
                    if !visited[idx] {
                        visited[idx] = true;
                        queue.push_back(n);
                    }
                }
            }
        }
    }

    tiles
}

/// Convert undersized regions to the opposite state
///
/// Wall regions smaller than `wall_threshold` are opened up, then open
/// regions smaller than `room_threshold` are filled in. The surviving
/// open regions are returned as room candidates; an empty result is a
/// valid outcome, not an error.
pub fn apply_thresholds(
    grid: &mut VoxelGrid,
    wall_threshold: usize,
    room_threshold: usize,
) -> Vec<Vec<IVec3>> {
    for wall_region in regions(grid, CellState::Wall) {
        if wall_region.len() < wall_threshold {
            for tile in wall_region {
                grid.set(tile, CellState::Open);
            }
        }
    }

    let mut rooms = Vec::new();
    for open_region in regions(grid, CellState::Open) {
        if open_region.len() < room_threshold {
            for tile in open_region {
                grid.set(tile, CellState::Wall);
            }
        } else {
            rooms.push(open_region);
        }
    }

    log::debug!(
        "thresholds applied: {} room candidate(s) of size >= {}",
        rooms.len(),
        room_threshold
    );

    rooms
}
