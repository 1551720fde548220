//! Room graph construction and connectivity repair
//!
//! Rooms are the open regions that survive threshold cleanup. The graph
//! ranks them by size, marks the largest as the main room, and either
//! collapses the level to that room or carves passages until every room
//! is reachable from it.

use glam::IVec3;
use rand::Rng;

use crate::cave::{cell_to_world, DebugLine, DebugLineKind};
use crate::error::Result;
use crate::grid::{CellState, VoxelGrid};
use crate::line::line;
use crate::spatial::{distance_squared, IndexNode};

/// One room of the cave
///
/// Rooms refer to each other by index within their [`RoomGraph`].
#[derive(Debug, Clone)]
pub struct Room {
    /// Every open tile of the room
    pub tiles: Vec<IVec3>,
    /// Tiles with at least one solid 18-neighbor
    pub edge_tiles: Vec<IVec3>,
    /// Tile count, the ranking key
    pub size: usize,
    /// Indices of directly connected rooms
    pub connected: Vec<usize>,
    /// Set on exactly one room per generation, the largest
    pub is_main_room: bool,
    /// Flips false to true during connection, never back
    pub is_accessible_from_main_room: bool,
    edge_index: IndexNode,
}

impl Room {
    /// Build a room from a segmented region
    ///
    /// Extracts the edge tiles and builds the approximate index over
    /// them. The region must contain at least one edge tile, which every
    /// wall-bounded region does.
    pub fn new<R: Rng>(tiles: Vec<IVec3>, grid: &VoxelGrid, rng: &mut R) -> Result<Self> {
        let edge_tiles: Vec<IVec3> = tiles
            .iter()
            .copied()
            .filter(|&tile| Self::is_edge_tile(grid, tile))
            .collect();
        let edge_index = IndexNode::build(&edge_tiles, rng)?;

        Ok(Self {
            size: tiles.len(),
            tiles,
            edge_tiles,
            connected: Vec::new(),
            is_main_room: false,
            is_accessible_from_main_room: false,
            edge_index,
        })
    }

    /// A tile is an edge tile when any neighbor sharing at least one
    /// coordinate is solid
    fn is_edge_tile(grid: &VoxelGrid, tile: IVec3) -> bool {
        for nx in tile.x - 1..=tile.x + 1 {
            for ny in tile.y - 1..=tile.y + 1 {
                for nz in tile.z - 1..=tile.z + 1 {
                    if nx != tile.x && ny != tile.y && nz != tile.z {
                        continue;
                    }
                    if grid.cell(IVec3::new(nx, ny, nz)) == Some(CellState::Wall) {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// The approximate index over this room's edge tiles
    pub fn edge_index(&self) -> &IndexNode {
        &self.edge_index
    }

    /// Check for a direct connection to another room
    pub fn is_connected(&self, other: usize) -> bool {
        self.connected.contains(&other)
    }
}

/// The rooms of one generation, ranked largest first
#[derive(Debug, Clone)]
pub struct RoomGraph {
    rooms: Vec<Room>,
}

impl RoomGraph {
    /// Build the graph from segmented room regions
    ///
    /// Rooms are sorted by tile count descending; the largest becomes
    /// the main room and starts out accessible.
    pub fn from_regions<R: Rng>(
        regions: Vec<Vec<IVec3>>,
        grid: &VoxelGrid,
        rng: &mut R,
    ) -> Result<Self> {
        let mut rooms = regions
            .into_iter()
            .map(|region| Room::new(region, grid, rng))
            .collect::<Result<Vec<_>>>()?;

        rooms.sort_by(|a, b| b.size.cmp(&a.size));
        if let Some(main) = rooms.first_mut() {
            main.is_main_room = true;
            main.is_accessible_from_main_room = true;
        }

        Ok(Self { rooms })
    }

    /// All rooms, largest first
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Number of rooms
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// True when no room qualified
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Check the connection guarantee
    pub fn all_accessible(&self) -> bool {
        self.rooms.iter().all(|r| r.is_accessible_from_main_room)
    }

    /// Fill every non-main room back to wall
    ///
    /// Collapses the level to a single cave.
    pub fn collapse_to_main_room(&self, grid: &mut VoxelGrid) {
        for room in &self.rooms {
            if room.is_main_room {
                continue;
            }
            for &tile in &room.tiles {
                grid.set(tile, CellState::Wall);
            }
        }
        log::debug!("collapsed {} side room(s) into the main room", self.rooms.len().saturating_sub(1));
    }

    /// Carve passages until every room is reachable from the main room
    ///
    /// First pass: every room without a connection is joined to its
    /// closest partner. Second pass: while inaccessible rooms remain,
    /// the closest pair across the accessible/inaccessible split is
    /// joined. Closeness is the squared distance between the edge tiles
    /// each room's index returns for the other room's representative
    /// vector, so it inherits the index's approximate semantics.
    pub fn connect_closest_rooms<R: Rng>(
        &mut self,
        grid: &mut VoxelGrid,
        passage_radius: i32,
        rng: &mut R,
        debug_lines: &mut Vec<DebugLine>,
    ) {
        // Pass one: give isolated rooms their nearest neighbor. Passages
        // carved early in the pass are visible to later rooms.
        let candidates: Vec<usize> = (0..self.rooms.len()).collect();
        for a in 0..self.rooms.len() {
            if !self.rooms[a].connected.is_empty() {
                continue;
            }
            if let Some(found) = self.closest_pair(&[a], &candidates) {
                self.create_passage(found, grid, passage_radius, rng, debug_lines);
            }
        }

        // Pass two: force accessibility from the main room
        loop {
            let (inaccessible, accessible): (Vec<usize>, Vec<usize>) = (0..self.rooms.len())
                .partition(|&i| !self.rooms[i].is_accessible_from_main_room);
            if inaccessible.is_empty() {
                break;
            }
            match self.closest_pair(&inaccessible, &accessible) {
                Some(found) => self.create_passage(found, grid, passage_radius, rng, debug_lines),
                None => break,
            }
        }
    }

    /// Best unconnected pair between two room lists
    ///
    /// Queries each room's edge index with the other's representative
    /// vector and compares squared distances between the returned tiles.
    fn closest_pair(&self, list_a: &[usize], list_b: &[usize]) -> Option<Connection> {
        let mut best: Option<Connection> = None;

        for &a in list_a {
            for &b in list_b {
                if a == b || self.rooms[a].is_connected(b) {
                    continue;
                }

                let tile_a = self.rooms[a]
                    .edge_index()
                    .find_closest(self.rooms[b].edge_index().representative());
                let tile_b = self.rooms[b]
                    .edge_index()
                    .find_closest(self.rooms[a].edge_index().representative());
                let dist = distance_squared(tile_a, tile_b);

                if best.as_ref().map_or(true, |c| dist < c.dist) {
                    best = Some(Connection {
                        room_a: a,
                        room_b: b,
                        tile_a,
                        tile_b,
                        dist,
                    });
                }
            }
        }

        best
    }

    /// Register a connection and carve its passage
    fn create_passage<R: Rng>(
        &mut self,
        connection: Connection,
        grid: &mut VoxelGrid,
        passage_radius: i32,
        rng: &mut R,
        debug_lines: &mut Vec<DebugLine>,
    ) {
        let Connection {
            room_a,
            room_b,
            tile_a,
            tile_b,
            ..
        } = connection;

        self.connect(room_a, room_b);
        log::debug!(
            "passage between rooms {} and {} from {} to {}",
            room_a,
            room_b,
            tile_a,
            tile_b
        );

        let dims = grid.dimensions();
        debug_lines.push(DebugLine {
            from: cell_to_world(dims, tile_a),
            to: cell_to_world(dims, tile_b),
            kind: DebugLineKind::Passage,
        });

        for point in line(tile_a, tile_b) {
            grid.stamp_sphere(point, passage_radius, 100, rng);
        }
    }

    /// Record a symmetric connection and spread accessibility
    fn connect(&mut self, a: usize, b: usize) {
        if self.rooms[a].is_accessible_from_main_room {
            self.set_accessible(b);
        } else if self.rooms[b].is_accessible_from_main_room {
            self.set_accessible(a);
        }
        self.rooms[a].connected.push(b);
        self.rooms[b].connected.push(a);
    }

    /// Transitive accessibility closure, worklist style
    ///
    /// Each room flips at most once, so the walk terminates on any
    /// connection graph, cycles included.
    fn set_accessible(&mut self, start: usize) {
        let mut pending = vec![start];
        while let Some(i) = pending.pop() {
            if self.rooms[i].is_accessible_from_main_room {
                continue;
            }
            self.rooms[i].is_accessible_from_main_room = true;
            pending.extend(self.rooms[i].connected.iter().copied());
        }
    }
}

struct Connection {
    room_a: usize,
    room_b: usize,
    tile_a: IVec3,
    tile_b: IVec3,
    dist: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    /// A grid with open boxes at the given corners, walls elsewhere
    fn grid_with_boxes(boxes: &[(IVec3, IVec3)]) -> VoxelGrid {
        let mut grid = VoxelGrid::new(24, 24, 24, 1).unwrap();
        let mut rng = test_rng();
        grid.random_fill(100, &mut rng);
        for &(lo, hi) in boxes {
            for x in lo.x..=hi.x {
                for y in lo.y..=hi.y {
                    for z in lo.z..=hi.z {
                        grid.set(IVec3::new(x, y, z), CellState::Open);
                    }
                }
            }
        }
        grid
    }

    fn box_regions(grid: &VoxelGrid) -> Vec<Vec<IVec3>> {
        crate::regions::regions(grid, CellState::Open)
    }

    #[test]
    fn test_room_edge_tiles() {
        let grid = grid_with_boxes(&[(IVec3::new(4, 4, 4), IVec3::new(8, 8, 8))]);
        let regions = box_regions(&grid);
        assert_eq!(regions.len(), 1);

        let room = Room::new(regions[0].clone(), &grid, &mut test_rng()).unwrap();
        assert_eq!(room.size, 125);
        // A 5x5x5 box touching walls on every side: only the 3x3x3 core
        // is interior
        assert_eq!(room.edge_tiles.len(), 125 - 27);
        assert!(room.edge_tiles.contains(&IVec3::new(4, 4, 4)));
        assert!(!room.edge_tiles.contains(&IVec3::new(6, 6, 6)));
    }

    #[test]
    fn test_main_room_is_largest() {
        let grid = grid_with_boxes(&[
            (IVec3::new(2, 2, 2), IVec3::new(5, 5, 5)),
            (IVec3::new(12, 12, 12), IVec3::new(20, 20, 20)),
        ]);
        let graph = RoomGraph::from_regions(box_regions(&grid), &grid, &mut test_rng()).unwrap();

        assert_eq!(graph.len(), 2);
        assert!(graph.rooms()[0].is_main_room);
        assert!(graph.rooms()[0].is_accessible_from_main_room);
        assert_eq!(graph.rooms()[0].size, 9 * 9 * 9);
        assert!(!graph.rooms()[1].is_main_room);
    }

    #[test]
    fn test_collapse_to_main_room() {
        let mut grid = grid_with_boxes(&[
            (IVec3::new(2, 2, 2), IVec3::new(5, 5, 5)),
            (IVec3::new(12, 12, 12), IVec3::new(20, 20, 20)),
        ]);
        let graph = RoomGraph::from_regions(box_regions(&grid), &grid, &mut test_rng()).unwrap();
        graph.collapse_to_main_room(&mut grid);

        let open_regions = crate::regions::regions(&grid, CellState::Open);
        assert_eq!(open_regions.len(), 1);
        assert_eq!(open_regions[0].len(), 9 * 9 * 9);
    }

    #[test]
    fn test_connect_two_rooms() {
        let mut grid = grid_with_boxes(&[
            (IVec3::new(2, 2, 2), IVec3::new(6, 6, 6)),
            (IVec3::new(14, 14, 14), IVec3::new(20, 20, 20)),
        ]);
        let mut rng = test_rng();
        let mut graph = RoomGraph::from_regions(box_regions(&grid), &grid, &mut rng).unwrap();
        let mut lines = Vec::new();
        graph.connect_closest_rooms(&mut grid, 2, &mut rng, &mut lines);

        assert!(graph.all_accessible());
        assert!(graph.rooms()[0].is_connected(1));
        assert!(graph.rooms()[1].is_connected(0));
        assert!(!lines.is_empty());

        // The carved passage merges the open volume into one region
        let open_regions = crate::regions::regions(&grid, CellState::Open);
        assert_eq!(open_regions.len(), 1);
    }

    #[test]
    fn test_connect_many_rooms_all_accessible() {
        let mut grid = grid_with_boxes(&[
            (IVec3::new(2, 2, 2), IVec3::new(6, 6, 6)),
            (IVec3::new(16, 2, 2), IVec3::new(21, 7, 7)),
            (IVec3::new(2, 16, 2), IVec3::new(7, 21, 7)),
            (IVec3::new(15, 15, 15), IVec3::new(21, 21, 21)),
        ]);
        let mut rng = test_rng();
        let mut graph = RoomGraph::from_regions(box_regions(&grid), &grid, &mut rng).unwrap();
        assert_eq!(graph.len(), 4);

        let mut lines = Vec::new();
        graph.connect_closest_rooms(&mut grid, 1, &mut rng, &mut lines);

        assert!(graph.all_accessible());
        for room in graph.rooms() {
            assert!(!room.connected.is_empty());
        }
    }

    #[test]
    fn test_accessibility_propagates_through_chain() {
        let grid = grid_with_boxes(&[
            (IVec3::new(2, 2, 2), IVec3::new(8, 8, 8)),
            (IVec3::new(12, 2, 2), IVec3::new(15, 5, 5)),
            (IVec3::new(18, 2, 2), IVec3::new(21, 5, 5)),
        ]);
        let mut graph =
            RoomGraph::from_regions(box_regions(&grid), &grid, &mut test_rng()).unwrap();

        // Link the two side rooms first, then one of them to main
        graph.connect(1, 2);
        assert!(!graph.rooms()[1].is_accessible_from_main_room);
        assert!(!graph.rooms()[2].is_accessible_from_main_room);

        graph.connect(0, 1);
        assert!(graph.all_accessible());
    }

    #[test]
    fn test_accessibility_never_reverts() {
        let grid = grid_with_boxes(&[
            (IVec3::new(2, 2, 2), IVec3::new(8, 8, 8)),
            (IVec3::new(12, 12, 12), IVec3::new(16, 16, 16)),
        ]);
        let mut graph =
            RoomGraph::from_regions(box_regions(&grid), &grid, &mut test_rng()).unwrap();

        graph.connect(0, 1);
        assert!(graph.all_accessible());
        // Reconnecting must not disturb the flags
        graph.connect(1, 0);
        assert!(graph.all_accessible());
    }

    #[test]
    fn test_empty_graph() {
        let grid = VoxelGrid::new(8, 8, 8, 1).unwrap();
        let graph = RoomGraph::from_regions(Vec::new(), &grid, &mut test_rng()).unwrap();
        assert!(graph.is_empty());
        assert!(graph.all_accessible());
    }
}
