use std::collections::{HashSet, VecDeque};

use crate::constants::{TILE_DOOR, TILE_OPEN, TILE_WALL};
use crate::error::MapError;
use crate::types::{Direction, Vec2, Vec2f};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileKind {
    Open,
    Wall,
    Door,
}

impl TileKind {
    fn from_code(code: u8) -> Option<Self> {
        match code {
            TILE_OPEN => Some(TileKind::Open),
            TILE_WALL => Some(TileKind::Wall),
            TILE_DOOR => Some(TileKind::Door),
            _ => None,
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c {
            '.' | ' ' => Some(TileKind::Open),
            '#' => Some(TileKind::Wall),
            '-' => Some(TileKind::Door),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GridCell {
    pub index: usize,
    pub position: Vec2f,
    pub center: Vec2f,
    pub row: i32,
    pub col: i32,
    pub kind: TileKind,
    pub walkable: bool,
}

/// Static walkable grid. Every query is bounds-checked and degrades to a safe
/// default (not walkable, `None`, clamped cell) instead of failing.
#[derive(Clone, Debug)]
pub struct GridMap {
    cols: i32,
    rows: i32,
    cell_size: f32,
    padding: Vec2f,
    cells: Vec<GridCell>,
}

impl GridMap {
    pub fn from_rows(rows: &[&str], cell_size: f32, padding: Vec2f) -> Result<Self, MapError> {
        let mut kinds = Vec::with_capacity(rows.len());
        for (row, line) in rows.iter().enumerate() {
            let mut out = Vec::with_capacity(line.len());
            for (col, tile) in line.chars().enumerate() {
                let kind =
                    TileKind::from_char(tile).ok_or(MapError::UnknownTile { row, col, tile })?;
                out.push(kind);
            }
            kinds.push(out);
        }
        Self::build(kinds, cell_size, padding)
    }

    pub fn from_codes(codes: &[Vec<u8>], cell_size: f32, padding: Vec2f) -> Result<Self, MapError> {
        let mut kinds = Vec::with_capacity(codes.len());
        for (row, line) in codes.iter().enumerate() {
            let mut out = Vec::with_capacity(line.len());
            for (col, code) in line.iter().enumerate() {
                let kind = TileKind::from_code(*code).ok_or(MapError::UnknownTile {
                    row,
                    col,
                    tile: char::from(b'0'.saturating_add(*code)),
                })?;
                out.push(kind);
            }
            kinds.push(out);
        }
        Self::build(kinds, cell_size, padding)
    }

    pub fn open(cols: usize, rows: usize, cell_size: f32) -> Result<Self, MapError> {
        Self::build(
            vec![vec![TileKind::Open; cols]; rows],
            cell_size,
            Vec2f::default(),
        )
    }

    fn build(kinds: Vec<Vec<TileKind>>, cell_size: f32, padding: Vec2f) -> Result<Self, MapError> {
        if cell_size.is_nan() || cell_size <= 0.0 {
            return Err(MapError::InvalidCellSize(cell_size));
        }
        let Some(first) = kinds.first() else {
            return Err(MapError::Empty);
        };
        let cols = first.len();
        if cols == 0 {
            return Err(MapError::Empty);
        }
        for (row, line) in kinds.iter().enumerate() {
            if line.len() != cols {
                return Err(MapError::RaggedRow {
                    row,
                    expected: cols,
                    actual: line.len(),
                });
            }
        }

        let mut cells = Vec::with_capacity(cols * kinds.len());
        for (row, line) in kinds.iter().enumerate() {
            for (col, kind) in line.iter().enumerate() {
                let position = Vec2f {
                    x: padding.x + col as f32 * cell_size,
                    y: padding.y + row as f32 * cell_size,
                };
                cells.push(GridCell {
                    index: cells.len(),
                    position,
                    center: Vec2f {
                        x: position.x + cell_size / 2.0,
                        y: position.y + cell_size / 2.0,
                    },
                    row: row as i32,
                    col: col as i32,
                    kind: *kind,
                    walkable: *kind != TileKind::Wall,
                });
            }
        }

        Ok(Self {
            cols: cols as i32,
            rows: kinds.len() as i32,
            cell_size,
            padding,
            cells,
        })
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn is_inside(&self, col_row: Vec2) -> bool {
        col_row.x >= 0 && col_row.y >= 0 && col_row.x < self.cols && col_row.y < self.rows
    }

    pub fn col_row_to_index(&self, col_row: Vec2) -> Option<usize> {
        if !self.is_inside(col_row) {
            return None;
        }
        Some((col_row.y * self.cols + col_row.x) as usize)
    }

    pub fn index_to_col_row(&self, index: usize) -> Option<Vec2> {
        if index >= self.cells.len() {
            return None;
        }
        let cols = self.cols as usize;
        Some(Vec2 {
            x: (index % cols) as i32,
            y: (index / cols) as i32,
        })
    }

    /// Top-left corner of a cell. Pure affine transform, valid off-grid too.
    pub fn col_row_to_coords(&self, col_row: Vec2) -> Vec2f {
        Vec2f {
            x: self.padding.x + col_row.x as f32 * self.cell_size,
            y: self.padding.y + col_row.y as f32 * self.cell_size,
        }
    }

    pub fn col_row_to_center(&self, col_row: Vec2) -> Vec2f {
        let top_left = self.col_row_to_coords(col_row);
        Vec2f {
            x: top_left.x + self.cell_size / 2.0,
            y: top_left.y + self.cell_size / 2.0,
        }
    }

    /// Floors, so points left of or above the padding map to negative cells.
    pub fn coords_to_col_row(&self, coords: Vec2f) -> Vec2 {
        Vec2 {
            x: ((coords.x - self.padding.x) / self.cell_size).floor() as i32,
            y: ((coords.y - self.padding.y) / self.cell_size).floor() as i32,
        }
    }

    pub fn cell(&self, col_row: Vec2) -> Option<&GridCell> {
        self.col_row_to_index(col_row)
            .and_then(|index| self.cells.get(index))
    }

    pub fn cell_at(&self, coords: Vec2f) -> Option<&GridCell> {
        self.cell(self.coords_to_col_row(coords))
    }

    pub fn is_walkable_index(&self, index: usize) -> bool {
        self.cells.get(index).map(|cell| cell.walkable).unwrap_or(false)
    }

    pub fn is_walkable(&self, col_row: Vec2) -> bool {
        self.cell(col_row).map(|cell| cell.walkable).unwrap_or(false)
    }

    pub fn are_coords_walkable(&self, coords: Vec2f) -> bool {
        self.cell_at(coords).map(|cell| cell.walkable).unwrap_or(false)
    }

    pub fn is_walkable_toward(&self, col_row: Vec2, dir: Direction) -> bool {
        self.is_walkable(col_row.step(dir, 1))
    }

    pub fn clamp_col_row(&self, col_row: Vec2) -> Vec2 {
        Vec2 {
            x: col_row.x.clamp(0, self.cols - 1),
            y: col_row.y.clamp(0, self.rows - 1),
        }
    }

    pub fn set_door_walkable(&mut self, col_row: Vec2, walkable: bool) -> bool {
        let Some(index) = self.col_row_to_index(col_row) else {
            return false;
        };
        let cell = &mut self.cells[index];
        if cell.kind != TileKind::Door {
            tracing::warn!(
                col = col_row.x,
                row = col_row.y,
                "ignoring walkability toggle on a non-door cell"
            );
            return false;
        }
        cell.walkable = walkable;
        true
    }

    pub fn doors(&self) -> Vec<Vec2> {
        self.cells
            .iter()
            .filter(|cell| cell.kind == TileKind::Door)
            .map(|cell| Vec2 {
                x: cell.col,
                y: cell.row,
            })
            .collect()
    }

    pub fn reachable_from(&self, start: Vec2) -> HashSet<Vec2> {
        let mut out = HashSet::new();
        if !self.is_walkable(start) {
            return out;
        }

        let mut queue = VecDeque::new();
        out.insert(start);
        queue.push_back(start);

        while let Some(cell) = queue.pop_front() {
            for dir in Direction::ALL {
                let next = cell.step(dir, 1);
                if !self.is_walkable(next) {
                    continue;
                }
                if out.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use crate::constants::{
        default_ghost_spawns, CELL_SIZE, DEFAULT_MAZE, DEFAULT_PLAYER_SPAWN,
    };
    use crate::error::MapError;
    use crate::types::{Vec2, Vec2f};

    use super::{GridMap, TileKind};

    fn default_map() -> GridMap {
        GridMap::from_rows(&DEFAULT_MAZE, CELL_SIZE, Vec2f::new(8.0, 24.0)).expect("valid maze")
    }

    #[test]
    fn index_and_col_row_are_a_bijection() {
        let map = default_map();
        for index in 0..map.cell_count() {
            let col_row = map.index_to_col_row(index).expect("index in range");
            assert_eq!(map.col_row_to_index(col_row), Some(index));
            assert_eq!(index as i32, col_row.y * map.cols() + col_row.x);
        }
        assert_eq!(map.index_to_col_row(map.cell_count()), None);
        assert_eq!(map.col_row_to_index(Vec2::new(map.cols(), 0)), None);
    }

    #[test]
    fn coords_round_trip_through_cell_centers() {
        let map = default_map();
        for cell in map.cells() {
            let col_row = Vec2::new(cell.col, cell.row);
            assert_eq!(map.col_row_to_coords(col_row), cell.position);
            assert_eq!(map.coords_to_col_row(cell.center), col_row);
            assert_eq!(map.col_row_to_center(col_row), cell.center);
        }
        assert_eq!(map.coords_to_col_row(Vec2f::new(0.0, 0.0)), Vec2::new(-1, -2));
    }

    #[test]
    fn out_of_range_queries_are_not_walkable() {
        let map = default_map();
        assert!(!map.is_walkable(Vec2::new(-1, 3)));
        assert!(!map.is_walkable(Vec2::new(3, map.rows())));
        assert!(!map.is_walkable_index(usize::MAX));
        assert!(!map.are_coords_walkable(Vec2f::new(-500.0, 9999.0)));
        assert!(map.cell(Vec2::new(100, 100)).is_none());
    }

    #[test]
    fn clamp_pulls_cells_into_bounds() {
        let map = default_map();
        assert_eq!(map.clamp_col_row(Vec2::new(-7, 40)), Vec2::new(0, map.rows() - 1));
        assert_eq!(map.clamp_col_row(Vec2::new(50, -1)), Vec2::new(map.cols() - 1, 0));
        assert_eq!(map.clamp_col_row(Vec2::new(3, 4)), Vec2::new(3, 4));
    }

    #[test]
    fn only_doors_can_be_toggled() {
        let mut map = default_map();
        let doors = map.doors();
        assert_eq!(doors, vec![Vec2::new(9, 8)]);
        assert!(map.is_walkable(doors[0]));
        assert!(map.set_door_walkable(doors[0], false));
        assert!(!map.is_walkable(doors[0]));
        assert!(!map.set_door_walkable(Vec2::new(0, 0), true));
        assert!(!map.is_walkable(Vec2::new(0, 0)));
        assert!(!map.set_door_walkable(Vec2::new(-1, -1), true));
    }

    #[test]
    fn default_maze_is_fully_connected_and_spawns_are_open() {
        let map = default_map();
        let reachable = map.reachable_from(DEFAULT_PLAYER_SPAWN);
        let walkable = map.cells().iter().filter(|cell| cell.walkable).count();
        assert_eq!(reachable.len(), walkable);
        for spawn in default_ghost_spawns() {
            assert!(reachable.contains(&spawn.cell), "spawn {:?} unreachable", spawn.kind);
        }
    }

    #[test]
    fn parses_numeric_tile_codes() {
        let map = GridMap::from_codes(&[vec![0, 1, 2], vec![0, 0, 0]], 10.0, Vec2f::default())
            .expect("valid codes");
        assert_eq!(map.cols(), 3);
        assert_eq!(map.rows(), 2);
        assert_eq!(map.cell(Vec2::new(1, 0)).map(|c| c.kind), Some(TileKind::Wall));
        assert_eq!(map.cell(Vec2::new(2, 0)).map(|c| c.kind), Some(TileKind::Door));
    }

    #[test]
    fn malformed_tables_are_rejected() {
        assert!(matches!(
            GridMap::from_rows(&[], CELL_SIZE, Vec2f::default()),
            Err(MapError::Empty)
        ));
        assert!(matches!(
            GridMap::from_rows(&["...", ".."], CELL_SIZE, Vec2f::default()),
            Err(MapError::RaggedRow {
                row: 1,
                expected: 3,
                actual: 2
            })
        ));
        assert!(matches!(
            GridMap::from_rows(&[".x."], CELL_SIZE, Vec2f::default()),
            Err(MapError::UnknownTile { row: 0, col: 1, tile: 'x' })
        ));
        assert!(matches!(
            GridMap::from_codes(&[vec![0, 7]], CELL_SIZE, Vec2f::default()),
            Err(MapError::UnknownTile { row: 0, col: 1, .. })
        ));
        assert!(matches!(
            GridMap::open(2, 2, 0.0),
            Err(MapError::InvalidCellSize(_))
        ));
    }
}
