use crate::types::{Direction, GhostKind, Vec2};

pub const TICK_RATE: u32 = 60;
pub const TICK_SECS: f32 = 1.0 / TICK_RATE as f32;

pub const CELL_SIZE: f32 = 16.0;
pub const CENTER_TOLERANCE_RATIO: f32 = 0.25;
pub const HITBOX_SCALE: f32 = 0.6;
pub const HOUSE_BOB_RATIO: f32 = 0.5;

pub const MAX_SPEED: f32 = 120.0;
pub const EYES_SPEED_MULTIPLIER: f32 = 2.0;

pub const AMBUSH_LOOKAHEAD: i32 = 4;
pub const FLANK_LOOKAHEAD: i32 = 2;
pub const SHY_DISTANCE: f32 = 8.0;

pub const RELEASE_DELAYS_SECS: [f32; 4] = [0.5, 2.0, 4.0, 6.0];
pub const HOUSE_SWAP_SECS: f32 = 0.5;
pub const FRIGHTENED_BLINK_WINDOW_SECS: f32 = 2.0;
pub const FRIGHTENED_BLINK_INTERVAL_SECS: f32 = 0.25;
pub const SCORE_DISPLAY_SECS: f32 = 1.0;

pub const TILE_OPEN: u8 = 0;
pub const TILE_WALL: u8 = 1;
pub const TILE_DOOR: u8 = 2;

/// `#` wall, `.` open, `-` door.
pub const DEFAULT_MAZE: [&str; 22] = [
    "###################",
    "#........#........#",
    "#.##.###.#.###.##.#",
    "#.................#",
    "#.##.#.#####.#.##.#",
    "#....#...#...#....#",
    "####.###.#.###.####",
    "####.#.......#.####",
    "####.#.##-##.#.####",
    "#......#...#......#",
    "####.#.#...#.#.####",
    "####.#.#####.#.####",
    "####.#.......#.####",
    "####.#.#####.#.####",
    "#........#........#",
    "#.##.###.#.###.##.#",
    "#..#...........#..#",
    "##.#.#.#####.#.#.##",
    "#....#...#...#....#",
    "#.######.#.######.#",
    "#.................#",
    "###################",
];

pub const DEFAULT_PLAYER_SPAWN: Vec2 = Vec2 { x: 9, y: 16 };

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GhostSpawn {
    pub kind: GhostKind,
    pub cell: Vec2,
    pub direction: Direction,
}

pub fn default_ghost_spawns() -> [GhostSpawn; 4] {
    [
        GhostSpawn {
            kind: GhostKind::Blinky,
            cell: Vec2 { x: 9, y: 7 },
            direction: Direction::Right,
        },
        GhostSpawn {
            kind: GhostKind::Pinky,
            cell: Vec2 { x: 9, y: 10 },
            direction: Direction::Up,
        },
        GhostSpawn {
            kind: GhostKind::Inky,
            cell: Vec2 { x: 8, y: 10 },
            direction: Direction::Down,
        },
        GhostSpawn {
            kind: GhostKind::Clyde,
            cell: Vec2 { x: 10, y: 10 },
            direction: Direction::Down,
        },
    ]
}
