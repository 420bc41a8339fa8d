use crate::direction::Direction;
use serde::{Deserialize, Serialize};

// Inclusive bounds on how many links a non-None cell may declare
pub const MIN_CONNECTIONS: u32 = 1;
pub const MAX_CONNECTIONS: u32 = 4;

pub const DEFAULT_COLS: u32 = 20;
pub const DEFAULT_ROWS: u32 = 15;
pub const DEFAULT_LEVEL_NAME: &str = "Default";

// Neighbor visitation order used by route discovery
pub const DIRECTIONS: &[Direction; 4] = &[
    Direction::LEFT,
    Direction::RIGHT,
    Direction::UP,
    Direction::DOWN,
];

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TileKind {
    #[default]
    Grass, // Where towers can be built
    Path,  // Where enemies walk
    Wall,
    Cover, // Protected path tile
    Empty,
    Water,
    Lava,
}

impl TileKind {
    pub const ALL: &'static [TileKind; 7] = &[
        TileKind::Grass,
        TileKind::Path,
        TileKind::Wall,
        TileKind::Cover,
        TileKind::Empty,
        TileKind::Water,
        TileKind::Lava,
    ];

    fn index(self) -> usize {
        TileKind::ALL
            .iter()
            .position(|kind| *kind == self)
            .unwrap_or_default()
    }

    /// Next kind in brush order, wrapping around.
    pub fn next(self) -> TileKind {
        TileKind::ALL[(self.index() + 1) % TileKind::ALL.len()]
    }

    /// Previous kind in brush order, wrapping around.
    pub fn previous(self) -> TileKind {
        let len = TileKind::ALL.len();
        TileKind::ALL[(self.index() + len - 1) % len]
    }
}
