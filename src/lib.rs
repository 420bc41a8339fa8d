pub mod constants;
pub mod direction;
pub mod level_snapshot;
pub mod path_cell;
pub mod path_network;
pub mod tile_grid;

pub use constants::TileKind;
pub use direction::Direction;
pub use level_snapshot::{
    LevelSnapshot, MapStorage, MemoryMapStorage, PathCellRecord, SnapshotError,
};
pub use path_cell::{ConnectionPolicy, PathCell, PathRole};
pub use path_network::PathNetwork;
pub use tile_grid::{GridError, TileGrid, TileGridConfig};
