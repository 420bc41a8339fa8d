use crate::constants::{TileKind, DEFAULT_COLS, DEFAULT_ROWS, DIRECTIONS};
use crate::direction::Direction;
use crate::path_cell::PathRole;
use crate::path_network::PathNetwork;
use log::{debug, info};
use thiserror::Error;

pub struct TileGridConfig {
    pub cols: u32, // Width of the grid (x-axis)
    pub rows: u32, // Height of the grid (y-axis)
    pub fill: TileKind,
}

impl Default for TileGridConfig {
    fn default() -> Self {
        TileGridConfig {
            cols: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
            fill: TileKind::Grass,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GridError {
    #[error("coordinate ({x}, {y}) is outside the grid")]
    OutOfBounds { x: i32, y: i32 },
}

/// Dense terrain grid that owns the path network laid over it.
///
/// This is the layer that bounds-checks coordinates before they reach the
/// network and keeps neighbor directions consistent after edits.
#[derive(Clone, Debug)]
pub struct TileGrid {
    cols: u32,
    rows: u32,
    tiles: Vec<TileKind>,
    network: PathNetwork,
}

impl TileGrid {
    pub fn new(config: TileGridConfig) -> Self {
        TileGrid {
            cols: config.cols,
            rows: config.rows,
            tiles: vec![config.fill; config.cols as usize * config.rows as usize],
            network: PathNetwork::new(),
        }
    }

    #[inline]
    pub fn cols(&self) -> u32 {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Row-major, `y` outer.
    pub fn tiles(&self) -> &[TileKind] {
        &self.tiles
    }

    pub fn network(&self) -> &PathNetwork {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut PathNetwork {
        &mut self.network
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        0 <= x && x < self.cols as i32 && 0 <= y && y < self.rows as i32
    }

    fn index(&self, x: i32, y: i32) -> Result<usize, GridError> {
        if !self.contains(x, y) {
            return Err(GridError::OutOfBounds { x, y });
        }
        Ok(y as usize * self.cols as usize + x as usize)
    }

    pub fn tile(&self, x: i32, y: i32) -> Option<TileKind> {
        self.index(x, y).ok().map(|i| self.tiles[i])
    }

    pub fn set_tile(&mut self, x: i32, y: i32, kind: TileKind) -> Result<(), GridError> {
        let i = self.index(x, y)?;
        self.tiles[i] = kind;
        Ok(())
    }

    pub fn clear(&mut self, fill: TileKind) {
        self.tiles.iter_mut().for_each(|tile| *tile = fill);
        self.network.clear();
    }

    /// Place a path cell, mark its tile as path and re-derive the cell and
    /// its four neighbors so every link is acknowledged on both sides.
    pub fn place_path_cell(&mut self, x: i32, y: i32, role: PathRole) -> Result<(), GridError> {
        self.set_tile(x, y, TileKind::Path)?;
        self.network.set_cell(x, y, role, Direction::NONE);
        self.network.auto_derive_direction(x, y);
        self.derive_neighbors(x, y);
        Ok(())
    }

    /// Remove a path cell and re-derive its neighbors. The terrain tile is
    /// left unchanged.
    pub fn remove_path_cell(&mut self, x: i32, y: i32) -> Result<(), GridError> {
        self.index(x, y)?;
        self.network.remove_cell(x, y);
        self.derive_neighbors(x, y);
        Ok(())
    }

    fn derive_neighbors(&mut self, x: i32, y: i32) {
        for offset in DIRECTIONS.iter().filter_map(|d| d.to_vec2()) {
            let (nx, ny) = (x + offset.x, y + offset.y);
            // neighbors outside the grid never hold cells placed through here
            if self.contains(nx, ny) {
                self.network.auto_derive_direction(nx, ny);
            }
        }
    }

    /// Grass everywhere with a single straight route along the middle row.
    pub fn build_default_level(&mut self) {
        self.clear(TileKind::Grass);
        if self.cols == 0 || self.rows == 0 {
            return;
        }

        let row = (self.rows / 2) as i32;
        let last = self.cols as i32 - 1;
        for x in 0..=last {
            let i = row as usize * self.cols as usize + x as usize;
            self.tiles[i] = TileKind::Path;
        }
        self.network.set_cell(0, row, PathRole::Start, Direction::RIGHT);
        if last > 0 {
            self.network.set_cell(last, row, PathRole::End, Direction::LEFT);
        }
        for x in 1..last {
            self.network
                .set_cell(x, row, PathRole::Path, Direction::LEFT | Direction::RIGHT);
        }
        info!(
            "built default level {}x{} with route on row {}",
            self.cols, self.rows, row
        );
        debug!("default level has {} path cells", self.network.len());
    }

    pub(crate) fn replace(&mut self, cols: u32, rows: u32, tiles: Vec<TileKind>) {
        self.cols = cols;
        self.rows = rows;
        self.tiles = tiles;
        self.network.clear();
    }
}

impl Default for TileGrid {
    fn default() -> Self {
        TileGrid::new(Default::default())
    }
}
