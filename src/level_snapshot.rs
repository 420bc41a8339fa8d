use crate::constants::{TileKind, DEFAULT_LEVEL_NAME};
use crate::direction::Direction;
use crate::path_cell::PathRole;
use crate::tile_grid::{GridError, TileGrid};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathCellRecord {
    pub x: i32,
    pub y: i32,
    pub role: PathRole,
    pub direction: Direction,
}

/// Flat, persistable form of a tile grid and the path network on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSnapshot {
    pub level_name: String,
    pub width: u32,
    pub height: u32,
    pub tiles: Vec<TileKind>, // row-major, y outer
    pub path_cells: Vec<PathCellRecord>,
}

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("level '{0}' not found")]
    NotFound(String),

    #[error("level dimensions {width}x{height} are empty")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("expected {expected} tiles but got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },

    #[error("path cell record rejected: {0}")]
    Grid(#[from] GridError),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LevelSnapshot {
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    fn validate(&self) -> Result<(), SnapshotError> {
        if self.width == 0 || self.height == 0 {
            return Err(SnapshotError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        let expected = self.width as usize * self.height as usize;
        if self.tiles.len() != expected {
            return Err(SnapshotError::TileCountMismatch {
                expected,
                actual: self.tiles.len(),
            });
        }
        if let Some(record) = self.path_cells.iter().find(|r| {
            r.x < 0 || r.y < 0 || r.x >= self.width as i32 || r.y >= self.height as i32
        }) {
            return Err(GridError::OutOfBounds {
                x: record.x,
                y: record.y,
            }
            .into());
        }
        Ok(())
    }
}

/// Where levels live. Implementations decide the backing store; the grid
/// only hands over and receives snapshots by name.
pub trait MapStorage {
    fn load_snapshot(&self, name: &str) -> Result<LevelSnapshot, SnapshotError>;

    fn save_snapshot(&mut self, name: &str, snapshot: &LevelSnapshot)
        -> Result<(), SnapshotError>;

    fn contains(&self, name: &str) -> bool;
}

/// Keeps levels as serialized JSON in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryMapStorage {
    levels: HashMap<String, String>,
}

impl MemoryMapStorage {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn raw(&self, name: &str) -> Option<&str> {
        self.levels.get(name).map(String::as_str)
    }
}

impl MapStorage for MemoryMapStorage {
    fn load_snapshot(&self, name: &str) -> Result<LevelSnapshot, SnapshotError> {
        let json = self
            .levels
            .get(name)
            .ok_or_else(|| SnapshotError::NotFound(name.to_string()))?;
        LevelSnapshot::from_json(json)
    }

    fn save_snapshot(
        &mut self,
        name: &str,
        snapshot: &LevelSnapshot,
    ) -> Result<(), SnapshotError> {
        self.levels.insert(name.to_string(), snapshot.to_json()?);
        Ok(())
    }

    fn contains(&self, name: &str) -> bool {
        self.levels.contains_key(name)
    }
}

impl TileGrid {
    /// Records are sorted by `(y, x)` rather than kept in map order, so the
    /// same network always serializes the same way. Loading rebuilds the
    /// start and end lists from roles, so nothing depends on record order.
    pub fn snapshot(&self, level_name: &str) -> LevelSnapshot {
        let mut path_cells = self
            .network()
            .all_cells()
            .map(|cell| PathCellRecord {
                x: cell.x,
                y: cell.y,
                role: cell.role,
                direction: cell.direction,
            })
            .collect::<Vec<_>>();
        path_cells.sort_by_key(|r| (r.y, r.x));

        LevelSnapshot {
            level_name: level_name.to_string(),
            width: self.cols(),
            height: self.rows(),
            tiles: self.tiles().to_vec(),
            path_cells,
        }
    }

    /// Replace the grid and its network with the snapshot's contents. The
    /// grid is untouched if the snapshot is rejected.
    pub fn restore(&mut self, snapshot: &LevelSnapshot) -> Result<(), SnapshotError> {
        snapshot.validate()?;

        self.replace(snapshot.width, snapshot.height, snapshot.tiles.clone());
        let network = self.network_mut();
        for record in snapshot.path_cells.iter() {
            network.set_cell(record.x, record.y, record.role, record.direction);
        }
        Ok(())
    }

    pub fn save_level<S: MapStorage>(
        &self,
        storage: &mut S,
        name: &str,
    ) -> Result<(), SnapshotError> {
        storage.save_snapshot(name, &self.snapshot(name))?;
        info!("saved level '{}'", name);
        Ok(())
    }

    pub fn load_level<S: MapStorage>(
        &mut self,
        storage: &S,
        name: &str,
    ) -> Result<(), SnapshotError> {
        let snapshot = storage.load_snapshot(name)?;
        self.restore(&snapshot)?;
        info!(
            "loaded level '{}' ({}x{}, {} path cells)",
            name,
            snapshot.width,
            snapshot.height,
            snapshot.path_cells.len()
        );
        if !self.network().validate_all() {
            warn!("level '{}' contains path cells with invalid connections", name);
        }
        Ok(())
    }

    /// Build and store the default level unless the storage already has
    /// one. Returns whether anything was written.
    pub fn ensure_default_level<S: MapStorage>(
        &mut self,
        storage: &mut S,
    ) -> Result<bool, SnapshotError> {
        if storage.contains(DEFAULT_LEVEL_NAME) {
            return Ok(false);
        }
        self.build_default_level();
        self.save_level(storage, DEFAULT_LEVEL_NAME)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use crate::constants::{TileKind, DEFAULT_LEVEL_NAME};
    use crate::direction::Direction;
    use crate::level_snapshot::{
        LevelSnapshot, MapStorage, MemoryMapStorage, PathCellRecord, SnapshotError,
    };
    use crate::path_cell::{PathCell, PathRole};
    use crate::tile_grid::{GridError, TileGrid, TileGridConfig};
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    fn grid(cols: u32, rows: u32) -> TileGrid {
        TileGrid::new(TileGridConfig {
            cols,
            rows,
            ..Default::default()
        })
    }

    fn cell_set(grid: &TileGrid) -> HashSet<PathCell> {
        grid.network().all_cells().copied().collect()
    }

    #[test]
    fn test_snapshot_json() {
        let mut tiny = grid(2, 1);
        tiny.place_path_cell(0, 0, PathRole::Start).unwrap();
        tiny.place_path_cell(1, 0, PathRole::End).unwrap();
        let json = tiny.snapshot("tiny").to_json().unwrap();
        insta::assert_snapshot!(json, @r#"
        {
          "level_name": "tiny",
          "width": 2,
          "height": 1,
          "tiles": [
            "Path",
            "Path"
          ],
          "path_cells": [
            {
              "x": 0,
              "y": 0,
              "role": "Start",
              "direction": 8
            },
            {
              "x": 1,
              "y": 0,
              "role": "End",
              "direction": 1
            }
          ]
        }
        "#);
    }

    #[test]
    fn test_snapshot_records_are_sorted() {
        let mut g = grid(4, 4);
        for (x, y) in [(3, 3), (0, 2), (2, 0), (1, 2)] {
            g.place_path_cell(x, y, PathRole::Path).unwrap();
        }
        let coords = g
            .snapshot("sorted")
            .path_cells
            .iter()
            .map(|r| (r.x, r.y))
            .collect::<Vec<_>>();
        assert_eq!(coords, vec![(2, 0), (0, 2), (1, 2), (3, 3)]);
    }

    #[test]
    fn test_restore_round_trip() {
        let mut rng: rand::rngs::StdRng = SeedableRng::seed_from_u64(3);
        let roles = [PathRole::Start, PathRole::End, PathRole::Path];
        let mut g = grid(10, 8);
        for _ in 0..40 {
            let (x, y) = (rng.gen_range(0..10), rng.gen_range(0..8));
            g.place_path_cell(x, y, roles[rng.gen_range(0..roles.len())])
                .unwrap();
            g.set_tile(rng.gen_range(0..10), rng.gen_range(0..8), TileKind::Wall)
                .unwrap();
        }
        let snapshot = g.snapshot("random");
        let json = snapshot.to_json().unwrap();

        let mut restored = grid(3, 3);
        restored.place_path_cell(0, 0, PathRole::Start).unwrap();
        restored
            .restore(&LevelSnapshot::from_json(&json).unwrap())
            .unwrap();

        assert_eq!(restored.cols(), 10);
        assert_eq!(restored.rows(), 8);
        assert_eq!(restored.tiles(), g.tiles());
        assert_eq!(cell_set(&restored), cell_set(&g));
        assert_eq!(
            restored.network().start_cells().count(),
            g.network().start_cells().count()
        );
        assert_eq!(
            restored.network().end_cells().count(),
            g.network().end_cells().count()
        );
    }

    #[test]
    fn test_restore_clears_stale_cells() {
        let mut g = grid(5, 5);
        g.build_default_level();
        let empty = grid(5, 5).snapshot("empty");
        g.restore(&empty).unwrap();
        assert!(g.network().is_empty());
        assert!(g.tiles().iter().all(|t| *t == TileKind::Grass));
    }

    #[test]
    fn test_restore_rejects_bad_snapshots() {
        let mut g = grid(2, 2);
        g.place_path_cell(1, 1, PathRole::End).unwrap();
        let before = g.snapshot("before");

        let mut short = before.clone();
        short.tiles.pop();
        assert!(matches!(
            g.restore(&short),
            Err(SnapshotError::TileCountMismatch {
                expected: 4,
                actual: 3
            })
        ));

        let mut outside = before.clone();
        outside.path_cells.push(PathCellRecord {
            x: 2,
            y: 0,
            role: PathRole::Path,
            direction: Direction::LEFT,
        });
        assert!(matches!(
            g.restore(&outside),
            Err(SnapshotError::Grid(GridError::OutOfBounds { x: 2, y: 0 }))
        ));

        let mut flat = before.clone();
        flat.height = 0;
        assert!(matches!(
            g.restore(&flat),
            Err(SnapshotError::InvalidDimensions { .. })
        ));

        // nothing was applied
        assert_eq!(g.snapshot("before"), before);
    }

    #[test]
    fn test_from_json_masks_unknown_direction_bits() {
        let json = r#"{
            "level_name": "odd",
            "width": 1,
            "height": 1,
            "tiles": ["Path"],
            "path_cells": [{ "x": 0, "y": 0, "role": "Path", "direction": 255 }]
        }"#;
        let snapshot = LevelSnapshot::from_json(json).unwrap();
        assert_eq!(snapshot.path_cells[0].direction, Direction::ALL);

        let mut g = grid(1, 1);
        g.restore(&snapshot).unwrap();
        let cell = g.network().get_cell(0, 0).unwrap();
        assert_eq!(cell.direction.connection_count(), 4);
    }

    #[test]
    fn test_storage_save_and_load() {
        let mut storage = MemoryMapStorage::new();
        let mut g = grid(6, 4);
        g.place_path_cell(0, 1, PathRole::Start).unwrap();
        g.place_path_cell(1, 1, PathRole::End).unwrap();
        g.save_level(&mut storage, "two").unwrap();
        assert!(storage.contains("two"));
        assert!(storage.raw("two").is_some());

        let mut loaded = TileGrid::default();
        loaded.load_level(&storage, "two").unwrap();
        assert_eq!(cell_set(&loaded), cell_set(&g));
        assert_eq!(loaded.network().find_all_valid_paths().len(), 1);
    }

    #[test]
    fn test_storage_missing_level() {
        let storage = MemoryMapStorage::new();
        let mut g = TileGrid::default();
        assert!(matches!(
            g.load_level(&storage, "nope"),
            Err(SnapshotError::NotFound(name)) if name == "nope"
        ));
    }

    #[test]
    fn test_ensure_default_level_writes_once() {
        let mut storage = MemoryMapStorage::new();
        let mut g = TileGrid::default();
        assert!(g.ensure_default_level(&mut storage).unwrap());
        assert!(storage.contains(DEFAULT_LEVEL_NAME));

        g.clear(TileKind::Lava);
        assert!(!g.ensure_default_level(&mut storage).unwrap());
        assert!(g.network().is_empty());

        g.load_level(&storage, DEFAULT_LEVEL_NAME).unwrap();
        assert_eq!(g.network().find_all_valid_paths().len(), 1);
        assert!(g.network().validate_all());
    }

    #[test]
    fn test_storage_trait_object() {
        let mut storage: Box<dyn MapStorage> = Box::new(MemoryMapStorage::new());
        let snapshot = grid(1, 1).snapshot("one");
        storage.save_snapshot("one", &snapshot).unwrap();
        assert_eq!(storage.load_snapshot("one").unwrap(), snapshot);
    }
}
