use crate::constants::DIRECTIONS;
use crate::direction::Direction;
use crate::path_cell::{ConnectionPolicy, PathCell, PathRole};
use log::{debug, trace};
use nalgebra::Vector2;
use pathfinding::prelude::bfs;
use std::collections::HashMap;

/// Directed path network keyed by grid coordinate.
///
/// Every stored cell has a role other than `None`; the start and end index
/// lists always hold exactly the stored cells with that role, in the order
/// they were given the role.
///
/// The network does not bounds-check coordinates and does not keep
/// neighbors in sync: after placing or removing a cell the caller must run
/// [`PathNetwork::auto_derive_direction`] on the cell and on all four of its
/// neighbors if it wants links to be acknowledged on both sides.
#[derive(Clone, Debug, Default)]
pub struct PathNetwork {
    cells: HashMap<Vector2<i32>, PathCell>,
    starts: Vec<Vector2<i32>>,
    ends: Vec<Vector2<i32>>,
    policy: ConnectionPolicy,
}

impl PathNetwork {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_policy(policy: ConnectionPolicy) -> Self {
        PathNetwork {
            policy,
            ..Default::default()
        }
    }

    #[inline]
    pub fn policy(&self) -> ConnectionPolicy {
        self.policy
    }

    pub fn set_cell(&mut self, x: i32, y: i32, role: PathRole, direction: Direction) {
        let key = Vector2::new(x, y);
        if let Some(existing) = self.cells.get(&key) {
            match existing.role {
                PathRole::Start => self.starts.retain(|p| *p != key),
                PathRole::End => self.ends.retain(|p| *p != key),
                _ => {}
            }
        }

        if role == PathRole::None {
            if self.cells.remove(&key).is_some() {
                trace!("removed path cell ({}, {})", x, y);
            }
            return;
        }

        self.cells.insert(key, PathCell::with(x, y, role, direction));
        match role {
            PathRole::Start => self.starts.push(key),
            PathRole::End => self.ends.push(key),
            _ => {}
        }
        trace!("set path cell ({}, {}) {:?} {}", x, y, role, direction);
    }

    pub fn get_cell(&self, x: i32, y: i32) -> Option<&PathCell> {
        self.cells.get(&Vector2::new(x, y))
    }

    pub fn remove_cell(&mut self, x: i32, y: i32) {
        self.set_cell(x, y, PathRole::None, Direction::NONE);
    }

    /// Recompute the direction of the cell at (x, y) from which of its
    /// orthogonal neighbors are present. Neighbors are left untouched.
    ///
    /// The result is written back through [`PathNetwork::set_cell`], so a
    /// start or end cell moves to the back of its index list.
    pub fn auto_derive_direction(&mut self, x: i32, y: i32) {
        let key = Vector2::new(x, y);
        let mut direction = Direction::NONE;
        for dir in DIRECTIONS.iter() {
            let Some(offset) = dir.to_vec2() else {
                continue;
            };
            if self
                .cells
                .get(&(key + offset))
                .is_some_and(|cell| cell.role != PathRole::None)
            {
                direction |= *dir;
            }
        }

        let Some(role) = self.cells.get(&key).map(|cell| cell.role) else {
            return;
        };
        if role == PathRole::None {
            return;
        }
        self.set_cell(x, y, role, direction);
        trace!("derived direction ({}, {}) {}", x, y, direction);
    }

    pub fn validate_all(&self) -> bool {
        let policy = self.policy;
        self.cells.values().all(|cell| cell.is_valid_with(policy))
    }

    pub fn invalid_cells(&self) -> Vec<PathCell> {
        let policy = self.policy;
        self.cells
            .values()
            .filter(|cell| !cell.is_valid_with(policy))
            .copied()
            .collect()
    }

    /// Shortest route over mutually acknowledged links, both ends inclusive.
    ///
    /// A coordinate that holds no cell yields `None`, the same as an
    /// unreachable end. Ties between equal-length routes are broken by
    /// visiting neighbors Left, Right, Up, Down.
    pub fn find_path(&self, start: Vector2<i32>, end: Vector2<i32>) -> Option<Vec<PathCell>> {
        if !self.cells.contains_key(&start) || !self.cells.contains_key(&end) {
            return None;
        }

        let route = bfs(
            &start,
            |p| {
                let current = self.cells[p];
                DIRECTIONS
                    .iter()
                    .filter_map(|dir| {
                        let next = p + dir.to_vec2()?;
                        let neighbor = self.cells.get(&next)?;
                        current.connects_to(neighbor).then_some(next)
                    })
                    .collect::<Vec<_>>()
            },
            |p| *p == end,
        )?;

        Some(route.iter().map(|p| self.cells[p]).collect())
    }

    /// Routes for every start/end pair that has one, starts outermost.
    pub fn find_all_valid_paths(&self) -> Vec<Vec<PathCell>> {
        let paths = self
            .starts
            .iter()
            .flat_map(|start| self.ends.iter().map(move |end| (*start, *end)))
            .filter_map(|(start, end)| self.find_path(start, end))
            .collect::<Vec<_>>();
        debug!(
            "found {} routes for {} starts x {} ends",
            paths.len(),
            self.starts.len(),
            self.ends.len()
        );
        paths
    }

    pub fn clear(&mut self) {
        debug!("clearing path network of {} cells", self.cells.len());
        self.cells.clear();
        self.starts.clear();
        self.ends.clear();
    }

    pub fn all_cells(&self) -> impl Iterator<Item = &PathCell> {
        self.cells.values()
    }

    pub fn start_cells(&self) -> impl Iterator<Item = &PathCell> {
        self.starts.iter().filter_map(|p| self.cells.get(p))
    }

    pub fn end_cells(&self) -> impl Iterator<Item = &PathCell> {
        self.ends.iter().filter_map(|p| self.cells.get(p))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
