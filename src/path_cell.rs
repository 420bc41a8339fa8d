use crate::constants::{MAX_CONNECTIONS, MIN_CONNECTIONS};
use crate::direction::Direction;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PathRole {
    #[default]
    None, // Not part of the network
    Start, // Spawn
    End,   // Destination
    Path,
}

/// Inclusive connection-count range a non-None cell must satisfy.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ConnectionPolicy {
    pub min: u32,
    pub max: u32,
}

impl Default for ConnectionPolicy {
    fn default() -> Self {
        ConnectionPolicy {
            min: MIN_CONNECTIONS,
            max: MAX_CONNECTIONS,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PathCell {
    pub x: i32,
    pub y: i32,
    pub role: PathRole,
    pub direction: Direction,
}

impl PathCell {
    pub fn new(x: i32, y: i32) -> Self {
        PathCell::with(x, y, PathRole::None, Direction::NONE)
    }

    pub fn with(x: i32, y: i32, role: PathRole, direction: Direction) -> Self {
        PathCell {
            x,
            y,
            role,
            direction,
        }
    }

    #[inline]
    pub fn position(&self) -> Vector2<i32> {
        Vector2::new(self.x, self.y)
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_with(ConnectionPolicy::default())
    }

    pub fn is_valid_with(&self, policy: ConnectionPolicy) -> bool {
        match self.role {
            PathRole::None => true,
            PathRole::Start | PathRole::End | PathRole::Path => {
                self.direction.is_valid_count(policy.min, policy.max)
            }
        }
    }

    /// Flag pointing from this cell to `other`, or `NONE` unless `other` is
    /// an orthogonal neighbor.
    pub fn direction_to(&self, other: &PathCell) -> Direction {
        match (other.x - self.x, other.y - self.y) {
            (-1, 0) => Direction::LEFT,
            (1, 0) => Direction::RIGHT,
            (0, -1) => Direction::UP,
            (0, 1) => Direction::DOWN,
            _ => Direction::NONE,
        }
    }

    /// Both sides must declare the link for it to count.
    pub fn connects_to(&self, other: &PathCell) -> bool {
        let toward = self.direction_to(other);
        !toward.is_empty()
            && self.direction.contains(toward)
            && other.direction.contains(toward.opposite())
    }
}

impl fmt::Display for PathCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PathCell({},{}) {:?} {}",
            self.x, self.y, self.role, self.direction
        )
    }
}
