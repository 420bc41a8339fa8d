use crate::constants::DIRECTIONS;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Set of orthogonal links a cell declares, stored as a 4-bit mask.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct Direction(u8);

impl Direction {
    pub const NONE: Direction = Direction(0);
    pub const LEFT: Direction = Direction(1 << 0);
    pub const UP: Direction = Direction(1 << 1);
    pub const DOWN: Direction = Direction(1 << 2);
    pub const RIGHT: Direction = Direction(1 << 3);
    pub const ALL: Direction = Direction(0b1111);

    pub fn from_bits_truncate(bits: u8) -> Self {
        Direction(bits & Self::ALL.0)
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if every flag of `other` is set. `NONE` is never contained.
    #[inline]
    pub fn contains(self, other: Direction) -> bool {
        !other.is_empty() && self.0 & other.0 == other.0
    }

    pub fn connection_count(self) -> u32 {
        self.0.count_ones()
    }

    /// Opposite of a single flag. Composite or empty masks map to `NONE`.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::LEFT => Direction::RIGHT,
            Direction::RIGHT => Direction::LEFT,
            Direction::UP => Direction::DOWN,
            Direction::DOWN => Direction::UP,
            _ => Direction::NONE,
        }
    }

    pub fn is_valid_count(self, min: u32, max: u32) -> bool {
        (min..=max).contains(&self.connection_count())
    }

    /// Grid offset of a single flag. Up is toward smaller `y`.
    pub fn to_vec2(self) -> Option<Vector2<i32>> {
        match self {
            Direction::LEFT => Some(Vector2::new(-1, 0)),
            Direction::RIGHT => Some(Vector2::new(1, 0)),
            Direction::UP => Some(Vector2::new(0, -1)),
            Direction::DOWN => Some(Vector2::new(0, 1)),
            _ => None,
        }
    }

    pub fn flags(self) -> impl Iterator<Item = Direction> {
        DIRECTIONS.iter().copied().filter(move |d| self.contains(*d))
    }
}

impl From<u8> for Direction {
    fn from(bits: u8) -> Self {
        Direction::from_bits_truncate(bits)
    }
}

impl From<Direction> for u8 {
    fn from(direction: Direction) -> Self {
        direction.0
    }
}

impl BitOr for Direction {
    type Output = Direction;

    fn bitor(self, rhs: Self) -> Self::Output {
        Direction(self.0 | rhs.0)
    }
}

impl BitOrAssign for Direction {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Direction {
    type Output = Direction;

    fn bitand(self, rhs: Self) -> Self::Output {
        Direction(self.0 & rhs.0)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "None");
        }
        let names = self
            .flags()
            .map(|d| match d {
                Direction::LEFT => "Left",
                Direction::RIGHT => "Right",
                Direction::UP => "Up",
                _ => "Down",
            })
            .collect::<Vec<_>>();
        write!(f, "{}", names.join("|"))
    }
}
