//! Face directions of a grid cell.
//!
//! Axis convention: North = +Z, South = -Z, East = +X, West = -X,
//! Top = +Y, Bottom = -Y.

use bevy::math::IVec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of face directions.
pub const DIRECTION_COUNT: usize = 6;

/// One of the six faces of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
    Top,
    Bottom,
}

impl Direction {
    /// All directions, in propagation order.
    pub const ALL: [Direction; DIRECTION_COUNT] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::Top,
        Direction::Bottom,
    ];

    /// Dense index, matching the position in [`Direction::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::South => 1,
            Direction::East => 2,
            Direction::West => 3,
            Direction::Top => 4,
            Direction::Bottom => 5,
        }
    }

    /// The face a neighbor shows back across this face.
    #[inline]
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::Top => Direction::Bottom,
            Direction::Bottom => Direction::Top,
        }
    }

    /// Unit grid offset towards the neighbor on this face.
    #[inline]
    pub fn offset(self) -> IVec3 {
        match self {
            Direction::North => IVec3::new(0, 0, 1),
            Direction::South => IVec3::new(0, 0, -1),
            Direction::East => IVec3::new(1, 0, 0),
            Direction::West => IVec3::new(-1, 0, 0),
            Direction::Top => IVec3::new(0, 1, 0),
            Direction::Bottom => IVec3::new(0, -1, 0),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
            Direction::Top => "top",
            Direction::Bottom => "bottom",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_is_involution() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_ne!(dir.opposite(), dir);
        }
    }

    #[test]
    fn test_opposite_offsets_cancel() {
        for dir in Direction::ALL {
            assert_eq!(dir.offset() + dir.opposite().offset(), IVec3::ZERO);
        }
    }

    #[test]
    fn test_index_matches_all_order() {
        for (i, dir) in Direction::ALL.iter().enumerate() {
            assert_eq!(dir.index(), i);
        }
    }
}
