//! ECS Components
//!
//! One entity exists per grid cell (a `Wall` or a `Floor`), created for
//! collision/rendering purposes. Stair markers are separate entities.

use serde::{Deserialize, Serialize};

/// Position in the dungeon grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another position
    pub fn distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Chebyshev distance (allows diagonal)
    pub fn chebyshev_distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

/// Marks a cell entity as solid wall
#[derive(Debug, Clone, Copy, Default)]
pub struct Wall;

/// Marks a cell entity as walkable floor
#[derive(Debug, Clone, Copy, Default)]
pub struct Floor;

/// Which way a stair transition leads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StairDirection {
    Up,
    Down,
}

/// Stair marker component
#[derive(Debug, Clone, Copy)]
pub struct Stair {
    pub tier: u32,
    pub direction: StairDirection,
    pub linked_tier: u32,
}
