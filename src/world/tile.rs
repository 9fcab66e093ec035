//! Tile definitions
//!
//! Every grid cell is exactly one of these states at any time.

use serde::{Deserialize, Serialize};

/// State of a single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Wall,
    Floor,
}

impl TileKind {
    pub fn is_walkable(&self) -> bool {
        matches!(self, TileKind::Floor)
    }

    pub fn glyph(&self) -> char {
        match self {
            TileKind::Wall => '#',
            TileKind::Floor => '.',
        }
    }
}

impl Default for TileKind {
    fn default() -> Self {
        TileKind::Wall
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walkability() {
        assert!(TileKind::Floor.is_walkable());
        assert!(!TileKind::Wall.is_walkable());
    }

    #[test]
    fn test_default_is_wall() {
        assert_eq!(TileKind::default(), TileKind::Wall);
    }
}
