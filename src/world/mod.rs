//! World module
//!
//! Tile states, the fixed-size grid, rooms, and the per-tier level record.

pub mod grid;
pub mod level;
pub mod room;
pub mod tile;

pub use grid::TileGrid;
pub use level::{Level, LevelBlueprint, LevelHandle, StairMarker};
pub use room::{Room, RoomArchetype, RoomId};
pub use tile::TileKind;
