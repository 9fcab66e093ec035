//! Level record
//!
//! The finalized per-tier record: grid, rooms, stair markers, and the
//! identifiers of the cell entities the generator materialized. Created
//! lazily on first visit, cached for the session, never regenerated.

use std::sync::Arc;

use hecs::Entity;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::grid::TileGrid;
use super::room::{Room, RoomArchetype, RoomId};
use super::tile::TileKind;
use crate::ecs::StairDirection;

/// Shared handle to a cached level, safe to hand to collaborator threads
pub type LevelHandle = Arc<Mutex<Level>>;

/// An up or down transition marker
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StairMarker {
    pub tier: u32,
    pub x: i32,
    pub y: i32,
    pub direction: StairDirection,
    pub linked_tier: u32,
    /// True when placement exhausted its retry budget and used the default
    pub fallback: bool,
}

/// One generated (or pre-authored, repaired) dungeon tier
#[derive(Debug)]
pub struct Level {
    pub tier: u32,
    pub grid: TileGrid,
    pub rooms: Vec<Room>,
    pub up_stair: Option<StairMarker>,
    pub down_stair: Option<StairMarker>,
    /// One entity per grid cell, parallel to the grid's cells
    pub cell_entities: Vec<Entity>,
    pub stair_entities: Vec<Entity>,
}

impl Level {
    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        self.grid.is_walkable(x, y)
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id)
    }

    /// Rooms the spawn collaborator may populate
    pub fn spawnable_rooms(&self) -> Vec<RoomId> {
        self.rooms
            .iter()
            .filter(|r| !r.suppress_spawns)
            .map(|r| r.id)
            .collect()
    }

    pub fn boss_room(&self) -> Option<&Room> {
        self.rooms
            .iter()
            .find(|r| r.archetype == RoomArchetype::BossChamber)
    }

    /// Render the level as an ASCII glyph grid (debug dumps, demo binary)
    pub fn render_ascii(&self) -> String {
        let w = self.grid.width();
        let h = self.grid.height();
        let mut out = String::with_capacity(((w + 1) * h) as usize);
        for y in 0..h {
            for x in 0..w {
                let glyph = if self.stair_at(x, y) == Some(StairDirection::Up) {
                    '<'
                } else if self.stair_at(x, y) == Some(StairDirection::Down) {
                    '>'
                } else {
                    self.grid.get(x, y).unwrap_or(TileKind::Wall).glyph()
                };
                out.push(glyph);
            }
            out.push('\n');
        }
        out
    }

    fn stair_at(&self, x: i32, y: i32) -> Option<StairDirection> {
        for marker in [self.up_stair, self.down_stair].into_iter().flatten() {
            if marker.x == x && marker.y == y {
                return Some(marker.direction);
            }
        }
        None
    }
}

/// Pre-authored level data, as loaded from an external JSON file
///
/// Rows use `#` for wall, any other character for floor. Conformance to the
/// session's grid dimensions is the author's job; the connectivity repair
/// pass still runs over the result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelBlueprint {
    pub width: i32,
    pub height: i32,
    pub rows: Vec<String>,
    pub rooms: Vec<BlueprintRoom>,
    #[serde(default)]
    pub up_stair: Option<(i32, i32)>,
    #[serde(default)]
    pub down_stair: Option<(i32, i32)>,
}

/// A room rectangle inside a blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueprintRoom {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
    #[serde(default = "default_archetype")]
    pub archetype: RoomArchetype,
}

fn default_archetype() -> RoomArchetype {
    RoomArchetype::Square
}

impl LevelBlueprint {
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Build a tile grid from the blueprint rows
    pub fn to_grid(&self) -> TileGrid {
        let mut grid = TileGrid::new(self.width, self.height);
        for (y, row) in self.rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if ch != '#' {
                    grid.set(x as i32, y as i32, TileKind::Floor);
                }
            }
        }
        grid
    }

    /// Convert the blueprint rooms into level rooms with empty connection sets
    pub fn to_rooms(&self) -> Vec<Room> {
        self.rooms
            .iter()
            .enumerate()
            .map(|(id, r)| Room::new(id, r.left, r.top, r.width, r.height, r.archetype))
            .collect()
    }
}
