//! Rooms
//!
//! Rectangular rooms with an archetype and a recorded connection set. The
//! connection sets form the graph the connectivity repair pass operates on.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::ecs::Position;

/// Identifier of a room within its level (index into the room list)
pub type RoomId = usize;

/// Room shape/size classes, each with its own placement probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomArchetype {
    Square,
    Vertical,
    Horizontal,
    Alcove,
    BossChamber,
}

impl RoomArchetype {
    /// Alcoves and boss chambers are destinations, not thoroughfares
    pub fn is_terminal(&self) -> bool {
        matches!(self, RoomArchetype::Alcove | RoomArchetype::BossChamber)
    }
}

/// A placed rectangular room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
    pub archetype: RoomArchetype,
    /// Rooms this one is connected to by a carved corridor
    pub connections: HashSet<RoomId>,
    /// Set for stair-hosting rooms so the spawn collaborator skips them
    pub suppress_spawns: bool,
    /// True when the room was accepted past its placement budget
    pub fallback: bool,
}

impl Room {
    pub fn new(id: RoomId, left: i32, top: i32, width: i32, height: i32, archetype: RoomArchetype) -> Self {
        Self {
            id,
            left,
            top,
            width,
            height,
            archetype,
            connections: HashSet::new(),
            suppress_spawns: false,
            fallback: false,
        }
    }

    /// Integer midpoint of the rectangle
    pub fn center(&self) -> Position {
        Position::new(self.left + self.width / 2, self.top + self.height / 2)
    }

    pub fn area(&self) -> i32 {
        self.width * self.height
    }

    pub fn right(&self) -> i32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.top + self.height
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right() && y >= self.top && y < self.bottom()
    }

    pub fn intersects(&self, other: &Room) -> bool {
        self.overlap_area(other) > 0
    }

    /// Overlapping area in cells between this room and another
    pub fn overlap_area(&self, other: &Room) -> i32 {
        let ox = (self.right().min(other.right()) - self.left.max(other.left)).max(0);
        let oy = (self.bottom().min(other.bottom()) - self.top.max(other.top)).max(0);
        ox * oy
    }

    /// Chebyshev distance between room centers
    pub fn center_distance(&self, other: &Room) -> i32 {
        self.center().chebyshev_distance(&other.center())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(id: RoomId, left: i32, top: i32, w: i32, h: i32) -> Room {
        Room::new(id, left, top, w, h, RoomArchetype::Square)
    }

    #[test]
    fn test_center_is_integer_midpoint() {
        let r = room(0, 4, 6, 8, 10);
        assert_eq!(r.center(), Position::new(8, 11));
    }

    #[test]
    fn test_overlap_area() {
        let a = room(0, 0, 0, 10, 10);
        let b = room(1, 8, 8, 10, 10);
        assert_eq!(a.overlap_area(&b), 4);
        assert!(a.intersects(&b));
    }

    #[test]
    fn test_disjoint_rooms_do_not_intersect() {
        let a = room(0, 0, 0, 5, 5);
        let b = room(1, 10, 10, 5, 5);
        assert_eq!(a.overlap_area(&b), 0);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_contains_is_half_open() {
        let r = room(0, 2, 2, 4, 4);
        assert!(r.contains(2, 2));
        assert!(r.contains(5, 5));
        assert!(!r.contains(6, 6));
    }

    #[test]
    fn test_terminal_archetypes() {
        assert!(RoomArchetype::Alcove.is_terminal());
        assert!(RoomArchetype::BossChamber.is_terminal());
        assert!(!RoomArchetype::Square.is_terminal());
    }
}
