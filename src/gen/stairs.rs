//! Stair placement
//!
//! Selects floor tiles for the tier's entry and exit markers under distance
//! and room-type constraints. Exhausting the retry budget is never fatal:
//! the marker falls back to a fixed default coordinate and the failure is
//! logged.

use rand::Rng;

use super::GenContext;
use crate::ecs::{Position, StairDirection};
use crate::error::GenError;
use crate::world::level::StairMarker;
use crate::world::room::{Room, RoomArchetype, RoomId};

/// Place the down and up stairs for a tier. Host rooms are flagged so the
/// spawn collaborator skips them.
pub fn place_stairs(
    ctx: &mut GenContext<'_>,
    rooms: &mut [Room],
    tier: u32,
) -> (Option<StairMarker>, Option<StairMarker>) {
    if rooms.is_empty() {
        log::warn!("tier {} has no rooms to host stairs", tier);
        return (None, None);
    }
    let min_dist = ctx.cfg.min_stair_distance;
    let map_center = ctx.cfg.map_center();

    // Down stair: inside the boss chamber when one exists, otherwise in a
    // room far enough from the map's geometric center.
    let boss = rooms
        .iter()
        .position(|r| r.archetype == RoomArchetype::BossChamber);
    let (down_room, down_pos, down_fallback) = match boss {
        Some(id) => (id, rooms[id].center(), false),
        None => match pick_room(ctx, rooms, "down stair", |room| {
            room.center().chebyshev_distance(&map_center) >= min_dist
        }) {
            Ok(id) => (id, rooms[id].center(), false),
            Err(e) => {
                log::warn!("{}; using first room's corner", e);
                (0, corner_of(&rooms[0]), true)
            }
        },
    };

    // Up stair: a different, non-boss room far enough from the down stair.
    let up_pick = pick_room(ctx, rooms, "up stair", |room| {
        room.id != down_room
            && room.archetype != RoomArchetype::BossChamber
            && room.center().chebyshev_distance(&down_pos) >= min_dist
    });
    let (up_room, up_pos, up_fallback) = match up_pick {
        Ok(id) => (id, rooms[id].center(), false),
        Err(e) => {
            log::warn!("{}; using default coordinate", e);
            let id = rooms
                .iter()
                .position(|r| r.id != down_room && r.archetype != RoomArchetype::BossChamber)
                .unwrap_or(0);
            let mut pos = corner_of(&rooms[id]);
            if pos == down_pos {
                pos.x += 1;
            }
            (id, pos, true)
        }
    };

    // Markers must sit on Floor; carving is idempotent when they already do
    ctx.carve(down_pos.x, down_pos.y);
    ctx.carve(up_pos.x, up_pos.y);
    rooms[down_room].suppress_spawns = true;
    rooms[up_room].suppress_spawns = true;

    let down = StairMarker {
        tier,
        x: down_pos.x,
        y: down_pos.y,
        direction: StairDirection::Down,
        linked_tier: tier + 1,
        fallback: down_fallback,
    };
    let up = StairMarker {
        tier,
        x: up_pos.x,
        y: up_pos.y,
        direction: StairDirection::Up,
        linked_tier: tier.saturating_sub(1),
        fallback: up_fallback,
    };
    log::debug!(
        "tier {} stairs: down ({}, {}) up ({}, {})",
        tier,
        down.x,
        down.y,
        up.x,
        up.y
    );
    (Some(down), Some(up))
}

/// Bounded random search for a room matching a predicate
fn pick_room(
    ctx: &mut GenContext<'_>,
    rooms: &[Room],
    what: &'static str,
    accept: impl Fn(&Room) -> bool,
) -> Result<RoomId, GenError> {
    let attempts = ctx.cfg.placement.stair_attempts;
    for _ in 0..attempts {
        let id = ctx.rng.gen_range(0..rooms.len());
        if accept(&rooms[id]) {
            return Ok(id);
        }
    }
    Err(GenError::PlacementExhausted { what, attempts })
}

/// Fixed default placement: just inside the room's top-left corner
fn corner_of(room: &Room) -> Position {
    Position::new(room.left, room.top)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gen::rooms::{PlaceRooms, RoomPlacer};
    use crate::gen::test_support::fixture;

    #[test]
    fn test_stairs_are_distinct_floor_cells() {
        let (cfg, mut rng, mut world) = fixture(41);
        let mut ctx = GenContext::new(&cfg, &mut rng, &mut world);
        let mut rooms = RoomPlacer.place_rooms(&mut ctx, 12, false);
        let (down, up) = place_stairs(&mut ctx, &mut rooms, 1);
        let down = down.unwrap();
        let up = up.unwrap();
        assert!((down.x, down.y) != (up.x, up.y));
        assert!(ctx.grid.is_walkable(down.x, down.y));
        assert!(ctx.grid.is_walkable(up.x, up.y));
    }

    #[test]
    fn test_boss_chamber_hosts_down_stair() {
        let (cfg, mut rng, mut world) = fixture(42);
        let mut ctx = GenContext::new(&cfg, &mut rng, &mut world);
        let mut rooms = RoomPlacer.place_rooms(&mut ctx, 10, true);
        let (down, _) = place_stairs(&mut ctx, &mut rooms, 5);
        let down = down.unwrap();
        let boss = rooms
            .iter()
            .find(|r| r.archetype == RoomArchetype::BossChamber)
            .unwrap();
        assert!(boss.contains(down.x, down.y));
        assert!(boss.suppress_spawns);
    }

    #[test]
    fn test_separation_holds_without_fallback() {
        let (cfg, mut rng, mut world) = fixture(43);
        let mut ctx = GenContext::new(&cfg, &mut rng, &mut world);
        let mut rooms = RoomPlacer.place_rooms(&mut ctx, 12, false);
        let (down, up) = place_stairs(&mut ctx, &mut rooms, 1);
        let down = down.unwrap();
        let up = up.unwrap();
        if !down.fallback && !up.fallback {
            let d = Position::new(down.x, down.y).chebyshev_distance(&Position::new(up.x, up.y));
            assert!(d >= cfg.min_stair_distance);
        }
    }

    #[test]
    fn test_unsatisfiable_distance_falls_back() {
        let (mut cfg, mut rng, mut world) = fixture(44);
        cfg.min_stair_distance = 10_000;
        let mut ctx = GenContext::new(&cfg, &mut rng, &mut world);
        let mut rooms = RoomPlacer.place_rooms(&mut ctx, 6, false);
        let (down, up) = place_stairs(&mut ctx, &mut rooms, 1);
        let down = down.unwrap();
        let up = up.unwrap();
        assert!(down.fallback);
        assert!(up.fallback);
        assert!((down.x, down.y) != (up.x, up.y));
        assert!(ctx.grid.is_walkable(down.x, down.y));
        assert!(ctx.grid.is_walkable(up.x, up.y));
    }

    #[test]
    fn test_stair_rooms_suppress_spawns() {
        let (cfg, mut rng, mut world) = fixture(45);
        let mut ctx = GenContext::new(&cfg, &mut rng, &mut world);
        let mut rooms = RoomPlacer.place_rooms(&mut ctx, 12, false);
        place_stairs(&mut ctx, &mut rooms, 1);
        assert!(rooms.iter().filter(|r| r.suppress_spawns).count() >= 2);
    }

    #[test]
    fn test_no_rooms_means_no_stairs() {
        let (cfg, mut rng, mut world) = fixture(46);
        let mut ctx = GenContext::new(&cfg, &mut rng, &mut world);
        let (down, up) = place_stairs(&mut ctx, &mut [], 1);
        assert!(down.is_none());
        assert!(up.is_none());
    }
}
