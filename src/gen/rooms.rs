//! Room placement
//!
//! Chooses room archetypes by weighted random selection and searches for
//! non-conflicting rectangular placements, scoring several candidates per
//! attempt and relaxing its constraints as the budget runs down. Placement
//! never fails outright: when no clean candidate is found, the best-scored
//! one is accepted and the room is flagged as a fallback.

use rand::rngs::StdRng;
use rand::Rng;

use super::GenContext;
use crate::config::{ArchetypeSpec, WorldgenConfig};
use crate::error::GenError;
use crate::world::room::{Room, RoomArchetype, RoomId};

/// Room placement seam, swappable for a test double
pub trait PlaceRooms {
    fn place_rooms(&mut self, ctx: &mut GenContext<'_>, count: u32, include_boss: bool)
        -> Vec<Room>;
}

/// The production placer
#[derive(Debug, Default)]
pub struct RoomPlacer;

impl PlaceRooms for RoomPlacer {
    fn place_rooms(
        &mut self,
        ctx: &mut GenContext<'_>,
        count: u32,
        include_boss: bool,
    ) -> Vec<Room> {
        let cfg = ctx.cfg;
        if count == 0 {
            return Vec::new();
        }

        // Roll archetypes and sizes up front, then sort largest-area-first
        // so big rooms claim space before small ones. The boss chamber, if
        // any, goes first regardless.
        let normal = if include_boss { count - 1 } else { count };
        let mut plan: Vec<(RoomArchetype, i32, i32)> = Vec::with_capacity(count as usize);
        for _ in 0..normal {
            let spec = roll_archetype(cfg, ctx.rng);
            let (w, h) = sample_size(spec, cfg, ctx.rng);
            plan.push((spec.archetype, w, h));
        }
        plan.sort_by_key(|(_, w, h)| std::cmp::Reverse(w * h));
        if include_boss {
            if let Some(spec) = cfg.archetype_spec(RoomArchetype::BossChamber) {
                let (w, h) = sample_size(spec, cfg, ctx.rng);
                plan.insert(0, (RoomArchetype::BossChamber, w, h));
            }
        }

        let mut rooms: Vec<Room> = Vec::with_capacity(plan.len());
        for (archetype, w, h) in plan {
            if let Some(room) = place_one(ctx, &rooms, rooms.len(), archetype, w, h) {
                ctx.stamp_room(&room);
                rooms.push(room);
            }
        }
        log::info!("placed {} rooms (boss: {})", rooms.len(), include_boss);
        rooms
    }
}

/// Weighted random archetype pick (boss chambers carry weight 0)
fn roll_archetype<'c>(cfg: &'c WorldgenConfig, rng: &mut StdRng) -> &'c ArchetypeSpec {
    let total: u32 = cfg.archetypes.iter().map(|s| s.weight).sum();
    let mut roll = rng.gen_range(0..total.max(1));
    for spec in &cfg.archetypes {
        if roll < spec.weight {
            return spec;
        }
        roll -= spec.weight;
    }
    &cfg.archetypes[0]
}

/// Sample a size within the archetype's bounds, clamped to fit the grid
fn sample_size(spec: &ArchetypeSpec, cfg: &WorldgenConfig, rng: &mut StdRng) -> (i32, i32) {
    let max_w = spec
        .max_width
        .min(cfg.grid_width - 2 * cfg.edge_buffer)
        .max(spec.min_width);
    let max_h = spec
        .max_height
        .min(cfg.grid_height - 2 * cfg.edge_buffer)
        .max(spec.min_height);
    (
        rng.gen_range(spec.min_width..=max_w),
        rng.gen_range(spec.min_height..=max_h),
    )
}

/// Search for a placement for one room
fn place_one(
    ctx: &mut GenContext<'_>,
    placed: &[Room],
    id: RoomId,
    archetype: RoomArchetype,
    w: i32,
    h: i32,
) -> Option<Room> {
    let cfg = ctx.cfg;
    let policy = &cfg.placement;
    let buf = cfg.edge_buffer;
    let x_max = cfg.grid_width - w - buf;
    let y_max = cfg.grid_height - h - buf;
    if x_max < buf || y_max < buf {
        log::warn!(
            "{}",
            GenError::InvalidGeometry {
                room: id,
                x: x_max,
                y: y_max
            }
        );
        return None;
    }
    let map_center = cfg.map_center();

    // (candidate, score, constraint violation). Score folds in the
    // decentralization reward; acceptance mid-search requires a clean
    // candidate (zero violation), not merely a good score.
    let mut best: Option<(Room, f32, f32)> = None;

    for attempt in 0..policy.max_attempts {
        let min_dist = policy.min_distance_at(attempt);
        let tolerance = policy.overlap_at(attempt);
        let mut clean: Option<(Room, f32)> = None;

        for _ in 0..policy.candidates_per_attempt {
            let x = ctx.rng.gen_range(buf..=x_max);
            let y = ctx.rng.gen_range(buf..=y_max);
            let candidate = Room::new(id, x, y, w, h, archetype);
            let violation = violation_penalty(&candidate, placed, min_dist, tolerance);
            let reward = candidate.center().chebyshev_distance(&map_center) as f32 * 1.5;
            let score = violation - reward;

            if violation == 0.0 && clean.as_ref().map_or(true, |(_, s)| score < *s) {
                clean = Some((candidate.clone(), score));
            }
            if best.as_ref().map_or(true, |(_, s, _)| score < *s) {
                best = Some((candidate, score, violation));
            }
        }

        if let Some((room, _)) = clean {
            log::debug!(
                "room {} ({:?}) placed at ({}, {}) on attempt {}",
                id,
                archetype,
                room.left,
                room.top,
                attempt + 1
            );
            return Some(room);
        }
    }

    // Explicit relaxation instead of failure
    let (mut room, _, violation) = best?;
    log::warn!(
        "{}; accepting best-scored candidate for room {} ({:?})",
        GenError::PlacementExhausted {
            what: "room",
            attempts: policy.max_attempts
        },
        id,
        archetype
    );
    room.fallback = violation > 0.0;
    Some(room)
}

/// Constraint violations only: overlap beyond tolerance (heavy) and
/// centers closer than the current minimum distance (moderate)
fn violation_penalty(candidate: &Room, placed: &[Room], min_dist: i32, tolerance: f32) -> f32 {
    let mut penalty = 0.0;
    for other in placed {
        let overlap = candidate.overlap_area(other) as f32;
        let allowed = tolerance * candidate.area().min(other.area()) as f32;
        if overlap > allowed {
            penalty += 1000.0 + (overlap - allowed) * 10.0;
        }
        let dist = candidate.center_distance(other);
        if dist < min_dist {
            penalty += 50.0 * (min_dist - dist) as f32;
        }
    }
    penalty
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gen::test_support::fixture;
    use crate::world::tile::TileKind;

    #[test]
    fn test_rooms_stay_inside_edge_buffer() {
        let (cfg, mut rng, mut world) = fixture(11);
        let mut ctx = GenContext::new(&cfg, &mut rng, &mut world);
        let rooms = RoomPlacer.place_rooms(&mut ctx, 10, false);
        assert!(!rooms.is_empty());
        for room in &rooms {
            assert!(room.left >= cfg.edge_buffer);
            assert!(room.top >= cfg.edge_buffer);
            assert!(room.right() <= cfg.grid_width - cfg.edge_buffer);
            assert!(room.bottom() <= cfg.grid_height - cfg.edge_buffer);
        }
    }

    #[test]
    fn test_room_ids_are_sequential() {
        let (cfg, mut rng, mut world) = fixture(12);
        let mut ctx = GenContext::new(&cfg, &mut rng, &mut world);
        let rooms = RoomPlacer.place_rooms(&mut ctx, 8, false);
        for (i, room) in rooms.iter().enumerate() {
            assert_eq!(room.id, i);
        }
    }

    #[test]
    fn test_footprints_are_stamped_as_floor() {
        let (cfg, mut rng, mut world) = fixture(13);
        let mut ctx = GenContext::new(&cfg, &mut rng, &mut world);
        let rooms = RoomPlacer.place_rooms(&mut ctx, 6, false);
        for room in &rooms {
            for y in room.top..room.bottom() {
                for x in room.left..room.right() {
                    assert_eq!(ctx.grid.get(x, y), Some(TileKind::Floor));
                }
            }
        }
    }

    #[test]
    fn test_boss_chamber_is_placed_first() {
        let (cfg, mut rng, mut world) = fixture(14);
        let mut ctx = GenContext::new(&cfg, &mut rng, &mut world);
        let rooms = RoomPlacer.place_rooms(&mut ctx, 9, true);
        assert_eq!(rooms[0].archetype, RoomArchetype::BossChamber);
        assert_eq!(
            rooms
                .iter()
                .filter(|r| r.archetype == RoomArchetype::BossChamber)
                .count(),
            1
        );
    }

    #[test]
    fn test_non_fallback_rooms_respect_overlap_bound() {
        let (cfg, mut rng, mut world) = fixture(15);
        let mut ctx = GenContext::new(&cfg, &mut rng, &mut world);
        let rooms = RoomPlacer.place_rooms(&mut ctx, 12, false);
        for a in &rooms {
            for b in &rooms {
                if a.id >= b.id || a.fallback || b.fallback {
                    continue;
                }
                let bound = cfg.max_overlap_percent * a.area().min(b.area()) as f32;
                assert!(
                    a.overlap_area(b) as f32 <= bound,
                    "rooms {} and {} overlap by {} (bound {})",
                    a.id,
                    b.id,
                    a.overlap_area(b),
                    bound
                );
            }
        }
    }

    #[test]
    fn test_zero_count_places_nothing() {
        let (cfg, mut rng, mut world) = fixture(16);
        let mut ctx = GenContext::new(&cfg, &mut rng, &mut world);
        assert!(RoomPlacer.place_rooms(&mut ctx, 0, false).is_empty());
    }
}
