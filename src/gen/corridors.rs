//! Corridor carving
//!
//! Carves a walkable path between two room centers using one of three
//! shapes chosen by weighted random roll. Every swath is 2 tiles wide so
//! diagonal movement never squeezes through a 1-wide gap, and bend points
//! get a reinforced 2x2 carve-out.

use rand::Rng;

use super::GenContext;
use crate::ecs::Position;
use crate::world::room::{Room, RoomId};

/// Carve a corridor between two rooms' centers. Idempotent per cell.
pub fn carve_corridor(ctx: &mut GenContext<'_>, rooms: &[Room], a: RoomId, b: RoomId) {
    let (Some(ra), Some(rb)) = (rooms.get(a), rooms.get(b)) else {
        return;
    };
    let ca = ra.center();
    let cb = rb.center();

    let roll = ctx.rng.gen_range(0..100u32);
    if roll < 5 {
        carve_straight(ctx, ca, cb);
    } else if roll < 70 {
        carve_l(ctx, ca, cb);
    } else {
        carve_t(ctx, rooms, a, b);
    }
}

/// Straight corridor: only valid when the centers share an axis; a
/// misaligned axis degrades to a no-op leg.
fn carve_straight(ctx: &mut GenContext<'_>, ca: Position, cb: Position) {
    if ca.y == cb.y {
        carve_h_swath(ctx, ca.x, cb.x, ca.y);
    }
    if ca.x == cb.x {
        carve_v_swath(ctx, ca.y, cb.y, ca.x);
    }
    if ca.x != cb.x && ca.y != cb.y {
        log::debug!(
            "straight corridor ({}, {}) -> ({}, {}) shares no axis; nothing carved",
            ca.x,
            ca.y,
            cb.x,
            cb.y
        );
    }
}

/// L-shaped corridor: legs meet at the horizontal midpoint between the
/// centers, with a reinforced junction at each bend.
fn carve_l(ctx: &mut GenContext<'_>, ca: Position, cb: Position) {
    let mid_x = (ca.x + cb.x) / 2;
    carve_h_swath(ctx, ca.x, mid_x, ca.y);
    carve_junction(ctx, mid_x, ca.y);
    carve_v_swath(ctx, ca.y, cb.y, mid_x);
    carve_junction(ctx, mid_x, cb.y);
    carve_h_swath(ctx, mid_x, cb.x, cb.y);
}

/// T-shaped corridor: an L plus an opportunistic extension toward the
/// nearest third room.
fn carve_t(ctx: &mut GenContext<'_>, rooms: &[Room], a: RoomId, b: RoomId) {
    let ca = rooms[a].center();
    let cb = rooms[b].center();
    carve_l(ctx, ca, cb);

    let mid = Position::new((ca.x + cb.x) / 2, (ca.y + cb.y) / 2);
    if let Some(third) = nearest_third(rooms, a, b, mid) {
        let cc = rooms[third].center();
        carve_h_swath(ctx, mid.x, cc.x, mid.y);
        carve_junction(ctx, cc.x, mid.y);
        carve_v_swath(ctx, mid.y, cc.y, cc.x);
    }
}

/// The room closest to a point, excluding the two being connected
fn nearest_third(rooms: &[Room], a: RoomId, b: RoomId, point: Position) -> Option<RoomId> {
    rooms
        .iter()
        .filter(|r| r.id != a && r.id != b)
        .min_by_key(|r| r.center().chebyshev_distance(&point))
        .map(|r| r.id)
}

/// Horizontal swath, 2 tiles tall
fn carve_h_swath(ctx: &mut GenContext<'_>, x1: i32, x2: i32, y: i32) {
    let (start, end) = if x1 < x2 { (x1, x2) } else { (x2, x1) };
    for x in start..=end {
        ctx.carve_buffered(x, y);
        ctx.carve_buffered(x, y + 1);
    }
}

/// Vertical swath, 2 tiles wide
fn carve_v_swath(ctx: &mut GenContext<'_>, y1: i32, y2: i32, x: i32) {
    let (start, end) = if y1 < y2 { (y1, y2) } else { (y2, y1) };
    for y in start..=end {
        ctx.carve_buffered(x, y);
        ctx.carve_buffered(x + 1, y);
    }
}

/// Reinforced 2x2 carve-out at a bend point
fn carve_junction(ctx: &mut GenContext<'_>, x: i32, y: i32) {
    for dy in 0..2 {
        for dx in 0..2 {
            ctx.carve_buffered(x + dx, y + dy);
        }
    }
}
