//! Room connectivity
//!
//! Build phase: a Prim's-style spanning tree over room centers plus a few
//! extra loop edges, every edge carving a corridor and recording symmetric
//! connections. Repair phase: breadth-first component detection and greedy
//! nearest-pair bridging until exactly one component remains. The repair
//! pass runs over freshly generated and pre-authored levels alike.

use std::collections::VecDeque;

use rand::Rng;

use super::{corridors, GenContext};
use crate::error::GenError;
use crate::world::room::{Room, RoomId};

/// Connect all rooms: spanning tree plus loop edges. Returns the edges used.
pub fn connect(ctx: &mut GenContext<'_>, rooms: &mut [Room]) -> Vec<(RoomId, RoomId)> {
    let n = rooms.len();
    let mut edges = Vec::new();
    if n < 2 {
        return edges;
    }

    // Prim's greedy expansion: always attach the unconnected room nearest
    // to the connected set. N-1 edges, full connectivity in one pass.
    let mut in_tree = vec![false; n];
    in_tree[0] = true;
    let mut tree: Vec<RoomId> = vec![0];
    while tree.len() < n {
        let mut best: Option<(RoomId, RoomId, i32)> = None;
        for &i in &tree {
            for j in 0..n {
                if in_tree[j] {
                    continue;
                }
                let d = rooms[i].center_distance(&rooms[j]);
                if best.map_or(true, |(_, _, bd)| d < bd) {
                    best = Some((i, j, d));
                }
            }
        }
        let Some((i, j, _)) = best else {
            break;
        };
        add_edge(ctx, rooms, i, j, &mut edges);
        in_tree[j] = true;
        tree.push(j);
    }

    // Extra random edges for loops and route variety
    let extra = n / 8;
    for _ in 0..extra {
        for _ in 0..10 {
            let i = ctx.rng.gen_range(0..n);
            let j = ctx.rng.gen_range(0..n);
            if i == j || rooms[i].connections.contains(&j) {
                continue;
            }
            add_edge(ctx, rooms, i, j, &mut edges);
            break;
        }
    }

    prune_terminal_rooms(rooms);
    log::debug!("connected {} rooms with {} edges", n, edges.len());
    edges
}

/// Carve and record one edge. An edge whose endpoints resolve outside the
/// grid is skipped; generation continues without it.
fn add_edge(
    ctx: &mut GenContext<'_>,
    rooms: &mut [Room],
    a: RoomId,
    b: RoomId,
    edges: &mut Vec<(RoomId, RoomId)>,
) {
    for &id in &[a, b] {
        let c = rooms[id].center();
        if !ctx.grid.in_bounds(c.x, c.y) {
            log::warn!(
                "{}",
                GenError::InvalidGeometry {
                    room: id,
                    x: c.x,
                    y: c.y
                }
            );
            return;
        }
    }
    corridors::carve_corridor(ctx, rooms, a, b);
    rooms[a].connections.insert(b);
    rooms[b].connections.insert(a);
    edges.push((a, b));
}

/// Alcoves and boss chambers are destinations, not thoroughfares: cut them
/// back to their single nearest connection.
pub(crate) fn prune_terminal_rooms(rooms: &mut [Room]) {
    for id in 0..rooms.len() {
        if !rooms[id].archetype.is_terminal() || rooms[id].connections.len() <= 1 {
            continue;
        }
        let center = rooms[id].center();
        let conns: Vec<RoomId> = rooms[id].connections.iter().copied().collect();
        let keep = conns
            .iter()
            .copied()
            .min_by_key(|&other| center.chebyshev_distance(&rooms[other].center()))
            .expect("non-empty connections");
        for other in conns {
            if other == keep {
                continue;
            }
            rooms[id].connections.remove(&other);
            rooms[other].connections.remove(&id);
        }
        log::debug!("pruned terminal room {} to single connection {}", id, keep);
    }
}

/// Connected components of the room graph, via breadth-first traversal
pub fn components(rooms: &[Room]) -> Vec<Vec<RoomId>> {
    let mut seen = vec![false; rooms.len()];
    let mut comps = Vec::new();
    for start in 0..rooms.len() {
        if seen[start] {
            continue;
        }
        seen[start] = true;
        let mut comp = Vec::new();
        let mut queue = VecDeque::from([start]);
        while let Some(id) = queue.pop_front() {
            comp.push(id);
            for &next in &rooms[id].connections {
                if next < rooms.len() && !seen[next] {
                    seen[next] = true;
                    queue.push_back(next);
                }
            }
        }
        comps.push(comp);
    }
    comps
}

/// Detect and bridge disconnected clusters until one component remains,
/// then reconnect any room left with zero connections.
pub fn verify_and_repair(ctx: &mut GenContext<'_>, rooms: &mut [Room]) {
    for pass in 0..3 {
        let mut comps = components(rooms);
        if comps.len() <= 1 {
            break;
        }
        log::info!(
            "repair pass {}: bridging {} disconnected clusters",
            pass + 1,
            comps.len()
        );
        while comps.len() > 1 {
            let (a, b) = closest_pair(rooms, &comps[0], &comps[1]);
            let mut edges = Vec::new();
            add_edge(ctx, rooms, a, b, &mut edges);
            if edges.is_empty() {
                // Edge skipped for invalid geometry; record the link anyway
                // so the bridging loop terminates.
                rooms[a].connections.insert(b);
                rooms[b].connections.insert(a);
            }
            comps = components(rooms);
        }
    }

    // Finer pass: pruning can leave an individual room with no connections
    if rooms.len() < 2 {
        return;
    }
    for id in 0..rooms.len() {
        if !rooms[id].connections.is_empty() {
            continue;
        }
        let center = rooms[id].center();
        let nearest = (0..rooms.len())
            .filter(|&j| j != id)
            .min_by_key(|&j| center.chebyshev_distance(&rooms[j].center()));
        if let Some(j) = nearest {
            log::info!("reconnecting isolated room {} to {}", id, j);
            let mut edges = Vec::new();
            add_edge(ctx, rooms, id, j, &mut edges);
        }
    }
}

/// Closest room pair across two components
fn closest_pair(rooms: &[Room], comp_a: &[RoomId], comp_b: &[RoomId]) -> (RoomId, RoomId) {
    let mut best = (comp_a[0], comp_b[0]);
    let mut best_d = i32::MAX;
    for &i in comp_a {
        for &j in comp_b {
            let d = rooms[i].center_distance(&rooms[j]);
            if d < best_d {
                best_d = d;
                best = (i, j);
            }
        }
    }
    best
}
