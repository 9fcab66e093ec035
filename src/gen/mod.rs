//! Procedural generation pipeline
//!
//! The components run in order: room placement, connectivity build, stair
//! placement, connectivity repair. All of them mutate one `GenContext`,
//! the explicit per-tier generation state (grid, entity ledger, config,
//! RNG) passed by reference instead of ambient globals.

pub mod connectivity;
pub mod corridors;
pub mod rooms;
pub mod stairs;

use hecs::{Entity, World};
use rand::rngs::StdRng;

use crate::config::WorldgenConfig;
use crate::ecs::{Floor, Position, Wall};
use crate::world::room::Room;
use crate::world::tile::TileKind;
use crate::world::TileGrid;

/// Mutable state for one tier's generation pipeline
///
/// Exclusively owns the grid and entity ledger while the tier is
/// Generating; `into_parts` hands both to the finalized level record.
pub struct GenContext<'a> {
    pub cfg: &'a WorldgenConfig,
    pub rng: &'a mut StdRng,
    pub world: &'a mut World,
    pub grid: TileGrid,
    /// One entity per cell, parallel to the grid
    pub cell_entities: Vec<Entity>,
}

impl<'a> GenContext<'a> {
    /// Allocate a wall-filled grid and materialize a Wall entity per cell
    pub fn new(cfg: &'a WorldgenConfig, rng: &'a mut StdRng, world: &'a mut World) -> Self {
        let grid = TileGrid::new(cfg.grid_width, cfg.grid_height);
        Self::from_grid(cfg, rng, world, grid)
    }

    /// Materialize entities matching an existing grid (blueprint path)
    pub fn from_grid(
        cfg: &'a WorldgenConfig,
        rng: &'a mut StdRng,
        world: &'a mut World,
        grid: TileGrid,
    ) -> Self {
        let mut cell_entities = Vec::with_capacity((grid.width() * grid.height()) as usize);
        for (x, y, kind) in grid.iter_cells() {
            let entity = match kind {
                TileKind::Wall => world.spawn((Position::new(x, y), Wall)),
                TileKind::Floor => world.spawn((Position::new(x, y), Floor)),
            };
            cell_entities.push(entity);
        }
        Self {
            cfg,
            rng,
            world,
            grid,
            cell_entities,
        }
    }

    /// Re-attach to a cached level's grid and ledger (repair re-passes)
    pub fn resume(
        cfg: &'a WorldgenConfig,
        rng: &'a mut StdRng,
        world: &'a mut World,
        grid: TileGrid,
        cell_entities: Vec<Entity>,
    ) -> Self {
        Self {
            cfg,
            rng,
            world,
            grid,
            cell_entities,
        }
    }

    /// Flip a cell from Wall to Floor and swap its entity.
    /// Idempotent per cell: an already-carved cell is left untouched.
    pub fn carve(&mut self, x: i32, y: i32) {
        if !self.grid.in_bounds(x, y) {
            return;
        }
        let idx = self.grid.xy_to_idx(x, y);
        if self.grid.get(x, y) == Some(TileKind::Floor) {
            return;
        }
        self.grid.set(x, y, TileKind::Floor);
        let _ = self.world.despawn(self.cell_entities[idx]);
        self.cell_entities[idx] = self.world.spawn((Position::new(x, y), Floor));
    }

    /// Carve, but never inside the map's edge buffer
    pub fn carve_buffered(&mut self, x: i32, y: i32) {
        if self.in_buffer_zone(x, y) {
            return;
        }
        self.carve(x, y);
    }

    /// True when the cell lies in the untouchable edge buffer
    pub fn in_buffer_zone(&self, x: i32, y: i32) -> bool {
        let buf = self.cfg.edge_buffer;
        x < buf || y < buf || x >= self.grid.width() - buf || y >= self.grid.height() - buf
    }

    /// Write Floor over a room's full footprint
    pub fn stamp_room(&mut self, room: &Room) {
        for y in room.top..room.bottom() {
            for x in room.left..room.right() {
                self.carve(x, y);
            }
        }
    }

    /// Hand the grid and entity ledger to the finalized level
    pub fn into_parts(self) -> (TileGrid, Vec<Entity>) {
        (self.grid, self.cell_entities)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use rand::SeedableRng;

    /// Seeded RNG + empty world for pipeline unit tests
    pub fn fixture(seed: u64) -> (WorldgenConfig, StdRng, World) {
        (
            WorldgenConfig::default(),
            StdRng::seed_from_u64(seed),
            World::new(),
        )
    }
}
