//! Tier manager
//!
//! Orchestrates per-tier generation and caching. Each tier moves through
//! Uncached -> Generating -> Cached exactly once per session; repeat
//! requests return the cached handle unchanged, and a re-entrant request
//! for a tier still Generating is logged and ignored. No error escapes
//! `ensure_tier`: every recoverable condition is absorbed internally.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

use hecs::{Entity, World};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::WorldgenConfig;
use crate::ecs::{Position, Stair};
use crate::error::GenError;
use crate::events::{pool_for_tier, LevelEvent};
use crate::gen::rooms::{PlaceRooms, RoomPlacer};
use crate::gen::{connectivity, stairs, GenContext};
use crate::world::level::{Level, LevelBlueprint, LevelHandle, StairMarker};
use crate::world::TileGrid;

const SHOPKEEPER_NPC_ID: u32 = 1;

/// Per-tier lifecycle state; absence from the map means Uncached
#[derive(Debug)]
enum TierState {
    Generating,
    Cached(LevelHandle),
}

/// Owns the entity store and every cached level for the session
pub struct TierManager {
    cfg: WorldgenConfig,
    rng: StdRng,
    world: World,
    tiers: HashMap<u32, TierState>,
    events: Sender<LevelEvent>,
    placer: Box<dyn PlaceRooms>,
    /// How long finalization waits on the shopkeeper rendezvous
    npc_wait: Duration,
}

impl TierManager {
    pub fn new(cfg: WorldgenConfig) -> (Self, Receiver<LevelEvent>) {
        Self::from_rng(cfg, StdRng::from_entropy())
    }

    /// Seeded construction for reproducible sessions
    pub fn with_seed(cfg: WorldgenConfig, seed: u64) -> (Self, Receiver<LevelEvent>) {
        Self::from_rng(cfg, StdRng::seed_from_u64(seed))
    }

    fn from_rng(cfg: WorldgenConfig, rng: StdRng) -> (Self, Receiver<LevelEvent>) {
        let (tx, rx) = mpsc::channel();
        (
            Self {
                cfg,
                rng,
                world: World::new(),
                tiers: HashMap::new(),
                events: tx,
                placer: Box::new(RoomPlacer),
                npc_wait: Duration::from_millis(250),
            },
            rx,
        )
    }

    /// Swap in a different room source (test doubles)
    pub fn set_room_source(&mut self, placer: Box<dyn PlaceRooms>) {
        self.placer = placer;
    }

    pub fn set_npc_wait(&mut self, wait: Duration) {
        self.npc_wait = wait;
    }

    pub fn config(&self) -> &WorldgenConfig {
        &self.cfg
    }

    /// The external entity store the generator materializes into
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The only public generation entry point. Generates at most once per
    /// tier for the life of the session.
    pub fn ensure_tier(&mut self, tier: u32) -> Option<LevelHandle> {
        self.ensure_tier_with(tier, None)
    }

    /// `ensure_tier` accepting pre-authored level data. The blueprint must
    /// conform to the session's data model; the connectivity repair pass
    /// still runs over it, since hand-authored data can also be
    /// disconnected.
    pub fn ensure_tier_with(
        &mut self,
        tier: u32,
        blueprint: Option<LevelBlueprint>,
    ) -> Option<LevelHandle> {
        match self.tiers.get(&tier) {
            Some(TierState::Cached(handle)) => {
                log::debug!("tier {} already cached", tier);
                return Some(handle.clone());
            }
            Some(TierState::Generating) => {
                log::warn!("{}", GenError::ReentrantGeneration(tier));
                return None;
            }
            None => {}
        }

        self.tiers.insert(tier, TierState::Generating);
        log::info!("generating tier {}", tier);
        let level = match blueprint {
            Some(bp) => self.build_from_blueprint(tier, bp),
            None => self.generate(tier),
        };
        let handle: LevelHandle = Arc::new(Mutex::new(level));
        self.tiers.insert(tier, TierState::Cached(handle.clone()));
        self.publish(tier, &handle);
        Some(handle)
    }

    /// Walkability query for spawners and movement outside this subsystem
    pub fn is_walkable(&self, tier: u32, x: i32, y: i32) -> bool {
        match self.tiers.get(&tier) {
            Some(TierState::Cached(handle)) => handle.lock().is_walkable(x, y),
            _ => false,
        }
    }

    /// Re-run the connectivity repair pass over a cached level (tier
    /// re-entry hook). Corridors may widen; room rectangles never change.
    pub fn ensure_room_connections(&mut self, tier: u32) {
        let handle = match self.tiers.get(&tier) {
            Some(TierState::Cached(handle)) => handle.clone(),
            _ => {
                log::debug!("tier {} not cached; nothing to repair", tier);
                return;
            }
        };
        let mut level = handle.lock();
        let grid = std::mem::replace(&mut level.grid, TileGrid::new(0, 0));
        let cells = std::mem::take(&mut level.cell_entities);
        let mut ctx = GenContext::resume(&self.cfg, &mut self.rng, &mut self.world, grid, cells);
        connectivity::verify_and_repair(&mut ctx, &mut level.rooms);
        let (grid, cells) = ctx.into_parts();
        level.grid = grid;
        level.cell_entities = cells;
    }

    /// Fresh procedural generation for one tier
    fn generate(&mut self, tier: u32) -> Level {
        let include_boss = self.cfg.is_boss_tier(tier, &mut self.rng);
        let (lo, hi) = self.cfg.rooms_per_tier;
        let count = self.rng.gen_range(lo..=hi.max(lo));

        let mut ctx = GenContext::new(&self.cfg, &mut self.rng, &mut self.world);
        let mut rooms = self.placer.place_rooms(&mut ctx, count, include_boss);
        connectivity::connect(&mut ctx, &mut rooms);
        let (down, up) = stairs::place_stairs(&mut ctx, &mut rooms, tier);
        connectivity::verify_and_repair(&mut ctx, &mut rooms);
        let (grid, cell_entities) = ctx.into_parts();

        let stair_entities = self.spawn_stair_entities(&[down, up]);
        Level {
            tier,
            grid,
            rooms,
            up_stair: up,
            down_stair: down,
            cell_entities,
            stair_entities,
        }
    }

    /// Materialize a pre-authored level. Dimension mismatches fall back to
    /// procedural generation rather than failing the tier.
    fn build_from_blueprint(&mut self, tier: u32, bp: LevelBlueprint) -> Level {
        if bp.width != self.cfg.grid_width || bp.height != self.cfg.grid_height {
            log::warn!(
                "{}; generating tier {} procedurally",
                GenError::BlueprintMismatch {
                    got_w: bp.width,
                    got_h: bp.height,
                    want_w: self.cfg.grid_width,
                    want_h: self.cfg.grid_height,
                },
                tier
            );
            return self.generate(tier);
        }

        let grid = bp.to_grid();
        let mut rooms = bp.to_rooms();
        let mut ctx = GenContext::from_grid(&self.cfg, &mut self.rng, &mut self.world, grid);

        let (down, up) = if bp.down_stair.is_some() || bp.up_stair.is_some() {
            let down = bp.down_stair.map(|(x, y)| {
                ctx.carve(x, y);
                StairMarker {
                    tier,
                    x,
                    y,
                    direction: crate::ecs::StairDirection::Down,
                    linked_tier: tier + 1,
                    fallback: false,
                }
            });
            let up = bp.up_stair.map(|(x, y)| {
                ctx.carve(x, y);
                StairMarker {
                    tier,
                    x,
                    y,
                    direction: crate::ecs::StairDirection::Up,
                    linked_tier: tier.saturating_sub(1),
                    fallback: false,
                }
            });
            for marker in [&down, &up].into_iter().flatten() {
                if let Some(room) = rooms.iter_mut().find(|r| r.contains(marker.x, marker.y)) {
                    room.suppress_spawns = true;
                }
            }
            (down, up)
        } else {
            stairs::place_stairs(&mut ctx, &mut rooms, tier)
        };

        // Repair always runs, even over authored data
        connectivity::verify_and_repair(&mut ctx, &mut rooms);
        let (grid, cell_entities) = ctx.into_parts();

        let stair_entities = self.spawn_stair_entities(&[down, up]);
        Level {
            tier,
            grid,
            rooms,
            up_stair: up,
            down_stair: down,
            cell_entities,
            stair_entities,
        }
    }

    fn spawn_stair_entities(&mut self, markers: &[Option<StairMarker>]) -> Vec<Entity> {
        markers
            .iter()
            .flatten()
            .map(|m| {
                self.world.spawn((
                    Position::new(m.x, m.y),
                    Stair {
                        tier: m.tier,
                        direction: m.direction,
                        linked_tier: m.linked_tier,
                    },
                ))
            })
            .collect()
    }

    /// Collaborator handoffs. A missing collaborator degrades content, not
    /// structural integrity: send failures and rendezvous timeouts only log.
    fn publish(&mut self, tier: u32, handle: &LevelHandle) {
        let (spawn_rooms, has_boss, shop_pos) = {
            let level = handle.lock();
            (
                level.spawnable_rooms(),
                level.boss_room().is_some(),
                level
                    .rooms
                    .iter()
                    .find(|r| !r.suppress_spawns)
                    .map(|r| r.center()),
            )
        };

        let _ = self.events.send(LevelEvent::LevelReady {
            tier,
            handle: handle.clone(),
        });
        let _ = self.events.send(LevelEvent::RequestSpawnMonsters {
            tier,
            rooms: spawn_rooms,
            has_boss_room: has_boss,
            pool: pool_for_tier(tier),
        });

        if self.cfg.is_shop_tier(tier) {
            if let Some(pos) = shop_pos {
                let (done_tx, done_rx) = mpsc::sync_channel(1);
                let sent = self
                    .events
                    .send(LevelEvent::RequestSpawnNpc {
                        tier,
                        npc_id: SHOPKEEPER_NPC_ID,
                        x: pos.x,
                        y: pos.y,
                        done: done_tx,
                    })
                    .is_ok();
                if sent {
                    // The one suspension point in generation: wait for the
                    // spawn collaborator to confirm the shopkeeper.
                    match done_rx.recv_timeout(self.npc_wait) {
                        Ok(()) => log::debug!("shopkeeper confirmed on tier {}", tier),
                        Err(_) => log::warn!(
                            "no shopkeeper confirmation for tier {}; finalizing anyway",
                            tier
                        ),
                    }
                }
                let _ = self
                    .events
                    .send(LevelEvent::RequestShopInventory { tier });
            }
        }
        log::info!("tier {} cached", tier);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config() -> WorldgenConfig {
        let mut cfg = WorldgenConfig::default();
        cfg.shopkeeper_cadence = 0;
        cfg.boss_cadence = crate::config::BossCadence::Disabled;
        cfg
    }

    #[test]
    fn test_repeat_request_returns_same_handle() {
        let (mut tiers, _events) = TierManager::with_seed(quiet_config(), 99);
        let first = tiers.ensure_tier(1).unwrap();
        let second = tiers.ensure_tier(1).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_distinct_tiers_get_distinct_levels() {
        let (mut tiers, _events) = TierManager::with_seed(quiet_config(), 99);
        let a = tiers.ensure_tier(1).unwrap();
        let b = tiers.ensure_tier(2).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.lock().tier, 1);
        assert_eq!(b.lock().tier, 2);
    }

    #[test]
    fn test_is_walkable_tracks_cached_level() {
        let (mut tiers, _events) = TierManager::with_seed(quiet_config(), 7);
        assert!(!tiers.is_walkable(1, 10, 10));
        let handle = tiers.ensure_tier(1).unwrap();
        let center = handle.lock().rooms[0].center();
        assert!(tiers.is_walkable(1, center.x, center.y));
    }

    #[test]
    fn test_level_ready_published_once_per_tier() {
        let (mut tiers, events) = TierManager::with_seed(quiet_config(), 5);
        tiers.ensure_tier(1);
        tiers.ensure_tier(1);
        drop(tiers);
        let ready = events
            .iter()
            .filter(|e| matches!(e, LevelEvent::LevelReady { .. }))
            .count();
        assert_eq!(ready, 1);
    }

    #[test]
    fn test_spawn_request_excludes_stair_rooms() {
        let (mut tiers, events) = TierManager::with_seed(quiet_config(), 6);
        let handle = tiers.ensure_tier(1).unwrap();
        drop(tiers);
        let level = handle.lock();
        let suppressed: Vec<_> = level
            .rooms
            .iter()
            .filter(|r| r.suppress_spawns)
            .map(|r| r.id)
            .collect();
        assert!(!suppressed.is_empty());
        for event in events {
            if let LevelEvent::RequestSpawnMonsters { rooms, .. } = event {
                for id in &suppressed {
                    assert!(!rooms.contains(id));
                }
            }
        }
    }

    #[test]
    fn test_stair_entities_exist_in_store() {
        let (mut tiers, _events) = TierManager::with_seed(quiet_config(), 8);
        let handle = tiers.ensure_tier(1).unwrap();
        let level = handle.lock();
        assert_eq!(level.stair_entities.len(), 2);
        for &entity in &level.stair_entities {
            assert!(tiers.world().get::<&Stair>(entity).is_ok());
        }
    }
}
