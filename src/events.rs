//! Collaborator handoff events
//!
//! Generation hands monster/NPC/shop population to out-of-scope systems
//! through these messages. The shopkeeper request carries a single-shot
//! reply sender, making the one genuine suspension point in generation
//! visible in the type instead of implicit in event wiring.

use std::sync::mpsc::SyncSender;

use crate::world::level::LevelHandle;
use crate::world::room::RoomId;

/// Reply side of the shopkeeper placement rendezvous
pub type NpcDone = SyncSender<()>;

/// Monster pool bracket for a tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnPool {
    Catacombs,
    Crypts,
    Cathedral,
    Abyss,
}

/// Which pool a tier draws from
pub fn pool_for_tier(tier: u32) -> SpawnPool {
    match tier {
        0..=5 => SpawnPool::Catacombs,
        6..=10 => SpawnPool::Crypts,
        11..=15 => SpawnPool::Cathedral,
        _ => SpawnPool::Abyss,
    }
}

/// Messages published by the tier manager as a level finalizes
#[derive(Debug)]
pub enum LevelEvent {
    /// Generation and connectivity repair finished; gates downstream rendering
    LevelReady { tier: u32, handle: LevelHandle },
    /// Population handoff: this subsystem only supplies geometry
    RequestSpawnMonsters {
        tier: u32,
        rooms: Vec<RoomId>,
        has_boss_room: bool,
        pool: SpawnPool,
    },
    /// Shopkeeper placement; `done` must be signalled when the NPC exists
    RequestSpawnNpc {
        tier: u32,
        npc_id: u32,
        x: i32,
        y: i32,
        done: NpcDone,
    },
    /// Fire-and-forget, no reply expected
    RequestShopInventory { tier: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_brackets() {
        assert_eq!(pool_for_tier(1), SpawnPool::Catacombs);
        assert_eq!(pool_for_tier(5), SpawnPool::Catacombs);
        assert_eq!(pool_for_tier(6), SpawnPool::Crypts);
        assert_eq!(pool_for_tier(12), SpawnPool::Cathedral);
        assert_eq!(pool_for_tier(40), SpawnPool::Abyss);
    }
}
