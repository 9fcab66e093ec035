//! Deepwarren - Demo Entry Point
//!
//! Generates a handful of tiers and prints them as ASCII, with a
//! collaborator thread standing in for the external spawn systems.

use anyhow::Result;

use deepwarren::{LevelEvent, TierManager, WorldgenConfig};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Starting Deepwarren v{}", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(0xD3E9);
    let depth: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(3);

    let cfg = WorldgenConfig::load();
    let (mut tiers, events) = TierManager::with_seed(cfg, seed);

    // Stand-in collaborator: logs spawn requests and confirms NPC placement
    let collaborator = std::thread::spawn(move || {
        for event in events {
            match event {
                LevelEvent::LevelReady { tier, .. } => log::info!("tier {} ready", tier),
                LevelEvent::RequestSpawnMonsters {
                    tier,
                    rooms,
                    has_boss_room,
                    pool,
                } => log::info!(
                    "spawn request: tier {}, {} rooms, boss {}, pool {:?}",
                    tier,
                    rooms.len(),
                    has_boss_room,
                    pool
                ),
                LevelEvent::RequestSpawnNpc {
                    tier,
                    npc_id,
                    x,
                    y,
                    done,
                } => {
                    log::info!("npc {} placed at ({}, {}) on tier {}", npc_id, x, y, tier);
                    let _ = done.send(());
                }
                LevelEvent::RequestShopInventory { tier } => {
                    log::info!("shop inventory requested for tier {}", tier)
                }
            }
        }
    });

    for tier in 1..=depth {
        if let Some(handle) = tiers.ensure_tier(tier) {
            let level = handle.lock();
            println!(
                "=== tier {} ({} rooms, seed {}) ===",
                tier,
                level.rooms.len(),
                seed
            );
            print!("{}", level.render_ascii());
        }
    }

    drop(tiers); // closes the event channel
    collaborator.join().ok();
    log::info!("Deepwarren shut down cleanly");
    Ok(())
}
