//! Deepwarren - procedural dungeon generation core
//!
//! Turns a numeric dungeon depth ("tier") into a fully connected tile map
//! with rooms, corridors, and stair transitions, materialized as wall/floor
//! entities in a `hecs` store.

pub mod config;
pub mod ecs;
pub mod error;
pub mod events;
pub mod gen;
pub mod tier;
pub mod world;

// Re-export commonly used types
pub use config::WorldgenConfig;
pub use events::{LevelEvent, SpawnPool};
pub use tier::TierManager;
pub use world::level::{Level, LevelBlueprint, LevelHandle};
