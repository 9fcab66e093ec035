//! Worldgen configuration
//!
//! Loads generation settings from an external RON file, with fallback to
//! hardcoded defaults. The placement relaxation constants live in one
//! named policy table so the loosening behavior is auditable in one place.

use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ecs::Position;
use crate::world::room::RoomArchetype;

const CONFIG_PATH: &str = "assets/data/worldgen.ron";

/// Read-only generation settings for the session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldgenConfig {
    /// Grid dimensions, fixed for the whole session
    pub grid_width: i32,
    pub grid_height: i32,
    /// Cells at the map edge no carve may touch
    pub edge_buffer: i32,
    /// Minimum Chebyshev distance between up and down stairs
    pub min_stair_distance: i32,
    /// Overlap area bound as a fraction of the smaller room's area
    pub max_overlap_percent: f32,
    /// Inclusive range of rooms requested per tier
    pub rooms_per_tier: (u32, u32),
    /// A shopkeeper NPC is requested every N tiers (0 disables)
    pub shopkeeper_cadence: u32,
    pub archetypes: Vec<ArchetypeSpec>,
    pub boss_cadence: BossCadence,
    pub placement: PlacementPolicy,
}

/// Size range and placement weight for one room archetype
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchetypeSpec {
    pub archetype: RoomArchetype,
    /// Weighted-random selection weight (0 = never rolled)
    pub weight: u32,
    pub min_width: i32,
    pub max_width: i32,
    pub min_height: i32,
    pub max_height: i32,
}

/// When a tier gets a boss chamber
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BossCadence {
    Disabled,
    /// Every Nth tier
    EveryN(u32),
    /// Independent per-tier chance
    Chance(f64),
    /// Fixed list of story tiers
    StoryTiers(Vec<u32>),
}

/// Retry budgets and the relaxation curve for randomized placement
///
/// Min-distance loosens monotonically down to `distance_floor`; overlap
/// tolerance loosens up to `overlap_ceiling`. The exact step constants are
/// tunable, only the monotonic bounded shape matters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementPolicy {
    /// Attempts per room before accepting the best-scored candidate
    pub max_attempts: u32,
    /// Candidate positions sampled and scored per attempt
    pub candidates_per_attempt: u32,
    pub initial_min_distance: i32,
    pub distance_floor: i32,
    pub distance_step: i32,
    pub initial_overlap_tolerance: f32,
    pub overlap_ceiling: f32,
    pub overlap_step: f32,
    /// Attempts before a stair falls back to its default coordinate
    pub stair_attempts: u32,
}

impl PlacementPolicy {
    /// Minimum center distance required at a given attempt
    pub fn min_distance_at(&self, attempt: u32) -> i32 {
        (self.initial_min_distance - attempt as i32 * self.distance_step).max(self.distance_floor)
    }

    /// Overlap tolerance allowed at a given attempt
    pub fn overlap_at(&self, attempt: u32) -> f32 {
        (self.initial_overlap_tolerance + attempt as f32 * self.overlap_step)
            .min(self.overlap_ceiling)
    }
}

impl WorldgenConfig {
    /// Load from `assets/data/worldgen.ron`, falling back to defaults
    pub fn load() -> Self {
        let path = Path::new(CONFIG_PATH);
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match ron::from_str(&content) {
                    Ok(cfg) => return cfg,
                    Err(e) => log::warn!("Failed to parse {}: {}. Using defaults.", CONFIG_PATH, e),
                },
                Err(e) => log::warn!("Failed to read {}: {}. Using defaults.", CONFIG_PATH, e),
            }
        }
        Self::default()
    }

    /// Export the default config to RON for easy editing
    pub fn export_default() -> Result<(), String> {
        let base_path = Path::new("assets/data");
        if !base_path.exists() {
            fs::create_dir_all(base_path)
                .map_err(|e| format!("Failed to create assets/data directory: {}", e))?;
        }
        let cfg = Self::default();
        let text = ron::ser::to_string_pretty(&cfg, ron::ser::PrettyConfig::default())
            .map_err(|e| format!("Failed to serialize worldgen config: {}", e))?;
        fs::write(base_path.join("worldgen.ron"), text)
            .map_err(|e| format!("Failed to write worldgen.ron: {}", e))
    }

    pub fn map_center(&self) -> Position {
        Position::new(self.grid_width / 2, self.grid_height / 2)
    }

    pub fn archetype_spec(&self, archetype: RoomArchetype) -> Option<&ArchetypeSpec> {
        self.archetypes.iter().find(|s| s.archetype == archetype)
    }

    /// Decide whether a tier hosts a boss chamber
    pub fn is_boss_tier(&self, tier: u32, rng: &mut StdRng) -> bool {
        match &self.boss_cadence {
            BossCadence::Disabled => false,
            BossCadence::EveryN(n) => *n > 0 && tier > 0 && tier % n == 0,
            BossCadence::Chance(p) => rng.gen_bool(p.clamp(0.0, 1.0)),
            BossCadence::StoryTiers(tiers) => tiers.contains(&tier),
        }
    }

    /// Whether a shopkeeper spawn is requested on this tier
    pub fn is_shop_tier(&self, tier: u32) -> bool {
        self.shopkeeper_cadence > 0 && tier > 0 && tier % self.shopkeeper_cadence == 0
    }
}

impl Default for WorldgenConfig {
    fn default() -> Self {
        Self {
            grid_width: 80,
            grid_height: 50,
            edge_buffer: 2,
            min_stair_distance: 18,
            max_overlap_percent: 0.15,
            rooms_per_tier: (9, 14),
            shopkeeper_cadence: 4,
            archetypes: default_archetypes(),
            boss_cadence: BossCadence::EveryN(5),
            placement: PlacementPolicy {
                max_attempts: 12,
                candidates_per_attempt: 4,
                initial_min_distance: 10,
                distance_floor: 3,
                distance_step: 1,
                initial_overlap_tolerance: 0.0,
                overlap_ceiling: 0.15,
                overlap_step: 0.02,
                stair_attempts: 20,
            },
        }
    }
}

fn default_archetypes() -> Vec<ArchetypeSpec> {
    vec![
        ArchetypeSpec {
            archetype: RoomArchetype::Square,
            weight: 40,
            min_width: 6,
            max_width: 10,
            min_height: 6,
            max_height: 10,
        },
        ArchetypeSpec {
            archetype: RoomArchetype::Vertical,
            weight: 20,
            min_width: 4,
            max_width: 6,
            min_height: 9,
            max_height: 14,
        },
        ArchetypeSpec {
            archetype: RoomArchetype::Horizontal,
            weight: 20,
            min_width: 9,
            max_width: 14,
            min_height: 4,
            max_height: 6,
        },
        ArchetypeSpec {
            archetype: RoomArchetype::Alcove,
            weight: 15,
            min_width: 3,
            max_width: 4,
            min_height: 3,
            max_height: 4,
        },
        // Never rolled randomly, placed explicitly on boss tiers
        ArchetypeSpec {
            archetype: RoomArchetype::BossChamber,
            weight: 0,
            min_width: 12,
            max_width: 16,
            min_height: 10,
            max_height: 13,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_relaxation_is_monotonic_and_bounded() {
        let policy = WorldgenConfig::default().placement;
        let mut prev_dist = i32::MAX;
        let mut prev_overlap = -1.0f32;
        for attempt in 0..40 {
            let d = policy.min_distance_at(attempt);
            let o = policy.overlap_at(attempt);
            assert!(d <= prev_dist);
            assert!(o >= prev_overlap);
            assert!(d >= policy.distance_floor);
            assert!(o <= policy.overlap_ceiling);
            prev_dist = d;
            prev_overlap = o;
        }
        assert_eq!(policy.min_distance_at(100), policy.distance_floor);
        assert_eq!(policy.overlap_at(100), policy.overlap_ceiling);
    }

    #[test]
    fn test_boss_cadence_every_n() {
        let mut cfg = WorldgenConfig::default();
        cfg.boss_cadence = BossCadence::EveryN(5);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(!cfg.is_boss_tier(1, &mut rng));
        assert!(cfg.is_boss_tier(5, &mut rng));
        assert!(cfg.is_boss_tier(10, &mut rng));
        cfg.boss_cadence = BossCadence::Disabled;
        assert!(!cfg.is_boss_tier(5, &mut rng));
        cfg.boss_cadence = BossCadence::StoryTiers(vec![3, 7]);
        assert!(cfg.is_boss_tier(3, &mut rng));
        assert!(!cfg.is_boss_tier(4, &mut rng));
    }

    #[test]
    fn test_default_config_roundtrips_through_ron() {
        let cfg = WorldgenConfig::default();
        let text = ron::ser::to_string_pretty(&cfg, ron::ser::PrettyConfig::default()).unwrap();
        let back: WorldgenConfig = ron::from_str(&text).unwrap();
        assert_eq!(back.grid_width, cfg.grid_width);
        assert_eq!(back.archetypes.len(), cfg.archetypes.len());
        assert_eq!(back.placement.max_attempts, cfg.placement.max_attempts);
    }

    #[test]
    fn test_shop_cadence() {
        let cfg = WorldgenConfig::default();
        assert!(cfg.is_shop_tier(4));
        assert!(!cfg.is_shop_tier(3));
        let mut off = cfg.clone();
        off.shopkeeper_cadence = 0;
        assert!(!off.is_shop_tier(4));
    }
}
