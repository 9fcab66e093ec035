//! Generation error taxonomy
//!
//! None of these escape `TierManager::ensure_tier`. Every variant is
//! absorbed internally: placement exhaustion falls back to the best-scored
//! or default placement, invalid geometry skips the offending room or edge,
//! and re-entrant requests are ignored. They exist so the fallback paths
//! log something precise.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenError {
    #[error("placement budget exhausted for {what} after {attempts} attempts")]
    PlacementExhausted { what: &'static str, attempts: u32 },

    #[error("invalid geometry: room {room} resolves to ({x}, {y}) outside the grid")]
    InvalidGeometry { room: usize, x: i32, y: i32 },

    #[error("tier {0} is already generating; request ignored")]
    ReentrantGeneration(u32),

    #[error("blueprint is {got_w}x{got_h} but the session grid is {want_w}x{want_h}")]
    BlueprintMismatch {
        got_w: i32,
        got_h: i32,
        want_w: i32,
        want_h: i32,
    },
}
