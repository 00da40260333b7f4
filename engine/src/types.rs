use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{REGULAR_COIN_VALUE, SPECIAL_COIN_VALUE};

/// A falling collectible inside an active arcade round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub id: u64,
    /// Left edge within the play area, in pixels (adjusted for size so the
    /// whole coin stays inside).
    pub x: u32,
    /// Time the coin takes to cross the play area top to bottom.
    pub fall_duration_ms: u64,
    /// Specials are rarer, larger and worth more.
    pub is_special: bool,
    /// Rendered diameter in pixels.
    pub size: u32,
    pub collected: bool,
    pub spawned_at_ms: u64,
}

impl Coin {
    /// Token value credited when this coin is caught.
    pub fn value(&self) -> u64 {
        if self.is_special {
            SPECIAL_COIN_VALUE
        } else {
            REGULAR_COIN_VALUE
        }
    }
}

/// Persisted timing state of a mining session. One per player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiningRecord {
    /// Fixed at start: 24h after the session began. Never moves.
    pub end_time_ms: u64,
    /// Advances monotonically with every applied accrual; never past the
    /// current clock.
    pub last_accrual_ms: u64,
    /// UTC day the session was started; gates the once-per-day start rule.
    pub last_start_day: NaiveDate,
}

/// Recoverable session rejections, surfaced to the UI as result values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("a mining session was already started today")]
    AlreadyStartedToday,

    #[error("arcade round is on cooldown for another {remaining_secs}s")]
    OnCooldown { remaining_secs: u64 },
}

/// Outcome of a coin collection attempt. First click wins; every other
/// outcome leaves the round untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectResult {
    Credited { amount: u64 },
    /// The coin was already caught, or the id is unknown (swept or never
    /// spawned).
    AlreadyCollected,
    /// The attempt fell outside the round's active window.
    RoundOver,
}
