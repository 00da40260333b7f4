use crate::account::PlayerAccount;
use crate::accrual;
use crate::clock::day_of;
use crate::constants::{MINING_REWARD_PER_UNIT, MINING_SESSION_MS};
use crate::types::{MiningRecord, SessionError};

/// What a single mining tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MiningTick {
    /// Tokens credited to the balance by this tick.
    pub credited: u64,
    /// True when this tick observed the session end and cleared it.
    pub expired: bool,
}

impl PlayerAccount {
    /// Starts a 24h mining session. At most one start per UTC calendar day,
    /// enforced against the persisted record so the gate survives reloads.
    pub fn start_mining(&mut self, now_ms: u64) -> Result<MiningRecord, SessionError> {
        let today = day_of(now_ms);

        if let Some(record) = &self.mining {
            if record.last_start_day == today {
                return Err(SessionError::AlreadyStartedToday);
            }
            // A session from an earlier day still owes its accrued time;
            // settle it before the new record replaces it.
            self.tick_mining(now_ms);
        }

        let record = MiningRecord {
            end_time_ms: now_ms + MINING_SESSION_MS,
            last_accrual_ms: now_ms,
            last_start_day: today,
        };
        self.mining = Some(record);

        // The immediate post-start invocation: observes zero elapsed time
        // and credits nothing.
        self.tick_mining(now_ms);

        Ok(record)
    }

    /// Applies any pending accrual and credits it to the balance. Called on
    /// page load, on the UI's foreground interval, and right after start;
    /// redundant invocations observe nothing elapsed and credit nothing.
    /// With no active session this is a no-op, not an error.
    pub fn tick_mining(&mut self, now_ms: u64) -> MiningTick {
        let record = match self.mining {
            Some(record) => record,
            None => return MiningTick::default(),
        };

        let expired = now_ms >= record.end_time_ms;

        // Mining only earns inside the session window; a late tick settles
        // up to the end instant, no further.
        let accrual_now = now_ms.min(record.end_time_ms);
        let outcome = accrual::accrue(Some(record.last_accrual_ms), accrual_now);

        let credited = outcome.units * MINING_REWARD_PER_UNIT;
        self.credit(credited);

        if expired {
            // Terminal: the record clears and the machine is Idle again.
            self.mining = None;
        } else if let Some(record) = &mut self.mining {
            record.last_accrual_ms = outcome.last_accrual_ms;
        }

        MiningTick { credited, expired }
    }

    /// Time left in the active mining session, if any. A pure projection
    /// over the persisted record and the current clock.
    pub fn remaining_mining_ms(&self, now_ms: u64) -> Option<u64> {
        self.mining
            .as_ref()
            .map(|record| record.end_time_ms.saturating_sub(now_ms))
            .filter(|&remaining| remaining > 0)
    }
}
