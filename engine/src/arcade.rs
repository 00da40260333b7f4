use crate::account::PlayerAccount;
use crate::constants::{
    ARCADE_COOLDOWN_MS, ARCADE_ROUND_MS, COIN_EXIT_GRACE_MS, COUNTDOWN_STEP_MS, COUNTDOWN_STEPS,
    SWEEP_INTERVAL_MS,
};
use crate::spawner::CoinSpawner;
use crate::types::{Coin, CollectResult, SessionError};

/// Where a round is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcadePhase {
    /// Pre-round countdown; `step` shows 3, 2, 1.
    Countdown { step: u8, next_step_at_ms: u64 },
    Active { ends_at_ms: u64 },
    Ended { cooldown_end_ms: u64 },
}

/// What a driving tick observed and did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoundTick {
    /// The countdown finished and play began on this tick.
    pub went_active: bool,
    /// Coins spawned by this tick.
    pub spawned: u64,
    /// Set exactly once, by the tick that closed the round.
    pub ended: Option<RoundEnd>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundEnd {
    pub score: u64,
    pub cooldown_end_ms: u64,
}

/// One arcade round from countdown to end. Lives only in memory; dropping
/// it cancels its spawn and sweep schedule on every exit path. The round's
/// sole persisted footprint is the cooldown instant written to the account
/// when the active window closes.
pub struct ArcadeRound {
    phase: ArcadePhase,
    score: u64,
    coins: Vec<Coin>,
    spawner: CoinSpawner,
    play_width: u32,
    last_sweep_ms: u64,
}

impl ArcadeRound {
    /// Starts a round, rejecting while a prior round's cooldown is still
    /// running. An already-elapsed cooldown found here is cleared (Ended ->
    /// Idle is automatic on observation). Starting fresh resets score and
    /// coins; a previously live round for the same player is simply
    /// abandoned by its owner dropping it.
    pub fn start(
        account: &mut PlayerAccount,
        now_ms: u64,
        play_width: u32,
    ) -> Result<Self, SessionError> {
        Self::with_spawner(account, now_ms, play_width, CoinSpawner::new())
    }

    /// As `start`, with a caller-supplied spawner (seeded in tests and the
    /// simulation binary).
    pub fn with_spawner(
        account: &mut PlayerAccount,
        now_ms: u64,
        play_width: u32,
        spawner: CoinSpawner,
    ) -> Result<Self, SessionError> {
        if let Some(remaining_ms) = account.remaining_cooldown_ms(now_ms) {
            return Err(SessionError::OnCooldown {
                remaining_secs: remaining_ms.div_ceil(1_000),
            });
        }
        account.arcade_cooldown_end_ms = None;

        Ok(Self {
            phase: ArcadePhase::Countdown {
                step: COUNTDOWN_STEPS,
                next_step_at_ms: now_ms + COUNTDOWN_STEP_MS,
            },
            score: 0,
            coins: Vec::new(),
            spawner,
            play_width,
            last_sweep_ms: now_ms,
        })
    }

    /// Drives the round clock: advances the countdown, spawns due coins,
    /// sweeps stale ones, and closes the round once the 60s window has
    /// passed. Invoked on every poll from the UI layer; redundant calls are
    /// harmless and an Ended round stays Ended.
    pub fn tick(&mut self, account: &mut PlayerAccount, now_ms: u64) -> RoundTick {
        let mut result = RoundTick::default();

        if let ArcadePhase::Countdown {
            mut step,
            mut next_step_at_ms,
        } = self.phase
        {
            while step > 0 && now_ms >= next_step_at_ms {
                step -= 1;
                next_step_at_ms += COUNTDOWN_STEP_MS;
            }
            if step == 0 {
                // Play begins exactly when the countdown hit zero, not when
                // the observing tick arrived.
                let began_at_ms = next_step_at_ms - COUNTDOWN_STEP_MS;
                self.phase = ArcadePhase::Active {
                    ends_at_ms: began_at_ms + ARCADE_ROUND_MS,
                };
                self.spawner.schedule_from(began_at_ms);
                result.went_active = true;
            } else {
                self.phase = ArcadePhase::Countdown {
                    step,
                    next_step_at_ms,
                };
            }
        }

        if let ArcadePhase::Active { ends_at_ms } = self.phase {
            // Spawns land only inside the active window.
            let spawn_until_ms = now_ms.min(ends_at_ms);
            let spawned = self.spawner.poll(spawn_until_ms, self.play_width);
            result.spawned = spawned.len() as u64;
            self.coins.extend(spawned);

            if now_ms.saturating_sub(self.last_sweep_ms) >= SWEEP_INTERVAL_MS {
                self.sweep(now_ms);
                self.last_sweep_ms = now_ms;
            }

            if now_ms >= ends_at_ms {
                // The cooldown anchors at the round's fixed end instant,
                // even if this finalizing tick arrived late.
                let cooldown_end_ms = ends_at_ms + ARCADE_COOLDOWN_MS;
                account.arcade_cooldown_end_ms = Some(cooldown_end_ms);
                self.phase = ArcadePhase::Ended { cooldown_end_ms };
                result.ended = Some(RoundEnd {
                    score: self.score,
                    cooldown_end_ms,
                });
            }
        }

        result
    }

    /// First click wins: exactly one collection attempt per coin credits,
    /// and the credit lands on the balance ledger immediately.
    pub fn collect(
        &mut self,
        account: &mut PlayerAccount,
        coin_id: u64,
        now_ms: u64,
    ) -> CollectResult {
        match self.phase {
            ArcadePhase::Active { ends_at_ms } if now_ms < ends_at_ms => {}
            _ => return CollectResult::RoundOver,
        }

        let coin = match self.coins.iter_mut().find(|coin| coin.id == coin_id) {
            Some(coin) => coin,
            None => return CollectResult::AlreadyCollected,
        };
        if coin.collected {
            return CollectResult::AlreadyCollected;
        }
        coin.collected = true;

        let amount = coin.value();
        self.score += amount;
        account.credit(amount);

        CollectResult::Credited { amount }
    }

    /// Retires coins that are done with: collected ones, and uncollected
    /// ones past their expected exit plus a grace window. Bounds memory
    /// growth over a round.
    fn sweep(&mut self, now_ms: u64) {
        self.coins.retain(|coin| {
            !coin.collected
                && now_ms < coin.spawned_at_ms + coin.fall_duration_ms + COIN_EXIT_GRACE_MS
        });
    }

    pub fn phase(&self) -> ArcadePhase {
        self.phase
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    /// Time left in the active window; zero outside it.
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        match self.phase {
            ArcadePhase::Active { ends_at_ms } => ends_at_ms.saturating_sub(now_ms),
            _ => 0,
        }
    }

    #[cfg(test)]
    fn inject_coin(&mut self, coin: Coin) {
        self.coins.push(coin);
    }
}

impl PlayerAccount {
    /// Remaining arcade cooldown, if one is in effect. Recomputed from the
    /// persisted instant on every call, never from an in-memory countdown,
    /// so it stays correct across reloads.
    pub fn remaining_cooldown_ms(&self, now_ms: u64) -> Option<u64> {
        self.arcade_cooldown_end_ms
            .map(|end_ms| end_ms.saturating_sub(now_ms))
            .filter(|&remaining| remaining > 0)
    }
}
