use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::constants::{
    COIN_SIZE, FALL_DURATION_MAX_MS, FALL_DURATION_MIN_MS, SPAWN_DELAY_MAX_MS, SPAWN_DELAY_MIN_MS,
    SPECIAL_COIN_CHANCE, SPECIAL_COIN_SIZE,
};
use crate::types::Coin;

/// Produces the arcade's stream of falling coins. Each spawn schedules the
/// next one after a random 200-1000ms delay; polling materializes every
/// spawn that has come due since the last poll, so a late poll catches up
/// without losing or duplicating coins.
pub struct CoinSpawner {
    rng: StdRng,
    coin_id_counter: u64,
    next_spawn_at_ms: Option<u64>,
}

impl CoinSpawner {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic spawner for tests and simulations.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            coin_id_counter: 0,
            next_spawn_at_ms: None,
        }
    }

    /// Arms the schedule; the first coin lands a random delay after
    /// `from_ms`. Until this is called, polling yields nothing.
    pub fn schedule_from(&mut self, from_ms: u64) {
        let delay = self.rng.gen_range(SPAWN_DELAY_MIN_MS..=SPAWN_DELAY_MAX_MS);
        self.next_spawn_at_ms = Some(from_ms + delay);
    }

    /// Materializes every spawn due by `now_ms`. Coins are stamped with
    /// their scheduled spawn instant, not the poll instant.
    pub fn poll(&mut self, now_ms: u64, play_width: u32) -> Vec<Coin> {
        let mut spawned = Vec::new();

        while let Some(due_ms) = self.next_spawn_at_ms {
            if due_ms > now_ms {
                break;
            }
            spawned.push(self.spawn_coin(due_ms, play_width));

            let delay = self.rng.gen_range(SPAWN_DELAY_MIN_MS..=SPAWN_DELAY_MAX_MS);
            self.next_spawn_at_ms = Some(due_ms + delay);
        }

        spawned
    }

    fn spawn_coin(&mut self, spawned_at_ms: u64, play_width: u32) -> Coin {
        let id = self.coin_id_counter;
        self.coin_id_counter += 1;

        let is_special = self.rng.gen_bool(SPECIAL_COIN_CHANCE);
        let size = if is_special { SPECIAL_COIN_SIZE } else { COIN_SIZE };
        // Keep the whole coin inside the play area.
        let x = self.rng.gen_range(0..=play_width.saturating_sub(size));
        let fall_duration_ms = self
            .rng
            .gen_range(FALL_DURATION_MIN_MS..=FALL_DURATION_MAX_MS);

        Coin {
            id,
            x,
            fall_duration_ms,
            is_special,
            size,
            collected: false,
            spawned_at_ms,
        }
    }
}

impl Default for CoinSpawner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: u64 = 1_700_000_000_000;
    const WIDTH: u32 = 800;

    #[test]
    fn test_unarmed_spawner_yields_nothing() {
        let mut spawner = CoinSpawner::with_seed(1);
        assert!(spawner.poll(T0 + 60_000, WIDTH).is_empty());
    }

    #[test]
    fn test_poll_before_first_due_yields_nothing() {
        let mut spawner = CoinSpawner::with_seed(1);
        spawner.schedule_from(T0);
        // The earliest possible spawn is 200ms out.
        assert!(spawner.poll(T0 + SPAWN_DELAY_MIN_MS - 1, WIDTH).is_empty());
    }

    #[test]
    fn test_spawn_gaps_stay_within_bounds() {
        let mut spawner = CoinSpawner::with_seed(42);
        spawner.schedule_from(T0);

        let coins = spawner.poll(T0 + 60_000, WIDTH);
        assert!(coins.len() >= 60, "a 60s window spawns at least 60 coins");

        let mut previous = T0;
        for coin in &coins {
            let gap = coin.spawned_at_ms - previous;
            assert!((SPAWN_DELAY_MIN_MS..=SPAWN_DELAY_MAX_MS).contains(&gap));
            previous = coin.spawned_at_ms;
        }
    }

    #[test]
    fn test_coin_fields_stay_within_bounds() {
        let mut spawner = CoinSpawner::with_seed(7);
        spawner.schedule_from(T0);

        for coin in spawner.poll(T0 + 120_000, WIDTH) {
            assert!(coin.x <= WIDTH - coin.size);
            assert!(
                (FALL_DURATION_MIN_MS..=FALL_DURATION_MAX_MS).contains(&coin.fall_duration_ms)
            );
            if coin.is_special {
                assert_eq!(coin.size, SPECIAL_COIN_SIZE);
                assert_eq!(coin.value(), 25);
            } else {
                assert_eq!(coin.size, COIN_SIZE);
                assert_eq!(coin.value(), 1);
            }
            assert!(!coin.collected);
        }
    }

    #[test]
    fn test_ids_are_unique_and_sequential() {
        let mut spawner = CoinSpawner::with_seed(3);
        spawner.schedule_from(T0);

        let coins = spawner.poll(T0 + 30_000, WIDTH);
        for (i, coin) in coins.iter().enumerate() {
            assert_eq!(coin.id, i as u64);
        }
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = CoinSpawner::with_seed(99);
        let mut b = CoinSpawner::with_seed(99);
        a.schedule_from(T0);
        b.schedule_from(T0);

        assert_eq!(a.poll(T0 + 10_000, WIDTH), b.poll(T0 + 10_000, WIDTH));
    }

    #[test]
    fn test_narrow_play_area_pins_coins_left() {
        let mut spawner = CoinSpawner::with_seed(5);
        spawner.schedule_from(T0);

        for coin in spawner.poll(T0 + 10_000, 40) {
            assert_eq!(coin.x, 0);
        }
    }
}
