/// Tokens minted per accrual unit while mining.
pub const MINING_REWARD_PER_UNIT: u64 = 1;

/// One mining accrual unit: 1 GCT every 5 seconds.
pub const ACCRUAL_UNIT_MS: u64 = 5_000;

/// Cap on the elapsed time a single accrual call will honor (1 hour).
/// Bounds retroactive grants from arbitrarily old timestamps.
pub const ACCRUAL_CATCHUP_CAP_MS: u64 = 3_600_000;

/// Mining sessions run for a full day once activated.
pub const MINING_SESSION_MS: u64 = 24 * 60 * 60 * 1_000;

/// Length of an arcade round's active window.
pub const ARCADE_ROUND_MS: u64 = 60_000;

/// Mandatory wait before the next arcade round may start.
pub const ARCADE_COOLDOWN_MS: u64 = 5 * 60 * 1_000;

/// Pre-round countdown: 3, 2, 1, one step per second.
pub const COUNTDOWN_STEPS: u8 = 3;
pub const COUNTDOWN_STEP_MS: u64 = 1_000;

pub const REGULAR_COIN_VALUE: u64 = 1;
pub const SPECIAL_COIN_VALUE: u64 = 25;

/// Chance for a spawned coin to be the special, higher-value kind.
pub const SPECIAL_COIN_CHANCE: f64 = 0.01;

/// Rendered coin diameters in pixels.
pub const COIN_SIZE: u32 = 60;
pub const SPECIAL_COIN_SIZE: u32 = 80;

/// Bounds for the random delay between consecutive coin spawns.
pub const SPAWN_DELAY_MIN_MS: u64 = 200;
pub const SPAWN_DELAY_MAX_MS: u64 = 1_000;

/// Bounds for a coin's random fall duration.
pub const FALL_DURATION_MIN_MS: u64 = 3_000;
pub const FALL_DURATION_MAX_MS: u64 = 7_000;

/// Cadence of the stale-coin sweep while a round is active.
pub const SWEEP_INTERVAL_MS: u64 = 5_000;

/// How long an uncollected coin may linger past its expected exit before
/// the sweep retires it.
pub const COIN_EXIT_GRACE_MS: u64 = 2_000;
