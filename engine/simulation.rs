use engine::account::{PlayerAccount, load_account, save_account};
use engine::arcade::ArcadeRound;
use engine::clock::{Clock, ManualClock};
use engine::constants::{ACCRUAL_UNIT_MS, ARCADE_COOLDOWN_MS, ARCADE_ROUND_MS, MINING_SESSION_MS};
use engine::spawner::CoinSpawner;
use engine::store::MemStore;
use engine::types::CollectResult;
use std::time::Instant;

/// Fast-forward soak test: simulated players grinding days of mining and
/// arcade play against an in-memory store, with the ledger invariants
/// checked along the way.
fn main() {
    println!("=== Coin Catcher Engine Simulation ===\n");

    simulate_mining_week();
    simulate_arcade_grind();
}

fn simulate_mining_week() {
    println!("⛏️  Testing 5 players mining for 7 days...");

    const PLAYERS: u64 = 5;
    const DAYS: u64 = 7;
    // The UI's foreground interval, at the slow end: one tick every 45s.
    const TICK_INTERVAL_MS: u64 = 45_000;
    // 00:30 UTC on an arbitrary day, so session starts never straddle
    // midnight.
    const T0: u64 = (1_755_000_000_000 / 86_400_000) * 86_400_000 + 1_800_000;

    let store = MemStore::new();
    let start = Instant::now();
    let mut ticks: u64 = 0;

    for player in 0..PLAYERS {
        let session_id = format!("sim-{}", player);
        let account = PlayerAccount::new(format!("0xsim{}", player));
        save_account(&store, &session_id, &account).unwrap();
    }

    for day in 0..DAYS {
        let clock = ManualClock::new(T0 + day * 86_400_000);

        for player in 0..PLAYERS {
            let session_id = format!("sim-{}", player);
            let mut account = load_account(&store, &session_id).unwrap().unwrap();

            // Settle whatever yesterday's session still owes, then start
            // today's.
            account.tick_mining(clock.now_ms());
            account.start_mining(clock.now_ms()).unwrap();
            save_account(&store, &session_id, &account).unwrap();
        }

        // Tick the whole day away.
        let day_end = clock.now_ms() + MINING_SESSION_MS;
        while clock.now_ms() < day_end {
            clock.advance(TICK_INTERVAL_MS);
            for player in 0..PLAYERS {
                let session_id = format!("sim-{}", player);
                let mut account = load_account(&store, &session_id).unwrap().unwrap();
                account.tick_mining(clock.now_ms());
                save_account(&store, &session_id, &account).unwrap();
                ticks += 1;
            }
        }
    }

    // Every fully ticked 24h session yields exactly its day's worth of
    // units: 86,400s / 5s = 17,280 per day per player.
    let expected_per_player = DAYS * (MINING_SESSION_MS / ACCRUAL_UNIT_MS);
    for player in 0..PLAYERS {
        let session_id = format!("sim-{}", player);
        let account = load_account(&store, &session_id).unwrap().unwrap();
        assert_eq!(
            account.balance, expected_per_player,
            "player {} ledger drifted",
            player
        );
    }

    let elapsed = start.elapsed();
    println!(
        "   {} ticks across {} simulated player-days in {:.2?}",
        ticks,
        PLAYERS * DAYS,
        elapsed
    );
    println!(
        "   {:.0} ticks/sec, every balance exactly {} GCT\n",
        ticks as f64 / elapsed.as_secs_f64(),
        expected_per_player
    );
}

fn simulate_arcade_grind() {
    println!("🕹️  Testing back-to-back arcade rounds...");

    const ROUNDS: u64 = 50;
    const T0: u64 = 1_755_000_000_000;
    const WIDTH: u32 = 1_280;

    let store = MemStore::new();
    let session_id = "sim-arcade";
    let mut account = PlayerAccount::new("0xarcade");
    save_account(&store, session_id, &account).unwrap();

    let clock = ManualClock::new(T0);
    let start = Instant::now();
    let mut total_caught: u64 = 0;
    let mut total_spawned: u64 = 0;

    for round_no in 0..ROUNDS {
        let mut round = ArcadeRound::with_spawner(
            &mut account,
            clock.now_ms(),
            WIDTH,
            CoinSpawner::with_seed(round_no),
        )
        .unwrap();

        let round_end = clock.now_ms() + 3_000 + ARCADE_ROUND_MS;
        while clock.now_ms() < round_end {
            clock.advance(250);
            let tick = round.tick(&mut account, clock.now_ms());
            total_spawned += tick.spawned;

            // Catch every other coin; the rest fall through and get swept.
            let pending: Vec<u64> = round
                .coins()
                .iter()
                .filter(|coin| !coin.collected && coin.id % 2 == 0)
                .map(|coin| coin.id)
                .collect();
            for id in pending {
                if let CollectResult::Credited { amount } =
                    round.collect(&mut account, id, clock.now_ms())
                {
                    total_caught += amount;
                }
            }
        }
        save_account(&store, session_id, &account).unwrap();

        // Sit out the cooldown before the next round.
        clock.advance(ARCADE_COOLDOWN_MS);
    }

    let reloaded = load_account(&store, session_id).unwrap().unwrap();
    assert_eq!(reloaded.balance, total_caught, "arcade ledger drifted");

    let elapsed = start.elapsed();
    println!(
        "   {} rounds, {} coins spawned, {} GCT caught in {:.2?}",
        ROUNDS, total_spawned, total_caught, elapsed
    );
    println!(
        "   {:.1} rounds/sec, ledger matches every credit",
        ROUNDS as f64 / elapsed.as_secs_f64()
    );
}
