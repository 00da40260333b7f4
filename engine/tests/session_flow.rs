use engine::account::{PlayerAccount, load_account, save_account};
use engine::arcade::{ArcadePhase, ArcadeRound};
use engine::clock::{Clock, ManualClock};
use engine::constants::{ARCADE_COOLDOWN_MS, ARCADE_ROUND_MS};
use engine::spawner::CoinSpawner;
use engine::store::{MemStore, Store};
use engine::types::{CollectResult, SessionError};

// 2025-08-12 11:20:00 UTC, nowhere near a day boundary.
const T0: u64 = 1_755_000_000_000;
const SESSION_ID: &str = "8f4e2a";
const WIDTH: u32 = 800;

// Start mining at t0 with balance 0; tick at t0+17s -> 3 units; tick at
// t0+19s -> nothing; tick at t0+22s -> 1 more. Every step goes through the
// store, as a page reload would.
#[test]
fn test_mining_accrues_exactly_once_across_reloads() {
    let clock = ManualClock::new(T0);
    let store = MemStore::new();

    let mut account = PlayerAccount::new("0xf00d");
    account.start_mining(clock.now_ms()).unwrap();
    assert_eq!(account.balance, 0);
    save_account(&store, SESSION_ID, &account).unwrap();

    clock.advance(17_000);
    let mut account = load_account(&store, SESSION_ID).unwrap().unwrap();
    let tick = account.tick_mining(clock.now_ms());
    assert_eq!(tick.credited, 3);
    assert_eq!(account.balance, 3);
    assert_eq!(account.mining.unwrap().last_accrual_ms, T0 + 17_000);
    save_account(&store, SESSION_ID, &account).unwrap();

    clock.advance(2_000);
    let mut account = load_account(&store, SESSION_ID).unwrap().unwrap();
    let tick = account.tick_mining(clock.now_ms());
    assert_eq!(tick.credited, 0);
    assert_eq!(account.balance, 3);
    assert_eq!(account.mining.unwrap().last_accrual_ms, T0 + 17_000);
    save_account(&store, SESSION_ID, &account).unwrap();

    clock.advance(3_000);
    let mut account = load_account(&store, SESSION_ID).unwrap().unwrap();
    let tick = account.tick_mining(clock.now_ms());
    assert_eq!(tick.credited, 1);
    assert_eq!(account.balance, 4);
    save_account(&store, SESSION_ID, &account).unwrap();

    // The once-per-day gate holds across the reload too.
    let mut account = load_account(&store, SESSION_ID).unwrap().unwrap();
    assert_eq!(
        account.start_mining(clock.now_ms()),
        Err(SessionError::AlreadyStartedToday)
    );
}

// A full arcade round: countdown, sixty seconds of catching everything
// that spawns, the end event, and the cooldown both in memory and across a
// store round trip.
#[test]
fn test_arcade_round_end_to_end() {
    let clock = ManualClock::new(T0);
    let store = MemStore::new();
    let mut account = PlayerAccount::new("0xf00d");

    let mut round =
        ArcadeRound::with_spawner(&mut account, clock.now_ms(), WIDTH, CoinSpawner::with_seed(7))
            .unwrap();

    clock.advance(3_000);
    let tick = round.tick(&mut account, clock.now_ms());
    assert!(tick.went_active);
    let ends_at_ms = T0 + 3_000 + ARCADE_ROUND_MS;
    assert_eq!(round.phase(), ArcadePhase::Active { ends_at_ms });

    // Poll every half second and catch every coin on screen.
    let mut caught = 0u64;
    let mut end = None;
    while clock.now_ms() < ends_at_ms {
        clock.advance(500);
        let tick = round.tick(&mut account, clock.now_ms());
        if tick.ended.is_some() {
            end = tick.ended;
        }

        let pending: Vec<u64> = round
            .coins()
            .iter()
            .filter(|coin| !coin.collected)
            .map(|coin| coin.id)
            .collect();
        for id in pending {
            if let CollectResult::Credited { amount } =
                round.collect(&mut account, id, clock.now_ms())
            {
                caught += amount;
            }
        }
    }

    let end = end.expect("round should have ended");
    assert_eq!(end.score, caught);
    assert_eq!(end.cooldown_end_ms, ends_at_ms + ARCADE_COOLDOWN_MS);
    assert!(caught > 0, "a 60s round spawns something to catch");
    assert_eq!(account.balance, caught);
    assert_eq!(account.arcade_cooldown_end_ms, Some(end.cooldown_end_ms));

    // An immediate restart is rejected with roughly the full cooldown.
    match ArcadeRound::start(&mut account, clock.now_ms(), WIDTH) {
        Err(SessionError::OnCooldown { remaining_secs }) => {
            assert!((295..=300).contains(&remaining_secs));
        }
        other => panic!("expected cooldown rejection, got {:?}", other.err()),
    }

    // The cooldown survives persistence: a reload mid-cooldown recomputes
    // the remaining wait from the stored instant.
    save_account(&store, SESSION_ID, &account).unwrap();
    let mut reloaded = load_account(&store, SESSION_ID).unwrap().unwrap();
    assert!(reloaded.remaining_cooldown_ms(clock.now_ms()).unwrap() > 0);

    // And once the instant passes, a new round starts cleanly.
    clock.set(end.cooldown_end_ms);
    assert!(ArcadeRound::start(&mut reloaded, clock.now_ms(), WIDTH).is_ok());
}

// An unreadable stored record recovers as a missing account rather than an
// error the UI would see.
#[test]
fn test_corrupt_stored_state_recovers_as_idle() {
    let store = MemStore::new();
    store.put("player:deadbeef", "{\"balance\": oops").unwrap();

    assert!(load_account(&store, "deadbeef").unwrap().is_none());
}
