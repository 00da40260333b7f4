use criterion::{Criterion, criterion_group, criterion_main};
use engine::account::PlayerAccount;
use engine::accrual::accrue;
use engine::arcade::ArcadeRound;
use engine::spawner::CoinSpawner;
use std::hint::black_box;

const T0: u64 = 1_700_000_000_000;
const WIDTH: u32 = 800;

// Benchmark for the pure accrual calculator on a typical foreground tick
fn bench_accrue_short_elapsed(c: &mut Criterion) {
    c.bench_function("accrue_short_elapsed", |b| {
        b.iter(|| black_box(accrue(black_box(Some(T0)), black_box(T0 + 47_000))))
    });
}

// Benchmark for a capped catch-up after a long absence
fn bench_accrue_capped_catchup(c: &mut Criterion) {
    c.bench_function("accrue_capped_catchup", |b| {
        b.iter(|| black_box(accrue(black_box(Some(T0)), black_box(T0 + 86_400_000))))
    });
}

// Benchmark for a mining tick crediting the ledger
fn bench_mining_tick(c: &mut Criterion) {
    c.bench_function("mining_tick", |b| {
        b.iter_with_setup(
            || {
                let mut account = PlayerAccount::new("0xbench");
                account.start_mining(T0).unwrap();
                account
            },
            |mut account| {
                black_box(account.tick_mining(T0 + 47_000));
            },
        )
    });
}

// Benchmark for polling a full active window's worth of spawns
fn bench_spawner_poll_window(c: &mut Criterion) {
    c.bench_function("spawner_poll_window", |b| {
        b.iter_with_setup(
            || {
                let mut spawner = CoinSpawner::with_seed(42);
                spawner.schedule_from(T0);
                spawner
            },
            |mut spawner| {
                black_box(spawner.poll(T0 + 60_000, WIDTH));
            },
        )
    });
}

// Benchmark for one driving tick mid-round
fn bench_round_tick(c: &mut Criterion) {
    c.bench_function("round_tick", |b| {
        b.iter_with_setup(
            || {
                let mut account = PlayerAccount::new("0xbench");
                let mut round =
                    ArcadeRound::with_spawner(&mut account, T0, WIDTH, CoinSpawner::with_seed(42))
                        .unwrap();
                round.tick(&mut account, T0 + 3_000);
                round.tick(&mut account, T0 + 30_000);
                (round, account)
            },
            |(mut round, mut account)| {
                black_box(round.tick(&mut account, T0 + 30_500));
            },
        )
    });
}

// Benchmark for a first-click-wins collection
fn bench_collect_coin(c: &mut Criterion) {
    c.bench_function("collect_coin", |b| {
        b.iter_with_setup(
            || {
                let mut account = PlayerAccount::new("0xbench");
                let mut round =
                    ArcadeRound::with_spawner(&mut account, T0, WIDTH, CoinSpawner::with_seed(42))
                        .unwrap();
                round.tick(&mut account, T0 + 3_000);
                round.tick(&mut account, T0 + 8_000);
                let coin_id = round.coins().first().map(|coin| coin.id).unwrap_or(0);
                (round, account, coin_id)
            },
            |(mut round, mut account, coin_id)| {
                black_box(round.collect(&mut account, coin_id, T0 + 8_100));
            },
        )
    });
}

criterion_group!(
    benches,
    bench_accrue_short_elapsed,
    bench_accrue_capped_catchup,
    bench_mining_tick,
    bench_spawner_poll_window,
    bench_round_tick,
    bench_collect_coin
);
criterion_main!(benches);
