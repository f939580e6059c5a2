//! # Linkis Benchmarks
//!
//! | Path | Work per iteration |
//! |------|--------------------|
//! | Signer recovery | envelope decode, personal-message hash, secp256k1 recovery |
//! | Miner selection | SHA-256 digest and U256 reduction |
//! | Block execution | `BeginBlock`, N × `DeliverTx`, `EndBlock`, `Commit` |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lk_02_tx_auth::authenticate;
use lk_04_marketplace::select_miner;
use lk_05_block_lifecycle::LifecycleConfig;
use lk_tests::fixtures::{memory_app, run_block, Actor};
use shared_types::Identity;
use std::time::Duration;

fn bench_authenticate(c: &mut Criterion) {
    let mut group = c.benchmark_group("lk-02-tx-auth");
    let client = Actor::random();
    let wire = client.request_service(7, b"benchmark payload");

    group.bench_function("authenticate_service_request", |b| {
        b.iter(|| black_box(authenticate(black_box(&wire)).is_ok()))
    });
    group.finish();
}

fn bench_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("lk-04-marketplace");
    let app_hash = [7u8; 32];

    for size in [1usize, 16, 256] {
        let candidates: Vec<Identity> = (0..size)
            .map(|i| Identity::new(format!("0x{i:040x}")))
            .collect();
        group.bench_with_input(BenchmarkId::new("select_miner", size), &candidates, |b, c| {
            b.iter(|| black_box(select_miner(c, 42, &app_hash, "service")))
        });
    }
    group.finish();
}

fn bench_block_execution(c: &mut Criterion) {
    let mut group = c.benchmark_group("lk-05-block-lifecycle");
    group.measurement_time(Duration::from_secs(10));

    let miner = Actor::random();
    let client = Actor::random();

    for txs in [10usize, 100] {
        let block: Vec<String> = (0..txs)
            .map(|i| client.request_service(1, format!("job-{i}").as_bytes()))
            .collect();
        group.throughput(Throughput::Elements(txs as u64));
        group.bench_with_input(BenchmarkId::new("service_requests", txs), &block, |b, block| {
            b.iter_batched(
                || {
                    let mut app = memory_app(LifecycleConfig::default());
                    run_block(&mut app, 1, &[miner.register_miner(vec![1])]);
                    app
                },
                |mut app| black_box(run_block(&mut app, 2, block)),
                criterion::BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_authenticate,
    bench_selection,
    bench_block_execution
);
criterion_main!(benches);
