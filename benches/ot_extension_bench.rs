//! Benchmarks for the IKNP OT-extension layer.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mpc_2pc_core::oblivious_transfer::{IknpReceiver, IknpSender};
use mpc_2pc_core::transport::channel_pair;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::thread;

fn setup() -> (IknpSender, IknpReceiver) {
    let (mut schan, mut rchan) = channel_pair();
    let mut srng = ChaCha20Rng::seed_from_u64(1);
    let handle = thread::spawn(move || IknpSender::new(&mut srng, &mut schan, None).unwrap());
    let mut rrng = ChaCha20Rng::seed_from_u64(2);
    let receiver = IknpReceiver::new(&mut rrng, &mut rchan).unwrap();
    let sender = handle.join().unwrap();
    (sender, receiver)
}

fn bench_extend_passive(c: &mut Criterion) {
    c.bench_function("iknp_extend_8192_passive", |b| {
        b.iter(|| {
            let (mut sender, mut receiver) = setup();
            let n = 8192usize;
            let bits = vec![true; n];

            let (mut schan, mut rchan) = channel_pair();
            let handle = thread::spawn(move || sender.extend(n, &mut schan).unwrap());
            let result_r = receiver.extend(black_box(&bits), &mut rchan).unwrap();
            let result_s = handle.join().unwrap();
            black_box((result_s, result_r))
        });
    });
}

fn bench_extend_active(c: &mut Criterion) {
    c.bench_function("iknp_extend_8192_active", |b| {
        b.iter(|| {
            let (mut sender, mut receiver) = setup();
            let n = 8192usize;
            let bits = vec![true; n];

            let (mut schan, mut rchan) = channel_pair();
            let handle = thread::spawn(move || sender.extend_active(n, &mut schan).unwrap());
            let mut rng = ChaCha20Rng::seed_from_u64(3);
            let result_r = receiver.extend_active(black_box(&bits), &mut rng, &mut rchan).unwrap();
            let result_s = handle.join().unwrap();
            black_box((result_s, result_r))
        });
    });
}

criterion_group!(benches, bench_extend_passive, bench_extend_active);
criterion_main!(benches);
