//! Benchmarks for the stream synchronizer
//!
//! The device produces 75 frames per second, so throughput is never the
//! bottleneck on a live link. These numbers matter for bulk decoding of
//! recorded streams.
//!
//! Platform: Cross-platform (synthetic byte streams, CI-safe)

use criterion::{BatchSize, Criterion, Throughput, criterion_group, criterion_main};
use pulseox::test_utils::{packet_from_extras, sample_extras, stream_of_packets};
use pulseox::{Packet, Reading, Synchronizer};
use std::hint::black_box;

fn bench_clean_stream(c: &mut Criterion) {
    let bytes = stream_of_packets(1_000);

    let mut group = c.benchmark_group("synchronizer_clean_stream");
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    group.bench_function("feed_1000_packets", |b| {
        b.iter(|| {
            let mut sync = Synchronizer::new();
            black_box(sync.feed(black_box(&bytes)))
        })
    });

    group.bench_function("push_byte_by_byte", |b| {
        b.iter(|| {
            let mut sync = Synchronizer::new();
            let mut count = 0usize;
            for &byte in black_box(&bytes) {
                if sync.push(byte).is_some() {
                    count += 1;
                }
            }
            black_box(count)
        })
    });

    group.finish();
}

fn bench_noisy_stream(c: &mut Criterion) {
    // A burst of framing-bit noise between every packet forces resynchronisation
    let mut bytes = Vec::new();
    for chunk in stream_of_packets(500).chunks(125) {
        bytes.extend_from_slice(chunk);
        bytes.extend_from_slice(&[0x13, 0x7A, 0x42, 0x00, 0x55, 0x21, 0x7F]);
    }

    let mut group = c.benchmark_group("synchronizer_noisy_stream");
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    group.bench_function("feed_500_packets_with_noise", |b| {
        b.iter(|| {
            let mut sync = Synchronizer::new();
            black_box(sync.feed(black_box(&bytes)))
        })
    });

    group.finish();
}

fn bench_packet_decoding(c: &mut Criterion) {
    let packet = packet_from_extras(&sample_extras());

    c.bench_function("packet_replay_copy", |b| {
        b.iter(|| black_box(Packet::replayed(black_box(&packet))))
    });

    c.bench_function("reading_from_packet", |b| {
        b.iter_batched(
            || packet.clone(),
            |p| black_box(Reading::from_packet(&p, 0)),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_clean_stream, bench_noisy_stream, bench_packet_decoding);
criterion_main!(benches);
