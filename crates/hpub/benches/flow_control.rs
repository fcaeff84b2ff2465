// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test/bench code readability over pedantic
#![allow(clippy::cast_possible_truncation)] // Test parameters
#![allow(clippy::missing_panics_doc)] // Tests/examples panic on failure
#![allow(clippy::semicolon_if_nothing_returned)] // Benchmark code formatting
#![allow(clippy::unreadable_literal)] // Large test constants

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hpub::{
    has_capacity, position_pair, LimitBarrier, MinWindowedLimitBarrier, PositionIndicator,
    RateReporter, RateSample, WindowedLimitBarrier,
};
use std::time::Duration;

// ============================================================================
// Position / barrier reads
// ============================================================================

/// Benchmark: PositionReader::position (Acquire load)
/// Target: < 5 ns
fn bench_position_read(c: &mut Criterion) {
    let (_writer, reader) = position_pair(1024);
    c.bench_function("position_read", |b| b.iter(|| black_box(reader.position())));
}

/// Benchmark: PositionWriter::advance (Release store)
/// Target: < 5 ns
fn bench_position_advance(c: &mut Criterion) {
    let (mut writer, _reader) = position_pair(0);
    c.bench_function("position_advance", |b| {
        b.iter(|| black_box(writer.advance(black_box(64))))
    });
}

/// Benchmark: WindowedLimitBarrier::limit
/// Target: < 5 ns
fn bench_windowed_limit(c: &mut Criterion) {
    let (_writer, reader) = position_pair(4096);
    let barrier = WindowedLimitBarrier::new(reader, 64 * 1024);
    c.bench_function("windowed_limit", |b| b.iter(|| black_box(barrier.limit())));
}

/// Benchmark: MinWindowedLimitBarrier::limit over 8 consumers
/// Target: < 20 ns
fn bench_min_windowed_limit_8(c: &mut Criterion) {
    let pairs: Vec<_> = (0..8u64).map(|i| position_pair(i * 128)).collect();
    let readers: Vec<_> = pairs.iter().map(|(w, _)| w.reader()).collect();
    let barrier = MinWindowedLimitBarrier::new(readers, 64 * 1024).unwrap();
    c.bench_function("min_windowed_limit_8", |b| b.iter(|| black_box(barrier.limit())));
}

/// Benchmark: has_capacity fast path
/// Target: < 5 ns
fn bench_has_capacity(c: &mut Criterion) {
    let (_writer, reader) = position_pair(0);
    let barrier = WindowedLimitBarrier::new(reader, 64 * 1024);
    c.bench_function("has_capacity", |b| {
        b.iter(|| black_box(has_capacity(&barrier, black_box(1024), black_box(256))))
    });
}

// ============================================================================
// Rate counters
// ============================================================================

/// Benchmark: RateReporter::on_message (two Relaxed fetch_add)
/// Target: < 10 ns
fn bench_rate_on_message(c: &mut Criterion) {
    let reporter = RateReporter::new(Duration::from_secs(1), |_: &RateSample| {}).unwrap();
    c.bench_function("rate_on_message", |b| {
        b.iter(|| reporter.on_message(black_box(1), black_box(256)))
    });
}

criterion_group!(
    benches,
    bench_position_read,
    bench_position_advance,
    bench_windowed_limit,
    bench_min_windowed_limit_8,
    bench_has_capacity,
    bench_rate_on_message
);
criterion_main!(benches);
