// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test/bench code readability over pedantic
#![allow(clippy::cast_precision_loss)] // Stats/metrics need this
#![allow(clippy::cast_possible_truncation)] // Test parameters
#![allow(clippy::float_cmp)] // Test assertions with constants
#![allow(clippy::unreadable_literal)] // Large test constants
#![allow(clippy::missing_panics_doc)] // Tests/examples panic on failure
#![allow(clippy::items_after_statements)] // Test helpers
#![allow(clippy::too_many_lines)] // Example/test code
#![allow(clippy::redundant_closure_for_method_calls)] // Test code clarity
#![allow(clippy::needless_pass_by_value)] // Test functions
#![allow(clippy::ignored_unit_patterns)] // Test closures

//! Integration tests for the rate reporter
//!
//! # Test Coverage
//!
//! - Multiple producer threads feeding one background reporter
//! - Sample rates follow the elapsed-time correction
//! - Halting from another thread while the loop waits reports the final totals
//! - Configured thread names and failure policies

use crossbeam::channel;
use hpub::{CallbackFailurePolicy, Error, RateReporter, RateSample, ReporterConfig};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn collecting_reporter(
    config: ReporterConfig,
) -> (Arc<RateReporter>, channel::Receiver<RateSample>) {
    let (tx, rx) = channel::unbounded();
    let reporter = RateReporter::with_config(config, move |s: &RateSample| {
        let _ = tx.send(*s);
    })
    .expect("valid config");
    (Arc::new(reporter), rx)
}

#[test]
fn test_totals_from_many_producers() {
    let (reporter, rx) = collecting_reporter(ReporterConfig::new(Duration::from_millis(10)));
    let handle = Arc::clone(&reporter).spawn().expect("spawn reporter");

    let producers: Vec<_> = (0..4)
        .map(|_| {
            let reporter = Arc::clone(&reporter);
            thread::spawn(move || {
                for _ in 0..5_000 {
                    reporter.on_message(1, 100);
                }
            })
        })
        .collect();
    for p in producers {
        p.join().expect("producer thread should complete");
    }

    // Every sample's totals are monotonic and end at the full count.
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut last_total = 0;
    while last_total < 20_000 && Instant::now() < deadline {
        if let Ok(sample) = rx.recv_timeout(Duration::from_millis(100)) {
            assert!(sample.total_messages >= last_total);
            last_total = sample.total_messages;
        }
    }
    handle.stop().expect("clean stop");

    assert_eq!(last_total, 20_000);
    assert_eq!(reporter.total_bytes(), 2_000_000);
}

#[test]
fn test_rates_use_measured_elapsed_time() {
    let interval = Duration::from_millis(25);
    let (reporter, rx) = collecting_reporter(ReporterConfig::new(interval));
    reporter.on_message(100, 6400);

    let handle = Arc::clone(&reporter).spawn().expect("spawn reporter");
    let first = rx.recv_timeout(Duration::from_secs(5)).expect("first sample");
    let second = rx.recv_timeout(Duration::from_secs(5)).expect("second sample");
    handle.stop().expect("clean stop");

    let ni = interval.as_nanos() as f64;
    let te = first.elapsed.as_nanos() as f64;
    let expected = 100.0 * ni / te;
    assert!((first.messages_per_sec - expected).abs() <= 1e-6 * expected);
    assert!((first.bytes_per_sec - 64.0 * expected).abs() <= 1e-6 * 64.0 * expected);

    // Nothing recorded during the second interval.
    assert_eq!(second.messages_per_sec, 0.0);
    assert_eq!(second.total_messages, 100);
}

#[test]
fn test_halt_from_other_thread_reports_final_totals() {
    let (reporter, rx) = collecting_reporter(ReporterConfig::new(Duration::from_secs(60)));

    let runner = {
        let reporter = Arc::clone(&reporter);
        thread::spawn(move || reporter.run())
    };

    reporter.on_message(5, 500);
    thread::sleep(Duration::from_millis(20));
    let start = Instant::now();
    reporter.halt();
    let result = runner.join().expect("runner thread should complete");

    assert!(result.is_ok());
    assert!(start.elapsed() < Duration::from_secs(5));

    // The interval cut short by halt() is still reported.
    let samples: Vec<RateSample> = rx.try_iter().collect();
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].total_messages, 5);
    assert_eq!(samples[0].total_bytes, 500);
    assert!(samples[0].elapsed < Duration::from_secs(60));
    assert!(samples[0].messages_per_sec > 0.0);
}

#[test]
fn test_thread_name_from_config() {
    let (tx, rx) = channel::bounded(1);
    let config = ReporterConfig::new(Duration::from_millis(5)).with_thread_name("rates-test");
    let reporter = Arc::new(
        RateReporter::with_config(config, move |_: &RateSample| {
            let _ = tx.try_send(thread::current().name().map(str::to_string));
        })
        .expect("valid config"),
    );

    let handle = Arc::clone(&reporter).spawn().expect("spawn reporter");
    let name = rx.recv_timeout(Duration::from_secs(5)).expect("one sample");
    handle.stop().expect("clean stop");

    assert_eq!(name.as_deref(), Some("rates-test"));
}

#[test]
fn test_failure_policy_halt_surfaces_through_handle() {
    let config = ReporterConfig::new(Duration::from_millis(5))
        .with_failure_policy(CallbackFailurePolicy::Halt);
    let reporter = Arc::new(
        RateReporter::with_config(config, |_: &RateSample| panic!("exporter down"))
            .expect("valid config"),
    );

    let handle = Arc::clone(&reporter).spawn().expect("spawn reporter");
    let result = handle.join();

    assert!(matches!(result, Err(Error::ReporterFailed(_))));
    assert!(reporter.is_halted());
}
