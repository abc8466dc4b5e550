// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Tests that share a single breaker between threads.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;

use tick::{Clock, ClockControl};
use tripwire::{Breaker, CircuitState, HalfOpenMode, Outcome};

const THREADS: u32 = 8;
const ITERATIONS: u32 = 500;

#[test]
fn concurrent_failures_trip_exactly_once() {
    let opened = Arc::new(AtomicU32::new(0));
    let opened_clone = Arc::clone(&opened);
    let failure_threshold = 50;

    let breaker = Breaker::builder("shared", &Clock::new_frozen())
        .failure_threshold(failure_threshold)
        .on_state_change(move |args| {
            if args.current() == CircuitState::Open {
                opened_clone.fetch_add(1, Ordering::Relaxed);
            }
        })
        .build()
        .unwrap();

    thread::scope(|scope| {
        for _ in 0..THREADS {
            let breaker = breaker.clone();
            scope.spawn(move || {
                for _ in 0..ITERATIONS {
                    breaker.record_failure();
                }
            });
        }
    });

    let snapshot = breaker.snapshot();
    assert_eq!(snapshot.state(), CircuitState::Open);
    assert_eq!(opened.load(Ordering::Relaxed), 1);
    assert_eq!(
        snapshot.stats().map(|stats| stats.lost()),
        Some(u64::from(THREADS * ITERATIONS - failure_threshold))
    );
}

#[test]
fn concurrent_admission_checks_keep_open_timestamp() {
    let breaker = Breaker::new(1, 1, Duration::from_secs(60), &Clock::new_frozen()).unwrap();
    breaker.record_failure();
    let opened_at = breaker.snapshot().opened_at();

    let admitted = AtomicU32::new(0);
    thread::scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|| {
                for _ in 0..ITERATIONS {
                    if breaker.allow_request() {
                        admitted.fetch_add(1, Ordering::Relaxed);
                    }
                }
            });
        }
    });

    let snapshot = breaker.snapshot();
    assert_eq!(admitted.load(Ordering::Relaxed), 0);
    assert_eq!(snapshot.opened_at(), opened_at);
    assert_eq!(
        snapshot.stats().map(|stats| stats.rejected()),
        Some(u64::from(THREADS * ITERATIONS))
    );
}

#[test]
fn concurrent_trials_respect_limit() {
    let control = ClockControl::new();
    let breaker = Breaker::builder("limited", &control.to_clock())
        .failure_threshold(1)
        .half_open_mode(HalfOpenMode::limited(3))
        .build()
        .unwrap();
    breaker.record_failure();
    control.advance(Duration::from_secs(5));

    let admitted = AtomicU32::new(0);
    thread::scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|| {
                for _ in 0..ITERATIONS {
                    if breaker.allow_request() {
                        admitted.fetch_add(1, Ordering::Relaxed);
                    }
                }
            });
        }
    });

    assert_eq!(admitted.load(Ordering::Relaxed), 3);
    assert_eq!(breaker.snapshot().trials_in_flight(), 3);
}

#[test]
fn concurrent_protocol_never_panics() {
    let control = ClockControl::new();
    let breaker = Breaker::builder("mixed", &control.to_clock())
        .open_duration(Duration::ZERO)
        .half_open_mode(HalfOpenMode::limited(2))
        .build()
        .unwrap();

    thread::scope(|scope| {
        for thread_index in 0..THREADS {
            let breaker = breaker.clone();
            scope.spawn(move || {
                for iteration in 0..ITERATIONS {
                    if breaker.allow_request() {
                        if (thread_index + iteration) % 3 == 0 {
                            breaker.record_failure();
                        } else {
                            breaker.record_success();
                        }
                    }
                }
            });
        }
    });

    let snapshot = breaker.snapshot();
    match snapshot.state() {
        CircuitState::Closed => assert!(snapshot.failure_count() < 3),
        CircuitState::HalfOpen => assert!(snapshot.trials_in_flight() <= 2),
        CircuitState::Open => assert!(snapshot.opened_at().is_some()),
    }
}

#[test]
fn interleaved_cycles_trip_once_per_failure_run() {
    const SCRIPTED_THREADS: usize = 4;
    const BLOCKS: usize = 40;

    // Blocks run back to back: "F F F S" trips the breaker and the success closes it again,
    // "F F S" never reaches the threshold.
    let script: Vec<Outcome> = (0..BLOCKS)
        .flat_map(|block| {
            let failures = if block % 2 == 0 { 3 } else { 2 };
            std::iter::repeat_n(Outcome::Failure, failures).chain(std::iter::once(Outcome::Success))
        })
        .collect();

    let opened = Arc::new(AtomicU32::new(0));
    let closed = Arc::new(AtomicU32::new(0));
    let opened_clone = Arc::clone(&opened);
    let closed_clone = Arc::clone(&closed);

    let breaker = Breaker::builder("interleaved", &Clock::new_frozen())
        .failure_threshold(3)
        .success_threshold(1)
        .open_duration(Duration::ZERO)
        .on_state_change(move |args| match args.current() {
            CircuitState::Open => {
                opened_clone.fetch_add(1, Ordering::Relaxed);
            }
            CircuitState::Closed => {
                closed_clone.fetch_add(1, Ordering::Relaxed);
            }
            CircuitState::HalfOpen => {}
        })
        .build()
        .unwrap();

    let turn = Mutex::new(0_usize);
    let turn_changed = Condvar::new();

    thread::scope(|scope| {
        for thread_index in 0..SCRIPTED_THREADS {
            let (breaker, script, turn, turn_changed) = (&breaker, &script, &turn, &turn_changed);

            scope.spawn(move || {
                for step in (thread_index..script.len()).step_by(SCRIPTED_THREADS) {
                    let mut current = turn_changed.wait_while(turn.lock().unwrap(), |current| *current != step).unwrap();

                    // Half of the threads report through permits, the other half without.
                    if thread_index % 2 == 0 {
                        if let Ok(permit) = breaker.try_acquire() {
                            permit.record(script[step]);
                        }
                    } else if breaker.allow_request() {
                        breaker.record(script[step]);
                    }

                    *current += 1;
                    turn_changed.notify_all();
                }
            });
        }
    });

    let expected_trips = u32::try_from(BLOCKS / 2).unwrap();
    let snapshot = breaker.snapshot();
    assert_eq!(opened.load(Ordering::Relaxed), expected_trips);
    assert_eq!(closed.load(Ordering::Relaxed), expected_trips);
    assert_eq!(snapshot.state(), CircuitState::Closed);
    assert_eq!(snapshot.failure_count(), 0);
}

#[test]
fn zero_open_duration_single_trial_under_contention() {
    let breaker = Breaker::builder("contended", &Clock::new_frozen())
        .failure_threshold(1)
        .open_duration(Duration::ZERO)
        .half_open_mode(HalfOpenMode::single())
        .build()
        .unwrap();
    breaker.record_failure();

    let admitted = AtomicU32::new(0);
    thread::scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|| {
                for _ in 0..ITERATIONS {
                    if breaker.allow_request() {
                        admitted.fetch_add(1, Ordering::Relaxed);
                    }
                }
            });
        }
    });

    assert_eq!(admitted.load(Ordering::Relaxed), 1);
    assert_eq!(breaker.snapshot().trials_in_flight(), 1);
}
