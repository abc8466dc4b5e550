// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Mutex;
use std::time::Instant;

use tick::Clock;

use super::{CircuitEngine, EngineOptions, EnterResult, ExecutionMode, ExitResult, Transition};
use crate::constants::ERR_POISONED_LOCK;
use crate::{BreakerSnapshot, CircuitState, OpenStats, Outcome};

/// Engine that manages the state of the circuit breaker.
#[derive(Debug)]
pub(crate) struct EngineCore {
    circuit: Mutex<Circuit>,
    options: EngineOptions,
    clock: Clock,
}

impl EngineCore {
    pub fn new(options: EngineOptions, clock: Clock) -> Self {
        Self {
            circuit: Mutex::new(Circuit::new(clock.instant())),
            options,
            clock,
        }
    }
}

impl CircuitEngine for EngineCore {
    fn enter(&self) -> EnterResult {
        let now = self.clock.instant();

        // NOTE: Remember to execute all expensive operations (like time checks) outside the lock.
        self.circuit.lock().expect(ERR_POISONED_LOCK).enter(now, &self.options)
    }

    fn exit(&self, outcome: Outcome, mode: Option<ExecutionMode>) -> ExitResult {
        let now = self.clock.instant();

        // NOTE: Remember to execute all expensive operations (like time checks) outside the lock.
        self.circuit.lock().expect(ERR_POISONED_LOCK).exit(outcome, mode, now, &self.options)
    }

    fn release(&self, mode: ExecutionMode) {
        self.circuit.lock().expect(ERR_POISONED_LOCK).release(mode);
    }

    fn snapshot(&self) -> BreakerSnapshot {
        self.circuit.lock().expect(ERR_POISONED_LOCK).state.snapshot()
    }
}

/// The state of the circuit together with the bookkeeping shared by all states.
#[derive(Debug)]
struct Circuit {
    state: State,

    // Identifies the trials of the current half-open period.
    generation: u64,

    // Latest instant seen under the lock. The clock is read before the lock is taken, so a
    // caller that waited for the lock may carry an instant older than one already recorded.
    latest: Instant,
}

#[derive(Debug)]
enum State {
    Closed {
        failures: u32,
    },
    Open {
        opened_at: Instant,
        stats: OpenStats,
    },
    HalfOpen {
        successes: u32,
        in_flight: u32,
        last_trial_at: Instant,
        stats: OpenStats,
    },
}

impl Circuit {
    fn new(now: Instant) -> Self {
        Self {
            state: State::Closed { failures: 0 },
            generation: 0,
            latest: now,
        }
    }

    fn observe(&mut self, now: Instant) -> Instant {
        self.latest = self.latest.max(now);
        self.latest
    }

    fn next_generation(&mut self) -> ExecutionMode {
        self.generation = self.generation.wrapping_add(1);
        ExecutionMode::Trial {
            generation: self.generation,
        }
    }

    /// Returns `true` if a report with this mode belongs to a trial of the current half-open period.
    ///
    /// Reports without a mode cannot be attributed and are taken as current.
    fn is_current_trial(&self, mode: Option<ExecutionMode>) -> bool {
        match mode {
            None => true,
            Some(ExecutionMode::Trial { generation }) => generation == self.generation,
            Some(ExecutionMode::Normal) => false,
        }
    }

    fn enter(&mut self, now: Instant, options: &EngineOptions) -> EnterResult {
        let now = self.observe(now);
        let generation = self.generation;

        match &mut self.state {
            State::Closed { .. } => EnterResult::Accepted {
                mode: ExecutionMode::Normal,
            },
            State::Open { opened_at, stats } => {
                let elapsed = now.saturating_duration_since(*opened_at);

                if elapsed < options.open_duration {
                    stats.record_rejected();
                    return EnterResult::Rejected {
                        state: CircuitState::Open,
                        retry_after: options.open_duration.saturating_sub(elapsed),
                    };
                }

                let mut stats = *stats;
                stats.record_trial();

                self.state = State::HalfOpen {
                    successes: 0,
                    in_flight: 1,
                    last_trial_at: now,
                    stats,
                };

                EnterResult::HalfOpened {
                    mode: self.next_generation(),
                    transition: Transition::new(CircuitState::Open, CircuitState::HalfOpen, now),
                }
            }
            State::HalfOpen {
                in_flight,
                last_trial_at,
                stats,
                ..
            } => {
                if options.max_trial_calls.is_none_or(|max| *in_flight < max) {
                    *in_flight = in_flight.saturating_add(1);
                    *last_trial_at = now;
                    stats.record_trial();

                    return EnterResult::Accepted {
                        mode: ExecutionMode::Trial { generation },
                    };
                }

                let since_last_trial = now.saturating_duration_since(*last_trial_at);

                if options.trial_timeout.is_zero() || since_last_trial < options.trial_timeout {
                    stats.record_rejected();
                    return EnterResult::Rejected {
                        state: CircuitState::HalfOpen,
                        retry_after: options.trial_timeout.saturating_sub(since_last_trial),
                    };
                }

                // Every slot is taken and no trial was admitted within the trial timeout. The
                // trials in flight are presumed lost, their late reports no longer count.
                *in_flight = 1;
                *last_trial_at = now;
                stats.record_trial();

                EnterResult::Accepted {
                    mode: self.next_generation(),
                }
            }
        }
    }

    fn exit(&mut self, outcome: Outcome, mode: Option<ExecutionMode>, now: Instant, options: &EngineOptions) -> ExitResult {
        let now = self.observe(now);
        let current_trial = self.is_current_trial(mode);

        match &mut self.state {
            State::Closed { failures } => match outcome {
                Outcome::Success => {
                    *failures = 0;
                    ExitResult::Unchanged
                }
                Outcome::Failure => {
                    *failures = failures.saturating_add(1);

                    if *failures < options.failure_threshold {
                        return ExitResult::Unchanged;
                    }

                    let tripped_after = *failures;
                    self.state = State::Open {
                        opened_at: now,
                        stats: OpenStats::new(now),
                    };

                    ExitResult::Opened {
                        failures: tripped_after,
                        transition: Transition::new(CircuitState::Closed, CircuitState::Open, now),
                    }
                }
            },
            State::Open { stats, .. } => {
                // In open state, we don't process outcomes. This happens when the state changes between
                // the admission and the report of another thread, or when the caller reports an outcome
                // for a call that was never admitted. Count it and ignore it.
                stats.record_lost();
                ExitResult::Ignored {
                    state: CircuitState::Open,
                }
            }
            State::HalfOpen { stats, .. } if !current_trial => {
                stats.record_lost();
                ExitResult::Ignored {
                    state: CircuitState::HalfOpen,
                }
            }
            State::HalfOpen {
                successes,
                in_flight,
                stats,
                ..
            } => {
                *in_flight = in_flight.saturating_sub(1);
                stats.record_trial_outcome(outcome);

                match outcome {
                    Outcome::Success => {
                        *successes = successes.saturating_add(1);

                        if *successes < options.success_threshold {
                            return ExitResult::Unchanged;
                        }

                        let stats = *stats;
                        self.state = State::Closed { failures: 0 };

                        ExitResult::Closed {
                            stats,
                            transition: Transition::new(CircuitState::HalfOpen, CircuitState::Closed, now),
                        }
                    }
                    Outcome::Failure => {
                        self.state = State::Open {
                            opened_at: now,
                            stats: *stats,
                        };

                        ExitResult::Reopened(Transition::new(CircuitState::HalfOpen, CircuitState::Open, now))
                    }
                }
            }
        }
    }

    fn release(&mut self, mode: ExecutionMode) {
        if !self.is_current_trial(Some(mode)) {
            return;
        }

        if let State::HalfOpen { in_flight, .. } = &mut self.state {
            *in_flight = in_flight.saturating_sub(1);
        }
    }
}

impl State {
    fn snapshot(&self) -> BreakerSnapshot {
        match self {
            Self::Closed { failures } => BreakerSnapshot {
                state: CircuitState::Closed,
                failure_count: *failures,
                success_count: 0,
                opened_at: None,
                trials_in_flight: 0,
                stats: None,
            },
            Self::Open { opened_at, stats } => BreakerSnapshot {
                state: CircuitState::Open,
                failure_count: 0,
                success_count: 0,
                opened_at: Some(*opened_at),
                trials_in_flight: 0,
                stats: Some(*stats),
            },
            Self::HalfOpen {
                successes,
                in_flight,
                stats,
                ..
            } => BreakerSnapshot {
                state: CircuitState::HalfOpen,
                failure_count: 0,
                success_count: *successes,
                opened_at: None,
                trials_in_flight: *in_flight,
                stats: Some(*stats),
            },
        }
    }
}
