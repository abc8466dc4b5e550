// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::{Duration, Instant};

use crate::{CircuitState, Outcome};

/// A point-in-time view of a circuit breaker, returned by [`Breaker::snapshot`][crate::Breaker::snapshot].
///
/// The snapshot is taken under the breaker's lock, so all of its fields are consistent
/// with each other. It may be outdated as soon as it is returned when other threads use
/// the same breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct BreakerSnapshot {
    pub(crate) state: CircuitState,
    pub(crate) failure_count: u32,
    pub(crate) success_count: u32,
    pub(crate) opened_at: Option<Instant>,
    pub(crate) trials_in_flight: u32,
    pub(crate) stats: Option<OpenStats>,
}

impl BreakerSnapshot {
    /// Returns the state of the circuit.
    #[must_use]
    pub fn state(&self) -> CircuitState {
        self.state
    }

    /// Returns the number of consecutive failures observed while closed.
    ///
    /// Always zero when the circuit is not closed.
    #[must_use]
    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    /// Returns the number of trial successes observed while half-open.
    ///
    /// Always zero when the circuit is not half-open.
    #[must_use]
    pub fn success_count(&self) -> u32 {
        self.success_count
    }

    /// Returns the instant of the latest transition to the open state.
    ///
    /// Only present while the circuit is open.
    #[must_use]
    pub fn opened_at(&self) -> Option<Instant> {
        self.opened_at
    }

    /// Returns the number of admitted trial calls that have not reported an outcome yet.
    #[must_use]
    pub fn trials_in_flight(&self) -> u32 {
        self.trials_in_flight
    }

    /// Returns the statistics of the current outage.
    ///
    /// Present while the circuit is open or half-open.
    #[must_use]
    pub fn stats(&self) -> Option<&OpenStats> {
        self.stats.as_ref()
    }
}

/// Statistics collected from the moment a closed circuit trips until it closes again.
///
/// An outage may span several open and half-open periods when trial calls keep failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenStats {
    opened_at: Instant,
    trials: u64,
    rejected: u64,
    trial_successes: u64,
    trial_failures: u64,
    lost: u64,
    reopened: u64,
}

impl OpenStats {
    pub(crate) fn new(opened_at: Instant) -> Self {
        Self {
            opened_at,
            trials: 0,
            rejected: 0,
            trial_successes: 0,
            trial_failures: 0,
            lost: 0,
            reopened: 0,
        }
    }

    /// Returns the instant the closed circuit tripped.
    #[must_use]
    pub fn opened_at(&self) -> Instant {
        self.opened_at
    }

    /// Returns how long the outage has lasted at `now`.
    #[must_use]
    pub fn open_duration(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.opened_at)
    }

    /// Returns the number of admitted trial calls.
    #[must_use]
    pub fn trials(&self) -> u64 {
        self.trials
    }

    /// Returns the number of rejected calls.
    #[must_use]
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Returns the number of successful trial calls.
    #[must_use]
    pub fn trial_successes(&self) -> u64 {
        self.trial_successes
    }

    /// Returns the number of failed trial calls.
    #[must_use]
    pub fn trial_failures(&self) -> u64 {
        self.trial_failures
    }

    /// Returns the number of outcomes that were ignored.
    ///
    /// An outcome is ignored when it is reported while the circuit is open, or when it
    /// belongs to a [`Permit`][crate::Permit] that is no longer a trial of the current
    /// half-open period. Such outcomes come from calls admitted before a concurrent
    /// transition, from trials that were presumed lost, or from callers that reported
    /// without being admitted.
    #[must_use]
    pub fn lost(&self) -> u64 {
        self.lost
    }

    /// Returns how many times a failed trial call opened the circuit again.
    #[must_use]
    pub fn reopened(&self) -> u64 {
        self.reopened
    }

    pub(crate) fn record_trial(&mut self) {
        self.trials = self.trials.saturating_add(1);
    }

    pub(crate) fn record_rejected(&mut self) {
        self.rejected = self.rejected.saturating_add(1);
    }

    pub(crate) fn record_lost(&mut self) {
        self.lost = self.lost.saturating_add(1);
    }

    pub(crate) fn record_trial_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Success => self.trial_successes = self.trial_successes.saturating_add(1),
            Outcome::Failure => {
                self.trial_failures = self.trial_failures.saturating_add(1);
                self.reopened = self.reopened.saturating_add(1);
            }
        }
    }
}
