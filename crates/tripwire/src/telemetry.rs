// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Names of the `tracing` events and fields emitted by the circuit breaker.
//!
//! Events are only emitted when the `logs` feature is enabled and the breaker was not
//! built with [`enable_logs(false)`][crate::BreakerBuilder::enable_logs].

/// Emitted at `WARN` when consecutive failures trip a closed circuit.
pub const OPENED_EVENT_NAME: &str = "tripwire.breaker.opened";

/// Emitted at `WARN` when a failed trial call opens the circuit again.
pub const REOPENED_EVENT_NAME: &str = "tripwire.breaker.reopened";

/// Emitted at `INFO` when the open duration elapsed and the first trial call is admitted.
pub const HALF_OPEN_EVENT_NAME: &str = "tripwire.breaker.half_open";

/// Emitted at `INFO` when enough trial calls succeeded and the circuit closed.
pub const CLOSED_EVENT_NAME: &str = "tripwire.breaker.closed";

/// Emitted at `DEBUG` when a call is rejected.
pub const REJECTED_EVENT_NAME: &str = "tripwire.breaker.rejected";

/// Emitted at `DEBUG` when a reported outcome is ignored.
///
/// This happens while the circuit is open, and while it is half-open for calls that are
/// not trials of the current half-open period.
pub const OUTCOME_IGNORED_EVENT_NAME: &str = "tripwire.breaker.outcome_ignored";

/// The name of the breaker.
pub const BREAKER_NAME: &str = "breaker.name";

/// The state of the circuit after the event, see [`CircuitState::as_str`][crate::CircuitState::as_str].
pub const BREAKER_STATE: &str = "breaker.state";

/// The number of consecutive failures that tripped the circuit.
pub const BREAKER_FAILURES: &str = "breaker.failures";

/// The time in milliseconds until the breaker admits another call.
pub const BREAKER_RETRY_AFTER_MS: &str = "breaker.retry_after_ms";

/// The ignored outcome, see [`Outcome::as_str`][crate::Outcome::as_str].
pub const BREAKER_OUTCOME: &str = "breaker.outcome";

/// How long the circuit stayed open or half-open, in milliseconds.
pub const BREAKER_OPEN_DURATION_MS: &str = "breaker.open.duration_ms";

/// The number of trial calls admitted while half-open.
pub const BREAKER_TRIALS_TOTAL: &str = "breaker.trials.total";

/// The number of successful trial calls.
pub const BREAKER_TRIALS_SUCCEEDED: &str = "breaker.trials.succeeded";

/// The number of failed trial calls.
pub const BREAKER_TRIALS_FAILED: &str = "breaker.trials.failed";

/// The number of outcomes ignored while the circuit was open.
pub const BREAKER_OUTCOMES_LOST: &str = "breaker.outcomes.lost";

/// The number of rejected calls.
pub const BREAKER_REJECTIONS: &str = "breaker.rejections";

/// The number of times the circuit opened again after a failed trial call.
pub const BREAKER_REOPENED: &str = "breaker.reopened";
