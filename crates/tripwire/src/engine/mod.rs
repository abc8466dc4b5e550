// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::Debug;
use std::time::{Duration, Instant};

use crate::{BreakerSnapshot, CircuitState, OpenStats, Outcome};

/// Result of asking the circuit for admission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum EnterResult {
    /// The call may proceed without changing the state.
    Accepted { mode: ExecutionMode },

    /// The open duration elapsed, the circuit moved to half-open and this call is the first trial.
    HalfOpened { mode: ExecutionMode, transition: Transition },

    /// The call is rejected.
    ///
    /// `retry_after` is the time until the circuit admits another call if nothing else changes.
    Rejected { state: CircuitState, retry_after: Duration },
}

impl EnterResult {
    #[cfg(test)]
    pub fn is_accepted(&self) -> bool {
        self.mode().is_some()
    }

    pub fn mode(&self) -> Option<ExecutionMode> {
        match self {
            Self::Accepted { mode } | Self::HalfOpened { mode, .. } => Some(*mode),
            Self::Rejected { .. } => None,
        }
    }

    pub fn transition(&self) -> Option<Transition> {
        match self {
            Self::HalfOpened { transition, .. } => Some(*transition),
            Self::Accepted { .. } | Self::Rejected { .. } => None,
        }
    }
}

/// Result of reporting an outcome to the circuit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ExitResult {
    /// The outcome was recorded and the state remains unchanged.
    Unchanged,

    /// The outcome was ignored, either because the circuit is open or because it belongs
    /// to a call that is not a trial of the current half-open period.
    Ignored { state: CircuitState },

    /// Consecutive failures tripped the closed circuit.
    Opened { failures: u32, transition: Transition },

    /// A failed trial call opened the half-open circuit again.
    Reopened(Transition),

    /// Enough trial calls succeeded and the circuit closed.
    Closed { stats: OpenStats, transition: Transition },
}

impl ExitResult {
    pub fn transition(&self) -> Option<Transition> {
        match self {
            Self::Opened { transition, .. } | Self::Reopened(transition) | Self::Closed { transition, .. } => Some(*transition),
            Self::Unchanged | Self::Ignored { .. } => None,
        }
    }
}

/// A change of the circuit state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Transition {
    pub previous: CircuitState,
    pub current: CircuitState,
    pub at: Instant,
}

impl Transition {
    pub fn new(previous: CircuitState, current: CircuitState, at: Instant) -> Self {
        Self { previous, current, at }
    }
}

/// Determines the mode of execution for an admitted call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExecutionMode {
    /// Regular call in the closed state.
    Normal,

    /// Trial call in the half-open state.
    ///
    /// The generation changes every time the circuit half-opens and every time lost trials
    /// are reclaimed, so reports of earlier trials can be told apart from current ones.
    Trial { generation: u64 },
}

/// Validated configuration of the circuit engine.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EngineOptions {
    pub failure_threshold: u32,
    pub success_threshold: u32,
    pub open_duration: Duration,
    pub max_trial_calls: Option<u32>,
    pub trial_timeout: Duration,
}

// Type alias for the default engine with telemetry.
pub(crate) type Engine = EngineTelemetry<EngineCore>;

/// Trait defining the behavior of a circuit breaker engine.
pub(crate) trait CircuitEngine: Debug + Send + Sync + 'static {
    fn enter(&self) -> EnterResult;

    /// Reports the outcome of a call.
    ///
    /// `mode` is the mode the call was admitted with, or `None` when the caller did not keep it.
    fn exit(&self, outcome: Outcome, mode: Option<ExecutionMode>) -> ExitResult;

    /// Gives back the admission of a call that will never report an outcome.
    fn release(&self, mode: ExecutionMode);

    fn snapshot(&self) -> BreakerSnapshot;
}

mod engine_core;
pub(crate) use engine_core::*;

#[cfg(test)]
mod engine_fake;
#[cfg(test)]
pub(crate) use engine_fake::*;

mod engine_telemetry;
pub(crate) use engine_telemetry::*;
