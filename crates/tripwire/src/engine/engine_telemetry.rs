// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;

use super::{CircuitEngine, EnterResult, ExecutionMode, ExitResult};
use crate::{BreakerSnapshot, Outcome};
#[cfg(any(feature = "logs", test))]
use crate::CircuitState;

/// Wrapper around a circuit engine to add logging capabilities.
#[derive(Debug)]
pub(crate) struct EngineTelemetry<T> {
    inner: T,
    #[cfg(any(feature = "logs", test))]
    pub(super) logs_enabled: bool,
    #[cfg(any(feature = "logs", test))]
    pub(super) breaker_name: Cow<'static, str>,
}

impl<T> EngineTelemetry<T> {
    #[cfg(any(feature = "logs", test))]
    pub fn new(inner: T, logs_enabled: bool, breaker_name: Cow<'static, str>) -> Self {
        Self {
            inner,
            logs_enabled,
            breaker_name,
        }
    }

    #[cfg(not(any(feature = "logs", test)))]
    pub fn new(inner: T, _logs_enabled: bool, _breaker_name: Cow<'static, str>) -> Self {
        Self { inner }
    }
}

impl<T: CircuitEngine> CircuitEngine for EngineTelemetry<T> {
    fn enter(&self) -> EnterResult {
        let enter_result = self.inner.enter();

        #[cfg(any(feature = "logs", test))]
        if self.logs_enabled {
            self.log_enter(&enter_result);
        }

        enter_result
    }

    fn exit(&self, outcome: Outcome, mode: Option<ExecutionMode>) -> ExitResult {
        let exit_result = self.inner.exit(outcome, mode);

        #[cfg(any(feature = "logs", test))]
        if self.logs_enabled {
            self.log_exit(outcome, &exit_result);
        }

        exit_result
    }

    fn release(&self, mode: ExecutionMode) {
        self.inner.release(mode);
    }

    fn snapshot(&self) -> BreakerSnapshot {
        self.inner.snapshot()
    }
}

#[cfg(any(feature = "logs", test))]
impl<T> EngineTelemetry<T> {
    fn log_enter(&self, enter_result: &EnterResult) {
        match *enter_result {
            EnterResult::Rejected { state, retry_after } => {
                tracing::event!(
                    name: "tripwire.breaker.rejected",
                    tracing::Level::DEBUG,
                    breaker.name = &*self.breaker_name,
                    breaker.state = state.as_str(),
                    breaker.retry_after_ms = as_millis(retry_after),
                );
            }
            EnterResult::HalfOpened { .. } => {
                tracing::event!(
                    name: "tripwire.breaker.half_open",
                    tracing::Level::INFO,
                    breaker.name = &*self.breaker_name,
                    breaker.state = CircuitState::HalfOpen.as_str(),
                );
            }
            EnterResult::Accepted { .. } => {}
        }
    }

    fn log_exit(&self, outcome: Outcome, exit_result: &ExitResult) {
        match *exit_result {
            ExitResult::Opened { failures, .. } => {
                tracing::event!(
                    name: "tripwire.breaker.opened",
                    tracing::Level::WARN,
                    breaker.name = &*self.breaker_name,
                    breaker.state = CircuitState::Open.as_str(),
                    breaker.failures = failures,
                );
            }
            ExitResult::Reopened(_) => {
                tracing::event!(
                    name: "tripwire.breaker.reopened",
                    tracing::Level::WARN,
                    breaker.name = &*self.breaker_name,
                    breaker.state = CircuitState::Open.as_str(),
                );
            }
            ExitResult::Closed { ref stats, transition } => {
                tracing::event!(
                    name: "tripwire.breaker.closed",
                    tracing::Level::INFO,
                    breaker.name = &*self.breaker_name,
                    breaker.state = CircuitState::Closed.as_str(),
                    breaker.open.duration_ms = as_millis(stats.open_duration(transition.at)),
                    breaker.trials.total = stats.trials(),
                    breaker.trials.succeeded = stats.trial_successes(),
                    breaker.trials.failed = stats.trial_failures(),
                    breaker.outcomes.lost = stats.lost(),
                    breaker.rejections = stats.rejected(),
                    breaker.reopened = stats.reopened(),
                );
            }
            ExitResult::Ignored { state } => {
                tracing::event!(
                    name: "tripwire.breaker.outcome_ignored",
                    tracing::Level::DEBUG,
                    breaker.name = &*self.breaker_name,
                    breaker.state = state.as_str(),
                    breaker.outcome = outcome.as_str(),
                );
            }
            ExitResult::Unchanged => {}
        }
    }
}

#[cfg(any(feature = "logs", test))]
fn as_millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
