// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use tick::Clock;

use crate::builder::BreakerBuilder;
use crate::callbacks::OnStateChange;
use crate::constants::DEFAULT_BREAKER_NAME;
use crate::engine::{CircuitEngine, Engine, EngineCore, EngineOptions, EngineTelemetry, EnterResult, ExecutionMode, Transition};
use crate::{BreakerConfig, BreakerOpen, BreakerSnapshot, CallError, CircuitState, ConfigError, Outcome, StateChangeArgs};

/// A consecutive-failure circuit breaker.
///
/// The breaker starts closed and lets every call through. Once `failure_threshold`
/// failures are reported in a row it opens and rejects calls. After `open_duration` it
/// admits trial calls; `success_threshold` trial successes close it again, while a single
/// trial failure opens it for another `open_duration`.
///
/// `Breaker` is cheap to clone. Clones share the same state, so a breaker can be handed
/// to every thread or task that calls the same downstream.
///
/// # Protocol
///
/// Ask for admission with [`allow_request`][Self::allow_request], invoke the operation
/// only when admitted, then report the outcome with [`record_success`][Self::record_success]
/// or [`record_failure`][Self::record_failure]. The [`call`][Self::call] family of methods
/// performs all three steps.
///
/// [`try_acquire`][Self::try_acquire] returns a [`Permit`] instead of a `bool`. Reporting
/// through the permit ties the outcome to the admission, so the breaker can ignore reports
/// of trial calls it already presumed lost, and a dropped permit frees its trial slot.
/// Reports through [`record_success`][Self::record_success] and
/// [`record_failure`][Self::record_failure] cannot be told apart and always count as
/// outcomes of the current period.
///
/// Outcomes reported while the circuit is open are ignored. They can only come from calls
/// admitted before a concurrent trip, or from callers that did not ask for admission.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
///
/// use tick::ClockControl;
/// use tripwire::{Breaker, CircuitState};
///
/// # fn main() -> Result<(), tripwire::ConfigError> {
/// let control = ClockControl::new();
/// let breaker = Breaker::new(3, 2, Duration::from_secs(5), &control.to_clock())?;
///
/// for _ in 0..3 {
///     breaker.record_failure();
/// }
/// assert_eq!(breaker.state(), CircuitState::Open);
/// assert!(!breaker.allow_request());
///
/// control.advance_millis(5001);
/// assert!(breaker.allow_request());
/// breaker.record_success();
/// assert!(breaker.allow_request());
/// breaker.record_success();
/// assert_eq!(breaker.state(), CircuitState::Closed);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Breaker {
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    name: Cow<'static, str>,
    engine: Engine,
    on_state_change: Option<OnStateChange>,
}

impl Breaker {
    /// Creates a breaker with the given thresholds and the default settings for everything else.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when either threshold is zero.
    pub fn new(failure_threshold: u32, success_threshold: u32, open_duration: Duration, clock: &Clock) -> Result<Self, ConfigError> {
        Self::builder(DEFAULT_BREAKER_NAME, clock)
            .failure_threshold(failure_threshold)
            .success_threshold(success_threshold)
            .open_duration(open_duration)
            .build()
    }

    /// Creates a builder for a breaker with the given name.
    ///
    /// The name identifies the breaker in log events, state change callbacks and
    /// [`BreakerOpen`] errors.
    #[must_use]
    pub fn builder(name: impl Into<Cow<'static, str>>, clock: &Clock) -> BreakerBuilder {
        BreakerBuilder::new(name.into(), clock)
    }

    /// Creates a breaker from plain configuration data.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the configuration is invalid.
    pub fn from_config(name: impl Into<Cow<'static, str>>, config: &BreakerConfig, clock: &Clock) -> Result<Self, ConfigError> {
        config.apply(Self::builder(name, clock))?.build()
    }

    pub(crate) fn from_parts(
        name: Cow<'static, str>,
        options: EngineOptions,
        clock: Clock,
        on_state_change: Option<OnStateChange>,
        logs_enabled: bool,
    ) -> Self {
        let engine = EngineTelemetry::new(EngineCore::new(options, clock), logs_enabled, name.clone());

        Self {
            shared: Arc::new(Shared {
                name,
                engine,
                on_state_change,
            }),
        }
    }

    /// Returns the name of the breaker.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Returns `true` if the caller may invoke the protected operation.
    ///
    /// When the circuit is open and the open duration has elapsed, this moves the circuit
    /// to half-open and admits the call as the first trial. Repeated checks while the circuit
    /// is open do not extend the open duration.
    ///
    /// Every admitted call must be followed by exactly one outcome report.
    #[must_use]
    pub fn allow_request(&self) -> bool {
        self.admit().is_ok()
    }

    /// Asks for admission, returning a [`Permit`] to report the outcome through.
    ///
    /// Same as [`allow_request`][Self::allow_request], but the error tells the caller which
    /// breaker rejected the call and how long until it admits another one.
    ///
    /// # Errors
    ///
    /// Returns [`BreakerOpen`] when the circuit is open, or half-open with every trial slot taken.
    pub fn try_acquire(&self) -> Result<Permit<'_>, BreakerOpen> {
        self.admit().map(|mode| Permit {
            breaker: self,
            mode: Some(mode),
        })
    }

    /// Reports that an admitted call succeeded.
    pub fn record_success(&self) {
        self.record(Outcome::Success);
    }

    /// Reports that an admitted call failed.
    pub fn record_failure(&self) {
        self.record(Outcome::Failure);
    }

    /// Reports the outcome of an admitted call.
    pub fn record(&self, outcome: Outcome) {
        self.report(outcome, None);
    }

    /// Returns the state of the circuit.
    ///
    /// This is a pure read. An open circuit whose open duration has elapsed is reported as
    /// open until the next admission check moves it to half-open.
    #[must_use]
    pub fn state(&self) -> CircuitState {
        self.snapshot().state()
    }

    /// Returns a consistent view of the breaker's counters and statistics.
    #[must_use]
    pub fn snapshot(&self) -> BreakerSnapshot {
        self.shared.engine.snapshot()
    }

    /// Invokes `operation` if the breaker admits the call and reports its outcome.
    ///
    /// `Ok` counts as success and `Err` as failure.
    ///
    /// # Errors
    ///
    /// Returns [`CallError::Rejected`] without invoking `operation` when the call is rejected,
    /// or [`CallError::Inner`] with the error returned by `operation`.
    pub fn call<T, E>(&self, operation: impl FnOnce() -> Result<T, E>) -> Result<T, CallError<E>> {
        self.call_with(operation, Outcome::from_result)
    }

    /// Invokes `operation` if the breaker admits the call and reports the outcome chosen by `classify`.
    ///
    /// Use this when some errors do not indicate an unhealthy downstream, for example a
    /// "not found" response, or when some successful responses do.
    ///
    /// # Errors
    ///
    /// Returns [`CallError::Rejected`] without invoking `operation` when the call is rejected,
    /// or [`CallError::Inner`] with the error returned by `operation`.
    pub fn call_with<T, E>(
        &self,
        operation: impl FnOnce() -> Result<T, E>,
        classify: impl FnOnce(&Result<T, E>) -> Outcome,
    ) -> Result<T, CallError<E>> {
        let permit = self.try_acquire()?;

        let result = operation();
        permit.record(classify(&result));

        result.map_err(CallError::Inner)
    }

    /// Awaits the future returned by `operation` if the breaker admits the call and reports its outcome.
    ///
    /// `Ok` counts as success and `Err` as failure. If the returned future is dropped before it
    /// completes, no outcome is reported and the admission is given back.
    ///
    /// # Errors
    ///
    /// Returns [`CallError::Rejected`] without invoking `operation` when the call is rejected,
    /// or [`CallError::Inner`] with the error returned by the future.
    pub async fn call_async<T, E, Fut>(&self, operation: impl FnOnce() -> Fut) -> Result<T, CallError<E>>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        self.call_async_with(operation, Outcome::from_result).await
    }

    /// Awaits the future returned by `operation` if the breaker admits the call and reports
    /// the outcome chosen by `classify`.
    ///
    /// # Errors
    ///
    /// Returns [`CallError::Rejected`] without invoking `operation` when the call is rejected,
    /// or [`CallError::Inner`] with the error returned by the future.
    pub async fn call_async_with<T, E, Fut>(
        &self,
        operation: impl FnOnce() -> Fut,
        classify: impl FnOnce(&Result<T, E>) -> Outcome,
    ) -> Result<T, CallError<E>>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        let permit = self.try_acquire()?;

        let result = operation().await;
        permit.record(classify(&result));

        result.map_err(CallError::Inner)
    }

    fn admit(&self) -> Result<ExecutionMode, BreakerOpen> {
        let enter_result = self.shared.engine.enter();
        self.notify(enter_result.transition());

        match enter_result {
            EnterResult::Accepted { mode } | EnterResult::HalfOpened { mode, .. } => Ok(mode),
            EnterResult::Rejected { retry_after, .. } => Err(BreakerOpen::new(self.shared.name.clone(), retry_after)),
        }
    }

    fn report(&self, outcome: Outcome, mode: Option<ExecutionMode>) {
        let exit_result = self.shared.engine.exit(outcome, mode);
        self.notify(exit_result.transition());
    }

    fn notify(&self, transition: Option<Transition>) {
        let (Some(transition), Some(callback)) = (transition, &self.shared.on_state_change) else {
            return;
        };

        callback.call(StateChangeArgs {
            breaker_name: &self.shared.name,
            previous: transition.previous,
            current: transition.current,
            timestamp: transition.at,
        });
    }
}

/// An admission to invoke the protected operation, returned by [`Breaker::try_acquire`].
///
/// Report the outcome with [`record_success`][Self::record_success],
/// [`record_failure`][Self::record_failure] or [`record`][Self::record]. The outcome is
/// matched against the admission: when the breaker has moved on since, for example after
/// presuming this trial call lost, the outcome is ignored.
///
/// Dropping the permit without reporting gives the admission back. A trial slot held by the
/// permit is freed and nothing is counted.
///
/// # Examples
///
/// ```rust
/// # use tripwire::Breaker;
/// # fn send() -> Result<(), std::io::Error> { Ok(()) }
/// # fn example(breaker: &Breaker) {
/// if let Ok(permit) = breaker.try_acquire() {
///     match send() {
///         Ok(()) => permit.record_success(),
///         Err(_) => permit.record_failure(),
///     }
/// }
/// # }
/// ```
#[derive(Debug)]
#[must_use = "an unreported permit gives its admission back when dropped"]
pub struct Permit<'a> {
    breaker: &'a Breaker,
    mode: Option<ExecutionMode>,
}

impl Permit<'_> {
    /// Reports that the admitted call succeeded.
    pub fn record_success(self) {
        self.record(Outcome::Success);
    }

    /// Reports that the admitted call failed.
    pub fn record_failure(self) {
        self.record(Outcome::Failure);
    }

    /// Reports the outcome of the admitted call.
    pub fn record(mut self, outcome: Outcome) {
        if let Some(mode) = self.mode.take() {
            self.breaker.report(outcome, Some(mode));
        }
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if let Some(mode) = self.mode.take() {
            self.breaker.shared.engine.release(mode);
        }
    }
}
