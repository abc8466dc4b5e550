// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::time::Duration;

use tick::Clock;

use crate::breaker::Breaker;
use crate::callbacks::OnStateChange;
use crate::constants::{DEFAULT_FAILURE_THRESHOLD, DEFAULT_OPEN_DURATION, DEFAULT_SUCCESS_THRESHOLD};
use crate::engine::EngineOptions;
use crate::{ConfigError, HalfOpenMode, StateChangeArgs};

/// Builder for configuring a [`Breaker`].
///
/// This type is created by calling [`Breaker::builder`]. Every property has a default, so
/// a builder can be turned into a breaker right away:
///
/// ```rust
/// use std::time::Duration;
///
/// use tick::Clock;
/// use tripwire::{Breaker, HalfOpenMode};
///
/// # fn build(clock: &Clock) -> Result<(), tripwire::ConfigError> {
/// let breaker = Breaker::builder("inventory", clock)
///     .failure_threshold(5)
///     .open_duration(Duration::from_secs(30))
///     .half_open_mode(HalfOpenMode::limited(2))
///     .on_state_change(|args| println!("{}: {} -> {}", args.breaker_name(), args.previous(), args.current()))
///     .build()?;
/// # _ = breaker;
/// # Ok(())
/// # }
/// ```
///
/// The configuration is validated by [`build`][Self::build].
#[derive(Debug)]
pub struct BreakerBuilder {
    name: Cow<'static, str>,
    clock: Clock,
    failure_threshold: u32,
    success_threshold: u32,
    open_duration: Duration,
    half_open_mode: HalfOpenMode,
    trial_timeout: Option<Duration>,
    on_state_change: Option<OnStateChange>,
    logs_enabled: bool,
}

impl BreakerBuilder {
    pub(crate) fn new(name: Cow<'static, str>, clock: &Clock) -> Self {
        Self {
            name,
            clock: clock.clone(),
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            success_threshold: DEFAULT_SUCCESS_THRESHOLD,
            open_duration: DEFAULT_OPEN_DURATION,
            half_open_mode: HalfOpenMode::default(),
            trial_timeout: None,
            on_state_change: None,
            logs_enabled: true,
        }
    }

    /// Sets the number of consecutive failures that trip the closed circuit.
    ///
    /// A success while closed starts the count over.
    ///
    /// **Default**: 3 failures
    ///
    /// # Arguments
    ///
    /// * `threshold` - The number of consecutive failures, at least 1
    #[must_use]
    pub fn failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    /// Sets the number of trial successes that close the half-open circuit.
    ///
    /// **Default**: 2 successes
    ///
    /// # Arguments
    ///
    /// * `threshold` - The number of trial successes, at least 1
    #[must_use]
    pub fn success_threshold(mut self, threshold: u32) -> Self {
        self.success_threshold = threshold;
        self
    }

    /// Sets how long the circuit stays open before a trial call is admitted.
    ///
    /// A zero duration admits a trial call on the first admission check after tripping.
    ///
    /// **Default**: 5 seconds
    ///
    /// # Arguments
    ///
    /// * `duration` - How long the circuit stays open after tripping
    #[must_use]
    pub fn open_duration(mut self, duration: Duration) -> Self {
        self.open_duration = duration;
        self
    }

    /// Sets how many trial calls are admitted while the circuit is half-open.
    ///
    /// **Default**: [`HalfOpenMode::single`]
    #[must_use]
    pub fn half_open_mode(mut self, mode: HalfOpenMode) -> Self {
        self.half_open_mode = mode;
        self
    }

    /// Sets how long a half-open breaker waits for an unreported trial before presuming it lost.
    ///
    /// Once every trial slot is taken and no trial was admitted for this long, the trials in
    /// flight are presumed lost and the next call is admitted as a new trial. Outcomes that
    /// the lost trials report later are ignored. A zero timeout never presumes trials lost,
    /// so a slot is only freed when its trial reports or its [`Permit`][crate::Permit] is dropped.
    ///
    /// **Default**: the open duration
    ///
    /// # Arguments
    ///
    /// * `timeout` - How long to wait for an unreported trial
    #[must_use]
    pub fn trial_timeout(mut self, timeout: Duration) -> Self {
        self.trial_timeout = Some(timeout);
        self
    }

    /// Sets the callback invoked after every change of the circuit state.
    ///
    /// The callback runs on the thread that caused the transition, after the breaker
    /// released its internal lock. It may call back into the breaker.
    ///
    /// **Default**: No callback
    ///
    /// # Arguments
    ///
    /// * `callback` - Function that receives [`StateChangeArgs`] describing the transition
    #[must_use]
    pub fn on_state_change(mut self, callback: impl Fn(StateChangeArgs<'_>) + Send + Sync + 'static) -> Self {
        self.on_state_change = Some(OnStateChange::new(callback));
        self
    }

    /// Enables or disables log events for this breaker.
    ///
    /// Has no effect unless the `logs` feature is enabled.
    ///
    /// **Default**: enabled
    #[must_use]
    pub fn enable_logs(mut self, enabled: bool) -> Self {
        self.logs_enabled = enabled;
        self
    }

    /// Validates the configuration and builds the breaker.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a threshold or the half-open trial limit is zero.
    pub fn build(self) -> Result<Breaker, ConfigError> {
        let options = self.engine_options()?;

        Ok(Breaker::from_parts(
            self.name,
            options,
            self.clock,
            self.on_state_change,
            self.logs_enabled,
        ))
    }

    fn engine_options(&self) -> Result<EngineOptions, ConfigError> {
        if self.failure_threshold == 0 {
            return Err(ConfigError::ZeroFailureThreshold);
        }

        if self.success_threshold == 0 {
            return Err(ConfigError::ZeroSuccessThreshold);
        }

        let max_trial_calls = self.half_open_mode.max_trial_calls();
        if max_trial_calls == Some(0) {
            return Err(ConfigError::ZeroTrialLimit);
        }

        Ok(EngineOptions {
            failure_threshold: self.failure_threshold,
            success_threshold: self.success_threshold,
            open_duration: self.open_duration,
            max_trial_calls,
            trial_timeout: self.trial_timeout.unwrap_or(self.open_duration),
        })
    }
}
