// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use jiff::SignedDuration;

use crate::constants::{DEFAULT_FAILURE_THRESHOLD, DEFAULT_OPEN_DURATION, DEFAULT_SUCCESS_THRESHOLD};
use crate::{BreakerBuilder, ConfigError, HalfOpenMode};

/// Plain configuration data for a [`Breaker`][crate::Breaker].
///
/// Use this when breaker settings come from a configuration source rather than code.
/// With the `serde` feature the type implements `Serialize` and `Deserialize`. Missing
/// fields take their default values and unknown fields are rejected. The open duration
/// is written in the ISO 8601 or the friendly format understood by [`SignedDuration`]:
///
/// ```json
/// {
///   "failure_threshold": 5,
///   "success_threshold": 2,
///   "open_duration": "PT30S",
///   "max_trial_calls": 1
/// }
/// ```
///
/// A `null` for `max_trial_calls` admits every call while half-open, see
/// [`HalfOpenMode::unlimited`].
///
/// Validation happens in [`Breaker::from_config`][crate::Breaker::from_config].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
#[non_exhaustive]
pub struct BreakerConfig {
    /// The number of consecutive failures that trip the closed circuit.
    pub failure_threshold: u32,

    /// The number of trial successes that close the half-open circuit.
    pub success_threshold: u32,

    /// How long the circuit stays open before a trial call is admitted. Must not be negative.
    pub open_duration: SignedDuration,

    /// The maximum number of concurrent trial calls while half-open, `None` for no limit.
    pub max_trial_calls: Option<u32>,
}

impl BreakerConfig {
    pub(crate) fn apply(&self, builder: BreakerBuilder) -> Result<BreakerBuilder, ConfigError> {
        if self.open_duration.is_negative() {
            return Err(ConfigError::NegativeOpenDuration(self.open_duration));
        }

        Ok(builder
            .failure_threshold(self.failure_threshold)
            .success_threshold(self.success_threshold)
            .open_duration(self.open_duration.unsigned_abs())
            .half_open_mode(HalfOpenMode::from_max_trial_calls(self.max_trial_calls)))
    }
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            success_threshold: DEFAULT_SUCCESS_THRESHOLD,
            open_duration: SignedDuration::try_from(DEFAULT_OPEN_DURATION).unwrap_or(SignedDuration::MAX),
            max_trial_calls: HalfOpenMode::default().max_trial_calls(),
        }
    }
}
