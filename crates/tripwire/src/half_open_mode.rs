// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// How many trial calls the circuit breaker admits while it is half-open.
///
/// After the open duration elapses, the breaker lets trial calls through to find out
/// whether the downstream has recovered. The mode limits how many of these calls may be
/// in flight at the same time. A trial slot is released as soon as an outcome is
/// reported. A trial whose outcome is never reported is considered lost once the open
/// duration has elapsed since the last trial was admitted, and another trial is admitted.
///
/// Three modes are supported:
///
/// - [`HalfOpenMode::single`]: One trial call at a time (default).
/// - [`HalfOpenMode::limited`]: Up to `n` concurrent trial calls.
/// - [`HalfOpenMode::unlimited`]: Every call is admitted while half-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfOpenMode {
    inner: Mode,
}

impl HalfOpenMode {
    /// Admit a single trial call at a time.
    ///
    /// This protects a recovering downstream the most. With a success threshold above one,
    /// recovery needs that many sequential round trips.
    #[must_use]
    pub fn single() -> Self {
        Self { inner: Mode::Limited(1) }
    }

    /// Admit up to `max_trial_calls` concurrent trial calls.
    ///
    /// A value of zero is rejected with [`ConfigError::ZeroTrialLimit`][crate::ConfigError::ZeroTrialLimit]
    /// when the breaker is built.
    #[must_use]
    pub fn limited(max_trial_calls: u32) -> Self {
        Self {
            inner: Mode::Limited(max_trial_calls),
        }
    }

    /// Admit every call while half-open.
    ///
    /// Concurrent trial calls may all report their outcomes, so more than `success_threshold`
    /// successes can be reported before the circuit closes. Any failure still reopens it.
    #[must_use]
    pub fn unlimited() -> Self {
        Self { inner: Mode::Unlimited }
    }

    /// Returns the maximum number of concurrent trial calls, or `None` when unlimited.
    #[must_use]
    pub fn max_trial_calls(&self) -> Option<u32> {
        match self.inner {
            Mode::Limited(max) => Some(max),
            Mode::Unlimited => None,
        }
    }

    pub(crate) fn from_max_trial_calls(max_trial_calls: Option<u32>) -> Self {
        max_trial_calls.map_or_else(Self::unlimited, Self::limited)
    }
}

impl Default for HalfOpenMode {
    fn default() -> Self {
        Self::single()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Limited(u32),
    Unlimited,
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_single() {
        assert_eq!(HalfOpenMode::default(), HalfOpenMode::single());
        assert_eq!(HalfOpenMode::single().max_trial_calls(), Some(1));
    }

    #[test]
    fn limited_keeps_value() {
        assert_eq!(HalfOpenMode::limited(4).max_trial_calls(), Some(4));
        assert_eq!(HalfOpenMode::limited(0).max_trial_calls(), Some(0));
    }

    #[test]
    fn unlimited_has_no_limit() {
        assert_eq!(HalfOpenMode::unlimited().max_trial_calls(), None);
    }

    #[test]
    fn from_max_trial_calls_ok() {
        assert_eq!(HalfOpenMode::from_max_trial_calls(None), HalfOpenMode::unlimited());
        assert_eq!(HalfOpenMode::from_max_trial_calls(Some(1)), HalfOpenMode::single());
        assert_eq!(HalfOpenMode::from_max_trial_calls(Some(3)), HalfOpenMode::limited(3));
    }
}
