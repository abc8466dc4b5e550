// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::time::Duration;

use jiff::SignedDuration;

/// An invalid circuit breaker configuration.
///
/// Configuration is validated once, when the breaker is built. A breaker that was built
/// successfully never fails at call time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The failure threshold was zero.
    #[error("failure threshold must be at least 1")]
    ZeroFailureThreshold,

    /// The success threshold was zero.
    #[error("success threshold must be at least 1")]
    ZeroSuccessThreshold,

    /// The open duration was negative.
    #[error("open duration must not be negative, got {0}")]
    NegativeOpenDuration(SignedDuration),

    /// The half-open trial limit was zero.
    #[error("half-open trial limit must be at least 1")]
    ZeroTrialLimit,
}

/// The circuit breaker did not admit the call.
///
/// This is returned instead of invoking the protected operation, so it never carries a
/// downstream error. Callers typically fail fast or retry once
/// [`retry_after`][Self::retry_after] has passed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("circuit breaker '{name}' is open, retry after {}ms", .retry_after.as_millis())]
pub struct BreakerOpen {
    name: Cow<'static, str>,
    retry_after: Duration,
}

impl BreakerOpen {
    pub(crate) fn new(name: Cow<'static, str>, retry_after: Duration) -> Self {
        Self { name, retry_after }
    }

    /// Returns the name of the breaker that rejected the call.
    #[must_use]
    pub fn breaker_name(&self) -> &str {
        &self.name
    }

    /// Returns how long until the breaker admits a trial call if nothing else changes.
    ///
    /// When the breaker is half-open and all trial slots are taken, this is the time until
    /// the oldest unreported trial is presumed lost and its slot is handed to a new call.
    #[must_use]
    pub fn retry_after(&self) -> Duration {
        self.retry_after
    }
}

/// The error returned by [`Breaker::call`][crate::Breaker::call] and its variants.
///
/// Keeps "the breaker blocked me" apart from "the operation itself failed".
#[derive(Debug, thiserror::Error)]
pub enum CallError<E> {
    /// The breaker rejected the call and the operation was not invoked.
    #[error(transparent)]
    Rejected(#[from] BreakerOpen),

    /// The operation was invoked and returned this error.
    #[error("{0}")]
    Inner(E),
}

impl<E> CallError<E> {
    /// Returns `true` if the breaker rejected the call.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// Returns the error of the operation, if it was invoked.
    #[must_use]
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Rejected(_) => None,
            Self::Inner(error) => Some(error),
        }
    }
}
