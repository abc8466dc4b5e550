// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Instant;

use crate::CircuitState;

/// Arguments for the [`on_state_change`][crate::BreakerBuilder::on_state_change] callback function.
///
/// Provides context when the circuit moves from one state to another.
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub struct StateChangeArgs<'a> {
    pub(crate) breaker_name: &'a str,
    pub(crate) previous: CircuitState,
    pub(crate) current: CircuitState,
    pub(crate) timestamp: Instant,
}

impl StateChangeArgs<'_> {
    /// Returns the name of the breaker that changed its state.
    #[must_use]
    pub fn breaker_name(&self) -> &str {
        self.breaker_name
    }

    /// Returns the state the circuit left.
    #[must_use]
    pub fn previous(&self) -> CircuitState {
        self.previous
    }

    /// Returns the state the circuit entered.
    #[must_use]
    pub fn current(&self) -> CircuitState {
        self.current
    }

    /// Returns the instant of the transition, as read from the breaker's clock.
    #[must_use]
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }
}
