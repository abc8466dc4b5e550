// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;

/// The state of a circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CircuitState {
    /// Normal operation. Calls flow through and consecutive failures are counted.
    Closed,

    /// The circuit is broken. Calls are rejected until the open duration elapses.
    Open,

    /// Trial phase. A limited number of calls test whether the downstream has recovered.
    HalfOpen,
}

impl CircuitState {
    /// Returns the `snake_case` name of the state, as used in log events.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half_open",
        }
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
