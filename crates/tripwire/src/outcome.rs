// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// The outcome of a protected call, as reported to the breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The call succeeded.
    Success,

    /// The call failed and counts towards tripping the circuit.
    Failure,
}

impl Outcome {
    /// Classifies a result: `Ok` is a success and `Err` is a failure.
    #[must_use]
    pub fn from_result<T, E>(result: &Result<T, E>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(_) => Self::Failure,
        }
    }

    /// Returns the `snake_case` name of the outcome, as used in log events.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

impl From<bool> for Outcome {
    fn from(success: bool) -> Self {
        if success { Self::Success } else { Self::Failure }
    }
}
