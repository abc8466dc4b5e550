// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Instant;

use super::{CircuitEngine, EnterResult, ExecutionMode, ExitResult};
use crate::{BreakerSnapshot, CircuitState, Outcome};

/// Fake engine to be used in tests.
#[derive(Debug)]
pub(crate) struct EngineFake {
    enter_result: EnterResult,
    exit_result: ExitResult,
}

impl EngineFake {
    pub fn new(enter_result: EnterResult, exit_result: ExitResult) -> Self {
        Self { enter_result, exit_result }
    }
}

impl CircuitEngine for EngineFake {
    fn enter(&self) -> EnterResult {
        self.enter_result
    }

    fn exit(&self, _outcome: Outcome, _mode: Option<ExecutionMode>) -> ExitResult {
        self.exit_result
    }

    fn release(&self, _mode: ExecutionMode) {}

    fn snapshot(&self) -> BreakerSnapshot {
        let state = match self.enter_result {
            EnterResult::Rejected { state, .. } => state,
            EnterResult::HalfOpened { .. } => CircuitState::HalfOpen,
            EnterResult::Accepted { .. } => CircuitState::Closed,
        };

        BreakerSnapshot {
            state,
            failure_count: 0,
            success_count: 0,
            opened_at: (state == CircuitState::Open).then(Instant::now),
            trials_in_flight: 0,
            stats: None,
        }
    }
}
