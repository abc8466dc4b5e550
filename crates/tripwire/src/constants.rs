// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

/// Default number of consecutive failures in the closed state that trip the circuit.
pub(crate) const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

/// Default number of successful trial calls in the half-open state that close the circuit.
pub(crate) const DEFAULT_SUCCESS_THRESHOLD: u32 = 2;

/// Default duration the circuit stays open before a trial call is admitted.
pub(crate) const DEFAULT_OPEN_DURATION: Duration = Duration::from_secs(5);

/// Name used for breakers created without an explicit name.
pub(crate) const DEFAULT_BREAKER_NAME: &str = "default";

pub(crate) const ERR_POISONED_LOCK: &str = "poisoned lock - cannot continue execution because security and privacy guarantees can no longer be upheld";
