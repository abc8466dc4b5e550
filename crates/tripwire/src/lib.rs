// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(
    test,
    allow(
        clippy::arithmetic_side_effects,
        clippy::unchecked_time_subtraction,
        reason = "allow these lints in tests to improve the readability of the tests"
    )
)]

//! A consecutive-failure circuit breaker with deterministic, injectable time.
//!
//! A circuit breaker guards calls to an unreliable downstream operation. It counts
//! consecutive failures, blocks calls once a threshold is reached, and after a cooldown
//! lets trial calls through to find out whether the downstream has recovered.
//!
//! # Core Types
//!
//! - [`Breaker`]: The circuit breaker. Cheap to clone, every clone shares the same state.
//! - [`BreakerBuilder`]: Configures a breaker, created by [`Breaker::builder`].
//! - [`BreakerConfig`]: Plain configuration data, deserializable with the `serde` feature.
//! - [`Permit`]: An admitted call, returned by [`Breaker::try_acquire`], that reports its
//!   outcome back to the breaker.
//! - [`CircuitState`]: The state of the circuit, one of closed, open or half-open.
//!
//! # Quick Start
//!
//! ```rust
//! use std::time::Duration;
//!
//! use tick::Clock;
//! use tripwire::{Breaker, CallError};
//!
//! # fn fetch() -> Result<String, std::io::Error> { Ok("data".to_string()) }
//! # fn example(clock: &Clock) -> Result<(), tripwire::ConfigError> {
//! let breaker = Breaker::new(3, 2, Duration::from_secs(5), clock)?;
//!
//! match breaker.call(fetch) {
//!     Ok(data) => println!("received: {data}"),
//!     Err(CallError::Rejected(open)) => println!("fast fail: {open}"),
//!     Err(CallError::Inner(error)) => println!("downstream failed: {error}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Callers that prefer to drive the protocol themselves ask for admission first and
//! report the outcome afterwards:
//!
//! ```rust
//! # use tripwire::Breaker;
//! # fn example(breaker: &Breaker, send: impl Fn() -> bool) {
//! if breaker.allow_request() {
//!     if send() {
//!         breaker.record_success();
//!     } else {
//!         breaker.record_failure();
//!     }
//! }
//! # }
//! ```
//!
//! > **Note**: The breaker reads time from a [`Clock`][tick::Clock] of the [`tick`] crate.
//! > In tests, `tick::ClockControl` (behind the `test-util` feature of `tick`) moves time
//! > forward manually, so cooldowns elapse instantly and deterministically.
//!
//! # Circuit States and Transitions
//!
//! ```text
//!            failure_threshold failures in a row
//!   Closed ──────────────────────────────────────▶ Open ◀──┐
//!     ▲                                             │      │
//!     │ success_threshold          open_duration    │      │ trial
//!     │ trial successes            elapsed          ▼      │ failure
//!     └──────────────────────────────────────── Half-Open ─┘
//! ```
//!
//! - **Closed**: calls flow through. A success clears the failure streak; the
//!   breaker trips once `failure_threshold` failures happen in a row.
//! - **Open**: calls are rejected. The first admission check at or after
//!   `open_duration` since the trip moves the breaker to half-open and admits that call.
//!   Outcomes reported while open are ignored; they can only belong to calls that were
//!   admitted before a concurrent trip.
//! - **Half-Open**: trial calls are admitted according to the [`HalfOpenMode`].
//!   `success_threshold` trial successes close the circuit, a single trial failure
//!   opens it again. When every trial slot stays taken for the trial timeout, the trials
//!   in flight are presumed lost and a new trial is admitted.
//!
//! # Thread Safety
//!
//! [`Breaker`] is `Send + Sync`. Every operation takes one internal lock for the duration
//! of a few field updates. Admission and outcome reporting are separate operations, so the
//! state may change between them when many threads share one breaker.
//!
//! # Features
//!
//! - `logs`: Emits structured `tracing` events for state transitions and rejected calls.
//! - `serde`: Implements `Serialize` and `Deserialize` for [`BreakerConfig`].

mod args;
mod breaker;
mod builder;
mod callbacks;
mod config;
mod constants;
mod engine;
mod error;
mod half_open_mode;
mod outcome;
mod snapshot;
mod state;

#[cfg(any(feature = "logs", test))]
pub mod telemetry;

#[doc(inline)]
pub use args::StateChangeArgs;
#[doc(inline)]
pub use breaker::{Breaker, Permit};
#[doc(inline)]
pub use builder::BreakerBuilder;
#[doc(inline)]
pub use config::BreakerConfig;
#[doc(inline)]
pub use error::{BreakerOpen, CallError, ConfigError};
#[doc(inline)]
pub use half_open_mode::HalfOpenMode;
#[doc(inline)]
pub use outcome::Outcome;
#[doc(inline)]
pub use snapshot::{BreakerSnapshot, OpenStats};
#[doc(inline)]
pub use state::CircuitState;

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
pub(crate) mod testing;
