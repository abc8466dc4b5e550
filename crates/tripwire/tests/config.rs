// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(feature = "serde")]

//! Tests for deserializing breaker configuration.

use jiff::SignedDuration;
use tick::ClockControl;
use tripwire::{Breaker, BreakerConfig, CircuitState, ConfigError};

#[test]
fn deserialize_full_config() {
    let config: BreakerConfig = serde_json::from_str(
        r#"{
            "failure_threshold": 5,
            "success_threshold": 1,
            "open_duration": "PT30S",
            "max_trial_calls": 4
        }"#,
    )
    .unwrap();

    assert_eq!(config.failure_threshold, 5);
    assert_eq!(config.success_threshold, 1);
    assert_eq!(config.open_duration, SignedDuration::from_secs(30));
    assert_eq!(config.max_trial_calls, Some(4));
}

#[test]
fn deserialize_missing_fields_uses_defaults() {
    let config: BreakerConfig = serde_json::from_str(r#"{ "failure_threshold": 10 }"#).unwrap();

    assert_eq!(config.failure_threshold, 10);
    assert_eq!(config.success_threshold, 2);
    assert_eq!(config.open_duration, SignedDuration::from_secs(5));
    assert_eq!(config.max_trial_calls, Some(1));
}

#[test]
fn deserialize_null_trial_limit_is_unlimited() {
    let config: BreakerConfig = serde_json::from_str(r#"{ "max_trial_calls": null }"#).unwrap();

    assert_eq!(config.max_trial_calls, None);
}

#[test]
fn deserialize_unknown_field_fails() {
    let result = serde_json::from_str::<BreakerConfig>(r#"{ "failure_rate": 0.5 }"#);

    assert!(result.unwrap_err().to_string().contains("unknown field"));
}

#[test]
fn serialize_round_trip() {
    let config = BreakerConfig::default();

    let json = serde_json::to_string(&config).unwrap();
    let deserialized: BreakerConfig = serde_json::from_str(&json).unwrap();

    assert_eq!(deserialized, config);
}

#[test]
fn negative_duration_is_rejected_at_build() {
    let config: BreakerConfig = serde_json::from_str(r#"{ "open_duration": "-PT1S" }"#).unwrap();
    let control = ClockControl::new();

    let error = Breaker::from_config("negative", &config, &control.to_clock()).unwrap_err();

    assert_eq!(error, ConfigError::NegativeOpenDuration(SignedDuration::from_secs(-1)));
}

#[test]
fn deserialized_config_drives_breaker() {
    let config: BreakerConfig = serde_json::from_str(r#"{ "failure_threshold": 1, "open_duration": "PT2S" }"#).unwrap();
    let control = ClockControl::new();
    let breaker = Breaker::from_config("orders", &config, &control.to_clock()).unwrap();

    breaker.record_failure();
    assert_eq!(breaker.state(), CircuitState::Open);

    control.advance_millis(1999);
    assert!(!breaker.allow_request());
    control.advance_millis(1);
    assert!(breaker.allow_request());
}
