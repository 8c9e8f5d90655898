//! Configuration validation

use crate::schema::{RawConfig, RawNotificationConfig, RawOutputConfig, RawSchedulingConfig};
use thiserror::Error;

/// Upper bound for a single vibration segment
pub const MAX_VIBRATION_SEGMENT_MS: u64 = 10_000;

/// Accepted range for `inexact_window_seconds`
pub const INEXACT_WINDOW_RANGE: std::ops::RangeInclusive<u64> = 1..=3600;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("[scheduling] inexact_window_seconds = {0} is outside 1..=3600")]
    InexactWindowOutOfRange(u64),

    #[error("[output] vibration_pattern_ms: {0}")]
    InvalidVibrationPattern(String),

    #[error("[notifications] {field} cannot be empty")]
    EmptyField { field: &'static str },

    #[error("[output] player cannot be empty")]
    EmptyPlayer,
}

/// Validate a raw configuration, collecting every error
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    errors.extend(validate_scheduling(&config.scheduling));
    errors.extend(validate_notifications(&config.notifications));
    errors.extend(validate_output(&config.output));

    errors
}

fn validate_scheduling(scheduling: &RawSchedulingConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(window) = scheduling.inexact_window_seconds
        && !INEXACT_WINDOW_RANGE.contains(&window)
    {
        errors.push(ValidationError::InexactWindowOutOfRange(window));
    }

    errors
}

fn validate_notifications(notifications: &RawNotificationConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if notifications
        .app_name
        .as_ref()
        .is_some_and(|name| name.trim().is_empty())
    {
        errors.push(ValidationError::EmptyField { field: "app_name" });
    }

    if notifications
        .default_title
        .as_ref()
        .is_some_and(|title| title.trim().is_empty())
    {
        errors.push(ValidationError::EmptyField {
            field: "default_title",
        });
    }

    errors
}

fn validate_output(output: &RawOutputConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if output.player.as_ref().is_some_and(|p| p.trim().is_empty()) {
        errors.push(ValidationError::EmptyPlayer);
    }

    if let Some(pattern) = &output.vibration_pattern_ms {
        errors.extend(validate_vibration_pattern(pattern));
    }

    errors
}

/// Check a vibration waveform: non-empty, bounded segments, not all zero
pub fn validate_vibration_pattern(pattern: &[u64]) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if pattern.is_empty() {
        errors.push(ValidationError::InvalidVibrationPattern(
            "pattern cannot be empty".into(),
        ));
        return errors;
    }

    for (index, segment) in pattern.iter().enumerate() {
        if *segment > MAX_VIBRATION_SEGMENT_MS {
            errors.push(ValidationError::InvalidVibrationPattern(format!(
                "segment {} is {}ms, limit is {}ms",
                index, segment, MAX_VIBRATION_SEGMENT_MS
            )));
        }
    }

    if pattern.iter().all(|segment| *segment == 0) {
        errors.push(ValidationError::InvalidVibrationPattern(
            "pattern must contain a non-zero segment".into(),
        ));
    }

    errors
}
