//! Field-level validation of engine configurations.
//!
//! Validation never stops at the first problem: every offending field is
//! collected into one [`ValidationError`] so a hand-edited file can be fixed
//! in a single pass.
//!
//! # Example
//!
//! ```rust
//! use chambers_config::EngineConfig;
//!
//! let mut config = EngineConfig::default();
//! config.freeze.ceiling = 1.5;
//! config.drift.rate_min_hz = 2.0;
//!
//! let err = config.validate().unwrap_err();
//! assert_eq!(err.issues().len(), 2);
//! ```

use thiserror::Error;

/// One rejected field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldIssue {
    /// Dotted path of the field, e.g. `freeze.ramp_ms`.
    pub field: String,
    /// The rejected value.
    pub value: f32,
    /// Why it was rejected.
    pub reason: String,
}

impl FieldIssue {
    /// Create an issue for `field`.
    pub fn new(field: impl Into<String>, value: f32, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value,
            reason: reason.into(),
        }
    }
}

impl core::fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} = {}: {}", self.field, self.value, self.reason)
    }
}

/// Every field a configuration got wrong.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{}", .issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
pub struct ValidationError {
    issues: Vec<FieldIssue>,
}

impl ValidationError {
    /// Wrap a list of issues.
    pub fn new(issues: Vec<FieldIssue>) -> Self {
        Self { issues }
    }

    /// The rejected fields, in check order.
    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    /// True if `field` is among the rejected fields.
    pub fn has_field(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| issue.field == field)
    }
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Accumulates issues while a configuration is checked.
#[derive(Debug, Default)]
pub(crate) struct Checker {
    issues: Vec<FieldIssue>,
}

impl Checker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn reject(&mut self, field: &str, value: f32, reason: &str) {
        self.issues.push(FieldIssue::new(field, value, reason));
    }

    /// Finite and >= 0.
    pub(crate) fn non_negative(&mut self, field: &str, value: f32) {
        if !value.is_finite() {
            self.reject(field, value, "must be finite");
        } else if value < 0.0 {
            self.reject(field, value, "must not be negative");
        }
    }

    /// Finite and > 0.
    pub(crate) fn positive(&mut self, field: &str, value: f32) {
        if !value.is_finite() {
            self.reject(field, value, "must be finite");
        } else if value <= 0.0 {
            self.reject(field, value, "must be positive");
        }
    }

    /// Finite and in (0, 1].
    pub(crate) fn ceiling(&mut self, field: &str, value: f32) {
        if !value.is_finite() {
            self.reject(field, value, "must be finite");
        } else if value <= 0.0 || value > 1.0 {
            self.reject(field, value, "must be in (0, 1]");
        }
    }

    /// Finite and in [0, max].
    pub(crate) fn at_most(&mut self, field: &str, value: f32, max: f32) {
        if !value.is_finite() {
            self.reject(field, value, "must be finite");
        } else if !(0.0..=max).contains(&value) {
            self.reject(field, value, &format!("must be in [0, {max}]"));
        }
    }

    /// `low` must not exceed `high`. Reported against `low_field`.
    pub(crate) fn ordered(&mut self, low_field: &str, low: f32, high_field: &str, high: f32) {
        if low.is_finite() && high.is_finite() && low > high {
            self.reject(low_field, low, &format!("must not exceed {high_field} ({high})"));
        }
    }

    pub(crate) fn finish(self) -> ValidationResult<()> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(self.issues))
        }
    }
}
