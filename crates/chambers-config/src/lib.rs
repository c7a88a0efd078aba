//! Configuration for the Chambers reverb engine.
//!
//! Loads, saves and validates [`ChambersTuning`](chambers::ChambersTuning)
//! overrides as TOML. The user-facing controls (time, mass, density and so
//! on) are not stored here; this crate only covers the tuned constants the
//! engine applies at `prepare` time.
//!
//! # Example
//!
//! ```rust,no_run
//! use chambers::Chambers;
//! use chambers_config::EngineConfig;
//! use chambers_core::DspModule;
//!
//! let config = EngineConfig::load("chambers.toml").unwrap();
//! let mut reverb = Chambers::with_tuning(config.into_tuning().unwrap());
//! reverb.prepare(48000.0, 512, 2);
//!
//! // Write the active tuning back out
//! EngineConfig::from(*reverb.tuning()).save("chambers.toml").unwrap();
//! ```

mod config;
mod error;

/// Field-level validation.
pub mod validation;

pub use config::{
    BloomConfig, DriftConfig, EngineConfig, EnvelopeConfig, FreezeConfig, InjectionConfig,
    MatrixConfig, SmoothingConfig,
};
pub use error::ConfigError;
pub use validation::{FieldIssue, ValidationError, ValidationResult};
