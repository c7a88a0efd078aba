//! TOML mirror of [`ChambersTuning`].

use chambers::{ChambersTuning, SmoothingTimes};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::validation::{Checker, ValidationResult};

/// Engine tuning as stored on disk.
///
/// Every table and every field is optional; anything left out takes the
/// engine default. Unknown keys are rejected so a misspelled field does not
/// silently fall back.
///
/// # TOML Format
///
/// ```toml
/// [smoothing]
/// time_ms = 40.0
/// gravity_ms = 120.0
///
/// [freeze]
/// ramp_ms = 150.0
/// ceiling = 0.9
///
/// [envelope]
/// threshold = 0.001
/// wet_ceiling = 0.95
///
/// [matrix]
/// epsilon = 0.0001
///
/// [injection]
/// memory_gain = 0.25
///
/// [drift]
/// max_samples = 1.0
/// rate_min_hz = 0.05
/// rate_max_hz = 0.35
///
/// [bloom]
/// min_decay_s = 1.0
/// max_decay_s = 12.0
/// peak_gain = 0.5
/// ```
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Per-control smoothing times.
    pub smoothing: SmoothingConfig,
    /// Freeze ramp and frozen write ceiling.
    pub freeze: FreezeConfig,
    /// Bloom retrigger threshold and wet output ceiling.
    pub envelope: EnvelopeConfig,
    /// Matrix recompute threshold.
    pub matrix: MatrixConfig,
    /// External memory injection.
    pub injection: InjectionConfig,
    /// Delay-line modulation.
    pub drift: DriftConfig,
    /// Bloom envelope shape.
    pub bloom: BloomConfig,
}

/// `[smoothing]` table, milliseconds per control.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
#[allow(missing_docs)]
pub struct SmoothingConfig {
    pub time_ms: f32,
    pub mass_ms: f32,
    pub density_ms: f32,
    pub bloom_ms: f32,
    pub gravity_ms: f32,
    pub warp_ms: f32,
    pub drift_ms: f32,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        SmoothingTimes::default().into()
    }
}

impl From<SmoothingTimes> for SmoothingConfig {
    fn from(s: SmoothingTimes) -> Self {
        Self {
            time_ms: s.time_ms,
            mass_ms: s.mass_ms,
            density_ms: s.density_ms,
            bloom_ms: s.bloom_ms,
            gravity_ms: s.gravity_ms,
            warp_ms: s.warp_ms,
            drift_ms: s.drift_ms,
        }
    }
}

impl From<SmoothingConfig> for SmoothingTimes {
    fn from(s: SmoothingConfig) -> Self {
        Self {
            time_ms: s.time_ms,
            mass_ms: s.mass_ms,
            density_ms: s.density_ms,
            bloom_ms: s.bloom_ms,
            gravity_ms: s.gravity_ms,
            warp_ms: s.warp_ms,
            drift_ms: s.drift_ms,
        }
    }
}

/// `[freeze]` table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FreezeConfig {
    /// Engage and release ramp length in milliseconds.
    pub ramp_ms: f32,
    /// Hard-limit ceiling on line writes while fully frozen.
    pub ceiling: f32,
}

impl Default for FreezeConfig {
    fn default() -> Self {
        let t = ChambersTuning::default();
        Self {
            ramp_ms: t.freeze_ramp_ms,
            ceiling: t.freeze_ceiling,
        }
    }
}

/// `[envelope]` table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EnvelopeConfig {
    /// Input magnitude that retriggers the bloom envelope.
    pub threshold: f32,
    /// Hard-limit ceiling on the wet output.
    pub wet_ceiling: f32,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        let t = ChambersTuning::default();
        Self {
            threshold: t.envelope_threshold,
            wet_ceiling: t.wet_ceiling,
        }
    }
}

/// `[matrix]` table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MatrixConfig {
    /// Smallest warp change that rebuilds the matrix.
    pub epsilon: f32,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            epsilon: ChambersTuning::default().matrix_epsilon,
        }
    }
}

/// `[injection]` table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct InjectionConfig {
    /// Gain applied to the external memory signal.
    pub memory_gain: f32,
}

impl Default for InjectionConfig {
    fn default() -> Self {
        Self {
            memory_gain: ChambersTuning::default().memory_gain,
        }
    }
}

/// `[drift]` table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DriftConfig {
    /// Peak excursion in samples at drift = 1. At most 1.
    pub max_samples: f32,
    /// Slowest line rate.
    pub rate_min_hz: f32,
    /// Fastest line rate.
    pub rate_max_hz: f32,
}

impl Default for DriftConfig {
    fn default() -> Self {
        let t = ChambersTuning::default();
        Self {
            max_samples: t.max_drift_samples,
            rate_min_hz: t.drift_rate_min_hz,
            rate_max_hz: t.drift_rate_max_hz,
        }
    }
}

/// `[bloom]` table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BloomConfig {
    /// Envelope decay at time = 0.
    pub min_decay_s: f32,
    /// Envelope decay at time = 1.
    pub max_decay_s: f32,
    /// Extra plateau gain at bloom = 1.
    pub peak_gain: f32,
}

impl Default for BloomConfig {
    fn default() -> Self {
        let t = ChambersTuning::default();
        Self {
            min_decay_s: t.bloom_min_decay_s,
            max_decay_s: t.bloom_max_decay_s,
            peak_gain: t.bloom_peak_gain,
        }
    }
}

impl EngineConfig {
    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every field and report all that are unusable.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut check = Checker::new();

        let s = &self.smoothing;
        for (field, value) in [
            ("smoothing.time_ms", s.time_ms),
            ("smoothing.mass_ms", s.mass_ms),
            ("smoothing.density_ms", s.density_ms),
            ("smoothing.bloom_ms", s.bloom_ms),
            ("smoothing.gravity_ms", s.gravity_ms),
            ("smoothing.warp_ms", s.warp_ms),
            ("smoothing.drift_ms", s.drift_ms),
        ] {
            check.non_negative(field, value);
        }

        check.positive("freeze.ramp_ms", self.freeze.ramp_ms);
        check.ceiling("freeze.ceiling", self.freeze.ceiling);
        check.non_negative("envelope.threshold", self.envelope.threshold);
        check.ceiling("envelope.wet_ceiling", self.envelope.wet_ceiling);
        check.non_negative("matrix.epsilon", self.matrix.epsilon);
        check.non_negative("injection.memory_gain", self.injection.memory_gain);

        let d = &self.drift;
        check.at_most("drift.max_samples", d.max_samples, 1.0);
        check.non_negative("drift.rate_min_hz", d.rate_min_hz);
        check.non_negative("drift.rate_max_hz", d.rate_max_hz);
        check.ordered("drift.rate_min_hz", d.rate_min_hz, "drift.rate_max_hz", d.rate_max_hz);

        let b = &self.bloom;
        check.positive("bloom.min_decay_s", b.min_decay_s);
        check.positive("bloom.max_decay_s", b.max_decay_s);
        check.ordered("bloom.min_decay_s", b.min_decay_s, "bloom.max_decay_s", b.max_decay_s);
        check.non_negative("bloom.peak_gain", b.peak_gain);

        check.finish()
    }

    /// Validate and convert into engine tuning.
    ///
    /// # Example
    ///
    /// ```rust
    /// use chambers::Chambers;
    /// use chambers_config::EngineConfig;
    ///
    /// let config = EngineConfig::from_toml("[freeze]\nramp_ms = 250.0\n").unwrap();
    /// let reverb = Chambers::with_tuning(config.into_tuning().unwrap());
    /// assert_eq!(reverb.tuning().freeze_ramp_ms, 250.0);
    /// ```
    pub fn into_tuning(self) -> Result<ChambersTuning, ConfigError> {
        self.validate()?;
        Ok(ChambersTuning {
            smoothing: self.smoothing.into(),
            freeze_ramp_ms: self.freeze.ramp_ms,
            freeze_ceiling: self.freeze.ceiling,
            wet_ceiling: self.envelope.wet_ceiling,
            envelope_threshold: self.envelope.threshold,
            matrix_epsilon: self.matrix.epsilon,
            memory_gain: self.injection.memory_gain,
            max_drift_samples: self.drift.max_samples,
            drift_rate_min_hz: self.drift.rate_min_hz,
            drift_rate_max_hz: self.drift.rate_max_hz,
            bloom_min_decay_s: self.bloom.min_decay_s,
            bloom_max_decay_s: self.bloom.max_decay_s,
            bloom_peak_gain: self.bloom.peak_gain,
        })
    }
}

impl From<ChambersTuning> for EngineConfig {
    fn from(t: ChambersTuning) -> Self {
        Self {
            smoothing: t.smoothing.into(),
            freeze: FreezeConfig {
                ramp_ms: t.freeze_ramp_ms,
                ceiling: t.freeze_ceiling,
            },
            envelope: EnvelopeConfig {
                threshold: t.envelope_threshold,
                wet_ceiling: t.wet_ceiling,
            },
            matrix: MatrixConfig {
                epsilon: t.matrix_epsilon,
            },
            injection: InjectionConfig {
                memory_gain: t.memory_gain,
            },
            drift: DriftConfig {
                max_samples: t.max_drift_samples,
                rate_min_hz: t.drift_rate_min_hz,
                rate_max_hz: t.drift_rate_max_hz,
            },
            bloom: BloomConfig {
                min_decay_s: t.bloom_min_decay_s,
                max_decay_s: t.bloom_max_decay_s,
                peak_gain: t.bloom_peak_gain,
            },
        }
    }
}
