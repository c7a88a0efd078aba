//! Empirically tuned engine constants.
//!
//! These are the knobs that shape how the network *behaves* rather than what
//! the user dials in: smoothing times, ramp length, limiter ceilings,
//! thresholds. They default to the values the engine was voiced with.
//! Hosts may override them (see the `chambers-config` crate) before calling
//! `prepare`.

/// Per-control smoothing time constants in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingTimes {
    /// Decay time (feedback). Smooth so the tail never steps.
    pub time_ms: f32,
    /// Mass (damping). Slower to avoid high-frequency flutter.
    pub mass_ms: f32,
    /// Density (diffusion, input gain, early mix).
    pub density_ms: f32,
    /// Bloom envelope shape.
    pub bloom_ms: f32,
    /// Gravity containment cutoff. Slow to avoid low-frequency pumping.
    pub gravity_ms: f32,
    /// Warp matrix blend.
    pub warp_ms: f32,
    /// Drift depth.
    pub drift_ms: f32,
}

impl Default for SmoothingTimes {
    fn default() -> Self {
        Self {
            time_ms: 40.0,
            mass_ms: 60.0,
            density_ms: 30.0,
            bloom_ms: 40.0,
            gravity_ms: 80.0,
            warp_ms: 80.0,
            drift_ms: 60.0,
        }
    }
}

impl SmoothingTimes {
    /// Times in control order: time, mass, density, bloom, gravity, warp, drift.
    pub fn as_array(&self) -> [f32; 7] {
        [
            self.time_ms,
            self.mass_ms,
            self.density_ms,
            self.bloom_ms,
            self.gravity_ms,
            self.warp_ms,
            self.drift_ms,
        ]
    }
}

/// Engine constants applied at `prepare` time.
///
/// # Example
///
/// ```rust
/// use chambers::{Chambers, ChambersTuning};
///
/// let tuning = ChambersTuning {
///     freeze_ramp_ms: 250.0,
///     ..ChambersTuning::default()
/// };
/// let reverb = Chambers::with_tuning(tuning);
/// assert_eq!(reverb.tuning().freeze_ramp_ms, 250.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChambersTuning {
    /// Smoothing time constant per control.
    pub smoothing: SmoothingTimes,
    /// Duration of both freeze ramps (engage and release).
    pub freeze_ramp_ms: f32,
    /// Hard-limit ceiling applied to line writes while fully frozen.
    pub freeze_ceiling: f32,
    /// Hard-limit ceiling on the wet output.
    pub wet_ceiling: f32,
    /// Input magnitude that retriggers the bloom envelope.
    pub envelope_threshold: f32,
    /// Smallest warp movement that triggers a matrix recompute.
    pub matrix_epsilon: f32,
    /// Gain applied to the external memory injection.
    pub memory_gain: f32,
    /// Peak drift excursion in samples at drift = 1.
    pub max_drift_samples: f32,
    /// Slowest per-line drift rate in Hz.
    pub drift_rate_min_hz: f32,
    /// Fastest per-line drift rate in Hz.
    pub drift_rate_max_hz: f32,
    /// Bloom envelope decay time at time = 0, in seconds.
    pub bloom_min_decay_s: f32,
    /// Bloom envelope decay time at time = 1, in seconds.
    pub bloom_max_decay_s: f32,
    /// Extra plateau gain at bloom = 1; the default 0.5 peaks at 1.5x.
    pub bloom_peak_gain: f32,
}

impl Default for ChambersTuning {
    fn default() -> Self {
        Self {
            smoothing: SmoothingTimes::default(),
            freeze_ramp_ms: 100.0,
            freeze_ceiling: 0.9,
            wet_ceiling: 0.95,
            envelope_threshold: 1.0e-3,
            matrix_epsilon: 1.0e-4,
            memory_gain: 0.25,
            max_drift_samples: 1.0,
            drift_rate_min_hz: 0.05,
            drift_rate_max_hz: 0.35,
            bloom_min_decay_s: 1.0,
            bloom_max_decay_s: 12.0,
            bloom_peak_gain: 0.5,
        }
    }
}

impl ChambersTuning {
    /// Replace degenerate values with safe ones.
    ///
    /// Non-finite or negative fields fall back to their defaults; ceilings
    /// are kept in (0, 1]; the drift depth is capped at one sample so the
    /// modulated read never leaves the interpolation guard band; rate and
    /// decay ranges are reordered if inverted.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let positive = |v: f32, d: f32| if v.is_finite() && v > 0.0 { v } else { d };
        let non_negative = |v: f32, d: f32| if v.is_finite() && v >= 0.0 { v } else { d };

        let s = self.smoothing;
        let ds = defaults.smoothing;
        let smoothing = SmoothingTimes {
            time_ms: non_negative(s.time_ms, ds.time_ms),
            mass_ms: non_negative(s.mass_ms, ds.mass_ms),
            density_ms: non_negative(s.density_ms, ds.density_ms),
            bloom_ms: non_negative(s.bloom_ms, ds.bloom_ms),
            gravity_ms: non_negative(s.gravity_ms, ds.gravity_ms),
            warp_ms: non_negative(s.warp_ms, ds.warp_ms),
            drift_ms: non_negative(s.drift_ms, ds.drift_ms),
        };

        let rate_a = non_negative(self.drift_rate_min_hz, defaults.drift_rate_min_hz);
        let rate_b = non_negative(self.drift_rate_max_hz, defaults.drift_rate_max_hz);
        let decay_a = positive(self.bloom_min_decay_s, defaults.bloom_min_decay_s);
        let decay_b = positive(self.bloom_max_decay_s, defaults.bloom_max_decay_s);

        Self {
            smoothing,
            freeze_ramp_ms: positive(self.freeze_ramp_ms, defaults.freeze_ramp_ms),
            freeze_ceiling: positive(self.freeze_ceiling, defaults.freeze_ceiling).min(1.0),
            wet_ceiling: positive(self.wet_ceiling, defaults.wet_ceiling).min(1.0),
            envelope_threshold: non_negative(self.envelope_threshold, defaults.envelope_threshold),
            matrix_epsilon: non_negative(self.matrix_epsilon, defaults.matrix_epsilon),
            memory_gain: non_negative(self.memory_gain, defaults.memory_gain),
            max_drift_samples: non_negative(self.max_drift_samples, defaults.max_drift_samples)
                .min(1.0),
            drift_rate_min_hz: rate_a.min(rate_b),
            drift_rate_max_hz: rate_a.max(rate_b),
            bloom_min_decay_s: decay_a.min(decay_b),
            bloom_max_decay_s: decay_a.max(decay_b),
            bloom_peak_gain: non_negative(self.bloom_peak_gain, defaults.bloom_peak_gain),
        }
    }
}
