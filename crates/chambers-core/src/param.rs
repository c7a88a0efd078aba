//! Parameter smoothing for zipper-free control changes.
//!
//! Every control input of the reverb (decay time, damping, density, ...) runs
//! through a [`ParameterSmoother`]: the control thread only sets a target, and
//! the audio thread pulls one converged value per sample.
//!
//! ## Usage
//!
//! ```rust
//! use chambers_core::ParameterSmoother;
//!
//! let mut time = ParameterSmoother::new(0.0);
//! time.prepare(48000.0);
//! time.set_smoothing_time_ms(40.0);
//!
//! time.set_target(1.0);
//! for _ in 0..480 {
//!     let _smoothed = time.next_value();
//! }
//! assert!(time.current() > 0.0 && time.current() < 1.0);
//! ```

use libm::exp;

/// Magnitude below which the smoothed value snaps to exactly zero.
const SNAP_EPSILON: f32 = 1.0e-12;

/// Fallback sample rate when `prepare` receives a degenerate value.
const FALLBACK_SAMPLE_RATE: f64 = 44100.0;

/// One-pole exponential parameter smoother.
///
/// Holds `{target, current, coefficient, time constant}`. Each call to
/// [`next_value`](Self::next_value) applies
///
/// ```text
/// current = target + (current - target) * α,   α = exp(-1 / (t_seconds * sample_rate))
/// ```
///
/// so `current` converges toward `target` at a rate fixed by the time constant
/// and the sample rate.
///
/// # Invariants
///
/// - `coefficient` is always in \[0, 1); zero means "no smoothing".
/// - The coefficient is recomputed whenever the sample rate or time constant
///   changes.
#[derive(Debug, Clone)]
pub struct ParameterSmoother {
    /// Current smoothed value
    current: f32,
    /// Target value we're converging toward
    target: f32,
    /// Exponential coefficient α (0 = instant)
    coefficient: f32,
    /// Sample rate in Hz
    sample_rate: f64,
    /// Time constant in milliseconds
    smoothing_time_ms: f32,
}

impl ParameterSmoother {
    /// Create a smoother resting at `initial` with smoothing disabled.
    ///
    /// Call [`prepare`](Self::prepare) and
    /// [`set_smoothing_time_ms`](Self::set_smoothing_time_ms) to enable.
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            coefficient: 0.0,
            sample_rate: FALLBACK_SAMPLE_RATE,
            smoothing_time_ms: 0.0,
        }
    }

    /// Create a fully configured smoother.
    pub fn with_config(initial: f32, sample_rate: f64, smoothing_time_ms: f32) -> Self {
        let mut smoother = Self::new(initial);
        smoother.sample_rate = sanitize_rate(sample_rate);
        smoother.smoothing_time_ms = smoothing_time_ms.max(0.0);
        smoother.update_coefficient();
        smoother
    }

    /// Set the sample rate and recompute the coefficient.
    ///
    /// Non-positive or non-finite rates fall back to 44.1 kHz.
    pub fn prepare(&mut self, sample_rate: f64) {
        self.sample_rate = sanitize_rate(sample_rate);
        self.update_coefficient();
    }

    /// Set the time constant in milliseconds and recompute the coefficient.
    ///
    /// Negative and non-finite times disable smoothing.
    pub fn set_smoothing_time_ms(&mut self, time_ms: f32) {
        self.smoothing_time_ms = if time_ms.is_finite() { time_ms.max(0.0) } else { 0.0 };
        self.update_coefficient();
    }

    /// Store a new target. Has no effect on output until the next
    /// [`next_value`](Self::next_value).
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Advance one sample and return the smoothed value.
    #[inline]
    pub fn next_value(&mut self) -> f32 {
        if self.coefficient <= 0.0 {
            self.current = self.target;
            return self.current;
        }

        self.current = self.target + (self.current - self.target) * self.coefficient;
        if self.current.abs() < SNAP_EPSILON {
            self.current = 0.0;
        }
        self.current
    }

    /// Set both target and current immediately, bypassing the ramp.
    #[inline]
    pub fn reset(&mut self, value: f32) {
        self.target = value;
        self.current = value;
    }

    /// Current smoothed value without advancing.
    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Exponential coefficient α.
    #[inline]
    pub fn coefficient(&self) -> f32 {
        self.coefficient
    }

    /// Recalculate α from sample rate and time constant.
    ///
    /// α is the per-sample retention factor of the one-pole: after one time
    /// constant the remaining distance to the target is `α^(t·fs) = e^-1`,
    /// i.e. 63.2% of the way there. Evaluated in `f64` so long time constants
    /// at high rates don't round to exactly 1.0, then clamped below 1.
    fn update_coefficient(&mut self) {
        if self.smoothing_time_ms <= 0.0 {
            self.coefficient = 0.0;
            return;
        }

        let time_seconds = f64::from(self.smoothing_time_ms) * 0.001;
        let alpha = exp(-1.0 / (time_seconds * self.sample_rate));
        self.coefficient = (alpha as f32).clamp(0.0, 1.0 - f32::EPSILON);
    }
}

impl Default for ParameterSmoother {
    fn default() -> Self {
        Self::new(0.0)
    }
}

fn sanitize_rate(sample_rate: f64) -> f64 {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        sample_rate
    } else {
        FALLBACK_SAMPLE_RATE
    }
}
