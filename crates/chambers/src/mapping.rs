//! Control-to-coefficient mappings.
//!
//! Every function takes a normalized control (clamped to \[0, 1\] on entry,
//! NaN treated as 0) and returns a coefficient that is itself clamped at both
//! ends, so no upstream value can push the network outside its stable range.

use crate::NUM_LINES;
use chambers_core::{map_range, one_pole_coeff_from_hz};
use libm::exp10f;

/// Feedback at time = 0.
pub const MIN_FEEDBACK: f32 = 0.35;
/// Feedback at time = 1. Only a full freeze goes higher (exactly 1.0).
pub const MAX_FEEDBACK: f32 = 0.995;

/// Ceiling on per-line damping.
pub const MAX_DAMPING: f32 = 0.98;

/// Per-line damping spread, darkest to brightest.
pub const DAMPING_OFFSETS: [f32; NUM_LINES] =
    [-0.035, -0.025, -0.015, -0.005, 0.005, 0.015, 0.025, 0.035];

/// Per-line relative spread of the late diffuser coefficient.
pub const LATE_DIFFUSION_OFFSETS: [f32; NUM_LINES] =
    [-0.06, -0.045, -0.03, -0.015, 0.015, 0.03, 0.045, 0.06];

/// Gravity cutoff at gravity = 0.
pub const GRAVITY_MIN_HZ: f32 = 20.0;
/// Gravity cutoff at gravity = 1.
pub const GRAVITY_MAX_HZ: f32 = 200.0;

/// Early (dry) mix is never allowed above this fraction.
pub const MAX_EARLY_MIX: f32 = 0.7;

const LATE_DIFFUSION_MIN: f32 = 0.05;
const LATE_DIFFUSION_MAX: f32 = 0.74;

fn unit(norm: f32) -> f32 {
    if norm.is_nan() { 0.0 } else { norm.clamp(0.0, 1.0) }
}

/// Loop feedback gain for a decay-time control.
///
/// ```rust
/// use chambers::mapping::{feedback_from_time, MAX_FEEDBACK, MIN_FEEDBACK};
///
/// assert_eq!(feedback_from_time(0.0), MIN_FEEDBACK);
/// assert_eq!(feedback_from_time(1.0), MAX_FEEDBACK);
/// assert_eq!(feedback_from_time(f32::INFINITY), MAX_FEEDBACK);
/// ```
#[inline]
pub fn feedback_from_time(time: f32) -> f32 {
    map_range(time, MIN_FEEDBACK, MAX_FEEDBACK).clamp(MIN_FEEDBACK, MAX_FEEDBACK)
}

/// One-pole damping pole for `line` from the mass control.
#[inline]
pub fn damping_from_mass(mass: f32, line: usize) -> f32 {
    let offset = DAMPING_OFFSETS.get(line).copied().unwrap_or(0.0);
    (map_range(mass, 0.1, 0.95) + offset).clamp(0.0, MAX_DAMPING)
}

/// Gravity containment cutoff: logarithmic from 20 Hz to 200 Hz.
#[inline]
pub fn gravity_cutoff_hz(gravity: f32) -> f32 {
    GRAVITY_MIN_HZ * exp10f(unit(gravity))
}

/// Pole of the gravity lowpass whose complement is the in-loop high-pass.
#[inline]
pub fn gravity_coefficient(gravity: f32, sample_rate: f32) -> f32 {
    one_pole_coeff_from_hz(gravity_cutoff_hz(gravity), sample_rate).clamp(0.0, 1.0)
}

/// Gain applied to the mid/side input before injection.
#[inline]
pub fn input_gain_from_density(density: f32) -> f32 {
    map_range(density, 0.18, 0.32)
}

/// Fraction of dry input mixed into the output while live.
#[inline]
pub fn early_mix_from_density(density: f32) -> f32 {
    map_range(density, 0.45, 0.25).clamp(0.0, MAX_EARLY_MIX)
}

/// Coefficient of the two input diffusers.
#[inline]
pub fn input_diffusion_from_density(density: f32) -> f32 {
    map_range(density, 0.12, 0.6)
}

/// Coefficient of the late diffuser on `line`.
#[inline]
pub fn late_diffusion_from_density(density: f32, line: usize) -> f32 {
    let offset = LATE_DIFFUSION_OFFSETS.get(line).copied().unwrap_or(0.0);
    (map_range(density, 0.18, 0.7) * (1.0 + offset)).clamp(LATE_DIFFUSION_MIN, LATE_DIFFUSION_MAX)
}
