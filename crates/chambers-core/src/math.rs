//! Mathematical utility functions for the reverb hot loop.
//!
//! Everything here is allocation-free, branch-light, and `no_std`.
//!
//! # Mapping
//!
//! - [`map_range`] - Linear map of a normalized control onto `[start, end]`
//! - [`lerp`] - Linear interpolation (also used for crossfades)
//!
//! # Safety Nets
//!
//! - [`sanitize`] - Replace NaN/Infinity with a fallback
//! - [`hard_limit`] - Symmetric clamp to a ceiling
//! - [`flush_denormal`] - Zero out values approaching the subnormal range
//!
//! # Filters
//!
//! - [`one_pole_coeff_from_hz`] - Pole radius of a one-pole lowpass at a cutoff
//! - [`db_to_linear`] / [`linear_to_db`] - Level conversions

use libm::{expf, log10f};

/// Convert decibels to linear gain.
///
/// # Example
/// ```rust
/// use chambers_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-60.0) - 0.001).abs() < 1e-6);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels.
///
/// Values at or below `1e-10` are floored to -200 dB instead of -inf.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 1e-10 {
        return -200.0;
    }
    20.0 * log10f(linear)
}

/// Linear interpolation between `a` and `b`.
///
/// `t = 0` yields `a`, `t = 1` yields `b`. `t` is not clamped.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Map a normalized control value onto `[start, end]`.
///
/// The input is clamped to \[0, 1\] first, so the result always lies between
/// `start` and `end` regardless of how far out of range `norm` is. `start`
/// may be greater than `end` for inverted mappings.
///
/// # Example
/// ```rust
/// use chambers_core::map_range;
///
/// assert_eq!(map_range(0.5, 0.0, 10.0), 5.0);
/// assert_eq!(map_range(7.0, 0.35, 0.995), 0.995);
/// assert_eq!(map_range(0.0, 0.45, 0.25), 0.45);
/// ```
#[inline]
pub fn map_range(norm: f32, start: f32, end: f32) -> f32 {
    let t = if norm.is_nan() { 0.0 } else { norm.clamp(0.0, 1.0) };
    lerp(start, end, t)
}

/// Replace a non-finite value with `fallback`.
///
/// Used at every point where externally supplied numbers (audio, injection,
/// control values) enter the engine, so a single NaN or Infinity can never
/// reach recursive state.
#[inline]
pub fn sanitize(x: f32, fallback: f32) -> f32 {
    if x.is_finite() { x } else { fallback }
}

/// Symmetric hard limit to `[-ceiling, ceiling]`.
///
/// NaN maps to 0.0; infinities land on the ceiling.
#[inline]
pub fn hard_limit(x: f32, ceiling: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(-ceiling, ceiling)
    }
}

/// Flush subnormal (denormalized) floats to zero.
///
/// Subnormal floats cause severe CPU slowdowns on most architectures. This
/// replaces values below 1e-20 with zero, well before the IEEE 754 subnormal
/// range begins.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Pole radius of a one-pole lowpass with the given cutoff.
///
/// `coeff = exp(-2π · cutoff / sample_rate)`, in (0, 1) for any positive
/// cutoff below Nyquist. A non-positive sample rate yields 0 (no filtering).
#[inline]
pub fn one_pole_coeff_from_hz(cutoff_hz: f32, sample_rate: f32) -> f32 {
    if sample_rate <= 0.0 {
        return 0.0;
    }
    expf(-core::f32::consts::TAU * cutoff_hz / sample_rate)
}
