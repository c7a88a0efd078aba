//! One-pole lowpass for in-loop damping and low-end containment.
//!
//! A single-pole IIR with the difference equation:
//!
//! ```text
//! y[n] = x[n] + pole * (y[n-1] - x[n])
//! ```
//!
//! `pole = 0` passes the input untouched; `pole → 1` filters ever harder.
//! The reverb runs one per delay line for high-frequency damping, and a
//! second one per line whose output is subtracted from its input to form a
//! complementary high-pass ("gravity").
//!
//! # Reference
//!
//! Julius O. Smith III, "Introduction to Digital Filters with Audio Applications",
//! Section: One-Pole Filter.

use crate::{flush_denormal, one_pole_coeff_from_hz};

/// Largest pole accepted; keeps the filter strictly stable.
const MAX_POLE: f32 = 0.9999;

/// One-pole (6 dB/oct) lowpass with a directly settable pole.
///
/// # Invariants
///
/// - `pole` is always in \[0, 0.9999\]
/// - `state` is flushed to zero when below 1e-20 (denormal protection)
///
/// # Example
///
/// ```rust
/// use chambers_core::OnePole;
///
/// let mut lp = OnePole::new();
/// lp.set_cutoff(4000.0, 48000.0);
/// let filtered = lp.process(1.0);
/// assert!(filtered < 1.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct OnePole {
    state: f32,
    pole: f32,
}

impl OnePole {
    /// Create a transparent filter (pole 0, state 0).
    pub fn new() -> Self {
        Self {
            state: 0.0,
            pole: 0.0,
        }
    }

    /// Set the pole radius directly, clamped to \[0, 0.9999\].
    ///
    /// Non-finite values are ignored.
    #[inline]
    pub fn set_pole(&mut self, pole: f32) {
        if pole.is_finite() {
            self.pole = pole.clamp(0.0, MAX_POLE);
        }
    }

    /// Set the pole from a -3 dB cutoff: `pole = exp(-2π · cutoff / fs)`.
    pub fn set_cutoff(&mut self, cutoff_hz: f32, sample_rate: f32) {
        self.set_pole(one_pole_coeff_from_hz(cutoff_hz, sample_rate));
    }

    /// Current pole radius.
    #[inline]
    pub fn pole(&self) -> f32 {
        self.pole
    }

    /// Current filter state (last lowpass output).
    #[inline]
    pub fn state(&self) -> f32 {
        self.state
    }

    /// Process one sample and return the lowpass output.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.state = flush_denormal(input + self.pole * (self.state - input));
        self.state
    }

    /// Process one sample and return the complementary high-pass
    /// (`input - lowpass(input)`).
    #[inline]
    pub fn process_highpass(&mut self, input: f32) -> f32 {
        input - self.process(input)
    }

    /// Reset filter state to zero.
    pub fn reset(&mut self) {
        self.state = 0.0;
    }
}
