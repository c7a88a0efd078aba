//! Single-multiply-pair allpass diffuser.
//!
//! Allpass filters pass all frequencies at equal amplitude but smear phase,
//! turning an impulse into a dense burst. The reverb uses them twice: as a
//! short stereo input diffuser ahead of the network, and as one late diffuser
//! per delay line after readout. Both placements sit outside the feedback
//! loop, so the allpass recursion can never change the loop gain.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::flush_denormal;

/// Symmetric stability bound for the diffuser coefficient.
pub const MAX_DIFFUSER_COEFFICIENT: f32 = 0.74;

/// Allpass diffuser over a small ring buffer.
///
/// The recursion is
///
/// ```text
/// output = delayed - c * input
/// write  = input + c * output
/// ```
///
/// which is unity-gain for any `|c| < 1`. The coefficient is clamped to
/// ±[`MAX_DIFFUSER_COEFFICIENT`], so any finite input yields bounded output.
///
/// # Lifecycle
///
/// Configure with [`set_delay_samples`](Self::set_delay_samples), then call
/// [`prepare`](Self::prepare) once off the audio thread to allocate. Until
/// prepared, [`process`](Self::process) passes input through unchanged.
///
/// # Example
///
/// ```rust
/// use chambers_core::AllpassDiffuser;
///
/// let mut diffuser = AllpassDiffuser::new();
/// diffuser.set_delay_samples(149);
/// diffuser.set_coefficient(0.5);
/// diffuser.prepare();
///
/// let first = diffuser.process(1.0);
/// assert!((first + 0.5).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct AllpassDiffuser {
    buffer: Vec<f32>,
    delay_samples: usize,
    write_pos: usize,
    coefficient: f32,
}

impl AllpassDiffuser {
    /// Create an unprepared diffuser (1-sample delay, coefficient 0.5).
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            delay_samples: 1,
            write_pos: 0,
            coefficient: 0.5,
        }
    }

    /// Set the delay length in samples, floored at 1.
    ///
    /// Takes effect on the next [`prepare`](Self::prepare).
    pub fn set_delay_samples(&mut self, samples: usize) {
        self.delay_samples = samples.max(1);
    }

    /// Set the allpass coefficient, clamped to ±[`MAX_DIFFUSER_COEFFICIENT`].
    ///
    /// Non-finite values are ignored.
    #[inline]
    pub fn set_coefficient(&mut self, coefficient: f32) {
        if coefficient.is_finite() {
            self.coefficient =
                coefficient.clamp(-MAX_DIFFUSER_COEFFICIENT, MAX_DIFFUSER_COEFFICIENT);
        }
    }

    /// Current coefficient.
    #[inline]
    pub fn coefficient(&self) -> f32 {
        self.coefficient
    }

    /// Configured delay in samples.
    pub fn delay_samples(&self) -> usize {
        self.delay_samples
    }

    /// Allocate the ring buffer (`delay + 1` samples) and clear it.
    ///
    /// Allocates; never call from the audio thread.
    pub fn prepare(&mut self) {
        self.buffer = vec![0.0; self.delay_samples + 1];
        self.write_pos = 0;

        #[cfg(feature = "tracing")]
        tracing::trace!(delay = self.delay_samples, "allpass diffuser prepared");
    }

    /// Zero the ring buffer without reallocating.
    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    /// True once [`prepare`](Self::prepare) has allocated storage.
    pub fn is_prepared(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Process one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let len = self.buffer.len();
        if len == 0 {
            return input;
        }

        let read_pos = (self.write_pos + len - self.delay_samples) % len;
        let delayed = self.buffer[read_pos];
        let output = delayed - self.coefficient * input;

        self.buffer[self.write_pos] = flush_denormal(input + self.coefficient * output);
        self.write_pos += 1;
        if self.write_pos >= len {
            self.write_pos = 0;
        }

        output
    }
}

impl Default for AllpassDiffuser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepared(delay: usize, coefficient: f32) -> AllpassDiffuser {
        let mut ap = AllpassDiffuser::new();
        ap.set_delay_samples(delay);
        ap.set_coefficient(coefficient);
        ap.prepare();
        ap
    }

    #[test]
    fn passes_through_before_prepare() {
        let mut ap = AllpassDiffuser::new();
        assert_eq!(ap.process(0.3), 0.3);
    }

    #[test]
    fn impulse_response_matches_recursion() {
        let mut ap = prepared(10, 0.5);

        let first = ap.process(1.0);
        assert!((first + 0.5).abs() < 1e-6, "first output is -c·x, got {first}");

        for _ in 0..9 {
            assert_eq!(ap.process(0.0), 0.0);
        }

        // write[0] = 1 + 0.5·(-0.5) = 0.75 emerges after exactly 10 samples
        let delayed = ap.process(0.0);
        assert!((delayed - 0.75).abs() < 1e-6, "got {delayed}");
    }

    #[test]
    fn coefficient_is_clamped() {
        let mut ap = AllpassDiffuser::new();
        ap.set_coefficient(5.0);
        assert_eq!(ap.coefficient(), MAX_DIFFUSER_COEFFICIENT);
        ap.set_coefficient(-5.0);
        assert_eq!(ap.coefficient(), -MAX_DIFFUSER_COEFFICIENT);
        ap.set_coefficient(f32::NAN);
        assert_eq!(ap.coefficient(), -MAX_DIFFUSER_COEFFICIENT);
    }

    #[test]
    fn delay_is_floored_at_one() {
        let mut ap = AllpassDiffuser::new();
        ap.set_delay_samples(0);
        assert_eq!(ap.delay_samples(), 1);
    }

    #[test]
    fn preserves_energy() {
        let mut ap = prepared(37, 0.7);
        let mut energy = 0.0f64;
        energy += f64::from(ap.process(1.0)).powi(2);
        for _ in 0..20_000 {
            energy += f64::from(ap.process(0.0)).powi(2);
        }
        assert!((energy - 1.0).abs() < 1e-3, "allpass energy {energy}");
    }

    #[test]
    fn reset_clears_state() {
        let mut ap = prepared(10, 0.6);
        for _ in 0..50 {
            ap.process(1.0);
        }
        ap.reset();
        for _ in 0..20 {
            assert_eq!(ap.process(0.0), 0.0);
        }
    }
}
