//! Per-line sinusoidal delay modulation.
//!
//! Each line drifts at its own slow rate with its own starting phase. Rates
//! are spread deterministically across the configured range with a
//! golden-ratio sequence, so no two lines share a rate and the pattern never
//! lines up into an audible beat.

use crate::NUM_LINES;
use core::f32::consts::TAU;
use libm::{floorf, sinf};

/// Golden-ratio conjugate used to scatter rates across the range.
const GOLDEN: f32 = 0.618_034;

/// Bank of per-line drift oscillators.
#[derive(Debug, Clone)]
pub struct DriftBank {
    phases: [f32; NUM_LINES],
    increments: [f32; NUM_LINES],
    rates_hz: [f32; NUM_LINES],
}

impl DriftBank {
    /// Oscillators at rest; call [`prepare`](Self::prepare) before use.
    pub fn new() -> Self {
        Self {
            phases: initial_phases(),
            increments: [0.0; NUM_LINES],
            rates_hz: [0.0; NUM_LINES],
        }
    }

    /// Seed rates within `[min_hz, max_hz]` and reset phases.
    pub fn prepare(&mut self, sample_rate: f32, min_hz: f32, max_hz: f32) {
        let sample_rate = sample_rate.max(1.0);
        for i in 0..NUM_LINES {
            let x = (i + 1) as f32 * GOLDEN;
            let spread = x - floorf(x);
            let rate = min_hz + (max_hz - min_hz) * spread;
            self.rates_hz[i] = rate;
            self.increments[i] = TAU * rate / sample_rate;
        }
        self.reset();
    }

    /// Restore the seeded starting phases.
    pub fn reset(&mut self) {
        self.phases = initial_phases();
    }

    /// Advance every phase by one sample, wrapping at 2π.
    #[inline]
    pub fn advance(&mut self) {
        for (phase, inc) in self.phases.iter_mut().zip(self.increments.iter()) {
            *phase += inc;
            if *phase >= TAU {
                *phase -= TAU;
            }
        }
    }

    /// Offset in samples for `line` at the given depth.
    #[inline]
    pub fn offset(&self, line: usize, depth_samples: f32) -> f32 {
        depth_samples * sinf(self.phases[line])
    }

    /// Seeded rate of each line in Hz.
    pub fn rates_hz(&self) -> &[f32; NUM_LINES] {
        &self.rates_hz
    }

    /// Current phase of each line in radians.
    pub fn phases(&self) -> &[f32; NUM_LINES] {
        &self.phases
    }
}

impl Default for DriftBank {
    fn default() -> Self {
        Self::new()
    }
}

fn initial_phases() -> [f32; NUM_LINES] {
    core::array::from_fn(|i| TAU * i as f32 / NUM_LINES as f32)
}
