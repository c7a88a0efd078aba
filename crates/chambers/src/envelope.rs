//! Late-field loudness envelope ("bloom").
//!
//! After each onset the wet signal is shaped by a curve that blends a plain
//! exponential decay with a plateau-then-decay:
//!
//! ```text
//! decay   = lerp(min_decay, max_decay, time)
//! exp     = e^(-t / decay)
//! plateau = 1                              for t <  decay · (0.25 + 0.35 · bloom)
//!         = e^(-(t - hold) / decay)        otherwise
//! gain    = 1 + peak_gain · bloom²
//! env     = exp + bloom · (plateau · gain - exp),   clamped to [0, 1.5]
//! ```
//!
//! At bloom = 0 the tail fades exponentially from the onset; at bloom = 1 it
//! swells, holds, then falls away.
//!
//! Retriggering is edge-triggered: a new onset is only recognised once the
//! magnitude has dropped back under the threshold since the previous one.

use chambers_core::map_range;
use libm::expf;

/// Upper bound on the envelope value.
pub const MAX_ENVELOPE: f32 = 1.5;

/// Evaluate the bloom curve `elapsed_s` seconds after an onset.
pub fn bloom_curve(elapsed_s: f32, decay_s: f32, bloom: f32, peak_gain: f32) -> f32 {
    let decay = decay_s.max(1.0e-3);
    let bloom = bloom.clamp(0.0, 1.0);
    let exp_env = expf(-elapsed_s / decay);
    let hold = decay * (0.25 + 0.35 * bloom);
    let plateau_env = if elapsed_s < hold {
        1.0
    } else {
        expf(-(elapsed_s - hold) / decay)
    };
    let bloom_gain = 1.0 + peak_gain * bloom * bloom;
    let target = exp_env + bloom * (plateau_env * bloom_gain - exp_env);
    target.clamp(0.0, MAX_ENVELOPE)
}

/// Onset-retriggered envelope state.
#[derive(Debug, Clone)]
pub struct BloomEnvelope {
    elapsed_s: f32,
    value: f32,
    armed: bool,
    sample_period: f32,
    threshold: f32,
    min_decay_s: f32,
    max_decay_s: f32,
    peak_gain: f32,
}

impl BloomEnvelope {
    /// Envelope at 44.1 kHz with default shaping.
    pub fn new() -> Self {
        Self {
            elapsed_s: 0.0,
            value: 1.0,
            armed: true,
            sample_period: 1.0 / 44100.0,
            threshold: 1.0e-3,
            min_decay_s: 1.0,
            max_decay_s: 12.0,
            peak_gain: 0.5,
        }
    }

    /// Configure timing and shape.
    pub fn configure(
        &mut self,
        sample_rate: f32,
        threshold: f32,
        min_decay_s: f32,
        max_decay_s: f32,
        peak_gain: f32,
    ) {
        self.sample_period = 1.0 / sample_rate.max(1.0);
        self.threshold = threshold;
        self.min_decay_s = min_decay_s;
        self.max_decay_s = max_decay_s;
        self.peak_gain = peak_gain;
    }

    /// Restart at t = 0 with value 1 and the trigger armed.
    pub fn reset(&mut self) {
        self.elapsed_s = 0.0;
        self.value = 1.0;
        self.armed = true;
    }

    /// Advance one sample.
    ///
    /// `magnitude` is the larger of the live input and memory injection
    /// peaks for this sample; `time` and `bloom` are the smoothed controls.
    #[inline]
    pub fn tick(&mut self, magnitude: f32, time: f32, bloom: f32) -> f32 {
        if magnitude > self.threshold {
            if self.armed {
                self.elapsed_s = 0.0;
                self.armed = false;
            }
        } else {
            self.armed = true;
        }

        self.elapsed_s += self.sample_period;

        let decay = map_range(time, self.min_decay_s, self.max_decay_s);
        self.value = bloom_curve(self.elapsed_s, decay, bloom, self.peak_gain);
        self.value
    }

    /// Most recent envelope value.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Seconds since the last onset.
    pub fn elapsed_s(&self) -> f32 {
        self.elapsed_s
    }

    /// True if the next above-threshold sample will retrigger.
    pub fn is_armed(&self) -> bool {
        self.armed
    }
}

impl Default for BloomEnvelope {
    fn default() -> Self {
        Self::new()
    }
}
