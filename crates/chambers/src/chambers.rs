//! The Chambers feedback delay network.
//!
//! Eight prime-length delay lines, spread from ~50 ms to ~1.23 s, recirculate
//! through a warpable 8×8 mixing matrix. Each line's write path runs a
//! one-pole damping lowpass and a "gravity" high-pass that keeps low end from
//! piling up. Reads are modulated by slow per-line drift, pass through a late
//! allpass diffuser outside the loop, and are panned to stereo with fixed
//! constant-power weights. A bloom envelope shapes the late field after each
//! onset.
//!
//! ```text
//!  in L/R ─▶ input diffusers ─▶ mid/side ─▶ ±injection ─┐
//!  memory ─────────────────────▶ mid/side ─▶ ±injection ─┤
//!                                                        ▼
//!        ┌──────────── matrix · taps · feedback ───────▶ (+) ─▶ damping ─▶ gravity ─▶ line[i]
//!        │                                                                               │
//!        └──────────────────────────── live tap (drifted) ◀─────────────────────────────┘
//!                                          │
//!                                late diffuser ─▶ pan L/R ─▶ × envelope ─▶ limiter ─▶ wet
//! ```
//!
//! # Freeze
//!
//! While the freeze blend ramps from 1 to 0, feedback rises to exactly 1.0,
//! damping, gravity, diffusion and drift fade out, input injection fades out,
//! and the matrix cross-fades onto the snapshot taken at engage. Fully
//! frozen, line writes are hard-limited so nothing can creep upward during
//! indefinite sustain. Release runs the same ramp in reverse and restarts the
//! bloom envelope.

#[cfg(not(feature = "std"))]
use alloc::sync::Arc;
#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::sync::Arc;

use chambers_core::{
    AllpassDiffuser, AudioBlock, DspModule, FractionalDelayLine, OnePole, ParamDescriptor,
    ParameterInfo, ParameterSmoother, flush_denormal, hard_limit, sanitize,
};
use libm::{ceilf, round};

use crate::NUM_LINES;
use crate::envelope::BloomEnvelope;
use crate::drift::DriftBank;
use crate::freeze::{FreezeRamp, FreezeState, FreezeTransition};
use crate::mapping::{
    damping_from_mass, early_mix_from_density, feedback_from_time, gravity_coefficient,
    input_diffusion_from_density, input_gain_from_density, late_diffusion_from_density,
};
use crate::matrix::FeedbackMatrix;
use crate::params::{CONTROL_COUNT, ChambersParams, Control};
use crate::tuning::ChambersTuning;

/// Sample rate the reference lengths are tuned for.
const REFERENCE_RATE: f64 = 48000.0;

/// Used when `prepare` receives a non-positive or non-finite rate.
const FALLBACK_SAMPLE_RATE: f64 = 44100.0;

/// Delay line lengths at 48 kHz. All prime, so none share a factor with
/// 48000 = 2^7 · 3 · 5^3 or with each other.
pub const DELAY_SAMPLES_48K: [usize; NUM_LINES] =
    [2411, 4201, 7001, 11003, 17011, 26003, 39019, 59009];

/// Input diffuser lengths at 48 kHz (3.1 ms and 4.6 ms).
pub const INPUT_DIFFUSER_SAMPLES_48K: [usize; 2] = [149, 223];

/// Late diffuser lengths at 48 kHz, all under 10 ms.
pub const LATE_DIFFUSER_SAMPLES_48K: [usize; NUM_LINES] = [157, 173, 197, 223, 251, 281, 313, 347];

/// Mid injection sign per line.
const INPUT_MID: [f32; NUM_LINES] = [1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0];

/// Side injection sign per line.
const INPUT_SIDE: [f32; NUM_LINES] = [1.0, -1.0, -1.0, 1.0, 1.0, -1.0, -1.0, 1.0];

/// Constant-power left weights for pan positions ∓0.9, ∓0.7, ∓0.5, ∓0.3.
const OUTPUT_LEFT: [f32; NUM_LINES] = [
    0.9969173, 0.0784591, 0.9723699, 0.2334454, 0.9238795, 0.3826834, 0.8526402, 0.5224986,
];

/// Mirror of [`OUTPUT_LEFT`]; both have a sum of squares of 4.
const OUTPUT_RIGHT: [f32; NUM_LINES] = [
    0.0784591, 0.9969173, 0.2334454, 0.9723699, 0.3826834, 0.9238795, 0.5224986, 0.8526402,
];

/// Brings the constant-power sum back to unity.
const OUTPUT_GAIN: f32 = 0.5;

const INV_SQRT_8: f32 = 0.353_553_4;

/// Smallest control movement that triggers a coefficient recompute.
const COEFF_EPSILON: f32 = 1.0e-6;

fn scale_to_rate(samples: usize, sample_rate: f64) -> usize {
    (round(samples as f64 * sample_rate / REFERENCE_RATE) as usize).max(1)
}

/// One rendered sample before the dry/wet mix.
#[derive(Debug, Clone, Copy)]
struct WetFrame {
    left: f32,
    right: f32,
    mid: f32,
    early: f32,
}

/// Control values a coefficient set was last derived from.
#[derive(Debug, Clone, Copy)]
struct CoefficientKey {
    mass: f32,
    density: f32,
    gravity: f32,
    blend: f32,
}

impl CoefficientKey {
    const STALE: Self = Self {
        mass: f32::NAN,
        density: f32::NAN,
        gravity: f32::NAN,
        blend: f32::NAN,
    };
}

fn moved(last: f32, now: f32) -> bool {
    !((now - last).abs() <= COEFF_EPSILON)
}

/// Eight-line feedback delay network reverb.
///
/// # Parameters
///
/// All controls are normalized to \[0, 1\]:
///
/// - `time`: loop feedback 0.35–0.995 and bloom envelope length 1–12 s
/// - `mass`: damping 0.1–0.95 (dark at 1)
/// - `density`: diffusion, input gain and dry early mix
/// - `bloom`: late-field swell and hold before decay
/// - `gravity`: in-loop high-pass from 20 Hz to 200 Hz
/// - `warp`: Hadamard (diffuse) to Householder (localized) mixing
/// - `drift`: ±1 sample per-line delay modulation
///
/// plus `freeze`, which ramps the network into infinite sustain.
///
/// Setters take `&self` and may be called from any thread via
/// [`params`](Self::params); the audio thread picks the values up at the next
/// block boundary and smooths toward them per sample.
///
/// # Example
///
/// ```rust
/// use chambers::Chambers;
/// use chambers_core::{DspModule, StereoBuffer};
///
/// let mut reverb = Chambers::new();
/// reverb.prepare(48000.0, 256, 2);
/// reverb.set_time(0.7);
/// reverb.set_bloom(0.4);
///
/// let mut buffer = StereoBuffer::new(256);
/// buffer.left[0] = 1.0;
/// buffer.right[0] = 1.0;
/// reverb.process(buffer.as_block());
/// assert!(buffer.left.iter().all(|s| s.is_finite()));
/// ```
pub struct Chambers {
    params: Arc<ChambersParams>,
    tuning: ChambersTuning,

    lines: [FractionalDelayLine; NUM_LINES],
    nominal_delays: [f32; NUM_LINES],
    damping: [OnePole; NUM_LINES],
    gravity: [OnePole; NUM_LINES],
    input_diffusers: [AllpassDiffuser; 2],
    late_diffusers: [AllpassDiffuser; NUM_LINES],
    matrix: FeedbackMatrix,
    freeze: FreezeRamp,
    envelope: BloomEnvelope,
    drift: DriftBank,
    smoothers: [ParameterSmoother; CONTROL_COUNT],
    coefficient_key: CoefficientKey,

    injection_left: Vec<f32>,
    injection_right: Vec<f32>,
    injection_active: bool,
    injection_mismatch_logged: bool,

    sample_rate: f64,
    max_block_size: usize,
    num_channels: usize,
    buffer_length: usize,
    prepared: bool,
}

impl Chambers {
    /// Create an unprepared engine with default tuning.
    ///
    /// Call [`prepare`](DspModule::prepare) before processing; until then
    /// [`process`](DspModule::process) leaves audio untouched.
    pub fn new() -> Self {
        Self::with_tuning(ChambersTuning::default())
    }

    /// Create an unprepared engine with custom tuning.
    pub fn with_tuning(tuning: ChambersTuning) -> Self {
        let params = Arc::new(ChambersParams::new());
        let smoothers = core::array::from_fn(|i| ParameterSmoother::new(params.get(Control::ALL[i])));
        Self {
            params,
            tuning: tuning.sanitized(),
            lines: core::array::from_fn(|_| FractionalDelayLine::new()),
            nominal_delays: [1.0; NUM_LINES],
            damping: core::array::from_fn(|_| OnePole::new()),
            gravity: core::array::from_fn(|_| OnePole::new()),
            input_diffusers: core::array::from_fn(|_| AllpassDiffuser::new()),
            late_diffusers: core::array::from_fn(|_| AllpassDiffuser::new()),
            matrix: FeedbackMatrix::new(),
            freeze: FreezeRamp::new(),
            envelope: BloomEnvelope::new(),
            drift: DriftBank::new(),
            smoothers,
            coefficient_key: CoefficientKey::STALE,
            injection_left: Vec::new(),
            injection_right: Vec::new(),
            injection_active: false,
            injection_mismatch_logged: false,
            sample_rate: FALLBACK_SAMPLE_RATE,
            max_block_size: 1,
            num_channels: 2,
            buffer_length: 0,
            prepared: false,
        }
    }

    /// Shared control handle for another thread.
    pub fn params(&self) -> Arc<ChambersParams> {
        Arc::clone(&self.params)
    }

    /// Active tuning.
    pub fn tuning(&self) -> &ChambersTuning {
        &self.tuning
    }

    /// Replace the tuning. Takes effect at the next `prepare`.
    pub fn set_tuning(&mut self, tuning: ChambersTuning) {
        self.tuning = tuning.sanitized();
    }

    /// Set a control by kind. Returns the value actually stored.
    pub fn set_control(&self, control: Control, value: f32) -> f32 {
        self.params.set(control, value)
    }

    /// Set decay time.
    pub fn set_time(&self, time: f32) {
        self.params.set(Control::Time, time);
    }

    /// Set damping mass.
    pub fn set_mass(&self, mass: f32) {
        self.params.set(Control::Mass, mass);
    }

    /// Set diffusion density.
    pub fn set_density(&self, density: f32) {
        self.params.set(Control::Density, density);
    }

    /// Set late-field bloom.
    pub fn set_bloom(&self, bloom: f32) {
        self.params.set(Control::Bloom, bloom);
    }

    /// Set low-end containment.
    pub fn set_gravity(&self, gravity: f32) {
        self.params.set(Control::Gravity, gravity);
    }

    /// Set matrix warp.
    pub fn set_warp(&self, warp: f32) {
        self.params.set(Control::Warp, warp);
    }

    /// Set drift depth.
    pub fn set_drift(&self, drift: f32) {
        self.params.set(Control::Drift, drift);
    }

    /// Request freeze on or off. Edge-triggered at the next block boundary.
    pub fn set_freeze(&self, frozen: bool) {
        self.params.set_freeze(frozen);
    }

    /// Supply one block of memory injection for the next `process` call.
    ///
    /// The samples are copied into storage sized at `prepare`. Non-finite
    /// samples become 0. A mono source (`right = None`) feeds both channels.
    /// Samples beyond the prepared block size are dropped and missing ones
    /// read as silence. The injection is consumed by exactly one `process`
    /// call.
    pub fn set_external_injection(&mut self, left: &[f32], right: Option<&[f32]>) {
        let right = right.unwrap_or(left);
        let capacity = self.injection_left.len();

        for (i, slot) in self.injection_left.iter_mut().enumerate() {
            *slot = left.get(i).map_or(0.0, |&s| sanitize(s, 0.0));
        }
        for (i, slot) in self.injection_right.iter_mut().enumerate() {
            *slot = right.get(i).map_or(0.0, |&s| sanitize(s, 0.0));
        }

        let mismatched = left.len() > capacity || right.len() != left.len();
        if mismatched {
            if !self.injection_mismatch_logged {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    left = left.len(),
                    right = right.len(),
                    capacity,
                    "memory injection shape mismatch, truncating"
                );
                self.injection_mismatch_logged = true;
            }
        } else {
            self.injection_mismatch_logged = false;
        }

        self.injection_active = capacity > 0;
    }

    /// Drop any pending memory injection.
    pub fn clear_external_injection(&mut self) {
        self.injection_active = false;
    }

    /// True if an injection is waiting for the next `process` call.
    pub fn has_pending_injection(&self) -> bool {
        self.injection_active
    }

    /// Current freeze phase.
    pub fn freeze_state(&self) -> FreezeState {
        self.freeze.state()
    }

    /// Current freeze blend: 1 = live, 0 = frozen.
    pub fn freeze_blend(&self) -> f32 {
        self.freeze.blend()
    }

    /// True only when fully frozen.
    pub fn is_frozen(&self) -> bool {
        self.freeze.is_frozen()
    }

    /// Current smoothed value of `control`.
    pub fn smoothed(&self, control: Control) -> f32 {
        self.smoothers[control.index()].current()
    }

    /// Feedback matrix with its frozen snapshot.
    pub fn matrix(&self) -> &FeedbackMatrix {
        &self.matrix
    }

    /// Current bloom envelope value.
    pub fn envelope_value(&self) -> f32 {
        self.envelope.value()
    }

    /// Sample rate the engine was prepared at.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Block size the injection storage is sized for.
    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    /// Channel count passed to `prepare`.
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Nominal (undrifted) delay of each line in samples.
    pub fn nominal_delays(&self) -> &[f32; NUM_LINES] {
        &self.nominal_delays
    }

    /// Allocated ring buffer length per line.
    pub fn buffer_length(&self) -> usize {
        self.buffer_length
    }

    /// True once `prepare` has run.
    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    fn prime_smoothers(&mut self) {
        for (smoother, control) in self.smoothers.iter_mut().zip(Control::ALL) {
            smoother.reset(self.params.get(control));
        }
    }

    fn pull_targets(&mut self) {
        let targets = self.params.snapshot();
        for (smoother, target) in self.smoothers.iter_mut().zip(targets) {
            smoother.set_target(target);
        }
    }

    fn sync_freeze(&mut self) {
        match self.freeze.request(self.params.freeze()) {
            FreezeTransition::Engage => {
                // A re-engage mid-release keeps the old snapshot so the
                // effective matrix stays continuous.
                if self.freeze.blend() >= 1.0 {
                    self.matrix.capture();
                }
                #[cfg(feature = "tracing")]
                tracing::debug!(blend = self.freeze.blend(), "freeze engaged");
            }
            FreezeTransition::Release => {
                self.envelope.reset();
                #[cfg(feature = "tracing")]
                tracing::debug!(blend = self.freeze.blend(), "freeze released");
            }
            FreezeTransition::None => {}
        }
    }

    /// Re-derive damping, diffusion and gravity coefficients if their
    /// controls (or the freeze blend) have moved.
    fn update_coefficients(&mut self, mass: f32, density: f32, gravity: f32, blend: f32) {
        let key = self.coefficient_key;
        let blend_moved = moved(key.blend, blend);

        if moved(key.mass, mass) || blend_moved {
            for (i, filter) in self.damping.iter_mut().enumerate() {
                filter.set_pole(damping_from_mass(mass, i) * blend);
            }
        }

        if moved(key.density, density) {
            let input_coeff = input_diffusion_from_density(density);
            for diffuser in &mut self.input_diffusers {
                diffuser.set_coefficient(input_coeff);
            }
            for (i, diffuser) in self.late_diffusers.iter_mut().enumerate() {
                diffuser.set_coefficient(late_diffusion_from_density(density, i));
            }
        }

        if moved(key.gravity, gravity) {
            let pole = gravity_coefficient(gravity, self.sample_rate as f32);
            for filter in &mut self.gravity {
                filter.set_pole(pole);
            }
        }

        self.coefficient_key = CoefficientKey {
            mass,
            density,
            gravity,
            blend,
        };
    }

    /// Advance the network by one sample.
    #[inline]
    fn render(&mut self, in_l: f32, in_r: f32, mem_l: f32, mem_r: f32) -> WetFrame {
        let blend = self.freeze.advance();
        let frozen = self.freeze.is_frozen();

        let time = self.smoothers[Control::Time.index()].next_value();
        let mass = self.smoothers[Control::Mass.index()].next_value();
        let density = self.smoothers[Control::Density.index()].next_value();
        let bloom = self.smoothers[Control::Bloom.index()].next_value();
        let gravity = self.smoothers[Control::Gravity.index()].next_value();
        self.smoothers[Control::Warp.index()].next_value();
        let drift = self.smoothers[Control::Drift.index()].next_value();

        self.update_coefficients(mass, density, gravity, blend);

        let feedback = if frozen {
            1.0
        } else {
            1.0 + blend * (feedback_from_time(time) - 1.0)
        };

        // Drift
        if !frozen {
            self.drift.advance();
        }
        let depth = drift.clamp(0.0, 1.0) * self.tuning.max_drift_samples * blend;

        // Read live (drifted) and held (nominal) taps
        let mut live = [0.0_f32; NUM_LINES];
        let mut held = [0.0_f32; NUM_LINES];
        for i in 0..NUM_LINES {
            let nominal = self.nominal_delays[i];
            if depth > 0.0 {
                let drifted = nominal + self.drift.offset(i, depth);
                live[i] = sanitize(self.lines[i].read(drifted), 0.0);
                held[i] = sanitize(self.lines[i].read(nominal), 0.0);
            } else {
                let tap = sanitize(self.lines[i].read(nominal), 0.0);
                live[i] = tap;
                held[i] = tap;
            }
        }

        // Gain-compensated: never longer than `live`, so `feedback` bounds the loop
        let recirculated = self.matrix.apply(&live, blend);

        // Late diffusion, outside the loop
        let mut diffused = [0.0_f32; NUM_LINES];
        for i in 0..NUM_LINES {
            let processed = self.late_diffusers[i].process(live[i]);
            diffused[i] = live[i] + blend * (processed - live[i]);
        }

        // Envelope
        let magnitude = in_l.abs().max(in_r.abs()).max(mem_l.abs()).max(mem_r.abs());
        if !frozen {
            self.envelope.tick(magnitude, time, bloom);
        }
        let envelope = 1.0 + blend * (self.envelope.value() - 1.0);

        // Output mix
        let mut live_l = 0.0;
        let mut live_r = 0.0;
        let mut held_l = 0.0;
        let mut held_r = 0.0;
        for i in 0..NUM_LINES {
            live_l += diffused[i] * OUTPUT_LEFT[i];
            live_r += diffused[i] * OUTPUT_RIGHT[i];
            held_l += held[i] * OUTPUT_LEFT[i];
            held_r += held[i] * OUTPUT_RIGHT[i];
        }
        let scale = OUTPUT_GAIN * envelope;
        let ceiling = self.tuning.wet_ceiling;
        let wet_l = hard_limit((held_l + blend * (live_l - held_l)) * scale, ceiling);
        let wet_r = hard_limit((held_r + blend * (live_r - held_r)) * scale, ceiling);

        // Input path
        let processed_l = self.input_diffusers[0].process(in_l);
        let processed_r = self.input_diffusers[1].process(in_r);
        let diff_l = in_l + blend * (processed_l - in_l);
        let diff_r = in_r + blend * (processed_r - in_r);
        let mid = 0.5 * (diff_l + diff_r);
        let side = 0.5 * (diff_l - diff_r);
        let input_scale = input_gain_from_density(density) * INV_SQRT_8 * blend;

        let mem_mid = 0.5 * (mem_l + mem_r);
        let mem_side = 0.5 * (mem_l - mem_r);
        let mem_scale = self.tuning.memory_gain * blend;

        // Write path
        for i in 0..NUM_LINES {
            let injection = (mid * INPUT_MID[i] + side * INPUT_SIDE[i]) * input_scale
                + (mem_mid * INPUT_MID[i] + mem_side * INPUT_SIDE[i]) * mem_scale;
            let summed = injection + recirculated[i] * feedback;

            let damped = self.damping[i].process(summed);
            let contained = self.gravity[i].process_highpass(damped);
            let mut write = damped + blend * (contained - damped);
            if frozen {
                write = hard_limit(write, self.tuning.freeze_ceiling);
            }

            self.lines[i].write(flush_denormal(sanitize(write, 0.0)));
            self.lines[i].advance();
        }

        WetFrame {
            left: wet_l,
            right: wet_r,
            mid,
            early: early_mix_from_density(density) * blend,
        }
    }

    #[inline]
    fn injection_at(&self, n: usize) -> (f32, f32) {
        if !self.injection_active {
            return (0.0, 0.0);
        }
        (
            self.injection_left.get(n).copied().unwrap_or(0.0),
            self.injection_right.get(n).copied().unwrap_or(0.0),
        )
    }
}

impl Default for Chambers {
    fn default() -> Self {
        Self::new()
    }
}

impl DspModule for Chambers {
    fn prepare(&mut self, sample_rate: f64, max_block_size: usize, num_channels: usize) {
        let sample_rate = if sample_rate.is_finite() && sample_rate > 0.0 {
            sample_rate
        } else {
            FALLBACK_SAMPLE_RATE
        };
        self.sample_rate = sample_rate;
        self.max_block_size = max_block_size.max(1);
        self.num_channels = num_channels.max(1);
        let tuning = self.tuning;
        let rate = sample_rate as f32;

        // Delay lines
        let mut longest = 0.0_f32;
        for (nominal, &reference) in self.nominal_delays.iter_mut().zip(DELAY_SAMPLES_48K.iter()) {
            *nominal = scale_to_rate(reference, sample_rate).max(2) as f32;
            longest = longest.max(*nominal);
        }
        self.buffer_length = longest as usize + ceilf(tuning.max_drift_samples) as usize + 2;
        for line in &mut self.lines {
            line.allocate(self.buffer_length);
        }

        // Diffusers
        for (diffuser, &reference) in self.input_diffusers.iter_mut().zip(INPUT_DIFFUSER_SAMPLES_48K.iter()) {
            diffuser.set_delay_samples(scale_to_rate(reference, sample_rate));
            diffuser.prepare();
        }
        for (diffuser, &reference) in self.late_diffusers.iter_mut().zip(LATE_DIFFUSER_SAMPLES_48K.iter()) {
            diffuser.set_delay_samples(scale_to_rate(reference, sample_rate));
            diffuser.prepare();
        }

        for filter in self.damping.iter_mut().chain(self.gravity.iter_mut()) {
            filter.reset();
        }

        // Freeze ramp
        let ramp_samples =
            (round(sample_rate * f64::from(tuning.freeze_ramp_ms) * 0.001) as usize).max(1);
        self.freeze.set_ramp_samples(ramp_samples);

        self.envelope.configure(
            rate,
            tuning.envelope_threshold,
            tuning.bloom_min_decay_s,
            tuning.bloom_max_decay_s,
            tuning.bloom_peak_gain,
        );
        self.drift
            .prepare(rate, tuning.drift_rate_min_hz, tuning.drift_rate_max_hz);
        self.matrix.set_epsilon(tuning.matrix_epsilon);

        for (smoother, time_ms) in self.smoothers.iter_mut().zip(tuning.smoothing.as_array()) {
            smoother.prepare(sample_rate);
            smoother.set_smoothing_time_ms(time_ms);
        }

        self.injection_left = vec![0.0; self.max_block_size];
        self.injection_right = vec![0.0; self.max_block_size];

        self.prepared = true;
        self.reset();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            sample_rate,
            max_block_size = self.max_block_size,
            num_channels = self.num_channels,
            buffer_length = self.buffer_length,
            ramp_samples,
            delays = ?self.nominal_delays,
            "chambers prepared"
        );
    }

    fn reset(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
        for filter in self.damping.iter_mut().chain(self.gravity.iter_mut()) {
            filter.reset();
        }
        for diffuser in self.input_diffusers.iter_mut().chain(self.late_diffusers.iter_mut()) {
            diffuser.reset();
        }
        self.drift.reset();
        self.envelope.reset();

        self.freeze.request(self.params.freeze());
        self.freeze.settle();

        self.prime_smoothers();
        self.matrix.force(self.smoothers[Control::Warp.index()].current());
        self.matrix.capture();
        self.coefficient_key = CoefficientKey::STALE;

        self.injection_active = false;
        self.injection_mismatch_logged = false;
    }

    fn process(&mut self, block: AudioBlock<'_>) {
        if !self.prepared {
            return;
        }

        self.pull_targets();
        self.matrix
            .update(self.smoothers[Control::Warp.index()].current());
        self.sync_freeze();

        match block {
            AudioBlock::Mono(samples) => {
                for (n, sample) in samples.iter_mut().enumerate() {
                    let x = sanitize(*sample, 0.0);
                    let (mem_l, mem_r) = self.injection_at(n);
                    let frame = self.render(x, x, mem_l, mem_r);
                    *sample = frame.mid * frame.early
                        + 0.5 * (frame.left + frame.right) * (1.0 - frame.early);
                }
            }
            AudioBlock::Stereo { left, right } => {
                for (n, (l, r)) in left.iter_mut().zip(right.iter_mut()).enumerate() {
                    let in_l = sanitize(*l, 0.0);
                    let in_r = sanitize(*r, 0.0);
                    let (mem_l, mem_r) = self.injection_at(n);
                    let frame = self.render(in_l, in_r, mem_l, mem_r);
                    *l = in_l * frame.early + frame.left * (1.0 - frame.early);
                    *r = in_r * frame.early + frame.right * (1.0 - frame.early);
                }
            }
        }

        self.injection_active = false;
    }

    fn latency_samples(&self) -> usize {
        0
    }
}

impl ParameterInfo for Chambers {
    fn param_count(&self) -> usize {
        CONTROL_COUNT
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        Control::from_index(index).map(Control::descriptor)
    }

    fn get_param(&self, index: usize) -> f32 {
        Control::from_index(index).map_or(0.0, |c| self.params.get(c))
    }

    fn set_param(&mut self, index: usize, value: f32) {
        if let Some(control) = Control::from_index(index) {
            self.params.set(control, value);
        }
    }
}
