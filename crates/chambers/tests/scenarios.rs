//! Signal-level scenarios for the Chambers engine.
//!
//! Each test drives the full engine through `DspModule::process` and measures
//! the rendered audio: impulse decay, freeze sustain and transitions, NaN
//! containment, and reset determinism.

use chambers::matrix::{column_norms, warped};
use chambers::{Chambers, MAX_FEEDBACK, MIN_FEEDBACK, feedback_from_time};
use chambers_core::{DspModule, StereoBuffer};

const SAMPLE_RATE: f64 = 48000.0;
const BLOCK: usize = 512;

/// Engine prepared with the reference scene: time 0.55, mass/density/bloom/
/// gravity 0.5, warp and drift 0.
fn reference_engine(sample_rate: f64, block: usize) -> Chambers {
    let mut reverb = Chambers::new();
    reverb.set_time(0.55);
    reverb.set_mass(0.5);
    reverb.set_density(0.5);
    reverb.set_bloom(0.5);
    reverb.set_gravity(0.5);
    reverb.set_warp(0.0);
    reverb.set_drift(0.0);
    reverb.prepare(sample_rate, block, 2);
    reverb
}

/// Process one block of `left`/`right` input and append the output.
fn process_block(
    reverb: &mut Chambers,
    buffer: &mut StereoBuffer,
    input: impl Fn(usize) -> (f32, f32),
    out_left: &mut Vec<f32>,
    out_right: &mut Vec<f32>,
) {
    let offset = out_left.len();
    for n in 0..buffer.len() {
        let (l, r) = input(offset + n);
        buffer.left[n] = l;
        buffer.right[n] = r;
    }
    reverb.process(buffer.as_block());
    out_left.extend_from_slice(&buffer.left);
    out_right.extend_from_slice(&buffer.right);
}

fn silence(_: usize) -> (f32, f32) {
    (0.0, 0.0)
}

fn window_rms(signal: &[f32], start: usize, len: usize) -> f32 {
    let end = (start + len).min(signal.len());
    let slice = &signal[start..end];
    let sum: f64 = slice.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    (sum / slice.len().max(1) as f64).sqrt() as f32
}

fn peak(signal: &[f32]) -> f32 {
    signal.iter().fold(0.0_f32, |acc, &s| acc.max(s.abs()))
}

// ============================================================================
// Matrix and feedback bounds
// ============================================================================

#[test]
fn matrix_columns_stay_unit_norm() {
    for step in 0..=1000 {
        let warp = step as f32 / 1000.0;
        for (col, norm) in column_norms(&warped(warp)).iter().enumerate() {
            assert!(
                (norm - 1.0).abs() < 1e-4,
                "warp {warp}: column {col} has norm {norm}"
            );
        }
    }
}

#[test]
fn feedback_coefficient_is_bounded() {
    let inputs = (-100..=200)
        .map(|i| i as f32 / 100.0)
        .chain([f32::NAN, f32::INFINITY, f32::NEG_INFINITY, 1.0e9, -1.0e9]);
    for time in inputs {
        let fb = feedback_from_time(time);
        assert!(fb <= MAX_FEEDBACK, "time {time}: feedback {fb} above ceiling");
        assert!(fb >= MIN_FEEDBACK, "time {time}: feedback {fb} below floor");
    }
}

// ============================================================================
// End-to-end impulse response
// ============================================================================

#[test]
fn impulse_rings_then_decays() {
    let mut reverb = reference_engine(SAMPLE_RATE, BLOCK);
    let mut buffer = StereoBuffer::new(BLOCK);
    let mut left = Vec::new();
    let mut right = Vec::new();

    let total = 8 * SAMPLE_RATE as usize;
    let impulse = |n: usize| if n == 0 { (1.0, 1.0) } else { (0.0, 0.0) };
    while left.len() < total {
        process_block(&mut reverb, &mut buffer, impulse, &mut left, &mut right);
    }
    left.truncate(total);
    right.truncate(total);

    for (n, (&l, &r)) in left.iter().zip(right.iter()).enumerate() {
        assert!(l.is_finite() && r.is_finite(), "non-finite output at {n}");
        assert!(l.abs() < 1.0 && r.abs() < 1.0, "output at {n} not below unity: {l}, {r}");
    }

    let window = SAMPLE_RATE as usize / 10;
    for w in 0..20 {
        let rms = window_rms(&left, w * window, window) + window_rms(&right, w * window, window);
        assert!(rms > 0.0, "tail went silent in window {w} (before 2 s)");
    }

    let last = total - window;
    let tail_db = 20.0
        * window_rms(&left, last, window)
            .max(window_rms(&right, last, window))
            .max(1e-12)
            .log10();
    assert!(tail_db < -60.0, "tail still at {tail_db:.1} dBFS at 8 s");
}

#[test]
fn decay_time_grows_with_time_control() {
    let sample_rate = 16000.0;
    let horizon = 12 * 16000;
    let window = 1600;

    let mut last_t60 = 0.0_f32;
    for &time in &[0.0_f32, 0.25, 0.5, 0.75, 1.0] {
        let mut reverb = Chambers::new();
        reverb.set_time(time);
        reverb.set_mass(0.5);
        reverb.set_density(0.5);
        reverb.set_bloom(0.0);
        reverb.set_gravity(0.5);
        reverb.prepare(sample_rate, BLOCK, 2);

        let mut buffer = StereoBuffer::new(BLOCK);
        let mut left = Vec::new();
        let mut right = Vec::new();
        let impulse = |n: usize| if n == 0 { (1.0, 0.0) } else { (0.0, 0.0) };
        while left.len() < horizon {
            process_block(&mut reverb, &mut buffer, impulse, &mut left, &mut right);
        }

        let windows: Vec<f32> = (0..horizon / window)
            .map(|w| window_rms(&left, w * window, window).max(window_rms(&right, w * window, window)))
            .collect();
        let (peak_idx, peak_rms) = windows
            .iter()
            .copied()
            .enumerate()
            .fold((0, 0.0_f32), |best, (i, v)| if v > best.1 { (i, v) } else { best });
        let threshold = peak_rms * 1.0e-3;
        let t60 = windows[peak_idx..]
            .iter()
            .position(|&v| v < threshold)
            .map_or(f32::INFINITY, |i| (peak_idx + i) as f32 * 0.1);

        assert!(
            t60 >= last_t60,
            "time {time}: decay {t60} s shorter than previous {last_t60} s"
        );
        last_t60 = t60;
    }
}

// ============================================================================
// NaN containment
// ============================================================================

#[test]
fn non_finite_injection_never_reaches_output() {
    let mut reverb = reference_engine(SAMPLE_RATE, BLOCK);
    let mut buffer = StereoBuffer::new(BLOCK);

    let mut poison = vec![0.0_f32; BLOCK];
    poison[0] = f32::INFINITY;
    poison[7] = f32::NAN;
    reverb.set_external_injection(&poison, Some(&poison));

    let total = 10 * SAMPLE_RATE as usize;
    let mut processed = 0;
    while processed < total {
        buffer.clear();
        reverb.process(buffer.as_block());
        for (&l, &r) in buffer.left.iter().zip(buffer.right.iter()) {
            assert!(l.is_finite() && r.is_finite(), "non-finite output at {processed}");
        }
        processed += BLOCK;
    }
}

#[test]
fn non_finite_audio_input_is_contained() {
    let mut reverb = reference_engine(SAMPLE_RATE, BLOCK);
    let mut buffer = StereoBuffer::new(BLOCK);
    buffer.left[3] = f32::NAN;
    buffer.right[9] = f32::NEG_INFINITY;
    reverb.process(buffer.as_block());

    for _ in 0..200 {
        buffer.clear();
        reverb.process(buffer.as_block());
        assert!(buffer.left.iter().chain(buffer.right.iter()).all(|s| s.is_finite()));
    }
}

#[test]
fn non_finite_controls_keep_last_value() {
    let mut reverb = reference_engine(SAMPLE_RATE, BLOCK);
    reverb.set_time(f32::NAN);
    reverb.set_warp(f32::INFINITY);
    reverb.set_mass(-3.0);

    let params = reverb.params();
    assert_eq!(params.get(chambers::Control::Time), 0.55);
    assert_eq!(params.get(chambers::Control::Warp), 0.0);
    assert_eq!(params.get(chambers::Control::Mass), 0.0);

    let mut buffer = StereoBuffer::new(BLOCK);
    buffer.left[0] = 1.0;
    for _ in 0..100 {
        reverb.process(buffer.as_block());
        assert!(buffer.left.iter().all(|s| s.is_finite()));
        buffer.clear();
    }
}

// ============================================================================
// Freeze
// ============================================================================

#[test]
fn frozen_tail_does_not_grow() {
    let mut reverb = reference_engine(SAMPLE_RATE, BLOCK);
    let mut buffer = StereoBuffer::new(BLOCK);
    let mut left = Vec::new();
    let mut right = Vec::new();

    let impulse = |n: usize| if n == 0 { (1.0, 1.0) } else { (0.0, 0.0) };
    process_block(&mut reverb, &mut buffer, impulse, &mut left, &mut right);

    reverb.set_freeze(true);
    while !reverb.is_frozen() {
        process_block(&mut reverb, &mut buffer, silence, &mut left, &mut right);
        assert!(left.len() < SAMPLE_RATE as usize, "freeze never completed");
    }
    let engaged_at = left.len();

    let five_seconds = 5 * SAMPLE_RATE as usize;
    while left.len() < engaged_at + five_seconds {
        process_block(&mut reverb, &mut buffer, silence, &mut left, &mut right);
    }

    let tenth = SAMPLE_RATE as usize / 10;
    let early = peak(&left[engaged_at..engaged_at + tenth])
        .max(peak(&right[engaged_at..engaged_at + tenth]));
    let end = engaged_at + five_seconds;
    let second = SAMPLE_RATE as usize;
    let late = peak(&left[end - second..end]).max(peak(&right[end - second..end]));

    assert!(early > 0.0, "nothing was frozen");
    assert!(late > 0.0, "frozen tail died out");
    assert!(late <= early, "frozen tail grew: early peak {early}, late peak {late}");
}

#[test]
fn freeze_transitions_are_click_free() {
    let mut reverb = reference_engine(SAMPLE_RATE, BLOCK);
    let mut buffer = StereoBuffer::new(BLOCK);
    let mut left = Vec::new();
    let mut right = Vec::new();

    let omega = core::f32::consts::TAU * 220.0 / SAMPLE_RATE as f32;
    let sine = move |n: usize| {
        let s = 0.3 * (omega * n as f32).sin();
        (s, s)
    };

    let second = SAMPLE_RATE as usize;
    let run_until = |reverb: &mut Chambers,
                     buffer: &mut StereoBuffer,
                     left: &mut Vec<f32>,
                     right: &mut Vec<f32>,
                     until: usize| {
        while left.len() < until {
            process_block(reverb, buffer, sine, left, right);
        }
    };

    run_until(&mut reverb, &mut buffer, &mut left, &mut right, second);
    reverb.set_freeze(true);
    run_until(&mut reverb, &mut buffer, &mut left, &mut right, second + second / 2);
    assert!(reverb.is_frozen());
    reverb.set_freeze(false);
    run_until(&mut reverb, &mut buffer, &mut left, &mut right, 2 * second);

    // Re-entrant toggling inside the ramps.
    reverb.set_freeze(true);
    run_until(&mut reverb, &mut buffer, &mut left, &mut right, 2 * second + second / 20);
    reverb.set_freeze(false);
    run_until(&mut reverb, &mut buffer, &mut left, &mut right, 2 * second + second / 12);
    reverb.set_freeze(true);
    run_until(&mut reverb, &mut buffer, &mut left, &mut right, 3 * second);

    for channel in [&left, &right] {
        for (n, pair) in channel.windows(2).enumerate() {
            let step = (pair[1] - pair[0]).abs();
            assert!(step < 0.05, "discontinuity of {step} at sample {}", n + 1);
        }
    }
}

// ============================================================================
// Long-run stability across warp
// ============================================================================

const MID_WARPS: [f32; 3] = [0.25, 0.5, 0.75];

/// Longest decay, moderate drift, and a warp between the orthogonal endpoints.
fn mid_warp_engine(warp: f32) -> Chambers {
    let mut reverb = Chambers::new();
    reverb.set_time(1.0);
    reverb.set_mass(0.5);
    reverb.set_density(0.5);
    reverb.set_bloom(0.5);
    reverb.set_gravity(0.5);
    reverb.set_warp(warp);
    reverb.set_drift(0.6);
    reverb.prepare(SAMPLE_RATE, BLOCK, 2);
    reverb
}

/// Decorrelated white noise, ±0.25 per channel.
fn noise(n: usize) -> (f32, f32) {
    let l = ((n as u32).wrapping_mul(2_654_435_761) >> 8) as f32 / 16_777_216.0;
    let r = ((n as u32 ^ 0x5bd1_e995).wrapping_mul(2_246_822_519) >> 8) as f32 / 16_777_216.0;
    ((l - 0.5) * 0.5, (r - 0.5) * 0.5)
}

/// Fill the network with 200 blocks of noise.
fn prefill(reverb: &mut Chambers, buffer: &mut StereoBuffer) {
    for block in 0..200 {
        for n in 0..BLOCK {
            let (l, r) = noise(block * BLOCK + n);
            buffer.left[n] = l;
            buffer.right[n] = r;
        }
        reverb.process(buffer.as_block());
    }
}

/// Per-second RMS and peak of a run, one entry per whole second.
#[derive(Default)]
struct SecondStats {
    rms: Vec<f32>,
    peak: Vec<f32>,
    sum_sq: f64,
    max: f32,
    count: usize,
}

impl SecondStats {
    fn push(&mut self, samples: &[f32]) {
        for &s in samples {
            assert!(s.is_finite(), "non-finite output after {} s", self.rms.len());
            self.sum_sq += f64::from(s) * f64::from(s);
            self.max = self.max.max(s.abs());
            self.count += 1;
            if self.count == 2 * SAMPLE_RATE as usize {
                self.rms.push((self.sum_sq / self.count as f64).sqrt() as f32);
                self.peak.push(self.max);
                self.sum_sq = 0.0;
                self.max = 0.0;
                self.count = 0;
            }
        }
    }
}

#[test]
fn mid_warp_tail_decays_over_a_minute() {
    for warp in MID_WARPS {
        let mut reverb = mid_warp_engine(warp);
        let mut buffer = StereoBuffer::new(BLOCK);
        prefill(&mut reverb, &mut buffer);

        // A tiny click at the top of every second retriggers the bloom
        // envelope, so each second is shaped by the same curve and the output
        // follows the network energy.
        let second = SAMPLE_RATE as usize;
        let mut stats = SecondStats::default();
        let mut rendered = 0;
        while rendered < 60 * second {
            buffer.clear();
            for n in 0..BLOCK {
                if (rendered + n) % second == 0 {
                    buffer.left[n] = 2.0e-3;
                    buffer.right[n] = 2.0e-3;
                }
            }
            reverb.process(buffer.as_block());
            stats.push(&buffer.left);
            stats.push(&buffer.right);
            rendered += BLOCK;
        }

        let first = stats.rms[0];
        let last = stats.rms[stats.rms.len() - 1];
        assert!(first > 0.0, "warp {warp}: prefill left no tail");
        assert!(
            last <= first,
            "warp {warp}: tail grew from rms {first} to {last}"
        );
        let loudest = stats.peak.iter().copied().fold(0.0_f32, f32::max);
        assert!(
            loudest <= stats.peak[0] * 1.5,
            "warp {warp}: peak rose to {loudest} from {}",
            stats.peak[0]
        );
    }
}

#[test]
fn mid_warp_freeze_holds_without_growth() {
    for warp in MID_WARPS {
        let mut reverb = mid_warp_engine(warp);
        let mut buffer = StereoBuffer::new(BLOCK);
        prefill(&mut reverb, &mut buffer);

        reverb.set_freeze(true);
        let mut waited = 0;
        while !reverb.is_frozen() {
            buffer.clear();
            reverb.process(buffer.as_block());
            waited += BLOCK;
            assert!(waited < SAMPLE_RATE as usize, "warp {warp}: freeze never completed");
        }

        let mut stats = SecondStats::default();
        let mut rendered = 0;
        while rendered < 5 * SAMPLE_RATE as usize {
            buffer.clear();
            reverb.process(buffer.as_block());
            stats.push(&buffer.left);
            stats.push(&buffer.right);
            rendered += BLOCK;
        }

        let first = stats.rms[0];
        let last = stats.rms[stats.rms.len() - 1];
        assert!(first > 0.0, "warp {warp}: nothing was frozen");
        assert!(
            last <= first * 1.25,
            "warp {warp}: frozen tail grew from rms {first} to {last}"
        );
        let late_peak = stats.peak[stats.peak.len() - 1];
        assert!(
            late_peak <= stats.peak[0] * 2.0,
            "warp {warp}: frozen peak rose to {late_peak} from {}",
            stats.peak[0]
        );
    }
}

// ============================================================================
// Reset
// ============================================================================

#[test]
fn reset_is_idempotent() {
    let noise = |n: usize| {
        let x = ((n as u32).wrapping_mul(2_654_435_761) >> 8) as f32 / 16_777_216.0;
        let s = (x - 0.5) * 0.8;
        (s, -s)
    };

    let mut once = reference_engine(SAMPLE_RATE, BLOCK);
    let mut twice = reference_engine(SAMPLE_RATE, BLOCK);
    let mut fresh = reference_engine(SAMPLE_RATE, BLOCK);
    let mut buffer = StereoBuffer::new(BLOCK);
    let mut scratch_l = Vec::new();
    let mut scratch_r = Vec::new();

    for _ in 0..40 {
        process_block(&mut once, &mut buffer, noise, &mut scratch_l, &mut scratch_r);
    }
    scratch_l.clear();
    scratch_r.clear();
    for _ in 0..40 {
        process_block(&mut twice, &mut buffer, noise, &mut scratch_l, &mut scratch_r);
    }

    once.reset();
    twice.reset();
    twice.reset();

    let mut out = [(Vec::new(), Vec::new()), (Vec::new(), Vec::new()), (Vec::new(), Vec::new())];
    for _ in 0..60 {
        for (engine, (l, r)) in [&mut once, &mut twice, &mut fresh].into_iter().zip(out.iter_mut()) {
            process_block(engine, &mut buffer, noise, l, r);
        }
    }

    assert_eq!(out[0], out[1], "second reset changed subsequent output");
    assert_eq!(out[0], out[2], "reset output differs from a freshly prepared engine");
}
