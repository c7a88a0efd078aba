//! Extreme parameter tests for the Chambers engine.
//!
//! Verifies that the engine produces finite output when every control sits at
//! its minimum or maximum, when running at extreme sample rates (8 kHz and
//! 192 kHz), with odd block sizes, and while frozen.

use chambers::Chambers;
use chambers_core::{AudioBlock, DspModule, ParameterInfo, StereoBuffer};

const DEFAULT_SAMPLE_RATE: f64 = 48000.0;
const LOW_SAMPLE_RATE: f64 = 8000.0;
const HIGH_SAMPLE_RATE: f64 = 192000.0;
const BLOCK_SIZE: usize = 256;
const NUM_BLOCKS: usize = 16;

fn create(sample_rate: f64) -> Chambers {
    let mut reverb = Chambers::new();
    reverb.prepare(sample_rate, BLOCK_SIZE, 2);
    reverb
}

/// Process `NUM_BLOCKS` of a pulse train and assert all outputs are finite.
fn assert_finite_output(reverb: &mut Chambers, label: &str) {
    let mut buffer = StereoBuffer::new(BLOCK_SIZE);
    for block in 0..NUM_BLOCKS {
        for i in 0..BLOCK_SIZE {
            let input = match i % 3 {
                0 => 0.5,
                1 => -0.5,
                _ => 0.0,
            };
            buffer.left[i] = input;
            buffer.right[i] = -input;
        }
        reverb.process(buffer.as_block());
        for (i, (&l, &r)) in buffer.left.iter().zip(buffer.right.iter()).enumerate() {
            assert!(
                l.is_finite() && r.is_finite(),
                "{}: non-finite output in block {} sample {}: {}, {}",
                label,
                block,
                i,
                l,
                r
            );
        }
    }
}

/// Set all parameters to their minimum values using ParameterInfo.
fn set_all_params_min(reverb: &mut Chambers) {
    for i in 0..reverb.param_count() {
        if let Some(desc) = reverb.param_info(i) {
            reverb.set_param(i, desc.min);
        }
    }
}

/// Set all parameters to their maximum values using ParameterInfo.
fn set_all_params_max(reverb: &mut Chambers) {
    for i in 0..reverb.param_count() {
        if let Some(desc) = reverb.param_info(i) {
            reverb.set_param(i, desc.max);
        }
    }
}

#[test]
fn test_extreme_all_min() {
    let mut reverb = create(DEFAULT_SAMPLE_RATE);
    set_all_params_min(&mut reverb);
    assert_finite_output(&mut reverb, "all min");
}

#[test]
fn test_extreme_all_max() {
    let mut reverb = create(DEFAULT_SAMPLE_RATE);
    set_all_params_max(&mut reverb);
    assert_finite_output(&mut reverb, "all max");
}

#[test]
fn test_extreme_low_sample_rate() {
    let mut reverb = create(LOW_SAMPLE_RATE);
    assert_finite_output(&mut reverb, "8 kHz");

    let mut reverb = create(LOW_SAMPLE_RATE);
    set_all_params_max(&mut reverb);
    assert_finite_output(&mut reverb, "8 kHz, all max");
}

#[test]
fn test_extreme_high_sample_rate() {
    let mut reverb = create(HIGH_SAMPLE_RATE);
    assert_finite_output(&mut reverb, "192 kHz");

    let mut reverb = create(HIGH_SAMPLE_RATE);
    set_all_params_max(&mut reverb);
    assert_finite_output(&mut reverb, "192 kHz, all max");
}

#[test]
fn test_extreme_delays_scale_with_rate() {
    let low = create(LOW_SAMPLE_RATE);
    let high = create(HIGH_SAMPLE_RATE);
    for (l, h) in low.nominal_delays().iter().zip(high.nominal_delays().iter()) {
        assert!(*l >= 2.0);
        assert!(h > l);
    }
    assert!(high.buffer_length() > low.buffer_length());
}

#[test]
fn test_extreme_frozen_all_max() {
    let mut reverb = create(DEFAULT_SAMPLE_RATE);
    set_all_params_max(&mut reverb);
    assert_finite_output(&mut reverb, "all max, pre-freeze");
    reverb.set_freeze(true);
    assert_finite_output(&mut reverb, "all max, freezing");

    let mut buffer = StereoBuffer::new(BLOCK_SIZE);
    for _ in 0..200 {
        buffer.clear();
        reverb.process(buffer.as_block());
        assert!(buffer.peak() <= 0.95, "frozen output exceeded wet ceiling");
    }
    assert!(reverb.is_frozen());
}

#[test]
fn test_extreme_out_of_range_values() {
    let mut reverb = create(DEFAULT_SAMPLE_RATE);
    for i in 0..reverb.param_count() {
        reverb.set_param(i, 1.0e6);
        assert_eq!(reverb.get_param(i), 1.0);
        reverb.set_param(i, -1.0e6);
        assert_eq!(reverb.get_param(i), 0.0);
        reverb.set_param(i, f32::NAN);
        assert_eq!(reverb.get_param(i), 0.0);
    }
    assert_finite_output(&mut reverb, "after out-of-range writes");
}

#[test]
fn test_extreme_block_sizes() {
    let mut reverb = Chambers::new();
    reverb.prepare(DEFAULT_SAMPLE_RATE, 1024, 1);

    for &len in &[1_usize, 7, 64, 1023, 1024] {
        let mut samples = vec![0.25_f32; len];
        reverb.process(AudioBlock::Mono(&mut samples));
        assert!(
            samples.iter().all(|s| s.is_finite()),
            "mono block of {len} produced non-finite output"
        );
    }
}

#[test]
fn test_extreme_degenerate_prepare() {
    let mut reverb = Chambers::new();
    reverb.prepare(0.0, 0, 0);
    assert_eq!(reverb.sample_rate(), 44100.0);
    assert_eq!(reverb.max_block_size(), 1);
    assert_eq!(reverb.num_channels(), 1);

    let mut sample = [1.0_f32];
    for _ in 0..100 {
        reverb.process(AudioBlock::Mono(&mut sample));
        assert!(sample[0].is_finite());
        sample[0] = 0.0;
    }
}
