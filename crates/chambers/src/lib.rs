//! Chambers - feedback delay network reverb
//!
//! A real-time reverberation engine built on eight prime-length delay lines,
//! a warpable feedback matrix, and a crossfaded freeze mode, with zero
//! allocation after [`prepare`](chambers_core::DspModule::prepare).
//!
//! # Modules
//!
//! - [`Chambers`] - the engine; implements [`DspModule`](chambers_core::DspModule)
//!   and [`ParameterInfo`](chambers_core::ParameterInfo)
//! - [`ChambersParams`] / [`Control`] - lock-free control surface
//! - [`FeedbackMatrix`] - Hadamard/Householder blend with frozen snapshot
//! - [`FreezeRamp`] / [`FreezeState`] - freeze state machine
//! - [`BloomEnvelope`] - late-field loudness envelope
//! - [`DriftBank`] - per-line delay modulation
//! - [`ChambersTuning`] - tuned constants (smoothing, ramps, ceilings)
//! - [`mapping`] - control-to-coefficient functions
//!
//! # Threading
//!
//! [`Chambers::params`] hands out an `Arc<ChambersParams>`. Any thread may
//! write controls and the freeze request through it; the audio thread reads
//! them once per block. No locks are taken on either side.
//!
//! ```rust
//! use chambers::{Chambers, Control};
//! use chambers_core::{DspModule, StereoBuffer};
//!
//! let mut reverb = Chambers::new();
//! reverb.prepare(48000.0, 512, 2);
//!
//! let ui = reverb.params();
//! std::thread::spawn(move || {
//!     ui.set(Control::Warp, 0.3);
//!     ui.set_freeze(true);
//! })
//! .join()
//! .unwrap();
//!
//! let mut buffer = StereoBuffer::new(512);
//! reverb.process(buffer.as_block());
//! assert!(reverb.freeze_blend() < 1.0);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

/// Number of delay lines in the network.
pub const NUM_LINES: usize = 8;

pub mod chambers;
pub mod drift;
pub mod envelope;
pub mod freeze;
pub mod mapping;
pub mod matrix;
pub mod params;
pub mod tuning;

pub use chambers::{
    Chambers, DELAY_SAMPLES_48K, INPUT_DIFFUSER_SAMPLES_48K, LATE_DIFFUSER_SAMPLES_48K,
};
pub use drift::DriftBank;
pub use envelope::{BloomEnvelope, bloom_curve};
pub use freeze::{FreezeRamp, FreezeState, FreezeTransition};
pub use mapping::{
    MAX_FEEDBACK, MIN_FEEDBACK, damping_from_mass, feedback_from_time, gravity_coefficient,
    gravity_cutoff_hz,
};
pub use matrix::{FeedbackMatrix, Matrix8};
pub use params::{CONTROL_COUNT, ChambersParams, Control};
pub use tuning::{ChambersTuning, SmoothingTimes};
