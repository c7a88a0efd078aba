//! Chambers Core - DSP primitives for the chambers reverb engine
//!
//! This crate provides the building blocks the feedback delay network is made
//! of, designed for real-time audio processing with zero allocation in the
//! audio path.
//!
//! # Core Abstractions
//!
//! ## Module Lifecycle
//!
//! - [`DspModule`] - prepare / reset / process / latency, object-safe
//! - [`AudioBlock`] - Borrowed mono or stereo block, processed in place
//! - [`StereoBuffer`] - Owned stereo block storage
//!
//! ## Parameter Smoothing
//!
//! - [`ParameterSmoother`] - One-pole exponential smoothing toward a target
//!
//! ## Parameter Introspection
//!
//! - [`ParameterInfo`] - Enumerate, read, and set a module's controls
//! - [`ParamDescriptor`], [`ParamId`] - Control metadata
//!
//! ## Filters and Delays
//!
//! - [`AllpassDiffuser`] - Unity-gain allpass for diffusion
//! - [`FractionalDelayLine`] - Ring buffer with linear-interpolated reads
//! - [`OnePole`] - One-pole lowpass with complementary high-pass output
//!
//! ## Utilities
//!
//! - Math functions: [`map_range`], [`sanitize`], [`hard_limit`],
//!   [`flush_denormal`], [`one_pole_coeff_from_hz`], [`db_to_linear`], etc.
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible for embedded audio applications.
//! Disable the default `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! chambers-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: No allocations in audio processing paths
//! - **No dependencies on std**: Pure `no_std` with `libm` for math
//! - **Never propagate NaN**: Coefficient setters ignore non-finite values

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod allpass;
pub mod buffer;
pub mod delay;
pub mod math;
pub mod module;
pub mod one_pole;
pub mod param;
pub mod param_info;

// Re-export main types at crate root
pub use allpass::{AllpassDiffuser, MAX_DIFFUSER_COEFFICIENT};
pub use buffer::{AudioBlock, StereoBuffer};
pub use delay::FractionalDelayLine;
pub use math::{
    db_to_linear, flush_denormal, hard_limit, lerp, linear_to_db, map_range,
    one_pole_coeff_from_hz, sanitize,
};
pub use module::DspModule;
pub use one_pole::OnePole;
pub use param::ParameterSmoother;
pub use param_info::{ParamDescriptor, ParamId, ParameterInfo};
