//! Lifecycle trait for block-processing DSP modules.
//!
//! A [`DspModule`] is prepared once off the audio thread, then fed audio in
//! place one block at a time. Hosts that route between modules only need this
//! trait; parameter control is exposed separately through
//! [`ParameterInfo`](crate::ParameterInfo).
//!
//! ## Design Decisions
//!
//! - **In-place blocks**: `process` transforms an [`AudioBlock`] in place, so
//!   no output buffer is ever allocated on the audio thread.
//! - **Infallible processing**: malformed input is absorbed by clamping and
//!   sanitizing inside the module. `process` has no error return.
//! - **Object-safe**: usable as `dyn DspModule` in a host's module list.

use crate::AudioBlock;

/// Core trait for modules in a real-time processing chain.
///
/// # Example
///
/// ```rust
/// use chambers_core::{AudioBlock, DspModule};
///
/// struct Gain(f32);
///
/// impl DspModule for Gain {
///     fn prepare(&mut self, _sample_rate: f64, _max_block_size: usize, _num_channels: usize) {}
///
///     fn reset(&mut self) {}
///
///     fn process(&mut self, mut block: AudioBlock<'_>) {
///         block.for_each_channel(|channel| {
///             for sample in channel.iter_mut() {
///                 *sample *= self.0;
///             }
///         });
///     }
/// }
///
/// let mut gain = Gain(0.5);
/// let mut data = [1.0_f32, -1.0];
/// gain.process(AudioBlock::Mono(&mut data));
/// assert_eq!(data, [0.5, -0.5]);
/// ```
pub trait DspModule {
    /// Size all internal buffers for the given format.
    ///
    /// The only lifecycle call permitted to allocate. Must be called before
    /// [`process`](Self::process), and again whenever the format changes.
    fn prepare(&mut self, sample_rate: f64, max_block_size: usize, num_channels: usize);

    /// Clear all signal state without reallocating.
    fn reset(&mut self);

    /// Transform one block of audio in place.
    ///
    /// Blocks longer than the prepared maximum are processed in full; the
    /// maximum only sizes scratch storage.
    fn process(&mut self, block: AudioBlock<'_>);

    /// Processing latency in samples. Default 0.
    fn latency_samples(&self) -> usize {
        0
    }
}
