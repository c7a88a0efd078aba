//! Audio buffers handed to [`DspModule::process`](crate::DspModule::process).
//!
//! [`AudioBlock`] borrows one block of mono or stereo samples; [`StereoBuffer`]
//! owns a pair of channels and lends them out as a block.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// One block of audio, borrowed mutably for in-place processing.
#[derive(Debug)]
pub enum AudioBlock<'a> {
    /// A single channel.
    Mono(&'a mut [f32]),
    /// Two channels. Both slices are processed up to the shorter length.
    Stereo {
        /// Left channel samples.
        left: &'a mut [f32],
        /// Right channel samples.
        right: &'a mut [f32],
    },
}

impl AudioBlock<'_> {
    /// Number of frames in the block.
    pub fn len(&self) -> usize {
        match self {
            AudioBlock::Mono(samples) => samples.len(),
            AudioBlock::Stereo { left, right } => left.len().min(right.len()),
        }
    }

    /// True if the block holds no frames.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of channels (1 or 2).
    pub fn channels(&self) -> usize {
        match self {
            AudioBlock::Mono(_) => 1,
            AudioBlock::Stereo { .. } => 2,
        }
    }

    /// Apply `f` to each channel slice in turn.
    pub fn for_each_channel(&mut self, mut f: impl FnMut(&mut [f32])) {
        match self {
            AudioBlock::Mono(samples) => f(samples),
            AudioBlock::Stereo { left, right } => {
                f(left);
                f(right);
            }
        }
    }
}

/// A stereo audio buffer with separate left and right channels.
#[derive(Debug, Clone, Default)]
pub struct StereoBuffer {
    /// Left channel samples.
    pub left: Vec<f32>,
    /// Right channel samples.
    pub right: Vec<f32>,
}

impl StereoBuffer {
    /// Creates a new zeroed stereo buffer with the given block size.
    pub fn new(block_size: usize) -> Self {
        Self {
            left: vec![0.0; block_size],
            right: vec![0.0; block_size],
        }
    }

    /// Fills both channels with zeros.
    pub fn clear(&mut self) {
        self.left.fill(0.0);
        self.right.fill(0.0);
    }

    /// Resizes both channels to the given block size, zeroing new samples.
    pub fn resize(&mut self, block_size: usize) {
        self.left.resize(block_size, 0.0);
        self.right.resize(block_size, 0.0);
    }

    /// Returns the number of samples per channel.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// Returns true if the buffer has zero length.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Borrow both channels as a stereo [`AudioBlock`].
    pub fn as_block(&mut self) -> AudioBlock<'_> {
        AudioBlock::Stereo {
            left: &mut self.left,
            right: &mut self.right,
        }
    }

    /// Peak absolute sample across both channels.
    pub fn peak(&self) -> f32 {
        self.left
            .iter()
            .chain(self.right.iter())
            .fold(0.0_f32, |acc, &s| acc.max(s.abs()))
    }
}
