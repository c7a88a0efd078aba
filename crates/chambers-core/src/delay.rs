//! Fractional delay line for feedback delay networks.
//!
//! An owned ring buffer with a write cursor and a 2-point linear interpolated
//! read. The read happens *before* the write for the current sample, so a
//! delay of `d` returns the sample written `d` samples ago.
//!
//! | Use | Length | Modulated |
//! |-----|--------|-----------|
//! | FDN line | 50 ms - 1.23 s | Yes (±1 sample drift) |
//! | Frozen tap | same buffer | No |

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Ring buffer with linear-interpolated fractional reads.
///
/// # Invariants
///
/// - `write_pos` is always in `[0, capacity)`.
/// - Reads clamp the delay to `[1, capacity - 2]`, leaving room for the
///   second interpolation tap.
///
/// # Example
///
/// ```rust
/// use chambers_core::FractionalDelayLine;
///
/// let mut line = FractionalDelayLine::new();
/// line.allocate(16);
///
/// line.write(1.0);
/// line.advance();
/// for _ in 0..3 {
///     line.write(0.0);
///     line.advance();
/// }
///
/// assert!((line.read(4.0) - 1.0).abs() < 1e-6);
/// assert!((line.read(3.5) - 0.5).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FractionalDelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl FractionalDelayLine {
    /// Create an empty, unallocated line. Reads return silence.
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            write_pos: 0,
        }
    }

    /// Allocate `capacity` zeroed samples (floored at 3) and rewind the cursor.
    ///
    /// Allocates; never call from the audio thread.
    pub fn allocate(&mut self, capacity: usize) {
        self.buffer = vec![0.0; capacity.max(3)];
        self.write_pos = 0;
    }

    /// Zero the buffer and rewind the cursor without reallocating.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    /// Buffer length in samples.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Current write cursor.
    #[inline]
    pub fn write_pos(&self) -> usize {
        self.write_pos
    }

    /// Largest delay a read can honour.
    #[inline]
    pub fn max_delay(&self) -> usize {
        self.buffer.len().saturating_sub(2)
    }

    /// Read `delay_samples` behind the write cursor with linear interpolation.
    ///
    /// `frac` blends the sample at `floor(delay)` toward the one a sample
    /// older, so increasing the delay always moves further into the past.
    #[inline]
    pub fn read(&self, delay_samples: f32) -> f32 {
        let len = self.buffer.len();
        if len == 0 {
            return 0.0;
        }

        let delay = delay_samples.clamp(1.0, (len - 2) as f32);
        let delay_int = delay as usize;
        let frac = delay - delay_int as f32;

        let pos_a = (self.write_pos + len - delay_int) % len;
        let pos_b = if pos_a == 0 { len - 1 } else { pos_a - 1 };

        let a = self.buffer[pos_a];
        let b = self.buffer[pos_b];
        a + (b - a) * frac
    }

    /// Store a sample at the write cursor without advancing.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        if let Some(slot) = self.buffer.get_mut(self.write_pos) {
            *slot = sample;
        }
    }

    /// Advance the write cursor by one, wrapping at the buffer length.
    #[inline]
    pub fn advance(&mut self) {
        self.write_pos += 1;
        if self.write_pos >= self.buffer.len() {
            self.write_pos = 0;
        }
    }
}
