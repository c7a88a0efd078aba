//! Freeze state machine.
//!
//! Freeze is never an instant flip. A single blend value ramps linearly
//! between 1 (live) and 0 (frozen) over a fixed number of samples, and every
//! freeze-dependent quantity in the network (feedback, damping, diffusion,
//! drift, injection, envelope, matrix) is interpolated by it.
//!
//! ```text
//!            request(true)                    blend reaches 0
//!   Live ──────────────────▶ EngagingFreeze ─────────────────▶ Frozen
//!    ▲                          │      ▲                          │
//!    │ blend reaches 1          │      │                          │ request(false)
//!    │                          ▼      │                          ▼
//!    └───────────────────── ReleasingFreeze ◀─────────────────────┘
//! ```
//!
//! Toggling mid-ramp redirects the ramp from wherever the blend currently is.

/// Observable freeze phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FreezeState {
    /// Normal operation, blend = 1.
    #[default]
    Live,
    /// Ramping from live toward frozen.
    EngagingFreeze,
    /// Infinite sustain, blend = 0.
    Frozen,
    /// Ramping from frozen back toward live.
    ReleasingFreeze,
}

/// Edge produced by [`FreezeRamp::request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreezeTransition {
    /// The request matched the current target.
    None,
    /// The target switched to frozen.
    Engage,
    /// The target switched to live.
    Release,
}

/// Linear blend ramp driven by an edge-triggered freeze target.
///
/// The blend moves by `1 / ramp_samples` per sample and a remaining-sample
/// counter lands it exactly on 0 or 1 when the ramp completes.
#[derive(Debug, Clone)]
pub struct FreezeRamp {
    blend: f32,
    step: f32,
    ramp_samples: usize,
    remaining: usize,
    target_frozen: bool,
}

impl FreezeRamp {
    /// A live ramp with a one-sample ramp length.
    pub fn new() -> Self {
        Self {
            blend: 1.0,
            step: 1.0,
            ramp_samples: 1,
            remaining: 0,
            target_frozen: false,
        }
    }

    /// Set the ramp length, floored at one sample.
    pub fn set_ramp_samples(&mut self, samples: usize) {
        self.ramp_samples = samples.max(1);
        self.step = 1.0 / self.ramp_samples as f32;
    }

    /// Ramp length in samples.
    pub fn ramp_samples(&self) -> usize {
        self.ramp_samples
    }

    /// Point the ramp at `frozen`. Redundant requests are no-ops.
    pub fn request(&mut self, frozen: bool) -> FreezeTransition {
        if frozen == self.target_frozen {
            return FreezeTransition::None;
        }
        self.target_frozen = frozen;
        let distance = if frozen { self.blend } else { 1.0 - self.blend };
        self.remaining = (libm::roundf(distance / self.step) as usize).min(self.ramp_samples);
        if frozen {
            FreezeTransition::Engage
        } else {
            FreezeTransition::Release
        }
    }

    /// Move one step toward the target and return the new blend.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        if self.remaining > 1 {
            self.remaining -= 1;
            self.blend = if self.target_frozen {
                (self.blend - self.step).max(0.0)
            } else {
                (self.blend + self.step).min(1.0)
            };
        } else {
            self.remaining = 0;
            self.settle();
        }
        self.blend
    }

    /// Samples left before the ramp reaches its target.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Jump straight to the end of the ramp for the current target.
    pub fn settle(&mut self) {
        self.remaining = 0;
        self.blend = if self.target_frozen { 0.0 } else { 1.0 };
    }

    /// Current blend: 1 = live, 0 = frozen.
    #[inline]
    pub fn blend(&self) -> f32 {
        self.blend
    }

    /// True if the most recent request asked for freeze.
    pub fn target_frozen(&self) -> bool {
        self.target_frozen
    }

    /// Current phase.
    pub fn state(&self) -> FreezeState {
        match (self.target_frozen, self.blend) {
            (true, b) if b <= 0.0 => FreezeState::Frozen,
            (true, _) => FreezeState::EngagingFreeze,
            (false, b) if b >= 1.0 => FreezeState::Live,
            (false, _) => FreezeState::ReleasingFreeze,
        }
    }

    /// True only when fully frozen.
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.target_frozen && self.blend <= 0.0
    }
}

impl Default for FreezeRamp {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engage_ramps_to_frozen() {
        let mut ramp = FreezeRamp::new();
        ramp.set_ramp_samples(4);
        assert_eq!(ramp.request(true), FreezeTransition::Engage);
        assert_eq!(ramp.state(), FreezeState::EngagingFreeze);

        let values: Vec<f32> = (0..4).map(|_| ramp.advance()).collect();
        assert_eq!(values, vec![0.75, 0.5, 0.25, 0.0]);
        assert_eq!(ramp.state(), FreezeState::Frozen);
        assert!(ramp.is_frozen());
    }

    #[test]
    fn redundant_requests_are_noops() {
        let mut ramp = FreezeRamp::new();
        assert_eq!(ramp.request(false), FreezeTransition::None);
        ramp.request(true);
        assert_eq!(ramp.request(true), FreezeTransition::None);
    }

    #[test]
    fn toggle_mid_ramp_redirects() {
        let mut ramp = FreezeRamp::new();
        ramp.set_ramp_samples(10);
        ramp.request(true);
        for _ in 0..3 {
            ramp.advance();
        }
        let turnaround = ramp.blend();
        assert_eq!(ramp.request(false), FreezeTransition::Release);
        assert_eq!(ramp.state(), FreezeState::ReleasingFreeze);

        let next = ramp.advance();
        assert!((next - (turnaround + 0.1)).abs() < 1e-6);
        for _ in 0..10 {
            ramp.advance();
        }
        assert_eq!(ramp.state(), FreezeState::Live);
        assert_eq!(ramp.blend(), 1.0);
    }

    #[test]
    fn settle_jumps_to_end() {
        let mut ramp = FreezeRamp::new();
        ramp.set_ramp_samples(1000);
        ramp.request(true);
        ramp.settle();
        assert!(ramp.is_frozen());
    }

    #[test]
    fn zero_length_ramp_is_floored() {
        let mut ramp = FreezeRamp::new();
        ramp.set_ramp_samples(0);
        assert_eq!(ramp.ramp_samples(), 1);
        ramp.request(true);
        assert_eq!(ramp.advance(), 0.0);
    }
}
