//! Lock-free control surface shared between the control and audio threads.
//!
//! [`ChambersParams`] stores every normalized control as an `AtomicU32`
//! holding the `f32` bits, plus the freeze request as an `AtomicBool`. The
//! control thread writes through `&self`; the audio thread reads each value
//! once per block and hands it to a smoother as the new target. A block may
//! see an old or a new value, never a torn one.
//!
//! Writes are sanitized before they are stored: a non-finite value is
//! dropped in favour of the last good one, and an out-of-range value is
//! clamped to \[0, 1\]. Each control carries a latch so the diagnostic for an
//! anomalous value fires once per episode, not once per call; the latch
//! re-arms as soon as a valid value arrives.

use chambers_core::{ParamDescriptor, ParamId};
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Number of continuous controls.
pub const CONTROL_COUNT: usize = 7;

/// The continuous controls, in parameter-index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    /// Decay time (loop feedback and bloom envelope length).
    Time,
    /// High-frequency damping inside the loop.
    Mass,
    /// Diffusion amount, input gain and early mix.
    Density,
    /// Late-field swell before decay.
    Bloom,
    /// Low-end containment cutoff.
    Gravity,
    /// Feedback matrix blend from Hadamard to Householder.
    Warp,
    /// Depth of per-line delay modulation.
    Drift,
}

impl Control {
    /// All controls in index order.
    pub const ALL: [Control; CONTROL_COUNT] = [
        Control::Time,
        Control::Mass,
        Control::Density,
        Control::Bloom,
        Control::Gravity,
        Control::Warp,
        Control::Drift,
    ];

    /// Zero-based parameter index.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Control at `index`, if any.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Display name.
    pub const fn name(self) -> &'static str {
        match self {
            Control::Time => "Time",
            Control::Mass => "Mass",
            Control::Density => "Density",
            Control::Bloom => "Bloom",
            Control::Gravity => "Gravity",
            Control::Warp => "Warp",
            Control::Drift => "Drift",
        }
    }

    /// Value at construction.
    pub const fn default_value(self) -> f32 {
        match self {
            Control::Time => 0.55,
            Control::Mass | Control::Density => 0.5,
            Control::Bloom | Control::Gravity | Control::Warp | Control::Drift => 0.0,
        }
    }

    /// Introspection descriptor with a stable ID.
    pub const fn descriptor(self) -> ParamDescriptor {
        let (short, id, string_id) = match self {
            Control::Time => ("Time", 3000, "chm_time"),
            Control::Mass => ("Mass", 3001, "chm_mass"),
            Control::Density => ("Dense", 3002, "chm_density"),
            Control::Bloom => ("Bloom", 3003, "chm_bloom"),
            Control::Gravity => ("Gravity", 3004, "chm_gravity"),
            Control::Warp => ("Warp", 3005, "chm_warp"),
            Control::Drift => ("Drift", 3006, "chm_drift"),
        };
        ParamDescriptor::normalized(self.name(), short, self.default_value())
            .with_id(ParamId(id), string_id)
    }
}

/// Thread-safe store of control targets and the freeze request.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use chambers::{ChambersParams, Control};
///
/// let params = Arc::new(ChambersParams::new());
/// let ui = Arc::clone(&params);
///
/// ui.set(Control::Time, 0.8);
/// ui.set(Control::Mass, 7.0);      // clamped
/// ui.set(Control::Bloom, f32::NAN); // ignored
///
/// assert_eq!(params.get(Control::Time), 0.8);
/// assert_eq!(params.get(Control::Mass), 1.0);
/// assert_eq!(params.get(Control::Bloom), 0.0);
/// ```
#[derive(Debug)]
pub struct ChambersParams {
    values: [AtomicU32; CONTROL_COUNT],
    warned: [AtomicBool; CONTROL_COUNT],
    freeze: AtomicBool,
}

impl ChambersParams {
    /// All controls at their defaults, freeze off.
    pub fn new() -> Self {
        Self {
            values: core::array::from_fn(|i| {
                AtomicU32::new(Control::ALL[i].default_value().to_bits())
            }),
            warned: core::array::from_fn(|_| AtomicBool::new(false)),
            freeze: AtomicBool::new(false),
        }
    }

    /// Current target of `control`.
    #[inline]
    pub fn get(&self, control: Control) -> f32 {
        f32::from_bits(self.values[control.index()].load(Ordering::Relaxed))
    }

    /// Store a new target for `control` and return the value actually stored.
    pub fn set(&self, control: Control, value: f32) -> f32 {
        let i = control.index();

        if !value.is_finite() {
            if !self.warned[i].swap(true, Ordering::Relaxed) {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    param = control.name(),
                    value,
                    "non-finite control value ignored, keeping last value"
                );
            }
            return self.get(control);
        }

        let clamped = value.clamp(0.0, 1.0);
        if clamped != value {
            if !self.warned[i].swap(true, Ordering::Relaxed) {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    param = control.name(),
                    value,
                    clamped,
                    "control value out of range, clamped"
                );
            }
        } else {
            self.warned[i].store(false, Ordering::Relaxed);
        }

        self.values[i].store(clamped.to_bits(), Ordering::Relaxed);
        clamped
    }

    /// True if a diagnostic has fired for `control` and not yet re-armed.
    pub fn is_warning_latched(&self, control: Control) -> bool {
        self.warned[control.index()].load(Ordering::Relaxed)
    }

    /// Requested freeze state.
    #[inline]
    pub fn freeze(&self) -> bool {
        self.freeze.load(Ordering::Relaxed)
    }

    /// Request freeze on or off. Takes effect at the next block boundary.
    pub fn set_freeze(&self, frozen: bool) {
        self.freeze.store(frozen, Ordering::Relaxed);
    }

    /// Snapshot of all targets in index order.
    pub fn snapshot(&self) -> [f32; CONTROL_COUNT] {
        core::array::from_fn(|i| f32::from_bits(self.values[i].load(Ordering::Relaxed)))
    }
}

impl Default for ChambersParams {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_descriptors() {
        let params = ChambersParams::new();
        for control in Control::ALL {
            assert_eq!(params.get(control), control.descriptor().default);
        }
    }

    #[test]
    fn non_finite_keeps_last_good_value() {
        let params = ChambersParams::new();
        params.set(Control::Warp, 0.3);
        assert_eq!(params.set(Control::Warp, f32::INFINITY), 0.3);
        assert_eq!(params.get(Control::Warp), 0.3);
        params.set(Control::Warp, f32::NAN);
        assert_eq!(params.get(Control::Warp), 0.3);
    }

    #[test]
    fn out_of_range_is_clamped() {
        let params = ChambersParams::new();
        assert_eq!(params.set(Control::Gravity, -2.0), 0.0);
        assert_eq!(params.set(Control::Gravity, 2.0), 1.0);
    }

    #[test]
    fn warning_latch_rearms_on_valid_value() {
        let params = ChambersParams::new();
        params.set(Control::Drift, f32::NAN);
        assert!(params.is_warning_latched(Control::Drift));
        params.set(Control::Drift, 9.0);
        assert!(params.is_warning_latched(Control::Drift));
        params.set(Control::Drift, 0.4);
        assert!(!params.is_warning_latched(Control::Drift));
        assert!(!params.is_warning_latched(Control::Time));
    }

    #[test]
    fn ids_are_stable_and_unique() {
        let ids: Vec<u32> = Control::ALL.iter().map(|c| c.descriptor().id.0).collect();
        assert_eq!(ids, vec![3000, 3001, 3002, 3003, 3004, 3005, 3006]);
        for (i, control) in Control::ALL.iter().enumerate() {
            assert_eq!(control.index(), i);
            assert_eq!(Control::from_index(i), Some(*control));
        }
        assert_eq!(Control::from_index(7), None);
    }

    #[test]
    fn freeze_flag() {
        let params = ChambersParams::new();
        assert!(!params.freeze());
        params.set_freeze(true);
        assert!(params.freeze());
    }
}
