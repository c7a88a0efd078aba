//! Parameter introspection for discoverable controls.
//!
//! The [`ParameterInfo`] trait lets a host enumerate a module's controls,
//! read them back, and set them by index, without knowing the concrete type.
//! Each control is described by a [`ParamDescriptor`] carrying a stable
//! [`ParamId`] that survives reordering.
//!
//! # Example
//!
//! ```rust
//! use chambers_core::{ParameterInfo, ParamDescriptor, ParamId};
//!
//! struct Level {
//!     amount: f32,
//! }
//!
//! impl ParameterInfo for Level {
//!     fn param_count(&self) -> usize { 1 }
//!
//!     fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
//!         match index {
//!             0 => Some(ParamDescriptor::normalized("Amount", "Amt", 0.5)
//!                 .with_id(ParamId(100), "lvl_amount")),
//!             _ => None,
//!         }
//!     }
//!
//!     fn get_param(&self, index: usize) -> f32 {
//!         if index == 0 { self.amount } else { 0.0 }
//!     }
//!
//!     fn set_param(&mut self, index: usize, value: f32) {
//!         if index == 0 {
//!             self.amount = value.clamp(0.0, 1.0);
//!         }
//!     }
//! }
//!
//! let level = Level { amount: 0.5 };
//! assert_eq!(level.find_param_by_name("amt"), Some(0));
//! ```

/// Stable parameter identifier that survives reordering.
///
/// Once assigned, a `ParamId` must never change for a given parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamId(pub u32);

/// Metadata for a single parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Full name for display (e.g. "Time").
    pub name: &'static str,
    /// Short name for hardware displays, at most 8 characters.
    pub short_name: &'static str,
    /// Minimum allowed value.
    pub min: f32,
    /// Maximum allowed value.
    pub max: f32,
    /// Value at initialization.
    pub default: f32,
    /// Recommended encoder increment.
    pub step: f32,
    /// Stable numeric ID. `ParamId(0)` means unassigned.
    pub id: ParamId,
    /// Human-readable stable ID (e.g. `"chm_time"`).
    pub string_id: &'static str,
}

impl ParamDescriptor {
    /// A normalized \[0, 1\] control with the given default.
    pub const fn normalized(name: &'static str, short_name: &'static str, default: f32) -> Self {
        Self {
            name,
            short_name,
            min: 0.0,
            max: 1.0,
            default,
            step: 0.01,
            id: ParamId(0),
            string_id: "",
        }
    }

    /// Assign the stable numeric and string IDs.
    pub const fn with_id(mut self, id: ParamId, string_id: &'static str) -> Self {
        self.id = id;
        self.string_id = string_id;
        self
    }

    /// Clamp a value into `[min, max]`.
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    /// True if `value` is finite and within `[min, max]`.
    pub fn contains(&self, value: f32) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

/// Trait for modules that expose introspectable parameters.
///
/// Indices are zero-based and stable for the lifetime of the instance.
pub trait ParameterInfo {
    /// Number of parameters; valid indices are `0..param_count()`.
    fn param_count(&self) -> usize;

    /// Descriptor for the parameter at `index`, or `None` if out of range.
    fn param_info(&self, index: usize) -> Option<ParamDescriptor>;

    /// Current value of the parameter at `index` (0.0 if out of range).
    fn get_param(&self, index: usize) -> f32;

    /// Set the parameter at `index`. Out-of-range indices are ignored.
    fn set_param(&mut self, index: usize, value: f32);

    /// Find a parameter index by name or short name (case-insensitive).
    fn find_param_by_name(&self, name: &str) -> Option<usize> {
        (0..self.param_count()).find(|&i| {
            self.param_info(i).is_some_and(|desc| {
                desc.name.eq_ignore_ascii_case(name) || desc.short_name.eq_ignore_ascii_case(name)
            })
        })
    }

    /// Find a parameter index by its stable [`ParamId`].
    fn param_index_by_id(&self, id: ParamId) -> Option<usize> {
        (0..self.param_count()).find(|&i| self.param_info(i).is_some_and(|d| d.id == id))
    }
}
