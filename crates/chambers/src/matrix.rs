//! Feedback mixing matrix for the 8-line network.
//!
//! Two fixed orthogonal matrices bracket the warp control:
//!
//! - **Hadamard** (warp = 0): every line feeds every other line with equal
//!   energy, maximally diffuse.
//! - **Householder** `I - (2/N)·11ᵀ` (warp = 1): diagonally dominant, each
//!   line mostly recirculates into itself, more localized.
//!
//! In between, the two are blended linearly and every column renormalized to
//! unit L2 norm so that per-line loop energy does not depend on warp.
//!
//! Unit columns do not make the blend orthogonal: around warp 0.5 its largest
//! singular value reaches about 1.65. Each rebuild measures that gain and the
//! product is divided by it whenever it exceeds 1, so the matrix never
//! amplifies the state vector.
//!
//! The matrix also keeps a frozen snapshot. While freeze is engaged or
//! releasing, the feedback vector is the blend-weighted sum of the live and
//! snapshot products, so the topology cross-fades instead of switching.

use crate::NUM_LINES;
use libm::{sqrt, sqrtf};

/// An 8×8 row-major coefficient matrix.
pub type Matrix8 = [[f32; NUM_LINES]; NUM_LINES];

const INV_SQRT_8: f32 = 0.353_553_4;
const HOUSEHOLDER_DIAG: f32 = 0.75;
const HOUSEHOLDER_OFF: f32 = -0.25;

/// Sylvester-ordered Hadamard matrix scaled by 1/√8.
pub fn hadamard() -> Matrix8 {
    core::array::from_fn(|row| {
        core::array::from_fn(|col| {
            if (row & col).count_ones() % 2 == 0 {
                INV_SQRT_8
            } else {
                -INV_SQRT_8
            }
        })
    })
}

/// Householder reflection `I - (2/8)·11ᵀ`.
pub fn householder() -> Matrix8 {
    core::array::from_fn(|row| {
        core::array::from_fn(|col| {
            if row == col {
                HOUSEHOLDER_DIAG
            } else {
                HOUSEHOLDER_OFF
            }
        })
    })
}

/// Scale every column to unit L2 norm. Near-zero columns are left untouched.
pub fn normalize_columns(matrix: &mut Matrix8) {
    for col in 0..NUM_LINES {
        let norm_sq: f32 = (0..NUM_LINES).map(|row| matrix[row][col] * matrix[row][col]).sum();
        if norm_sq > 1.0e-6 {
            let inv = 1.0 / sqrtf(norm_sq);
            for row in matrix.iter_mut() {
                row[col] *= inv;
            }
        }
    }
}

/// L2 norm of each column.
pub fn column_norms(matrix: &Matrix8) -> [f32; NUM_LINES] {
    core::array::from_fn(|col| {
        sqrtf((0..NUM_LINES).map(|row| matrix[row][col] * matrix[row][col]).sum())
    })
}

/// Blend Hadamard toward Householder by `warp` (clamped to \[0, 1\]) and
/// renormalize the columns.
pub fn warped(warp: f32) -> Matrix8 {
    let t = if warp.is_nan() { 0.0 } else { warp.clamp(0.0, 1.0) };
    let h = hadamard();
    let q = householder();
    let mut m: Matrix8 = core::array::from_fn(|row| {
        core::array::from_fn(|col| h[row][col] + t * (q[row][col] - h[row][col]))
    });
    normalize_columns(&mut m);
    m
}

/// Largest singular value (spectral norm) of `matrix`.
///
/// Cyclic Jacobi sweeps on the symmetric `MᵀM` in `f64`; the largest
/// eigenvalue left on the diagonal is the squared gain.
pub fn spectral_norm(matrix: &Matrix8) -> f32 {
    let mut a = [[0.0_f64; NUM_LINES]; NUM_LINES];
    for (i, row) in a.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = (0..NUM_LINES)
                .map(|k| f64::from(matrix[k][i]) * f64::from(matrix[k][j]))
                .sum();
        }
    }

    for _ in 0..32 {
        let mut off = 0.0;
        for p in 0..NUM_LINES {
            for q in (p + 1)..NUM_LINES {
                off += a[p][q] * a[p][q];
            }
        }
        if off < 1.0e-24 {
            break;
        }

        for p in 0..NUM_LINES {
            for q in (p + 1)..NUM_LINES {
                if a[p][q].abs() < 1.0e-30 {
                    continue;
                }
                let theta = (a[q][q] - a[p][p]) / (2.0 * a[p][q]);
                let sign = if theta >= 0.0 { 1.0 } else { -1.0 };
                let t = sign / (theta.abs() + sqrt(theta * theta + 1.0));
                let c = 1.0 / sqrt(t * t + 1.0);
                let s = t * c;
                for row in a.iter_mut() {
                    let (kp, kq) = (row[p], row[q]);
                    row[p] = c * kp - s * kq;
                    row[q] = s * kp + c * kq;
                }
                for k in 0..NUM_LINES {
                    let (pk, qk) = (a[p][k], a[q][k]);
                    a[p][k] = c * pk - s * qk;
                    a[q][k] = s * pk + c * qk;
                }
            }
        }
    }

    let largest = (0..NUM_LINES).map(|i| a[i][i]).fold(0.0_f64, f64::max);
    sqrt(largest) as f32
}

/// Factor that brings a matrix with the given spectral norm down to unit gain.
///
/// Gains within 1e-6 of unity (the orthogonal endpoints) are left alone.
#[inline]
fn gain_compensation(gain: f32) -> f32 {
    if gain > 1.0 + 1.0e-6 { 1.0 / gain } else { 1.0 }
}

/// `out = matrix · input`.
#[inline]
pub fn multiply(matrix: &Matrix8, input: &[f32; NUM_LINES]) -> [f32; NUM_LINES] {
    core::array::from_fn(|row| {
        matrix[row]
            .iter()
            .zip(input.iter())
            .map(|(m, x)| m * x)
            .sum()
    })
}

/// Live blended matrix plus the snapshot captured when freeze engages.
#[derive(Debug, Clone)]
pub struct FeedbackMatrix {
    live: Matrix8,
    frozen: Matrix8,
    live_gain: f32,
    live_scale: f32,
    frozen_scale: f32,
    warp: f32,
    epsilon: f32,
}

impl FeedbackMatrix {
    /// Hadamard live matrix and snapshot, warp 0.
    pub fn new() -> Self {
        let h = hadamard();
        Self {
            live: h,
            frozen: h,
            live_gain: 1.0,
            live_scale: 1.0,
            frozen_scale: 1.0,
            warp: 0.0,
            epsilon: 1.0e-4,
        }
    }

    /// Minimum warp change that triggers a recompute.
    pub fn set_epsilon(&mut self, epsilon: f32) {
        self.epsilon = epsilon.max(0.0);
    }

    /// Recompute the live matrix if `warp` moved by more than epsilon.
    ///
    /// Returns `true` if the matrix was rebuilt.
    pub fn update(&mut self, warp: f32) -> bool {
        if (warp - self.warp).abs() <= self.epsilon {
            return false;
        }
        self.force(warp);
        true
    }

    /// Recompute the live matrix and its gain compensation unconditionally.
    pub fn force(&mut self, warp: f32) {
        self.warp = warp;
        self.live = warped(warp);
        self.live_gain = spectral_norm(&self.live);
        self.live_scale = gain_compensation(self.live_gain);
    }

    /// Copy the live matrix into the frozen snapshot.
    pub fn capture(&mut self) {
        self.frozen = self.live;
        self.frozen_scale = self.live_scale;
    }

    /// Warp value the live matrix was built from.
    pub fn warp(&self) -> f32 {
        self.warp
    }

    /// Current live blended matrix.
    pub fn live(&self) -> &Matrix8 {
        &self.live
    }

    /// Snapshot captured at the last freeze engage.
    pub fn frozen(&self) -> &Matrix8 {
        &self.frozen
    }

    /// Spectral norm of the live matrix before compensation.
    pub fn gain(&self) -> f32 {
        self.live_gain
    }

    /// Factor applied to the live product, `1 / max(gain, 1)`.
    pub fn live_scale(&self) -> f32 {
        self.live_scale
    }

    /// Factor applied to the snapshot product.
    pub fn frozen_scale(&self) -> f32 {
        self.frozen_scale
    }

    /// Feedback vector for the given taps.
    ///
    /// `blend = 1` uses the live matrix only, `blend = 0` the snapshot only;
    /// values in between weight the two products. Each product carries its
    /// gain compensation, so the result is never longer than `taps`.
    #[inline]
    pub fn apply(&self, taps: &[f32; NUM_LINES], blend: f32) -> [f32; NUM_LINES] {
        if blend >= 1.0 {
            return self.live_product(taps);
        }
        if blend <= 0.0 {
            return self.frozen_product(taps);
        }
        let live = self.live_product(taps);
        let frozen = self.frozen_product(taps);
        core::array::from_fn(|i| frozen[i] + blend * (live[i] - frozen[i]))
    }

    #[inline]
    fn live_product(&self, taps: &[f32; NUM_LINES]) -> [f32; NUM_LINES] {
        let mut out = multiply(&self.live, taps);
        if self.live_scale < 1.0 {
            out.iter_mut().for_each(|v| *v *= self.live_scale);
        }
        out
    }

    #[inline]
    fn frozen_product(&self, taps: &[f32; NUM_LINES]) -> [f32; NUM_LINES] {
        let mut out = multiply(&self.frozen, taps);
        if self.frozen_scale < 1.0 {
            out.iter_mut().for_each(|v| *v *= self.frozen_scale);
        }
        out
    }
}

impl Default for FeedbackMatrix {
    fn default() -> Self {
        Self::new()
    }
}
