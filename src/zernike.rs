//! # Zernike circle polynomials
//!
//! This module evaluates the orthogonal basis used to parametrize the aperture
//! phase-error map and defines the **deterministic enumeration** of basis
//! indices shared by the fitter and the phase reconstruction.
//!
//! ## Basis definition
//!
//! A basis function is identified by a pair `(n, l)` with `n ≥ 0`, `|l| ≤ n`
//! and `n − |l|` even. With `m = |l|`, the value at polar coordinates
//! `(ρ, θ)` of the unit disk is:
//!
//! ```text
//! U(n, l; ρ, θ) = R(n, m; ρ) · cos(mθ)   for l ≥ 0
//! U(n, l; ρ, θ) = R(n, m; ρ) · sin(mθ)   for l < 0
//! ```
//!
//! where `R(n, m; ρ)` is the radial polynomial computed by its **closed-form
//! finite sum** (no numeric differentiation of the Rodrigues-type formula),
//! which stays stable and fast for the orders used in practice (`n ≤ 10`):
//!
//! ```text
//!              (n−m)/2        (n − s)!
//! R(n, m; ρ) =   Σ   (−1)^s ───────────────────────────── ρ^(n−2s)
//!              s = 0     s! ((n+m)/2 − s)! ((n−m)/2 − s)!
//! ```
//!
//! ## Index enumeration
//!
//! [`zernike_indices`] flattens all valid pairs up to a maximum order in a
//! **fixed convention**: increasing `n`, then increasing `l` (stepping by 2
//! from `−n` to `n`), yielding `n + 1` entries per order and
//! `(k+1)(k+2)/2` entries for `order_max = k`. Coefficient vectors are only
//! meaningful relative to this ordering, which therefore must be identical
//! between fitting and reconstruction.
//!
//! ## Domain
//!
//! Evaluations with `ρ > 1` return exactly `0.0`. Such inputs occur
//! transiently when a square grid is evaluated over the circumscribed box of
//! the aperture; the basis must never produce NaN there.

use serde::{Deserialize, Serialize};

/// Index pair `(n, l)` of one Zernike circle polynomial.
///
/// Invariants (enforced by [`zernike_indices`], asserted in debug builds):
/// `|l| ≤ n` and `n − |l|` even. The derived ordering (by `n`, then `l`)
/// matches the enumeration convention of [`zernike_indices`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ZernikeIndex {
    /// Radial order.
    pub n: u32,
    /// Signed angular index; `l ≥ 0` selects the cosine branch, `l < 0` the sine branch.
    pub l: i32,
}

impl ZernikeIndex {
    /// Build an index pair, asserting validity in debug builds.
    pub fn new(n: u32, l: i32) -> Self {
        debug_assert!(l.unsigned_abs() <= n && (n - l.unsigned_abs()) % 2 == 0);
        Self { n, l }
    }
}

impl std::fmt::Display for ZernikeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "K({}, {})", self.n, self.l)
    }
}

/// Number of basis functions enumerated up to `order` inclusive.
#[inline]
pub fn basis_len(order: u32) -> usize {
    let k = order as usize;
    (k + 1) * (k + 2) / 2
}

/// Enumerate all valid `(n, l)` pairs up to `order` inclusive.
///
/// The flattening convention is increasing `n`, then increasing `l` stepping
/// by 2 from `−n` to `n`. The result has exactly [`basis_len`]`(order)`
/// entries and is strictly increasing in `n`.
pub fn zernike_indices(order: u32) -> Vec<ZernikeIndex> {
    let mut indices = Vec::with_capacity(basis_len(order));
    for n in 0..=order {
        let mut l = -(n as i32);
        while l <= n as i32 {
            indices.push(ZernikeIndex::new(n, l));
            l += 2;
        }
    }
    indices
}

/// Factorial as `f64`, exact for the small arguments reached at `n ≤ 10`.
fn factorial(k: u32) -> f64 {
    (2..=k).fold(1.0, |acc, i| acc * i as f64)
}

/// Radial polynomial `R(n, m; ρ)` by its closed-form finite sum.
///
/// `m` must be the absolute angular index with `m ≤ n` and `n − m` even.
/// Returns exactly `0.0` for `ρ > 1`.
pub fn radial_polynomial(n: u32, m: u32, rho: f64) -> f64 {
    debug_assert!(m <= n && (n - m) % 2 == 0);
    if rho > 1.0 {
        return 0.0;
    }
    let upper = (n - m) / 2;
    let mut sum = 0.0;
    for s in 0..=upper {
        let sign = if s % 2 == 0 { 1.0 } else { -1.0 };
        let coeff =
            factorial(n - s) / (factorial(s) * factorial((n + m) / 2 - s) * factorial(upper - s));
        sum += sign * coeff * rho.powi((n - 2 * s) as i32);
    }
    sum
}

/// Evaluate the basis function `U(n, l; ρ, θ)`.
///
/// Returns exactly `0.0` for `ρ > 1` (the caller masks the aperture boundary
/// anyway, but vectorized grid evaluation must not see NaN there).
pub fn zernike_value(idx: ZernikeIndex, rho: f64, theta: f64) -> f64 {
    if rho > 1.0 {
        return 0.0;
    }
    let m = idx.l.unsigned_abs();
    let radial = radial_polynomial(idx.n, m, rho);
    let mf = m as f64;
    if idx.l >= 0 {
        radial * (mf * theta).cos()
    } else {
        radial * (mf * theta).sin()
    }
}
