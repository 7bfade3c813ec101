//! # Per-order fit result
//!
//! [`FitResult`] is the immutable snapshot taken when one polynomial order of
//! the progressive fit concludes: the full parameter vector (fixed slots at
//! their held values), the final residual and gradient, and the
//! covariance/correlation of the **free** parameters.
//!
//! Numerical trouble is carried as metadata, never as an error:
//!
//! - `converged == false` flags an order that hit the iteration cap or
//!   produced a non-finite residual; the progressive fitter records the
//!   best-so-far state and moves on, callers decide whether to trust it.
//! - `covariance`/`correlation` are `None` when `JᵀJ` is rank-deficient at
//!   the solution (over-fit, or too few samples relative to free
//!   parameters); the entries are undefined rather than the order aborted.

use nalgebra::{DMatrix, DVector};

use crate::aperture::phase_map;
use crate::constants::{Meter, Radian};
use crate::fitting::mask::ParameterMask;
use crate::fitting::params::ParameterVector;
use crate::illumination::Illumination;
use crate::math::rms;
use crate::zernike::{zernike_indices, ZernikeIndex};

/// Outcome of one polynomial order. Created once by the progressive fitter,
/// immutable afterwards; the latest result seeds the next order's warm start.
#[derive(Debug, Clone)]
pub struct FitResult {
    /// Polynomial order this result belongs to.
    pub order: u32,
    /// Illumination variant the fit ran with (determines parameter labels).
    pub illumination: Illumination,
    /// Full solution vector, fixed slots at their held values.
    pub params: ParameterVector,
    /// The mask the order was optimized under.
    pub mask: ParameterMask,
    /// Final residual vector in minus/zero/plus order.
    pub residual: DVector<f64>,
    /// Gradient `Jᵀ·r` at the solution, over the free parameters.
    pub gradient: DVector<f64>,
    /// Covariance `(JᵀJ)⁻¹ · rss/(m − p)` of the free parameters, `None` when
    /// `JᵀJ` is not invertible at the solution.
    pub covariance: Option<DMatrix<f64>>,
    /// Correlation matrix (covariance normalized by its own diagonal), `None`
    /// alongside `covariance`.
    pub correlation: Option<DMatrix<f64>>,
    /// `false` when the solver hit its iteration cap or went non-finite.
    pub converged: bool,
    /// Residual evaluations spent by the solver.
    pub n_evaluations: usize,
    /// Final objective `‖r‖²/2` reported by the solver.
    pub objective: f64,
}

impl FitResult {
    /// Basis-index enumeration this result's `K_coeff` follows, for labeling.
    pub fn basis_indices(&self) -> Vec<ZernikeIndex> {
        zernike_indices(self.order)
    }

    /// Reconstruct the phase-error map of this solution over `[-pr, pr]²`.
    ///
    /// Delegates to [`phase_map`]; `notilt` removes piston and tilt before
    /// synthesis, the conventional presentation of a phase-error map.
    pub fn phase_map(&self, pr: Meter, size: usize, notilt: bool) -> (Vec<Meter>, DMatrix<f64>) {
        phase_map(&self.params.k, self.order, pr, size, notilt)
    }

    /// RMS of the reconstructed phase-error surface over the aperture disk.
    /// The conventional single-number quality figure of a solution;
    /// out-of-disk samples do not contribute.
    pub fn phase_error_rms(&self, pr: Meter, size: usize, notilt: bool) -> Radian {
        let (axis, map) = self.phase_map(pr, size, notilt);
        let mut in_aperture = Vec::new();
        for (row, &y) in axis.iter().enumerate() {
            for (col, &x) in axis.iter().enumerate() {
                if x.hypot(y) <= pr {
                    in_aperture.push(map[(row, col)]);
                }
            }
        }
        rms(&in_aperture)
    }
}

impl std::fmt::Display for FitResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "order {} — {}, {} evaluations, objective {:.3e}",
            self.order,
            if self.converged {
                "converged"
            } else {
                "convergence failed"
            },
            self.n_evaluations,
            self.objective,
        )?;
        for (name, value) in self
            .illumination
            .coeff_names()
            .iter()
            .zip(self.params.illumination.iter())
        {
            writeln!(f, "  {name:>8} = {value:+.6e}")?;
        }
        for (idx, value) in self.basis_indices().iter().zip(self.params.k.iter()) {
            writeln!(f, "  {idx} = {value:+.6e}")?;
        }
        if self.covariance.is_none() {
            writeln!(f, "  covariance: undefined (rank-deficient J^T J)")?;
        }
        Ok(())
    }
}
