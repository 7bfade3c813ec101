//! # Progressive nonlinear beam fitting
//!
//! This module defines the [`FitParams`] configuration struct and its
//! builder, which control the progressive least-squares fit, and
//! [`fit_beam`], the fit driver itself.
//!
//! ## Pipeline overview
//!
//! 1. **Validation** — configuration (mask alignment, grid size, order range)
//!    and observation consistency are checked before any computation; errors
//!    here are fatal and nothing is fitted.
//!
//! 2. **Progressive orders** — for each polynomial order `1 ..= max_order`:
//!    * *Init* — the basis enumeration for the order is built; the starting
//!      vector comes from the caller for order 1 and, when warm starting is
//!      enabled, from the previous order's solution (illumination copied
//!      unchanged, Zernike part zero-padded) afterwards.
//!    * *Optimize* — a Levenberg–Marquardt solver minimizes the concatenated
//!      minus/zero/plus residual over the mask-filtered free parameters.
//!    * *Record* — an immutable [`FitResult`] snapshots the solution,
//!      residual, gradient and covariance/correlation; a solver that ran out
//!      of patience or went non-finite yields a result flagged
//!      `converged: false`, never an error, and the sequence continues.
//!
//! 3. **Output** — the ordered sequence of per-order results, one per order.
//!
//! Orders run strictly sequentially: each depends on the previous order's
//! solution through the warm start. Within one residual evaluation the three
//! defocus-sign forward models are independent pure computations with no
//! shared mutable state.
//!
//! ## Example
//!
//! ```rust,no_run
//! use oofit::fitting::{fit_beam, FitParams};
//! use oofit::illumination::Illumination;
//! use oofit::observations::ObservationSet;
//! use oofit::telescope::Telescope;
//!
//! let params = FitParams::builder(Telescope::Effelsberg, Illumination::ParabolicTaper)
//!     .max_order(5)
//!     .grid_size(1 << 10)
//!     .build()
//!     .unwrap();
//!
//! # let observations: ObservationSet = unimplemented!();
//! let results = fit_beam(&observations, &params).unwrap();
//! for result in &results {
//!     println!("{result}");
//! }
//! ```

pub mod mask;
pub mod params;
pub(crate) mod problem;
pub mod result;

use levenberg_marquardt::LevenbergMarquardt;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BOX_FACTOR, DEFAULT_GRID_SIZE, MIN_GRID_SIZE};
use crate::illumination::Illumination;
use crate::observations::ObservationSet;
use crate::oofit_errors::OofitError;
use crate::telescope::Telescope;
use crate::zernike::{basis_len, zernike_indices};

pub use mask::{ParameterMask, Slot};
pub use params::ParameterVector;
pub use result::FitResult;

use problem::BeamProblem;

/// Configuration of a progressive beam fit.
///
/// Built through [`FitParams::builder`], which validates on
/// [`build`](FitParamsBuilder::build); [`fit_beam`] re-validates, so a
/// hand-assembled instance cannot smuggle an inconsistent configuration past
/// the checks.
///
/// Fields
/// -----------------
/// * `telescope` – geometry provider (blockage + OPD).
/// * `illumination` – taper variant; its coefficient count sets the layout of
///   the parameter vector and mask.
/// * `max_order` – highest Zernike order fitted, `≥ 1`.
/// * `warm_start` – seed each order from the previous order's solution.
/// * `grid_size` – aperture-grid side, a power of two (transform efficiency).
/// * `box_factor` – box oversampling of the aperture plane.
/// * `max_iterations` – solver patience per order.
/// * `tolerance` – solver ftol/xtol.
/// * `illumination_start` – starting illumination coefficients for order 1
///   (and for every order when warm start is disabled).
/// * `mask` – free/fixed record sized for `max_order`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitParams {
    pub telescope: Telescope,
    pub illumination: Illumination,
    pub max_order: u32,
    pub warm_start: bool,
    pub grid_size: usize,
    pub box_factor: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
    pub illumination_start: Vec<f64>,
    pub mask: ParameterMask,
}

impl FitParams {
    /// Create a new [`FitParamsBuilder`] with defaults for the given
    /// telescope and illumination variant.
    pub fn builder(telescope: Telescope, illumination: Illumination) -> FitParamsBuilder {
        FitParamsBuilder::new(telescope, illumination)
    }

    /// Reject inconsistent configuration before any computation.
    pub fn validate(&self) -> Result<(), OofitError> {
        self.telescope.validate()?;
        if self.max_order < 1 {
            return Err(OofitError::InvalidMaxOrder(self.max_order));
        }
        if self.grid_size < MIN_GRID_SIZE || !self.grid_size.is_power_of_two() {
            return Err(OofitError::InvalidGridSize(self.grid_size));
        }
        if !(self.box_factor > 0.0 && self.box_factor.is_finite()) {
            return Err(OofitError::InvalidBoxFactor(self.box_factor));
        }
        let illum_n = self.illumination.n_coeff();
        if self.illumination_start.len() != illum_n {
            return Err(OofitError::IlluminationStartLength {
                expected: illum_n,
                got: self.illumination_start.len(),
            });
        }
        let full_len = illum_n + basis_len(self.max_order);
        if self.mask.len() != full_len {
            return Err(OofitError::MaskLengthMismatch {
                expected: full_len,
                got: self.mask.len(),
            });
        }
        // a mask may only fix slots; every per-order truncation must keep at
        // least one parameter to optimize
        for order in 1..=self.max_order {
            self.mask
                .truncated(illum_n + basis_len(order))
                .validate(order)?;
        }
        Ok(())
    }
}

/// Builder for [`FitParams`], with validation.
#[derive(Debug, Clone)]
pub struct FitParamsBuilder {
    params: FitParams,
    mask_overridden: bool,
}

impl FitParamsBuilder {
    /// Defaults: order 5, warm start on, the crate's default grid, solver
    /// patience 100 at tolerance `1e-8`, the variant's conventional starting
    /// coefficients and the standard mask (piston held at zero).
    pub fn new(telescope: Telescope, illumination: Illumination) -> Self {
        let max_order = 5;
        Self {
            params: FitParams {
                telescope,
                illumination,
                max_order,
                warm_start: true,
                grid_size: DEFAULT_GRID_SIZE,
                box_factor: DEFAULT_BOX_FACTOR,
                max_iterations: 100,
                tolerance: 1e-8,
                illumination_start: illumination.default_coeff(),
                mask: ParameterMask::standard(illumination, max_order),
            },
            mask_overridden: false,
        }
    }

    pub fn max_order(mut self, v: u32) -> Self {
        self.params.max_order = v;
        self
    }
    pub fn warm_start(mut self, v: bool) -> Self {
        self.params.warm_start = v;
        self
    }
    pub fn grid_size(mut self, v: usize) -> Self {
        self.params.grid_size = v;
        self
    }
    pub fn box_factor(mut self, v: f64) -> Self {
        self.params.box_factor = v;
        self
    }
    pub fn max_iterations(mut self, v: usize) -> Self {
        self.params.max_iterations = v;
        self
    }
    pub fn tolerance(mut self, v: f64) -> Self {
        self.params.tolerance = v;
        self
    }
    pub fn illumination_start(mut self, v: Vec<f64>) -> Self {
        self.params.illumination_start = v;
        self
    }
    pub fn mask(mut self, v: ParameterMask) -> Self {
        self.params.mask = v;
        self.mask_overridden = true;
        self
    }

    /// Validate and build the configuration.
    pub fn build(mut self) -> Result<FitParams, OofitError> {
        if !self.mask_overridden {
            // the default mask tracks whatever max_order ended up being
            self.params.mask =
                ParameterMask::standard(self.params.illumination, self.params.max_order);
        }
        self.params.validate()?;
        Ok(self.params)
    }
}

/// Covariance and correlation of the free parameters at a solution.
///
/// `cov = (JᵀJ)⁻¹ · rss/(m − p)` with `m` residual entries and `p` free
/// parameters; `corr` is `cov` normalized by its own diagonal. Returns `None`
/// when `JᵀJ` is rank-deficient, the diagonal is non-positive, or `m ≤ p` —
/// the per-order result then reports the matrices as undefined.
pub fn co_matrices(
    residual: &DVector<f64>,
    jacobian: &DMatrix<f64>,
) -> Option<(DMatrix<f64>, DMatrix<f64>)> {
    let m = residual.len();
    let p = jacobian.ncols();
    if m <= p {
        return None;
    }
    let jtj = jacobian.transpose() * jacobian;
    let inverse = jtj.try_inverse()?;
    let covariance = inverse * (residual.norm_squared() / (m - p) as f64);
    if !covariance.iter().all(|v| v.is_finite()) {
        return None;
    }
    let mut correlation = DMatrix::zeros(p, p);
    for i in 0..p {
        for j in 0..p {
            let denom = covariance[(i, i)] * covariance[(j, j)];
            if denom <= 0.0 {
                return None;
            }
            correlation[(i, j)] = covariance[(i, j)] / denom.sqrt();
        }
    }
    Some((covariance, correlation))
}

/// Fit the aperture phase-error expansion to three defocused beam maps,
/// progressively over polynomial order.
///
/// Arguments
/// -----------------
/// * `obs` – validated observation triple (minus/zero/plus defocus).
/// * `params` – fit configuration; re-validated here so configuration errors
///   surface before the first forward-model evaluation.
///
/// Return
/// ----------
/// * The ordered sequence of per-order [`FitResult`], `params.max_order`
///   entries. Convergence failures are flagged on the affected order and do
///   not interrupt the sequence.
pub fn fit_beam(
    obs: &ObservationSet,
    params: &FitParams,
) -> Result<Vec<FitResult>, OofitError> {
    params.validate()?;

    let illum_n = params.illumination.n_coeff();
    let mut results: Vec<FitResult> = Vec::with_capacity(params.max_order as usize);
    let mut warm: Option<ParameterVector> = None;

    for order in 1..=params.max_order {
        // Init(order): basis enumeration and starting vector
        let indices = zernike_indices(order);
        let mask = params.mask.truncated(illum_n + indices.len());
        let start = match (&warm, params.warm_start) {
            (Some(previous), true) => previous.padded_to_order(order),
            _ => ParameterVector::new(
                &params.illumination_start,
                &vec![0.0; indices.len()],
            ),
        };
        let mut full = start.to_dvector();
        mask.apply_fixed(&mut full);
        let free = mask.gather(&full);

        // Optimizing(order)
        let problem = BeamProblem::new(
            obs,
            &params.telescope,
            params.illumination,
            indices,
            mask.clone(),
            params.grid_size,
            params.box_factor,
            free,
        );
        let solver = LevenbergMarquardt::new()
            .with_patience(params.max_iterations)
            .with_ftol(params.tolerance)
            .with_xtol(params.tolerance);
        let (solved, report) = solver.minimize(problem);

        // Recorded(order)
        let free = solved.free().clone();
        let solution = ParameterVector::from_dvector(illum_n, &mask.scatter(&free));
        let residual = solved.residual_raw(&free);
        let residual_finite = residual.iter().all(|v| v.is_finite());
        let jacobian = solved.jacobian_raw(&free);
        let (gradient, covariance, correlation) = match &jacobian {
            Some(jac) if residual_finite => {
                let gradient = jac.transpose() * &residual;
                match co_matrices(&residual, jac) {
                    Some((cov, corr)) => (gradient, Some(cov), Some(corr)),
                    None => (gradient, None, None),
                }
            }
            _ => (DVector::zeros(free.len()), None, None),
        };

        results.push(FitResult {
            order,
            illumination: params.illumination,
            params: solution.clone(),
            mask,
            residual,
            gradient,
            covariance,
            correlation,
            converged: residual_finite && report.termination.was_successful(),
            n_evaluations: report.number_of_evaluations,
            objective: report.objective_function,
        });
        warm = Some(solution);
    }

    Ok(results)
}
