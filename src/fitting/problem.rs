//! Least-squares problem binding the forward model to the observations.
//!
//! [`BeamProblem`] implements the `levenberg_marquardt` crate's
//! [`LeastSquaresProblem`] over the **free** sub-vector of the parameters:
//! fixed slots are re-inserted by the mask before every forward evaluation
//! and contribute nothing to the Jacobian.
//!
//! One residual evaluation runs the forward model once per defocus sign,
//! resamples each pattern onto that map's irregular coordinates, min-max
//! normalizes the resampled model vector (mirroring the load-time
//! normalization of the observed side, over the same coordinate set) and
//! concatenates `(model − observed)` in the fixed minus/zero/plus order.
//! The squared L2 norm of that vector is exactly the minimized objective; no
//! weighting or robust loss is applied. Grids and field buffers live and die
//! inside a single evaluation — the residual is a pure function of the
//! parameter vector.

use itertools::izip;
use levenberg_marquardt::LeastSquaresProblem;
use nalgebra::{DMatrix, DVector, Dyn, Matrix, Owned, Vector};

use crate::aperture::{aperture_field, ApertureGrid};
use crate::fitting::mask::ParameterMask;
use crate::illumination::Illumination;
use crate::math::normalize;
use crate::observations::ObservationSet;
use crate::radiation::{radiation_pattern, Fft2};
use crate::telescope::Telescope;
use crate::zernike::ZernikeIndex;

pub(crate) struct BeamProblem<'a> {
    obs: &'a ObservationSet,
    telescope: &'a Telescope,
    illumination: Illumination,
    indices: Vec<ZernikeIndex>,
    mask: ParameterMask,
    grid_size: usize,
    box_factor: f64,
    free: DVector<f64>,
}

impl<'a> BeamProblem<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        obs: &'a ObservationSet,
        telescope: &'a Telescope,
        illumination: Illumination,
        indices: Vec<ZernikeIndex>,
        mask: ParameterMask,
        grid_size: usize,
        box_factor: f64,
        free: DVector<f64>,
    ) -> Self {
        Self {
            obs,
            telescope,
            illumination,
            indices,
            mask,
            grid_size,
            box_factor,
            free,
        }
    }

    pub(crate) fn free(&self) -> &DVector<f64> {
        &self.free
    }

    /// Raw residual at a free-parameter vector. May contain non-finite
    /// entries; the trait wrapper turns those into solver termination while
    /// the fitter records them as a flagged, non-fatal convergence failure.
    pub(crate) fn residual_raw(&self, free: &DVector<f64>) -> DVector<f64> {
        let full = self.mask.scatter(free);
        let illum_n = self.illumination.n_coeff();
        let slice = full.as_slice();
        let (illum_coeff, k) = slice.split_at(illum_n);

        let grid = ApertureGrid::new(self.telescope.radius(), self.box_factor, self.grid_size);
        let mut fft = Fft2::new(self.grid_size);
        let wavelength = self.obs.wavelength();

        let mut residual = Vec::with_capacity(self.obs.n_samples());
        for (_, beam) in self.obs.maps() {
            let field = aperture_field(
                &grid,
                self.telescope,
                self.illumination,
                illum_coeff,
                &self.indices,
                k,
                wavelength,
                beam.d_z,
            );
            let pattern = radiation_pattern(&mut fft, field, &grid, wavelength);
            // renormalize over the observation coordinates so both sides of
            // the difference are min-max normalized over the same sample set
            let mut model: Vec<f64> = izip!(&beam.u, &beam.v)
                .map(|(&u, &v)| pattern.sample(u, v))
                .collect();
            normalize(&mut model);
            for (m, &observed) in izip!(model, &beam.power) {
                residual.push(m - observed);
            }
        }
        DVector::from_vec(residual)
    }

    /// Forward-difference Jacobian at a free-parameter vector, or `None` when
    /// any evaluation turns non-finite.
    pub(crate) fn jacobian_raw(&self, free: &DVector<f64>) -> Option<DMatrix<f64>> {
        let base = self.residual_raw(free);
        if !base.iter().all(|v| v.is_finite()) {
            return None;
        }
        let m = base.len();
        let p = free.len();
        let mut jacobian = DMatrix::zeros(m, p);
        for j in 0..p {
            let step = f64::EPSILON.sqrt() * free[j].abs().max(1.0);
            let mut perturbed = free.clone();
            perturbed[j] += step;
            let shifted = self.residual_raw(&perturbed);
            if !shifted.iter().all(|v| v.is_finite()) {
                return None;
            }
            jacobian.set_column(j, &((shifted - &base) / step));
        }
        Some(jacobian)
    }
}

impl LeastSquaresProblem<f64, Dyn, Dyn> for BeamProblem<'_> {
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, Dyn>;
    type ParameterStorage = Owned<f64, Dyn>;

    fn set_params(&mut self, x: &Vector<f64, Dyn, Self::ParameterStorage>) {
        self.free.copy_from(x);
    }

    fn params(&self) -> Vector<f64, Dyn, Self::ParameterStorage> {
        self.free.clone()
    }

    fn residuals(&self) -> Option<Vector<f64, Dyn, Self::ResidualStorage>> {
        let residual = self.residual_raw(&self.free);
        residual.iter().all(|v| v.is_finite()).then_some(residual)
    }

    fn jacobian(&self) -> Option<Matrix<f64, Dyn, Dyn, Self::JacobianStorage>> {
        self.jacobian_raw(&self.free)
    }
}
