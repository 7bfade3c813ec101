//! # Observation containers
//!
//! Data model for the three simultaneous defocused beam maps consumed by the
//! fitter. The loading collaborator (FITS/file I/O) is outside this crate; it
//! hands over three aligned `(u, v, power)` sample sets, one per defocus sign,
//! with their defocus distances and the shared wavelength.
//!
//! Observed powers are min-max normalized **once, at construction** — the
//! residual engine compares them against model patterns normalized by their
//! own extrema, so both sides live in `[0, 1]`.
//!
//! [`ObservationSet::synthetic`] generates noiseless or noise-injected
//! observations from a known parameter vector, for round-trip validation and
//! simulation studies.

use itertools::izip;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::aperture::{aperture_field, ApertureGrid};
use crate::constants::{Meter, Radian};
use crate::illumination::Illumination;
use crate::math::normalize;
use crate::oofit_errors::OofitError;
use crate::radiation::{radiation_pattern, Fft2};
use crate::telescope::Telescope;
use crate::zernike::zernike_indices;

/// Tag of one defocus sign. The residual engine concatenates the three
/// difference vectors in the fixed order `Minus`, `Zero`, `Plus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefocusTag {
    /// Sub-reflector pulled in (`d_z < 0` by convention).
    Minus,
    /// In-focus map, `d_z = 0` by definition.
    Zero,
    /// Sub-reflector pushed out (`d_z > 0` by convention).
    Plus,
}

impl std::fmt::Display for DefocusTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefocusTag::Minus => write!(f, "minus"),
            DefocusTag::Zero => write!(f, "zero"),
            DefocusTag::Plus => write!(f, "plus"),
        }
    }
}

/// One observed beam map: unordered `(u, v, power)` samples plus the defocus
/// distance of its tag and the observing wavelength.
#[derive(Debug, Clone)]
pub struct BeamMap {
    /// Angular coordinate of each sample.
    pub u: Vec<Radian>,
    /// Angular coordinate of each sample.
    pub v: Vec<Radian>,
    /// Observed power, min-max normalized to `[0, 1]` at construction.
    pub power: Vec<f64>,
    /// Axial sub-reflector offset, signed; `0.0` for the in-focus map.
    pub d_z: Meter,
    /// Observing wavelength.
    pub wavelength: Meter,
}

impl BeamMap {
    /// Build a beam map, normalizing `power` in place.
    ///
    /// Fails with [`OofitError::SampleLengthMismatch`] when the three arrays
    /// disagree in length, or [`OofitError::InvalidWavelength`] for a
    /// non-positive wavelength.
    pub fn new(
        u: Vec<Radian>,
        v: Vec<Radian>,
        mut power: Vec<f64>,
        d_z: Meter,
        wavelength: Meter,
    ) -> Result<Self, OofitError> {
        if u.len() != v.len() || u.len() != power.len() {
            return Err(OofitError::SampleLengthMismatch {
                u_len: u.len(),
                v_len: v.len(),
                power_len: power.len(),
            });
        }
        if !(wavelength > 0.0 && wavelength.is_finite()) {
            return Err(OofitError::InvalidWavelength(wavelength));
        }
        normalize(&mut power);
        Ok(Self {
            u,
            v,
            power,
            d_z,
            wavelength,
        })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.u.len()
    }

    pub fn is_empty(&self) -> bool {
        self.u.is_empty()
    }

    /// Signal-to-noise ratio of the map: peak power over the standard
    /// deviation of the samples in the annular window at angular distance
    /// `centre` from the beam axis with half-width `radius`.
    ///
    /// The window is chosen by the caller to sit away from the main beam so
    /// its spread estimates the noise floor; a compact beam scores high, a
    /// noisy or strongly defocused one low. Returns `f64::INFINITY` when the
    /// window holds fewer than two samples or is perfectly flat.
    pub fn snr(&self, centre: Radian, radius: Radian) -> f64 {
        let peak = self.power.iter().fold(f64::NEG_INFINITY, |a, &p| a.max(p));
        let window: Vec<f64> = izip!(&self.u, &self.v, &self.power)
            .filter_map(|(&u, &v, &p)| ((u.hypot(v) - centre).abs() <= radius).then_some(p))
            .collect();
        if window.len() < 2 {
            return f64::INFINITY;
        }
        let mean = window.iter().sum::<f64>() / window.len() as f64;
        let variance =
            window.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / window.len() as f64;
        if variance == 0.0 {
            return f64::INFINITY;
        }
        peak / variance.sqrt()
    }
}

/// The three simultaneous defocused observations of one measurement run.
///
/// Validated on construction: the three maps share one wavelength, the
/// in-focus map carries `d_z = 0`, the defocused maps carry a non-zero
/// distance, and no map is empty. Equal-magnitude opposite-sign defocus is a
/// convention of the observing procedure, assumed but not enforced.
#[derive(Debug, Clone)]
pub struct ObservationSet {
    pub minus: BeamMap,
    pub zero: BeamMap,
    pub plus: BeamMap,
}

impl ObservationSet {
    pub fn new(minus: BeamMap, zero: BeamMap, plus: BeamMap) -> Result<Self, OofitError> {
        for (tag, map) in [
            (DefocusTag::Minus, &minus),
            (DefocusTag::Zero, &zero),
            (DefocusTag::Plus, &plus),
        ] {
            if map.is_empty() {
                return Err(OofitError::EmptyBeamMap(tag));
            }
            if map.wavelength != minus.wavelength {
                return Err(OofitError::WavelengthMismatch {
                    expected: minus.wavelength,
                    got: map.wavelength,
                });
            }
        }
        if zero.d_z != 0.0 {
            return Err(OofitError::UnexpectedDefocus(zero.d_z));
        }
        if minus.d_z == 0.0 {
            return Err(OofitError::MissingDefocus(DefocusTag::Minus));
        }
        if plus.d_z == 0.0 {
            return Err(OofitError::MissingDefocus(DefocusTag::Plus));
        }
        Ok(Self { minus, zero, plus })
    }

    /// Shared observing wavelength.
    pub fn wavelength(&self) -> Meter {
        self.zero.wavelength
    }

    /// The three maps in the fixed residual order.
    pub fn maps(&self) -> [(DefocusTag, &BeamMap); 3] {
        [
            (DefocusTag::Minus, &self.minus),
            (DefocusTag::Zero, &self.zero),
            (DefocusTag::Plus, &self.plus),
        ]
    }

    /// Total sample count over the three maps (the residual vector length).
    pub fn n_samples(&self) -> usize {
        self.minus.len() + self.zero.len() + self.plus.len()
    }

    /// Generate a synthetic observation set from a known aperture state.
    ///
    /// Samples the forward model on a regular `n_per_side × n_per_side`
    /// angular grid spanning `[-extent, extent]²` for the defocus distances
    /// `{-d_z, 0, +d_z}`, then perturbs each power sample with zero-mean
    /// Gaussian noise of standard deviation `noise_sigma` (in normalized
    /// power units; pass `0.0` for noiseless data).
    ///
    /// Used by the round-trip tests and available to callers for simulation
    /// studies.
    #[allow(clippy::too_many_arguments)]
    pub fn synthetic<R: Rng + ?Sized>(
        telescope: &Telescope,
        illumination: Illumination,
        illum_coeff: &[f64],
        k: &[f64],
        order: u32,
        wavelength: Meter,
        d_z: Meter,
        extent: Radian,
        n_per_side: usize,
        grid_size: usize,
        box_factor: f64,
        noise_sigma: f64,
        rng: &mut R,
    ) -> Result<Self, OofitError> {
        telescope.validate()?;
        let indices = zernike_indices(order);
        let grid = ApertureGrid::new(telescope.radius(), box_factor, grid_size);
        let mut fft = Fft2::new(grid_size);

        let coords = crate::math::linspace(-extent, extent, n_per_side);
        let mut build = |sign_d_z: f64| -> Result<BeamMap, OofitError> {
            let field = aperture_field(
                &grid,
                telescope,
                illumination,
                illum_coeff,
                &indices,
                k,
                wavelength,
                sign_d_z,
            );
            let pattern = radiation_pattern(&mut fft, field, &grid, wavelength);
            let mut u = Vec::with_capacity(n_per_side * n_per_side);
            let mut v = Vec::with_capacity(n_per_side * n_per_side);
            let mut power = Vec::with_capacity(n_per_side * n_per_side);
            for &vv in &coords {
                for &uu in &coords {
                    let mut p = pattern.sample(uu, vv);
                    if noise_sigma > 0.0 {
                        let noise: f64 = rng.sample(StandardNormal);
                        p += noise_sigma * noise;
                    }
                    u.push(uu);
                    v.push(vv);
                    power.push(p);
                }
            }
            BeamMap::new(u, v, power, sign_d_z, wavelength)
        };

        let minus = build(-d_z)?;
        let zero = build(0.0)?;
        let plus = build(d_z)?;
        ObservationSet::new(minus, zero, plus)
    }
}
