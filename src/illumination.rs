//! # Illumination functions
//!
//! Amplitude taper of the receiver across the aperture plane. Two variants are
//! supported, forming a closed set with a fixed functional signature rather
//! than a by-name plugin lookup:
//!
//! - [`Illumination::ParabolicTaper`] – `amp · (c + (1 − c)(1 − ρ'²)^q)` with
//!   the edge level `c = 10^(taper_dB/20)` and a shape exponent `q`;
//!   5 coefficients `[amplitude, taper_dB, taper_order, offset_x, offset_y]`.
//! - [`Illumination::Gaussian`] – `amp · exp(ρ'² · ln 10^(taper_dB/20))`, i.e.
//!   a Gaussian whose edge (`ρ' = 1`) sits `taper_dB` below the peak; it has
//!   **no shape exponent**, so only 4 coefficients
//!   `[amplitude, taper_dB, offset_x, offset_y]`.
//!
//! `ρ'` is the radius normalized by the primary radius, measured from the
//! illumination offset `(offset_x, offset_y)`.
//!
//! The coefficient count is **variant metadata** ([`Illumination::n_coeff`]):
//! the parameter-vector length, the mask alignment and the position of the
//! first Zernike coefficient all derive from it, so no fixed-length
//! assumption exists anywhere in the fitter.

use serde::{Deserialize, Serialize};

/// Illumination taper variant. See the module documentation for the formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Illumination {
    /// Parabolic taper on a pedestal, 5 coefficients.
    ParabolicTaper,
    /// Gaussian taper, 4 coefficients (no shape exponent).
    Gaussian,
}

impl Illumination {
    /// Number of illumination coefficients carried by this variant.
    pub fn n_coeff(&self) -> usize {
        match self {
            Illumination::ParabolicTaper => 5,
            Illumination::Gaussian => 4,
        }
    }

    /// Coefficient names in parameter-vector order, for result labeling.
    pub fn coeff_names(&self) -> &'static [&'static str] {
        match self {
            Illumination::ParabolicTaper => {
                &["i_amp", "c_dB", "q", "x0", "y0"]
            }
            Illumination::Gaussian => &["i_amp", "c_dB", "x0", "y0"],
        }
    }

    /// Conventional starting coefficients for a fit.
    pub fn default_coeff(&self) -> Vec<f64> {
        match self {
            Illumination::ParabolicTaper => vec![1.0, -14.0, 1.4, 0.0, 0.0],
            Illumination::Gaussian => vec![1.0, -14.0, 0.0, 0.0],
        }
    }

    /// Evaluate the taper amplitude at aperture-plane point `(x, y)`.
    ///
    /// Arguments
    /// -----------------
    /// * `x`, `y` – aperture-plane coordinates in meters.
    /// * `pr` – primary reflector radius in meters.
    /// * `coeff` – illumination coefficients, `self.n_coeff()` entries in the
    ///   order given by [`Illumination::coeff_names`].
    ///
    /// The function is total over the plane: beyond the physical edge
    /// (`ρ' > 1`) the parabolic branch clamps its base to zero instead of
    /// raising a negative number to a fractional power. The aperture model
    /// forces the field to zero there regardless.
    pub fn amplitude(&self, x: f64, y: f64, pr: f64, coeff: &[f64]) -> f64 {
        debug_assert_eq!(coeff.len(), self.n_coeff());
        match self {
            Illumination::ParabolicTaper => {
                let (amp, c_db, q, x0, y0) = (coeff[0], coeff[1], coeff[2], coeff[3], coeff[4]);
                let c = 10f64.powf(c_db / 20.0);
                let rho2 = ((x - x0).powi(2) + (y - y0).powi(2)) / (pr * pr);
                let base = (1.0 - rho2).max(0.0);
                amp * (c + (1.0 - c) * base.powf(q))
            }
            Illumination::Gaussian => {
                let (amp, c_db, x0, y0) = (coeff[0], coeff[1], coeff[2], coeff[3]);
                let rho2 = ((x - x0).powi(2) + (y - y0).powi(2)) / (pr * pr);
                // ln(10^(c_dB/20)) < 0 for a negative edge taper
                amp * (rho2 * c_db / 20.0 * std::f64::consts::LN_10).exp()
            }
        }
    }
}
