//! # Aperture model
//!
//! Builds the complex field over a discretized aperture plane from the fit
//! parameters: illumination taper × blockage mask × `exp(i·[φ + (2π/λ)·OPD])`,
//! where the phase-error map `φ` is the Zernike-weighted sum
//! `2π·Σ Kᵢ·Uᵢ(ρ, θ)` and the OPD term encodes the intentional defocus.
//!
//! The grid ([`ApertureGrid`]) is created fresh for every forward-model
//! evaluation, owned exclusively by it and discarded afterwards; the model is
//! a pure function of the parameter vector with no cached state.
//!
//! [`phase_map`] reconstructs the scalar phase surface from any coefficient
//! vector independently of a fit, for rendering and RMS reporting.

mod field;
mod grid;

pub use field::{aperture_field, phase_map, phase_value};
pub use grid::ApertureGrid;
