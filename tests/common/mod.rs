//! Shared fixtures for the integration suite: one synthetic observing scene
//! with Effelsberg-like scale (50 m dish, 9 mm wavelength, 22 mm defocus)
//! sampled finely enough for the tests while keeping the FFT grid small.

use rand::rngs::StdRng;
use rand::SeedableRng;

use oofit::illumination::Illumination;
use oofit::observations::ObservationSet;
use oofit::telescope::Telescope;

pub const PR: f64 = 50.0;
pub const WAVELENGTH: f64 = 9e-3;
pub const DEFOCUS: f64 = 2.2e-2;
pub const GRID_SIZE: usize = 64;
pub const BOX_FACTOR: f64 = 5.0;
pub const EXTENT: f64 = 5e-4;
pub const N_PER_SIDE: usize = 11;

/// Unobstructed 50 m dish; blockage shadows would obscure most properties
/// under test without changing the machinery being exercised.
pub fn clear_telescope() -> Telescope {
    Telescope::clear_aperture(PR, 30.0, 387.4)
}

/// Noiseless (or noise-injected) observations generated from a known
/// aperture state.
pub fn synthetic_set(
    illumination: Illumination,
    illum_coeff: &[f64],
    k: &[f64],
    order: u32,
    noise_sigma: f64,
    seed: u64,
) -> ObservationSet {
    let mut rng = StdRng::seed_from_u64(seed);
    ObservationSet::synthetic(
        &clear_telescope(),
        illumination,
        illum_coeff,
        k,
        order,
        WAVELENGTH,
        DEFOCUS,
        EXTENT,
        N_PER_SIDE,
        GRID_SIZE,
        BOX_FACTOR,
        noise_sigma,
        &mut rng,
    )
    .expect("synthetic observation set")
}
