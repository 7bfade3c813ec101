//! A flat-phase aperture with a centred circular taper: the in-focus pattern
//! must carry the symmetries of the aperture, and a fit started exactly at
//! the generating parameters must terminate with a vanishing residual.

mod common;

use approx::assert_abs_diff_eq;

use oofit::aperture::{aperture_field, ApertureGrid};
use oofit::fitting::{fit_beam, FitParams, ParameterMask};
use oofit::illumination::Illumination;
use oofit::radiation::{radiation_pattern, Fft2};
use oofit::zernike::zernike_indices;

#[test]
fn test_in_focus_pattern_symmetries() {
    let n = common::GRID_SIZE;
    let grid = ApertureGrid::new(common::PR, common::BOX_FACTOR, n);
    let tel = common::clear_telescope();
    let ill = Illumination::Gaussian;
    let indices = zernike_indices(1);
    let k = vec![0.0; indices.len()];

    let field = aperture_field(
        &grid,
        &tel,
        ill,
        &ill.default_coeff(),
        &indices,
        &k,
        common::WAVELENGTH,
        0.0,
    );
    let mut fft = Fft2::new(n);
    let pattern = radiation_pattern(&mut fft, field, &grid, common::WAVELENGTH);

    for i in 1..n {
        for j in 1..n {
            let p = pattern.power[(i, j)];
            // a circularly symmetric aperture is invariant under u <-> v
            assert_abs_diff_eq!(p, pattern.power[(j, i)], epsilon = 1e-9);
            // a real aperture field has a point-symmetric power spectrum
            assert_abs_diff_eq!(p, pattern.power[(n - i, n - j)], epsilon = 1e-9);
        }
    }
}

#[test]
fn test_fit_started_at_truth_is_immediately_converged() {
    let ill = Illumination::Gaussian;
    let truth_illum = ill.default_coeff();
    let truth_k = vec![0.0; 3];
    let obs = common::synthetic_set(ill, &truth_illum, &truth_k, 1, 0.0, 3);

    let mut mask = ParameterMask::standard(ill, 1);
    for (i, &value) in truth_illum.iter().enumerate() {
        mask = mask.with_fixed(i, value);
    }
    let params = FitParams::builder(common::clear_telescope(), ill)
        .max_order(1)
        .grid_size(common::GRID_SIZE)
        .box_factor(common::BOX_FACTOR)
        .max_iterations(50)
        .tolerance(1e-10)
        .illumination_start(truth_illum)
        .mask(mask)
        .build()
        .unwrap();

    let results = fit_beam(&obs, &params).unwrap();
    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert!(result.converged, "{result}");
    assert!(result.objective < 1e-16, "objective {}", result.objective);
    for &r in result.residual.iter() {
        assert!(r.abs() < 1e-10, "residual entry {r}");
    }
    // the solution must not have drifted off the generating parameters
    assert!(result.params.k[1].abs() < 1e-8);
    assert!(result.params.k[2].abs() < 1e-8);
}
