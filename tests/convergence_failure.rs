//! Convergence trouble is reported on the affected order, never as a crate
//! error: the progressive sequence always yields one result per order.

mod common;

use oofit::fitting::{fit_beam, FitParams, ParameterMask};
use oofit::illumination::Illumination;
use oofit::observations::{BeamMap, ObservationSet};

/// A regular angular grid with one corrupted (NaN) power sample.
fn corrupted_map(d_z: f64, poison: bool) -> BeamMap {
    let coords: [f64; 5] = [-2e-4, -1e-4, 0.0, 1e-4, 2e-4];
    let mut u = Vec::new();
    let mut v = Vec::new();
    let mut power = Vec::new();
    for &vv in &coords {
        for &uu in &coords {
            u.push(uu);
            v.push(vv);
            // a crude beam-like bump, the shape is irrelevant here
            power.push((-((uu * uu + vv * vv) / 1e-8)).exp());
        }
    }
    if poison {
        power[12] = f64::NAN;
    }
    BeamMap::new(u, v, power, d_z, common::WAVELENGTH).unwrap()
}

#[test]
fn test_non_finite_observation_flags_every_order() {
    let obs = ObservationSet::new(
        corrupted_map(-common::DEFOCUS, false),
        corrupted_map(0.0, true),
        corrupted_map(common::DEFOCUS, false),
    )
    .unwrap();

    let ill = Illumination::Gaussian;
    let params = FitParams::builder(common::clear_telescope(), ill)
        .max_order(2)
        .grid_size(32)
        .box_factor(common::BOX_FACTOR)
        .max_iterations(10)
        .build()
        .unwrap();

    let results = fit_beam(&obs, &params).unwrap();
    assert_eq!(results.len(), 2);
    for result in &results {
        assert!(!result.converged, "order {} converged on NaN data", result.order);
        assert!(result.covariance.is_none());
        assert!(result.correlation.is_none());
        assert!(result.residual.iter().any(|r| r.is_nan()));
    }
}

#[test]
fn test_exhausted_patience_still_yields_all_orders() {
    let ill = Illumination::Gaussian;
    let truth_illum = ill.default_coeff();
    // strongly noisy data with an unreachable tolerance and almost no patience
    let obs = common::synthetic_set(ill, &truth_illum, &[0.0; 3], 1, 0.05, 99);

    let mut mask = ParameterMask::standard(ill, 3);
    for (i, &value) in truth_illum.iter().enumerate() {
        mask = mask.with_fixed(i, value);
    }
    let params = FitParams::builder(common::clear_telescope(), ill)
        .max_order(3)
        .grid_size(32)
        .box_factor(common::BOX_FACTOR)
        .max_iterations(2)
        .tolerance(1e-15)
        .illumination_start(truth_illum)
        .mask(mask)
        .build()
        .unwrap();

    let results = fit_beam(&obs, &params).unwrap();
    assert_eq!(results.len(), 3);
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.order, i as u32 + 1);
        // the unreachable tolerance guarantees the solver runs out of
        // patience, so every order comes back flagged
        assert!(!result.converged, "order {} claims convergence", result.order);
        assert_eq!(result.residual.len(), obs.n_samples());
        assert!(result.residual.iter().all(|r| r.is_finite()));
        // noise cannot be fitted away, the objective stays well off zero
        assert!(result.objective > 1e-6);
    }
}
