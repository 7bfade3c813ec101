//! # Shared numerical helpers
//!
//! Small, allocation-light routines used across the aperture model, the forward
//! transform and the fitter: Cartesian/polar conversion, uniform sampling of an
//! interval, min-max normalization and root-mean-square.
//!
//! All helpers are pure functions of their inputs; none of them touches crate state.

/// Convert Cartesian coordinates to polar coordinates.
///
/// Arguments
/// -----------------
/// * `x`, `y` – Cartesian coordinates.
///
/// Return
/// ----------
/// * `(rho, theta)` – radius and angle in radians, with `theta = atan2(y, x)`
///   in `(-π, π]`.
#[inline]
pub fn cart2pol(x: f64, y: f64) -> (f64, f64) {
    (x.hypot(y), y.atan2(x))
}

/// Sample `n` evenly spaced values over the closed interval `[start, stop]`.
///
/// With `n == 1` the single sample is `start`. The last sample is exactly
/// `stop` for `n > 1`, which keeps grid extents bit-reproducible between the
/// aperture plane and its transform axes.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![start];
    }
    let step = (stop - start) / (n - 1) as f64;
    (0..n)
        .map(|i| {
            if i == n - 1 {
                stop
            } else {
                start + step * i as f64
            }
        })
        .collect()
}

/// Min-max normalize `values` in place so the result lies in `[0, 1]`.
///
/// A constant input (zero span) is mapped to all zeros rather than dividing by
/// zero; the fitter treats such a pattern as fully dark.
///
/// Return
/// ----------
/// * `(min, max)` – the extrema of the input before normalization.
pub fn normalize(values: &mut [f64]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values.iter() {
        min = min.min(v);
        max = max.max(v);
    }
    let span = max - min;
    if span > 0.0 {
        for v in values.iter_mut() {
            *v = (*v - min) / span;
        }
    } else {
        for v in values.iter_mut() {
            *v = 0.0;
        }
    }
    (min, max)
}

/// Root-mean-square of a sample set.
///
/// Used to report the RMS of a reconstructed phase-error map over the
/// unobstructed aperture. Returns `0.0` for an empty slice.
pub fn rms(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = values.iter().map(|v| v * v).sum();
    (sum_sq / values.len() as f64).sqrt()
}
