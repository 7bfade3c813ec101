use nalgebra::DMatrix;
use rustfft::num_complex::Complex64;

use crate::aperture::grid::ApertureGrid;
use crate::constants::{Meter, Radian, DPI};
use crate::illumination::Illumination;
use crate::math::{cart2pol, linspace};
use crate::telescope::Telescope;
use crate::zernike::{basis_len, zernike_indices, zernike_value, ZernikeIndex};

/// Phase-error value `2π·Σ Kᵢ·Uᵢ(ρ, θ)` in radians at one polar point.
///
/// `indices` and `k` must follow the enumeration convention of
/// [`zernike_indices`]; the two slices walk in lockstep.
#[inline]
pub fn phase_value(indices: &[ZernikeIndex], k: &[f64], rho: f64, theta: Radian) -> Radian {
    debug_assert_eq!(indices.len(), k.len());
    let sum: f64 = indices
        .iter()
        .zip(k.iter())
        .map(|(&idx, &coeff)| coeff * zernike_value(idx, rho, theta))
        .sum();
    DPI * sum
}

/// Complex aperture field for one defocus distance.
///
/// Arguments
/// -----------------
/// * `grid` – aperture-plane discretization, exclusively owned by this evaluation.
/// * `telescope` – geometry provider (blockage + OPD).
/// * `illumination` / `illum_coeff` – taper variant and its coefficients.
/// * `indices` / `k` – Zernike enumeration and coefficients of the phase map.
/// * `wavelength` – observing wavelength in meters.
/// * `d_z` – axial sub-reflector offset in meters (signed).
///
/// Return
/// ----------
/// * Row-major `grid.size²` complex samples of
///   `illumination × blockage × exp(i·[φ(x,y;K) + (2π/λ)·OPD(x,y;d_z)])`.
///   Points outside the physical aperture (`ρ > 1`) are **exactly zero**
///   regardless of the illumination value.
#[allow(clippy::too_many_arguments)]
pub fn aperture_field(
    grid: &ApertureGrid,
    telescope: &Telescope,
    illumination: Illumination,
    illum_coeff: &[f64],
    indices: &[ZernikeIndex],
    k: &[f64],
    wavelength: Meter,
    d_z: Meter,
) -> Vec<Complex64> {
    let pr = grid.radius;
    let wave_number = DPI / wavelength;
    let mut field = Vec::with_capacity(grid.len());
    for &y in &grid.axis {
        for &x in &grid.axis {
            let (rho, theta) = cart2pol(x / pr, y / pr);
            if rho > 1.0 {
                field.push(Complex64::new(0.0, 0.0));
                continue;
            }
            let block = telescope.blockage(x, y);
            if block == 0.0 {
                field.push(Complex64::new(0.0, 0.0));
                continue;
            }
            let amp = illumination.amplitude(x, y, pr, illum_coeff);
            let phase = phase_value(indices, k, rho, theta)
                + wave_number * telescope.opd(x, y, d_z);
            field.push(Complex64::from_polar(amp, phase));
        }
    }
    field
}

/// Reconstruct the scalar phase-error map from a coefficient vector.
///
/// Pure function of its inputs, independent of any fit: the reporting
/// collaborator renders a solution with it and the RMS of the surface comes
/// from its in-aperture entries. The map is evaluated over `[-pr, pr]²`
/// (no box oversampling) and is `0.0` outside the unit disk.
///
/// Arguments
/// -----------------
/// * `k` – Zernike coefficients, `basis_len(order)` entries in enumeration order.
/// * `order` – maximum radial order represented in `k`.
/// * `pr` – primary reflector radius in meters.
/// * `size` – samples per side of the output map.
/// * `notilt` – zero the piston and the two tilt coefficients before
///   synthesis; piston and tilt are degenerate with the pointing solution and
///   are conventionally removed from reported phase-error maps.
///
/// Return
/// ----------
/// * `(axis, map)` – the shared axis of both dimensions and the `size × size`
///   phase map in radians (row ↔ y, column ↔ x).
pub fn phase_map(
    k: &[f64],
    order: u32,
    pr: Meter,
    size: usize,
    notilt: bool,
) -> (Vec<Meter>, DMatrix<f64>) {
    debug_assert_eq!(k.len(), basis_len(order));
    let indices = zernike_indices(order);
    let mut coeff = k.to_vec();
    if notilt {
        for (c, idx) in coeff.iter_mut().zip(indices.iter()) {
            if idx.n == 0 || (idx.n == 1 && idx.l.abs() == 1) {
                *c = 0.0;
            }
        }
    }
    let axis = linspace(-pr, pr, size);
    let map = DMatrix::from_fn(size, size, |row, col| {
        let (rho, theta) = cart2pol(axis[col] / pr, axis[row] / pr);
        if rho > 1.0 {
            0.0
        } else {
            phase_value(&indices, &coeff, rho, theta)
        }
    });
    (axis, map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_params() -> (Vec<ZernikeIndex>, Vec<f64>) {
        let indices = zernike_indices(2);
        let k = vec![0.0; indices.len()];
        (indices, k)
    }

    #[test]
    fn test_field_zero_outside_unit_disk() {
        let grid = ApertureGrid::new(50.0, 5.0, 32);
        let tel = Telescope::Effelsberg;
        let ill = Illumination::ParabolicTaper;
        let coeff = ill.default_coeff();
        let (indices, mut k) = flat_params();
        k[3] = 0.2; // some astigmatism, the mask must win anyway

        let field = aperture_field(&grid, &tel, ill, &coeff, &indices, &k, 9e-3, 2.2e-2);
        for (j, &y) in grid.axis.iter().enumerate() {
            for (i, &x) in grid.axis.iter().enumerate() {
                if x.hypot(y) > 50.0 {
                    assert_eq!(field[j * grid.size + i].norm(), 0.0);
                }
            }
        }
    }

    #[test]
    fn test_flat_phase_field_is_real_in_focus() {
        let grid = ApertureGrid::new(50.0, 5.0, 32);
        let tel = Telescope::clear_aperture(50.0, 30.0, 387.4);
        let ill = Illumination::Gaussian;
        let coeff = ill.default_coeff();
        let (indices, k) = flat_params();

        let field = aperture_field(&grid, &tel, ill, &coeff, &indices, &k, 9e-3, 0.0);
        for value in &field {
            assert!(value.im.abs() < 1e-15);
            assert!(value.re >= 0.0);
        }
    }

    #[test]
    fn test_phase_value_scales_coefficients() {
        let indices = zernike_indices(1);
        let k = [0.0, 0.0, 0.5]; // K(1, 1): tilt along x
        let value = phase_value(&indices, &k, 0.8, 0.0);
        assert!((value - DPI * 0.5 * 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_phase_map_notilt_removes_low_orders() {
        let order = 2;
        let mut k = vec![0.0; basis_len(order)];
        k[0] = 1.0; // piston
        k[1] = 0.4; // tilt
        k[2] = -0.3; // tilt
        let (_, map) = phase_map(&k, order, 50.0, 33, true);
        for &value in map.iter() {
            assert_eq!(value, 0.0);
        }
    }

    #[test]
    fn test_phase_map_outside_disk_zero() {
        let order = 2;
        let mut k = vec![0.0; basis_len(order)];
        k[5] = 0.7;
        let (axis, map) = phase_map(&k, order, 50.0, 41, false);
        for (row, &y) in axis.iter().enumerate() {
            for (col, &x) in axis.iter().enumerate() {
                if x.hypot(y) > 50.0 {
                    assert_eq!(map[(row, col)], 0.0);
                }
            }
        }
    }
}
