//! # Forward transform: aperture field → power pattern
//!
//! Turns the complex aperture field into the predicted far-field power
//! pattern: 2-D FFT, squared magnitude, then min-max normalization to
//! `[0, 1]` using the pattern's **own** extrema (never the observation's).
//!
//! The transform output keeps its angular-frequency-to-physical-angle
//! mapping: the conjugate-plane axes are `u, v = λ · fftfreq(n, dx)`
//! (direction cosines in radians), so the regular model grid can be resampled
//! onto the irregular observation coordinates. That resampling
//! ([`RadiationPattern::sample`]) is a required step of the residual
//! construction and uses a bicubic Catmull–Rom kernel to avoid injecting
//! high-frequency noise into the fit.

use std::sync::Arc;

use nalgebra::DMatrix;
use rustfft::{num_complex::Complex64, Fft, FftPlanner};

use crate::aperture::ApertureGrid;
use crate::constants::{Meter, Radian};
use crate::math::normalize;

/// Planned 2-D FFT of fixed square size, reusable across the three defocus
/// evaluations of one residual computation.
pub struct Fft2 {
    size: usize,
    fft: Arc<dyn Fft<f64>>,
    scratch: Vec<Complex64>,
}

impl std::fmt::Debug for Fft2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fft2").field("size", &self.size).finish()
    }
}

impl Fft2 {
    /// Plan a forward FFT for an `size × size` field.
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let scratch = vec![Complex64::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        Self { size, fft, scratch }
    }

    /// In-place 2-D transform of a row-major square buffer, followed by a
    /// centre shift so the zero frequency lands in the middle.
    pub fn transform(&mut self, buffer: &mut [Complex64]) {
        let n = self.size;
        debug_assert_eq!(buffer.len(), n * n);
        // rows, then columns via transpose
        self.fft.process_with_scratch(buffer, &mut self.scratch);
        transpose_square(buffer, n);
        self.fft.process_with_scratch(buffer, &mut self.scratch);
        transpose_square(buffer, n);
        fftshift_square(buffer, n);
    }
}

fn transpose_square(buffer: &mut [Complex64], n: usize) {
    for row in 0..n {
        for col in (row + 1)..n {
            buffer.swap(row * n + col, col * n + row);
        }
    }
}

/// Swap half-planes so the zero-frequency bin moves to `n/2`. `n` is even for
/// every accepted grid size.
fn fftshift_square(buffer: &mut [Complex64], n: usize) {
    let half = n / 2;
    for row in 0..half {
        for col in 0..n {
            let src = row * n + col;
            let dst = ((row + half) % n) * n + (col + half) % n;
            buffer.swap(src, dst);
        }
    }
}

/// Centre-shifted FFT sample frequencies for `n` samples spaced by `d`:
/// `[-n/2, …, -1, 0, 1, …, n/2 − 1] / (n · d)`. `n` must be even.
fn fftfreq_shifted(n: usize, d: f64) -> Vec<f64> {
    let half = (n / 2) as f64;
    (0..n)
        .map(|i| (i as f64 - half) / (n as f64 * d))
        .collect()
}

/// Normalized power pattern over the conjugate (angular) plane.
///
/// `power` is `size × size` with row ↔ `v`, column ↔ `u`; values lie in
/// `[0, 1]` after min-max normalization by the pattern's own extrema.
#[derive(Debug, Clone)]
pub struct RadiationPattern {
    /// Angular axis along columns.
    pub u: Vec<Radian>,
    /// Angular axis along rows.
    pub v: Vec<Radian>,
    /// Normalized power.
    pub power: DMatrix<f64>,
}

/// Compute the predicted power pattern from a complex aperture field.
///
/// Consumes the field buffer (it is transformed in place and squared); the
/// caller rebuilds a fresh field per evaluation anyway.
pub fn radiation_pattern(
    fft: &mut Fft2,
    mut field: Vec<Complex64>,
    grid: &ApertureGrid,
    wavelength: Meter,
) -> RadiationPattern {
    let n = grid.size;
    fft.transform(&mut field);

    let mut power: Vec<f64> = field.iter().map(|c| c.norm_sqr()).collect();
    normalize(&mut power);

    let axis: Vec<f64> = fftfreq_shifted(n, grid.step)
        .into_iter()
        .map(|f| f * wavelength)
        .collect();

    RadiationPattern {
        u: axis.clone(),
        v: axis,
        power: DMatrix::from_fn(n, n, |row, col| power[row * n + col]),
    }
}

impl RadiationPattern {
    /// Bicubic (Catmull–Rom) interpolation of the pattern at the irregular
    /// observation coordinate `(u, v)` in radians.
    ///
    /// Coordinates beyond the pattern extent clamp to the edge; callers are
    /// expected to choose a box factor that keeps observations well inside.
    pub fn sample(&self, u: Radian, v: Radian) -> f64 {
        let fx = fractional_index(&self.u, u);
        let fy = fractional_index(&self.v, v);
        let n = self.u.len();

        let ix = fx.floor();
        let iy = fy.floor();
        let tx = fx - ix;
        let ty = fy - iy;
        let ix = ix as isize;
        let iy = iy as isize;

        let clamp = |i: isize| -> usize { i.clamp(0, n as isize - 1) as usize };

        let mut rows = [0.0; 4];
        for (r, row_value) in rows.iter_mut().enumerate() {
            let row = clamp(iy + r as isize - 1);
            let p0 = self.power[(row, clamp(ix - 1))];
            let p1 = self.power[(row, clamp(ix))];
            let p2 = self.power[(row, clamp(ix + 1))];
            let p3 = self.power[(row, clamp(ix + 2))];
            *row_value = catmull_rom(p0, p1, p2, p3, tx);
        }
        catmull_rom(rows[0], rows[1], rows[2], rows[3], ty)
    }
}

/// Continuous index of `value` on a uniform ascending axis, clamped to the
/// axis range.
fn fractional_index(axis: &[f64], value: f64) -> f64 {
    let step = axis[1] - axis[0];
    let raw = (value - axis[0]) / step;
    raw.clamp(0.0, (axis.len() - 1) as f64)
}

#[inline]
fn catmull_rom(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    0.5 * ((2.0 * p1)
        + (-p0 + p2) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t * t
        + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t * t * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aperture::aperture_field;
    use crate::illumination::Illumination;
    use crate::telescope::Telescope;
    use crate::zernike::zernike_indices;

    fn sample_pattern() -> (ApertureGrid, RadiationPattern) {
        let grid = ApertureGrid::new(50.0, 5.0, 64);
        let tel = Telescope::clear_aperture(50.0, 30.0, 387.4);
        let ill = Illumination::ParabolicTaper;
        let indices = zernike_indices(1);
        let k = vec![0.0; indices.len()];
        let field = aperture_field(
            &grid,
            &tel,
            ill,
            &ill.default_coeff(),
            &indices,
            &k,
            9e-3,
            0.0,
        );
        let mut fft = Fft2::new(grid.size);
        let pattern = radiation_pattern(&mut fft, field, &grid, 9e-3);
        (grid, pattern)
    }

    #[test]
    fn test_fftfreq_shifted_layout() {
        let freqs = fftfreq_shifted(8, 0.5);
        assert_eq!(freqs.len(), 8);
        assert_eq!(freqs[4], 0.0);
        assert_eq!(freqs[0], -1.0);
        assert!((freqs[7] - 0.75).abs() < 1e-15);
    }

    #[test]
    fn test_transform_of_impulse_is_flat() {
        let n = 16;
        let mut buffer = vec![Complex64::new(0.0, 0.0); n * n];
        buffer[0] = Complex64::new(1.0, 0.0);
        let mut fft = Fft2::new(n);
        fft.transform(&mut buffer);
        for value in &buffer {
            assert!((value.norm() - 1.0).abs() < 1e-10);
        }
    }

    #[test]
    fn test_pattern_normalized_to_unit_interval() {
        let (_, pattern) = sample_pattern();
        let mut saw_one = false;
        for &p in pattern.power.iter() {
            assert!((0.0..=1.0).contains(&p));
            if p == 1.0 {
                saw_one = true;
            }
        }
        assert!(saw_one);
    }

    #[test]
    fn test_peak_sits_on_axis() {
        let (_, pattern) = sample_pattern();
        let n = pattern.u.len();
        // zero-frequency bin after the shift
        assert_eq!(pattern.power[(n / 2, n / 2)], 1.0);
        assert_eq!(pattern.u[n / 2], 0.0);
    }

    #[test]
    fn test_sample_reproduces_grid_nodes() {
        let (_, pattern) = sample_pattern();
        let n = pattern.u.len();
        for &(row, col) in &[(n / 2, n / 2), (n / 2 + 3, n / 2 - 2), (10, 40)] {
            let exact = pattern.power[(row, col)];
            let interp = pattern.sample(pattern.u[col], pattern.v[row]);
            assert!(
                (exact - interp).abs() < 1e-10,
                "node ({row}, {col}): {exact} vs {interp}"
            );
        }
    }

    #[test]
    fn test_sample_smooth_between_nodes() {
        let (_, pattern) = sample_pattern();
        let n = pattern.u.len();
        let u0 = pattern.u[n / 2];
        let u1 = pattern.u[n / 2 + 1];
        let mid = pattern.sample(0.5 * (u0 + u1), 0.0);
        let lo = pattern.power[(n / 2, n / 2)].min(pattern.power[(n / 2, n / 2 + 1)]);
        let hi = pattern.power[(n / 2, n / 2)].max(pattern.power[(n / 2, n / 2 + 1)]);
        // Catmull-Rom may overshoot slightly, but not wildly
        assert!(mid > lo - 0.2 && mid < hi + 0.2);
    }
}
