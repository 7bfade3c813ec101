//! Aperture-plane blockage mask from geometric primitives.
//!
//! The mask is the product of a centre-circle shadow (sub-reflector) and a
//! cross of two rectangular strips (support struts) rotated by the strut
//! angle. Values are strictly `0.0` or `1.0`; no soft edges.

use crate::constants::{Meter, Radian};

/// Binary blockage mask at `(x, y)`.
///
/// * `pr` – primary radius; struts extend over the full dish diameter.
/// * `sr` – sub-reflector shadow radius, `0.0` disables it.
/// * `half_width` – strut shadow half-width, `0.0` disables the struts.
/// * `angle` – rotation of the strut cross, radians.
pub(super) fn mask(x: Meter, y: Meter, pr: Meter, sr: Meter, half_width: Meter, angle: Radian) -> f64 {
    let r = x.hypot(y);
    if sr > 0.0 && r < sr {
        return 0.0;
    }
    if half_width > 0.0 && r <= pr {
        // rotate into the strut frame
        let (sin_a, cos_a) = angle.sin_cos();
        let xr = x * cos_a + y * sin_a;
        let yr = -x * sin_a + y * cos_a;
        if xr.abs() < half_width || yr.abs() < half_width {
            return 0.0;
        }
    }
    1.0
}
