//! Optical path difference induced by an axial sub-reflector offset.
//!
//! For a two-mirror system (primary focal length `F_p`, effective focal
//! length `F_eff`) a sub-reflector displacement `d_z` along the optical axis
//! adds, at aperture radius `r`, the path
//!
//! ```text
//! δ(r; d_z) = d_z · [ (1 − a²)/(1 + a²) + (1 − b²)/(1 + b²) ]
//!     a = r / (2 F_p),   b = r / (2 F_eff)
//! ```
//!
//! which the aperture model converts into the defocus phase `(2π/λ)·δ`.

use crate::constants::Meter;

/// Two-mirror OPD at `(x, y)` for the axial offset `d_z`. Identically `0.0`
/// when `d_z == 0`.
pub(super) fn two_mirror(x: Meter, y: Meter, d_z: Meter, f_primary: Meter, f_effective: Meter) -> Meter {
    let r2 = x * x + y * y;
    let a2 = r2 / (4.0 * f_primary * f_primary);
    let b2 = r2 / (4.0 * f_effective * f_effective);
    d_z * ((1.0 - a2) / (1.0 + a2) + (1.0 - b2) / (1.0 + b2))
}
