//! # Telescope geometry provider
//!
//! Per-telescope aperture geometry: a **blockage mask** (sub-reflector shadow
//! and support-strut shadows) and an **optical-path-difference** function for
//! the axial sub-reflector offset used by out-of-focus observations.
//!
//! The provider is a closed set of variants with a fixed functional signature
//! ([`Telescope::blockage`], [`Telescope::opd`]); a new telescope implements
//! the same signature instead of being injected by string lookup:
//!
//! - [`Telescope::Manual`] – every geometric quantity supplied by the caller,
//!   struts optional (zero half-width disables them).
//! - [`Telescope::Effelsberg`] – the 100 m Effelsberg preset, constants from
//!   [`crate::constants`].
//!
//! Both functions are **total over the aperture plane** and stateless. A
//! geometry that cannot be realized (negative radii, sub-reflector larger
//! than the dish, non-positive focal lengths) is a caller configuration
//! error, rejected by [`Telescope::validate`] before any fit starts — never
//! during a forward-model evaluation.

mod blockage;
mod opd;

use serde::{Deserialize, Serialize};

use crate::constants::{
    Meter, Radian, EFFELSBERG_FOCAL_EFFECTIVE, EFFELSBERG_FOCAL_PRIMARY, EFFELSBERG_RADIUS,
    EFFELSBERG_STRUT_ANGLE_DEG, EFFELSBERG_STRUT_HALF_WIDTH, EFFELSBERG_SUB_RADIUS,
};
use crate::oofit_errors::OofitError;

/// Telescope geometry variant. See the module documentation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Telescope {
    /// Caller-supplied two-mirror geometry.
    Manual {
        /// Primary reflector radius.
        pr: Meter,
        /// Sub-reflector shadow radius; `0.0` disables the shadow.
        sr: Meter,
        /// Half-width of each strut shadow; `0.0` disables struts.
        strut_half_width: Meter,
        /// Rotation of the strut cross w.r.t. the x-axis.
        strut_angle: Radian,
        /// Focal length of the primary reflector.
        focal_primary: Meter,
        /// Effective focal length of the two-mirror system.
        focal_effective: Meter,
    },
    /// Effelsberg 100 m preset.
    Effelsberg,
}

impl Telescope {
    /// Primary reflector radius.
    pub fn radius(&self) -> Meter {
        self.geometry().0
    }

    /// Blockage mask at aperture-plane point `(x, y)`.
    ///
    /// Returns exactly `1.0` (unobstructed) or `0.0` (blocked): a centre
    /// circle for the sub-reflector shadow plus a rotated cross of
    /// rectangular strips for the struts. Total over the plane.
    pub fn blockage(&self, x: Meter, y: Meter) -> f64 {
        let (pr, sr, half_width, angle, _, _) = self.geometry();
        blockage::mask(x, y, pr, sr, half_width, angle)
    }

    /// Optical path difference at `(x, y)` for an axial sub-reflector offset `d_z`.
    ///
    /// Derived from the two-mirror focal geometry; scaled by `2π/λ` it becomes
    /// the defocus phase term of the aperture field. Exactly `0.0` when
    /// `d_z == 0`. Total over the plane.
    pub fn opd(&self, x: Meter, y: Meter, d_z: Meter) -> Meter {
        let (_, _, _, _, f_primary, f_effective) = self.geometry();
        opd::two_mirror(x, y, d_z, f_primary, f_effective)
    }

    /// Reject unrealizable geometry before any computation starts.
    pub fn validate(&self) -> Result<(), OofitError> {
        let (pr, sr, half_width, _, f_primary, f_effective) = self.geometry();
        if !(pr > 0.0 && pr.is_finite()) {
            return Err(OofitError::InvalidGeometry(format!(
                "primary radius must be positive, got {pr}"
            )));
        }
        if sr < 0.0 || sr >= pr {
            return Err(OofitError::InvalidGeometry(format!(
                "sub-reflector radius {sr} outside [0, {pr})"
            )));
        }
        if half_width < 0.0 {
            return Err(OofitError::InvalidGeometry(format!(
                "strut half-width must be non-negative, got {half_width}"
            )));
        }
        if f_primary <= 0.0 || f_effective <= 0.0 {
            return Err(OofitError::InvalidGeometry(format!(
                "focal lengths must be positive, got {f_primary} and {f_effective}"
            )));
        }
        Ok(())
    }

    /// `(pr, sr, strut_half_width, strut_angle, focal_primary, focal_effective)`
    fn geometry(&self) -> (Meter, Meter, Meter, Radian, Meter, Meter) {
        match *self {
            Telescope::Manual {
                pr,
                sr,
                strut_half_width,
                strut_angle,
                focal_primary,
                focal_effective,
            } => (
                pr,
                sr,
                strut_half_width,
                strut_angle,
                focal_primary,
                focal_effective,
            ),
            Telescope::Effelsberg => (
                EFFELSBERG_RADIUS,
                EFFELSBERG_SUB_RADIUS,
                EFFELSBERG_STRUT_HALF_WIDTH,
                EFFELSBERG_STRUT_ANGLE_DEG.to_radians(),
                EFFELSBERG_FOCAL_PRIMARY,
                EFFELSBERG_FOCAL_EFFECTIVE,
            ),
        }
    }

    /// Unobstructed dish of radius `pr`: no sub-reflector shadow, no struts.
    ///
    /// Convenient for synthetic scenes where the blockage pattern would
    /// obscure the property under test.
    pub fn clear_aperture(pr: Meter, focal_primary: Meter, focal_effective: Meter) -> Self {
        Telescope::Manual {
            pr,
            sr: 0.0,
            strut_half_width: 0.0,
            strut_angle: 0.0,
            focal_primary,
            focal_effective,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effelsberg_blockage_values() {
        let tel = Telescope::Effelsberg;
        // sub-reflector shadow
        assert_eq!(tel.blockage(0.0, 0.0), 0.0);
        assert_eq!(tel.blockage(1.0, 1.0), 0.0);
        // clear aperture well away from centre and struts
        let angle = EFFELSBERG_STRUT_ANGLE_DEG.to_radians() + std::f64::consts::FRAC_PI_4;
        let (x, y) = (30.0 * angle.cos(), 30.0 * angle.sin());
        assert_eq!(tel.blockage(x, y), 1.0);
    }

    #[test]
    fn test_blockage_is_binary() {
        let tel = Telescope::Effelsberg;
        let mut blocked = 0usize;
        let mut open = 0usize;
        for i in 0..40 {
            for j in 0..40 {
                let x = -50.0 + 100.0 * i as f64 / 39.0;
                let y = -50.0 + 100.0 * j as f64 / 39.0;
                let b = tel.blockage(x, y);
                assert!(b == 0.0 || b == 1.0);
                if b == 0.0 {
                    blocked += 1;
                } else {
                    open += 1;
                }
            }
        }
        assert!(blocked > 0 && open > 0);
    }

    #[test]
    fn test_opd_zero_at_zero_defocus() {
        let manual = Telescope::Manual {
            pr: 25.0,
            sr: 1.5,
            strut_half_width: 0.3,
            strut_angle: 0.0,
            focal_primary: 10.0,
            focal_effective: 120.0,
        };
        for tel in [Telescope::Effelsberg, manual] {
            for &(x, y) in &[(0.0, 0.0), (10.0, -20.0), (-50.0, 50.0), (3.2, 0.1)] {
                assert_eq!(tel.opd(x, y, 0.0), 0.0);
            }
        }
    }

    #[test]
    fn test_opd_sign_follows_defocus() {
        let tel = Telescope::Effelsberg;
        let plus = tel.opd(10.0, 5.0, 2.2e-2);
        let minus = tel.opd(10.0, 5.0, -2.2e-2);
        assert!(plus > 0.0);
        assert!((plus + minus).abs() < 1e-15);
    }

    #[test]
    fn test_validate_rejects_bad_geometry() {
        let bad = Telescope::Manual {
            pr: 10.0,
            sr: 11.0,
            strut_half_width: 0.0,
            strut_angle: 0.0,
            focal_primary: 5.0,
            focal_effective: 50.0,
        };
        assert!(bad.validate().is_err());

        let bad_focal = Telescope::Manual {
            pr: 10.0,
            sr: 1.0,
            strut_half_width: 0.0,
            strut_angle: 0.0,
            focal_primary: -5.0,
            focal_effective: 50.0,
        };
        assert!(bad_focal.validate().is_err());

        assert!(Telescope::Effelsberg.validate().is_ok());
    }
}
