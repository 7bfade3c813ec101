use nalgebra::DVector;
use smallvec::SmallVec;

use crate::zernike::basis_len;

/// The sole optimization variable: illumination coefficients followed by the
/// Zernike coefficients of the current order.
///
/// The concatenation order is fixed — `I_coeff` then `K_coeff` — and the
/// `K_coeff` layout follows [`crate::zernike::zernike_indices`]. Length is
/// `illumination.n_coeff() + basis_len(order)`; the illumination part is 4 or
/// 5 entries depending on the variant, never assumed constant.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterVector {
    /// Illumination coefficients, variant-dependent count.
    pub illumination: SmallVec<[f64; 5]>,
    /// Zernike coefficients in enumeration order.
    pub k: Vec<f64>,
}

impl ParameterVector {
    pub fn new(illumination: &[f64], k: &[f64]) -> Self {
        Self {
            illumination: SmallVec::from_slice(illumination),
            k: k.to_vec(),
        }
    }

    /// Total slot count.
    pub fn len(&self) -> usize {
        self.illumination.len() + self.k.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten into a dense vector, illumination first.
    pub fn to_dvector(&self) -> DVector<f64> {
        let mut values = Vec::with_capacity(self.len());
        values.extend_from_slice(&self.illumination);
        values.extend_from_slice(&self.k);
        DVector::from_vec(values)
    }

    /// Split a dense vector back into its two parts. `illum_n` is the
    /// illumination coefficient count of the active variant.
    pub fn from_dvector(illum_n: usize, full: &DVector<f64>) -> Self {
        debug_assert!(full.len() >= illum_n);
        let slice = full.as_slice();
        Self {
            illumination: SmallVec::from_slice(&slice[..illum_n]),
            k: slice[illum_n..].to_vec(),
        }
    }

    /// Warm-start resize: keep the illumination part unchanged and zero-fill
    /// the Zernike part up to `basis_len(order)` entries.
    ///
    /// This is the explicit vector-resize behind order-to-order warm starting;
    /// because lower-order enumerations are exact prefixes of higher-order
    /// ones, the surviving coefficients keep their basis indices. Shrinking
    /// truncates the highest orders.
    pub fn padded_to_order(&self, order: u32) -> Self {
        let mut k = self.k.clone();
        k.resize(basis_len(order), 0.0);
        Self {
            illumination: self.illumination.clone(),
            k,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_dvector() {
        let pv = ParameterVector::new(&[1.0, -14.0, 1.4, 0.0, 0.0], &[0.0, 0.1, -0.2]);
        let dense = pv.to_dvector();
        assert_eq!(dense.len(), 8);
        assert_eq!(dense[0], 1.0);
        assert_eq!(dense[7], -0.2);
        let back = ParameterVector::from_dvector(5, &dense);
        assert_eq!(back, pv);
    }

    #[test]
    fn test_gaussian_variant_width() {
        // 4 illumination coefficients, no shape exponent
        let pv = ParameterVector::new(&[1.0, -14.0, 0.0, 0.0], &[0.0; 3]);
        assert_eq!(pv.len(), 7);
        let back = ParameterVector::from_dvector(4, &pv.to_dvector());
        assert_eq!(back.illumination.len(), 4);
        assert_eq!(back.k.len(), 3);
    }

    #[test]
    fn test_padding_grows_with_zero_fill() {
        let pv = ParameterVector::new(&[1.0, -14.0, 1.4, 0.0, 0.0], &[0.5, 0.1, -0.2]);
        let padded = pv.padded_to_order(2);
        assert_eq!(padded.illumination, pv.illumination);
        assert_eq!(padded.k.len(), basis_len(2));
        // surviving coefficients keep their positions
        assert_eq!(&padded.k[..3], &[0.5, 0.1, -0.2]);
        assert_eq!(&padded.k[3..], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_padding_truncates_when_shrinking() {
        let pv = ParameterVector::new(&[1.0, -14.0, 1.4, 0.0, 0.0], &[0.5; 6]);
        let shrunk = pv.padded_to_order(1);
        assert_eq!(shrunk.k, vec![0.5, 0.5, 0.5]);
    }
}
