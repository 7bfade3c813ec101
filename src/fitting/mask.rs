use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::illumination::Illumination;
use crate::oofit_errors::OofitError;
use crate::zernike::basis_len;

/// Disposition of one parameter slot during optimization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Slot {
    /// Optimized by the solver.
    Free,
    /// Held at the given value for the whole fit; still occupies its slot in
    /// the parameter vector but receives no gradient contribution.
    Fixed(f64),
}

/// Per-parameter free/fixed record for the full parameter vector.
///
/// A mask is sized for the **maximum** polynomial order; since lower-order
/// Zernike enumerations are prefixes of higher-order ones, the per-order mask
/// is the truncation of this one. A mask (or truncation) that leaves zero
/// free parameters is a configuration error, rejected before fitting starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterMask {
    slots: Vec<Slot>,
}

impl ParameterMask {
    /// All `len` slots free.
    pub fn all_free(len: usize) -> Self {
        Self {
            slots: vec![Slot::Free; len],
        }
    }

    /// The conventional mask for a fit up to `order_max`: every slot free
    /// except the piston coefficient `K(0, 0)`, which is degenerate with an
    /// overall phase and held at zero.
    pub fn standard(illumination: Illumination, order_max: u32) -> Self {
        let len = illumination.n_coeff() + basis_len(order_max);
        Self::all_free(len).with_fixed(illumination.n_coeff(), 0.0)
    }

    /// Fix slot `index` at `value`.
    pub fn with_fixed(mut self, index: usize, value: f64) -> Self {
        self.slots[index] = Slot::Fixed(value);
        self
    }

    /// Free slot `index` again.
    pub fn with_free(mut self, index: usize) -> Self {
        self.slots[index] = Slot::Free;
        self
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Mask for a lower order: the first `len` slots.
    pub fn truncated(&self, len: usize) -> Self {
        debug_assert!(len <= self.slots.len());
        Self {
            slots: self.slots[..len].to_vec(),
        }
    }

    /// Number of free slots.
    pub fn n_free(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s, Slot::Free))
            .count()
    }

    /// Indices of the free slots in the full vector, in slot order.
    pub fn free_indices(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| matches!(s, Slot::Free).then_some(i))
            .collect()
    }

    /// Reject a mask that leaves nothing to optimize at `order`.
    pub fn validate(&self, order: u32) -> Result<(), OofitError> {
        if self.n_free() == 0 {
            return Err(OofitError::NoFreeParameters(order));
        }
        Ok(())
    }

    /// Overwrite the fixed slots of a full vector with their mask values.
    pub fn apply_fixed(&self, full: &mut DVector<f64>) {
        debug_assert_eq!(full.len(), self.slots.len());
        for (i, slot) in self.slots.iter().enumerate() {
            if let Slot::Fixed(value) = slot {
                full[i] = *value;
            }
        }
    }

    /// Gather the free entries of a full vector.
    pub fn gather(&self, full: &DVector<f64>) -> DVector<f64> {
        debug_assert_eq!(full.len(), self.slots.len());
        DVector::from_iterator(
            self.n_free(),
            self.slots
                .iter()
                .enumerate()
                .filter(|(_, s)| matches!(s, Slot::Free))
                .map(|(i, _)| full[i]),
        )
    }

    /// Scatter a free vector back into a full vector, filling fixed slots
    /// with their mask values.
    pub fn scatter(&self, free: &DVector<f64>) -> DVector<f64> {
        debug_assert_eq!(free.len(), self.n_free());
        let mut full = DVector::zeros(self.slots.len());
        let mut next = 0;
        for (i, slot) in self.slots.iter().enumerate() {
            full[i] = match slot {
                Slot::Free => {
                    let v = free[next];
                    next += 1;
                    v
                }
                Slot::Fixed(value) => *value,
            };
        }
        full
    }
}
