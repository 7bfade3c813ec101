use crate::constants::Meter;
use crate::math::linspace;

/// Square discretization of the aperture plane.
///
/// The grid covers `[-R, R] × [-R, R]` with `R = radius · box_factor`; the
/// oversampled box around the physical dish refines the angular sampling of
/// the conjugate plane after the spectral transform. Row index maps to `y`,
/// column index to `x`, row-major storage.
///
/// A grid is built per forward-model evaluation and dropped with it; it owns
/// its axis vector and carries no shared state.
#[derive(Debug, Clone)]
pub struct ApertureGrid {
    /// Points per side.
    pub size: usize,
    /// Primary reflector radius (unit-disk scale for the Zernike basis).
    pub radius: Meter,
    /// Half-extent `R` of the box.
    pub half_extent: Meter,
    /// Shared axis for both dimensions, `size` evenly spaced samples of `[-R, R]`.
    pub axis: Vec<Meter>,
    /// Axis step.
    pub step: Meter,
}

impl ApertureGrid {
    /// Build a grid of `size` points per side for a dish of radius `radius`
    /// oversampled by `box_factor`.
    pub fn new(radius: Meter, box_factor: f64, size: usize) -> Self {
        let half_extent = radius * box_factor;
        let axis = linspace(-half_extent, half_extent, size);
        let step = if size > 1 {
            axis[1] - axis[0]
        } else {
            0.0
        };
        Self {
            size,
            radius,
            half_extent,
            axis,
            step,
        }
    }

    /// Total number of grid points.
    pub fn len(&self) -> usize {
        self.size * self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}
