use thiserror::Error;

use crate::observations::DefocusTag;

/// Errors surfaced before any fitting computation starts.
///
/// Configuration and data errors are fatal and reported immediately by
/// [`FitParamsBuilder::build`](crate::fitting::FitParamsBuilder::build),
/// [`ObservationSet::new`](crate::observations::ObservationSet::new) or
/// [`fit_beam`](crate::fitting::fit_beam). Numerical trouble *during* a fit
/// (iteration cap exceeded, non-finite residual, rank-deficient covariance) is
/// never an error: it is recorded per order on the
/// [`FitResult`](crate::fitting::result::FitResult) and the order sequence continues.
#[derive(Error, Debug)]
pub enum OofitError {
    #[error("parameter mask leaves no free parameter at order {0}")]
    NoFreeParameters(u32),

    #[error("maximum polynomial order must be at least 1, got {0}")]
    InvalidMaxOrder(u32),

    #[error("parameter mask has {got} slots, expected {expected}")]
    MaskLengthMismatch { expected: usize, got: usize },

    #[error("illumination start vector has {got} coefficients, expected {expected}")]
    IlluminationStartLength { expected: usize, got: usize },

    #[error("grid size must be a power of two of at least 16, got {0}")]
    InvalidGridSize(usize),

    #[error("box-oversampling factor must be positive and finite, got {0}")]
    InvalidBoxFactor(f64),

    #[error("invalid telescope geometry: {0}")]
    InvalidGeometry(String),

    #[error("wavelength mismatch across defocus maps: {expected} vs {got}")]
    WavelengthMismatch { expected: f64, got: f64 },

    #[error("invalid wavelength: {0}")]
    InvalidWavelength(f64),

    #[error("missing defocus distance for the {0} map")]
    MissingDefocus(DefocusTag),

    #[error("in-focus map carries a non-zero defocus distance: {0}")]
    UnexpectedDefocus(f64),

    #[error("empty beam map for the {0} tag")]
    EmptyBeamMap(DefocusTag),

    #[error("beam map arrays differ in length: u={u_len}, v={v_len}, power={power_len}")]
    SampleLengthMismatch {
        u_len: usize,
        v_len: usize,
        power_len: usize,
    },
}

impl PartialEq for OofitError {
    fn eq(&self, other: &Self) -> bool {
        use OofitError::*;
        match (self, other) {
            (NoFreeParameters(a), NoFreeParameters(b)) => a == b,
            (InvalidMaxOrder(a), InvalidMaxOrder(b)) => a == b,
            (
                MaskLengthMismatch {
                    expected: a,
                    got: b,
                },
                MaskLengthMismatch {
                    expected: c,
                    got: d,
                },
            ) => (a, b) == (c, d),
            (
                IlluminationStartLength {
                    expected: a,
                    got: b,
                },
                IlluminationStartLength {
                    expected: c,
                    got: d,
                },
            ) => (a, b) == (c, d),
            (InvalidGridSize(a), InvalidGridSize(b)) => a == b,
            (InvalidBoxFactor(a), InvalidBoxFactor(b)) => a == b,
            (InvalidGeometry(a), InvalidGeometry(b)) => a == b,
            (
                WavelengthMismatch {
                    expected: a,
                    got: b,
                },
                WavelengthMismatch {
                    expected: c,
                    got: d,
                },
            ) => (a, b) == (c, d),
            (InvalidWavelength(a), InvalidWavelength(b)) => a == b,
            (MissingDefocus(a), MissingDefocus(b)) => a == b,
            (UnexpectedDefocus(a), UnexpectedDefocus(b)) => a == b,
            (EmptyBeamMap(a), EmptyBeamMap(b)) => a == b,
            (
                SampleLengthMismatch {
                    u_len: a,
                    v_len: b,
                    power_len: c,
                },
                SampleLengthMismatch {
                    u_len: d,
                    v_len: e,
                    power_len: f,
                },
            ) => (a, b, c) == (d, e, f),
            _ => false,
        }
    }
}
