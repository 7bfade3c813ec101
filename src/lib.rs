pub mod aperture;
pub mod constants;
pub mod fitting;
pub mod illumination;
pub mod math;
pub mod observations;
pub mod oofit_errors;
pub mod radiation;
pub mod telescope;
pub mod zernike;
