//! # Constants and type definitions for oofit
//!
//! This module centralizes the **physical constants**, **telescope presets**, and **common type
//! definitions** used throughout the `oofit` library.
//!
//! ## Overview
//!
//! - Mathematical constants used by the aperture and transform code
//! - The Effelsberg 100 m preset geometry (primary/sub-reflector radii, strut layout,
//!   two-mirror focal lengths)
//! - Default discretization parameters for the aperture-plane grid
//! - Core type aliases used across the crate
//!
//! These definitions are used by all main modules, including the aperture model, the
//! forward transform, and the progressive fitter.

// -------------------------------------------------------------------------------------------------
// Mathematical constants
// -------------------------------------------------------------------------------------------------

/// 2π, useful for phase conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

// -------------------------------------------------------------------------------------------------
// Effelsberg 100 m preset geometry
// -------------------------------------------------------------------------------------------------

/// Primary reflector radius in meters
pub const EFFELSBERG_RADIUS: f64 = 50.0;

/// Sub-reflector radius in meters (shadow on the aperture plane)
pub const EFFELSBERG_SUB_RADIUS: f64 = 3.25;

/// Half-width of one support strut shadow in meters
pub const EFFELSBERG_STRUT_HALF_WIDTH: f64 = 0.5;

/// Rotation of the strut cross with respect to the aperture x-axis, in degrees
pub const EFFELSBERG_STRUT_ANGLE_DEG: f64 = 19.62;

/// Focal length of the primary reflector in meters
pub const EFFELSBERG_FOCAL_PRIMARY: f64 = 30.0;

/// Effective focal length of the Gregorian system in meters
pub const EFFELSBERG_FOCAL_EFFECTIVE: f64 = 387.394_35;

// -------------------------------------------------------------------------------------------------
// Default discretization of the aperture plane
// -------------------------------------------------------------------------------------------------

/// Default number of grid points per side of the aperture plane (power of two for the FFT)
pub const DEFAULT_GRID_SIZE: usize = 1 << 10;

/// Default box-oversampling factor: the grid spans `[-R, R]` with `R = radius * box_factor`,
/// which refines the angular sampling of the transform output
pub const DEFAULT_BOX_FACTOR: f64 = 5.0;

/// Smallest accepted grid side, below which the bicubic resampling stencil degenerates
pub const MIN_GRID_SIZE: usize = 16;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in radians
pub type Radian = f64;

/// Length in meters
pub type Meter = f64;
