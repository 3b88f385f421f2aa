//! # Constants and type definitions for lagtraj
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **common type
//! aliases** used throughout the crate.
//!
//! ## Overview
//!
//! - Geophysical constants (Earth radius, gravity, gas constants)
//! - Unit conversions (degrees ↔ radians)
//! - Core type aliases shared by the trajectory engine and the gridded domain

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// Mean Earth radius in meters, used by the flat-plane displacement
pub const EARTH_RADIUS: f64 = 6_371_000.0;

/// Standard gravitational acceleration (m s⁻²)
pub const RG: f64 = 9.80665;

/// Gas constant for dry air (J kg⁻¹ K⁻¹)
pub const RD: f64 = 287.06;

/// Gas constant for water vapour (J kg⁻¹ K⁻¹)
pub const RV: f64 = 461.52;

/// Virtual temperature factor `R_v / R_d − 1`
pub const RV_OVER_RD_MINUS_ONE: f64 = RV / RD - 1.0;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Distance in meters
pub type Meter = f64;
/// Elapsed time in seconds (signed)
pub type Second = f64;
/// Pressure in pascals
pub type Pascal = f64;
