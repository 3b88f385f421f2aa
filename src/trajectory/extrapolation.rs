//! # Point-to-point extrapolation
//!
//! An extrapolation strategy moves a parcel from `(lat, lon)` at time `t0` over a signed
//! number of seconds `dt`. Both strategies share the same convention:
//!
//! * `sign = +1` if `dt > 0`, `-1` otherwise,
//! * the velocity is oriented along the direction of travel (`sign · U`),
//! * the parcel travels for `sign · dt = |dt|` seconds with that velocity.
//!
//! A backward step therefore moves against the wind and exactly mirrors the forward step
//! with the same velocity.
//!
//! Displacement
//! -----------------
//! The `(u, v)` pair is converted to a latitude/longitude increment on a flat plane tangent
//! to a spherical Earth of radius [`EARTH_RADIUS`]:
//!
//! ```text
//! Δφ = v·τ / R
//! Δλ = u·τ / (R · cos(φ + Δφ/2))
//! ```
//!
//! The longitude scaling uses the mid-step latitude so that a step and its reverse share
//! the same scale factor.
use hifitime::Epoch;

use crate::{
    constants::{Degree, Second, EARTH_RADIUS, RADEG},
    domain::{GriddedDomain, SamplingConfig, Velocity},
    lagtraj_errors::LagtrajError,
};

/// A point-to-point advection step.
pub trait Extrapolate {
    /// Position reached from `(lat, lon)` at `t0` after `dt` signed seconds.
    fn extrapolate(
        &self,
        lat: Degree,
        lon: Degree,
        t0: Epoch,
        dt: Second,
    ) -> Result<(Degree, Degree), LagtrajError>;
}

/// Available extrapolation strategies.
#[derive(Clone, Copy)]
pub enum Extrapolation<'a> {
    /// Constant `(u, v)` velocity in m/s.
    FixedVelocity { velocity: Velocity },
    /// Velocity sampled from a gridded domain at the start of every step.
    FieldSampled {
        domain: &'a dyn GriddedDomain,
        sampling: SamplingConfig,
    },
}

/// Direction of travel of a step.
#[inline]
fn direction(dt: Second) -> f64 {
    if dt > 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Displace a point with an already-oriented velocity for a travel time `tau ≥ 0`.
///
/// Arguments
/// -----------------
/// * `lat`, `lon`: starting point in degrees.
/// * `velocity`: `(u, v)` in m/s, oriented along the direction of travel.
/// * `tau`: travel time in seconds.
///
/// Return
/// ----------
/// * The `(lat, lon)` reached, in degrees. Longitudes are not wrapped.
pub fn displace(lat: Degree, lon: Degree, velocity: &Velocity, tau: Second) -> (Degree, Degree) {
    let dlat = velocity.y * tau / EARTH_RADIUS / RADEG;
    let lat_mid = lat + 0.5 * dlat;
    let dlon = velocity.x * tau / (EARTH_RADIUS * (lat_mid * RADEG).cos()) / RADEG;
    (lat + dlat, lon + dlon)
}

impl Extrapolate for Extrapolation<'_> {
    fn extrapolate(
        &self,
        lat: Degree,
        lon: Degree,
        t0: Epoch,
        dt: Second,
    ) -> Result<(Degree, Degree), LagtrajError> {
        let sign = direction(dt);
        let velocity = match self {
            Extrapolation::FixedVelocity { velocity } => *velocity,
            Extrapolation::FieldSampled { domain, sampling } => {
                domain.sample_velocity(lat, lon, t0, sampling)?
            }
        };
        Ok(displace(lat, lon, &(sign * velocity), sign * dt))
    }
}

#[cfg(test)]
mod extrapolation_test {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::domain::{
        grid::grid_test::{epoch, test_domain},
        HorizontalInterpolation, VerticalSelection,
    };

    #[test]
    fn test_fixed_velocity_eastward() {
        let strategy = Extrapolation::FixedVelocity {
            velocity: Velocity::new(10.0, 0.0),
        };
        let (lat, lon) = strategy.extrapolate(52.0, 4.0, epoch(0), 3600.0).unwrap();

        assert_eq!(lat, 52.0);
        let expected = 36_000.0 / (EARTH_RADIUS * (52.0 * RADEG).cos()) / RADEG;
        assert_abs_diff_eq!(lon - 4.0, expected, epsilon = 1e-12);
        assert!(lon > 4.0);
    }

    #[test]
    fn test_backward_step_moves_against_the_wind() {
        let strategy = Extrapolation::FixedVelocity {
            velocity: Velocity::new(10.0, 5.0),
        };
        let (lat, lon) = strategy.extrapolate(52.0, 4.0, epoch(0), -3600.0).unwrap();
        assert!(lat < 52.0);
        assert!(lon < 4.0);
    }

    #[test]
    fn test_forward_backward_round_trip() {
        let strategy = Extrapolation::FixedVelocity {
            velocity: Velocity::new(-12.5, 7.25),
        };
        let (lat1, lon1) = strategy.extrapolate(52.0, 4.0, epoch(0), 3600.0).unwrap();
        let (lat2, lon2) = strategy.extrapolate(lat1, lon1, epoch(1), -3600.0).unwrap();

        assert_abs_diff_eq!(lat2, 52.0, epsilon = 1e-10);
        assert_abs_diff_eq!(lon2, 4.0, epsilon = 1e-10);
    }

    #[test]
    fn test_field_sampled_uses_domain_velocity() {
        let domain = test_domain();
        let sampling = SamplingConfig {
            vertical: VerticalSelection::ModelLevel(1),
            horizontal: HorizontalInterpolation::Nearest,
        };
        let strategy = Extrapolation::FieldSampled {
            domain: &domain,
            sampling,
        };

        let velocity = domain.sample_velocity(50.0, 1.0, epoch(0), &sampling).unwrap();
        let expected = displace(50.0, 1.0, &velocity, 600.0);
        let (lat, lon) = strategy.extrapolate(50.0, 1.0, epoch(0), 600.0).unwrap();
        assert_abs_diff_eq!(lat, expected.0, epsilon = 1e-12);
        assert_abs_diff_eq!(lon, expected.1, epsilon = 1e-12);
    }

    #[test]
    fn test_field_sampled_propagates_errors() {
        let domain = test_domain();
        let strategy = Extrapolation::FieldSampled {
            domain: &domain,
            sampling: SamplingConfig {
                vertical: VerticalSelection::ModelLevel(0),
                horizontal: HorizontalInterpolation::Bilinear,
            },
        };
        let err = strategy
            .extrapolate(50.5, 1.0, epoch(5), 600.0)
            .unwrap_err();
        assert!(matches!(err, LagtrajError::OutOfDomain(_)));
    }
}
