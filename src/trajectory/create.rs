//! # Trajectory kinds
//!
//! [`create_trajectory`] dispatches on a closed set of [`TrajectoryKind`]s:
//!
//! | kind         | aliases          | required parameters                      |
//! |--------------|------------------|------------------------------------------|
//! | `eulerian`   | `stationary`     | none                                     |
//! | `linear`     | `fixed-velocity` | velocity `U = (u, v)`                    |
//! | `integrated` | `field-sampled`  | domain and velocity method (+ its option) |
//!
//! Required parameters are checked before any step is taken, so a misconfigured
//! trajectory never samples the domain. An `integrated` trajectory also requires a fully
//! downloaded domain whose time coordinate spans the whole time axis, whichever way the
//! axis was built.
use std::str::FromStr;

use tracing::info;

use super::{
    extrapolation::Extrapolation, integrate::integrate, time_axis::TimeAxis, Origin, Position,
    Trajectory,
};
use crate::{
    domain::{GriddedDomain, Velocity, VelocityMethod, VelocityMethodKwargs},
    lagtraj_errors::LagtrajError,
    time::fmt_window,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrajectoryKind {
    /// Stays at the origin.
    Eulerian,
    /// Advected by a constant velocity.
    Linear,
    /// Advected by the velocity of a gridded domain.
    Integrated,
}

impl TrajectoryKind {
    pub fn name(&self) -> &'static str {
        match self {
            TrajectoryKind::Eulerian => "eulerian",
            TrajectoryKind::Linear => "linear",
            TrajectoryKind::Integrated => "integrated",
        }
    }
}

impl FromStr for TrajectoryKind {
    type Err = LagtrajError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eulerian" | "stationary" => Ok(TrajectoryKind::Eulerian),
            "linear" | "fixed-velocity" => Ok(TrajectoryKind::Linear),
            "integrated" | "field-sampled" => Ok(TrajectoryKind::Integrated),
            _ => Err(LagtrajError::UnknownTrajectoryKind(s.to_string())),
        }
    }
}

/// Optional inputs of the trajectory kinds.
#[derive(Clone, Default)]
pub struct TrajectoryParams<'a> {
    pub velocity: Option<Velocity>,
    pub domain: Option<&'a dyn GriddedDomain>,
    pub velocity_method: Option<VelocityMethod>,
    pub velocity_method_kwargs: VelocityMethodKwargs,
}

impl<'a> TrajectoryParams<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_velocity(mut self, u: f64, v: f64) -> Self {
        self.velocity = Some(Velocity::new(u, v));
        self
    }

    pub fn with_domain(mut self, domain: &'a dyn GriddedDomain) -> Self {
        self.domain = Some(domain);
        self
    }

    pub fn with_velocity_method(mut self, method: VelocityMethod) -> Self {
        self.velocity_method = Some(method);
        self
    }

    pub fn with_velocity_method_kwargs(mut self, kwargs: VelocityMethodKwargs) -> Self {
        self.velocity_method_kwargs = kwargs;
        self
    }
}

/// Build a trajectory of the given kind.
///
/// Arguments
/// -----------------
/// * `origin`: starting point in space and time.
/// * `kind`: the trajectory kind.
/// * `times`: target timestamps (see [`build_times`](crate::trajectory::time_axis::build_times)).
/// * `params`: kind-specific inputs; unused ones are ignored.
///
/// Return
/// ----------
/// * The [`Trajectory`], a configuration error if a required parameter is missing, or the
///   first sampling error.
pub fn create_trajectory(
    origin: &Origin,
    kind: TrajectoryKind,
    times: &TimeAxis,
    params: &TrajectoryParams<'_>,
) -> Result<Trajectory, LagtrajError> {
    info!(
        kind = kind.name(),
        lat = origin.lat,
        lon = origin.lon,
        origin = %origin.datetime,
        n_times = times.len(),
        "creating trajectory"
    );

    let trajectory = match kind {
        TrajectoryKind::Eulerian => create_eulerian_trajectory(origin, times),
        TrajectoryKind::Linear => create_linear_trajectory(origin, times, params.velocity)?,
        TrajectoryKind::Integrated => create_integrated_trajectory(
            origin,
            times,
            params.domain,
            params.velocity_method,
            &params.velocity_method_kwargs,
        )?,
    };

    info!(n_positions = trajectory.len(), "trajectory created");
    Ok(trajectory)
}

/// Trajectory staying at the origin position at every timestamp, origin timestamp included.
pub fn create_eulerian_trajectory(origin: &Origin, times: &TimeAxis) -> Trajectory {
    let mut epochs = times.times().to_vec();
    epochs.push(origin.datetime);

    let positions = TimeAxis::from_epochs(epochs)
        .times()
        .iter()
        .map(|&time| Position {
            time,
            ..origin.position()
        })
        .collect();
    Trajectory::from_positions(positions)
}

/// Trajectory advected by a constant velocity `U = (u, v)` in m/s.
pub fn create_linear_trajectory(
    origin: &Origin,
    times: &TimeAxis,
    velocity: Option<Velocity>,
) -> Result<Trajectory, LagtrajError> {
    let velocity = velocity.ok_or_else(|| LagtrajError::MissingParameter {
        kind: TrajectoryKind::Linear.name().into(),
        message: "the velocity `U = [u, v]` must be given".into(),
    })?;
    integrate(origin, times, &Extrapolation::FixedVelocity { velocity })
}

/// Trajectory advected by the velocity sampled from a gridded domain.
///
/// Return
/// ----------
/// * `Err(MissingParameter)` if the domain or the velocity method is absent, or if the
///   method's own required option is missing. No sample is taken in that case.
/// * `Err(DomainDataIncomplete)` or `Err(WindowNotCovered)` if the domain cannot serve
///   the time axis, see [`check_domain_serves`].
pub fn create_integrated_trajectory(
    origin: &Origin,
    times: &TimeAxis,
    domain: Option<&dyn GriddedDomain>,
    velocity_method: Option<VelocityMethod>,
    velocity_method_kwargs: &VelocityMethodKwargs,
) -> Result<Trajectory, LagtrajError> {
    let missing = |message: &str| LagtrajError::MissingParameter {
        kind: TrajectoryKind::Integrated.name().into(),
        message: message.into(),
    };
    let domain = domain.ok_or_else(|| missing("a domain must be given"))?;
    let method = velocity_method.ok_or_else(|| missing("`velocity_method` must be given"))?;
    let sampling = method.configure(velocity_method_kwargs)?;
    check_domain_serves(domain, origin, times)?;

    integrate(origin, times, &Extrapolation::FieldSampled { domain, sampling })
}

/// Check that `domain` can be sampled over the whole time span of a trajectory.
///
/// The span runs from the earliest to the latest of the axis timestamps and the origin.
///
/// Return
/// ----------
/// * `Err(DomainDataIncomplete)` if the domain is not fully downloaded.
/// * `Err(WindowNotCovered)` if the span reaches beyond the domain's time coordinate. The
///   message names the span and the domain's time range.
pub fn check_domain_serves(
    domain: &dyn GriddedDomain,
    origin: &Origin,
    times: &TimeAxis,
) -> Result<(), LagtrajError> {
    if !domain.download_complete() {
        return Err(LagtrajError::DomainDataIncomplete(domain.name().to_string()));
    }

    let t0 = origin.datetime;
    let first = times.first().filter(|t| *t < t0).unwrap_or(t0);
    let last = times.last().filter(|t| *t > t0).unwrap_or(t0);

    let coverage = domain.time_coverage();
    if coverage.is_some_and(|(start, end)| start <= first && end >= last) {
        return Ok(());
    }
    Err(LagtrajError::WindowNotCovered {
        requested: fmt_window(first, last),
        available: coverage
            .map(|(start, end)| fmt_window(start, end))
            .unwrap_or_else(|| "no data".to_string()),
    })
}

#[cfg(test)]
mod create_test {
    use approx::assert_abs_diff_eq;
    use hifitime::Duration;

    use nalgebra::DMatrix;

    use super::*;
    use crate::{
        domain::grid::{
            grid_test::{epoch, test_domain},
            GridDomain, GridSlice,
        },
        trajectory::time_axis::{build_times, TimeAxisMode, TimeWindow},
    };

    fn origin() -> Origin {
        Origin::new(50.5, 1.0, epoch(1)).unwrap()
    }

    fn hourly_axis() -> TimeAxis {
        let window = TimeWindow::new(Duration::from_seconds(3600.0), Duration::from_seconds(3600.0))
            .unwrap();
        build_times(
            &origin(),
            &window,
            TimeAxisMode::FixedStep(Duration::from_seconds(1800.0)),
        )
        .unwrap()
    }

    #[test]
    fn test_kind_names() {
        assert_eq!("eulerian".parse::<TrajectoryKind>().unwrap(), TrajectoryKind::Eulerian);
        assert_eq!("stationary".parse::<TrajectoryKind>().unwrap(), TrajectoryKind::Eulerian);
        assert_eq!("linear".parse::<TrajectoryKind>().unwrap(), TrajectoryKind::Linear);
        assert_eq!(
            "field-sampled".parse::<TrajectoryKind>().unwrap(),
            TrajectoryKind::Integrated
        );

        let err = "lagrangian".parse::<TrajectoryKind>().unwrap_err();
        assert_eq!(err, LagtrajError::UnknownTrajectoryKind("lagrangian".into()));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_eulerian_ignores_velocity() {
        let params = TrajectoryParams::new().with_velocity(100.0, 100.0);
        let traj =
            create_trajectory(&origin(), TrajectoryKind::Eulerian, &hourly_axis(), &params).unwrap();

        assert_eq!(traj.len(), 5);
        assert!(traj.iter().all(|p| p.lat == 50.5 && p.lon == 1.0));
    }

    #[test]
    fn test_eulerian_includes_origin() {
        let axis = TimeAxis::from_epochs(vec![epoch(0), epoch(2)]);
        let traj = create_eulerian_trajectory(&origin(), &axis);
        assert_eq!(traj.times(), vec![epoch(0), epoch(1), epoch(2)]);
    }

    #[test]
    fn test_linear_requires_velocity() {
        let err = create_trajectory(
            &origin(),
            TrajectoryKind::Linear,
            &hourly_axis(),
            &TrajectoryParams::new(),
        )
        .unwrap_err();
        assert!(matches!(err, LagtrajError::MissingParameter { ref kind, .. } if kind == "linear"));
    }

    #[test]
    fn test_integrated_requires_domain_and_method() {
        let domain = test_domain();
        let axis = hourly_axis();

        let err = create_trajectory(
            &origin(),
            TrajectoryKind::Integrated,
            &axis,
            &TrajectoryParams::new().with_velocity_method(VelocityMethod::ModelLevel),
        )
        .unwrap_err();
        assert!(err.is_configuration_error());

        let err = create_trajectory(
            &origin(),
            TrajectoryKind::Integrated,
            &axis,
            &TrajectoryParams::new().with_domain(&domain),
        )
        .unwrap_err();
        assert!(err.to_string().contains("velocity_method"));

        // model_level without its `level` option
        let err = create_trajectory(
            &origin(),
            TrajectoryKind::Integrated,
            &axis,
            &TrajectoryParams::new()
                .with_domain(&domain)
                .with_velocity_method(VelocityMethod::ModelLevel),
        )
        .unwrap_err();
        assert!(err.to_string().contains("level"));
    }

    #[test]
    fn test_integrated_trajectory_moves_east() {
        let domain = test_domain();
        let params = TrajectoryParams::new()
            .with_domain(&domain)
            .with_velocity_method(VelocityMethod::ModelLevel)
            .with_velocity_method_kwargs(VelocityMethodKwargs {
                level: Some(1),
                ..Default::default()
            });
        let traj =
            create_trajectory(&origin(), TrajectoryKind::Integrated, &hourly_axis(), &params)
                .unwrap();

        assert_eq!(traj.len(), 5);
        let at_origin = traj.position_at(epoch(1)).unwrap();
        assert_eq!((at_origin.lat, at_origin.lon), (50.5, 1.0));
        assert!(traj.lons().windows(2).all(|w| w[0] < w[1]));
        assert_abs_diff_eq!(traj.lats()[2], 50.5, epsilon = 0.0);
    }

    fn level_one<'a>() -> TrajectoryParams<'a> {
        TrajectoryParams::new()
            .with_velocity_method(VelocityMethod::ModelLevel)
            .with_velocity_method_kwargs(VelocityMethodKwargs {
                level: Some(1),
                ..Default::default()
            })
    }

    #[test]
    fn test_integrated_rejects_incomplete_domain() {
        let slice = |u: f64| GridSlice {
            u: vec![DMatrix::from_element(2, 3, u), DMatrix::from_element(2, 3, u)],
            v: vec![DMatrix::zeros(2, 3), DMatrix::zeros(2, 3)],
            thermo: None,
        };
        let mut gap = slice(10.0);
        gap.u[1][(0, 2)] = f64::NAN;
        let domain = GridDomain::new(
            "gappy",
            vec![epoch(0), epoch(2)],
            vec![50.0, 51.0],
            vec![0.0, 1.0, 2.0],
            vec![slice(10.0), gap],
        )
        .unwrap();

        let params = level_one().with_domain(&domain);
        let err = create_trajectory(&origin(), TrajectoryKind::Integrated, &hourly_axis(), &params)
            .unwrap_err();
        assert_eq!(err, LagtrajError::DomainDataIncomplete("gappy".into()));
        assert!(err.is_data_availability_error());
    }

    #[test]
    fn test_integrated_rejects_axis_beyond_domain() {
        let domain = test_domain();
        let window = TimeWindow::new(Duration::from_seconds(3600.0), Duration::from_seconds(7200.0))
            .unwrap();
        let axis = build_times(
            &origin(),
            &window,
            TimeAxisMode::FixedStep(Duration::from_seconds(3600.0)),
        )
        .unwrap();

        let params = level_one().with_domain(&domain);
        let err = create_trajectory(&origin(), TrajectoryKind::Integrated, &axis, &params)
            .unwrap_err();
        assert!(matches!(err, LagtrajError::WindowNotCovered { .. }));
        let message = err.to_string();
        assert!(message.contains(&fmt_window(epoch(0), epoch(3))));
        assert!(message.contains(&fmt_window(epoch(0), epoch(2))));
    }

    #[test]
    fn test_domain_span_includes_origin() {
        let domain = test_domain();
        let late = Origin::new(50.5, 1.0, epoch(3)).unwrap();
        let axis = TimeAxis::from_epochs(vec![epoch(0), epoch(1)]);

        let err = check_domain_serves(&domain, &late, &axis).unwrap_err();
        assert_eq!(
            err,
            LagtrajError::WindowNotCovered {
                requested: fmt_window(epoch(0), epoch(3)),
                available: fmt_window(epoch(0), epoch(2)),
            }
        );
        assert!(check_domain_serves(&domain, &origin(), &axis).is_ok());
    }
}
