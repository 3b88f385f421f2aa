//! # Trajectories: time axes, extrapolation, and bidirectional integration
//!
//! A trajectory is the horizontal path an air parcel follows through a given **origin**
//! point in space and time. It is built over a **time axis** and holds exactly one
//! [`Position`] per requested timestamp, plus the origin itself.
//!
//! Modules
//! -----------------
//! * [`time_axis`](crate::trajectory::time_axis) – Regular axes at a fixed step, or the
//!   native time coordinate of a gridded domain restricted to a window.
//! * [`extrapolation`](crate::trajectory::extrapolation) – Point-to-point advection
//!   strategies (fixed velocity, or velocity sampled from a gridded domain).
//! * [`integrate`](crate::trajectory::integrate) – Bidirectional stepping engine: walks
//!   backward and forward from the origin and merges both halves.
//! * [`create`](crate::trajectory::create) – Dispatch on the trajectory kind
//!   (`eulerian`, `linear`, `integrated`) with fail-fast parameter checks.
//! * [`output`](crate::trajectory::output) – CSV persistence.
//!
//! Invariants
//! -----------------
//! * Positions are strictly increasing in time.
//! * The origin's exact coordinates appear once, at the origin's exact timestamp.
//! * Every timestamp of the time axis appears, except those falling within the same
//!   second as the previously emitted position (no zero-length steps).
//!
//! Quick-Start
//! -----------------
//! ```rust,no_run
//! use hifitime::{Duration, Epoch};
//! use lagtraj::trajectory::{
//!     create::{create_trajectory, TrajectoryKind, TrajectoryParams},
//!     time_axis::{build_times, TimeAxisMode, TimeWindow},
//!     Origin,
//! };
//!
//! # fn run() -> Result<(), lagtraj::lagtraj_errors::LagtrajError> {
//! let origin = Origin::new(52.0, 4.0, Epoch::from_gregorian_utc_hms(2020, 1, 1, 0, 0, 0))?;
//! let window = TimeWindow::new(Duration::from_seconds(7200.0), Duration::from_seconds(7200.0))?;
//! let times = build_times(&origin, &window, TimeAxisMode::FixedStep(Duration::from_seconds(3600.0)))?;
//!
//! let params = TrajectoryParams::new().with_velocity(10.0, 0.0);
//! let trajectory = create_trajectory(&origin, TrajectoryKind::Linear, &times, &params)?;
//! assert_eq!(trajectory.len(), 5);
//! # Ok(()) }
//! ```
use hifitime::Epoch;

use crate::{constants::Degree, lagtraj_errors::LagtrajError};

pub mod create;
pub mod extrapolation;
pub mod integrate;
pub mod output;
pub mod time_axis;

pub(crate) mod progress_bar;

/// Fixed space-time anchor of a trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Origin {
    pub lat: Degree,
    pub lon: Degree,
    pub datetime: Epoch,
}

impl Origin {
    /// Create an origin, checking that the latitude lies in `[-90, 90]` and the longitude is finite.
    pub fn new(lat: Degree, lon: Degree, datetime: Epoch) -> Result<Self, LagtrajError> {
        if !(-90.0..=90.0).contains(&lat) || !lon.is_finite() {
            return Err(LagtrajError::InvalidDefinition(format!(
                "origin ({lat}°N, {lon}°E) is not a valid position"
            )));
        }
        Ok(Origin { lat, lon, datetime })
    }

    pub fn position(&self) -> Position {
        Position {
            time: self.datetime,
            lat: self.lat,
            lon: self.lon,
        }
    }
}

/// A point of a trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub time: Epoch,
    pub lat: Degree,
    pub lon: Degree,
}

/// Time-ordered sequence of positions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trajectory {
    positions: Vec<Position>,
}

impl Trajectory {
    /// Build a trajectory from unordered positions; they are sorted by time (stable).
    pub fn from_positions(mut positions: Vec<Position>) -> Self {
        positions.sort_by(|a, b| {
            a.time
                .partial_cmp(&b.time)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Trajectory { positions }
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Position> {
        self.positions.iter()
    }

    pub fn times(&self) -> Vec<Epoch> {
        self.positions.iter().map(|p| p.time).collect()
    }

    pub fn lats(&self) -> Vec<Degree> {
        self.positions.iter().map(|p| p.lat).collect()
    }

    pub fn lons(&self) -> Vec<Degree> {
        self.positions.iter().map(|p| p.lon).collect()
    }

    /// Position at an exact timestamp.
    pub fn position_at(&self, time: Epoch) -> Option<&Position> {
        self.positions.iter().find(|p| p.time == time)
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a Position;
    type IntoIter = std::slice::Iter<'a, Position>;

    fn into_iter(self) -> Self::IntoIter {
        self.positions.iter()
    }
}

impl IntoIterator for Trajectory {
    type Item = Position;
    type IntoIter = std::vec::IntoIter<Position>;

    fn into_iter(self) -> Self::IntoIter {
        self.positions.into_iter()
    }
}
