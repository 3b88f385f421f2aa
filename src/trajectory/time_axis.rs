//! # Time axes
//!
//! A [`TimeAxis`] is the strictly increasing list of timestamps at which a trajectory is
//! evaluated. It is built around an [`Origin`] for a [`TimeWindow`] either
//!
//! * at a **fixed step** — walking from the origin backward until the first timestamp at
//!   or before `origin − backward`, and forward until the first timestamp at or after
//!   `origin + forward`; or
//! * from the **native time coordinate of a gridded domain** — the timestamps inside
//!   `[origin − backward, origin + forward]`. The domain must be fully downloaded and
//!   its time coordinate must cover the whole window.
use hifitime::{Duration, Epoch};
use tracing::debug;

use super::Origin;
use crate::{domain::GriddedDomain, lagtraj_errors::LagtrajError, time::fmt_window};

/// Durations to integrate before and after the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    pub backward: Duration,
    pub forward: Duration,
}

impl TimeWindow {
    /// Both durations must be non-negative.
    pub fn new(backward: Duration, forward: Duration) -> Result<Self, LagtrajError> {
        if backward < Duration::ZERO || forward < Duration::ZERO {
            return Err(LagtrajError::InvalidWindow(format!(
                "backward ({backward}) and forward ({forward}) durations must be non-negative"
            )));
        }
        Ok(TimeWindow { backward, forward })
    }

    /// `(origin − backward, origin + forward)`
    pub fn bounds(&self, origin: &Origin) -> (Epoch, Epoch) {
        (
            origin.datetime - self.backward,
            origin.datetime + self.forward,
        )
    }
}

/// How the timestamps of the axis are chosen.
#[derive(Clone, Copy)]
pub enum TimeAxisMode<'a> {
    /// Regular axis through the origin with the given step.
    FixedStep(Duration),
    /// Native time coordinate of a gridded domain.
    ExternalAxis(&'a dyn GriddedDomain),
}

/// Strictly increasing timestamps.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeAxis {
    times: Vec<Epoch>,
}

impl TimeAxis {
    /// Build an axis from arbitrary timestamps: sorted ascending, duplicates removed.
    pub fn from_epochs(mut times: Vec<Epoch>) -> Self {
        times.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        times.dedup();
        TimeAxis { times }
    }

    /// Regular axis through the origin, see the module documentation.
    pub fn fixed_step(
        origin: &Origin,
        window: &TimeWindow,
        dt: Duration,
    ) -> Result<Self, LagtrajError> {
        if dt <= Duration::ZERO {
            return Err(LagtrajError::InvalidTimestep(format!(
                "the timestep must be positive, got {dt}"
            )));
        }
        let (t_min, t_max) = window.bounds(origin);

        let mut backward = vec![origin.datetime];
        while let Some(&first) = backward.last().filter(|t| **t > t_min) {
            backward.push(first - dt);
        }
        backward.reverse();

        let mut times = backward;
        while let Some(&last) = times.last().filter(|t| **t < t_max) {
            times.push(last + dt);
        }

        Ok(TimeAxis { times })
    }

    /// Timestamps of a domain's time coordinate inside the window around the origin.
    ///
    /// Return
    /// ----------
    /// * `Err(DomainDataIncomplete)` if the domain is not fully downloaded.
    /// * `Err(NoDomainDataInWindow)` if no timestamp lies in the window.
    /// * `Err(WindowNotCovered)` if the window extends beyond the domain's time coordinate.
    pub fn from_domain<D: GriddedDomain + ?Sized>(
        origin: &Origin,
        window: &TimeWindow,
        domain: &D,
    ) -> Result<Self, LagtrajError> {
        if !domain.download_complete() {
            return Err(LagtrajError::DomainDataIncomplete(domain.name().to_string()));
        }

        let (t_min, t_max) = window.bounds(origin);
        let requested = fmt_window(t_min, t_max);
        let available = domain
            .time_coverage()
            .map(|(start, end)| fmt_window(start, end))
            .unwrap_or_else(|| "no data".to_string());

        let times = domain.times_in(t_min, t_max);
        if times.is_empty() {
            return Err(LagtrajError::NoDomainDataInWindow {
                requested,
                available,
            });
        }

        let covered = domain
            .time_coverage()
            .is_some_and(|(start, end)| start <= t_min && end >= t_max);
        if !covered {
            return Err(LagtrajError::WindowNotCovered {
                requested,
                available,
            });
        }

        Ok(Self::from_epochs(times))
    }

    pub fn times(&self) -> &[Epoch] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn first(&self) -> Option<Epoch> {
        self.times.first().copied()
    }

    pub fn last(&self) -> Option<Epoch> {
        self.times.last().copied()
    }

    /// Timestamps at or before `t0`, ascending.
    pub fn at_or_before(&self, t0: Epoch) -> &[Epoch] {
        &self.times[..self.times.partition_point(|t| *t <= t0)]
    }

    /// Timestamps at or after `t0`, ascending.
    pub fn at_or_after(&self, t0: Epoch) -> &[Epoch] {
        &self.times[self.times.partition_point(|t| *t < t0)..]
    }
}

/// Build the time axis of a trajectory.
///
/// Arguments
/// -----------------
/// * `origin`: the trajectory origin.
/// * `window`: durations before and after the origin.
/// * `mode`: fixed step or the native time coordinate of a domain.
///
/// Return
/// ----------
/// * A sorted, de-duplicated [`TimeAxis`], or the configuration/data-availability error
///   describing why the window cannot be served.
pub fn build_times(
    origin: &Origin,
    window: &TimeWindow,
    mode: TimeAxisMode<'_>,
) -> Result<TimeAxis, LagtrajError> {
    let times = match mode {
        TimeAxisMode::FixedStep(dt) => TimeAxis::fixed_step(origin, window, dt)?,
        TimeAxisMode::ExternalAxis(domain) => TimeAxis::from_domain(origin, window, domain)?,
    };
    debug!(
        n_times = times.len(),
        first = ?times.first(),
        last = ?times.last(),
        "time axis built"
    );
    Ok(times)
}
