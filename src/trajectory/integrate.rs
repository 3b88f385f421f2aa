//! # Bidirectional stepping engine
//!
//! [`integrate`] builds a trajectory from its origin over a [`TimeAxis`] using any
//! [`Extrapolate`] strategy:
//!
//! 1. The axis is split at the origin time into the timestamps at or before it (walked
//!    descending) and the timestamps at or after it (walked ascending).
//! 2. Each walk starts from the origin position and advances to every target in turn with
//!    `Δt = whole_seconds(target − last.time)`. A target within the same second as the
//!    last emitted position is skipped.
//! 3. The backward walk is reversed; both walks are merged around the origin and sorted
//!    by time.
//!
//! The origin timestamp belongs to both halves but is a zero-length step for each, so it
//! is emitted exactly once, with the origin's exact coordinates. The direction of travel
//! is carried by the sign of `Δt` only.
use hifitime::Epoch;
use tracing::debug;

use super::{
    extrapolation::Extrapolate, progress_bar::StepProgress, time_axis::TimeAxis, Origin,
    Position, Trajectory,
};
use crate::{lagtraj_errors::LagtrajError, time::whole_seconds};

/// Walk from the origin through `targets`, in the order given.
fn walk<'t, E>(
    origin: &Origin,
    targets: impl Iterator<Item = &'t Epoch>,
    extrapolate: &E,
    progress: &mut StepProgress,
) -> Result<Vec<Position>, LagtrajError>
where
    E: Extrapolate + ?Sized,
{
    let mut positions = Vec::new();
    let mut last = origin.position();

    for &target in targets {
        progress.step();
        let dt = whole_seconds(target - last.time);
        if dt == 0 {
            debug!(%target, from = %last.time, "zero-second step skipped");
            continue;
        }
        let (lat, lon) = extrapolate.extrapolate(last.lat, last.lon, last.time, dt as f64)?;
        last = Position {
            time: target,
            lat,
            lon,
        };
        positions.push(last);
    }
    Ok(positions)
}

/// Integrate a trajectory backward and forward from its origin.
///
/// Arguments
/// -----------------
/// * `origin`: starting point in space and time.
/// * `times`: target timestamps; they may lie on either side of the origin.
/// * `extrapolate`: the point-to-point step.
///
/// Return
/// ----------
/// * The time-ordered [`Trajectory`], or the first error raised by `extrapolate` (no
///   partial trajectory is returned).
///
/// See also
/// ------------
/// * [`create_trajectory`](crate::trajectory::create::create_trajectory) – Kind dispatch.
pub fn integrate<E>(
    origin: &Origin,
    times: &TimeAxis,
    extrapolate: &E,
) -> Result<Trajectory, LagtrajError>
where
    E: Extrapolate + ?Sized,
{
    let t0 = origin.datetime;
    let backward_targets = times.at_or_before(t0);
    let forward_targets = times.at_or_after(t0);

    let mut progress = StepProgress::new(backward_targets.len() + forward_targets.len());
    let backward = walk(origin, backward_targets.iter().rev(), extrapolate, &mut progress)?;
    let forward = walk(origin, forward_targets.iter(), extrapolate, &mut progress)?;
    progress.finish();

    debug!(
        n_backward = backward.len(),
        n_forward = forward.len(),
        "trajectory walks finished"
    );

    let positions = backward
        .into_iter()
        .rev()
        .chain(std::iter::once(origin.position()))
        .chain(forward)
        .collect();
    Ok(Trajectory::from_positions(positions))
}
