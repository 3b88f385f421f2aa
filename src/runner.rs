//! # End-to-end trajectory production
//!
//! Glue between a [`TrajectoryDefinition`] stored on disk and the trajectory engine:
//! load the definition, load the domain when the trajectory needs it, build the time
//! axis, create the trajectory and write it to `<root>/trajectories/<name>.csv`.
use camino::{Utf8Path, Utf8PathBuf};
use tracing::info;

use crate::{
    definition::{load_definition, Timestep, TrajectoryDefinition},
    domain::{grid::GridDomain, load::load_domain_data, GriddedDomain},
    lagtraj_errors::LagtrajError,
    trajectory::{
        create::{create_trajectory, TrajectoryKind, TrajectoryParams},
        output::{build_data_path, write_trajectory_csv},
        time_axis::{build_times, TimeAxisMode},
        Trajectory,
    },
};

/// Whether the definition needs domain data, either for sampling or for its time axis.
fn needs_domain(kind: TrajectoryKind, timestep: Timestep) -> bool {
    kind == TrajectoryKind::Integrated || timestep == Timestep::DomainData
}

fn load_required_domain(
    root_data_path: &Utf8Path,
    definition: &TrajectoryDefinition,
    kind: TrajectoryKind,
) -> Result<GridDomain, LagtrajError> {
    let name = definition
        .domain
        .as_deref()
        .ok_or_else(|| LagtrajError::MissingParameter {
            kind: kind.name().into(),
            message: "a `domain` must be given to use domain data".into(),
        })?;
    load_domain_data(root_data_path, name)
}

/// Build the trajectory described by a definition.
///
/// Arguments
/// -----------------
/// * `root_data_path`: data root holding `domains/` and `trajectories/`.
/// * `definition`: the trajectory definition.
///
/// Return
/// ----------
/// * The [`Trajectory`]. Configuration errors are reported before the domain is read.
pub fn build_trajectory(
    root_data_path: &Utf8Path,
    definition: &TrajectoryDefinition,
) -> Result<Trajectory, LagtrajError> {
    let kind = definition.kind()?;
    let origin = definition.origin()?;
    let window = definition.window()?;
    let timestep = definition.timestep()?;
    let velocity_method = definition.velocity_method()?;

    let domain = if needs_domain(kind, timestep) {
        Some(load_required_domain(root_data_path, definition, kind)?)
    } else {
        None
    };
    let domain_ref = domain.as_ref().map(|d| d as &dyn GriddedDomain);

    let mode = match (timestep, domain_ref) {
        (Timestep::Fixed(dt), _) => TimeAxisMode::FixedStep(dt),
        (Timestep::DomainData, Some(domain)) => TimeAxisMode::ExternalAxis(domain),
        (Timestep::DomainData, None) => {
            return Err(LagtrajError::InvalidTimestep(
                "`domain_data` timestep without a domain".into(),
            ))
        }
    };
    let times = build_times(&origin, &window, mode)?;

    let mut params = TrajectoryParams::new()
        .with_velocity_method_kwargs(definition.velocity_method_kwargs.clone());
    params.velocity = definition.velocity();
    params.domain = domain_ref;
    params.velocity_method = velocity_method;

    create_trajectory(&origin, kind, &times, &params)
}

/// Produce the trajectory `name` from its definition and write it to disk.
///
/// Return
/// ----------
/// * The path of the written CSV file.
pub fn cli(root_data_path: &Utf8Path, name: &str) -> Result<Utf8PathBuf, LagtrajError> {
    let definition = load_definition(root_data_path, name)?;
    let trajectory = build_trajectory(root_data_path, &definition)?;

    let output_path = build_data_path(root_data_path, &definition.name);
    write_trajectory_csv(&trajectory, &output_path)?;
    info!(path = %output_path, n_positions = trajectory.len(), "trajectory saved");
    Ok(output_path)
}
