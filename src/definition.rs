//! # Trajectory definitions
//!
//! A trajectory is described by a TOML file stored at `<root>/trajectories/<name>.toml`:
//!
//! ```toml
//! name = "eurec4a_linear"
//! domain = "eurec4a_circle"
//! type = "linear"
//! timestep = 3600            # seconds, or "domain_data"
//! U = [-5.0, 0.0]            # linear only
//!
//! [origin]
//! lat = 13.3
//! lon = -57.7
//! datetime = "2020-02-02T12:00:00"
//!
//! [duration]
//! backward = 7200            # seconds
//! forward = 7200
//! ```
//!
//! Integrated trajectories add `velocity_method` and an optional
//! `[velocity_method_kwargs]` table (see [`VelocityMethodKwargs`]).
//!
//! Deserialization only checks the shape of the file. Keys required by a particular
//! trajectory kind are checked when the trajectory is created.
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use tracing::debug;

use crate::{
    constants::{Degree, Second},
    domain::{Velocity, VelocityMethod, VelocityMethodKwargs},
    lagtraj_errors::LagtrajError,
    time::{duration_from_seconds, parse_epoch},
    trajectory::{create::TrajectoryKind, time_axis::TimeWindow, Origin},
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OriginDefinition {
    pub lat: Degree,
    pub lon: Degree,
    pub datetime: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DurationDefinition {
    pub backward: Second,
    pub forward: Second,
}

/// `timestep` entry: a number of seconds or the `"domain_data"` keyword.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TimestepDefinition {
    Seconds(Second),
    Keyword(String),
}

/// How the time axis of a trajectory is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timestep {
    Fixed(hifitime::Duration),
    DomainData,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrajectoryDefinition {
    pub name: String,
    pub domain: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub timestep: TimestepDefinition,
    pub origin: OriginDefinition,
    pub duration: DurationDefinition,
    #[serde(rename = "U")]
    pub velocity: Option<[f64; 2]>,
    pub velocity_method: Option<String>,
    #[serde(default)]
    pub velocity_method_kwargs: VelocityMethodKwargs,
}

/// `<root>/trajectories/<name>.toml`
pub fn definition_path(root_data_path: &Utf8Path, name: &str) -> Utf8PathBuf {
    root_data_path
        .join("trajectories")
        .join(format!("{name}.toml"))
}

/// Load the definition of a named trajectory.
pub fn load_definition(
    root_data_path: &Utf8Path,
    name: &str,
) -> Result<TrajectoryDefinition, LagtrajError> {
    let path = definition_path(root_data_path, name);
    debug!(path = %path, "loading trajectory definition");
    let content = std::fs::read_to_string(&path)?;
    TrajectoryDefinition::from_toml_str(&content)
}

impl TrajectoryDefinition {
    pub fn from_toml_str(content: &str) -> Result<Self, LagtrajError> {
        Ok(toml::from_str(content)?)
    }

    pub fn origin(&self) -> Result<Origin, LagtrajError> {
        Origin::new(
            self.origin.lat,
            self.origin.lon,
            parse_epoch(&self.origin.datetime)?,
        )
    }

    pub fn window(&self) -> Result<TimeWindow, LagtrajError> {
        TimeWindow::new(
            duration_from_seconds(self.duration.backward),
            duration_from_seconds(self.duration.forward),
        )
    }

    pub fn timestep(&self) -> Result<Timestep, LagtrajError> {
        match &self.timestep {
            TimestepDefinition::Seconds(seconds) if *seconds > 0.0 => {
                Ok(Timestep::Fixed(duration_from_seconds(*seconds)))
            }
            TimestepDefinition::Seconds(seconds) => Err(LagtrajError::InvalidTimestep(format!(
                "the timestep must be positive, got {seconds} s"
            ))),
            TimestepDefinition::Keyword(keyword) if keyword == "domain_data" => {
                Ok(Timestep::DomainData)
            }
            TimestepDefinition::Keyword(keyword) => Err(LagtrajError::InvalidTimestep(format!(
                "`{keyword}` is neither a number of seconds nor `domain_data`"
            ))),
        }
    }

    pub fn kind(&self) -> Result<TrajectoryKind, LagtrajError> {
        self.kind.parse()
    }

    pub fn velocity(&self) -> Option<Velocity> {
        self.velocity.map(|[u, v]| Velocity::new(u, v))
    }

    pub fn velocity_method(&self) -> Result<Option<VelocityMethod>, LagtrajError> {
        self.velocity_method
            .as_deref()
            .map(VelocityMethod::try_from)
            .transpose()
    }
}
