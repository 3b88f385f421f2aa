//! # Trajectory persistence
//!
//! Trajectories are stored as CSV tables indexed by time. The file starts with `#` comment
//! lines carrying the units of each column, followed by a `time,lat,lon` header:
//!
//! ```text
//! # time: ISO-8601 UTC
//! # lat: degrees_north
//! # lon: degrees_east
//! time,lat,lon
//! 2019-12-31T22:00:00,52.0,3.4153
//! ```
use std::{fs::File, io::Write};

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Position, Trajectory};
use crate::{
    constants::Degree,
    lagtraj_errors::LagtrajError,
    time::{fmt_iso_utc, parse_epoch},
};

/// Units of the stored columns, in column order.
pub const COLUMN_UNITS: [(&str, &str); 3] = [
    ("time", "ISO-8601 UTC"),
    ("lat", "degrees_north"),
    ("lon", "degrees_east"),
];

#[derive(Debug, Serialize, Deserialize)]
struct TrajectoryRow {
    time: String,
    lat: Degree,
    lon: Degree,
}

/// `<root>/trajectories/<name>.csv`
pub fn build_data_path(root_data_path: &Utf8Path, name: &str) -> Utf8PathBuf {
    root_data_path.join("trajectories").join(format!("{name}.csv"))
}

/// Write a trajectory to `path`, creating the parent directories.
///
/// Arguments
/// -----------------
/// * `trajectory`: the positions to store.
/// * `path`: destination file, overwritten if it exists.
pub fn write_trajectory_csv(trajectory: &Trajectory, path: &Utf8Path) -> Result<(), LagtrajError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = File::create(path)?;
    for (column, units) in COLUMN_UNITS {
        writeln!(file, "# {column}: {units}")?;
    }

    let mut writer = csv::Writer::from_writer(file);
    for position in trajectory {
        writer.serialize(TrajectoryRow {
            time: fmt_iso_utc(position.time),
            lat: position.lat,
            lon: position.lon,
        })?;
    }
    writer.flush()?;

    debug!(path = %path, n_positions = trajectory.len(), "trajectory written");
    Ok(())
}

/// Read a trajectory written by [`write_trajectory_csv`].
pub fn read_trajectory_csv(path: &Utf8Path) -> Result<Trajectory, LagtrajError> {
    let mut reader = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_path(path)?;

    let positions = reader
        .deserialize::<TrajectoryRow>()
        .map(|row| {
            let row = row?;
            Ok(Position {
                time: parse_epoch(&row.time)?,
                lat: row.lat,
                lon: row.lon,
            })
        })
        .collect::<Result<Vec<_>, LagtrajError>>()?;
    Ok(Trajectory::from_positions(positions))
}
