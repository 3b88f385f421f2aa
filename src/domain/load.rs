//! # Loading domain data from disk
//!
//! Domain data is stored as a long-format CSV table, one row per `(time, level, lat, lon)`
//! cell:
//!
//! ```text
//! time,level,lat,lon,u,v,t,q,sp,z
//! 2020-01-01T00:00:00,1,50.0,0.0,12.1,-0.4,221.3,0.00001,101325.0,0.0
//! ```
//!
//! `t`, `q`, `sp` (surface pressure, Pa) and `z` (surface geopotential, m² s⁻²) are
//! optional; when present on every row they are used to reconstruct level heights.
//! Levels are numbered from the top of the model; the smallest level number becomes level
//! index `0`. Cells absent from the table are left missing, which makes the domain
//! incomplete (see [`GriddedDomain::download_complete`](crate::domain::GriddedDomain)).
//!
//! Files live in `<root>/domains/`: `<name>.csv` for the data and, optionally,
//! `<name>.levels` for the hybrid level coefficients.
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use hifitime::Epoch;
use itertools::Itertools;
use nalgebra::DMatrix;
use serde::Deserialize;
use tracing::{debug, info};

use super::{
    grid::{GridDomain, GridSlice, ThermoSlice},
    hydrostatic::LevelCoefficients,
};
use crate::{constants::RG, lagtraj_errors::LagtrajError, time::parse_epoch};

#[derive(Debug, Deserialize)]
struct DomainRow {
    time: String,
    level: u32,
    lat: f64,
    lon: f64,
    u: f64,
    v: f64,
    t: Option<f64>,
    q: Option<f64>,
    sp: Option<f64>,
    z: Option<f64>,
}

impl DomainRow {
    fn has_thermo(&self) -> bool {
        self.t.is_some() && self.q.is_some() && self.sp.is_some() && self.z.is_some()
    }
}

/// Path of the data table of a domain.
pub fn domain_data_path(root_data_path: &Utf8Path, name: &str) -> Utf8PathBuf {
    root_data_path.join("domains").join(format!("{name}.csv"))
}

/// Path of the level coefficient table of a domain.
pub fn domain_levels_path(root_data_path: &Utf8Path, name: &str) -> Utf8PathBuf {
    root_data_path.join("domains").join(format!("{name}.levels"))
}

/// Load a named domain from `<root>/domains/`, attaching its level coefficients if present.
pub fn load_domain_data(root_data_path: &Utf8Path, name: &str) -> Result<GridDomain, LagtrajError> {
    let data_path = domain_data_path(root_data_path, name);
    info!(domain = name, path = %data_path, "loading domain data");

    let file = std::fs::File::open(&data_path)?;
    let domain = read_domain_csv(name, file)?;

    let levels_path = domain_levels_path(root_data_path, name);
    if levels_path.exists() {
        debug!(path = %levels_path, "attaching level coefficients");
        let coefficients = LevelCoefficients::from_file(&levels_path)?;
        return Ok(domain.with_level_coefficients(Arc::new(coefficients)));
    }
    Ok(domain)
}

/// Sorted, de-duplicated values of a float coordinate.
fn coordinate(values: impl Iterator<Item = f64>) -> Vec<f64> {
    values
        .sorted_by(|a, b| a.total_cmp(b))
        .dedup()
        .collect()
}

fn index_of(axis: &[f64], value: f64) -> usize {
    axis.partition_point(|a| *a < value)
}

/// Read a long-format domain table.
///
/// Arguments
/// -----------------
/// * `name`: name given to the domain.
/// * `reader`: CSV source with a header row.
///
/// Return
/// ----------
/// * The [`GridDomain`], or an error if a row cannot be parsed or the coordinates are invalid.
pub fn read_domain_csv<R: std::io::Read>(name: &str, reader: R) -> Result<GridDomain, LagtrajError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let rows = csv_reader
        .deserialize::<DomainRow>()
        .map(|row| {
            let row = row?;
            let time = parse_epoch(&row.time)?;
            Ok((time, row))
        })
        .collect::<Result<Vec<(Epoch, DomainRow)>, LagtrajError>>()?;

    if rows.is_empty() {
        return Err(LagtrajError::InvalidDefinition(format!(
            "domain `{name}`: the data table is empty"
        )));
    }

    let times: Vec<Epoch> = rows
        .iter()
        .map(|(t, _)| *t)
        .sorted_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .dedup()
        .collect();
    let levels: Vec<u32> = rows.iter().map(|(_, r)| r.level).sorted().dedup().collect();
    let lats = coordinate(rows.iter().map(|(_, r)| r.lat));
    let lons = coordinate(rows.iter().map(|(_, r)| r.lon));
    let with_thermo = rows.iter().all(|(_, r)| r.has_thermo());

    let (n_lat, n_lon, n_lev) = (lats.len(), lons.len(), levels.len());
    let missing = || DMatrix::from_element(n_lat, n_lon, f64::NAN);
    let levels_of_missing = || vec![missing(); n_lev];
    let mut slices: Vec<GridSlice> = times
        .iter()
        .map(|_| GridSlice {
            u: levels_of_missing(),
            v: levels_of_missing(),
            thermo: with_thermo.then(|| ThermoSlice {
                p_surf: missing(),
                height_surf: missing(),
                t: levels_of_missing(),
                q: levels_of_missing(),
            }),
        })
        .collect();

    for (time, row) in &rows {
        let ti = times.partition_point(|t| t < time);
        let k = levels.partition_point(|l| *l < row.level);
        let (j, i) = (index_of(&lats, row.lat), index_of(&lons, row.lon));

        let slice = &mut slices[ti];
        slice.u[k][(j, i)] = row.u;
        slice.v[k][(j, i)] = row.v;
        if let (Some(thermo), Some(t), Some(q), Some(sp), Some(z)) =
            (slice.thermo.as_mut(), row.t, row.q, row.sp, row.z)
        {
            thermo.t[k][(j, i)] = t;
            thermo.q[k][(j, i)] = q;
            thermo.p_surf[(j, i)] = sp;
            thermo.height_surf[(j, i)] = z / RG;
        }
    }

    debug!(
        domain = name,
        n_times = times.len(),
        n_levels = n_lev,
        n_lat,
        n_lon,
        with_thermo,
        "domain table read"
    );
    GridDomain::new(name, times, lats, lons, slices)
}
