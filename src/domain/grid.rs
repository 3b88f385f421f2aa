//! # In-memory gridded domain
//!
//! [`GridDomain`] stores model-level winds (and optionally the thermodynamic fields needed
//! to reconstruct level heights) on a regular latitude/longitude grid, one [`GridSlice`]
//! per timestamp of the time coordinate. It implements [`GriddedDomain`]:
//!
//! * **Completeness** — a domain is complete when no cell of any field is missing (NaN).
//! * **Temporal interpolation** — linear between the two bracketing time slices.
//! * **Horizontal interpolation** — nearest neighbour or bilinear on the grid axes.
//!   Longitudes outside the grid range are retried shifted by ±360°. On a grid spanning
//!   the globe, a longitude between the last node and the first node + 360° is bracketed
//!   across the seam by those two nodes.
//! * **Vertical selection** — a model level, or linear interpolation in the full-level
//!   height column computed by [`heights_and_pressures`] (clamped to the lowest and
//!   highest full levels). Heights are computed on first use and cached.
use std::sync::Arc;

use hifitime::Epoch;
use itertools::Itertools;
use nalgebra::DMatrix;
use once_cell::sync::OnceCell;

use super::{
    hydrostatic::{heights_and_pressures, LevelCoefficients},
    GriddedDomain, HorizontalInterpolation, SamplingConfig, Velocity, VerticalSelection,
};
use crate::{
    constants::{Degree, Meter},
    lagtraj_errors::LagtrajError,
};

/// Fields needed by the hydrostatic reconstruction for one timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct ThermoSlice {
    /// Surface pressure (Pa)
    pub p_surf: DMatrix<f64>,
    /// Surface height (m), geopotential divided by `g`
    pub height_surf: DMatrix<f64>,
    /// Temperature (K) per level, top first
    pub t: Vec<DMatrix<f64>>,
    /// Specific humidity (kg/kg) per level, top first
    pub q: Vec<DMatrix<f64>>,
}

/// All fields of the domain at one timestamp. Matrices are `(lat × lon)`.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSlice {
    pub u: Vec<DMatrix<f64>>,
    pub v: Vec<DMatrix<f64>>,
    pub thermo: Option<ThermoSlice>,
}

impl GridSlice {
    fn matrices(&self) -> impl Iterator<Item = &DMatrix<f64>> {
        let thermo = self.thermo.iter().flat_map(|th| {
            [&th.p_surf, &th.height_surf]
                .into_iter()
                .chain(th.t.iter())
                .chain(th.q.iter())
        });
        self.u.iter().chain(self.v.iter()).chain(thermo)
    }
}

/// Position of a coordinate between two axis nodes: `value = (1 − w)·axis[lo] + w·axis[hi]`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Bracket {
    lo: usize,
    hi: usize,
    w: f64,
}

impl Bracket {
    fn weighted(&self) -> [(usize, f64); 2] {
        [(self.lo, 1.0 - self.w), (self.hi, self.w)]
    }

    fn nearest(&self) -> usize {
        if self.w < 0.5 {
            self.lo
        } else {
            self.hi
        }
    }
}

/// Bracket `x` on an increasing axis, `None` if `x` is outside of it.
fn bracket_axis(axis: &[f64], x: f64) -> Option<Bracket> {
    let (first, last) = (*axis.first()?, *axis.last()?);
    if !(x >= first && x <= last) {
        return None;
    }
    let hi = axis.partition_point(|a| *a < x);
    if axis[hi] == x {
        return Some(Bracket { lo: hi, hi, w: 0.0 });
    }
    let lo = hi - 1;
    Some(Bracket {
        lo,
        hi,
        w: (x - axis[lo]) / (axis[hi] - axis[lo]),
    })
}

/// Bracket `x` between the last node of a longitude axis and its first node shifted by
/// 360°. `None` unless the axis spans the globe, i.e. the seam gap is no wider than the
/// widest grid spacing, or if `x` does not fall in the gap.
fn bracket_seam(axis: &[f64], x: Degree) -> Option<Bracket> {
    let (first, last) = (*axis.first()?, *axis.last()?);
    let widest = axis
        .iter()
        .tuple_windows()
        .map(|(a, b)| b - a)
        .fold(0.0, f64::max);
    let gap = first + 360.0 - last;
    if !(gap > 0.0 && gap <= widest * (1.0 + 1e-9)) {
        return None;
    }

    let x = first + (x - first).rem_euclid(360.0);
    (x > last).then(|| Bracket {
        lo: axis.len() - 1,
        hi: 0,
        w: (x - last) / gap,
    })
}

fn strictly_increasing(axis: &[f64]) -> bool {
    axis.iter().all(|x| x.is_finite()) && axis.iter().tuple_windows().all(|(a, b)| a < b)
}

/// Gridded model data held in memory.
#[derive(Debug)]
pub struct GridDomain {
    name: String,
    times: Vec<Epoch>,
    lats: Vec<Degree>,
    lons: Vec<Degree>,
    n_levels: usize,
    slices: Vec<GridSlice>,
    coefficients: Option<Arc<LevelCoefficients>>,
    full_level_heights: OnceCell<Vec<Vec<DMatrix<Meter>>>>,
    complete: bool,
}

impl GridDomain {
    /// Build a domain from its coordinates and one slice per timestamp.
    ///
    /// Arguments
    /// -----------------
    /// * `name`: domain name.
    /// * `times`: strictly increasing time coordinate.
    /// * `lats`, `lons`: strictly increasing grid axes (degrees).
    /// * `slices`: one [`GridSlice`] per timestamp, each with the same number of levels.
    ///
    /// Return
    /// ----------
    /// * The domain, or [`LagtrajError::InvalidDefinition`] if the coordinates and fields
    ///   are inconsistent. Missing values (NaN) are accepted and make the domain incomplete.
    pub fn new(
        name: impl Into<String>,
        times: Vec<Epoch>,
        lats: Vec<Degree>,
        lons: Vec<Degree>,
        slices: Vec<GridSlice>,
    ) -> Result<Self, LagtrajError> {
        let name = name.into();
        let invalid = |message: String| {
            LagtrajError::InvalidDefinition(format!("domain `{name}`: {message}"))
        };

        if times.is_empty() || times.len() != slices.len() {
            return Err(invalid(format!(
                "expected one slice per timestamp ({} timestamps, {} slices)",
                times.len(),
                slices.len()
            )));
        }
        if !times.iter().tuple_windows().all(|(a, b)| a < b) {
            return Err(invalid("the time coordinate must be strictly increasing".into()));
        }
        if lats.is_empty()
            || lons.is_empty()
            || !strictly_increasing(&lats)
            || !strictly_increasing(&lons)
        {
            return Err(invalid(
                "latitudes and longitudes must be non-empty and strictly increasing".into(),
            ));
        }

        let n_levels = slices[0].u.len();
        let shape = (lats.len(), lons.len());
        for slice in &slices {
            let thermo_levels_ok = slice
                .thermo
                .as_ref()
                .map_or(true, |th| th.t.len() == n_levels && th.q.len() == n_levels);
            if n_levels == 0
                || slice.u.len() != n_levels
                || slice.v.len() != n_levels
                || !thermo_levels_ok
            {
                return Err(invalid(format!(
                    "every field must have the same non-zero number of levels ({n_levels})"
                )));
            }
            if slice.matrices().any(|m| m.shape() != shape) {
                return Err(invalid(format!(
                    "every field must have the (lat × lon) shape {shape:?}"
                )));
            }
        }

        let complete = slices
            .iter()
            .all(|slice| slice.matrices().all(|m| m.iter().all(|x| !x.is_nan())));

        Ok(GridDomain {
            name,
            times,
            lats,
            lons,
            n_levels,
            slices,
            coefficients: None,
            full_level_heights: OnceCell::new(),
            complete,
        })
    }

    /// Attach the level coefficients used to reconstruct heights for `single_height_level`.
    pub fn with_level_coefficients(mut self, coefficients: Arc<LevelCoefficients>) -> Self {
        self.coefficients = Some(coefficients);
        self.full_level_heights = OnceCell::new();
        self
    }

    pub fn lats(&self) -> &[Degree] {
        &self.lats
    }

    pub fn lons(&self) -> &[Degree] {
        &self.lons
    }

    pub fn n_levels(&self) -> usize {
        self.n_levels
    }

    pub fn slices(&self) -> &[GridSlice] {
        &self.slices
    }

    /// Full-level heights per timestamp and level, computed once.
    pub fn full_level_heights(&self) -> Result<&Vec<Vec<DMatrix<Meter>>>, LagtrajError> {
        self.full_level_heights.get_or_try_init(|| {
            let coefficients = self.coefficients.as_ref().ok_or_else(|| {
                LagtrajError::VelocitySampling(format!(
                    "domain `{}` has no level coefficients to compute heights",
                    self.name
                ))
            })?;
            self.slices
                .iter()
                .map(|slice| {
                    let thermo = slice.thermo.as_ref().ok_or_else(|| {
                        LagtrajError::VelocitySampling(format!(
                            "domain `{}` has no temperature/humidity fields to compute heights",
                            self.name
                        ))
                    })?;
                    heights_and_pressures(
                        &thermo.p_surf,
                        &thermo.height_surf,
                        coefficients,
                        &thermo.t,
                        &thermo.q,
                    )
                    .map(|res| res.height_f)
                })
                .collect()
        })
    }

    fn time_bracket(&self, time: Epoch) -> Result<Bracket, LagtrajError> {
        let out_of_domain = || {
            LagtrajError::OutOfDomain(format!(
                "{time} is outside of the time coordinate of domain `{}`",
                self.name
            ))
        };
        let (first, last) = self.time_coverage().ok_or_else(out_of_domain)?;
        if time < first || time > last {
            return Err(out_of_domain());
        }
        let hi = self.times.partition_point(|t| *t < time);
        if self.times[hi] == time {
            return Ok(Bracket { lo: hi, hi, w: 0.0 });
        }
        let lo = hi - 1;
        let w = (time - self.times[lo]).to_seconds()
            / (self.times[hi] - self.times[lo]).to_seconds();
        Ok(Bracket { lo, hi, w })
    }

    /// Grid cells and weights used to interpolate at `(lat, lon)`.
    fn horizontal_stencil(
        &self,
        lat: Degree,
        lon: Degree,
        interpolation: HorizontalInterpolation,
    ) -> Result<Vec<(usize, usize, f64)>, LagtrajError> {
        let out_of_domain = || {
            LagtrajError::OutOfDomain(format!(
                "({lat:.4}°N, {lon:.4}°E) is outside of domain `{}`",
                self.name
            ))
        };
        let lat_br = bracket_axis(&self.lats, lat).ok_or_else(out_of_domain)?;
        let lon_br = [lon, lon - 360.0, lon + 360.0]
            .into_iter()
            .find_map(|x| bracket_axis(&self.lons, x))
            .or_else(|| bracket_seam(&self.lons, lon))
            .ok_or_else(out_of_domain)?;

        let stencil = match interpolation {
            HorizontalInterpolation::Nearest => vec![(lat_br.nearest(), lon_br.nearest(), 1.0)],
            HorizontalInterpolation::Bilinear => lat_br
                .weighted()
                .into_iter()
                .cartesian_product(lon_br.weighted())
                .filter(|((_, wj), (_, wi))| wj * wi > 0.0)
                .map(|((j, wj), (i, wi))| (j, i, wj * wi))
                .collect(),
        };
        Ok(stencil)
    }

    /// Value of a level field in column `(j, i)` at the selected vertical position.
    fn column_value(
        &self,
        field: &[DMatrix<f64>],
        heights: Option<&[DMatrix<Meter>]>,
        vertical: VerticalSelection,
        j: usize,
        i: usize,
    ) -> f64 {
        match (vertical, heights) {
            (VerticalSelection::ModelLevel(k), _) => field[k][(j, i)],
            (VerticalSelection::Height(h), Some(z)) => {
                let bottom = self.n_levels - 1;
                if h <= z[bottom][(j, i)] {
                    return field[bottom][(j, i)];
                }
                if h >= z[0][(j, i)] {
                    return field[0][(j, i)];
                }
                // Heights decrease with the level index
                let k = (0..bottom)
                    .find(|&k| z[k + 1][(j, i)] <= h)
                    .unwrap_or(bottom - 1);
                let (z_hi, z_lo) = (z[k][(j, i)], z[k + 1][(j, i)]);
                let w = (h - z_lo) / (z_hi - z_lo);
                field[k + 1][(j, i)] + w * (field[k][(j, i)] - field[k + 1][(j, i)])
            }
            (VerticalSelection::Height(_), None) => f64::NAN,
        }
    }
}

impl GriddedDomain for GridDomain {
    fn name(&self) -> &str {
        &self.name
    }

    fn download_complete(&self) -> bool {
        self.complete
    }

    fn times(&self) -> &[Epoch] {
        &self.times
    }

    fn sample_velocity(
        &self,
        lat: Degree,
        lon: Degree,
        time: Epoch,
        sampling: &SamplingConfig,
    ) -> Result<Velocity, LagtrajError> {
        if let VerticalSelection::ModelLevel(k) = sampling.vertical {
            if k >= self.n_levels {
                return Err(LagtrajError::VelocitySampling(format!(
                    "model level {k} not available in domain `{}` ({} levels)",
                    self.name, self.n_levels
                )));
            }
        }
        let heights = match sampling.vertical {
            VerticalSelection::Height(_) => Some(self.full_level_heights()?),
            VerticalSelection::ModelLevel(_) => None,
        };

        let time_br = self.time_bracket(time)?;
        let stencil = self.horizontal_stencil(lat, lon, sampling.horizontal)?;

        let mut velocity = Velocity::zeros();
        for (ti, wt) in time_br.weighted() {
            if wt == 0.0 {
                continue;
            }
            let slice = &self.slices[ti];
            let z = heights.map(|h| h[ti].as_slice());
            for &(j, i, wh) in &stencil {
                let u = self.column_value(&slice.u, z, sampling.vertical, j, i);
                let v = self.column_value(&slice.v, z, sampling.vertical, j, i);
                velocity += Velocity::new(u, v) * (wt * wh);
            }
        }

        if !velocity.iter().all(|x| x.is_finite()) {
            return Err(LagtrajError::VelocitySampling(format!(
                "missing wind data around ({lat:.4}°N, {lon:.4}°E) at {time} in domain `{}`",
                self.name
            )));
        }
        Ok(velocity)
    }
}
