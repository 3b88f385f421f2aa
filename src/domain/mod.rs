//! # Gridded domain data
//!
//! Access to gridded atmospheric model data used by the trajectory engine:
//!
//! * [`GriddedDomain`] – the contract the engine relies on: a download-completeness check,
//!   a time coordinate queryable by inclusive range, and a velocity-sampling operation.
//! * [`grid::GridDomain`] – in-memory regular latitude/longitude grid with model levels.
//! * [`load`] – reading a [`grid::GridDomain`] from a long-format CSV table.
//! * [`hydrostatic`] – reconstruction of half/full-level heights and pressures from
//!   model-level coefficients, used by the `single_height_level` velocity method.
//!
//! Velocity methods
//! -----------------
//! A velocity method is selected by name ([`VelocityMethod`]) and configured with optional
//! keyword arguments ([`VelocityMethodKwargs`]). [`VelocityMethod::configure`] validates the
//! pair and produces a [`SamplingConfig`], so a missing option is reported before any
//! stepping takes place.
//!
//! | name                  | required option | vertical selection                         |
//! |-----------------------|-----------------|--------------------------------------------|
//! | `model_level`         | `level`         | velocity on a model level (0 = top)        |
//! | `single_height_level` | `height`        | linear interpolation in full-level heights |
//!
//! `horizontal_interpolation` (`nearest` or `bilinear`, default `bilinear`) applies to both.
use std::str::FromStr;

use hifitime::Epoch;
use nalgebra::Vector2;
use serde::Deserialize;

use crate::{
    constants::{Degree, Meter},
    lagtraj_errors::LagtrajError,
};

pub mod grid;
pub mod hydrostatic;
pub mod load;

/// Horizontal wind `(u, v)` in m/s, eastward and northward.
pub type Velocity = Vector2<f64>;

/// Source of gridded model data for one named domain.
///
/// Implementors must be shareable across threads: independent trajectory builds may
/// sample the same domain concurrently.
pub trait GriddedDomain: Sync {
    /// Name of the domain, used in diagnostics.
    fn name(&self) -> &str;

    /// `true` when all the data of the domain is available.
    fn download_complete(&self) -> bool;

    /// Native time coordinate, strictly increasing.
    fn times(&self) -> &[Epoch];

    /// Timestamps of the time coordinate lying within `[start, end]`.
    fn times_in(&self, start: Epoch, end: Epoch) -> Vec<Epoch> {
        self.times()
            .iter()
            .copied()
            .filter(|t| *t >= start && *t <= end)
            .collect()
    }

    /// First and last timestamps of the time coordinate.
    fn time_coverage(&self) -> Option<(Epoch, Epoch)> {
        Some((*self.times().first()?, *self.times().last()?))
    }

    /// Sample the horizontal wind at a point in space and time.
    ///
    /// Arguments
    /// -----------------
    /// * `lat`, `lon`: position in degrees.
    /// * `time`: sampling time.
    /// * `sampling`: validated velocity method and its options.
    ///
    /// Return
    /// ----------
    /// * The `(u, v)` velocity, or an error if the point cannot be sampled.
    fn sample_velocity(
        &self,
        lat: Degree,
        lon: Degree,
        time: Epoch,
        sampling: &SamplingConfig,
    ) -> Result<Velocity, LagtrajError>;
}

/// Named velocity-sampling method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VelocityMethod {
    ModelLevel,
    SingleHeightLevel,
}

impl VelocityMethod {
    pub fn name(&self) -> &'static str {
        match self {
            VelocityMethod::ModelLevel => "model_level",
            VelocityMethod::SingleHeightLevel => "single_height_level",
        }
    }

    /// Validate the method options and build the sampling configuration.
    ///
    /// Return
    /// ----------
    /// * `Err(LagtrajError::MissingParameter)` if the option required by the method is absent.
    pub fn configure(&self, kwargs: &VelocityMethodKwargs) -> Result<SamplingConfig, LagtrajError> {
        let missing = |option: &str| LagtrajError::MissingParameter {
            kind: "integrated".into(),
            message: format!(
                "the `{}` velocity method requires the `{option}` option in `velocity_method_kwargs`",
                self.name()
            ),
        };

        let vertical = match self {
            VelocityMethod::ModelLevel => {
                VerticalSelection::ModelLevel(kwargs.level.ok_or_else(|| missing("level"))?)
            }
            VelocityMethod::SingleHeightLevel => {
                let height = kwargs.height.ok_or_else(|| missing("height"))?;
                if !height.is_finite() {
                    return Err(LagtrajError::InvalidVelocityMethod(format!(
                        "height must be finite, got {height}"
                    )));
                }
                VerticalSelection::Height(height)
            }
        };

        Ok(SamplingConfig {
            vertical,
            horizontal: kwargs.horizontal_interpolation.unwrap_or_default(),
        })
    }
}

impl FromStr for VelocityMethod {
    type Err = LagtrajError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "model_level" => Ok(VelocityMethod::ModelLevel),
            "single_height_level" => Ok(VelocityMethod::SingleHeightLevel),
            _ => Err(LagtrajError::InvalidVelocityMethod(format!(
                "unknown velocity method `{s}` (expected model_level or single_height_level)"
            ))),
        }
    }
}

impl TryFrom<&str> for VelocityMethod {
    type Error = LagtrajError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Optional configuration of a velocity method, as found in trajectory definitions.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VelocityMethodKwargs {
    /// Model level index for `model_level` (0 = top of the model).
    pub level: Option<usize>,
    /// Height above sea level for `single_height_level`.
    pub height: Option<Meter>,
    pub horizontal_interpolation: Option<HorizontalInterpolation>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalInterpolation {
    Nearest,
    #[default]
    Bilinear,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VerticalSelection {
    ModelLevel(usize),
    Height(Meter),
}

/// Validated velocity method, ready to be handed to [`GriddedDomain::sample_velocity`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    pub vertical: VerticalSelection,
    pub horizontal: HorizontalInterpolation,
}
