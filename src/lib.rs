//! # lagtraj: Lagrangian trajectories through gridded atmospheric data
//!
//! Build the path of an air parcel through a fixed **origin** point in space and time,
//! integrating both backward and forward from the origin over a time window.
//!
//! Trajectory kinds
//! -----------------
//! * `eulerian` – the parcel stays at the origin.
//! * `linear` – advection by a constant `(u, v)` velocity.
//! * `integrated` – advection by the wind sampled from a gridded domain, on a model level
//!   or at a fixed height above sea level.
//!
//! Modules
//! -----------------
//! * [`trajectory`] – Time axes, extrapolation strategies, the bidirectional stepping
//!   engine, kind dispatch and CSV output.
//! * [`domain`] – The [`GriddedDomain`](domain::GriddedDomain) contract, an in-memory
//!   latitude/longitude grid, CSV loading and hydrostatic level heights.
//! * [`definition`] – TOML trajectory definitions.
//! * [`runner`] – Definition-to-file pipeline used by the `create_trajectory` binary.
//! * [`time`] – Timestamp parsing and formatting helpers.
//! * [`lagtraj_errors`] – The crate-wide [`LagtrajError`].
//!
//! Feature flags
//! -----------------
//! * `progress` — progress bar with per-step timing while walking a trajectory.
pub mod constants;
pub mod definition;
pub mod domain;
pub mod lagtraj_errors;
pub mod runner;
pub mod time;
pub mod trajectory;

pub use lagtraj_errors::LagtrajError;
pub use trajectory::{Origin, Position, Trajectory};

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging for the binaries.
///
/// Use the `RUST_LOG` environment variable to override the default filter.
/// Default is `info`, or `debug` for this crate when `debug` is set.
pub fn init_logging(debug: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            EnvFilter::new("info,lagtraj=debug")
        } else {
            EnvFilter::new("info")
        }
    });

    fmt().with_env_filter(filter).with_target(false).init();
}
