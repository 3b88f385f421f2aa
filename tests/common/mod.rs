#![allow(dead_code)]

use std::fmt::Write as _;

use camino::{Utf8Path, Utf8PathBuf};
use hifitime::{Duration, Epoch};
use lagtraj::{
    time::fmt_iso_utc,
    trajectory::time_axis::{build_times, TimeAxis, TimeAxisMode, TimeWindow},
    Origin, Trajectory,
};

pub fn hours(h: f64) -> Duration {
    Duration::from_seconds(h * 3600.0)
}

/// 52°N, 4°E on 2020-01-01T00:00:00 UTC
pub fn scenario_origin() -> Origin {
    Origin::new(52.0, 4.0, Epoch::from_gregorian_utc_hms(2020, 1, 1, 0, 0, 0)).unwrap()
}

pub fn hourly_axis(origin: &Origin, backward_h: f64, forward_h: f64) -> TimeAxis {
    let window = TimeWindow::new(hours(backward_h), hours(forward_h)).unwrap();
    build_times(origin, &window, TimeAxisMode::FixedStep(hours(1.0))).unwrap()
}

/// Strictly increasing times, origin present exactly once with its exact coordinates.
pub fn assert_trajectory_invariants(trajectory: &Trajectory, origin: &Origin) {
    let times = trajectory.times();
    assert!(
        times.windows(2).all(|w| w[0] < w[1]),
        "times are not strictly increasing: {times:?}"
    );

    let at_origin: Vec<_> = trajectory
        .iter()
        .filter(|p| p.time == origin.datetime)
        .collect();
    assert_eq!(at_origin.len(), 1);
    assert_eq!(at_origin[0].lat, origin.lat);
    assert_eq!(at_origin[0].lon, origin.lon);
}

/// Fresh scratch directory under the system temporary directory.
pub fn scratch_dir(name: &str) -> Utf8PathBuf {
    let dir = std::env::temp_dir().join(format!("lagtraj-it-{name}-{}", std::process::id()));
    let dir = Utf8PathBuf::from_path_buf(dir).expect("temporary directory is not UTF-8");
    if dir.exists() {
        std::fs::remove_dir_all(&dir).unwrap();
    }
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Uniform two-level domain around the scenario origin, with thermodynamic columns.
///
/// Hourly slices from `first` over `n_times` hours, latitudes 49..=55, longitudes 0..=8,
/// wind `(u, v)` on both levels.
pub fn write_uniform_domain(
    root: &Utf8Path,
    name: &str,
    first: Epoch,
    n_times: u32,
    (u, v): (f64, f64),
) {
    let mut table = String::from("time,level,lat,lon,u,v,t,q,sp,z\n");
    for h in 0..n_times {
        let time = fmt_iso_utc(first + hours(h as f64));
        for (level, temperature) in [(1, 250.0), (2, 285.0)] {
            for lat in 49..=55 {
                for lon in 0..=8 {
                    writeln!(
                        table,
                        "{time},{level},{lat}.0,{lon}.0,{u},{v},{temperature},0.001,101325.0,0.0"
                    )
                    .unwrap();
                }
            }
        }
    }

    let domains = root.join("domains");
    std::fs::create_dir_all(&domains).unwrap();
    std::fs::write(domains.join(format!("{name}.csv")), table).unwrap();
    std::fs::write(
        domains.join(format!("{name}.levels")),
        "n a[Pa] b\n0 0.0 0.0\n1 20000.0 0.0\n2 0.0 1.0\n",
    )
    .unwrap();
}

pub fn write_definition(root: &Utf8Path, name: &str, content: &str) {
    let dir = root.join("trajectories");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(format!("{name}.toml")), content).unwrap();
}
