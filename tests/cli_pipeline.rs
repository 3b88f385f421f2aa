mod common;

use camino::Utf8Path;
use common::{hours, scenario_origin, scratch_dir, write_definition, write_uniform_domain};
use lagtraj::{
    runner::cli,
    trajectory::output::{build_data_path, read_trajectory_csv},
    LagtrajError,
};

const LINEAR: &str = r#"
name = "linear_test"
type = "linear"
timestep = 3600
U = [10.0, 0.0]

[origin]
lat = 52.0
lon = 4.0
datetime = "2020-01-01T00:00:00"

[duration]
backward = 7200
forward = 7200
"#;

const INTEGRATED: &str = r#"
name = "integrated_test"
domain = "uniform"
type = "integrated"
timestep = "domain_data"
velocity_method = "model_level"

[velocity_method_kwargs]
level = 1

[origin]
lat = 52.0
lon = 4.0
datetime = "2020-01-01T00:00:00"

[duration]
backward = 3600
forward = 3600
"#;

#[test]
fn linear_definition_to_csv() {
    let root = scratch_dir("cli-linear");
    write_definition(&root, "linear_test", LINEAR);

    let path = cli(&root, "linear_test").unwrap();
    assert_eq!(path, build_data_path(&root, "linear_test"));

    let trajectory = read_trajectory_csv(&path).unwrap();
    assert_eq!(trajectory.len(), 5);
    let origin = scenario_origin();
    let at_origin = trajectory.position_at(origin.datetime).unwrap();
    assert_eq!((at_origin.lat, at_origin.lon), (52.0, 4.0));

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn integrated_definition_to_csv() {
    let root = scratch_dir("cli-integrated");
    let origin = scenario_origin();
    write_uniform_domain(&root, "uniform", origin.datetime - hours(2.0), 5, (5.0, 0.0));
    write_definition(&root, "integrated_test", INTEGRATED);

    let path = cli(&root, "integrated_test").unwrap();
    let trajectory = read_trajectory_csv(&path).unwrap();

    assert_eq!(trajectory.len(), 3);
    assert!(trajectory.lons().windows(2).all(|w| w[0] < w[1]));
    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn incomplete_domain_fails_with_fixed_step() {
    let root = scratch_dir("cli-incomplete");
    let origin = scenario_origin();
    write_uniform_domain(&root, "uniform", origin.datetime - hours(2.0), 5, (5.0, 0.0));

    // drop one grid cell from the table
    let table_path = root.join("domains").join("uniform.csv");
    let table = std::fs::read_to_string(&table_path).unwrap();
    let mut lines: Vec<&str> = table.lines().collect();
    lines.remove(7);
    std::fs::write(&table_path, lines.join("\n") + "\n").unwrap();

    write_definition(
        &root,
        "integrated_test",
        &INTEGRATED.replace("timestep = \"domain_data\"", "timestep = 3600"),
    );
    let err = cli(&root, "integrated_test").unwrap_err();

    assert_eq!(err, LagtrajError::DomainDataIncomplete("uniform".into()));
    assert!(err.is_data_availability_error());
    assert!(!build_data_path(&root, "integrated_test").exists());
    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn configuration_errors_are_reported() {
    let root = scratch_dir("cli-errors");

    let err = cli(&root, "missing").unwrap_err();
    assert!(matches!(err, LagtrajError::IoError(_)));

    write_definition(
        &root,
        "no_method",
        &INTEGRATED.replace("velocity_method = \"model_level\"\n", ""),
    );
    write_uniform_domain(
        &root,
        "uniform",
        scenario_origin().datetime - hours(2.0),
        5,
        (5.0, 0.0),
    );
    let err = cli(&root, "no_method").unwrap_err();
    assert!(err.is_configuration_error());
    assert!(!build_data_path(&root, "integrated_test").exists());

    write_definition(&root, "bad_kind", &LINEAR.replace("\"linear\"", "\"spiral\""));
    let err = cli(&root, "bad_kind").unwrap_err();
    assert_eq!(err, LagtrajError::UnknownTrajectoryKind("spiral".into()));

    std::fs::remove_dir_all(Utf8Path::new(&root)).unwrap();
}
