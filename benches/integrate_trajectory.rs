use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hifitime::{Duration, Epoch};
use nalgebra::DMatrix;

use lagtraj::{
    domain::{
        grid::{GridDomain, GridSlice},
        SamplingConfig, VelocityMethod, VelocityMethodKwargs,
    },
    trajectory::{
        extrapolation::Extrapolation,
        integrate::integrate,
        time_axis::{build_times, TimeAxis, TimeAxisMode, TimeWindow},
        Origin,
    },
};

/// 10-day window at a 10 minute step around the origin.
fn setup() -> (Origin, TimeAxis) {
    let origin = Origin::new(13.3, -57.7, Epoch::from_gregorian_utc_hms(2020, 2, 2, 12, 0, 0))
        .expect("valid origin");
    let five_days = Duration::from_seconds(5.0 * 86_400.0);
    let window = TimeWindow::new(five_days, five_days).expect("valid window");
    let step = TimeAxisMode::FixedStep(Duration::from_seconds(600.0));
    let times = build_times(&origin, &window, step).expect("time axis");
    (origin, times)
}

/// Hourly 1° grid over the tropical Atlantic with a smooth trade-wind field.
fn trade_wind_domain(origin: &Origin) -> GridDomain {
    let lats: Vec<f64> = (-10..=40).map(f64::from).collect();
    let lons: Vec<f64> = (-120..=0).map(f64::from).collect();
    let times: Vec<Epoch> = (-130..=130)
        .map(|h| origin.datetime + Duration::from_seconds(h as f64 * 3600.0))
        .collect();

    let slices = times
        .iter()
        .enumerate()
        .map(|(ti, _)| {
            let u = DMatrix::from_fn(lats.len(), lons.len(), |j, _| {
                -8.0 + 0.1 * j as f64 + 0.01 * ti as f64
            });
            let v = DMatrix::from_fn(lats.len(), lons.len(), |_, i| 1.0 - 0.02 * i as f64);
            GridSlice {
                u: vec![u],
                v: vec![v],
                thermo: None,
            }
        })
        .collect();

    GridDomain::new("trades", times, lats, lons, slices).expect("valid domain")
}

fn bench_fixed_velocity(c: &mut Criterion) {
    let (origin, times) = setup();
    let strategy = Extrapolation::FixedVelocity {
        velocity: nalgebra::Vector2::new(-7.0, 0.5),
    };

    c.bench_function("integrate/fixed_velocity_10d_600s", |b| {
        b.iter(|| integrate(black_box(&origin), black_box(&times), &strategy).expect("integrate"))
    });
}

fn bench_field_sampled(c: &mut Criterion) {
    let (origin, times) = setup();
    let domain = trade_wind_domain(&origin);
    let sampling: SamplingConfig = VelocityMethod::ModelLevel
        .configure(&VelocityMethodKwargs {
            level: Some(0),
            ..Default::default()
        })
        .expect("model level configuration");
    let strategy = Extrapolation::FieldSampled {
        domain: &domain,
        sampling,
    };

    c.bench_function("integrate/field_sampled_10d_600s", |b| {
        b.iter(|| integrate(black_box(&origin), black_box(&times), &strategy).expect("integrate"))
    });
}

criterion_group!(benches, bench_fixed_velocity, bench_field_sampled);
criterion_main!(benches);
