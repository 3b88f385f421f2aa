//! Step progress reporting for trajectory walks.
//!
//! With the `progress` feature, [`StepProgress`] renders an `indicatif` bar over the
//! timestamps of a build. Its message shows the wall time of the last step and a smoothed
//! step time, `mean ← w·dt + (1 − w)·mean` with `w = STEP_WEIGHT`, seeded by the first step.
//! Without the feature it compiles to a no-op.
#[cfg(feature = "progress")]
use std::time::{Duration, Instant};

#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};

#[cfg(feature = "progress")]
const STEP_WEIGHT: f64 = 0.2;

#[cfg(feature = "progress")]
const TEMPLATE: &str =
    "{bar:40.cyan/blue} {pos}/{len} ({percent:>3}%) | ETA {eta_precise} | {msg}";

/// Progress over the target timestamps of a trajectory build.
pub(crate) struct StepProgress {
    #[cfg(feature = "progress")]
    bar: ProgressBar,
    #[cfg(feature = "progress")]
    step_started: Instant,
    #[cfg(feature = "progress")]
    mean_step: Option<Duration>,
}

impl StepProgress {
    #[cfg(feature = "progress")]
    pub(crate) fn new(total: usize) -> Self {
        let bar = ProgressBar::new((total as u64).max(1));
        bar.set_style(
            ProgressStyle::with_template(TEMPLATE).unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        StepProgress {
            bar,
            step_started: Instant::now(),
            mean_step: None,
        }
    }

    #[cfg(not(feature = "progress"))]
    pub(crate) fn new(_total: usize) -> Self {
        StepProgress {}
    }

    /// Fold one step duration into the smoothed step time and return it.
    #[cfg(feature = "progress")]
    fn smooth(&mut self, step: Duration) -> Duration {
        let mean = match self.mean_step {
            None => step,
            Some(mean) => Duration::from_secs_f64(
                STEP_WEIGHT * step.as_secs_f64() + (1.0 - STEP_WEIGHT) * mean.as_secs_f64(),
            ),
        };
        self.mean_step = Some(mean);
        mean
    }

    /// Record one target timestamp.
    #[inline]
    pub(crate) fn step(&mut self) {
        #[cfg(feature = "progress")]
        {
            let now = Instant::now();
            let step = now.duration_since(self.step_started);
            self.step_started = now;
            let mean = self.smooth(step);
            self.bar
                .set_message(format!("step {step:.1?}, mean {mean:.1?}"));
            self.bar.inc(1);
        }
    }

    pub(crate) fn finish(self) {
        #[cfg(feature = "progress")]
        self.bar.finish_and_clear();
    }
}
