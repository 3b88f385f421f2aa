//! Produce a trajectory from its definition.
//!
//! Usage: `create_trajectory <trajectory> [-d/--data-path PATH] [--debug]`
//!
//! Reads `<data-path>/trajectories/<trajectory>.toml`, loads the domain data it refers to
//! from `<data-path>/domains/` when needed, and writes
//! `<data-path>/trajectories/<trajectory>.csv`.

use camino::Utf8PathBuf;
use clap::Parser;
use std::process;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "create_trajectory")]
#[command(about = "Create a trajectory from its definition file")]
struct Args {
    /// Name of the trajectory definition
    trajectory: String,

    /// Root of the data directory
    #[arg(short = 'd', long = "data-path", default_value = "data")]
    data_path: Utf8PathBuf,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() {
    let args = Args::parse();
    lagtraj::init_logging(args.debug);

    match lagtraj::runner::cli(&args.data_path, &args.trajectory) {
        Ok(path) => info!("Trajectory `{}` written to {}", args.trajectory, path),
        Err(e) => {
            error!("Failed to create trajectory `{}`: {}", args.trajectory, e);
            process::exit(1);
        }
    }
}
