use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use log::{error, info};

use aquaconn_output::logger::initiate_logger;

use crate::forecast::error::Result;
use crate::forecast::runner::{parse_start_time, Forecast, RunOptions};

mod forecast;

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(author, version, long_about = None)]
struct CliArgs {
    #[arg(short = 'c', long, value_name = "Forecast Configuration File")]
    config: PathBuf,
    /// Simulation start, RFC 3339 or naive UTC. Defaults to now.
    #[arg(long)]
    start_time: Option<String>,
    /// Reuse the configured trajectory file instead of running the drift simulator.
    #[arg(long)]
    skip_simulation: bool,
    /// Keep all results local.
    #[arg(long)]
    skip_upload: bool,
    /// Show connectivity progress in the terminal.
    #[arg(long)]
    tui: bool,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    let start = std::time::Instant::now();
    match run(args) {
        Ok(()) => {
            println!("Forecast finished in {} ms.", start.elapsed().as_millis());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Forecast failed: {}", e);
            eprintln!("Forecast failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> Result<()> {
    let start_time = match args.start_time.as_deref() {
        Some(value) => parse_start_time(value)?,
        None => Utc::now(),
    };
    let options = RunOptions {
        start_time,
        skip_simulation: args.skip_simulation,
        skip_upload: args.skip_upload,
        tui: args.tui,
    };
    let mut forecast = Forecast::new(&args.config, options)?;
    let log_file = initiate_logger(
        forecast.config_path(),
        &forecast.config().log_settings,
        !args.tui,
    )?;
    info!("Logging to {}", log_file.display());
    forecast.set_log_file(log_file);

    let summary = forecast.run()?;
    info!(
        "Connectivity for {} sites from {} trajectories, largest value {:.2}%",
        summary.sites, summary.trajectories, summary.max_connectivity
    );
    for notice in summary.notices.iter() {
        println!("{}", notice);
    }
    Ok(())
}
