use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Local;
use clap::Parser;
use log::{error, info};

use aquaconn_core::site::SiteId;
use aquaconn_output::logger::initiate_logger;

use crate::report::config::read_config;
use crate::report::error::Result;
use crate::report::page::ReportBuilder;

mod report;

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(author, version, long_about = None)]
struct CliArgs {
    #[arg(short = 'c', long, value_name = "Report Configuration File")]
    config: PathBuf,
    /// Site to report on, overrides `report_settings.site_id`.
    #[arg(short = 's', long)]
    site: Option<u64>,
    /// Year of the temperature and lice series.
    #[arg(long)]
    year: Option<i32>,
    /// Skip the fish-health API.
    #[arg(long)]
    no_fish_health: bool,
    /// Print the selectable sites and exit.
    #[arg(long)]
    list_sites: bool,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Report failed: {}", e);
            eprintln!("Report failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> Result<()> {
    let config_path = args
        .config
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let mut config = read_config(&args.config)?;
    config.resolve_paths(&config_path);
    let log_file = initiate_logger(&config_path, &config.log_settings, true)?;
    info!("Logging to {}", log_file.display());

    if let Some(year) = args.year {
        config.report_settings.year = Some(year);
    }
    if args.no_fish_health {
        config.report_settings.fish_health = false;
    }
    let site_id = SiteId::from(args.site.unwrap_or(config.report_settings.site_id));

    let builder = ReportBuilder::new(config)?;
    if args.list_sites {
        for choice in builder.site_choices() {
            println!("{}", choice);
        }
        return Ok(());
    }
    let report = builder.build(site_id, Local::now().date_naive())?;
    print!("{}", report.render(builder.sites()));
    Ok(())
}
