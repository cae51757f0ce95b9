use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use aquaconn_core::distance::DistanceTable;
use aquaconn_core::matrix::ConnectivityMatrix;
use aquaconn_core::site::SiteTable;
use aquaconn_core::trajectory::TrajectoryDataset;
use aquaconn_input::distances::DistanceReader;
use aquaconn_input::sites::SiteReader;
use aquaconn_input::trajectories::TrajectoryReader;
use aquaconn_models::connectivity::ConnectivityAggregator;
use aquaconn_output::matrix::{write_matrix_file, MatrixLabels};
use aquaconn_output::ui::RunMetadata;
use aquaconn_runner::runner::{log_progress, run_with_progress};

use crate::forecast::config::{read_config, Config};
use crate::forecast::drift::{run_simulator, write_seed_file};
use crate::forecast::error::{AppError, Result};
use crate::forecast::ui::ProgressRenderer;
use crate::forecast::upload::{plan_uploads, upload_artifacts};

#[derive(Debug, Clone)]
pub(crate) struct RunOptions {
    pub start_time: DateTime<Utc>,
    pub skip_simulation: bool,
    pub skip_upload: bool,
    pub tui: bool,
}

/// What a finished run produced.
#[derive(Debug)]
pub(crate) struct ForecastSummary {
    pub sites: usize,
    pub trajectories: usize,
    pub max_connectivity: f64,
    pub notices: Vec<String>,
}

pub(crate) struct Forecast {
    config: Config,
    config_path: PathBuf,
    options: RunOptions,
    log_file: Option<PathBuf>,
}

impl Forecast {
    pub(crate) fn new(config_file: &Path, options: RunOptions) -> Result<Self> {
        let config_path = config_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let mut config = read_config(config_file)?;
        config.resolve_paths(&config_path);
        Ok(Self {
            config,
            config_path,
            options,
            log_file: None,
        })
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub(crate) fn set_log_file(&mut self, log_file: PathBuf) {
        self.log_file = Some(log_file);
    }

    pub(crate) fn run(&self) -> Result<ForecastSummary> {
        let sites = self.load_sites()?;
        let distances = self.load_distances(&sites)?;
        self.prepare_trajectories(&sites)?;
        let dataset = self.load_trajectories(&sites)?;

        let matrix = self.compute_connectivity(&sites, &distances, &dataset)?;
        self.write_outputs(&sites, &matrix)?;

        let notices = if self.options.skip_upload {
            info!("Skipping uploads");
            Vec::new()
        } else {
            self.upload()
        };
        Ok(ForecastSummary {
            sites: sites.len(),
            trajectories: dataset.len(),
            max_connectivity: matrix.max_value(),
            notices,
        })
    }

    fn load_sites(&self) -> Result<SiteTable> {
        let sites = SiteReader::builder()
            .file_path(&self.config.site_settings.site_file)
            .build()
            .read()?;
        if sites.is_empty() {
            warn!("The site table is empty");
        }
        Ok(sites)
    }

    fn load_distances(&self, sites: &SiteTable) -> Result<DistanceTable> {
        match &self.config.site_settings.distances_file {
            Some(distances_file) => {
                let distances = DistanceReader::builder()
                    .file_path(distances_file)
                    .build()
                    .read()?;
                let missing = sites
                    .iter()
                    .filter(|site| !distances.contains(site.id))
                    .count();
                if missing > 0 {
                    warn!("{} sites have no row in the distance table", missing);
                }
                Ok(distances)
            }
            None => {
                info!("No distance table configured, using geodesic distances between sites");
                Ok(DistanceTable::from_sites(sites))
            }
        }
    }

    fn prepare_trajectories(&self, sites: &SiteTable) -> Result<()> {
        let drift = &self.config.drift_settings;
        if self.options.skip_simulation {
            info!("Skipping the drift simulation, using {}", drift.trajectory_file.display());
            return Ok(());
        }
        let Some(command) = &drift.command else {
            info!(
                "No drift simulator configured, using {}",
                drift.trajectory_file.display()
            );
            return Ok(());
        };
        write_seed_file(drift, sites, self.options.start_time)?;
        run_simulator(command, drift, self.options.start_time)
    }

    fn load_trajectories(&self, sites: &SiteTable) -> Result<TrajectoryDataset> {
        let dataset = TrajectoryReader::builder()
            .file_path(&self.config.drift_settings.trajectory_file)
            .build()
            .read()?;
        dataset.validate_origins(sites)?;
        match dataset.time_window() {
            Some((start, end)) => info!("Trajectories cover {} to {}", start, end),
            None => warn!("The trajectory dataset has no samples"),
        }
        Ok(dataset)
    }

    fn compute_connectivity(
        &self,
        sites: &SiteTable,
        distances: &DistanceTable,
        dataset: &TrajectoryDataset,
    ) -> Result<ConnectivityMatrix> {
        let settings = self
            .config
            .connectivity_settings
            .to_settings(self.config.drift_settings.particles_per_site);
        let aggregator = ConnectivityAggregator::new(settings)?;

        let matrix = if self.options.tui {
            run_with_progress(
                sites.len(),
                self.metadata(dataset),
                ProgressRenderer::new(),
                |progress| aggregator.compute_with_progress(sites, distances, dataset, progress),
            )?
        } else {
            aggregator.compute_with_progress(sites, distances, dataset, log_progress)?
        };
        info!(
            "Connectivity computed for {} sites, largest value {:.2}%",
            matrix.len(),
            matrix.max_value()
        );
        Ok(matrix)
    }

    fn write_outputs(&self, sites: &SiteTable, matrix: &ConnectivityMatrix) -> Result<()> {
        let connectivity = &self.config.connectivity_settings;
        if let Some(with_ids) = &connectivity.output_file_with_site_id {
            write_matrix_file(with_ids, matrix, sites, MatrixLabels::SiteId)?;
            info!("Wrote connectivity with site ids to {}", with_ids.display());
        }
        write_matrix_file(&connectivity.output_file, matrix, sites, MatrixLabels::SiteName)?;
        info!("Wrote connectivity to {}", connectivity.output_file.display());
        Ok(())
    }

    fn upload(&self) -> Vec<String> {
        let Some(storage) = &self.config.storage_settings else {
            debug!("No storage settings, keeping results local");
            return Vec::new();
        };
        let connectivity = &self.config.connectivity_settings;
        let artifacts = plan_uploads(
            storage,
            &self.config.drift_settings.trajectory_file,
            &connectivity.output_file,
            connectivity.output_file_with_site_id.as_deref(),
        );
        upload_artifacts(storage, &artifacts)
    }

    fn metadata(&self, dataset: &TrajectoryDataset) -> RunMetadata {
        RunMetadata {
            start_time: self.options.start_time.to_rfc3339(),
            trajectory_file: self
                .config
                .drift_settings
                .trajectory_file
                .display()
                .to_string(),
            output_file: self
                .config
                .connectivity_settings
                .output_file
                .display()
                .to_string(),
            log_path: self
                .log_file
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_default(),
            trajectories: dataset.len(),
        }
    }
}

/// Accepts RFC 3339 times and naive `YYYY-MM-DDTHH:MM[:SS]` times, which are taken as UTC.
pub(crate) fn parse_start_time(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(time) = DateTime::parse_from_rfc3339(value) {
        return Ok(time.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|format| chrono::NaiveDateTime::parse_from_str(value, format).ok())
        .map(|time| time.and_utc())
        .ok_or_else(|| AppError::StartTime(value.to_string()))
}
