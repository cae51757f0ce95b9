use std::path::{Path, PathBuf};

use serde::Deserialize;

use aquaconn_models::connectivity::{
    ConnectivitySettings, NeighbourCount, Normalization, Radius,
};
use aquaconn_output::logger::LogSettings;

use crate::forecast::error::{AppError, Result};

fn default_duration_hours() -> u32 {
    24
}

fn default_time_step_seconds() -> u32 {
    600
}

fn default_seed_radius() -> f64 {
    10.0
}

#[derive(Deserialize, Debug, Clone)]
pub struct SiteSettings {
    pub site_file: PathBuf,
    pub distances_file: Option<PathBuf>,
}

/// External program that runs the particle drift. Arguments may contain the
/// placeholders `{seed_file}`, `{trajectory_file}`, `{start_time}`, `{duration_hours}`
/// and `{time_step_seconds}`.
#[derive(Deserialize, Debug, Clone)]
pub struct DriftCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct DriftSettings {
    pub particles_per_site: u32,
    #[serde(default = "default_duration_hours")]
    pub duration_hours: u32,
    #[serde(default = "default_time_step_seconds")]
    pub time_step_seconds: u32,
    #[serde(default = "default_seed_radius")]
    pub seed_radius: f64,
    pub seed_file: PathBuf,
    pub trajectory_file: PathBuf,
    pub command: Option<DriftCommand>,
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationKind {
    /// Divide by the particles each origin actually released.
    #[default]
    PerOrigin,
    /// Divide every origin by `particles_per_site`.
    Fixed,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ConnectivityConfig {
    #[serde(default)]
    pub neighbour_count: NeighbourCount,
    pub radius: Radius,
    #[serde(default)]
    pub normalization: NormalizationKind,
    #[serde(default)]
    pub active_only: bool,
    pub output_file: PathBuf,
    pub output_file_with_site_id: Option<PathBuf>,
}

impl ConnectivityConfig {
    pub fn to_settings(&self, particles_per_site: u32) -> ConnectivitySettings {
        let normalization = match self.normalization {
            NormalizationKind::PerOrigin => Normalization::PerOrigin,
            NormalizationKind::Fixed => Normalization::Fixed(particles_per_site),
        };
        ConnectivitySettings::builder()
            .radius(self.radius)
            .neighbour_count(self.neighbour_count)
            .normalization(normalization)
            .active_only(self.active_only)
            .build()
    }
}

/// Object keys for the uploaded artifacts. A missing key skips that upload.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct StorageSettings {
    pub bucket: Option<String>,
    pub trajectory_key: Option<String>,
    pub connectivity_key: Option<String>,
    pub connectivity_with_site_id_key: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub log_settings: LogSettings,
    pub site_settings: SiteSettings,
    pub drift_settings: DriftSettings,
    pub connectivity_settings: ConnectivityConfig,
    pub storage_settings: Option<StorageSettings>,
}

impl Config {
    /// Makes every relative file path relative to `base`, the directory of the config file.
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        resolve(&mut self.site_settings.site_file);
        if let Some(path) = self.site_settings.distances_file.as_mut() {
            resolve(path);
        }
        resolve(&mut self.drift_settings.seed_file);
        resolve(&mut self.drift_settings.trajectory_file);
        resolve(&mut self.connectivity_settings.output_file);
        if let Some(path) = self.connectivity_settings.output_file_with_site_id.as_mut() {
            resolve(path);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.drift_settings.particles_per_site == 0 {
            return Err(AppError::InvalidConfig(
                "particles_per_site must be at least 1".to_string(),
            ));
        }
        if self.drift_settings.time_step_seconds == 0 {
            return Err(AppError::InvalidConfig(
                "time_step_seconds must be at least 1".to_string(),
            ));
        }
        self.connectivity_settings
            .to_settings(self.drift_settings.particles_per_site)
            .validate()?;
        Ok(())
    }
}

pub(crate) fn parse_config(input_toml: &str) -> Result<Config> {
    let config: Config = toml::from_str(input_toml)?;
    config.validate()?;
    Ok(config)
}

pub(crate) fn read_config(file_path: &Path) -> Result<Config> {
    let input_toml = std::fs::read_to_string(file_path).map_err(|source| AppError::ConfigRead {
        path: file_path.to_path_buf(),
        source,
    })?;
    parse_config(&input_toml)
}
