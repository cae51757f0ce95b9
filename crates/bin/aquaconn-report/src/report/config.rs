use std::path::{Path, PathBuf};

use serde::Deserialize;

use aquaconn_output::logger::LogSettings;

use crate::report::error::{AppError, Result};
use crate::report::sources::DataSource;

fn default_site_id() -> u64 {
    30560
}

fn default_closest_count() -> usize {
    10
}

fn default_fish_health() -> bool {
    true
}

#[derive(Deserialize, Debug, Clone)]
pub struct SiteSettings {
    pub site_file: PathBuf,
    pub distances_file: Option<PathBuf>,
}

/// Where the forecast results are read from: a local path or an `s3://bucket/key` url.
#[derive(Deserialize, Debug, Clone)]
pub struct DataSettings {
    pub connectivity: DataSource,
    pub trajectories: Option<DataSource>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ReportSettings {
    #[serde(default = "default_site_id")]
    pub site_id: u64,
    #[serde(default = "default_closest_count")]
    pub closest_count: usize,
    /// Year of the temperature and lice series. Defaults to the current year.
    pub year: Option<i32>,
    #[serde(default = "default_fish_health")]
    pub fish_health: bool,
    /// Writes the neighbourhood connectivity with site names when set.
    pub submatrix_file: Option<PathBuf>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            site_id: default_site_id(),
            closest_count: default_closest_count(),
            year: None,
            fish_health: default_fish_health(),
            submatrix_file: None,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub log_settings: LogSettings,
    pub site_settings: SiteSettings,
    pub data_settings: DataSettings,
    #[serde(default)]
    pub report_settings: ReportSettings,
}

impl Config {
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
        if let Some(path) = self.report_settings.submatrix_file.as_mut() {
            resolve(path);
        }
        self.data_settings.connectivity.resolve(base);
        if let Some(source) = self.data_settings.trajectories.as_mut() {
            source.resolve(base);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.report_settings.closest_count == 0 {
            return Err(AppError::InvalidConfig(
                "closest_count must be at least 1".to_string(),
            ));
        }
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
