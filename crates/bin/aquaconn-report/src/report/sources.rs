use std::fmt;
use std::fmt::Display;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use log::{debug, error, info};
use serde::Deserialize;

use aquaconn_core::matrix::ConnectivityMatrix;
use aquaconn_core::trajectory::TrajectoryDataset;
use aquaconn_input::matrix::{read_matrix, MatrixReader};
use aquaconn_input::trajectories::TrajectoryReader;
use aquaconn_storage::client::S3Client;
use aquaconn_storage::config::{S3Config, ENDPOINT};
use aquaconn_storage::error::StorageError;
use aquaconn_storage::url::ObjectUrl;

use crate::report::error::{AppError, Result};

/// A result file on local disk or in object storage.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(try_from = "String")]
pub enum DataSource {
    Local(PathBuf),
    Object(ObjectUrl),
}

impl TryFrom<String> for DataSource {
    type Error = StorageError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        if value.trim().starts_with("s3://") {
            Ok(DataSource::Object(value.parse()?))
        } else {
            Ok(DataSource::Local(PathBuf::from(value)))
        }
    }
}

impl Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Local(path) => write!(f, "{}", path.display()),
            DataSource::Object(url) => write!(f, "{}", url),
        }
    }
}

impl DataSource {
    pub fn resolve(&mut self, base: &Path) {
        if let DataSource::Local(path) = self {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, DataSource::Object(_))
    }
}

/// Loads the forecast results, downloading them when they live in object storage.
pub(crate) struct DataLoader {
    client: Option<S3Client>,
}

impl DataLoader {
    pub(crate) fn local() -> Self {
        Self { client: None }
    }

    /// Connects to object storage only when one of `sources` needs it. An unreachable store
    /// is reported as a notice here; the downloads themselves still fail hard.
    pub(crate) fn connect(sources: &[&DataSource], notices: &mut Vec<String>) -> Result<Self> {
        if !sources.iter().any(|source| source.is_remote()) {
            return Ok(Self::local());
        }
        let client = S3Client::new(S3Config::from_env()?)?;
        match client.list_buckets() {
            Ok(buckets) => info!("Connected to object storage, {} buckets", buckets.len()),
            Err(e) => {
                error!("Object storage is not reachable: {}", e);
                notices.push(format!("Object storage is not reachable: {}", e));
            }
        }
        Ok(Self {
            client: Some(client),
        })
    }

    fn download(&self, url: &ObjectUrl) -> Result<Vec<u8>> {
        let client = self
            .client
            .as_ref()
            .ok_or(StorageError::MissingEnv(ENDPOINT))?;
        info!("Opening {}", url);
        Ok(client.get_object(url)?)
    }

    pub(crate) fn connectivity(&self, source: &DataSource) -> Result<ConnectivityMatrix> {
        let matrix = match source {
            DataSource::Local(path) => MatrixReader::builder().file_path(path).build().read()?,
            DataSource::Object(url) => read_matrix(Cursor::new(self.download(url)?))?,
        };
        debug!("Connectivity from {} covers {} sites", source, matrix.len());
        Ok(matrix)
    }

    pub(crate) fn trajectories(&self, source: &DataSource) -> Result<TrajectoryDataset> {
        match source {
            DataSource::Local(path) => Ok(TrajectoryReader::builder()
                .file_path(path)
                .build()
                .read()?),
            DataSource::Object(url) => {
                let bytes = self.download(url)?;
                let mut staged = tempfile::Builder::new()
                    .prefix("aquaconn-trajectories")
                    .suffix(".parquet")
                    .tempfile()
                    .map_err(AppError::Staging)?;
                staged.write_all(&bytes).map_err(AppError::Staging)?;
                staged.flush().map_err(AppError::Staging)?;
                Ok(TrajectoryReader::builder()
                    .file_path(staged.path())
                    .build()
                    .read()?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sources() {
        let remote = DataSource::try_from("s3://aqua/forecast/connectivity.csv".to_string()).unwrap();
        assert_eq!(
            remote,
            DataSource::Object(ObjectUrl::new("aqua", "forecast/connectivity.csv"))
        );
        assert!(remote.is_remote());
        assert_eq!(remote.to_string(), "s3://aqua/forecast/connectivity.csv");

        let mut local = DataSource::try_from("output/connectivity.csv".to_string()).unwrap();
        local.resolve(Path::new("/data"));
        assert_eq!(
            local,
            DataSource::Local(PathBuf::from("/data/output/connectivity.csv"))
        );
        assert!(DataSource::try_from("s3://bucket-only".to_string()).is_err());
    }

    #[test]
    fn test_local_sources_need_no_storage() {
        let mut notices = Vec::new();
        let source = DataSource::Local(PathBuf::from("connectivity.csv"));
        let loader = DataLoader::connect(&[&source], &mut notices).unwrap();
        assert!(loader.client.is_none());
        assert!(notices.is_empty());
    }
}
