use std::io;
use std::path::PathBuf;

use thiserror::Error;

use aquaconn_core::error::CoreError;
use aquaconn_core::site::SiteId;
use aquaconn_input::error::InputError;
use aquaconn_output::error::OutputError;
use aquaconn_storage::error::StorageError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("failed to read configuration {}: {source}", path.display())]
    ConfigRead { path: PathBuf, source: io::Error },

    #[error("invalid configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("site {0} is not in the site table")]
    UnknownSite(SiteId),

    #[error("site {0} has no row in the distance table")]
    NoDistances(SiteId),

    #[error("failed to stage downloaded data: {0}")]
    Staging(io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, AppError>;
