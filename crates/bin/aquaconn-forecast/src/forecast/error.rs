use std::io;
use std::path::PathBuf;

use thiserror::Error;

use aquaconn_core::error::CoreError;
use aquaconn_input::error::InputError;
use aquaconn_models::error::ModelError;
use aquaconn_output::error::OutputError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("failed to read configuration {}: {source}", path.display())]
    ConfigRead { path: PathBuf, source: io::Error },

    #[error("invalid configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid start time {0:?}, expected something like 2024-05-01T12:00:00")]
    StartTime(String),

    #[error("failed to start the drift simulator {program}: {source}")]
    SimulatorStart { program: String, source: io::Error },

    #[error("drift simulator {program} failed with {status}")]
    SimulatorFailed { program: String, status: String },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

pub type Result<T> = std::result::Result<T, AppError>;
