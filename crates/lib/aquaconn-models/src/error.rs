use thiserror::Error;

use aquaconn_core::error::CoreError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("proximity radius must be a number, got {0}")]
    InvalidRadius(f64),

    #[error("particles per site must be positive for fixed normalization")]
    ZeroParticlesPerSite,

    #[error("connectivity calculation stopped after {completed} of {total} sites")]
    Cancelled { completed: usize, total: usize },

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type Result<T> = std::result::Result<T, ModelError>;
