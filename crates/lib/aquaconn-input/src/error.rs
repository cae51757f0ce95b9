use std::io;
use std::path::PathBuf;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use thiserror::Error;

use aquaconn_core::error::CoreError;
use aquaconn_core::site::SiteId;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("failed to open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Arrow(#[from] ArrowError),

    #[error(transparent)]
    Parquet(#[from] ParquetError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("column {0} is missing")]
    MissingColumn(String),

    #[error("column {column} is empty in row {row}")]
    NullValue { column: String, row: usize },

    #[error("table has no header row")]
    EmptyHeader,

    #[error("{value:?} is not a site id ({context})")]
    InvalidSiteId { value: String, context: String },

    #[error("{value:?} in row {row} is not a number")]
    InvalidNumber { value: String, row: usize },

    #[error("row {row} has {actual} values, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("site {0} has a column but no row")]
    MissingRow(SiteId),

    #[error("site {0} has a row but no column")]
    UnexpectedRow(SiteId),

    #[error("site {0} has more than one row")]
    DuplicateRow(SiteId),
}

pub type Result<T> = std::result::Result<T, InputError>;
