use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("no bucket given and AWS_BUCKET_NAME is not set")]
    NoBucket,

    #[error("{0:?} is not an s3://bucket/key url")]
    InvalidUrl(String),

    #[error("failed to read {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("failed to sign request: {0}")]
    Signing(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("{method} {url} answered {status}: {body}")]
    Status {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("malformed bucket listing: {0}")]
    Xml(#[from] quick_xml::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;
