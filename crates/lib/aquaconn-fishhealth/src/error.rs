use thiserror::Error;

#[derive(Error, Debug)]
pub enum FishHealthError {
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("token request answered {status}: {body}")]
    TokenRejected { status: u16, body: String },
}

pub type Result<T> = std::result::Result<T, FishHealthError>;
