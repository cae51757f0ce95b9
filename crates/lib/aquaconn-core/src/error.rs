use thiserror::Error;

use crate::site::SiteId;
use crate::trajectory::TrajectoryId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("site {0} appears more than once")]
    DuplicateSite(SiteId),

    #[error("site {0} is not known")]
    UnknownSite(SiteId),

    #[error("trajectory {trajectory} originates at site {origin}, which is not in the site table")]
    UnknownOrigin {
        trajectory: TrajectoryId,
        origin: SiteId,
    },

    #[error("a {size}x{size} table needs {expected} values, got {actual}")]
    ShapeMismatch {
        size: usize,
        expected: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, CoreError>;
