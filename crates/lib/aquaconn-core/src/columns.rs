//! Column names shared by the dataset writers and readers.

/// Trajectory dataset, one row per (trajectory, time) sample.
pub mod trajectory {
    pub const TRAJECTORY: &str = "trajectory";
    pub const TIME: &str = "time";
    pub const LON: &str = "lon";
    pub const LAT: &str = "lat";
    pub const STATUS: &str = "status";
    pub const ORIGIN_MARKER: &str = "origin_marker";
}

/// Seed file handed to the drift simulator.
pub mod seed {
    pub const ORIGIN_MARKER: &str = "origin_marker";
    pub const LON: &str = "lon";
    pub const LAT: &str = "lat";
    pub const NUMBER: &str = "number";
    pub const RADIUS: &str = "radius";
    pub const TIME: &str = "time";
}
