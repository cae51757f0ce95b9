#![forbid(unsafe_code)]

pub mod batch;
pub mod distances;
pub mod error;
pub mod matrix;
pub mod sites;
pub mod square;
pub mod trajectories;
