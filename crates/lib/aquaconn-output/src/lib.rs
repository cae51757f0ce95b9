#![forbid(unsafe_code)]

pub mod error;
pub mod logger;
pub mod matrix;
pub mod seeds;
pub mod terminal;
pub mod trajectories;
pub mod ui;
pub mod writer;
