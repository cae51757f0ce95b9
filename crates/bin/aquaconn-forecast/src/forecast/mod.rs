pub(crate) mod config;
pub(crate) mod drift;
pub(crate) mod error;
pub(crate) mod runner;
pub(crate) mod ui;
pub(crate) mod upload;
