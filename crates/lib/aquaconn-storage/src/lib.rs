#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod error;
pub mod signing;
pub mod url;
