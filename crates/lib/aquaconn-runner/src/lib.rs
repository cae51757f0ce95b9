#![forbid(unsafe_code)]

pub mod runner;
