#![forbid(unsafe_code)]

pub mod connectivity;
pub mod error;
