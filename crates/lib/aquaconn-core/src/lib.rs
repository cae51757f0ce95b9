#![forbid(unsafe_code)]

pub use hashbrown;

pub mod columns;
pub mod distance;
pub mod error;
pub mod geo;
pub mod matrix;
pub mod site;
pub mod trajectory;
