pub(crate) mod config;
pub(crate) mod enrich;
pub(crate) mod error;
pub(crate) mod page;
pub(crate) mod queries;
pub(crate) mod sources;
