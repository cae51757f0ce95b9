use std::fs::File;
use std::io;
use std::path::PathBuf;

use log::debug;
use typed_builder::TypedBuilder;

use aquaconn_core::matrix::ConnectivityMatrix;

use crate::error::{InputError, Result};
use crate::square::read_square_table;

/// Reads back a connectivity matrix written with site ids as headers.
#[derive(Clone, Debug, TypedBuilder)]
pub struct MatrixReader {
    #[builder(setter(into))]
    file_path: PathBuf,
}

impl MatrixReader {
    pub fn read(&self) -> Result<ConnectivityMatrix> {
        debug!("Reading connectivity from {}", self.file_path.display());
        let file = File::open(&self.file_path).map_err(|source| InputError::Open {
            path: self.file_path.clone(),
            source,
        })?;
        read_matrix(file)
    }
}

pub fn read_matrix<R: io::Read>(reader: R) -> Result<ConnectivityMatrix> {
    let table = read_square_table(reader)?;
    Ok(ConnectivityMatrix::from_values(table.site_ids, table.values)?)
}
