use std::fs::File;
use std::path::PathBuf;

use log::{debug, info, warn};
use typed_builder::TypedBuilder;

use aquaconn_core::distance::DistanceTable;

use crate::error::{InputError, Result};
use crate::square::read_square_table;

const ASYMMETRY_TOLERANCE: f64 = 1e-6;

/// Reads the square site-to-site distance table.
#[derive(Clone, Debug, TypedBuilder)]
pub struct DistanceReader {
    #[builder(setter(into))]
    file_path: PathBuf,
}

impl DistanceReader {
    pub fn read(&self) -> Result<DistanceTable> {
        debug!("Reading distances from {}", self.file_path.display());
        let file = File::open(&self.file_path).map_err(|source| InputError::Open {
            path: self.file_path.clone(),
            source,
        })?;
        let table = read_square_table(file)?;
        let distances = DistanceTable::new(table.site_ids, table.values)?;
        let asymmetry = distances.asymmetry();
        if asymmetry > ASYMMETRY_TOLERANCE {
            warn!(
                "Distance table {} is not symmetric, largest difference {}",
                self.file_path.display(),
                asymmetry
            );
        }
        info!("Read distances between {} sites", distances.len());
        Ok(distances)
    }
}
