use std::fs::File;
use std::io;
use std::path::Path;

use log::{debug, warn};

use aquaconn_core::matrix::ConnectivityMatrix;
use aquaconn_core::site::SiteTable;

use crate::error::{OutputError, Result};

/// How the rows and columns of a written matrix are labelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatrixLabels {
    /// Numeric site ids; the table can be read back.
    SiteId,
    /// Site display names, for people.
    SiteName,
}

impl MatrixLabels {
    fn corner(&self) -> &'static str {
        match self {
            MatrixLabels::SiteId => "localityNo",
            MatrixLabels::SiteName => "name",
        }
    }
}

fn labels_for(matrix: &ConnectivityMatrix, sites: &SiteTable, labels: MatrixLabels) -> Vec<String> {
    matrix
        .site_ids()
        .iter()
        .map(|site_id| match labels {
            MatrixLabels::SiteId => site_id.to_string(),
            MatrixLabels::SiteName => match sites.name_of(*site_id) {
                Some(name) => name.to_string(),
                None => {
                    warn!("Site {} has no name, using its id as label", site_id);
                    site_id.to_string()
                }
            },
        })
        .collect()
}

/// Writes the matrix as CSV: a header row with the origin labels, then one row per target.
pub fn write_matrix<W: io::Write>(
    writer: W,
    matrix: &ConnectivityMatrix,
    sites: &SiteTable,
    labels: MatrixLabels,
) -> Result<()> {
    let names = labels_for(matrix, sites, labels);
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(names.len() + 1);
    header.push(labels.corner().to_string());
    header.extend(names.iter().cloned());
    csv_writer.write_record(&header)?;

    for (row, site_id) in matrix.site_ids().iter().enumerate() {
        let mut record = Vec::with_capacity(names.len() + 1);
        record.push(names[row].clone());
        if let Some(values) = matrix.row(*site_id) {
            record.extend(values.iter().map(|value| value.to_string()));
        }
        csv_writer.write_record(&record)?;
    }
    csv_writer
        .flush()
        .map_err(|e| OutputError::Csv(csv::Error::from(e)))?;
    Ok(())
}

pub fn matrix_to_bytes(
    matrix: &ConnectivityMatrix,
    sites: &SiteTable,
    labels: MatrixLabels,
) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_matrix(&mut buffer, matrix, sites, labels)?;
    Ok(buffer)
}

pub fn write_matrix_file(
    file_path: &Path,
    matrix: &ConnectivityMatrix,
    sites: &SiteTable,
    labels: MatrixLabels,
) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| OutputError::io(parent, e))?;
        }
    }
    let file = File::create(file_path).map_err(|e| OutputError::io(file_path, e))?;
    write_matrix(file, matrix, sites, labels)?;
    debug!(
        "Wrote {}x{} connectivity matrix to {}",
        matrix.len(),
        matrix.len(),
        file_path.display()
    );
    Ok(())
}
