use std::fs::File;
use std::io;
use std::path::PathBuf;

use log::{debug, info};
use serde::Deserialize;
use typed_builder::TypedBuilder;

use aquaconn_core::geo::GeoPoint;
use aquaconn_core::site::{Site, SiteId, SiteTable};

use crate::error::{InputError, Result};

#[derive(Deserialize, Debug)]
struct SiteRecord {
    #[serde(rename = "localityNo")]
    locality_no: u64,
    name: String,
    lon: f64,
    lat: f64,
}

impl From<SiteRecord> for Site {
    fn from(record: SiteRecord) -> Self {
        Site::builder()
            .id(SiteId::from(record.locality_no))
            .name(record.name.trim())
            .position(GeoPoint::new(record.lon, record.lat))
            .build()
    }
}

/// Reads the site table: a CSV file with `localityNo`, `name`, `lon` and `lat` columns.
/// Other columns are ignored.
#[derive(Clone, Debug, TypedBuilder)]
pub struct SiteReader {
    #[builder(setter(into))]
    file_path: PathBuf,
}

impl SiteReader {
    pub fn read(&self) -> Result<SiteTable> {
        debug!("Reading sites from {}", self.file_path.display());
        let file = File::open(&self.file_path).map_err(|source| InputError::Open {
            path: self.file_path.clone(),
            source,
        })?;
        let sites = read_sites(file)?;
        info!(
            "Read {} sites from {}",
            sites.len(),
            self.file_path.display()
        );
        Ok(sites)
    }
}

pub fn read_sites<R: io::Read>(reader: R) -> Result<SiteTable> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let sites = csv_reader
        .deserialize::<SiteRecord>()
        .map(|record| record.map(Site::from))
        .collect::<std::result::Result<Vec<Site>, csv::Error>>()?;
    Ok(SiteTable::new(sites)?)
}

#[cfg(test)]
mod tests {
    use aquaconn_core::error::CoreError;

    use super::*;

    #[test]
    fn test_read_sites_ignores_extra_columns() {
        let data = "\
localityNo,name,municipality,lon,lat
30560,Tristeinen,Frøya,8.3925,63.8736
12870, Aukan ,Frøya,8.4421,63.8081
";
        let sites = read_sites(data.as_bytes()).unwrap();
        assert_eq!(sites.len(), 2);
        let aukan = sites.get(SiteId::from(12870)).unwrap();
        assert_eq!(aukan.name, "Aukan");
        assert_eq!(aukan.position, GeoPoint::new(8.4421, 63.8081));
    }

    #[test]
    fn test_duplicate_ids_fail() {
        let data = "localityNo,name,lon,lat\n1,A,8.0,63.0\n1,B,8.1,63.1\n";
        assert!(matches!(
            read_sites(data.as_bytes()),
            Err(InputError::Core(CoreError::DuplicateSite(_)))
        ));
    }

    #[test]
    fn test_missing_column_fails() {
        let data = "localityNo,name,lon\n1,A,8.0\n";
        assert!(matches!(read_sites(data.as_bytes()), Err(InputError::Csv(_))));
    }
}
