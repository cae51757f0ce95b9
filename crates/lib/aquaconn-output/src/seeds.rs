use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, RecordBatch, StringArray, UInt32Array, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use chrono::{DateTime, SecondsFormat, Utc};

use aquaconn_core::columns::seed::{LAT, LON, NUMBER, ORIGIN_MARKER, RADIUS, TIME};
use aquaconn_core::site::SiteTable;

use crate::error::Result;
use crate::writer::{ResultWriter, WriterType};

/// Seed file for the drift simulator: one row per site with the number of particles to
/// release, the release radius and the release time.
#[derive(Debug)]
pub struct SeedWriter {
    origin_marker: Vec<u64>,
    lon: Vec<f64>,
    lat: Vec<f64>,
    number: Vec<u32>,
    radius: Vec<f64>,
    time: Vec<String>,
    to_output: WriterType,
}

impl SeedWriter {
    pub fn new(output_file: &Path) -> Result<Self> {
        Ok(Self {
            to_output: WriterType::new(output_file, Self::schema())?,
            origin_marker: Vec::new(),
            lon: Vec::new(),
            lat: Vec::new(),
            number: Vec::new(),
            radius: Vec::new(),
            time: Vec::new(),
        })
    }

    pub fn add_sites(
        &mut self,
        sites: &SiteTable,
        particles_per_site: u32,
        seed_radius: f64,
        start_time: DateTime<Utc>,
    ) {
        let time = start_time.to_rfc3339_opts(SecondsFormat::Secs, true);
        for site in sites.iter() {
            self.origin_marker.push(site.id.as_u64());
            self.lon.push(site.position.lon);
            self.lat.push(site.position.lat);
            self.number.push(particles_per_site);
            self.radius.push(seed_radius);
            self.time.push(time.clone());
        }
    }
}

impl ResultWriter for SeedWriter {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new(ORIGIN_MARKER, DataType::UInt64, false),
            Field::new(LON, DataType::Float64, false),
            Field::new(LAT, DataType::Float64, false),
            Field::new(NUMBER, DataType::UInt32, false),
            Field::new(RADIUS, DataType::Float64, false),
            Field::new(TIME, DataType::Utf8, false),
        ])
    }

    fn write_to_file(&mut self) -> Result<()> {
        let record_batch = RecordBatch::try_new(
            Arc::new(Self::schema()),
            vec![
                Arc::new(UInt64Array::from(std::mem::take(&mut self.origin_marker))) as ArrayRef,
                Arc::new(Float64Array::from(std::mem::take(&mut self.lon))) as ArrayRef,
                Arc::new(Float64Array::from(std::mem::take(&mut self.lat))) as ArrayRef,
                Arc::new(UInt32Array::from(std::mem::take(&mut self.number))) as ArrayRef,
                Arc::new(Float64Array::from(std::mem::take(&mut self.radius))) as ArrayRef,
                Arc::new(StringArray::from(std::mem::take(&mut self.time))) as ArrayRef,
            ],
        )?;
        self.to_output.record_batch_to_file(&record_batch)
    }

    fn close_file(self) -> Result<()> {
        self.to_output.close()
    }
}
