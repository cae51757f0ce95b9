use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int32Array, Int64Array, RecordBatch, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};

use aquaconn_core::columns::trajectory::{LAT, LON, ORIGIN_MARKER, STATUS, TIME, TRAJECTORY};
use aquaconn_core::trajectory::{ParticleStatus, Trajectory};

use crate::error::Result;
use crate::writer::{ResultWriter, WriterType};

/// Writes trajectories in the long format the trajectory reader expects. Masked
/// (non-finite) coordinates are written as nulls.
#[derive(Debug)]
pub struct TrajectoryWriter {
    trajectory: Vec<u64>,
    time: Vec<i64>,
    lon: Vec<Option<f64>>,
    lat: Vec<Option<f64>>,
    status: Vec<i32>,
    origin_marker: Vec<u64>,
    to_output: WriterType,
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

impl TrajectoryWriter {
    pub fn new(output_file: &Path) -> Result<Self> {
        Ok(Self {
            to_output: WriterType::new(output_file, Self::schema())?,
            trajectory: Vec::new(),
            time: Vec::new(),
            lon: Vec::new(),
            lat: Vec::new(),
            status: Vec::new(),
            origin_marker: Vec::new(),
        })
    }

    pub fn add_trajectory(&mut self, trajectory: &Trajectory) {
        for sample in trajectory.samples.iter() {
            self.trajectory.push(trajectory.id.as_u64());
            self.time.push(sample.time.as_i64());
            self.lon.push(finite(sample.position.lon));
            self.lat.push(finite(sample.position.lat));
            self.status.push(match sample.status {
                ParticleStatus::Active => 0,
                ParticleStatus::Inactive(code) => code,
            });
            self.origin_marker.push(trajectory.origin.as_u64());
        }
    }
}

impl ResultWriter for TrajectoryWriter {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new(TRAJECTORY, DataType::UInt64, false),
            Field::new(TIME, DataType::Int64, false),
            Field::new(LON, DataType::Float64, true),
            Field::new(LAT, DataType::Float64, true),
            Field::new(STATUS, DataType::Int32, true),
            Field::new(ORIGIN_MARKER, DataType::UInt64, false),
        ])
    }

    fn write_to_file(&mut self) -> Result<()> {
        let record_batch = RecordBatch::try_new(
            Arc::new(Self::schema()),
            vec![
                Arc::new(UInt64Array::from(std::mem::take(&mut self.trajectory))) as ArrayRef,
                Arc::new(Int64Array::from(std::mem::take(&mut self.time))) as ArrayRef,
                Arc::new(Float64Array::from(std::mem::take(&mut self.lon))) as ArrayRef,
                Arc::new(Float64Array::from(std::mem::take(&mut self.lat))) as ArrayRef,
                Arc::new(Int32Array::from(std::mem::take(&mut self.status))) as ArrayRef,
                Arc::new(UInt64Array::from(std::mem::take(&mut self.origin_marker))) as ArrayRef,
            ],
        )?;
        self.to_output.record_batch_to_file(&record_batch)
    }

    fn close_file(self) -> Result<()> {
        self.to_output.close()
    }
}
