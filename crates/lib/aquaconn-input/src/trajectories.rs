use std::fs::File;
use std::path::PathBuf;

use arrow::record_batch::RecordBatch;
use hashbrown::HashMap;
use log::{debug, info, warn};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use typed_builder::TypedBuilder;

use aquaconn_core::columns::trajectory::{LAT, LON, ORIGIN_MARKER, STATUS, TIME, TRAJECTORY};
use aquaconn_core::geo::GeoPoint;
use aquaconn_core::site::SiteId;
use aquaconn_core::trajectory::{
    EpochSeconds, ParticleStatus, Sample, Trajectory, TrajectoryDataset, TrajectoryId,
};

use crate::batch::{read_f64_column, read_i32_column_or, read_i64_column, read_u64_column};
use crate::error::{InputError, Result};

/// Status code given to samples whose status is missing.
const MISSING_STATUS: i32 = -1;

/// Reads the simulator output: a Parquet file in long format with one row per
/// (trajectory, time) sample. Trajectories keep the order in which they first appear and
/// their samples are sorted by time. The origin of a trajectory is taken from its first row.
#[derive(Clone, Debug, TypedBuilder)]
pub struct TrajectoryReader {
    #[builder(setter(into))]
    file_path: PathBuf,
}

impl TrajectoryReader {
    pub fn read(&self) -> Result<TrajectoryDataset> {
        debug!("Reading trajectories from {}", self.file_path.display());
        let file = File::open(&self.file_path).map_err(|source| InputError::Open {
            path: self.file_path.clone(),
            source,
        })?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

        let mut collector = TrajectoryCollector::default();
        for record_batch in reader {
            collector.add_batch(&record_batch?)?;
        }
        let dataset = collector.finish();
        info!(
            "Read {} trajectories from {}",
            dataset.len(),
            self.file_path.display()
        );
        Ok(dataset)
    }
}

#[derive(Default)]
struct TrajectoryCollector {
    index: HashMap<TrajectoryId, usize>,
    trajectories: Vec<Trajectory>,
    conflicts: usize,
}

impl TrajectoryCollector {
    fn add_batch(&mut self, record_batch: &RecordBatch) -> Result<()> {
        let ids = read_u64_column(TRAJECTORY, record_batch)?;
        let times = read_i64_column(TIME, record_batch)?;
        let lons = read_f64_column(LON, record_batch)?;
        let lats = read_f64_column(LAT, record_batch)?;
        let origins = read_u64_column(ORIGIN_MARKER, record_batch)?;
        let statuses = if record_batch.column_by_name(STATUS).is_some() {
            read_i32_column_or(STATUS, record_batch, MISSING_STATUS)?
        } else {
            vec![0; record_batch.num_rows()]
        };

        for row in 0..record_batch.num_rows() {
            let trajectory_id = TrajectoryId::from(ids[row]);
            let origin = SiteId::from(origins[row]);
            let sample = Sample::new(
                EpochSeconds::from(times[row]),
                GeoPoint::new(lons[row], lats[row]),
                ParticleStatus::from(statuses[row]),
            );
            let slot = match self.index.get(&trajectory_id) {
                Some(slot) => *slot,
                None => {
                    self.trajectories
                        .push(Trajectory::new(trajectory_id, origin));
                    self.index.insert(trajectory_id, self.trajectories.len() - 1);
                    self.trajectories.len() - 1
                }
            };
            let trajectory = &mut self.trajectories[slot];
            if trajectory.origin != origin {
                self.conflicts += 1;
                debug!(
                    "Trajectory {} has origin {} and {}",
                    trajectory_id, trajectory.origin, origin
                );
            }
            trajectory.push(sample);
        }
        Ok(())
    }

    fn finish(mut self) -> TrajectoryDataset {
        if self.conflicts > 0 {
            warn!(
                "{} samples carry a different origin marker than the first sample of their trajectory",
                self.conflicts
            );
        }
        for trajectory in self.trajectories.iter_mut() {
            trajectory.samples.sort_by_key(|sample| sample.time);
        }
        TrajectoryDataset::new(self.trajectories)
    }
}
