use aquaconn_core::geo::{GeoPoint, MEAN_EARTH_RADIUS};
use aquaconn_core::site::SiteId;
use aquaconn_core::trajectory::{
    EpochSeconds, ParticleStatus, Sample, Trajectory, TrajectoryDataset, TrajectoryId,
};

pub const STEP_SECONDS: i64 = 600;

/// Moves `point` by the given distances in meters. Good enough for fixtures a few
/// kilometers across.
pub fn offset(point: &GeoPoint, north_m: f64, east_m: f64) -> GeoPoint {
    let d_lat = (north_m / MEAN_EARTH_RADIUS).to_degrees();
    let d_lon = (east_m / (MEAN_EARTH_RADIUS * point.lat.to_radians().cos())).to_degrees();
    GeoPoint::new(point.lon + d_lon, point.lat + d_lat)
}

pub fn path_trajectory(id: u64, origin: u64, path: &[GeoPoint]) -> Trajectory {
    let samples = path
        .iter()
        .enumerate()
        .map(|(step, position)| {
            Sample::new(
                EpochSeconds::from(step as i64 * STEP_SECONDS),
                *position,
                ParticleStatus::Active,
            )
        })
        .collect();
    Trajectory::with_samples(TrajectoryId::from(id), SiteId::from(origin), samples)
}

pub fn stationary_trajectory(id: u64, origin: u64, position: GeoPoint, steps: usize) -> Trajectory {
    path_trajectory(id, origin, &vec![position; steps])
}

/// Builds datasets with consecutive trajectory ids.
#[derive(Default)]
pub struct DatasetFactory {
    trajectories: Vec<Trajectory>,
}

impl DatasetFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `count` particles from `origin`, all following `path`.
    pub fn particles(mut self, origin: u64, count: usize, path: &[GeoPoint]) -> Self {
        for _ in 0..count {
            let id = self.trajectories.len() as u64;
            self.trajectories.push(path_trajectory(id, origin, path));
        }
        self
    }

    pub fn trajectory(mut self, trajectory: Trajectory) -> Self {
        self.trajectories.push(trajectory);
        self
    }

    pub fn build(self) -> TrajectoryDataset {
        TrajectoryDataset::new(self.trajectories)
    }
}
