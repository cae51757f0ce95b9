use std::fmt;
use std::fmt::{Debug, Display};

use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use serde::Deserialize;

use crate::error::{CoreError, Result};
use crate::geo::GeoPoint;
use crate::site::{SiteId, SiteTable};

/// Identifier of one simulated particle path.
#[derive(Deserialize, Default, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct TrajectoryId(u64);

impl Display for TrajectoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Debug for TrajectoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TrajectoryId {
    fn from(f: u64) -> Self {
        Self(f)
    }
}

impl TrajectoryId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// Sample time as seconds since the Unix epoch.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EpochSeconds(pub i64);

impl Display for EpochSeconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_datetime() {
            Some(time) => write!(f, "{}", time.format("%Y-%m-%dT%H:%M")),
            None => write!(f, "{}", self.0),
        }
    }
}

impl From<i64> for EpochSeconds {
    fn from(f: i64) -> Self {
        Self(f)
    }
}

impl From<DateTime<Utc>> for EpochSeconds {
    fn from(f: DateTime<Utc>) -> Self {
        Self(f.timestamp())
    }
}

impl EpochSeconds {
    pub fn as_i64(&self) -> i64 {
        self.0
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.0, 0)
    }
}

/// Particle state at a sample. The simulator writes 0 for active particles; any other code
/// (stranded, deactivated, ...) is kept as is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParticleStatus {
    Active,
    Inactive(i32),
}

impl From<i32> for ParticleStatus {
    fn from(code: i32) -> Self {
        match code {
            0 => ParticleStatus::Active,
            other => ParticleStatus::Inactive(other),
        }
    }
}

impl ParticleStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, ParticleStatus::Active)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub time: EpochSeconds,
    pub position: GeoPoint,
    pub status: ParticleStatus,
}

impl Sample {
    pub fn new(time: EpochSeconds, position: GeoPoint, status: ParticleStatus) -> Self {
        Self {
            time,
            position,
            status,
        }
    }

    /// Whether the sample carries a usable position. Masked positions are non-finite.
    pub fn is_usable(&self, active_only: bool) -> bool {
        self.position.is_finite() && (!active_only || self.status.is_active())
    }
}

/// One particle path, tagged with the site it was seeded from.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    pub id: TrajectoryId,
    pub origin: SiteId,
    pub samples: Vec<Sample>,
}

impl Trajectory {
    pub fn new(id: TrajectoryId, origin: SiteId) -> Self {
        Self {
            id,
            origin,
            samples: Vec::new(),
        }
    }

    pub fn with_samples(id: TrajectoryId, origin: SiteId, samples: Vec<Sample>) -> Self {
        Self {
            id,
            origin,
            samples,
        }
    }

    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn positions(&self, active_only: bool) -> impl Iterator<Item = &GeoPoint> {
        self.samples
            .iter()
            .filter(move |sample| sample.is_usable(active_only))
            .map(|sample| &sample.position)
    }

    /// Smallest geodesic distance between `point` and any usable sample, if there is one.
    pub fn min_distance_to(&self, point: &GeoPoint, active_only: bool) -> Option<f64> {
        self.positions(active_only)
            .map(|position| point.distance_to(position))
            .filter(|distance| !distance.is_nan())
            .reduce(f64::min)
    }

    /// True when some usable sample lies strictly closer than `threshold` meters to `point`.
    /// Equivalent to `min_distance_to(..) < threshold`, but stops at the first hit.
    pub fn passes_within(&self, point: &GeoPoint, threshold: f64, active_only: bool) -> bool {
        self.positions(active_only)
            .any(|position| point.distance_to(position) < threshold)
    }
}

/// All particle paths of one simulation run.
#[derive(Clone, Debug, Default)]
pub struct TrajectoryDataset {
    trajectories: Vec<Trajectory>,
}

impl TrajectoryDataset {
    pub fn new(trajectories: Vec<Trajectory>) -> Self {
        Self { trajectories }
    }

    pub fn trajectories(&self) -> &[Trajectory] {
        &self.trajectories
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trajectory> {
        self.trajectories.iter()
    }

    pub fn len(&self) -> usize {
        self.trajectories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty()
    }

    /// Number of particles seeded at each origin, counted from the trajectories themselves.
    pub fn particles_per_origin(&self) -> HashMap<SiteId, u32> {
        let mut counts: HashMap<SiteId, u32> = HashMap::new();
        for trajectory in self.trajectories.iter() {
            *counts.entry(trajectory.origin).or_default() += 1;
        }
        counts
    }

    pub fn by_origin(&self) -> HashMap<SiteId, Vec<&Trajectory>> {
        let mut grouped: HashMap<SiteId, Vec<&Trajectory>> = HashMap::new();
        for trajectory in self.trajectories.iter() {
            grouped.entry(trajectory.origin).or_default().push(trajectory);
        }
        grouped
    }

    /// First and last sample time over all trajectories.
    pub fn time_window(&self) -> Option<(EpochSeconds, EpochSeconds)> {
        let mut times = self
            .trajectories
            .iter()
            .flat_map(|trajectory| trajectory.samples.iter().map(|sample| sample.time));
        let first = times.next()?;
        Some(times.fold((first, first), |(start, end), time| {
            (start.min(time), end.max(time))
        }))
    }

    pub fn validate_origins(&self, sites: &SiteTable) -> Result<()> {
        match self
            .trajectories
            .iter()
            .find(|trajectory| !sites.contains(trajectory.origin))
        {
            Some(trajectory) => Err(CoreError::UnknownOrigin {
                trajectory: trajectory.id,
                origin: trajectory.origin,
            }),
            None => Ok(()),
        }
    }
}
