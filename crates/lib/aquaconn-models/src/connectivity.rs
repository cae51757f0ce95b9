use std::ops::ControlFlow;

use hashbrown::HashMap;
use log::{debug, info, warn};
use serde::Deserialize;
use typed_builder::TypedBuilder;

use aquaconn_core::distance::DistanceTable;
use aquaconn_core::matrix::ConnectivityMatrix;
use aquaconn_core::site::{SiteId, SiteTable};
use aquaconn_core::trajectory::TrajectoryDataset;

use crate::error::{ModelError, Result};

/// Proximity threshold in meters. A particle counts as passing a site when one of its
/// samples is strictly closer than this.
#[derive(Copy, Clone, Default, Debug, Deserialize, PartialEq)]
pub struct Radius(f64);

impl From<f64> for Radius {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl Radius {
    pub fn as_f64(&self) -> f64 {
        self.0
    }
}

/// How many of the closest sites (the target itself included) are compared with each target.
#[derive(Copy, Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct NeighbourCount(u32);

impl Default for NeighbourCount {
    fn default() -> Self {
        Self(10)
    }
}

impl From<u32> for NeighbourCount {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl NeighbourCount {
    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

/// Denominator used to turn hit counts into percentages.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Normalization {
    /// Each origin is divided by the number of trajectories that carry its marker.
    #[default]
    PerOrigin,
    /// Every origin is divided by the same configured particles-per-site constant.
    Fixed(u32),
}

#[derive(Clone, Debug, TypedBuilder)]
pub struct ConnectivitySettings {
    #[builder(setter(into))]
    pub radius: Radius,
    #[builder(default, setter(into))]
    pub neighbour_count: NeighbourCount,
    #[builder(default)]
    pub normalization: Normalization,
    #[builder(default)]
    pub active_only: bool,
}

impl ConnectivitySettings {
    pub fn validate(&self) -> Result<()> {
        if self.radius.as_f64().is_nan() {
            return Err(ModelError::InvalidRadius(self.radius.as_f64()));
        }
        if self.normalization == Normalization::Fixed(0) {
            return Err(ModelError::ZeroParticlesPerSite);
        }
        Ok(())
    }
}

/// Raw hit counts per (target, origin) cell, with the number of particles each origin
/// released.
#[derive(Clone, Debug)]
pub struct HitCounts {
    site_ids: Vec<SiteId>,
    index: HashMap<SiteId, usize>,
    hits: Vec<u32>,
    particles: HashMap<SiteId, u32>,
}

impl HitCounts {
    fn new(site_ids: Vec<SiteId>, particles: HashMap<SiteId, u32>) -> Self {
        let size = site_ids.len();
        let index = site_ids
            .iter()
            .enumerate()
            .map(|(idx, site_id)| (*site_id, idx))
            .collect();
        Self {
            site_ids,
            index,
            hits: vec![0; size * size],
            particles,
        }
    }

    fn contains(&self, site_id: SiteId) -> bool {
        self.index.contains_key(&site_id)
    }

    fn add(&mut self, target: SiteId, origin: SiteId, hits: u32) {
        if let (Some(row), Some(col)) = (self.index.get(&target), self.index.get(&origin)) {
            self.hits[row * self.site_ids.len() + col] += hits;
        }
    }

    pub fn get(&self, target: SiteId, origin: SiteId) -> Option<u32> {
        let row = self.index.get(&target)?;
        let col = self.index.get(&origin)?;
        Some(self.hits[row * self.site_ids.len() + col])
    }

    pub fn particles_from(&self, origin: SiteId) -> u32 {
        self.particles.get(&origin).copied().unwrap_or_default()
    }

    pub fn total_hits(&self) -> u64 {
        self.hits.iter().map(|hits| *hits as u64).sum()
    }

    /// Converts the counts into percentages. Cells that were never hit stay at zero.
    pub fn normalize(&self, normalization: Normalization) -> Result<ConnectivityMatrix> {
        let size = self.site_ids.len();
        let mut values = vec![0.0; size * size];
        for (cell, hits) in self.hits.iter().enumerate() {
            if *hits == 0 {
                continue;
            }
            let origin = self.site_ids[cell % size];
            let released = match normalization {
                Normalization::PerOrigin => self.particles_from(origin),
                Normalization::Fixed(count) => count,
            };
            if released == 0 {
                warn!("Origin {} has hits but no released particles, leaving it at 0", origin);
                continue;
            }
            let mut percentage = 100.0 * *hits as f64 / released as f64;
            if percentage > 100.0 {
                warn!(
                    "{} hits from origin {} exceed the {} particles it released, clamping to 100%",
                    hits, origin, released
                );
                percentage = 100.0;
            }
            values[cell] = percentage;
        }
        Ok(ConnectivityMatrix::from_values(
            self.site_ids.clone(),
            values,
        )?)
    }
}

/// Counts, for every target site, the particles from its nearest neighbours that pass
/// within the radius, and normalizes the counts into a connectivity matrix.
#[derive(Clone, Debug)]
pub struct ConnectivityAggregator {
    settings: ConnectivitySettings,
}

impl ConnectivityAggregator {
    pub fn new(settings: ConnectivitySettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &ConnectivitySettings {
        &self.settings
    }

    pub fn compute(
        &self,
        sites: &SiteTable,
        distances: &DistanceTable,
        dataset: &TrajectoryDataset,
    ) -> Result<ConnectivityMatrix> {
        self.compute_with_progress(sites, distances, dataset, |_, _| ControlFlow::Continue(()))
    }

    /// Same as [`compute`](Self::compute), calling `progress(done, total)` after every
    /// target site. Returning `ControlFlow::Break` stops the calculation.
    pub fn compute_with_progress<F>(
        &self,
        sites: &SiteTable,
        distances: &DistanceTable,
        dataset: &TrajectoryDataset,
        progress: F,
    ) -> Result<ConnectivityMatrix>
    where
        F: FnMut(usize, usize) -> ControlFlow<()>,
    {
        let counts = self.count_hits(sites, distances, dataset, progress)?;
        counts.normalize(self.settings.normalization)
    }

    pub fn count_hits<F>(
        &self,
        sites: &SiteTable,
        distances: &DistanceTable,
        dataset: &TrajectoryDataset,
        mut progress: F,
    ) -> Result<HitCounts>
    where
        F: FnMut(usize, usize) -> ControlFlow<()>,
    {
        let radius = self.settings.radius.as_f64();
        let neighbour_count = self.settings.neighbour_count.as_usize();
        let active_only = self.settings.active_only;
        let total = sites.len();
        info!(
            "Counting particles within {} m of {} sites from {} trajectories, {} neighbours each",
            radius,
            total,
            dataset.len(),
            neighbour_count
        );

        let by_origin = dataset.by_origin();
        let mut counts = HitCounts::new(sites.ids(), dataset.particles_per_origin());

        for (done, target) in sites.iter().enumerate() {
            match distances.nearest(target.id, neighbour_count) {
                Some(neighbours) => {
                    for origin in neighbours {
                        if !counts.contains(origin) {
                            debug!("Neighbour {} of {} is not a known site", origin, target.id);
                            continue;
                        }
                        let Some(trajectories) = by_origin.get(&origin) else {
                            continue;
                        };
                        let hits = trajectories
                            .iter()
                            .filter(|trajectory| {
                                trajectory.passes_within(&target.position, radius, active_only)
                            })
                            .count() as u32;
                        counts.add(target.id, origin, hits);
                    }
                }
                None => {
                    warn!(
                        "Site {} ({}) is missing from the distance table, skipping it",
                        target.id, target.name
                    );
                }
            }

            if progress(done + 1, total).is_break() {
                info!("Connectivity calculation stopped at {} of {} sites", done + 1, total);
                return Err(ModelError::Cancelled {
                    completed: done + 1,
                    total,
                });
            }
        }
        debug!("Counted {} hits in total", counts.total_hits());
        Ok(counts)
    }
}
