use hashbrown::HashSet;
use log::{debug, warn};

use aquaconn_core::distance::DistanceTable;
use aquaconn_core::matrix::ConnectivityMatrix;
use aquaconn_core::site::{SiteId, SiteTable};
use aquaconn_core::trajectory::{EpochSeconds, TrajectoryDataset, TrajectoryId};

use crate::report::error::{AppError, Result};

/// The sites closest to a selected site, closest first and the site itself included.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ClosestSites {
    pub ids: Vec<SiteId>,
    /// Names of the ids found in the site table, in the same order. Unknown ids are left out.
    pub names: Vec<String>,
}

pub(crate) fn closest_sites(
    distances: &DistanceTable,
    sites: &SiteTable,
    site_id: SiteId,
    count: usize,
) -> Result<ClosestSites> {
    let ids = distances
        .nearest(site_id, count)
        .ok_or(AppError::NoDistances(site_id))?;
    let names = ids
        .iter()
        .filter_map(|id| sites.name_of(*id).map(str::to_string))
        .collect::<Vec<String>>();
    if names.len() < ids.len() {
        debug!(
            "{} of the sites closest to {} are not in the site table",
            ids.len() - names.len(),
            site_id
        );
    }
    Ok(ClosestSites { ids, names })
}

/// The connectivity between `ordered_ids`, rows and columns in the given order. Sites the
/// matrix does not cover are left out with a warning.
pub(crate) fn connectivity_submatrix(
    matrix: &ConnectivityMatrix,
    ordered_ids: &[SiteId],
) -> Result<ConnectivityMatrix> {
    let covered: Vec<SiteId> = ordered_ids
        .iter()
        .copied()
        .filter(|site_id| {
            let known = matrix.index_of(*site_id).is_some();
            if !known {
                warn!("Site {} is not in the connectivity matrix", site_id);
            }
            known
        })
        .collect();
    Ok(matrix.submatrix(&covered)?)
}

/// First and last sample time of the simulation.
pub(crate) fn simulation_window(dataset: &TrajectoryDataset) -> Option<(EpochSeconds, EpochSeconds)> {
    dataset.time_window()
}

/// Active track points of one trajectory.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Track {
    pub trajectory: TrajectoryId,
    pub origin: SiteId,
    pub points: usize,
}

/// Tracks of the trajectories seeded at `origins`, keeping only the samples where the
/// particle was active.
pub(crate) fn tracks_for(dataset: &TrajectoryDataset, origins: &[SiteId]) -> Vec<Track> {
    let selected: HashSet<SiteId> = origins.iter().copied().collect();
    dataset
        .iter()
        .filter(|trajectory| selected.contains(&trajectory.origin))
        .map(|trajectory| Track {
            trajectory: trajectory.id,
            origin: trajectory.origin,
            points: trajectory.positions(true).count(),
        })
        .collect()
}

/// Number of trajectories and active points per origin, in the order of `origins`.
pub(crate) fn track_totals(tracks: &[Track], origins: &[SiteId]) -> Vec<(SiteId, usize, usize)> {
    origins
        .iter()
        .map(|origin| {
            tracks
                .iter()
                .filter(|track| track.origin == *origin)
                .fold((*origin, 0, 0), |(origin, count, points), track| {
                    (origin, count + 1, points + track.points)
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use aquaconn_core::geo::GeoPoint;
    use aquaconn_core::trajectory::{ParticleStatus, Sample, Trajectory};
    use aquaconn_testutils::site::make_site_table;
    use aquaconn_testutils::trajectory::{stationary_trajectory, DatasetFactory};

    use super::*;

    fn ids(raw: &[u64]) -> Vec<SiteId> {
        raw.iter().map(|id| SiteId::from(*id)).collect()
    }

    fn distances() -> DistanceTable {
        #[rustfmt::skip]
        let values = vec![
            0.0, 3.0, 1.0,
            3.0, 0.0, 2.0,
            1.0, 2.0, 0.0,
        ];
        DistanceTable::new(ids(&[30560, 10, 20]), values).unwrap()
    }

    #[test]
    fn test_closest_sites_drop_unknown_names() {
        let sites = make_site_table(&[(30560, "Tristeinen", 8.5, 63.5), (10, "Aukan", 8.6, 63.5)]);
        let closest = closest_sites(&distances(), &sites, SiteId::from(30560), 10).unwrap();
        assert_eq!(closest.ids, ids(&[30560, 20, 10]));
        assert_eq!(closest.names, vec!["Tristeinen", "Aukan"]);

        let two = closest_sites(&distances(), &sites, SiteId::from(10), 2).unwrap();
        assert_eq!(two.ids, ids(&[10, 20]));
        assert!(matches!(
            closest_sites(&distances(), &sites, SiteId::from(99), 2),
            Err(AppError::NoDistances(_))
        ));
    }

    #[test]
    fn test_submatrix_follows_distance_order() {
        let matrix = ConnectivityMatrix::from_values(
            ids(&[10, 20, 30560]),
            vec![0.0, 1.0, 2.0, 3.0, 0.0, 5.0, 6.0, 7.0, 0.0],
        )
        .unwrap();
        let sub = connectivity_submatrix(&matrix, &ids(&[30560, 20, 99])).unwrap();
        assert_eq!(sub.site_ids(), ids(&[30560, 20]).as_slice());
        assert_eq!(sub.values(), &[0.0, 7.0, 5.0, 0.0]);
    }

    #[test]
    fn test_tracks_keep_active_points_of_selected_origins() {
        let position = GeoPoint::new(8.5, 63.5);
        let stranded = Trajectory::with_samples(
            TrajectoryId::from(7),
            SiteId::from(1),
            vec![
                Sample::new(EpochSeconds::from(0), position, ParticleStatus::Active),
                Sample::new(EpochSeconds::from(600), position, ParticleStatus::Inactive(1)),
            ],
        );
        let dataset = DatasetFactory::new()
            .trajectory(stationary_trajectory(0, 1, position, 3))
            .trajectory(stranded)
            .trajectory(stationary_trajectory(1, 2, position, 4))
            .build();

        let tracks = tracks_for(&dataset, &ids(&[1]));
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[1].points, 1);
        assert_eq!(
            track_totals(&tracks, &ids(&[1, 2])),
            vec![(SiteId::from(1), 2, 4), (SiteId::from(2), 0, 0)]
        );
        assert_eq!(
            simulation_window(&dataset),
            Some((EpochSeconds::from(0), EpochSeconds::from(1800)))
        );
    }
}
