use aquaconn_core::distance::DistanceTable;
use aquaconn_core::error::CoreError;
use aquaconn_core::geo::GeoPoint;
use aquaconn_core::site::SiteId;
use aquaconn_core::trajectory::TrajectoryId;
use aquaconn_testutils::site::{make_site_table, sites_in_a_row};
use aquaconn_testutils::trajectory::{offset, stationary_trajectory, DatasetFactory};

#[test]
fn test_particles_per_origin() {
    let here = GeoPoint::new(8.5, 63.5);
    let dataset = DatasetFactory::new()
        .particles(1, 5, &[here])
        .particles(2, 3, &[here, here])
        .build();
    let counts = dataset.particles_per_origin();
    assert_eq!(counts.get(&SiteId::from(1)), Some(&5));
    assert_eq!(counts.get(&SiteId::from(2)), Some(&3));
    assert_eq!(dataset.by_origin().get(&SiteId::from(2)).unwrap().len(), 3);
}

#[test]
fn test_unknown_origin_is_reported() {
    let sites = make_site_table(&[(1, "A", 8.5, 63.5)]);
    let dataset = DatasetFactory::new()
        .trajectory(stationary_trajectory(0, 1, GeoPoint::new(8.5, 63.5), 2))
        .trajectory(stationary_trajectory(1, 7, GeoPoint::new(8.5, 63.5), 2))
        .build();
    assert_eq!(
        dataset.validate_origins(&sites),
        Err(CoreError::UnknownOrigin {
            trajectory: TrajectoryId::from(1),
            origin: SiteId::from(7),
        })
    );
}

#[test]
fn test_distance_table_from_sites() {
    let sites = sites_in_a_row(4, 1000.0);
    let table = DistanceTable::from_sites(&sites);
    assert_eq!(table.len(), 4);
    let d = table.get(SiteId::from(100), SiteId::from(101)).unwrap();
    assert!((d - 1000.0).abs() < 10.0, "got {}", d);
    assert_eq!(table.get(SiteId::from(102), SiteId::from(102)), Some(0.0));
    assert_eq!(
        table.nearest(SiteId::from(101), 3).unwrap(),
        vec![SiteId::from(101), SiteId::from(100), SiteId::from(102)]
    );
    assert!(table.asymmetry() < 1e-9);
}

#[test]
fn test_offset_helper_matches_geodesic() {
    let origin = GeoPoint::new(8.5, 63.5);
    let moved = offset(&origin, 0.0, 200.0);
    let d = origin.distance_to(&moved);
    assert!((d - 200.0).abs() < 2.0, "got {}", d);
}
