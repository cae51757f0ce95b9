use aquaconn_core::geo::{geodesic_distance, haversine_distance, GeoPoint};

#[test]
fn test_vincenty_reference_line() {
    // Flinders Peak to Buninyong, the classic geodesic test line.
    let flinders_peak = GeoPoint::new(144.424_867_888_9, -37.951_033_416_7);
    let buninyong = GeoPoint::new(143.926_495_527_8, -37.652_821_138_9);
    let distance = geodesic_distance(&flinders_peak, &buninyong);
    assert!((distance - 54_972.271).abs() < 0.05, "got {}", distance);
}

#[test]
fn test_one_degree_of_latitude_at_sixty_north() {
    let south = GeoPoint::new(10.0, 59.5);
    let north = GeoPoint::new(10.0, 60.5);
    let distance = geodesic_distance(&south, &north);
    assert!((distance - 111_412.0).abs() < 5.0, "got {}", distance);
}

#[test]
fn test_antimeridian_crossing_is_short() {
    let east = GeoPoint::new(179.9995, 0.0);
    let west = GeoPoint::new(-179.9995, 0.0);
    let geodesic = geodesic_distance(&east, &west);
    let spherical = haversine_distance(&east, &west);
    assert!(geodesic > 100.0 && geodesic < 120.0, "got {}", geodesic);
    assert!(spherical > 100.0 && spherical < 120.0, "got {}", spherical);
}

#[test]
fn test_distance_is_symmetric() {
    let a = GeoPoint::new(8.39, 63.68);
    let b = GeoPoint::new(8.85, 63.91);
    assert!((a.distance_to(&b) - b.distance_to(&a)).abs() < 1e-6);
}

#[test]
fn test_nearly_antipodal_points_fall_back() {
    let a = GeoPoint::new(0.0, 0.0);
    let b = GeoPoint::new(179.7, 0.5);
    let distance = geodesic_distance(&a, &b);
    assert!(distance.is_finite());
    assert!(distance > 19_900_000.0 && distance < 20_050_000.0, "got {}", distance);
}
