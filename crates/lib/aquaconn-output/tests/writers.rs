use std::fs;

use chrono::{TimeZone, Utc};

use aquaconn_core::columns::trajectory;
use aquaconn_core::geo::GeoPoint;
use aquaconn_core::matrix::ConnectivityMatrix;
use aquaconn_core::site::SiteId;
use aquaconn_core::trajectory::{EpochSeconds, ParticleStatus, Sample, Trajectory, TrajectoryId};
use aquaconn_input::matrix::MatrixReader;
use aquaconn_input::trajectories::TrajectoryReader;
use aquaconn_output::matrix::{matrix_to_bytes, write_matrix_file, MatrixLabels};
use aquaconn_output::seeds::SeedWriter;
use aquaconn_output::trajectories::TrajectoryWriter;
use aquaconn_output::writer::ResultWriter;
use aquaconn_testutils::site::make_site_table;
use aquaconn_testutils::trajectory::DatasetFactory;

fn ids(raw: &[u64]) -> Vec<SiteId> {
    raw.iter().map(|id| SiteId::from(*id)).collect()
}

#[test]
fn test_matrix_written_with_ids_reads_back() {
    let sites = make_site_table(&[(20, "Aukan", 8.44, 63.81), (10, "Tristeinen", 8.39, 63.87)]);
    let matrix =
        ConnectivityMatrix::from_values(ids(&[20, 10]), vec![100.0, 12.5, 0.0, 100.0]).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("connectivity.csv");

    write_matrix_file(&path, &matrix, &sites, MatrixLabels::SiteId).unwrap();
    let read_back = MatrixReader::builder().file_path(&path).build().read().unwrap();
    assert_eq!(read_back, matrix);
}

#[test]
fn test_matrix_with_names() {
    let sites = make_site_table(&[(1, "Aukan", 8.44, 63.81), (2, "Tristeinen", 8.39, 63.87)]);
    let matrix =
        ConnectivityMatrix::from_values(ids(&[1, 2]), vec![0.0, 25.0, 50.0, 0.0]).unwrap();
    let text = String::from_utf8(matrix_to_bytes(&matrix, &sites, MatrixLabels::SiteName).unwrap())
        .unwrap();
    assert_eq!(text, "name,Aukan,Tristeinen\nAukan,0,25\nTristeinen,50,0\n");
}

#[test]
fn test_seed_file_has_one_row_per_site() {
    let sites = make_site_table(&[(1, "A", 8.0, 63.0), (2, "B", 8.1, 63.1)]);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seeds.csv");
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

    let mut writer = SeedWriter::new(&path).unwrap();
    writer.add_sites(&sites, 100, 10.0, start);
    writer.write_to_file().unwrap();
    writer.close_file().unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "origin_marker,lon,lat,number,radius,time");
    assert_eq!(lines.len(), 3);
    let fields: Vec<&str> = lines[1].split(',').collect();
    assert_eq!(fields[0], "1");
    assert_eq!(fields[1].parse::<f64>().unwrap(), 8.0);
    assert_eq!(fields[3], "100");
    assert_eq!(fields[4].parse::<f64>().unwrap(), 10.0);
    assert_eq!(fields[5], "2024-05-01T12:00:00Z");
}

#[test]
fn test_trajectory_schema_uses_shared_column_names() {
    let schema = TrajectoryWriter::schema();
    let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    assert_eq!(
        names,
        vec![
            trajectory::TRAJECTORY,
            trajectory::TIME,
            trajectory::LON,
            trajectory::LAT,
            trajectory::STATUS,
            trajectory::ORIGIN_MARKER,
        ]
    );
}

#[test]
fn test_trajectories_survive_a_parquet_round_trip() {
    let start = GeoPoint::new(8.40, 63.80);
    let masked = Trajectory::with_samples(
        TrajectoryId::from(99),
        SiteId::from(2),
        vec![
            Sample::new(EpochSeconds::from(0), start, ParticleStatus::Active),
            Sample::new(
                EpochSeconds::from(600),
                GeoPoint::new(f64::NAN, f64::NAN),
                ParticleStatus::Inactive(1),
            ),
        ],
    );
    let dataset = DatasetFactory::new()
        .particles(1, 3, &[start, GeoPoint::new(8.41, 63.81)])
        .trajectory(masked)
        .build();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trajectories.parquet");
    let mut writer = TrajectoryWriter::new(&path).unwrap();
    for trajectory in dataset.iter() {
        writer.add_trajectory(trajectory);
    }
    writer.write_to_file().unwrap();
    writer.close_file().unwrap();

    let read_back = TrajectoryReader::builder().file_path(&path).build().read().unwrap();
    assert_eq!(read_back.len(), 4);
    assert_eq!(read_back.trajectories()[..3], dataset.trajectories()[..3]);
    let last = &read_back.trajectories()[3];
    assert_eq!(last.id, TrajectoryId::from(99));
    assert!(!last.samples[1].position.is_finite());
    assert_eq!(last.samples[1].status, ParticleStatus::Inactive(1));
}
