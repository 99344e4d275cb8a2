use gdal_coverage::config::TransferOptions;
use gdal_coverage::connector::{RasterCoverageConnector, Resource};
use gdal_coverage::errors::{CoverageError, CplErrType, ErrorCategory};
use gdal_coverage::raster::mem::{MemDataset, MemFailure, MemStore};
use gdal_coverage::raster::{Grid, GridSize, UNDEF};
use gdal_coverage::range::ValueType;
use gdal_coverage::{
    CornersGeoReference, DriverManager, GeoReference, IssueLog, PixelEncoding, RasterCoverage,
    RasterDataset, RasterDriver,
};
use geo_types::{coord, Rect};
use std::path::Path;

fn options(block_bytes: usize) -> TransferOptions {
    TransferOptions {
        block_bytes,
        driver: "GTiff".to_string(),
    }
}

fn store_with_drivers() -> MemStore {
    let store = MemStore::new();
    store.register_driver("GTiff", Some("tif"));
    store
}

fn elevation(x: usize, y: usize, z: usize) -> f64 {
    (z * 1000 + y * 37 + x * 3) as f64
}

#[test]
fn multi_layer_round_trip() {
    let store = store_with_drivers();
    let size = GridSize::new(13, 29, 3);
    let grid = Grid::from_fn(size, 4, elevation).unwrap();
    let envelope = Rect::new(coord! { x: 500.0, y: -20.0 }, coord! { x: 565.0, y: 125.0 });
    let mut coverage = RasterCoverage::from_grid(
        "elevation",
        grid,
        envelope,
        GeoReference::Corners(CornersGeoReference::new([0.0, 0.0])),
    );
    coverage.value_type = Some(ValueType::INT32);
    coverage.coordinate_system = Some("LOCAL_CS[\"site\"]".to_string());

    let writer = RasterCoverageConnector::with_options(Resource::new("/out/elevation"), options(1 << 20));
    let path = writer.store(&store, &coverage).unwrap();
    let dataset = store.open(&path).unwrap();
    // 8 blocks of at most 4 lines in each of the 3 layers
    assert_eq!(dataset.io_counts().writes, 24);
    assert_eq!(dataset.geo_transform().unwrap(), [500.0, 5.0, 0.0, -20.0, 0.0, 5.0]);

    // budget of two lines per block on the way back
    let reader = RasterCoverageConnector::with_options(Resource::new(&path), options(13 * 8 * 2));
    let loaded = reader.load_from(&store).unwrap();
    assert_eq!(loaded.size, size);
    assert_eq!(loaded.envelope, Some(envelope));
    assert_eq!(loaded.encoding, Some(PixelEncoding::Int32));
    assert_eq!(loaded.coordinate_system.as_deref(), Some("LOCAL_CS[\"site\"]"));
    assert_eq!(loaded.range.min, 0.0);
    assert_eq!(loaded.range.max, elevation(12, 28, 0));

    let grid = loaded.grid.unwrap();
    assert_eq!(grid.lines_per_block(), 2);
    assert_eq!(grid.block_count(), 15 * 3);
    assert_eq!(dataset.io_counts().reads, 15 * 3);
    for z in 0..3 {
        for y in 0..29 {
            for x in 0..13 {
                assert_eq!(grid.value(x, y, z), Some(elevation(x, y, z)));
            }
        }
    }
    assert!(reader.issues().is_empty());
}

#[test]
fn read_failure_yields_no_grid() {
    let store = store_with_drivers();
    let mut dataset = store
        .get_driver_by_name("GTiff")
        .unwrap()
        .create(Path::new("/data/broken.tif"), (8, 8), 1, PixelEncoding::UInt16)
        .unwrap();
    dataset
        .set_geo_transform(&[0.0, 1.0, 0.0, 8.0, 0.0, -1.0])
        .unwrap();
    store.inject_failure(MemFailure::RasterRead);

    let issues = IssueLog::new();
    let reader = RasterCoverageConnector::with_options(Resource::new("/data/broken.tif"), options(64))
        .with_issue_log(issues.clone());
    let err = reader.load_from(&store).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Io);
    assert!(matches!(err, CoverageError::CplError { .. }));
    let logged = issues.issues();
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].severity, CplErrType::Failure);
}

#[test]
fn missing_dataset_is_a_resource_error() {
    let store = store_with_drivers();
    let reader = RasterCoverageConnector::with_options(Resource::new("/data/absent.tif"), options(64));
    let err = reader.load_from(&store).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Resource);
    assert_eq!(reader.issues().len(), 1);
}

#[test]
fn unknown_encoding_reads_undefined() {
    let mut dataset = MemDataset::with_type_size((3, 3), 1, PixelEncoding::Unknown(10), 32);
    dataset
        .set_geo_transform(&[0.0, 1.0, 0.0, 3.0, 0.0, -1.0])
        .unwrap();

    let reader = RasterCoverageConnector::with_options(Resource::new("/data/complex"), options(24));
    let coverage = reader.load(&dataset).unwrap();
    let grid = coverage.grid.unwrap();
    assert_eq!(grid.block_count(), 3);
    assert!((0..3).all(|y| grid.value(1, y, 0) == Some(UNDEF)));

    // one for the missing statistics, one for the read pass
    let logged = reader.issues().issues();
    assert_eq!(logged.len(), 2);
    assert!(logged.iter().all(|issue| issue.severity == CplErrType::Warning));
}
