#![cfg(feature = "gdal")]

use gdal_coverage::gdal_backend::GdalDriverManager;
use gdal_coverage::{DriverManager, RasterDriver};

#[test]
fn test_get_driver() {
    let manager = GdalDriverManager::new();
    let driver = manager.get_driver_by_name("GTiff").unwrap();
    assert_eq!(driver.short_name(), "GTiff");
    assert_eq!(driver.long_name(), "GeoTIFF");
    assert!(manager.count() > 0);
}

#[test]
fn test_open_missing_dataset() {
    let manager = GdalDriverManager::new();
    assert!(manager
        .open_dataset(std::path::Path::new("/no/such/raster.tif"))
        .is_err());
}
