//! Loading and storing [`RasterCoverage`]s through raster drivers.
//!
//! [`RasterCoverageConnector`] binds a [`Resource`] to a set of [`TransferOptions`] and an
//! [`IssueLog`]. It turns dataset metadata into coverage metadata, runs the block-wise
//! read and write passes of [`crate::raster::transfer`], and logs every failure before
//! returning it.
//!
//! ```
//! use gdal_coverage::config::TransferOptions;
//! use gdal_coverage::connector::{RasterCoverageConnector, Resource};
//! use gdal_coverage::raster::mem::MemStore;
//! use gdal_coverage::raster::{Grid, GridSize};
//! use gdal_coverage::{CornersGeoReference, GeoReference, RasterCoverage};
//! use geo_types::{coord, Rect};
//!
//! # fn main() -> gdal_coverage::errors::Result<()> {
//! let store = MemStore::new();
//! store.register_driver("GTiff", Some("tif"));
//!
//! let grid = Grid::from_fn(GridSize::new(4, 3, 1), 2, |x, y, _| (x + y) as f64)?;
//! let envelope = Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 4.0, y: 3.0 });
//! let georeference = GeoReference::Corners(CornersGeoReference::new([0.0, 0.0]));
//! let coverage = RasterCoverage::from_grid("sum", grid, envelope, georeference);
//!
//! let options = TransferOptions::default();
//! let writer = RasterCoverageConnector::with_options(Resource::new("/out/sum"), options.clone());
//! let path = writer.store(&store, &coverage)?;
//! assert_eq!(path.to_str(), Some("/out/sum.tif"));
//!
//! let reader = RasterCoverageConnector::with_options(Resource::new(&path), options);
//! let loaded = reader.load_from(&store)?;
//! assert_eq!(loaded.grid.and_then(|g| g.value(3, 2, 0)), Some(5.0));
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::TransferOptions;
use crate::coverage::RasterCoverage;
use crate::dataset::RasterDataset;
use crate::driver::{DriverManager, RasterDriver};
use crate::errors::{CoverageError, Result};
use crate::geo_transform::{geo_transform_from_envelope, GeoTransform, GeoTransformEx};
use crate::georef::GeoReference;
use crate::issues::IssueLog;
use crate::metadata::Metadata;
use crate::range::{LegacyRangeFields, NumericRange};
use crate::raster::transfer::{read_grid, write_grid};
use crate::raster::{Grid, GridSize, RasterBand};

const LAYER_INDEX_KEY: &str = "layerindex=";

/// Location of a coverage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resource {
    pub path: PathBuf,
    /// Selector inside the dataset, `layerindex=N` picks the band statistics are read from.
    pub internal_path: String,
    pub name: String,
}

impl Resource {
    /// Resource named after the file stem of `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Resource {
            path,
            internal_path: String::new(),
            name,
        }
    }

    pub fn with_internal_path(mut self, internal_path: impl Into<String>) -> Self {
        self.internal_path = internal_path.into();
        self
    }

    /// One-based band selected by the internal path, band 1 when none is given.
    pub fn layer_index(&self) -> Result<usize> {
        let Some(raw) = self.internal_path.strip_prefix(LAYER_INDEX_KEY) else {
            return Ok(1);
        };
        raw.trim()
            .parse::<usize>()
            .map_err(|_| CoverageError::CouldNotLoad {
                object: self.name.clone(),
                what: "layer".to_string(),
            })
    }
}

/// Moves raster coverages between raster datasets and memory.
#[derive(Clone, Debug)]
pub struct RasterCoverageConnector {
    resource: Resource,
    options: TransferOptions,
    issues: IssueLog,
}

impl RasterCoverageConnector {
    /// Connector using the options of the runtime configuration.
    pub fn new(resource: Resource) -> Result<Self> {
        Ok(Self::with_options(resource, TransferOptions::from_config()?))
    }

    pub fn with_options(resource: Resource, options: TransferOptions) -> Self {
        RasterCoverageConnector {
            resource,
            options,
            issues: IssueLog::new(),
        }
    }

    /// Share `issues` with other connectors.
    pub fn with_issue_log(mut self, issues: IssueLog) -> Self {
        self.issues = issues;
        self
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn options(&self) -> &TransferOptions {
        &self.options
    }

    pub fn issues(&self) -> &IssueLog {
        &self.issues
    }

    /// Open the resource's dataset through `manager` and load it completely.
    pub fn load_from<M: DriverManager>(&self, manager: &M) -> Result<RasterCoverage> {
        let dataset = manager
            .open_dataset(&self.resource.path)
            .map_err(|e| self.issues.error(e))?;
        self.load(&dataset)
    }

    /// Load metadata and grid data of `dataset`.
    pub fn load<D: RasterDataset>(&self, dataset: &D) -> Result<RasterCoverage> {
        let mut coverage = RasterCoverage::new(self.resource.name.clone());
        self.load_metadata(dataset, &mut coverage)?;
        coverage.grid = Some(self.load_grid_data(dataset, &coverage)?);
        Ok(coverage)
    }

    /// Fill the spatial and value metadata of `coverage` from `dataset`.
    pub fn load_metadata<D: RasterDataset>(
        &self,
        dataset: &D,
        coverage: &mut RasterCoverage,
    ) -> Result<()> {
        let geo_transform = dataset.geo_transform().map_err(|_| {
            self.issues.error(CoverageError::InvalidProperty {
                property: "Bounds".to_string(),
                object: coverage.name.clone(),
            })
        })?;
        let (xsize, ysize) = dataset.raster_size();
        coverage.size = GridSize::new(xsize, ysize, dataset.raster_count());
        coverage.envelope = Some(geo_transform.envelope((xsize, ysize)));
        coverage.georeference = GeoReference::from_geo_transform(&geo_transform);

        let could_not_load_layer = || CoverageError::CouldNotLoad {
            object: coverage.name.clone(),
            what: "layer".to_string(),
        };
        let layer_index = self
            .resource
            .layer_index()
            .map_err(|e| self.issues.error(e))?;
        let band = dataset
            .rasterband(layer_index)
            .map_err(|_| self.issues.error(could_not_load_layer()))?;

        coverage.range = self.band_range(&band, &coverage.name)?;
        coverage.encoding = Some(band.band_type());
        let projection = dataset.projection();
        coverage.coordinate_system = (!projection.is_empty()).then_some(projection);

        debug!(
            name = %coverage.name,
            size = ?coverage.size,
            encoding = %band.band_type(),
            "Loaded raster metadata"
        );
        Ok(())
    }

    /// Band statistics first, then the legacy range fields in the band metadata, then the
    /// bounds of the band's encoding.
    fn band_range<B: RasterBand>(&self, band: &B, name: &str) -> Result<NumericRange> {
        let encoding = band.band_type();
        let resolution = if encoding.is_floating() { 0.0 } else { 1.0 };
        if let (Some(min), Some(max)) = (band.minimum(), band.maximum()) {
            return Ok(NumericRange::new(min, max, resolution));
        }

        let min_max = band.metadata_item("MinMax", "");
        let range = band.metadata_item("Range", "");
        let domain_info = band.metadata_item("DomainInfo", "");
        if min_max.is_some() || range.is_some() || domain_info.is_some() {
            let fields = LegacyRangeFields {
                min_max: min_max.as_deref(),
                range: range.as_deref(),
                domain_info: domain_info.as_deref(),
            };
            return NumericRange::from_legacy(&fields, name).map_err(|e| self.issues.error(e));
        }

        self.issues
            .warning(format!("No statistics for '{name}', using the limits of {encoding}"));
        Ok(encoding
            .value_bounds()
            .map(|(min, max)| NumericRange::new(min, max, resolution))
            .unwrap_or_default())
    }

    /// Read all bands of `dataset` into a grid sized after `coverage`.
    pub fn load_grid_data<D: RasterDataset>(
        &self,
        dataset: &D,
        coverage: &RasterCoverage,
    ) -> Result<Grid> {
        let grid = Grid::new(coverage.size, self.options.block_bytes)
            .map_err(|e| self.issues.error(e))?;
        debug!(
            name = %coverage.name,
            blocks = grid.block_count(),
            lines_per_block = grid.lines_per_block(),
            "Reading raster grid"
        );
        read_grid(dataset, grid, &self.issues).map_err(|e| self.issues.error(e))
    }

    /// Write `coverage` as a new dataset made by the configured driver.
    ///
    /// Returns the path of the written dataset. A failure after creation leaves whatever the
    /// driver already wrote behind, that file must not be relied upon.
    pub fn store<M: DriverManager>(&self, manager: &M, coverage: &RasterCoverage) -> Result<PathBuf> {
        self.store_with(manager, coverage)
            .map_err(|e| self.issues.error(e))
    }

    fn store_with<M: DriverManager>(&self, manager: &M, coverage: &RasterCoverage) -> Result<PathBuf> {
        let grid = coverage.grid.as_ref().ok_or_else(|| {
            CoverageError::BadArgument(format!("coverage '{}' has no grid data", coverage.name))
        })?;
        let encoding = coverage.store_encoding()?;
        let driver = manager
            .get_driver_by_name(&self.options.driver)
            .map_err(|_| CoverageError::CouldNotCreate {
                kind: "driver".to_string(),
                name: self.options.driver.clone(),
            })?;
        let filename = self.output_name(driver.extension().as_deref());

        let size = grid.size();
        let mut dataset = driver
            .create(&filename, (size.xsize, size.ysize), size.zsize, encoding)
            .map_err(|_| CoverageError::CouldNotCreate {
                kind: "data set".to_string(),
                name: filename.display().to_string(),
            })?;

        dataset.set_geo_transform(&self.store_geo_transform(coverage, size)?)?;
        if let Some(wkt) = &coverage.coordinate_system {
            dataset.set_projection(wkt)?;
        }

        debug!(
            name = %coverage.name,
            path = %filename.display(),
            %encoding,
            "Writing raster grid"
        );
        write_grid(&dataset, grid, encoding)?;
        dataset.close()?;
        Ok(filename)
    }

    fn store_geo_transform(&self, coverage: &RasterCoverage, size: GridSize) -> Result<GeoTransform> {
        let corners = coverage.georeference.corners().ok_or_else(|| {
            CoverageError::UnsupportedOperation {
                what: "Georeference type".to_string(),
                provider: "Gdal".to_string(),
            }
        })?;
        let envelope = coverage
            .envelope
            .ok_or_else(|| CoverageError::InvalidProperty {
                property: "Bounds".to_string(),
                object: coverage.name.clone(),
            })?;
        geo_transform_from_envelope(&envelope, (size.xsize, size.ysize), corners.support())
    }

    /// Output path: the resource path with the driver's extension.
    pub fn output_name(&self, extension: Option<&str>) -> PathBuf {
        match extension {
            Some(ext) if !ext.is_empty() => self.resource.path.with_extension(ext),
            _ => self.resource.path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_near;
    use crate::errors::CplErrType;
    use crate::georef::CornersGeoReference;
    use crate::range::ValueType;
    use crate::raster::mem::{MemDataset, MemFailure, MemStore};
    use crate::raster::{PixelEncoding, UNDEF};
    use geo_types::{coord, Rect};

    const SOURCE_VALUES: [f64; 16] = [
        0.5, 1.25, -2.0, 3.75, //
        10.0, 11.5, 12.25, -13.0, //
        100.125, 0.0, 7.0, 8.5, //
        -0.25, 65536.5, 3.0, 1.0,
    ];

    fn options(driver: &str) -> TransferOptions {
        TransferOptions {
            block_bytes: 64,
            driver: driver.to_string(),
        }
    }

    fn connector(path: &str) -> RasterCoverageConnector {
        RasterCoverageConnector::with_options(Resource::new(path), options("GTiff"))
    }

    fn source_store() -> MemStore {
        let store = MemStore::new();
        store.register_driver("GTiff", Some("tif"));
        let mut dataset = store
            .get_driver_by_name("MEM")
            .unwrap()
            .create(Path::new("/data/source"), (4, 4), 1, PixelEncoding::Float32)
            .unwrap();
        dataset.fill_band(1, &SOURCE_VALUES).unwrap();
        dataset
            .set_geo_transform(&[0.0, 1.0, 0.0, 4.0, 0.0, -1.0])
            .unwrap();
        dataset.set_projection("LOCAL_CS[\"grid\"]").unwrap();
        store
    }

    fn corners_coverage(grid: Grid) -> RasterCoverage {
        let envelope = Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 4.0, y: 4.0 });
        RasterCoverage::from_grid(
            "grid",
            grid,
            envelope,
            GeoReference::Corners(CornersGeoReference::new([0.0, 0.0])),
        )
    }

    #[test]
    fn test_layer_index() {
        assert_eq!(Resource::new("/a/b.tif").layer_index().unwrap(), 1);
        assert_eq!(Resource::new("/a/b.tif").name, "b");
        let resource = Resource::new("/a/b.tif").with_internal_path("layerindex=3");
        assert_eq!(resource.layer_index().unwrap(), 3);
        let resource = Resource::new("/a/b.tif").with_internal_path("layerindex=x");
        assert!(matches!(
            resource.layer_index(),
            Err(CoverageError::CouldNotLoad { .. })
        ));
    }

    #[test]
    fn test_load_metadata() {
        let store = source_store();
        let dataset = store.open("/data/source").unwrap();
        let connector = connector("/data/source");
        let mut coverage = RasterCoverage::new("source");
        connector.load_metadata(&dataset, &mut coverage).unwrap();

        assert_eq!(coverage.size, GridSize::new(4, 4, 1));
        let envelope = coverage.envelope.unwrap();
        assert_eq!(envelope.min(), coord! { x: 0.0, y: 0.0 });
        assert_eq!(envelope.max(), coord! { x: 4.0, y: 4.0 });
        assert!(coverage.georeference.corners().is_some());
        assert_eq!(coverage.range, NumericRange::new(-13.0, 65536.5, 0.0));
        assert_eq!(coverage.encoding, Some(PixelEncoding::Float32));
        assert_eq!(coverage.coordinate_system.as_deref(), Some("LOCAL_CS[\"grid\"]"));
        assert!(connector.issues().is_empty());
    }

    #[test]
    fn test_load_metadata_without_bounds() {
        let dataset = MemDataset::new((2, 2), 1, PixelEncoding::Byte);
        let connector = connector("/data/nobounds");
        let mut coverage = RasterCoverage::new("nobounds");
        let err = connector.load_metadata(&dataset, &mut coverage).unwrap_err();
        assert_eq!(err.to_string(), "Invalid property 'Bounds' for 'nobounds'");
        assert_eq!(connector.issues().len(), 1);
        assert_eq!(connector.issues().issues()[0].severity, CplErrType::Failure);
    }

    #[test]
    fn test_load_metadata_missing_layer() {
        let store = source_store();
        let resource = Resource::new("/data/source").with_internal_path("layerindex=2");
        let connector = RasterCoverageConnector::with_options(resource, options("GTiff"));
        let err = connector.load_from(&store).unwrap_err();
        assert!(matches!(err, CoverageError::CouldNotLoad { .. }));
        assert_eq!(connector.issues().len(), 1);
    }

    #[test]
    fn test_load_selected_layer_statistics() {
        let mut dataset = MemDataset::new((2, 1), 2, PixelEncoding::Int16);
        dataset.fill_band(1, &[1.0, 2.0]).unwrap();
        dataset.fill_band(2, &[-40.0, 90.0]).unwrap();
        dataset
            .set_geo_transform(&[0.0, 1.0, 0.0, 1.0, 0.0, -1.0])
            .unwrap();
        let resource = Resource::new("/data/two").with_internal_path("layerindex=2");
        let connector = RasterCoverageConnector::with_options(resource, options("GTiff"));
        let coverage = connector.load(&dataset).unwrap();

        assert_eq!(coverage.range, NumericRange::new(-40.0, 90.0, 1.0));
        assert_eq!(coverage.size.zsize, 2);
        let grid = coverage.grid.unwrap();
        assert_eq!(grid.value(1, 0, 0), Some(2.0));
        assert_eq!(grid.value(1, 0, 1), Some(90.0));
    }

    #[test]
    fn test_legacy_range_from_band_metadata() {
        let mut dataset = MemDataset::with_type_size((2, 2), 1, PixelEncoding::Unknown(12), 64);
        dataset
            .set_geo_transform(&[0.0, 1.0, 0.0, 2.0, 0.0, -1.0])
            .unwrap();
        let mut band = dataset.rasterband(1).unwrap();
        band.set_metadata_item("Range", "-100:100:0.5", "").unwrap();
        band.set_metadata_item("DomainInfo", "value.dom;Long;value;0;-100:100:0.5;offset=0", "")
            .unwrap();
        // `Range` carries a scale, the `DomainInfo` step makes the range continuous
        drop(band);
        let connector = connector("/data/legacy");
        let coverage = connector.load(&dataset).unwrap();

        assert_eq!(coverage.range, NumericRange::new(-100.0, 100.0, 0.0));
        let grid = coverage.grid.unwrap();
        assert_eq!(grid.value(0, 0, 0), Some(UNDEF));
        // one issue for the unknown encoding of the read pass
        assert_eq!(connector.issues().len(), 1);
    }

    #[test]
    fn test_round_trip() {
        let store = source_store();
        let loaded = connector("/data/source").load_from(&store).unwrap();

        let mut coverage = corners_coverage(loaded.grid.unwrap());
        coverage.value_type = Some(ValueType::FLOAT);
        coverage.coordinate_system = loaded.coordinate_system;
        let path = connector("/out/result").store(&store, &coverage).unwrap();
        assert_eq!(path, PathBuf::from("/out/result.tif"));

        let reloaded = connector("/out/result.tif").load_from(&store).unwrap();
        let envelope = reloaded.envelope.unwrap();
        assert_eq!(envelope.min(), coord! { x: 0.0, y: 0.0 });
        assert_eq!(envelope.max(), coord! { x: 4.0, y: 4.0 });
        assert_eq!(reloaded.encoding, Some(PixelEncoding::Float32));
        assert_eq!(reloaded.coordinate_system.as_deref(), Some("LOCAL_CS[\"grid\"]"));

        let grid = reloaded.grid.unwrap();
        for (i, expected) in SOURCE_VALUES.iter().enumerate() {
            let value = grid.value(i % 4, i / 4, 0).unwrap();
            assert_near!(value, *expected, epsilon = f32::EPSILON as f64 * expected.abs().max(1.0));
        }
    }

    #[test]
    fn test_store_uses_range_type() {
        let store = MemStore::new();
        let mut coverage = corners_coverage(
            Grid::from_fn(GridSize::new(4, 4, 2), 3, |x, y, z| (x + y + z) as f64).unwrap(),
        );
        coverage.range = NumericRange::new(0.0, 7.0, 1.0);
        let connector =
            RasterCoverageConnector::with_options(Resource::new("/out/sum"), options("MEM"));
        let path = connector.store(&store, &coverage).unwrap();
        assert_eq!(path, PathBuf::from("/out/sum"));

        let dataset = store.open(&path).unwrap();
        assert_eq!(dataset.raster_count(), 2);
        assert_eq!(dataset.rasterband(2).unwrap().band_type(), PixelEncoding::Byte);
        assert_eq!(dataset.geo_transform().unwrap(), [0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
        // two blocks per layer
        assert_eq!(dataset.io_counts().writes, 4);
        assert_eq!(dataset.band_bytes(2).unwrap()[15], 7);
    }

    #[test]
    fn test_store_unsupported_georeference() {
        let store = MemStore::new();
        let mut coverage = corners_coverage(
            Grid::from_fn(GridSize::new(2, 2, 1), 1, |_, _, _| 1.0).unwrap(),
        );
        coverage.georeference = GeoReference::Affine([0.0, 0.0, 1.0, 0.0, 1.0, 0.0]);
        let connector =
            RasterCoverageConnector::with_options(Resource::new("/out/affine"), options("MEM"));
        let err = connector.store(&store, &coverage).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Operation not supported: 'Georeference type' in Gdal"
        );
        assert_eq!(store.open("/out/affine").unwrap().io_counts().writes, 0);
        assert_eq!(connector.issues().len(), 1);
    }

    #[test]
    fn test_store_failures() {
        let store = MemStore::new();
        let coverage = corners_coverage(
            Grid::from_fn(GridSize::new(2, 2, 1), 1, |_, _, _| 1.0).unwrap(),
        );

        let connector =
            RasterCoverageConnector::with_options(Resource::new("/out/x"), options("HFA"));
        let err = connector.store(&store, &coverage).unwrap_err();
        assert_eq!(err.to_string(), "Couldn't create object for 'driver': HFA");

        let connector =
            RasterCoverageConnector::with_options(Resource::new("/out/x"), options("MEM"));
        store.inject_failure(MemFailure::Create);
        let err = connector.store(&store, &coverage).unwrap_err();
        assert!(matches!(err, CoverageError::CouldNotCreate { .. }));
        assert!(!store.exists("/out/x"));

        store.clear_failures();
        store.inject_failure(MemFailure::SetGeoTransform);
        let err = connector.store(&store, &coverage).unwrap_err();
        assert!(matches!(err, CoverageError::CplError { .. }));
        assert_eq!(store.open("/out/x").unwrap().io_counts().writes, 0);

        store.clear_failures();
        store.inject_failure(MemFailure::RasterWrite);
        let err = connector.store(&store, &coverage).unwrap_err();
        assert!(matches!(err, CoverageError::CplError { .. }));

        assert_eq!(connector.issues().len(), 3);
    }

    #[test]
    fn test_store_without_grid() {
        let store = MemStore::new();
        let coverage = RasterCoverage::new("empty");
        let err = connector("/out/empty").store(&store, &coverage).unwrap_err();
        assert!(matches!(err, CoverageError::BadArgument(_)));
    }
}
