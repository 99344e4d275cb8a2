#![crate_name = "gdal_coverage"]
#![crate_type = "lib"]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Raster coverage transfer
//!
//! This crate moves raster coverages between raster datasets and in-memory [`Grid`]s.
//! Samples are read and written block by block, each block covering a run of lines of one
//! band, and converted between the dataset's pixel encoding and `f64`.
//! The georeferencing of a coverage travels with it as an envelope derived from the
//! dataset's geo transform.
//!
//! ## Backends
//!
//! Datasets are reached through the [`DriverManager`], [`RasterDriver`], [`RasterDataset`]
//! and [`RasterBand`] traits. Two implementations are provided:
//!
//! * [`raster::mem`]: datasets held in memory, always available.
//! * `gdal_backend`: datasets read and written by the [GDAL](http://gdal.org/) library,
//!   behind the `gdal` feature.
//!
//! ## Example
//!
//! ```rust, no_run
//! use gdal_coverage::connector::{RasterCoverageConnector, Resource};
//! use gdal_coverage::raster::mem::MemStore;
//!
//! # fn main() -> gdal_coverage::errors::Result<()> {
//! let store = MemStore::new();
//! let connector = RasterCoverageConnector::new(Resource::new("/data/dem"))?;
//! let coverage = connector.load_from(&store)?;
//! println!("{} has {:?} cells", coverage.name, coverage.size);
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! Problems met while loading or storing are kept in the connector's [`IssueLog`] and
//! emitted as [`tracing`](https://docs.rs/tracing) events.
//!
//! ## Optional Features
//!
//! * `gdal`: GDAL backend, links against the system GDAL library through `gdal-sys`.
//! * `array`: `ndarray` views of grid layers and buffers.

pub mod config;
pub mod connector;
mod coverage;
mod dataset;
mod driver;
pub mod errors;
#[cfg(feature = "gdal")]
#[cfg_attr(docsrs, doc(cfg(feature = "gdal")))]
pub mod gdal_backend;
mod geo_transform;
mod georef;
pub mod issues;
mod metadata;
pub mod range;
pub mod raster;
#[cfg(feature = "gdal")]
mod utils;

pub use coverage::RasterCoverage;
pub use dataset::RasterDataset;
pub use driver::{DriverManager, RasterDriver};
pub use geo_transform::{geo_transform_from_envelope, GeoTransform, GeoTransformEx};
pub use georef::{CornersGeoReference, GeoReference};
pub use issues::{Issue, IssueLog};
pub use metadata::Metadata;
pub use raster::{Grid, GridSize, PixelEncoding, RasterBand};

#[cfg(test)]
pub(crate) mod test_utils;
