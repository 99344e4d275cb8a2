use std::path::Path;

use crate::dataset::RasterDataset;
use crate::errors::Result;
use crate::raster::PixelEncoding;

/// A format driver able to create datasets.
pub trait RasterDriver {
    type Dataset: RasterDataset;

    fn short_name(&self) -> String;

    /// File extension of the format without the dot, `None` for formats without files.
    fn extension(&self) -> Option<String>;

    /// Create a dataset of `size` `(cols, rows)` with `bands` bands of `encoding`.
    fn create(
        &self,
        filename: &Path,
        size: (usize, usize),
        bands: usize,
        encoding: PixelEncoding,
    ) -> Result<Self::Dataset>;
}

/// Looks drivers up by their short name and opens existing datasets.
pub trait DriverManager {
    type Driver: RasterDriver;

    fn get_driver_by_name(&self, name: &str) -> Result<Self::Driver>;

    /// Open the dataset at `path` for reading, with whichever driver recognises it.
    fn open_dataset(&self, path: &Path) -> Result<<Self::Driver as RasterDriver>::Dataset>;
}
