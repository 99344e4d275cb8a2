use crate::errors::Result;
use crate::geo_transform::GeoTransform;
use crate::raster::RasterBand;

/// A raster dataset: one or more equally sized bands plus their georeferencing.
///
/// Dropping a dataset releases it; [`RasterDataset::close`] does the same but reports
/// errors raised while flushing.
pub trait RasterDataset {
    type Band<'a>: RasterBand
    where
        Self: 'a;

    /// Size of the rasters as `(cols, rows)`.
    fn raster_size(&self) -> (usize, usize);

    /// Number of bands.
    fn raster_count(&self) -> usize;

    /// Fetch a band, `band_index` is 1-based.
    fn rasterband(&self, band_index: usize) -> Result<Self::Band<'_>>;

    /// Affine transformation called geotransformation.
    fn geo_transform(&self) -> Result<GeoTransform>;

    /// Set the affine transformation coefficients.
    ///
    /// x-coordinate of the top-left corner pixel (x-offset),
    /// width of a pixel (x-resolution),
    /// row rotation (typically zero),
    /// y-coordinate of the top-left corner pixel,
    /// column rotation (typically zero),
    /// height of a pixel (y-resolution, typically negative)
    fn set_geo_transform(&mut self, transformation: &GeoTransform) -> Result<()>;

    /// Spatial reference as WKT, empty when unknown.
    fn projection(&self) -> String;

    fn set_projection(&mut self, projection: &str) -> Result<()>;

    fn close(self) -> Result<()>
    where
        Self: Sized;
}
