use geo_types::Rect;

use crate::errors::{CoverageError, Result};
use crate::georef::GeoReference;
use crate::range::{NumericRange, ValueType};
use crate::raster::{Grid, GridSize, PixelEncoding};

/// A raster coverage: grid data plus the spatial and value metadata describing it.
#[derive(Debug, Default)]
pub struct RasterCoverage {
    pub name: String,
    /// Size as `(cols, rows, layers)`.
    pub size: GridSize,
    pub envelope: Option<Rect<f64>>,
    pub georeference: GeoReference,
    pub range: NumericRange,
    /// Overrides the value type derived from [`RasterCoverage::range`] when storing.
    pub value_type: Option<ValueType>,
    /// Spatial reference as WKT.
    pub coordinate_system: Option<String>,
    /// Encoding of the source the metadata was loaded from.
    pub encoding: Option<PixelEncoding>,
    pub grid: Option<Grid>,
}

impl RasterCoverage {
    pub fn new(name: impl Into<String>) -> Self {
        RasterCoverage {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Coverage holding `grid`, its size taken from the grid.
    pub fn from_grid(
        name: impl Into<String>,
        grid: Grid,
        envelope: Rect<f64>,
        georeference: GeoReference,
    ) -> Self {
        RasterCoverage {
            name: name.into(),
            size: grid.size(),
            envelope: Some(envelope),
            georeference,
            grid: Some(grid),
            ..Default::default()
        }
    }

    /// Value type of the samples, the explicit override or the smallest type covering the range.
    pub fn resolved_value_type(&self) -> ValueType {
        self.value_type
            .unwrap_or_else(|| self.range.determine_type())
    }

    /// Encoding the samples are written with.
    pub fn store_encoding(&self) -> Result<PixelEncoding> {
        let value_type = self.resolved_value_type();
        value_type.pixel_encoding().ok_or_else(|| {
            CoverageError::UnsupportedEncoding(format!(
                "value type {value_type:?} of '{}' has no pixel encoding",
                self.name
            ))
        })
    }
}
