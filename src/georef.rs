//! Georeference kinds a coverage can carry.

use crate::geo_transform::GeoTransform;

/// Georeference described by the envelope corners of the raster.
///
/// `support` holds the rotation terms written into the row/column rotation slots
/// of a geo transform.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CornersGeoReference {
    support: [f64; 2],
}

impl CornersGeoReference {
    pub fn new(support: [f64; 2]) -> Self {
        CornersGeoReference { support }
    }

    pub fn support(&self) -> [f64; 2] {
        self.support
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum GeoReference {
    Corners(CornersGeoReference),
    /// Georeference defined directly by transform coefficients.
    Affine(GeoTransform),
    #[default]
    Undetermined,
}

impl GeoReference {
    pub fn corners(&self) -> Option<&CornersGeoReference> {
        match self {
            GeoReference::Corners(corners) => Some(corners),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GeoReference::Corners(_) => "corners",
            GeoReference::Affine(_) => "affine",
            GeoReference::Undetermined => "undetermined",
        }
    }

    /// Georeference for a freshly read transform.
    ///
    /// Transforms without rotation are fully described by their corners, the rotation
    /// terms become the support values.
    pub fn from_geo_transform(transform: &GeoTransform) -> Self {
        if transform[1] == 0.0 || transform[5] == 0.0 {
            return GeoReference::Affine(*transform);
        }
        GeoReference::Corners(CornersGeoReference::new([transform[2], transform[4]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_geo_transform() {
        let grf = GeoReference::from_geo_transform(&[0.0, 1.0, 0.0, 4.0, 0.0, -1.0]);
        assert_eq!(grf.corners().map(|c| c.support()), Some([0.0, 0.0]));
        assert_eq!(grf.kind(), "corners");

        let grf = GeoReference::from_geo_transform(&[0.0, 0.0, 1.0, 4.0, 1.0, 0.0]);
        assert!(grf.corners().is_none());
        assert!(GeoReference::default().corners().is_none());
    }
}
