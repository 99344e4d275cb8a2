use geo_types::{coord, Rect};

use crate::errors::{CoverageError, Result};

/// An affine transform.
///
/// A six-element array storing the coefficients of an [affine transform]
/// used in mapping coordinates between pixel/line `(P, L)` (raster) space,
/// and `(Xp,Yp)` (world) space.
///
/// # Interpretation
///
/// A `GeoTransform`'s components have the following meanings:
///
///   * `GeoTransform[0]`: x-coordinate of the upper-left corner of the upper-left pixel.
///   * `GeoTransform[1]`: W-E pixel resolution (pixel width).
///   * `GeoTransform[2]`: row rotation (typically zero).
///   * `GeoTransform[3]`: y-coordinate of the upper-left corner of the upper-left pixel.
///   * `GeoTransform[4]`: column rotation (typically zero).
///   * `GeoTransform[5]`: N-S pixel resolution (pixel height), negative value for a North-up image.
///
/// # Example
///
/// ```rust
/// # fn main() -> gdal_coverage::errors::Result<()> {
/// use gdal_coverage::{GeoTransform, GeoTransformEx};
///
/// let transform: GeoTransform = [100.0, 2.0, 0.0, 200.0, 0.0, -2.0];
/// let envelope = transform.envelope((10, 10));
/// assert_eq!((envelope.min().x, envelope.min().y), (100.0, 180.0));
/// assert_eq!((envelope.max().x, envelope.max().y), (120.0, 200.0));
///
/// let (x, y) = transform.apply(5.0, 5.0);
/// let (p, l) = transform.invert()?.apply(x, y);
/// assert_eq!((p, l), (5.0, 5.0));
/// # Ok(())
/// # }
/// ```
///
/// [affine transform]: https://en.wikipedia.org/wiki/Affine_transformation
pub type GeoTransform = [f64; 6];

/// Extension methods on [`GeoTransform`]
pub trait GeoTransformEx {
    /// Apply GeoTransform to x/y coordinate.
    fn apply(&self, pixel: f64, line: f64) -> (f64, f64);

    /// Invert a [`GeoTransform`].
    ///
    /// Fails with [`CoverageError::BadArgument`] for a degenerate transform.
    fn invert(&self) -> Result<GeoTransform>;

    /// Axis-aligned envelope of a raster of `size` `(cols, rows)` pixels.
    ///
    /// Minimum and maximum are taken per axis, so both north-up (negative pixel
    /// height) and south-up transforms yield a proper envelope.
    fn envelope(&self, size: (usize, usize)) -> Rect<f64>;
}

impl GeoTransformEx for GeoTransform {
    fn apply(&self, pixel: f64, line: f64) -> (f64, f64) {
        (
            self[0] + pixel * self[1] + line * self[2],
            self[3] + pixel * self[4] + line * self[5],
        )
    }

    fn invert(&self) -> Result<GeoTransform> {
        let gt = self;
        // no rotation: keep exact reciprocals
        if gt[2] == 0.0 && gt[4] == 0.0 && gt[1] != 0.0 && gt[5] != 0.0 {
            return Ok([
                -gt[0] / gt[1],
                1.0 / gt[1],
                0.0,
                -gt[3] / gt[5],
                0.0,
                1.0 / gt[5],
            ]);
        }
        let det = gt[1] * gt[5] - gt[2] * gt[4];
        let magnitude = gt[1].abs().max(gt[2].abs()) * gt[4].abs().max(gt[5].abs());
        if det.abs() <= 1e-10 * magnitude || det == 0.0 {
            return Err(CoverageError::BadArgument(
                "Geo transform is uninvertible".to_string(),
            ));
        }
        let inv_det = 1.0 / det;
        Ok([
            (gt[2] * gt[3] - gt[0] * gt[5]) * inv_det,
            gt[5] * inv_det,
            -gt[2] * inv_det,
            (-gt[1] * gt[3] + gt[0] * gt[4]) * inv_det,
            -gt[4] * inv_det,
            gt[1] * inv_det,
        ])
    }

    fn envelope(&self, size: (usize, usize)) -> Rect<f64> {
        let left_up = coord! { x: self[0], y: self[3] };
        let right_down = coord! {
            x: self[0] + size.0 as f64 * self[1],
            y: self[3] + size.1 as f64 * self[5],
        };
        Rect::new(
            coord! {
                x: left_up.x.min(right_down.x),
                y: left_up.y.min(right_down.y),
            },
            coord! {
                x: left_up.x.max(right_down.x),
                y: left_up.y.max(right_down.y),
            },
        )
    }
}

/// Derive transform coefficients from an envelope, the raster `size` `(cols, rows)` and the
/// `support` (rotation) pair of a corners georeference.
///
/// The origin is the envelope's minimum corner and both pixel sizes are positive.
pub fn geo_transform_from_envelope(
    envelope: &Rect<f64>,
    size: (usize, usize),
    support: [f64; 2],
) -> Result<GeoTransform> {
    if size.0 == 0 || size.1 == 0 {
        return Err(CoverageError::BadArgument(format!(
            "cannot derive a geo transform for raster size {size:?}"
        )));
    }
    let (min, max) = (envelope.min(), envelope.max());
    let pixel_width = (max.x - min.x) / size.0 as f64;
    let pixel_height = (max.y - min.y) / size.1 as f64;
    Ok([
        min.x,
        pixel_width,
        support[0],
        min.y,
        support[1],
        pixel_height,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_near;

    #[test]
    fn test_envelope_north_up() {
        let gt: GeoTransform = [100.0, 2.0, 0.0, 200.0, 0.0, -2.0];
        let env = gt.envelope((10, 10));
        assert_eq!(env.min(), coord! { x: 100.0, y: 180.0 });
        assert_eq!(env.max(), coord! { x: 120.0, y: 200.0 });
    }

    #[test]
    fn test_envelope_south_up() {
        let gt: GeoTransform = [-10.0, 0.5, 0.0, 40.0, 0.0, 0.25];
        let env = gt.envelope((20, 8));
        assert_eq!(env.min(), coord! { x: -10.0, y: 40.0 });
        assert_eq!(env.max(), coord! { x: 0.0, y: 42.0 });
    }

    #[test]
    fn test_from_envelope_inverts_envelope() {
        let env = Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 4.0, y: 4.0 });
        let gt = geo_transform_from_envelope(&env, (4, 4), [0.0, 0.0]).unwrap();
        assert_eq!(gt, [0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
        assert_eq!(gt.envelope((4, 4)), env);

        let env = Rect::new(coord! { x: 3.5, y: -7.25 }, coord! { x: 10.0, y: 1.0 });
        let gt = geo_transform_from_envelope(&env, (13, 33), [0.0, 0.0]).unwrap();
        let back = gt.envelope((13, 33));
        assert_near!(back.min().x, 3.5);
        assert_near!(back.min().y, -7.25);
        assert_near!(back.max().x, 10.0, epsilon = 1e-12);
        assert_near!(back.max().y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_from_envelope_keeps_support() {
        let env = Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 10.0, y: 5.0 });
        let gt = geo_transform_from_envelope(&env, (5, 5), [0.1, -0.2]).unwrap();
        assert_eq!(gt, [0.0, 2.0, 0.1, 0.0, -0.2, 1.0]);
        assert!(geo_transform_from_envelope(&env, (0, 5), [0.0, 0.0]).is_err());
    }

    #[test]
    fn test_apply_invert() {
        let gt: GeoTransform = [768269.0, 1.0, 0.25, 4057292.0, 0.5, -1.0];
        let (x, y) = gt.apply(12.0, 40.0);
        let (p, l) = gt.invert().unwrap().apply(x, y);
        assert_near!(p, 12.0, epsilon = 1e-6);
        assert_near!(l, 40.0, epsilon = 1e-6);

        let degenerate: GeoTransform = [0.0, 1.0, 2.0, 0.0, 2.0, 4.0];
        assert!(degenerate.invert().is_err());
    }
}
