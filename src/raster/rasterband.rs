use crate::errors::*;
use crate::metadata::Metadata;
use crate::raster::{Buffer, PixelEncoding, PixelType};

/// A single band of a raster dataset.
///
/// Handles borrow the dataset that contains them, so a band never outlives it.
pub trait RasterBand: Metadata {
    /// Encoding of the samples as stored by the driver.
    fn band_type(&self) -> PixelEncoding;

    /// Size of [`RasterBand::band_type`] in **bits**, as reported by the driver.
    fn type_size_bits(&self) -> usize;

    /// Get dimensions of the band as `(cols, rows)`.
    fn size(&self) -> (usize, usize);

    /// Minimum value of the band, `None` when the driver has no statistics.
    fn minimum(&self) -> Option<f64>;

    /// Maximum value of the band, `None` when the driver has no statistics.
    fn maximum(&self) -> Option<f64>;

    /// Read a window into a raw buffer.
    ///
    /// # Arguments
    /// * window - the window position from top left
    /// * window_size - the window size, also the size of the data in `buffer`
    /// * encoding - the encoding samples are converted to in `buffer`
    /// * buffer - native-endian samples, `window_size.0 * window_size.1` of them
    fn read_raw(
        &self,
        window: (usize, usize),
        window_size: (usize, usize),
        encoding: PixelEncoding,
        buffer: &mut [u8],
    ) -> Result<()>;

    /// Write a raw buffer into a window, see [`RasterBand::read_raw`] for the arguments.
    fn write_raw(
        &mut self,
        window: (usize, usize),
        window_size: (usize, usize),
        encoding: PixelEncoding,
        buffer: &[u8],
    ) -> Result<()>;

    /// Read a `Buffer<T>` from this band.
    fn read_as<T: PixelType>(
        &self,
        window: (usize, usize),
        window_size: (usize, usize),
    ) -> Result<Buffer<T>> {
        let mut bytes = vec![0u8; window_size.0 * window_size.1 * std::mem::size_of::<T>()];
        self.read_raw(window, window_size, T::ENCODING, &mut bytes)?;
        Ok(Buffer::from_ne_bytes(window_size, &bytes))
    }

    /// Write a `Buffer<T>` with its top left corner at `window`.
    fn write<T: PixelType>(&mut self, window: (usize, usize), buffer: &Buffer<T>) -> Result<()> {
        self.write_raw(window, buffer.size, T::ENCODING, &buffer.to_ne_bytes())
    }
}
