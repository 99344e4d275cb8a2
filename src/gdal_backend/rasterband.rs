use std::ffi::{c_int, c_void};
use std::marker::PhantomData;

use gdal_sys::{self, CPLErr, GDALMajorObjectH, GDALRWFlag, GDALRasterBandH};

use super::{GdalDataset, _metadata_item, _set_metadata_item};
use crate::errors::*;
use crate::metadata::Metadata;
use crate::raster::{PixelEncoding, RasterBand};
use crate::utils::_last_cpl_err;

/// Represents a single band of a dataset.
///
/// This object carries the lifetime of the dataset that
/// contains it. This is necessary to prevent the dataset
/// from being dropped before the band.
pub struct GdalBand<'a> {
    c_rasterband: GDALRasterBandH,
    phantom: PhantomData<&'a GdalDataset>,
}

impl GdalBand<'_> {
    /// Create a GdalBand from a wrapped C pointer
    ///
    /// # Safety
    /// This method operates on a raw C pointer
    pub unsafe fn from_c_rasterband(_: &GdalDataset, c_rasterband: GDALRasterBandH) -> Self {
        GdalBand {
            c_rasterband,
            phantom: PhantomData,
        }
    }

    fn raster_io(
        &self,
        flag: GDALRWFlag::Type,
        window: (usize, usize),
        window_size: (usize, usize),
        encoding: PixelEncoding,
        data: *mut c_void,
        len: usize,
    ) -> Result<()> {
        // GDAL knows the width of types this crate only carries as raw ids
        let bits = unsafe { gdal_sys::GDALGetDataTypeSizeBits(encoding.type_id()) } as usize;
        if bits == 0 {
            return Err(CoverageError::UnsupportedEncoding(format!(
                "cannot transfer samples as {encoding}"
            )));
        }
        let needed = window_size.0 * window_size.1 * bits / 8;
        if len < needed {
            return Err(CoverageError::BadArgument(format!(
                "buffer of {len} bytes, window needs {needed}"
            )));
        }
        let rv = unsafe {
            gdal_sys::GDALRasterIO(
                self.c_rasterband,
                flag,
                window.0 as c_int,
                window.1 as c_int,
                window_size.0 as c_int,
                window_size.1 as c_int,
                data,
                window_size.0 as c_int,
                window_size.1 as c_int,
                encoding.type_id(),
                0,
                0,
            )
        };
        if rv != CPLErr::CE_None {
            return Err(_last_cpl_err(rv));
        }
        Ok(())
    }
}

impl RasterBand for GdalBand<'_> {
    fn band_type(&self) -> PixelEncoding {
        PixelEncoding::from_type_id(unsafe { gdal_sys::GDALGetRasterDataType(self.c_rasterband) })
    }

    fn type_size_bits(&self) -> usize {
        let c_type = unsafe { gdal_sys::GDALGetRasterDataType(self.c_rasterband) };
        (unsafe { gdal_sys::GDALGetDataTypeSizeBits(c_type) }) as usize
    }

    fn size(&self) -> (usize, usize) {
        let size_x = unsafe { gdal_sys::GDALGetRasterBandXSize(self.c_rasterband) } as usize;
        let size_y = unsafe { gdal_sys::GDALGetRasterBandYSize(self.c_rasterband) } as usize;
        (size_x, size_y)
    }

    fn minimum(&self) -> Option<f64> {
        let mut pb_success = 0;
        let value = unsafe { gdal_sys::GDALGetRasterMinimum(self.c_rasterband, &mut pb_success) };
        (pb_success == 1).then_some(value)
    }

    fn maximum(&self) -> Option<f64> {
        let mut pb_success = 0;
        let value = unsafe { gdal_sys::GDALGetRasterMaximum(self.c_rasterband, &mut pb_success) };
        (pb_success == 1).then_some(value)
    }

    fn read_raw(
        &self,
        window: (usize, usize),
        window_size: (usize, usize),
        encoding: PixelEncoding,
        buffer: &mut [u8],
    ) -> Result<()> {
        self.raster_io(
            GDALRWFlag::GF_Read,
            window,
            window_size,
            encoding,
            buffer.as_mut_ptr() as *mut c_void,
            buffer.len(),
        )
    }

    fn write_raw(
        &mut self,
        window: (usize, usize),
        window_size: (usize, usize),
        encoding: PixelEncoding,
        buffer: &[u8],
    ) -> Result<()> {
        // GDAL only reads from the buffer in write mode
        self.raster_io(
            GDALRWFlag::GF_Write,
            window,
            window_size,
            encoding,
            buffer.as_ptr() as *mut c_void,
            buffer.len(),
        )
    }
}

impl Metadata for GdalBand<'_> {
    fn metadata_item(&self, key: &str, domain: &str) -> Option<String> {
        _metadata_item(self.c_rasterband as GDALMajorObjectH, key, domain)
    }

    fn set_metadata_item(&mut self, key: &str, value: &str, domain: &str) -> Result<()> {
        _set_metadata_item(self.c_rasterband as GDALMajorObjectH, key, value, domain)
    }
}
