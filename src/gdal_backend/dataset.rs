use std::ffi::{c_int, CString};
use std::ptr;

use gdal_sys::{self, CPLErr, GDALDatasetH};

use super::GdalBand;
use crate::dataset::RasterDataset;
use crate::errors::*;
use crate::geo_transform::GeoTransform;
use crate::utils::{_last_cpl_err, _last_null_pointer_err, _string};

/// A dataset opened or created through GDAL.
///
/// The handle is closed when the value is dropped.
#[derive(Debug)]
pub struct GdalDataset {
    c_dataset: GDALDatasetH,
}

impl GdalDataset {
    /// Creates a new GdalDataset by wrapping a C pointer
    ///
    /// # Safety
    /// This method operates on a raw C pointer, which must be a valid dataset handle the
    /// new value takes ownership of.
    pub unsafe fn from_c_dataset(c_dataset: GDALDatasetH) -> GdalDataset {
        GdalDataset { c_dataset }
    }

    /// Returns the wrapped C pointer
    ///
    /// # Safety
    /// This method returns a raw C pointer
    pub unsafe fn c_dataset(&self) -> GDALDatasetH {
        self.c_dataset
    }
}

impl RasterDataset for GdalDataset {
    type Band<'a> = GdalBand<'a>;

    fn raster_size(&self) -> (usize, usize) {
        let size_x = unsafe { gdal_sys::GDALGetRasterXSize(self.c_dataset) } as usize;
        let size_y = unsafe { gdal_sys::GDALGetRasterYSize(self.c_dataset) } as usize;
        (size_x, size_y)
    }

    fn raster_count(&self) -> usize {
        (unsafe { gdal_sys::GDALGetRasterCount(self.c_dataset) }) as usize
    }

    fn rasterband(&self, band_index: usize) -> Result<GdalBand<'_>> {
        unsafe {
            let c_band = gdal_sys::GDALGetRasterBand(self.c_dataset, band_index as c_int);
            if c_band.is_null() {
                return Err(_last_null_pointer_err("GDALGetRasterBand"));
            }
            Ok(GdalBand::from_c_rasterband(self, c_band))
        }
    }

    fn geo_transform(&self) -> Result<GeoTransform> {
        let mut transformation = GeoTransform::default();
        let rv =
            unsafe { gdal_sys::GDALGetGeoTransform(self.c_dataset, transformation.as_mut_ptr()) };

        // check if the dataset has a GeoTransform
        if rv != CPLErr::CE_None {
            return Err(_last_cpl_err(rv));
        }
        Ok(transformation)
    }

    fn set_geo_transform(&mut self, transformation: &GeoTransform) -> Result<()> {
        let rv = unsafe {
            gdal_sys::GDALSetGeoTransform(self.c_dataset, transformation.as_ptr() as *mut f64)
        };
        if rv != CPLErr::CE_None {
            return Err(_last_cpl_err(rv));
        }
        Ok(())
    }

    fn projection(&self) -> String {
        let rv = unsafe { gdal_sys::GDALGetProjectionRef(self.c_dataset) };
        _string(rv)
    }

    fn set_projection(&mut self, projection: &str) -> Result<()> {
        let c_projection = CString::new(projection)?;
        let rv = unsafe { gdal_sys::GDALSetProjection(self.c_dataset, c_projection.as_ptr()) };
        if rv != CPLErr::CE_None {
            return Err(_last_cpl_err(rv));
        }
        Ok(())
    }

    /// Close the dataset, flushing pending writes.
    ///
    /// Fails when GDAL reported a failure while closing.
    fn close(mut self) -> Result<()> {
        let c_dataset = std::mem::replace(&mut self.c_dataset, ptr::null_mut());
        unsafe {
            gdal_sys::CPLErrorReset();
            gdal_sys::GDALClose(c_dataset);
        }
        let class = unsafe { gdal_sys::CPLGetLastErrorType() };
        if class >= CPLErr::CE_Failure {
            return Err(_last_cpl_err(class));
        }
        Ok(())
    }
}

impl Drop for GdalDataset {
    fn drop(&mut self) {
        if self.c_dataset.is_null() {
            return;
        }
        unsafe {
            gdal_sys::GDALClose(self.c_dataset);
        }
    }
}
