use std::ffi::{c_int, CString};
use std::path::Path;
use std::ptr;
use std::sync::Once;

use gdal_sys::{self, GDALDriverH, GDALMajorObjectH};

use super::{GdalDataset, _metadata_item};
use crate::driver::{DriverManager, RasterDriver};
use crate::errors::*;
use crate::raster::PixelEncoding;
use crate::utils::{_last_null_pointer_err, _path_to_c_string, _string};

static START: Once = Once::new();

pub fn _register_drivers() {
    unsafe {
        START.call_once(|| {
            gdal_sys::GDALAllRegister();
        });
    }
}

/// Entry point to the drivers registered with GDAL.
#[derive(Clone, Copy, Debug, Default)]
pub struct GdalDriverManager;

impl GdalDriverManager {
    pub fn new() -> Self {
        _register_drivers();
        GdalDriverManager
    }

    pub fn count(&self) -> usize {
        _register_drivers();
        (unsafe { gdal_sys::GDALGetDriverCount() }) as usize
    }
}

impl DriverManager for GdalDriverManager {
    type Driver = GdalDriver;

    fn get_driver_by_name(&self, name: &str) -> Result<GdalDriver> {
        _register_drivers();
        let c_name = CString::new(name)?;
        let c_driver = unsafe { gdal_sys::GDALGetDriverByName(c_name.as_ptr()) };
        if c_driver.is_null() {
            return Err(_last_null_pointer_err("GDALGetDriverByName"));
        };
        Ok(GdalDriver { c_driver })
    }

    fn open_dataset(&self, path: &Path) -> Result<GdalDataset> {
        _register_drivers();
        let c_filename = _path_to_c_string(path)?;
        let c_dataset = unsafe {
            gdal_sys::GDALOpenEx(
                c_filename.as_ptr(),
                gdal_sys::GDAL_OF_RASTER | gdal_sys::GDAL_OF_READONLY | gdal_sys::GDAL_OF_VERBOSE_ERROR,
                ptr::null(),
                ptr::null(),
                ptr::null(),
            )
        };
        if c_dataset.is_null() {
            return Err(_last_null_pointer_err("GDALOpenEx"));
        }
        Ok(unsafe { GdalDataset::from_c_dataset(c_dataset) })
    }
}

/// A GDAL format driver.
#[derive(Debug)]
pub struct GdalDriver {
    c_driver: GDALDriverH,
}

impl GdalDriver {
    /// Returns the wrapped C pointer
    ///
    /// # Safety
    /// This method returns a raw C pointer
    pub unsafe fn c_driver(&self) -> GDALDriverH {
        self.c_driver
    }

    pub fn long_name(&self) -> String {
        let rv = unsafe { gdal_sys::GDALGetDriverLongName(self.c_driver) };
        _string(rv)
    }
}

impl RasterDriver for GdalDriver {
    type Dataset = GdalDataset;

    fn short_name(&self) -> String {
        let rv = unsafe { gdal_sys::GDALGetDriverShortName(self.c_driver) };
        _string(rv)
    }

    fn extension(&self) -> Option<String> {
        _metadata_item(self.c_driver as GDALMajorObjectH, "DMD_EXTENSION", "")
            .filter(|ext| !ext.is_empty())
    }

    fn create(
        &self,
        filename: &Path,
        size: (usize, usize),
        bands: usize,
        encoding: PixelEncoding,
    ) -> Result<GdalDataset> {
        if !encoding.is_known() {
            return Err(CoverageError::UnsupportedEncoding(format!(
                "cannot create bands of {encoding}"
            )));
        }
        let c_filename = _path_to_c_string(filename)?;
        let c_dataset = unsafe {
            gdal_sys::GDALCreate(
                self.c_driver,
                c_filename.as_ptr(),
                size.0 as c_int,
                size.1 as c_int,
                bands as c_int,
                encoding.type_id(),
                ptr::null_mut(),
            )
        };

        if c_dataset.is_null() {
            return Err(_last_null_pointer_err("GDALCreate"));
        };

        Ok(unsafe { GdalDataset::from_c_dataset(c_dataset) })
    }
}
