//! Raster datasets backed by the GDAL library through `gdal-sys`.
//!
//! Only compiled with the `gdal` feature.

mod dataset;
mod driver;
mod rasterband;

pub use dataset::GdalDataset;
pub use driver::{GdalDriver, GdalDriverManager};
pub use rasterband::GdalBand;

use std::ffi::CString;

use gdal_sys::{self, CPLErr, GDALMajorObjectH};

use crate::errors::*;
use crate::utils::{_last_cpl_err, _option_string};

fn _metadata_item(c_object: GDALMajorObjectH, key: &str, domain: &str) -> Option<String> {
    let c_key = CString::new(key).ok()?;
    let c_domain = CString::new(domain).ok()?;
    let c_res = unsafe { gdal_sys::GDALGetMetadataItem(c_object, c_key.as_ptr(), c_domain.as_ptr()) };
    _option_string(c_res)
}

fn _set_metadata_item(
    c_object: GDALMajorObjectH,
    key: &str,
    value: &str,
    domain: &str,
) -> Result<()> {
    let c_key = CString::new(key)?;
    let c_domain = CString::new(domain)?;
    let c_value = CString::new(value)?;
    let c_res = unsafe {
        gdal_sys::GDALSetMetadataItem(
            c_object,
            c_key.as_ptr(),
            c_value.as_ptr(),
            c_domain.as_ptr(),
        )
    };
    if c_res != CPLErr::CE_None {
        return Err(_last_cpl_err(c_res));
    }
    Ok(())
}
