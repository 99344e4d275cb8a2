//! In-memory raster datasets.
//!
//! [`MemStore`] plays the role of a file system holding datasets by path, so a coverage
//! stored through a [`MemDriver`] can be opened again. Datasets count their raw reads and
//! writes, and the store can simulate driver failures.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::dataset::RasterDataset;
use crate::driver::{DriverManager, RasterDriver};
use crate::errors::{CoverageError, CplErrType, Result};
use crate::geo_transform::GeoTransform;
use crate::metadata::Metadata;
use crate::raster::{PixelEncoding, RasterBand};

/// Driver calls a [`MemStore`] can be told to fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemFailure {
    Create,
    RasterRead,
    RasterWrite,
    SetGeoTransform,
    SetProjection,
}

#[derive(Debug, Default)]
struct FailureSet(RefCell<Vec<MemFailure>>);

impl FailureSet {
    fn check(&self, failure: MemFailure, msg: &str) -> Result<()> {
        if self.0.borrow().contains(&failure) {
            return Err(CoverageError::CplError {
                class: CplErrType::Failure,
                number: 1,
                msg: msg.to_string(),
            });
        }
        Ok(())
    }
}

/// Number of raw I/O calls a dataset has served.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IoCounts {
    pub reads: usize,
    pub writes: usize,
}

#[derive(Debug)]
struct MemBandData {
    encoding: PixelEncoding,
    type_size_bits: usize,
    data: RefCell<Vec<u8>>,
    metadata: RefCell<HashMap<(String, String), String>>,
}

#[derive(Debug)]
struct MemDatasetInner {
    size: (usize, usize),
    bands: Vec<MemBandData>,
    geo_transform: RefCell<Option<GeoTransform>>,
    projection: RefCell<String>,
    io: Cell<IoCounts>,
    failures: Rc<FailureSet>,
}

/// A raster dataset held in memory.
///
/// Clones share the same pixels.
#[derive(Clone, Debug)]
pub struct MemDataset {
    inner: Rc<MemDatasetInner>,
}

impl MemDataset {
    /// Zero filled dataset of `size` `(cols, rows)`.
    pub fn new(size: (usize, usize), bands: usize, encoding: PixelEncoding) -> Self {
        Self::with_type_size(size, bands, encoding, encoding.bits().unwrap_or(0))
    }

    /// Like [`MemDataset::new`], with the bit width given for encodings the crate does not know.
    pub fn with_type_size(
        size: (usize, usize),
        bands: usize,
        encoding: PixelEncoding,
        type_size_bits: usize,
    ) -> Self {
        Self::create_in(size, bands, encoding, type_size_bits, Rc::default())
    }

    fn create_in(
        size: (usize, usize),
        bands: usize,
        encoding: PixelEncoding,
        type_size_bits: usize,
        failures: Rc<FailureSet>,
    ) -> Self {
        let byte_width = encoding.bits().unwrap_or(type_size_bits) / 8;
        let bands = (0..bands)
            .map(|_| MemBandData {
                encoding,
                type_size_bits,
                data: RefCell::new(vec![0u8; size.0 * size.1 * byte_width]),
                metadata: RefCell::default(),
            })
            .collect();
        MemDataset {
            inner: Rc::new(MemDatasetInner {
                size,
                bands,
                geo_transform: RefCell::new(None),
                projection: RefCell::new(String::new()),
                io: Cell::new(IoCounts::default()),
                failures,
            }),
        }
    }

    /// Overwrite a whole band with `values`, converted to the band's encoding.
    ///
    /// Not counted as raw I/O.
    pub fn fill_band(&self, band_index: usize, values: &[f64]) -> Result<()> {
        let band = self.band_data(band_index)?;
        let pixels = self.inner.size.0 * self.inner.size.1;
        if values.len() != pixels {
            return Err(CoverageError::BadArgument(format!(
                "band holds {pixels} values, got {}",
                values.len()
            )));
        }
        let codec = band.encoding.descriptor(band.type_size_bits);
        let mut data = band.data.borrow_mut();
        for (i, v) in values.iter().enumerate() {
            codec.encode(*v, &mut data, i);
        }
        Ok(())
    }

    /// Raw bytes of a band, not counted as raw I/O.
    pub fn band_bytes(&self, band_index: usize) -> Result<Vec<u8>> {
        Ok(self.band_data(band_index)?.data.borrow().clone())
    }

    pub fn io_counts(&self) -> IoCounts {
        self.inner.io.get()
    }

    fn band_data(&self, band_index: usize) -> Result<&MemBandData> {
        band_index
            .checked_sub(1)
            .and_then(|i| self.inner.bands.get(i))
            .ok_or_else(|| CoverageError::NullPointer {
                method_name: "GetRasterBand",
                msg: format!("Illegal band #{band_index}"),
            })
    }
}

impl RasterDataset for MemDataset {
    type Band<'a> = MemBand<'a>;

    fn raster_size(&self) -> (usize, usize) {
        self.inner.size
    }

    fn raster_count(&self) -> usize {
        self.inner.bands.len()
    }

    fn rasterband(&self, band_index: usize) -> Result<MemBand<'_>> {
        Ok(MemBand {
            dataset: &self.inner,
            band: self.band_data(band_index)?,
        })
    }

    fn geo_transform(&self) -> Result<GeoTransform> {
        self.inner
            .geo_transform
            .borrow()
            .ok_or_else(|| CoverageError::CplError {
                class: CplErrType::Failure,
                number: 1,
                msg: "Dataset has no geo transform".to_string(),
            })
    }

    fn set_geo_transform(&mut self, transformation: &GeoTransform) -> Result<()> {
        self.inner
            .failures
            .check(MemFailure::SetGeoTransform, "SetGeoTransform failed")?;
        self.inner.geo_transform.replace(Some(*transformation));
        Ok(())
    }

    fn projection(&self) -> String {
        self.inner.projection.borrow().clone()
    }

    fn set_projection(&mut self, projection: &str) -> Result<()> {
        self.inner
            .failures
            .check(MemFailure::SetProjection, "SetProjection failed")?;
        self.inner.projection.replace(projection.to_string());
        Ok(())
    }

    fn close(self) -> Result<()> {
        Ok(())
    }
}

/// A band of a [`MemDataset`].
pub struct MemBand<'a> {
    dataset: &'a MemDatasetInner,
    band: &'a MemBandData,
}

impl MemBand<'_> {
    fn check_window(&self, window: (usize, usize), window_size: (usize, usize)) -> Result<()> {
        let (cols, rows) = self.dataset.size;
        if window.0 + window_size.0 > cols || window.1 + window_size.1 > rows {
            return Err(CoverageError::CplError {
                class: CplErrType::Failure,
                number: 5,
                msg: format!(
                    "Access window out of range in RasterIO(). Requested ({},{}) of size {}x{} on raster of {cols}x{rows}.",
                    window.0, window.1, window_size.0, window_size.1
                ),
            });
        }
        Ok(())
    }

    fn count(&self, write: bool) {
        let mut io = self.dataset.io.get();
        if write {
            io.writes += 1;
        } else {
            io.reads += 1;
        }
        self.dataset.io.set(io);
    }

    /// Copy between band storage and a caller buffer, converting encodings as needed.
    fn transfer(
        &self,
        window: (usize, usize),
        window_size: (usize, usize),
        encoding: PixelEncoding,
        buffer_len: usize,
        mut copy: impl FnMut(usize, usize, &MemCodecs),
    ) -> Result<()> {
        self.check_window(window, window_size)?;
        let codecs = MemCodecs::new(self.band, encoding)?;
        let needed = window_size.0 * window_size.1 * codecs.buffer_width;
        if buffer_len < needed {
            return Err(CoverageError::BadArgument(format!(
                "buffer of {buffer_len} bytes, window needs {needed}"
            )));
        }
        for row in 0..window_size.1 {
            for col in 0..window_size.0 {
                let band_index = (window.1 + row) * self.dataset.size.0 + window.0 + col;
                copy(band_index, row * window_size.0 + col, &codecs);
            }
        }
        Ok(())
    }
}

struct MemCodecs {
    band: crate::raster::EncodingDescriptor,
    buffer: crate::raster::EncodingDescriptor,
    band_width: usize,
    buffer_width: usize,
    same: bool,
}

impl MemCodecs {
    fn new(band: &MemBandData, encoding: PixelEncoding) -> Result<Self> {
        let same = encoding == band.encoding;
        if !same && !(encoding.is_known() && band.encoding.is_known()) {
            return Err(CoverageError::CplError {
                class: CplErrType::Failure,
                number: 1,
                msg: format!("Cannot convert {} to {encoding}", band.encoding),
            });
        }
        let band_codec = band.encoding.descriptor(band.type_size_bits);
        let buffer_codec = encoding.descriptor(band.type_size_bits);
        Ok(MemCodecs {
            band_width: band_codec.byte_width(),
            buffer_width: buffer_codec.byte_width(),
            band: band_codec,
            buffer: buffer_codec,
            same,
        })
    }
}

impl RasterBand for MemBand<'_> {
    fn band_type(&self) -> PixelEncoding {
        self.band.encoding
    }

    fn type_size_bits(&self) -> usize {
        self.band.type_size_bits
    }

    fn size(&self) -> (usize, usize) {
        self.dataset.size
    }

    fn minimum(&self) -> Option<f64> {
        self.statistics().map(|(min, _)| min)
    }

    fn maximum(&self) -> Option<f64> {
        self.statistics().map(|(_, max)| max)
    }

    fn read_raw(
        &self,
        window: (usize, usize),
        window_size: (usize, usize),
        encoding: PixelEncoding,
        buffer: &mut [u8],
    ) -> Result<()> {
        self.dataset
            .failures
            .check(MemFailure::RasterRead, "RasterIO read failed")?;
        self.count(false);
        let data = self.band.data.borrow();
        let buffer_len = buffer.len();
        self.transfer(window, window_size, encoding, buffer_len, |from, to, c| {
            if c.same {
                let src = &data[from * c.band_width..(from + 1) * c.band_width];
                buffer[to * c.buffer_width..(to + 1) * c.buffer_width].copy_from_slice(src);
            } else {
                c.buffer.encode(c.band.decode(&data, from), buffer, to);
            }
        })
    }

    fn write_raw(
        &mut self,
        window: (usize, usize),
        window_size: (usize, usize),
        encoding: PixelEncoding,
        buffer: &[u8],
    ) -> Result<()> {
        self.dataset
            .failures
            .check(MemFailure::RasterWrite, "RasterIO write failed")?;
        self.count(true);
        let mut data = self.band.data.borrow_mut();
        self.transfer(window, window_size, encoding, buffer.len(), |to, from, c| {
            if c.same {
                let src = &buffer[from * c.buffer_width..(from + 1) * c.buffer_width];
                data[to * c.band_width..(to + 1) * c.band_width].copy_from_slice(src);
            } else {
                c.band.encode(c.buffer.decode(buffer, from), &mut data, to);
            }
        })
    }
}

impl Metadata for MemBand<'_> {
    fn metadata_item(&self, key: &str, domain: &str) -> Option<String> {
        self.band
            .metadata
            .borrow()
            .get(&(domain.to_string(), key.to_string()))
            .cloned()
    }

    fn set_metadata_item(&mut self, key: &str, value: &str, domain: &str) -> Result<()> {
        self.band
            .metadata
            .borrow_mut()
            .insert((domain.to_string(), key.to_string()), value.to_string());
        Ok(())
    }
}

impl MemBand<'_> {
    fn statistics(&self) -> Option<(f64, f64)> {
        if !self.band.encoding.is_known() {
            return None;
        }
        let codec = self.band.encoding.descriptor(self.band.type_size_bits);
        let data = self.band.data.borrow();
        let count = data.len() / codec.byte_width();
        (0..count)
            .map(|i| codec.decode(&data, i))
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((min, max)) => Some((f64::min(min, v), f64::max(max, v))),
            })
    }
}

#[derive(Debug, Default)]
struct MemStoreInner {
    files: RefCell<HashMap<PathBuf, MemDataset>>,
    drivers: RefCell<HashMap<String, Option<String>>>,
    failures: Rc<FailureSet>,
}

/// Shared table of in-memory datasets and the drivers writing into it.
///
/// A new store knows the `MEM` driver, which has no file extension.
#[derive(Clone, Debug)]
pub struct MemStore {
    inner: Rc<MemStoreInner>,
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemStore {
    pub fn new() -> Self {
        let store = MemStore {
            inner: Rc::default(),
        };
        store.register_driver("MEM", None);
        store
    }

    /// Make a driver named `short_name` available, writing files with `extension`.
    pub fn register_driver(&self, short_name: &str, extension: Option<&str>) {
        self.inner.drivers.borrow_mut().insert(
            short_name.to_string(),
            extension.map(str::to_string),
        );
    }

    pub fn inject_failure(&self, failure: MemFailure) {
        self.inner.failures.0.borrow_mut().push(failure);
    }

    pub fn clear_failures(&self) {
        self.inner.failures.0.borrow_mut().clear();
    }

    /// Open a dataset created under `path`.
    pub fn open<P: AsRef<Path>>(&self, path: P) -> Result<MemDataset> {
        let path = path.as_ref();
        self.inner
            .files
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| CoverageError::NullPointer {
                method_name: "GDALOpen",
                msg: format!("{} does not exist in the in-memory store", path.display()),
            })
    }

    pub fn exists<P: AsRef<Path>>(&self, path: P) -> bool {
        self.inner.files.borrow().contains_key(path.as_ref())
    }
}

impl DriverManager for MemStore {
    type Driver = MemDriver;

    fn get_driver_by_name(&self, name: &str) -> Result<MemDriver> {
        let extension = self
            .inner
            .drivers
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| CoverageError::NullPointer {
                method_name: "GDALGetDriverByName",
                msg: format!("No driver named '{name}'"),
            })?;
        Ok(MemDriver {
            short_name: name.to_string(),
            extension,
            store: self.clone(),
        })
    }

    fn open_dataset(&self, path: &Path) -> Result<MemDataset> {
        self.open(path)
    }
}

/// Driver creating datasets inside a [`MemStore`].
#[derive(Clone, Debug)]
pub struct MemDriver {
    short_name: String,
    extension: Option<String>,
    store: MemStore,
}

impl RasterDriver for MemDriver {
    type Dataset = MemDataset;

    fn short_name(&self) -> String {
        self.short_name.clone()
    }

    fn extension(&self) -> Option<String> {
        self.extension.clone()
    }

    fn create(
        &self,
        filename: &Path,
        size: (usize, usize),
        bands: usize,
        encoding: PixelEncoding,
    ) -> Result<MemDataset> {
        let failures = self.store.inner.failures.clone();
        failures.check(MemFailure::Create, "Create failed")?;
        let type_size_bits = encoding.bits().ok_or_else(|| {
            CoverageError::UnsupportedEncoding(format!("cannot create bands of {encoding}"))
        })?;
        let dataset = MemDataset::create_in(size, bands, encoding, type_size_bits, failures);
        self.store
            .inner
            .files
            .borrow_mut()
            .insert(filename.to_path_buf(), dataset.clone());
        Ok(dataset)
    }
}
