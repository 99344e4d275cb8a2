//! Block-wise transfer between raster datasets and [`Grid`]s.
//!
//! Both directions walk the grid's blocks in [`Grid::blocks`] order: every layer in turn,
//! and within a layer consecutive runs of `lines_per_block` lines. One raw I/O call is made
//! per block.

use crate::dataset::RasterDataset;
use crate::errors::{CoverageError, Result};
use crate::issues::IssueLog;
use crate::raster::{Grid, PixelEncoding, PixelType, RasterBand};

/// Populate every block of `grid` from the bands of `dataset`.
///
/// The grid must be sized from the dataset already, its `zsize` deciding how many bands are
/// read. The pixel encoding is resolved once from band 1 and used for every band. An
/// unrecognised encoding is not fatal: all samples become [`UNDEF`](crate::raster::UNDEF)
/// and one issue is logged for the pass.
///
/// Any failure aborts the pass and the partially filled grid is dropped.
pub fn read_grid<D: RasterDataset>(dataset: &D, mut grid: Grid, issues: &IssueLog) -> Result<Grid> {
    let size = grid.size();
    let mut band = dataset.rasterband(1)?;
    let codec = band.band_type().descriptor(band.type_size_bits());
    if !codec.encoding().is_known() {
        issues.warning(format!(
            "Unknown pixel encoding {} in band 1, values read as undefined",
            codec.encoding()
        ));
    }

    let mut block_buffer = vec![0u8; grid.lines_per_block() * size.xsize * codec.byte_width()];
    let capacity = block_buffer.len();
    let mut layer = 0;
    // `Grid::blocks` only yields defined blocks of at most `lines_per_block` lines, the
    // block size and capacity checks below guard that contract.
    for block in grid.blocks() {
        if block.layer != layer {
            layer = block.layer;
            band = dataset.rasterband(block.band_index())?;
        }
        let count = grid
            .block_size(block.index)
            .ok_or(CoverageError::UndefinedBlockSize { index: block.index })?;
        let bytes = block.lines * size.xsize * codec.byte_width();
        let raw = block_buffer.get_mut(..bytes).ok_or_else(|| {
            CoverageError::CorruptData(format!(
                "block {} needs {bytes} bytes, transfer buffer holds {capacity}",
                block.index
            ))
        })?;
        band.read_raw(
            (0, block.line_offset),
            (size.xsize, block.lines),
            codec.encoding(),
            raw,
        )?;
        let values = codec.decode_all(raw, count)?;
        grid.set_block(block.index, values)?;
    }
    Ok(grid)
}

/// Write every block of `grid` into the bands of `dataset`, converting samples to `encoding`.
///
/// The dataset must already have the grid's size and at least `zsize` bands.
pub fn write_grid<D: RasterDataset>(
    dataset: &D,
    grid: &Grid,
    encoding: PixelEncoding,
) -> Result<()> {
    match encoding {
        PixelEncoding::Byte => save::<u8, D>(dataset, grid),
        PixelEncoding::Int8 => save::<i8, D>(dataset, grid),
        PixelEncoding::UInt16 => save::<u16, D>(dataset, grid),
        PixelEncoding::Int16 => save::<i16, D>(dataset, grid),
        PixelEncoding::Int32 => save::<i32, D>(dataset, grid),
        PixelEncoding::UInt32 => save::<u32, D>(dataset, grid),
        PixelEncoding::Float32 => save::<f32, D>(dataset, grid),
        PixelEncoding::Float64 => save::<f64, D>(dataset, grid),
        PixelEncoding::Unknown(_) => Err(CoverageError::UnsupportedEncoding(format!(
            "cannot write samples as {encoding}"
        ))),
    }
}

fn save<T: PixelType, D: RasterDataset>(dataset: &D, grid: &Grid) -> Result<()> {
    let xsize = grid.size().xsize;
    let codec = T::ENCODING.descriptor(std::mem::size_of::<T>() * 8);
    let mut block_buffer = vec![0u8; grid.lines_per_block() * xsize * codec.byte_width()];
    let capacity = block_buffer.len();
    let mut band = dataset.rasterband(1)?;
    let mut layer = 0;
    for block in grid.blocks() {
        if block.layer != layer {
            layer = block.layer;
            band = dataset.rasterband(block.band_index())?;
        }
        let values = grid.block(block.index).ok_or_else(|| {
            CoverageError::CorruptData(format!("block {} was never populated", block.index))
        })?;
        let bytes = block.lines * xsize * codec.byte_width();
        let raw = block_buffer.get_mut(..bytes).ok_or_else(|| {
            CoverageError::CorruptData(format!(
                "block {} needs {bytes} bytes, transfer buffer holds {capacity}",
                block.index
            ))
        })?;
        for (i, value) in values.iter().enumerate() {
            codec.encode(*value, raw, i);
        }
        band.write_raw(
            (0, block.line_offset),
            (xsize, block.lines),
            codec.encoding(),
            raw,
        )?;
    }
    Ok(())
}
