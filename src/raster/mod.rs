//! Raster data: pixel encodings, in-memory grids and block-wise transfer

mod buffer;
mod grid;
pub mod mem;
mod rasterband;
pub mod transfer;
mod types;

pub use buffer::{Buffer, ByteBuffer};
pub use grid::{BlockIndex, Blocks, Grid, GridSize};
pub use rasterband::RasterBand;
pub use types::{EncodingDescriptor, PixelEncoding, PixelType, UNDEF, UNDEF_F32};
