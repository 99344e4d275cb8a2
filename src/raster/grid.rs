use crate::errors::{CoverageError, Result};

#[cfg(feature = "ndarray")]
use ndarray::Array2;

/// Raster dimensions: columns, lines and layers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GridSize {
    pub xsize: usize,
    pub ysize: usize,
    pub zsize: usize,
}

impl GridSize {
    pub fn new(xsize: usize, ysize: usize, zsize: usize) -> Self {
        GridSize {
            xsize,
            ysize,
            zsize,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.xsize == 0 || self.ysize == 0 || self.zsize == 0
    }

    pub fn pixel_count(&self) -> usize {
        self.xsize * self.ysize * self.zsize
    }
}

/// Position of one block within a [`Grid`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockIndex {
    /// Global block number, counting across all layers.
    pub index: usize,
    /// Zero-based layer.
    pub layer: usize,
    /// Block number within the layer.
    pub chunk: usize,
    /// First line of the block within the layer.
    pub line_offset: usize,
    /// Number of lines covered, the last block of a layer may be shorter.
    pub lines: usize,
}

impl BlockIndex {
    /// One-based band index of the layer, as used by raster datasets.
    pub fn band_index(&self) -> usize {
        self.layer + 1
    }
}

/// Iterator over the blocks of a [`Grid`], layer-major then chunk-minor.
#[derive(Clone, Debug)]
pub struct Blocks {
    ysize: usize,
    lines_per_block: usize,
    blocks_per_layer: usize,
    next: usize,
    end: usize,
}

impl Iterator for Blocks {
    type Item = BlockIndex;

    fn next(&mut self) -> Option<BlockIndex> {
        if self.next >= self.end {
            return None;
        }
        let index = self.next;
        self.next += 1;
        let layer = index / self.blocks_per_layer;
        let chunk = index % self.blocks_per_layer;
        let line_offset = chunk * self.lines_per_block;
        Some(BlockIndex {
            index,
            layer,
            chunk,
            line_offset,
            lines: self.lines_per_block.min(self.ysize - line_offset),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.end - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Blocks {}

/// In-memory, block tiled raster.
///
/// Every block holds the samples of `lines_per_block` consecutive lines of one layer as
/// `f64`, whatever the source encoding. Block count and capacity are fixed on construction.
#[derive(Clone, Debug)]
pub struct Grid {
    size: GridSize,
    lines_per_block: usize,
    blocks_per_layer: usize,
    blocks: Vec<Option<Vec<f64>>>,
}

impl Grid {
    /// Size a grid whose blocks each fit in `block_bytes`.
    ///
    /// A block always covers at least one line, even when a single line exceeds the budget.
    pub fn new(size: GridSize, block_bytes: usize) -> Result<Self> {
        let line_bytes = size.xsize.max(1) * std::mem::size_of::<f64>();
        let lines = (block_bytes / line_bytes).clamp(1, size.ysize.max(1));
        Self::with_lines_per_block(size, lines)
    }

    pub fn with_lines_per_block(size: GridSize, lines_per_block: usize) -> Result<Self> {
        if size.is_empty() {
            return Err(CoverageError::BadArgument(format!(
                "grid size {size:?} has an empty dimension"
            )));
        }
        if lines_per_block == 0 {
            return Err(CoverageError::BadArgument(
                "a block must cover at least one line".to_string(),
            ));
        }
        let blocks_per_layer = size.ysize.div_ceil(lines_per_block);
        Ok(Grid {
            size,
            lines_per_block,
            blocks_per_layer,
            blocks: vec![None; blocks_per_layer * size.zsize],
        })
    }

    /// Build a fully populated grid, `f(x, y, z)` giving each sample.
    pub fn from_fn<F>(size: GridSize, lines_per_block: usize, mut f: F) -> Result<Self>
    where
        F: FnMut(usize, usize, usize) -> f64,
    {
        let mut grid = Self::with_lines_per_block(size, lines_per_block)?;
        for block in grid.blocks() {
            let mut values = Vec::with_capacity(block.lines * size.xsize);
            for y in block.line_offset..block.line_offset + block.lines {
                for x in 0..size.xsize {
                    values.push(f(x, y, block.layer));
                }
            }
            grid.set_block(block.index, values)?;
        }
        Ok(grid)
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn lines_per_block(&self) -> usize {
        self.lines_per_block
    }

    pub fn blocks_per_layer(&self) -> usize {
        self.blocks_per_layer
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Enumerate every block exactly once, in the order transfers visit them.
    pub fn blocks(&self) -> Blocks {
        Blocks {
            ysize: self.size.ysize,
            lines_per_block: self.lines_per_block,
            blocks_per_layer: self.blocks_per_layer,
            next: 0,
            end: self.blocks.len(),
        }
    }

    pub fn block_index(&self, index: usize) -> Option<BlockIndex> {
        self.blocks().nth(index)
    }

    /// Number of samples block `index` holds, `None` when there is no such block.
    pub fn block_size(&self, index: usize) -> Option<usize> {
        if index >= self.blocks.len() {
            return None;
        }
        let line_offset = (index % self.blocks_per_layer) * self.lines_per_block;
        let lines = self.lines_per_block.min(self.size.ysize - line_offset);
        Some(lines * self.size.xsize)
    }

    /// Hand `values` over to the grid as block `index`.
    ///
    /// Each block can be populated once, with exactly [`Grid::block_size`] values.
    pub fn set_block(&mut self, index: usize, values: Vec<f64>) -> Result<()> {
        let expected = self
            .block_size(index)
            .ok_or(CoverageError::UndefinedBlockSize { index })?;
        if values.len() != expected {
            return Err(CoverageError::BlockLengthMismatch {
                index,
                expected,
                actual: values.len(),
            });
        }
        let slot = &mut self.blocks[index];
        if slot.is_some() {
            return Err(CoverageError::BlockAlreadyPopulated { index });
        }
        *slot = Some(values);
        Ok(())
    }

    pub fn block(&self, index: usize) -> Option<&[f64]> {
        self.blocks.get(index)?.as_deref()
    }

    pub fn value(&self, x: usize, y: usize, z: usize) -> Option<f64> {
        if x >= self.size.xsize || y >= self.size.ysize || z >= self.size.zsize {
            return None;
        }
        let chunk = y / self.lines_per_block;
        let block = self.block(z * self.blocks_per_layer + chunk)?;
        let line = y - chunk * self.lines_per_block;
        block.get(line * self.size.xsize + x).copied()
    }

    pub fn populated_blocks(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.blocks.iter().all(Option::is_some)
    }

    #[cfg(feature = "ndarray")]
    /// Copy one zero-based layer into an [`ndarray::Array2`].
    ///
    /// The array shape is (rows, cols). Unpopulated blocks come out as [`UNDEF`](crate::raster::UNDEF).
    pub fn layer_as_array(&self, layer: usize) -> Result<Array2<f64>> {
        if layer >= self.size.zsize {
            return Err(CoverageError::BadArgument(format!(
                "layer {layer} outside 0..{}",
                self.size.zsize
            )));
        }
        let mut data = Vec::with_capacity(self.size.xsize * self.size.ysize);
        for block in self.blocks().filter(|b| b.layer == layer) {
            match self.block(block.index) {
                Some(values) => data.extend_from_slice(values),
                None => data.extend(
                    std::iter::repeat(crate::raster::UNDEF).take(block.lines * self.size.xsize),
                ),
            }
        }
        Ok(Array2::from_shape_vec(
            (self.size.ysize, self.size.xsize),
            data,
        )?)
    }
}
