use crate::raster::PixelType;

#[cfg(feature = "ndarray")]
use ndarray::Array2;

/// A 2-D array backed by it's `size` (cols, rows) and a row-major `Vec<T>` and it's dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct Buffer<T> {
    pub size: (usize, usize),
    pub data: Vec<T>,
}

impl<T: PixelType> Buffer<T> {
    /// Construct a new buffer from `size` (`(cols, rows)`) and `Vec<T>`.
    ///
    /// # Panic
    /// Will panic if `size.0 * size.1 != data.len()`.
    pub fn new(size: (usize, usize), data: Vec<T>) -> Self {
        assert_eq!(
            size.0 * size.1,
            data.len(),
            "size {:?} does not match length {}",
            size,
            data.len()
        );
        Buffer { size, data }
    }

    /// Samples converted from `f64`, saturating for integer types.
    pub fn from_f64(size: (usize, usize), values: &[f64]) -> Self {
        Self::new(size, values.iter().map(|v| T::from_f64(*v)).collect())
    }

    /// Reinterpret native-endian raw bytes as samples.
    pub fn from_ne_bytes(size: (usize, usize), bytes: &[u8]) -> Self {
        let width = std::mem::size_of::<T>();
        Self::new(size, bytes.chunks_exact(width).map(T::read_ne).collect())
    }

    /// Native-endian raw bytes, the layout raw band I/O expects.
    pub fn to_ne_bytes(&self) -> Vec<u8> {
        let width = std::mem::size_of::<T>();
        let mut bytes = vec![0u8; self.data.len() * width];
        for (value, chunk) in self.data.iter().zip(bytes.chunks_exact_mut(width)) {
            value.write_ne(chunk);
        }
        bytes
    }

    #[cfg(feature = "ndarray")]
    /// Convert `self` into an [`ndarray::Array2`].
    pub fn to_array(self) -> crate::errors::Result<Array2<T>> {
        // Array2 shape is (rows, cols) and Buffer shape is (cols in x-axis, rows in y-axis)
        Ok(Array2::from_shape_vec(
            (self.size.1, self.size.0),
            self.data,
        )?)
    }
}

pub type ByteBuffer = Buffer<u8>;
