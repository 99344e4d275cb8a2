use std::fmt::{Display, Formatter};

use crate::errors::{CoverageError, Result};

/// Value every undecodable sample is replaced with.
pub const UNDEF: f64 = -1e308;

/// [`UNDEF`] as stored in `Float32` samples, which cannot represent it.
pub const UNDEF_F32: f32 = -1e38;

/// External numeric encoding of one raster sample.
///
/// The numbering of [`PixelEncoding::type_id`] follows GDAL's `GDALDataType`,
/// so ids can be handed to and received from a driver unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelEncoding {
    /// Eight bit unsigned integer (`GDT_Byte`).
    Byte,
    /// Eight bit signed integer (`GDT_Int8`).
    Int8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Float32,
    Float64,
    /// Any other driver type, carried as its raw id.
    Unknown(u32),
}

impl PixelEncoding {
    pub fn from_type_id(type_id: u32) -> Self {
        match type_id {
            1 => PixelEncoding::Byte,
            2 => PixelEncoding::UInt16,
            3 => PixelEncoding::Int16,
            4 => PixelEncoding::UInt32,
            5 => PixelEncoding::Int32,
            6 => PixelEncoding::Float32,
            7 => PixelEncoding::Float64,
            14 => PixelEncoding::Int8,
            other => PixelEncoding::Unknown(other),
        }
    }

    pub fn type_id(&self) -> u32 {
        match self {
            PixelEncoding::Byte => 1,
            PixelEncoding::UInt16 => 2,
            PixelEncoding::Int16 => 3,
            PixelEncoding::UInt32 => 4,
            PixelEncoding::Int32 => 5,
            PixelEncoding::Float32 => 6,
            PixelEncoding::Float64 => 7,
            PixelEncoding::Int8 => 14,
            PixelEncoding::Unknown(id) => *id,
        }
    }

    /// Size in **bits**, `None` for unknown encodings.
    pub fn bits(&self) -> Option<usize> {
        match self {
            PixelEncoding::Byte | PixelEncoding::Int8 => Some(8),
            PixelEncoding::Int16 | PixelEncoding::UInt16 => Some(16),
            PixelEncoding::Int32 | PixelEncoding::UInt32 | PixelEncoding::Float32 => Some(32),
            PixelEncoding::Float64 => Some(64),
            PixelEncoding::Unknown(_) => None,
        }
    }

    /// Smallest and largest representable value.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        let bounds = match self {
            PixelEncoding::Byte => (u8::MIN as f64, u8::MAX as f64),
            PixelEncoding::Int8 => (i8::MIN as f64, i8::MAX as f64),
            PixelEncoding::Int16 => (i16::MIN as f64, i16::MAX as f64),
            PixelEncoding::UInt16 => (u16::MIN as f64, u16::MAX as f64),
            PixelEncoding::Int32 => (i32::MIN as f64, i32::MAX as f64),
            PixelEncoding::UInt32 => (u32::MIN as f64, u32::MAX as f64),
            PixelEncoding::Float32 => (f32::MIN as f64, f32::MAX as f64),
            PixelEncoding::Float64 => (f64::MIN, f64::MAX),
            PixelEncoding::Unknown(_) => return None,
        };
        Some(bounds)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, PixelEncoding::Unknown(_))
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, PixelEncoding::Float32 | PixelEncoding::Float64)
    }

    /// Resolve the per-session codec.
    ///
    /// `type_size_bits` is the width the driver reports for this encoding. It is only
    /// consulted for unknown encodings, where it keeps the transfer buffer correctly sized.
    pub fn descriptor(self, type_size_bits: usize) -> EncodingDescriptor {
        let byte_width = self.bits().unwrap_or(type_size_bits) / 8;
        let (decode, encode): (DecodeFn, EncodeFn) = match self {
            PixelEncoding::Byte => (decode_as::<u8>, encode_as::<u8>),
            PixelEncoding::Int8 => (decode_as::<i8>, encode_as::<i8>),
            PixelEncoding::Int16 => (decode_as::<i16>, encode_as::<i16>),
            PixelEncoding::UInt16 => (decode_as::<u16>, encode_as::<u16>),
            PixelEncoding::Int32 => (decode_as::<i32>, encode_as::<i32>),
            PixelEncoding::UInt32 => (decode_as::<u32>, encode_as::<u32>),
            PixelEncoding::Float32 => (decode_f32, encode_f32),
            PixelEncoding::Float64 => (decode_as::<f64>, encode_as::<f64>),
            PixelEncoding::Unknown(_) => (decode_undefined, encode_nothing),
        };
        EncodingDescriptor {
            encoding: self,
            byte_width,
            decode,
            encode,
        }
    }
}

impl Display for PixelEncoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PixelEncoding::Byte => f.write_str("Byte"),
            PixelEncoding::Int8 => f.write_str("Int8"),
            PixelEncoding::Int16 => f.write_str("Int16"),
            PixelEncoding::UInt16 => f.write_str("UInt16"),
            PixelEncoding::Int32 => f.write_str("Int32"),
            PixelEncoding::UInt32 => f.write_str("UInt32"),
            PixelEncoding::Float32 => f.write_str("Float32"),
            PixelEncoding::Float64 => f.write_str("Float64"),
            PixelEncoding::Unknown(id) => write!(f, "Unknown({id})"),
        }
    }
}

type DecodeFn = fn(&[u8]) -> f64;
type EncodeFn = fn(f64, &mut [u8]);

/// `(encoding, byte width)` pair with its decode and encode functions.
///
/// Resolved once per read or write session and never re-derived per scalar.
#[derive(Clone, Copy)]
pub struct EncodingDescriptor {
    encoding: PixelEncoding,
    byte_width: usize,
    decode: DecodeFn,
    encode: EncodeFn,
}

impl std::fmt::Debug for EncodingDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodingDescriptor")
            .field("encoding", &self.encoding)
            .field("byte_width", &self.byte_width)
            .finish()
    }
}

impl EncodingDescriptor {
    pub fn encoding(&self) -> PixelEncoding {
        self.encoding
    }

    pub fn byte_width(&self) -> usize {
        self.byte_width
    }

    /// Decode the scalar at `index * byte_width` in `buffer`.
    ///
    /// Unknown encodings yield [`UNDEF`].
    pub fn decode(&self, buffer: &[u8], index: usize) -> f64 {
        let start = index * self.byte_width;
        (self.decode)(&buffer[start..start + self.byte_width])
    }

    /// Encode `value` at `index * byte_width` in `buffer`.
    ///
    /// Values outside the encoding's range saturate, floats are truncated towards zero
    /// for integer encodings.
    pub fn encode(&self, value: f64, buffer: &mut [u8], index: usize) {
        let start = index * self.byte_width;
        (self.encode)(value, &mut buffer[start..start + self.byte_width])
    }

    /// Decode the first `count` scalars of `buffer`.
    pub fn decode_all(&self, buffer: &[u8], count: usize) -> Result<Vec<f64>> {
        let needed = count * self.byte_width;
        if buffer.len() < needed {
            return Err(CoverageError::CorruptData(format!(
                "{count} values of {} need {needed} bytes, buffer holds {}",
                self.encoding,
                buffer.len()
            )));
        }
        Ok((0..count).map(|i| self.decode(buffer, i)).collect())
    }
}

/// Type-level constraint for the primitive sample types a grid can be saved as.
pub trait PixelType: Copy {
    const ENCODING: PixelEncoding;

    fn from_f64(value: f64) -> Self;
    fn to_f64(self) -> f64;
    fn read_ne(bytes: &[u8]) -> Self;
    fn write_ne(self, bytes: &mut [u8]);
}

macro_rules! impl_pixel_type {
    ($t:ty, $encoding:expr) => {
        impl PixelType for $t {
            const ENCODING: PixelEncoding = $encoding;

            fn from_f64(value: f64) -> Self {
                value as $t
            }

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn read_ne(bytes: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$t>()];
                raw.copy_from_slice(bytes);
                <$t>::from_ne_bytes(raw)
            }

            fn write_ne(self, bytes: &mut [u8]) {
                bytes.copy_from_slice(&self.to_ne_bytes());
            }
        }
    };
}

impl_pixel_type!(u8, PixelEncoding::Byte);
impl_pixel_type!(i8, PixelEncoding::Int8);
impl_pixel_type!(i16, PixelEncoding::Int16);
impl_pixel_type!(u16, PixelEncoding::UInt16);
impl_pixel_type!(i32, PixelEncoding::Int32);
impl_pixel_type!(u32, PixelEncoding::UInt32);
impl_pixel_type!(f32, PixelEncoding::Float32);
impl_pixel_type!(f64, PixelEncoding::Float64);

fn decode_as<T: PixelType>(bytes: &[u8]) -> f64 {
    T::read_ne(bytes).to_f64()
}

fn encode_as<T: PixelType>(value: f64, bytes: &mut [u8]) {
    T::from_f64(value).write_ne(bytes)
}

fn decode_f32(bytes: &[u8]) -> f64 {
    let value = f32::read_ne(bytes);
    if value == UNDEF_F32 {
        UNDEF
    } else {
        value as f64
    }
}

fn encode_f32(value: f64, bytes: &mut [u8]) {
    let value = if value == UNDEF { UNDEF_F32 } else { value as f32 };
    value.write_ne(bytes)
}

fn decode_undefined(_: &[u8]) -> f64 {
    UNDEF
}

fn encode_nothing(_: f64, _: &mut [u8]) {}
