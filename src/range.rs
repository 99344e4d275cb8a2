//! Numeric value ranges.
//!
//! A coverage's value range decides the encoding it is stored with. Ranges come from
//! band statistics on read, or from the three legacy description fields `MinMax`,
//! `Range` and `DomainInfo`, which may disagree with each other.

use bitflags::bitflags;

use crate::errors::{CoverageError, Result};
use crate::raster::PixelEncoding;

bitflags! {
    /// Value type masks, one bit per concrete type.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ValueType: u32 {
        const UINT8 = 0x001;
        const INT8 = 0x002;
        const UINT16 = 0x004;
        const INT16 = 0x008;
        const UINT32 = 0x010;
        const INT32 = 0x020;
        const FLOAT = 0x040;
        const DOUBLE = 0x080;

        const UNSIGNED = Self::UINT8.bits() | Self::UINT16.bits() | Self::UINT32.bits();
        const SIGNED = Self::INT8.bits() | Self::INT16.bits() | Self::INT32.bits();
        const INTEGER = Self::UNSIGNED.bits() | Self::SIGNED.bits();
        const REAL = Self::FLOAT.bits() | Self::DOUBLE.bits();
        const NUMBER = Self::INTEGER.bits() | Self::REAL.bits();
    }
}

impl ValueType {
    /// Destination encoding for a single concrete value type.
    ///
    /// Signed 8-bit values are stored as `Int16`, GDAL only creates `Int8` bands from 3.7 on.
    pub fn pixel_encoding(&self) -> Option<PixelEncoding> {
        const ENCODINGS: [(ValueType, PixelEncoding); 8] = [
            (ValueType::UINT8, PixelEncoding::Byte),
            (ValueType::INT8, PixelEncoding::Int16),
            (ValueType::UINT16, PixelEncoding::UInt16),
            (ValueType::INT16, PixelEncoding::Int16),
            (ValueType::UINT32, PixelEncoding::UInt32),
            (ValueType::INT32, PixelEncoding::Int32),
            (ValueType::FLOAT, PixelEncoding::Float32),
            (ValueType::DOUBLE, PixelEncoding::Float64),
        ];
        ENCODINGS
            .iter()
            .find(|(tp, _)| tp == self)
            .map(|(_, encoding)| *encoding)
    }
}

/// Closed numeric interval with a step.
///
/// A `resolution` of `0` marks a continuous range, `1` an integer one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
    pub resolution: f64,
}

impl Default for NumericRange {
    fn default() -> Self {
        NumericRange::new(-1e300, 1e300, 0.0)
    }
}

impl NumericRange {
    pub fn new(min: f64, max: f64, resolution: f64) -> Self {
        NumericRange {
            min,
            max,
            resolution,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Smallest value type holding every value of the range.
    pub fn determine_type(&self) -> ValueType {
        let integral = self.resolution != 0.0 && self.resolution.fract() == 0.0;
        if !integral {
            return ValueType::DOUBLE;
        }
        let candidates = [
            (ValueType::UINT8, u8::MIN as f64, u8::MAX as f64),
            (ValueType::INT8, i8::MIN as f64, i8::MAX as f64),
            (ValueType::UINT16, u16::MIN as f64, u16::MAX as f64),
            (ValueType::INT16, i16::MIN as f64, i16::MAX as f64),
            (ValueType::UINT32, u32::MIN as f64, u32::MAX as f64),
            (ValueType::INT32, i32::MIN as f64, i32::MAX as f64),
        ];
        candidates
            .iter()
            .find(|(_, lo, hi)| self.min >= *lo && self.max <= *hi)
            .map(|(tp, _, _)| *tp)
            .unwrap_or(ValueType::DOUBLE)
    }

    /// Resolve a range from the legacy description fields of `object`.
    ///
    /// `MinMax` (`min:max`) wins over `Range` (`min:max[:step][:offset=o]`), which wins over
    /// the value part of `DomainInfo` (`;`-separated, fifth item `min:max[:step]`). A field
    /// is only consulted while no proper interval has been found. A non-empty step in
    /// `DomainInfo` marks the range continuous, otherwise it is integral. The third part of
    /// `Range` is an offset and never affects the resolution.
    pub fn from_legacy(fields: &LegacyRangeFields, object: &str) -> Result<Self> {
        let mut bounds: Option<(f64, f64)> = None;
        let mut resolution = 1.0;

        if let Some(minmax) = fields.min_max {
            bounds = parse_pair(minmax, "MinMax", object)?;
        }
        if let Some(range) = fields.range {
            if !is_interval(bounds) {
                bounds = parse_pair(range, "Range", object)?;
            }
        }
        if let Some(info) = fields.domain_info {
            let parts: Vec<&str> = info.split(';').collect();
            if parts.len() >= 6 && !parts[4].is_empty() {
                if !is_interval(bounds) {
                    bounds = parse_pair(parts[4], "DomainInfo", object)?;
                }
                if parts[4].split(':').nth(2).is_some_and(|step| !step.is_empty()) {
                    resolution = 0.0;
                }
            }
        }

        let (min, max) = bounds.unwrap_or((-1e300, 1e300));
        Ok(NumericRange::new(min, max, resolution))
    }
}

/// Raw values of the legacy range fields, `None` where a field is absent.
#[derive(Clone, Copy, Debug, Default)]
pub struct LegacyRangeFields<'a> {
    pub min_max: Option<&'a str>,
    pub range: Option<&'a str>,
    pub domain_info: Option<&'a str>,
}

fn is_interval(bounds: Option<(f64, f64)>) -> bool {
    matches!(bounds, Some((min, max)) if min < max)
}

fn parse_number(raw: &str, property: &str, object: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| CoverageError::InvalidProperty {
            property: property.to_string(),
            object: object.to_string(),
        })
}

fn parse_pair(raw: &str, property: &str, object: &str) -> Result<Option<(f64, f64)>> {
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() < 2 {
        return Ok(None);
    }
    let min = parse_number(parts[0], property, object)?;
    let max = parse_number(parts[1], property, object)?;
    Ok(Some((min, max)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determine_type() {
        assert_eq!(NumericRange::new(0.0, 255.0, 1.0).determine_type(), ValueType::UINT8);
        assert_eq!(NumericRange::new(-5.0, 100.0, 1.0).determine_type(), ValueType::INT8);
        assert_eq!(NumericRange::new(0.0, 1000.0, 1.0).determine_type(), ValueType::UINT16);
        assert_eq!(NumericRange::new(-1000.0, 1000.0, 1.0).determine_type(), ValueType::INT16);
        assert_eq!(NumericRange::new(0.0, 1e9, 1.0).determine_type(), ValueType::UINT32);
        assert_eq!(NumericRange::new(-1e9, 1e9, 1.0).determine_type(), ValueType::INT32);
        assert_eq!(NumericRange::new(-1e12, 1e12, 1.0).determine_type(), ValueType::DOUBLE);
        assert_eq!(NumericRange::new(0.0, 1.0, 0.0).determine_type(), ValueType::DOUBLE);
        assert_eq!(NumericRange::new(0.0, 1.0, 0.5).determine_type(), ValueType::DOUBLE);
    }

    #[test]
    fn test_value_type_masks() {
        assert!(ValueType::INTEGER.contains(ValueType::UINT16));
        assert!(!ValueType::INTEGER.contains(ValueType::FLOAT));
        assert!(ValueType::NUMBER.contains(ValueType::DOUBLE));
        assert_eq!(ValueType::INT16.pixel_encoding(), Some(PixelEncoding::Int16));
        assert_eq!(ValueType::INT8.pixel_encoding(), Some(PixelEncoding::Int16));
        assert_eq!(ValueType::INTEGER.pixel_encoding(), None);
    }

    #[test]
    fn test_legacy_min_max_wins() {
        let fields = LegacyRangeFields {
            min_max: Some("2:40"),
            range: Some("0:255"),
            domain_info: Some("value.dom;Byte;value;0;-9:9:0.1;offset=0"),
        };
        let range = NumericRange::from_legacy(&fields, "dem").unwrap();
        assert_eq!((range.min, range.max), (2.0, 40.0));
        assert_eq!(range.resolution, 0.0);
    }

    #[test]
    fn test_legacy_domain_step_is_continuous() {
        let fields = LegacyRangeFields {
            min_max: None,
            range: None,
            domain_info: Some("v.dom;Long;value;0;0:100:1;offset=0"),
        };
        let range = NumericRange::from_legacy(&fields, "dem").unwrap();
        assert_eq!(range, NumericRange::new(0.0, 100.0, 0.0));
        assert_eq!(range.determine_type(), ValueType::DOUBLE);

        let fields = LegacyRangeFields {
            min_max: None,
            range: None,
            domain_info: Some("v.dom;Long;value;0;0:100;offset=0"),
        };
        let range = NumericRange::from_legacy(&fields, "dem").unwrap();
        assert_eq!(range.resolution, 1.0);
        assert_eq!(range.determine_type(), ValueType::UINT8);
    }

    #[test]
    fn test_legacy_range_scale_is_not_a_step() {
        let fields = LegacyRangeFields {
            min_max: None,
            range: Some("0:1000:0.5"),
            domain_info: None,
        };
        let range = NumericRange::from_legacy(&fields, "dem").unwrap();
        assert_eq!(range, NumericRange::new(0.0, 1000.0, 1.0));
    }

    #[test]
    fn test_legacy_falls_back_on_degenerate() {
        let fields = LegacyRangeFields {
            min_max: Some("0:0"),
            range: Some("-100:100:offset=100"),
            domain_info: None,
        };
        let range = NumericRange::from_legacy(&fields, "dem").unwrap();
        assert_eq!(range, NumericRange::new(-100.0, 100.0, 1.0));

        let fields = LegacyRangeFields {
            min_max: None,
            range: None,
            domain_info: Some("value.dom;Long;value;0;-9:9:0.5;offset=0"),
        };
        let range = NumericRange::from_legacy(&fields, "dem").unwrap();
        assert_eq!(range, NumericRange::new(-9.0, 9.0, 0.0));
    }

    #[test]
    fn test_legacy_missing_fields() {
        let range = NumericRange::from_legacy(&LegacyRangeFields::default(), "dem").unwrap();
        assert_eq!((range.min, range.max), (-1e300, 1e300));
    }

    #[test]
    fn test_legacy_malformed() {
        let fields = LegacyRangeFields {
            min_max: Some("low:40"),
            ..Default::default()
        };
        let err = NumericRange::from_legacy(&fields, "dem").unwrap_err();
        assert_eq!(err.to_string(), "Invalid property 'MinMax' for 'dem'");
    }
}
