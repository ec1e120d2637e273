//! Typed view over column chunk statistics
//!
//! Parquet stores chunk bounds in the physical type of the column. This module
//! decodes them into comparable [`StatValue`]s while refusing any encoding
//! whose byte or numeric order does not match the logical order of the column
//! (decimals of any physical type, float16, INT96 timestamps, deprecated
//! byte-array bounds). A refusal means "no information", which keeps the row
//! group.

use std::cmp::Ordering;

use parquet::basic::{ConvertedType, LogicalType, Type as PhysicalType};
use parquet::file::metadata::ColumnChunkMetaData;
use parquet::file::statistics::Statistics;
use parquet::schema::types::ColumnDescriptor;

/// Largest integer magnitude an `f64` represents exactly
const F64_EXACT_INT: i64 = 1 << 53;

/// A decoded statistics bound
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatValue<'a> {
    Boolean(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bytes(&'a [u8]),
}

impl StatValue<'_> {
    /// Compares two bounds of possibly different numeric widths.
    ///
    /// Returns `None` when the values are not comparable or the comparison
    /// would be lossy.
    pub fn compare(&self, other: &StatValue<'_>) -> Option<Ordering> {
        match (*self, *other) {
            (StatValue::Boolean(a), StatValue::Boolean(b)) => Some(a.cmp(&b)),
            (StatValue::Int(a), StatValue::Int(b)) => Some(a.cmp(&b)),
            (StatValue::UInt(a), StatValue::UInt(b)) => Some(a.cmp(&b)),
            (StatValue::Int(a), StatValue::UInt(b)) => Some(if a < 0 {
                Ordering::Less
            } else {
                (a as u64).cmp(&b)
            }),
            (StatValue::UInt(a), StatValue::Int(b)) => Some(if b < 0 {
                Ordering::Greater
            } else {
                a.cmp(&(b as u64))
            }),
            (StatValue::Float(a), StatValue::Float(b)) => a.partial_cmp(&b),
            (StatValue::Float(a), StatValue::Int(b)) => exact_f64(b).and_then(|b| a.partial_cmp(&b)),
            (StatValue::Int(a), StatValue::Float(b)) => exact_f64(a).and_then(|a| a.partial_cmp(&b)),
            (StatValue::Float(a), StatValue::UInt(b)) => {
                i64::try_from(b).ok().and_then(exact_f64).and_then(|b| a.partial_cmp(&b))
            }
            (StatValue::UInt(a), StatValue::Float(b)) => {
                i64::try_from(a).ok().and_then(exact_f64).and_then(|a| a.partial_cmp(&b))
            }
            (StatValue::Bytes(a), StatValue::Bytes(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

fn exact_f64(v: i64) -> Option<f64> {
    (-F64_EXACT_INT..=F64_EXACT_INT).contains(&v).then_some(v as f64)
}

/// Statistics of one column chunk, paired with the column they describe
#[derive(Debug, Clone, Copy)]
pub struct ChunkStatistics<'a> {
    descr: &'a ColumnDescriptor,
    stats: &'a Statistics,
}

impl<'a> ChunkStatistics<'a> {
    pub fn new(descr: &'a ColumnDescriptor, stats: &'a Statistics) -> Self {
        Self { descr, stats }
    }

    /// Returns the chunk's statistics, or `None` if the writer recorded none
    pub fn from_chunk(chunk: &'a ColumnChunkMetaData) -> Option<Self> {
        chunk
            .statistics()
            .map(|stats| Self::new(chunk.column_descr(), stats))
    }

    /// Dotted path of the column these statistics belong to
    pub fn column_name(&self) -> String {
        self.descr.path().string()
    }

    /// Raw parquet statistics
    pub fn raw(&self) -> &'a Statistics {
        self.stats
    }

    /// True only when both a minimum and a maximum were recorded
    pub fn has_min_max(&self) -> bool {
        self.stats.min_bytes_opt().is_some() && self.stats.max_bytes_opt().is_some()
    }

    /// Number of nulls in the chunk, if recorded
    pub fn null_count(&self) -> Option<u64> {
        self.stats.null_count_opt()
    }

    /// Decoded `(min, max)` bounds.
    ///
    /// `None` when either bound is missing or the column's physical encoding
    /// does not sort the same way as its logical values.
    pub fn min_max(&self) -> Option<(StatValue<'a>, StatValue<'a>)> {
        let unsigned = is_unsigned(self.descr);
        match self.stats {
            // Decimal bounds are unscaled and cannot be compared to literals
            Statistics::Int32(_) | Statistics::Int64(_) if is_decimal(self.descr) => None,
            Statistics::Boolean(s) => {
                let (min, max) = (s.min_opt()?, s.max_opt()?);
                Some((StatValue::Boolean(*min), StatValue::Boolean(*max)))
            }
            Statistics::Int32(s) => {
                let (min, max) = (*s.min_opt()?, *s.max_opt()?);
                if unsigned {
                    Some((StatValue::UInt(min as u32 as u64), StatValue::UInt(max as u32 as u64)))
                } else {
                    Some((StatValue::Int(min as i64), StatValue::Int(max as i64)))
                }
            }
            Statistics::Int64(s) => {
                let (min, max) = (*s.min_opt()?, *s.max_opt()?);
                if unsigned {
                    Some((StatValue::UInt(min as u64), StatValue::UInt(max as u64)))
                } else {
                    Some((StatValue::Int(min), StatValue::Int(max)))
                }
            }
            Statistics::Float(s) => {
                let (min, max) = (*s.min_opt()?, *s.max_opt()?);
                float_bounds(min as f64, max as f64)
            }
            Statistics::Double(s) => {
                let (min, max) = (*s.min_opt()?, *s.max_opt()?);
                float_bounds(min, max)
            }
            Statistics::ByteArray(s) => {
                if !self.bytewise_ordered() {
                    return None;
                }
                let (min, max) = (s.min_opt()?, s.max_opt()?);
                Some((StatValue::Bytes(min.data()), StatValue::Bytes(max.data())))
            }
            Statistics::FixedLenByteArray(s) => {
                if !self.bytewise_ordered() {
                    return None;
                }
                let (min, max) = (s.min_opt()?, s.max_opt()?);
                Some((StatValue::Bytes(min.data()), StatValue::Bytes(max.data())))
            }
            // INT96 bounds are not ordered by value
            Statistics::Int96(_) => None,
        }
    }

    fn bytewise_ordered(&self) -> bool {
        if self.stats.is_min_max_deprecated() {
            return false;
        }
        match self.descr.logical_type() {
            Some(LogicalType::String)
            | Some(LogicalType::Enum)
            | Some(LogicalType::Json)
            | Some(LogicalType::Bson) => true,
            Some(_) => false,
            None => matches!(
                self.descr.converted_type(),
                ConvertedType::NONE
                    | ConvertedType::UTF8
                    | ConvertedType::ENUM
                    | ConvertedType::JSON
                    | ConvertedType::BSON
            ),
        }
    }
}

fn float_bounds<'a>(min: f64, max: f64) -> Option<(StatValue<'a>, StatValue<'a>)> {
    if min.is_nan() || max.is_nan() {
        return None;
    }
    Some((StatValue::Float(min), StatValue::Float(max)))
}

fn is_decimal(descr: &ColumnDescriptor) -> bool {
    matches!(descr.logical_type(), Some(LogicalType::Decimal { .. }))
        || descr.converted_type() == ConvertedType::DECIMAL
}

fn is_unsigned(descr: &ColumnDescriptor) -> bool {
    if !matches!(
        descr.physical_type(),
        PhysicalType::INT32 | PhysicalType::INT64
    ) {
        return false;
    }
    match descr.logical_type() {
        Some(LogicalType::Integer { is_signed, .. }) => !is_signed,
        _ => matches!(
            descr.converted_type(),
            ConvertedType::UINT_8
                | ConvertedType::UINT_16
                | ConvertedType::UINT_32
                | ConvertedType::UINT_64
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parquet::data_type::{ByteArray, FixedLenByteArray};
    use parquet::schema::types::{ColumnPath, Type};
    use std::sync::Arc;

    fn descr(physical: PhysicalType, logical: Option<LogicalType>) -> ColumnDescriptor {
        let mut builder = Type::primitive_type_builder("col", physical).with_logical_type(logical);
        if physical == PhysicalType::FIXED_LEN_BYTE_ARRAY {
            builder = builder.with_length(16).with_precision(10).with_scale(2);
        }
        let tp = Arc::new(builder.build().unwrap());
        ColumnDescriptor::new(tp, 0, 0, ColumnPath::new(vec!["col".to_string()]))
    }

    #[test]
    fn test_has_min_max() {
        let d = descr(PhysicalType::INT64, None);

        let full = Statistics::int64(Some(1), Some(5), None, Some(0), false);
        assert!(ChunkStatistics::new(&d, &full).has_min_max());

        let min_only = Statistics::int64(Some(1), None, None, Some(0), false);
        assert!(!ChunkStatistics::new(&d, &min_only).has_min_max());
        assert!(ChunkStatistics::new(&d, &min_only).min_max().is_none());

        let max_only = Statistics::int64(None, Some(5), None, Some(0), false);
        assert!(!ChunkStatistics::new(&d, &max_only).has_min_max());
    }

    #[test]
    fn test_int32_widens_to_int() {
        let d = descr(PhysicalType::INT32, None);
        let stats = Statistics::int32(Some(-3), Some(7), None, Some(2), false);
        let chunk = ChunkStatistics::new(&d, &stats);
        assert_eq!(chunk.min_max(), Some((StatValue::Int(-3), StatValue::Int(7))));
        assert_eq!(chunk.null_count(), Some(2));
    }

    #[test]
    fn test_unsigned_annotation() {
        let d = descr(
            PhysicalType::INT32,
            Some(LogicalType::Integer {
                bit_width: 32,
                is_signed: false,
            }),
        );
        // u32::MAX is stored as -1
        let stats = Statistics::int32(Some(1), Some(-1), None, None, false);
        let chunk = ChunkStatistics::new(&d, &stats);
        assert_eq!(
            chunk.min_max(),
            Some((StatValue::UInt(1), StatValue::UInt(u32::MAX as u64)))
        );
    }

    #[test]
    fn test_string_bounds() {
        let d = descr(PhysicalType::BYTE_ARRAY, Some(LogicalType::String));
        let stats = Statistics::byte_array(
            Some(ByteArray::from("apple")),
            Some(ByteArray::from("pear")),
            None,
            Some(0),
            false,
        );
        let chunk = ChunkStatistics::new(&d, &stats);
        assert_eq!(
            chunk.min_max(),
            Some((StatValue::Bytes(b"apple"), StatValue::Bytes(b"pear")))
        );
    }

    #[test]
    fn test_decimal_bytes_are_not_trusted() {
        let d = descr(
            PhysicalType::FIXED_LEN_BYTE_ARRAY,
            Some(LogicalType::Decimal {
                scale: 2,
                precision: 10,
            }),
        );
        let stats = Statistics::fixed_len_byte_array(
            Some(FixedLenByteArray::from(ByteArray::from(vec![0u8; 16]))),
            Some(FixedLenByteArray::from(ByteArray::from(vec![1u8; 16]))),
            None,
            Some(0),
            false,
        );
        let chunk = ChunkStatistics::new(&d, &stats);
        assert!(chunk.has_min_max());
        assert!(chunk.min_max().is_none());
    }

    fn decimal_descr(physical: PhysicalType, precision: i32) -> ColumnDescriptor {
        let tp = Type::primitive_type_builder("price", physical)
            .with_logical_type(Some(LogicalType::Decimal {
                scale: 2,
                precision,
            }))
            .with_precision(precision)
            .with_scale(2)
            .build()
            .unwrap();
        ColumnDescriptor::new(Arc::new(tp), 0, 0, ColumnPath::new(vec!["price".to_string()]))
    }

    #[test]
    fn test_int_backed_decimals_are_not_trusted() {
        // 5.00 as decimal(5,2) is stored unscaled as 500
        let d = decimal_descr(PhysicalType::INT32, 5);
        let stats = Statistics::int32(Some(500), Some(500), None, Some(0), false);
        let chunk = ChunkStatistics::new(&d, &stats);
        assert!(chunk.has_min_max());
        assert!(chunk.min_max().is_none());

        let d = decimal_descr(PhysicalType::INT64, 12);
        let stats = Statistics::int64(Some(-100), Some(100), None, Some(0), false);
        assert!(ChunkStatistics::new(&d, &stats).min_max().is_none());
    }

    #[test]
    fn test_legacy_decimal_annotation_is_not_trusted() {
        let tp = Type::primitive_type_builder("price", PhysicalType::INT64)
            .with_converted_type(ConvertedType::DECIMAL)
            .with_precision(12)
            .with_scale(2)
            .build()
            .unwrap();
        let d = ColumnDescriptor::new(Arc::new(tp), 0, 0, ColumnPath::new(vec!["price".to_string()]));
        let stats = Statistics::int64(Some(500), Some(500), None, Some(0), false);
        assert!(ChunkStatistics::new(&d, &stats).min_max().is_none());
    }

    #[test]
    fn test_signed_zero_bounds() {
        let d = descr(PhysicalType::DOUBLE, None);
        let stats = Statistics::double(Some(-0.0), Some(0.0), None, Some(0), false);
        let (min, max) = ChunkStatistics::new(&d, &stats).min_max().unwrap();
        // Both zeros compare equal to either literal zero
        assert_eq!(StatValue::Float(0.0).compare(&min), Some(Ordering::Equal));
        assert_eq!(StatValue::Float(-0.0).compare(&max), Some(Ordering::Equal));
    }

    #[test]
    fn test_nan_bounds_are_not_trusted() {
        let d = descr(PhysicalType::DOUBLE, None);
        let stats = Statistics::double(Some(f64::NAN), Some(1.0), None, None, false);
        assert!(ChunkStatistics::new(&d, &stats).min_max().is_none());
    }

    #[test]
    fn test_compare_mixed_numeric() {
        assert_eq!(
            StatValue::Int(-1).compare(&StatValue::UInt(0)),
            Some(Ordering::Less)
        );
        assert_eq!(
            StatValue::UInt(u64::MAX).compare(&StatValue::Int(i64::MAX)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            StatValue::Float(2.5).compare(&StatValue::Int(2)),
            Some(Ordering::Greater)
        );
        // Lossy conversions refuse to answer
        assert_eq!(StatValue::Float(1.0).compare(&StatValue::Int(i64::MAX)), None);
        assert_eq!(StatValue::Bytes(b"a").compare(&StatValue::Int(1)), None);
    }
}
