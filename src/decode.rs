//! Decoding dispatch: a located byte range plus the column's wire type tag
//! produce one value through a [`ValueFactory`].
//!
//! The byte range is exactly the column's value. For binary rows the
//! length prefix of variable-width fields has already been consumed while
//! locating the column, so temporal values arrive as 0/4/7/11 (or 0/8/12)
//! byte ranges and are validated against those exact lengths.
use zerocopy::FromBytes;

use crate::column::Field;
use crate::constant::ColumnType;
use crate::error::{Error, Result};
use crate::factory::ValueFactory;
use crate::protocol::value::{Date4, Datetime7, Datetime11, Time8, Time12};
use crate::value::{Date, Time, Timestamp};

fn bad_length(wire_type: &'static str, raw: &[u8]) -> Error {
    Error::DecodeLength {
        wire_type,
        length: raw.len(),
    }
}

/// Decode one binary-protocol column value.
pub fn decode_binary<F: ValueFactory>(field: &Field, raw: &[u8], factory: &F) -> Result<F::Output> {
    let wire = field.column_type.wire_name();
    match field.column_type {
        ColumnType::MYSQL_TYPE_NULL => factory.from_null(),

        // ─── Fixed-width integers ────────────────────────────────────
        ColumnType::MYSQL_TYPE_TINY => {
            if raw.len() != 1 {
                return Err(bad_length(wire, raw));
            }
            if field.is_unsigned() {
                factory.from_i64(i64::from(raw[0]))
            } else {
                factory.from_i64(i64::from(raw[0] as i8))
            }
        }

        ColumnType::MYSQL_TYPE_SHORT | ColumnType::MYSQL_TYPE_YEAR => {
            let v = zerocopy::byteorder::little_endian::U16::read_from_bytes(raw)
                .map_err(|_| bad_length(wire, raw))?
                .get();
            if field.is_unsigned() {
                factory.from_i64(i64::from(v))
            } else {
                factory.from_i64(i64::from(v as i16))
            }
        }

        ColumnType::MYSQL_TYPE_INT24 | ColumnType::MYSQL_TYPE_LONG => {
            let v = zerocopy::byteorder::little_endian::U32::read_from_bytes(raw)
                .map_err(|_| bad_length(wire, raw))?
                .get();
            if field.is_unsigned() {
                factory.from_i64(i64::from(v))
            } else {
                factory.from_i64(i64::from(v as i32))
            }
        }

        ColumnType::MYSQL_TYPE_LONGLONG => {
            let v = zerocopy::byteorder::little_endian::U64::read_from_bytes(raw)
                .map_err(|_| bad_length(wire, raw))?
                .get();
            if field.is_unsigned() {
                route_u64(factory, v)
            } else {
                factory.from_i64(v as i64)
            }
        }

        // ─── IEEE floats, bit-reinterpreted ──────────────────────────
        ColumnType::MYSQL_TYPE_FLOAT => {
            let bits = zerocopy::byteorder::little_endian::U32::read_from_bytes(raw)
                .map_err(|_| bad_length(wire, raw))?
                .get();
            factory.from_f64(f64::from(f32::from_bits(bits)))
        }

        ColumnType::MYSQL_TYPE_DOUBLE => {
            let bits = zerocopy::byteorder::little_endian::U64::read_from_bytes(raw)
                .map_err(|_| bad_length(wire, raw))?
                .get();
            factory.from_f64(f64::from_bits(bits))
        }

        // ─── Packed temporal values ──────────────────────────────────
        ColumnType::MYSQL_TYPE_DATE | ColumnType::MYSQL_TYPE_NEWDATE => match raw.len() {
            0 => factory.from_date(Date::ZERO),
            4 => {
                let d = Date4::ref_from_bytes(raw).map_err(|_| bad_length(wire, raw))?;
                factory.from_date(Date::new(d.year(), d.month, d.day))
            }
            _ => Err(bad_length(wire, raw)),
        },

        ColumnType::MYSQL_TYPE_TIME | ColumnType::MYSQL_TYPE_TIME2 => match raw.len() {
            0 => factory.from_time(Time::ZERO),
            8 => {
                let t = Time8::ref_from_bytes(raw).map_err(|_| bad_length(wire, raw))?;
                factory.from_time(Time::from_wire(
                    t.is_negative(),
                    t.days(),
                    t.hour,
                    t.minute,
                    t.second,
                    0,
                ))
            }
            12 => {
                let t = Time12::ref_from_bytes(raw).map_err(|_| bad_length(wire, raw))?;
                factory.from_time(Time::from_wire(
                    t.is_negative(),
                    t.days(),
                    t.hour,
                    t.minute,
                    t.second,
                    t.microsecond(),
                ))
            }
            _ => Err(bad_length(wire, raw)),
        },

        ColumnType::MYSQL_TYPE_DATETIME
        | ColumnType::MYSQL_TYPE_TIMESTAMP
        | ColumnType::MYSQL_TYPE_DATETIME2
        | ColumnType::MYSQL_TYPE_TIMESTAMP2 => match raw.len() {
            0 => factory.from_timestamp(Timestamp::ZERO),
            4 => {
                let d = Date4::ref_from_bytes(raw).map_err(|_| bad_length(wire, raw))?;
                factory.from_timestamp(Timestamp::from_date(Date::new(d.year(), d.month, d.day)))
            }
            7 => {
                let d = Datetime7::ref_from_bytes(raw).map_err(|_| bad_length(wire, raw))?;
                factory.from_timestamp(Timestamp {
                    year: d.year(),
                    month: d.month,
                    day: d.day,
                    hour: d.hour,
                    minute: d.minute,
                    second: d.second,
                    micros: 0,
                })
            }
            11 => {
                let d = Datetime11::ref_from_bytes(raw).map_err(|_| bad_length(wire, raw))?;
                factory.from_timestamp(Timestamp {
                    year: d.year(),
                    month: d.month,
                    day: d.day,
                    hour: d.hour,
                    minute: d.minute,
                    second: d.second,
                    micros: d.microsecond(),
                })
            }
            _ => Err(bad_length(wire, raw)),
        },

        // ─── Decimal as ASCII ────────────────────────────────────────
        ColumnType::MYSQL_TYPE_DECIMAL | ColumnType::MYSQL_TYPE_NEWDECIMAL => {
            factory.from_decimal(parse_decimal_ascii(raw, factory.target_name())?)
        }

        ColumnType::MYSQL_TYPE_BIT => factory.from_bit(raw),

        // ─── Byte range passthrough ──────────────────────────────────
        ColumnType::MYSQL_TYPE_VARCHAR
        | ColumnType::MYSQL_TYPE_VAR_STRING
        | ColumnType::MYSQL_TYPE_STRING
        | ColumnType::MYSQL_TYPE_BLOB
        | ColumnType::MYSQL_TYPE_TINY_BLOB
        | ColumnType::MYSQL_TYPE_MEDIUM_BLOB
        | ColumnType::MYSQL_TYPE_LONG_BLOB
        | ColumnType::MYSQL_TYPE_GEOMETRY
        | ColumnType::MYSQL_TYPE_JSON
        | ColumnType::MYSQL_TYPE_ENUM
        | ColumnType::MYSQL_TYPE_SET
        | ColumnType::MYSQL_TYPE_TYPED_ARRAY => factory.from_bytes(raw),
    }
}

/// Decode one text-protocol column value: the byte range is the all-ASCII
/// rendition of the value, parsed with the same numeric semantics as the
/// binary decoder.
pub fn decode_text<F: ValueFactory>(field: &Field, raw: &[u8], factory: &F) -> Result<F::Output> {
    let wire = field.column_type.wire_name();
    match field.column_type {
        ColumnType::MYSQL_TYPE_NULL => factory.from_null(),

        ColumnType::MYSQL_TYPE_TINY
        | ColumnType::MYSQL_TYPE_SHORT
        | ColumnType::MYSQL_TYPE_INT24
        | ColumnType::MYSQL_TYPE_LONG
        | ColumnType::MYSQL_TYPE_LONGLONG
        | ColumnType::MYSQL_TYPE_YEAR => {
            let text = ascii(raw, wire, factory.target_name())?;
            if field.is_unsigned() {
                let v: u64 = text
                    .parse()
                    .map_err(|_| Error::conversion(wire, factory.target_name()))?;
                route_u64(factory, v)
            } else {
                let v: i64 = text
                    .parse()
                    .map_err(|_| Error::conversion(wire, factory.target_name()))?;
                factory.from_i64(v)
            }
        }

        ColumnType::MYSQL_TYPE_FLOAT | ColumnType::MYSQL_TYPE_DOUBLE => {
            let text = ascii(raw, wire, factory.target_name())?;
            let v: f64 = text
                .parse()
                .map_err(|_| Error::conversion(wire, factory.target_name()))?;
            factory.from_f64(v)
        }

        ColumnType::MYSQL_TYPE_DECIMAL | ColumnType::MYSQL_TYPE_NEWDECIMAL => {
            factory.from_decimal(parse_decimal_ascii(raw, factory.target_name())?)
        }

        ColumnType::MYSQL_TYPE_DATE | ColumnType::MYSQL_TYPE_NEWDATE => {
            factory.from_date(Date::from_ascii(raw)?)
        }

        ColumnType::MYSQL_TYPE_TIME | ColumnType::MYSQL_TYPE_TIME2 => {
            factory.from_time(Time::from_ascii(raw)?)
        }

        ColumnType::MYSQL_TYPE_DATETIME
        | ColumnType::MYSQL_TYPE_TIMESTAMP
        | ColumnType::MYSQL_TYPE_DATETIME2
        | ColumnType::MYSQL_TYPE_TIMESTAMP2 => factory.from_timestamp(Timestamp::from_ascii(raw)?),

        ColumnType::MYSQL_TYPE_BIT => factory.from_bit(raw),

        ColumnType::MYSQL_TYPE_VARCHAR
        | ColumnType::MYSQL_TYPE_VAR_STRING
        | ColumnType::MYSQL_TYPE_STRING
        | ColumnType::MYSQL_TYPE_BLOB
        | ColumnType::MYSQL_TYPE_TINY_BLOB
        | ColumnType::MYSQL_TYPE_MEDIUM_BLOB
        | ColumnType::MYSQL_TYPE_LONG_BLOB
        | ColumnType::MYSQL_TYPE_GEOMETRY
        | ColumnType::MYSQL_TYPE_JSON
        | ColumnType::MYSQL_TYPE_ENUM
        | ColumnType::MYSQL_TYPE_SET
        | ColumnType::MYSQL_TYPE_TYPED_ARRAY => factory.from_bytes(raw),
    }
}

/// Unsigned values beyond `i64::MAX` must take the wide path so they are
/// never misread as negative.
fn route_u64<F: ValueFactory>(factory: &F, v: u64) -> Result<F::Output> {
    match i64::try_from(v) {
        Ok(signed) => factory.from_i64(signed),
        Err(_) => factory.from_u64(v),
    }
}

fn ascii<'a>(raw: &'a [u8], wire: &'static str, target: &'static str) -> Result<&'a str> {
    simdutf8::basic::from_utf8(raw).map_err(|_| Error::conversion(wire, target))
}

fn parse_decimal_ascii(raw: &[u8], target: &'static str) -> Result<rust_decimal::Decimal> {
    let text = ascii(raw, "DECIMAL", target)?;
    rust_decimal::Decimal::from_str_exact(text).map_err(|_| Error::conversion("DECIMAL", target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant::ColumnFlags;
    use crate::factory::{
        BytesFactory, DateFactory, DecimalFactory, F64Factory, I64Factory, TimeFactory,
        TimestampFactory, U64Factory, ValueDynFactory,
    };
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    fn field(column_type: ColumnType, flags: ColumnFlags) -> Field {
        Field {
            schema: String::new(),
            table: String::new(),
            org_table: String::new(),
            name: "c".to_owned(),
            org_name: "c".to_owned(),
            charset: 255,
            column_length: 255,
            column_type,
            flags,
            decimals: 0,
        }
    }

    #[test]
    fn fixed_width_integers() {
        let f = field(ColumnType::MYSQL_TYPE_TINY, ColumnFlags::empty());
        assert_eq!(decode_binary(&f, &[214], &I64Factory).unwrap(), -42);

        let f = field(ColumnType::MYSQL_TYPE_SHORT, ColumnFlags::empty());
        assert_eq!(
            decode_binary(&f, &(-1000i16).to_le_bytes(), &I64Factory).unwrap(),
            -1000
        );

        let f = field(ColumnType::MYSQL_TYPE_LONG, ColumnFlags::empty());
        assert_eq!(
            decode_binary(&f, &(-100_000i32).to_le_bytes(), &I64Factory).unwrap(),
            -100_000
        );

        let f = field(ColumnType::MYSQL_TYPE_TINY, ColumnFlags::UNSIGNED_FLAG);
        assert_eq!(decode_binary(&f, &[200], &I64Factory).unwrap(), 200);
    }

    #[test]
    fn wrong_length_is_decode_error() {
        let f = field(ColumnType::MYSQL_TYPE_LONG, ColumnFlags::empty());
        assert!(matches!(
            decode_binary(&f, &[1, 2, 3], &I64Factory),
            Err(Error::DecodeLength {
                wire_type: "INT",
                length: 3
            })
        ));

        let f = field(ColumnType::MYSQL_TYPE_DATE, ColumnFlags::empty());
        assert!(matches!(
            decode_binary(&f, &[1, 2, 3], &DateFactory),
            Err(Error::DecodeLength { .. })
        ));

        let f = field(ColumnType::MYSQL_TYPE_TIME, ColumnFlags::empty());
        assert!(matches!(
            decode_binary(&f, &[0; 5], &TimeFactory),
            Err(Error::DecodeLength { .. })
        ));
    }

    #[test]
    fn bigint_round_trip_boundaries() {
        let signed = field(ColumnType::MYSQL_TYPE_LONGLONG, ColumnFlags::empty());
        let unsigned = field(ColumnType::MYSQL_TYPE_LONGLONG, ColumnFlags::UNSIGNED_FLAG);

        assert_eq!(
            decode_binary(&signed, &0i64.to_le_bytes(), &I64Factory).unwrap(),
            0
        );
        assert_eq!(
            decode_binary(&signed, &i64::MAX.to_le_bytes(), &I64Factory).unwrap(),
            i64::MAX
        );
        // 2^64-1 takes the wide unsigned path and stays non-negative.
        assert_eq!(
            decode_binary(&unsigned, &u64::MAX.to_le_bytes(), &U64Factory).unwrap(),
            u64::MAX
        );
        assert_eq!(
            decode_binary(&unsigned, &u64::MAX.to_le_bytes(), &ValueDynFactory).unwrap(),
            Value::UInt(u64::MAX)
        );
        // The same bytes under a signed-only target are out of range, not negative.
        assert!(matches!(
            decode_binary(&unsigned, &u64::MAX.to_le_bytes(), &I64Factory),
            Err(Error::NumberOutOfRange { .. })
        ));
    }

    #[test]
    fn floats_are_bit_reinterpreted() {
        let f = field(ColumnType::MYSQL_TYPE_FLOAT, ColumnFlags::empty());
        let v = decode_binary(&f, &3.5f32.to_le_bytes(), &F64Factory).unwrap();
        assert_eq!(v, 3.5);

        let f = field(ColumnType::MYSQL_TYPE_DOUBLE, ColumnFlags::empty());
        let v = decode_binary(&f, &std::f64::consts::PI.to_le_bytes(), &F64Factory).unwrap();
        assert_eq!(v, std::f64::consts::PI);
    }

    #[test]
    fn zero_length_temporals_are_zero_values() {
        let f = field(ColumnType::MYSQL_TYPE_DATE, ColumnFlags::empty());
        assert_eq!(decode_binary(&f, &[], &DateFactory).unwrap(), Date::ZERO);

        let f = field(ColumnType::MYSQL_TYPE_TIME, ColumnFlags::empty());
        assert_eq!(decode_binary(&f, &[], &TimeFactory).unwrap(), Time::ZERO);

        let f = field(ColumnType::MYSQL_TYPE_DATETIME, ColumnFlags::empty());
        assert_eq!(
            decode_binary(&f, &[], &TimestampFactory).unwrap(),
            Timestamp::ZERO
        );
    }

    #[test]
    fn packed_temporals() {
        let f = field(ColumnType::MYSQL_TYPE_DATE, ColumnFlags::empty());
        let mut raw = 2024u16.to_le_bytes().to_vec();
        raw.extend_from_slice(&[12, 25]);
        assert_eq!(
            decode_binary(&f, &raw, &DateFactory).unwrap(),
            Date::new(2024, 12, 25)
        );

        let f = field(ColumnType::MYSQL_TYPE_DATETIME, ColumnFlags::empty());
        let mut raw = 2024u16.to_le_bytes().to_vec();
        raw.extend_from_slice(&[12, 25, 15, 30, 45]);
        raw.extend_from_slice(&123_456u32.to_le_bytes());
        let ts = decode_binary(&f, &raw, &TimestampFactory).unwrap();
        assert_eq!((ts.hour, ts.minute, ts.second), (15, 30, 45));
        assert_eq!(ts.micros, 123_456);

        // TIME with a day component folds into hours.
        let f = field(ColumnType::MYSQL_TYPE_TIME, ColumnFlags::empty());
        let mut raw = vec![1u8]; // negative
        raw.extend_from_slice(&1u32.to_le_bytes()); // days
        raw.extend_from_slice(&[12, 30, 45]);
        let t = decode_binary(&f, &raw, &TimeFactory).unwrap();
        assert!(t.negative);
        assert_eq!(t.hours, 36);
    }

    #[test]
    fn decimal_is_parsed_exactly() {
        let f = field(ColumnType::MYSQL_TYPE_NEWDECIMAL, ColumnFlags::empty());
        let v = decode_binary(&f, b"123.4500", &DecimalFactory).unwrap();
        assert_eq!(v, rust_decimal::Decimal::from_str_exact("123.4500").unwrap());
        assert!(decode_binary(&f, b"12,5", &DecimalFactory).is_err());
    }

    #[test]
    fn byte_range_passthrough() {
        let f = field(ColumnType::MYSQL_TYPE_VAR_STRING, ColumnFlags::empty());
        assert_eq!(
            decode_binary(&f, b"Hello", &BytesFactory).unwrap(),
            b"Hello".to_vec()
        );
    }

    #[test]
    fn text_protocol_same_semantics() {
        let f = field(ColumnType::MYSQL_TYPE_LONGLONG, ColumnFlags::UNSIGNED_FLAG);
        assert_eq!(
            decode_text(&f, b"18446744073709551615", &U64Factory).unwrap(),
            u64::MAX
        );
        assert_eq!(decode_text(&f, b"12", &I64Factory).unwrap(), 12);

        let f = field(ColumnType::MYSQL_TYPE_LONG, ColumnFlags::empty());
        assert_eq!(decode_text(&f, b"-100000", &I64Factory).unwrap(), -100_000);
        assert!(decode_text(&f, b"twelve", &I64Factory).is_err());

        let f = field(ColumnType::MYSQL_TYPE_DOUBLE, ColumnFlags::empty());
        assert_eq!(decode_text(&f, b"2.5", &F64Factory).unwrap(), 2.5);

        let f = field(ColumnType::MYSQL_TYPE_DATE, ColumnFlags::empty());
        assert_eq!(
            decode_text(&f, b"1997-05-24", &DateFactory).unwrap(),
            Date::new(1997, 5, 24)
        );

        let f = field(ColumnType::MYSQL_TYPE_TIME, ColumnFlags::empty());
        let t = decode_text(&f, b"-838:59:59", &TimeFactory).unwrap();
        assert!(t.negative);
        assert_eq!(t.hours, 838);

        let f = field(ColumnType::MYSQL_TYPE_NEWDECIMAL, ColumnFlags::empty());
        assert_eq!(
            decode_text(&f, b"99.99", &DecimalFactory).unwrap(),
            rust_decimal::Decimal::from_str_exact("99.99").unwrap()
        );
    }

    #[test]
    fn bit_field_numeric_interpretation() {
        let f = field(ColumnType::MYSQL_TYPE_BIT, ColumnFlags::empty());
        assert_eq!(decode_binary(&f, &[0x01, 0x00], &I64Factory).unwrap(), 256);
        assert_eq!(
            decode_binary(&f, &[0x05], &ValueDynFactory).unwrap(),
            Value::Bytes(vec![5])
        );
    }
}
