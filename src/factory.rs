//! Value factories turn decoded wire primitives into application values.
//!
//! A factory produces exactly one output type and implements one creation
//! method per wire category; combinations it has no meaningful conversion
//! for fall through to the default methods, which report the unsupported
//! conversion. Decorators wrap another factory of the same output type to
//! tighten validation or widen the accepted inputs.
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

use crate::error::{Error, Result};
use crate::opts::ResultOpts;
use crate::value::{Date, Time, Timestamp, Value};

/// Interpret a BIT column's raw bytes as an unsigned big-endian integer,
/// as if left-padded with zero bytes to the full width. MySQL caps BIT at
/// 64 bits; anything wider is malformed.
pub fn bit_to_u64(bits: &[u8]) -> Result<u64> {
    if bits.len() > 8 {
        return Err(Error::DecodeLength {
            wire_type: "BIT",
            length: bits.len(),
        });
    }
    let mut out = 0u64;
    for &b in bits {
        out = (out << 8) | u64::from(b);
    }
    Ok(out)
}

/// Produces one application value type from decoded wire primitives.
///
/// Unsigned integers that exceed `i64::MAX` arrive through [`from_u64`];
/// everything smaller takes [`from_i64`]. BIT columns arrive through
/// [`from_bit`], whose default numeric interpretation is a big-endian
/// unsigned integer.
///
/// [`from_u64`]: ValueFactory::from_u64
/// [`from_i64`]: ValueFactory::from_i64
/// [`from_bit`]: ValueFactory::from_bit
pub trait ValueFactory {
    type Output;

    /// Output type name, used in conversion error messages.
    fn target_name(&self) -> &'static str;

    fn from_null(&self) -> Result<Self::Output> {
        Err(Error::conversion("NULL", self.target_name()))
    }

    fn from_i64(&self, _v: i64) -> Result<Self::Output> {
        Err(Error::conversion("BIGINT", self.target_name()))
    }

    fn from_u64(&self, _v: u64) -> Result<Self::Output> {
        Err(Error::conversion("BIGINT UNSIGNED", self.target_name()))
    }

    fn from_f64(&self, _v: f64) -> Result<Self::Output> {
        Err(Error::conversion("DOUBLE", self.target_name()))
    }

    fn from_decimal(&self, _v: Decimal) -> Result<Self::Output> {
        Err(Error::conversion("DECIMAL", self.target_name()))
    }

    fn from_date(&self, _v: Date) -> Result<Self::Output> {
        Err(Error::conversion("DATE", self.target_name()))
    }

    fn from_time(&self, _v: Time) -> Result<Self::Output> {
        Err(Error::conversion("TIME", self.target_name()))
    }

    fn from_timestamp(&self, _v: Timestamp) -> Result<Self::Output> {
        Err(Error::conversion("TIMESTAMP", self.target_name()))
    }

    fn from_bytes(&self, _v: &[u8]) -> Result<Self::Output> {
        Err(Error::conversion("BYTES", self.target_name()))
    }

    fn from_bit(&self, v: &[u8]) -> Result<Self::Output> {
        self.from_u64(bit_to_u64(v)?)
    }
}

// ============================================================================
// Base factories
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct I64Factory;

impl ValueFactory for I64Factory {
    type Output = i64;

    fn target_name(&self) -> &'static str {
        "i64"
    }

    fn from_i64(&self, v: i64) -> Result<i64> {
        Ok(v)
    }

    fn from_u64(&self, v: u64) -> Result<i64> {
        i64::try_from(v).map_err(|_| Error::out_of_range(v, self.target_name()))
    }

    fn from_f64(&self, v: f64) -> Result<i64> {
        if v.is_finite() && (i64::MIN as f64..=i64::MAX as f64).contains(&v) {
            Ok(v as i64)
        } else {
            Err(Error::out_of_range(v, self.target_name()))
        }
    }

    fn from_decimal(&self, v: Decimal) -> Result<i64> {
        v.trunc()
            .to_i64()
            .ok_or_else(|| Error::out_of_range(v, self.target_name()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct U64Factory;

impl ValueFactory for U64Factory {
    type Output = u64;

    fn target_name(&self) -> &'static str {
        "u64"
    }

    fn from_i64(&self, v: i64) -> Result<u64> {
        u64::try_from(v).map_err(|_| Error::out_of_range(v, self.target_name()))
    }

    fn from_u64(&self, v: u64) -> Result<u64> {
        Ok(v)
    }

    fn from_f64(&self, v: f64) -> Result<u64> {
        if v.is_finite() && (0.0..=u64::MAX as f64).contains(&v) {
            Ok(v as u64)
        } else {
            Err(Error::out_of_range(v, self.target_name()))
        }
    }

    fn from_decimal(&self, v: Decimal) -> Result<u64> {
        v.trunc()
            .to_u64()
            .ok_or_else(|| Error::out_of_range(v, self.target_name()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct F64Factory;

impl ValueFactory for F64Factory {
    type Output = f64;

    fn target_name(&self) -> &'static str {
        "f64"
    }

    fn from_i64(&self, v: i64) -> Result<f64> {
        Ok(v as f64)
    }

    fn from_u64(&self, v: u64) -> Result<f64> {
        Ok(v as f64)
    }

    fn from_f64(&self, v: f64) -> Result<f64> {
        Ok(v)
    }

    fn from_decimal(&self, v: Decimal) -> Result<f64> {
        v.to_f64()
            .ok_or_else(|| Error::conversion("DECIMAL", self.target_name()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoolFactory;

impl ValueFactory for BoolFactory {
    type Output = bool;

    fn target_name(&self) -> &'static str {
        "bool"
    }

    fn from_i64(&self, v: i64) -> Result<bool> {
        Ok(v != 0)
    }

    fn from_u64(&self, v: u64) -> Result<bool> {
        Ok(v != 0)
    }

    fn from_f64(&self, v: f64) -> Result<bool> {
        Ok(v != 0.0)
    }

    fn from_decimal(&self, v: Decimal) -> Result<bool> {
        Ok(!v.is_zero())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DecimalFactory;

impl ValueFactory for DecimalFactory {
    type Output = Decimal;

    fn target_name(&self) -> &'static str {
        "Decimal"
    }

    fn from_i64(&self, v: i64) -> Result<Decimal> {
        Ok(Decimal::from(v))
    }

    fn from_u64(&self, v: u64) -> Result<Decimal> {
        Ok(Decimal::from(v))
    }

    fn from_f64(&self, v: f64) -> Result<Decimal> {
        Decimal::from_f64(v).ok_or_else(|| Error::conversion("DOUBLE", self.target_name()))
    }

    fn from_decimal(&self, v: Decimal) -> Result<Decimal> {
        Ok(v)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StringFactory;

impl ValueFactory for StringFactory {
    type Output = String;

    fn target_name(&self) -> &'static str {
        "String"
    }

    fn from_i64(&self, v: i64) -> Result<String> {
        Ok(v.to_string())
    }

    fn from_u64(&self, v: u64) -> Result<String> {
        Ok(v.to_string())
    }

    fn from_f64(&self, v: f64) -> Result<String> {
        Ok(v.to_string())
    }

    fn from_decimal(&self, v: Decimal) -> Result<String> {
        Ok(v.to_string())
    }

    fn from_date(&self, v: Date) -> Result<String> {
        Ok(v.to_string())
    }

    fn from_time(&self, v: Time) -> Result<String> {
        Ok(v.to_string())
    }

    fn from_timestamp(&self, v: Timestamp) -> Result<String> {
        Ok(v.to_string())
    }

    fn from_bytes(&self, v: &[u8]) -> Result<String> {
        simdutf8::basic::from_utf8(v)
            .map(str::to_owned)
            .map_err(|_| Error::conversion("BYTES", self.target_name()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BytesFactory;

impl ValueFactory for BytesFactory {
    type Output = Vec<u8>;

    fn target_name(&self) -> &'static str {
        "Vec<u8>"
    }

    fn from_bytes(&self, v: &[u8]) -> Result<Vec<u8>> {
        Ok(v.to_vec())
    }

    fn from_bit(&self, v: &[u8]) -> Result<Vec<u8>> {
        Ok(v.to_vec())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DateFactory;

impl ValueFactory for DateFactory {
    type Output = Date;

    fn target_name(&self) -> &'static str {
        "Date"
    }

    fn from_date(&self, v: Date) -> Result<Date> {
        Ok(v)
    }

    fn from_timestamp(&self, v: Timestamp) -> Result<Date> {
        Ok(v.date())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TimeFactory;

impl ValueFactory for TimeFactory {
    type Output = Time;

    fn target_name(&self) -> &'static str {
        "Time"
    }

    fn from_time(&self, v: Time) -> Result<Time> {
        Ok(v)
    }

    fn from_timestamp(&self, v: Timestamp) -> Result<Time> {
        Ok(v.time())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampFactory;

impl ValueFactory for TimestampFactory {
    type Output = Timestamp;

    fn target_name(&self) -> &'static str {
        "Timestamp"
    }

    fn from_date(&self, v: Date) -> Result<Timestamp> {
        Ok(Timestamp::from_date(v))
    }

    fn from_timestamp(&self, v: Timestamp) -> Result<Timestamp> {
        Ok(v)
    }
}

/// Produces the dynamically typed [`Value`] for untyped access.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueDynFactory;

impl ValueFactory for ValueDynFactory {
    type Output = Value;

    fn target_name(&self) -> &'static str {
        "Value"
    }

    fn from_null(&self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn from_i64(&self, v: i64) -> Result<Value> {
        Ok(Value::Int(v))
    }

    fn from_u64(&self, v: u64) -> Result<Value> {
        Ok(Value::UInt(v))
    }

    fn from_f64(&self, v: f64) -> Result<Value> {
        Ok(Value::Double(v))
    }

    fn from_decimal(&self, v: Decimal) -> Result<Value> {
        Ok(Value::Decimal(v))
    }

    fn from_date(&self, v: Date) -> Result<Value> {
        Ok(Value::Date(v))
    }

    fn from_time(&self, v: Time) -> Result<Value> {
        Ok(Value::Time(v))
    }

    fn from_timestamp(&self, v: Timestamp) -> Result<Value> {
        Ok(Value::Timestamp(v))
    }

    fn from_bytes(&self, v: &[u8]) -> Result<Value> {
        Ok(Value::Bytes(v.to_vec()))
    }

    fn from_bit(&self, v: &[u8]) -> Result<Value> {
        Ok(Value::Bytes(v.to_vec()))
    }
}

/// Adapts a factory to a nullable column: NULL becomes `None`, everything
/// else is delegated and wrapped in `Some`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Nullable<F> {
    inner: F,
}

impl<F> Nullable<F> {
    pub fn new(inner: F) -> Self {
        Self { inner }
    }
}

impl<F: ValueFactory> ValueFactory for Nullable<F> {
    type Output = Option<F::Output>;

    fn target_name(&self) -> &'static str {
        self.inner.target_name()
    }

    fn from_null(&self) -> Result<Self::Output> {
        Ok(None)
    }

    fn from_i64(&self, v: i64) -> Result<Self::Output> {
        self.inner.from_i64(v).map(Some)
    }

    fn from_u64(&self, v: u64) -> Result<Self::Output> {
        self.inner.from_u64(v).map(Some)
    }

    fn from_f64(&self, v: f64) -> Result<Self::Output> {
        self.inner.from_f64(v).map(Some)
    }

    fn from_decimal(&self, v: Decimal) -> Result<Self::Output> {
        self.inner.from_decimal(v).map(Some)
    }

    fn from_date(&self, v: Date) -> Result<Self::Output> {
        self.inner.from_date(v).map(Some)
    }

    fn from_time(&self, v: Time) -> Result<Self::Output> {
        self.inner.from_time(v).map(Some)
    }

    fn from_timestamp(&self, v: Timestamp) -> Result<Self::Output> {
        self.inner.from_timestamp(v).map(Some)
    }

    fn from_bytes(&self, v: &[u8]) -> Result<Self::Output> {
        self.inner.from_bytes(v).map(Some)
    }

    fn from_bit(&self, v: &[u8]) -> Result<Self::Output> {
        self.inner.from_bit(v).map(Some)
    }
}

// ============================================================================
// Decorators
// ============================================================================

/// Rejects numeric inputs outside `[min, max]` before delegating.
#[derive(Debug, Clone)]
pub struct RangeGuard<F> {
    inner: F,
    min: i64,
    max: i64,
}

impl<F> RangeGuard<F> {
    pub fn new(inner: F, min: i64, max: i64) -> Self {
        Self { inner, min, max }
    }
}

impl<F: ValueFactory> ValueFactory for RangeGuard<F> {
    type Output = F::Output;

    fn target_name(&self) -> &'static str {
        self.inner.target_name()
    }

    fn from_null(&self) -> Result<Self::Output> {
        self.inner.from_null()
    }

    fn from_i64(&self, v: i64) -> Result<Self::Output> {
        if (self.min..=self.max).contains(&v) {
            self.inner.from_i64(v)
        } else {
            Err(Error::out_of_range(v, self.target_name()))
        }
    }

    fn from_u64(&self, v: u64) -> Result<Self::Output> {
        match i64::try_from(v) {
            Ok(signed) if (self.min..=self.max).contains(&signed) => self.inner.from_u64(v),
            _ => Err(Error::out_of_range(v, self.target_name())),
        }
    }

    fn from_f64(&self, v: f64) -> Result<Self::Output> {
        if v >= self.min as f64 && v <= self.max as f64 {
            self.inner.from_f64(v)
        } else {
            Err(Error::out_of_range(v, self.target_name()))
        }
    }

    fn from_decimal(&self, v: Decimal) -> Result<Self::Output> {
        if v >= Decimal::from(self.min) && v <= Decimal::from(self.max) {
            self.inner.from_decimal(v)
        } else {
            Err(Error::out_of_range(v, self.target_name()))
        }
    }

    fn from_date(&self, v: Date) -> Result<Self::Output> {
        self.inner.from_date(v)
    }

    fn from_time(&self, v: Time) -> Result<Self::Output> {
        self.inner.from_time(v)
    }

    fn from_timestamp(&self, v: Timestamp) -> Result<Self::Output> {
        self.inner.from_timestamp(v)
    }

    fn from_bytes(&self, v: &[u8]) -> Result<Self::Output> {
        self.inner.from_bytes(v)
    }
}

/// Replaces the all-zero date sentinel ("0000-00-00") with the minimum
/// representable date before delegating.
#[derive(Debug, Clone)]
pub struct ZeroDateToDefault<F> {
    inner: F,
}

impl<F> ZeroDateToDefault<F> {
    pub fn new(inner: F) -> Self {
        Self { inner }
    }
}

impl<F: ValueFactory> ValueFactory for ZeroDateToDefault<F> {
    type Output = F::Output;

    fn target_name(&self) -> &'static str {
        self.inner.target_name()
    }

    fn from_null(&self) -> Result<Self::Output> {
        self.inner.from_null()
    }

    fn from_i64(&self, v: i64) -> Result<Self::Output> {
        self.inner.from_i64(v)
    }

    fn from_u64(&self, v: u64) -> Result<Self::Output> {
        self.inner.from_u64(v)
    }

    fn from_f64(&self, v: f64) -> Result<Self::Output> {
        self.inner.from_f64(v)
    }

    fn from_decimal(&self, v: Decimal) -> Result<Self::Output> {
        self.inner.from_decimal(v)
    }

    fn from_date(&self, v: Date) -> Result<Self::Output> {
        if v.is_zero() {
            self.inner.from_date(Date::FIRST)
        } else {
            self.inner.from_date(v)
        }
    }

    fn from_time(&self, v: Time) -> Result<Self::Output> {
        self.inner.from_time(v)
    }

    fn from_timestamp(&self, v: Timestamp) -> Result<Self::Output> {
        if v.is_zero() {
            self.inner.from_timestamp(Timestamp::FIRST)
        } else {
            self.inner.from_timestamp(v)
        }
    }

    fn from_bytes(&self, v: &[u8]) -> Result<Self::Output> {
        self.inner.from_bytes(v)
    }

    fn from_bit(&self, v: &[u8]) -> Result<Self::Output> {
        self.inner.from_bit(v)
    }
}

/// Interprets raw text by structural inspection and re-dispatches to the
/// matching creation method of the inner factory.
///
/// Recognized shapes: boolean literals, integers, floating point numbers,
/// `YYYY-MM-DD`, `HH:MM:SS[.ffffff]`, and `YYYY-MM-DD HH:MM:SS[.ffffff]`.
/// Anything else fails as an unsupported conversion, except the empty string
/// when `empty_string_is_zero` is set.
#[derive(Debug, Clone)]
pub struct TextInference<F> {
    inner: F,
    empty_string_is_zero: bool,
}

impl<F> TextInference<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            empty_string_is_zero: false,
        }
    }

    /// Text inference configured from result options.
    pub fn from_opts(inner: F, opts: &ResultOpts) -> Self {
        Self {
            inner,
            empty_string_is_zero: opts.empty_string_is_zero,
        }
    }

    pub fn empty_string_is_zero(mut self, enabled: bool) -> Self {
        self.empty_string_is_zero = enabled;
        self
    }
}

fn looks_like_date(t: &[u8]) -> bool {
    t.len() == 10 && t[4] == b'-' && t[7] == b'-'
}

fn looks_like_time(t: &[u8]) -> bool {
    (8..=17).contains(&t.len()) && t[2] == b':' && t[5] == b':'
}

fn looks_like_timestamp(t: &[u8]) -> bool {
    (19..=26).contains(&t.len())
        && t[4] == b'-'
        && t[7] == b'-'
        && t[10] == b' '
        && t[13] == b':'
        && t[16] == b':'
}

fn looks_like_int(t: &[u8]) -> bool {
    let digits = match t.first() {
        Some(b'-' | b'+') => &t[1..],
        _ => t,
    };
    !digits.is_empty() && digits.iter().all(u8::is_ascii_digit)
}

fn looks_like_float(t: &[u8]) -> bool {
    !t.is_empty()
        && t.iter()
            .all(|b| b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.' | b'e' | b'E'))
        && t.iter().any(|b| matches!(b, b'.' | b'e' | b'E'))
}

impl<F: ValueFactory> ValueFactory for TextInference<F> {
    type Output = F::Output;

    fn target_name(&self) -> &'static str {
        self.inner.target_name()
    }

    fn from_null(&self) -> Result<Self::Output> {
        self.inner.from_null()
    }

    fn from_i64(&self, v: i64) -> Result<Self::Output> {
        self.inner.from_i64(v)
    }

    fn from_u64(&self, v: u64) -> Result<Self::Output> {
        self.inner.from_u64(v)
    }

    fn from_f64(&self, v: f64) -> Result<Self::Output> {
        self.inner.from_f64(v)
    }

    fn from_decimal(&self, v: Decimal) -> Result<Self::Output> {
        self.inner.from_decimal(v)
    }

    fn from_date(&self, v: Date) -> Result<Self::Output> {
        self.inner.from_date(v)
    }

    fn from_time(&self, v: Time) -> Result<Self::Output> {
        self.inner.from_time(v)
    }

    fn from_timestamp(&self, v: Timestamp) -> Result<Self::Output> {
        self.inner.from_timestamp(v)
    }

    fn from_bytes(&self, v: &[u8]) -> Result<Self::Output> {
        let unsupported = || Error::conversion("CHAR", self.inner.target_name());
        let text = simdutf8::basic::from_utf8(v).map_err(|_| unsupported())?;
        let bytes = text.as_bytes();

        if bytes.is_empty() {
            return if self.empty_string_is_zero {
                self.inner.from_i64(0)
            } else {
                Err(unsupported())
            };
        }
        if text.eq_ignore_ascii_case("true") {
            return self.inner.from_i64(1);
        }
        if text.eq_ignore_ascii_case("false") {
            return self.inner.from_i64(0);
        }
        if looks_like_date(bytes) {
            return self.inner.from_date(Date::from_ascii(bytes)?);
        }
        if looks_like_timestamp(bytes) {
            return self.inner.from_timestamp(Timestamp::from_ascii(bytes)?);
        }
        if looks_like_time(bytes) {
            return self.inner.from_time(Time::from_ascii(bytes)?);
        }
        if looks_like_int(bytes) {
            if let Ok(v) = text.parse::<i64>() {
                return self.inner.from_i64(v);
            }
            if let Ok(v) = text.parse::<u64>() {
                return self.inner.from_u64(v);
            }
            return Err(unsupported());
        }
        if looks_like_float(bytes) {
            let v: f64 = text.parse().map_err(|_| unsupported())?;
            return self.inner.from_f64(v);
        }
        Err(unsupported())
    }

    fn from_bit(&self, v: &[u8]) -> Result<Self::Output> {
        self.inner.from_bit(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unsupported_conversion_names_source_and_target() {
        let err = DateFactory.from_i64(5).unwrap_err();
        assert_eq!(err.to_string(), "unsupported conversion: BIGINT -> Date");
    }

    #[test]
    fn i64_factory_widens_and_rejects() {
        assert_eq!(I64Factory.from_u64(42).unwrap(), 42);
        assert!(matches!(
            I64Factory.from_u64(u64::MAX),
            Err(Error::NumberOutOfRange { .. })
        ));
        assert_eq!(I64Factory.from_f64(-3.9).unwrap(), -3);
        assert_eq!(
            I64Factory
                .from_decimal(Decimal::from_str_exact("12.7").unwrap())
                .unwrap(),
            12
        );
    }

    #[test]
    fn u64_factory_accepts_full_range() {
        assert_eq!(U64Factory.from_u64(u64::MAX).unwrap(), u64::MAX);
        assert!(matches!(
            U64Factory.from_i64(-1),
            Err(Error::NumberOutOfRange { .. })
        ));
    }

    #[test]
    fn bit_bytes_as_big_endian_integer() {
        assert_eq!(bit_to_u64(&[0x05]).unwrap(), 5);
        assert_eq!(bit_to_u64(&[0x01, 0x00]).unwrap(), 256);
        assert_eq!(bit_to_u64(&[]).unwrap(), 0);
        assert!(matches!(
            bit_to_u64(&[0; 9]),
            Err(Error::DecodeLength { .. })
        ));
        // Default numeric interpretation reaches from_u64.
        assert_eq!(I64Factory.from_bit(&[0x02, 0x01]).unwrap(), 513);
        // Byte-oriented factories take the raw range.
        assert_eq!(BytesFactory.from_bit(&[0x02, 0x01]).unwrap(), vec![2, 1]);
    }

    #[test]
    fn string_factory_formats() {
        assert_eq!(StringFactory.from_i64(-7).unwrap(), "-7");
        assert_eq!(
            StringFactory.from_date(Date::new(1997, 5, 24)).unwrap(),
            "1997-05-24"
        );
        assert!(StringFactory.from_bytes(&[0xFF, 0xFE]).is_err());
    }

    #[test]
    fn nullable_wraps() {
        let factory = Nullable::new(I64Factory);
        assert_eq!(factory.from_null().unwrap(), None);
        assert_eq!(factory.from_i64(9).unwrap(), Some(9));
    }

    #[test]
    fn range_guard_enforces_bounds() {
        let factory = RangeGuard::new(I64Factory, -128, 127);
        assert_eq!(factory.from_i64(127).unwrap(), 127);
        assert_eq!(factory.from_i64(-128).unwrap(), -128);
        assert!(matches!(
            factory.from_i64(200),
            Err(Error::NumberOutOfRange { .. })
        ));
        assert!(matches!(
            factory.from_u64(200),
            Err(Error::NumberOutOfRange { .. })
        ));
        assert!(matches!(
            factory.from_f64(127.5),
            Err(Error::NumberOutOfRange { .. })
        ));
        assert_eq!(factory.from_f64(-12.0).unwrap(), -12);
        assert!(matches!(
            factory.from_decimal(Decimal::from(128)),
            Err(Error::NumberOutOfRange { .. })
        ));
    }

    #[test]
    fn zero_date_normalizes_to_first() {
        let factory = ZeroDateToDefault::new(DateFactory);
        assert_eq!(factory.from_date(Date::ZERO).unwrap(), Date::FIRST);
        assert_eq!(
            factory.from_date(Date::new(2024, 12, 25)).unwrap(),
            Date::new(2024, 12, 25)
        );

        let factory = ZeroDateToDefault::new(TimestampFactory);
        assert_eq!(
            factory.from_timestamp(Timestamp::ZERO).unwrap(),
            Timestamp::FIRST
        );
    }

    #[test]
    fn text_inference_classifies_time_and_timestamp() {
        let time = TextInference::new(TimeFactory)
            .from_bytes(b"12:30:45")
            .unwrap();
        assert_eq!((time.hours, time.minutes, time.seconds), (12, 30, 45));

        let ts = TextInference::new(TimestampFactory)
            .from_bytes(b"1997-05-24 10:30:29.123")
            .unwrap();
        assert_eq!(ts.micros, 123_000);
    }

    #[test]
    fn text_inference_numbers_and_booleans() {
        let factory = TextInference::new(I64Factory);
        assert_eq!(factory.from_bytes(b"42").unwrap(), 42);
        assert_eq!(factory.from_bytes(b"-7").unwrap(), -7);
        assert_eq!(factory.from_bytes(b"TRUE").unwrap(), 1);
        assert_eq!(factory.from_bytes(b"false").unwrap(), 0);

        let factory = TextInference::new(U64Factory);
        assert_eq!(
            factory.from_bytes(b"18446744073709551615").unwrap(),
            u64::MAX
        );

        let factory = TextInference::new(F64Factory);
        assert_eq!(factory.from_bytes(b"2.5").unwrap(), 2.5);
        assert_eq!(factory.from_bytes(b"1e3").unwrap(), 1000.0);
    }

    #[test]
    fn text_inference_rejects_garbage() {
        let factory = TextInference::new(I64Factory);
        assert!(matches!(
            factory.from_bytes(b"not a number"),
            Err(Error::DataConversion { .. })
        ));
        assert!(matches!(
            factory.from_bytes(b""),
            Err(Error::DataConversion { .. })
        ));
        assert_eq!(
            TextInference::new(I64Factory)
                .empty_string_is_zero(true)
                .from_bytes(b"")
                .unwrap(),
            0
        );

        let opts = ResultOpts {
            empty_string_is_zero: true,
            ..ResultOpts::default()
        };
        assert_eq!(
            TextInference::from_opts(I64Factory, &opts)
                .from_bytes(b"")
                .unwrap(),
            0
        );
    }

    #[test]
    fn text_inference_date() {
        let date = TextInference::new(DateFactory)
            .from_bytes(b"2024-12-25")
            .unwrap();
        assert_eq!(date, Date::new(2024, 12, 25));
    }
}
