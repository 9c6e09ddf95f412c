//! Fixed-width and arbitrary-precision integers.
//!
//! All integers are written big-endian in exactly `width` bytes. Signed integers are stored as
//! two's complement within that width.
//!
//! # Fixed width
//!
//! [UIntCodec] and [IntCodec] decode to [Value::UInt] and [Value::Int] and are limited to
//! widths of 1 to 6 bytes, so every value stays within the safe-integer range of JSON consumers
//! that use IEEE-754 doubles. [safe_uint] and [safe_int] use a 7 byte width and instead bound
//! values by the safe-integer range itself.
//!
//! # Arbitrary precision
//!
//! [BigUIntCodec] and [BigIntCodec] accept widths up to [MAX_BIG_WIDTH] and decode to [Value::BigUInt] and
//! [Value::BigInt]. In JSON they are numbers when safe and base-10 strings otherwise.

use crate::{
    util::{at_least, integer_json, is_safe, json_integer, MAX_SAFE_INTEGER},
    Codec, Error, Value, WritePlan,
};
use num_bigint::{BigInt, BigUint};
use num_traits::{Signed, ToPrimitive, Zero};
use paste::paste;
use serde_json::Value as Json;
use std::ops::Shl;

/// The largest width of [UIntCodec] and [IntCodec] (other than the safe width).
pub const MAX_FIXED_WIDTH: usize = 6;

/// The width of [safe_uint] and [safe_int].
pub const SAFE_WIDTH: usize = 7;

/// The widest [BigUIntCodec] or [BigIntCodec], in bytes.
pub const MAX_BIG_WIDTH: usize = 1024;

/// Maps a signed value to its two's complement representation in `width` bytes.
///
/// `T` must be wide enough to hold `2^(8 * width)`.
pub fn to_twos_complement<T>(value: T, width: usize) -> T
where
    T: Signed + Shl<usize, Output = T>,
{
    if value.is_negative() {
        (T::one() << (8 * width)) + value
    } else {
        value
    }
}

/// Maps a two's complement representation in `width` bytes back to its signed value.
///
/// `T` must be wide enough to hold `2^(8 * width)`.
pub fn from_twos_complement<T>(raw: T, width: usize) -> T
where
    T: Signed + PartialOrd + Shl<usize, Output = T>,
{
    if raw < (T::one() << (8 * width - 1)) {
        raw
    } else {
        raw - (T::one() << (8 * width))
    }
}

pub(crate) fn put_be(value: u64, dst: &mut [u8]) {
    let bytes = value.to_be_bytes();
    dst.copy_from_slice(&bytes[bytes.len() - dst.len()..]);
}

pub(crate) fn get_be(buf: &[u8], offset: usize, width: usize) -> Result<(u64, usize), Error> {
    at_least(buf, offset, width)?;
    let end = offset + width;
    let value = buf[offset..end]
        .iter()
        .fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte));
    Ok((value, end))
}

fn check_width(width: usize, max: usize) -> Result<(), Error> {
    if width == 0 || width > max {
        return Err(Error::InvalidWidth(width));
    }
    Ok(())
}

/// An unsigned integer of 1 to 6 bytes (or 7, see [safe_uint]).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UIntCodec {
    width: usize,
}

impl UIntCodec {
    /// Creates a codec of `width` bytes.
    ///
    /// Fails with [Error::InvalidWidth] unless `width` is in `1..=6`.
    pub fn new(width: usize) -> Result<Self, Error> {
        check_width(width, MAX_FIXED_WIDTH)?;
        Ok(Self { width })
    }

    /// The encoded width in bytes.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The largest accepted value.
    pub fn max(&self) -> u64 {
        let max = (1u64 << (8 * self.width)) - 1;
        max.min(MAX_SAFE_INTEGER)
    }

    fn check(&self, value: BigInt) -> Result<u64, Error> {
        if !is_safe(&value) {
            return Err(Error::NotSafeInteger(value.to_string()));
        }
        if value.is_negative() {
            return Err(Error::Negative(value.to_string()));
        }
        match value.to_u64() {
            Some(v) if v <= self.max() => Ok(v),
            _ => Err(Error::Overflow(
                value.to_string(),
                "0".into(),
                self.max().to_string(),
            )),
        }
    }

    fn to_base(&self, value: &Value) -> Result<u64, Error> {
        self.check(value.integer()?)
    }
}

impl Codec for UIntCodec {
    fn plan<'a>(&'a self, value: &'a Value) -> Result<WritePlan<'a>, Error> {
        let value = self.to_base(value)?;
        Ok(WritePlan::new(self.width, move |dst| put_be(value, dst)))
    }

    fn read(&self, buf: &[u8], offset: usize) -> Result<(Value, usize), Error> {
        let (value, cursor) = get_be(buf, offset, self.width)?;
        if value > MAX_SAFE_INTEGER {
            return Err(Error::NotSafeInteger(value.to_string()));
        }
        Ok((Value::UInt(value), cursor))
    }

    fn to_json(&self, value: &Value) -> Result<Json, Error> {
        Ok(Json::from(self.to_base(value)?))
    }

    fn from_json(&self, json: &Json) -> Result<Value, Error> {
        self.check(json_integer(json, false)?).map(Value::UInt)
    }

    fn fixed_size(&self) -> Option<usize> {
        Some(self.width)
    }
}

/// A signed integer of 1 to 6 bytes (or 7, see [safe_int]).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntCodec {
    width: usize,
}

impl IntCodec {
    /// Creates a codec of `width` bytes.
    ///
    /// Fails with [Error::InvalidWidth] unless `width` is in `1..=6`.
    pub fn new(width: usize) -> Result<Self, Error> {
        check_width(width, MAX_FIXED_WIDTH)?;
        Ok(Self { width })
    }

    /// The encoded width in bytes.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The smallest accepted value.
    pub fn min(&self) -> i64 {
        let min = -(1i64 << (8 * self.width - 1));
        min.max(-(MAX_SAFE_INTEGER as i64))
    }

    /// The largest accepted value.
    pub fn max(&self) -> i64 {
        let max = (1i64 << (8 * self.width - 1)) - 1;
        max.min(MAX_SAFE_INTEGER as i64)
    }

    fn check(&self, value: BigInt) -> Result<i64, Error> {
        if !is_safe(&value) {
            return Err(Error::NotSafeInteger(value.to_string()));
        }
        match value.to_i64() {
            Some(v) if (self.min()..=self.max()).contains(&v) => Ok(v),
            _ => Err(Error::Overflow(
                value.to_string(),
                self.min().to_string(),
                self.max().to_string(),
            )),
        }
    }

    fn to_base(&self, value: &Value) -> Result<i64, Error> {
        self.check(value.integer()?)
    }
}

impl Codec for IntCodec {
    fn plan<'a>(&'a self, value: &'a Value) -> Result<WritePlan<'a>, Error> {
        let value = self.to_base(value)?;
        // The transform is done in 128 bits so that `2^(8 * width) + value` never wraps.
        let raw = to_twos_complement(i128::from(value), self.width) as u64;
        Ok(WritePlan::new(self.width, move |dst| put_be(raw, dst)))
    }

    fn read(&self, buf: &[u8], offset: usize) -> Result<(Value, usize), Error> {
        let (raw, cursor) = get_be(buf, offset, self.width)?;
        let value = from_twos_complement(i128::from(raw), self.width) as i64;
        if value.unsigned_abs() > MAX_SAFE_INTEGER {
            return Err(Error::NotSafeInteger(value.to_string()));
        }
        Ok((Value::Int(value), cursor))
    }

    fn to_json(&self, value: &Value) -> Result<Json, Error> {
        Ok(Json::from(self.to_base(value)?))
    }

    fn from_json(&self, json: &Json) -> Result<Value, Error> {
        self.check(json_integer(json, false)?).map(Value::Int)
    }

    fn fixed_size(&self) -> Option<usize> {
        Some(self.width)
    }
}

/// An unsigned integer of 1 to [MAX_BIG_WIDTH] bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BigUIntCodec {
    width: usize,
    max: BigUint,
}

impl BigUIntCodec {
    /// Creates a codec of `width` bytes.
    ///
    /// Fails with [Error::InvalidWidth] unless `width` is in `1..=MAX_BIG_WIDTH`.
    pub fn new(width: usize) -> Result<Self, Error> {
        check_width(width, MAX_BIG_WIDTH)?;
        Ok(Self::sized(width))
    }

    fn sized(width: usize) -> Self {
        let max = (BigUint::from(1u8) << (8 * width)) - 1u8;
        Self { width, max }
    }

    /// The encoded width in bytes.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The largest accepted value.
    pub fn max(&self) -> &BigUint {
        &self.max
    }

    fn check(&self, value: BigInt) -> Result<BigUint, Error> {
        let Some(value) = value.to_biguint() else {
            return Err(Error::Negative(value.to_string()));
        };
        if value > self.max {
            return Err(Error::Overflow(
                value.to_string(),
                "0".into(),
                self.max.to_string(),
            ));
        }
        Ok(value)
    }
}

/// Writes `value` left-padded with zeros to fill `width` bytes.
fn plan_padded<'a>(value: &BigUint, width: usize) -> WritePlan<'a> {
    let bytes = if value.is_zero() {
        Vec::new()
    } else {
        value.to_bytes_be()
    };
    WritePlan::new(width, move |dst| {
        let start = width - bytes.len();
        dst[..start].fill(0);
        dst[start..].copy_from_slice(&bytes);
    })
}

fn read_padded(buf: &[u8], offset: usize, width: usize) -> Result<(BigUint, usize), Error> {
    at_least(buf, offset, width)?;
    let end = offset + width;
    Ok((BigUint::from_bytes_be(&buf[offset..end]), end))
}

impl Codec for BigUIntCodec {
    fn plan<'a>(&'a self, value: &'a Value) -> Result<WritePlan<'a>, Error> {
        let value = self.check(value.integer()?)?;
        Ok(plan_padded(&value, self.width))
    }

    fn read(&self, buf: &[u8], offset: usize) -> Result<(Value, usize), Error> {
        let (value, cursor) = read_padded(buf, offset, self.width)?;
        Ok((Value::BigUInt(value), cursor))
    }

    fn to_json(&self, value: &Value) -> Result<Json, Error> {
        let value = self.check(value.integer()?)?;
        Ok(integer_json(&value.into()))
    }

    fn from_json(&self, json: &Json) -> Result<Value, Error> {
        self.check(json_integer(json, true)?).map(Value::BigUInt)
    }

    fn fixed_size(&self) -> Option<usize> {
        Some(self.width)
    }
}

/// A signed integer of 1 to [MAX_BIG_WIDTH] bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BigIntCodec {
    width: usize,
    min: BigInt,
    max: BigInt,
}

impl BigIntCodec {
    /// Creates a codec of `width` bytes.
    ///
    /// Fails with [Error::InvalidWidth] unless `width` is in `1..=MAX_BIG_WIDTH`.
    pub fn new(width: usize) -> Result<Self, Error> {
        check_width(width, MAX_BIG_WIDTH)?;
        Ok(Self::sized(width))
    }

    fn sized(width: usize) -> Self {
        let half = BigInt::from(1u8) << (8 * width - 1);
        Self {
            width,
            min: -half.clone(),
            max: half - 1u8,
        }
    }

    /// The encoded width in bytes.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The smallest accepted value.
    pub fn min(&self) -> &BigInt {
        &self.min
    }

    /// The largest accepted value.
    pub fn max(&self) -> &BigInt {
        &self.max
    }

    fn check(&self, value: BigInt) -> Result<BigInt, Error> {
        if value < self.min || value > self.max {
            return Err(Error::Overflow(
                value.to_string(),
                self.min.to_string(),
                self.max.to_string(),
            ));
        }
        Ok(value)
    }
}

impl Codec for BigIntCodec {
    fn plan<'a>(&'a self, value: &'a Value) -> Result<WritePlan<'a>, Error> {
        let value = self.check(value.integer()?)?;
        let raw = to_twos_complement(value, self.width);
        Ok(plan_padded(raw.magnitude(), self.width))
    }

    fn read(&self, buf: &[u8], offset: usize) -> Result<(Value, usize), Error> {
        let (raw, cursor) = read_padded(buf, offset, self.width)?;
        let value = from_twos_complement(BigInt::from(raw), self.width);
        Ok((Value::BigInt(value), cursor))
    }

    fn to_json(&self, value: &Value) -> Result<Json, Error> {
        let value = self.check(value.integer()?)?;
        Ok(integer_json(&value))
    }

    fn from_json(&self, json: &Json) -> Result<Value, Error> {
        self.check(json_integer(json, true)?).map(Value::BigInt)
    }

    fn fixed_size(&self) -> Option<usize> {
        Some(self.width)
    }
}

macro_rules! fixed_constructors {
    ($($bits:literal => $width:literal),*) => {
        paste! {
            $(
                #[doc = concat!("An unsigned ", stringify!($bits), "-bit integer.")]
                pub const fn [<uint $bits>]() -> UIntCodec {
                    UIntCodec { width: $width }
                }

                #[doc = concat!("A signed ", stringify!($bits), "-bit integer.")]
                pub const fn [<int $bits>]() -> IntCodec {
                    IntCodec { width: $width }
                }
            )*
        }
    };
}
fixed_constructors!(8 => 1, 16 => 2, 24 => 3, 32 => 4, 40 => 5, 48 => 6);

/// An unsigned 7-byte integer bounded by the safe-integer range (e.g. timestamps).
pub const fn safe_uint() -> UIntCodec {
    UIntCodec { width: SAFE_WIDTH }
}

/// A signed 7-byte integer bounded by the safe-integer range.
pub const fn safe_int() -> IntCodec {
    IntCodec { width: SAFE_WIDTH }
}

/// An unsigned integer of `width` bytes, see [BigUIntCodec::new].
pub fn big_uint(width: usize) -> Result<BigUIntCodec, Error> {
    BigUIntCodec::new(width)
}

/// A signed integer of `width` bytes, see [BigIntCodec::new].
pub fn big_int(width: usize) -> Result<BigIntCodec, Error> {
    BigIntCodec::new(width)
}

/// An unsigned 64-bit integer.
pub fn uint64() -> BigUIntCodec {
    BigUIntCodec::sized(8)
}

/// A signed 64-bit integer.
pub fn int64() -> BigIntCodec {
    BigIntCodec::sized(8)
}

/// An unsigned 256-bit integer.
pub fn uint256() -> BigUIntCodec {
    BigUIntCodec::sized(32)
}

/// A signed 256-bit integer.
pub fn int256() -> BigIntCodec {
    BigIntCodec::sized(32)
}
