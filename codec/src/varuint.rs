//! Variable-length unsigned integer encoding and decoding
//!
//! A varuint is a sequence of 7-bit groups, most-significant group first. The high bit of each
//! byte is a terminator flag: it is set on the last (least-significant) byte and clear on every
//! byte before it.
//!
//! ```text
//!        0 -> 80
//!      127 -> FF
//!      128 -> 01 80
//!    16384 -> 01 00 80
//! ```
//!
//! Encoding always produces the minimal form. Decoding accepts non-minimal forms (leading `00`
//! groups), since they cannot change the value.
//!
//! Varuints are used as the length prefix of byte strings, vectors and sets and as the
//! discriminant of variants. [VarUIntCodec] exposes the format as an arbitrary-precision codec.

use crate::{
    util::{integer_json, json_integer},
    Codec, Error, RangeCfg, Value, WritePlan,
};
use num_bigint::BigUint;
use num_traits::Zero;
use serde_json::Value as Json;
use std::ops::{BitOrAssign, Shl, ShrAssign};

const DATA_BITS_PER_BYTE: usize = 7;
const DATA_BITS_MASK: u8 = 0x7F;
const TERMINATOR_BIT_MASK: u8 = 0x80;

/// A trait for unsigned integers that can be varuint encoded.
pub trait UInt:
    Copy
    + From<u8>
    + Sized
    + ShrAssign<usize>
    + Shl<usize, Output = Self>
    + BitOrAssign<Self>
    + PartialOrd
{
    /// Returns the number of leading zeros in the integer.
    fn leading_zeros(self) -> u32;

    /// Returns the least significant byte of the integer.
    fn as_u8(self) -> u8;
}

// Implements the `UInt` trait for all unsigned integer types.
macro_rules! impl_uint {
    ($type:ty) => {
        impl UInt for $type {
            #[inline]
            fn leading_zeros(self) -> u32 {
                self.leading_zeros()
            }

            #[inline]
            fn as_u8(self) -> u8 {
                self as u8
            }
        }
    };
}
impl_uint!(u8);
impl_uint!(u16);
impl_uint!(u32);
impl_uint!(u64);
impl_uint!(u128);

/// Calculates the number of bytes needed to encode an unsigned integer as a varuint.
pub fn size<T: UInt>(value: T) -> usize {
    let total_bits = std::mem::size_of::<T>() * 8;
    let leading_zeros = value.leading_zeros() as usize;
    let data_bits = total_bits - leading_zeros;
    usize::max(1, data_bits.div_ceil(DATA_BITS_PER_BYTE))
}

/// Encodes `value` into `dst`, which must be exactly [size] bytes long.
pub fn write<T: UInt>(value: T, dst: &mut [u8]) {
    let last = dst.len() - 1;
    let mut val = value;
    for (i, byte) in dst.iter_mut().enumerate().rev() {
        let digit = val.as_u8() & DATA_BITS_MASK;
        *byte = if i == last {
            digit | TERMINATOR_BIT_MASK
        } else {
            digit
        };
        val >>= DATA_BITS_PER_BYTE;
    }
}

/// Returns a plan that encodes `value`.
pub fn plan<'a, T: UInt + 'a>(value: T) -> WritePlan<'a> {
    WritePlan::new(size(value), move |dst| write(value, dst))
}

/// Decodes a varuint starting at `buf[offset]`.
///
/// Fails with [Error::InvalidVarint] if the value does not fit in `T`.
pub fn read<T: UInt>(buf: &[u8], offset: usize) -> Result<(T, usize), Error> {
    let mut result = T::from(0);
    let mut cursor = offset;
    loop {
        let Some(&byte) = buf.get(cursor) else {
            return Err(Error::EndOfBuffer);
        };
        cursor += 1;

        // Shifting in another group must not push set bits out of `T`.
        if result.leading_zeros() < DATA_BITS_PER_BYTE as u32 {
            return Err(Error::InvalidVarint);
        }
        result = result << DATA_BITS_PER_BYTE;
        result |= T::from(byte & DATA_BITS_MASK);

        if byte & TERMINATOR_BIT_MASK != 0 {
            return Ok((result, cursor));
        }
    }
}

/// Reads a varuint length or count prefix and checks it against `range`.
pub fn read_len(buf: &[u8], offset: usize, range: &RangeCfg) -> Result<(usize, usize), Error> {
    let (len, cursor) = read::<u64>(buf, offset)?;
    let len = usize::try_from(len).map_err(|_| Error::InvalidVarint)?;
    range.check(len)?;
    Ok((len, cursor))
}

/// Encodes an arbitrary-precision integer as a varuint.
pub fn encode_big(value: &BigUint) -> Vec<u8> {
    let mut digits = value.to_radix_be(1 << DATA_BITS_PER_BYTE);
    if digits.is_empty() {
        digits.push(0);
    }
    if let Some(last) = digits.last_mut() {
        *last |= TERMINATOR_BIT_MASK;
    }
    digits
}

/// Decodes an arbitrary-precision varuint starting at `buf[offset]`.
pub fn read_big(buf: &[u8], offset: usize) -> Result<(BigUint, usize), Error> {
    let mut result = BigUint::zero();
    let mut cursor = offset;
    loop {
        let Some(&byte) = buf.get(cursor) else {
            return Err(Error::EndOfBuffer);
        };
        cursor += 1;
        result = (result << DATA_BITS_PER_BYTE) | BigUint::from(byte & DATA_BITS_MASK);
        if byte & TERMINATOR_BIT_MASK != 0 {
            return Ok((result, cursor));
        }
    }
}

/// An arbitrary-precision unsigned integer encoded as a varuint.
///
/// Decodes to [Value::BigUInt]. In JSON, values within the safe-integer range are numbers and
/// larger values are base-10 strings.
#[derive(Clone, Copy, Debug, Default)]
pub struct VarUIntCodec;

impl VarUIntCodec {
    pub(crate) fn to_base(value: &Value) -> Result<BigUint, Error> {
        let value = value.integer()?;
        match value.to_biguint() {
            Some(value) => Ok(value),
            None => Err(Error::Negative(value.to_string())),
        }
    }
}

impl Codec for VarUIntCodec {
    fn plan<'a>(&'a self, value: &'a Value) -> Result<WritePlan<'a>, Error> {
        let value = Self::to_base(value)?;
        Ok(WritePlan::from_vec(encode_big(&value)))
    }

    fn read(&self, buf: &[u8], offset: usize) -> Result<(Value, usize), Error> {
        let (value, cursor) = read_big(buf, offset)?;
        Ok((Value::BigUInt(value), cursor))
    }

    fn to_json(&self, value: &Value) -> Result<Json, Error> {
        let value = Self::to_base(value)?;
        Ok(integer_json(&value.into()))
    }

    fn from_json(&self, json: &Json) -> Result<Value, Error> {
        let value = json_integer(json, true)?;
        Self::to_base(&Value::BigInt(value)).map(Value::BigUInt)
    }
}
