//! The canonical in-memory value produced and consumed by every codec.
//!
//! A [Value] is deliberately loose: codecs accept a wider set of variants as input than they
//! produce as output (an arbitrary-precision integer codec will accept [Value::UInt],
//! [Value::Int], [Value::BigInt] or a decimal [Value::Text]), but every decode returns the single
//! canonical variant for that codec.

use crate::Error;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use num_bigint::{BigInt, BigUint};
use num_rational::BigRational;
use num_traits::One;
use std::str::FromStr;

/// A decoded value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Absence of a value (the `null` of JSON).
    Nil,
    Bool(bool),
    /// Unsigned integer of at most 7 bytes.
    UInt(u64),
    /// Signed integer of at most 7 bytes.
    Int(i64),
    BigUInt(BigUint),
    BigInt(BigInt),
    /// Non-negative fixed-point decimal.
    Decimal(BigRational),
    Bytes(Bytes),
    Text(String),
    Date(DateTime<Utc>),
    /// Named fields, in declaration order.
    Struct(Vec<(String, Value)>),
    Vector(Vec<Value>),
    /// Elements of a canonical set, in canonical (encoded byte) order once decoded.
    Set(Vec<Value>),
    /// A discriminant and the value of the selected member.
    Variant(u32, Box<Value>),
}

impl Value {
    /// Builds a [Value::Struct] from `(name, value)` pairs.
    pub fn record<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Struct(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Builds a [Value::Variant].
    pub fn variant(discriminant: u32, value: impl Into<Value>) -> Self {
        Value::Variant(discriminant, Box::new(value.into()))
    }

    /// Returns a short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::UInt(_) => "uint",
            Value::Int(_) => "int",
            Value::BigUInt(_) => "big uint",
            Value::BigInt(_) => "big int",
            Value::Decimal(_) => "decimal",
            Value::Bytes(_) => "bytes",
            Value::Text(_) => "text",
            Value::Date(_) => "date",
            Value::Struct(_) => "struct",
            Value::Vector(_) => "vector",
            Value::Set(_) => "set",
            Value::Variant(_, _) => "variant",
        }
    }

    /// Returns the field named `name` of a [Value::Struct].
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Struct(fields) => fields.iter().find(|(k, _)| k == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Returns `true` if this is [Value::Nil].
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Widens any integer-like input to a [BigInt].
    ///
    /// Text must be a base-10 integer. Decimals are accepted only when they are whole.
    pub(crate) fn integer(&self) -> Result<BigInt, Error> {
        match self {
            Value::UInt(v) => Ok(BigInt::from(*v)),
            Value::Int(v) => Ok(BigInt::from(*v)),
            Value::BigUInt(v) => Ok(BigInt::from(v.clone())),
            Value::BigInt(v) => Ok(v.clone()),
            Value::Decimal(v) if v.denom().is_one() => Ok(v.numer().clone()),
            Value::Decimal(v) => Err(Error::NotInteger(v.to_string())),
            Value::Text(s) => BigInt::from_str(s.trim()).map_err(|_| Error::NotInteger(s.clone())),
            other => Err(other.type_error("integer")),
        }
    }

    /// Returns an [Error::InvalidType] for this value.
    pub(crate) fn type_error(&self, expected: &'static str) -> Error {
        Error::InvalidType {
            expected,
            found: self.kind(),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

macro_rules! impl_from_int {
    ($variant:ident, $target:ty, $($type:ty),+) => {
        $(
            impl From<$type> for Value {
                fn from(v: $type) -> Self {
                    Value::$variant(<$target>::from(v))
                }
            }
        )+
    };
}
impl_from_int!(UInt, u64, u8, u16, u32, u64);
impl_from_int!(Int, i64, i8, i16, i32, i64);

impl From<BigUint> for Value {
    fn from(v: BigUint) -> Self {
        Value::BigUInt(v)
    }
}

impl From<BigInt> for Value {
    fn from(v: BigInt) -> Self {
        Value::BigInt(v)
    }
}

impl From<BigRational> for Value {
    fn from(v: BigRational) -> Self {
        Value::Decimal(v)
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Value::Bytes(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(Bytes::from(v))
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(Bytes::copy_from_slice(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Date(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}
