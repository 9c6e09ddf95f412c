//! Compose codecs for structured data.
//!
//! # Overview
//!
//! A library of small codecs that each map a canonical [Value] to and from:
//! - A deterministic binary encoding
//! - A JSON tree (numbers, strings, booleans, null, ordered objects and arrays)
//!
//! Codecs are immutable descriptors built once and shared freely (every codec is `Send + Sync`).
//! Composite codecs hold their children as [Shared] trait objects and delegate to them in a
//! fixed order, so any codec can be nested inside any other.
//!
//! # Supported Types
//!
//! - Integers: fixed-width [UIntCodec] and [IntCodec] (1 to 6 bytes, see [uint8] to [int48]),
//!   arbitrary-width [BigUIntCodec] and [BigIntCodec], and the [varuint] format
//! - Primitives: [BoolCodec], [NilCodec], [DateCodec] and [UFixedCodec] decimals
//! - Byte strings: [BytesCodec] (variable or fixed size, text [Encoding] in JSON) and
//!   [StringCodec]
//! - Combinators: [StructCodec], [VectorCodec], [VariantCodec], [NullableCodec] and [SetCodec]
//!
//! # Encoding
//!
//! Encoding happens in two passes. [Codec::plan] validates the whole value and returns a
//! [WritePlan] holding the exact encoded length; [Codec::encode] then allocates a single buffer
//! and runs the plan into it. Decoding threads a cursor through [Codec::read], and
//! [Codec::decode] rejects any bytes left over.
//!
//! # Example
//!
//! ```
//! use wirecodec::{
//!     uint16, uint8, Codec, Encoding, BytesCodec, NullableCodec, SetCodec, StructCodec, Value,
//!     VectorCodec,
//! };
//!
//! // Define a record
//! let item = StructCodec::default()
//!     .field("id", uint16())
//!     .field("tags", SetCodec::new(uint8()))
//!     .field("payload", NullableCodec::new(BytesCodec::new(Encoding::Hex)));
//! let items = VectorCodec::new(item).with_range(..=16);
//!
//! let value = Value::Vector(vec![Value::record([
//!     ("id", Value::from(0x0102u16)),
//!     ("tags", Value::Set(vec![Value::from(3u8), Value::from(1u8)])),
//!     ("payload", Value::Nil),
//! ])]);
//!
//! // Binary
//! let encoded = items.encode(&value).unwrap();
//! assert_eq!(encoded, &[0x81, 0x01, 0x02, 0x82, 0x01, 0x03, 0x00][..]);
//!
//! // Set elements come back in canonical order
//! let decoded = items.decode(&encoded).unwrap();
//! let Value::Vector(decoded) = decoded else { unreachable!() };
//! assert_eq!(
//!     decoded[0].field("tags"),
//!     Some(&Value::Set(vec![Value::UInt(1), Value::UInt(3)]))
//! );
//!
//! // JSON
//! assert_eq!(
//!     items.stringify(&value).unwrap(),
//!     r#"[{"id":258,"tags":[1,3],"payload":null}]"#
//! );
//! ```
//!
//! # Example (Variant)
//!
//! ```
//! use wirecodec::{uint8, Codec, Error, NilCodec, StringCodec, Value, VariantCodec};
//!
//! let message = VariantCodec::default()
//!     .member(0, NilCodec)
//!     .member(1, uint8())
//!     .member(2, StringCodec::default());
//!
//! let value = Value::variant(2, "hi");
//! let encoded = message.encode(&value).unwrap();
//! assert_eq!(encoded, &[0x82, 0x82, b'h', b'i'][..]);
//! assert_eq!(message.parse(r#"[2,"hi"]"#).unwrap(), value);
//!
//! // Unknown discriminants are rejected, never defaulted
//! assert!(matches!(
//!     message.decode(&[0x83, 0x00]),
//!     Err(Error::UnknownDiscriminant(3))
//! ));
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod types;
pub mod util;
pub mod value;
pub mod varuint;

// Re-export main types and traits
pub use codec::{Codec, Shared, WritePlan};
pub use config::RangeCfg;
pub use error::Error;
pub use types::{
    big_int, big_uint, int16, int24, int256, int32, int40, int48, int64, int8, safe_int,
    safe_uint, uint16, uint24, uint256, uint32, uint40, uint48, uint64, uint8, BigIntCodec,
    BigUIntCodec, BoolCodec, BytesCodec, DateCodec, Encoding, IntCodec, NilCodec, NullableCodec,
    SetCodec, StringCodec, StructCodec, UFixedCodec, UIntCodec, VariantCodec, VectorCodec,
};
pub use value::Value;
pub use varuint::VarUIntCodec;
