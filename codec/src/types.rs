//! Codec implementations, from leaves to combinators.

pub mod bytes;
pub mod date;
pub mod integer;
pub mod nullable;
pub mod primitives;
pub mod set;
pub mod structure;
pub mod ufixed;
pub mod variant;
pub mod vector;

pub use self::bytes::{BytesCodec, Encoding, StringCodec};
pub use date::DateCodec;
pub use integer::{
    big_int, big_uint, int16, int24, int256, int32, int40, int48, int64, int8, safe_int,
    safe_uint, uint16, uint24, uint256, uint32, uint40, uint48, uint64, uint8, BigIntCodec,
    BigUIntCodec, IntCodec, UIntCodec,
};
pub use nullable::NullableCodec;
pub use primitives::{BoolCodec, NilCodec};
pub use set::SetCodec;
pub use structure::StructCodec;
pub use ufixed::UFixedCodec;
pub use variant::VariantCodec;
pub use vector::VectorCodec;
