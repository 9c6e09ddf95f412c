//! Tagged unions.

use crate::{
    codec::Shared,
    util::{json_integer, json_kind},
    varuint, Codec, Error, Value, WritePlan,
};
use num_traits::ToPrimitive;
use serde_json::Value as Json;
use std::{collections::BTreeMap, sync::Arc};
use tracing::debug;

/// One of several member codecs, selected by a discriminant.
///
/// Written as `varuint(discriminant)` followed by the member's encoding. Decodes to
/// [Value::Variant]; in JSON it is the pair `[discriminant, value]`. A discriminant missing from
/// the table fails with [Error::UnknownDiscriminant] on every path.
#[derive(Clone, Debug, Default)]
pub struct VariantCodec {
    members: BTreeMap<u32, Shared>,
}

impl VariantCodec {
    /// Creates a variant from `(discriminant, codec)` pairs.
    ///
    /// A repeated discriminant replaces the earlier member.
    pub fn new(members: impl IntoIterator<Item = (u32, Shared)>) -> Self {
        Self {
            members: members.into_iter().collect(),
        }
    }

    /// Adds (or replaces) the member selected by `discriminant`.
    pub fn member(mut self, discriminant: u32, codec: impl Codec + 'static) -> Self {
        self.members.insert(discriminant, Arc::new(codec));
        self
    }

    /// The discriminants of the table, in ascending order.
    pub fn discriminants(&self) -> impl Iterator<Item = u32> + '_ {
        self.members.keys().copied()
    }

    /// Returns the codec of the member selected by `discriminant`.
    pub fn get(&self, discriminant: u64) -> Result<(u32, &Shared), Error> {
        u32::try_from(discriminant)
            .ok()
            .and_then(|key| self.members.get(&key).map(|codec| (key, codec)))
            .ok_or_else(|| {
                debug!(discriminant, "unknown variant discriminant");
                Error::UnknownDiscriminant(discriminant)
            })
    }

    fn input(value: &Value) -> Result<(u32, &Value), Error> {
        match value {
            Value::Variant(discriminant, inner) => Ok((*discriminant, inner)),
            other => Err(other.type_error("variant")),
        }
    }
}

impl Codec for VariantCodec {
    fn plan<'a>(&'a self, value: &'a Value) -> Result<WritePlan<'a>, Error> {
        let (discriminant, inner) = Self::input(value)?;
        let (_, codec) = self.get(u64::from(discriminant))?;
        let inner = codec.plan(inner)?;
        Ok(WritePlan::concat(vec![varuint::plan(discriminant), inner]))
    }

    fn read(&self, buf: &[u8], offset: usize) -> Result<(Value, usize), Error> {
        let (discriminant, cursor) = varuint::read::<u64>(buf, offset)?;
        let (discriminant, codec) = self.get(discriminant)?;
        let (inner, cursor) = codec.read(buf, cursor)?;
        Ok((Value::variant(discriminant, inner), cursor))
    }

    fn to_json(&self, value: &Value) -> Result<Json, Error> {
        let (discriminant, inner) = Self::input(value)?;
        let (_, codec) = self.get(u64::from(discriminant))?;
        Ok(Json::Array(vec![
            Json::from(discriminant),
            codec.to_json(inner)?,
        ]))
    }

    fn from_json(&self, json: &Json) -> Result<Value, Error> {
        let pair = match json {
            Json::Array(pair) => pair,
            other => {
                return Err(Error::InvalidType {
                    expected: "[discriminant, value] pair",
                    found: json_kind(other),
                })
            }
        };
        let [discriminant, inner] = pair.as_slice() else {
            return Err(Error::InvalidLength(pair.len()));
        };
        let discriminant = json_integer(discriminant, false)?;
        let discriminant = discriminant
            .to_u64()
            .ok_or_else(|| Error::Negative(discriminant.to_string()))?;
        let (discriminant, codec) = self.get(discriminant)?;
        Ok(Value::variant(discriminant, codec.from_json(inner)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        bytes::StringCodec,
        integer::{uint16, uint8},
        primitives::NilCodec,
    };
    use serde_json::json;

    fn codec() -> VariantCodec {
        VariantCodec::default()
            .member(0, NilCodec)
            .member(1, uint8())
            .member(200, StringCodec::default())
    }

    #[test]
    fn test_variant() {
        let codec = codec();
        let cases = [
            (Value::variant(0, Value::Nil), vec![0x80]),
            (Value::variant(1, 7u8), vec![0x81, 0x07]),
            (Value::variant(200, "ok"), vec![0x01, 0xC8, 0x82, b'o', b'k']),
        ];
        for (value, expected) in cases {
            let encoded = codec.encode(&value).unwrap();
            assert_eq!(encoded, expected);
            assert_eq!(codec.decode(&encoded).unwrap(), value);
            let json = codec.to_json(&value).unwrap();
            assert_eq!(codec.from_json(&json).unwrap(), value);
        }
        assert_eq!(
            codec.to_json(&Value::variant(1, 7u8)).unwrap(),
            json!([1, 7])
        );
        assert_eq!(
            codec.to_json(&Value::variant(0, Value::Nil)).unwrap(),
            json!([0, null])
        );
        assert_eq!(codec.discriminants().collect::<Vec<_>>(), [0, 1, 200]);
    }

    #[test]
    fn test_variant_unknown_discriminant() {
        let codec = codec();
        assert!(matches!(
            codec.decode(&[0x82, 0x07]),
            Err(Error::UnknownDiscriminant(2))
        ));
        assert!(matches!(
            codec.encode(&Value::variant(3, 7u8)),
            Err(Error::UnknownDiscriminant(3))
        ));
        assert!(matches!(
            codec.to_json(&Value::variant(3, 7u8)),
            Err(Error::UnknownDiscriminant(3))
        ));
        assert!(matches!(
            codec.from_json(&json!([3, 7])),
            Err(Error::UnknownDiscriminant(3))
        ));
        // Larger than any u32.
        let encoded = varuint::plan(1u64 << 40).into_bytes();
        assert!(matches!(
            codec.decode(&encoded),
            Err(Error::UnknownDiscriminant(d)) if d == 1 << 40
        ));
    }

    #[test]
    fn test_variant_member_errors() {
        let codec = codec();
        assert!(matches!(
            codec.encode(&Value::variant(1, 300u16)),
            Err(Error::Overflow(..))
        ));
        assert!(matches!(codec.decode(&[0x81]), Err(Error::EndOfBuffer)));
        assert!(matches!(codec.decode(&[]), Err(Error::EndOfBuffer)));
        assert!(matches!(
            codec.encode(&Value::UInt(1)),
            Err(Error::InvalidType { .. })
        ));
        assert!(matches!(
            codec.from_json(&json!([1])),
            Err(Error::InvalidLength(1))
        ));
        assert!(matches!(
            codec.from_json(&json!({"1": 7})),
            Err(Error::InvalidType { .. })
        ));
        assert!(matches!(
            codec.from_json(&json!([-1, 7])),
            Err(Error::Negative(_))
        ));
    }

    #[test]
    fn test_variant_new() {
        let codec = VariantCodec::new([
            (5, Arc::new(uint8()) as Shared),
            (5, Arc::new(uint16()) as Shared),
        ]);
        assert_eq!(
            codec.encode(&Value::variant(5, 0x0102u16)).unwrap(),
            &[0x85, 0x01, 0x02][..]
        );
    }
}
