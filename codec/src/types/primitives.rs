//! Codecs for booleans and the empty value.

use crate::{util::json_kind, Codec, Error, Value, WritePlan};
use serde_json::Value as Json;

/// A boolean, written as a single `0x00` or `0x01` byte.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoolCodec;

impl BoolCodec {
    fn to_base(value: &Value) -> Result<bool, Error> {
        match value {
            Value::Bool(v) => Ok(*v),
            other => Err(other.type_error("bool")),
        }
    }
}

impl Codec for BoolCodec {
    fn plan<'a>(&'a self, value: &'a Value) -> Result<WritePlan<'a>, Error> {
        let byte = u8::from(Self::to_base(value)?);
        Ok(WritePlan::new(1, move |dst| dst[0] = byte))
    }

    fn read(&self, buf: &[u8], offset: usize) -> Result<(Value, usize), Error> {
        match buf.get(offset) {
            None => Err(Error::EndOfBuffer),
            Some(0) => Ok((Value::Bool(false), offset + 1)),
            Some(1) => Ok((Value::Bool(true), offset + 1)),
            Some(&byte) => Err(Error::InvalidBool(byte)),
        }
    }

    fn to_json(&self, value: &Value) -> Result<Json, Error> {
        Ok(Json::Bool(Self::to_base(value)?))
    }

    fn from_json(&self, json: &Json) -> Result<Value, Error> {
        match json {
            Json::Bool(v) => Ok(Value::Bool(*v)),
            other => Err(Error::InvalidType {
                expected: "boolean",
                found: json_kind(other),
            }),
        }
    }

    fn fixed_size(&self) -> Option<usize> {
        Some(1)
    }
}

/// The empty value: no bytes on the wire and `null` in JSON.
///
/// Typically the payload of a variant member that carries no data.
#[derive(Clone, Copy, Debug, Default)]
pub struct NilCodec;

impl Codec for NilCodec {
    fn plan<'a>(&'a self, value: &'a Value) -> Result<WritePlan<'a>, Error> {
        match value {
            Value::Nil => Ok(WritePlan::empty()),
            other => Err(other.type_error("nil")),
        }
    }

    fn read(&self, _: &[u8], offset: usize) -> Result<(Value, usize), Error> {
        Ok((Value::Nil, offset))
    }

    fn to_json(&self, value: &Value) -> Result<Json, Error> {
        match value {
            Value::Nil => Ok(Json::Null),
            other => Err(other.type_error("nil")),
        }
    }

    fn from_json(&self, json: &Json) -> Result<Value, Error> {
        match json {
            Json::Null => Ok(Value::Nil),
            other => Err(Error::InvalidType {
                expected: "null",
                found: json_kind(other),
            }),
        }
    }

    fn fixed_size(&self) -> Option<usize> {
        Some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bool() {
        for value in [true, false] {
            let encoded = BoolCodec.encode(&Value::Bool(value)).unwrap();
            assert_eq!(encoded.len(), 1);
            assert_eq!(BoolCodec.decode(&encoded).unwrap(), Value::Bool(value));
            let json = BoolCodec.to_json(&Value::Bool(value)).unwrap();
            assert_eq!(json, json!(value));
            assert_eq!(BoolCodec.from_json(&json).unwrap(), Value::Bool(value));
        }
        assert_eq!(BoolCodec.encode(&Value::Bool(true)).unwrap(), &[0x01][..]);
        assert_eq!(BoolCodec.encode(&Value::Bool(false)).unwrap(), &[0x00][..]);
    }

    #[test]
    fn test_bool_invalid() {
        assert!(matches!(BoolCodec.decode(&[0x02]), Err(Error::InvalidBool(2))));
        assert!(matches!(BoolCodec.decode(&[]), Err(Error::EndOfBuffer)));
        assert!(matches!(BoolCodec.read(&[1], 1), Err(Error::EndOfBuffer)));
        assert!(matches!(
            BoolCodec.encode(&Value::UInt(1)),
            Err(Error::InvalidType { .. })
        ));
        assert!(matches!(
            BoolCodec.from_json(&json!(1)),
            Err(Error::InvalidType {
                expected: "boolean",
                found: "number"
            })
        ));
    }

    #[test]
    fn test_nil() {
        assert!(NilCodec.encode(&Value::Nil).unwrap().is_empty());
        assert_eq!(NilCodec.decode(&[]).unwrap(), Value::Nil);
        assert_eq!(NilCodec.read(&[1, 2], 1).unwrap(), (Value::Nil, 1));
        assert_eq!(NilCodec.to_json(&Value::Nil).unwrap(), Json::Null);
        assert_eq!(NilCodec.parse("null").unwrap(), Value::Nil);
        assert!(matches!(NilCodec.decode(&[0]), Err(Error::ExtraData(1))));
        assert!(matches!(
            NilCodec.encode(&Value::Bool(false)),
            Err(Error::InvalidType { .. })
        ));
    }
}
