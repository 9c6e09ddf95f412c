//! Codecs for byte strings and UTF-8 strings.
//!
//! A variable-size byte string is written as `varuint(len) || bytes`; a fixed-size byte string is
//! written as the raw bytes only. In JSON, byte strings are text in the [Encoding] chosen when the
//! codec was constructed.

use crate::{
    util::{at_least, json_kind},
    varuint, Codec, Error, RangeCfg, Value, WritePlan,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use num_bigint::BigUint;
use serde_json::Value as Json;
use std::{borrow::Cow, fmt, str::FromStr};

const BASE58_ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Text encoding of a byte string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// The bytes are UTF-8 text.
    Utf8,
    /// Lowercase hexadecimal with a `0x` prefix.
    #[default]
    Hex,
    /// Base58 with the Bitcoin alphabet.
    Base58,
    /// Standard padded base64.
    Base64,
}

impl Encoding {
    /// Returns the name accepted by [Encoding::from_str].
    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf8",
            Encoding::Hex => "hex",
            Encoding::Base58 => "base58",
            Encoding::Base64 => "base64",
        }
    }

    /// Converts bytes to text.
    pub fn encode(&self, bytes: &[u8]) -> Result<String, Error> {
        match self {
            Encoding::Utf8 => std::str::from_utf8(bytes)
                .map(str::to_string)
                .map_err(|e| Error::InvalidData("utf8", e.to_string())),
            Encoding::Hex => Ok(format!("0x{}", hex::encode(bytes))),
            Encoding::Base58 => Ok(base58_encode(bytes)),
            Encoding::Base64 => Ok(STANDARD.encode(bytes)),
        }
    }

    /// Converts text to bytes.
    pub fn decode(&self, text: &str) -> Result<Vec<u8>, Error> {
        match self {
            Encoding::Utf8 => Ok(text.as_bytes().to_vec()),
            Encoding::Hex => {
                let Some(digits) = text.strip_prefix("0x") else {
                    return Err(Error::InvalidData("hex", format!("missing 0x prefix: {text}")));
                };
                hex::decode(digits).map_err(|e| Error::InvalidData("hex", e.to_string()))
            }
            Encoding::Base58 => base58_decode(text),
            Encoding::Base64 => STANDARD
                .decode(text)
                .map_err(|e| Error::InvalidData("base64", e.to_string())),
        }
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            "hex" => Ok(Encoding::Hex),
            "base58" => Ok(Encoding::Base58),
            "base64" => Ok(Encoding::Base64),
            other => Err(Error::UnsupportedEncoding(other.to_string())),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn base58_encode(bytes: &[u8]) -> String {
    // Each leading zero byte is a leading '1'.
    let zeros = bytes.iter().take_while(|&&b| b == 0).count();
    let mut out = "1".repeat(zeros);
    let rest = &bytes[zeros..];
    if !rest.is_empty() {
        for digit in BigUint::from_bytes_be(rest).to_radix_be(58) {
            out.push(char::from(BASE58_ALPHABET[usize::from(digit)]));
        }
    }
    out
}

fn base58_decode(text: &str) -> Result<Vec<u8>, Error> {
    let zeros = text.bytes().take_while(|&c| c == b'1').count();
    let digits = text
        .bytes()
        .skip(zeros)
        .map(|c| {
            BASE58_ALPHABET
                .iter()
                .position(|&a| a == c)
                .map(|d| d as u8)
                .ok_or_else(|| {
                    Error::InvalidData("base58", format!("invalid character {:?}", char::from(c)))
                })
        })
        .collect::<Result<Vec<u8>, _>>()?;

    let mut out = vec![0u8; zeros];
    if !digits.is_empty() {
        let value = BigUint::from_radix_be(&digits, 58)
            .ok_or_else(|| Error::InvalidData("base58", text.to_string()))?;
        out.extend(value.to_bytes_be());
    }
    Ok(out)
}

/// Returns a plan writing `varuint(len) || data`.
pub(crate) fn plan_prefixed(data: Cow<'_, [u8]>) -> WritePlan<'_> {
    let prefix = varuint::plan(data.len() as u64);
    let body = match data {
        Cow::Borrowed(data) => WritePlan::from_slice(data),
        Cow::Owned(data) => WritePlan::from_vec(data),
    };
    WritePlan::concat(vec![prefix, body])
}

/// Reads `varuint(len) || data`, returning `data`.
fn read_prefixed<'b>(
    buf: &'b [u8],
    offset: usize,
    range: &RangeCfg,
) -> Result<(&'b [u8], usize), Error> {
    let (len, cursor) = varuint::read_len(buf, offset, range)?;
    at_least(buf, cursor, len)?;
    let end = cursor + len;
    Ok((&buf[cursor..end], end))
}

fn json_str(json: &Json) -> Result<&str, Error> {
    match json {
        Json::String(s) => Ok(s),
        other => Err(Error::InvalidType {
            expected: "string",
            found: json_kind(other),
        }),
    }
}

/// A byte string, of variable or fixed size.
///
/// Decodes to [Value::Bytes]. Accepts [Value::Bytes] or text in the codec's [Encoding].
#[derive(Clone, Debug)]
pub struct BytesCodec {
    encoding: Encoding,
    size: Option<usize>,
    range: RangeCfg,
}

impl BytesCodec {
    /// A length-prefixed byte string.
    pub fn new(encoding: Encoding) -> Self {
        Self {
            encoding,
            size: None,
            range: RangeCfg::default(),
        }
    }

    /// A byte string of exactly `size` bytes, written without a length prefix.
    ///
    /// Fails with [Error::InvalidLength] if `size` is zero.
    pub fn fixed(size: usize, encoding: Encoding) -> Result<Self, Error> {
        if size == 0 {
            return Err(Error::InvalidLength(size));
        }
        Ok(Self {
            encoding,
            size: Some(size),
            range: RangeCfg::exact(size),
        })
    }

    /// Limits the accepted length of a length-prefixed byte string.
    pub fn with_range(mut self, range: impl Into<RangeCfg>) -> Self {
        if self.size.is_none() {
            self.range = range.into();
        }
        self
    }

    /// The text encoding used in JSON.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// The size of a fixed-size byte string.
    pub fn size(&self) -> Option<usize> {
        self.size
    }

    fn check_len(&self, len: usize) -> Result<(), Error> {
        match self.size {
            Some(expected) if expected != len => Err(Error::InvalidSize {
                expected,
                found: len,
            }),
            _ => self.range.check(len),
        }
    }

    fn to_base<'a>(&self, value: &'a Value) -> Result<Cow<'a, [u8]>, Error> {
        let bytes = match value {
            Value::Bytes(bytes) => Cow::Borrowed(bytes.as_ref()),
            Value::Text(text) => Cow::Owned(self.encoding.decode(text)?),
            other => return Err(other.type_error("bytes")),
        };
        self.check_len(bytes.len())?;
        Ok(bytes)
    }
}

impl Codec for BytesCodec {
    fn plan<'a>(&'a self, value: &'a Value) -> Result<WritePlan<'a>, Error> {
        let bytes = self.to_base(value)?;
        if self.size.is_some() {
            return Ok(match bytes {
                Cow::Borrowed(bytes) => WritePlan::from_slice(bytes),
                Cow::Owned(bytes) => WritePlan::from_vec(bytes),
            });
        }
        Ok(plan_prefixed(bytes))
    }

    fn read(&self, buf: &[u8], offset: usize) -> Result<(Value, usize), Error> {
        let (bytes, cursor) = match self.size {
            Some(size) => {
                at_least(buf, offset, size)?;
                (&buf[offset..offset + size], offset + size)
            }
            None => read_prefixed(buf, offset, &self.range)?,
        };
        Ok((Value::Bytes(Bytes::copy_from_slice(bytes)), cursor))
    }

    fn to_json(&self, value: &Value) -> Result<Json, Error> {
        let bytes = self.to_base(value)?;
        Ok(Json::String(self.encoding.encode(&bytes)?))
    }

    fn from_json(&self, json: &Json) -> Result<Value, Error> {
        let bytes = self.encoding.decode(json_str(json)?)?;
        self.check_len(bytes.len())?;
        Ok(Value::Bytes(Bytes::from(bytes)))
    }

    fn fixed_size(&self) -> Option<usize> {
        self.size
    }
}

/// A UTF-8 string, written as `varuint(len) || utf8 bytes`.
///
/// Decodes to [Value::Text].
#[derive(Clone, Debug, Default)]
pub struct StringCodec {
    range: RangeCfg,
}

impl StringCodec {
    /// Limits the accepted length (in bytes) of the string.
    pub fn with_range(mut self, range: impl Into<RangeCfg>) -> Self {
        self.range = range.into();
        self
    }

    fn to_base<'a>(&self, value: &'a Value) -> Result<&'a str, Error> {
        match value {
            Value::Text(text) => {
                self.range.check(text.len())?;
                Ok(text)
            }
            other => Err(other.type_error("text")),
        }
    }
}

impl Codec for StringCodec {
    fn plan<'a>(&'a self, value: &'a Value) -> Result<WritePlan<'a>, Error> {
        let text = self.to_base(value)?;
        Ok(plan_prefixed(Cow::Borrowed(text.as_bytes())))
    }

    fn read(&self, buf: &[u8], offset: usize) -> Result<(Value, usize), Error> {
        let (bytes, cursor) = read_prefixed(buf, offset, &self.range)?;
        let text = std::str::from_utf8(bytes)
            .map_err(|e| Error::InvalidData("utf8", e.to_string()))?;
        Ok((Value::Text(text.to_string()), cursor))
    }

    fn to_json(&self, value: &Value) -> Result<Json, Error> {
        Ok(Json::String(self.to_base(value)?.to_string()))
    }

    fn from_json(&self, json: &Json) -> Result<Value, Error> {
        let text = json_str(json)?;
        self.range.check(text.len())?;
        Ok(Value::Text(text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(Encoding::Utf8, b"hello", "hello"; "utf8")]
    #[test_case(Encoding::Hex, &[0xde, 0xad, 0xbe, 0xef], "0xdeadbeef"; "hex")]
    #[test_case(Encoding::Hex, &[], "0x"; "hex empty")]
    #[test_case(Encoding::Base58, b"hello world", "StV1DL6CwTryKyV"; "base58")]
    #[test_case(Encoding::Base58, &[0, 0, 1], "112"; "base58 leading zeros")]
    #[test_case(Encoding::Base58, &[0, 0], "11"; "base58 only zeros")]
    #[test_case(Encoding::Base58, &[], ""; "base58 empty")]
    #[test_case(Encoding::Base64, b"hello", "aGVsbG8="; "base64")]
    fn test_transcode(encoding: Encoding, bytes: &[u8], text: &str) {
        assert_eq!(encoding.encode(bytes).unwrap(), text);
        assert_eq!(encoding.decode(text).unwrap(), bytes);
    }

    #[test]
    fn test_transcode_invalid() {
        assert!(matches!(
            Encoding::Hex.decode("deadbeef"),
            Err(Error::InvalidData("hex", _))
        ));
        assert!(matches!(
            Encoding::Hex.decode("0xabc"),
            Err(Error::InvalidData("hex", _))
        ));
        assert!(matches!(
            Encoding::Base58.decode("0OIl"),
            Err(Error::InvalidData("base58", _))
        ));
        assert!(matches!(
            Encoding::Base64.decode("***"),
            Err(Error::InvalidData("base64", _))
        ));
        assert!(matches!(
            Encoding::Utf8.encode(&[0xff, 0xfe]),
            Err(Error::InvalidData("utf8", _))
        ));
    }

    #[test]
    fn test_encoding_names() {
        for encoding in [
            Encoding::Utf8,
            Encoding::Hex,
            Encoding::Base58,
            Encoding::Base64,
        ] {
            assert_eq!(encoding.to_string().parse::<Encoding>().unwrap(), encoding);
        }
        assert!(matches!(
            "base32".parse::<Encoding>(),
            Err(Error::UnsupportedEncoding(name)) if name == "base32"
        ));
    }

    #[test]
    fn test_bytes() {
        let codec = BytesCodec::new(Encoding::Hex);
        for value in [
            Bytes::new(),
            Bytes::from_static(&[1, 2, 3]),
            Bytes::from(vec![0u8; 300]),
        ] {
            let encoded = codec.encode(&Value::Bytes(value.clone())).unwrap();
            assert_eq!(
                encoded.len(),
                varuint::size(value.len() as u64) + value.len()
            );
            assert_eq!(codec.decode(&encoded).unwrap(), Value::Bytes(value.clone()));
            let json = codec.to_json(&Value::Bytes(value.clone())).unwrap();
            assert_eq!(codec.from_json(&json).unwrap(), Value::Bytes(value));
        }

        let value = Value::Bytes(Bytes::from_static(&[0xAB, 0xCD]));
        assert_eq!(codec.encode(&value).unwrap(), &[0x82, 0xAB, 0xCD][..]);
        assert_eq!(codec.to_json(&value).unwrap(), json!("0xabcd"));
        assert_eq!(
            codec.encode(&Value::from("0xabcd")).unwrap(),
            &[0x82, 0xAB, 0xCD][..]
        );
    }

    #[test]
    fn test_bytes_truncated() {
        let codec = BytesCodec::new(Encoding::Hex);
        assert!(matches!(codec.decode(&[0x83, 1, 2]), Err(Error::EndOfBuffer)));
        assert!(matches!(codec.decode(&[0x03]), Err(Error::EndOfBuffer)));
        assert!(matches!(codec.decode(&[0x81, 1, 2]), Err(Error::ExtraData(1))));
    }

    #[test]
    fn test_bytes_range() {
        let codec = BytesCodec::new(Encoding::Base64).with_range(..=2);
        assert!(codec.decode(&[0x82, 1, 2]).is_ok());
        assert!(matches!(
            codec.decode(&[0x83, 1, 2, 3]),
            Err(Error::InvalidLength(3))
        ));
        assert!(matches!(
            codec.encode(&Value::from(vec![1u8, 2, 3])),
            Err(Error::InvalidLength(3))
        ));
    }

    #[test]
    fn test_fixed_bytes() {
        let codec = BytesCodec::fixed(3, Encoding::Hex).unwrap();
        assert_eq!(codec.fixed_size(), Some(3));
        let value = Value::from(vec![1u8, 2, 3]);
        let encoded = codec.encode(&value).unwrap();
        assert_eq!(encoded, &[1, 2, 3][..]);
        assert_eq!(codec.decode(&encoded).unwrap(), value);
        assert_eq!(codec.to_json(&value).unwrap(), json!("0x010203"));
        assert_eq!(codec.from_json(&json!("0x010203")).unwrap(), value);

        assert!(matches!(
            codec.encode(&Value::from(vec![1u8, 2])),
            Err(Error::InvalidSize {
                expected: 3,
                found: 2
            })
        ));
        assert!(matches!(
            codec.from_json(&json!("0x01")),
            Err(Error::InvalidSize { .. })
        ));
        assert!(matches!(codec.read(&[1, 2], 0), Err(Error::EndOfBuffer)));
        assert!(matches!(
            BytesCodec::fixed(0, Encoding::Hex),
            Err(Error::InvalidLength(0))
        ));
    }

    #[test]
    fn test_string() {
        let codec = StringCodec::default();
        let value = Value::from("héllo");
        let encoded = codec.encode(&value).unwrap();
        assert_eq!(encoded[0], 0x86);
        assert_eq!(&encoded[1..], "héllo".as_bytes());
        assert_eq!(codec.decode(&encoded).unwrap(), value);
        assert_eq!(codec.stringify(&value).unwrap(), "\"héllo\"");

        // Same wire format as a utf8 byte string.
        let utf8 = BytesCodec::new(Encoding::Utf8);
        assert_eq!(utf8.encode(&value).unwrap(), encoded);

        assert!(matches!(
            codec.decode(&[0x82, 0xff, 0xfe]),
            Err(Error::InvalidData("utf8", _))
        ));
        assert!(matches!(
            StringCodec::default().with_range(..3).encode(&value),
            Err(Error::InvalidLength(6))
        ));
        let bounded = StringCodec::default().with_range(..=5);
        assert!(matches!(bounded.decode(&encoded), Err(Error::InvalidLength(6))));
        assert_eq!(bounded.decode(&[0x82, b'h', b'i']).unwrap(), Value::from("hi"));
    }
}
