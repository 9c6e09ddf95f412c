//! Non-negative fixed-point decimals.
//!
//! A value with `places` decimal places is scaled by `10^places` and written as a varuint. In
//! JSON it is a number while every value up to it can be represented exactly by an IEEE-754
//! double, and a string with exactly `places` fractional digits otherwise.

use crate::{
    util::json_kind,
    varuint::{encode_big, read_big},
    Codec, Error, Value, WritePlan,
};
use num_bigint::{BigInt, BigUint};
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive};
use serde_json::Value as Json;
use std::str::FromStr;

/// The largest number of decimal places.
pub const MAX_PLACES: usize = 15;

const MAX_EXPONENT: u64 = 4096;

/// Parses a base-10 decimal, with an optional sign, fraction and exponent.
pub fn parse_decimal(text: &str) -> Result<BigRational, Error> {
    let invalid = || Error::InvalidData("decimal", text.to_string());
    let trimmed = text.trim();
    let (mantissa, exponent) = match trimmed.find(['e', 'E']) {
        Some(at) => {
            let exponent = trimmed[at + 1..].parse::<i32>().map_err(|_| invalid())?;
            (&trimmed[..at], exponent)
        }
        None => (trimmed, 0),
    };
    let (negative, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, mantissa.strip_prefix('+').unwrap_or(mantissa)),
    };
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits = format!("{whole}{fraction}");
    if digits.is_empty() || !digits.bytes().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let mut numer = BigInt::from_str(&digits).map_err(|_| invalid())?;
    if negative {
        numer = -numer;
    }
    let scale = i64::from(exponent) - fraction.len() as i64;
    if scale.unsigned_abs() > MAX_EXPONENT {
        return Err(invalid());
    }
    let power = BigInt::from(10u8).pow(scale.unsigned_abs() as u32);
    Ok(if scale >= 0 {
        BigRational::from_integer(numer * power)
    } else {
        BigRational::new(numer, power)
    })
}

/// A non-negative decimal with a fixed number of fractional digits.
///
/// Decodes to [Value::Decimal]. Accepts decimals, integers and decimal strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UFixedCodec {
    places: usize,
    round: bool,
    scale: BigUint,
    max_number: BigUint,
}

impl UFixedCodec {
    /// Creates a codec with `places` fractional digits.
    ///
    /// When `round` is set, inputs with more fractional digits are rounded half-up; otherwise
    /// they fail with [Error::TooManyDecimals]. Fails with [Error::InvalidPlaces] if `places`
    /// exceeds [MAX_PLACES].
    pub fn new(places: usize, round: bool) -> Result<Self, Error> {
        if places > MAX_PLACES {
            return Err(Error::InvalidPlaces(places));
        }
        let scale = 10u64.pow(places as u32);
        // ceil(log2(10^places))
        let scale_bits = u64::BITS - (scale - 1).leading_zeros();
        Ok(Self {
            places,
            round,
            scale: BigUint::from(scale),
            max_number: BigUint::from(1u8) << (53 - scale_bits as usize),
        })
    }

    /// The number of fractional digits.
    pub fn places(&self) -> usize {
        self.places
    }

    /// Whether inputs with more fractional digits are rounded.
    pub fn round(&self) -> bool {
        self.round
    }

    /// Returns `value * 10^places` as an integer.
    fn scaled(&self, value: &BigRational) -> Result<BigUint, Error> {
        if value.is_negative() {
            return Err(Error::Negative(value.to_string()));
        }
        let scaled = value * BigRational::from_integer(BigInt::from(self.scale.clone()));
        let scaled = if scaled.is_integer() {
            scaled.to_integer()
        } else if self.round {
            // Half-up; the value is non-negative.
            (scaled + BigRational::new(1.into(), 2.into())).floor().to_integer()
        } else {
            return Err(Error::TooManyDecimals(value.to_string()));
        };
        scaled
            .to_biguint()
            .ok_or_else(|| Error::Negative(value.to_string()))
    }

    fn to_base(&self, value: &Value) -> Result<BigUint, Error> {
        let value = match value {
            Value::Decimal(value) => value.clone(),
            Value::Text(text) => parse_decimal(text)?,
            other => BigRational::from_integer(other.integer()?),
        };
        self.scaled(&value)
    }

    fn unscaled(&self, scaled: BigUint) -> Value {
        Value::Decimal(BigRational::new(
            scaled.into(),
            BigInt::from(self.scale.clone()),
        ))
    }

    /// Formats `scaled / 10^places` with exactly `places` fractional digits.
    fn format(&self, scaled: &BigUint) -> String {
        let digits = format!("{:0>width$}", scaled.to_string(), width = self.places + 1);
        if self.places == 0 {
            return digits;
        }
        let (whole, fraction) = digits.split_at(digits.len() - self.places);
        format!("{whole}.{fraction}")
    }
}

impl Codec for UFixedCodec {
    fn plan<'a>(&'a self, value: &'a Value) -> Result<WritePlan<'a>, Error> {
        let scaled = self.to_base(value)?;
        Ok(WritePlan::from_vec(encode_big(&scaled)))
    }

    fn read(&self, buf: &[u8], offset: usize) -> Result<(Value, usize), Error> {
        let (scaled, cursor) = read_big(buf, offset)?;
        Ok((self.unscaled(scaled), cursor))
    }

    fn to_json(&self, value: &Value) -> Result<Json, Error> {
        let scaled = self.to_base(value)?;
        if scaled > &self.max_number * &self.scale {
            return Ok(Json::String(self.format(&scaled)));
        }
        // At most 2^53, so both conversions are exact.
        let (Some(scaled), Some(scale)) = (scaled.to_u64(), self.scale.to_u64()) else {
            return Ok(Json::String(self.format(&scaled)));
        };
        if self.places == 0 {
            return Ok(Json::from(scaled));
        }
        Ok(Json::from(scaled as f64 / scale as f64))
    }

    fn from_json(&self, json: &Json) -> Result<Value, Error> {
        let value = match json {
            Json::Number(n) => parse_decimal(&n.to_string())?,
            Json::String(s) => parse_decimal(s)?,
            other => {
                return Err(Error::InvalidType {
                    expected: "decimal",
                    found: json_kind(other),
                })
            }
        };
        Ok(self.unscaled(self.scaled(&value)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;
    use serde_json::json;
    use test_case::test_case;

    fn decimal(text: &str) -> Value {
        Value::Decimal(parse_decimal(text).unwrap())
    }

    #[test_case("12.5", 125, 10; "fraction")]
    #[test_case("-0.25", -1, 4; "negative")]
    #[test_case("+7", 7, 1; "plus sign")]
    #[test_case("1e3", 1000, 1; "exponent")]
    #[test_case("15E-1", 3, 2; "negative exponent")]
    #[test_case(".5", 1, 2; "no whole part")]
    fn test_parse_decimal(text: &str, numer: i64, denom: i64) {
        assert_eq!(
            parse_decimal(text).unwrap(),
            BigRational::new(numer.into(), denom.into())
        );
    }

    #[test_case(""; "empty")]
    #[test_case("."; "dot")]
    #[test_case("1.2.3"; "two dots")]
    #[test_case("0x10"; "hex")]
    #[test_case("1e"; "bare exponent")]
    #[test_case("1e100000"; "huge exponent")]
    fn test_parse_decimal_invalid(text: &str) {
        assert!(matches!(parse_decimal(text), Err(Error::InvalidData("decimal", _))));
    }

    #[test]
    fn test_ufixed() {
        let codec = UFixedCodec::new(2, false).unwrap();
        let value = decimal("1.28");
        let encoded = codec.encode(&value).unwrap();
        assert_eq!(encoded, &[0x01, 0x80][..]);
        assert_eq!(codec.decode(&encoded).unwrap(), value);
        assert_eq!(codec.to_json(&value).unwrap(), json!(1.28));
        assert_eq!(codec.from_json(&json!(1.28)).unwrap(), value);
        assert_eq!(codec.from_json(&json!("1.28")).unwrap(), value);

        // Integers and strings are accepted as input.
        assert_eq!(codec.encode(&Value::from(3u8)).unwrap(), &[0x02, 0xAC][..]);
        assert_eq!(codec.encode(&Value::from("3")).unwrap(), &[0x02, 0xAC][..]);
    }

    #[test]
    fn test_ufixed_too_many_decimals() {
        let codec = UFixedCodec::new(2, false).unwrap();
        assert!(matches!(
            codec.encode(&decimal("1.285")),
            Err(Error::TooManyDecimals(_))
        ));
        assert!(matches!(
            codec.from_json(&json!("0.001")),
            Err(Error::TooManyDecimals(_))
        ));
    }

    #[test]
    fn test_ufixed_round_half_up() {
        let codec = UFixedCodec::new(2, true).unwrap();
        assert_eq!(codec.to_json(&decimal("1.285")).unwrap(), json!(1.29));
        assert_eq!(codec.to_json(&decimal("1.284")).unwrap(), json!(1.28));
        assert_eq!(codec.from_json(&json!("0.005")).unwrap(), decimal("0.01"));
        assert_eq!(codec.from_json(&json!("0.0049")).unwrap(), decimal("0"));
    }

    #[test]
    fn test_ufixed_large_values_are_strings() {
        // 10^2 needs 7 bits, so numbers stay exact up to 2^46.
        let codec = UFixedCodec::new(2, false).unwrap();
        let limit = 1u64 << 46;
        assert_eq!(
            codec.to_json(&Value::from(limit)).unwrap(),
            json!(limit as f64)
        );
        assert_eq!(
            codec.to_json(&Value::from(limit + 1)).unwrap(),
            json!(format!("{}.00", limit + 1))
        );
        assert_eq!(
            codec.to_json(&decimal("70368744177664.01")).unwrap(),
            json!("70368744177664.01")
        );

        let integers = UFixedCodec::new(0, true).unwrap();
        assert_eq!(integers.to_json(&Value::from(7u8)).unwrap(), json!(7));
        assert_eq!(
            integers.to_json(&Value::from((1u64 << 53) + 1)).unwrap(),
            json!("9007199254740993")
        );
    }

    #[test]
    fn test_ufixed_format() {
        let codec = UFixedCodec::new(3, false).unwrap();
        assert_eq!(codec.format(&BigUint::from(5u8)), "0.005");
        assert_eq!(codec.format(&BigUint::from(12345u16)), "12.345");
        assert_eq!(codec.format(&BigUint::zero()), "0.000");
    }

    #[test]
    fn test_ufixed_invalid() {
        assert!(matches!(UFixedCodec::new(16, true), Err(Error::InvalidPlaces(16))));
        let codec = UFixedCodec::new(2, true).unwrap();
        assert!(matches!(
            codec.encode(&decimal("-1")),
            Err(Error::Negative(_))
        ));
        assert!(matches!(
            codec.from_json(&json!(true)),
            Err(Error::InvalidType { .. })
        ));
        assert!(matches!(codec.decode(&[0x01]), Err(Error::EndOfBuffer)));
    }
}
