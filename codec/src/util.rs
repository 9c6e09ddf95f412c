//! Helpers shared by codec implementations.

use crate::Error;
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive};
use serde_json::{Number, Value as Json};
use std::str::FromStr;

/// The largest integer a JSON consumer using IEEE-754 doubles can represent exactly (2^53 - 1).
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Checks that at least `len` bytes remain in `buf` after `offset`.
#[inline]
pub fn at_least(buf: &[u8], offset: usize, len: usize) -> Result<(), Error> {
    let remaining = buf.len().saturating_sub(offset);
    if remaining < len {
        return Err(Error::EndOfBuffer);
    }
    Ok(())
}

/// Returns `true` if `value` fits in the safe-integer range.
pub(crate) fn is_safe(value: &BigInt) -> bool {
    value.abs() <= BigInt::from(MAX_SAFE_INTEGER)
}

/// Reads an integer from a JSON number or, if `strings` is set, a base-10 string.
///
/// Floats are accepted only when they are whole and within the safe-integer range.
pub(crate) fn json_integer(json: &Json, strings: bool) -> Result<BigInt, Error> {
    match json {
        Json::Number(n) => number_integer(n),
        Json::String(s) if strings => {
            BigInt::from_str(s.trim()).map_err(|_| Error::NotInteger(s.clone()))
        }
        other => Err(Error::InvalidType {
            expected: if strings {
                "integer or decimal string"
            } else {
                "integer"
            },
            found: json_kind(other),
        }),
    }
}

fn number_integer(n: &Number) -> Result<BigInt, Error> {
    if let Some(v) = n.as_u64() {
        return Ok(BigInt::from(v));
    }
    if let Some(v) = n.as_i64() {
        return Ok(BigInt::from(v));
    }
    let Some(v) = n.as_f64() else {
        return Err(Error::NotInteger(n.to_string()));
    };
    if !v.is_finite() || v.fract() != 0.0 {
        return Err(Error::NotInteger(n.to_string()));
    }
    if v.abs() > MAX_SAFE_INTEGER as f64 {
        return Err(Error::NotSafeInteger(n.to_string()));
    }
    // Whole and within 2^53, so the conversion is exact.
    Ok(BigInt::from(v as i64))
}

/// Converts an integer to JSON: a number when it is safe, a base-10 string otherwise.
pub(crate) fn integer_json(value: &BigInt) -> Json {
    match value.to_i64() {
        Some(v) if is_safe(value) => Json::from(v),
        _ => Json::String(value.to_str_radix(10)),
    }
}

/// Returns a short name of the JSON variant, used in error messages.
pub(crate) fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_at_least() {
        let buf = [0u8; 4];
        assert!(at_least(&buf, 0, 4).is_ok());
        assert!(at_least(&buf, 2, 2).is_ok());
        assert!(matches!(at_least(&buf, 2, 3), Err(Error::EndOfBuffer)));
        assert!(matches!(at_least(&buf, 9, 1), Err(Error::EndOfBuffer)));
        assert!(at_least(&buf, 9, 0).is_ok());
    }

    #[test]
    fn test_json_integer() {
        assert_eq!(json_integer(&json!(5), false).unwrap(), BigInt::from(5));
        assert_eq!(json_integer(&json!(-5), false).unwrap(), BigInt::from(-5));
        assert_eq!(json_integer(&json!(6.0), false).unwrap(), BigInt::from(6));
        assert_eq!(
            json_integer(&json!("18446744073709551616"), true).unwrap(),
            BigInt::from(u64::MAX) + 1
        );
        assert!(matches!(
            json_integer(&json!(1.5), false),
            Err(Error::NotInteger(_))
        ));
        assert!(matches!(
            json_integer(&json!(1e300), false),
            Err(Error::NotSafeInteger(_))
        ));
        assert!(matches!(
            json_integer(&json!("12"), false),
            Err(Error::InvalidType { .. })
        ));
        assert!(matches!(
            json_integer(&json!("1x"), true),
            Err(Error::NotInteger(_))
        ));
    }

    #[test]
    fn test_integer_json() {
        let safe = BigInt::from(MAX_SAFE_INTEGER);
        assert_eq!(integer_json(&safe), json!(MAX_SAFE_INTEGER));
        assert_eq!(integer_json(&-safe.clone()), json!(-(MAX_SAFE_INTEGER as i64)));
        assert_eq!(
            integer_json(&(safe.clone() + 1)),
            json!("9007199254740992")
        );
        assert_eq!(integer_json(&-(safe + BigInt::from(1))), json!("-9007199254740992"));
    }
}
