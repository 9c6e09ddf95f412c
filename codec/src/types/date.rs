//! Timestamps with millisecond precision.
//!
//! A date is written as the number of milliseconds since the Unix epoch, as a 7-byte signed
//! two's complement integer. In JSON it is an RFC 3339 string in UTC with exactly three
//! fractional digits (e.g. `2023-11-14T22:13:20.000Z`).

use super::integer::{from_twos_complement, get_be, put_be, to_twos_complement};
use crate::{
    util::{json_integer, json_kind},
    Codec, Error, Value, WritePlan,
};
use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use serde_json::Value as Json;
use std::ops::RangeInclusive;

/// The encoded width of a date in bytes.
pub const DATE_WIDTH: usize = 7;

/// A UTC timestamp, truncated to the millisecond, between the years 0 and 9999.
///
/// Decodes to [Value::Date]. Accepts a [Value::Date], an integer number of milliseconds or an
/// RFC 3339 string.
#[derive(Clone, Copy, Debug, Default)]
pub struct DateCodec;

/// Years representable in RFC 3339.
const YEARS: RangeInclusive<i32> = 0..=9999;

fn from_millis(millis: &BigInt) -> Result<DateTime<Utc>, Error> {
    millis
        .to_i64()
        .and_then(DateTime::from_timestamp_millis)
        .filter(|date| YEARS.contains(&date.year()))
        .ok_or_else(|| Error::InvalidDate(format!("{millis} ms")))
}

fn parse(text: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(text.trim())
        .map(|date| date.with_timezone(&Utc))
        .map_err(|e| Error::InvalidDate(format!("{text}: {e}")))
}

impl DateCodec {
    /// Returns the timestamp of `value` in milliseconds.
    fn to_base(value: &Value) -> Result<i64, Error> {
        let millis = match value {
            Value::Date(date) => BigInt::from(date.timestamp_millis()),
            Value::Text(text) => BigInt::from(parse(text)?.timestamp_millis()),
            other => other.integer()?,
        };
        Ok(from_millis(&millis)?.timestamp_millis())
    }
}

impl Codec for DateCodec {
    fn plan<'a>(&'a self, value: &'a Value) -> Result<WritePlan<'a>, Error> {
        let millis = Self::to_base(value)?;
        let raw = to_twos_complement(i128::from(millis), DATE_WIDTH) as u64;
        Ok(WritePlan::new(DATE_WIDTH, move |dst| put_be(raw, dst)))
    }

    fn read(&self, buf: &[u8], offset: usize) -> Result<(Value, usize), Error> {
        let (raw, cursor) = get_be(buf, offset, DATE_WIDTH)?;
        let millis = from_twos_complement(i128::from(raw), DATE_WIDTH);
        let date = from_millis(&BigInt::from(millis))?;
        Ok((Value::Date(date), cursor))
    }

    fn to_json(&self, value: &Value) -> Result<Json, Error> {
        let date = from_millis(&BigInt::from(Self::to_base(value)?))?;
        Ok(Json::String(date.to_rfc3339_opts(SecondsFormat::Millis, true)))
    }

    fn from_json(&self, json: &Json) -> Result<Value, Error> {
        let millis = match json {
            Json::String(text) => parse(text)?.timestamp_millis(),
            Json::Number(_) => from_millis(&json_integer(json, false)?)?.timestamp_millis(),
            other => {
                return Err(Error::InvalidType {
                    expected: "date string",
                    found: json_kind(other),
                })
            }
        };
        from_millis(&BigInt::from(millis)).map(Value::Date)
    }

    fn fixed_size(&self) -> Option<usize> {
        Some(DATE_WIDTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn date(millis: i64) -> Value {
        Value::Date(DateTime::from_timestamp_millis(millis).unwrap())
    }

    #[test]
    fn test_date() {
        let value = date(1_700_000_000_000);
        let encoded = DateCodec.encode(&value).unwrap();
        assert_eq!(encoded, &[0x00, 0x01, 0x8B, 0xCF, 0xE5, 0x68, 0x00][..]);
        assert_eq!(DateCodec.decode(&encoded).unwrap(), value);
        assert_eq!(
            DateCodec.to_json(&value).unwrap(),
            json!("2023-11-14T22:13:20.000Z")
        );
        assert_eq!(
            DateCodec.from_json(&json!("2023-11-14T22:13:20.000Z")).unwrap(),
            value
        );
    }

    #[test]
    fn test_date_before_epoch() {
        let value = date(-1);
        let encoded = DateCodec.encode(&value).unwrap();
        assert_eq!(encoded, &[0xFF; DATE_WIDTH][..]);
        assert_eq!(DateCodec.decode(&encoded).unwrap(), value);
        assert_eq!(
            DateCodec.to_json(&value).unwrap(),
            json!("1969-12-31T23:59:59.999Z")
        );
    }

    #[test]
    fn test_date_inputs() {
        let expected = DateCodec.encode(&date(1_700_000_000_000)).unwrap();
        for input in [
            Value::from(1_700_000_000_000u64),
            Value::from("2023-11-14T22:13:20Z"),
            Value::from("2023-11-15T00:13:20.000+02:00"),
        ] {
            assert_eq!(DateCodec.encode(&input).unwrap(), expected);
        }
        assert_eq!(
            DateCodec.from_json(&json!(1_700_000_000_000u64)).unwrap(),
            date(1_700_000_000_000)
        );
    }

    #[test]
    fn test_date_truncates_sub_millis() {
        let precise = Utc
            .timestamp_opt(1_700_000_000, 123_456_789)
            .single()
            .unwrap();
        let encoded = DateCodec.encode(&Value::Date(precise)).unwrap();
        assert_eq!(DateCodec.decode(&encoded).unwrap(), date(1_700_000_000_123));
        assert_eq!(
            DateCodec.to_json(&Value::Date(precise)).unwrap(),
            json!("2023-11-14T22:13:20.123Z")
        );
    }

    #[test]
    fn test_date_invalid() {
        assert!(matches!(
            DateCodec.encode(&Value::from("yesterday")),
            Err(Error::InvalidDate(_))
        ));
        assert!(matches!(
            DateCodec.from_json(&json!(true)),
            Err(Error::InvalidType { .. })
        ));
        let last = 253_402_300_799_999u64;
        assert_eq!(
            DateCodec.to_json(&Value::from(last)).unwrap(),
            json!("9999-12-31T23:59:59.999Z")
        );
        assert!(matches!(
            DateCodec.encode(&Value::from(last + 1)),
            Err(Error::InvalidDate(_))
        ));
        // 2^55 - 1 milliseconds is past the last representable date.
        let max = [0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        assert!(matches!(DateCodec.decode(&max), Err(Error::InvalidDate(_))));
        assert!(matches!(
            DateCodec.decode(&[0; 6]),
            Err(Error::EndOfBuffer)
        ));
    }

    #[test]
    fn test_date_out_of_range_on_every_path() {
        let far = Utc.with_ymd_and_hms(12000, 1, 1, 0, 0, 0).single().unwrap();
        let value = Value::Date(far);
        assert!(matches!(DateCodec.encode(&value), Err(Error::InvalidDate(_))));
        assert!(matches!(DateCodec.to_json(&value), Err(Error::InvalidDate(_))));

        // Year 0 in +01:00 is year -1 in UTC.
        let early = Value::from("0000-01-01T00:00:00+01:00");
        assert!(matches!(DateCodec.encode(&early), Err(Error::InvalidDate(_))));
        assert!(matches!(
            DateCodec.from_json(&json!("0000-01-01T00:00:00+01:00")),
            Err(Error::InvalidDate(_))
        ));
        let first = Value::from("0000-01-01T00:00:00Z");
        let encoded = DateCodec.encode(&first).unwrap();
        assert_eq!(
            DateCodec.to_json(&DateCodec.decode(&encoded).unwrap()).unwrap(),
            json!("0000-01-01T00:00:00.000Z")
        );
    }
}
