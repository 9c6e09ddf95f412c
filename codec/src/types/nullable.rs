//! Optional values.

use crate::{codec::Shared, Codec, Error, Value, WritePlan};
use serde_json::Value as Json;
use std::sync::Arc;

const ABSENT: u8 = 0;
const PRESENT: u8 = 1;

/// A value that may be absent.
///
/// Written as a flag byte (`0` absent, `1` present) followed by the inner encoding when present.
/// An absent value is [Value::Nil] and `null` in JSON; a present value is the inner value itself.
#[derive(Clone, Debug)]
pub struct NullableCodec {
    inner: Shared,
}

impl NullableCodec {
    /// Wraps `inner`.
    pub fn new(inner: impl Codec + 'static) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Wraps a shared codec.
    pub fn shared(inner: Shared) -> Self {
        Self { inner }
    }

    /// The codec of a present value.
    pub fn inner(&self) -> &Shared {
        &self.inner
    }
}

impl Codec for NullableCodec {
    fn plan<'a>(&'a self, value: &'a Value) -> Result<WritePlan<'a>, Error> {
        if value.is_nil() {
            return Ok(WritePlan::new(1, |dst| dst[0] = ABSENT));
        }
        let inner = self.inner.plan(value)?;
        Ok(WritePlan::concat(vec![
            WritePlan::new(1, |dst| dst[0] = PRESENT),
            inner,
        ]))
    }

    fn read(&self, buf: &[u8], offset: usize) -> Result<(Value, usize), Error> {
        match buf.get(offset) {
            None => Err(Error::EndOfBuffer),
            Some(&ABSENT) => Ok((Value::Nil, offset + 1)),
            Some(&PRESENT) => self.inner.read(buf, offset + 1),
            Some(&flag) => Err(Error::InvalidFlag(flag)),
        }
    }

    fn to_json(&self, value: &Value) -> Result<Json, Error> {
        if value.is_nil() {
            return Ok(Json::Null);
        }
        self.inner.to_json(value)
    }

    fn from_json(&self, json: &Json) -> Result<Value, Error> {
        if json.is_null() {
            return Ok(Value::Nil);
        }
        self.inner.from_json(json)
    }
}
