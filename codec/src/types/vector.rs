//! Homogeneous sequences.

use crate::{codec::Shared, util::json_kind, varuint, Codec, Error, RangeCfg, Value, WritePlan};
use serde_json::Value as Json;
use std::sync::Arc;
use tracing::debug;

/// The largest number of zero-sized elements (e.g. [Value::Nil]) in one vector or set.
///
/// Such elements consume no bytes, so the remaining buffer cannot bound their count.
pub const MAX_ZERO_SIZED: usize = 1 << 16;

/// A sequence of values of one codec, written as `varuint(count)` followed by each element.
///
/// Decodes to [Value::Vector]. Accepts [Value::Vector] or [Value::Set].
#[derive(Clone, Debug)]
pub struct VectorCodec {
    element: Shared,
    range: RangeCfg,
}

impl VectorCodec {
    /// A vector of `element`, of any length.
    pub fn new(element: impl Codec + 'static) -> Self {
        Self::shared(Arc::new(element))
    }

    /// A vector of a shared element codec, of any length.
    pub fn shared(element: Shared) -> Self {
        Self {
            element,
            range: RangeCfg::default(),
        }
    }

    /// Limits the accepted number of elements.
    pub fn with_range(mut self, range: impl Into<RangeCfg>) -> Self {
        self.range = range.into();
        self
    }

    /// The element codec.
    pub fn element(&self) -> &Shared {
        &self.element
    }

    /// The accepted number of elements.
    pub fn range(&self) -> &RangeCfg {
        &self.range
    }

    /// Checks `count` against the length limit and, for zero-sized elements, [MAX_ZERO_SIZED].
    pub(crate) fn check_count(&self, count: usize) -> Result<(), Error> {
        self.range.check(count)?;
        if self.element.fixed_size() == Some(0) && count > MAX_ZERO_SIZED {
            debug!(count, "too many zero-sized elements");
            return Err(Error::InvalidLength(count));
        }
        Ok(())
    }

    /// Returns the elements of a sequence value.
    pub(crate) fn elements(value: &Value) -> Result<&[Value], Error> {
        match value {
            Value::Vector(elements) | Value::Set(elements) => Ok(elements),
            other => Err(other.type_error("vector")),
        }
    }

    /// Returns the elements of a JSON array, checked against the length limit.
    pub(crate) fn json_elements<'j>(&self, json: &'j Json) -> Result<&'j [Json], Error> {
        match json {
            Json::Array(elements) => {
                self.check_count(elements.len())?;
                Ok(elements)
            }
            other => Err(Error::InvalidType {
                expected: "array",
                found: json_kind(other),
            }),
        }
    }

    /// Prefixes already validated element plans with their count.
    pub(crate) fn plan_elements<'a>(
        &self,
        plans: Vec<WritePlan<'a>>,
    ) -> Result<WritePlan<'a>, Error> {
        self.check_count(plans.len())?;
        let count = varuint::plan(plans.len() as u64);
        Ok(WritePlan::concat(vec![count, WritePlan::concat(plans)]))
    }

    /// Reads a count and then that many elements.
    pub(crate) fn read_elements(
        &self,
        buf: &[u8],
        offset: usize,
    ) -> Result<(Vec<Value>, usize), Error> {
        let (count, mut cursor) = varuint::read_len(buf, offset, &self.range)?;
        self.check_count(count)?;

        // Every element but a zero-sized one consumes at least one byte, so the count can be
        // checked against the remaining buffer before allocating.
        let min_size = self.element.fixed_size().unwrap_or(1);
        let remaining = buf.len().saturating_sub(cursor);
        if min_size > 0 {
            match count.checked_mul(min_size) {
                Some(need) if need <= remaining => {}
                _ => {
                    debug!(count, min_size, remaining, "count exceeds remaining bytes");
                    return Err(Error::EndOfBuffer);
                }
            }
        }

        let mut elements = Vec::with_capacity(count);
        for _ in 0..count {
            let (element, next) = self.element.read(buf, cursor)?;
            elements.push(element);
            cursor = next;
        }
        Ok((elements, cursor))
    }
}

impl Codec for VectorCodec {
    fn plan<'a>(&'a self, value: &'a Value) -> Result<WritePlan<'a>, Error> {
        let elements = Self::elements(value)?;
        self.check_count(elements.len())?;
        let plans = elements
            .iter()
            .map(|element| self.element.plan(element))
            .collect::<Result<Vec<_>, _>>()?;
        self.plan_elements(plans)
    }

    fn read(&self, buf: &[u8], offset: usize) -> Result<(Value, usize), Error> {
        let (elements, cursor) = self.read_elements(buf, offset)?;
        Ok((Value::Vector(elements), cursor))
    }

    fn to_json(&self, value: &Value) -> Result<Json, Error> {
        let elements = Self::elements(value)?;
        self.check_count(elements.len())?;
        elements
            .iter()
            .map(|element| self.element.to_json(element))
            .collect::<Result<Vec<_>, _>>()
            .map(Json::Array)
    }

    fn from_json(&self, json: &Json) -> Result<Value, Error> {
        self.json_elements(json)?
            .iter()
            .map(|element| self.element.from_json(element))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Vector)
    }
}
