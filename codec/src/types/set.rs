//! Canonical sets.
//!
//! A set is written exactly like a vector, but its element order is derived rather than stored:
//! elements are sorted by the bytes of their own encoding. Two equal sets therefore always have
//! the same encoding, and a decoder rejects any other order.

use super::vector::VectorCodec;
use crate::{codec::Shared, Codec, Error, RangeCfg, Value, WritePlan};
use bytes::Bytes;
use serde_json::Value as Json;
use std::cmp::Ordering;
use tracing::debug;

/// A duplicate-free collection of values of one codec, in canonical order.
///
/// Decodes to [Value::Set]. Accepts [Value::Set] or [Value::Vector] in any order.
#[derive(Clone, Debug)]
pub struct SetCodec {
    vector: VectorCodec,
}

impl SetCodec {
    /// A set of `element`, of any size.
    pub fn new(element: impl Codec + 'static) -> Self {
        Self {
            vector: VectorCodec::new(element),
        }
    }

    /// A set of a shared element codec, of any size.
    pub fn shared(element: Shared) -> Self {
        Self {
            vector: VectorCodec::shared(element),
        }
    }

    /// Limits the accepted number of elements.
    pub fn with_range(self, range: impl Into<RangeCfg>) -> Self {
        Self {
            vector: self.vector.with_range(range),
        }
    }

    /// The element codec.
    pub fn element(&self) -> &Shared {
        self.vector.element()
    }

    /// Encodes every element and sorts the elements by their encoding.
    ///
    /// Fails with [Error::DuplicateElement] if two elements have the same encoding.
    fn canonical<'a>(&self, value: &'a Value) -> Result<Vec<(Bytes, &'a Value)>, Error> {
        let elements = VectorCodec::elements(value)?;
        let mut sorted = elements
            .iter()
            .map(|element| {
                let encoded = self.element().encode(element)?;
                Ok::<_, Error>((encoded, element))
            })
            .collect::<Result<Vec<_>, _>>()?;
        sorted.sort_by(|a, b| a.0.cmp(&b.0));
        if sorted.windows(2).any(|pair| pair[0].0 == pair[1].0) {
            return Err(Error::DuplicateElement);
        }
        Ok(sorted)
    }

    /// Checks that the encodings of `elements` are strictly increasing.
    fn check_order(&self, elements: &[Value]) -> Result<(), Error> {
        let mut previous: Option<Bytes> = None;
        for (index, element) in elements.iter().enumerate() {
            let encoded = self.element().encode(element)?;
            if let Some(previous) = previous {
                match previous.cmp(&encoded) {
                    Ordering::Less => {}
                    Ordering::Equal => {
                        debug!(index, "duplicate set element");
                        return Err(Error::DuplicateElement);
                    }
                    Ordering::Greater => {
                        debug!(index, "set element out of order");
                        return Err(Error::NotSorted);
                    }
                }
            }
            previous = Some(encoded);
        }
        Ok(())
    }
}

impl Codec for SetCodec {
    fn plan<'a>(&'a self, value: &'a Value) -> Result<WritePlan<'a>, Error> {
        let plans = self
            .canonical(value)?
            .into_iter()
            .map(|(encoded, _)| {
                WritePlan::new(encoded.len(), move |dst| dst.copy_from_slice(&encoded))
            })
            .collect();
        self.vector.plan_elements(plans)
    }

    fn read(&self, buf: &[u8], offset: usize) -> Result<(Value, usize), Error> {
        let (elements, cursor) = self.vector.read_elements(buf, offset)?;
        self.check_order(&elements)?;
        Ok((Value::Set(elements), cursor))
    }

    fn to_json(&self, value: &Value) -> Result<Json, Error> {
        let sorted = self.canonical(value)?;
        self.vector.check_count(sorted.len())?;
        sorted
            .into_iter()
            .map(|(_, element)| self.element().to_json(element))
            .collect::<Result<Vec<_>, _>>()
            .map(Json::Array)
    }

    fn from_json(&self, json: &Json) -> Result<Value, Error> {
        let elements = self
            .vector
            .json_elements(json)?
            .iter()
            .map(|element| self.element().from_json(element))
            .collect::<Result<Vec<_>, _>>()?;
        self.check_order(&elements)?;
        Ok(Value::Set(elements))
    }
}
