//! Records of named fields.

use crate::{codec::Shared, util::json_kind, Codec, Error, Value, WritePlan};
use serde_json::{Map, Value as Json};
use std::sync::Arc;

/// A record of named fields, written as the concatenation of each field in declaration order.
///
/// Decodes to [Value::Struct] with fields in declaration order. Inputs are matched by field name:
/// a missing field fails with [Error::MissingField] and unknown fields are ignored.
#[derive(Clone, Debug, Default)]
pub struct StructCodec {
    fields: Vec<(String, Shared)>,
}

impl StructCodec {
    /// Creates a struct from `(name, codec)` pairs, in wire order.
    ///
    /// A repeated name replaces the earlier field's codec in its original position.
    pub fn new<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Shared)>,
    {
        Self::default().extend(fields)
    }

    /// Appends a field.
    pub fn field(mut self, name: impl Into<String>, codec: impl Codec + 'static) -> Self {
        self.insert(name.into(), Arc::new(codec));
        self
    }

    /// Returns a new struct with the fields of `self` followed by `fields`.
    ///
    /// A field of `fields` whose name is already present replaces that field in place.
    pub fn extend<K, I>(&self, fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Shared)>,
    {
        let mut extended = self.clone();
        for (name, codec) in fields {
            extended.insert(name.into(), codec);
        }
        extended
    }

    fn insert(&mut self, name: String, codec: Shared) {
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = codec,
            None => self.fields.push((name, codec)),
        }
    }

    /// The fields, in wire order.
    pub fn fields(&self) -> &[(String, Shared)] {
        &self.fields
    }

    fn input<'a>(value: &'a Value, name: &str) -> Result<&'a Value, Error> {
        let Value::Struct(_) = value else {
            return Err(value.type_error("struct"));
        };
        value
            .field(name)
            .ok_or_else(|| Error::MissingField(name.to_string()))
    }
}

impl Codec for StructCodec {
    fn plan<'a>(&'a self, value: &'a Value) -> Result<WritePlan<'a>, Error> {
        let plans = self
            .fields
            .iter()
            .map(|(name, codec)| codec.plan(Self::input(value, name)?))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(WritePlan::concat(plans))
    }

    fn read(&self, buf: &[u8], offset: usize) -> Result<(Value, usize), Error> {
        let mut cursor = offset;
        let mut fields = Vec::with_capacity(self.fields.len());
        for (name, codec) in &self.fields {
            let (value, next) = codec.read(buf, cursor)?;
            fields.push((name.clone(), value));
            cursor = next;
        }
        Ok((Value::Struct(fields), cursor))
    }

    fn to_json(&self, value: &Value) -> Result<Json, Error> {
        let mut map = Map::with_capacity(self.fields.len());
        for (name, codec) in &self.fields {
            map.insert(name.clone(), codec.to_json(Self::input(value, name)?)?);
        }
        Ok(Json::Object(map))
    }

    fn from_json(&self, json: &Json) -> Result<Value, Error> {
        let Json::Object(map) = json else {
            return Err(Error::InvalidType {
                expected: "object",
                found: json_kind(json),
            });
        };
        let fields = self
            .fields
            .iter()
            .map(|(name, codec)| {
                let json = map
                    .get(name)
                    .ok_or_else(|| Error::MissingField(name.clone()))?;
                Ok((name.clone(), codec.from_json(json)?))
            })
            .collect::<Result<Vec<_>, Error>>()?;
        Ok(Value::Struct(fields))
    }

    fn fixed_size(&self) -> Option<usize> {
        self.fields
            .iter()
            .map(|(_, codec)| codec.fixed_size())
            .sum()
    }
}
