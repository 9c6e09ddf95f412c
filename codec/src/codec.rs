//! Core codec trait and write plans

use crate::{Error, Value};
use bytes::{Bytes, BytesMut};
use serde_json::Value as Json;
use std::{fmt, sync::Arc};
use tracing::debug;

type WriteFn<'a> = Box<dyn FnOnce(&mut [u8]) + 'a>;

/// A deferred write of a known number of bytes.
///
/// Encoding happens in two steps: every codec first validates its input and returns a plan
/// holding the exact encoded length, then the top-level caller allocates a single buffer and
/// runs all plans into their (pre-computed) offsets. Composites never concatenate intermediate
/// buffers.
pub struct WritePlan<'a> {
    len: usize,
    write: WriteFn<'a>,
}

impl<'a> WritePlan<'a> {
    /// Creates a plan that writes exactly `len` bytes with `write`.
    ///
    /// `write` receives a slice of exactly `len` bytes and must fill all of it.
    pub fn new(len: usize, write: impl FnOnce(&mut [u8]) + 'a) -> Self {
        Self {
            len,
            write: Box::new(write),
        }
    }

    /// A plan that writes nothing.
    pub fn empty() -> Self {
        Self::new(0, |_| {})
    }

    /// A plan that copies `data` verbatim.
    pub fn from_slice(data: &'a [u8]) -> Self {
        Self::new(data.len(), move |dst| dst.copy_from_slice(data))
    }

    /// A plan that copies owned `data` verbatim.
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self::new(data.len(), move |dst| dst.copy_from_slice(&data))
    }

    /// Concatenates `plans`, in order.
    pub fn concat(plans: Vec<WritePlan<'a>>) -> Self {
        let len = plans.iter().map(WritePlan::len).sum();
        Self::new(len, move |dst| {
            let mut offset = 0;
            for plan in plans {
                let len = plan.len;
                plan.write(dst, offset);
                offset += len;
            }
        })
    }

    /// Returns the number of bytes this plan writes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if this plan writes nothing.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Runs the plan against `buf[offset..offset + self.len()]`.
    ///
    /// Panics if that range does not fit in `buf`.
    pub fn write(self, buf: &mut [u8], offset: usize) {
        let end = offset + self.len;
        (self.write)(&mut buf[offset..end]);
    }

    /// Allocates a buffer of the planned length and writes into it.
    pub fn into_bytes(self) -> Bytes {
        let mut buf = BytesMut::zeroed(self.len);
        self.write(&mut buf, 0);
        buf.freeze()
    }
}

impl fmt::Debug for WritePlan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WritePlan").field("len", &self.len).finish()
    }
}

/// Trait implemented by every codec, leaf or composite.
///
/// A codec is an immutable descriptor. It maps a [Value] to and from a binary encoding (via
/// [Codec::plan] and [Codec::read]) and to and from a JSON tree (via [Codec::to_json] and
/// [Codec::from_json]). Both paths apply the same validation, so a value accepted by one is
/// accepted by the other.
pub trait Codec: fmt::Debug + Send + Sync {
    /// Validates `value` and returns a plan that writes its encoding.
    ///
    /// All validation happens here: running the returned plan cannot fail.
    fn plan<'a>(&'a self, value: &'a Value) -> Result<WritePlan<'a>, Error>;

    /// Reads a value starting at `buf[offset]`.
    ///
    /// Returns the value and the offset of the first byte not consumed.
    fn read(&self, buf: &[u8], offset: usize) -> Result<(Value, usize), Error>;

    /// Converts `value` to its JSON representation.
    fn to_json(&self, value: &Value) -> Result<Json, Error>;

    /// Converts a JSON representation back to the canonical [Value].
    fn from_json(&self, json: &Json) -> Result<Value, Error>;

    /// The encoded length of every value, if it is constant.
    fn fixed_size(&self) -> Option<usize> {
        None
    }

    /// Encodes `value` into a new buffer.
    ///
    /// (Provided method).
    fn encode(&self, value: &Value) -> Result<Bytes, Error> {
        Ok(self.plan(value)?.into_bytes())
    }

    /// Decodes a value from `buf`, ensuring the buffer is fully consumed.
    ///
    /// For codecs with a fixed size, this method first checks that the buffer has the expected
    /// size.
    ///
    /// (Provided method).
    fn decode(&self, buf: &[u8]) -> Result<Value, Error> {
        // If we can, before reading, check that the buffer has the expected size.
        if let Some(size) = self.fixed_size() {
            if buf.len() < size {
                return Err(Error::EndOfBuffer);
            }
            if buf.len() > size {
                return Err(Error::ExtraData(buf.len() - size));
            }
        }

        let (value, cursor) = self.read(buf, 0)?;

        // Check that the buffer is fully consumed.
        let remaining = buf.len() - cursor;
        if remaining > 0 {
            debug!(len = buf.len(), cursor, "trailing bytes after value");
            return Err(Error::ExtraData(remaining));
        }

        Ok(value)
    }

    /// Serializes `value` to JSON text.
    ///
    /// (Provided method).
    fn stringify(&self, value: &Value) -> Result<String, Error> {
        Ok(serde_json::to_string(&self.to_json(value)?)?)
    }

    /// Parses JSON text into a canonical [Value].
    ///
    /// (Provided method).
    fn parse(&self, text: &str) -> Result<Value, Error> {
        let json: Json = serde_json::from_str(text)?;
        self.from_json(&json)
    }
}

// Shared descriptors are codecs themselves.
impl<C: Codec + ?Sized> Codec for Arc<C> {
    fn plan<'a>(&'a self, value: &'a Value) -> Result<WritePlan<'a>, Error> {
        (**self).plan(value)
    }

    fn read(&self, buf: &[u8], offset: usize) -> Result<(Value, usize), Error> {
        (**self).read(buf, offset)
    }

    fn to_json(&self, value: &Value) -> Result<Json, Error> {
        (**self).to_json(value)
    }

    fn from_json(&self, json: &Json) -> Result<Value, Error> {
        (**self).from_json(json)
    }

    fn fixed_size(&self) -> Option<usize> {
        (**self).fixed_size()
    }
}

/// A child codec held by a composite.
pub type Shared = Arc<dyn Codec>;
