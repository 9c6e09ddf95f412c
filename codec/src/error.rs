//! Error types for codec operations

use thiserror::Error;

/// Error type for codec operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("unexpected end of buffer")]
    EndOfBuffer,
    #[error("extra data found: {0} bytes")]
    ExtraData(usize),
    #[error("invalid varuint")]
    InvalidVarint,
    #[error("value is negative: {0}")]
    Negative(String),
    #[error("value overflow: {0} not in [{1}, {2}]")]
    Overflow(String, String, String), // value, min, max
    #[error("value is not a safe integer: {0}")]
    NotSafeInteger(String),
    #[error("value is not an integer: {0}")]
    NotInteger(String),
    #[error("invalid type: expected {expected}, found {found}")]
    InvalidType {
        expected: &'static str,
        found: &'static str,
    },
    #[error("invalid bool: {0}")]
    InvalidBool(u8),
    #[error("invalid nullable flag: {0}")]
    InvalidFlag(u8),
    #[error("unknown discriminant: {0}")]
    UnknownDiscriminant(u64),
    #[error("set contains duplicate elements")]
    DuplicateElement,
    #[error("set elements are not sorted")]
    NotSorted,
    #[error("invalid length: {0}")]
    InvalidLength(usize),
    #[error("invalid size: expected {expected}, found {found}")]
    InvalidSize { expected: usize, found: usize },
    #[error("missing field: {0}")]
    MissingField(String),
    #[error("invalid width: {0}")]
    InvalidWidth(usize),
    #[error("invalid decimal places: {0}")]
    InvalidPlaces(usize),
    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),
    #[error("invalid data in {0}: {1}")]
    InvalidData(&'static str, String), // context, message
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("too many decimal places: {0}")]
    TooManyDecimals(String),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}
