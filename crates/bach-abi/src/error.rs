//! ABI error types

use bach_crypto::CryptoError;
use bach_primitives::{BytesError, NumberError};
use thiserror::Error;

use crate::item::ItemKind;

/// ABI engine error
///
/// Every variant carries the structured context of the failure so callers
/// can branch on the kind without parsing messages.
#[derive(Debug, Error)]
pub enum AbiError {
    /// Parameter count does not match value count
    #[error("ABI encoding params/values length mismatch: expected {expected}, given {given}")]
    LengthMismatch {
        /// Number of parameters
        expected: usize,
        /// Number of values
        given: usize,
    },

    /// Type string matches no ABI grammar rule
    #[error("type `{ty}` is not a valid ABI type")]
    InvalidType {
        /// Offending type string
        ty: String,
    },

    /// Array-typed parameter was given a non-array value
    #[error("value `{value}` is not a valid array")]
    InvalidArray {
        /// Offending value
        value: String,
    },

    /// Fixed-size array value has the wrong number of elements
    #[error("array length mismatch for type `{ty}`: expected {expected}, given {given}")]
    ArrayLengthMismatch {
        /// Declared array type
        ty: String,
        /// Declared length
        expected: usize,
        /// Supplied length
        given: usize,
    },

    /// Fixed-size bytes value has the wrong length
    #[error("size of bytes {actual} does not match expected size bytes{expected}")]
    BytesSizeMismatch {
        /// Declared size
        expected: usize,
        /// Supplied size
        actual: usize,
    },

    /// No ABI item matches the lookup key
    #[error("ABI item with name \"{name}\" not found")]
    ItemNotFound {
        /// Name or selector looked up
        name: String,
    },

    /// Two overloads accept the same arguments but encode them differently
    #[error(
        "found ambiguous types in overloaded ABI items: `{type_a}` in `{candidate_a}` \
         and `{type_b}` in `{candidate_b}`"
    )]
    ItemAmbiguity {
        /// Signature of the later candidate
        candidate_a: String,
        /// Conflicting type in the later candidate
        type_a: String,
        /// Signature of the earlier candidate
        candidate_b: String,
        /// Conflicting type in the earlier candidate
        type_b: String,
    },

    /// Log has fewer topics than the event has indexed parameters
    #[error("expected a topic for indexed event parameter `{parameter}` of `{event}`")]
    TopicsMismatch {
        /// Event signature
        event: String,
        /// Name (or position) of the parameter missing a topic
        parameter: String,
    },

    /// Log data is too short for the non-indexed parameters
    #[error(
        "data size of {size} bytes is too small for non-indexed event parameters \
         ({parameters}) of `{event}`"
    )]
    DataMismatch {
        /// Event signature
        event: String,
        /// Non-indexed parameters, formatted as `type name` pairs
        parameters: String,
        /// Actual data size
        size: usize,
    },

    /// First topic is not the event signature hash
    #[error("topic 0 `{actual}` does not match the signature hash `{expected}` of `{event}`")]
    SelectorTopicMismatch {
        /// Event signature
        event: String,
        /// Expected signature hash
        expected: String,
        /// Topic found in the log, or `none`
        actual: String,
    },

    /// Log has no topic 0 to look its event up by
    #[error("log has no topics to identify its event ({size} bytes of data)")]
    MissingSignatureTopic {
        /// Size of the log data
        size: usize,
    },

    /// Topic filters cannot be built for tuple or array parameters
    #[error("filter on indexed parameter of type `{ty}` is not supported")]
    FilterTypeNotSupported {
        /// Parameter type
        ty: String,
    },

    /// Data ended before a required read
    #[error("insufficient data: need {needed} bytes, have {available}")]
    DataTooShort {
        /// Bytes required for the read
        needed: usize,
        /// Bytes available
        available: usize,
    },

    /// Dynamic arrays in the data expand to more elements than the input
    /// can hold, as with offsets reused across elements
    #[error("decoded data exceeds the limit of {limit} array elements for this input")]
    ElementLimitExceeded {
        /// Element budget, one per input byte
        limit: usize,
    },

    /// Value shape does not fit its parameter type
    #[error("value `{value}` is not valid for type `{ty}`")]
    InvalidValue {
        /// Parameter type
        ty: String,
        /// Offending value
        value: String,
    },

    /// Named tuple value lacks a component
    #[error("tuple value is missing field `{name}`")]
    MissingField {
        /// Component name
        name: String,
    },

    /// Decoded string payload is not UTF-8
    #[error("string value is not valid UTF-8")]
    InvalidUtf8,

    /// Call data selector differs from the item selector
    #[error("selector `{actual}` does not match `{expected}`")]
    SelectorMismatch {
        /// Selector of the item
        expected: String,
        /// Selector found in the data
        actual: String,
    },

    /// Operation requires a different kind of ABI item
    #[error("expected {expected} item, found {actual}")]
    UnexpectedItemKind {
        /// Required kind
        expected: ItemKind,
        /// Supplied kind
        actual: ItemKind,
    },

    /// Integer out of range for its declared width
    #[error(transparent)]
    Number(#[from] NumberError),

    /// Byte-level failure (boolean decoding, oversized offsets, padding)
    #[error(transparent)]
    Bytes(#[from] BytesError),

    /// Address validation failure
    #[error(transparent)]
    Address(#[from] CryptoError),

    /// Malformed JSON ABI
    #[error("invalid ABI JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for ABI operations
pub type Result<T> = std::result::Result<T, AbiError>;
