//! Byte-sequence helpers used by the ABI codecs
//!
//! Every helper that can fail on caller-supplied sizes or offsets returns a
//! [`BytesError`] instead of panicking.

use primitive_types::U256;
use thiserror::Error;

/// Size of one ABI word in bytes
pub const WORD_SIZE: usize = 32;

/// Byte manipulation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BytesError {
    /// Data is larger than the size it should be padded to
    #[error("size {size} exceeds padding size {target}")]
    SizeExceedsPadding {
        /// Size of the data
        size: usize,
        /// Requested padded size
        target: usize,
    },

    /// Word is not a canonical boolean (0 or 1)
    #[error("bytes 0x{0} are not a valid boolean")]
    InvalidBoolean(String),

    /// Word holds a value that does not fit in `usize`
    #[error("value {0} does not fit in usize")]
    UsizeOverflow(String),

    /// Malformed hex string
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
}

/// Round `len` up to the next multiple of [`WORD_SIZE`]
pub fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD_SIZE) * WORD_SIZE
}

/// Right-pad `bytes` with zeros to `target` bytes
pub fn pad_right(bytes: &[u8], target: usize) -> Result<Vec<u8>, BytesError> {
    if bytes.len() > target {
        return Err(BytesError::SizeExceedsPadding {
            size: bytes.len(),
            target,
        });
    }
    let mut out = bytes.to_vec();
    out.resize(target, 0);
    Ok(out)
}

/// Concatenate byte sequences in order
pub fn concat<T: AsRef<[u8]>>(parts: &[T]) -> Vec<u8> {
    let total = parts.iter().map(|p| p.as_ref().len()).sum();
    let mut out = Vec::with_capacity(total);
    for part in parts {
        out.extend_from_slice(part.as_ref());
    }
    out
}

/// Decode a boolean word: every byte but the last must be zero and the
/// last must be 0 or 1.
pub fn to_bool(bytes: &[u8]) -> Result<bool, BytesError> {
    let invalid = || BytesError::InvalidBoolean(hex::encode(bytes));
    let (last, rest) = bytes.split_last().ok_or_else(invalid)?;
    if rest.iter().any(|b| *b != 0) {
        return Err(invalid());
    }
    match last {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(invalid()),
    }
}

/// Interpret a big-endian word as an offset or length
pub fn to_usize(bytes: &[u8]) -> Result<usize, BytesError> {
    let value = U256::from_big_endian(bytes);
    if value > U256::from(usize::MAX) {
        return Err(BytesError::UsizeOverflow(value.to_string()));
    }
    Ok(value.low_u64() as usize)
}

/// Encode a `usize` as a 32-byte big-endian word
pub fn usize_word(value: usize) -> [u8; WORD_SIZE] {
    let mut word = [0u8; WORD_SIZE];
    U256::from(value).to_big_endian(&mut word);
    word
}

/// Check that `s` is a `0x`-prefixed, even-length hex string
pub fn is_hex(s: &str) -> bool {
    match s.strip_prefix("0x") {
        Some(digits) => digits.len() % 2 == 0 && digits.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}

/// Decode a hex string, with or without the `0x` prefix
pub fn from_hex(s: &str) -> Result<Vec<u8>, BytesError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(digits).map_err(|e| BytesError::InvalidHex(e.to_string()))
}

/// Encode bytes as a lower-case `0x`-prefixed hex string
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}
