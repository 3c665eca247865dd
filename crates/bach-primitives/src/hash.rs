//! 256-bit hash type

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Hash parsing error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashError {
    /// Invalid hex string
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    /// Invalid length
    #[error("invalid hash length: expected {expected} bytes, got {got}")]
    InvalidLength {
        /// Required length
        expected: usize,
        /// Supplied length
        got: usize,
    },
}

/// 256-bit hash (32 bytes)
///
/// Used for Keccak-256 digests, event signature hashes and log topics.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct H256([u8; 32]);

impl H256 {
    /// Size in bytes
    pub const LEN: usize = 32;

    /// Zero hash
    pub const ZERO: H256 = H256([0u8; 32]);

    /// Create from bytes
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        H256(bytes)
    }

    /// Create from slice
    pub fn from_slice(slice: &[u8]) -> Result<Self, HashError> {
        let bytes: [u8; 32] = slice.try_into().map_err(|_| HashError::InvalidLength {
            expected: Self::LEN,
            got: slice.len(),
        })?;
        Ok(H256(bytes))
    }

    /// Parse from hex string
    pub fn from_hex(s: &str) -> Result<Self, HashError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| HashError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Get as bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H256({})", self.to_hex())
    }
}

impl fmt::Display for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for H256 {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; 32]> for H256 {
    fn from(bytes: [u8; 32]) -> Self {
        H256(bytes)
    }
}

impl AsRef<[u8]> for H256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
