//! Cryptographic errors

use thiserror::Error;

/// Cryptographic operation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// String is not a 0x-prefixed 20-byte hex address
    #[error("address \"{0}\" is invalid")]
    InvalidAddress(String),

    /// Mixed-case address whose casing does not match its EIP-55 checksum
    #[error("address \"{0}\" has an invalid checksum")]
    InvalidChecksum(String),
}
