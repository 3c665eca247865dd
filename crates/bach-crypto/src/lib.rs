//! # bach-crypto
//!
//! Cryptographic primitives for BachLedger.
//!
//! - Keccak-256 hashing
//! - EIP-55 checksummed addresses
//! - Address validation

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod error;
mod hash;

pub use address::{assert_address, is_valid_address, to_checksum_address};
pub use error::CryptoError;
pub use hash::keccak256;
