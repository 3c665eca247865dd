//! # bach-primitives
//!
//! Wire-format primitives shared by the BachLedger crates.
//!
//! - [`Address`] and [`H256`] fixed-size byte types
//! - [`U256`] (re-exported from `primitive-types`) and the signed [`I256`]
//! - [`bytes`] helpers: padding, concatenation, word and hex conversion
//! - [`int`] encoders that validate a value against a declared bit width

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
pub mod bytes;
mod hash;
pub mod int;

pub use address::{Address, AddressError};
pub use bytes::{BytesError, WORD_SIZE};
pub use hash::{HashError, H256};
pub use int::{NumberError, I256};

// Re-export primitive-types for U256
pub use primitive_types::U256;
