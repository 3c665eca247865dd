//! # bach-abi
//!
//! Ethereum contract ABI engine for BachLedger.
//!
//! ## Features
//!
//! - **Codec**: head/tail ABI encoding and decoding of [`Value`]s
//! - **Packed**: `abi.encodePacked` style concatenation
//! - **Resolver**: item lookup by name or selector with overload selection
//! - **Events**: log filter topics and log decoding
//! - **Calls**: call data, return data, constructor data and revert reasons
//!
//! Items are described with the Solidity JSON ABI model ([`Abi`],
//! [`AbiItem`], [`Parameter`]). Every operation is a pure function over its
//! inputs.
//!
//! ## Quick Start
//!
//! ```rust
//! use bach_abi::{decode, encode, Abi, Value};
//! use bach_primitives::U256;
//!
//! # fn main() -> Result<(), bach_abi::AbiError> {
//! let abi = Abi::from_json(
//!     r#"[{"type":"function","name":"transfer","inputs":[
//!         {"name":"to","type":"address"},{"name":"amount","type":"uint256"}]}]"#,
//! )?;
//! let transfer = abi.extract("transfer", None)?;
//!
//! let args = vec![
//!     Value::from("0x742d35cc6634c0532925a3b844bc9e7595f0ab3d"),
//!     Value::Uint(U256::from(1000)),
//! ];
//! let data = bach_abi::encode_function_data(&transfer, &args)?;
//! assert_eq!(&data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
//!
//! let encoded = encode(&transfer.inputs, &args)?;
//! let decoded = decode(&transfer.inputs, &encoded)?;
//! assert_eq!(decoded[1], Value::Uint(U256::from(1000)));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod decode;
mod encode;
mod error;
mod event;
mod function;
mod item;
mod packed;
mod param;
mod resolve;
mod ty;
mod value;

pub use decode::{decode, decode_types, decode_with, DecodeOptions, Decoded, Shape};
pub use encode::{assemble, encode, encode_types, prepare, PreparedValue};
pub use error::{AbiError, Result};
pub use event::{
    decode_event_log, decode_log, encode_event_topics, DecodedLog, EventArgs, Log, Topic,
};
pub use function::{
    decode_error_data, decode_function_data, decode_function_result, encode_deploy_data,
    encode_error_data, encode_function_data, encode_function_result, panic_reason, Revert,
    ERROR_SELECTOR, PANIC_SELECTOR,
};
pub use item::{Abi, AbiItem, ItemKind, PreparedItem, SignatureHash};
pub use packed::{encode_packed, encode_packed_hex};
pub use param::Parameter;
pub use resolve::{extract, is_arg_of_type};
pub use ty::{ParamType, TupleField};
pub use value::Value;
