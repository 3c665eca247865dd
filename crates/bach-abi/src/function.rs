//! Call data, return data, deployment data and revert data

use bach_primitives::bytes;
use bach_primitives::U256;

use crate::decode::decode;
use crate::encode::encode;
use crate::error::{AbiError, Result};
use crate::item::{AbiItem, ItemKind, SignatureHash};
use crate::param::Parameter;
use crate::value::Value;

/// Selector of the built-in `Error(string)` revert
pub const ERROR_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// Selector of the built-in `Panic(uint256)` revert
pub const PANIC_SELECTOR: [u8; 4] = [0x4e, 0x48, 0x7b, 0x71];

/// Decoded revert data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revert {
    /// `require(false, reason)` / `revert(reason)`
    Error(String),
    /// Compiler-inserted panic
    Panic {
        /// Panic code
        code: U256,
        /// Meaning of the code
        reason: &'static str,
    },
    /// A custom error declared in the ABI
    Custom {
        /// The matching error item
        error: AbiItem,
        /// Decoded error arguments
        args: Vec<Value>,
    },
}

fn ensure_kind(item: &AbiItem, expected: ItemKind) -> Result<()> {
    if item.kind != expected {
        return Err(AbiError::UnexpectedItemKind {
            expected,
            actual: item.kind,
        });
    }
    Ok(())
}

fn split_selector(data: &[u8]) -> Result<(&[u8], &[u8])> {
    if data.len() < 4 {
        return Err(AbiError::DataTooShort {
            needed: 4,
            available: data.len(),
        });
    }
    Ok(data.split_at(4))
}

fn selector_data<F>(item: &F, args: &[Value]) -> Result<Vec<u8>>
where
    F: SignatureHash + ?Sized,
{
    let encoded = encode(&item.item().inputs, args)?;
    Ok(bytes::concat(&[&item.selector()[..], &encoded[..]]))
}

/// Selector followed by the encoded arguments
pub fn encode_function_data<F>(function: &F, args: &[Value]) -> Result<Vec<u8>>
where
    F: SignatureHash + ?Sized,
{
    ensure_kind(function.item(), ItemKind::Function)?;
    selector_data(function, args)
}

/// Decode call data, checking the selector
pub fn decode_function_data<F>(function: &F, data: &[u8]) -> Result<Vec<Value>>
where
    F: SignatureHash + ?Sized,
{
    let item = function.item();
    ensure_kind(item, ItemKind::Function)?;
    let (selector, params) = split_selector(data)?;
    let expected = function.selector();
    if selector != expected {
        return Err(AbiError::SelectorMismatch {
            expected: bytes::to_hex(&expected),
            actual: bytes::to_hex(selector),
        });
    }
    decode(&item.inputs, params)
}

/// Encode return values against the function outputs
pub fn encode_function_result(function: &AbiItem, values: &[Value]) -> Result<Vec<u8>> {
    ensure_kind(function, ItemKind::Function)?;
    encode(&function.outputs, values)
}

/// Decode return data against the function outputs
pub fn decode_function_result(function: &AbiItem, data: &[u8]) -> Result<Vec<Value>> {
    ensure_kind(function, ItemKind::Function)?;
    decode(&function.outputs, data)
}

/// Contract creation code followed by the encoded constructor arguments
pub fn encode_deploy_data(
    constructor: &AbiItem,
    bytecode: &[u8],
    args: &[Value],
) -> Result<Vec<u8>> {
    ensure_kind(constructor, ItemKind::Constructor)?;
    let encoded = encode(&constructor.inputs, args)?;
    Ok(bytes::concat(&[bytecode, &encoded[..]]))
}

/// Selector followed by the encoded error arguments
pub fn encode_error_data<F>(error: &F, args: &[Value]) -> Result<Vec<u8>>
where
    F: SignatureHash + ?Sized,
{
    ensure_kind(error.item(), ItemKind::Error)?;
    selector_data(error, args)
}

/// Decode revert data: `Error(string)`, `Panic(uint256)`, or a custom error
/// from `abi`
pub fn decode_error_data(abi: &[AbiItem], data: &[u8]) -> Result<Revert> {
    let (selector, params) = split_selector(data)?;

    if selector == ERROR_SELECTOR {
        let reason = decode(&[Parameter::new("string")], params)?;
        return match reason.into_iter().next() {
            Some(Value::String(reason)) => Ok(Revert::Error(reason)),
            _ => Err(AbiError::InvalidValue {
                ty: "string".to_string(),
                value: bytes::to_hex(params),
            }),
        };
    }
    if selector == PANIC_SELECTOR {
        let code = decode(&[Parameter::new("uint256")], params)?;
        return match code.into_iter().next() {
            Some(Value::Uint(code)) => Ok(Revert::Panic {
                code,
                reason: panic_reason(code),
            }),
            _ => Err(AbiError::InvalidValue {
                ty: "uint256".to_string(),
                value: bytes::to_hex(params),
            }),
        };
    }

    let errors: Vec<AbiItem> = abi
        .iter()
        .filter(|item| item.kind == ItemKind::Error)
        .cloned()
        .collect();
    let error = crate::resolve::extract(&errors, &bytes::to_hex(selector), None)?;
    let args = decode(&error.inputs, params)?;
    Ok(Revert::Custom { error, args })
}

/// Meaning of a Solidity panic code
pub fn panic_reason(code: U256) -> &'static str {
    if code > U256::from(u8::MAX) {
        return "unknown panic code";
    }
    match code.low_u64() {
        0x00 => "generic compiler-inserted panic",
        0x01 => "assert() called with false condition",
        0x11 => "arithmetic overflow or underflow",
        0x12 => "division or modulo by zero",
        0x21 => "invalid enum value",
        0x22 => "corrupted storage byte array",
        0x31 => ".pop() on empty array",
        0x32 => "out-of-bounds array access",
        0x41 => "too much memory allocated (out of memory)",
        0x51 => "called zero-initialized internal function pointer",
        _ => "unknown panic code",
    }
}
