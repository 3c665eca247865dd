//! Non-standard packed encoding (`abi.encodePacked`)
//!
//! Values are concatenated with no offsets and no length prefixes. Scalars
//! take their natural width, except inside arrays where every element other
//! than `bytes` and `string` is padded to a full word.

use bach_primitives::bytes::{self, WORD_SIZE};
use bach_primitives::Address;

use crate::encode::prepare;
use crate::error::{AbiError, Result};
use crate::ty::ParamType;
use crate::value::Value;

/// Packed-encode `values` against bare type strings
pub fn encode_packed<S: AsRef<str>>(types: &[S], values: &[Value]) -> Result<Vec<u8>> {
    if types.len() != values.len() {
        return Err(AbiError::LengthMismatch {
            expected: types.len(),
            given: values.len(),
        });
    }
    let mut out = Vec::new();
    for (ty, value) in types.iter().zip(values) {
        let ty = ParamType::parse(ty.as_ref())?;
        pack(&ty, value, false, &mut out)?;
    }
    Ok(out)
}

fn pack(ty: &ParamType, value: &Value, in_array: bool, out: &mut Vec<u8>) -> Result<()> {
    match ty {
        ParamType::Address if !in_array => {
            let word = prepare(ty, value)?.encoded;
            out.extend_from_slice(&word[WORD_SIZE - Address::LEN..]);
        }
        ParamType::Bool | ParamType::Uint(_) | ParamType::Int(_) if !in_array => {
            let word = prepare(ty, value)?.encoded;
            let width = match ty {
                ParamType::Uint(bits) | ParamType::Int(bits) => bits / 8,
                _ => 1,
            };
            out.extend_from_slice(&word[WORD_SIZE - width..]);
        }
        ParamType::FixedBytes(size) if !in_array => {
            let data = value.as_bytes().ok_or_else(|| AbiError::InvalidValue {
                ty: ty.to_string(),
                value: value.to_string(),
            })?;
            if data.len() != *size {
                return Err(AbiError::BytesSizeMismatch {
                    expected: *size,
                    actual: data.len(),
                });
            }
            out.extend_from_slice(&data);
        }
        // full 32-byte slot inside arrays
        ParamType::Address
        | ParamType::Bool
        | ParamType::Uint(_)
        | ParamType::Int(_)
        | ParamType::FixedBytes(_) => {
            out.extend(prepare(ty, value)?.encoded);
        }
        ParamType::Bytes => {
            let data = value.as_bytes().ok_or_else(|| AbiError::InvalidValue {
                ty: ty.to_string(),
                value: value.to_string(),
            })?;
            out.extend_from_slice(&data);
        }
        ParamType::String => {
            let s = value.as_str().ok_or_else(|| AbiError::InvalidValue {
                ty: ty.to_string(),
                value: value.to_string(),
            })?;
            out.extend_from_slice(s.as_bytes());
        }
        ParamType::Array(inner) | ParamType::FixedArray(inner, _) => {
            let items = match value {
                Value::Array(items) => items,
                _ => {
                    return Err(AbiError::InvalidArray {
                        value: value.to_string(),
                    })
                }
            };
            if let ParamType::FixedArray(_, size) = ty {
                if items.len() != *size {
                    return Err(AbiError::ArrayLengthMismatch {
                        ty: ty.to_string(),
                        expected: *size,
                        given: items.len(),
                    });
                }
            }
            for item in items {
                pack(inner, item, true, out)?;
            }
        }
        // tuples have no packed form
        ParamType::Tuple(_) => {
            return Err(AbiError::InvalidType { ty: ty.to_string() });
        }
    }
    Ok(())
}

/// Hex of a packed encoding, mostly for fixtures and logs
pub fn encode_packed_hex<S: AsRef<str>>(types: &[S], values: &[Value]) -> Result<String> {
    Ok(bytes::to_hex(&encode_packed(types, values)?))
}
