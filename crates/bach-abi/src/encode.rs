//! ABI encoding
//!
//! Encoding runs in two passes. [`prepare`] turns each value into a
//! [`PreparedValue`], then [`assemble`] lays the prepared values out as a
//! head of static slots and offsets followed by the dynamic tails.

use bach_crypto::assert_address;
use bach_primitives::bytes::{self, WORD_SIZE};
use bach_primitives::int::{encode_int, encode_number, encode_uint};
use bach_primitives::I256;

use crate::error::{AbiError, Result};
use crate::param::Parameter;
use crate::ty::{ParamType, TupleField};
use crate::value::Value;

/// One encoded parameter, before head/tail layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedValue {
    /// Placed in the tail behind an offset word
    pub dynamic: bool,
    /// Tail content for dynamic values, slot content for static ones
    pub encoded: Vec<u8>,
}

/// Encode values with the Solidity ABI head/tail layout
pub fn encode(params: &[Parameter], values: &[Value]) -> Result<Vec<u8>> {
    if params.len() != values.len() {
        return Err(AbiError::LengthMismatch {
            expected: params.len(),
            given: values.len(),
        });
    }
    let types = params
        .iter()
        .map(ParamType::from_param)
        .collect::<Result<Vec<_>>>()?;
    encode_types(&types, values)
}

/// Encode values against already classified types
pub fn encode_types(types: &[ParamType], values: &[Value]) -> Result<Vec<u8>> {
    if types.len() != values.len() {
        return Err(AbiError::LengthMismatch {
            expected: types.len(),
            given: values.len(),
        });
    }
    let prepared = types
        .iter()
        .zip(values)
        .map(|(ty, value)| prepare(ty, value))
        .collect::<Result<Vec<_>>>()?;
    Ok(assemble(&prepared))
}

/// Lay out prepared values as head ++ tail
///
/// Offsets are relative to the start of the returned buffer.
pub fn assemble(prepared: &[PreparedValue]) -> Vec<u8> {
    let static_size: usize = prepared
        .iter()
        .map(|p| if p.dynamic { WORD_SIZE } else { p.encoded.len() })
        .sum();

    let mut head = Vec::with_capacity(static_size);
    let mut tail = Vec::new();
    for p in prepared {
        if p.dynamic {
            head.extend_from_slice(&bytes::usize_word(static_size + tail.len()));
            tail.extend_from_slice(&p.encoded);
        } else {
            head.extend_from_slice(&p.encoded);
        }
    }

    head.extend(tail);
    head
}

fn invalid_value(ty: &ParamType, value: &Value) -> AbiError {
    AbiError::InvalidValue {
        ty: ty.to_string(),
        value: value.to_string(),
    }
}

fn fixed(encoded: impl Into<Vec<u8>>) -> PreparedValue {
    PreparedValue {
        dynamic: false,
        encoded: encoded.into(),
    }
}

/// Encode a single value against its type
pub fn prepare(ty: &ParamType, value: &Value) -> Result<PreparedValue> {
    match ty {
        ParamType::Address => {
            let address = match value {
                Value::Address(address) => *address,
                Value::String(s) => assert_address(s, false)?,
                _ => return Err(invalid_value(ty, value)),
            };
            Ok(fixed(address.to_word()))
        }
        ParamType::Bool => match value {
            Value::Bool(b) => Ok(fixed(bytes::usize_word(usize::from(*b)))),
            _ => Err(invalid_value(ty, value)),
        },
        ParamType::Uint(bits) => {
            let word = match value {
                Value::Uint(v) => encode_uint(v, *bits)?,
                Value::Int(v) => encode_number(v, *bits, false)?,
                _ => return Err(invalid_value(ty, value)),
            };
            Ok(fixed(word))
        }
        ParamType::Int(bits) => {
            let word = match value {
                Value::Int(v) => encode_int(v, *bits)?,
                Value::Uint(v) => encode_int(&I256::from(*v), *bits)?,
                _ => return Err(invalid_value(ty, value)),
            };
            Ok(fixed(word))
        }
        ParamType::FixedBytes(size) => {
            let data = value.as_bytes().ok_or_else(|| invalid_value(ty, value))?;
            if data.len() != *size {
                return Err(AbiError::BytesSizeMismatch {
                    expected: *size,
                    actual: data.len(),
                });
            }
            Ok(fixed(bytes::pad_right(&data, WORD_SIZE)?))
        }
        ParamType::Bytes => {
            let data = value.as_bytes().ok_or_else(|| invalid_value(ty, value))?;
            Ok(PreparedValue {
                dynamic: true,
                encoded: encode_dynamic_bytes(&data)?,
            })
        }
        ParamType::String => {
            let s = value.as_str().ok_or_else(|| invalid_value(ty, value))?;
            Ok(PreparedValue {
                dynamic: true,
                encoded: encode_dynamic_bytes(s.as_bytes())?,
            })
        }
        ParamType::Tuple(fields) => {
            let items = tuple_items(fields, value)?;
            let prepared = fields
                .iter()
                .zip(items)
                .map(|(field, item)| prepare(&field.kind, item))
                .collect::<Result<Vec<_>>>()?;
            Ok(PreparedValue {
                dynamic: ty.is_dynamic(),
                encoded: assemble(&prepared),
            })
        }
        ParamType::FixedArray(inner, size) => {
            let items = array_items(value)?;
            if items.len() != *size {
                return Err(AbiError::ArrayLengthMismatch {
                    ty: ty.to_string(),
                    expected: *size,
                    given: items.len(),
                });
            }
            let prepared = prepare_elements(inner, items)?;
            Ok(PreparedValue {
                dynamic: inner.is_dynamic(),
                encoded: assemble(&prepared),
            })
        }
        ParamType::Array(inner) => {
            let items = array_items(value)?;
            let prepared = prepare_elements(inner, items)?;
            let mut encoded = bytes::usize_word(items.len()).to_vec();
            encoded.extend(assemble(&prepared));
            Ok(PreparedValue {
                dynamic: true,
                encoded,
            })
        }
    }
}

/// Length word followed by the payload right-padded to a word boundary
fn encode_dynamic_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoded = bytes::usize_word(data.len()).to_vec();
    encoded.extend(bytes::pad_right(data, bytes::padded_len(data.len()))?);
    Ok(encoded)
}

fn array_items(value: &Value) -> Result<&[Value]> {
    match value {
        Value::Array(items) => Ok(items),
        _ => Err(AbiError::InvalidArray {
            value: value.to_string(),
        }),
    }
}

fn prepare_elements(inner: &ParamType, items: &[Value]) -> Result<Vec<PreparedValue>> {
    items.iter().map(|item| prepare(inner, item)).collect()
}

/// Line up a tuple value with its fields, by position or by name
fn tuple_items<'a>(fields: &[TupleField], value: &'a Value) -> Result<Vec<&'a Value>> {
    match value {
        Value::Tuple(items) | Value::Array(items) => {
            if items.len() != fields.len() {
                return Err(AbiError::LengthMismatch {
                    expected: fields.len(),
                    given: items.len(),
                });
            }
            Ok(items.iter().collect())
        }
        Value::Struct(entries) => fields
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let found = match &field.name {
                    Some(name) => entries.iter().find(|(n, _)| n == name),
                    None => entries.get(i),
                };
                found.map(|(_, v)| v).ok_or_else(|| AbiError::MissingField {
                    name: field.name.clone().unwrap_or_else(|| i.to_string()),
                })
            })
            .collect(),
        _ => Err(AbiError::InvalidValue {
            ty: ParamType::Tuple(fields.to_vec()).to_string(),
            value: value.to_string(),
        }),
    }
}
