//! ABI decoding

use std::iter;

use bach_primitives::bytes::{self, WORD_SIZE};
use bach_primitives::{Address, I256, U256};
use serde::{Deserialize, Serialize};

use crate::error::{AbiError, Result};
use crate::param::Parameter;
use crate::ty::{ParamType, TupleField};
use crate::value::Value;

/// Shape of a top-level decode result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// Values in parameter order
    #[default]
    Array,
    /// Values keyed by parameter name, or by index when unnamed
    Object,
}

/// Options for [`decode_with`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Result shape
    pub shape: Shape,
}

impl DecodeOptions {
    /// Named results
    pub fn object() -> Self {
        Self {
            shape: Shape::Object,
        }
    }
}

/// Decoded parameter list, positional or keyed by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// Values in parameter order
    Positional(Vec<Value>),
    /// `(name, value)` pairs in parameter order; unnamed parameters are
    /// keyed by their index
    Named(Vec<(String, Value)>),
}

impl Decoded {
    /// Value by name; positional results accept the index as a string
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Decoded::Positional(values) => name.parse::<usize>().ok().and_then(|i| values.get(i)),
            Decoded::Named(entries) => entries.iter().find(|(n, _)| n == name).map(|(_, v)| v),
        }
    }

    /// Value by position
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        match self {
            Decoded::Positional(values) => values.get(index),
            Decoded::Named(entries) => entries.get(index).map(|(_, v)| v),
        }
    }

    /// Number of values
    pub fn len(&self) -> usize {
        match self {
            Decoded::Positional(values) => values.len(),
            Decoded::Named(entries) => entries.len(),
        }
    }

    /// No values
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values in parameter order, dropping names
    pub fn into_values(self) -> Vec<Value> {
        match self {
            Decoded::Positional(values) => values,
            Decoded::Named(entries) => entries.into_iter().map(|(_, v)| v).collect(),
        }
    }

    /// As a single value: `Array` when positional, `Struct` when named
    pub fn into_value(self) -> Value {
        match self {
            Decoded::Positional(values) => Value::Array(values),
            Decoded::Named(entries) => Value::Struct(entries),
        }
    }
}

/// Decode values from ABI-encoded data
///
/// Bytes after the last referenced region are ignored.
pub fn decode(params: &[Parameter], data: &[u8]) -> Result<Vec<Value>> {
    let types = params
        .iter()
        .map(ParamType::from_param)
        .collect::<Result<Vec<_>>>()?;
    decode_types(&types, data)
}

/// Decode with options controlling the result shape
pub fn decode_with(
    params: &[Parameter],
    data: &[u8],
    options: &DecodeOptions,
) -> Result<Decoded> {
    let values = decode(params, data)?;
    Ok(match options.shape {
        Shape::Array => Decoded::Positional(values),
        Shape::Object => Decoded::Named(key_by_name(params, values)),
    })
}

/// Pair values with their parameter names, falling back to the index
pub(crate) fn key_by_name(params: &[Parameter], values: Vec<Value>) -> Vec<(String, Value)> {
    params
        .iter()
        .zip(values)
        .enumerate()
        .map(|(i, (param, value))| {
            let key = param.name().map_or_else(|| i.to_string(), str::to_string);
            (key, value)
        })
        .collect()
}

/// Decode values against already classified types
///
/// Dynamic array elements are charged against a budget of one element per
/// input byte, so offsets that point several elements at the same block
/// cannot expand the output beyond the size of `data`.
pub fn decode_types(types: &[ParamType], data: &[u8]) -> Result<Vec<Value>> {
    let mut budget = Budget::new(data.len());
    decode_sequence(types.iter(), data, &mut budget)
}

/// Remaining dynamic array elements a decode may produce
struct Budget {
    limit: usize,
    remaining: usize,
}

impl Budget {
    fn new(limit: usize) -> Self {
        Self {
            limit,
            remaining: limit,
        }
    }

    fn charge(&mut self, elements: usize) -> Result<()> {
        self.remaining = self
            .remaining
            .checked_sub(elements)
            .ok_or(AbiError::ElementLimitExceeded { limit: self.limit })?;
        Ok(())
    }
}

/// Decode consecutive head slots; offsets are relative to `region`
fn decode_sequence<'a>(
    types: impl Iterator<Item = &'a ParamType>,
    region: &[u8],
    budget: &mut Budget,
) -> Result<Vec<Value>> {
    let mut offset = 0usize;
    let mut values = Vec::new();
    for ty in types {
        values.push(decode_at(ty, region, offset, budget)?);
        offset = offset.checked_add(ty.head_size()).ok_or(AbiError::DataTooShort {
            needed: usize::MAX,
            available: region.len(),
        })?;
    }
    Ok(values)
}

fn decode_at(
    ty: &ParamType,
    region: &[u8],
    offset: usize,
    budget: &mut Budget,
) -> Result<Value> {
    if !ty.is_dynamic() {
        return decode_static(ty, region, offset, budget);
    }
    let start = bytes::to_usize(read_word(region, offset)?)?;
    let tail = region.get(start..).ok_or(AbiError::DataTooShort {
        needed: start,
        available: region.len(),
    })?;
    decode_dynamic(ty, tail, budget)
}

fn decode_static(
    ty: &ParamType,
    region: &[u8],
    offset: usize,
    budget: &mut Budget,
) -> Result<Value> {
    match ty {
        ParamType::Address => Ok(Value::Address(Address::from_word(read_word(region, offset)?))),
        ParamType::Bool => Ok(Value::Bool(bytes::to_bool(read_word(region, offset)?)?)),
        ParamType::Uint(_) => Ok(Value::Uint(U256::from_big_endian(read_word(region, offset)?))),
        ParamType::Int(_) => Ok(Value::Int(I256::from_be_bytes(read_word(region, offset)?))),
        ParamType::FixedBytes(size) => {
            let word = read_word(region, offset)?;
            Ok(Value::Bytes(word[..*size].to_vec()))
        }
        ParamType::FixedArray(inner, size) => {
            let sub = sub_region(region, offset)?;
            Ok(Value::Array(decode_sequence(
                iter::repeat(&**inner).take(*size),
                sub,
                budget,
            )?))
        }
        ParamType::Tuple(fields) => {
            let sub = sub_region(region, offset)?;
            let values = decode_sequence(fields.iter().map(|f| &f.kind), sub, budget)?;
            Ok(tuple_value(fields, values))
        }
        ParamType::Bytes | ParamType::String | ParamType::Array(_) => {
            decode_at(ty, region, offset, budget)
        }
    }
}

fn decode_dynamic(ty: &ParamType, tail: &[u8], budget: &mut Budget) -> Result<Value> {
    match ty {
        ParamType::Bytes => Ok(Value::Bytes(read_sized(tail)?.to_vec())),
        ParamType::String => {
            let raw = read_sized(tail)?;
            let s = std::str::from_utf8(raw).map_err(|_| AbiError::InvalidUtf8)?;
            Ok(Value::String(s.to_string()))
        }
        ParamType::Array(inner) => {
            let count = bytes::to_usize(read_word(tail, 0)?)?;
            let elements = &tail[WORD_SIZE..];
            // Each element takes at least its head size; reject counts the
            // data cannot hold before allocating
            let needed = match inner.head_size() {
                0 => count,
                size => count.checked_mul(size).unwrap_or(usize::MAX),
            };
            if needed > elements.len() {
                return Err(AbiError::DataTooShort {
                    needed,
                    available: elements.len(),
                });
            }
            budget.charge(count)?;
            Ok(Value::Array(decode_sequence(
                iter::repeat(&**inner).take(count),
                elements,
                budget,
            )?))
        }
        ParamType::FixedArray(inner, size) => Ok(Value::Array(decode_sequence(
            iter::repeat(&**inner).take(*size),
            tail,
            budget,
        )?)),
        ParamType::Tuple(fields) => {
            let values = decode_sequence(fields.iter().map(|f| &f.kind), tail, budget)?;
            Ok(tuple_value(fields, values))
        }
        _ => decode_static(ty, tail, 0, budget),
    }
}

/// `Struct` when every component is named, otherwise `Tuple`
fn tuple_value(fields: &[TupleField], values: Vec<Value>) -> Value {
    if !fields.is_empty() && fields.iter().all(|f| f.name.is_some()) {
        let entries = fields
            .iter()
            .zip(values)
            .map(|(f, v)| (f.name.clone().unwrap_or_default(), v))
            .collect();
        Value::Struct(entries)
    } else {
        Value::Tuple(values)
    }
}

fn sub_region(region: &[u8], offset: usize) -> Result<&[u8]> {
    region.get(offset..).ok_or(AbiError::DataTooShort {
        needed: offset,
        available: region.len(),
    })
}

/// Borrow the 32-byte word at `offset`
fn read_word(data: &[u8], offset: usize) -> Result<&[u8; WORD_SIZE]> {
    let end = offset.checked_add(WORD_SIZE).unwrap_or(usize::MAX);
    data.get(offset..end)
        .and_then(|word| word.try_into().ok())
        .ok_or(AbiError::DataTooShort {
            needed: end,
            available: data.len(),
        })
}

/// Length word followed by that many payload bytes
fn read_sized(tail: &[u8]) -> Result<&[u8]> {
    let len = bytes::to_usize(read_word(tail, 0)?)?;
    let end = WORD_SIZE.checked_add(len).unwrap_or(usize::MAX);
    tail.get(WORD_SIZE..end).ok_or(AbiError::DataTooShort {
        needed: end,
        available: tail.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(types: &[&str]) -> Vec<Parameter> {
        types.iter().map(|t| Parameter::new(*t)).collect()
    }

    fn word(last: u8) -> [u8; 32] {
        let mut w = [0u8; 32];
        w[31] = last;
        w
    }

    #[test]
    fn test_decode_address() {
        let addr = Address::from_hex("0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d").unwrap();
        let values = decode(&params(&["address"]), &addr.to_word()).unwrap();
        assert_eq!(values, vec![Value::Address(addr)]);
    }

    #[test]
    fn test_decode_uint_and_bool() {
        let mut data = word(100).to_vec();
        data.extend(word(1));
        let values = decode(&params(&["uint256", "bool"]), &data).unwrap();
        assert_eq!(values, vec![Value::Uint(U256::from(100)), Value::Bool(true)]);
    }

    #[test]
    fn test_decode_invalid_bool() {
        let err = decode(&params(&["bool"]), &word(2)).unwrap_err();
        assert!(matches!(err, AbiError::Bytes(_)));
    }

    #[test]
    fn test_decode_int_negative() {
        let values = decode(&params(&["int256"]), &[0xff; 32]).unwrap();
        assert_eq!(values, vec![Value::Int(I256::from(-1i64))]);
    }

    #[test]
    fn test_decode_fixed_bytes() {
        let mut data = [0u8; 32];
        data[..4].copy_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        let values = decode(&params(&["bytes4"]), &data).unwrap();
        assert_eq!(values, vec![Value::Bytes(vec![0xde, 0xad, 0xbe, 0xef])]);
    }

    #[test]
    fn test_decode_string() {
        let mut data = word(0x20).to_vec();
        data.extend(word(5));
        let mut payload = [0u8; 32];
        payload[..5].copy_from_slice(b"hello");
        data.extend(payload);

        let values = decode(&params(&["string"]), &data).unwrap();
        assert_eq!(values, vec![Value::from("hello")]);
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let mut data = word(0x20).to_vec();
        data.extend(word(1));
        let mut payload = [0u8; 32];
        payload[0] = 0xff;
        data.extend(payload);
        let err = decode(&params(&["string"]), &data).unwrap_err();
        assert!(matches!(err, AbiError::InvalidUtf8));
    }

    #[test]
    fn test_decode_insufficient_data() {
        let err = decode(&params(&["uint256"]), &[0u8; 16]).unwrap_err();
        assert!(matches!(
            err,
            AbiError::DataTooShort {
                needed: 32,
                available: 16
            }
        ));
    }

    #[test]
    fn test_decode_huge_offset() {
        let err = decode(&params(&["bytes"]), &[0xff; 32]).unwrap_err();
        assert!(matches!(err, AbiError::Bytes(_) | AbiError::DataTooShort { .. }));
    }

    #[test]
    fn test_decode_array_count_guard() {
        // count claims 2^32 elements with no element data behind it
        let mut data = word(0x20).to_vec();
        let mut count = [0u8; 32];
        count[27] = 1;
        data.extend(count);
        let err = decode(&params(&["uint256[]"]), &data).unwrap_err();
        assert!(matches!(err, AbiError::DataTooShort { .. }));
    }

    /// `count` offsets that all point at the same `inner` block
    fn shared_level(count: usize, inner: &[u8]) -> Vec<u8> {
        let mut level = bytes::usize_word(count).to_vec();
        for _ in 0..count {
            level.extend(bytes::usize_word(count * WORD_SIZE));
        }
        level.extend_from_slice(inner);
        level
    }

    #[test]
    fn test_decode_reused_offsets_limited() {
        let n = 40;
        let mut leaf = bytes::usize_word(n).to_vec();
        for _ in 0..n {
            leaf.extend(word(7));
        }
        let mut data = word(0x20).to_vec();
        data.extend(shared_level(n, &shared_level(n, &leaf)));

        // 40^3 leaves from under 4 KiB of input
        let err = decode(&params(&["uint256[][][]"]), &data).unwrap_err();
        match err {
            AbiError::ElementLimitExceeded { limit } => assert_eq!(limit, data.len()),
            other => panic!("unexpected error: {other}"),
        }

        // one level of sharing stays within budget
        let mut data = word(0x20).to_vec();
        data.extend(shared_level(2, &leaf));
        let values = decode(&params(&["uint256[][]"]), &data).unwrap();
        match &values[0] {
            Value::Array(rows) => assert_eq!(rows.len(), 2),
            other => panic!("unexpected value: {other}"),
        }
    }

    #[test]
    fn test_decode_ignores_trailing_data() {
        let mut data = word(7).to_vec();
        data.extend([0xaa; 40]);
        let values = decode(&params(&["uint8"]), &data).unwrap();
        assert_eq!(values, vec![Value::Uint(U256::from(7))]);
    }

    #[test]
    fn test_decode_named_tuple_is_struct() {
        let param = Parameter::tuple(
            "tuple",
            vec![Parameter::named("uint8", "a"), Parameter::named("bool", "b")],
        );
        let mut data = word(3).to_vec();
        data.extend(word(0));
        let values = decode(&[param], &data).unwrap();
        assert_eq!(
            values,
            vec![Value::Struct(vec![
                ("a".into(), Value::Uint(U256::from(3))),
                ("b".into(), Value::Bool(false)),
            ])]
        );
    }

    #[test]
    fn test_decode_with_object_shape() {
        let params = vec![Parameter::named("uint8", "x"), Parameter::new("bool")];
        let mut data = word(9).to_vec();
        data.extend(word(1));

        let decoded = decode_with(&params, &data, &DecodeOptions::object()).unwrap();
        assert_eq!(decoded.get("x"), Some(&Value::Uint(U256::from(9))));
        assert_eq!(decoded.get("1"), Some(&Value::Bool(true)));
        assert_eq!(decoded.len(), 2);

        let positional = decode_with(&params, &data, &DecodeOptions::default()).unwrap();
        assert!(matches!(positional, Decoded::Positional(_)));
        assert_eq!(positional.get_index(1), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_decode_options_serde() {
        let options: DecodeOptions = serde_json::from_str(r#"{"shape":"object"}"#).unwrap();
        assert_eq!(options, DecodeOptions::object());
        let options: DecodeOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options.shape, Shape::Array);
    }
}
