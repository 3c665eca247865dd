//! Runtime ABI values

use std::borrow::Cow;
use std::fmt;

use bach_crypto::{assert_address, is_valid_address};
use bach_primitives::{bytes, Address, I256, U256};

/// A value to encode, or the result of a decode
///
/// Encoding is lenient where the value is unambiguous: a `0x` address
/// string is accepted for `address`, hex strings for `bytes`/`bytesN`, and
/// either integer variant for any `uintN`/`intN` within range. Decoding
/// always yields the canonical variant for the type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// 20-byte address
    Address(Address),
    /// Boolean
    Bool(bool),
    /// Unsigned integer
    Uint(U256),
    /// Signed integer
    Int(I256),
    /// Raw bytes, for `bytes` and `bytesN`
    Bytes(Vec<u8>),
    /// UTF-8 text
    String(String),
    /// Array elements, also accepted as a positional tuple
    Array(Vec<Value>),
    /// Positional tuple
    Tuple(Vec<Value>),
    /// Named tuple, fields in declaration order
    Struct(Vec<(String, Value)>),
}

impl Value {
    /// The address held by an `Address` or an address-shaped string
    pub fn as_address(&self) -> Option<Address> {
        match self {
            Value::Address(address) => Some(*address),
            Value::String(s) => assert_address(s, false).ok(),
            _ => None,
        }
    }

    /// `Address`, or a string that is a valid `0x` address
    pub fn is_address_shaped(&self) -> bool {
        match self {
            Value::Address(_) => true,
            Value::String(s) => is_valid_address(s, false),
            _ => false,
        }
    }

    /// Byte content of `Bytes`, `Address` or a `0x` hex string
    pub fn as_bytes(&self) -> Option<Cow<'_, [u8]>> {
        match self {
            Value::Bytes(b) => Some(Cow::Borrowed(b.as_slice())),
            Value::Address(address) => Some(Cow::Borrowed(address.as_bytes().as_slice())),
            Value::String(s) if bytes::is_hex(s) => bytes::from_hex(s).ok().map(Cow::Owned),
            _ => None,
        }
    }

    /// Text of a `String`
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean of a `Bool`
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Non-negative integer value of `Uint` or `Int`
    pub fn as_uint(&self) -> Option<U256> {
        match self {
            Value::Uint(v) => Some(*v),
            Value::Int(v) => v.to_unsigned(),
            _ => None,
        }
    }

    /// Elements of an `Array` or `Tuple`
    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) | Value::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// Field of a `Struct` by name
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Struct(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// `Uint` or `Int`
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Uint(_) | Value::Int(_))
    }
}

fn write_list<'a>(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    close: &str,
    items: impl Iterator<Item = (Option<&'a str>, &'a Value)>,
) -> fmt::Result {
    f.write_str(open)?;
    for (i, (name, value)) in items.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        if let Some(name) = name {
            write!(f, "{name}: ")?;
        }
        write!(f, "{value}")?;
    }
    f.write_str(close)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Address(address) => write!(f, "{address}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Uint(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Bytes(b) => f.write_str(&bytes::to_hex(b)),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Array(items) => write_list(f, "[", "]", items.iter().map(|v| (None, v))),
            Value::Tuple(items) => write_list(f, "(", ")", items.iter().map(|v| (None, v))),
            Value::Struct(fields) => write_list(
                f,
                "{",
                "}",
                fields.iter().map(|(n, v)| (Some(n.as_str()), v)),
            ),
        }
    }
}

impl From<Address> for Value {
    fn from(value: Address) -> Self {
        Value::Address(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<U256> for Value {
    fn from(value: U256) -> Self {
        Value::Uint(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Uint(U256::from(value))
    }
}

impl From<I256> for Value {
    fn from(value: I256) -> Self {
        Value::Int(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(I256::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";

    #[test]
    fn test_address_shape() {
        assert!(Value::from(ADDR).is_address_shaped());
        assert!(Value::Address(Address::ZERO).is_address_shaped());
        assert!(!Value::from("hello").is_address_shaped());
        assert!(!Value::from("0x1234").is_address_shaped());
        assert_eq!(
            Value::from(ADDR).as_address(),
            Some(Address::from_hex(ADDR).unwrap())
        );
    }

    #[test]
    fn test_as_bytes() {
        assert_eq!(Value::from("0x0102").as_bytes().unwrap().as_ref(), &[1, 2]);
        assert_eq!(Value::Bytes(vec![7]).as_bytes().unwrap().as_ref(), &[7]);
        assert_eq!(Value::Address(Address::ZERO).as_bytes().unwrap().len(), 20);
        assert!(Value::from("plain text").as_bytes().is_none());
        assert!(Value::Bool(true).as_bytes().is_none());
    }

    #[test]
    fn test_as_uint() {
        assert_eq!(Value::from(5u64).as_uint(), Some(U256::from(5)));
        assert_eq!(Value::from(5i64).as_uint(), Some(U256::from(5)));
        assert_eq!(Value::from(-5i64).as_uint(), None);
    }

    #[test]
    fn test_struct_field() {
        let value = Value::Struct(vec![
            ("a".into(), Value::Bool(true)),
            ("b".into(), Value::from(1u64)),
        ]);
        assert_eq!(value.field("b"), Some(&Value::Uint(U256::one())));
        assert_eq!(value.field("c"), None);
    }

    #[test]
    fn test_display() {
        let value = Value::Struct(vec![
            ("to".into(), Value::Address(Address::ZERO)),
            (
                "amounts".into(),
                Value::Array(vec![Value::from(1u64), Value::from(-2i64)]),
            ),
            ("memo".into(), Value::Bytes(vec![0xab])),
        ]);
        assert_eq!(
            value.to_string(),
            "{to: 0x0000000000000000000000000000000000000000, amounts: [1, -2], memo: 0xab}"
        );
        assert_eq!(Value::from("hi").to_string(), "\"hi\"");
    }
}
