//! ABI type classification
//!
//! A [`ParamType`] is produced once from a [`Parameter`] type string and
//! every codec switches on it afterwards.

use std::fmt;

use bach_primitives::WORD_SIZE;

use crate::error::{AbiError, Result};
use crate::param::Parameter;

/// Solidity parameter types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    /// Address
    Address,
    /// Boolean
    Bool,
    /// Unsigned integer with bit size (8, 16, ..., 256)
    Uint(usize),
    /// Signed integer with bit size
    Int(usize),
    /// Dynamic bytes
    Bytes,
    /// Fixed-size bytes (size 1-32)
    FixedBytes(usize),
    /// UTF-8 string
    String,
    /// Dynamic array
    Array(Box<ParamType>),
    /// Fixed-size array
    FixedArray(Box<ParamType>, usize),
    /// Tuple
    Tuple(Vec<TupleField>),
}

/// A tuple component: its type and optional name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleField {
    /// Component name, used to match struct values
    pub name: Option<String>,
    /// Component type
    pub kind: ParamType,
}

impl ParamType {
    /// Classify a parameter, using its components for tuple types
    pub fn from_param(param: &Parameter) -> Result<Self> {
        classify(&param.ty, param.components.as_deref())
    }

    /// Classify a bare type string; tuple types fail since they need
    /// components
    pub fn parse(ty: &str) -> Result<Self> {
        classify(ty, None)
    }

    /// Check if this type is dynamic (variable length)
    pub fn is_dynamic(&self) -> bool {
        match self {
            ParamType::Bytes | ParamType::String | ParamType::Array(_) => true,
            ParamType::FixedArray(inner, _) => inner.is_dynamic(),
            ParamType::Tuple(fields) => fields.iter().any(|f| f.kind.is_dynamic()),
            _ => false,
        }
    }

    /// Bytes this type occupies in the head of an encoding
    pub fn head_size(&self) -> usize {
        match self {
            _ if self.is_dynamic() => WORD_SIZE,
            ParamType::FixedArray(inner, size) => inner.head_size().saturating_mul(*size),
            ParamType::Tuple(fields) => fields.iter().map(|f| f.kind.head_size()).sum(),
            _ => WORD_SIZE,
        }
    }

    /// Tuple or array type, which cannot be used as a topic filter
    pub fn is_compound(&self) -> bool {
        matches!(
            self,
            ParamType::Array(_) | ParamType::FixedArray(..) | ParamType::Tuple(_)
        )
    }
}

fn invalid(ty: &str) -> AbiError {
    AbiError::InvalidType { ty: ty.to_string() }
}

/// Parse a decimal suffix: digits only, no leading zero
fn parse_width(digits: &str) -> Option<usize> {
    if digits.is_empty()
        || digits.starts_with('0')
        || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    digits.parse().ok()
}

fn classify(ty: &str, components: Option<&[Parameter]>) -> Result<ParamType> {
    // Array suffix binds first: `uint8[2][]` is a dynamic array of `uint8[2]`
    if let Some(stripped) = ty.strip_suffix(']') {
        let open = stripped.rfind('[').ok_or_else(|| invalid(ty))?;
        let (element, len) = (&stripped[..open], &stripped[open + 1..]);
        let inner = Box::new(classify(element, components).map_err(|_| invalid(ty))?);
        if len.is_empty() {
            return Ok(ParamType::Array(inner));
        }
        if !len.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid(ty));
        }
        let size = len.parse().map_err(|_| invalid(ty))?;
        return Ok(ParamType::FixedArray(inner, size));
    }

    match ty {
        "tuple" => {
            let components = components.ok_or_else(|| invalid(ty))?;
            let fields = components
                .iter()
                .map(|c| {
                    Ok(TupleField {
                        name: c.name().map(str::to_string),
                        kind: ParamType::from_param(c)?,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(ParamType::Tuple(fields))
        }
        "address" => Ok(ParamType::Address),
        "bool" => Ok(ParamType::Bool),
        "string" => Ok(ParamType::String),
        "bytes" => Ok(ParamType::Bytes),
        "uint" => Ok(ParamType::Uint(256)),
        "int" => Ok(ParamType::Int(256)),
        _ => {
            if let Some(rest) = ty.strip_prefix("uint") {
                return parse_width(rest)
                    .filter(|bits| (8..=256).contains(bits) && bits % 8 == 0)
                    .map(ParamType::Uint)
                    .ok_or_else(|| invalid(ty));
            }
            if let Some(rest) = ty.strip_prefix("int") {
                return parse_width(rest)
                    .filter(|bits| (8..=256).contains(bits) && bits % 8 == 0)
                    .map(ParamType::Int)
                    .ok_or_else(|| invalid(ty));
            }
            if let Some(rest) = ty.strip_prefix("bytes") {
                return parse_width(rest)
                    .filter(|size| (1..=WORD_SIZE).contains(size))
                    .map(ParamType::FixedBytes)
                    .ok_or_else(|| invalid(ty));
            }
            Err(invalid(ty))
        }
    }
}

/// Canonical form, as used in signatures
impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Address => write!(f, "address"),
            ParamType::Bool => write!(f, "bool"),
            ParamType::Uint(bits) => write!(f, "uint{bits}"),
            ParamType::Int(bits) => write!(f, "int{bits}"),
            ParamType::Bytes => write!(f, "bytes"),
            ParamType::FixedBytes(size) => write!(f, "bytes{size}"),
            ParamType::String => write!(f, "string"),
            ParamType::Array(inner) => write!(f, "{inner}[]"),
            ParamType::FixedArray(inner, size) => write!(f, "{inner}[{size}]"),
            ParamType::Tuple(fields) => {
                write!(f, "(")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", field.kind)?;
                }
                write!(f, ")")
            }
        }
    }
}
