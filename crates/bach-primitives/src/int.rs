//! Signed 256-bit integers and width-checked integer encoding

use std::fmt;
use std::str::FromStr;

use primitive_types::U256;
use thiserror::Error;

use crate::bytes::WORD_SIZE;

/// Integer encoding error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumberError {
    /// Value does not fit in the declared integer type
    #[error("number {value} is not in safe {ty} range ({min} to {max})")]
    OutOfRange {
        /// Offending value, in decimal
        value: String,
        /// Declared type, e.g. `uint8`
        ty: String,
        /// Smallest representable value
        min: String,
        /// Largest representable value
        max: String,
    },

    /// Bit width is not a multiple of 8 in 8..=256
    #[error("invalid integer width: {0} bits")]
    InvalidWidth(usize),

    /// String is not a decimal integer
    #[error("invalid decimal integer: {0}")]
    InvalidDecimal(String),
}

/// Signed 256-bit integer stored as sign and magnitude
///
/// Zero is never negative, so equality is structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct I256 {
    abs: U256,
    negative: bool,
}

impl I256 {
    /// Create a new I256
    pub fn new(abs: U256, negative: bool) -> Self {
        Self {
            negative: negative && !abs.is_zero(),
            abs,
        }
    }

    /// Create from i128
    pub fn from_i128(value: i128) -> Self {
        Self::new(U256::from(value.unsigned_abs()), value < 0)
    }

    /// Absolute value
    pub fn abs(&self) -> U256 {
        self.abs
    }

    /// Check if negative
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.abs.is_zero()
    }

    /// The magnitude, if the value is not negative
    pub fn to_unsigned(&self) -> Option<U256> {
        (!self.negative).then_some(self.abs)
    }

    /// Read a 32-byte two's-complement big-endian word
    pub fn from_be_bytes(word: &[u8; WORD_SIZE]) -> Self {
        let raw = U256::from_big_endian(word);
        if raw.bit(255) {
            let (abs, _) = (!raw).overflowing_add(U256::one());
            Self::new(abs, true)
        } else {
            Self::new(raw, false)
        }
    }

    /// Write a 32-byte two's-complement big-endian word.
    ///
    /// Magnitudes beyond the `int256` range wrap modulo 2^256; use
    /// [`encode_int`] to range-check first.
    pub fn to_be_bytes(&self) -> [u8; WORD_SIZE] {
        let raw = if self.negative {
            (!self.abs).overflowing_add(U256::one()).0
        } else {
            self.abs
        };
        let mut word = [0u8; WORD_SIZE];
        raw.to_big_endian(&mut word);
        word
    }
}

impl fmt::Display for I256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-{}", self.abs)
        } else {
            write!(f, "{}", self.abs)
        }
    }
}

impl FromStr for I256 {
    type Err = NumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (digits, negative) = match s.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (s, false),
        };
        let abs = U256::from_dec_str(digits)
            .map_err(|_| NumberError::InvalidDecimal(s.to_string()))?;
        Ok(Self::new(abs, negative))
    }
}

impl From<i64> for I256 {
    fn from(value: i64) -> Self {
        Self::from_i128(value as i128)
    }
}

impl From<i128> for I256 {
    fn from(value: i128) -> Self {
        Self::from_i128(value)
    }
}

impl From<U256> for I256 {
    fn from(value: U256) -> Self {
        Self::new(value, false)
    }
}

fn check_width(bits: usize) -> Result<(), NumberError> {
    if bits == 0 || bits > 256 || bits % 8 != 0 {
        return Err(NumberError::InvalidWidth(bits));
    }
    Ok(())
}

fn uint_max(bits: usize) -> U256 {
    if bits == 256 {
        U256::MAX
    } else {
        (U256::one() << bits) - U256::one()
    }
}

/// Encode an unsigned integer as a 32-byte word, checking it fits `uint<bits>`
pub fn encode_uint(value: &U256, bits: usize) -> Result<[u8; WORD_SIZE], NumberError> {
    check_width(bits)?;
    if value.bits() > bits {
        return Err(NumberError::OutOfRange {
            value: value.to_string(),
            ty: format!("uint{bits}"),
            min: "0".to_string(),
            max: uint_max(bits).to_string(),
        });
    }
    let mut word = [0u8; WORD_SIZE];
    value.to_big_endian(&mut word);
    Ok(word)
}

/// Encode a signed integer as a two's-complement 32-byte word, checking it
/// fits `int<bits>`
pub fn encode_int(value: &I256, bits: usize) -> Result<[u8; WORD_SIZE], NumberError> {
    check_width(bits)?;
    // 2^(bits-1): the magnitude of the minimum value
    let limit = U256::one() << (bits - 1);
    let fits = if value.is_negative() {
        value.abs() <= limit
    } else {
        value.abs() < limit
    };
    if !fits {
        return Err(NumberError::OutOfRange {
            value: value.to_string(),
            ty: format!("int{bits}"),
            min: format!("-{limit}"),
            max: (limit - U256::one()).to_string(),
        });
    }
    Ok(value.to_be_bytes())
}

/// Encode a number with explicit signedness: `int<bits>` when `signed`,
/// otherwise `uint<bits>`, where negative values are out of range
pub fn encode_number(
    value: &I256,
    bits: usize,
    signed: bool,
) -> Result<[u8; WORD_SIZE], NumberError> {
    if signed {
        return encode_int(value, bits);
    }
    check_width(bits)?;
    match value.to_unsigned() {
        Some(abs) => encode_uint(&abs, bits),
        None => Err(NumberError::OutOfRange {
            value: value.to_string(),
            ty: format!("uint{bits}"),
            min: "0".to_string(),
            max: uint_max(bits).to_string(),
        }),
    }
}
