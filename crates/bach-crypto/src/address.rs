//! EIP-55 checksums and address validation

use bach_primitives::Address;

use crate::{keccak256, CryptoError};

/// Render an address with EIP-55 mixed-case checksum
pub fn to_checksum_address(address: &Address) -> String {
    let lower = hex::encode(address.as_bytes());
    let hash = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let byte = hash.as_bytes()[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn has_address_shape(value: &str) -> bool {
    match value.strip_prefix("0x") {
        Some(digits) => digits.len() == 40 && digits.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}

/// Check that `value` is a `0x`-prefixed 20-byte hex address.
///
/// With `strict`, a value that is not all lower-case must also carry a
/// valid EIP-55 checksum.
pub fn is_valid_address(value: &str, strict: bool) -> bool {
    assert_address(value, strict).is_ok()
}

/// Parse `value` as an address, failing with the reason it is invalid
pub fn assert_address(value: &str, strict: bool) -> Result<Address, CryptoError> {
    if !has_address_shape(value) {
        return Err(CryptoError::InvalidAddress(value.to_string()));
    }
    let address =
        Address::from_hex(value).map_err(|_| CryptoError::InvalidAddress(value.to_string()))?;
    if strict && value != value.to_ascii_lowercase() && to_checksum_address(&address) != value {
        return Err(CryptoError::InvalidChecksum(value.to_string()));
    }
    Ok(address)
}
