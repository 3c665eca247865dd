//! Encoding and decoding tests for bach-abi
//!
//! Fixtures follow the worked examples in the Solidity ABI documentation.

use bach_abi::{
    decode, decode_with, encode, encode_packed, AbiError, DecodeOptions, Decoded, Parameter, Value,
};
use bach_primitives::{Address, I256, U256};

fn params(types: &[&str]) -> Vec<Parameter> {
    types.iter().map(|t| Parameter::new(*t)).collect()
}

/// Join 32-byte hex words written one per line
fn words(lines: &[&str]) -> Vec<u8> {
    hex::decode(lines.concat()).unwrap()
}

fn uint(v: u64) -> Value {
    Value::Uint(U256::from(v))
}

// ==================== Static Encoding Tests ====================

#[test]
fn test_encode_address_and_uint() {
    let addr = Address::from_hex("0xd8da6bf26964af9d7eed9e03e53415d37aa96045").unwrap();
    let encoded = encode(&params(&["address", "uint256"]), &[Value::Address(addr), uint(123)])
        .unwrap();

    assert_eq!(encoded.len(), 64);
    assert_eq!(
        hex::encode(&encoded),
        concat!(
            "000000000000000000000000d8da6bf26964af9d7eed9e03e53415d37aa96045",
            "000000000000000000000000000000000000000000000000000000000000007b",
        )
    );
}

#[test]
fn test_encode_is_deterministic() {
    let types = params(&["uint8", "int16", "bool", "bytes3"]);
    let values = vec![
        uint(255),
        Value::Int(I256::from(-300i64)),
        Value::Bool(true),
        Value::Bytes(vec![1, 2, 3]),
    ];
    let a = encode(&types, &values).unwrap();
    let b = encode(&types, &values).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.len(), 128);
    assert_eq!(&a[32..62], &[0xff; 30]);
    assert_eq!(&a[62..64], &[0xfe, 0xd4]);
}

#[test]
fn test_fixed_array_length_enforced() {
    let addr = Value::Address(Address::ZERO);
    let err = encode(
        &params(&["address[2]"]),
        &[Value::Array(vec![addr.clone(), addr.clone(), addr])],
    )
    .unwrap_err();

    match err {
        AbiError::ArrayLengthMismatch {
            ty,
            expected,
            given,
        } => {
            assert_eq!(ty, "address[2]");
            assert_eq!(expected, 2);
            assert_eq!(given, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_invalid_type_rejected() {
    let err = encode(&params(&["uint7"]), &[uint(1)]).unwrap_err();
    assert!(matches!(err, AbiError::InvalidType { ref ty } if ty == "uint7"));
}

// ==================== Dynamic Encoding Tests ====================

/// `f(uint256,uint32[],bytes10,bytes)` from the Solidity documentation
#[test]
fn test_encode_mixed_static_and_dynamic() {
    let types = params(&["uint256", "uint32[]", "bytes10", "bytes"]);
    let values = vec![
        uint(0x123),
        Value::Array(vec![uint(0x456), uint(0x789)]),
        Value::Bytes(b"1234567890".to_vec()),
        Value::Bytes(b"Hello, world!".to_vec()),
    ];
    let expected = words(&[
        "0000000000000000000000000000000000000000000000000000000000000123",
        "0000000000000000000000000000000000000000000000000000000000000080",
        "3132333435363738393000000000000000000000000000000000000000000000",
        "00000000000000000000000000000000000000000000000000000000000000e0",
        "0000000000000000000000000000000000000000000000000000000000000002",
        "0000000000000000000000000000000000000000000000000000000000000456",
        "0000000000000000000000000000000000000000000000000000000000000789",
        "000000000000000000000000000000000000000000000000000000000000000d",
        "48656c6c6f2c20776f726c642100000000000000000000000000000000000000",
    ]);

    let encoded = encode(&types, &values).unwrap();
    assert_eq!(encoded, expected);
    assert_eq!(decode(&types, &encoded).unwrap(), values);
}

/// `g(uint256[][],string[])` from the Solidity documentation
#[test]
fn test_encode_nested_dynamic_arrays() {
    let types = params(&["uint256[][]", "string[]"]);
    let values = vec![
        Value::Array(vec![
            Value::Array(vec![uint(1), uint(2)]),
            Value::Array(vec![uint(3)]),
        ]),
        Value::Array(vec![
            Value::from("one"),
            Value::from("two"),
            Value::from("three"),
        ]),
    ];
    let expected = words(&[
        "0000000000000000000000000000000000000000000000000000000000000040",
        "0000000000000000000000000000000000000000000000000000000000000140",
        "0000000000000000000000000000000000000000000000000000000000000002",
        "0000000000000000000000000000000000000000000000000000000000000040",
        "00000000000000000000000000000000000000000000000000000000000000a0",
        "0000000000000000000000000000000000000000000000000000000000000002",
        "0000000000000000000000000000000000000000000000000000000000000001",
        "0000000000000000000000000000000000000000000000000000000000000002",
        "0000000000000000000000000000000000000000000000000000000000000001",
        "0000000000000000000000000000000000000000000000000000000000000003",
        "0000000000000000000000000000000000000000000000000000000000000003",
        "0000000000000000000000000000000000000000000000000000000000000060",
        "00000000000000000000000000000000000000000000000000000000000000a0",
        "00000000000000000000000000000000000000000000000000000000000000e0",
        "0000000000000000000000000000000000000000000000000000000000000003",
        "6f6e650000000000000000000000000000000000000000000000000000000000",
        "0000000000000000000000000000000000000000000000000000000000000003",
        "74776f0000000000000000000000000000000000000000000000000000000000",
        "0000000000000000000000000000000000000000000000000000000000000005",
        "7468726565000000000000000000000000000000000000000000000000000000",
    ]);

    let encoded = encode(&types, &values).unwrap();
    assert_eq!(encoded, expected);
    assert_eq!(decode(&types, &encoded).unwrap(), values);
}

#[test]
fn test_dynamic_tuple_roundtrip() {
    let order = Parameter::tuple(
        "tuple",
        vec![
            Parameter::named("address", "maker"),
            Parameter::named("bytes", "payload"),
            Parameter::named("uint64[2]", "window"),
        ],
    )
    .with_name("order");
    let value = Value::Struct(vec![
        ("maker".into(), Value::Address(Address::from_bytes([0xaa; 20]))),
        ("payload".into(), Value::Bytes(vec![0xde, 0xad])),
        ("window".into(), Value::Array(vec![uint(10), uint(20)])),
    ]);
    let types = vec![order, Parameter::new("bool")];
    let values = vec![value, Value::Bool(false)];

    let encoded = encode(&types, &values).unwrap();
    // head: tuple offset + bool; tuple: maker, payload offset, window[2], payload
    assert_eq!(encoded.len(), 64 + 4 * 32 + 64);
    assert_eq!(encoded[31], 0x40);
    assert_eq!(decode(&types, &encoded).unwrap(), values);
}

#[test]
fn test_tuple_array_roundtrip() {
    let param = Parameter::tuple(
        "tuple[]",
        vec![Parameter::new("uint8"), Parameter::new("string")],
    );
    let value = Value::Array(vec![
        Value::Tuple(vec![uint(1), Value::from("a")]),
        Value::Tuple(vec![uint(2), Value::from("bb")]),
    ]);
    let types = vec![param];
    let encoded = encode(&types, std::slice::from_ref(&value)).unwrap();
    assert_eq!(decode(&types, &encoded).unwrap(), vec![value]);
}

// ==================== Decoding Tests ====================

#[test]
fn test_decode_truncated_fails() {
    let types = params(&["uint256", "string"]);
    let encoded = encode(&types, &[uint(1), Value::from("hello")]).unwrap();
    for len in [0, 31, 63, 95] {
        let err = decode(&types, &encoded[..len]).unwrap_err();
        assert!(
            matches!(err, AbiError::DataTooShort { .. }),
            "length {len}: {err}"
        );
    }
}

#[test]
fn test_decode_object_shape() {
    let types = vec![
        Parameter::named("address", "owner"),
        Parameter::named("uint256", "balance"),
    ];
    let values = vec![Value::Address(Address::ZERO), uint(42)];
    let encoded = encode(&types, &values).unwrap();

    let decoded = decode_with(&types, &encoded, &DecodeOptions::object()).unwrap();
    assert_eq!(
        decoded,
        Decoded::Named(vec![
            ("owner".into(), Value::Address(Address::ZERO)),
            ("balance".into(), uint(42)),
        ])
    );
    assert_eq!(decoded.into_values(), values);
}

// ==================== Packed Encoding Tests ====================

#[test]
fn test_packed_string_has_no_padding() {
    let out = encode_packed(&["string"], &[Value::from("hello world")]).unwrap();
    assert_eq!(hex::encode(out), "68656c6c6f20776f726c64");
}

#[test]
fn test_packed_mixed() {
    let out = encode_packed(
        &["int16", "bytes1", "uint16", "string"],
        &[
            Value::Int(I256::from(-1i64)),
            Value::Bytes(vec![0x42]),
            uint(3),
            Value::from("Hello, world!"),
        ],
    )
    .unwrap();
    assert_eq!(
        hex::encode(out),
        "ffff42000348656c6c6f2c20776f726c6421"
    );
}
