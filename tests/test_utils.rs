#![allow(dead_code)]

pub use asn1ber::prelude::*;

pub fn compile_modules(json: &str) -> CompiledModules {
    compile_json_str(json).unwrap()
}

/// Parses pairs of hex digits, whitespace is ignored
pub fn hex(text: &str) -> Vec<u8> {
    let digits = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>();
    ::hex::decode(digits).unwrap()
}

pub fn serialize_ber(compiled: &CompiledType, value: &Value) -> Vec<u8> {
    compiled.encode(value).unwrap()
}

pub fn deserialize_ber(compiled: &CompiledType, data: &[u8]) -> Value {
    let (value, length) = compiled.decode_with_length(data).unwrap();
    assert_eq!(
        data.len(),
        length,
        "After reading, there are still bytes remaining!"
    );
    value
}

pub fn serialize_and_deserialize_ber(compiled: &CompiledType, data: &str, value: &Value) {
    let data = hex(data);
    assert_eq!(
        data,
        serialize_ber(compiled, value),
        "Serialized binary data does not match"
    );
    assert_eq!(
        value,
        &deserialize_ber(compiled, &data),
        "Deserialized value does not match"
    );
}
