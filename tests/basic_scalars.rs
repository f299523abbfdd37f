mod test_utils;

use test_utils::*;

const SCALARS: &str = r#"{
    "Scalars": {
        "types": {
            "Int": {"type": "INTEGER"},
            "Bool": {"type": "BOOLEAN"},
            "Nothing": {"type": "NULL"},
            "Oid": {"type": "OBJECT IDENTIFIER"},
            "Float": {"type": "REAL"},
            "Octets": {"type": "OCTET STRING"},
            "Bits": {"type": "BIT STRING"},
            "Utf8": {"type": "UTF8String"},
            "Ia5": {"type": "IA5String"},
            "Bmp": {"type": "BMPString"},
            "Color": {"type": "ENUMERATED", "values": [["red", 0], ["green", 1], ["blue", 5]]},
            "Version": {"type": "ENUMERATED", "values": [["v1", 0], "..."]},
            "Stamp": {"type": "UTCTime"},
            "Precise": {"type": "GeneralizedTime"},
            "Day": {"type": "DATE"},
            "Raw": {"type": "ANY"}
        }
    }
}"#;

fn scalar(name: &str) -> CompiledType {
    compile_modules(SCALARS)
        .get("Scalars", name)
        .cloned()
        .unwrap()
}

#[test]
fn test_integer() {
    let int = scalar("Int");
    serialize_and_deserialize_ber(&int, "02 02 FF 7F", &Value::Integer(-129));
    serialize_and_deserialize_ber(&int, "02 01 00", &Value::Integer(0));
    serialize_and_deserialize_ber(&int, "02 02 00 80", &Value::Integer(128));
    serialize_and_deserialize_ber(&int, "02 01 80", &Value::Integer(-128));
    serialize_and_deserialize_ber(
        &int,
        "02 08 7F FF FF FF FF FF FF FF",
        &Value::Integer(i128::from(i64::MAX)),
    );
}

#[test]
fn test_integer_too_large() {
    let mut data = hex("02 11");
    data.extend(std::iter::repeat(0x01).take(17));
    let e = scalar("Int").decode(&data).unwrap_err();
    assert!(matches!(e.kind(), ErrorKind::IntegerTooLarge(17)));
}

#[test]
fn test_boolean() {
    let bool = scalar("Bool");
    serialize_and_deserialize_ber(&bool, "01 01 FF", &Value::Boolean(true));
    serialize_and_deserialize_ber(&bool, "01 01 00", &Value::Boolean(false));
    assert_eq!(Value::Boolean(true), bool.decode(&hex("01 01 01")).unwrap());

    let e = bool.decode(&hex("01 02 FF FF")).unwrap_err();
    assert!(matches!(e.kind(), ErrorKind::InvalidBooleanLength(2)));
}

#[test]
fn test_null() {
    serialize_and_deserialize_ber(&scalar("Nothing"), "05 00", &Value::Null);
}

#[test]
fn test_object_identifier() {
    let oid = scalar("Oid");
    serialize_and_deserialize_ber(
        &oid,
        "06 06 2A 86 48 86 F7 0D",
        &Value::ObjectIdentifier("1.2.840.113549".into()),
    );
    serialize_and_deserialize_ber(
        &oid,
        "06 03 88 37 03",
        &Value::ObjectIdentifier("2.999.3".into()),
    );

    let e = oid
        .encode(&Value::ObjectIdentifier("1".into()))
        .unwrap_err();
    assert!(e.is_encode_error());
}

#[test]
fn test_real() {
    let real = scalar("Float");
    serialize_and_deserialize_ber(&real, "09 00", &Value::Real(0.0));
    serialize_and_deserialize_ber(&real, "09 01 40", &Value::Real(f64::INFINITY));
    serialize_and_deserialize_ber(&real, "09 01 41", &Value::Real(f64::NEG_INFINITY));
    serialize_and_deserialize_ber(&real, "09 03 80 00 01", &Value::Real(1.0));
    serialize_and_deserialize_ber(&real, "09 03 80 FF 01", &Value::Real(0.5));
    serialize_and_deserialize_ber(&real, "09 03 C0 00 03", &Value::Real(-3.0));

    assert_eq!(hex("09 01 42"), serialize_ber(&real, &Value::Real(f64::NAN)));
    match real.decode(&hex("09 01 42")).unwrap() {
        Value::Real(value) => assert!(value.is_nan()),
        other => panic!("Unexpected value {:?}", other),
    }
    match real.decode(&hex("09 01 43")).unwrap() {
        Value::Real(value) => assert!(value == 0.0 && value.is_sign_negative()),
        other => panic!("Unexpected value {:?}", other),
    }
}

#[test]
fn test_real_decimal_form() {
    // ISO 6093 NR2 "1,5"
    assert_eq!(
        Value::Real(1.5),
        scalar("Float").decode(&hex("09 04 02 31 2C 35")).unwrap()
    );
}

#[test]
fn test_octet_string_primitive_and_constructed() {
    let octets = scalar("Octets");
    serialize_and_deserialize_ber(&octets, "04 02 DE AD", &Value::OctetString(vec![0xde, 0xad]));
    serialize_and_deserialize_ber(&octets, "04 00", &Value::OctetString(Vec::new()));

    let expected = Value::OctetString(vec![0xde, 0xad]);
    assert_eq!(
        expected,
        deserialize_ber(&octets, &hex("24 06 04 01 DE 04 01 AD"))
    );
    assert_eq!(
        expected,
        deserialize_ber(&octets, &hex("24 80 04 01 DE 24 80 04 01 AD 00 00 00 00"))
    );
}

#[test]
fn test_bit_string() {
    let bits = scalar("Bits");
    serialize_and_deserialize_ber(
        &bits,
        "03 02 05 A0",
        &Value::BitString(BitString::new(vec![0xa0], 3)),
    );
    serialize_and_deserialize_ber(
        &bits,
        "03 03 00 FF 01",
        &Value::BitString(BitString::new(vec![0xff, 0x01], 16)),
    );
    serialize_and_deserialize_ber(&bits, "03 01 00", &Value::BitString(BitString::new(vec![], 0)));

    // unused trailing bits are cleared
    assert_eq!(
        hex("03 02 05 A0"),
        serialize_ber(&bits, &Value::BitString(BitString::new(vec![0xbf], 3)))
    );

    let e = bits
        .encode(&Value::BitString(BitString::new(vec![0xff], 9)))
        .unwrap_err();
    assert!(matches!(
        e.kind(),
        ErrorKind::InvalidBitString { bits: 9, bytes: 1 }
    ));
}

#[test]
fn test_constructed_bit_string() {
    assert_eq!(
        Value::BitString(BitString::new(vec![0xff, 0xa0], 11)),
        deserialize_ber(&scalar("Bits"), &hex("23 08 03 02 00 FF 03 02 05 A0"))
    );
}

#[test]
fn test_strings() {
    serialize_and_deserialize_ber(&scalar("Utf8"), "0C 02 68 69", &Value::string("hi"));
    serialize_and_deserialize_ber(&scalar("Utf8"), "0C 02 C3 A9", &Value::string("é"));
    serialize_and_deserialize_ber(&scalar("Ia5"), "16 02 68 69", &Value::string("hi"));
    serialize_and_deserialize_ber(&scalar("Bmp"), "1E 04 00 68 00 69", &Value::string("hi"));

    let e = scalar("Ia5").encode(&Value::string("é")).unwrap_err();
    assert!(matches!(
        e.kind(),
        ErrorKind::UnencodableCharacter { character: 'é', .. }
    ));

    let e = scalar("Utf8").decode(&hex("0C 01 FF")).unwrap_err();
    assert!(matches!(e.kind(), ErrorKind::InvalidStringContents { .. }));
}

#[test]
fn test_enumerated() {
    let color = scalar("Color");
    serialize_and_deserialize_ber(&color, "0A 01 01", &Value::enumerated("green"));
    serialize_and_deserialize_ber(&color, "0A 01 05", &Value::enumerated("blue"));

    let e = color.decode(&hex("0A 01 02")).unwrap_err();
    assert!(matches!(
        e.kind(),
        ErrorKind::UnknownEnumerationValue { got: 2, .. }
    ));

    let e = color.encode(&Value::enumerated("purple")).unwrap_err();
    assert!(matches!(e.kind(), ErrorKind::UnknownEnumerationLabel { .. }));
    assert!(e.is_encode_error());
}

#[test]
fn test_extensible_enumerated_decodes_unknown_value_to_null() {
    assert_eq!(Value::Null, scalar("Version").decode(&hex("0A 01 07")).unwrap());
}

#[test]
fn test_numeric_enumerations() {
    let specification: Specification = serde_json::from_str(SCALARS).unwrap();
    let compiled = Compiler::new()
        .with_numeric_enums(true)
        .compile(&specification)
        .unwrap();
    let color = compiled.get("Scalars", "Color").unwrap();
    serialize_and_deserialize_ber(color, "0A 01 05", &Value::Integer(5));
}

#[test]
fn test_times() {
    serialize_and_deserialize_ber(
        &scalar("Stamp"),
        "17 0D 31 39 30 31 30 32 30 33 30 34 30 35 5A",
        &Value::UtcTime(DateTime::utc(
            Date::new(2019, 1, 2),
            TimeOfDay::new(3, 4, 5),
        )),
    );
    serialize_and_deserialize_ber(
        &scalar("Precise"),
        "18 11 32 30 31 39 30 31 30 32 30 33 30 34 30 35 2E 35 5A",
        &Value::GeneralizedTime(
            DateTime::utc(Date::new(2019, 1, 2), TimeOfDay::new(3, 4, 5))
                .with_microsecond(500_000),
        ),
    );
    serialize_and_deserialize_ber(
        &scalar("Day"),
        "1F 1F 08 32 30 32 30 30 32 32 39",
        &Value::Date(Date::new(2020, 2, 29)),
    );

    let e = scalar("Day")
        .encode(&Value::Date(Date::new(2021, 2, 29)))
        .unwrap_err();
    assert!(matches!(e.kind(), ErrorKind::InvalidTime { .. }));
}

#[test]
fn test_any_keeps_the_encoding() {
    serialize_and_deserialize_ber(
        &scalar("Raw"),
        "30 03 02 01 05",
        &Value::Any(hex("30 03 02 01 05")),
    );
}

#[test]
fn test_unexpected_tag() {
    let e = scalar("Int").decode(&hex("01 01 FF")).unwrap_err();
    match e.kind() {
        ErrorKind::UnexpectedTag { expected, got, .. } => {
            assert_eq!(&vec!["02".to_string()], expected);
            assert_eq!("01", got.as_str());
        }
        other => panic!("Unexpected error {:?}", other),
    }
    assert_eq!(Some(0), e.offset());
    assert_eq!("Int", e.location());
}

#[test]
fn test_out_of_data() {
    let int = scalar("Int");
    assert!(int.decode(&[]).unwrap_err().is_out_of_data());

    let e = int.decode(&hex("02 02 FF")).unwrap_err();
    assert!(matches!(
        e.kind(),
        ErrorKind::MissingContents {
            expected: 2,
            got: 1
        }
    ));

    let e = int.decode(&hex("02 80 01 00 00")).unwrap_err();
    assert!(matches!(e.kind(), ErrorKind::ExpectedDefiniteLength));
}

#[test]
fn test_value_type_mismatch() {
    let e = scalar("Int").encode(&Value::Boolean(true)).unwrap_err();
    assert!(matches!(
        e.kind(),
        ErrorKind::UnexpectedValue {
            type_label: "INTEGER",
            got: "Boolean"
        }
    ));
}

#[test]
fn test_deeply_nested_elements() {
    let depth = 200_000;
    let mut data = hex("30 80").repeat(depth);
    data.extend(hex("00 00").repeat(depth));
    let e = scalar("Raw").decode(&data).unwrap_err();
    assert!(matches!(e.kind(), ErrorKind::NestingTooDeep(_)));

    let mut data = hex("24 80").repeat(depth);
    data.extend(hex("04 01 DE"));
    data.extend(hex("00 00").repeat(depth));
    let e = scalar("Octets").decode(&data).unwrap_err();
    assert!(matches!(e.kind(), ErrorKind::NestingTooDeep(_)));
}
