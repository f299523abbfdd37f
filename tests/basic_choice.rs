mod test_utils;

use test_utils::*;

const CHOICES: &str = r#"{
    "Choices": {
        "types": {
            "Inner": {
                "type": "CHOICE",
                "members": [
                    {"name": "flag", "type": "BOOLEAN"},
                    {"name": "nothing", "type": "NULL"}
                ]
            },
            "Basic": {
                "type": "CHOICE",
                "members": [
                    {"name": "number", "type": "INTEGER"},
                    {"name": "text", "type": "UTF8String"},
                    {"name": "nested", "type": "Inner"}
                ]
            },
            "Extensible": {
                "type": "CHOICE",
                "members": [
                    {"name": "number", "type": "INTEGER"},
                    "...",
                    {"name": "text", "type": "UTF8String"}
                ]
            },
            "Tagged": {
                "type": "CHOICE",
                "members": [
                    {"name": "a", "type": "INTEGER", "tag": {"number": 0, "kind": "IMPLICIT"}},
                    {"name": "b", "type": "INTEGER", "tag": {"number": 1}}
                ]
            },
            "Holder": {
                "type": "SEQUENCE",
                "members": [
                    {"name": "choice", "type": "Extensible"},
                    {"name": "count", "type": "INTEGER", "tag": {"number": 2, "kind": "IMPLICIT"}}
                ]
            }
        }
    }
}"#;

fn choice(name: &str) -> CompiledType {
    compile_modules(CHOICES)
        .get("Choices", name)
        .cloned()
        .unwrap()
}

#[test]
fn test_basic() {
    let basic = choice("Basic");
    serialize_and_deserialize_ber(
        &basic,
        "02 01 05",
        &Value::choice("number", Value::Integer(5)),
    );
    serialize_and_deserialize_ber(
        &basic,
        "0C 02 68 69",
        &Value::choice("text", Value::string("hi")),
    );
}

#[test]
fn test_nested_choice_tags_are_hoisted() {
    let basic = choice("Basic");
    serialize_and_deserialize_ber(
        &basic,
        "01 01 FF",
        &Value::choice("nested", Value::choice("flag", Value::Boolean(true))),
    );
    serialize_and_deserialize_ber(
        &basic,
        "05 00",
        &Value::choice("nested", Value::choice("nothing", Value::Null)),
    );
}

#[test]
fn test_unknown_alternative_without_extension_marker() {
    let e = choice("Basic").decode(&hex("04 01 00")).unwrap_err();
    match e.kind() {
        ErrorKind::UnexpectedTag {
            type_label,
            expected,
            got,
        } => {
            assert_eq!("CHOICE", type_label.as_str());
            assert_eq!("04", got.as_str());
            assert!(expected.contains(&"02".to_string()));
            assert!(expected.contains(&"01".to_string()));
        }
        other => panic!("Unexpected error {:?}", other),
    }
}

#[test]
fn test_unknown_alternative_with_extension_marker() {
    let extensible = choice("Extensible");
    let (value, length) = extensible
        .decode_with_length(&hex("04 01 00 FF"))
        .unwrap();
    assert_eq!(Value::Choice(None), value);
    assert_eq!(3, length);

    serialize_and_deserialize_ber(
        &extensible,
        "0C 02 68 69",
        &Value::choice("text", Value::string("hi")),
    );
}

#[test]
fn test_unknown_alternative_inside_sequence() {
    assert_eq!(
        Value::sequence(vec![
            ("choice", Value::Choice(None)),
            ("count", Value::Integer(7)),
        ]),
        deserialize_ber(&choice("Holder"), &hex("30 06 04 01 00 82 01 07"))
    );
}

#[test]
fn test_tagged_alternatives() {
    let tagged = choice("Tagged");
    serialize_and_deserialize_ber(&tagged, "80 01 05", &Value::choice("a", Value::Integer(5)));
    serialize_and_deserialize_ber(
        &tagged,
        "A1 03 02 01 05",
        &Value::choice("b", Value::Integer(5)),
    );
}

#[test]
fn test_unknown_member_name() {
    let e = choice("Basic")
        .encode(&Value::choice("bogus", Value::Null))
        .unwrap_err();
    match e.kind() {
        ErrorKind::UnknownChoiceMember { expected, got } => {
            assert_eq!("number, text, nested", expected.as_str());
            assert_eq!("bogus", got.as_str());
        }
        other => panic!("Unexpected error {:?}", other),
    }
    assert!(e.is_encode_error());

    let e = choice("Extensible").encode(&Value::Choice(None)).unwrap_err();
    assert!(matches!(e.kind(), ErrorKind::UnknownChoiceMember { .. }));
}
