mod test_utils;

use test_utils::*;

const SETS: &str = r#"{
    "Sets": {
        "types": {
            "Person": {
                "type": "SET",
                "members": [
                    {"name": "name", "type": "UTF8String"},
                    {"name": "age", "type": "INTEGER"},
                    {"name": "member", "type": "BOOLEAN", "optional": true}
                ]
            }
        }
    }
}"#;

fn person() -> CompiledType {
    compile_modules(SETS).get("Sets", "Person").cloned().unwrap()
}

fn alice() -> Value {
    Value::sequence(vec![
        ("name", Value::string("hi")),
        ("age", Value::Integer(5)),
        ("member", Value::Boolean(true)),
    ])
}

#[test]
fn test_members_are_encoded_in_canonical_tag_order() {
    serialize_and_deserialize_ber(
        &person(),
        "31 0A 01 01 FF 02 01 05 0C 02 68 69",
        &alice(),
    );
}

#[test]
fn test_any_member_permutation_decodes() {
    let members = [hex("01 01 FF"), hex("02 01 05"), hex("0C 02 68 69")];
    let permutations = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];
    let person = person();
    for permutation in &permutations {
        let mut data = hex("31 0A");
        for index in permutation {
            data.extend_from_slice(&members[*index]);
        }
        assert_eq!(
            alice(),
            deserialize_ber(&person, &data),
            "Permutation {:?}",
            permutation
        );
    }
}

#[test]
fn test_optional_member_absent() {
    let value = Value::sequence(vec![("name", Value::string("hi")), ("age", Value::Integer(5))]);
    serialize_and_deserialize_ber(&person(), "31 07 02 01 05 0C 02 68 69", &value);
    assert_eq!(
        value,
        deserialize_ber(&person(), &hex("31 07 0C 02 68 69 02 01 05"))
    );
}

const RECURSIVE_SETS: &str = r#"{
    "Sets": {
        "types": {
            "Node": {
                "type": "SET",
                "members": [
                    {"name": "b", "type": "BOOLEAN", "tag": {"number": 1, "kind": "IMPLICIT"}},
                    {
                        "name": "child",
                        "type": "Node",
                        "tag": {"number": 0, "kind": "IMPLICIT"},
                        "optional": true
                    }
                ]
            }
        }
    }
}"#;

#[test]
fn test_recursive_members_are_encoded_in_canonical_tag_order() {
    let node = compile_modules(RECURSIVE_SETS)
        .get("Sets", "Node")
        .cloned()
        .unwrap();
    serialize_and_deserialize_ber(
        &node,
        "31 08 A0 03 81 01 00 81 01 FF",
        &Value::sequence(vec![
            ("b", Value::Boolean(true)),
            ("child", Value::sequence(vec![("b", Value::Boolean(false))])),
        ]),
    );
    serialize_and_deserialize_ber(
        &node,
        "31 03 81 01 FF",
        &Value::sequence(vec![("b", Value::Boolean(true))]),
    );
}
