//! Integration tests for the binary configuration message

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use strata_message::prelude::*;

// ============================================================================
// TAGGED VALUES
// ============================================================================

#[rstest]
#[case(TaggedValue::from("text"), "string")]
#[case(TaggedValue::from(-1_i64), "sint64")]
#[case(TaggedValue::from(1_u64), "uint64")]
#[case(TaggedValue::from(true), "bool")]
#[case(TaggedValue::Float(1.5), "float")]
#[case(TaggedValue::from(1.5_f64), "double")]
#[case(TaggedValue::from(vec![1_u8, 2]), "bytes")]
fn kind_names(#[case] value: TaggedValue, #[case] expected: &str) {
    assert_eq!(value.kind().to_string(), expected);
}

// ============================================================================
// ENCODING
// ============================================================================

#[test]
fn nested_tree_survives_encoding() {
    let mut message = ConfigMessage::new();
    message.set_option("opt_str", "hello");
    message.set_option("opt_int", -5_i64);
    let db = message.config_mut("master-db");
    db.set_option("database", "primary");
    db.set_option("id", vec![0_u8; 16]);
    message.config_mut("empty");

    let bytes = message.to_bytes().unwrap();
    let decoded = ConfigMessage::from_bytes(&bytes).unwrap();
    assert_eq!(decoded, message);
    assert_eq!(
        decoded.configs().keys().collect::<Vec<_>>(),
        vec!["master-db", "empty"]
    );
}

fn tagged_value() -> impl Strategy<Value = TaggedValue> {
    prop_oneof![
        ".*".prop_map(TaggedValue::String),
        any::<i64>().prop_map(TaggedValue::Sint64),
        any::<u64>().prop_map(TaggedValue::Uint64),
        any::<bool>().prop_map(TaggedValue::Bool),
        (-1.0e6_f64..1.0e6).prop_map(TaggedValue::Double),
        proptest::collection::vec(any::<u8>(), 0..32).prop_map(TaggedValue::Bytes),
    ]
}

proptest! {
    #[test]
    fn encode_decode_preserves_options(
        entries in proptest::collection::vec(("[a-z_]{1,12}", tagged_value()), 0..8)
    ) {
        let mut message = ConfigMessage::new();
        for (name, value) in entries {
            message.set_option(name, value);
        }
        let decoded = ConfigMessage::from_bytes(&message.to_bytes().unwrap()).unwrap();
        prop_assert_eq!(decoded, message);
    }
}
