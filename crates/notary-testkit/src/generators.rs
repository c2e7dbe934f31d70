//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::{Map, Value};

use notary_core::{KeyOrder, Verb};

/// Object keys: a mix of table keys, `signature`, and arbitrary text.
pub fn object_key() -> impl Strategy<Value = String> {
    let known: Vec<String> = KeyOrder::v1().keys().into_iter().map(String::from).collect();
    prop_oneof![
        3 => prop::sample::select(known),
        1 => Just("signature".to_string()),
        1 => Just("otherSubject".to_string()),
        3 => "[a-zA-Z][a-zA-Z0-9]{0,8}",
        1 => "\\PC{1,4}",
    ]
}

/// Numbers as they appear in ledgers: integers and finite floats.
pub fn number() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        any::<u32>().prop_map(Value::from),
        prop::num::f64::NORMAL.prop_map(Value::from),
        Just(Value::from(0.5)),
        Just(Value::from(1e21)),
        Just(Value::from(1e-7)),
    ]
}

/// Scalar JSON values.
pub fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        number(),
        "\\PC{0,12}".prop_map(Value::String),
        "[0-9a-f]{40}".prop_map(Value::String),
    ]
}

/// Arbitrary nested JSON values.
pub fn json_value() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec((object_key(), inner), 0..6).prop_map(|entries| {
                Value::Object(entries.into_iter().collect::<Map<String, Value>>())
            }),
        ]
    })
}

/// Arbitrary JSON objects.
pub fn json_object() -> impl Strategy<Value = Value> {
    prop::collection::vec((object_key(), json_value()), 0..8)
        .prop_map(|entries| Value::Object(entries.into_iter().collect()))
}

/// A verb.
pub fn verb() -> impl Strategy<Value = Verb> {
    prop::sample::select(Verb::ALL.to_vec())
}

/// A subject: a bare token or a small object.
pub fn subject() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[0-9a-f]{40}".prop_map(Value::String),
        ("[a-z]{1,6}", "[A-Za-z ]{1,12}").prop_map(|(kind, title)| {
            serde_json::json!({ "contentType": kind, "title": title })
        }),
    ]
}

/// A raw statement record with one verb, an optional paired subject, and
/// a time within one day.
pub fn statement_record() -> impl Strategy<Value = Value> {
    (
        verb(),
        subject(),
        prop::option::of(subject()),
        0u32..86_400,
        "[0-9a-f]{16}",
    )
        .prop_map(|(verb, subject, other, second, signature)| {
            let mut record = Map::new();
            record.insert("statement".into(), Value::from("org.nerdster"));
            record.insert(
                "time".into(),
                Value::from(format!(
                    "2024-01-01T{:02}:{:02}:{:02}Z",
                    second / 3600,
                    (second / 60) % 60,
                    second % 60
                )),
            );
            record.insert(verb.as_str().into(), subject);
            if let Some(other) = other {
                record.insert("with".into(), serde_json::json!({ "otherSubject": other }));
            }
            record.insert("signature".into(), Value::from(signature));
            Value::Object(record)
        })
}

/// Reorder every object's keys by a seeded permutation.
///
/// Values under `signature` are left as they are: the encoder copies them
/// verbatim, so their key order is part of the canonical text.
pub fn permute_keys(value: &Value, seed: u64) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(|v| permute_keys(v, seed)).collect()),
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by_key(|(key, _)| scramble(seed, key));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| {
                        let v = if k == "signature" { v.clone() } else { permute_keys(v, seed) };
                        (k.clone(), v)
                    })
                    .collect(),
            )
        }
        scalar => scalar.clone(),
    }
}

/// FNV-1a over the seed and key.
fn scramble(seed: u64, key: &str) -> u64 {
    let mut hash = 0xcbf29ce484222325u64 ^ seed;
    for byte in key.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
