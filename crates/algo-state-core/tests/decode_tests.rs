// Integration tests for state decoding against node-shaped JSON

use algo_state_core::{decode_state, decode_state_json, DecodeError, StateKey, StateValue};
use base64::Engine;
use serde_json::json;

fn b64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

fn entries(doc: serde_json::Value) -> Vec<algo_state_core::StateEntry> {
    serde_json::from_value(doc).unwrap()
}

#[test]
fn test_empty_input() {
    let state = decode_state(&[], false).unwrap();
    assert!(state.is_empty());
}

#[test]
fn test_text_round_trip() {
    let list = entries(json!([
        {"key": b64("greeting".as_bytes()), "value": {"action": 1, "bytes": b64("héllo wörld".as_bytes())}}
    ]));
    let state = decode_state(&list, false).unwrap();
    assert_eq!(state.text("greeting"), Some("héllo wörld"));
}

#[test]
fn test_hex_fallback() {
    let list = entries(json!([
        {"key": b64(b"blob"), "value": {"action": 1, "bytes": b64(&[0xff, 0xfe])}}
    ]));
    let state = decode_state(&list, false).unwrap();
    assert_eq!(state.get("blob"), Some(&StateValue::Text("fffe".to_string())));
}

#[test]
fn test_hex_fallback_for_key() {
    let list = entries(json!([
        {"key": b64(&[0x00, 0xc3]), "value": {"type": 2, "uint": 9}}
    ]));
    let state = decode_state(&list, false).unwrap();
    assert_eq!(state.uint("00c3"), Some(9));
}

#[test]
fn test_raw_mode() {
    let list = entries(json!([
        {"key": b64(&[0xff, 0xfe]), "value": {"action": 1, "bytes": b64(&[0xff, 0xfe])}}
    ]));
    let state = decode_state(&list, true).unwrap();
    assert_eq!(state.len(), 1);
    let (key, value) = state.iter().next().unwrap();
    assert_eq!(key, &StateKey::Raw(vec![0xff, 0xfe]));
    assert_eq!(value, &StateValue::Raw(vec![0xff, 0xfe]));
    assert_eq!(
        state.get_raw(&[0xff, 0xfe]),
        Some(&StateValue::Raw(vec![0xff, 0xfe]))
    );
}

#[test]
fn test_raw_mode_keeps_utf8_as_bytes() {
    let list = entries(json!([
        {"key": b64(b"name"), "value": {"type": 1, "bytes": b64(b"alice")}}
    ]));
    let state = decode_state(&list, true).unwrap();
    assert_eq!(state.get_raw(b"name"), Some(&StateValue::Raw(b"alice".to_vec())));
    assert_eq!(state.get("name"), None);
}

#[test]
fn test_tag_dispatch() {
    let list = entries(json!([
        {"key": b64(b"count"), "value": {"action": 2, "uint": 42}},
        {"key": b64(b"gone"), "value": {"action": 3}},
        {"key": b64(b"word"), "value": {"type": 1, "bytes": b64(b"hi")}}
    ]));
    let state = decode_state(&list, false).unwrap();
    assert_eq!(state.uint("count"), Some(42));
    assert!(state.is_absent("gone"));
    assert_eq!(state.text("word"), Some("hi"));
}

#[test]
fn test_uint_max() {
    let list = entries(json!([
        {"key": b64(b"max"), "value": {"type": 2, "uint": u64::MAX}}
    ]));
    let state = decode_state(&list, false).unwrap();
    assert_eq!(state.uint("max"), Some(u64::MAX));
}

#[test]
fn test_last_write_wins() {
    let list = entries(json!([
        {"key": b64(b"counter"), "value": {"type": 2, "uint": 1}},
        {"key": b64(b"other"), "value": {"type": 2, "uint": 5}},
        {"key": b64(b"counter"), "value": {"type": 2, "uint": 2}}
    ]));
    let state = decode_state(&list, false).unwrap();
    assert_eq!(state.len(), 2);
    assert_eq!(state.uint("counter"), Some(2));
}

#[test]
fn test_collision_between_text_and_hex_fallback() {
    // "fffe" as text and [0xff, 0xfe] as invalid UTF-8 decode to the same key
    let list = entries(json!([
        {"key": b64(b"fffe"), "value": {"type": 2, "uint": 1}},
        {"key": b64(&[0xff, 0xfe]), "value": {"type": 2, "uint": 2}}
    ]));
    let state = decode_state(&list, false).unwrap();
    assert_eq!(state.len(), 1);
    assert_eq!(state.uint("fffe"), Some(2));

    let raw = decode_state(&list, true).unwrap();
    assert_eq!(raw.len(), 2);
}

#[test]
fn test_invalid_base64_value() {
    let list = entries(json!([
        {"key": b64(b"k"), "value": {"action": 1, "bytes": "not-valid-base64!!"}}
    ]));
    assert!(matches!(
        decode_state(&list, false),
        Err(DecodeError::InvalidBase64 { field: "bytes", .. })
    ));
}

#[test]
fn test_missing_tag() {
    let list = entries(json!([{"key": b64(b"k"), "value": {}}]));
    assert!(matches!(
        decode_state(&list, false),
        Err(DecodeError::MissingTag)
    ));
}

#[test]
fn test_unknown_tag() {
    let list = entries(json!([{"key": b64(b"k"), "value": {"type": 4, "uint": 1}}]));
    assert!(matches!(
        decode_state(&list, false),
        Err(DecodeError::UnknownTag(4))
    ));
}

#[test]
fn test_error_discards_partial_result() {
    let list = entries(json!([
        {"key": b64(b"ok"), "value": {"type": 2, "uint": 1}},
        {"key": b64(b"bad"), "value": {"type": 9}}
    ]));
    assert!(decode_state(&list, false).is_err());
}

#[test]
fn test_application_info_document() {
    let doc = json!({
        "id": 1001,
        "params": {
            "creator": "CREATOR",
            "global-state": [
                {"key": b64(b"users"), "value": {"type": 2, "bytes": "", "uint": 1}},
                {"key": b64(b"manager"), "value": {"type": 1, "bytes": b64(&[0u8; 32]), "uint": 0}}
            ],
            "global-state-schema": {"num-uint": 1, "num-byte-slice": 1}
        }
    });
    let state = decode_state_json(&doc, false).unwrap();
    assert_eq!(state.uint("users"), Some(1));
    // 32 zero bytes are valid UTF-8
    assert_eq!(state.text("manager").map(str::len), Some(32));
}

#[test]
fn test_fresh_application_has_empty_state() {
    let doc = json!({"id": 1, "params": {"creator": "CREATOR"}});
    assert!(decode_state_json(&doc, false).unwrap().is_empty());
}

#[test]
fn test_serialized_output() {
    let list = entries(json!([
        {"key": b64(b"count"), "value": {"action": 2, "uint": 42}},
        {"key": b64(b"gone"), "value": {"action": 3}},
        {"key": b64(b"blob"), "value": {"action": 1, "bytes": b64(&[0xff, 0xfe])}}
    ]));
    let state = decode_state(&list, false).unwrap();
    let json = serde_json::to_string(&state).unwrap();
    assert_eq!(json, r#"{"count":42,"gone":null,"blob":"fffe"}"#);
}
