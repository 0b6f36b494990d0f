/// Decoder for application global/local state returned by algod
use crate::error::DecodeError;
use crate::types::{DecodedState, StateEntry, StateKey, StateValue, ValueTag};
use base64::Engine;
use tracing::debug;

/// Decode a list of node state records into a [`DecodedState`].
///
/// With `raw` unset, keys and byte values are decoded as UTF-8, falling back
/// to lowercase hex when the bytes are not valid UTF-8. With `raw` set they
/// are kept as bytes. Duplicate keys resolve last-write-wins.
pub fn decode_state(entries: &[StateEntry], raw: bool) -> Result<DecodedState, DecodeError> {
    let mut decoded = DecodedState::with_capacity(entries.len());

    for entry in entries {
        let raw_key = decode_base64(&entry.key, "key")?;
        let key = if raw {
            StateKey::Raw(raw_key)
        } else {
            StateKey::Text(str_or_hex(&raw_key))
        };

        let tag = entry.value.tag()?;
        let value = match tag {
            ValueTag::Bytes => {
                let encoded = entry.value.bytes.as_deref().ok_or(DecodeError::MissingValue {
                    tag: tag as u64,
                    field: "bytes",
                })?;
                let raw_value = decode_base64(encoded, "bytes")?;
                if raw {
                    StateValue::Raw(raw_value)
                } else {
                    StateValue::Text(str_or_hex(&raw_value))
                }
            }
            ValueTag::Uint => StateValue::Uint(entry.value.uint.ok_or(
                DecodeError::MissingValue {
                    tag: tag as u64,
                    field: "uint",
                },
            )?),
            ValueTag::Delete => StateValue::Absent,
        };

        decoded.insert(key, value);
    }

    debug!(entries = entries.len(), keys = decoded.len(), raw, "decoded state");
    Ok(decoded)
}

/// Decode state straight from a JSON document.
///
/// Accepts a bare list of records, an application-info response
/// (`params.global-state`) or an account-application-info response
/// (`app-local-state.key-value`). A document with neither list present
/// decodes to an empty state only when it is recognisably one of those
/// responses.
pub fn decode_state_json(
    document: &serde_json::Value,
    raw: bool,
) -> Result<DecodedState, DecodeError> {
    let list = locate_state_list(document)?;
    let entries: Vec<StateEntry> = match list {
        Some(list) => serde_json::from_value(list.clone())
            .map_err(|e| DecodeError::Malformed(e.to_string()))?,
        None => Vec::new(),
    };
    decode_state(&entries, raw)
}

fn locate_state_list(
    document: &serde_json::Value,
) -> Result<Option<&serde_json::Value>, DecodeError> {
    if document.is_array() {
        return Ok(Some(document));
    }
    if let Some(params) = document.get("params") {
        if !params.is_object() {
            return Err(DecodeError::Malformed("`params` is not an object".to_string()));
        }
        return Ok(params.get("global-state"));
    }
    if let Some(local) = document.get("app-local-state") {
        if !local.is_object() {
            return Err(DecodeError::Malformed(
                "`app-local-state` is not an object".to_string(),
            ));
        }
        return Ok(local.get("key-value"));
    }
    if let Some(list) = document.get("key-value") {
        return Ok(Some(list));
    }
    Err(DecodeError::Malformed(
        "expected a state list, an application or an account-application document".to_string(),
    ))
}

/// UTF-8 text when valid, lowercase hex otherwise
pub fn str_or_hex(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => hex::encode(bytes),
    }
}

/// Read a big-endian unsigned integer.
///
/// Leading zero bytes are ignored; an empty slice is zero.
pub fn decode_uint_be(bytes: &[u8]) -> Result<u64, DecodeError> {
    let significant = match bytes.iter().position(|b| *b != 0) {
        Some(first) => &bytes[first..],
        None => return Ok(0),
    };
    if significant.len() > 8 {
        return Err(DecodeError::IntegerOverflow(significant.len()));
    }
    Ok(significant
        .iter()
        .fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
}

pub(crate) fn decode_base64(encoded: &str, field: &'static str) -> Result<Vec<u8>, DecodeError> {
    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|source| DecodeError::InvalidBase64 { field, source })
}
