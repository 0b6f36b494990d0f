/// Shared types: node wire shapes and decoded state
use crate::error::DecodeError;
use indexmap::IndexMap;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value tag carried by the node under `action` (deltas) or `type` (state queries)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueTag {
    Bytes = 1,
    Uint = 2,
    Delete = 3,
}

impl TryFrom<u64> for ValueTag {
    type Error = DecodeError;

    fn try_from(tag: u64) -> Result<Self, Self::Error> {
        match tag {
            1 => Ok(ValueTag::Bytes),
            2 => Ok(ValueTag::Uint),
            3 => Ok(ValueTag::Delete),
            other => Err(DecodeError::UnknownTag(other)),
        }
    }
}

/// Single key/value record as returned by the node
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StateEntry {
    pub key: String,
    pub value: TealValue,
}

/// Tagged value of a state record. Exactly one of `action`/`type` is expected.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TealValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<u64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uint: Option<u64>,
}

impl TealValue {
    /// Resolve the tag, preferring `action` over `type`.
    pub fn tag(&self) -> Result<ValueTag, DecodeError> {
        let raw = self.action.or(self.kind).ok_or(DecodeError::MissingTag)?;
        ValueTag::try_from(raw)
    }
}

/// Decoded key: text (or hex fallback) in normal mode, bytes in raw mode
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StateKey {
    Text(String),
    Raw(Vec<u8>),
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateKey::Text(s) => write!(f, "{}", s),
            StateKey::Raw(b) => write!(f, "0x{}", hex::encode(b)),
        }
    }
}

/// Decoded value of a state record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateValue {
    Text(String),
    Raw(Vec<u8>),
    Uint(u64),
    Absent,
}

impl StateValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            StateValue::Text(_) => "bytes",
            StateValue::Raw(_) => "bytes",
            StateValue::Uint(_) => "uint",
            StateValue::Absent => "none",
        }
    }
}

impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateValue::Text(s) => write!(f, "\"{}\"", s),
            StateValue::Raw(b) => write!(f, "0x{}", hex::encode(b)),
            StateValue::Uint(n) => write!(f, "{}", n),
            StateValue::Absent => write!(f, "none"),
        }
    }
}

impl Serialize for StateValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StateValue::Text(s) => serializer.serialize_str(s),
            StateValue::Raw(b) => serializer.serialize_str(&hex::encode(b)),
            StateValue::Uint(n) => serializer.serialize_u64(*n),
            StateValue::Absent => serializer.serialize_none(),
        }
    }
}

/// Decoded application state.
///
/// Keeps insertion order. Inserting an existing key replaces its value in
/// place, so the key keeps the position of its first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedState {
    entries: IndexMap<StateKey, StateValue>,
}

impl DecodedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Insert a value, returning the one it replaced.
    pub fn insert(&mut self, key: StateKey, value: StateValue) -> Option<StateValue> {
        self.entries.insert(key, value)
    }

    /// Look up a text key (non-raw mode)
    pub fn get(&self, key: &str) -> Option<&StateValue> {
        self.entries.get(&StateKey::Text(key.to_string()))
    }

    /// Look up a byte key (raw mode)
    pub fn get_raw(&self, key: &[u8]) -> Option<&StateValue> {
        self.entries.get(&StateKey::Raw(key.to_vec()))
    }

    pub fn get_key(&self, key: &StateKey) -> Option<&StateValue> {
        self.entries.get(key)
    }

    pub fn uint(&self, key: &str) -> Option<u64> {
        match self.get(key) {
            Some(StateValue::Uint(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(StateValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_absent(&self, key: &str) -> bool {
        matches!(self.get(key), Some(StateValue::Absent))
    }

    pub fn contains_key(&self, key: &StateKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &StateValue)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &StateKey> {
        self.entries.keys()
    }
}

impl Serialize for DecodedState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in self.entries.iter() {
            match key {
                StateKey::Text(s) => map.serialize_entry(s, value)?,
                StateKey::Raw(b) => map.serialize_entry(&hex::encode(b), value)?,
            }
        }
        map.end()
    }
}

/// Global/local state schema as reported by the node
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StateSchema {
    #[serde(rename = "num-uint", default)]
    pub num_uint: u64,
    #[serde(rename = "num-byte-slice", default)]
    pub num_byte_slice: u64,
}

/// Response of `GET /v2/applications/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationInfo {
    pub id: u64,
    pub params: ApplicationParams,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationParams {
    pub creator: String,
    #[serde(rename = "global-state", default)]
    pub global_state: Vec<StateEntry>,
    #[serde(rename = "global-state-schema", default)]
    pub global_state_schema: Option<StateSchema>,
    #[serde(rename = "local-state-schema", default)]
    pub local_state_schema: Option<StateSchema>,
}

/// Response of `GET /v2/accounts/{address}/applications/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct AccountApplicationInfo {
    #[serde(default)]
    pub round: Option<u64>,
    #[serde(rename = "app-local-state", default)]
    pub app_local_state: Option<ApplicationLocalState>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationLocalState {
    pub id: u64,
    #[serde(rename = "key-value", default)]
    pub key_value: Vec<StateEntry>,
    #[serde(default)]
    pub schema: Option<StateSchema>,
}

/// Response of `GET /v2/applications/{id}/box`
#[derive(Debug, Clone, Deserialize)]
pub struct BoxResponse {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub round: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoxDescriptor {
    pub name: String,
}

/// Response of `GET /v2/applications/{id}/boxes`
#[derive(Debug, Clone, Deserialize)]
pub struct BoxesResponse {
    #[serde(default)]
    pub boxes: Vec<BoxDescriptor>,
}

/// Global state of an application captured at a point in time
#[derive(Debug, Clone, Serialize)]
pub struct AppSnapshot {
    pub app_id: u64,
    pub creator: String,
    pub fetched_at: String,
    pub global: DecodedState,
}

/// Entry whose value differs between two states
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ModifiedEntry {
    pub key: String,
    pub before: StateValue,
    pub after: StateValue,
}

/// Difference between two decoded states
#[derive(Debug, Clone, Default, Serialize)]
pub struct StateDiff {
    pub added: DecodedState,
    pub removed: DecodedState,
    pub modified: Vec<ModifiedEntry>,
    pub unchanged: usize,
}

impl StateDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_prefers_action() {
        let value = TealValue {
            action: Some(2),
            kind: Some(1),
            ..Default::default()
        };
        assert_eq!(value.tag().unwrap(), ValueTag::Uint);
    }

    #[test]
    fn test_tag_missing() {
        let value = TealValue::default();
        assert!(matches!(value.tag(), Err(DecodeError::MissingTag)));
    }

    #[test]
    fn test_insert_keeps_first_position() {
        let mut state = DecodedState::new();
        state.insert(StateKey::Text("a".into()), StateValue::Uint(1));
        state.insert(StateKey::Text("b".into()), StateValue::Uint(2));
        let old = state.insert(StateKey::Text("a".into()), StateValue::Uint(3));

        assert_eq!(old, Some(StateValue::Uint(1)));
        assert_eq!(state.len(), 2);
        let keys: Vec<_> = state.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(state.uint("a"), Some(3));
    }

    #[test]
    fn test_large_state_lookup() {
        let count = 50_000;
        let mut state = DecodedState::with_capacity(count);
        for i in 0..count {
            state.insert(StateKey::Text(format!("key-{}", i)), StateValue::Uint(i as u64));
        }
        state.insert(StateKey::Raw(vec![0xff, 0x00]), StateValue::Absent);

        assert_eq!(state.len(), count + 1);
        assert_eq!(state.uint("key-0"), Some(0));
        assert_eq!(state.uint("key-49999"), Some(49_999));
        assert!(state.get_raw(&[0xff, 0x00]).is_some());
        assert!(state.get("missing").is_none());
        assert_eq!(
            state.keys().next().map(|k| k.to_string()),
            Some("key-0".to_string())
        );
    }

    #[test]
    fn test_serialize_state() {
        let mut state = DecodedState::new();
        state.insert(StateKey::Text("name".into()), StateValue::Text("hi".into()));
        state.insert(StateKey::Raw(vec![0xff]), StateValue::Raw(vec![0x01, 0x02]));
        state.insert(StateKey::Text("count".into()), StateValue::Uint(7));
        state.insert(StateKey::Text("gone".into()), StateValue::Absent);

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "hi", "ff": "0102", "count": 7, "gone": null})
        );
    }

    #[test]
    fn test_application_info_without_global_state() {
        let info: ApplicationInfo = serde_json::from_value(serde_json::json!({
            "id": 5,
            "params": {"creator": "CREATOR"}
        }))
        .unwrap();
        assert!(info.params.global_state.is_empty());
        assert!(info.params.global_state_schema.is_none());
    }
}
