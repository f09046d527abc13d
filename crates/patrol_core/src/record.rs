use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

pub const FIELD_ID: &str = "id";
pub const FIELD_TYPE: &str = "type";
pub const FIELD_MONEY: &str = "money";
pub const FIELD_LEVELS_UNLOCKED: &str = "levels_unlocked";
pub const FIELD_UNLOCKED: &str = "unlocked";

pub const TYPE_GLOBAL: &str = "global";
pub const TYPE_WEAPON: &str = "weapon";

/// One JSON object from the save, with its field order intact.
///
/// Nothing beyond `id` and `type` is assumed to exist; every other field is
/// probed through the `get_or` style accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(JsonMap<String, JsonValue>);

impl Record {
    pub fn new() -> Self {
        Self(JsonMap::new())
    }

    /// Returns `None` for anything that is not a JSON object.
    pub fn from_value(value: JsonValue) -> Option<Self> {
        match value {
            JsonValue::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// The record synthesized when a save has no global entry.
    pub fn default_global() -> Self {
        let mut record = Self::new();
        record.set(FIELD_TYPE, TYPE_GLOBAL);
        record.set(FIELD_MONEY, 0);
        record
    }

    pub fn id(&self) -> Option<&JsonValue> {
        self.0.get(FIELD_ID)
    }

    pub fn record_type(&self) -> Option<&JsonValue> {
        self.0.get(FIELD_TYPE)
    }

    pub fn type_is(&self, kind: &str) -> bool {
        self.record_type().and_then(JsonValue::as_str) == Some(kind)
    }

    pub fn get(&self, field: &str) -> Option<&JsonValue> {
        self.0.get(field)
    }

    pub fn get_or(&self, field: &str, default: JsonValue) -> JsonValue {
        self.0.get(field).cloned().unwrap_or(default)
    }

    /// True only for the JSON boolean `true`.
    pub fn is_true(&self, field: &str) -> bool {
        matches!(self.0.get(field), Some(JsonValue::Bool(true)))
    }

    pub fn set(&mut self, field: &str, value: impl Into<JsonValue>) {
        self.0.insert(field.to_string(), value.into());
    }

    pub fn fields(&self) -> &JsonMap<String, JsonValue> {
        &self.0
    }

    pub fn into_value(self) -> JsonValue {
        JsonValue::Object(self.0)
    }

    /// Compact JSON (`,` and `:` with no padding), no trailing newline.
    pub fn to_compact_line(&self) -> String {
        // Serializing a map of `Value`s cannot fail: keys are already strings.
        serde_json::to_string(&self.0).unwrap_or_default()
    }
}

impl From<JsonMap<String, JsonValue>> for Record {
    fn from(map: JsonMap<String, JsonValue>) -> Self {
        Self(map)
    }
}

/// Text form of a field value used when building keys: strings verbatim,
/// everything else as compact JSON.
pub fn key_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
