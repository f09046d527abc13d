use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Status figures shown after every edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Snapshot {
    /// Raw `levels_unlocked` value from the global record, `0` when absent.
    pub levels_unlocked: JsonValue,
    pub weapons_unlocked: usize,
    pub weapon_count: usize,
    /// Raw `money` value from the global record, `0` when absent.
    pub money: JsonValue,
    pub has_global: bool,
    pub record_count: usize,
    pub warning_count: usize,
    pub dropped_count: usize,
}
