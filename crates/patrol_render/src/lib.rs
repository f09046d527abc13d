use std::fmt::Write as _;

use chrono::{DateTime, Local};
use patrol_core::backup::BackupInfo;
use patrol_core::core_api::{Session, Snapshot};
use patrol_core::edits::{GlobalEdit, GlobalTarget, WeaponUnlockOutcome, WeaponUnlockSummary};
use patrol_core::record::{FIELD_LEVELS_UNLOCKED, FIELD_MONEY};
use patrol_core::store::LoadReport;
use serde_json::{Map as JsonMap, Value as JsonValue};

pub const TITLE: &str = "Psycho Patrol R Save Editor";
const BACKUP_TIME_FORMAT: &str = "%Y-%m-%d %I:%M:%S %p";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FieldSelection {
    pub levels: bool,
    pub weapons: bool,
    pub money: bool,
    pub records: bool,
}

impl FieldSelection {
    pub fn is_any_selected(&self) -> bool {
        self.levels || self.weapons || self.money || self.records
    }
}

pub fn render_status_text(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    writeln!(&mut out, "{TITLE}").expect("writing to String cannot fail");
    writeln!(
        &mut out,
        "Current Levels Unlocked: {}",
        display_value(&snapshot.levels_unlocked)
    )
    .expect("writing to String cannot fail");
    writeln!(
        &mut out,
        "Number of Weapons Unlocked: {}",
        snapshot.weapons_unlocked
    )
    .expect("writing to String cannot fail");
    writeln!(&mut out, "Current Money: {}", display_value(&snapshot.money))
        .expect("writing to String cannot fail");
    out
}

/// `key=value` lines for the selected fields, in a fixed order.
pub fn render_selected_pairs(
    snapshot: &Snapshot,
    fields: &FieldSelection,
) -> Vec<(&'static str, String)> {
    let mut out = Vec::new();
    if fields.levels {
        out.push((
            "levels_unlocked",
            display_value(&snapshot.levels_unlocked),
        ));
    }
    if fields.weapons {
        out.push(("weapons_unlocked", snapshot.weapons_unlocked.to_string()));
        out.push(("weapon_count", snapshot.weapon_count.to_string()));
    }
    if fields.money {
        out.push(("money", display_value(&snapshot.money)));
    }
    if fields.records {
        out.push(("records", snapshot.record_count.to_string()));
    }
    out
}

pub fn render_json_selected(snapshot: &Snapshot, fields: &FieldSelection) -> JsonValue {
    let mut out = JsonMap::new();
    if fields.levels {
        out.insert(
            "levels_unlocked".to_string(),
            snapshot.levels_unlocked.clone(),
        );
    }
    if fields.weapons {
        out.insert(
            "weapons_unlocked".to_string(),
            JsonValue::from(snapshot.weapons_unlocked),
        );
        out.insert(
            "weapon_count".to_string(),
            JsonValue::from(snapshot.weapon_count),
        );
    }
    if fields.money {
        out.insert("money".to_string(), snapshot.money.clone());
    }
    if fields.records {
        out.insert(
            "records".to_string(),
            JsonValue::from(snapshot.record_count),
        );
    }
    JsonValue::Object(out)
}

pub fn render_json_full(session: &Session) -> JsonValue {
    let snapshot = session.snapshot();
    let mut out = JsonMap::new();

    out.insert(
        "path".to_string(),
        JsonValue::String(session.path().display().to_string()),
    );
    out.insert("levels_unlocked".to_string(), snapshot.levels_unlocked);
    out.insert(
        "weapons_unlocked".to_string(),
        JsonValue::from(snapshot.weapons_unlocked),
    );
    out.insert(
        "weapon_count".to_string(),
        JsonValue::from(snapshot.weapon_count),
    );
    out.insert("money".to_string(), snapshot.money);
    out.insert("has_global".to_string(), JsonValue::Bool(snapshot.has_global));
    out.insert(
        "records".to_string(),
        JsonValue::Array(
            session
                .records()
                .keys()
                .map(|k| JsonValue::String(k.to_string()))
                .collect(),
        ),
    );
    out.insert(
        "warnings".to_string(),
        JsonValue::Array(
            session
                .load_report()
                .warnings
                .iter()
                .map(|w| {
                    let mut m = JsonMap::new();
                    m.insert("line_number".to_string(), JsonValue::from(w.line_number));
                    m.insert("line".to_string(), JsonValue::String(w.line.clone()));
                    m.insert("message".to_string(), JsonValue::String(w.message.clone()));
                    JsonValue::Object(m)
                })
                .collect(),
        ),
    );
    out.insert(
        "dropped_lines".to_string(),
        JsonValue::Array(
            session
                .load_report()
                .dropped
                .iter()
                .map(|d| JsonValue::from(d.line_number))
                .collect(),
        ),
    );

    JsonValue::Object(out)
}

pub fn render_load_warnings(report: &LoadReport) -> Vec<String> {
    let mut out: Vec<String> = report
        .warnings
        .iter()
        .map(|w| format!("Warning: Could not parse line {}: {}", w.line_number, w.line))
        .collect();
    if !report.dropped.is_empty() {
        out.push(format!(
            "Warning: ignored {} line(s) with no id or type",
            report.dropped.len()
        ));
    }
    out
}

pub fn render_unlock_summary(summary: &WeaponUnlockSummary) -> String {
    match summary.outcome() {
        WeaponUnlockOutcome::NoWeapons => "No weapons found in save file.".to_string(),
        WeaponUnlockOutcome::AlreadyUnlocked => "All weapons are already unlocked.".to_string(),
        WeaponUnlockOutcome::Unlocked(n) => format!("Unlocked {n} additional weapons!"),
    }
}

pub fn render_global_edit(edit: &GlobalEdit) -> String {
    let label = match edit.field {
        FIELD_LEVELS_UNLOCKED => "Levels unlocked",
        FIELD_MONEY => "Money",
        other => other,
    };
    let mut out = format!("{label} updated to: {}", edit.value);
    match &edit.target {
        GlobalTarget::Existing(_) => {}
        GlobalTarget::Inserted(key) => {
            write!(&mut out, " (created global record {key})")
                .expect("writing to String cannot fail");
        }
        GlobalTarget::Detached => {
            out.push_str(" (no global record in save; change was not stored)");
        }
    }
    out
}

pub fn render_backup_info(info: Option<&BackupInfo>) -> String {
    match info {
        Some(info) => format!(
            "Backup file created on {}",
            format_backup_time(info.created)
        ),
        None => "No backup file found.".to_string(),
    }
}

pub fn format_backup_time(time: std::time::SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format(BACKUP_TIME_FORMAT)
        .to_string()
}

/// Strings print bare; everything else prints as JSON.
fn display_value(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
