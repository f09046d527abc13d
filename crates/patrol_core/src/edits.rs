//! Typed reads and writes over a [`RecordCollection`].
//!
//! Nothing here touches the filesystem; callers decide when to save.

use std::borrow::Cow;
use std::num::IntErrorKind;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core_api::{CoreError, CoreErrorCode};
use crate::record::{
    FIELD_LEVELS_UNLOCKED, FIELD_MONEY, FIELD_UNLOCKED, Record, TYPE_GLOBAL, TYPE_WEAPON,
};
use crate::store::{RecordCollection, RecordKey};

pub const LEVELS_UNLOCKED_MIN: i64 = 1;
pub const LEVELS_UNLOCKED_MAX: i64 = 19;

/// What a global write does when the save has no global record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GlobalFallback {
    /// Insert the default global record under a derived key, then write to it.
    #[default]
    Insert,
    /// Write to a throwaway default record. The change is never saved.
    Detached,
    /// Refuse with `CoreErrorCode::MissingGlobal`.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GlobalTarget {
    Existing(RecordKey),
    Inserted(RecordKey),
    Detached,
}

impl GlobalTarget {
    pub fn is_persistent(&self) -> bool {
        !matches!(self, Self::Detached)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlobalEdit {
    pub field: &'static str,
    pub value: i64,
    pub target: GlobalTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeaponUnlockSummary {
    pub already_unlocked: usize,
    pub newly_unlocked: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponUnlockOutcome {
    NoWeapons,
    AlreadyUnlocked,
    Unlocked(usize),
}

impl WeaponUnlockSummary {
    pub fn outcome(&self) -> WeaponUnlockOutcome {
        if self.total == 0 {
            WeaponUnlockOutcome::NoWeapons
        } else if self.newly_unlocked == 0 {
            WeaponUnlockOutcome::AlreadyUnlocked
        } else {
            WeaponUnlockOutcome::Unlocked(self.newly_unlocked)
        }
    }

    pub fn needs_save(&self) -> bool {
        self.newly_unlocked > 0
    }
}

pub fn global_key(records: &RecordCollection) -> Option<&str> {
    records
        .iter()
        .find(|(_, r)| r.type_is(TYPE_GLOBAL))
        .map(|(k, _)| k)
}

/// First global record in load order, or a fresh default that is *not* part
/// of the collection.
pub fn global(records: &RecordCollection) -> Cow<'_, Record> {
    records
        .records()
        .find(|r| r.type_is(TYPE_GLOBAL))
        .map_or_else(|| Cow::Owned(Record::default_global()), Cow::Borrowed)
}

pub fn weapon_count(records: &RecordCollection) -> usize {
    records.records().filter(|r| r.type_is(TYPE_WEAPON)).count()
}

pub fn count_unlocked_weapons(records: &RecordCollection) -> usize {
    records
        .records()
        .filter(|r| r.type_is(TYPE_WEAPON) && r.is_true(FIELD_UNLOCKED))
        .count()
}

pub fn set_levels_unlocked(
    records: &mut RecordCollection,
    levels: i64,
    fallback: GlobalFallback,
) -> Result<GlobalEdit, CoreError> {
    if !(LEVELS_UNLOCKED_MIN..=LEVELS_UNLOCKED_MAX).contains(&levels) {
        return Err(CoreError::new(
            CoreErrorCode::OutOfRange,
            format!(
                "levels unlocked must be {LEVELS_UNLOCKED_MIN}-{LEVELS_UNLOCKED_MAX}, got {levels}"
            ),
        ));
    }

    let target = with_global(records, fallback, |g| g.set(FIELD_LEVELS_UNLOCKED, levels))?;
    Ok(GlobalEdit {
        field: FIELD_LEVELS_UNLOCKED,
        value: levels,
        target,
    })
}

/// Parses user input as a whole number within the `i64` range.
pub fn parse_money(input: &str) -> Result<i64, CoreError> {
    input.trim().parse::<i64>().map_err(|e| {
        let message = match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => format!(
                "money must be between {} and {}, got {input:?}",
                i64::MIN,
                i64::MAX
            ),
            _ => format!("money must be a whole number, got {input:?}"),
        };
        CoreError::new(CoreErrorCode::NotANumber, message)
    })
}

pub fn set_money(
    records: &mut RecordCollection,
    input: &str,
    fallback: GlobalFallback,
) -> Result<GlobalEdit, CoreError> {
    let amount = parse_money(input)?;
    let target = with_global(records, fallback, |g| g.set(FIELD_MONEY, amount))?;
    Ok(GlobalEdit {
        field: FIELD_MONEY,
        value: amount,
        target,
    })
}

pub fn unlock_all_weapons(records: &mut RecordCollection) -> WeaponUnlockSummary {
    let mut summary = WeaponUnlockSummary {
        already_unlocked: 0,
        newly_unlocked: 0,
        total: 0,
    };

    for (key, record) in records.iter_mut() {
        if !record.type_is(TYPE_WEAPON) {
            continue;
        }
        summary.total += 1;
        if record.is_true(FIELD_UNLOCKED) {
            summary.already_unlocked += 1;
        } else {
            record.set(FIELD_UNLOCKED, true);
            summary.newly_unlocked += 1;
            debug!(%key, "unlocked weapon");
        }
    }

    summary
}

/// First `global_{n}` key, counting up from the derived index, that no
/// record holds yet. An explicit id can occupy the derived key.
fn free_global_key(records: &RecordCollection) -> RecordKey {
    let prefix = format!("{TYPE_GLOBAL}_");
    let mut n = records.count_with_prefix(&prefix);
    loop {
        let key = format!("{prefix}{n}");
        if !records.contains_key(&key) {
            return key;
        }
        n += 1;
    }
}

fn with_global(
    records: &mut RecordCollection,
    fallback: GlobalFallback,
    apply: impl FnOnce(&mut Record),
) -> Result<GlobalTarget, CoreError> {
    if let Some(key) = global_key(records).map(str::to_string) {
        if let Some(record) = records.get_mut(&key) {
            apply(record);
        }
        return Ok(GlobalTarget::Existing(key));
    }

    let mut record = Record::default_global();
    apply(&mut record);
    match fallback {
        GlobalFallback::Insert => {
            let key = free_global_key(records);
            debug!(%key, "inserted default global record");
            records.insert(key.clone(), record);
            Ok(GlobalTarget::Inserted(key))
        }
        GlobalFallback::Detached => Ok(GlobalTarget::Detached),
        GlobalFallback::Reject => Err(CoreError::new(
            CoreErrorCode::MissingGlobal,
            "save has no global record",
        )),
    }
}
