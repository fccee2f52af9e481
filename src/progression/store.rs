use chrono::{DateTime, Utc};

use crate::error::OrbitError;
use crate::progression::model::{ProgressionState, StreakState};
use crate::storage::{load_or_migrate, load_record, save_record, KeyValueStore};

pub const STREAK_KEY: &str = "orbit:streak_v2";
pub const PROGRESSION_KEY: &str = "orbit:focus_growth_v1";

/// Unprefixed focus growth key written by older builds.
pub const LEGACY_PROGRESSION_KEY: &str = "focus_growth_v1";

/// Per-field keys written by older builds.
pub const LEGACY_STREAK_KEY: &str = "orbit:streak";
pub const LEGACY_ORBS_KEY: &str = "orbit:orbs";
pub const LEGACY_LAST_DONE_KEY: &str = "orbit:lastDone";
pub const LEGACY_FREE_SINCE_KEY: &str = "orbit:freeSince";

const LEGACY_KEYS: [&str; 4] = [
    LEGACY_STREAK_KEY,
    LEGACY_ORBS_KEY,
    LEGACY_LAST_DONE_KEY,
    LEGACY_FREE_SINCE_KEY,
];

/// Load the progression record, or `None` if absent or corrupt.
/// A record under the unprefixed legacy key is moved over first.
pub fn load_progression(store: &dyn KeyValueStore) -> Result<Option<ProgressionState>, OrbitError> {
    let Some(mut state) = load_or_migrate::<ProgressionState>(store, PROGRESSION_KEY, LEGACY_PROGRESSION_KEY)? else {
        return Ok(None);
    };
    if state.normalize() {
        save_progression(store, &state)?;
    }
    Ok(Some(state))
}

pub fn save_progression(store: &dyn KeyValueStore, state: &ProgressionState) -> Result<(), OrbitError> {
    save_record(store, PROGRESSION_KEY, state)
}

/// Load the streak record, folding in legacy per-field keys on first use.
pub fn load_streak(store: &dyn KeyValueStore, now: DateTime<Utc>) -> Result<Option<StreakState>, OrbitError> {
    if let Some(mut state) = load_record::<StreakState>(store, STREAK_KEY)? {
        state.normalize();
        return Ok(Some(state));
    }
    migrate_legacy_streak(store, now)
}

pub fn save_streak(store: &dyn KeyValueStore, state: &StreakState) -> Result<(), OrbitError> {
    save_record(store, STREAK_KEY, state)
}

fn parse_count(raw: Option<&String>) -> u32 {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n.min(u32::MAX as f64) as u32)
        .unwrap_or(0)
}

/// Build a `StreakState` from legacy keys, persist it and remove the
/// legacy keys. Returns `None` when no legacy key exists.
pub fn migrate_legacy_streak(store: &dyn KeyValueStore, now: DateTime<Utc>) -> Result<Option<StreakState>, OrbitError> {
    let values = LEGACY_KEYS
        .iter()
        .map(|k| store.get(k))
        .collect::<Result<Vec<Option<String>>, _>>()?;
    if values.iter().all(Option::is_none) {
        return Ok(None);
    }

    let current = parse_count(values[0].as_ref());
    let free_since = values[3]
        .as_deref()
        .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or(now);
    let state = StreakState {
        current,
        longest: current,
        orbs: parse_count(values[1].as_ref()),
        last_completed_day_key: values[2].clone().filter(|v| !v.trim().is_empty()),
        free_since,
    };

    save_streak(store, &state)?;
    for key in LEGACY_KEYS {
        if let Err(e) = store.remove(key) {
            tracing::warn!(key = key, error = %e, "Failed to remove legacy key");
        }
    }

    tracing::info!(current = state.current, orbs = state.orbs, "Migrated legacy streak keys");
    Ok(Some(state))
}
