//! Focus sessions: a timed block of work with distractions to resist.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::OrbitError;
use crate::storage::{load_record, optional_timestamp, save_record, KeyValueStore};

pub const FOCUS_KEY: &str = "orbit:focus_v1";

/// Actions from the pre-session checklist that count as a completed session
/// even when the timer was stopped early.
pub const MIN_ACTIONS_FOR_COMPLETION: u32 = 2;

/// Orbs for a completed session, tiered by the chosen preset length.
pub fn orb_reward(preset_min: u32) -> u32 {
    if preset_min >= 45 {
        3
    } else if preset_min >= 25 {
        2
    } else {
        1
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FocusSessionDraft {
    pub preset_min: u32,
    pub elapsed_seconds: u64,
    pub distraction_types: Vec<String>,
    pub pull_level: u8,
    pub actions_taken: u32,
}

impl FocusSessionDraft {
    /// Whole minutes focused, rounded half up.
    pub fn duration_min(&self) -> u64 {
        (self.elapsed_seconds + 30) / 60
    }

    pub fn is_completed(&self) -> bool {
        self.elapsed_seconds >= u64::from(self.preset_min) * 60
            || self.actions_taken >= MIN_ACTIONS_FOR_COMPLETION
    }

    pub fn into_event(self, id: String, date: DateTime<Utc>) -> FocusEvent {
        FocusEvent {
            id,
            date,
            duration_min: self.duration_min(),
            completed: self.is_completed(),
            distraction_types: self.distraction_types,
            pull_level: self.pull_level.min(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusEvent {
    pub id: String,
    #[serde(rename = "dateISO")]
    pub date: DateTime<Utc>,
    pub duration_min: u64,
    #[serde(default)]
    pub distraction_types: Vec<String>,
    #[serde(default)]
    pub pull_level: u8,
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FocusStats {
    pub distractions_resisted: u32,
    pub total_focus_minutes: u64,
    #[serde(rename = "lastFocusAtISO", deserialize_with = "optional_timestamp")]
    pub last_focus_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FocusLog {
    pub focus_events: Vec<FocusEvent>,
    pub focus_stats: FocusStats,
}

impl FocusLog {
    /// Append an event; completed sessions also count toward the stats.
    pub fn record(&mut self, event: FocusEvent) {
        if event.completed {
            let stats = &mut self.focus_stats;
            stats.distractions_resisted = stats.distractions_resisted.saturating_add(1);
            stats.total_focus_minutes = stats.total_focus_minutes.saturating_add(event.duration_min);
            stats.last_focus_at = Some(event.date);
        }
        self.focus_events.push(event);
    }
}

pub fn load(store: &dyn KeyValueStore) -> Result<FocusLog, OrbitError> {
    Ok(load_record(store, FOCUS_KEY)?.unwrap_or_default())
}

pub fn save(store: &dyn KeyValueStore, log: &FocusLog) -> Result<(), OrbitError> {
    save_record(store, FOCUS_KEY, log)
}
