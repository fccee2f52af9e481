//! Daily check-ins: mood, urge, triggers and wins for one moment in time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::OrbitError;
use crate::storage::{load_record, save_record, KeyValueStore};

pub const CHECKINS_KEY: &str = "orbit:checkins_v1";

pub const MOOD_RANGE: (u8, u8) = (1, 5);
pub const URGE_MAX: u8 = 10;

/// Number of recent check-ins the averages look at
const AVERAGE_WINDOW: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckIn {
    pub id: String,
    #[serde(rename = "dateISO")]
    pub date: DateTime<Utc>,
    pub mood: u8,
    pub urge: u8,
    #[serde(default)]
    pub triggers: Vec<String>,
    #[serde(default)]
    pub wins: Vec<String>,
    #[serde(rename = "relapseBool", default)]
    pub relapse: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// User input for a check-in before it gets an id and timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckInDraft {
    pub mood: u8,
    pub urge: u8,
    pub triggers: Vec<String>,
    pub wins: Vec<String>,
    pub relapse: bool,
    pub note: Option<String>,
}

impl CheckInDraft {
    /// Clamp scales into range and drop blank notes.
    pub fn into_checkin(self, id: String, date: DateTime<Utc>) -> CheckIn {
        CheckIn {
            id,
            date,
            mood: self.mood.clamp(MOOD_RANGE.0, MOOD_RANGE.1),
            urge: self.urge.min(URGE_MAX),
            triggers: self.triggers,
            wins: self.wins,
            relapse: self.relapse,
            note: self.note.filter(|n| !n.trim().is_empty()),
        }
    }
}

/// All check-ins, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckInLog {
    pub entries: Vec<CheckIn>,
}

impl CheckInLog {
    pub fn push(&mut self, checkin: CheckIn) {
        self.entries.insert(0, checkin);
    }

    pub fn recent(&self, n: usize) -> &[CheckIn] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn average_mood(&self) -> Option<f64> {
        average(self.recent(AVERAGE_WINDOW).iter().map(|c| c.mood))
    }

    pub fn average_urge(&self) -> Option<f64> {
        average(self.recent(AVERAGE_WINDOW).iter().map(|c| c.urge))
    }
}

fn average(values: impl Iterator<Item = u8>) -> Option<f64> {
    let (sum, count) = values.fold((0u32, 0u32), |(s, c), v| (s + u32::from(v), c + 1));
    if count == 0 {
        None
    } else {
        Some(f64::from(sum) / f64::from(count))
    }
}

pub fn load(store: &dyn KeyValueStore) -> Result<CheckInLog, OrbitError> {
    Ok(load_record(store, CHECKINS_KEY)?.unwrap_or_default())
}

pub fn save(store: &dyn KeyValueStore, log: &CheckInLog) -> Result<(), OrbitError> {
    save_record(store, CHECKINS_KEY, log)
}
