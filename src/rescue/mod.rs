//! Panic rescue flow: urge events resisted in the moment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::OrbitError;
use crate::storage::{load_record, optional_timestamp, save_record, KeyValueStore};

pub const PANIC_KEY: &str = "orbit:panic_v1";

/// Orbs granted for each urge resisted.
pub const RESCUE_ORB_REWARD: u32 = 1;

pub const URGE_MAX: u8 = 10;

pub const QUICK_ACTIONS: [&str; 6] = [
    "Walk 2 minutes",
    "Cold water / wash face",
    "20 push-ups / 1m plank",
    "Journal 3 lines",
    "Clean desk for 3m",
    "Message a friend",
];

const NEED_SUGGESTIONS: [(&str, &str); 5] = [
    ("rest", "Your mind is tired. Lie down for 5 minutes with eyes closed. No screens."),
    ("connection", "Isolation feeds the urge. Call or text someone you trust right now."),
    ("achievement", "You need a win. Complete one small task on your to-do list."),
    ("comfort", "Try a warm drink or a soft blanket. Be gentle with yourself."),
    ("relief", "The urge is a false promise of relief. Try 2 minutes of stretching instead."),
];

const GENERIC_SUGGESTION: &str =
    "Breathe slowly for one minute, then pick one quick action and start it now.";

/// Suggestion for the underlying need behind an urge (case-insensitive).
pub fn suggestion_for_need(need: &str) -> &'static str {
    let need = need.trim().to_ascii_lowercase();
    NEED_SUGGESTIONS
        .iter()
        .find(|(n, _)| *n == need)
        .map(|(_, s)| *s)
        .unwrap_or(GENERIC_SUGGESTION)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgeOutcome {
    Resisted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrgeEvent {
    pub id: String,
    #[serde(rename = "dateISO")]
    pub date: DateTime<Utc>,
    pub urge_level: u8,
    #[serde(default)]
    pub triggers: Vec<String>,
    pub outcome: UrgeOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RescueStats {
    pub urges_resisted: u32,
    #[serde(rename = "lastUrgeAtISO", deserialize_with = "optional_timestamp")]
    pub last_urge_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RescueLog {
    pub urge_events: Vec<UrgeEvent>,
    pub stats: RescueStats,
}

impl RescueLog {
    /// Record an urge resisted and return the stored event.
    pub fn record_resisted(
        &mut self,
        id: String,
        urge_level: u8,
        triggers: Vec<String>,
        now: DateTime<Utc>,
    ) -> &UrgeEvent {
        self.stats.urges_resisted = self.stats.urges_resisted.saturating_add(1);
        self.stats.last_urge_at = Some(now);
        self.urge_events.push(UrgeEvent {
            id,
            date: now,
            urge_level: urge_level.min(URGE_MAX),
            triggers,
            outcome: UrgeOutcome::Resisted,
        });
        &self.urge_events[self.urge_events.len() - 1]
    }
}

pub fn load(store: &dyn KeyValueStore) -> Result<RescueLog, OrbitError> {
    Ok(load_record(store, PANIC_KEY)?.unwrap_or_default())
}

pub fn save(store: &dyn KeyValueStore, log: &RescueLog) -> Result<(), OrbitError> {
    save_record(store, PANIC_KEY, log)
}
