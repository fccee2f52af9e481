use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::progression::level;

/// Coarse growth tier derived from level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Spark,
    Ember,
    Flame,
    Laser,
    Zen,
    Master,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Spark => "spark",
            Stage::Ember => "ember",
            Stage::Flame => "flame",
            Stage::Laser => "laser",
            Stage::Zen => "zen",
            Stage::Master => "master",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Focus growth record.
///
/// `level`, `stage` and `stage_progress` are serialized for readers of the
/// raw JSON but are always recomputed from `xp_total`; they have no setters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressionState {
    pub(crate) xp_total: u64,
    level: u64,
    stage: Stage,
    stage_progress: f64,
    pub(crate) milestones_unlocked: Vec<String>,
    pub(crate) weekly_focus_minutes: BTreeMap<String, u64>,
    pub(crate) weekly_distractions_defeated: BTreeMap<String, u64>,
    /// Totals folded out of weekly maps by retention pruning
    pub(crate) archived_focus_minutes: u64,
    pub(crate) archived_distractions_defeated: u64,
}

impl Default for ProgressionState {
    fn default() -> Self {
        ProgressionState {
            xp_total: 0,
            level: 1,
            stage: Stage::Spark,
            stage_progress: 0.0,
            milestones_unlocked: Vec::new(),
            weekly_focus_minutes: BTreeMap::new(),
            weekly_distractions_defeated: BTreeMap::new(),
            archived_focus_minutes: 0,
            archived_distractions_defeated: 0,
        }
    }
}

impl ProgressionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn xp_total(&self) -> u64 {
        self.xp_total
    }

    pub fn level(&self) -> u64 {
        self.level
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Fraction of the current stage's level range completed, in `[0, 1]`.
    pub fn stage_progress(&self) -> f64 {
        self.stage_progress
    }

    pub fn milestones_unlocked(&self) -> &[String] {
        &self.milestones_unlocked
    }

    pub fn weekly_focus_minutes(&self) -> &BTreeMap<String, u64> {
        &self.weekly_focus_minutes
    }

    pub fn weekly_distractions_defeated(&self) -> &BTreeMap<String, u64> {
        &self.weekly_distractions_defeated
    }

    /// XP still needed to reach the next level.
    pub fn xp_to_next_level(&self) -> u64 {
        level::XP_PER_LEVEL - self.xp_total % level::XP_PER_LEVEL
    }

    /// Re-derive level, stage and stage progress from `xp_total`.
    pub(crate) fn recompute(&mut self) {
        self.level = level::level_for_xp(self.xp_total);
        self.stage = level::stage_for_level(self.level);
        self.stage_progress = level::stage_progress(self.xp_total);
    }

    /// Repair a freshly deserialized record. Returns `true` when week keys
    /// had to be rewritten, so the caller can persist the repaired record.
    pub(crate) fn normalize(&mut self) -> bool {
        self.recompute();
        let mut seen = std::collections::HashSet::new();
        self.milestones_unlocked.retain(|id| seen.insert(id.clone()));

        let focus_rekeyed = rekey_weeks(&mut self.weekly_focus_minutes);
        let defeated_rekeyed = rekey_weeks(&mut self.weekly_distractions_defeated);
        focus_rekeyed || defeated_rekeyed
    }
}

/// Older builds wrote week numbers unpadded (`2025-W8`). Merge those into
/// the padded form so keys sort chronologically.
fn rekey_weeks(map: &mut BTreeMap<String, u64>) -> bool {
    let stale: Vec<String> = map
        .keys()
        .filter(|k| padded_week_key(k).is_some())
        .cloned()
        .collect();
    for key in &stale {
        if let (Some(count), Some(padded)) = (map.remove(key), padded_week_key(key)) {
            let entry = map.entry(padded).or_insert(0);
            *entry = entry.saturating_add(count);
        }
    }
    !stale.is_empty()
}

/// Padded form of a week key that is not already canonical.
fn padded_week_key(key: &str) -> Option<String> {
    let (year, week) = key.split_once("-W")?;
    let year: i32 = year.parse().ok()?;
    let week: u32 = week.parse().ok()?;
    let padded = format!("{:04}-W{:02}", year, week);
    (padded != key).then_some(padded)
}

/// Abstinence streak and reward currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StreakState {
    pub current: u32,
    pub longest: u32,
    pub orbs: u32,
    pub last_completed_day_key: Option<String>,
    #[serde(rename = "freeSinceISO")]
    pub free_since: DateTime<Utc>,
}

impl StreakState {
    pub fn new(now: DateTime<Utc>) -> Self {
        StreakState {
            current: 0,
            longest: 0,
            orbs: 0,
            last_completed_day_key: None,
            free_since: now,
        }
    }

    /// Repair a freshly deserialized record.
    pub(crate) fn normalize(&mut self) {
        self.longest = self.longest.max(self.current);
    }
}

impl Default for StreakState {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}
