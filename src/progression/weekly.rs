use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone};

use crate::progression::dates::week_key;
use crate::progression::model::ProgressionState;

impl ProgressionState {
    pub fn record_focus_minutes<Tz: TimeZone>(&mut self, minutes: u64, now: &DateTime<Tz>) {
        let entry = self.weekly_focus_minutes.entry(week_key(now)).or_insert(0);
        *entry = entry.saturating_add(minutes);
    }

    pub fn record_distraction_defeated<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) {
        let entry = self.weekly_distractions_defeated.entry(week_key(now)).or_insert(0);
        *entry = entry.saturating_add(1);
    }

    pub fn focus_minutes_in_week<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> u64 {
        self.weekly_focus_minutes.get(&week_key(now)).copied().unwrap_or(0)
    }

    /// Lifetime distractions defeated, including pruned weeks.
    pub fn total_distractions_defeated(&self) -> u64 {
        self.archived_distractions_defeated
            .saturating_add(self.weekly_distractions_defeated.values().sum::<u64>())
    }

    /// Lifetime focus minutes, including pruned weeks.
    pub fn total_focus_minutes(&self) -> u64 {
        self.archived_focus_minutes
            .saturating_add(self.weekly_focus_minutes.values().sum::<u64>())
    }

    /// Drop all but the `keep_weeks` most recent week keys from both
    /// weekly maps. Dropped counts move into the archived totals so
    /// lifetime sums, and therefore milestone evaluation, are unaffected.
    pub fn prune_weeks(&mut self, keep_weeks: usize) -> usize {
        let focus_pruned = prune_map(&mut self.weekly_focus_minutes, keep_weeks);
        let defeated_pruned = prune_map(&mut self.weekly_distractions_defeated, keep_weeks);

        let dropped = focus_pruned.len() + defeated_pruned.len();
        self.archived_focus_minutes = self
            .archived_focus_minutes
            .saturating_add(focus_pruned.values().sum::<u64>());
        self.archived_distractions_defeated = self
            .archived_distractions_defeated
            .saturating_add(defeated_pruned.values().sum::<u64>());

        if dropped > 0 {
            tracing::debug!(dropped = dropped, keep_weeks = keep_weeks, "Pruned weekly aggregates");
        }
        dropped
    }
}

/// Split off everything older than the newest `keep` keys.
fn prune_map(map: &mut BTreeMap<String, u64>, keep: usize) -> BTreeMap<String, u64> {
    if map.len() <= keep {
        return BTreeMap::new();
    }
    let split_at = map.keys().nth(map.len() - keep).cloned();
    match split_at {
        Some(key) => {
            let newer = map.split_off(&key);
            std::mem::replace(map, newer)
        }
        // keep == 0
        None => std::mem::take(map),
    }
}
