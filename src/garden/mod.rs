//! Seed garden: the streak drawn as a growing plant, plus the daily
//! reflection shown beside it.

use chrono::{DateTime, TimeZone};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::OrbitError;
use crate::progression::dates::day_key;
use crate::storage::{load_record, save_record, KeyValueStore};

pub const REFLECTION_KEY: &str = "orbit:reflection_v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GardenStage {
    pub name: &'static str,
    /// Streak days at which the stage begins
    pub threshold: u32,
    /// Days the stage lasts before the next one
    pub length: u32,
}

pub const GARDEN_STAGES: [GardenStage; 4] = [
    GardenStage { name: "Seed", threshold: 0, length: 7 },
    GardenStage { name: "Sprout", threshold: 7, length: 23 },
    GardenStage { name: "Plant", threshold: 30, length: 60 },
    GardenStage { name: "Tree", threshold: 90, length: 365 },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreakMarker {
    pub day: u32,
    pub title: &'static str,
    pub description: &'static str,
}

pub const STREAK_MILESTONES: [StreakMarker; 4] = [
    StreakMarker { day: 7, title: "Sprout Stage", description: "Neurochemistry begins to stabilize." },
    StreakMarker { day: 30, title: "Plant Stage", description: "Frontal cortex connectivity improves." },
    StreakMarker { day: 60, title: "Deep Roots", description: "Significant reduction in craving intensity." },
    StreakMarker { day: 90, title: "Tree Stage", description: "New default state established." },
];

pub const TIMELINE_EVENTS: [StreakMarker; 6] = [
    StreakMarker { day: 1, title: "The Departure", description: "You've left the old atmosphere. The first day is the bravest." },
    StreakMarker { day: 3, title: "Initial Resistance", description: "The urge is a wave. You are learning to surf it." },
    StreakMarker { day: 7, title: "Orbit Stability", description: "Gravity is losing its grip. Momentum is building." },
    StreakMarker { day: 14, title: "Neurological Shift", description: "Dopamine receptors begin to reset. Focus returns." },
    StreakMarker { day: 30, title: "New Identity", description: "You are no longer 'quitting'. You are a person who has evolved." },
    StreakMarker { day: 90, title: "Interstellar", description: "The old default is gone. You are sailing in clear space." },
];

pub const REFLECTIONS: [&str; 6] = [
    "Growth is invisible until it isn't.",
    "Consistency beats intensity.",
    "Today mattered.",
    "Your future self is thanking you.",
    "One day at a time, one orbit at a time.",
    "Be patient with your own progress.",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GardenView {
    pub streak: u32,
    pub stage: GardenStage,
    /// Percent of the current stage completed, capped at 100
    pub progress_percent: f64,
    pub days_to_next: u32,
    /// Today exactly hits a streak milestone
    pub milestone_today: Option<StreakMarker>,
    pub timeline: Vec<TimelineEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub event: StreakMarker,
    pub unlocked: bool,
}

pub fn stage_for_streak(streak: u32) -> GardenStage {
    GARDEN_STAGES
        .iter()
        .rev()
        .find(|s| streak >= s.threshold)
        .copied()
        .unwrap_or(GARDEN_STAGES[0])
}

pub fn garden_view(streak: u32) -> GardenView {
    let stage = stage_for_streak(streak);
    let days_into_stage = streak - stage.threshold;
    let progress_percent =
        (f64::from(days_into_stage) / f64::from(stage.length) * 100.0).min(100.0);

    GardenView {
        streak,
        stage,
        progress_percent,
        days_to_next: stage.length.saturating_sub(days_into_stage),
        milestone_today: STREAK_MILESTONES.iter().find(|m| m.day == streak).copied(),
        timeline: TIMELINE_EVENTS
            .iter()
            .map(|e| TimelineEntry { event: *e, unlocked: streak >= e.day })
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReflection {
    pub day_key: String,
    pub text: String,
}

/// Today's reflection. The first call on a calendar day draws a new one
/// at random and persists it; later calls that day return the same text.
pub fn daily_reflection<Tz: TimeZone>(
    store: &dyn KeyValueStore,
    now: &DateTime<Tz>,
) -> Result<DailyReflection, OrbitError> {
    let today = day_key(now);
    if let Some(existing) = load_record::<DailyReflection>(store, REFLECTION_KEY)? {
        if existing.day_key == today {
            return Ok(existing);
        }
    }

    let text = REFLECTIONS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(REFLECTIONS[0]);
    let reflection = DailyReflection { day_key: today, text: text.to_string() };
    save_record(store, REFLECTION_KEY, &reflection)?;
    tracing::debug!(day = %reflection.day_key, "New daily reflection");
    Ok(reflection)
}
