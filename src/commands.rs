//! One function per user action. Every surface (CLI, future HTTP or UI
//! bindings) goes through these so the reward rules live in one place.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::analytics::{compute_dashboard, weekly_focus_summary, Dashboard, WeeklyFocusSummary};
use crate::checkins::{self, CheckIn, CheckInDraft};
use crate::error::OrbitError;
use crate::focus::{self, FocusEvent, FocusSessionDraft};
use crate::garden::{self, DailyReflection, GardenView};
use crate::ids::new_event_id;
use crate::learn::{self, LessonProgress, QuizScore, LESSON_ORB_REWARD};
use crate::progression::store as progression_store;
use crate::progression::{ProgressionState, StreakState};
use crate::rescue::{self, UrgeEvent, RESCUE_ORB_REWARD};
use crate::state::AppState;

/// Every key Orbit writes, including legacy per-field streak keys.
pub const ALL_KEYS: [&str; 13] = [
    progression_store::STREAK_KEY,
    progression_store::PROGRESSION_KEY,
    progression_store::LEGACY_PROGRESSION_KEY,
    progression_store::LEGACY_STREAK_KEY,
    progression_store::LEGACY_ORBS_KEY,
    progression_store::LEGACY_LAST_DONE_KEY,
    progression_store::LEGACY_FREE_SINCE_KEY,
    checkins::CHECKINS_KEY,
    rescue::PANIC_KEY,
    focus::FOCUS_KEY,
    learn::LEARN_KEY,
    learn::LEGACY_LEARN_KEY,
    garden::REFLECTION_KEY,
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionOutcome {
    pub streak: StreakState,
    /// False when today was already completed
    pub counted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckInOutcome {
    pub checkin: CheckIn,
    pub streak: StreakState,
    pub counted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RescueOutcome {
    pub event: UrgeEvent,
    pub streak: StreakState,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XpOutcome {
    pub growth: ProgressionState,
    pub leveled_up: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistractionOutcome {
    pub growth: ProgressionState,
    pub leveled_up: bool,
    pub newly_unlocked: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FocusOutcome {
    pub event: FocusEvent,
    pub orbs_awarded: u32,
    pub leveled_up: bool,
    pub newly_unlocked: Vec<String>,
    pub growth: ProgressionState,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LessonOutcome {
    pub lesson_id: String,
    pub first_time: bool,
    pub orbs_awarded: u32,
    pub progress: LessonProgress,
}

fn utc<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    now.with_timezone(&Utc)
}

pub fn mark_complete<Tz: TimeZone>(state: &AppState, now: &DateTime<Tz>) -> Result<CompletionOutcome, OrbitError> {
    let (streak, counted) = state.update_streak(utc(now), |s| s.mark_complete(now))?;
    Ok(CompletionOutcome { streak, counted })
}

pub fn relapse_reset<Tz: TimeZone>(state: &AppState, now: &DateTime<Tz>) -> Result<StreakState, OrbitError> {
    let (streak, ()) = state.update_streak(utc(now), |s| s.record_relapse(now))?;
    Ok(streak)
}

/// Store a check-in and apply it to the streak: a relapse resets it,
/// otherwise the day is marked complete.
pub fn submit_checkin<Tz: TimeZone>(
    state: &AppState,
    draft: CheckInDraft,
    now: &DateTime<Tz>,
) -> Result<CheckInOutcome, OrbitError> {
    state.exclusive(|app| {
        let checkin = draft.into_checkin(new_event_id(), utc(now));

        let mut streak = app.load_or_init_streak(utc(now))?;
        let counted = if checkin.relapse {
            streak.record_relapse(now);
            false
        } else {
            streak.mark_complete(now)
        };

        let mut log = checkins::load(app.store())?;
        log.push(checkin.clone());
        checkins::save(app.store(), &log)?;
        app.save_streak(&streak)?;

        tracing::info!(
            checkin_id = %checkin.id,
            mood = checkin.mood,
            urge = checkin.urge,
            relapse = checkin.relapse,
            "Check-in saved"
        );
        Ok(CheckInOutcome { checkin, streak, counted })
    })
}

pub fn complete_rescue<Tz: TimeZone>(
    state: &AppState,
    urge_level: u8,
    triggers: Vec<String>,
    now: &DateTime<Tz>,
) -> Result<RescueOutcome, OrbitError> {
    state.exclusive(|app| {
        let mut log = rescue::load(app.store())?;
        let event = log
            .record_resisted(new_event_id(), urge_level, triggers, utc(now))
            .clone();
        let mut streak = app.load_or_init_streak(utc(now))?;
        streak.award_orbs(RESCUE_ORB_REWARD);

        rescue::save(app.store(), &log)?;
        app.save_streak(&streak)?;

        tracing::info!(
            urge_level = event.urge_level,
            urges_resisted = log.stats.urges_resisted,
            "Urge resisted"
        );
        Ok(RescueOutcome { event, streak })
    })
}

pub fn add_xp(state: &AppState, amount: u64) -> Result<XpOutcome, OrbitError> {
    let (growth, leveled_up) = state.update_progression(|g| g.add_xp(amount))?;
    Ok(XpOutcome { growth, leveled_up })
}

/// One distraction defeated: count it, check milestones, grant 1 XP.
fn apply_distraction<Tz: TimeZone>(growth: &mut ProgressionState, now: &DateTime<Tz>) -> (bool, Vec<String>) {
    growth.record_distraction_defeated(now);
    let newly_unlocked = growth.evaluate_milestones();
    let leveled_up = growth.add_xp(1);
    (leveled_up, newly_unlocked)
}

pub fn log_distraction<Tz: TimeZone>(state: &AppState, now: &DateTime<Tz>) -> Result<DistractionOutcome, OrbitError> {
    let (growth, (leveled_up, newly_unlocked)) =
        state.update_progression(|g| apply_distraction(g, now))?;
    Ok(DistractionOutcome { growth, leveled_up, newly_unlocked })
}

/// Record a focus session. Completed sessions earn tiered orbs, add their
/// minutes to the week, and count as one distraction defeated.
pub fn complete_focus_session<Tz: TimeZone>(
    state: &AppState,
    draft: FocusSessionDraft,
    now: &DateTime<Tz>,
) -> Result<FocusOutcome, OrbitError> {
    state.exclusive(|app| {
        let preset_min = draft.preset_min;
        let event = draft.into_event(new_event_id(), utc(now));

        let mut log = focus::load(app.store())?;
        log.record(event.clone());

        let mut growth = app.load_or_init_progression()?;
        let mut orbs_awarded = 0;
        let mut leveled_up = false;
        let mut newly_unlocked = Vec::new();

        if event.completed {
            orbs_awarded = focus::orb_reward(preset_min);
            let mut streak = app.load_or_init_streak(utc(now))?;
            streak.award_orbs(orbs_awarded);
            app.save_streak(&streak)?;

            growth.record_focus_minutes(event.duration_min, now);
            (leveled_up, newly_unlocked) = apply_distraction(&mut growth, now);
            app.save_progression(&mut growth)?;
        }
        focus::save(app.store(), &log)?;

        tracing::info!(
            duration_min = event.duration_min,
            completed = event.completed,
            orbs_awarded = orbs_awarded,
            "Focus session recorded"
        );
        Ok(FocusOutcome { event, orbs_awarded, leveled_up, newly_unlocked, growth })
    })
}

pub fn complete_lesson<Tz: TimeZone>(
    state: &AppState,
    lesson_id: &str,
    tool_response: Option<String>,
    quiz: Option<QuizScore>,
    now: &DateTime<Tz>,
) -> Result<LessonOutcome, OrbitError> {
    state.exclusive(|app| {
        let mut progress = learn::load(app.store())?;
        let first_time = progress.complete(lesson_id, tool_response, quiz)?;

        let mut orbs_awarded = 0;
        if first_time {
            orbs_awarded = LESSON_ORB_REWARD;
            let mut streak = app.load_or_init_streak(utc(now))?;
            streak.award_orbs(orbs_awarded);
            app.save_streak(&streak)?;
        }
        learn::save(app.store(), &progress)?;

        tracing::info!(lesson = lesson_id, first_time = first_time, "Lesson completed");
        Ok(LessonOutcome {
            lesson_id: lesson_id.to_string(),
            first_time,
            orbs_awarded,
            progress,
        })
    })
}

pub fn dashboard<Tz: TimeZone>(state: &AppState, now: &DateTime<Tz>) -> Result<Dashboard, OrbitError> {
    state.exclusive(|app| {
        let streak = app.load_or_init_streak(utc(now))?;
        let growth = app.load_or_init_progression()?;
        let rescue_log = rescue::load(app.store())?;
        let lessons = learn::load(app.store())?;
        Ok(compute_dashboard(&streak, &growth, &rescue_log, &lessons, now))
    })
}

pub fn garden<Tz: TimeZone>(state: &AppState, now: &DateTime<Tz>) -> Result<GardenView, OrbitError> {
    let streak = state.exclusive(|app| app.load_or_init_streak(utc(now)))?;
    Ok(garden::garden_view(streak.current))
}

pub fn daily_reflection<Tz: TimeZone>(state: &AppState, now: &DateTime<Tz>) -> Result<DailyReflection, OrbitError> {
    state.exclusive(|app| garden::daily_reflection(app.store(), now))
}

pub fn weekly_focus<Tz: TimeZone>(state: &AppState, now: &DateTime<Tz>) -> Result<WeeklyFocusSummary, OrbitError> {
    let log = focus::load(state.store())?;
    Ok(weekly_focus_summary(&log, now))
}

pub fn recent_checkins(state: &AppState, limit: usize) -> Result<Vec<CheckIn>, OrbitError> {
    Ok(checkins::load(state.store())?.recent(limit).to_vec())
}

/// Remove every Orbit record. The next read starts from defaults.
pub fn reset_all_progress(state: &AppState) -> Result<(), OrbitError> {
    state.exclusive(|app| {
        for key in ALL_KEYS {
            app.store().remove(key)?;
        }
        tracing::warn!("All progress reset");
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};

    fn at(d: u32, h: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600).unwrap().with_ymd_and_hms(2025, 10, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_relapse_checkin_does_not_count() {
        let state = AppState::in_memory();
        mark_complete(&state, &at(1, 9)).unwrap();
        let draft = CheckInDraft { mood: 2, urge: 8, relapse: true, ..Default::default() };
        let outcome = submit_checkin(&state, draft, &at(2, 21)).unwrap();
        assert!(!outcome.counted);
        assert_eq!(outcome.streak.current, 0);
        assert_eq!(outcome.streak.longest, 1);
        assert_eq!(recent_checkins(&state, 5).unwrap().len(), 1);
    }

    #[test]
    fn test_incomplete_focus_session_earns_nothing() {
        let state = AppState::in_memory();
        let draft = FocusSessionDraft { preset_min: 25, elapsed_seconds: 120, ..Default::default() };
        let outcome = complete_focus_session(&state, draft, &at(3, 10)).unwrap();
        assert!(!outcome.event.completed);
        assert_eq!(outcome.orbs_awarded, 0);
        assert_eq!(outcome.growth.xp_total(), 0);
        assert_eq!(focus::load(state.store()).unwrap().focus_events.len(), 1);
    }

    #[test]
    fn test_log_distraction_grants_xp() {
        let state = AppState::in_memory();
        let mut last = None;
        for i in 0..10 {
            last = Some(log_distraction(&state, &(at(4, 8) + Duration::minutes(i))).unwrap());
        }
        let outcome = last.unwrap();
        assert_eq!(outcome.newly_unlocked, vec!["first_control"]);
        assert_eq!(outcome.growth.xp_total(), 10);
    }

    #[test]
    fn test_reset_removes_everything() {
        let state = AppState::in_memory();
        mark_complete(&state, &at(1, 9)).unwrap();
        complete_rescue(&state, 6, vec![], &at(1, 10)).unwrap();
        reset_all_progress(&state).unwrap();
        for key in ALL_KEYS {
            assert!(state.store().get(key).unwrap().is_none(), "{} survived reset", key);
        }
    }
}
