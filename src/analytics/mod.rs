use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::focus::FocusLog;
use crate::learn::LessonProgress;
use crate::progression::dates::week_start;
use crate::progression::{ProgressionState, Stage, StreakState};
use crate::rescue::RescueLog;

/// Everything the home screen renders in one payload.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub streak: u32,
    pub longest: u32,
    pub orbs: u32,
    pub free_since: DateTime<Utc>,
    pub done_today: bool,
    pub level: u64,
    pub stage: Stage,
    pub stage_progress: f64,
    pub xp_to_next_level: u64,
    pub total_distractions_defeated: u64,
    pub focus_minutes_this_week: u64,
    pub milestones_unlocked: Vec<String>,
    pub urges_resisted: u32,
    pub next_lesson: Option<String>,
}

pub fn compute_dashboard<Tz: TimeZone>(
    streak: &StreakState,
    growth: &ProgressionState,
    rescue: &RescueLog,
    lessons: &LessonProgress,
    now: &DateTime<Tz>,
) -> Dashboard {
    Dashboard {
        streak: streak.current,
        longest: streak.longest,
        orbs: streak.orbs,
        free_since: streak.free_since,
        done_today: streak.is_done_on(now),
        level: growth.level(),
        stage: growth.stage(),
        stage_progress: growth.stage_progress(),
        xp_to_next_level: growth.xp_to_next_level(),
        total_distractions_defeated: growth.total_distractions_defeated(),
        focus_minutes_this_week: growth.focus_minutes_in_week(now),
        milestones_unlocked: growth.milestones_unlocked().to_vec(),
        urges_resisted: rescue.stats.urges_resisted,
        next_lesson: lessons.next_lesson().map(|l| l.title.to_string()),
    }
}

/// Focus sessions in the current week (Monday first).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WeeklyFocusSummary {
    pub week_start: NaiveDate,
    /// Minutes per weekday, Monday..Sunday
    pub day_minutes: [u64; 7],
    pub total_minutes: u64,
    pub completed_sessions: usize,
    pub sessions: usize,
    /// Index into `day_minutes` of the first day with the most minutes
    pub best_day: usize,
}

/// Summarise this week's sessions using `now`'s calendar. Event times are
/// stored in UTC and converted to `now`'s offset before bucketing.
pub fn weekly_focus_summary<Tz: TimeZone>(log: &FocusLog, now: &DateTime<Tz>) -> WeeklyFocusSummary {
    let start = week_start(now);
    let end = start + Duration::days(7);
    let tz = now.timezone();

    let mut day_minutes = [0u64; 7];
    let mut completed_sessions = 0;
    let mut sessions = 0;

    for event in &log.focus_events {
        let local_day = event.date.with_timezone(&tz).date_naive();
        if local_day < start || local_day >= end {
            continue;
        }
        let idx = (local_day - start).num_days() as usize;
        day_minutes[idx] += event.duration_min;
        sessions += 1;
        if event.completed {
            completed_sessions += 1;
        }
    }

    let best_day = day_minutes
        .iter()
        .enumerate()
        .fold(0, |best, (i, v)| if *v > day_minutes[best] { i } else { best });

    WeeklyFocusSummary {
        week_start: start,
        day_minutes,
        total_minutes: day_minutes.iter().sum(),
        completed_sessions,
        sessions,
        best_day,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::focus::FocusEvent;
    use chrono::FixedOffset;

    fn event(date: DateTime<Utc>, minutes: u64, completed: bool) -> FocusEvent {
        FocusEvent {
            id: format!("e{}", date.timestamp()),
            date,
            duration_min: minutes,
            distraction_types: vec![],
            pull_level: 0,
            completed,
        }
    }

    #[test]
    fn test_weekly_summary_buckets_by_local_day() {
        let tz = FixedOffset::east_opt(-5 * 3600).unwrap();
        // Wednesday 2025-02-19 evening, local
        let now = tz.with_ymd_and_hms(2025, 2, 19, 20, 0, 0).unwrap();
        let log = FocusLog {
            focus_events: vec![
                // Monday 10:00 local
                event(Utc.with_ymd_and_hms(2025, 2, 17, 15, 0, 0).unwrap(), 25, true),
                // Tuesday 22:00 local, already Wednesday in UTC
                event(Utc.with_ymd_and_hms(2025, 2, 19, 3, 0, 0).unwrap(), 45, true),
                event(Utc.with_ymd_and_hms(2025, 2, 19, 14, 0, 0).unwrap(), 10, false),
                // previous Sunday, excluded
                event(Utc.with_ymd_and_hms(2025, 2, 16, 15, 0, 0).unwrap(), 60, true),
            ],
            ..Default::default()
        };

        let summary = weekly_focus_summary(&log, &now);
        assert_eq!(summary.week_start, NaiveDate::from_ymd_opt(2025, 2, 17).unwrap());
        assert_eq!(summary.day_minutes, [25, 45, 10, 0, 0, 0, 0]);
        assert_eq!(summary.total_minutes, 80);
        assert_eq!(summary.sessions, 3);
        assert_eq!(summary.completed_sessions, 2);
        assert_eq!(summary.best_day, 1);
    }

    #[test]
    fn test_empty_week() {
        let now = Utc.with_ymd_and_hms(2025, 2, 19, 20, 0, 0).unwrap();
        let summary = weekly_focus_summary(&FocusLog::default(), &now);
        assert_eq!(summary.total_minutes, 0);
        assert_eq!(summary.best_day, 0);
    }

    #[test]
    fn test_dashboard_reflects_records() {
        let now = Utc.with_ymd_and_hms(2025, 2, 19, 20, 0, 0).unwrap();
        let mut streak = StreakState::new(now);
        streak.mark_complete(&now);
        let mut growth = ProgressionState::new();
        growth.add_xp(60);
        growth.record_focus_minutes(30, &now);

        let dash = compute_dashboard(
            &streak,
            &growth,
            &RescueLog::default(),
            &LessonProgress::default(),
            &now,
        );
        assert!(dash.done_today);
        assert_eq!(dash.streak, 1);
        assert_eq!(dash.level, 2);
        assert_eq!(dash.stage, Stage::Ember);
        assert_eq!(dash.xp_to_next_level, 40);
        assert_eq!(dash.focus_minutes_this_week, 30);
        assert_eq!(dash.next_lesson.as_deref(), Some("Dopamine & the Habit Loop"));
    }
}
