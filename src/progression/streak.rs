use chrono::{DateTime, TimeZone, Utc};

use crate::progression::dates::day_key;
use crate::progression::model::StreakState;

/// Orbs granted for the first completion of a calendar day.
pub const COMPLETE_ORB_REWARD: u32 = 3;
/// Orbs taken away on relapse, floored at zero.
pub const RELAPSE_ORB_PENALTY: u32 = 5;

impl StreakState {
    /// Whether a completion was already recorded on `now`'s calendar day.
    pub fn is_done_on<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        self.last_completed_day_key.as_deref() == Some(day_key(now).as_str())
    }

    /// Record a completed day. At most one increment per calendar day;
    /// returns `false` and leaves the state untouched on a repeat.
    pub fn mark_complete<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> bool {
        let today = day_key(now);
        if self.last_completed_day_key.as_deref() == Some(today.as_str()) {
            tracing::debug!(day = %today, "Day already completed");
            return false;
        }

        self.current = self.current.saturating_add(1);
        self.longest = self.longest.max(self.current);
        self.orbs = self.orbs.saturating_add(COMPLETE_ORB_REWARD);
        self.last_completed_day_key = Some(today);

        tracing::info!(
            current = self.current,
            longest = self.longest,
            orbs = self.orbs,
            "Streak day completed"
        );
        true
    }

    /// Reset the streak after a relapse.
    pub fn record_relapse<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) {
        let previous = self.current;
        self.current = 0;
        self.orbs = self.orbs.saturating_sub(RELAPSE_ORB_PENALTY);
        self.last_completed_day_key = None;
        self.free_since = now.with_timezone(&Utc);

        tracing::info!(previous_streak = previous, orbs = self.orbs, "Relapse recorded");
    }

    /// Grant orbs for a positive action.
    pub fn award_orbs(&mut self, amount: u32) {
        self.orbs = self.orbs.saturating_add(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};

    fn local(y: i32, m: u32, d: u32, h: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, 0, 0)
            .unwrap()
    }

    fn fresh() -> StreakState {
        StreakState::new(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_same_day_completion_is_idempotent() {
        let mut state = fresh();
        assert!(state.mark_complete(&local(2025, 3, 1, 8)));
        let after_first = state.clone();
        assert!(!state.mark_complete(&local(2025, 3, 1, 22)));
        assert_eq!(state, after_first);
        assert_eq!(state.current, 1);
        assert_eq!(state.orbs, COMPLETE_ORB_REWARD);
        assert_eq!(state.last_completed_day_key.as_deref(), Some("2025-03-01"));
    }

    #[test]
    fn test_consecutive_days_increment() {
        let mut state = fresh();
        for d in 1..=4 {
            assert!(state.mark_complete(&local(2025, 3, d, 9)));
        }
        assert_eq!(state.current, 4);
        assert_eq!(state.longest, 4);
        assert_eq!(state.orbs, 4 * COMPLETE_ORB_REWARD);
        assert!(state.is_done_on(&local(2025, 3, 4, 23)));
        assert!(!state.is_done_on(&local(2025, 3, 5, 0)));
    }

    #[test]
    fn test_relapse_resets_current_keeps_longest() {
        let mut state = fresh();
        state.current = 5;
        state.longest = 5;
        state.orbs = 12;
        state.last_completed_day_key = Some("2025-03-05".into());
        let now = local(2025, 3, 6, 10);

        state.record_relapse(&now);
        assert_eq!(state.current, 0);
        assert_eq!(state.longest, 5);
        assert_eq!(state.orbs, 12 - RELAPSE_ORB_PENALTY);
        assert!(state.last_completed_day_key.is_none());
        assert_eq!(state.free_since, now.with_timezone(&Utc));
    }

    #[test]
    fn test_relapse_penalty_floors_at_zero() {
        let mut state = fresh();
        state.orbs = 3;
        state.record_relapse(&local(2025, 3, 6, 10));
        assert_eq!(state.orbs, 0);
    }

    #[test]
    fn test_relapse_allows_completion_same_day() {
        let mut state = fresh();
        let morning = local(2025, 3, 6, 7);
        state.mark_complete(&morning);
        state.record_relapse(&(morning + Duration::hours(2)));
        assert!(state.mark_complete(&(morning + Duration::hours(4))));
        assert_eq!(state.current, 1);
    }

    #[test]
    fn test_longest_monotonic_over_mixed_events() {
        let mut state = fresh();
        let start = local(2025, 1, 1, 12);
        let script = [true, true, true, false, true, true, false, true, true, true, true, false];
        let mut last_longest = 0;
        for (i, complete) in script.iter().enumerate() {
            let now = start + Duration::days(i as i64);
            if *complete {
                state.mark_complete(&now);
            } else {
                state.record_relapse(&now);
                assert_eq!(state.current, 0);
            }
            assert!(state.longest >= last_longest);
            assert!(state.longest >= state.current);
            last_longest = state.longest;
        }
        assert_eq!(state.longest, 4);
    }

    #[test]
    fn test_award_orbs_saturates() {
        let mut state = fresh();
        state.orbs = u32::MAX - 1;
        state.award_orbs(5);
        assert_eq!(state.orbs, u32::MAX);
    }
}
