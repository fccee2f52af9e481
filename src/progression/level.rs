use crate::progression::model::{ProgressionState, Stage};

pub const XP_PER_LEVEL: u64 = 50;

struct StageRange {
    stage: Stage,
    min_level: u64,
    /// `None` for the terminal stage
    max_level: Option<u64>,
}

const STAGES: [StageRange; 6] = [
    StageRange { stage: Stage::Spark, min_level: 1, max_level: Some(1) },
    StageRange { stage: Stage::Ember, min_level: 2, max_level: Some(3) },
    StageRange { stage: Stage::Flame, min_level: 4, max_level: Some(6) },
    StageRange { stage: Stage::Laser, min_level: 7, max_level: Some(10) },
    StageRange { stage: Stage::Zen, min_level: 11, max_level: Some(15) },
    StageRange { stage: Stage::Master, min_level: 16, max_level: None },
];

pub fn level_for_xp(xp_total: u64) -> u64 {
    xp_total / XP_PER_LEVEL + 1
}

fn range_for_level(level: u64) -> &'static StageRange {
    STAGES
        .iter()
        .find(|s| level >= s.min_level && s.max_level.map_or(true, |max| level <= max))
        .unwrap_or(&STAGES[0])
}

pub fn stage_for_level(level: u64) -> Stage {
    range_for_level(level).stage
}

/// Progress through the current stage's level range, in `[0, 1]`.
pub fn stage_progress(xp_total: u64) -> f64 {
    let level = level_for_xp(xp_total);
    let range = range_for_level(level);
    let Some(max_level) = range.max_level else {
        return 1.0;
    };

    let stage_length = (max_level - range.min_level + 1) as f64;
    let levels_into_stage = (level - range.min_level) as f64;
    let xp_fraction = (xp_total % XP_PER_LEVEL) as f64 / XP_PER_LEVEL as f64;
    (levels_into_stage + xp_fraction) / stage_length
}

impl ProgressionState {
    /// Add experience and re-derive level and stage.
    /// Returns whether the level went up.
    pub fn add_xp(&mut self, amount: u64) -> bool {
        let old_level = self.level();
        let old_stage = self.stage();
        self.xp_total = self.xp_total.saturating_add(amount);
        self.recompute();

        let leveled_up = self.level() > old_level;
        if leveled_up {
            tracing::info!(
                level = self.level(),
                stage = %self.stage(),
                xp_total = self.xp_total,
                "Level up"
            );
        }
        if self.stage() != old_stage {
            tracing::info!(from = %old_stage, to = %self.stage(), "Stage advanced");
        }
        leveled_up
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_formula() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(49), 1);
        assert_eq!(level_for_xp(50), 2);
        assert_eq!(level_for_xp(749), 15);
        assert_eq!(level_for_xp(750), 16);
    }

    #[test]
    fn test_stage_table() {
        let expected = [
            (1, Stage::Spark),
            (2, Stage::Ember),
            (3, Stage::Ember),
            (4, Stage::Flame),
            (6, Stage::Flame),
            (7, Stage::Laser),
            (10, Stage::Laser),
            (11, Stage::Zen),
            (15, Stage::Zen),
            (16, Stage::Master),
            (1_000, Stage::Master),
        ];
        for (level, stage) in expected {
            assert_eq!(stage_for_level(level), stage, "level {}", level);
        }
    }

    #[test]
    fn test_stage_progress_values() {
        assert_eq!(stage_progress(0), 0.0);
        assert_eq!(stage_progress(25), 0.5);
        // ember spans levels 2-3: level 3 with 25/50 xp -> (1 + 0.5) / 2
        assert_eq!(stage_progress(125), 0.75);
        // flame spans 4-6, start of level 4
        assert_eq!(stage_progress(150), 0.0);
        assert_eq!(stage_progress(750), 1.0);
        assert_eq!(stage_progress(10_000), 1.0);
    }

    #[test]
    fn test_add_xp_level_up_scenario() {
        let mut state = ProgressionState::new();
        assert_eq!((state.level(), state.stage()), (1, Stage::Spark));

        assert!(!state.add_xp(49));
        assert_eq!((state.level(), state.stage()), (1, Stage::Spark));

        assert!(state.add_xp(1));
        assert_eq!(state.xp_total(), 50);
        assert_eq!((state.level(), state.stage()), (2, Stage::Ember));
    }

    #[test]
    fn test_add_zero_xp_is_noop() {
        let mut state = ProgressionState::new();
        state.add_xp(70);
        let before = state.clone();
        assert!(!state.add_xp(0));
        assert_eq!(state, before);
    }

    #[test]
    fn test_level_and_stage_never_regress() {
        let mut state = ProgressionState::new();
        let mut last = (state.level(), state.stage());
        for step in [1, 7, 13, 50, 3, 99, 250, 1, 400] {
            state.add_xp(step);
            let now = (state.level(), state.stage());
            assert!(now.0 >= last.0);
            assert!(now.1 >= last.1);
            assert_eq!(state.level(), state.xp_total() / 50 + 1);
            assert!((0.0..=1.0).contains(&state.stage_progress()));
            last = now;
        }
    }
}
