use serde::Serialize;

use crate::progression::model::ProgressionState;

/// One-time achievement for total distractions defeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Milestone {
    pub id: &'static str,
    pub threshold: u64,
    pub title: &'static str,
    pub description: &'static str,
}

/// Ascending by threshold.
pub const MILESTONES: [Milestone; 5] = [
    Milestone {
        id: "first_control",
        threshold: 10,
        title: "First Control",
        description: "You resisted 10 distractions. Your focus is taking root.",
    },
    Milestone {
        id: "resistance_up",
        threshold: 50,
        title: "Resistance Up",
        description: "50 distractions defeated. Your mental shield is strengthening.",
    },
    Milestone {
        id: "focus_identity",
        threshold: 100,
        title: "Focus Identity",
        description: "100 distractions defeated. Focus is no longer a task, it's who you are.",
    },
    Milestone {
        id: "deep_work",
        threshold: 250,
        title: "Deep Work",
        description: "250 distractions defeated. You can now enter the flow state at will.",
    },
    Milestone {
        id: "mastery",
        threshold: 500,
        title: "Mastery",
        description: "500 distractions defeated. Absolute control over your attention.",
    },
];

pub fn milestone_by_id(id: &str) -> Option<&'static Milestone> {
    MILESTONES.iter().find(|m| m.id == id)
}

/// Next milestone still locked, if any.
pub fn next_milestone(state: &ProgressionState) -> Option<&'static Milestone> {
    MILESTONES
        .iter()
        .find(|m| !state.milestones_unlocked.iter().any(|id| id == m.id))
}

impl ProgressionState {
    /// Unlock every milestone whose threshold the lifetime distraction
    /// count has reached. Returns the newly unlocked ids in threshold order;
    /// already unlocked ids are never removed.
    pub fn evaluate_milestones(&mut self) -> Vec<String> {
        let total = self.total_distractions_defeated();
        let mut newly_unlocked = Vec::new();

        for milestone in MILESTONES.iter() {
            if total < milestone.threshold {
                continue;
            }
            if self.milestones_unlocked.iter().any(|id| id == milestone.id) {
                continue;
            }
            self.milestones_unlocked.push(milestone.id.to_string());
            newly_unlocked.push(milestone.id.to_string());
            tracing::info!(
                milestone = milestone.id,
                threshold = milestone.threshold,
                total_defeated = total,
                "Milestone unlocked"
            );
        }

        newly_unlocked
    }
}
