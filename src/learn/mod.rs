//! Lesson catalog and per-user lesson progress.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::OrbitError;
use crate::storage::{load_or_migrate, save_record, KeyValueStore};

pub const LEARN_KEY: &str = "orbit:learn_v1";
/// Unprefixed key written by older builds.
pub const LEGACY_LEARN_KEY: &str = "learn_v1";

/// Orbs granted the first time a lesson is completed.
pub const LESSON_ORB_REWARD: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Lesson {
    pub id: &'static str,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub minutes: u32,
}

pub const LESSONS: [Lesson; 10] = [
    Lesson { id: "dopamine", title: "Dopamine & the Habit Loop", subtitle: "Understanding the cue-craving cycle", minutes: 5 },
    Lesson { id: "novelty", title: "The Novelty Trap", subtitle: "Why new stimuli hook the brain", minutes: 6 },
    Lesson { id: "urge-surfing", title: "Urge Surfing", subtitle: "Riding the wave of desire", minutes: 7 },
    Lesson { id: "delay-rule", title: "The 10-Minute Delay Rule", subtitle: "Creating space between urge and action", minutes: 5 },
    Lesson { id: "environment", title: "Environment Design", subtitle: "Removing friction and adding support", minutes: 8 },
    Lesson { id: "replacement", title: "Replacement Habits", subtitle: "Filling the void with healthier actions", minutes: 6 },
    Lesson { id: "stress-sleep", title: "Stress & Sleep", subtitle: "The foundation of willpower", minutes: 7 },
    Lesson { id: "recovery-plan", title: "Relapse Recovery Plan", subtitle: "Moving forward without shame", minutes: 6 },
    Lesson { id: "focus-reset", title: "Focus Reset", subtitle: "Recovering your attention span", minutes: 5 },
    Lesson { id: "connections", title: "Relationships & Connection", subtitle: "Rebuilding real-world confidence", minutes: 7 },
];

pub fn lesson_by_id(id: &str) -> Option<&'static Lesson> {
    LESSONS.iter().find(|l| l.id == id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizScore {
    pub correct: u32,
    pub total: u32,
}

impl QuizScore {
    /// Stored as `"correct/total"`.
    pub fn to_record(self) -> String {
        format!("{}/{}", self.correct.min(self.total), self.total)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LessonProgress {
    pub completed: Vec<String>,
    pub tool_responses: BTreeMap<String, String>,
    pub quiz_scores: BTreeMap<String, String>,
}

impl LessonProgress {
    pub fn is_completed(&self, id: &str) -> bool {
        self.completed.iter().any(|c| c == id)
    }

    /// Mark a lesson complete. Returns `true` only for the first completion;
    /// repeats still overwrite the tool response and quiz score.
    pub fn complete(
        &mut self,
        id: &str,
        tool_response: Option<String>,
        quiz: Option<QuizScore>,
    ) -> Result<bool, OrbitError> {
        let lesson = lesson_by_id(id).ok_or_else(|| {
            OrbitError::new(format!("Unknown lesson: {}", id), "learn")
        })?;

        let first_time = !self.is_completed(lesson.id);
        if first_time {
            self.completed.push(lesson.id.to_string());
        }
        if let Some(response) = tool_response {
            self.tool_responses.insert(lesson.id.to_string(), response);
        }
        if let Some(score) = quiz {
            self.quiz_scores.insert(lesson.id.to_string(), score.to_record());
        }
        Ok(first_time)
    }

    /// First lesson in catalog order not yet completed.
    pub fn next_lesson(&self) -> Option<&'static Lesson> {
        LESSONS.iter().find(|l| !self.is_completed(l.id))
    }

    /// Completed share of the catalog, 0-100.
    pub fn percent_complete(&self) -> f64 {
        let done = LESSONS.iter().filter(|l| self.is_completed(l.id)).count();
        done as f64 / LESSONS.len() as f64 * 100.0
    }
}

pub fn load(store: &dyn KeyValueStore) -> Result<LessonProgress, OrbitError> {
    Ok(load_or_migrate(store, LEARN_KEY, LEGACY_LEARN_KEY)?.unwrap_or_default())
}

pub fn save(store: &dyn KeyValueStore, progress: &LessonProgress) -> Result<(), OrbitError> {
    save_record(store, LEARN_KEY, progress)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_unique() {
        let mut ids: Vec<&str> = LESSONS.iter().map(|l| l.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), LESSONS.len());
    }

    #[test]
    fn test_first_completion_only() {
        let mut progress = LessonProgress::default();
        assert!(progress.complete("urge-surfing", None, None).unwrap());
        assert!(!progress
            .complete("urge-surfing", Some("tight chest".into()), Some(QuizScore { correct: 1, total: 1 }))
            .unwrap());
        assert_eq!(progress.completed, vec!["urge-surfing"]);
        assert_eq!(progress.quiz_scores.get("urge-surfing").map(String::as_str), Some("1/1"));
        assert_eq!(progress.tool_responses.get("urge-surfing").map(String::as_str), Some("tight chest"));
    }

    #[test]
    fn test_unknown_lesson_is_error() {
        let mut progress = LessonProgress::default();
        let err = progress.complete("astrology", None, None).unwrap_err();
        assert_eq!(err.stage, "learn");
        assert!(progress.completed.is_empty());
    }

    #[test]
    fn test_next_lesson_follows_catalog_order() {
        let mut progress = LessonProgress::default();
        assert_eq!(progress.next_lesson().map(|l| l.id), Some("dopamine"));
        progress.complete("dopamine", None, None).unwrap();
        progress.complete("urge-surfing", None, None).unwrap();
        assert_eq!(progress.next_lesson().map(|l| l.id), Some("novelty"));
        assert_eq!(progress.percent_complete(), 20.0);

        for lesson in LESSONS.iter() {
            progress.complete(lesson.id, None, None).unwrap();
        }
        assert!(progress.next_lesson().is_none());
    }

    #[test]
    fn test_unprefixed_progress_is_migrated() {
        let store = crate::storage::MemoryStore::new();
        store
            .set(
                LEGACY_LEARN_KEY,
                r#"{"completed":["dopamine"],"toolResponses":{"dopamine":"phone"},"quizScores":{"dopamine":"2/3"}}"#,
            )
            .unwrap();

        let progress = load(&store).unwrap();
        assert!(progress.is_completed("dopamine"));
        assert_eq!(progress.quiz_scores.get("dopamine").map(String::as_str), Some("2/3"));
        assert_eq!(store.keys(), vec![LEARN_KEY.to_string()]);
    }

    #[test]
    fn test_quiz_score_clamped() {
        assert_eq!(QuizScore { correct: 5, total: 3 }.to_record(), "3/3");
    }
}
