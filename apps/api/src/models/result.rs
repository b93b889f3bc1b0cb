use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::question::{Level, Question, TestKind};
use crate::quiz::scoring::ScoreSummary;

/// The finalized record of one completed quiz attempt.
///
/// Written exactly once at submission (handoff key `testResults`) and read-only afterwards.
/// Invariant: `correct` and `score` are derived from `questions` and `user_answers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResult {
    pub score: u32,
    pub correct: usize,
    pub total: usize,
    pub role: String,
    pub level: Level,
    pub test_type: TestKind,
    pub timestamp: DateTime<Utc>,
    pub questions: Vec<Question>,
    pub user_answers: Vec<Option<usize>>,
}

impl SessionResult {
    pub fn new(
        summary: ScoreSummary,
        role: String,
        level: Level,
        test_type: TestKind,
        questions: Vec<Question>,
        user_answers: Vec<Option<usize>>,
    ) -> Self {
        Self {
            score: summary.score,
            correct: summary.correct,
            total: summary.total,
            role,
            level,
            test_type,
            timestamp: Utc::now(),
            questions,
            user_answers,
        }
    }

    pub fn summary(&self) -> ScoreSummary {
        ScoreSummary {
            score: self.score,
            correct: self.correct,
            total: self.total,
        }
    }
}

/// A question set produced by the custom-topic flow, waiting to be picked up by a quiz session
/// (handoff key `customTest`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomTest {
    pub questions: Vec<Question>,
    pub category: String,
    pub level: Level,
    pub test_type: TestKind,
}
