use serde::{Deserialize, Serialize};

use crate::models::question::Question;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSummary {
    /// Percentage, 0 - 100.
    pub score: u32,
    pub correct: usize,
    pub total: usize,
}

/// Scores a set of answers against their questions.
///
/// A slot is correct only on exact index equality with `correct_answer`; an absent answer
/// never matches. `score = round(100 * correct / total)`, and 0 when there are no questions.
/// Answers beyond the last question are ignored.
pub fn calculate_score(questions: &[Question], answers: &[Option<usize>]) -> ScoreSummary {
    let total = questions.len();
    let correct = questions
        .iter()
        .zip(answers)
        .filter(|(q, answer)| **answer == Some(q.correct_answer))
        .count();

    let score = if total > 0 {
        ((correct as f64 / total as f64) * 100.0).round() as u32
    } else {
        0
    };

    ScoreSummary {
        score,
        correct,
        total,
    }
}
