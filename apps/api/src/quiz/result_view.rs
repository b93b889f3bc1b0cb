//! Read side of a finished attempt: score breakdown, feedback presentation and retake routing.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::question::{Level, TestKind};
use crate::models::result::SessionResult;
use crate::quiz::catalog::role_title;
use crate::quiz::feedback::{parse_feedback, FeedbackSections};
use crate::quiz::format::{format_level, format_role};
use crate::quiz::generator::GenerationError;
use crate::quiz::scoring::calculate_score;
use crate::quiz::validation::OPTIONS_PER_QUESTION;

pub const FEEDBACK_FAILED_MESSAGE: &str =
    "Failed to generate personalized feedback. Please try again later.";

const CUSTOM_CATEGORY_ROUTE: &str = "/custom-category";
const TEST_ROUTE: &str = "/test";

#[derive(Debug, Clone, Serialize)]
pub struct QuestionReview {
    pub number: usize,
    pub question: String,
    pub code_snippet: Option<String>,
    pub options: [String; OPTIONS_PER_QUESTION],
    pub correct_answer: usize,
    pub user_answer: Option<usize>,
    pub is_correct: bool,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultBreakdown {
    pub score: u32,
    pub correct: usize,
    pub incorrect: usize,
    pub total: usize,
    pub role: String,
    pub role_label: String,
    pub level: Level,
    pub level_label: String,
    pub test_type: TestKind,
    pub timestamp: DateTime<Utc>,
    pub questions: Vec<QuestionReview>,
}

/// Feedback as shown on the result page. A failure is inline: the breakdown is still served.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FeedbackView {
    Ready {
        raw: String,
        sections: FeedbackSections,
    },
    Failed {
        message: &'static str,
    },
}

impl FeedbackView {
    pub fn from_outcome(outcome: Result<String, GenerationError>) -> Self {
        match outcome {
            Ok(raw) => {
                let sections = parse_feedback(&raw);
                FeedbackView::Ready { raw, sections }
            }
            Err(_) => FeedbackView::Failed {
                message: FEEDBACK_FAILED_MESSAGE,
            },
        }
    }
}

/// Recomputes the score from the stored questions and answers rather than trusting the
/// stored totals.
pub fn build_breakdown(result: &SessionResult) -> ResultBreakdown {
    let summary = calculate_score(&result.questions, &result.user_answers);

    let questions = result
        .questions
        .iter()
        .enumerate()
        .map(|(i, q)| {
            let user_answer = result.user_answers.get(i).copied().flatten();
            QuestionReview {
                number: i + 1,
                question: q.question.clone(),
                code_snippet: q.code_snippet.clone(),
                options: q.options.clone(),
                correct_answer: q.correct_answer,
                user_answer,
                is_correct: user_answer == Some(q.correct_answer),
                explanation: q.explanation.clone(),
            }
        })
        .collect();

    let role_label = match result.test_type {
        TestKind::Custom => result.role.clone(),
        _ => role_title(&result.role)
            .map(String::from)
            .unwrap_or_else(|| format_role(&result.role)),
    };

    ResultBreakdown {
        score: summary.score,
        correct: summary.correct,
        incorrect: summary.total - summary.correct,
        total: summary.total,
        role: result.role.clone(),
        role_label,
        level: result.level,
        level_label: format_level(result.level.as_str()),
        test_type: result.test_type,
        timestamp: result.timestamp,
        questions,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetakeRoute {
    pub redirect: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub test_type: Option<TestKind>,
}

/// Where "Retake" leads. Custom tests start over at topic entry since their questions
/// were consumed.
pub fn retake_route(result: &SessionResult) -> RetakeRoute {
    match result.test_type {
        TestKind::Custom => RetakeRoute {
            redirect: CUSTOM_CATEGORY_ROUTE,
            role: None,
            level: None,
            test_type: None,
        },
        kind => RetakeRoute {
            redirect: TEST_ROUTE,
            role: Some(result.role.clone()),
            level: Some(result.level),
            test_type: Some(kind),
        },
    }
}
