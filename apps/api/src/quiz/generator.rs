//! Generation client: prompt → model call → JSON extraction → validation → typed questions.
//!
//! Two operations:
//! - `generate_questions` validates its inputs before any network call and rejects any
//!   model output that does not yield exactly `count` well-formed questions.
//! - `generate_feedback` returns the model's narrative text verbatim.
//!
//! Neither retries. Detailed failure causes are logged here; callers show a generic message.

use thiserror::Error;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::llm_client::{LlmError, TextGenerator};
use crate::models::question::{Level, Question, QuestionType};
use crate::models::result::SessionResult;
use crate::quiz::extract::extract_json_array;
use crate::quiz::prompt_builder::{build_feedback_prompt, build_question_prompt};
use crate::quiz::validation::{validate_questions, QuestionIssue};

pub const MIN_QUESTION_COUNT: usize = 1;
pub const MAX_QUESTION_COUNT: usize = 50;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("no parsable JSON array found in model output")]
    NoJsonArray,

    #[error("invalid question: {0}")]
    Invalid(#[from] QuestionIssue),

    #[error("expected {expected} questions, model returned {got}")]
    Shortfall { expected: usize, got: usize },
}

/// Generates `count` validated questions about `topic`.
pub async fn generate_questions(
    llm: &dyn TextGenerator,
    topic: &str,
    level: Level,
    question_type: QuestionType,
    count: usize,
) -> Result<Vec<Question>, AppError> {
    if !(MIN_QUESTION_COUNT..=MAX_QUESTION_COUNT).contains(&count) {
        return Err(AppError::Validation(format!(
            "Question count must be between {MIN_QUESTION_COUNT} and {MAX_QUESTION_COUNT}"
        )));
    }
    if topic.trim().is_empty() {
        return Err(AppError::Validation("Topic cannot be empty".to_string()));
    }

    let prompt = build_question_prompt(topic, level, question_type, count);
    info!(
        "Generating {} {} questions for {} ({})",
        count,
        question_type.as_str(),
        topic.trim(),
        level
    );

    request_questions(llm, &prompt, question_type, count)
        .await
        .map_err(|e| {
            error!("Error generating questions: {e}");
            AppError::Generation(e)
        })
}

async fn request_questions(
    llm: &dyn TextGenerator,
    prompt: &str,
    question_type: QuestionType,
    count: usize,
) -> Result<Vec<Question>, GenerationError> {
    let text = llm.generate(prompt).await?;

    let (_, mut items) = extract_json_array(&text).ok_or(GenerationError::NoJsonArray)?;

    if items.len() < count {
        return Err(GenerationError::Shortfall {
            expected: count,
            got: items.len(),
        });
    }
    if items.len() > count {
        warn!(
            "Model returned {} questions, keeping the first {}",
            items.len(),
            count
        );
        items.truncate(count);
    }

    Ok(validate_questions(&items, question_type)?)
}

/// Requests narrative feedback for a finished attempt. The text is not validated.
pub async fn generate_feedback(
    llm: &dyn TextGenerator,
    result: &SessionResult,
) -> Result<String, GenerationError> {
    let prompt = build_feedback_prompt(result);
    info!(
        "Requesting feedback for {} ({}) scored {}%",
        result.role, result.level, result.score
    );

    llm.generate(&prompt).await.map_err(|e| {
        error!("Error generating feedback: {e}");
        GenerationError::Llm(e)
    })
}
