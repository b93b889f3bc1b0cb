//! Shape validation for model-generated questions.
//!
//! Rules per element:
//! - `question` is a non-empty string
//! - `options` is an array of exactly 4 strings
//! - `correctAnswer` is an integer in [0, 3]
//! - for coding questions, `codeSnippet` is a non-empty string
//!
//! The first violation is reported with its 1-based question number. Callers log it;
//! users never see it.

use serde_json::Value;
use thiserror::Error;

use crate::models::question::{Question, QuestionType};

pub const OPTIONS_PER_QUESTION: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuestionIssue {
    #[error("Question {0} is not an object")]
    NotAnObject(usize),

    #[error("Question {0} missing question text")]
    MissingText(usize),

    #[error("Question {0} must have exactly 4 options")]
    BadOptions(usize),

    #[error("Question {0} has invalid correctAnswer index")]
    BadCorrectAnswer(usize),

    #[error("Coding question {0} missing codeSnippet")]
    MissingCodeSnippet(usize),

    #[error("Question {0} has a non-text explanation")]
    BadExplanation(usize),
}

/// Validates raw JSON elements and converts them into typed questions.
pub fn validate_questions(
    items: &[Value],
    question_type: QuestionType,
) -> Result<Vec<Question>, QuestionIssue> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| validate_question(item, i + 1, question_type))
        .collect()
}

fn validate_question(
    item: &Value,
    number: usize,
    question_type: QuestionType,
) -> Result<Question, QuestionIssue> {
    let obj = item.as_object().ok_or(QuestionIssue::NotAnObject(number))?;

    let question = obj
        .get("question")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or(QuestionIssue::MissingText(number))?;

    let options: Vec<&str> = obj
        .get("options")
        .and_then(Value::as_array)
        .filter(|arr| arr.len() == OPTIONS_PER_QUESTION)
        .and_then(|arr| arr.iter().map(Value::as_str).collect::<Option<Vec<_>>>())
        .ok_or(QuestionIssue::BadOptions(number))?;
    let options: [String; OPTIONS_PER_QUESTION] = [
        options[0].to_string(),
        options[1].to_string(),
        options[2].to_string(),
        options[3].to_string(),
    ];

    // as_u64 rejects negatives and fractional numbers
    let correct_answer = obj
        .get("correctAnswer")
        .and_then(Value::as_u64)
        .filter(|&n| n < OPTIONS_PER_QUESTION as u64)
        .ok_or(QuestionIssue::BadCorrectAnswer(number))? as usize;

    let code_snippet = match obj.get("codeSnippet") {
        None | Some(Value::Null) => None,
        Some(v) => v.as_str().map(String::from),
    }
    .filter(|s| !s.trim().is_empty());
    if question_type == QuestionType::Coding && code_snippet.is_none() {
        return Err(QuestionIssue::MissingCodeSnippet(number));
    }

    let explanation = match obj.get("explanation") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => return Err(QuestionIssue::BadExplanation(number)),
    };

    Ok(Question {
        question: question.to_string(),
        options,
        correct_answer,
        code_snippet,
        explanation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> Value {
        json!({
            "question": "Which keyword declares a constant in JavaScript?",
            "options": ["var", "let", "const", "static"],
            "correctAnswer": 2,
            "explanation": "const creates a read-only binding"
        })
    }

    #[test]
    fn test_valid_question_passes() {
        let questions = validate_questions(&[valid()], QuestionType::MultipleChoice).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].correct_answer, 2);
        assert_eq!(questions[0].options[2], "const");
        assert!(questions[0].code_snippet.is_none());
    }

    #[test]
    fn test_empty_question_text_fails() {
        let mut q = valid();
        q["question"] = json!("   ");
        assert_eq!(
            validate_questions(&[q], QuestionType::MultipleChoice),
            Err(QuestionIssue::MissingText(1))
        );
    }

    #[test]
    fn test_three_options_fail() {
        let mut q = valid();
        q["options"] = json!(["a", "b", "c"]);
        assert_eq!(
            validate_questions(&[valid(), q], QuestionType::MultipleChoice),
            Err(QuestionIssue::BadOptions(2))
        );
    }

    #[test]
    fn test_non_text_option_fails() {
        let mut q = valid();
        q["options"] = json!(["a", "b", 3, "d"]);
        assert_eq!(
            validate_questions(&[q], QuestionType::MultipleChoice),
            Err(QuestionIssue::BadOptions(1))
        );
    }

    #[test]
    fn test_correct_answer_out_of_range_fails() {
        for bad in [json!(4), json!(-1), json!(1.5), json!("1"), Value::Null] {
            let mut q = valid();
            q["correctAnswer"] = bad.clone();
            assert_eq!(
                validate_questions(&[q], QuestionType::MultipleChoice),
                Err(QuestionIssue::BadCorrectAnswer(1)),
                "correctAnswer {bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_coding_question_requires_snippet() {
        assert_eq!(
            validate_questions(&[valid()], QuestionType::Coding),
            Err(QuestionIssue::MissingCodeSnippet(1))
        );

        let mut q = valid();
        q["codeSnippet"] = json!("");
        assert_eq!(
            validate_questions(&[q], QuestionType::Coding),
            Err(QuestionIssue::MissingCodeSnippet(1))
        );
    }

    #[test]
    fn test_coding_question_with_snippet_passes() {
        let mut q = valid();
        q["codeSnippet"] = json!("const x = 1;\nx = 2;");
        let questions = validate_questions(&[q], QuestionType::Coding).unwrap();
        assert_eq!(questions[0].code_snippet.as_deref(), Some("const x = 1;\nx = 2;"));
    }

    #[test]
    fn test_non_object_element_fails() {
        assert_eq!(
            validate_questions(&[json!("just text")], QuestionType::MultipleChoice),
            Err(QuestionIssue::NotAnObject(1))
        );
    }

    #[test]
    fn test_issue_messages_are_numbered() {
        assert_eq!(
            QuestionIssue::MissingCodeSnippet(3).to_string(),
            "Coding question 3 missing codeSnippet"
        );
    }
}
