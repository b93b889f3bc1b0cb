//! Prompt builder: renders generation prompts from typed inputs.
//!
//! Pure functions with no I/O. Identical inputs always produce identical prompt text.
//! Templates live in `quiz::prompts`.

use crate::llm_client::prompts::{JSON_ARRAY_ONLY_INSTRUCTION, UNTRUSTED_INPUT_INSTRUCTION};
use crate::models::question::{Level, QuestionType};
use crate::models::result::SessionResult;
use crate::quiz::prompts::{
    CODE_SNIPPET_FIELD, CODING_EXAMPLE, FEEDBACK_PROMPT_TEMPLATE, QUESTION_PROMPT_TEMPLATE,
    THEORY_EXAMPLE,
};

/// Builds the question-generation prompt.
pub fn build_question_prompt(
    topic: &str,
    level: Level,
    question_type: QuestionType,
    count: usize,
) -> String {
    let (snippet_field, example_kind, example) = match question_type {
        QuestionType::Coding => (CODE_SNIPPET_FIELD, "coding", CODING_EXAMPLE),
        QuestionType::MultipleChoice => ("", "theoretical", THEORY_EXAMPLE),
    };
    let count = count.to_string();

    fill_template(
        QUESTION_PROMPT_TEMPLATE,
        &[
            ("count", &count),
            ("descriptor", question_type.prompt_descriptor()),
            ("level", level.as_str()),
            ("role", topic.trim()),
            ("snippet_field", snippet_field),
            ("example_kind", example_kind),
            ("example", example),
            ("untrusted_instruction", UNTRUSTED_INPUT_INSTRUCTION),
            ("json_instruction", JSON_ARRAY_ONLY_INSTRUCTION),
        ],
    )
}

/// Builds the feedback prompt, embedding the full question/answer transcript.
pub fn build_feedback_prompt(result: &SessionResult) -> String {
    let score = result.score.to_string();
    let correct = result.correct.to_string();
    let total = result.total.to_string();
    let breakdown = render_breakdown(result);

    fill_template(
        FEEDBACK_PROMPT_TEMPLATE,
        &[
            ("level", result.level.as_str()),
            ("role", &result.role),
            ("score", &score),
            ("correct", &correct),
            ("total", &total),
            ("breakdown", &breakdown),
        ],
    )
}

fn render_breakdown(result: &SessionResult) -> String {
    result
        .questions
        .iter()
        .enumerate()
        .map(|(i, q)| {
            let answer = result.user_answers.get(i).copied().flatten();
            let mut lines = vec![
                format!("Question {}:", i + 1),
                format!("- Question: {}", q.question),
            ];
            if let Some(snippet) = &q.code_snippet {
                lines.push(format!("- Code Snippet:\n{snippet}"));
            }
            lines.push(format!(
                "- Correct Answer: {}",
                q.correct_option().unwrap_or("(missing option)")
            ));
            let user_answer = match answer {
                Some(index) => q.option(index).unwrap_or("(invalid option)"),
                None => "Unanswered",
            };
            lines.push(format!("- User's Answer: {user_answer}"));
            if let Some(explanation) = &q.explanation {
                lines.push(format!("- Explanation: {explanation}"));
            }
            lines.join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Substitutes `{name}` placeholders in a single left-to-right pass.
///
/// Substituted values are never rescanned, so user-provided text containing braces
/// cannot inject other placeholders. Unknown `{...}` sequences are copied through.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + 256);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replacement = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match replacement {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{Question, TestKind};
    use crate::quiz::scoring::ScoreSummary;

    fn question(text: &str, correct: usize, snippet: Option<&str>) -> Question {
        Question {
            question: text.to_string(),
            options: [
                "alpha".to_string(),
                "beta".to_string(),
                "gamma".to_string(),
                "delta".to_string(),
            ],
            correct_answer: correct,
            code_snippet: snippet.map(String::from),
            explanation: Some(format!("because {text}")),
        }
    }

    #[test]
    fn test_question_prompt_embeds_inputs() {
        let prompt = build_question_prompt("backend", Level::MidLevel, QuestionType::MultipleChoice, 12);
        assert!(prompt.contains("Generate exactly 12 theoretical multiple-choice questions"));
        assert!(prompt.contains("mid-level level backend position"));
        assert!(prompt.contains("\"correctAnswer\""));
        assert!(prompt.contains("exactly 4 options"));
        assert!(!prompt.contains("codeSnippet\": string"));
        assert!(prompt.ends_with(JSON_ARRAY_ONLY_INSTRUCTION));
    }

    #[test]
    fn test_coding_prompt_requires_snippet() {
        let prompt = build_question_prompt("frontend", Level::Junior, QuestionType::Coding, 5);
        assert!(prompt.contains("coding-based"));
        assert!(prompt.contains("\"codeSnippet\": string (relevant code snippet)"));
        // The example's JSX braces survive substitution.
        assert!(prompt.contains("<div>{count}</div>"));
    }

    #[test]
    fn test_question_prompt_is_deterministic() {
        let a = build_question_prompt("qa", Level::Senior, QuestionType::Coding, 3);
        let b = build_question_prompt("qa", Level::Senior, QuestionType::Coding, 3);
        assert_eq!(a, b);
    }

    #[test]
    fn test_topic_braces_are_not_expanded() {
        let prompt = build_question_prompt("{count} {example}", Level::Junior, QuestionType::MultipleChoice, 4);
        assert!(prompt.contains("junior level {count} {example} position"));
    }

    #[test]
    fn test_feedback_prompt_contains_transcript() {
        let result = SessionResult::new(
            ScoreSummary {
                score: 50,
                correct: 1,
                total: 2,
            },
            "data-analyst".to_string(),
            Level::Fresher,
            TestKind::Coding,
            vec![
                question("What is SQL?", 0, None),
                question("What does this print?", 2, Some("print(1)")),
            ],
            vec![Some(0), None],
        );

        let prompt = build_feedback_prompt(&result);
        assert!(prompt.contains("\"fresher\" level assessment for the \"data-analyst\" role"));
        assert!(prompt.contains("scored 50% (1 out of 2 questions correct)"));
        assert!(prompt.contains("Question 1:\n- Question: What is SQL?"));
        assert!(prompt.contains("- Code Snippet:\nprint(1)"));
        assert!(prompt.contains("- Correct Answer: gamma"));
        assert!(prompt.contains("- User's Answer: Unanswered"));
        assert!(prompt.contains("- Explanation: because What is SQL?"));
    }

    #[test]
    fn test_fill_template_leaves_unknown_placeholders() {
        assert_eq!(fill_template("a {x} {y} {", &[("x", "1")]), "a 1 {y} {");
    }
}
