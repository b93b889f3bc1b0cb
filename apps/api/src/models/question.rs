use std::fmt;

use serde::{Deserialize, Serialize};

/// A single generated multiple-choice question.
///
/// `options` always holds exactly four entries and `correct_answer` indexes into it.
/// Questions are immutable once validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub question: String,
    pub options: [String; 4],
    pub correct_answer: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    /// Text of the option at `index`, if it exists.
    pub fn option(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }

    pub fn correct_option(&self) -> Option<&str> {
        self.option(self.correct_answer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Level {
    Fresher,
    #[default]
    Junior,
    MidLevel,
    Senior,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::Fresher, Level::Junior, Level::MidLevel, Level::Senior];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Fresher => "fresher",
            Level::Junior => "junior",
            Level::MidLevel => "mid-level",
            Level::Senior => "senior",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Level::Fresher => "Fresher",
            Level::Junior => "Junior",
            Level::MidLevel => "Mid-level",
            Level::Senior => "Senior",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of questions requested from the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QuestionType {
    #[default]
    #[serde(rename = "mcq", alias = "multiple-choice")]
    MultipleChoice,
    #[serde(rename = "coding")]
    Coding,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "mcq",
            QuestionType::Coding => "coding",
        }
    }

    /// Wording used inside the generation prompt.
    pub fn prompt_descriptor(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "theoretical",
            QuestionType::Coding => "coding-based",
        }
    }
}

/// Which quiz variant a session runs. Custom tests reuse a question set
/// generated earlier by the custom-topic flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestKind {
    #[default]
    #[serde(alias = "multiple-choice")]
    Mcq,
    Coding,
    Custom,
}

impl TestKind {
    /// The question type to generate for this variant. Custom tests are not generated
    /// at session start, so they have none.
    pub fn question_type(&self) -> Option<QuestionType> {
        match self {
            TestKind::Mcq => Some(QuestionType::MultipleChoice),
            TestKind::Coding => Some(QuestionType::Coding),
            TestKind::Custom => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_uses_kebab_case_on_the_wire() {
        assert_eq!(serde_json::to_string(&Level::MidLevel).unwrap(), "\"mid-level\"");
        let level: Level = serde_json::from_str("\"fresher\"").unwrap();
        assert_eq!(level, Level::Fresher);
    }

    #[test]
    fn test_unknown_level_is_rejected() {
        assert!(serde_json::from_str::<Level>("\"principal\"").is_err());
    }

    #[test]
    fn test_question_type_accepts_long_alias() {
        let t: QuestionType = serde_json::from_str("\"multiple-choice\"").unwrap();
        assert_eq!(t, QuestionType::MultipleChoice);
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"mcq\"");
    }

    #[test]
    fn test_question_uses_camel_case_fields() {
        let json = r#"{
            "question": "What is 2 + 2?",
            "options": ["3", "4", "5", "22"],
            "correctAnswer": 1,
            "codeSnippet": "print(2 + 2)"
        }"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.correct_option(), Some("4"));
        assert_eq!(q.code_snippet.as_deref(), Some("print(2 + 2)"));
        assert!(q.explanation.is_none());
    }

    #[test]
    fn test_custom_kind_has_no_question_type() {
        assert_eq!(TestKind::Custom.question_type(), None);
        assert_eq!(TestKind::Coding.question_type(), Some(QuestionType::Coding));
    }
}
