//! Best-effort extraction of named sections from model-written feedback.
//!
//! The feedback text is untrusted free-form output. A section body starts after its header
//! line ("Strengths", "Weaknesses", "Improvement Tips/Suggestions", "Career Roadmap/Path",
//! with optional markdown emphasis and colon) and runs until the first blank line or the next
//! recognised header. The career roadmap runs to the end of the text. Sections that cannot
//! be found fall back to a fixed placeholder and are marked `found: false`.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

const STRENGTHS_PLACEHOLDER: &str = "No strengths identified";
const WEAKNESSES_PLACEHOLDER: &str = "No weaknesses identified";
const TIPS_PLACEHOLDER: &str = "No specific improvement tips provided";
const ROADMAP_PLACEHOLDER: &str = "No career roadmap provided";

const STRENGTHS: &str = r"strengths";
const WEAKNESSES: &str = r"weaknesses";
const IMPROVEMENT: &str = r"improvement\s+(?:tips|suggestions)";
const ROADMAP: &str = r"career\s+(?:roadmap|path)";
const SUMMARY: &str = r"performance\s+summary";

fn header_regex(name: &str) -> Regex {
    Regex::new(&format!(r"(?im)^[ \t#>*_]*(?:{name})[ \t*_]*:?[ \t*_]*$"))
        .expect("feedback header pattern is valid")
}

static STRENGTHS_HEADER: LazyLock<Regex> = LazyLock::new(|| header_regex(STRENGTHS));
static WEAKNESSES_HEADER: LazyLock<Regex> = LazyLock::new(|| header_regex(WEAKNESSES));
static IMPROVEMENT_HEADER: LazyLock<Regex> = LazyLock::new(|| header_regex(IMPROVEMENT));
static ROADMAP_HEADER: LazyLock<Regex> = LazyLock::new(|| header_regex(ROADMAP));
static ANY_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    header_regex(&[STRENGTHS, WEAKNESSES, IMPROVEMENT, ROADMAP, SUMMARY].join("|"))
});
static BLANK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n").expect("blank line pattern is valid"));
static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d+\.|-|\*)\s*").expect("list marker pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum FeedbackBlock {
    Bullet(String),
    Paragraph(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackSection {
    pub text: String,
    /// False when the header was not found and `text` is the placeholder.
    pub found: bool,
    pub blocks: Vec<FeedbackBlock>,
}

impl FeedbackSection {
    fn from_match(body: Option<String>, placeholder: &str) -> Self {
        let (text, found) = match body {
            Some(text) => (text, true),
            None => (placeholder.to_string(), false),
        };
        let blocks = format_content(&text);
        Self {
            text,
            found,
            blocks,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackSections {
    pub strengths: FeedbackSection,
    pub weaknesses: FeedbackSection,
    pub improvement_tips: FeedbackSection,
    pub career_roadmap: FeedbackSection,
}

pub fn parse_feedback(text: &str) -> FeedbackSections {
    let text = text.replace("\r\n", "\n");

    FeedbackSections {
        strengths: FeedbackSection::from_match(
            section_body(&text, &STRENGTHS_HEADER, false),
            STRENGTHS_PLACEHOLDER,
        ),
        weaknesses: FeedbackSection::from_match(
            section_body(&text, &WEAKNESSES_HEADER, false),
            WEAKNESSES_PLACEHOLDER,
        ),
        improvement_tips: FeedbackSection::from_match(
            section_body(&text, &IMPROVEMENT_HEADER, false),
            TIPS_PLACEHOLDER,
        ),
        career_roadmap: FeedbackSection::from_match(
            section_body(&text, &ROADMAP_HEADER, true),
            ROADMAP_PLACEHOLDER,
        ),
    }
}

fn section_body(text: &str, header: &Regex, to_end: bool) -> Option<String> {
    let m = header.find(text)?;
    let rest = text[m.end()..].trim_start();

    let end = if to_end {
        rest.len()
    } else {
        let blank = BLANK_LINE.find(rest).map(|b| b.start());
        let next_header = ANY_HEADER.find(rest).map(|h| h.start());
        blank
            .into_iter()
            .chain(next_header)
            .min()
            .unwrap_or(rest.len())
    };

    let body = rest[..end].trim();
    if body.is_empty() {
        None
    } else {
        Some(body.to_string())
    }
}

/// Splits a section body into list items (`1.`, `-`, `*` markers stripped) and paragraphs.
pub fn format_content(text: &str) -> Vec<FeedbackBlock> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match LIST_MARKER.find(line) {
            Some(marker) => FeedbackBlock::Bullet(line[marker.end()..].to_string()),
            None => FeedbackBlock::Paragraph(line.to_string()),
        })
        .collect()
}
