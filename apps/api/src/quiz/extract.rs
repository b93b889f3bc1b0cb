//! Locates the JSON array inside free-form model output.
//!
//! Models wrap their JSON in prose or code fences often enough that the text cannot be
//! parsed directly. The scanner walks the text once, tracking string literals and escapes,
//! and yields every balanced top-level `[...]` span in order. The first span that parses as
//! a JSON array wins, so brackets inside option text or a stray `[note]` in the preamble
//! do not derail extraction.

use serde_json::Value;

/// Returns the first balanced `[...]` span that parses as a JSON array, with its parsed elements.
pub fn extract_json_array(text: &str) -> Option<(&str, Vec<Value>)> {
    let mut search_from = 0;

    while let Some(offset) = text[search_from..].find('[') {
        let start = search_from + offset;
        // An unclosed `[` in prose must not hide a balanced array that opens later.
        if let Some(end) = balanced_span_end(text, start) {
            let candidate = &text[start..end];
            if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(candidate) {
                return Some((candidate, items));
            }
        }
        search_from = start + 1;
    }

    None
}

/// Given `text[start] == '['`, returns the byte index just past the matching `]`.
fn balanced_span_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(start + i + c.len_utf8());
                }
            }
            _ => {}
        }
    }

    None
}
