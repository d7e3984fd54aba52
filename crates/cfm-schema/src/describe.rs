//! # Generated Descriptions
//!
//! A schema's description is its doc text followed by a rendered list of its
//! fields, for consumption by documentation renderers:
//!
//! ```text
//! Test config.
//!
//! Configuration options:
//!
//! :param foo:
//!
//!     A foo field.
//!
//! :param str bar:
//!
//!     A bar field.
//! ```
//!
//! Field text is wrapped at [`WRAP_WIDTH`] columns with a four-space indent.

use std::sync::Arc;

use crate::field::Field;

/// Separator between the doc text and the field list.
pub const OPTIONS_HEADER: &str = "Configuration options:";

/// Column limit for wrapped field text, indent included.
pub const WRAP_WIDTH: usize = 70;

const INDENT: &str = "    ";

/// Render the description of a schema with the given doc text and fields.
pub fn generate_description(doc: &str, fields: &[Arc<Field>]) -> String {
    let mut lines: Vec<String> = doc.split('\n').map(str::to_string).collect();
    if lines.last().is_some_and(|line| !line.trim().is_empty()) {
        lines.push(String::new());
    }
    lines.push(OPTIONS_HEADER.to_string());
    for field in fields {
        lines.push(String::new());
        lines.push(field.doc_header());
        lines.push(String::new());
        lines.extend(wrap(field.doc(), WRAP_WIDTH, INDENT));
    }
    lines.join("\n")
}

/// Greedy word wrap. Whitespace runs collapse to single spaces; words longer
/// than a line are split across lines. Empty text yields no lines.
pub fn wrap(text: &str, width: usize, indent: &str) -> Vec<String> {
    let indent_len = indent.chars().count();
    let room = width.saturating_sub(indent_len).max(1);

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current_len > 0 && current_len + 1 + word_len <= room {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
            continue;
        }
        if current_len > 0 {
            lines.push(format!("{indent}{current}"));
            current.clear();
            current_len = 0;
        }
        let mut rest: Vec<char> = word.chars().collect();
        while rest.len() > room {
            let tail = rest.split_off(room);
            lines.push(format!("{indent}{}", rest.iter().collect::<String>()));
            rest = tail;
        }
        current = rest.into_iter().collect();
        current_len = current.chars().count();
    }
    if current_len > 0 {
        lines.push(format!("{indent}{current}"));
    }
    lines
}
