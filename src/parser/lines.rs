use std::sync::LazyLock;

use regex::Regex;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").unwrap());

/// Classification of a single markdown line. Trimmed for classification;
/// the caller keeps the original text for output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    Heading { level: u8, text: &'a str },
    ListItem { marker: char, text: &'a str },
    BlockquoteEmpty,
    Plain(&'a str),
}

/// Classify one line by its first non-whitespace character. Markdown
/// list markers are `*`, `-`, `+`, or an ASCII digit (ordered lists).
pub fn classify(line: &str) -> Line<'_> {
    let trimmed = line.trim();

    if trimmed == ">" {
        return Line::BlockquoteEmpty;
    }

    if let Some(caps) = HEADING_RE.captures(trimmed) {
        let level = caps.get(1).map_or(0, |m| m.as_str().len()) as u8;
        if let Some(text) = caps.get(2) {
            return Line::Heading { level, text: text.as_str() };
        }
    }

    match trimmed.chars().next() {
        Some(c @ ('*' | '-' | '+')) => Line::ListItem {
            marker: c,
            text: trimmed[1..].trim_start(),
        },
        Some(c) if c.is_ascii_digit() => Line::ListItem {
            marker: c,
            text: trimmed
                .trim_start_matches(|ch: char| ch.is_ascii_digit() || ch == '.' || ch == ')')
                .trim_start(),
        },
        _ => Line::Plain(trimmed),
    }
}

pub fn is_list_item(line: &str) -> bool {
    matches!(classify(line), Line::ListItem { .. })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading() {
        assert_eq!(
            classify("### Table of Contents"),
            Line::Heading { level: 3, text: "Table of Contents" }
        );
    }

    #[test]
    fn bullet_markers() {
        for marker in ['*', '-', '+'] {
            let line = format!("{} item", marker);
            assert_eq!(classify(&line), Line::ListItem { marker, text: "item" });
        }
    }

    #[test]
    fn ordered_item() {
        assert_eq!(classify("1. First"), Line::ListItem { marker: '1', text: "First" });
    }

    #[test]
    fn dotted_ordinal_item() {
        assert_eq!(classify("1.1 Inner"), Line::ListItem { marker: '1', text: "Inner" });
    }

    #[test]
    fn indented_item_is_still_an_item() {
        assert!(is_list_item("   - nested"));
    }

    #[test]
    fn lone_blockquote_marker() {
        assert_eq!(classify(" > "), Line::BlockquoteEmpty);
    }

    #[test]
    fn blockquote_with_content_is_plain() {
        assert_eq!(classify("> quoted"), Line::Plain("> quoted"));
    }

    #[test]
    fn plain_text() {
        assert_eq!(classify("Body starts."), Line::Plain("Body starts."));
    }

    #[test]
    fn blank_line() {
        assert_eq!(classify(""), Line::Plain(""));
    }
}
