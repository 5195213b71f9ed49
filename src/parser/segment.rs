use super::lines::{classify, is_list_item, Line};

const TOC_MARKER: &str = "table of contents";
const BIBLIOGRAPHY_MARKER: &str = "reference";

/// The four section texts cut out of one rendered page. Any of them may
/// be empty when the page lacks the corresponding region.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Segments {
    pub abstract_text: String,
    pub toc: String,
    pub body: String,
    pub bibliography: String,
}

/// Scan position. Transitions are monotone: once a later state is
/// reached the machine never returns to an earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Before the TOC run has started. Non-list lines accumulate into
    /// the abstract (no-marker mode) or are dropped (marker mode).
    Preamble,
    /// Inside the contiguous run of list-item lines.
    TocRun,
    Body,
    Bibliography,
}

/// Split a page's rendered markdown into abstract / TOC / body /
/// bibliography.
///
/// With `explicit_marker` the text is split at the first heading whose
/// text contains "table of contents" (any case): everything before it,
/// minus the page's own top-level title heading, is the abstract. In
/// no-marker mode the abstract runs up to the first list-item line.
/// Either way the TOC is the maximal contiguous run of list-item lines
/// from the first one found; a non-list line terminates the run only
/// once it has started. The body extends to the first heading whose
/// text contains "reference" (any case), the bibliography from that
/// heading (excluded) to the end. Lines consisting of a lone `>` are
/// dropped from the body and bibliography.
pub fn segment(markdown: &str, explicit_marker: bool) -> Segments {
    let lines: Vec<&str> = markdown.lines().collect();

    let marker_at = if explicit_marker {
        lines.iter().position(|l| is_toc_marker(l))
    } else {
        None
    };

    let (mut abstract_lines, rest) = match marker_at {
        Some(at) => (strip_title_heading(&lines[..at]), &lines[at + 1..]),
        // No marker found: the preamble itself is the abstract.
        None => (Vec::new(), &lines[..]),
    };
    let collect_preamble = marker_at.is_none();

    let mut state = State::Preamble;
    let mut toc: Vec<&str> = Vec::new();
    let mut body: Vec<&str> = Vec::new();
    let mut bibliography: Vec<&str> = Vec::new();

    for &line in rest {
        state = match state {
            State::Preamble => {
                if is_list_item(line) {
                    toc.push(line);
                    State::TocRun
                } else {
                    if collect_preamble {
                        abstract_lines.push(line);
                    }
                    State::Preamble
                }
            }
            State::TocRun => {
                if is_list_item(line) {
                    toc.push(line);
                    State::TocRun
                } else {
                    push_after_toc(line, &mut body, State::Body)
                }
            }
            State::Body => push_after_toc(line, &mut body, State::Body),
            State::Bibliography => {
                push_after_toc(line, &mut bibliography, State::Bibliography)
            }
        };
    }

    Segments {
        abstract_text: join_trimmed(&abstract_lines),
        toc: join_trimmed(&toc),
        body: join_trimmed(&body),
        bibliography: join_trimmed(&bibliography),
    }
}

/// Whether the rendered page contains an explicit table-of-contents
/// heading, so the caller can pick the segmentation mode per page.
pub fn has_toc_marker(markdown: &str) -> bool {
    markdown.lines().any(is_toc_marker)
}

/// Handle one line in the post-TOC region: the bibliography heading
/// flips the state (and is itself dropped), lone blockquote markers
/// are dropped, everything else lands in the current bucket.
fn push_after_toc<'a>(
    line: &'a str,
    bucket: &mut Vec<&'a str>,
    stay: State,
) -> State {
    match classify(line) {
        Line::Heading { text, .. }
            if text.to_lowercase().contains(BIBLIOGRAPHY_MARKER) =>
        {
            State::Bibliography
        }
        Line::BlockquoteEmpty => stay,
        _ => {
            bucket.push(line);
            stay
        }
    }
}

fn is_toc_marker(line: &str) -> bool {
    matches!(
        classify(line),
        Line::Heading { text, .. } if text.to_lowercase().contains(TOC_MARKER)
    )
}

/// Drop the page's own title (the leading level-1 heading) from the
/// pre-marker lines; everything else stays.
fn strip_title_heading<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    let mut kept: Vec<&str> = Vec::with_capacity(lines.len());
    let mut title_dropped = false;
    for &line in lines {
        if !title_dropped {
            if line.trim().is_empty() {
                continue;
            }
            if matches!(classify(line), Line::Heading { level: 1, .. }) {
                title_dropped = true;
                continue;
            }
            title_dropped = true;
        }
        kept.push(line);
    }
    kept
}

fn join_trimmed(lines: &[&str]) -> String {
    lines.join("\n").trim().to_string()
}

// ── Tests ──
