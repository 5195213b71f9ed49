use std::sync::LazyLock;

use anyhow::{anyhow, Result};
use htmd::HtmlToMarkdown;
use regex::Regex;
use scraper::{Html, Selector};

static IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap());
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap());
static ESCAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\([\\`*_{}\[\]()#+.!>~|-])").unwrap());
static BLANKS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

static CONVERTER: LazyLock<HtmlToMarkdown> = LazyLock::new(|| {
    HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style", "hr"])
        .build()
});

/// Stands in for the dot of a dotted section number ("1.1") while the
/// converter runs; private-use, so it never occurs in page text.
const DOT_SENTINEL: char = '\u{F8FF}';

/// Inner HTML of the first element matching `selector`, or `None` when
/// the page has no such container.
pub fn select_inner_html(html: &str, selector: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let sel = Selector::parse(selector).ok()?;
    document.select(&sel).next().map(|el| el.inner_html())
}

/// Concatenated text of the first element matching `selector`.
pub fn select_text(html: &str, selector: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let sel = Selector::parse(selector).ok()?;
    document
        .select(&sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}

/// All href values of anchors matching `selector`.
pub fn select_hrefs(html: &str, selector: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let sel = match Selector::parse(selector) {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };
    document
        .select(&sel)
        .filter_map(|el| el.value().attr("href"))
        .map(str::to_string)
        .collect()
}

/// Convert an HTML fragment to markdown. Anchors are flattened to their
/// text, images and horizontal rules dropped, runs of blank lines
/// collapsed, and the converter's markdown escaping undone: the stored
/// fields are plain text, so `1. Life` must come out as `1. Life`, not
/// `1\. Life`. Dotted section numbers (`1.1`) are masked before the
/// converter runs because its list-marker escaping garbles them
/// irrecoverably.
pub fn to_markdown(html: &str) -> Result<String> {
    let masked = mask_dotted_numbers(html);
    let md = CONVERTER
        .convert(&masked)
        .map_err(|e| anyhow!("html to markdown conversion failed: {}", e))?;

    let md = IMAGE_RE.replace_all(&md, "");
    let md = LINK_RE.replace_all(&md, "$1");
    let md = ESCAPE_RE.replace_all(&md, "$1");
    let md = BLANKS_RE.replace_all(&md, "\n\n");
    Ok(md.replace(DOT_SENTINEL, ".").trim().to_string())
}

/// Replace the dot in every digit-dot-digit run with [`DOT_SENTINEL`]
/// so the converter never sees it. Handles chained numbers ("1.1.2").
fn mask_dotted_numbers(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut prev_digit = false;
    let mut chars = html.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '.' && prev_digit && chars.peek().is_some_and(|n| n.is_ascii_digit()) {
            out.push(DOT_SENTINEL);
            continue;
        }
        prev_digit = c.is_ascii_digit();
        out.push(c);
    }
    out
}

/// Rewrite a rendered markdown list so the TOC parser's input contract
/// holds: `-` bullet markers only, and exactly one tab per nesting
/// level. The markdown renderer indents nested items with spaces; the
/// per-level width is taken from the shallowest indented line.
pub fn normalize_toc_list(md: &str) -> String {
    let indent_width = md
        .lines()
        .filter_map(|line| {
            let spaces = line.len() - line.trim_start_matches(' ').len();
            (spaces > 0 && !line.trim().is_empty()).then_some(spaces)
        })
        .min()
        .unwrap_or(4);

    md.lines()
        .map(|line| {
            let tabs = line.chars().take_while(|&c| c == '\t').count();
            let rest = &line[tabs..];
            let spaces = rest.len() - rest.trim_start_matches(' ').len();
            let depth = tabs + spaces / indent_width;
            let item = rest.trim_start();
            let item = match item.strip_prefix(['*', '+']) {
                Some(tail) => format!("-{}", tail),
                None => item.to_string(),
            };
            format!("{}{}", "\t".repeat(depth), item)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Tests ──
