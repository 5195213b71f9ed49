//! Internet Encyclopedia of Philosophy adapter. Entries render as one
//! flowing content region; the abstract, TOC, body, and bibliography
//! boundaries are recovered by the section segmenter. Longer entries
//! carry an explicit "Table of Contents" heading, shorter ones do not,
//! so the segmentation mode is chosen per page.

use std::collections::HashSet;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use tracing::info;

use super::{missing, EntryFields, ExtractError};
use crate::fetch::Fetcher;
use crate::html;
use crate::parser::{has_toc_marker, parse_toc, segment};

const BASE_URL: &str = "https://iep.utm.edu";

const TITLE_SELECTOR: &str = "h1";
const CONTENT_SELECTOR: &str = ".entry-content";

static ENTRY_URI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https://iep\.utm\.edu/([a-z0-9][a-z0-9-]+)/$").unwrap());

/// Entry URIs collected from the per-letter index pages (`/a/` through
/// `/z/`). Only two-plus character slugs qualify; single letters are
/// the index pages themselves.
pub async fn page_uris(fetcher: &Fetcher) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut uris = Vec::new();

    for letter in 'a'..='z' {
        let index_url = format!("{}/{}/", BASE_URL, letter);
        let index = fetcher.get_text(&index_url).await?;
        let mut found = 0usize;
        for href in html::select_hrefs(&index, ".entry-content a") {
            if ENTRY_URI_RE.is_match(&href) && seen.insert(href.clone()) {
                uris.push(href);
                found += 1;
            }
        }
        info!("iep: index {}/ listed {} new entries", letter, found);
    }

    Ok(uris)
}

pub fn extract(html_body: &str) -> Result<EntryFields, ExtractError> {
    let title = html::select_text(html_body, TITLE_SELECTOR)
        .ok_or(missing("title", TITLE_SELECTOR))?;
    let region = html::select_inner_html(html_body, CONTENT_SELECTOR)
        .ok_or(missing("content", CONTENT_SELECTOR))?;

    let markdown = html::to_markdown(&region)?;
    let segments = segment(&markdown, has_toc_marker(&markdown));
    let toc_markdown = html::normalize_toc_list(&segments.toc);
    let contents = parse_toc(&toc_markdown);

    Ok(EntryFields {
        title,
        abstract_text: segments.abstract_text,
        contents,
        body: segments.body,
        bibliography: segments.bibliography,
    })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sites::ExtractError;

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap()
    }

    #[test]
    fn entry_with_toc_heading() {
        let fields = extract(&fixture("iep_entry_marker")).unwrap();
        assert_eq!(fields.title, "Anaximander");
        assert!(fields.abstract_text.contains("Milesian"));
        // The marker heading itself belongs to no section.
        assert!(!fields.abstract_text.to_lowercase().contains("table of contents"));
        assert!(!fields.body.to_lowercase().contains("table of contents"));
        let top: Vec<&str> = fields.contents.iter().map(|n| n.content.as_str()).collect();
        assert_eq!(top, vec!["1. Life", "2. Cosmology", "3. Influence"]);
        assert_eq!(fields.contents[1].subcontent.len(), 2);
        assert!(fields.body.contains("boundless"));
        assert!(fields.bibliography.contains("Kirk"));
        assert!(!fields.body.to_lowercase().contains("further reading"));
    }

    #[test]
    fn entry_without_toc_heading() {
        let fields = extract(&fixture("iep_entry_no_marker")).unwrap();
        assert_eq!(fields.title, "Thales");
        assert!(fields.abstract_text.contains("first philosopher"));
        assert_eq!(fields.contents.len(), 2);
        assert_eq!(fields.contents[0].content, "1. Life");
        assert!(fields.body.contains("water"));
        assert!(fields.bibliography.contains("Aristotle"));
    }

    #[test]
    fn missing_content_region_fails_fast() {
        let html = "<html><body><h1>Thales</h1><div class=\"sidebar\"></div></body></html>";
        let err = extract(html).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::MissingSection { section: "content", .. }
        ));
    }

    #[test]
    fn entry_uri_filter() {
        assert!(ENTRY_URI_RE.is_match("https://iep.utm.edu/anaximander/"));
        assert!(ENTRY_URI_RE.is_match("https://iep.utm.edu/lange-fw/"));
        assert!(!ENTRY_URI_RE.is_match("https://iep.utm.edu/a/"));
        assert!(!ENTRY_URI_RE.is_match("https://iep.utm.edu/anaximander"));
        assert!(!ENTRY_URI_RE.is_match("https://iep.utm.edu/wp-content/uploads/x.png"));
    }
}
