//! Stanford Encyclopedia of Philosophy adapter. Every field has its own
//! container in the page, so no heuristic segmentation is needed here;
//! each region is converted to markdown independently.

use std::collections::HashSet;

use anyhow::Result;

use super::{missing, EntryFields, ExtractError};
use crate::fetch::Fetcher;
use crate::html;
use crate::parser::parse_toc;

const INDEX_URL: &str = "https://plato.stanford.edu/contents.html";
const BASE_URL: &str = "https://plato.stanford.edu/";

const TITLE_SELECTOR: &str = "h1";
const PREAMBLE_SELECTOR: &str = "#preamble";
const TOC_SELECTOR: &str = "#toc";
const BODY_SELECTOR: &str = "#main-text";
const BIBLIOGRAPHY_SELECTOR: &str = "#bibliography";

/// Entry URIs from the master table of contents page. Hrefs there are
/// relative (`entries/<slug>/`); the index lists some entries more than
/// once, so duplicates are dropped keeping first occurrence.
pub async fn page_uris(fetcher: &Fetcher) -> Result<Vec<String>> {
    let index = fetcher.get_text(INDEX_URL).await?;
    let mut seen = HashSet::new();
    let uris = html::select_hrefs(&index, "a")
        .into_iter()
        .filter(|href| href.starts_with("entries/"))
        .filter(|href| seen.insert(href.clone()))
        .map(|href| format!("{}{}", BASE_URL, href))
        .collect();
    Ok(uris)
}

pub fn extract(html_body: &str) -> Result<EntryFields, ExtractError> {
    let title = html::select_text(html_body, TITLE_SELECTOR)
        .ok_or(missing("title", TITLE_SELECTOR))?;
    let preamble = html::select_inner_html(html_body, PREAMBLE_SELECTOR)
        .ok_or(missing("abstract", PREAMBLE_SELECTOR))?;
    let toc_html = html::select_inner_html(html_body, TOC_SELECTOR)
        .ok_or(missing("table of contents", TOC_SELECTOR))?;
    let main_text = html::select_inner_html(html_body, BODY_SELECTOR)
        .ok_or(missing("body", BODY_SELECTOR))?;
    let bib_html = html::select_inner_html(html_body, BIBLIOGRAPHY_SELECTOR)
        .ok_or(missing("bibliography", BIBLIOGRAPHY_SELECTOR))?;

    let abstract_text = html::to_markdown(&preamble)?;
    let toc_markdown = html::normalize_toc_list(&html::to_markdown(&toc_html)?);
    let contents = parse_toc(&toc_markdown);
    // The main text carries source-formatting newlines that turn into
    // stray breaks after conversion; flatten them first.
    let body = html::to_markdown(&main_text.replace('\n', " "))?;
    let bibliography = html::to_markdown(&bib_html)?;

    Ok(EntryFields {
        title,
        abstract_text,
        contents,
        body,
        bibliography,
    })
}

// ── Tests ──
