pub mod iep;
pub mod sep;

use clap::ValueEnum;
use thiserror::Error;

use crate::fetch::Fetcher;
use crate::parser::TocNode;

/// Extraction failure for a single page. Raised by a site adapter when
/// an expected container is absent; the per-page crawl loop logs it and
/// moves on, so one broken page never aborts a run.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("page is missing its {section} container ({selector})")]
    MissingSection {
        section: &'static str,
        selector: &'static str,
    },
    #[error(transparent)]
    Convert(#[from] anyhow::Error),
}

/// The five fields extracted from one entry page, before serialization.
#[derive(Debug, Clone)]
pub struct EntryFields {
    pub title: String,
    pub abstract_text: String,
    pub contents: Vec<TocNode>,
    pub body: String,
    pub bibliography: String,
}

/// The two supported encyclopedias. Tagged variants selected at
/// orchestration time; each one knows its index, its page layout, and
/// its own database file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Site {
    /// Stanford Encyclopedia of Philosophy: fields live in distinct
    /// containers addressed by element id.
    Sep,
    /// Internet Encyclopedia of Philosophy: one flowing content region,
    /// split heuristically by the section segmenter.
    Iep,
}

impl Site {
    pub const ALL: [Site; 2] = [Site::Sep, Site::Iep];

    pub fn name(self) -> &'static str {
        match self {
            Site::Sep => "sep",
            Site::Iep => "iep",
        }
    }

    pub fn db_path(self) -> &'static str {
        match self {
            Site::Sep => "data/sep.sqlite",
            Site::Iep => "data/iep.sqlite",
        }
    }

    /// Entry page URIs from the site's index, deduplicated, in index
    /// order.
    pub async fn page_uris(self, fetcher: &Fetcher) -> anyhow::Result<Vec<String>> {
        match self {
            Site::Sep => sep::page_uris(fetcher).await,
            Site::Iep => iep::page_uris(fetcher).await,
        }
    }

    /// Extract the five entry fields from a raw page body.
    pub fn extract_entry(self, html_body: &str) -> Result<EntryFields, ExtractError> {
        match self {
            Site::Sep => sep::extract(html_body),
            Site::Iep => iep::extract(html_body),
        }
    }
}

pub(crate) fn missing(section: &'static str, selector: &'static str) -> ExtractError {
    ExtractError::MissingSection { section, selector }
}
