use crate::section::Section;
use serde::Serialize;

/// A page that was fetched, titled and categorized.
///
/// Only produced when both the HTML fetch and the title extraction succeeded, so `title` is never
/// empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedPage {
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub section: Section,
    /// Score derived from `section`; compared against the priority threshold.
    pub priority: f64,
    pub lastmod: Option<String>,
    /// Priority advertised by the sitemap itself. Kept for reference; does not affect scoring.
    pub sitemap_priority: Option<f64>,
}

impl ProcessedPage {
    /// Creates a page whose priority is the default for `section`.
    pub fn new(title: impl Into<String>, url: impl Into<String>, description: Option<String>, section: Section) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            description,
            section,
            priority: section.priority(),
            lastmod: None,
            sitemap_priority: None,
        }
    }
}
