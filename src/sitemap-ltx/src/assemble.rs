//! Turns processed pages into the final llms.txt document.

use crate::config::GeneratorOptions;
use crate::errors::{LlmsGenError, Result};
use crate::page::ProcessedPage;
use crate::section::{DISPLAY_ORDER, Section};
use crate::url_utils::site_name_from_url;
use std::cmp::Ordering;
use std::collections::HashMap;

pub const FALLBACK_SITE_TITLE: &str = "Documentation";

/// Filters `pages` by the configured priority threshold and renders the document.
///
/// # Errors
///
/// Returns [`LlmsGenError::NoPagesMetThreshold`] when no page reaches the threshold.
pub fn assemble(pages: Vec<ProcessedPage>, options: &GeneratorOptions) -> Result<String> {
    let pages = filter_by_priority(pages, options.priority_threshold)?;
    let title = site_title(&pages, options.title.as_deref());
    let description = site_description(&pages, options.description.as_deref());
    Ok(render(&pages, &title, &description))
}

/// Keeps the pages whose priority is at least `threshold`.
pub fn filter_by_priority(pages: Vec<ProcessedPage>, threshold: f64) -> Result<Vec<ProcessedPage>> {
    let total = pages.len();
    let kept: Vec<ProcessedPage> = pages.into_iter().filter(|p| p.priority >= threshold).collect();
    tracing::debug!("{} of {} pages met the priority threshold {}", kept.len(), total, threshold);
    if kept.is_empty() {
        Err(LlmsGenError::NoPagesMetThreshold)
    } else {
        Ok(kept)
    }
}

/// Picks the document title.
///
/// Order of preference: the custom title, the site name taken from the home page's hostname
/// (or that page's title when the URL has no hostname), the first page's title, and finally
/// [`FALLBACK_SITE_TITLE`].
pub fn site_title(pages: &[ProcessedPage], custom: Option<&str>) -> String {
    if let Some(title) = custom {
        return title.to_string();
    }

    if let Some(home) = pages.iter().find(|p| p.section == Section::Home) {
        return site_name_from_url(&home.url).unwrap_or_else(|| home.title.clone());
    }

    pages
        .first()
        .map(|p| p.title.clone())
        .unwrap_or_else(|| FALLBACK_SITE_TITLE.to_string())
}

/// Picks the document description: the custom one, else the home page's description,
/// else a sentence listing the notable sections present.
pub fn site_description(pages: &[ProcessedPage], custom: Option<&str>) -> String {
    if let Some(description) = custom {
        return description.to_string();
    }

    if let Some(description) = pages
        .iter()
        .find(|p| p.section == Section::Home)
        .and_then(|p| p.description.as_ref())
    {
        return description.clone();
    }

    let has = |section: Section| pages.iter().any(|p| p.section == section);
    let mut features = Vec::new();
    if has(Section::Guides) {
        features.push("Guides & Tutorials");
    }
    if has(Section::Blog) {
        features.push("Articles & News");
    }
    if has(Section::Services) {
        features.push("Services & Products");
    }
    if features.is_empty() {
        features.push("Useful contents");
    }

    format!("A website with: {}.", features.join(", "))
}

/// Orders pages by priority (highest first), then by title ignoring case.
/// Titles that differ only in case put the lower-case variant first.
fn compare_pages(a: &ProcessedPage, b: &ProcessedPage) -> Ordering {
    b.priority
        .total_cmp(&a.priority)
        .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
        .then_with(|| b.title.cmp(&a.title))
}

/// Renders the document. Pages are expected to be already filtered.
pub fn render(pages: &[ProcessedPage], title: &str, description: &str) -> String {
    let mut sections: HashMap<Section, Vec<&ProcessedPage>> = HashMap::new();
    for page in pages {
        sections.entry(page.section).or_default().push(page);
    }

    let mut output = String::new();
    output.push_str(&format!("# {}\n\n", title));
    output.push_str(&format!("> {}\n\n", description));

    for section in DISPLAY_ORDER {
        let Some(section_pages) = sections.get_mut(&section) else {
            continue;
        };
        section_pages.sort_by(|a, b| compare_pages(a, b));

        output.push_str(&format!("## {}\n\n", section.display_name()));
        for page in section_pages.iter() {
            output.push_str(&format!("- [{}]({})", page.title, page.url));
            if let Some(desc) = &page.description {
                output.push_str(&format!(": {}", desc));
            }
            output.push('\n');
        }
        output.push('\n');
    }

    output.trim_end().to_string()
}
