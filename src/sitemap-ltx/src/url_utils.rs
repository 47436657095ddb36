//! URL filtering and categorization utilities.

use crate::section::{SECTION_RULES, Section};
use crate::text_utils::capitalize_first;
use url::Url;

/// Determines if a URL should be processed based on include/exclude substrings.
///
/// # Logic
///
/// 1. If any exclude pattern is a substring of the URL: exclude
/// 2. If include patterns exist and none is a substring of the URL: exclude
/// 3. Otherwise: include
///
/// # Examples
///
/// ```
/// # use sitemap_ltx::should_process_url;
/// let include = vec!["/docs".to_string()];
/// let exclude = vec!["/docs/internal".to_string()];
/// assert!(should_process_url("https://example.com/docs/intro", &include, &exclude));
/// assert!(!should_process_url("https://example.com/docs/internal/x", &include, &exclude));
/// assert!(!should_process_url("https://example.com/blog", &include, &exclude));
/// ```
pub fn should_process_url(url: &str, include_paths: &[String], exclude_paths: &[String]) -> bool {
    if exclude_paths.iter().any(|pattern| url.contains(pattern.as_str())) {
        return false;
    }

    if !include_paths.is_empty() {
        return include_paths.iter().any(|pattern| url.contains(pattern.as_str()));
    }

    true
}

/// Lower-cased, non-empty path segments of a URL, or `None` if the URL does not parse.
fn path_segments(uri: &str) -> Option<Vec<String>> {
    let url = Url::parse(uri).ok()?;
    let path = url.path().to_lowercase();
    Some(
        path.trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

fn keyword_matches(segment: &str, keyword: &str) -> bool {
    segment.contains(keyword) || keyword.contains(segment) || segment == keyword
}

/// Assigns a URL to a section using the ordered keyword rule table.
///
/// Every keyword of a section is tested against every path segment; a segment matches when it
/// contains the keyword, the keyword contains it, or both are equal. Sections are tried in rule
/// table order, so an earlier section wins over a more specific later one.
///
/// # Examples
///
/// ```
/// # use sitemap_ltx::{categorize_url, Section};
/// assert_eq!(categorize_url("https://example.com/"), Section::Home);
/// assert_eq!(categorize_url("https://example.com/blog/post1"), Section::Blog);
/// assert_eq!(categorize_url("https://example.com/zzz"), Section::Other);
/// assert_eq!(categorize_url("not a url"), Section::Other);
/// ```
pub fn categorize_url(uri: &str) -> Section {
    let Some(segments) = path_segments(uri) else {
        return Section::Other;
    };

    if segments.is_empty() {
        return Section::Home;
    }

    SECTION_RULES
        .iter()
        .find(|(_, keywords)| {
            keywords
                .iter()
                .any(|keyword| segments.iter().any(|segment| keyword_matches(segment, keyword)))
        })
        .map(|(section, _)| *section)
        .unwrap_or(Section::Other)
}

/// Derives a site name from a URL's hostname: `https://www.acme.co.uk/` -> `Acme`.
///
/// Returns `None` when the URL has no usable hostname.
pub fn site_name_from_url(uri: &str) -> Option<String> {
    let url = Url::parse(uri).ok()?;
    let host = url.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    let name = host.split('.').next().unwrap_or_default();
    if name.is_empty() {
        None
    } else {
        Some(capitalize_first(name))
    }
}
