//! HTML parsing utilities for extracting page metadata.

use crate::text_utils::{clean_title, truncate_with_ellipsis};
use scraper::{ElementRef, Html, Selector};

/// Meta tags consulted for a page description, in order of preference.
const DESCRIPTION_SELECTORS: [&str; 3] = [
    r#"head > meta[name="description"]"#,
    r#"head > meta[property="og:description"]"#,
    r#"head > meta[name="twitter:description"]"#,
];

/// Paragraphs inside these containers are used when no meta description exists.
const CONTENT_PARAGRAPH_SELECTOR: &str = "main p, article p, .content p, #content p";

/// Bounds (exclusive, in characters) for a paragraph to be usable as a description.
const MIN_PARAGRAPH_CHARS: usize = 50;
const MAX_PARAGRAPH_CHARS: usize = 300;

/// Paragraph descriptions longer than this are cut and suffixed with `...`.
const PARAGRAPH_DESCRIPTION_CHARS: usize = 200;

/// Title and description recovered from a page. Either may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageData {
    pub title: Option<String>,
    pub description: Option<String>,
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(text_of)
        .filter(|s| !s.is_empty())
}

fn title_of(document: &Html) -> Option<String> {
    let raw = first_text(document, "head > title").or_else(|| first_text(document, "h1"))?;
    Some(clean_title(&raw)).filter(|s| !s.is_empty())
}

fn meta_description(document: &Html) -> Option<String> {
    DESCRIPTION_SELECTORS.iter().find_map(|sel| {
        let selector = Selector::parse(sel).ok()?;
        document
            .select(&selector)
            .next()
            .and_then(|element| element.value().attr("content"))
            .map(str::trim)
            .filter(|content| !content.is_empty())
            .map(str::to_string)
    })
}

fn paragraph_description(document: &Html) -> Option<String> {
    let paragraph = first_text(document, CONTENT_PARAGRAPH_SELECTOR)?;
    let length = paragraph.chars().count();
    if length > MIN_PARAGRAPH_CHARS && length < MAX_PARAGRAPH_CHARS {
        Some(truncate_with_ellipsis(&paragraph, PARAGRAPH_DESCRIPTION_CHARS))
    } else {
        None
    }
}

fn description_of(document: &Html) -> Option<String> {
    meta_description(document).or_else(|| paragraph_description(document))
}

/// Extracts the cleaned title and the description of a page in a single parse.
///
/// # Examples
///
/// ```
/// # use sitemap_ltx::extract_page_data;
/// let html = r#"<html><head><title>Pricing | Acme</title>
///     <meta name="description" content="Plans for every team"></head></html>"#;
/// let page = extract_page_data(html);
/// assert_eq!(page.title.as_deref(), Some("Pricing"));
/// assert_eq!(page.description.as_deref(), Some("Plans for every team"));
/// ```
pub fn extract_page_data(html: &str) -> PageData {
    let document = Html::parse_document(html);
    PageData {
        title: title_of(&document),
        description: description_of(&document),
    }
}

/// Extracts the title from HTML content.
///
/// Uses the `<title>` element, falling back to the first `<h1>`, and strips a leading `|` and a
/// trailing ` | Site Name`.
///
/// # Examples
///
/// ```
/// # use sitemap_ltx::get_title;
/// let html = r#"<html><head><title>Example Title</title></head></html>"#;
/// assert_eq!(get_title(html), Some("Example Title".to_string()));
/// ```
pub fn get_title(html: &str) -> Option<String> {
    title_of(&Html::parse_document(html))
}

/// Extracts the description from HTML.
///
/// Tries the following sources in order:
/// 1. `<meta name="description" content="...">`
/// 2. `<meta property="og:description" content="...">`
/// 3. `<meta name="twitter:description" content="...">`
/// 4. The first paragraph in `main`, `article`, `.content` or `#content`, if it is longer than
///    50 and shorter than 300 characters (cut to 200 characters)
pub fn get_description(html: &str) -> Option<String> {
    description_of(&Html::parse_document(html))
}
