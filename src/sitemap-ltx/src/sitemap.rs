//! Sitemap resolution: turns a sitemap URL into the ordered list of page URLs it lists.

use crate::config::GeneratorOptions;
use crate::errors::{LlmsGenError, Result};
use crate::fetch::build_client;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use quick_xml::Reader;
use quick_xml::events::Event;
use reqwest::Client;
use std::time::Duration;

/// Nested sitemap indexes deeper than this are not followed.
const MAX_INDEX_DEPTH: usize = 3;

/// Represents a single URL entry in a sitemap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SitemapEntry {
    /// The URL location
    pub loc: String,
    /// Optional last modification date
    pub lastmod: Option<String>,
    /// Optional change frequency hint (`daily`, `weekly`, ...)
    pub changefreq: Option<String>,
    /// Optional priority declared by the sitemap. Carried along but not used for scoring.
    pub priority: Option<f64>,
}

impl SitemapEntry {
    pub fn new(loc: impl Into<String>) -> Self {
        Self {
            loc: loc.into(),
            ..Default::default()
        }
    }
}

/// Resolves a sitemap URL to its page entries, flattening sitemap indexes.
///
/// Injected into the generator for each run; an empty result is reported by the generator as
/// "No URLs found in sitemap".
#[async_trait]
pub trait SitemapSource: Send + Sync {
    async fn resolve(&self, sitemap_url: &str) -> Result<Vec<SitemapEntry>>;
}

/// A parsed sitemap document: either a set of pages or an index of further sitemaps.
#[derive(Debug, Clone, PartialEq)]
pub enum SitemapDocument {
    UrlSet(Vec<SitemapEntry>),
    Index(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Loc,
    Lastmod,
    Changefreq,
    Priority,
}

fn assign(entry: &mut SitemapEntry, field: Field, value: String) {
    match field {
        Field::Loc => entry.loc = value,
        Field::Lastmod => entry.lastmod = Some(value),
        Field::Changefreq => entry.changefreq = Some(value),
        Field::Priority => entry.priority = value.trim().parse::<f64>().ok(),
    }
}

/// Parses XML sitemap content.
///
/// Supports `<urlset>` documents in the standard format:
/// ```xml
/// <urlset>
///   <url>
///     <loc>https://example.com/page</loc>
///     <lastmod>2024-01-01</lastmod>
///     <changefreq>weekly</changefreq>
///     <priority>0.8</priority>
///   </url>
/// </urlset>
/// ```
/// and `<sitemapindex>` documents whose `<sitemap><loc>` children point at further sitemaps.
///
/// # Errors
///
/// Returns an error if the XML is malformed.
pub fn parse_sitemap(xml: &str) -> Result<SitemapDocument> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut is_index = false;
    let mut entries = Vec::new();
    let mut children = Vec::new();
    let mut current: Option<SitemapEntry> = None;
    let mut field: Option<Field> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"sitemapindex" => is_index = true,
                b"url" | b"sitemap" => current = Some(SitemapEntry::default()),
                b"loc" => field = Some(Field::Loc),
                b"lastmod" => field = Some(Field::Lastmod),
                b"changefreq" => field = Some(Field::Changefreq),
                b"priority" => field = Some(Field::Priority),
                _ => field = None,
            },
            Ok(Event::Text(ref text)) => {
                if let (Some(entry), Some(f)) = (current.as_mut(), field) {
                    let value = text
                        .unescape()
                        .map_err(|e| LlmsGenError::SitemapError(format!("Invalid XML: {}", e)))?;
                    assign(entry, f, value.trim().to_string());
                }
            }
            Ok(Event::CData(ref cdata)) => {
                if let (Some(entry), Some(f)) = (current.as_mut(), field) {
                    let value = String::from_utf8_lossy(&cdata.clone().into_inner()).trim().to_string();
                    assign(entry, f, value);
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"url" => {
                    if let Some(entry) = current.take().filter(|entry| !entry.loc.is_empty()) {
                        entries.push(entry);
                    }
                }
                b"sitemap" => {
                    if let Some(entry) = current.take().filter(|entry| !entry.loc.is_empty()) {
                        children.push(entry.loc);
                    }
                }
                _ => field = None,
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(LlmsGenError::SitemapError(format!("XML parsing error: {}", e))),
            _ => {}
        }
        buf.clear();
    }

    if is_index {
        Ok(SitemapDocument::Index(children))
    } else {
        Ok(SitemapDocument::UrlSet(entries))
    }
}

fn fetch_failed(url: &str, reason: impl std::fmt::Display) -> LlmsGenError {
    LlmsGenError::SitemapError(format!("Failed to fetch sitemap {}: {}", url, reason))
}

/// [`SitemapSource`] that downloads sitemaps over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSitemapSource {
    client: Client,
}

impl HttpSitemapSource {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout, user_agent)?,
        })
    }

    pub fn from_options(options: &GeneratorOptions) -> Result<Self> {
        Self::new(options.request_timeout, &options.user_agent)
    }

    async fn fetch_xml(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await.map_err(|e| fetch_failed(url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(fetch_failed(url, status));
        }
        response.text().await.map_err(|e| fetch_failed(url, e))
    }

    fn resolve_at_depth<'a>(&'a self, url: &'a str, depth: usize) -> BoxFuture<'a, Result<Vec<SitemapEntry>>> {
        async move {
            let xml = self.fetch_xml(url).await?;
            match parse_sitemap(&xml)? {
                SitemapDocument::UrlSet(entries) => {
                    tracing::debug!("Sitemap {} lists {} URLs", url, entries.len());
                    Ok(entries)
                }
                SitemapDocument::Index(children) => {
                    tracing::debug!("Sitemap index {} lists {} sitemaps", url, children.len());
                    if depth >= MAX_INDEX_DEPTH {
                        tracing::warn!("[SKIP] Sitemap index {} nested too deeply", url);
                        return Ok(Vec::new());
                    }
                    let mut entries = Vec::new();
                    for child in &children {
                        match self.resolve_at_depth(child, depth + 1).await {
                            Ok(found) => entries.extend(found),
                            Err(e) => tracing::warn!("[SKIP] Child sitemap {}: {}", child, e),
                        }
                    }
                    Ok(entries)
                }
            }
        }
        .boxed()
    }
}

#[async_trait]
impl SitemapSource for HttpSitemapSource {
    async fn resolve(&self, sitemap_url: &str) -> Result<Vec<SitemapEntry>> {
        self.resolve_at_depth(sitemap_url, 0).await
    }
}
