//! End-to-end generation: sitemap in, llms.txt out.

use crate::assemble::assemble;
use crate::batch::process_in_batches;
use crate::config::GeneratorOptions;
use crate::errors::{LlmsGenError, Result};
use crate::events::ProgressEvent;
use crate::fetch::{HttpFetcher, PageFetcher};
use crate::html::extract_page_data;
use crate::page::ProcessedPage;
use crate::sitemap::{HttpSitemapSource, SitemapEntry, SitemapSource};
use crate::text_utils::{TitleRewrite, rewrite_title};
use crate::url_utils::{categorize_url, should_process_url};
use crate::usage::{UsageRecord, UsageTracker};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Runs the sitemap-to-llms.txt pipeline with injected collaborators.
///
/// A `Generator` holds no per-run state and can be reused for any number of runs.
#[derive(Clone)]
pub struct Generator {
    sitemap_source: Arc<dyn SitemapSource>,
    fetcher: Arc<dyn PageFetcher>,
    usage_tracker: Option<Arc<dyn UsageTracker>>,
    options: GeneratorOptions,
}

impl Generator {
    pub fn new(
        sitemap_source: Arc<dyn SitemapSource>,
        fetcher: Arc<dyn PageFetcher>,
        options: GeneratorOptions,
    ) -> Self {
        Self {
            sitemap_source,
            fetcher,
            usage_tracker: None,
            options,
        }
    }

    /// A generator that resolves sitemaps and fetches pages over HTTP.
    pub fn with_http(options: GeneratorOptions) -> Result<Self> {
        let sitemap_source = Arc::new(HttpSitemapSource::from_options(&options)?);
        let fetcher = Arc::new(HttpFetcher::from_options(&options)?);
        Ok(Self::new(sitemap_source, fetcher, options))
    }

    /// Records every successful run with `tracker`.
    pub fn with_usage_tracker(mut self, tracker: Arc<dyn UsageTracker>) -> Self {
        self.usage_tracker = Some(tracker);
        self
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Generates the llms.txt document for `sitemap_url`.
    ///
    /// Every event of the run is handed to `on_event`: progress updates, then exactly one
    /// `Result` carrying the document or one `Error` carrying the failure message. A cancelled run
    /// stops emitting events and returns [`LlmsGenError::Cancelled`].
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `sitemap_url` is not an http(s) URL
    /// - The sitemap cannot be resolved or lists no URLs
    /// - No URL survives the include/exclude filters
    /// - No page reaches the priority threshold
    /// - `cancel` fires before the run completes
    pub async fn run<E>(&self, sitemap_url: &str, on_event: E, cancel: &CancellationToken) -> Result<String>
    where
        E: Fn(ProgressEvent) + Send + Sync,
    {
        match self.run_pipeline(sitemap_url, &on_event, cancel).await {
            Ok(content) => {
                on_event(ProgressEvent::Result {
                    content: content.clone(),
                });
                self.record_usage(sitemap_url).await;
                Ok(content)
            }
            Err(e) if e.is_cancelled() => {
                tracing::info!("Generation for {} cancelled", sitemap_url);
                Err(e)
            }
            Err(e) => {
                tracing::error!("Generation for {} failed: {}", sitemap_url, e);
                on_event(ProgressEvent::Error { message: e.to_string() });
                Err(e)
            }
        }
    }

    async fn run_pipeline<E>(&self, sitemap_url: &str, on_event: &E, cancel: &CancellationToken) -> Result<String>
    where
        E: Fn(ProgressEvent) + Send + Sync,
    {
        validate_sitemap_url(sitemap_url)?;

        on_event(ProgressEvent::progress(0, 0, "Fetching sitemap..."));
        let entries = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(LlmsGenError::Cancelled),
            entries = self.sitemap_source.resolve(sitemap_url) => entries?,
        };
        if entries.is_empty() {
            return Err(LlmsGenError::NoUrlsInSitemap);
        }

        tracing::info!("Found {} URLs in sitemap {}", entries.len(), sitemap_url);
        on_event(ProgressEvent::progress(
            0,
            entries.len(),
            format!("Found {} URLs in sitemap", entries.len()),
        ));

        let valid_entries: Vec<SitemapEntry> = entries
            .into_iter()
            .filter(|entry| should_process_url(&entry.loc, &self.options.include_paths, &self.options.exclude_paths))
            .collect();
        if valid_entries.is_empty() {
            return Err(LlmsGenError::NoValidUrls);
        }
        let total = valid_entries.len();

        let fetcher = self.fetcher.as_ref();
        let rewrites = self.options.replace_title.as_slice();
        let pages = process_in_batches(
            valid_entries,
            |entry, _index| process_url(fetcher, entry, rewrites),
            self.options.concurrency,
            |processed, total, message| on_event(ProgressEvent::progress(processed, total, message)),
            cancel,
        )
        .await?;
        tracing::info!("Extracted {} of {} pages", pages.len(), total);

        let document = assemble(pages, &self.options)?;

        if cancel.is_cancelled() {
            return Err(LlmsGenError::Cancelled);
        }
        on_event(ProgressEvent::progress(total, total, "Generation completed!"));
        Ok(document)
    }

    async fn record_usage(&self, sitemap_url: &str) {
        let Some(tracker) = &self.usage_tracker else {
            return;
        };
        let record = UsageRecord::now(sitemap_url, Some(self.options.user_agent.clone()));
        if let Err(e) = tracker.track(record).await {
            tracing::error!("Failed to record usage for {}: {}", sitemap_url, e);
        }
    }
}

fn validate_sitemap_url(sitemap_url: &str) -> Result<()> {
    match Url::parse(sitemap_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(LlmsGenError::InvalidSitemapUrl(sitemap_url.to_string())),
    }
}

/// Fetches, extracts and categorizes one sitemap entry.
///
/// Returns `None` when the page cannot be fetched or has no usable title.
pub async fn process_url(
    fetcher: &dyn PageFetcher,
    entry: SitemapEntry,
    rewrites: &[TitleRewrite],
) -> Option<ProcessedPage> {
    let Some(html) = fetcher.fetch(&entry.loc).await else {
        tracing::debug!("[SKIP] {}: no content", entry.loc);
        return None;
    };

    let data = extract_page_data(&html);
    let Some(title) = data.title.and_then(|title| rewrite_title(&title, rewrites)) else {
        tracing::debug!("[SKIP] {}: no title", entry.loc);
        return None;
    };

    let section = categorize_url(&entry.loc);
    tracing::debug!("{} -> {}", entry.loc, section);

    Some(ProcessedPage {
        title,
        url: entry.loc,
        description: data.description,
        section,
        priority: section.priority(),
        lastmod: entry.lastmod,
        sitemap_priority: entry.priority,
    })
}

/// Generates llms.txt documentation from a sitemap URL over HTTP.
///
/// This function:
/// 1. Fetches the sitemap, flattening sitemap indexes
/// 2. Filters URLs based on include/exclude patterns
/// 3. Processes each URL to extract title and description
/// 4. Files pages into sections and drops those below the priority threshold
/// 5. Generates the markdown document
///
/// # Examples
///
/// ```no_run
/// # use sitemap_ltx::{generate, GeneratorOptions};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let options = GeneratorOptions::builder()
///     .concurrency(4)
///     .exclude_path("/admin".to_string())
///     .build()?;
///
/// let output = generate("https://example.com/sitemap.xml", options).await?;
/// println!("{}", output);
/// # Ok(())
/// # }
/// ```
pub async fn generate(sitemap_url: &str, options: GeneratorOptions) -> Result<String> {
    Generator::with_http(options)?
        .run(sitemap_url, |_| {}, &CancellationToken::new())
        .await
}
