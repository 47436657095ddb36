//! # sitemap-ltx
//!
//! Generates an llms.txt digest of a website from its sitemap.
//!
//! The sitemap's URLs are filtered, fetched concurrently in small batches, reduced to a title and
//! description, filed into sections (home, about, guides, blog, ...) and scored. Pages that pass
//! the priority threshold are rendered as a markdown document grouped by section.
//!
//! ## Features
//!
//! - Fetch and parse XML sitemaps, including sitemap indexes
//! - Filter URLs with include/exclude substrings
//! - Extract page titles and descriptions with fallbacks
//! - Apply regex-based title rewrites
//! - Keyword-based section categorization and priority scoring
//! - Progress, result and error events, serializable as newline-delimited JSON
//! - Cancellable runs
//!
//! ## Examples
//!
//! ### Basic Usage
//!
//! ```no_run
//! use sitemap_ltx::{generate, GeneratorOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = GeneratorOptions::builder()
//!         .concurrency(10)
//!         .exclude_path("/admin".to_string())
//!         .build()?;
//!
//!     let output = generate("https://example.com/sitemap.xml", options).await?;
//!     println!("{}", output);
//!     Ok(())
//! }
//! ```
//!
//! ### Following Progress
//!
//! ```no_run
//! use sitemap_ltx::{Generator, GeneratorOptions, ProgressEvent};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let generator = Generator::with_http(GeneratorOptions::default())?;
//!     let cancel = CancellationToken::new();
//!
//!     generator
//!         .run(
//!             "https://example.com/sitemap.xml",
//!             |event| {
//!                 if let ProgressEvent::Progress { processed, total, message } = event {
//!                     eprintln!("[{}/{}] {}", processed, total, message);
//!                 }
//!             },
//!             &cancel,
//!         )
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod assemble;
pub mod batch;
pub mod common;
mod config;
mod errors;
mod events;
mod fetch;
mod generator;
mod html;
mod page;
mod section;
pub mod sitemap;
pub mod text_utils;
mod url_utils;
pub mod usage;

// Public API re-exports
pub use config::{
    DEFAULT_CONCURRENCY, DEFAULT_PRIORITY_THRESHOLD, DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_USER_AGENT,
    GeneratorOptions, GeneratorOptionsBuilder,
};
pub use errors::{LlmsGenError, Result};
pub use events::ProgressEvent;
pub use generator::{Generator, generate, process_url};
pub use page::ProcessedPage;
pub use section::{DISPLAY_ORDER, SECTION_RULES, Section};

// Additional exports for advanced usage
pub use fetch::{HttpFetcher, PageFetcher, build_client};
pub use html::{PageData, extract_page_data, get_description, get_title};
pub use sitemap::{HttpSitemapSource, SitemapEntry, SitemapSource};
pub use url_utils::{categorize_url, should_process_url, site_name_from_url};
pub use usage::{InMemoryUsageTracker, LogUsageTracker, UsageRecord, UsageTracker};
