//! Error types for the sitemap-to-llms.txt pipeline.

use thiserror::Error;

/// Main error type for llms.txt generation operations.
///
/// Only pipeline-level conditions are represented here. Failures that concern a single page
/// (timeouts, non-2xx statuses, missing titles) are absorbed by the per-URL worker and never
/// surface as an error.
#[derive(Debug, Error)]
pub enum LlmsGenError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The URL handed to the pipeline is not a usable sitemap location.
    #[error("Invalid sitemap URL provided")]
    InvalidSitemapUrl(String),

    /// Sitemap could not be fetched or parsed
    #[error("Sitemap parsing failed: {0}")]
    SitemapError(String),

    /// Invalid substitution command format
    #[error("Invalid substitution command: {0}")]
    InvalidSubstitution(String),

    /// A configuration value is out of range or unparsable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Regex error
    #[error("Regex error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("No URLs found in sitemap")]
    NoUrlsInSitemap,

    #[error("No valid URLs to process after filtering")]
    NoValidUrls,

    #[error("No pages met the minimum priority threshold")]
    NoPagesMetThreshold,

    /// The caller aborted the run. Not a failure: no error event is emitted for it.
    #[error("Generation cancelled")]
    Cancelled,
}

impl LlmsGenError {
    /// True for the caller-initiated abort, which terminates a run silently.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Type alias for Result with LlmsGenError
pub type Result<T> = std::result::Result<T, LlmsGenError>;
