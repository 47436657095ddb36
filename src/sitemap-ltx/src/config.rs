//! Configuration options for llms.txt generation.

use crate::common::env::optional_env_var;
use crate::errors::{LlmsGenError, Result};
use crate::text_utils::TitleRewrite;
use std::time::Duration;

pub const DEFAULT_CONCURRENCY: usize = 8;
pub const DEFAULT_PRIORITY_THRESHOLD: f64 = 0.3;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; LLMS-txt-Generator/1.0)";

/// Configuration options for the generator. Immutable for the lifetime of a run.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Maximum number of pages fetched at the same time (default: 8)
    pub concurrency: usize,
    /// Pages whose section priority is below this value are left out (default: 0.3)
    pub priority_threshold: f64,
    /// Optional title to use for the generated document
    pub title: Option<String>,
    /// Optional description to use for the generated document
    pub description: Option<String>,
    /// Substrings a URL must contain one of (if any are given) to be processed
    pub include_paths: Vec<String>,
    /// Substrings that exclude a URL from processing. Checked before `include_paths`.
    pub exclude_paths: Vec<String>,
    /// Per-request timeout for page and sitemap fetches (default: 10s)
    pub request_timeout: Duration,
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// Rewrite rules applied, in order, to every extracted page title
    pub replace_title: Vec<TitleRewrite>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            priority_threshold: DEFAULT_PRIORITY_THRESHOLD,
            title: None,
            description: None,
            include_paths: Vec::new(),
            exclude_paths: Vec::new(),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            replace_title: Vec::new(),
        }
    }
}

impl GeneratorOptions {
    /// Creates a new builder for GeneratorOptions.
    pub fn builder() -> GeneratorOptionsBuilder {
        GeneratorOptionsBuilder::default()
    }
}

/// Builder for GeneratorOptions. Caller overrides are merged over the defaults in `build()`.
#[derive(Debug, Clone, Default)]
pub struct GeneratorOptionsBuilder {
    concurrency: Option<usize>,
    priority_threshold: Option<f64>,
    title: Option<String>,
    description: Option<String>,
    include_paths: Vec<String>,
    exclude_paths: Vec<String>,
    request_timeout_ms: Option<u64>,
    user_agent: Option<String>,
    replace_title: Vec<String>,
}

impl GeneratorOptionsBuilder {
    /// Starts a builder whose defaults come from the environment:
    /// `LTX_CONCURRENCY`, `LTX_PRIORITY_THRESHOLD`, `LTX_REQUEST_TIMEOUT_MS` and `LTX_USER_AGENT`.
    /// Unset variables keep the built-in defaults.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            concurrency: optional_env_var("LTX_CONCURRENCY")?,
            priority_threshold: optional_env_var("LTX_PRIORITY_THRESHOLD")?,
            request_timeout_ms: optional_env_var("LTX_REQUEST_TIMEOUT_MS")?,
            user_agent: optional_env_var("LTX_USER_AGENT")?,
            ..Self::default()
        })
    }

    /// Sets the concurrency level (number of simultaneous requests).
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    /// Sets the minimum priority a page needs to be listed.
    pub fn priority_threshold(mut self, threshold: f64) -> Self {
        self.priority_threshold = Some(threshold);
        self
    }

    /// Sets the document title.
    pub fn title(mut self, title: String) -> Self {
        self.title = Some(title);
        self
    }

    /// Sets the document description.
    pub fn description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    /// Adds a path pattern to include.
    pub fn include_path(mut self, pattern: String) -> Self {
        self.include_paths.push(pattern);
        self
    }

    /// Adds multiple path patterns to include.
    pub fn include_paths(mut self, patterns: Vec<String>) -> Self {
        self.include_paths.extend(patterns);
        self
    }

    /// Adds a path pattern to exclude.
    pub fn exclude_path(mut self, pattern: String) -> Self {
        self.exclude_paths.push(pattern);
        self
    }

    /// Adds multiple path patterns to exclude.
    pub fn exclude_paths(mut self, patterns: Vec<String>) -> Self {
        self.exclude_paths.extend(patterns);
        self
    }

    /// Sets the per-request timeout in milliseconds.
    pub fn request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = Some(timeout_ms);
        self
    }

    /// Sets the User-Agent header.
    pub fn user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = Some(user_agent);
        self
    }

    /// Adds a title replacement command (sed-style: s/pattern/replacement/flags).
    pub fn replace_title(mut self, command: String) -> Self {
        self.replace_title.push(command);
        self
    }

    /// Adds multiple title replacement commands.
    pub fn replace_titles(mut self, commands: Vec<String>) -> Self {
        self.replace_title.extend(commands);
        self
    }

    /// Builds the GeneratorOptions.
    ///
    /// # Errors
    ///
    /// Returns an error if the concurrency or timeout is zero, the threshold lies outside
    /// `[0, 1]`, or a title replacement command does not compile.
    pub fn build(self) -> Result<GeneratorOptions> {
        let defaults = GeneratorOptions::default();

        let concurrency = self.concurrency.unwrap_or(defaults.concurrency);
        if concurrency == 0 {
            return Err(LlmsGenError::InvalidConfig("concurrency must be at least 1".to_string()));
        }

        let priority_threshold = self.priority_threshold.unwrap_or(defaults.priority_threshold);
        if !(0.0..=1.0).contains(&priority_threshold) {
            return Err(LlmsGenError::InvalidConfig(format!(
                "priority threshold must be between 0 and 1, got {}",
                priority_threshold
            )));
        }

        let request_timeout = match self.request_timeout_ms {
            Some(0) => {
                return Err(LlmsGenError::InvalidConfig(
                    "request timeout must be a positive number of milliseconds".to_string(),
                ));
            }
            Some(ms) => Duration::from_millis(ms),
            None => defaults.request_timeout,
        };

        let replace_title = self
            .replace_title
            .iter()
            .map(|command| TitleRewrite::parse(command))
            .collect::<Result<Vec<_>>>()?;

        Ok(GeneratorOptions {
            concurrency,
            priority_threshold,
            title: self.title.filter(|t| !t.trim().is_empty()),
            description: self.description.filter(|d| !d.trim().is_empty()),
            include_paths: self.include_paths,
            exclude_paths: self.exclude_paths,
            request_timeout,
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
            replace_title,
        })
    }
}
