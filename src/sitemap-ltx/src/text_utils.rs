//! Text manipulation utilities.

use crate::errors::{LlmsGenError, Result};
use regex::Regex;
use std::str::FromStr;

/// Upper-cases the first character of a string, leaving the rest untouched.
///
/// # Examples
///
/// ```
/// # use sitemap_ltx::text_utils::capitalize_first;
/// assert_eq!(capitalize_first("acme"), "Acme");
/// assert_eq!(capitalize_first("eXample"), "EXample");
/// assert_eq!(capitalize_first(""), "");
/// ```
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Removes a leading `|` and a trailing ` | Site Name` segment from a page title.
///
/// Only the last pipe-delimited segment is dropped, so titles with several separators keep
/// everything up to the final one.
///
/// # Examples
///
/// ```
/// # use sitemap_ltx::text_utils::clean_title;
/// assert_eq!(clean_title("| Welcome"), "Welcome");
/// assert_eq!(clean_title("Welcome | Site"), "Welcome");
/// assert_eq!(clean_title("Acme | Home | Acme Corp"), "Acme | Home");
/// ```
pub fn clean_title(title: &str) -> String {
    let title = title.trim();
    let title = match title.strip_prefix('|') {
        Some(rest) => rest.trim_start(),
        None => title,
    };
    let title = match title.rfind('|') {
        Some(index) => title[..index].trim_end(),
        None => title,
    };
    title.trim().to_string()
}

/// Cuts a string down to at most `max_chars` characters, appending `...` when anything was cut.
///
/// # Examples
///
/// ```
/// # use sitemap_ltx::text_utils::truncate_with_ellipsis;
/// assert_eq!(truncate_with_ellipsis("abcdef", 3), "abc...");
/// assert_eq!(truncate_with_ellipsis("abc", 3), "abc");
/// ```
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}...", &s[..byte_index]),
        None => s.to_string(),
    }
}

/// A single title rewrite rule: a regex pattern, its replacement and sed-style flags.
///
/// Rules are compiled when they are created, so an invalid pattern is reported while the
/// configuration is being built instead of halfway through a run.
///
/// Supported flags:
/// - `i`: case insensitive
/// - `m`: multi-line mode
/// - `s`: dot matches newline
/// - `u`: Unicode support
/// - `g`: replace every match instead of only the first
/// - `y`: accepted for compatibility, ignored
#[derive(Debug, Clone)]
pub struct TitleRewrite {
    pattern: String,
    replacement: String,
    flags: String,
    regex: Regex,
}

impl TitleRewrite {
    /// Builds a rule from its parts, validating the flags and compiling the pattern.
    pub fn new(pattern: &str, replacement: &str, flags: &str) -> Result<Self> {
        if let Some(bad) = flags.chars().find(|c| !"gimsuy".contains(*c)) {
            return Err(LlmsGenError::InvalidSubstitution(format!("Unsupported flag '{}'", bad)));
        }

        let inline_flags: String = flags.chars().filter(|&c| c != 'g' && c != 'y').collect();

        let regex_pattern = if inline_flags.is_empty() {
            pattern.to_string()
        } else {
            format!("(?{}){}", inline_flags, pattern)
        };

        let regex = Regex::new(&regex_pattern)
            .map_err(|e| LlmsGenError::InvalidSubstitution(format!("Invalid regex pattern: {}", e)))?;

        Ok(Self {
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
            flags: flags.to_string(),
            regex,
        })
    }

    /// Parses a sed-style substitution command: `s/pattern/replacement/flags`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use sitemap_ltx::text_utils::TitleRewrite;
    /// let rule = TitleRewrite::parse("s/foo/bar/g").unwrap();
    /// assert_eq!(rule.apply("foo foo"), "bar bar");
    /// ```
    pub fn parse(command: &str) -> Result<Self> {
        let re = Regex::new(r"^s/(.*?)/(.*?)/([a-z]*)$")?;

        let captures = re
            .captures(command)
            .ok_or_else(|| LlmsGenError::InvalidSubstitution(format!("Invalid substitution command format: {}", command)))?;

        let pattern = captures.get(1).map(|m| m.as_str()).unwrap_or("");
        let replacement = captures.get(2).map(|m| m.as_str()).unwrap_or("");
        let flags = captures.get(3).map(|m| m.as_str()).unwrap_or("");

        Self::new(pattern, replacement, flags)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    pub fn flags(&self) -> &str {
        &self.flags
    }

    fn is_global(&self) -> bool {
        self.flags.contains('g')
    }

    /// Applies the rule to a title.
    pub fn apply(&self, title: &str) -> String {
        if self.is_global() {
            self.regex.replace_all(title, self.replacement.as_str()).into_owned()
        } else {
            self.regex.replace(title, self.replacement.as_str()).into_owned()
        }
    }
}

impl FromStr for TitleRewrite {
    type Err = LlmsGenError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Applies every rule in order, returning `None` if nothing is left of the title.
pub fn rewrite_title(title: &str, rules: &[TitleRewrite]) -> Option<String> {
    let rewritten = rules.iter().fold(title.to_string(), |acc, rule| rule.apply(&acc));
    let rewritten = rewritten.trim();
    if rewritten.is_empty() {
        None
    } else {
        Some(rewritten.to_string())
    }
}
