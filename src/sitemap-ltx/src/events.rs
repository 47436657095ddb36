//! Progress events: the only externally observable stream of a generation run.

use serde::Serialize;

/// One notification emitted by a run.
///
/// A run emits any number of `Progress` events and ends with exactly one `Result` or `Error`
/// (or nothing further, when the run is cancelled).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProgressEvent {
    Progress {
        processed: usize,
        total: usize,
        message: String,
    },
    Result {
        content: String,
    },
    Error {
        message: String,
    },
}

impl ProgressEvent {
    pub fn progress(processed: usize, total: usize, message: impl Into<String>) -> Self {
        Self::Progress {
            processed,
            total,
            message: message.into(),
        }
    }

    /// True for the `Result` and `Error` events that close a run's stream.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress { .. })
    }

    /// Serializes the event as a single line of newline-delimited JSON (including the `\n`).
    pub fn to_ndjson(&self) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_ndjson() {
        let event = ProgressEvent::progress(3, 10, "Processing page 3/10");
        assert_eq!(
            event.to_ndjson().unwrap(),
            "{\"type\":\"progress\",\"processed\":3,\"total\":10,\"message\":\"Processing page 3/10\"}\n"
        );
        assert!(!event.is_terminal());
    }

    #[test]
    fn test_terminal_events() {
        let result = ProgressEvent::Result {
            content: "# Site\n\n> About".to_string(),
        };
        assert_eq!(
            result.to_ndjson().unwrap(),
            "{\"type\":\"result\",\"content\":\"# Site\\n\\n> About\"}\n"
        );
        assert!(result.is_terminal());

        let error = ProgressEvent::Error {
            message: "No URLs found in sitemap".to_string(),
        };
        assert_eq!(
            error.to_ndjson().unwrap(),
            "{\"type\":\"error\",\"message\":\"No URLs found in sitemap\"}\n"
        );
        assert!(error.is_terminal());
    }
}
