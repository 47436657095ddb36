//! Best-effort recording of completed generation runs.

use crate::errors::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Number of records kept by [`InMemoryUsageTracker`].
pub const RECENT_CAPACITY: usize = 100;
/// Number of records reported by [`InMemoryUsageTracker::stats`].
pub const STATS_RECENT: usize = 10;

/// One successful run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageRecord {
    pub sitemap_url: String,
    pub timestamp: DateTime<Utc>,
    pub user_agent: Option<String>,
}

impl UsageRecord {
    pub fn now(sitemap_url: impl Into<String>, user_agent: Option<String>) -> Self {
        Self {
            sitemap_url: sitemap_url.into(),
            timestamp: Utc::now(),
            user_agent,
        }
    }
}

/// Called after a run succeeds. Errors are logged by the caller and never fail the run.
#[async_trait]
pub trait UsageTracker: Send + Sync {
    async fn track(&self, record: UsageRecord) -> Result<()>;
}

/// Writes each record as a tracing event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogUsageTracker;

#[async_trait]
impl UsageTracker for LogUsageTracker {
    async fn track(&self, record: UsageRecord) -> Result<()> {
        tracing::info!(
            sitemap_url = %record.sitemap_url,
            timestamp = %record.timestamp.to_rfc3339(),
            user_agent = record.user_agent.as_deref().unwrap_or("unknown"),
            "Generation recorded"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageStats {
    pub total: u64,
    /// Most recent first.
    pub recent: Vec<UsageRecord>,
}

#[derive(Debug, Default)]
struct UsageLog {
    total: u64,
    recent: VecDeque<UsageRecord>,
}

/// Keeps a running total and the most recent [`RECENT_CAPACITY`] records in memory.
#[derive(Debug, Default)]
pub struct InMemoryUsageTracker {
    log: Mutex<UsageLog>,
}

impl InMemoryUsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of recorded runs and the last [`STATS_RECENT`] records.
    pub fn stats(&self) -> UsageStats {
        let log = match self.log.lock() {
            Ok(log) => log,
            Err(poisoned) => poisoned.into_inner(),
        };
        UsageStats {
            total: log.total,
            recent: log.recent.iter().take(STATS_RECENT).cloned().collect(),
        }
    }
}

#[async_trait]
impl UsageTracker for InMemoryUsageTracker {
    async fn track(&self, record: UsageRecord) -> Result<()> {
        let mut log = match self.log.lock() {
            Ok(log) => log,
            Err(poisoned) => poisoned.into_inner(),
        };
        log.total += 1;
        log.recent.push_front(record);
        log.recent.truncate(RECENT_CAPACITY);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_stats() {
        let tracker = InMemoryUsageTracker::new();
        for i in 0..150 {
            tracker
                .track(UsageRecord::now(format!("https://ex{}.com/sitemap.xml", i), None))
                .await
                .unwrap();
        }

        let stats = tracker.stats();
        assert_eq!(stats.total, 150);
        assert_eq!(stats.recent.len(), STATS_RECENT);
        assert_eq!(stats.recent[0].sitemap_url, "https://ex149.com/sitemap.xml");
        assert_eq!(stats.recent[9].sitemap_url, "https://ex140.com/sitemap.xml");
        assert_eq!(tracker.log.lock().unwrap().recent.len(), RECENT_CAPACITY);
    }

    #[tokio::test]
    async fn test_empty_stats() {
        let stats = InMemoryUsageTracker::new().stats();
        assert_eq!(stats.total, 0);
        assert!(stats.recent.is_empty());
    }

    #[tokio::test]
    async fn test_log_tracker_never_fails() {
        let record = UsageRecord::now("https://ex.com/sitemap.xml", Some("cli".to_string()));
        assert!(LogUsageTracker.track(record).await.is_ok());
    }
}
