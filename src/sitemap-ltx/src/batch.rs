//! Chunked concurrent batch processing with progress reporting.

use crate::errors::{LlmsGenError, Result};
use futures::future::join_all;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Pause between two consecutive chunks.
pub const BATCH_DELAY: Duration = Duration::from_millis(100);

/// Processes items in consecutive chunks of `concurrency` items.
///
/// Items of a chunk run concurrently and complete in no particular order; a chunk only starts
/// once every item of the previous chunk has settled, and a fixed [`BATCH_DELAY`] separates two
/// chunks. After each item completes the processed counter is incremented and
/// `on_progress(processed, total, message)` is called, so progress counts are strictly
/// increasing and each item contributes exactly one increment.
///
/// # Arguments
///
/// * `items` - Vector of items to process
/// * `processor` - Async function that processes each item, taking the item and its index
/// * `concurrency` - Chunk size, i.e. the maximum number of concurrent operations
/// * `on_progress` - Called after every completed item
/// * `cancel` - Aborts the run: no new chunk is started and no further progress is reported
///
/// # Returns
///
/// The results of all items whose processor returned `Some`, chunk by chunk. Items that return
/// `None` are dropped but still counted as processed.
///
/// # Errors
///
/// Returns [`LlmsGenError::Cancelled`] if `cancel` fires before the last chunk settles.
///
/// # Examples
///
/// ```no_run
/// # use sitemap_ltx::batch::process_in_batches;
/// # use tokio_util::sync::CancellationToken;
/// # async fn example() {
/// let urls = vec!["url1", "url2", "url3"];
/// let results = process_in_batches(
///     urls,
///     |url, _index| async move { Some(format!("Processed: {}", url)) },
///     2,
///     |processed, total, message| println!("{}/{} {}", processed, total, message),
///     &CancellationToken::new(),
/// )
/// .await;
/// # }
/// ```
pub async fn process_in_batches<T, F, Fut, R, P>(
    items: Vec<T>,
    processor: F,
    concurrency: usize,
    on_progress: P,
    cancel: &CancellationToken,
) -> Result<Vec<R>>
where
    F: Fn(T, usize) -> Fut,
    Fut: Future<Output = Option<R>>,
    P: Fn(usize, usize, String),
{
    let total = items.len();
    let chunk_size = concurrency.max(1);
    let processed = AtomicUsize::new(0);
    let mut results = Vec::new();
    let mut pending = items.into_iter().enumerate().peekable();

    while pending.peek().is_some() {
        if cancel.is_cancelled() {
            return Err(LlmsGenError::Cancelled);
        }

        let chunk: Vec<(usize, T)> = pending.by_ref().take(chunk_size).collect();
        tracing::debug!(
            "Starting chunk of {} items ({} of {} already processed)",
            chunk.len(),
            processed.load(Ordering::SeqCst),
            total
        );

        let chunk_futures = chunk.into_iter().map(|(index, item)| {
            let work = processor(item, index);
            let processed = &processed;
            let on_progress = &on_progress;
            async move {
                let result = work.await;
                let done = processed.fetch_add(1, Ordering::SeqCst) + 1;
                if !cancel.is_cancelled() {
                    on_progress(done, total, format!("Processing page {}/{}", done, total));
                }
                result
            }
        });

        let chunk_results = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(LlmsGenError::Cancelled),
            chunk_results = join_all(chunk_futures) => chunk_results,
        };
        results.extend(chunk_results.into_iter().flatten());

        if pending.peek().is_some() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(LlmsGenError::Cancelled),
                _ = tokio::time::sleep(BATCH_DELAY) => {}
            }
        }
    }

    Ok(results)
}
