//! End-to-end tests of a generation run
//!
//! These tests drive `Generator::run` with in-process collaborators (and a wiremock server where
//! real HTTP behaviour matters) and check:
//! - The rendered document
//! - The sequence of progress/result/error events
//! - Pipeline-level failures and cancellation

use async_trait::async_trait;
use sitemap_ltx::{
    Generator, GeneratorOptions, HttpFetcher, HttpSitemapSource, InMemoryUsageTracker, LlmsGenError, PageFetcher,
    ProgressEvent, SitemapEntry, SitemapSource, UsageRecord, UsageTracker,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

struct FakeSitemap {
    urls: Vec<String>,
}

#[async_trait]
impl SitemapSource for FakeSitemap {
    async fn resolve(&self, _sitemap_url: &str) -> sitemap_ltx::Result<Vec<SitemapEntry>> {
        Ok(self.urls.iter().map(SitemapEntry::new).collect())
    }
}

/// Serves canned HTML and remembers which URLs were requested.
#[derive(Default)]
struct FakeFetcher {
    pages: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
    cancel_on: Option<(String, CancellationToken)>,
}

impl FakeFetcher {
    fn with_pages(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(url, html)| (url.to_string(), html.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Option<String> {
        self.requested.lock().unwrap().push(url.to_string());
        if let Some((trigger, cancel)) = &self.cancel_on
            && trigger == url
        {
            cancel.cancel();
        }
        self.pages.get(url).cloned()
    }
}

struct FailingTracker;

#[async_trait]
impl UsageTracker for FailingTracker {
    async fn track(&self, _record: UsageRecord) -> sitemap_ltx::Result<()> {
        Err(LlmsGenError::InvalidConfig("tracker offline".to_string()))
    }
}

fn html(title: &str, description: Option<&str>) -> String {
    let meta = description
        .map(|d| format!(r#"<meta name="description" content="{}">"#, d))
        .unwrap_or_default();
    format!("<html><head><title>{}</title>{}</head><body></body></html>", title, meta)
}

fn sitemap(urls: &[&str]) -> Arc<FakeSitemap> {
    Arc::new(FakeSitemap {
        urls: urls.iter().map(|u| u.to_string()).collect(),
    })
}

/// Runs the generator and returns its outcome together with every event it emitted.
async fn run_collecting(
    generator: &Generator,
    sitemap_url: &str,
    cancel: &CancellationToken,
) -> (sitemap_ltx::Result<String>, Vec<ProgressEvent>) {
    let events = Mutex::new(Vec::new());
    let result = generator
        .run(sitemap_url, |event| events.lock().unwrap().push(event), cancel)
        .await;
    (result, events.into_inner().unwrap())
}

fn terminal_events(events: &[ProgressEvent]) -> Vec<&ProgressEvent> {
    events.iter().filter(|e| e.is_terminal()).collect()
}

#[tokio::test(start_paused = true)]
async fn test_excluded_url_is_never_fetched() {
    let home = html("Welcome | Ex", Some("Example site"));
    let post = html("First Post | Ex", None);
    let fetcher = Arc::new(FakeFetcher::with_pages(&[
        ("https://ex.com/", home.as_str()),
        ("https://ex.com/blog/post1", post.as_str()),
        ("https://ex.com/admin/x", post.as_str()),
    ]));
    let options = GeneratorOptions::builder()
        .exclude_path("/admin".to_string())
        .build()
        .unwrap();
    let generator = Generator::new(
        sitemap(&["https://ex.com/", "https://ex.com/blog/post1", "https://ex.com/admin/x"]),
        fetcher.clone(),
        options,
    );

    let (result, events) = run_collecting(&generator, "https://ex.com/sitemap.xml", &CancellationToken::new()).await;
    let document = result.unwrap();

    assert_eq!(
        document,
        "# Ex\n\n> Example site\n\n## Main content\n\n- [Welcome](https://ex.com/): Example site\n\n\
         ## Blog and Articles\n\n- [First Post](https://ex.com/blog/post1)"
    );
    assert!(!fetcher.requested().contains(&"https://ex.com/admin/x".to_string()));

    assert_eq!(
        events,
        vec![
            ProgressEvent::progress(0, 0, "Fetching sitemap..."),
            ProgressEvent::progress(0, 3, "Found 3 URLs in sitemap"),
            ProgressEvent::progress(1, 2, "Processing page 1/2"),
            ProgressEvent::progress(2, 2, "Processing page 2/2"),
            ProgressEvent::progress(2, 2, "Generation completed!"),
            ProgressEvent::Result { content: document },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_progress_counts_every_surviving_url() {
    let page = html("Guide", None);
    let urls: Vec<String> = (0..10)
        .map(|i| format!("https://ex.com/guides/{}", i))
        .chain((0..2).map(|i| format!("https://ex.com/private/{}", i)))
        .collect();
    // Half of the guides have no page, they are still counted.
    let pages: Vec<(&str, &str)> = urls.iter().step_by(2).map(|u| (u.as_str(), page.as_str())).collect();
    let options = GeneratorOptions::builder()
        .concurrency(3)
        .exclude_path("/private".to_string())
        .build()
        .unwrap();
    let generator = Generator::new(
        Arc::new(FakeSitemap { urls: urls.clone() }),
        Arc::new(FakeFetcher::with_pages(&pages)),
        options,
    );

    let (result, events) = run_collecting(&generator, "https://ex.com/sitemap.xml", &CancellationToken::new()).await;
    let document = result.unwrap();
    assert_eq!(document.matches("- [Guide]").count(), 5);

    let processed: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::Progress { processed, message, .. } if message.starts_with("Processing page") => {
                Some(*processed)
            }
            _ => None,
        })
        .collect();
    assert_eq!(processed, (1..=10).collect::<Vec<_>>());
    assert_eq!(events[events.len() - 2], ProgressEvent::progress(10, 10, "Generation completed!"));
}

#[tokio::test]
async fn test_timed_out_page_is_counted_but_left_out() {
    let server = MockServer::start().await;
    let fast_url = format!("{}/guides/fast", server.uri());
    let slow_url = format!("{}/guides/slow", server.uri());

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>{}</loc></url>
  <url><loc>{}</loc></url>
</urlset>"#,
            fast_url, slow_url
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/guides/fast"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html("Fast guide", Some("Quick"))))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/guides/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html("Slow guide", None))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let options = GeneratorOptions::builder()
        .title("Mock Site".to_string())
        .request_timeout_ms(200)
        .build()
        .unwrap();
    let generator = Generator::with_http(options).unwrap();

    let (result, events) = run_collecting(
        &generator,
        &format!("{}/sitemap.xml", server.uri()),
        &CancellationToken::new(),
    )
    .await;
    let document = result.unwrap();

    assert!(document.starts_with("# Mock Site\n\n> A website with: Guides & Tutorials.\n\n"));
    assert!(document.contains(&format!("- [Fast guide]({}): Quick", fast_url)));
    assert!(!document.contains("Slow guide"));
    assert!(events.contains(&ProgressEvent::progress(2, 2, "Processing page 2/2")));
    assert!(events.contains(&ProgressEvent::progress(2, 2, "Generation completed!")));
}

#[tokio::test(start_paused = true)]
async fn test_priority_threshold_not_met() {
    let page = html("Page", None);
    let fetcher = Arc::new(FakeFetcher::with_pages(&[
        ("https://ex.com/blog/launch-day", page.as_str()),
        ("https://ex.com/services/consulting", page.as_str()),
    ]));
    let options = GeneratorOptions::builder().priority_threshold(0.9).build().unwrap();
    let tracker = Arc::new(InMemoryUsageTracker::new());
    let generator = Generator::new(
        sitemap(&["https://ex.com/blog/launch-day", "https://ex.com/services/consulting"]),
        fetcher,
        options,
    )
    .with_usage_tracker(tracker.clone());

    let (result, events) = run_collecting(&generator, "https://ex.com/sitemap.xml", &CancellationToken::new()).await;

    assert!(matches!(result, Err(LlmsGenError::NoPagesMetThreshold)));
    assert_eq!(
        terminal_events(&events),
        vec![&ProgressEvent::Error {
            message: "No pages met the minimum priority threshold".to_string()
        }]
    );
    assert_eq!(events.last().map(ProgressEvent::is_terminal), Some(true));
    assert_eq!(tracker.stats().total, 0);
}

#[tokio::test]
async fn test_empty_sitemap() {
    let generator = Generator::new(sitemap(&[]), Arc::new(FakeFetcher::default()), GeneratorOptions::default());

    let (result, events) = run_collecting(&generator, "https://ex.com/sitemap.xml", &CancellationToken::new()).await;

    assert!(matches!(result, Err(LlmsGenError::NoUrlsInSitemap)));
    assert_eq!(
        events,
        vec![
            ProgressEvent::progress(0, 0, "Fetching sitemap..."),
            ProgressEvent::Error {
                message: "No URLs found in sitemap".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn test_everything_filtered_out() {
    let options = GeneratorOptions::builder()
        .include_path("/docs".to_string())
        .build()
        .unwrap();
    let fetcher = Arc::new(FakeFetcher::default());
    let generator = Generator::new(
        sitemap(&["https://ex.com/blog/launch-day", "https://ex.com/about"]),
        fetcher.clone(),
        options,
    );

    let (result, events) = run_collecting(&generator, "https://ex.com/sitemap.xml", &CancellationToken::new()).await;

    assert!(matches!(result, Err(LlmsGenError::NoValidUrls)));
    assert_eq!(
        events.last(),
        Some(&ProgressEvent::Error {
            message: "No valid URLs to process after filtering".to_string()
        })
    );
    assert_eq!(terminal_events(&events).len(), 1);
    assert!(fetcher.requested().is_empty());
}

#[tokio::test]
async fn test_unreachable_sitemap() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let options = GeneratorOptions::default();
    let generator = Generator::new(
        Arc::new(HttpSitemapSource::from_options(&options).unwrap()),
        Arc::new(HttpFetcher::from_options(&options).unwrap()),
        options,
    );

    let (result, events) = run_collecting(
        &generator,
        &format!("{}/sitemap.xml", server.uri()),
        &CancellationToken::new(),
    )
    .await;

    assert!(matches!(result, Err(LlmsGenError::SitemapError(_))));
    assert_eq!(terminal_events(&events).len(), 1);
    assert!(matches!(events.last(), Some(ProgressEvent::Error { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_is_silent() {
    let cancel = CancellationToken::new();
    let page = html("Page", None);
    let urls = ["https://ex.com/a", "https://ex.com/b", "https://ex.com/c"];
    let fetcher = Arc::new(FakeFetcher {
        cancel_on: Some((urls[0].to_string(), cancel.clone())),
        ..FakeFetcher::with_pages(&urls.map(|u| (u, page.as_str())))
    });
    let options = GeneratorOptions::builder().concurrency(1).build().unwrap();
    let tracker = Arc::new(InMemoryUsageTracker::new());
    let generator = Generator::new(sitemap(&urls), fetcher.clone(), options).with_usage_tracker(tracker.clone());

    let (result, events) = run_collecting(&generator, "https://ex.com/sitemap.xml", &cancel).await;

    assert!(matches!(result, Err(LlmsGenError::Cancelled)));
    assert!(terminal_events(&events).is_empty());
    assert_eq!(
        events,
        vec![
            ProgressEvent::progress(0, 0, "Fetching sitemap..."),
            ProgressEvent::progress(0, 3, "Found 3 URLs in sitemap"),
        ]
    );
    assert_eq!(fetcher.requested(), vec![urls[0].to_string()]);
    assert_eq!(tracker.stats().total, 0);
}

#[tokio::test(start_paused = true)]
async fn test_usage_recorded_after_success() {
    let page = html("Welcome", None);
    let tracker = Arc::new(InMemoryUsageTracker::new());
    let generator = Generator::new(
        sitemap(&["https://ex.com/"]),
        Arc::new(FakeFetcher::with_pages(&[("https://ex.com/", page.as_str())])),
        GeneratorOptions::default(),
    )
    .with_usage_tracker(tracker.clone());

    let (result, _events) = run_collecting(&generator, "https://ex.com/sitemap.xml", &CancellationToken::new()).await;
    assert!(result.is_ok());

    let stats = tracker.stats();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.recent[0].sitemap_url, "https://ex.com/sitemap.xml");
}

#[tokio::test(start_paused = true)]
async fn test_failing_usage_tracker_does_not_fail_run() {
    let page = html("Welcome", Some("Hello"));
    let generator = Generator::new(
        sitemap(&["https://ex.com/"]),
        Arc::new(FakeFetcher::with_pages(&[("https://ex.com/", page.as_str())])),
        GeneratorOptions::default(),
    )
    .with_usage_tracker(Arc::new(FailingTracker));

    let (result, events) = run_collecting(&generator, "https://ex.com/sitemap.xml", &CancellationToken::new()).await;

    assert_eq!(
        result.unwrap(),
        "# Ex\n\n> Hello\n\n## Main content\n\n- [Welcome](https://ex.com/): Hello"
    );
    assert!(matches!(events.last(), Some(ProgressEvent::Result { .. })));
}
