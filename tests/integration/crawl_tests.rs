//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use gleaner::config::Config;
use gleaner::crawler::{Coordinator, ProgressUpdate, Silent};
use gleaner::{crawl, export, ContentFlags, CrawlPhase, ExportFormat, ResultSet};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with short retry delays
fn create_test_config(max_depth: u32, concurrency: u32) -> Config {
    let mut config = Config::default();
    config.crawler.max_depth = max_depth;
    config.crawler.concurrency_limit = concurrency;
    config.crawler.fetch_timeout_ms = 2_000;
    config.crawler.backoff_base_ms = 10;
    config.crawler.progress_interval_ms = 0;
    config.user_agent.crawler_name = "TestBot".to_string();
    config
}

fn html(title: &str, links: &[&str]) -> ResponseTemplate {
    let anchors: String = links
        .iter()
        .map(|l| format!(r#"<a href="{}">{}</a>"#, l, l))
        .collect();
    ResponseTemplate::new(200).set_body_raw(
        format!(
            "<html><head><title>{}</title></head><body><p>Content of {}</p>{}</body></html>",
            title, title, anchors
        ),
        "text/html",
    )
}

async fn mount_page(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

fn sorted_urls(results: &ResultSet) -> Vec<String> {
    let mut urls: Vec<String> = results.iter().map(|r| r.url.clone()).collect();
    urls.sort();
    urls
}

#[tokio::test]
async fn test_depth_bounded_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", html("Home", &["/b", "/c"])).await;
    mount_page(&server, "/b", html("B", &["/d"])).await;
    mount_page(&server, "/c", html("C", &[])).await;

    // Depth 2 is never fetched
    Mock::given(method("GET"))
        .and(path("/d"))
        .respond_with(html("D", &[]))
        .expect(0)
        .mount(&server)
        .await;

    let mut coordinator =
        Coordinator::with_http(create_test_config(1, 5)).expect("Failed to create coordinator");

    let mut updates = Vec::new();
    let mut observer = |update: ProgressUpdate| updates.push(update);
    let outcome = coordinator
        .run(&format!("{}/", base), CancellationToken::new(), &mut observer)
        .await
        .expect("Crawl failed");

    assert_eq!(
        sorted_urls(&outcome.results),
        vec![
            format!("{}/", base),
            format!("{}/b", base),
            format!("{}/c", base)
        ]
    );
    assert_eq!(outcome.report.pages_recorded, 3);
    assert_eq!(outcome.report.urls_discovered, 3);
    assert_eq!(coordinator.state().phase(), CrawlPhase::Finalized);

    let last = updates.last().expect("No progress updates");
    assert_eq!(last.percent, 100);
    assert_eq!(updates.iter().filter(|u| u.is_final()).count(), 1);

    let home = outcome
        .results
        .iter()
        .find(|r| r.url == format!("{}/", base))
        .unwrap();
    assert_eq!(home.title.as_deref(), Some("Home"));
    assert_eq!(home.text.as_deref(), Some("Content of Home /b /c"));
    assert_eq!(
        home.links,
        Some(vec![format!("{}/b", base), format!("{}/c", base)])
    );
}

#[tokio::test]
async fn test_links_are_fetched_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    // A and B link to each other and to themselves
    mount_page(&server, "/", html("A", &["/b", "/", "/b?utm_source=x"])).await;
    mount_page(&server, "/b", html("B", &["/", "/b", "/#top"])).await;

    let mut coordinator =
        Coordinator::with_http(create_test_config(5, 3)).expect("Failed to create coordinator");
    let outcome = coordinator
        .run(&format!("{}/", base), CancellationToken::new(), &mut Silent)
        .await
        .expect("Crawl failed");

    assert_eq!(outcome.results.len(), 2);
    assert_eq!(outcome.report.urls_discovered, 2);
}

#[tokio::test]
async fn test_malformed_page_is_skipped() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", html("Home", &["/broken", "/binary", "/ok"])).await;
    mount_page(
        &server,
        "/broken",
        ResponseTemplate::new(200).set_body_raw("", "text/html"),
    )
    .await;
    mount_page(
        &server,
        "/binary",
        ResponseTemplate::new(200).set_body_raw(vec![0u8, 1, 2, 3], "application/octet-stream"),
    )
    .await;
    mount_page(&server, "/ok", html("Ok", &[])).await;

    let mut coordinator =
        Coordinator::with_http(create_test_config(2, 2)).expect("Failed to create coordinator");
    let outcome = coordinator
        .run(&format!("{}/", base), CancellationToken::new(), &mut Silent)
        .await
        .expect("Crawl failed");

    assert_eq!(
        sorted_urls(&outcome.results),
        vec![format!("{}/", base), format!("{}/ok", base)]
    );
    assert_eq!(outcome.report.pages_skipped, 2);
    assert_eq!(outcome.report.retries, 0);
}

#[tokio::test]
async fn test_missing_page_is_not_retried() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", html("Home", &["/gone"])).await;
    mount_page(&server, "/gone", ResponseTemplate::new(404)).await;

    let mut coordinator =
        Coordinator::with_http(create_test_config(1, 2)).expect("Failed to create coordinator");
    let outcome = coordinator
        .run(&format!("{}/", base), CancellationToken::new(), &mut Silent)
        .await
        .expect("Crawl failed");

    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.report.pages_skipped, 1);
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", html("Home", &["/flaky"])).await;

    // First two attempts fail, the third succeeds
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    mount_page(&server, "/flaky", html("Flaky", &[])).await;

    let mut coordinator =
        Coordinator::with_http(create_test_config(1, 2)).expect("Failed to create coordinator");
    let outcome = coordinator
        .run(&format!("{}/", base), CancellationToken::new(), &mut Silent)
        .await
        .expect("Crawl failed");

    assert_eq!(outcome.results.len(), 2);
    assert!(outcome.results.contains_url(&format!("{}/flaky", base)));
    assert_eq!(outcome.report.retries, 2);
    assert_eq!(outcome.report.pages_failed, 0);
}

#[tokio::test]
async fn test_oversized_and_binary_pages_are_skipped_without_retry() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", html("Home", &["/video.mp4", "/huge"])).await;
    mount_page(
        &server,
        "/video.mp4",
        ResponseTemplate::new(200).set_body_raw(vec![7u8; 8_192], "video/mp4"),
    )
    .await;
    mount_page(
        &server,
        "/huge",
        ResponseTemplate::new(200).set_body_raw(
            format!("<html><body>{}</body></html>", "x".repeat(8_192)),
            "text/html",
        ),
    )
    .await;

    let mut config = create_test_config(1, 2);
    config.crawler.max_body_bytes = 4_096;

    let outcome = crawl(config, &format!("{}/", base), CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(sorted_urls(&outcome.results), vec![format!("{}/", base)]);
    assert_eq!(outcome.report.pages_skipped, 2);
    assert_eq!(outcome.report.pages_failed, 0);
    assert_eq!(outcome.report.retries, 0);
}

#[tokio::test]
async fn test_concurrency_limit() {
    let server = MockServer::start().await;
    let base = server.uri();

    let children = ["/1", "/2", "/3", "/4", "/5"];
    mount_page(&server, "/", html("Home", &children)).await;
    for child in children {
        mount_page(
            &server,
            child,
            html(child, &[]).set_delay(Duration::from_millis(100)),
        )
        .await;
    }

    let mut coordinator =
        Coordinator::with_http(create_test_config(1, 2)).expect("Failed to create coordinator");
    let outcome = coordinator
        .run(&format!("{}/", base), CancellationToken::new(), &mut Silent)
        .await
        .expect("Crawl failed");

    assert_eq!(outcome.results.len(), 6);
    assert!(outcome.report.peak_in_flight <= 2);
}

#[tokio::test]
async fn test_content_flags_limit_fields() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", html("Home", &["/next"])).await;
    mount_page(&server, "/next", html("Next", &[])).await;

    let mut config = create_test_config(1, 2);
    config.content = ContentFlags {
        text: true,
        images: false,
        links: false,
        videos: false,
    };

    let mut coordinator = Coordinator::with_http(config).expect("Failed to create coordinator");
    let outcome = coordinator
        .run(&format!("{}/", base), CancellationToken::new(), &mut Silent)
        .await
        .expect("Crawl failed");

    // Links are still followed even though they are not recorded
    assert_eq!(outcome.results.len(), 2);
    for record in &outcome.results {
        assert!(record.text.is_some());
        assert!(record.images.is_none());
        assert!(record.links.is_none());
        assert!(record.videos.is_none());
    }
}

#[tokio::test]
async fn test_cancelled_token_dispatches_nothing() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .respond_with(html("Never", &[]))
        .expect(0)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let mut coordinator =
        Coordinator::with_http(create_test_config(3, 2)).expect("Failed to create coordinator");
    let outcome = coordinator
        .run(&format!("{}/", base), cancel, &mut Silent)
        .await
        .expect("Crawl failed");

    assert!(outcome.report.cancelled);
    assert!(outcome.results.is_empty());
    let snapshot = coordinator.state().snapshot();
    assert_eq!(snapshot.queued, 0);
    assert_eq!(snapshot.in_flight, 0);
    assert_eq!(snapshot.phase, CrawlPhase::Finalized);
}

#[tokio::test]
async fn test_exports_of_a_real_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", html(r#"Say "hi""#, &["/b"])).await;
    mount_page(&server, "/b", html("B, with comma", &[])).await;

    let mut coordinator =
        Coordinator::with_http(create_test_config(1, 2)).expect("Failed to create coordinator");
    let outcome = coordinator
        .run(&format!("{}/", base), CancellationToken::new(), &mut Silent)
        .await
        .expect("Crawl failed");

    // JSON round-trips field for field
    let json = export(&outcome.results, ExportFormat::Json).unwrap();
    let parsed: ResultSet = serde_json::from_slice(&json.payload).unwrap();
    assert_eq!(parsed, outcome.results);

    // CSV quoting survives a standard reader
    let csv = export(&outcome.results, ExportFormat::Csv).unwrap();
    let mut reader = csv::Reader::from_reader(csv.payload.as_slice());
    let headers = reader.headers().unwrap().clone();
    let title_column = headers.iter().position(|h| h == "title").unwrap();
    let mut titles: Vec<String> = reader
        .records()
        .map(|r| r.unwrap()[title_column].to_string())
        .collect();
    titles.sort();
    assert_eq!(titles, vec![r#"B, with comma"#, r#"Say "hi""#]);

    // Unknown format names fall back to text
    let text = export(&outcome.results, ExportFormat::from_name("docx")).unwrap();
    assert_eq!(text.mime_type, "text/plain");
    assert!(String::from_utf8(text.payload)
        .unwrap()
        .contains(r#"Title: Say "hi""#));

    let dir = tempfile::tempdir().unwrap();
    let pdf = export(&outcome.results, ExportFormat::Pdf).unwrap();
    let written = pdf.write_to(dir.path(), "scrape_result").unwrap();
    assert!(written.ends_with("scrape_result.pdf"));
    assert!(std::fs::read(written).unwrap().starts_with(b"%PDF-"));
}
