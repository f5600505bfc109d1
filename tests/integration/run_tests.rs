//! Full scrape runs: crawl, save, export

use pricefinder::config::{Config, CrawlerConfig, OutputConfig, SiteConfig, UserAgentConfig};
use pricefinder::crawler::{export_only, run, RunOutcome, RunSummary};
use pricefinder::storage::{SqliteStorage, Storage};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HEADER: &str = "created_at,source_name,title,numeric_value,target_url";

const PAGE_ONE: &str = r#"<html><body>
    <article class="product_pod">
      <h3><a href="item-a.html" title="Item A">Item A</a></h3>
      <p class="price_color">£30.00</p>
    </article>
    <article class="product_pod">
      <h3><a href="item-b.html" title="Item B">Item B</a></h3>
      <p class="price_color">Price on request</p>
    </article>
    <ul class="pager"><li class="next"><a href="page-2.html">next</a></li></ul>
</body></html>"#;

const PAGE_TWO: &str = r#"<html><body>
    <article class="product_pod">
      <h3><a href="item-c.html" title="Item C">Item C</a></h3>
      <p class="price_color">£10.00</p>
    </article>
</body></html>"#;

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, dir: &TempDir) -> Config {
    Config {
        crawler: CrawlerConfig {
            start_url: format!("{}/catalogue/page-1.html", base_url),
            max_attempts: 3,
            backoff_step_ms: 10, // Very short for testing
            request_timeout_secs: 5,
            max_pages: None,
        },
        user_agent: UserAgentConfig {
            client_name: "TestBot".to_string(),
            client_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
        },
        site: SiteConfig {
            source_name: "Mock Shop".to_string(),
            item_selector: "article.product_pod".to_string(),
            title_selector: "h3 > a".to_string(),
            title_attribute: Some("title".to_string()),
            price_selector: "p.price_color".to_string(),
            link_selector: "h3 > a".to_string(),
            next_selector: "li.next > a".to_string(),
        },
        output: OutputConfig {
            database_path: path_string(&dir.path().join("db").join("offers.sqlite3")),
            export_path: path_string(&dir.path().join("results").join("offers.csv")),
            log_path: None,
        },
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

async fn mount_page(mock_server: &MockServer, page_path: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(mock_server)
        .await;
}

fn export_lines(config: &Config) -> Vec<String> {
    std::fs::read_to_string(&config.output.export_path)
        .expect("Export file missing")
        .lines()
        .map(str::to_string)
        .collect()
}

fn stored_count(config: &Config) -> u64 {
    let storage = SqliteStorage::new(&PathBuf::from(&config.output.database_path))
        .expect("Failed to open DB");
    storage.count_offers().expect("Failed to count offers")
}

#[tokio::test]
async fn test_full_run_two_pages() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/catalogue/page-1.html", 200, PAGE_ONE).await;
    mount_page(&mock_server, "/catalogue/page-2.html", 200, PAGE_TWO).await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&mock_server.uri(), &dir);

    let outcome = run(&config).await;

    assert_eq!(
        outcome,
        RunOutcome::Completed(RunSummary {
            pages: 2,
            records: 3,
            inserted: 3,
            duplicates: 0,
            exported: 3,
        })
    );

    let lines = export_lines(&config);
    let base = mock_server.uri();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], HEADER);
    assert!(lines[1].ends_with(&format!(
        ",Mock Shop,Item C,10,{}/catalogue/item-c.html",
        base
    )));
    assert!(lines[2].ends_with(&format!(
        ",Mock Shop,Item A,30,{}/catalogue/item-a.html",
        base
    )));
    assert!(lines[3].ends_with(&format!(
        ",Mock Shop,Item B,,{}/catalogue/item-b.html",
        base
    )));
}

#[tokio::test]
async fn test_rerun_stores_nothing_new() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/catalogue/page-1.html", 200, PAGE_ONE).await;
    mount_page(&mock_server, "/catalogue/page-2.html", 200, PAGE_TWO).await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&mock_server.uri(), &dir);

    assert!(run(&config).await.is_completed());
    let second = run(&config).await;

    match second {
        RunOutcome::Completed(summary) => {
            assert_eq!(summary.records, 3);
            assert_eq!(summary.inserted, 0);
            assert_eq!(summary.duplicates, 3);
            assert_eq!(summary.exported, 3);
        }
        other => panic!("Expected completed run, got {:?}", other),
    }
    assert_eq!(stored_count(&config), 3);
}

#[tokio::test]
async fn test_fetch_failure_writes_empty_export() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/catalogue/page-1.html", 200, PAGE_ONE).await;

    Mock::given(method("GET"))
        .and(path("/catalogue/page-2.html"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&mock_server.uri(), &dir);

    let outcome = run(&config).await;

    match outcome {
        RunOutcome::Failed { error } => {
            assert!(error.contains("last status 500"), "{}", error);
            assert_eq!(error.matches("Giving up on").count(), 1, "{}", error);
        }
        other => panic!("Expected failed run, got {:?}", other),
    }
    assert_eq!(export_lines(&config), vec![HEADER]);
    // Page one's records are not saved when the crawl fails
    assert_eq!(stored_count(&config), 0);
}

#[tokio::test]
async fn test_failed_run_replaces_previous_export() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&mock_server.uri(), &dir);

    {
        let mut storage =
            SqliteStorage::new(&PathBuf::from(&config.output.database_path)).unwrap();
        storage
            .save(&[pricefinder::Record::new("Mock Shop", "old", Some(1.0), "http://old.test/").unwrap()])
            .unwrap();
        storage
            .export(&PathBuf::from(&config.output.export_path))
            .unwrap();
    }
    assert_eq!(export_lines(&config).len(), 2);

    mount_page(&mock_server, "/catalogue/page-1.html", 503, "").await;

    let outcome = run(&config).await;

    assert!(!outcome.is_completed());
    assert_eq!(export_lines(&config), vec![HEADER]);
    assert_eq!(stored_count(&config), 1);
}

#[tokio::test]
async fn test_malformed_page_is_fatal() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/catalogue/page-1.html",
        200,
        r#"<html><body><article class="product_pod"><h3>No link here</h3></article></body></html>"#,
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&mock_server.uri(), &dir);

    let outcome = run(&config).await;

    match outcome {
        RunOutcome::Failed { error } => {
            assert!(error.starts_with("Failed to extract records from"), "{}", error);
            assert_eq!(error.matches("has no link").count(), 1, "{}", error);
        }
        other => panic!("Expected failed run, got {:?}", other),
    }
    assert_eq!(export_lines(&config), vec![HEADER]);
}

#[tokio::test]
async fn test_export_only_uses_stored_offers() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/catalogue/page-1.html", 200, PAGE_ONE).await;
    mount_page(&mock_server, "/catalogue/page-2.html", 200, PAGE_TWO).await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&mock_server.uri(), &dir);

    assert!(run(&config).await.is_completed());
    std::fs::remove_file(&config.output.export_path).unwrap();

    let exported = export_only(&config).expect("Export failed");

    assert_eq!(exported, 3);
    assert_eq!(export_lines(&config).len(), 4);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_invalid_config_fails_before_crawling() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/catalogue/page-1.html", 200, PAGE_ONE).await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(&mock_server.uri(), &dir);
    config.crawler.max_attempts = 0;

    let outcome = run(&config).await;

    match outcome {
        RunOutcome::Failed { error } => assert!(error.contains("max_attempts"), "{}", error),
        other => panic!("Expected failed run, got {:?}", other),
    }
    assert_eq!(export_lines(&config), vec![HEADER]);
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}
