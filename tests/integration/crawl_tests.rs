//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small department site and run the
//! full crawl cycle end-to-end against a temporary database.

use site_sift::config::{parse_config, Config};
use site_sift::crawler::{run_crawl, Coordinator};
use site_sift::storage::{open_storage, RunStatus, SqliteStorage, Storage};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FACULTY_PAGE: &str = r#"<html><head><title>Faculty</title></head><body>
<h1 class="cpp-h1">Permanent Faculty</h1>
<section class="text-images">
  <h2>Ada Lovelace</h2>
  <p>
    <strong>Title:</strong> Professor<br>
    <strong>Office:</strong> 8-49<br>
    <strong>Email:</strong> <a href="mailto:ada@cpp.edu">ada@cpp.edu</a><br>
    <strong>Web:</strong> <a href="https://www.cpp.edu/faculty/ada">Website</a>
  </p>
  <h2>Grace Hopper</h2>
  <p>
    <strong>Title:</strong> Associate Professor<br>
    <strong>Phone:</strong> (909) 869-0000<br>
    <strong>Email:</strong> grace@cpp.edu
  </p>
  <h2>Missing Email</h2>
  <p><strong>Title:</strong> Lecturer</p>
  <h2>Ada Again</h2>
  <p><strong>Email:</strong> ada@cpp.edu</p>
</section>
<a href="/dept/after-target.html">Should never be visited</a>
</body></html>"#;

/// Creates a test configuration rooted at the mock server
fn create_test_config(base_url: &str, db_path: &Path, extra: &str) -> Config {
    parse_config(&format!(
        r#"
[crawler]
seeds = ["{base}/dept/index.html"]
scope = "{base}/dept/"
{extra}

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"

[target]
heading-selector = "h1.cpp-h1"
heading-text = "Permanent Faculty"

[output]
database-path = "{db}"
"#,
        base = base_url,
        extra = extra,
        db = db_path.display()
    ))
    .expect("test config should parse")
}

fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into(), "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(html(body))
        .mount(server)
        .await;
}

/// Mounts a department site:
///
/// index -> about, research, external link, pdf
/// research -> faculty (target)
async fn mount_department_site(server: &MockServer) {
    let base = server.uri();

    mount_page(
        server,
        "/dept/index.html",
        format!(
            r#"<html><body><h1 class="cpp-h1">Department</h1>
            <a href="about.html">About</a>
            <a href="/dept/research/">Research</a>
            <a href="{base}/admissions/index.html">Out of scope</a>
            <a href="ftp://files.example.com/dept/x.html">FTP</a>
            <a href="/dept/brochure.pdf">Brochure</a>
            </body></html>"#
        ),
    )
    .await;

    mount_page(
        server,
        "/dept/about.html",
        r#"<html><body><a href="index.html">Home</a></body></html>"#.to_string(),
    )
    .await;

    mount_page(
        server,
        "/dept/research/",
        r#"<html><body><a href="../faculty.shtml#list">Faculty</a></body></html>"#.to_string(),
    )
    .await;

    mount_page(server, "/dept/faculty.shtml", FACULTY_PAGE.to_string()).await;

    Mock::given(method("GET"))
        .and(path("/dept/after-target.html"))
        .respond_with(html("<html></html>"))
        .expect(0)
        .mount(server)
        .await;
}

fn open(db_path: &Path) -> SqliteStorage {
    open_storage(db_path).expect("database should open")
}

#[tokio::test]
async fn test_crawl_finds_target_and_stores_records() {
    let server = MockServer::start().await;
    mount_department_site(&server).await;
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("crawl.db");

    let config = create_test_config(&server.uri(), &db_path, "");
    let report = run_crawl(config, "hash", false).await.unwrap();

    assert_eq!(report.status, RunStatus::Stopped);
    assert_eq!(
        report.target_url.as_deref(),
        Some(format!("{}/dept/faculty.shtml", server.uri()).as_str())
    );
    assert_eq!(report.records_inserted, 2);
    assert_eq!(report.records_existing, 0);
    assert_eq!(report.records_rejected, 2);
    assert_eq!(report.pages_fetched, 4);

    let storage = open(&db_path);
    assert_eq!(storage.count_pages().unwrap(), 4);
    assert_eq!(storage.count_records().unwrap(), 2);

    let ada = storage.get_record("ada@cpp.edu").unwrap().unwrap();
    assert_eq!(ada.name, "Ada Lovelace");
    assert_eq!(ada.title.as_deref(), Some("Professor"));
    assert_eq!(ada.office.as_deref(), Some("8-49"));
    assert_eq!(ada.website.as_deref(), Some("https://www.cpp.edu/faculty/ada"));

    let grace = storage.get_record("grace@cpp.edu").unwrap().unwrap();
    assert_eq!(grace.phone.as_deref(), Some("(909) 869-0000"));
    assert_eq!(grace.website, None);

    let run = storage.get_run(report.run_id).unwrap();
    assert_eq!(run.status, RunStatus::Stopped);
    assert!(run.finished_at.is_some());
}

#[tokio::test]
async fn test_second_crawl_reports_existing_records() {
    let server = MockServer::start().await;
    mount_department_site(&server).await;
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("crawl.db");

    let first = run_crawl(create_test_config(&server.uri(), &db_path, ""), "hash", false)
        .await
        .unwrap();
    assert_eq!(first.records_inserted, 2);

    let second = run_crawl(create_test_config(&server.uri(), &db_path, ""), "hash", true)
        .await
        .unwrap();
    assert_eq!(second.records_inserted, 0);
    assert_eq!(second.records_existing, 2);

    let storage = open(&db_path);
    assert_eq!(storage.count_records().unwrap(), 2);
    assert_eq!(storage.count_runs().unwrap(), 2);
}

#[tokio::test]
async fn test_non_markup_and_failed_pages_are_skipped() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("crawl.db");

    mount_page(
        &server,
        "/dept/index.html",
        r#"<html><body>
        <a href="report.html">Report</a>
        <a href="missing.html">Missing</a>
        <a href="broken.html">Broken</a>
        </body></html>"#
            .to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/dept/report.html"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF-1.4", "application/pdf"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dept/broken.html"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let report = run_crawl(create_test_config(&base, &db_path, ""), "hash", false)
        .await
        .unwrap();

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.target_url, None);
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.pages_skipped, 3);

    let storage = open(&db_path);
    assert_eq!(
        storage.list_page_urls().unwrap(),
        vec![format!("{}/dept/index.html", base)]
    );
    let run = storage.get_run(report.run_id).unwrap();
    assert_eq!(run.status, RunStatus::Completed);
}

#[tokio::test]
async fn test_max_pages_bounds_the_crawl() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("crawl.db");

    for i in 0..5 {
        let current = if i == 0 {
            "/dept/index.html".to_string()
        } else {
            format!("/dept/page{}.html", i)
        };
        mount_page(
            &server,
            &current,
            format!(r#"<html><body><a href="page{}.html">Next</a></body></html>"#, i + 1),
        )
        .await;
    }

    let config = create_test_config(&server.uri(), &db_path, "max-pages = 3");
    let report = run_crawl(config, "hash", false).await.unwrap();

    assert_eq!(report.status, RunStatus::Stopped);
    assert_eq!(report.pages_fetched, 3);
    assert_eq!(open(&db_path).count_pages().unwrap(), 3);
}

#[tokio::test]
async fn test_requests_carry_user_agent() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("crawl.db");

    Mock::given(method("GET"))
        .and(path("/dept/index.html"))
        .and(header(
            "user-agent",
            "TestBot/1.0.0 (+https://example.com/contact; test@example.com)",
        ))
        .respond_with(html("<html><body>No links</body></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let report = run_crawl(create_test_config(&server.uri(), &db_path, ""), "hash", false)
        .await
        .unwrap();
    assert_eq!(report.pages_fetched, 1);
}

#[tokio::test]
async fn test_worker_pool_finds_target() {
    let server = MockServer::start().await;
    mount_department_site(&server).await;
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("crawl.db");

    let config = create_test_config(&server.uri(), &db_path, "workers = 4");
    let report = run_crawl(config, "hash", false).await.unwrap();

    assert_eq!(report.status, RunStatus::Stopped);
    assert!(report.target_url.is_some());
    assert_eq!(report.records_inserted, 2);
    assert_eq!(open(&db_path).count_records().unwrap(), 2);
}

#[tokio::test]
async fn test_external_stop_ends_crawl() {
    let server = MockServer::start().await;
    mount_department_site(&server).await;
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("crawl.db");

    let storage = Arc::new(Mutex::new(open(&db_path)));
    let config = create_test_config(&server.uri(), &db_path, "");
    let mut coordinator = Coordinator::new(config, Arc::clone(&storage), "hash", false).unwrap();

    coordinator.frontier().stop();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.status, RunStatus::Stopped);
    assert_eq!(report.pages_fetched, 0);
    assert_eq!(storage.lock().unwrap().count_pages().unwrap(), 0);
}
