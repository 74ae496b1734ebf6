//! Integration tests for the harvester
//!
//! These tests use wiremock to serve pages and images and run full harvests
//! into temporary directories.

use image_harvester::config::Config;
use image_harvester::harvester::{Harvester, SessionOutcome};
use image_harvester::url::extract_domain;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];
const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00];
const GIF_BYTES: &[u8] = b"GIF89a\x01\x00\x01\x00\x00\x00\x00";

fn harvester_in(base: &Path) -> Harvester {
    Harvester::new(Config::default().with_base_dir(base)).expect("Failed to build harvester")
}

/// Expected destination directory for a mock server
fn domain_dir(base: &Path, server: &MockServer) -> PathBuf {
    base.join("downloaded").join(extract_domain(&server.uri()))
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read directory")
        .map(|e| e.expect("Bad entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

async fn mount_page(server: &MockServer, route: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_bytes(server: &MockServer, route: &str, bytes: &[u8], content_type: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(bytes.to_vec())
                .insert_header("content-type", content_type),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_two_images_end_to_end() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/page",
        format!(
            r#"<html><body>
            <img src="{}/photos/a.jpg">
            <img src="/img/logo.png">
            </body></html>"#,
            base_url
        ),
    )
    .await;
    mount_bytes(&server, "/photos/a.jpg", JPEG_BYTES, "image/jpeg").await;
    mount_bytes(&server, "/img/logo.png", PNG_BYTES, "image/png").await;

    let tmp = TempDir::new().unwrap();
    let harvester = harvester_in(tmp.path());
    let outcome = harvester
        .harvest(&format!("{}/page", base_url), &mut |_: u8| {})
        .await;

    let expected_dir = domain_dir(tmp.path(), &server);
    let (directory, success, message) = outcome.into_parts();
    assert!(success, "Harvest failed: {}", message);
    assert_eq!(directory, Some(expected_dir.clone()));
    assert!(message.contains("completed"));
    assert_eq!(file_names(&expected_dir), vec!["image_0.jpg", "image_1.png"]);
    assert_eq!(
        std::fs::read(expected_dir.join("image_1.png")).unwrap(),
        PNG_BYTES
    );
}

#[tokio::test]
async fn test_progress_called_once_per_reference() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<html><head><style>.bg { background-image: url('/bg.gif'); }</style></head><body>
            <img src="/a.png">
            <img src="/missing.png">
            <svg width="2" height="2"><rect width="2" height="2"></rect></svg>
            <img src="/b.jpg">
            </body></html>"#
            .to_string(),
    )
    .await;
    mount_bytes(&server, "/a.png", PNG_BYTES, "image/png").await;
    mount_bytes(&server, "/b.jpg", JPEG_BYTES, "image/jpeg").await;
    mount_bytes(&server, "/bg.gif", GIF_BYTES, "image/gif").await;
    Mock::given(method("GET"))
        .and(path("/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let mut progress = Vec::new();
    let outcome = harvester_in(tmp.path())
        .harvest(&server.uri(), &mut |p: u8| progress.push(p))
        .await;

    assert!(outcome.is_success(), "{}", outcome.message());
    assert_eq!(progress, vec![20, 40, 60, 80, 100]);
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));

    // The 404 still consumed index 1
    let dir = domain_dir(tmp.path(), &server);
    assert_eq!(
        file_names(&dir),
        vec!["image_0.png", "image_2.svg", "image_3.jpg", "image_4.gif"]
    );
    let svg = std::fs::read_to_string(dir.join("image_2.svg")).unwrap();
    assert!(svg.starts_with("<svg"));

    if let SessionOutcome::Success { summary, .. } = outcome {
        assert_eq!(summary.discovered, 5);
        assert_eq!(summary.saved_count(), 4);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 0);
    }
}

#[tokio::test]
async fn test_zero_images_succeeds_without_progress() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        "<html><body><p>Nothing to see</p></body></html>".to_string(),
    )
    .await;

    let tmp = TempDir::new().unwrap();
    let mut calls = 0;
    let outcome = harvester_in(tmp.path())
        .harvest(&server.uri(), &mut |_: u8| calls += 1)
        .await;

    assert!(outcome.is_success());
    assert_eq!(calls, 0);

    let dir = domain_dir(tmp.path(), &server);
    assert!(dir.is_dir());
    assert!(file_names(&dir).is_empty());
}

#[tokio::test]
async fn test_signature_overrides_generic_content_type() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<img src="/download?id=7">"#.to_string()).await;
    mount_bytes(&server, "/download", JPEG_BYTES, "application/octet-stream").await;

    let tmp = TempDir::new().unwrap();
    let outcome = harvester_in(tmp.path())
        .harvest(&server.uri(), &mut |_: u8| {})
        .await;

    assert!(outcome.is_success());
    assert_eq!(
        file_names(&domain_dir(tmp.path(), &server)),
        vec!["image_0.jpg"]
    );
}

#[tokio::test]
async fn test_svg_url_wins_over_bytes_and_content_type() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<img src="/icons/logo.svg">"#.to_string()).await;
    mount_bytes(&server, "/icons/logo.svg", PNG_BYTES, "image/png").await;

    let tmp = TempDir::new().unwrap();
    harvester_in(tmp.path())
        .harvest(&server.uri(), &mut |_: u8| {})
        .await;

    assert_eq!(
        file_names(&domain_dir(tmp.path(), &server)),
        vec!["image_0.svg"]
    );
}

#[tokio::test]
async fn test_failed_fetches_leave_no_temp_files() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<body>
            <img src="/broken.png">
            <img src="http://127.0.0.1:1/unreachable.png">
            <img src="/fine.png">
        </body>"#
            .to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken.png"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_bytes(&server, "/fine.png", PNG_BYTES, "image/png").await;

    let tmp = TempDir::new().unwrap();
    let outcome = harvester_in(tmp.path())
        .harvest(&server.uri(), &mut |_: u8| {})
        .await;

    assert!(outcome.is_success());
    let names = file_names(&domain_dir(tmp.path(), &server));
    assert!(names.iter().all(|n| !n.starts_with("temp_")));
    assert_eq!(names, vec!["image_2.png"]);
}

#[tokio::test]
async fn test_rerun_overwrites_by_index() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<img src="/a.png"><img src="/b.jpg">"#.to_string(),
    )
    .await;
    mount_bytes(&server, "/a.png", PNG_BYTES, "image/png").await;
    mount_bytes(&server, "/b.jpg", JPEG_BYTES, "image/jpeg").await;

    let tmp = TempDir::new().unwrap();
    let harvester = harvester_in(tmp.path());

    let first = harvester.harvest(&server.uri(), &mut |_: u8| {}).await;
    let second = harvester.harvest(&server.uri(), &mut |_: u8| {}).await;

    assert!(first.is_success());
    assert!(second.is_success());
    assert_eq!(first.directory(), second.directory());
    assert_eq!(
        file_names(&domain_dir(tmp.path(), &server)),
        vec!["image_0.png", "image_1.jpg"]
    );
}

#[tokio::test]
async fn test_rerun_with_new_format_keeps_one_file_per_index() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<img src="/pic">"#.to_string()).await;
    Mock::given(method("GET"))
        .and(path("/pic"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(PNG_BYTES.to_vec()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_bytes(&server, "/pic", JPEG_BYTES, "image/jpeg").await;

    let tmp = TempDir::new().unwrap();
    let harvester = harvester_in(tmp.path());
    let dir = domain_dir(tmp.path(), &server);

    assert!(harvester.harvest(&server.uri(), &mut |_: u8| {}).await.is_success());
    assert_eq!(file_names(&dir), vec!["image_0.png"]);

    assert!(harvester.harvest(&server.uri(), &mut |_: u8| {}).await.is_success());
    assert_eq!(file_names(&dir), vec!["image_0.jpg"]);
}

#[tokio::test]
async fn test_noscript_fallback_images_are_downloaded() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<noscript><img src="/fallback.png"></noscript><img src="/main.jpg">"#.to_string(),
    )
    .await;
    mount_bytes(&server, "/fallback.png", PNG_BYTES, "image/png").await;
    mount_bytes(&server, "/main.jpg", JPEG_BYTES, "image/jpeg").await;

    let tmp = TempDir::new().unwrap();
    let outcome = harvester_in(tmp.path())
        .harvest(&server.uri(), &mut |_: u8| {})
        .await;

    assert!(outcome.is_success());
    assert_eq!(
        file_names(&domain_dir(tmp.path(), &server)),
        vec!["image_0.png", "image_1.jpg"]
    );
}

#[tokio::test]
async fn test_page_failure_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let mut calls = 0;
    let outcome = harvester_in(tmp.path())
        .harvest(&server.uri(), &mut |_: u8| calls += 1)
        .await;

    let (directory, success, message) = outcome.into_parts();
    assert!(!success);
    assert_eq!(directory, None);
    assert!(message.starts_with("Error occurred"));
    assert!(message.contains("503"));
    assert_eq!(calls, 0);

    // The directory may exist, but nothing was written into it
    let dir = domain_dir(tmp.path(), &server);
    if dir.exists() {
        assert!(file_names(&dir).is_empty());
    }
}

#[tokio::test]
async fn test_unreachable_page_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let outcome = harvester_in(tmp.path())
        .harvest("http://127.0.0.1:1/", &mut |_: u8| {})
        .await;

    assert!(!outcome.is_success());
    assert!(outcome.message().starts_with("Error occurred"));
}

#[tokio::test]
async fn test_img_without_src_keeps_index_but_reports_progress() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<img alt="placeholder"><img src="/a.png">"#.to_string(),
    )
    .await;
    mount_bytes(&server, "/a.png", PNG_BYTES, "image/png").await;

    let tmp = TempDir::new().unwrap();
    let mut progress = Vec::new();
    let outcome = harvester_in(tmp.path())
        .harvest(&server.uri(), &mut |p: u8| progress.push(p))
        .await;

    assert!(outcome.is_success());
    assert_eq!(progress, vec![50, 100]);
    assert_eq!(
        file_names(&domain_dir(tmp.path(), &server)),
        vec!["image_0.png"]
    );
}

#[tokio::test]
async fn test_css_references_resolve_against_page() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/blog/post",
        r#"<html><head><style>
            .hero { background: url("../assets/hero.gif") no-repeat; }
        </style></head><body><img src="thumb.png"></body></html>"#
            .to_string(),
    )
    .await;
    mount_bytes(&server, "/blog/thumb.png", PNG_BYTES, "image/png").await;
    mount_bytes(&server, "/assets/hero.gif", GIF_BYTES, "image/gif").await;

    let tmp = TempDir::new().unwrap();
    let outcome = harvester_in(tmp.path())
        .harvest(&format!("{}/blog/post", server.uri()), &mut |_: u8| {})
        .await;

    assert!(outcome.is_success());
    assert_eq!(
        file_names(&domain_dir(tmp.path(), &server)),
        vec!["image_0.png", "image_1.gif"]
    );
}
