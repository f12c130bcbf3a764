//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test the full
//! crawl cycle end-to-end. The mock server is both the origin and the proxy:
//! plain-HTTP requests are sent to it in proxy form and still hit its routes.

use gh_crawler::config::{CrawlerSettings, DetailFailurePolicy, SearchOptions};
use gh_crawler::crawler::{extract_language_stats, extract_links, run_crawl, Crawler};
use gh_crawler::output::{render_results, ResultRecord};
use gh_crawler::{Category, CrawlError, CrawlPhase};
use serde_json::json;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH_REPOSITORIES: &str = include_str!("../fixtures/search_repositories.html");
const SEARCH_WIKIS: &str = include_str!("../fixtures/search_wikis.html");
const SEARCH_ISSUES: &str = include_str!("../fixtures/search_issues.html");
const DETAIL_DROPBOX: &str = include_str!("../fixtures/detail_dropbox.html");
const DETAIL_HORIZON: &str = include_str!("../fixtures/detail_horizon.html");

/// Search options routed through the mock server as proxy
fn search_options(server: &MockServer, kind: &str) -> SearchOptions {
    SearchOptions::new(
        vec![
            "openstack".to_string(),
            "nova".to_string(),
            "css".to_string(),
        ],
        kind,
        vec![server.address().to_string()],
    )
    .expect("valid search options")
}

fn settings(server: &MockServer) -> CrawlerSettings {
    CrawlerSettings {
        timeout: Duration::from_secs(5),
        origin: server.uri(),
        ..CrawlerSettings::default()
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

async fn mount_search(server: &MockServer, category: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("type", category))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, page_path: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn mount_repository_details(server: &MockServer) {
    mount_page(server, "/atuldjadhav/DropBox-Cloud-Storage", html(DETAIL_DROPBOX)).await;
    mount_page(server, "/michealbalogun/Horizon-dashboard", html(DETAIL_HORIZON)).await;
}

async fn search_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == "/search")
        .count()
}

fn sorted_urls(results: &[ResultRecord]) -> Vec<String> {
    let mut urls: Vec<String> = results.iter().map(|r| r.url.clone()).collect();
    urls.sort();
    urls
}

#[test]
fn test_extract_links_from_repositories_fixture() {
    let origin = Url::parse("https://github.com").unwrap();
    let links = extract_links(SEARCH_REPOSITORIES, Category::Repositories, &origin).unwrap();

    assert_eq!(
        links,
        vec![
            "https://github.com/atuldjadhav/DropBox-Cloud-Storage".to_string(),
            "https://github.com/michealbalogun/Horizon-dashboard".to_string(),
        ]
    );

    let again = extract_links(SEARCH_REPOSITORIES, Category::Repositories, &origin).unwrap();
    assert_eq!(links, again);
}

#[test]
fn test_language_stats_from_detail_fixtures() {
    let stats = extract_language_stats(DETAIL_DROPBOX).unwrap();
    assert_eq!(
        serde_json::to_value(&stats).unwrap(),
        json!({"CSS": 52.0, "JavaScript": 47.2, "HTML": 0.8})
    );

    let stats = extract_language_stats(DETAIL_HORIZON).unwrap();
    assert_eq!(
        serde_json::to_value(&stats).unwrap(),
        json!({"Python": 100.0})
    );
}

#[tokio::test]
async fn test_full_crawl_repositories() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_search(&mock_server, "Repositories", html(SEARCH_REPOSITORIES)).await;
    mount_repository_details(&mock_server).await;

    let mut crawler =
        Crawler::with_settings(search_options(&mock_server, "Repositories"), settings(&mock_server))
            .expect("Failed to create crawler");

    let results = crawler.run().await.expect("Crawl failed").to_vec();

    let expected = json!([
        {
            "url": format!("{}/atuldjadhav/DropBox-Cloud-Storage", base_url),
            "extra": {
                "owner": "atuldjadhav",
                "language_stats": {"CSS": 52.0, "JavaScript": 47.2, "HTML": 0.8}
            }
        },
        {
            "url": format!("{}/michealbalogun/Horizon-dashboard", base_url),
            "extra": {
                "owner": "michealbalogun",
                "language_stats": {"Python": 100.0}
            }
        }
    ]);

    assert_eq!(serde_json::to_value(&results).unwrap(), expected);
    assert_eq!(crawler.phase(), CrawlPhase::Done);

    // Language order follows the page
    let rendered = render_results(&results).unwrap();
    let css = rendered.find("\"CSS\"").unwrap();
    let html = rendered.find("\"HTML\"").unwrap();
    assert!(css < html);
}

#[tokio::test]
async fn test_full_crawl_wikis() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_search(&mock_server, "Wikis", html(SEARCH_WIKIS)).await;

    let results = run_crawl(search_options(&mock_server, "Wikis"), settings(&mock_server))
        .await
        .expect("Crawl failed");

    assert!(results.iter().all(|r| r.extra.is_none()));
    assert!(serde_json::to_value(&results)
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .all(|record| record.get("extra").is_none()));

    assert_eq!(
        sorted_urls(&results),
        vec![
            format!("{}/cristina-grosu/openstack-nova", base_url),
            format!("{}/openstack/nova-docker", base_url),
            format!("{}/sandervanvugt/openstack-fundamentals", base_url),
        ]
    );
}

#[tokio::test]
async fn test_full_crawl_issues() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_search(&mock_server, "Issues", html(SEARCH_ISSUES)).await;

    let results = run_crawl(search_options(&mock_server, "Issues"), settings(&mock_server))
        .await
        .expect("Crawl failed");

    assert!(results.iter().all(|r| r.extra.is_none()));
    assert_eq!(
        sorted_urls(&results),
        vec![
            format!("{}/ezeeyahoo/openstack/issues/31", base_url),
            format!("{}/hudec/openstack-ansible/issues/7", base_url),
            format!("{}/openstack/nova/issues/124", base_url),
        ]
    );
}

#[tokio::test]
async fn test_unknown_type_searches_repositories() {
    let mock_server = MockServer::start().await;

    mount_search(&mock_server, "Repositories", html(SEARCH_REPOSITORIES)).await;
    mount_repository_details(&mock_server).await;

    let options = search_options(&mock_server, "johndoe");
    assert_eq!(options.category(), Category::Repositories);

    let results = run_crawl(options, settings(&mock_server))
        .await
        .expect("Crawl failed");
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.extra.is_some()));
}

#[tokio::test]
async fn test_search_timeout_yields_empty_results() {
    let mock_server = MockServer::start().await;

    mount_search(
        &mock_server,
        "Repositories",
        html(SEARCH_REPOSITORIES).set_delay(Duration::from_millis(1500)),
    )
    .await;

    let settings = CrawlerSettings {
        timeout: Duration::from_millis(200),
        ..settings(&mock_server)
    };
    let mut crawler =
        Crawler::with_settings(search_options(&mock_server, "Repositories"), settings).unwrap();

    let results = crawler.run().await.expect("Timeout must not fail the crawl");
    assert!(results.is_empty());
    assert_eq!(crawler.phase(), CrawlPhase::Done);
}

#[tokio::test]
async fn test_search_http_error_aborts() {
    let mock_server = MockServer::start().await;

    mount_search(&mock_server, "Issues", ResponseTemplate::new(500)).await;

    let mut crawler =
        Crawler::with_settings(search_options(&mock_server, "Issues"), settings(&mock_server))
            .unwrap();

    match crawler.run().await {
        Err(CrawlError::HttpStatus { status, .. }) => assert_eq!(status, 500),
        other => panic!("expected HTTP status error, got {:?}", other),
    }
    assert_eq!(crawler.phase(), CrawlPhase::Failed);
    assert!(crawler.results().is_empty());
}

#[tokio::test]
async fn test_unreachable_proxy_is_transport_error() {
    let options = SearchOptions::new(
        vec!["openstack".to_string()],
        "Repositories",
        vec!["127.0.0.1:1".to_string()],
    )
    .unwrap();
    let settings = CrawlerSettings {
        timeout: Duration::from_secs(5),
        origin: "http://127.0.0.1:9".to_string(),
        ..CrawlerSettings::default()
    };

    let result = run_crawl(options, settings).await;
    assert!(matches!(result, Err(CrawlError::Transport { .. })));
}

#[tokio::test]
async fn test_detail_http_error_aborts_by_default() {
    let mock_server = MockServer::start().await;

    mount_search(&mock_server, "Repositories", html(SEARCH_REPOSITORIES)).await;
    mount_page(&mock_server, "/atuldjadhav/DropBox-Cloud-Storage", html(DETAIL_DROPBOX)).await;
    mount_page(&mock_server, "/michealbalogun/Horizon-dashboard", ResponseTemplate::new(404)).await;

    let mut crawler =
        Crawler::with_settings(search_options(&mock_server, "Repositories"), settings(&mock_server))
            .unwrap();

    match crawler.run().await {
        Err(CrawlError::HttpStatus { status, url }) => {
            assert_eq!(status, 404);
            assert!(url.ends_with("/michealbalogun/Horizon-dashboard"));
        }
        other => panic!("expected HTTP status error, got {:?}", other),
    }

    // Records processed before the failure are discarded
    assert!(crawler.results().is_empty());
    assert_eq!(crawler.phase(), CrawlPhase::Failed);
}

#[tokio::test]
async fn test_detail_http_error_skipped_with_policy() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_search(&mock_server, "Repositories", html(SEARCH_REPOSITORIES)).await;
    mount_page(&mock_server, "/atuldjadhav/DropBox-Cloud-Storage", ResponseTemplate::new(503)).await;
    mount_page(&mock_server, "/michealbalogun/Horizon-dashboard", html(DETAIL_HORIZON)).await;

    let settings = CrawlerSettings {
        detail_failures: DetailFailurePolicy::Skip,
        ..settings(&mock_server)
    };

    let results = run_crawl(search_options(&mock_server, "Repositories"), settings)
        .await
        .expect("Crawl failed");

    assert_eq!(
        serde_json::to_value(&results).unwrap(),
        json!([
            {"url": format!("{}/atuldjadhav/DropBox-Cloud-Storage", base_url)},
            {
                "url": format!("{}/michealbalogun/Horizon-dashboard", base_url),
                "extra": {"owner": "michealbalogun", "language_stats": {"Python": 100.0}}
            }
        ])
    );
}

#[tokio::test]
async fn test_detail_transport_error_aborts_with_skip_policy() {
    let mock_server = MockServer::start().await;

    mount_search(&mock_server, "Repositories", html(SEARCH_REPOSITORIES)).await;
    mount_page(&mock_server, "/atuldjadhav/DropBox-Cloud-Storage", html(DETAIL_DROPBOX)).await;
    // Claims gzip but is not, so reading the body fails
    mount_page(
        &mock_server,
        "/michealbalogun/Horizon-dashboard",
        html(DETAIL_HORIZON).insert_header("content-encoding", "gzip"),
    )
    .await;

    let settings = CrawlerSettings {
        detail_failures: DetailFailurePolicy::Skip,
        ..settings(&mock_server)
    };
    let mut crawler =
        Crawler::with_settings(search_options(&mock_server, "Repositories"), settings).unwrap();

    match crawler.run().await {
        Err(CrawlError::Transport { url, .. }) => {
            assert!(url.ends_with("/michealbalogun/Horizon-dashboard"));
        }
        other => panic!("expected transport error, got {:?}", other),
    }

    assert!(crawler.results().is_empty());
    assert_eq!(crawler.phase(), CrawlPhase::Failed);
}

#[tokio::test]
async fn test_detail_malformed_proxy_aborts_with_skip_policy() {
    let mock_server = MockServer::start().await;

    mount_search(&mock_server, "Repositories", html(SEARCH_REPOSITORIES)).await;
    mount_repository_details(&mock_server).await;

    let options = SearchOptions::new(
        vec!["openstack".to_string()],
        "Repositories",
        vec![mock_server.address().to_string(), "not-a-proxy".to_string()],
    )
    .unwrap();
    let settings = CrawlerSettings {
        detail_failures: DetailFailurePolicy::Skip,
        ..settings(&mock_server)
    };
    let mut crawler = Crawler::with_settings(options, settings).unwrap();

    // Proxies are drawn at random; rerun until the bad one is drawn after the
    // search page was fetched
    let mut failed_on_detail = false;
    for _ in 0..64 {
        crawler.reset();
        let searches_before = search_requests(&mock_server).await;

        match crawler.run().await {
            Ok(results) => assert_eq!(results.len(), 2),
            Err(CrawlError::MalformedProxy { proxy }) => {
                assert_eq!(proxy, "not-a-proxy");
                assert!(crawler.results().is_empty());
                assert_eq!(crawler.phase(), CrawlPhase::Failed);

                if search_requests(&mock_server).await > searches_before {
                    failed_on_detail = true;
                    break;
                }
            }
            Err(e) => panic!("unexpected error: {:?}", e),
        }
    }

    assert!(failed_on_detail, "malformed proxy never drawn for a detail page");
}

#[tokio::test]
async fn test_detail_timeout_is_soft() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_search(&mock_server, "Repositories", html(SEARCH_REPOSITORIES)).await;
    mount_page(
        &mock_server,
        "/atuldjadhav/DropBox-Cloud-Storage",
        html(DETAIL_DROPBOX).set_delay(Duration::from_millis(1500)),
    )
    .await;
    mount_page(&mock_server, "/michealbalogun/Horizon-dashboard", html(DETAIL_HORIZON)).await;

    let settings = CrawlerSettings {
        timeout: Duration::from_millis(500),
        ..settings(&mock_server)
    };

    let results = run_crawl(search_options(&mock_server, "Repositories"), settings)
        .await
        .expect("Detail timeout must not fail the crawl");

    assert_eq!(results.len(), 2);
    assert_eq!(
        results[0],
        ResultRecord::new(format!("{}/atuldjadhav/DropBox-Cloud-Storage", base_url))
    );
    assert_eq!(
        results[1].extra.as_ref().and_then(|e| e.owner.as_deref()),
        Some("michealbalogun")
    );
}

#[tokio::test]
async fn test_detail_page_without_data_has_no_extra() {
    let mock_server = MockServer::start().await;

    mount_search(&mock_server, "Repositories", html(SEARCH_REPOSITORIES)).await;
    mount_page(
        &mock_server,
        "/atuldjadhav/DropBox-Cloud-Storage",
        html("<html><body><p>Empty repository</p></body></html>"),
    )
    .await;
    mount_page(&mock_server, "/michealbalogun/Horizon-dashboard", html(DETAIL_HORIZON)).await;

    let results = run_crawl(search_options(&mock_server, "Repositories"), settings(&mock_server))
        .await
        .expect("Crawl failed");

    assert!(results[0].extra.is_none());
    assert!(results[1].extra.is_some());
}
