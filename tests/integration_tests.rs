//! Integration tests for Citation Count
//!
//! These tests run lookups against a local mock HTTP server and drive the
//! extension lifecycle with in-memory host capabilities.

use citation_count::config::Config;
use citation_count::extension::memory::{MemoryPreferences, MemorySurface, MockFetcher};
use citation_count::extension::{CitationCountExtension, HostContext, Locale, SelectionBus};
use citation_count::lookup::{CitationLookup, EndpointProfile, LookupError, ProfileKind};
use citation_count::models::{CitationResult, PaperIdentity};
use citation_count::utils::{HttpClient, RetryConfig};
use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const SLOT: &str = "paperDetailsPanelSlot1";
const WIDGET: &str = "paperlib-citation-count";

fn attention() -> PaperIdentity {
    PaperIdentity::new("Attention Is All You Need")
}

fn fast_client() -> Arc<HttpClient> {
    Arc::new(HttpClient::with_timeout(Duration::from_secs(2)))
}

// ===== Lookups against a mock server =====

#[tokio::test]
async fn test_paperlib_lookup_by_doi() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/metadata/citationcount")
        .match_query(Matcher::UrlEncoded("doi".into(), "10.5555/3295222".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"data": [{"title": "Attention is All you Need", "citationCount": 50000, "influentialCitationCount": 9000}]}"#,
        )
        .create_async()
        .await;

    let profile = EndpointProfile::paperlib().with_base_url(server.url());
    let lookup = CitationLookup::new(profile, fast_client());
    let paper = attention()
        .with_doi("10.5555/3295222")
        .with_arxiv("arXiv:1706.03762v7");

    let result = lookup.lookup(&paper).await.unwrap();

    mock.assert_async().await;
    assert_eq!(result.citation_count, "50000");
    assert_eq!(result.influential_citation_count, "9000");
}

#[tokio::test]
async fn test_paperlib_lookup_by_arxiv() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/metadata/citationcount")
        .match_query(Matcher::UrlEncoded("arxiv".into(), "1706.03762".into()))
        .with_status(200)
        .with_body(
            r#"{"title": "Attention Is All You Need", "citationCount": 120, "influentialCitationCount": null}"#,
        )
        .create_async()
        .await;

    let profile = EndpointProfile::paperlib().with_base_url(server.url());
    let lookup = CitationLookup::new(profile, fast_client());
    let paper = attention().with_arxiv("arXiv:1706.03762v7");

    let result = lookup.lookup(&paper).await.unwrap();

    mock.assert_async().await;
    assert_eq!(result.display_content(), "120 (null)");
}

#[tokio::test]
async fn test_semantic_scholar_title_search() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/paper/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("query".into(), "deep learning".into()),
            Matcher::UrlEncoded(
                "fields".into(),
                "title,citationCount,influentialCitationCount".into(),
            ),
        ]))
        .with_status(200)
        .with_body(
            r#"{"total": 3, "offset": 0, "data": [
                {"paperId": "a", "title": "Deep Learning for Everyone", "citationCount": 1, "influentialCitationCount": 0},
                {"paperId": "b", "title": "Deep learning", "citationCount": 70000, "influentialCitationCount": 4000},
                {"paperId": "c", "title": "Deep Learning.", "citationCount": 5, "influentialCitationCount": 5}
            ]}"#,
        )
        .create_async()
        .await;

    let profile = EndpointProfile::semantic_scholar().with_base_url(server.url());
    let lookup = CitationLookup::new(profile, fast_client());

    let result = lookup.lookup(&PaperIdentity::new("Deep Learning")).await.unwrap();

    mock.assert_async().await;
    assert_eq!(result.display_content(), "70000 (4000)");
}

#[tokio::test]
async fn test_no_matching_candidate_is_not_an_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/metadata/citationcount")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"data": [{"title": "A Completely Different Paper", "citationCount": 10}]}"#)
        .create_async()
        .await;

    let profile = EndpointProfile::paperlib().with_base_url(server.url());
    let lookup = CitationLookup::new(profile, fast_client());

    let result = lookup.lookup(&attention()).await.unwrap();
    assert_eq!(result, CitationResult::default());
}

#[tokio::test]
async fn test_not_found_status() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/metadata/citationcount")
        .match_query(Matcher::Any)
        .with_status(404)
        .create_async()
        .await;

    let profile = EndpointProfile::paperlib().with_base_url(server.url());
    let lookup = CitationLookup::new(profile, fast_client());

    let err = lookup.lookup(&attention()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_server_error_retried_once() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/metadata/citationcount")
        .match_query(Matcher::Any)
        .with_status(503)
        .expect(2)
        .create_async()
        .await;

    let client = HttpClient::with_timeout(Duration::from_secs(2)).with_retry(
        RetryConfig::default()
            .max_attempts(2)
            .delay(Duration::from_millis(10)),
    );
    let profile = EndpointProfile::paperlib().with_base_url(server.url());
    let lookup = CitationLookup::new(profile, Arc::new(client));

    let err = lookup.lookup(&attention()).await.unwrap_err();

    mock.assert_async().await;
    assert_eq!(err, LookupError::Status(503));
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_malformed_body_is_transport_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/metadata/citationcount")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>gateway hiccup</html>")
        .create_async()
        .await;

    let profile = EndpointProfile::paperlib().with_base_url(server.url());
    let lookup = CitationLookup::new(profile, fast_client());

    let err = lookup.lookup(&attention()).await.unwrap_err();
    assert!(matches!(err, LookupError::Parse(_)));
}

#[tokio::test]
async fn test_api_key_header_sent() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/paper/arXiv:1706.03762")
        .match_query(Matcher::Any)
        .match_header("x-api-key", "secret")
        .with_status(200)
        .with_body(
            r#"{"title": "Attention Is All You Need", "citationCount": 3, "influentialCitationCount": 1}"#,
        )
        .create_async()
        .await;

    let client = HttpClient::with_timeout(Duration::from_secs(2)).with_api_key(Some("secret".into()));
    let profile = EndpointProfile::semantic_scholar().with_base_url(server.url());
    let lookup = CitationLookup::new(profile, Arc::new(client));

    let result = lookup
        .lookup(&attention().with_arxiv("1706.03762v2"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.display_content(), "3 (1)");
}

#[tokio::test]
async fn test_api_key_not_sent_to_paperlib() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/metadata/citationcount")
        .match_query(Matcher::UrlEncoded("arxiv".into(), "1706.03762".into()))
        .match_header("x-api-key", Matcher::Missing)
        .with_status(200)
        .with_body(
            r#"{"title": "Attention Is All You Need", "citationCount": 3, "influentialCitationCount": 1}"#,
        )
        .create_async()
        .await;

    let mut config = Config::default();
    config.endpoint.base_url = Some(server.url());
    config.endpoint.api_key = Some("secret".into());

    let lookup = CitationLookup::new(
        config.endpoint.endpoint_profile(),
        Arc::new(HttpClient::for_endpoint(&config)),
    );
    let result = lookup
        .lookup(&attention().with_arxiv("1706.03762v2"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.display_content(), "3 (1)");
}

#[tokio::test]
async fn test_api_key_sent_to_configured_semantic_scholar() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/paper/arXiv:1706.03762")
        .match_query(Matcher::Any)
        .match_header("x-api-key", "secret")
        .with_status(200)
        .with_body(
            r#"{"title": "Attention Is All You Need", "citationCount": 4, "influentialCitationCount": 2}"#,
        )
        .create_async()
        .await;

    let mut config = Config::default();
    config.endpoint.profile = ProfileKind::SemanticScholar;
    config.endpoint.base_url = Some(server.url());
    config.endpoint.api_key = Some("secret".into());

    let lookup = CitationLookup::new(
        config.endpoint.endpoint_profile(),
        Arc::new(HttpClient::for_endpoint(&config)),
    );
    let result = lookup
        .lookup(&attention().with_arxiv("arXiv:1706.03762v5"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.display_content(), "4 (2)");
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error() {
    let profile = EndpointProfile::paperlib().with_base_url("http://127.0.0.1:1");
    let lookup = CitationLookup::new(profile, fast_client());

    let err = lookup.lookup(&attention()).await.unwrap_err();
    assert!(err.is_transport());
}

// ===== Extension lifecycle =====

struct Harness {
    selection: SelectionBus,
    fetcher: Arc<MockFetcher>,
    surface: Arc<MemorySurface>,
    preferences: Arc<MemoryPreferences>,
    profile: EndpointProfile,
}

impl Harness {
    fn new() -> Self {
        Self {
            selection: SelectionBus::new(),
            fetcher: Arc::new(MockFetcher::new()),
            surface: Arc::new(MemorySurface::new()),
            preferences: Arc::new(MemoryPreferences::new(Locale::English)),
            profile: EndpointProfile::paperlib(),
        }
    }

    fn context(&self) -> HostContext {
        HostContext {
            selection: self.selection.clone(),
            fetcher: self.fetcher.clone(),
            surface: self.surface.clone(),
            preferences: self.preferences.clone(),
        }
    }

    fn extension(&self) -> CitationCountExtension {
        CitationCountExtension::from_config(&Config::default())
    }

    fn url_for(&self, paper: &PaperIdentity) -> String {
        CitationLookup::new(self.profile.clone(), self.fetcher.clone()).query_url(paper)
    }

    fn contents(&self) -> Vec<String> {
        self.surface
            .updates()
            .into_iter()
            .map(|u| u.payload.content)
            .collect()
    }

    async fn wait_for_updates(&self, count: usize) {
        for _ in 0..200 {
            if self.surface.updates().len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "expected {} slot updates, got {:?}",
            count,
            self.surface.updates()
        );
    }
}

#[tokio::test]
async fn test_selection_shows_placeholder_then_result() {
    let harness = Harness::new();
    let paper = attention();
    harness.fetcher.respond(
        harness.url_for(&paper),
        json!({"data": [{"title": "Attention Is All You Need", "citationCount": 50000, "influentialCitationCount": 9000}]}),
    );

    let handle = harness.extension().start(harness.context());
    assert!(harness.preferences.is_registered(handle.id()));

    harness.selection.publish(vec![paper]);
    harness.wait_for_updates(2).await;

    let updates = harness.surface.updates();
    assert_eq!(updates[0].slot, SLOT);
    assert_eq!(updates[0].widget_id, WIDGET);
    assert_eq!(updates[0].payload.title, "Citation Count");
    assert_eq!(harness.contents(), vec!["N/A (N/A)", "50000 (9000)"]);

    handle.stop().await;
}

#[tokio::test]
async fn test_no_match_is_pushed_as_not_available() {
    let harness = Harness::new();
    let paper = attention();
    harness.fetcher.respond(
        harness.url_for(&paper),
        json!({"data": [{"title": "A Completely Different Paper", "citationCount": 10}]}),
    );

    let handle = harness.extension().start(harness.context());
    harness.selection.publish(vec![paper]);
    harness.wait_for_updates(2).await;
    handle.stop().await;

    assert_eq!(harness.contents(), vec!["N/A (N/A)", "N/A (N/A)"]);
}

#[tokio::test]
async fn test_failures_leave_placeholder() {
    let harness = Harness::new();
    let missing = PaperIdentity::new("Unknown Paper");
    let broken = PaperIdentity::new("Broken Paper");
    harness
        .fetcher
        .fail(harness.url_for(&broken), LookupError::Status(500));

    let handle = harness.extension().start(harness.context());
    harness.selection.publish(vec![missing.clone()]);
    harness.selection.publish(vec![broken.clone()]);
    harness.wait_for_updates(2).await;
    handle.stop().await;

    assert!(harness.fetcher.was_requested(&harness.url_for(&missing)));
    assert!(harness.fetcher.was_requested(&harness.url_for(&broken)));
    assert_eq!(harness.contents(), vec!["N/A (N/A)", "N/A (N/A)"]);
}

#[tokio::test]
async fn test_only_single_selection_triggers_lookup() {
    let harness = Harness::new();
    let handle = harness.extension().start(harness.context());

    let single = PaperIdentity::new("Single Paper");
    harness.fetcher.respond(
        harness.url_for(&single),
        json!({"title": "Single Paper", "citationCount": 1, "influentialCitationCount": 0}),
    );

    harness.selection.publish(vec![]);
    harness
        .selection
        .publish(vec![attention(), PaperIdentity::new("Another Paper")]);
    // delivered after the two above, so they have been handled by now
    harness.selection.publish(vec![single.clone()]);
    harness.wait_for_updates(2).await;
    handle.stop().await;

    assert_eq!(harness.fetcher.requests(), vec![harness.url_for(&single)]);
    assert_eq!(harness.contents(), vec!["N/A (N/A)", "1 (0)"]);
}

#[tokio::test]
async fn test_last_finished_lookup_wins() {
    let harness = Harness::new();
    let slow = PaperIdentity::new("Slow Paper");
    let fast = PaperIdentity::new("Fast Paper");
    harness.fetcher.respond_after(
        harness.url_for(&slow),
        json!({"title": "Slow Paper", "citationCount": 1, "influentialCitationCount": 1}),
        Duration::from_millis(200),
    );
    harness.fetcher.respond(
        harness.url_for(&fast),
        json!({"title": "Fast Paper", "citationCount": 2, "influentialCitationCount": 2}),
    );

    let handle = harness.extension().start(harness.context());
    harness.selection.publish(vec![slow]);
    harness.selection.publish(vec![fast]);
    harness.wait_for_updates(4).await;
    handle.stop().await;

    let contents = harness.contents();
    assert_eq!(contents[0], "N/A (N/A)");
    assert_eq!(contents[1], "N/A (N/A)");
    assert_eq!(contents[2], "2 (2)");
    assert_eq!(contents[3], "1 (1)");
    assert_eq!(harness.surface.current(SLOT, WIDGET).unwrap().content, "1 (1)");
}

#[tokio::test]
async fn test_locale_is_read_per_lookup() {
    let harness = Harness::new();
    harness.preferences.set_locale(Locale::SimplifiedChinese);

    let handle = harness.extension().start(harness.context());
    harness.selection.publish(vec![attention()]);
    harness.wait_for_updates(1).await;
    handle.stop().await;

    assert_eq!(harness.surface.updates()[0].payload.title, "引用次数");
}

#[tokio::test]
async fn test_stop_unsubscribes_and_unregisters() {
    let harness = Harness::new();
    let handle = harness.extension().start(harness.context());
    let id = handle.id().to_string();
    assert_eq!(harness.selection.listener_count(), 1);

    handle.stop().await;

    assert!(!harness.preferences.is_registered(&id));
    assert_eq!(harness.selection.listener_count(), 0);
    assert_eq!(harness.selection.publish(vec![attention()]), 0);
    assert!(harness.surface.updates().is_empty());
}

#[tokio::test]
async fn test_stop_waits_for_in_flight_lookup() {
    let harness = Harness::new();
    let paper = attention();
    harness.fetcher.respond_after(
        harness.url_for(&paper),
        json!({"title": "Attention Is All You Need", "citationCount": 7, "influentialCitationCount": 0}),
        Duration::from_millis(100),
    );

    let handle = harness.extension().start(harness.context());
    harness.selection.publish(vec![paper]);
    harness.wait_for_updates(1).await;
    handle.stop().await;

    assert_eq!(harness.contents(), vec!["N/A (N/A)", "7 (0)"]);
}
