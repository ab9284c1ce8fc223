//! Search service integration tests.

mod common;

use common::{docs, network_error, search_doc, FakeHttpClient};
use serde_json::json;
use shiurfeed::config::SearchConfig;
use shiurfeed::search::{SearchParams, SearchService};
use shiurfeed::upstream::SEARCH_URL;
use shiurfeed::{FeedError, HttpResponse};

fn params(q: &str, teacher: &str) -> SearchParams {
    SearchParams {
        q: q.to_string(),
        teacher: teacher.to_string(),
        category: String::new(),
    }
}

#[tokio::test]
async fn test_stops_on_empty_page() {
    let http = FakeHttpClient::new()
        .with_pages(vec![
            docs(vec![
                search_doc(1, "Daf Yomi 1", "Rabbi Yonason Reiss"),
                search_doc(2, "Parsha", "Rabbi Yonason Reiss"),
            ]),
            docs(vec![search_doc(3, "Daf Yomi 2", "Rabbi Yonason Reiss")]),
            docs(vec![]),
            docs(vec![search_doc(4, "Daf Yomi 3", "Rabbi Yonason Reiss")]),
        ])
        .shared();
    let service = SearchService::new(http.clone(), SearchConfig::default());

    let results = service.search(params("daf", "")).await.unwrap();

    let ids: Vec<_> = results.iter().map(|r| r.id.clone()).collect();
    assert_eq!(ids, vec![json!(1), json!(3)]);

    let calls = http.get_calls();
    assert_eq!(calls.len(), 3);
    let pages: Vec<_> = calls.iter().map(|c| c.param("page").unwrap()).collect();
    assert_eq!(pages, vec!["1", "2", "3"]);
    assert!(calls.iter().all(|c| c.url == SEARCH_URL));
    assert_eq!(calls[0].param("organizationID"), Some("301"));
    assert_eq!(calls[0].param("search_query"), Some("daf"));
}

#[tokio::test]
async fn test_teacher_only_filter() {
    let http = FakeHttpClient::new()
        .with_pages(vec![docs(vec![
            search_doc(1, "Daf Yomi", "Rabbi Yonason Reiss"),
            search_doc(2, "Daf Yomi", "Rabbi Hershel Schachter"),
            search_doc(3, "Parsha", "RABBI YONASON REISS"),
        ])])
        .shared();
    let service = SearchService::new(http.clone(), SearchConfig::default());

    let results = service.search(params("", "Reiss")).await.unwrap();

    let ids: Vec<_> = results.iter().map(|r| r.id.clone()).collect();
    assert_eq!(ids, vec![json!(1), json!(3)]);
    assert_eq!(results[1].teacher, "Rabbi Yonason Reiss");
    assert_eq!(http.get_calls()[0].param("search_query"), Some(""));
}

#[tokio::test]
async fn test_both_filters_must_match() {
    let http = FakeHttpClient::new()
        .with_pages(vec![docs(vec![
            search_doc(1, "Daf Yomi", "Rabbi Yonason Reiss"),
            search_doc(2, "Daf Yomi", "Rabbi Hershel Schachter"),
            search_doc(3, "Parsha", "Rabbi Yonason Reiss"),
        ])])
        .shared();
    let service = SearchService::new(http, SearchConfig::default());

    let results = service.search(params("DAF", "reiss")).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, json!(1));
}

#[tokio::test]
async fn test_projection() {
    let http = FakeHttpClient::new()
        .with_pages(vec![docs(vec![search_doc(7, "Daf Yomi", "rabbi yonason reiss")])])
        .shared();
    let service = SearchService::new(http, SearchConfig::default());

    let results = service.search(params("daf", "")).await.unwrap();
    let result = &results[0];

    assert_eq!(result.title.as_deref(), Some("Daf Yomi"));
    assert_eq!(result.teacher, "Rabbi Yonason Reiss");
    assert_eq!(result.categories, "Gemara");
    assert_eq!(result.series, "Daf Yomi");
    assert_eq!(result.duration, "29 min");
    assert_eq!(
        result.download_url.as_deref(),
        Some("https://download.yutorah.org/7.mp3")
    );
    assert_eq!(
        result.player_url.as_deref(),
        Some("https://www.yutorah.org/lectures/7")
    );
    assert_eq!(
        result.image.as_deref(),
        Some("https://www.yutorah.org/photos/teacher.jpg")
    );
}

#[tokio::test]
async fn test_stops_on_missing_envelope() {
    let http = FakeHttpClient::new()
        .with_pages(vec![
            docs(vec![search_doc(1, "Daf Yomi", "Reiss")]),
            json!({"unexpected": true}),
            docs(vec![search_doc(2, "Daf Yomi", "Reiss")]),
        ])
        .shared();
    let service = SearchService::new(http.clone(), SearchConfig::default());

    let results = service.search(params("daf", "")).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(http.get_calls().len(), 2);
}

#[tokio::test]
async fn test_stops_at_result_cap() {
    let page = docs((1..=3).map(|i| search_doc(i, "Daf Yomi", "Reiss")).collect());
    let http = FakeHttpClient::new()
        .with_pages(vec![page.clone(), page.clone(), page])
        .shared();
    let config = SearchConfig {
        max_results: 4,
        ..SearchConfig::default()
    };
    let service = SearchService::new(http.clone(), config);

    let results = service.search(params("daf", "")).await.unwrap();

    assert_eq!(results.len(), 4);
    assert_eq!(http.get_calls().len(), 2);
}

#[tokio::test]
async fn test_stops_at_page_cap() {
    let http = FakeHttpClient::new()
        .on_get(|_, _| Ok(HttpResponse::ok(docs(vec![search_doc(1, "Daf", "Reiss")]).to_string())))
        .shared();
    let config = SearchConfig {
        max_pages: 5,
        ..SearchConfig::default()
    };
    let service = SearchService::new(http.clone(), config);

    let results = service.search(params("daf", "")).await.unwrap();

    assert_eq!(results.len(), 5);
    assert_eq!(http.get_calls().len(), 5);
}

#[tokio::test]
async fn test_upstream_status_aborts_search() {
    let http = FakeHttpClient::new()
        .on_get(|_, query| {
            let page = query.iter().find(|(k, _)| k == "page").map(|(_, v)| v.as_str());
            if page == Some("2") {
                Ok(HttpResponse::with_status(502))
            } else {
                Ok(HttpResponse::ok(docs(vec![search_doc(1, "Daf", "Reiss")]).to_string()))
            }
        })
        .shared();
    let service = SearchService::new(http.clone(), SearchConfig::default());

    let result = service.search(params("daf", "")).await;

    assert!(matches!(result, Err(FeedError::Upstream { status: 502 })));
    assert_eq!(http.get_calls().len(), 2);
}

#[tokio::test]
async fn test_transport_error_aborts_search() {
    let http = FakeHttpClient::new()
        .on_get(|_, _| Err(network_error()))
        .shared();
    let service = SearchService::new(http, SearchConfig::default());

    let result = service.search(params("", "reiss")).await;

    assert!(matches!(result, Err(FeedError::Http(_))));
}

#[tokio::test]
async fn test_missing_filters_make_no_requests() {
    let http = FakeHttpClient::new().shared();
    let service = SearchService::new(http.clone(), SearchConfig::default());

    let result = service.search(params("  ", "")).await;

    assert!(matches!(result, Err(FeedError::Validation(_))));
    assert!(http.calls().is_empty());
}
