//! Search client behavior against a mock API, including token refresh.

use chrono::{Duration, TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use youtube_digest::auth::{OauthClient, StoredToken, TokenStore};
use youtube_digest::youtube::{SearchClient, SearchParams};

fn oauth_for(server: &MockServer) -> OauthClient {
    OauthClient::with_endpoints(
        "client-id".to_string(),
        "client-secret".to_string(),
        format!("{}/auth", server.uri()),
        format!("{}/token", server.uri()),
    )
    .unwrap()
}

fn valid_token() -> StoredToken {
    StoredToken {
        access_token: "ya29.valid".to_string(),
        refresh_token: Some("1//refresh".to_string()),
        expires_at: Some(Utc::now() + Duration::hours(1)),
        token_type: "Bearer".to_string(),
    }
}

fn search_body(ids: &[&str]) -> serde_json::Value {
    json!({
        "items": ids.iter().map(|id| json!({
            "id": { "kind": "youtube#video", "videoId": id },
            "snippet": {
                "publishedAt": "2024-06-09T15:04:05Z",
                "channelId": "UC-1",
                "channelTitle": "Channel",
                "title": format!("Video {id}"),
                "description": "desc",
                "thumbnails": {
                    "medium": { "url": format!("https://img.example/{id}.jpg") }
                }
            }
        })).collect::<Vec<_>>()
    })
}

#[tokio::test]
async fn search_sends_expected_query_parameters() {
    let server = MockServer::start().await;
    let since = Utc.with_ymd_and_hms(2024, 6, 8, 12, 0, 0).unwrap();

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(header("authorization", "Bearer ya29.valid"))
        .and(query_param("part", "snippet"))
        .and(query_param("order", "date"))
        .and(query_param("publishedAfter", "2024-06-08T12:00:00Z"))
        .and(query_param("q", "emacs"))
        .and(query_param("type", "video"))
        .and(query_param("maxResults", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(&["vid1", "vid2"])))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path());
    let oauth = oauth_for(&server);
    let client =
        SearchClient::with_endpoint(&oauth, &store, format!("{}/search", server.uri())).unwrap();

    let items = client
        .search(&valid_token(), since, &SearchParams::default())
        .await
        .unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id.video_id, "vid1");
    assert_eq!(items[0].watch_url(), "https://youtube.com/watch?v=vid1");
}

#[tokio::test]
async fn empty_result_set_is_not_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(&[])))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path());
    let oauth = oauth_for(&server);
    let client =
        SearchClient::with_endpoint(&oauth, &store, format!("{}/search", server.uri())).unwrap();

    let items = client
        .search(&valid_token(), Utc::now(), &SearchParams::default())
        .await
        .unwrap();

    assert!(items.is_empty());
}

#[tokio::test]
async fn expired_token_is_refreshed_and_persisted_before_search() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=1%2F%2Frefresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.refreshed",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(header("authorization", "Bearer ya29.refreshed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(&["vid1"])))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path());
    let oauth = oauth_for(&server);
    let client =
        SearchClient::with_endpoint(&oauth, &store, format!("{}/search", server.uri())).unwrap();

    let mut token = valid_token();
    token.access_token = "ya29.stale".to_string();
    token.expires_at = Some(Utc::now() - Duration::minutes(5));

    let items = client
        .search(&token, Utc::now(), &SearchParams::default())
        .await
        .unwrap();

    assert_eq!(items.len(), 1);

    // The refreshed token was written back, keeping the old refresh token
    let persisted = store.load().unwrap();
    assert_eq!(persisted.access_token, "ya29.refreshed");
    assert_eq!(persisted.refresh_token.as_deref(), Some("1//refresh"));
}

#[tokio::test]
async fn unauthorized_response_triggers_one_refresh_and_retry() {
    let server = MockServer::start().await;

    // The provider rejects the still-unexpired token once
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(header("authorization", "Bearer ya29.valid"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.retried",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(header("authorization", "Bearer ya29.retried"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(&["vid9"])))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path());
    let oauth = oauth_for(&server);
    let client =
        SearchClient::with_endpoint(&oauth, &store, format!("{}/search", server.uri())).unwrap();

    let items = client
        .search(&valid_token(), Utc::now(), &SearchParams::default())
        .await
        .unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id.video_id, "vid9");
    assert_eq!(store.load().unwrap().access_token, "ya29.retried");
}

#[tokio::test]
async fn server_error_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path());
    let oauth = oauth_for(&server);
    let client =
        SearchClient::with_endpoint(&oauth, &store, format!("{}/search", server.uri())).unwrap();

    let err = client
        .search(&valid_token(), Utc::now(), &SearchParams::default())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("search request failed"));
}
