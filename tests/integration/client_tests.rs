use serde_json::json;
use timeline_harvester::config::ApiConfig;
use timeline_harvester::harvest::{ApiClient, ApiError, TimelineSource};
use timeline_harvester::records::Category;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, token: Option<&str>) -> ApiClient {
    let mut config = ApiConfig::new(server.uri());
    config.user_agent = "harvester-tests/1.0".to_string();
    config.request_timeout = 5.0;
    ApiClient::with_token(&config, token).expect("client builds")
}

#[tokio::test]
async fn profile_lookup_sends_token_and_decodes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/by/username/alice"))
        .and(header("authorization", "Bearer secret"))
        .and(header("user-agent", "harvester-tests/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "101",
            "screen_name": "alice",
            "followers_count": 42,
            "location": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let profile = client(&server, Some("secret"))
        .fetch_profile("alice")
        .await
        .expect("profile decodes");

    assert_eq!(profile.internal_id().as_deref(), Some("101"));
    assert_eq!(profile.followers_count, Some(json!(42)));
    assert_eq!(profile.location, Some(serde_json::Value::Null));
    assert_eq!(profile.description, None);
}

#[tokio::test]
async fn page_request_carries_count_and_cursor() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/101/highlights"))
        .and(query_param("count", "20"))
        .and(query_param("cursor", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "1", "full_text": "one"}, {"id": "2", "full_text": "two"}],
            "next_cursor": "def"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client(&server, None)
        .fetch_page("101", Category::Secondary, 20, Some("abc"))
        .await
        .expect("page decodes");

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.cursor(), Some("def"));
    assert!(!page.is_last());
}

#[tokio::test]
async fn final_page_without_cursor() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/101/tweets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "1"}],
            "next_cursor": null
        })))
        .mount(&server)
        .await;

    let page = client(&server, None)
        .fetch_page("101", Category::Primary, 200, None)
        .await
        .expect("page decodes");

    assert!(page.is_last());
}

#[tokio::test]
async fn status_codes_are_classified() {
    let cases: [(u16, fn(&ApiError) -> bool); 6] = [
        (429, |e| matches!(e, ApiError::RateLimited)),
        (420, |e| matches!(e, ApiError::RateLimited)),
        (404, |e| matches!(e, ApiError::NotFound(_))),
        (403, |e| matches!(e, ApiError::Suspended(_))),
        (410, |e| matches!(e, ApiError::Unavailable(_))),
        (503, |e| matches!(e, ApiError::Transport(_))),
    ];

    for (status, check) in cases {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let err = client(&server, None)
            .fetch_profile("someone")
            .await
            .expect_err("non-success status");
        assert!(check(&err), "HTTP {} mapped to {:?}", status, err);
    }
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/101/tweets"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client(&server, None)
        .fetch_page("101", Category::Primary, 10, None)
        .await
        .expect_err("body is not JSON");
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn refused_connection_is_transport_error() {
    let mut config = ApiConfig::new("http://127.0.0.1:1");
    config.request_timeout = 2.0;
    let client = ApiClient::with_token(&config, None).expect("client builds");

    let err = client
        .fetch_profile("alice")
        .await
        .expect_err("nothing listens on port 1");
    assert!(matches!(err, ApiError::Transport(_)));
}
