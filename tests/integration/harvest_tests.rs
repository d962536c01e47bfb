use rusqlite::Connection;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use timeline_harvester::config::{parse_config, Config};
use timeline_harvester::harvest::{run_batch, ApiClient, HarvestSettings};
use timeline_harvester::output::{open_sinks, write_all};
use timeline_harvester::state::EntityState;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server with tiny delays
fn create_test_config(base_url: &str, dir: &Path) -> Config {
    parse_config(&format!(
        r#"
[api]
base-url = "{base}"
request-timeout = 5

[harvest]
max-retries = 3
page-size = 2
primary-limit = 3
secondary-limit = 5

[backoff]
initial-wait = 0.01
factor = 2.5
jitter = 0
max-wait = 1

[pacing]
page-delay-min = 0
page-delay-max = 0.01
entity-delay-min = 0
entity-delay-max = 0.01

[output]
json-path = "{json}"
database-path = "{db}"
"#,
        base = base_url,
        json = dir.join("harvest.json").display(),
        db = dir.join("harvest.db").display(),
    ))
    .expect("test config is valid")
}

fn profile(id: &str, name: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": id,
        "screen_name": name,
        "followers_count": 5
    }))
}

fn page(ids: &[&str], cursor: Option<&str>) -> ResponseTemplate {
    let items: Vec<Value> = ids
        .iter()
        .map(|id| json!({"id": id, "full_text": format!("post {}", id)}))
        .collect();
    ResponseTemplate::new(200).set_body_json(json!({"items": items, "next_cursor": cursor}))
}

async fn mount_api(server: &MockServer) {
    // alice: two primary pages (cut to the limit of 3), one highlight page
    Mock::given(method("GET"))
        .and(path("/users/by/username/alice"))
        .respond_with(profile("1", "alice"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/1/tweets"))
        .and(query_param("cursor", "c1"))
        .respond_with(page(&["a3", "a4"], Some("c2")))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/1/tweets"))
        .respond_with(page(&["a1", "a2"], Some("c1")))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/1/highlights"))
        .respond_with(page(&["h1"], None))
        .mount(server)
        .await;

    // ghost: does not exist
    Mock::given(method("GET"))
        .and(path("/users/by/username/ghost"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;

    // bob: rate limited twice, then resolves with no content
    Mock::given(method("GET"))
        .and(path("/users/by/username/bob"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/by/username/bob"))
        .respond_with(profile("2", "bob"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/2/tweets"))
        .respond_with(page(&[], None))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/2/highlights"))
        .respond_with(page(&[], None))
        .mount(server)
        .await;
}

fn entities(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

#[tokio::test]
async fn full_run_exports_json_and_sqlite() {
    let server = MockServer::start().await;
    mount_api(&server).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    let mut sinks = open_sinks(&config.output, "test-hash").unwrap();
    let client = ApiClient::with_token(&config.api, Some("token")).unwrap();

    let (dataset, report) = run_batch(
        Arc::new(client),
        HarvestSettings::from_config(&config),
        &entities(&["alice", "ghost", "bob"]),
        CancellationToken::new(),
    )
    .await
    .expect("run completes");

    assert!(!report.interrupted);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.outcome("ghost").unwrap().state, EntityState::Skipped);
    assert_eq!(report.outcome("bob").unwrap().retries, 2);

    write_all(&mut sinks, &dataset, &report).unwrap();

    let document: Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("harvest.json")).unwrap())
            .unwrap();
    let users = document["users"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["screen_name"], "alice");
    assert_eq!(users[1]["screen_name"], "bob");
    assert_eq!(users[0]["description"], "N/A");

    let tweets: Vec<&str> = document["tweets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["tweet_id"].as_str().unwrap())
        .collect();
    assert_eq!(tweets, vec!["a1", "a2", "a3"]);
    assert_eq!(document["highlight_tweets"][0]["user_id"], "1");

    let conn = rusqlite_connection(&dir.path().join("harvest.db"));
    let tweet_rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM tweets", [], |row| row.get(0))
        .unwrap();
    assert_eq!(tweet_rows, 3);
    let (status, hash): (String, String) = conn
        .query_row("SELECT status, config_hash FROM runs", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .unwrap();
    assert_eq!(status, "completed");
    assert_eq!(hash, "test-hash");
}

#[tokio::test]
async fn cancelled_run_still_exports() {
    let server = MockServer::start().await;
    mount_api(&server).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    let mut sinks = open_sinks(&config.output, "test-hash").unwrap();
    let client = ApiClient::with_token(&config.api, None).unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();

    let (dataset, report) = run_batch(
        Arc::new(client),
        HarvestSettings::from_config(&config),
        &entities(&["alice", "bob"]),
        cancel,
    )
    .await
    .expect("interrupted runs still return a report");

    assert!(report.interrupted);
    assert_eq!(report.unprocessed(), 2);
    assert!(dataset.is_empty());

    write_all(&mut sinks, &dataset, &report).unwrap();

    let document: Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("harvest.json")).unwrap())
            .unwrap();
    assert_eq!(document, json!({"users": [], "tweets": [], "highlight_tweets": []}));

    let conn = rusqlite_connection(&dir.path().join("harvest.db"));
    let status: String = conn
        .query_row("SELECT status FROM runs", [], |row| row.get(0))
        .unwrap();
    assert_eq!(status, "interrupted");
}

#[tokio::test]
async fn persistent_rate_limit_fails_only_that_entity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/by/username/stuck"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;
    mount_api(&server).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    let client = ApiClient::with_token(&config.api, None).unwrap();

    let (dataset, report) = run_batch(
        Arc::new(client),
        HarvestSettings::from_config(&config),
        &entities(&["stuck", "alice"]),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.outcome("stuck").unwrap().state, EntityState::Failed);
    assert_eq!(report.outcome("alice").unwrap().state, EntityState::Succeeded);
    assert_eq!(dataset.users().len(), 1);
}

fn rusqlite_connection(path: &Path) -> Connection {
    Connection::open(path).expect("database was written")
}
