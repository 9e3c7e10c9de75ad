//! Drives the real HTTP client against a mock OpenWeather endpoint and
//! stores into an in-memory document store.

use serde_json::json;
use std::time::Duration;
use weather_scraper::{
    weather, Config, Event, MemoryStore, OpenWeatherClient, Outcome, Poller, Reporter,
    StoreType, COLLECTION, DATABASE,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WEATHER_PATH: &str = "/data/2.5/weather";

fn test_config(base: &str) -> Config {
    Config {
        url_weather_current: format!("{}{}", base, WEATHER_PATH),
        lat: "10.0".to_string(),
        lon: "20.0".to_string(),
        api_key_current: "k".to_string(),
        uri: "mem://test".to_string(),
        poll_interval: Duration::from_secs(20 * 60),
        request_timeout: Some(Duration::from_secs(5)),
    }
}

#[derive(Default)]
struct Recorder(Vec<String>);

impl Reporter for Recorder {
    fn report(&mut self, event: Event<'_>) {
        self.0.push(event.to_string());
    }
}

/// Run one cycle on a blocking thread; ureq must not run on the async runtime.
async fn run_cycle(
    config: Config,
    store: MemoryStore,
) -> (Result<Outcome, weather_scraper::Error>, Vec<String>) {
    tokio::task::spawn_blocking(move || {
        let mut poller = Poller::new(OpenWeatherClient::new(&config), store, Recorder::default());
        let result = poller.run_cycle();
        (result, poller.into_reporter().0)
    })
    .await
    .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_end_to_end_inserts_reading() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .and(query_param("lat", "10.0"))
        .and(query_param("lon", "20.0"))
        .and(query_param("appid", "k"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"dt": 1000, "temp": 15.2})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri());
    let store = match StoreType::from_uri(&config.uri).unwrap() {
        StoreType::Memory(store) => store,
        StoreType::Mongo(_) => panic!("mem:// should select the in-memory store"),
    };

    let (result, messages) = run_cycle(config, store.clone()).await;

    assert_eq!(result.unwrap(), Outcome::Inserted);
    assert_eq!(
        store.documents(DATABASE, COLLECTION).unwrap(),
        vec![json!({"dt": 1000, "temp": 15.2})]
    );
    assert_eq!(messages.last().unwrap(), "Data inserted successfully (dt=1000, 1970-01-01 00:16:40 UTC)");
    assert_eq!(store.open_connections().unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_same_reading_twice_is_not_duplicated() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"dt": 1000, "temp": 15.2})))
        .expect(2)
        .mount(&mock_server)
        .await;

    let store = MemoryStore::new();

    let (first, _) = run_cycle(test_config(&mock_server.uri()), store.clone()).await;
    let (second, messages) = run_cycle(test_config(&mock_server.uri()), store.clone()).await;

    assert_eq!(first.unwrap(), Outcome::Inserted);
    assert_eq!(second.unwrap(), Outcome::StoreFailed);
    assert!(messages.last().unwrap().starts_with("Reading already stored: duplicate key"));
    assert_eq!(store.documents(DATABASE, COLLECTION).unwrap().len(), 1);
    assert_eq!(store.indexes(DATABASE, COLLECTION).unwrap(), vec!["dt_-1"]);
    assert_eq!(store.open_connections().unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_error_status_with_json_body_is_still_stored() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"cod": 401, "message": "Invalid API key"})),
        )
        .mount(&mock_server)
        .await;

    let store = MemoryStore::new();
    let (result, messages) = run_cycle(test_config(&mock_server.uri()), store.clone()).await;

    assert_eq!(result.unwrap(), Outcome::Inserted);
    assert_eq!(messages[0], "Failed to get data: 401");
    assert_eq!(
        store.documents(DATABASE, COLLECTION).unwrap(),
        vec![json!({"cod": 401, "message": "Invalid API key"})]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_json_never_reaches_store() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&mock_server)
        .await;

    let store = MemoryStore::new();
    let (result, messages) = run_cycle(test_config(&mock_server.uri()), store.clone()).await;

    let err = result.unwrap_err();
    match err.kind() {
        weather_scraper::ErrorKind::Weather(e) => {
            assert!(matches!(e.kind(), weather::ErrorKind::JSONParse(_)))
        }
        other => panic!("unexpected error kind: {:?}", other),
    }
    assert_eq!(
        messages,
        vec!["Failed to get data: 502", "Parsing response text"]
    );
    assert_eq!(store.connections_opened().unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_exactly_one_request_per_cycle() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"dt": 1})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (result, _) = run_cycle(test_config(&mock_server.uri()), MemoryStore::new()).await;

    assert_eq!(result.unwrap(), Outcome::Inserted);
    // `expect(1)` is verified when the server is dropped.
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_api_is_fatal() {
    // Bind and release a port so nothing is listening on it.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let config = test_config(&format!("http://127.0.0.1:{}", port));
    let store = MemoryStore::new();

    let (result, messages) = run_cycle(config, store.clone()).await;

    let err = result.unwrap_err();
    match err.kind() {
        weather_scraper::ErrorKind::Weather(e) => {
            assert!(matches!(e.kind(), weather::ErrorKind::Transport(_)))
        }
        other => panic!("unexpected error kind: {:?}", other),
    }
    assert!(messages.is_empty());
    assert_eq!(store.connections_opened().unwrap(), 0);
}
