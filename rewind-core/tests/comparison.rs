//! End-to-end comparison against mocked upstream services.

use chrono::{Datelike, Local};
use rewind_core::{
    ComparisonService, Config, LocationQuery, ProviderId, RewindError, build_frame, build_path,
    chart::{DEFAULT_HEIGHT, DEFAULT_WIDTH, Padding},
    history::years_before,
    locate,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> Config {
    let mut cfg = Config::default();
    cfg.upsert_provider_api_key(ProviderId::OpenWeather, "owm".into());
    cfg.endpoints.openweather = server.uri();
    cfg.endpoints.open_meteo_archive = server.uri();
    cfg.endpoints.gemini = server.uri();
    cfg.history.timeout_secs = 5;
    cfg
}

fn berlin() -> LocationQuery {
    LocationQuery {
        name: "Berlin".into(),
        country: "DE".into(),
        state: Some("Berlin".into()),
        lat: 52.52,
        lon: 13.405,
    }
}

async fn mount_current(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "main": {"temp": 9.5, "humidity": 71},
            "weather": [{"id": 800}],
            "wind": {"speed": 3.0}
        })))
        .mount(server)
        .await;
}

async fn mount_archive(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/archive"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "daily": {
                "time": ["2000-01-01"],
                "weather_code": [3],
                "temperature_2m_max": [8.0],
                "relative_humidity_2m_mean": [75],
                "wind_speed_10m_max": [15.0]
            }
        })))
        .mount(server)
        .await;
}

async fn fail_years_ago(server: &MockServer, years_ago: u32) {
    let date = years_before(Local::now().date_naive(), years_ago).unwrap();
    Mock::given(method("GET"))
        .and(path("/v1/archive"))
        .and(query_param("start_date", date.format("%Y-%m-%d").to_string()))
        .respond_with(ResponseTemplate::new(500).set_body_string("archive hiccup"))
        .with_priority(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_partial_history_is_accepted() {
    let mock_server = MockServer::start().await;
    mount_current(&mock_server).await;
    for years_ago in [2, 9, 17] {
        fail_years_ago(&mock_server, years_ago).await;
    }
    mount_archive(&mock_server).await;

    let svc = ComparisonService::from_config(&config_for(&mock_server)).unwrap();
    let cmp = svc.compare(svc.begin(), &berlin()).await.unwrap();

    let this_year = Local::now().year();
    assert_eq!(cmp.today.year, this_year);
    assert_eq!(cmp.today.temperature, 10.0);
    assert_eq!(cmp.today.wind_speed, 11.0);

    assert_eq!(cmp.history.len(), 17);
    let years: Vec<i32> = cmp.history.iter().map(|r| r.year).collect();
    assert!(years.windows(2).all(|w| w[0] < w[1]));
    assert!(!years.contains(&(this_year - 9)));
    assert_eq!(years.first(), Some(&(this_year - 20)));
    assert_eq!(years.last(), Some(&(this_year - 1)));

    // the chart pipeline accepts the gappy series
    let frame = build_frame(
        &cmp.history,
        DEFAULT_WIDTH,
        DEFAULT_HEIGHT,
        Padding::default(),
    );
    assert_eq!(frame.min_temp, 3.0);
    assert_eq!(frame.max_temp, 13.0);
    assert_eq!(build_path(&frame, &cmp.history).points.len(), 17);
    let hovered = locate(&cmp.history, &frame, frame.x_scale(f64::from(this_year - 9)))
        .expect("a year near the gap");
    assert!(hovered.year == this_year - 10 || hovered.year == this_year - 8);
}

#[tokio::test]
async fn test_today_failure_aborts_comparison() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
        .mount(&mock_server)
        .await;
    mount_archive(&mock_server).await;

    let svc = ComparisonService::from_config(&config_for(&mock_server)).unwrap();
    let err = svc.compare(svc.begin(), &berlin()).await.unwrap_err();

    assert!(matches!(err, RewindError::MandatoryFetch(_)));
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn test_no_history_aborts_comparison() {
    let mock_server = MockServer::start().await;
    mount_current(&mock_server).await;
    Mock::given(method("GET"))
        .and(path("/v1/archive"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let svc = ComparisonService::from_config(&config_for(&mock_server)).unwrap();
    let err = svc.compare(svc.begin(), &berlin()).await.unwrap_err();

    assert!(matches!(err, RewindError::InsufficientHistory));
}

#[tokio::test]
async fn test_summary_not_configured_without_key() {
    let mock_server = MockServer::start().await;
    mount_current(&mock_server).await;
    mount_archive(&mock_server).await;

    let svc = ComparisonService::from_config(&config_for(&mock_server)).unwrap();
    assert!(!svc.has_summarizer());

    let cmp = svc.compare(svc.begin(), &berlin()).await.unwrap();
    let err = svc.summarize(&cmp).await.unwrap_err();
    assert!(err.is_summary_only());
}
