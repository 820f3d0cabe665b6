//! OpenWeather source and service behaviour against a mock HTTP server.

use std::time::Duration;

use chrono::Utc;
use citycast_core::{
    ApiSettings, CompassDirection, LookupError, OpenWeatherClient, TransportError,
    WeatherService, WeatherSource,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn current_response() -> serde_json::Value {
    serde_json::json!({
        "coord": { "lon": 10.7461, "lat": 59.9127 },
        "weather": [{ "id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04n" }],
        "main": {
            "temp": -1.23,
            "feels_like": -5.67,
            "temp_min": -2.0,
            "temp_max": 0.45,
            "pressure": 1021,
            "humidity": 86
        },
        "visibility": 10000,
        "wind": { "speed": 3.6, "deg": 200 },
        "clouds": { "all": 75 },
        "dt": 1705312800,
        "sys": { "country": "NO", "sunrise": 1705303560, "sunset": 1705328760 },
        "timezone": 3600,
        "name": "Oslo",
        "cod": 200
    })
}

fn forecast_response() -> serde_json::Value {
    let sample = |dt: i64, temp: f64| {
        serde_json::json!({
            "dt": dt,
            "main": { "temp": temp, "temp_min": temp - 1.0, "temp_max": temp + 1.0, "humidity": 80 },
            "weather": [{ "main": "Snow", "description": "light snow", "icon": "13d" }],
            "wind": { "speed": 2.0 },
            "pop": 0.35
        })
    };

    serde_json::json!({
        "cod": "200",
        "message": 0,
        "cnt": 3,
        "list": [
            sample(1705312800, -1.0),
            sample(1705323600, -3.0),
            sample(1705399200, 0.5)
        ],
        "city": { "name": "Oslo", "country": "NO" }
    })
}

fn create_test_client(mock_server: &MockServer, timeout_secs: u64) -> OpenWeatherClient {
    let settings = ApiSettings {
        base_url: mock_server.uri(),
        timeout_secs,
    };
    OpenWeatherClient::new("TEST_KEY".to_string(), &settings).expect("Failed to create client")
}

async fn mount(mock_server: &MockServer, endpoint: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .and(query_param("appid", "TEST_KEY"))
        .and(query_param("units", "metric"))
        .respond_with(response)
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn current_weather_success() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Oslo"))
        .and(query_param("appid", "TEST_KEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_response()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = WeatherService::new(create_test_client(&mock_server, 5)).with_time_zone(Utc);
    let weather = service.current("  Oslo ").await.expect("lookup should succeed");

    assert_eq!(weather.city, "Oslo");
    assert_eq!(weather.country_code, "NO");
    assert_eq!(weather.temperature, -1.2);
    assert_eq!(weather.feels_like, -5.7);
    assert_eq!(weather.description, "Broken Clouds");
    assert_eq!(weather.wind_direction, CompassDirection::Ssw);
    assert_eq!(weather.sunrise_local, "07:26 AM");
    assert_eq!(weather.sunset_local, "02:26 PM");
}

#[tokio::test]
async fn forecast_success() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        "/forecast",
        ResponseTemplate::new(200).set_body_json(forecast_response()),
    )
    .await;

    let service = WeatherService::new(create_test_client(&mock_server, 5)).with_time_zone(Utc);
    let days = service.forecast("Oslo").await.expect("forecast should succeed");

    assert_eq!(days.len(), 2);
    assert_eq!(days[0].day_name, "Monday");
    assert_eq!(days[0].temp, -1.0);
    assert_eq!(days[0].temp_max, 0.0);
    assert_eq!(days[0].temp_min, -4.0);
    assert_eq!(days[0].rain_chance_percent, 35);
    assert_eq!(days[1].day_name, "Tuesday");
}

#[tokio::test]
async fn not_found_body_on_http_404_is_not_found() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        "/weather",
        ResponseTemplate::new(404)
            .set_body_json(serde_json::json!({ "cod": "404", "message": "city not found" })),
    )
    .await;

    let service = WeatherService::new(create_test_client(&mock_server, 5));
    assert_eq!(service.current("Atlantis").await, Err(LookupError::NotFound));
}

#[tokio::test]
async fn server_error_is_http_transport_error() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        "/weather",
        ResponseTemplate::new(500).set_body_string("upstream exploded"),
    )
    .await;

    let client = create_test_client(&mock_server, 5);
    let err = client.fetch_current("Oslo").await.unwrap_err();
    assert_eq!(
        err,
        TransportError::Http {
            status: 500,
            body: "upstream exploded".to_string()
        }
    );
}

#[tokio::test]
async fn slow_provider_times_out() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        "/weather",
        ResponseTemplate::new(200)
            .set_body_json(current_response())
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    let client = create_test_client(&mock_server, 1);
    assert_eq!(
        client.fetch_current("Oslo").await,
        Err(TransportError::Timeout)
    );
}

#[tokio::test]
async fn unreachable_provider_is_network_error() {
    let settings = ApiSettings {
        base_url: "http://127.0.0.1:1".to_string(),
        timeout_secs: 5,
    };
    let client = OpenWeatherClient::new("TEST_KEY".to_string(), &settings).unwrap();

    let err = client.fetch_forecast("Oslo").await.unwrap_err();
    assert!(matches!(err, TransportError::Network(_)), "got {err:?}");
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        "/weather",
        ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"),
    )
    .await;

    let service = WeatherService::new(create_test_client(&mock_server, 5));
    assert!(matches!(
        service.current("Oslo").await,
        Err(LookupError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn lookup_survives_forecast_outage() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        "/weather",
        ResponseTemplate::new(200).set_body_json(current_response()),
    )
    .await;
    mount(&mock_server, "/forecast", ResponseTemplate::new(503)).await;

    let service = WeatherService::new(create_test_client(&mock_server, 5)).with_time_zone(Utc);
    let report = service.lookup("Oslo").await.expect("current weather should carry the report");

    assert_eq!(report.weather.city, "Oslo");
    assert!(report.forecast.is_empty());
}
