//! End-to-end pipeline tests: mock forecast endpoint, real classifier,
//! in-memory store.

use std::{sync::Arc, time::Duration};

use temperature_core::{
    Coordinates, EmbeddedSink, RecordSet, Scraper, TemperatureError, TemperatureService,
    ThresholdClassifier, provider::open_meteo::OpenMeteoProvider,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    server: MockServer,
    sink: EmbeddedSink,
    scraper: Scraper,
}

impl Harness {
    async fn new() -> Self {
        let server = MockServer::start().await;
        let sink = EmbeddedSink::open_in_memory().unwrap();
        let provider =
            OpenMeteoProvider::new(format!("{}/v1/forecast", server.uri()), Duration::from_secs(5))
                .unwrap();
        let scraper = Scraper::new(
            Arc::new(provider),
            Arc::new(ThresholdClassifier::default()),
            Arc::new(sink.clone()),
        );
        Self { server, sink, scraper }
    }

    async fn respond(&self, status: u16, body: serde_json::Value, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    fn counts(&self) -> (u64, u64, u64) {
        (
            self.sink.count(RecordSet::Success).unwrap(),
            self.sink.count(RecordSet::Alert).unwrap(),
            self.sink.count(RecordSet::Error).unwrap(),
        )
    }
}

fn forecast(latitude: f64, longitude: f64, temperature: f64) -> serde_json::Value {
    serde_json::json!({
        "latitude": latitude,
        "longitude": longitude,
        "current_weather": { "temperature": temperature }
    })
}

#[tokio::test]
async fn out_of_range_makes_no_network_or_store_calls() {
    let h = Harness::new().await;
    h.respond(200, forecast(0.0, 0.0, 20.0), 0).await;

    for coords in [
        Coordinates::new(100.01, 0.0),
        Coordinates::new(-101.0, 0.0),
        Coordinates::new(0.0, 200.5),
        Coordinates::new(0.0, -250.0),
    ] {
        let err = h.scraper.list_temperature(coords).await.unwrap_err();
        assert!(matches!(err, TemperatureError::OutOfRange { .. }), "got {err:?}");
    }

    assert_eq!(h.counts(), (0, 0, 0));
    h.server.verify().await;
}

#[tokio::test]
async fn comfortable_reading_is_one_success_record() {
    let h = Harness::new().await;
    h.respond(200, forecast(38.7, -9.1, 25.0), 1).await;

    let echo = h.scraper.list_temperature(Coordinates::new(38.7, -9.1)).await.unwrap();

    assert_eq!(echo.temperature, 25.0);
    assert!(!echo.alert);
    assert!(!echo.error);
    assert_eq!(h.counts(), (1, 0, 0));
}

#[tokio::test]
async fn cold_reading_is_recorded_as_success_and_alert() {
    let h = Harness::new().await;
    h.respond(200, forecast(64.1, -21.9, 5.0), 1).await;

    let echo = h.scraper.list_temperature(Coordinates::new(64.1, -21.9)).await.unwrap();

    assert!(echo.alert);
    assert!(!echo.error);
    assert_eq!(h.counts(), (1, 1, 0));
}

#[tokio::test]
async fn threshold_values_do_not_alert() {
    let h = Harness::new().await;
    h.respond(200, forecast(1.0, 1.0, 40.0), 1).await;

    let echo = h.scraper.list_temperature(Coordinates::new(1.0, 1.0)).await.unwrap();

    assert!(!echo.alert);
    assert_eq!(h.counts(), (1, 0, 0));
}

#[tokio::test]
async fn non_success_status_is_recorded_as_error() {
    let h = Harness::new().await;
    h.respond(502, forecast(10.0, 10.0, 22.0), 1).await;

    let echo = h.scraper.list_temperature(Coordinates::new(10.0, 10.0)).await.unwrap();

    assert!(echo.error);
    assert!(!echo.alert);
    assert_eq!(h.counts(), (0, 0, 1));

    let stored = &h.sink.records(RecordSet::Error).unwrap()[0];
    assert_eq!(stored.request.source_status_code, 502);
}

#[tokio::test]
async fn non_success_status_with_extreme_reading_also_alerts() {
    let h = Harness::new().await;
    h.respond(500, forecast(25.0, 45.0, 47.5), 1).await;

    let echo = h.scraper.list_temperature(Coordinates::new(25.0, 45.0)).await.unwrap();

    assert!(echo.error);
    assert!(echo.alert);
    assert_eq!(h.counts(), (0, 1, 1));
}

#[tokio::test]
async fn returned_echo_equals_the_persisted_request() {
    let h = Harness::new().await;
    // Upstream snaps coordinates to its grid; the echo follows the upstream.
    h.respond(200, forecast(52.52, 13.419998, -4.25), 1).await;

    let echo = h.scraper.list_temperature(Coordinates::new(52.5, 13.4)).await.unwrap();

    let success = h.sink.records(RecordSet::Success).unwrap();
    let alert = h.sink.records(RecordSet::Alert).unwrap();
    assert_eq!(success.len(), 1);
    assert_eq!(alert.len(), 1);
    assert_eq!(echo, success[0].request.echo());
    assert_eq!(echo, alert[0].request.echo());
    assert_eq!(echo.latitude, 52.52);
    assert_eq!(echo.longitude, 13.419998);
}

#[tokio::test]
async fn malformed_upstream_json_is_not_persisted() {
    let h = Harness::new().await;
    h.respond(200, serde_json::json!({ "latitude": 1.0, "longitude": 2.0 }), 1).await;

    let err = h.scraper.list_temperature(Coordinates::new(1.0, 2.0)).await.unwrap_err();

    assert!(matches!(err, TemperatureError::Parse { .. }), "got {err:?}");
    assert_eq!(h.counts(), (0, 0, 0));
}

#[tokio::test]
async fn every_lookup_appends_a_new_record() {
    let h = Harness::new().await;
    h.respond(200, forecast(1.0, 1.0, 20.0), 3).await;

    for _ in 0..3 {
        h.scraper.list_temperature(Coordinates::new(1.0, 1.0)).await.unwrap();
    }

    assert_eq!(h.counts(), (3, 0, 0));
}
