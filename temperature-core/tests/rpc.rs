//! RPC surface tests: real routers on loopback sockets, remote clients on
//! the other side.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use temperature_core::{
    Coordinates, EmbeddedSink, ReadingEcho, RecordSet, Scraper, TemperatureError,
    TemperatureReading, TemperatureResult, TemperatureService, TemperatureSink,
    ThresholdClassifier, api,
    provider::open_meteo::OpenMeteoProvider,
    rpc::{RemoteService, RemoteSink, scraper_router, store_router},
};
use tokio::net::TcpListener;
use tower::ServiceExt;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve(router: axum::Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn reading(temperature: f64, alert: bool, error: bool) -> TemperatureReading {
    TemperatureReading {
        latitude: 48.85,
        longitude: 2.35,
        temperature,
        alert,
        error,
        source_status_code: if error { 500 } else { 200 },
    }
}

#[tokio::test]
async fn remote_sink_appends_to_the_store_process() {
    let store = EmbeddedSink::open_in_memory().unwrap();
    let url = serve(store_router(Arc::new(store.clone()))).await;
    let remote = RemoteSink::new(url, Duration::from_secs(5)).unwrap();

    let r = reading(42.0, true, false);
    let echo = remote.save_temperature(&r).await.unwrap();

    assert_eq!(echo, r.echo());
    assert_eq!(store.count(RecordSet::Success).unwrap(), 1);
    assert_eq!(store.count(RecordSet::Alert).unwrap(), 1);
    assert_eq!(store.records(RecordSet::Alert).unwrap()[0].request, r);
}

struct FailingSink;

#[async_trait]
impl TemperatureSink for FailingSink {
    async fn save_temperature(&self, _: &TemperatureReading) -> TemperatureResult<ReadingEcho> {
        Err(TemperatureError::persistence("disk full"))
    }
}

#[tokio::test]
async fn store_fault_is_rebuilt_on_the_client() {
    let url = serve(store_router(Arc::new(FailingSink))).await;
    let remote = RemoteSink::new(url, Duration::from_secs(5)).unwrap();

    let err = remote.save_temperature(&reading(20.0, false, false)).await.unwrap_err();
    assert_eq!(err, TemperatureError::persistence("disk full"));
}

#[tokio::test]
async fn unreachable_store_is_a_persistence_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let remote = RemoteSink::new(format!("http://{addr}"), Duration::from_secs(2)).unwrap();
    let err = remote.save_temperature(&reading(20.0, false, false)).await.unwrap_err();

    assert!(matches!(err, TemperatureError::Persistence { .. }), "got {err:?}");
}

#[tokio::test]
async fn client_faults_survive_the_scraper_hop() {
    let forecast = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&forecast)
        .await;

    let scraper = Scraper::new(
        Arc::new(OpenMeteoProvider::new(forecast.uri(), Duration::from_secs(5)).unwrap()),
        Arc::new(ThresholdClassifier::default()),
        Arc::new(EmbeddedSink::open_in_memory().unwrap()),
    );
    let url = serve(scraper_router(Arc::new(scraper))).await;
    let remote = RemoteService::new(url, Duration::from_secs(5)).unwrap();

    let err = remote.list_temperature(Coordinates::new(-120.0, 0.0)).await.unwrap_err();

    assert!(err.is_client_fault());
    assert!(err.to_string().starts_with("latitude -120"));
}

#[tokio::test]
async fn non_finite_coordinates_are_rejected_before_the_scraper_hop() {
    let forecast = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&forecast)
        .await;

    let scraper = Scraper::new(
        Arc::new(OpenMeteoProvider::new(forecast.uri(), Duration::from_secs(5)).unwrap()),
        Arc::new(ThresholdClassifier::default()),
        Arc::new(EmbeddedSink::open_in_memory().unwrap()),
    );
    let scraper_url = serve(scraper_router(Arc::new(scraper))).await;
    let service = RemoteService::new(scraper_url, Duration::from_secs(5)).unwrap();
    let router = api::build_router(Arc::new(service.clone()));

    for (query, prefix) in [
        ("latitude=NaN&longitude=0", "latitude NaN is out of range"),
        ("latitude=0&longitude=inf", "longitude inf is out of range"),
        ("latitude=-inf&longitude=0", "latitude -inf is out of range"),
    ] {
        let req = Request::builder()
            .uri(format!("/getTemperature?{query}"))
            .body(Body::empty())
            .unwrap();
        let resp = router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{query}");

        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: api::ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert!(body.message.starts_with(prefix), "{query}: {}", body.message);
    }

    // Called directly, the client refuses too instead of sending `null`.
    let err = service.list_temperature(Coordinates::new(f64::NAN, 0.0)).await.unwrap_err();
    assert!(err.is_client_fault(), "got {err:?}");
}

#[tokio::test]
async fn three_process_topology_records_one_reading() {
    // store process
    let store = EmbeddedSink::open_in_memory().unwrap();
    let store_url = serve(store_router(Arc::new(store.clone()))).await;

    // forecast endpoint
    let forecast = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "latitude": 35.68,
            "longitude": 139.69,
            "current_weather": { "temperature": 33.0 }
        })))
        .expect(1)
        .mount(&forecast)
        .await;

    // scraper process
    let scraper = Scraper::new(
        Arc::new(OpenMeteoProvider::new(forecast.uri(), Duration::from_secs(5)).unwrap()),
        Arc::new(ThresholdClassifier::default()),
        Arc::new(RemoteSink::new(store_url, Duration::from_secs(5)).unwrap()),
    );
    let scraper_url = serve(scraper_router(Arc::new(scraper))).await;

    // query side
    let service = RemoteService::new(scraper_url, Duration::from_secs(5)).unwrap();
    let echo = service.list_temperature(Coordinates::new(35.68, 139.69)).await.unwrap();

    let expected = ReadingEcho {
        latitude: 35.68,
        longitude: 139.69,
        temperature: 33.0,
        alert: false,
        error: false,
    };
    assert_eq!(echo, expected);
    assert_eq!(store.count(RecordSet::Success).unwrap(), 1);
    assert_eq!(store.count(RecordSet::Alert).unwrap(), 0);
}
