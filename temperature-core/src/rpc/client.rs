use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::instrument;

use crate::{
    error::{TemperatureError, TemperatureResult},
    model::{Coordinates, ReadingEcho, TemperatureReading},
    rpc::{LIST_TEMPERATURE_PATH, RpcFault, SAVE_TEMPERATURE_PATH},
    scraper::TemperatureService,
    sink::TemperatureSink,
    validate,
};

fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder().timeout(timeout).build()
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Decode a reply: the payload on success, the server's error otherwise.
/// `transport` wraps anything that is not a well-formed reply.
async fn decode<T: DeserializeOwned>(
    res: Response,
    transport: fn(String) -> TemperatureError,
) -> TemperatureResult<T> {
    let status = res.status();
    let body = res.bytes().await.map_err(|e| transport(e.to_string()))?;

    if status.is_success() {
        return serde_json::from_slice(&body)
            .map_err(|e| transport(format!("malformed reply: {e}")));
    }

    match serde_json::from_slice::<RpcFault>(&body) {
        Ok(fault) => Err(fault.error),
        Err(_) => Err(transport(format!("remote call failed with status {status}"))),
    }
}

/// `ListTemperature` over the network, as seen by the query interface.
#[derive(Debug, Clone)]
pub struct RemoteService {
    base_url: String,
    http: Client,
}

impl RemoteService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> TemperatureResult<Self> {
        let http = build_client(timeout).map_err(TemperatureError::unavailable)?;
        Ok(Self { base_url: base_url.into(), http })
    }
}

#[async_trait]
impl TemperatureService for RemoteService {
    #[instrument(skip(self))]
    async fn list_temperature(&self, coords: Coordinates) -> TemperatureResult<ReadingEcho> {
        // Non-finite values would go out as `null`; reject them as the scraper would.
        validate::check_coordinates(coords)?;

        let res = self
            .http
            .post(endpoint(&self.base_url, LIST_TEMPERATURE_PATH))
            .json(&coords)
            .send()
            .await
            .map_err(TemperatureError::unavailable)?;

        decode(res, |reason| TemperatureError::Unavailable { reason }).await
    }
}

/// `SaveTemperature` over the network, as seen by the scraper.
#[derive(Debug, Clone)]
pub struct RemoteSink {
    base_url: String,
    http: Client,
}

impl RemoteSink {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> TemperatureResult<Self> {
        let http = build_client(timeout).map_err(TemperatureError::persistence)?;
        Ok(Self { base_url: base_url.into(), http })
    }
}

#[async_trait]
impl TemperatureSink for RemoteSink {
    #[instrument(skip(self))]
    async fn save_temperature(
        &self,
        reading: &TemperatureReading,
    ) -> TemperatureResult<ReadingEcho> {
        let res = self
            .http
            .post(endpoint(&self.base_url, SAVE_TEMPERATURE_PATH))
            .json(reading)
            .send()
            .await
            .map_err(TemperatureError::persistence)?;

        decode(res, |reason| TemperatureError::Persistence { reason }).await
    }
}
