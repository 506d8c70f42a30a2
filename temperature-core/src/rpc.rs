//! Inter-process transport for the two-method service contract.
//!
//! `ListTemperature` connects the query interface to the scraper and
//! `SaveTemperature` connects the scraper to the store. Both travel as JSON
//! over HTTP:
//!
//! | Method | Path | Body | Reply |
//! |---|---|---|---|
//! | POST | `/rpc/ListTemperature` | `Coordinates` | `ReadingEcho` |
//! | POST | `/rpc/SaveTemperature` | `TemperatureReading` | `ReadingEcho` |
//!
//! Failures reply with a non-success status and an [`RpcFault`] body carrying
//! the serialized [`TemperatureError`], so the client hands its caller the
//! same error the server raised.

use serde::{Deserialize, Serialize};

use crate::error::TemperatureError;

pub mod client;
pub mod server;

pub use client::{RemoteService, RemoteSink};
pub use server::{scraper_router, store_router};

pub const LIST_TEMPERATURE_PATH: &str = "/rpc/ListTemperature";
pub const SAVE_TEMPERATURE_PATH: &str = "/rpc/SaveTemperature";

/// Error body of a failed call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcFault {
    pub error: TemperatureError,
    pub message: String,
}

impl From<TemperatureError> for RpcFault {
    fn from(error: TemperatureError) -> Self {
        let message = error.to_string();
        Self { error, message }
    }
}
