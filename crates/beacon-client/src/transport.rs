//! Transport — executes one track request. The production implementation
//! posts to the collector over reqwest; tests substitute stubs.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use beacon_core::constants::{APP_KEY_HEADER, TRACK_ENDPOINT_PATH};
use beacon_core::errors::{BeaconResult, TransportError};

use crate::protocol::{TrackRequest, TrackResponse};

pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<TrackResponse, TransportError>> + Send + 'a>>;

/// Executes one track request. Implementations map any 2xx response to
/// success and everything else (4xx, 5xx, connection and timeout failures
/// alike) to an error; the pipeline never inspects status semantics
/// beyond that.
pub trait TrackTransport: Send + Sync {
    fn send(&self, request: TrackRequest) -> TransportFuture<'_>;
}

/// reqwest-backed transport: one JSON POST per bundle.
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> BeaconResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .gzip(true)
            .build()
            .map_err(|e| TransportError::NetworkError {
                reason: e.to_string(),
            })?;
        Ok(Self {
            http,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), TRACK_ENDPOINT_PATH),
        })
    }
}

impl TrackTransport for HttpTransport {
    fn send(&self, request: TrackRequest) -> TransportFuture<'_> {
        Box::pin(async move {
            let response = self
                .http
                .post(&self.endpoint)
                .header(APP_KEY_HEADER, &request.app_key)
                .json(&request)
                .send()
                .await
                .map_err(|e| TransportError::NetworkError {
                    reason: e.to_string(),
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(TransportError::HttpStatus {
                    status: status.as_u16(),
                });
            }

            // The body is advisory; a malformed one is still a delivery.
            let body = response
                .json::<TrackResponse>()
                .await
                .unwrap_or(TrackResponse {
                    success: true,
                    status: status.as_u16(),
                });
            Ok(body)
        })
    }
}
