//! HTTP transport for the SmallBank service.
//!
//! Each submission is a `POST {endpoint}/app/{method}` carrying the JSON
//! payload. The status code and raw body are handed back untouched; reading
//! them is the classifier's job.

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use smallbank_core::{Transport, TransportError};
use smallbank_types::Response;
use std::time::Duration;
use tracing::trace;

/// Blocking HTTP transport to a single service endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    endpoint: String,
    client: Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport for `endpoint` (e.g. `http://127.0.0.1:8000`).
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(TransportError::InvalidEndpoint(endpoint));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self {
            endpoint,
            client,
            timeout,
        })
    }

    /// The endpoint this transport talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// URL a method is posted to.
    pub fn url_for(&self, method: &str) -> String {
        format!("{}/app/{}", self.endpoint, method)
    }

    fn map_error(&self, error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else if error.is_connect() {
            TransportError::Connection(error.to_string())
        } else {
            TransportError::Other(error.to_string())
        }
    }
}

impl Transport for HttpTransport {
    fn submit(&self, method: &str, payload: &[u8]) -> Result<Response, TransportError> {
        let url = self.url_for(method);
        trace!(%url, bytes = payload.len(), "Submitting request");

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload.to_vec())
            .send()
            .map_err(|e| self.map_error(e))?;

        let status = response.status().as_u16();
        let body = response.bytes().map_err(|e| self.map_error(e))?;

        trace!(%url, status, bytes = body.len(), "Received response");
        Ok(Response::new(status, body.to_vec()))
    }
}
