//! Core traits for talking to the service under test.

use smallbank_types::Response;

/// A synchronous request/response channel to the service under test.
///
/// This is the only seam between the workload engine and the network. The
/// engine hands over a method name and an encoded payload and blocks until
/// the transport returns a response or gives up.
///
/// - **Blocking**: `submit` returns only once a response is available
/// - **Opaque**: TLS, sessions, pooling and timeouts live behind it
/// - **No engine retries**: any retry policy belongs to the implementation;
///   the engine submits each request at most once
///
/// # Example
///
/// ```ignore
/// impl Transport for HttpTransport {
///     fn submit(&self, method: &str, payload: &[u8]) -> Result<Response, TransportError> {
///         let url = self.url_for(method);
///         let response = self.client.post(url).body(payload.to_vec()).send()?;
///         // ... convert status and body
///     }
/// }
/// ```
pub trait Transport {
    /// Submit one request and wait for its response.
    ///
    /// # Arguments
    ///
    /// * `method` - Service method name (e.g. `SmallBank_balance`)
    /// * `payload` - Encoded request payload
    ///
    /// # Returns
    ///
    /// The raw response, whatever its status. An `Err` means no response was
    /// obtained at all.
    fn submit(&self, method: &str, payload: &[u8]) -> Result<Response, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn submit(&self, method: &str, payload: &[u8]) -> Result<Response, TransportError> {
        (**self).submit(method, payload)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn submit(&self, method: &str, payload: &[u8]) -> Result<Response, TransportError> {
        (**self).submit(method, payload)
    }
}

/// Failure to obtain any response from the service.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Transport error: {0}")]
    Other(String),
}
