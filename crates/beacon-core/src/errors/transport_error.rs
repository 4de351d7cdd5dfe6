/// Transport-layer errors for track requests. Any non-2xx response maps to
/// `HttpStatus`; connection, DNS, and timeout failures map to `NetworkError`.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("network error: {reason}")]
    NetworkError { reason: String },

    #[error("server rejected request: status {status}")]
    HttpStatus { status: u16 },

    #[error("payload encoding failed: {reason}")]
    PayloadEncode { reason: String },
}
