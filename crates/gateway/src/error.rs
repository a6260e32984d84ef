use thiserror::Error;

/// Classified failure from the inventory service boundary.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The inventory service processed the request and refused it. The code
    /// is the service's stable error code, preserved end-to-end.
    #[error("Inventory service rejected the request [{code}]: {message}")]
    Rejected { code: String, message: String },

    /// The inventory service could not be reached, timed out, or answered
    /// something that could not be decoded.
    #[error("Inventory service unavailable: {0}")]
    Transport(String),
}

impl GatewayError {
    /// Returns true for transport-level failures (vs business rejections).
    pub fn is_transport(&self) -> bool {
        matches!(self, GatewayError::Transport(_))
    }
}
