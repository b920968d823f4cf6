use crate::app::config::ConfigError;
use crate::buffer::error::ValidationError;
use crate::sender::client::TransportError;
use crate::sender::transmission::TransmissionError;
use thiserror::Error;

/// Top-level error type for the shipper.
#[derive(Error, Debug)]
pub enum ShipperError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid message: {0}")]
    Validation(#[from] ValidationError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Request preparation failed: {0}")]
    Preparation(#[from] TransmissionError),
}

impl ShipperError {
    /// Whether the failure came from the remote side (network or HTTP status).
    pub fn is_transport(&self) -> bool {
        matches!(self, ShipperError::Transport(_))
    }
}
