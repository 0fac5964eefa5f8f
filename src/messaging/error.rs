//! Errors raised by bus client operations.
//!
//! Every error is local to the call that raised it. The client never retries.

use super::signal::AbortReason;
use super::types::CorrelationId;
use crate::schema::ValidationError;
use thiserror::Error;

/// Failure of a single request or render-data wait.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Not embedded in a host frame.
    #[error("No parent frame available")]
    NoHost,

    #[error("Operation aborted before it began")]
    AlreadyAborted,

    #[error("Timed out waiting for the host")]
    Timeout,

    #[error("Operation cancelled")]
    Cancelled,

    /// The host answered with an error payload.
    #[error("Host reported an error: {0}")]
    Remote(String),

    #[error("Response failed validation: {0}")]
    SchemaValidation(#[from] ValidationError),

    #[error("Correlation ID already pending: {0}")]
    DuplicateCorrelation(CorrelationId),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}

impl From<AbortReason> for BridgeError {
    fn from(reason: AbortReason) -> Self {
        match reason {
            AbortReason::Cancelled => BridgeError::Cancelled,
            AbortReason::Timeout => BridgeError::Timeout,
        }
    }
}

/// Transport-level failures of a [`HostChannel`](super::HostChannel).
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Host channel closed")]
    Closed,

    /// Another client already captures this channel's inbound messages.
    #[error("Inbound stream already captured by another client")]
    InboundTaken,
}
