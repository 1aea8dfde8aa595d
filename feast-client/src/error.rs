//! Client error types

use thiserror::Error;
use tokio_util::codec::LinesCodecError;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Could not reach the server
    #[error("Connection error: {0}")]
    Connection(String),

    /// Socket I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Line framing failed (response over the size cap, or I/O underneath)
    #[error("Codec error: {0}")]
    Codec(#[from] LinesCodecError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Server closed the connection before answering
    #[error("Connection closed by server")]
    Closed,

    /// The request queue worker has stopped
    #[error("Request queue is shut down")]
    QueueClosed,
}

impl ClientError {
    /// The connection is gone; the request may not have been answered
    pub fn is_connection_lost(&self) -> bool {
        match self {
            Self::Connection(_) | Self::Io(_) | Self::Closed => true,
            Self::Codec(LinesCodecError::Io(_)) => true,
            Self::Codec(LinesCodecError::MaxLineLengthExceeded)
            | Self::Serialization(_)
            | Self::QueueClosed => false,
        }
    }

    /// The framed stream is unusable after this error, even if not lost
    pub fn breaks_framing(&self) -> bool {
        matches!(self, Self::Codec(_))
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
