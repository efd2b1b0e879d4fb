//! Error types for the transport layer.

/// Errors that can occur while accepting, reading, or writing sockets.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Accepting an incoming connection failed.
    #[error("accept failed: {0}")]
    AcceptFailed(std::io::Error),

    /// Writing to the peer failed.
    #[error("send failed: {0}")]
    SendFailed(std::io::Error),

    /// Reading from the peer failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(std::io::Error),

    /// The connection is gone.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),
}
