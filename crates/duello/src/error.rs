//! Top-level error type.

/// Anything that can go wrong running a Duello server.
#[derive(Debug, thiserror::Error)]
pub enum DuelloError {
    #[error(transparent)]
    Transport(#[from] duello_transport::TransportError),

    #[error(transparent)]
    Protocol(#[from] duello_protocol::ProtocolError),

    #[error(transparent)]
    Presence(#[from] duello_presence::PresenceError),

    #[error(transparent)]
    Duel(#[from] duello_engine::DuelError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
