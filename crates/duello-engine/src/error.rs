//! Error types for the duel engine.

use duello_protocol::{GameId, Identity};

/// Errors surfaced to the acting player. The other participant never
/// sees these.
#[derive(Debug, thiserror::Error)]
pub enum DuelError {
    /// The challenged identity has no live connection.
    #[error("they're not at the bar right now")]
    TargetOffline(Identity),

    /// A player tried to duel themselves.
    #[error("you can't challenge yourself")]
    SelfChallenge,

    /// No live session with that id.
    #[error("no such duel: {0}")]
    NotFound(GameId),

    /// The move is not legal in the session's current state.
    #[error("{0}")]
    InvalidMove(String),
}
