//! Error types for the presence layer.

use duello_protocol::Identity;

/// Errors that can occur in presence operations.
#[derive(Debug, thiserror::Error)]
pub enum PresenceError {
    /// The identity is not in the registry.
    #[error("identity not present: {0}")]
    NotFound(Identity),
}
