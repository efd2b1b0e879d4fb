//! Collaborator trait for profile lookups and activity logging.
//!
//! The engine never owns user profiles; it asks a [`Directory`] when it
//! needs a display name to decorate a challenge, and tells it when a
//! duel resolves. Both calls are best-effort: a directory that knows
//! nothing, or quietly drops records, must not affect play.

use duello_protocol::{DuelKind, GameId, Identity};

/// A user profile as the directory knows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// The name other players see.
    pub display_name: String,
    /// Optional avatar reference (URL or emoji, the engine doesn't care).
    pub avatar: Option<String>,
}

/// A finished duel, as reported to the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRecord {
    pub game_id: GameId,
    pub kind: DuelKind,
    pub participant_a: Identity,
    pub participant_b: Identity,
    pub stakes: String,
    /// `None` for a draw or a cancelled session.
    pub winner: Option<Identity>,
    /// Set when the session ended without a legitimate outcome.
    pub cancelled: bool,
}

/// Profile and history store the engine consults.
///
/// Implementations must be infallible from the engine's point of view:
/// return `None` rather than erroring, swallow logging failures.
pub trait Directory: Send + Sync + 'static {
    /// Looks up a profile. `None` means "unknown", which the engine
    /// papers over with the identity's display prefix.
    fn profile_lookup(&self, identity: &Identity) -> Option<Profile>;

    /// Records a finished duel. Fire-and-forget.
    fn log_activity(&self, record: ActivityRecord);
}

/// A directory that knows nobody and records nothing. Useful in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDirectory;

impl Directory for NullDirectory {
    fn profile_lookup(&self, _identity: &Identity) -> Option<Profile> {
        None
    }

    fn log_activity(&self, _record: ActivityRecord) {}
}
