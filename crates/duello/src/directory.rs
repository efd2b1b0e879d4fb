//! In-memory profile and history store.
//!
//! Everything here is ephemeral by design: a restart forgets every
//! profile and every finished duel, which is exactly the privacy model
//! of a night out.

use std::collections::HashMap;
use std::sync::Mutex;

use duello_engine::{ActivityRecord, Directory, Profile};
use duello_protocol::Identity;

/// A [`Directory`] backed by plain in-process maps.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    profiles: Mutex<HashMap<Identity, Profile>>,
    activity: Mutex<Vec<ActivityRecord>>,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a profile.
    pub fn insert_profile(&self, identity: Identity, profile: Profile) {
        self.profiles
            .lock()
            .expect("directory lock poisoned")
            .insert(identity, profile);
    }

    /// Removes a profile.
    pub fn remove_profile(&self, identity: &Identity) {
        self.profiles
            .lock()
            .expect("directory lock poisoned")
            .remove(identity);
    }

    /// A snapshot of every recorded duel, oldest first.
    pub fn activity(&self) -> Vec<ActivityRecord> {
        self.activity
            .lock()
            .expect("directory lock poisoned")
            .clone()
    }
}

impl Directory for InMemoryDirectory {
    fn profile_lookup(&self, identity: &Identity) -> Option<Profile> {
        self.profiles
            .lock()
            .expect("directory lock poisoned")
            .get(identity)
            .cloned()
    }

    fn log_activity(&self, record: ActivityRecord) {
        tracing::debug!(id = %record.game_id, kind = %record.kind, "duel recorded");
        self.activity
            .lock()
            .expect("directory lock poisoned")
            .push(record);
    }
}
