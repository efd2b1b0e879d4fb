//! Core presence bookkeeping.
//!
//! The registry is deliberately synchronous: it is a pair of hash maps
//! with no I/O, and the async [`Presence`](crate::Presence) service
//! wraps it in a lock. Keeping the core sync makes the state machine
//! trivially testable.

use std::collections::HashMap;

use duello_protocol::Identity;
use duello_transport::ConnectionId;

use crate::PresenceError;

/// One tracked identity.
#[derive(Debug, Clone)]
pub struct PresenceEntry {
    /// The identity this entry belongs to.
    pub identity: Identity,
    /// The most recent connection seen for this identity.
    pub conn: ConnectionId,
}

/// Maps identities to live connections, with a reverse index from
/// connection to identity.
///
/// An identity appears in the registry iff it is online. Disconnect
/// grace is handled a layer up; by the time `mark_offline` is called
/// the identity is really gone.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    entries: HashMap<Identity, PresenceEntry>,
    by_conn: HashMap<ConnectionId, Identity>,
}

impl PresenceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks an identity online on the given connection.
    ///
    /// Idempotent: if the identity is already online, its connection is
    /// replaced and the old connection's reverse mapping is dropped.
    /// This is how a reconnecting phone takes over from its dead socket.
    pub fn mark_online(&mut self, identity: Identity, conn: ConnectionId) {
        if let Some(old) = self.entries.get(&identity) {
            self.by_conn.remove(&old.conn);
        }
        self.by_conn.insert(conn, identity.clone());
        self.entries.insert(
            identity.clone(),
            PresenceEntry { identity, conn },
        );
    }

    /// Removes an identity from the registry.
    pub fn mark_offline(&mut self, identity: &Identity) -> Result<PresenceEntry, PresenceError> {
        let entry = self
            .entries
            .remove(identity)
            .ok_or_else(|| PresenceError::NotFound(identity.clone()))?;
        self.by_conn.remove(&entry.conn);
        Ok(entry)
    }

    /// Returns whether the identity is currently online.
    pub fn is_online(&self, identity: &Identity) -> bool {
        self.entries.contains_key(identity)
    }

    /// Looks up the identity behind a connection, if any.
    pub fn resolve(&self, conn: ConnectionId) -> Option<&Identity> {
        self.by_conn.get(&conn)
    }

    /// Returns the entry for an identity, if online.
    pub fn entry(&self, identity: &Identity) -> Option<&PresenceEntry> {
        self.entries.get(identity)
    }

    /// Returns all online identities.
    pub fn identities(&self) -> Vec<Identity> {
        self.entries.keys().cloned().collect()
    }

    /// Returns the number of online identities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> Identity {
        Identity::new(s)
    }

    #[test]
    fn test_mark_online_adds_entry() {
        let mut registry = PresenceRegistry::new();
        registry.mark_online(id("aoife"), ConnectionId::new(1));

        assert!(registry.is_online(&id("aoife")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_mark_online_is_idempotent() {
        let mut registry = PresenceRegistry::new();
        registry.mark_online(id("aoife"), ConnectionId::new(1));
        registry.mark_online(id("aoife"), ConnectionId::new(1));

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_mark_online_replaces_connection() {
        let mut registry = PresenceRegistry::new();
        registry.mark_online(id("aoife"), ConnectionId::new(1));
        registry.mark_online(id("aoife"), ConnectionId::new(2));

        let entry = registry.entry(&id("aoife")).unwrap();
        assert_eq!(entry.conn, ConnectionId::new(2));
        // Old connection no longer resolves to anyone.
        assert!(registry.resolve(ConnectionId::new(1)).is_none());
        assert_eq!(registry.resolve(ConnectionId::new(2)), Some(&id("aoife")));
    }

    #[test]
    fn test_mark_offline_removes_entry_and_reverse_index() {
        let mut registry = PresenceRegistry::new();
        registry.mark_online(id("aoife"), ConnectionId::new(1));

        let entry = registry.mark_offline(&id("aoife")).unwrap();
        assert_eq!(entry.conn, ConnectionId::new(1));
        assert!(!registry.is_online(&id("aoife")));
        assert!(registry.resolve(ConnectionId::new(1)).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_mark_offline_unknown_identity_fails() {
        let mut registry = PresenceRegistry::new();
        let result = registry.mark_offline(&id("ghost"));
        assert!(matches!(result, Err(PresenceError::NotFound(_))));
    }

    #[test]
    fn test_resolve_finds_identity_for_connection() {
        let mut registry = PresenceRegistry::new();
        registry.mark_online(id("aoife"), ConnectionId::new(1));
        registry.mark_online(id("brendan"), ConnectionId::new(2));

        assert_eq!(registry.resolve(ConnectionId::new(2)), Some(&id("brendan")));
    }

    #[test]
    fn test_resolve_unknown_connection_is_none() {
        let registry = PresenceRegistry::new();
        assert!(registry.resolve(ConnectionId::new(99)).is_none());
    }

    #[test]
    fn test_two_identities_do_not_interfere() {
        let mut registry = PresenceRegistry::new();
        registry.mark_online(id("aoife"), ConnectionId::new(1));
        registry.mark_online(id("brendan"), ConnectionId::new(2));

        registry.mark_offline(&id("aoife")).unwrap();

        assert!(!registry.is_online(&id("aoife")));
        assert!(registry.is_online(&id("brendan")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_identities_lists_everyone_online() {
        let mut registry = PresenceRegistry::new();
        registry.mark_online(id("aoife"), ConnectionId::new(1));
        registry.mark_online(id("brendan"), ConnectionId::new(2));

        let mut names: Vec<String> = registry
            .identities()
            .into_iter()
            .map(|i| i.as_str().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["aoife", "brendan"]);
    }
}
