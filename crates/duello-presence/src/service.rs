//! The async presence service.
//!
//! Wraps the synchronous [`PresenceRegistry`] in a lock, owns the
//! [`Fabric`], and runs the disconnect grace timers. One timer per
//! disconnected identity; the timer callback re-checks the registry
//! before acting, so a reconnect that lands between scheduling and
//! firing wins the race and the identity stays online.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use duello_protocol::{Identity, ServerEvent};
use duello_timer::TimerHandle;
use duello_transport::ConnectionId;
use tokio::sync::Mutex;

use crate::{EventSender, Fabric, PresenceError, PresenceRegistry};

/// Configuration for the presence service.
#[derive(Debug, Clone)]
pub struct PresenceConfig {
    /// How long a disconnected identity stays online before being
    /// removed. Generous by default: a phone that sleeps in a pocket
    /// all evening should still be at the bar when it wakes up.
    pub grace: Duration,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(86_400),
        }
    }
}

/// Tracks who is online and routes events to them.
///
/// Cheap to clone; all clones share state.
#[derive(Debug, Clone)]
pub struct Presence {
    registry: Arc<Mutex<PresenceRegistry>>,
    fabric: Fabric,
    grace_timers: Arc<Mutex<HashMap<Identity, TimerHandle>>>,
    config: PresenceConfig,
}

impl Presence {
    /// Creates a new presence service.
    pub fn new(config: PresenceConfig) -> Self {
        Self {
            registry: Arc::new(Mutex::new(PresenceRegistry::new())),
            fabric: Fabric::new(),
            grace_timers: Arc::new(Mutex::new(HashMap::new())),
            config,
        }
    }

    /// Returns a clone of the event fabric.
    pub fn fabric(&self) -> Fabric {
        self.fabric.clone()
    }

    /// Brings an identity online on the given connection.
    ///
    /// Used for both a fresh arrival and a rejoin after a dropped
    /// socket; in either case any pending grace timer is cancelled and
    /// the outbound channel is replaced.
    pub async fn go_online(&self, identity: Identity, conn: ConnectionId, sender: EventSender) {
        self.cancel_grace(&identity).await;
        self.fabric.register(identity.clone(), sender).await;
        self.registry.lock().await.mark_online(identity.clone(), conn);
        tracing::info!(%identity, %conn, "identity online");
        self.broadcast_roster().await;
    }

    /// Explicitly removes an identity (the user tapped "leave").
    pub async fn checkout(&self, identity: &Identity) -> Result<(), PresenceError> {
        self.cancel_grace(identity).await;
        self.registry.lock().await.mark_offline(identity)?;
        self.fabric.unregister(identity).await;
        tracing::info!(%identity, "identity checked out");
        self.broadcast_roster().await;
        Ok(())
    }

    /// Forcibly removes an identity, telling them first.
    pub async fn kick(&self, identity: &Identity) -> Result<(), PresenceError> {
        self.fabric.send(identity, ServerEvent::Kicked).await;
        self.checkout(identity).await
    }

    /// Handles a dropped socket.
    ///
    /// If the connection mapped to an identity, a grace timer is
    /// scheduled (replacing any previous one). When it fires, the
    /// identity is removed only if this same connection is still the
    /// one on record; a rejoin in the meantime replaces the connection
    /// and the stale timer becomes a no-op.
    ///
    /// Returns the affected identity, if any.
    pub async fn on_disconnect(&self, conn: ConnectionId) -> Option<Identity> {
        let identity = self.registry.lock().await.resolve(conn).cloned()?;
        tracing::debug!(%identity, %conn, "socket dropped, starting grace timer");

        let service = self.clone();
        let timer_identity = identity.clone();
        let handle = duello_timer::schedule(self.config.grace, async move {
            service.expire_grace(timer_identity, conn).await;
        });

        if let Some(old) = self.grace_timers.lock().await.insert(identity.clone(), handle) {
            old.cancel();
        }
        Some(identity)
    }

    /// Grace timer body: remove the identity iff its connection is
    /// still the one that dropped.
    async fn expire_grace(&self, identity: Identity, conn: ConnectionId) {
        {
            let mut registry = self.registry.lock().await;
            match registry.entry(&identity) {
                Some(entry) if entry.conn == conn => {
                    let _ = registry.mark_offline(&identity);
                }
                _ => {
                    // Rejoined on a new connection, or already gone.
                    self.grace_timers.lock().await.remove(&identity);
                    return;
                }
            }
        }
        self.fabric.unregister(&identity).await;
        self.grace_timers.lock().await.remove(&identity);
        tracing::info!(%identity, "grace period expired, identity offline");
        self.broadcast_roster().await;
    }

    /// Returns whether an identity is online.
    pub async fn is_online(&self, identity: &Identity) -> bool {
        self.registry.lock().await.is_online(identity)
    }

    /// Looks up the identity behind a connection.
    pub async fn resolve_identity(&self, conn: ConnectionId) -> Option<Identity> {
        self.registry.lock().await.resolve(conn).cloned()
    }

    /// Returns all online identities.
    pub async fn identities(&self) -> Vec<Identity> {
        self.registry.lock().await.identities()
    }

    /// Returns the number of online identities.
    pub async fn online_count(&self) -> usize {
        self.registry.lock().await.len()
    }

    /// Removes everyone and cancels all grace timers.
    pub async fn reset_all(&self) {
        let mut timers = self.grace_timers.lock().await;
        for (_, handle) in timers.drain() {
            handle.cancel();
        }
        drop(timers);

        let identities = self.registry.lock().await.identities();
        for identity in identities {
            let _ = self.registry.lock().await.mark_offline(&identity);
            self.fabric.unregister(&identity).await;
        }
        tracing::info!("presence reset, everyone offline");
    }

    async fn cancel_grace(&self, identity: &Identity) {
        if let Some(handle) = self.grace_timers.lock().await.remove(identity) {
            handle.cancel();
        }
    }

    /// Sends the full sorted roster to everyone still on the floor.
    /// Called after every arrival or departure.
    async fn broadcast_roster(&self) {
        let mut users = self.registry.lock().await.identities();
        users.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        for identity in users.clone() {
            self.fabric
                .send(&identity, ServerEvent::UsersUpdate { users: users.clone() })
                .await;
        }
    }
}
