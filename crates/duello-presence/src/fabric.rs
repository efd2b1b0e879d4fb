//! Per-identity outbound event channels.
//!
//! Every online identity gets exactly one unbounded channel. The
//! connection handler drains the receiving half onto the socket, and
//! everything else in the system (presence, duel actors, the janitor)
//! pushes into the sending half. Because there is a single queue per
//! identity, events for one person are delivered in the order they
//! were enqueued even when several duel actors produce them at once.

use std::collections::HashMap;
use std::sync::Arc;

use duello_protocol::{Identity, ServerEvent};
use tokio::sync::Mutex;
use tokio::sync::mpsc;

/// The sending half of an identity's outbound queue.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Routes [`ServerEvent`]s to identities.
///
/// Cheap to clone; all clones share the same routing table.
#[derive(Debug, Clone, Default)]
pub struct Fabric {
    senders: Arc<Mutex<HashMap<Identity, EventSender>>>,
}

impl Fabric {
    /// Creates an empty fabric.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the outbound channel for an identity.
    ///
    /// On reconnect the new socket's channel replaces the old one;
    /// events queued on the dead channel are dropped with it.
    pub async fn register(&self, identity: Identity, sender: EventSender) {
        self.senders.lock().await.insert(identity, sender);
    }

    /// Removes the outbound channel for an identity.
    pub async fn unregister(&self, identity: &Identity) {
        self.senders.lock().await.remove(identity);
    }

    /// Sends an event to an identity, if reachable.
    ///
    /// Fire-and-forget: an offline or disconnected target is not an
    /// error, the event is simply dropped. Returns whether the event
    /// was enqueued.
    pub async fn send(&self, identity: &Identity, event: ServerEvent) -> bool {
        let senders = self.senders.lock().await;
        match senders.get(identity) {
            Some(sender) => {
                if sender.send(event).is_err() {
                    tracing::trace!(%identity, "event dropped: receiver gone");
                    false
                } else {
                    true
                }
            }
            None => {
                tracing::trace!(%identity, "event dropped: identity not registered");
                false
            }
        }
    }

    /// Returns whether an identity currently has a registered channel.
    pub async fn is_registered(&self, identity: &Identity) -> bool {
        self.senders.lock().await.contains_key(identity)
    }
}

// ============================================================================
// Tests
// ============================================================================
