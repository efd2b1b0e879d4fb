//! Presence tracking for Duello.
//!
//! This crate answers one question for the rest of the system: *who is
//! at the bar right now, and how do I reach them?* It has three parts:
//!
//! - [`PresenceRegistry`] — a synchronous map from identity to live
//!   connection, with a reverse index so a socket drop can be traced
//!   back to the person behind it.
//! - [`Fabric`] — per-identity outbound event queues. Each identity
//!   gets one unbounded channel, so events for a given person are
//!   delivered in the order they were sent, no matter how many tasks
//!   produce them.
//! - [`Presence`] — the async service that ties the two together and
//!   owns the disconnect grace timers. A dropped socket does not mean
//!   someone left: phones on bar wifi drop constantly, so the identity
//!   stays online for a grace period and is only removed if nobody
//!   reclaims it in time.
//!
//! # Example
//!
//! ```
//! use duello_presence::{Presence, PresenceConfig};
//! use duello_protocol::{Identity, ServerEvent};
//! use duello_transport::ConnectionId;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let presence = Presence::new(PresenceConfig::default());
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//!
//! let aoife = Identity::new("aoife-device-1");
//! presence.go_online(aoife.clone(), ConnectionId::new(1), tx).await;
//! assert!(presence.is_online(&aoife).await);
//!
//! // Everyone on the floor hears about the arrival, Aoife included.
//! assert!(matches!(rx.recv().await, Some(ServerEvent::UsersUpdate { .. })));
//!
//! presence.fabric().send(&aoife, ServerEvent::CheckedOut).await;
//! assert!(matches!(rx.recv().await, Some(ServerEvent::CheckedOut)));
//! # }
//! ```

mod error;
mod fabric;
mod registry;
mod service;

pub use error::PresenceError;
pub use fabric::{EventSender, Fabric};
pub use registry::{PresenceEntry, PresenceRegistry};
pub use service::{Presence, PresenceConfig};
