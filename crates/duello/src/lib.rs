//! Duello: an ephemeral head-to-head duel server.
//!
//! People at the same bar challenge each other to quick games —
//! showdown (rock-paper-scissors), hot potato, tap race, confession
//! (two truths and one lie) — with a drink on the line. Nothing
//! persists: identities live for one visit, sessions live for one
//! game, and a restart clears the floor.
//!
//! # Quick Start
//!
//! ```no_run
//! use duello::DuelloServer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), duello::DuelloError> {
//!     let server = DuelloServer::bind("127.0.0.1:5001").build().await?;
//!     server.run().await
//! }
//! ```
//!
//! The heavy lifting lives in the member crates, re-exported here:
//!
//! - [`protocol`] — wire types and the JSON codec
//! - [`transport`] — WebSocket listener and connection traits
//! - [`presence`] — who's online, grace timers, the event fabric
//! - [`engine`] — duel sessions and the four game variants

pub use duello_engine as engine;
pub use duello_presence as presence;
pub use duello_protocol as protocol;
pub use duello_timer as timer;
pub use duello_transport as transport;

mod directory;
mod error;
mod handler;
mod server;

pub use directory::InMemoryDirectory;
pub use error::DuelloError;
pub use handler::handle_connection;
pub use server::{DuelloServer, DuelloServerBuilder};
