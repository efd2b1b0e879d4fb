//! Wire protocol for Duello.
//!
//! This crate defines the "language" that clients and the duel server
//! speak:
//!
//! - **Types** ([`ClientEvent`], [`ServerEvent`], [`Identity`],
//!   [`GameId`], [`DuelKind`], etc.) — the structures that travel on
//!   the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those events are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and the
//! presence/engine layers (who is online, which duel is live). It does
//! not know about connections or sessions — it only knows how to name
//! and serialize events.
//!
//! ```text
//! Transport (bytes) → Protocol (ClientEvent/ServerEvent) → Presence/Engine
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    Choice, ClientEvent, DuelKind, GameId, Identity, ResultDetail,
    ServerEvent, StartInfo, Statements, Verdict,
};
