//! The duel engine: ephemeral head-to-head game sessions.
//!
//! A duel session moves through a fixed envelope — challenge, accept
//! or decline, play, resolve — and every session resolves exactly
//! once, no matter how moves and timeouts race. The envelope is
//! generic; the four game variants plug in behind the [`DuelLogic`]
//! trait and never touch a channel or a clock of their own.
//!
//! Layering:
//!
//! - [`DuelManager`] — validates challenges and owns a handle per
//!   live session.
//! - session actor ([`spawn_duel`]) — one task per session; serializes
//!   moves, responses, and timer expirations, and exits on the first
//!   terminal outcome.
//! - [`DuelLogic`] implementations ([`variants`]) — synchronous state
//!   machines, one per game kind.

mod config;
mod directory;
mod duel;
mod error;
mod logic;
mod manager;
pub mod variants;

pub use config::DuelConfig;
pub use directory::{ActivityRecord, Directory, NullDirectory, Profile};
pub use duel::{DuelCommand, DuelHandle, spawn_duel};
pub use error::DuelError;
pub use logic::{
    DuelContext, DuelLogic, Emit, Move, Outcome, Participants, Recipient, Seat, Step,
};
pub use manager::DuelManager;
