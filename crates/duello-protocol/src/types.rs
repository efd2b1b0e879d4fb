//! Core wire types for Duello's event protocol.
//!
//! Every inbound socket event and every outbound notification is one of
//! the enums defined here. The shapes are internally tagged JSON
//! (`{"type": "go_online", ...}`) so a JavaScript client can dispatch on
//! a single `type` field, and so that adding a new duel kind never
//! changes the envelope of existing events.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// An opaque, unguessable token identifying one user for the lifetime
/// of their visit.
///
/// The token is minted by the client on first load and presented with
/// `go_online`. It is never reused across visits, so it doubles as a
/// capability: knowing an identity is what lets you act as that user.
///
/// Newtype over `String` so an identity can't be confused with a
/// [`GameId`] or a stakes label. `#[serde(transparent)]` keeps the wire
/// form a plain JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(pub String);

impl Identity {
    /// Creates an identity from any string-ish value.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Logs and admin surfaces only ever show a short prefix of the token.
/// The full value is a secret shared with exactly one client.
impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let end = self
            .0
            .char_indices()
            .nth(8)
            .map_or(self.0.len(), |(i, _)| i);
        write!(f, "{}…", &self.0[..end])
    }
}

/// A unique identifier for one duel session, minted by the server at
/// challenge time and valid until the session reaches a terminal
/// outcome. Never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub String);

impl GameId {
    /// Creates a game id from any string-ish value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Duel vocabulary
// ---------------------------------------------------------------------------

/// The four duel variants.
///
/// Each kind shares the same challenge → accept → play → resolve
/// envelope; only the active-phase state machine differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuelKind {
    /// Rock-paper-scissors with a fixed move window.
    Showdown,
    /// Pass the bomb before a secret fuse runs out.
    HotPotato,
    /// Most taps inside the play window wins.
    TapRace,
    /// Two truths and one lie: write, then guess.
    Confession,
}

impl fmt::Display for DuelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Showdown => "showdown",
            Self::HotPotato => "hot_potato",
            Self::TapRace => "tap_race",
            Self::Confession => "confession",
        };
        write!(f, "{name}")
    }
}

/// A showdown move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Choice {
    Rock,
    Paper,
    Scissors,
}

/// Exactly three statements, as written (or auto-filled) for one
/// confession participant.
pub type Statements = [String; 3];

// ---------------------------------------------------------------------------
// Inbound events (client → server)
// ---------------------------------------------------------------------------

/// Everything a client can send.
///
/// Identity is carried explicitly on move events (matching the original
/// wire contract); the engine validates the actor against the session's
/// two fixed participants and silently drops anything else — an
/// uninvolved party never learns whether a game id is live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// "I created a profile, put me on the floor."
    GoOnline { identity: Identity },

    /// "I refreshed the page, same visit." Cancels any pending
    /// disconnect-grace timer for this identity.
    Rejoin { identity: Identity },

    /// "I'm leaving for real." Tears presence down immediately —
    /// no grace period.
    Checkout { identity: Identity },

    /// Challenge another present user to a duel. `stakes` is a
    /// free-form display label (typically a drink name).
    Challenge {
        target: Identity,
        kind: DuelKind,
        #[serde(default)]
        stakes: String,
    },

    /// Accept or decline an incoming challenge.
    Respond { game_id: GameId, accepted: bool },

    /// Showdown: lock in rock, paper, or scissors.
    ShowdownChoice {
        game_id: GameId,
        identity: Identity,
        choice: Choice,
    },

    /// Hot potato: pass the bomb to the other participant.
    HotPotatoPass { game_id: GameId, identity: Identity },

    /// Tap race: one tap.
    TapRaceTap { game_id: GameId, identity: Identity },

    /// Confession: submit three statements and which one is the lie.
    ConfessionSubmit {
        game_id: GameId,
        identity: Identity,
        statements: Statements,
        lie_index: u8,
    },

    /// Confession: guess which of the opponent's statements is the lie.
    ConfessionGuess {
        game_id: GameId,
        identity: Identity,
        guess: u8,
    },
}

// ---------------------------------------------------------------------------
// Outbound events (server → client)
// ---------------------------------------------------------------------------

/// A personalized result verdict.
///
/// `Win`/`Lose` are mirrored across the two participants; `Draw` and
/// `Cancelled` are delivered identically to both sides. A session with
/// no legitimate outcome (both players silent at timeout) resolves to
/// `Cancelled`, never to a forced winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Win,
    Lose,
    Draw,
    Cancelled,
}

/// Kind-specific fields of a `start` event.
///
/// Internally tagged with `kind`, so the client reads
/// `{"kind": "hot_potato", "holder": "…"}` and knows which screen to
/// show without a second lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StartInfo {
    /// Both players have `window_secs` to lock in a choice.
    Showdown { window_secs: u64 },
    /// The challenger holds the bomb first. The fuse length is a
    /// server-side secret and is deliberately absent here.
    HotPotato { holder: Identity },
    /// A display-only countdown, then the play window.
    TapRace { countdown_secs: u64, duration_secs: u64 },
    /// Both players have `write_secs` to submit statements.
    Confession { write_secs: u64 },
}

/// Kind-specific payload of a `result` event.
///
/// Fields are `Option` where a cancelled or forfeited session can
/// legitimately leave them unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultDetail {
    Showdown {
        choice_a: Option<Choice>,
        choice_b: Option<Choice>,
    },
    HotPotato {
        /// Who was holding the bomb when the fuse fired.
        holder: Identity,
    },
    TapRace {
        count_a: u32,
        count_b: u32,
    },
    Confession {
        statements_a: Option<Statements>,
        statements_b: Option<Statements>,
        lie_index_a: Option<u8>,
        lie_index_b: Option<u8>,
        guess_a: Option<u8>,
        guess_b: Option<u8>,
        a_correct: bool,
        b_correct: bool,
    },
}

/// Everything the server can send.
///
/// Delivery is per-identity FIFO and fire-and-forget: events addressed
/// to an identity with no live connection are dropped, never queued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    // -- Presence lifecycle --
    /// Reply to `go_online`: you are on the floor.
    Online { identity: Identity },
    /// Reply to `rejoin`: welcome back, nothing was lost.
    Rejoined { identity: Identity },
    /// Reply to `rejoin` when the visit is no longer known.
    RejoinFailed { message: String },
    /// Reply to `checkout`.
    CheckedOut,
    /// An administrator force-disconnected this identity.
    Kicked,
    /// The roster changed: the full list of identities currently on
    /// the floor, sorted, sent to everyone on every arrival/departure.
    UsersUpdate { users: Vec<Identity> },

    // -- Challenge protocol --
    /// Reply to the challenger: your challenge went out under this id.
    ChallengeSent { game_id: GameId },
    /// Delivered to the challenged party, enriched with the
    /// challenger's profile so the client can render the prompt.
    ChallengeIncoming {
        game_id: GameId,
        kind: DuelKind,
        from: Identity,
        from_name: String,
        from_avatar: Option<String>,
        stakes: String,
    },
    /// The challenge was declined. `by` is whichever participant
    /// declined — not assumed to be the challenged party.
    Declined {
        game_id: GameId,
        kind: DuelKind,
        by: Identity,
    },
    /// The challenge was accepted; play begins now.
    Start {
        game_id: GameId,
        participant_a: Identity,
        participant_b: Identity,
        stakes: String,
        info: StartInfo,
    },

    // -- Live play updates --
    /// Hot potato: the bomb changed hands.
    Passed { game_id: GameId, holder: Identity },
    /// Tap race: fresh counts after an accepted tap.
    TapUpdate {
        game_id: GameId,
        count_a: u32,
        count_b: u32,
    },
    /// Confession: write phase is over; here are the *opponent's*
    /// statements to guess against. Each side only ever sees the
    /// other's statements in this event.
    GuessPhase {
        game_id: GameId,
        statements: Statements,
        opponent: Identity,
    },
    /// Ack to a confession submit/guess: recorded, waiting on the
    /// other participant.
    Waiting { game_id: GameId },

    // -- Terminal outcome --
    /// The session resolved. Sent exactly once per participant, with a
    /// verdict personalized to the recipient.
    Result {
        game_id: GameId,
        verdict: Verdict,
        winner: Option<Identity>,
        loser: Option<Identity>,
        stakes: String,
        detail: ResultDetail,
    },

    // -- Errors --
    /// A terse notice delivered only to the actor whose request failed.
    /// The other participant is never informed.
    Error { message: String },
}

// =========================================================================
// Tests
// =========================================================================
